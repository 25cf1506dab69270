//! Integration tests for the argcheck command line.
//!
//! Documents and configuration are written to temporary directories; the
//! source probe is pointed at a throwaway HTTP server on localhost.

#![allow(clippy::unwrap_used, clippy::panic)]

use argcheck::cli::{
    CheckOptions, Cli, EXIT_ISSUES, EXIT_PASSED, EXIT_USAGE, OutputMode, SchemaSource, cmd_check,
    cmd_crux, cmd_summary, execute, render_report, report_json, run_check,
};
use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// A premise-conclusion document that passes every check, citing `urls`.
fn premise_document(urls: &[&str]) -> String {
    let mut premises = String::from(
        "      - id: p1\n        tag: assumption\n        text: First\n        math: \"2 + 2 == 4\"\n",
    );
    let mut ids = vec!["p1".to_string()];
    for (i, url) in urls.iter().enumerate() {
        let id = format!("s{}", i + 1);
        premises.push_str(&format!(
            "      - id: {id}\n        tag: observation\n        text: Seen\n        source:\n          url: \"{url}\"\n"
        ));
        ids.push(id);
    }
    format!(
        "claims:\n  k:\n    text: The claim\n\
         arguments:\n  - name: arg1\n    premises:\n{premises}\
         \x20   inferences:\n      - from: [{}]\n\
         \x20   conclusion:\n      id: c1\n      text: Therefore\n\
         \x20   relations:\n      - target: k\n        type: supports\n",
        ids.join(", ")
    )
}

/// An export document where `A` entails `B` with the given credences.
fn entailment_document(a: f64, b: f64) -> String {
    serde_json::json!({
        "statements": {
            "A": {"data": {"credence": a},
                  "relations": [{"from": "A", "to": "B", "relationType": "entails"}]},
            "B": {"data": {"credence": b}}
        }
    })
    .to_string()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write temp file");
    path
}

fn lines(report: &argcheck_core::Report) -> Vec<String> {
    report.diagnostics().map(ToString::to_string).collect()
}

/// Serve `HEAD /status/<code>` with that status code until the test ends.
async fn status_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut request = Vec::new();
                loop {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let text = String::from_utf8_lossy(&request);
                let code: u16 = text
                    .split_whitespace()
                    .nth(1)
                    .and_then(|path| path.strip_prefix("/status/"))
                    .and_then(|code| code.parse().ok())
                    .unwrap_or(200);
                let response = format!(
                    "HTTP/1.1 {code} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

#[tokio::test]
async fn test_check_passing_yaml_document() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "args.yaml", &premise_document(&["https://example.org/a"]));

    let report = run_check(&CheckOptions::new(&path)).await.expect("check");
    assert!(report.passed(), "unexpected issues: {:?}", lines(&report));
    assert_eq!(report.summary().arguments, 1);
    assert_eq!(report.summary().tags.get("observation"), Some(&1));

    let code = cmd_check(&CheckOptions::new(&path), OutputMode::default())
        .await
        .expect("check");
    assert_eq!(code, EXIT_PASSED);
}

#[tokio::test]
async fn test_check_failing_json_document() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "export.json", &entailment_document(0.8, 0.6));

    let report = run_check(&CheckOptions::new(&path)).await.expect("check");
    assert_eq!(
        lines(&report),
        vec![
            "ENTAILMENT: [A] (credence=0.8) entails [B] (credence=0.6), but 0.6 < 0.8. \
             If A entails B, credence(B) must be >= credence(A)."
        ]
    );

    let code = cmd_check(&CheckOptions::new(&path), OutputMode::default())
        .await
        .expect("check");
    assert_eq!(code, EXIT_ISSUES);
}

#[tokio::test]
async fn test_missing_document_is_exit_2() {
    let err = run_check(&CheckOptions::new("/nonexistent/args.yaml"))
        .await
        .expect_err("missing file");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_unparseable_document_is_exit_2() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "broken.json", "{\"statements\": ");
    let err = run_check(&CheckOptions::new(&path))
        .await
        .expect_err("broken json");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_unknown_shape_is_exit_2() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "other.yaml", "nodes: []\n");
    let err = run_check(&CheckOptions::new(&path))
        .await
        .expect_err("unknown shape");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_unreadable_schema_is_exit_3() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write(&dir, "args.yaml", &premise_document(&[]));
    let schema = write(&dir, "schema.json", "{ not json");

    let mut options = CheckOptions::new(&doc);
    options.schema = SchemaSource::File(schema);
    let err = run_check(&options).await.expect_err("bad schema");
    assert_eq!(err.exit_code(), 3);

    options.schema = SchemaSource::File(dir.path().join("missing.json"));
    let err = run_check(&options).await.expect_err("missing schema");
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_schema_with_unsupported_keyword_is_exit_3() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write(&dir, "args.yaml", &premise_document(&[]));
    let schema = write(
        &dir,
        "schema.json",
        r#"{"properties": {"arguments": {"items": {"anyOf": [{"required": ["name"]}]}}}}"#,
    );

    let mut options = CheckOptions::new(&doc);
    options.schema = SchemaSource::File(schema);
    let err = run_check(&options).await.expect_err("unsupported keyword");
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("'anyOf'"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_schema_selection() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write(
        &dir,
        "args.json",
        &serde_json::json!({
            "claims": {"k": {"text": "K"}},
            "arguments": [{
                "name": "",
                "premises": [{"id": "p1", "tag": "assumption"}],
                "conclusion": {"id": "c1", "text": "C"},
                "relations": [{"target": "k", "type": "supports"}]
            }]
        })
        .to_string(),
    );

    let bundled = run_check(&CheckOptions::new(&doc)).await.expect("check");
    assert_eq!(
        lines(&bundled),
        vec!["SCHEMA: $.arguments[0].name: '' is too short"]
    );

    let mut options = CheckOptions::new(&doc);
    options.schema = SchemaSource::Disabled;
    let unchecked = run_check(&options).await.expect("check");
    assert!(unchecked.passed());

    let custom = write(
        &dir,
        "custom.json",
        r#"{"type": "object", "required": ["title"]}"#,
    );
    options.schema = SchemaSource::File(custom);
    let report = run_check(&options).await.expect("check");
    assert_eq!(
        lines(&report),
        vec!["SCHEMA: $: 'title' is a required property"]
    );
}

#[tokio::test]
async fn test_tolerance_flag_and_config_file() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write(
        &dir,
        "export.json",
        &serde_json::json!({
            "statements": {
                "A": {"data": {"credence": 0.5},
                      "relations": [{"from": "A", "to": "B", "relationType": "contradictory"}]},
                "B": {"data": {"credence": 0.4}}
            }
        })
        .to_string(),
    );

    let strict = run_check(&CheckOptions::new(&doc)).await.expect("check");
    assert_eq!(strict.issue_count(), 1);

    let mut options = CheckOptions::new(&doc);
    options.tolerance = Some(0.2);
    assert!(run_check(&options).await.expect("check").passed());

    let config = write(
        &dir,
        "argcheck.toml",
        "[validator.consistency]\ncontradiction_tolerance = 0.15\n",
    );
    let mut options = CheckOptions::new(&doc);
    options.config = Some(config);
    assert!(run_check(&options).await.expect("check").passed());

    let mut options = CheckOptions::new(&doc);
    options.tolerance = Some(3.0);
    let err = run_check(&options).await.expect_err("out of range");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_invalid_config_file_is_exit_2() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write(&dir, "export.json", &entailment_document(0.5, 0.6));
    let config = write(&dir, "argcheck.toml", "[validator]\nunknown = 1\n");

    let mut options = CheckOptions::new(&doc);
    options.config = Some(config);
    let err = run_check(&options).await.expect_err("bad config");
    assert_eq!(err.exit_code(), 2);
}

// =============================================================================
// SOURCE PROBE
// =============================================================================

#[tokio::test]
async fn test_check_urls_reports_failures_in_citation_order() {
    let base = status_server().await;
    let ok = format!("{base}/status/200");
    let gone = format!("{base}/status/404");
    let broken = format!("{base}/status/503");

    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "args.yaml",
        &premise_document(&[
            gone.as_str(),
            ok.as_str(),
            "ftp://example.org/file",
            broken.as_str(),
        ]),
    );

    let mut options = CheckOptions::new(&path);
    let offline = run_check(&options).await.expect("check");
    assert!(offline.passed());

    options.check_urls = true;
    let report = run_check(&options).await.expect("check");
    assert_eq!(
        lines(&report),
        vec![
            format!("SOURCE URL: [arg1/s1]: {gone} returned 404"),
            format!("SOURCE URL: [arg1/s4]: {broken} returned 503"),
        ]
    );
}

#[tokio::test]
async fn test_check_urls_trims_cited_urls() {
    let base = status_server().await;
    let gone = format!("{base}/status/404");
    let padded = format!("  {gone} ");

    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "args.yaml", &premise_document(&[padded.as_str()]));

    let mut options = CheckOptions::new(&path);
    options.check_urls = true;
    let report = run_check(&options).await.expect("check");
    assert_eq!(
        lines(&report),
        vec![format!("SOURCE URL: [arg1/s1]: {gone} returned 404")]
    );
}

#[tokio::test]
async fn test_check_urls_reports_transport_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let url = format!("http://{addr}/gone");

    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "args.yaml", &premise_document(&[url.as_str()]));

    let mut options = CheckOptions::new(&path);
    options.check_urls = true;
    let report = run_check(&options).await.expect("probe failure is not fatal");
    let found = lines(&report);
    assert_eq!(found.len(), 1);
    assert!(
        found[0].starts_with(&format!("SOURCE URL: [arg1/s1]: {url} error: ")),
        "unexpected line: {}",
        found[0]
    );
}

// =============================================================================
// OUTPUT
// =============================================================================

#[tokio::test]
async fn test_render_report_layout() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "export.json", &entailment_document(0.8, 0.6));
    let report = run_check(&CheckOptions::new(&path)).await.expect("check");

    let text = render_report(&report, OutputMode::default());
    assert!(text.starts_with("\n1 issues found:\n\n  ENTAILMENT: [A]"));
    assert!(text.contains("\nCrux analysis:\n  CRUX: [A] (credence=0.8) has 1 downstream"));
    assert!(text.ends_with(
        "Summary: 2 statements, 1 relations, 2 with credences, 0 math expressions\n"
    ));

    let quiet = render_report(
        &report,
        OutputMode {
            quiet: true,
            ..OutputMode::default()
        },
    );
    assert!(!quiet.contains("Summary:"));
}

#[tokio::test]
async fn test_report_json_shape() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "export.json", &entailment_document(0.8, 0.6));
    let report = run_check(&CheckOptions::new(&path)).await.expect("check");

    let json = report_json(&report);
    assert_eq!(json["passed"], false);
    assert_eq!(json["issue_count"], 1);
    assert_eq!(json["sections"]["consistency"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["sections"]["schema"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["crux"][0]["statement"], "A");
    assert_eq!(json["crux"][0]["downstream"], 1);
    assert_eq!(json["summary"]["format"], "statement_export");
    assert_eq!(json["summary"]["statements"], 2);
}

#[test]
fn test_crux_and_summary_exit_zero_despite_issues() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "export.json", &entailment_document(0.8, 0.6));
    assert_eq!(cmd_crux(&path, OutputMode::default()).expect("crux"), 0);
    assert_eq!(cmd_summary(&path, OutputMode::default()).expect("summary"), 0);

    let json_mode = OutputMode {
        json_mode: true,
        ..OutputMode::default()
    };
    assert_eq!(cmd_crux(&path, json_mode).expect("crux"), 0);
    assert_eq!(cmd_summary(&path, json_mode).expect("summary"), 0);
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

#[tokio::test]
async fn test_no_subcommand_is_usage_error() {
    let cli = Cli::try_parse_from(["argcheck"]).expect("parse");
    assert_eq!(execute(cli).await.expect("execute"), EXIT_USAGE);
}

#[test]
fn test_schema_flags_conflict() {
    let result = Cli::try_parse_from(["argcheck", "check", "a.yaml", "--schema", "s.json", "--no-schema"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_execute_check_returns_status() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "export.json", &entailment_document(0.6, 0.8));
    let cli = Cli::try_parse_from([
        "argcheck",
        "--quiet",
        "check",
        path.to_str().expect("utf-8 path"),
        "--tolerance",
        "0.1",
    ])
    .expect("parse");
    assert_eq!(execute(cli).await.expect("execute"), EXIT_PASSED);
}
