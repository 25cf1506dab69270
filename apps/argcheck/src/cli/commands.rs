//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Each command returns the process exit status; fatal problems are
//! returned as [`ArgcheckError`] and mapped by the caller.

use crate::config::AppConfig;
use crate::loader;
use crate::probe::{Citation, SourceProber};
use argcheck_core::{
    ArgcheckError, ArgumentGraph, CruxNote, Document, JsonSchema, Report, SchemaCheck, Section,
    Summary, Validator, crux,
};
use std::path::{Path, PathBuf};

/// Exit status when validation found no issues.
pub const EXIT_PASSED: i32 = 0;

/// Exit status when validation found issues.
pub const EXIT_ISSUES: i32 = 1;

// =============================================================================
// OPTIONS
// =============================================================================

/// Global output flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub json_mode: bool,
    pub quiet: bool,
    pub verbose: bool,
}

/// Where the schema pre-check comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// The schema bundled with the binary.
    Bundled,
    /// A user-supplied schema file.
    File(PathBuf),
    /// No schema pre-check.
    Disabled,
}

/// Arguments of the `check` command.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub file: PathBuf,
    pub schema: SchemaSource,
    pub check_urls: bool,
    pub tolerance: Option<f64>,
    pub config: Option<PathBuf>,
}

impl CheckOptions {
    /// Options for a plain `check <file>`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            schema: SchemaSource::Bundled,
            check_urls: false,
            tolerance: None,
            config: None,
        }
    }
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate a document and print the report.
pub async fn cmd_check(options: &CheckOptions, output: OutputMode) -> Result<i32, ArgcheckError> {
    let report = run_check(options).await?;
    print_report(&report, output);
    Ok(if report.passed() {
        EXIT_PASSED
    } else {
        EXIT_ISSUES
    })
}

/// Run every stage of `check` and return the report without printing it.
///
/// The engine runs on a blocking worker while the optional source probe
/// runs on the runtime; probe diagnostics are appended afterwards.
pub async fn run_check(options: &CheckOptions) -> Result<Report, ArgcheckError> {
    let config = AppConfig::load(options.config.as_deref())?.with_tolerance(options.tolerance);
    config.validate()?;

    let schema = match &options.schema {
        SchemaSource::Bundled => Some(loader::bundled_schema()?),
        SchemaSource::File(path) => Some(loader::load_schema(path)?),
        SchemaSource::Disabled => None,
    };
    let value = loader::load_document(&options.file)?;
    let validator = Validator::new(config.validator)?;

    tracing::info!("Validating {}", options.file.display());

    let citations: Vec<Citation> = if options.check_urls {
        Document::from_value(&value)?
            .document
            .citations()
            .into_iter()
            .map(|(id, url)| (id.to_string(), url.to_string()))
            .collect()
    } else {
        Vec::new()
    };

    let engine = tokio::task::spawn_blocking(move || {
        let schema = schema.as_ref().map(|s: &JsonSchema| s as &dyn SchemaCheck);
        validator.validate(&value, schema)
    });

    let probed = if citations.is_empty() {
        Vec::new()
    } else {
        SourceProber::new(&config.probe)?.probe(citations).await
    };

    let mut report = engine
        .await
        .map_err(|e| ArgcheckError::IoError(format!("Validation worker failed: {}", e)))??;
    report.extend(probed);

    tracing::info!(
        "Validation finished: {} issue(s), {} crux note(s)",
        report.issue_count(),
        report.crux().len()
    );
    Ok(report)
}

/// Render a report as the text printed by `check`.
#[must_use]
pub fn render_report(report: &Report, output: OutputMode) -> String {
    let mut text = String::new();

    if report.passed() {
        text.push_str("All checks passed.\n");
    } else {
        text.push_str(&format!("\n{} issues found:\n\n", report.issue_count()));
        for diagnostic in report.diagnostics() {
            text.push_str(&format!("  {}\n", diagnostic));
        }
    }

    if !report.crux().is_empty() {
        text.push_str("\nCrux analysis:\n");
        for note in report.crux() {
            text.push_str(&format!("  {}\n", note));
        }
    }

    if output.verbose {
        text.push_str("\nSections:\n");
        for section in Section::ALL {
            text.push_str(&format!(
                "  {:<12} {}\n",
                format!("{:?}", section),
                report.section(section).len()
            ));
        }
    }

    if !output.quiet {
        text.push('\n');
        text.push_str(&render_summary(report.summary()));
    }

    text
}

/// JSON form of a report.
#[must_use]
pub fn report_json(report: &Report) -> serde_json::Value {
    let issues: Vec<String> = report.diagnostics().map(ToString::to_string).collect();
    let sections: serde_json::Map<String, serde_json::Value> = Section::ALL
        .into_iter()
        .map(|section| {
            let lines: Vec<String> = report
                .section(section)
                .iter()
                .map(ToString::to_string)
                .collect();
            (format!("{:?}", section).to_lowercase(), serde_json::json!(lines))
        })
        .collect();
    serde_json::json!({
        "passed": report.passed(),
        "issue_count": report.issue_count(),
        "issues": issues,
        "sections": sections,
        "crux": crux_json(report.crux()),
        "summary": report.summary(),
    })
}

fn print_report(report: &Report, output: OutputMode) {
    if output.json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&report_json(report)).unwrap_or_default()
        );
    } else {
        print!("{}", render_report(report, output));
    }
}

// =============================================================================
// CRUX COMMAND
// =============================================================================

/// Print crux notes. Never fails on diagnostics.
pub fn cmd_crux(file: &Path, output: OutputMode) -> Result<i32, ArgcheckError> {
    let document = load_normalized(file)?;
    let graph = ArgumentGraph::build(&document);
    let notes = crux::analyze(&document, &graph);

    if output.json_mode {
        let body = serde_json::json!({ "crux": crux_json(&notes) });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
        return Ok(EXIT_PASSED);
    }

    if notes.is_empty() {
        println!("No crux statements.");
    } else {
        println!("Crux analysis:");
        for note in &notes {
            println!("  {}", note);
        }
    }

    if output.verbose {
        println!();
        println!("Downstream entailments:");
        for (id, count) in crux::downstream_counts(&graph) {
            println!("  {:<24} {}", id, count);
        }
    }

    Ok(EXIT_PASSED)
}

fn crux_json(notes: &[CruxNote]) -> serde_json::Value {
    serde_json::json!(
        notes
            .iter()
            .map(|note| serde_json::json!({
                "statement": note.statement,
                "credence": note.credence,
                "downstream": note.downstream,
                "message": note.to_string(),
            }))
            .collect::<Vec<_>>()
    )
}

// =============================================================================
// SUMMARY COMMAND
// =============================================================================

/// Print document statistics. Never fails on diagnostics.
pub fn cmd_summary(file: &Path, output: OutputMode) -> Result<i32, ArgcheckError> {
    let document = load_normalized(file)?;
    let summary = Summary::from_document(&document);

    if output.json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(EXIT_PASSED)
}

/// The summary line plus the per-tag breakdown.
#[must_use]
pub fn render_summary(summary: &Summary) -> String {
    let mut text = format!("{}\n", summary);
    if !summary.tags.is_empty() {
        let tags: Vec<String> = summary
            .tags
            .iter()
            .map(|(tag, count)| format!("{tag}={count}"))
            .collect();
        text.push_str(&format!("  tags: {}\n", tags.join(", ")));
    }
    text
}

// =============================================================================
// HELPERS
// =============================================================================

/// Load and normalise a document, ignoring structural issues.
fn load_normalized(file: &Path) -> Result<Document, ArgcheckError> {
    let value = loader::load_document(file)?;
    let normalized = Document::from_value(&value)?;
    if !normalized.issues.is_empty() {
        tracing::debug!(
            "{} structural issue(s) ignored; run `check` to see them",
            normalized.issues.len()
        );
    }
    Ok(normalized.document)
}
