//! # Validator
//!
//! Runs every stage over one document and aggregates the result.
//!
//! ```text
//! Value -> [schema pre-check] -> Document::from_value
//!       -> references, math, graph, consistency, sources -> Report
//!       -> crux notes
//! ```
//!
//! Stages are pure functions of the document; the [`Report`] imposes the
//! output order, so the order they run in here does not matter.

use crate::consistency::{ConsistencyChecker, ConsistencyConfig};
use crate::crux;
use crate::document::Document;
use crate::expression;
use crate::graph::{ArgumentGraph, CycleScope};
use crate::report::{Report, Summary};
use crate::schema::SchemaCheck;
use crate::structure;
use crate::types::ArgcheckError;
use serde::Deserialize;
use serde_json::Value;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Credence consistency settings.
    pub consistency: ConsistencyConfig,
    /// Cycle scope override. `None` picks the scope from the format.
    pub cycle_scope: Option<CycleScope>,
    /// Report observations without a source.
    pub require_observation_sources: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            consistency: ConsistencyConfig::default(),
            cycle_scope: None,
            require_observation_sources: true,
        }
    }
}

impl ValidatorConfig {
    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ArgcheckError> {
        self.consistency.validate()
    }
}

/// The validation engine.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator, rejecting out-of-range configuration.
    pub fn new(config: ValidatorConfig) -> Result<Self, ArgcheckError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Validate a parsed document.
    ///
    /// Fails only when the value matches neither document shape. Schema
    /// violations come first in the `Schema` section, followed by the
    /// normaliser's own structural issues; duplicates are dropped.
    pub fn validate(
        &self,
        value: &Value,
        schema: Option<&dyn SchemaCheck>,
    ) -> Result<Report, ArgcheckError> {
        let normalized = Document::from_value(value)?;
        let mut report = Report::new(Summary::from_document(&normalized.document));
        if let Some(schema) = schema {
            report.extend(
                schema
                    .check(value)
                    .into_iter()
                    .map(|violation| violation.into_diagnostic()),
            );
        }
        report.extend(normalized.issues);
        self.run_checks(&normalized.document, &mut report);
        Ok(report)
    }

    fn run_checks(&self, document: &Document, report: &mut Report) {
        let graph = ArgumentGraph::build(document);
        let scope = self
            .config
            .cycle_scope
            .unwrap_or_else(|| CycleScope::for_format(document.format()));

        report.extend(structure::check_references(document));
        report.extend(expression::check_math(document));
        report.extend(structure::check_graph(document, &graph, scope));
        report.extend(ConsistencyChecker::new(self.config.consistency).check(document));
        if self.config.require_observation_sources {
            report.extend(structure::check_sources(document));
        }
        report.set_crux(crux::analyze(document, &graph));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JsonSchema;
    use serde_json::json;

    #[test]
    fn rejects_unrecognised_documents() {
        let err = Validator::default()
            .validate(&json!({"foo": 1}), None)
            .expect_err("no known shape");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_out_of_range_tolerance() {
        let config = ValidatorConfig {
            consistency: ConsistencyConfig {
                contradiction_tolerance: 2.0,
            },
            ..ValidatorConfig::default()
        };
        assert!(Validator::new(config).is_err());
    }

    #[test]
    fn schema_and_normaliser_issues_are_merged() {
        let schema = JsonSchema::from_value(json!({
            "type": "object",
            "properties": {
                "arguments": {
                    "type": "array",
                    "items": {"type": "object", "required": ["name", "premises", "conclusion"]}
                }
            }
        }))
        .expect("schema");
        let value = json!({"arguments": [{"name": "a", "premises": []}]});

        let report = Validator::default()
            .validate(&value, Some(&schema))
            .expect("valid shape");
        let schema_lines: Vec<_> = report
            .diagnostics()
            .filter(|d| d.category == crate::diagnostic::Category::Schema)
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            schema_lines,
            vec!["SCHEMA: $.arguments[0]: 'conclusion' is a required property"]
        );
    }

    #[test]
    fn observation_source_check_can_be_disabled() {
        let value = json!({
            "statements": {"a": {"data": {"tag": "observation"}}}
        });
        let strict = Validator::default().validate(&value, None).expect("shape");
        assert!(!strict.passed());

        let lenient = Validator::new(ValidatorConfig {
            require_observation_sources: false,
            ..ValidatorConfig::default()
        })
        .expect("config");
        assert!(lenient.validate(&value, None).expect("shape").passed());
    }

    #[test]
    fn cycle_scope_override_applies_to_export_documents() {
        let value = json!({
            "statements": {
                "a": {"relations": [{"from": "a", "to": "b", "relationType": "supports"}]},
                "b": {"relations": [{"from": "b", "to": "a", "relationType": "attacks"}]}
            }
        });
        assert!(Validator::default().validate(&value, None).expect("shape").passed());

        let all = Validator::new(ValidatorConfig {
            cycle_scope: Some(CycleScope::AllRelations),
            ..ValidatorConfig::default()
        })
        .expect("config");
        let report = all.validate(&value, None).expect("shape");
        let lines: Vec<_> = report.diagnostics().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["GRAPH CYCLE: a -> b"]);
    }
}
