//! # Diagnostics
//!
//! Every finding of a run is a [`Diagnostic`]: a category plus a message.
//! Its rendered form is `"<PREFIX>: <message>"`, e.g.
//! `ENTAILMENT CYCLE: a -> b -> a (circular reasoning)`.
//!
//! Crux notes are advisory and kept apart as [`CruxNote`]; they never count
//! toward pass/fail.

use serde::Serialize;
use std::fmt;

/// Category of a diagnostic. Determines its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Structural/schema violation.
    Schema,
    /// Inference references a premise the argument does not have.
    Ref,
    /// Expression evaluated to false.
    MathFail,
    /// Expression evaluated to a number instead of a boolean.
    MathEval,
    /// Expression could not be parsed or evaluated.
    MathError,
    /// Structural graph problem (dangling, orphaned, unsupported).
    Graph,
    /// Cycle over all relation types.
    GraphCycle,
    /// Cycle over entailment edges only.
    EntailmentCycle,
    /// Top-level statement without relations.
    Isolated,
    /// Observation without a source.
    Source,
    /// Source URL probe failure.
    SourceUrl,
    /// Entailment credence violation.
    Entailment,
    /// Contrary credence violation.
    Contrary,
    /// Contradictory credence violation.
    Contradiction,
}

impl Category {
    /// The prefix printed before the message.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Schema => "SCHEMA",
            Category::Ref => "REF",
            Category::MathFail => "MATH FAIL",
            Category::MathEval => "MATH EVAL",
            Category::MathError => "MATH ERROR",
            Category::Graph => "GRAPH",
            Category::GraphCycle => "GRAPH CYCLE",
            Category::EntailmentCycle => "ENTAILMENT CYCLE",
            Category::Isolated => "ISOLATED",
            Category::Source => "SOURCE",
            Category::SourceUrl => "SOURCE URL",
            Category::Entailment => "ENTAILMENT",
            Category::Contrary => "CONTRARY",
            Category::Contradiction => "CONTRADICTION",
        }
    }
}

/// One finding of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    /// Category of the finding.
    pub category: Category,
    /// Message without the category prefix.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category.prefix(), self.message)
    }
}

/// Advisory note from crux analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CruxNote {
    /// Statement the note is about.
    pub statement: String,
    /// Its credence.
    pub credence: f64,
    /// Number of statements reachable through entailment.
    pub downstream: usize,
}

impl fmt::Display for CruxNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRUX: [{}] (credence={:?}) has {} downstream entailment(s). \
             Changing this credence affects {} other statement(s).",
            self.statement, self.credence, self.downstream, self.downstream
        )
    }
}
