//! # Core Type Definitions
//!
//! This module contains the canonical records of an argument document:
//! - Statements and their roles (`Statement`, `StatementRole`, `Citation`)
//! - Typed relations between statements (`Relation`, `RelationKind`)
//! - Argument bundles (`Argument`, `Inference`)
//! - The source format a document was normalised from (`SourceFormat`)
//! - Fatal error types (`ArgcheckError`)
//!
//! ## Ownership
//!
//! Records are only constructed by [`crate::document`]. Every checker reads
//! them through shared references and never mutates them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// SOURCE FORMAT
// =============================================================================

/// The input shape a document was normalised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// A flat `arguments` list with nested premises, inferences and a
    /// conclusion, plus separately keyed claims.
    PremiseConclusion,
    /// A statement-keyed export where statements and arguments both carry
    /// relation lists.
    StatementExport,
}

impl SourceFormat {
    /// Human-readable format name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::PremiseConclusion => "premise-conclusion",
            SourceFormat::StatementExport => "statement-export",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// The part a statement plays in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementRole {
    /// A free-standing claim that argument conclusions may target.
    Claim,
    /// A premise internal to one argument.
    Premise,
    /// The conclusion of one argument.
    Conclusion,
    /// A statement from an export-format document.
    Statement,
}

/// A source citation attached to a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Citation {
    /// The cited location, when one was given.
    pub url: Option<String>,
    /// Remaining citation fields (title, accessed date, ...), stringified.
    pub metadata: BTreeMap<String, String>,
}

impl Citation {
    /// Create a citation pointing at a URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            metadata: BTreeMap::new(),
        }
    }
}

/// A single statement: claim, premise, conclusion or exported statement.
///
/// Optional fields are `None` when absent in the source. In particular an
/// absent credence is never represented as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// Document-unique identifier.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Credence in [0, 1].
    pub credence: Option<f64>,
    /// Epistemic tag, e.g. "observation" or "assumption".
    pub tag: Option<String>,
    /// Embedded math/boolean expression.
    pub math: Option<String>,
    /// Source citation.
    pub source: Option<Citation>,
    /// Role of the statement in the document.
    pub role: StatementRole,
    /// Owning argument for premises and conclusions.
    pub argument: Option<String>,
    /// Export-format marker for statements usable at top level.
    pub top_level: bool,
}

impl Statement {
    /// Create a statement with every optional field unset.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>, role: StatementRole) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            credence: None,
            tag: None,
            math: None,
            source: None,
            role,
            argument: None,
            top_level: false,
        }
    }

    /// Whether the statement carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }
}

// =============================================================================
// RELATIONS
// =============================================================================

/// Type of a directed relation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum RelationKind {
    /// A entails B.
    Entails,
    /// A and B cannot both hold.
    Contrary,
    /// Exactly one of A and B holds.
    Contradictory,
    /// A supports B.
    Supports,
    /// A attacks B.
    Attacks,
    /// Any other domain relation, kept verbatim.
    Other(String),
}

impl RelationKind {
    /// Parse a relation type name. Unknown names are kept as `Other`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "entails" => RelationKind::Entails,
            "contrary" => RelationKind::Contrary,
            "contradictory" => RelationKind::Contradictory,
            "supports" => RelationKind::Supports,
            "attacks" => RelationKind::Attacks,
            other => RelationKind::Other(other.to_string()),
        }
    }

    /// The relation type name as written in documents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RelationKind::Entails => "entails",
            RelationKind::Contrary => "contrary",
            RelationKind::Contradictory => "contradictory",
            RelationKind::Supports => "supports",
            RelationKind::Attacks => "attacks",
            RelationKind::Other(name) => name,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A directed, typed edge between two identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Relation {
    /// Source identifier.
    pub from: String,
    /// Target identifier.
    pub to: String,
    /// Relation type.
    pub kind: RelationKind,
}

impl Relation {
    /// Create a new relation.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// Whether either endpoint is the given identifier.
    #[must_use]
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

// =============================================================================
// ARGUMENTS
// =============================================================================

/// One inference step inside an argument.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Inference {
    /// Local premise ids the inference draws on.
    pub from: Vec<String>,
}

/// A named bundle of premises, inferences and a conclusion.
///
/// In the export format arguments only carry a name; premises and
/// inferences are empty and there is no conclusion record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Argument {
    /// Argument name (unique within the document).
    pub name: String,
    /// Local premise ids, in document order.
    pub premises: Vec<String>,
    /// Inference steps.
    pub inferences: Vec<Inference>,
    /// Statement id of the conclusion.
    pub conclusion: Option<String>,
}

impl Argument {
    /// Create an argument with no premises or conclusion.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Canonical statement id of a premise: `"{argument}/{premise}"`.
#[must_use]
pub fn premise_statement_id(argument: &str, local_id: &str) -> String {
    format!("{argument}/{local_id}")
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Fatal errors of an argcheck run.
///
/// - Checkers never return these; they report diagnostics instead
/// - Only unreadable input, a missing schema or bad configuration stop a run
#[derive(Debug, Error)]
pub enum ArgcheckError {
    /// The input is not one of the recognised document shapes.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The schema definition could not be read or parsed.
    #[error("Schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// An I/O error occurred while reading input.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization error occurred while writing output.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ArgcheckError {
    /// Process exit status for this error.
    ///
    /// `1` is reserved for "validation found issues".
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            ArgcheckError::InvalidDocument(_)
            | ArgcheckError::IoError(_)
            | ArgcheckError::ConfigError(_)
            | ArgcheckError::SerializationError(_) => 2,
            ArgcheckError::SchemaUnavailable(_) => 3,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_kind_parse_roundtrips_known_names() {
        for name in ["entails", "contrary", "contradictory", "supports", "attacks"] {
            assert_eq!(RelationKind::parse(name).as_str(), name);
        }
    }

    #[test]
    fn relation_kind_keeps_unknown_names() {
        let kind = RelationKind::parse("undercuts");
        assert_eq!(kind, RelationKind::Other("undercuts".to_string()));
        assert_eq!(kind.to_string(), "undercuts");
    }

    #[test]
    fn statement_defaults_leave_credence_unset() {
        let s = Statement::new("a", "A", StatementRole::Claim);
        assert!(s.credence.is_none());
        assert!(s.math.is_none());
        assert!(!s.top_level);
    }

    #[test]
    fn premise_ids_are_argument_qualified() {
        assert_eq!(premise_statement_id("arg1", "p1"), "arg1/p1");
    }

    #[test]
    fn exit_codes_distinguish_schema_failures() {
        assert_eq!(ArgcheckError::InvalidDocument("x".into()).exit_code(), 2);
        assert_eq!(ArgcheckError::SchemaUnavailable("x".into()).exit_code(), 3);
    }
}
