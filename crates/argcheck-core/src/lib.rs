//! # argcheck-core
//!
//! The deterministic validation engine for argument graphs.
//!
//! Given an already-parsed document (`serde_json::Value`) in either of the
//! two supported shapes, the engine normalises it, evaluates embedded math,
//! checks referential integrity, graph structure and credence consistency,
//! and returns an ordered [`Report`] plus advisory crux notes.
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no I/O, no async, no logging
//! - Deterministic: `BTreeMap` everywhere, explicit document order, no
//!   hashing in any output path
//! - Total: checkers report diagnostics and never panic; the only fatal
//!   error is an input that matches neither document shape
//!
//! ## Example
//!
//! ```
//! use argcheck_core::Validator;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "statements": {
//!         "a": {"data": {"credence": 0.8},
//!               "relations": [{"from": "a", "to": "b", "relationType": "entails"}]},
//!         "b": {"data": {"credence": 0.6}}
//!     }
//! });
//! let report = Validator::default().validate(&doc, None).expect("known shape");
//! assert!(!report.passed());
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod consistency;
pub mod crux;
pub mod diagnostic;
pub mod document;
pub mod expression;
pub mod graph;
pub mod primitives;
pub mod report;
pub mod schema;
pub mod structure;
pub mod types;
pub mod validator;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ArgcheckError, Argument, Citation, Inference, Relation, RelationKind, SourceFormat, Statement,
    StatementRole,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use consistency::{ConsistencyChecker, ConsistencyConfig};
pub use diagnostic::{Category, CruxNote, Diagnostic};
pub use document::{Document, Normalized, SourceShape};
pub use expression::{Evaluation, ExpressionError, evaluate};
pub use graph::{ArgumentGraph, CycleScope, CycleSearch, NodeId};
pub use report::{Report, Section, Summary};
pub use schema::{JsonSchema, SchemaCheck, SchemaViolation};
pub use validator::{Validator, ValidatorConfig};
