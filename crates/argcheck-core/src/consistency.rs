//! # Consistency Checker
//!
//! Credence constraints implied by logical relations.
//!
//! | Relation | Constraint | Violation |
//! |----------|------------|-----------|
//! | A entails B | c(B) >= c(A) | c(B) < c(A) |
//! | A contrary B | c(A) + c(B) <= 1 | sum > 1.0 |
//! | A contradictory B | c(A) + c(B) = 1 | \|sum - 1\| > tolerance |
//!
//! Relations where either side has no credence are skipped. Other relation
//! types carry no credence constraint.

use crate::diagnostic::{Category, Diagnostic};
use crate::document::Document;
use crate::primitives::{
    CREDENCE_SUM_PRECISION, DEFAULT_CONTRADICTION_TOLERANCE, MAX_CONTRADICTION_TOLERANCE,
    TOLERANCE_EPSILON,
};
use crate::types::{ArgcheckError, Relation, RelationKind};
use serde::Deserialize;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tunables of the consistency checker.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsistencyConfig {
    /// Allowed deviation of a contradictory pair's credence sum from 1.0.
    pub contradiction_tolerance: f64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            contradiction_tolerance: DEFAULT_CONTRADICTION_TOLERANCE,
        }
    }
}

impl ConsistencyConfig {
    /// Reject tolerances outside `[0, MAX_CONTRADICTION_TOLERANCE]` or NaN.
    pub fn validate(&self) -> Result<(), ArgcheckError> {
        let t = self.contradiction_tolerance;
        if !(0.0..=MAX_CONTRADICTION_TOLERANCE).contains(&t) {
            return Err(ArgcheckError::ConfigError(format!(
                "contradiction_tolerance must be between 0 and {MAX_CONTRADICTION_TOLERANCE}, got {t}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// CHECKER
// =============================================================================

/// Checks every credence-bearing relation of a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyChecker {
    config: ConsistencyConfig,
}

impl ConsistencyChecker {
    /// Create a checker with the given configuration.
    #[must_use]
    pub fn new(config: ConsistencyConfig) -> Self {
        Self { config }
    }

    /// Walk relations in document order and report violations.
    #[must_use]
    pub fn check(&self, document: &Document) -> Vec<Diagnostic> {
        document
            .relations()
            .iter()
            .filter_map(|relation| {
                let a = document.credence(&relation.from)?;
                let b = document.credence(&relation.to)?;
                self.check_pair(relation, a, b)
            })
            .collect()
    }

    /// Check one relation given both credences.
    #[must_use]
    pub fn check_pair(&self, relation: &Relation, a: f64, b: f64) -> Option<Diagnostic> {
        let (from, to) = (&relation.from, &relation.to);
        match relation.kind {
            RelationKind::Entails => (b < a).then(|| {
                Diagnostic::new(
                    Category::Entailment,
                    format!(
                        "[{from}] (credence={a:?}) entails [{to}] (credence={b:?}), \
                         but {b:?} < {a:?}. If A entails B, credence(B) must be >= credence(A)."
                    ),
                )
            }),
            RelationKind::Contrary => {
                let sum = a + b;
                (sum > 1.0).then(|| {
                    Diagnostic::new(
                        Category::Contrary,
                        format!(
                            "[{from}] (credence={a:?}) contrary to [{to}] (credence={b:?}), \
                             sum={sum:.prec$} > 1.0. Contraries can't both be true.",
                            prec = CREDENCE_SUM_PRECISION
                        ),
                    )
                })
            }
            RelationKind::Contradictory => {
                let sum = a + b;
                let tolerance = self.config.contradiction_tolerance;
                // Sums landing exactly on the boundary may carry rounding error.
                ((sum - 1.0).abs() > tolerance + TOLERANCE_EPSILON).then(|| {
                    Diagnostic::new(
                        Category::Contradiction,
                        format!(
                            "[{from}] (credence={a:?}) contradicts [{to}] (credence={b:?}), \
                             sum={sum:.prec$} != 1.0 (tolerance={tolerance:?}).",
                            prec = CREDENCE_SUM_PRECISION
                        ),
                    )
                })
            }
            RelationKind::Supports | RelationKind::Attacks | RelationKind::Other(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
