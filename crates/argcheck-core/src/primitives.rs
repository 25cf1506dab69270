//! # Engine Primitives
//!
//! Named constants and defaults for the argcheck engine.
//!
//! Values here are compiled in. Those that a deployment may want to tune
//! (the contradiction tolerance) are only *defaults*: the live value is a
//! field on the owning checker's configuration.

/// Default tolerance for contradictory pairs.
///
/// Exactly one of two contradictory statements holds, so their credences
/// should sum to 1.0. Credences are elicited estimates, so the sum may
/// deviate from 1.0 by up to this amount before a diagnostic is raised.
pub const DEFAULT_CONTRADICTION_TOLERANCE: f64 = 0.05;

/// Slack applied on top of the contradiction tolerance so that sums lying
/// exactly on the tolerance boundary (0.95, 1.05) are not rejected because
/// of binary floating-point rounding.
pub const TOLERANCE_EPSILON: f64 = 1e-9;

/// Upper bound on contradiction tolerance accepted from configuration.
///
/// A tolerance of 1.0 or more would accept every pair of credences.
pub const MAX_CONTRADICTION_TOLERANCE: f64 = 1.0;

/// Decimal places used when reporting a non-boolean expression value.
pub const MATH_VALUE_PRECISION: usize = 4;

/// Decimal places used when reporting credence sums.
pub const CREDENCE_SUM_PRECISION: usize = 2;

// =============================================================================
// COMPUTATIONAL BOUNDS
// =============================================================================

/// Maximum number of simple cycles enumerated per run.
///
/// Simple-cycle enumeration is exponential on dense graphs. Enumeration
/// stops after this many cycles; argument graphs written by hand stay far
/// below it.
pub const MAX_REPORTED_CYCLES: usize = 10_000;

/// Maximum DFS steps spent on cycle enumeration per run.
pub const MAX_CYCLE_SEARCH_STEPS: usize = 1_000_000;

/// Maximum nesting depth accepted by the expression parser.
pub const MAX_EXPRESSION_DEPTH: usize = 64;

/// Maximum expression length in bytes.
pub const MAX_EXPRESSION_LENGTH: usize = 4096;

// =============================================================================
// WELL-KNOWN NAMES
// =============================================================================

/// Epistemic tag that requires a source citation.
pub const OBSERVATION_TAG: &str = "observation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contradiction_tolerance_default() {
        assert_eq!(DEFAULT_CONTRADICTION_TOLERANCE, 0.05);
    }

    #[test]
    fn math_values_reported_to_four_places() {
        assert_eq!(
            format!("{:.*}", MATH_VALUE_PRECISION, 4.0_f64),
            "4.0000"
        );
    }
}
