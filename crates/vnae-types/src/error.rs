// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Ring Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all VNAE ring-kernel failures.
///
/// Numerical blow-up (NaN/Inf in the trajectory) is deliberately absent:
/// the integrator lets it propagate and only logs a warning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VnaeError {
    /// Parameter set cannot define a run (node count, step size, horizon).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A per-node vector or matrix does not match the node count.
    #[error("dimension mismatch: {what} has length {got}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl VnaeError {
    /// Shorthand for a length check failure.
    pub fn mismatch(what: &'static str, expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            got,
        }
    }
}

pub type VnaeResult<T> = Result<T, VnaeError>;
