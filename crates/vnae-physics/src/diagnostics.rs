// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Global State Norm Diagnostic
// ─────────────────────────────────────────────────────────────────────
//! ||X[t]||₂ per time step, the scalar convergence diagnostic.

use serde::{Deserialize, Serialize};

use crate::integrator::Trajectory;

/// Euclidean norm of one state vector.
#[inline]
pub fn state_norm(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Norm of every row of the trajectory, one scalar per time step.
pub fn state_norms(trajectory: &Trajectory) -> Vec<f64> {
    trajectory.states().map(state_norm).collect()
}

/// Compact summary of a norm sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormSummary {
    /// ||X[0]||.
    pub initial: f64,
    /// ||X[n_steps - 1]||.
    #[serde(rename = "final")]
    pub final_: f64,
    /// Largest norm over the run (NaN-aware: NaN if any entry is NaN).
    pub peak: f64,
    /// final / initial; 0 when the initial state is zero.
    pub decay_ratio: f64,
}

impl NormSummary {
    pub fn from_norms(norms: &[f64]) -> Self {
        let (Some(&initial), Some(&final_)) = (norms.first(), norms.last()) else {
            return Self::default();
        };
        let peak = norms.iter().fold(0.0f64, |acc, &v| {
            if acc.is_nan() || v.is_nan() {
                f64::NAN
            } else {
                acc.max(v)
            }
        });
        let decay_ratio = if initial > 0.0 { final_ / initial } else { 0.0 };
        Self {
            initial,
            final_,
            peak,
            decay_ratio,
        }
    }

    /// True if the norm did not grow over the run.
    pub fn is_contracting(&self) -> bool {
        self.peak <= self.initial
    }
}
