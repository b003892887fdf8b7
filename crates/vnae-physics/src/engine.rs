// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Simulation Engine
// ─────────────────────────────────────────────────────────────────────
//! One-shot batch run:
//!   1. Validate the parameter set
//!   2. Build the ring Laplacian
//!   3. Gershgorin stability estimate (warn only)
//!   4. Euler-integrate to the horizon
//!   5. Reduce each state to its Euclidean norm
//!
//! The result carries the two renderer products: (time_seq, X) for the
//! per-node trajectories and (time_seq, state_norm) for the convergence plot.

use serde::{Deserialize, Serialize};

use vnae_types::{SimulationConfig, VnaeError, VnaeResult};

use crate::diagnostics::{state_norms, NormSummary};
use crate::integrator::{EulerIntegrator, Trajectory};
use crate::spectral::{estimate_stability, StabilityReport};

/// Everything a renderer needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// t · dt for every stored state.
    pub time_seq: Vec<f64>,
    /// X, n_steps × n_nodes.
    pub trajectory: Trajectory,
    /// ||X[t]||₂ per step.
    pub state_norm: Vec<f64>,
    /// Conservative Euler stability estimate for the configured dt.
    pub stability: StabilityReport,
}

impl SimulationResult {
    pub fn n_steps(&self) -> usize {
        self.time_seq.len()
    }

    pub fn summary(&self) -> NormSummary {
        NormSummary::from_norms(&self.state_norm)
    }

    /// Serialise to JSON string.
    pub fn to_json(&self) -> VnaeResult<String> {
        serde_json::to_string(self)
            .map_err(|e| VnaeError::Config(format!("JSON encode error: {e}")))
    }
}

/// Run the full simulate-and-reduce pipeline for `config`.
pub fn simulate(config: &SimulationConfig) -> VnaeResult<SimulationResult> {
    let mut integrator = EulerIntegrator::new(config)?;
    let n_steps = config.n_steps();
    log::debug!(
        "VNAE run: n={} dt={} t_max={} n_steps={n_steps}",
        config.n,
        config.dt,
        config.t_max
    );

    // O(N²) bound; the exact Jacobi spectrum is left to callers that ask for it.
    let stability = estimate_stability(integrator.laplacian(), integrator.theta(), config.dt)?;
    if !stability.stable {
        log::warn!(
            "dt = {} not provably stable: ρ ≤ {:.6}, λ ∈ [{:.6}, {:.6}]; trajectory may diverge",
            config.dt,
            stability.spectral_radius,
            stability.lambda_min,
            stability.lambda_max
        );
    }

    let trajectory = integrator.run(&config.x0, n_steps)?;
    let state_norm = state_norms(&trajectory);
    let time_seq = config.time_seq();

    let result = SimulationResult {
        time_seq,
        trajectory,
        state_norm,
        stability,
    };
    let summary = result.summary();
    log::info!(
        "VNAE run complete: {} steps, ||X|| {:.6} -> {:.6}",
        result.n_steps(),
        summary.initial,
        summary.final_
    );
    Ok(result)
}

/// Run the literal N = 20 reference configuration.
pub fn simulate_reference() -> VnaeResult<SimulationResult> {
    simulate(&SimulationConfig::reference())
}
