// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Ring Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! VNAE adaptive coordination dynamics: protocol intensities diffusing
//! over a ring with asymmetric per-node dissipation,
//!
//!   dx/dt = -L x - Θ x,
//!
//! integrated with forward Euler and reduced to a global state norm.

pub mod diagnostics;
pub mod engine;
pub mod integrator;
pub mod params;
pub mod spectral;

pub use diagnostics::{state_norm, state_norms, NormSummary};
pub use engine::{simulate, simulate_reference, SimulationResult};
pub use integrator::{EulerIntegrator, Trajectory};
pub use params::{build_ring_laplacian, reference_laplacian};
pub use spectral::{
    analyse_stability, estimate_stability, gershgorin_bounds, system_eigenvalues, SpectrumMethod,
    StabilityReport,
};
