// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Ring Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Parameter set and error hierarchy for the VNAE ring kernel —
//! the damped ring-diffusion network of protocol intensities.

pub mod config;
pub mod error;

pub use config::{
    SimulationConfig, MAX_TRAJECTORY_LEN, REFERENCE_DT, REFERENCE_N, REFERENCE_THETA,
    REFERENCE_T_MAX, REFERENCE_X0,
};
pub use error::{VnaeError, VnaeResult};
