// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Simulation Parameter Set
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{VnaeError, VnaeResult};

/// Node count of the reference protocol network.
pub const REFERENCE_N: usize = 20;

/// Reference dissipation parameters θ_i.
/// Higher θ = more rigid / conservative protocol.
pub const REFERENCE_THETA: [f64; REFERENCE_N] = [
    0.30, 0.45, 0.80, 0.55, 0.70, //
    0.90, 0.60, 0.40, 1.10, 0.65, //
    0.50, 0.75, 0.35, 0.95, 0.85, //
    0.60, 0.40, 0.70, 1.00, 0.55,
];

/// Reference initial protocol intensities x₀.
pub const REFERENCE_X0: [f64; REFERENCE_N] = [
    -1.5, -0.8, 0.4, 1.2, -0.6, //
    0.9, -1.1, 0.7, -0.3, 1.5, //
    -0.9, 0.2, -1.3, 1.0, 0.6, //
    -0.4, 0.8, -0.7, 1.3, -0.2,
];

pub const REFERENCE_DT: f64 = 0.01;
pub const REFERENCE_T_MAX: f64 = 15.0;

/// Slack added to `t_max / dt` before flooring so that an exact multiple
/// which rounds just below an integer still counts its final step.
const STEP_COUNT_SLACK: f64 = 1e-9;

/// Largest number of f64 entries a trajectory buffer may hold.
pub const MAX_TRAJECTORY_LEN: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Immutable parameter set for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of nodes in the ring.
    pub n: usize,

    /// Per-node damping coefficients (length `n`).
    pub theta: Vec<f64>,

    /// Initial state vector (length `n`).
    pub x0: Vec<f64>,

    /// Euler step size. Default: 0.01.
    pub dt: f64,

    /// Simulated horizon, inclusive. Default: 15.0.
    pub t_max: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n: REFERENCE_N,
            theta: REFERENCE_THETA.to_vec(),
            x0: REFERENCE_X0.to_vec(),
            dt: REFERENCE_DT,
            t_max: REFERENCE_T_MAX,
        }
    }
}

impl SimulationConfig {
    /// Build a parameter set; the node count is taken from `theta`.
    pub fn new(theta: Vec<f64>, x0: Vec<f64>, dt: f64, t_max: f64) -> Self {
        Self {
            n: theta.len(),
            theta,
            x0,
            dt,
            t_max,
        }
    }

    /// The literal N = 20 reference configuration.
    pub fn reference() -> Self {
        Self::default()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> VnaeResult<()> {
        if self.n < 1 {
            return Err(VnaeError::InvalidConfiguration(format!(
                "n must be >= 1, got {}",
                self.n
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(VnaeError::InvalidConfiguration(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.t_max.is_finite() || self.t_max < 0.0 {
            return Err(VnaeError::InvalidConfiguration(format!(
                "t_max must be finite and >= 0, got {}",
                self.t_max
            )));
        }
        if self.theta.len() != self.n {
            return Err(VnaeError::mismatch("theta", self.n, self.theta.len()));
        }
        if self.x0.len() != self.n {
            return Err(VnaeError::mismatch("x0", self.n, self.x0.len()));
        }
        let n_steps = self.checked_n_steps().ok_or_else(|| {
            VnaeError::InvalidConfiguration(format!(
                "t_max / dt = {} is not a representable step count",
                self.t_max / self.dt
            ))
        })?;
        match n_steps.checked_mul(self.n) {
            Some(len) if len <= MAX_TRAJECTORY_LEN => Ok(()),
            _ => Err(VnaeError::InvalidConfiguration(format!(
                "trajectory of {n_steps} steps x {} nodes does not fit in memory",
                self.n
            ))),
        }
    }

    /// Step count, or `None` when `t_max / dt` is non-finite or overflows `usize`.
    pub fn checked_n_steps(&self) -> Option<usize> {
        let steps = (self.t_max / self.dt + STEP_COUNT_SLACK).floor();
        // usize::MAX as f64 rounds up to 2^64, which itself is out of range
        if !steps.is_finite() || steps < 0.0 || steps >= usize::MAX as f64 {
            return None;
        }
        (steps as usize).checked_add(1)
    }

    /// Number of stored states, initial condition included.
    ///
    /// `floor(t_max / dt) + 1`, so `time_seq` runs from 0 to `t_max`
    /// inclusive whenever `t_max` is a multiple of `dt`.
    ///
    /// Saturates at `usize::MAX` for configurations `validate()` rejects.
    pub fn n_steps(&self) -> usize {
        self.checked_n_steps().unwrap_or(usize::MAX)
    }

    /// Evenly spaced time axis `t · dt`, same length as the trajectory.
    pub fn time_seq(&self) -> Vec<f64> {
        (0..self.n_steps()).map(|t| t as f64 * self.dt).collect()
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> VnaeResult<Self> {
        serde_json::from_str(json).map_err(|e| VnaeError::Config(format!("JSON parse error: {e}")))
    }

    /// Serialise to JSON string.
    pub fn to_json(&self) -> VnaeResult<String> {
        serde_json::to_string(self).map_err(|e| VnaeError::Config(format!("JSON encode error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationConfig {
        SimulationConfig::new(vec![1.0; 3], vec![1.0, 0.0, 0.0], 0.1, 0.1)
    }

    #[test]
    fn test_reference_is_valid() {
        let cfg = SimulationConfig::reference();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.n, 20);
        assert_eq!(cfg.theta.len(), 20);
        assert_eq!(cfg.x0.len(), 20);
    }

    #[test]
    fn test_reference_theta_positive() {
        assert!(REFERENCE_THETA.iter().all(|&th| th > 0.0));
    }

    #[test]
    fn test_reference_n_steps() {
        let cfg = SimulationConfig::reference();
        assert_eq!(cfg.n_steps(), 1501);
        let ts = cfg.time_seq();
        assert_eq!(ts.len(), 1501);
        assert_eq!(ts[0], 0.0);
        assert!((ts[1500] - 15.0).abs() < 1e-9, "last time = {}", ts[1500]);
    }

    #[test]
    fn test_small_n_steps() {
        assert_eq!(small().n_steps(), 2);
        assert_eq!(small().time_seq(), vec![0.0, 0.1]);
    }

    #[test]
    fn test_non_multiple_horizon_floors() {
        let mut cfg = small();
        cfg.t_max = 0.25;
        assert_eq!(cfg.n_steps(), 3);
        let last = *cfg.time_seq().last().unwrap();
        assert!(last <= cfg.t_max + cfg.dt);
    }

    #[test]
    fn test_zero_horizon_single_step() {
        let mut cfg = small();
        cfg.t_max = 0.0;
        assert_eq!(cfg.n_steps(), 1);
        assert_eq!(cfg.time_seq(), vec![0.0]);
    }

    #[test]
    fn test_unrepresentable_step_count_rejected() {
        // t_max / dt overflows to +inf
        let cfg = SimulationConfig::new(vec![1.0; 3], vec![1.0, 0.0, 0.0], 1e-300, 1e300);
        assert!(matches!(
            cfg.validate(),
            Err(VnaeError::InvalidConfiguration(_))
        ));
        assert_eq!(cfg.checked_n_steps(), None);
        assert_eq!(cfg.n_steps(), usize::MAX);

        // Finite, but beyond usize::MAX
        let cfg = SimulationConfig::new(vec![1.0; 3], vec![1.0, 0.0, 0.0], 1e-10, 1e10);
        assert!(matches!(
            cfg.validate(),
            Err(VnaeError::InvalidConfiguration(_))
        ));
        assert_eq!(cfg.checked_n_steps(), None);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_trajectory_rejected() {
        // Step count fits in usize, buffer of steps x nodes does not.
        let cfg = SimulationConfig::new(vec![1.0; 3], vec![1.0, 0.0, 0.0], 1.0, 1e18);
        assert!(cfg.checked_n_steps().is_some());
        assert!(matches!(
            cfg.validate(),
            Err(VnaeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_nodes_rejected() {
        let cfg = SimulationConfig::new(vec![], vec![], 0.1, 1.0);
        assert!(matches!(
            cfg.validate(),
            Err(VnaeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_non_positive_dt_rejected() {
        for dt in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            let mut cfg = small();
            cfg.dt = dt;
            assert!(
                matches!(cfg.validate(), Err(VnaeError::InvalidConfiguration(_))),
                "dt={dt} should be rejected"
            );
        }
    }

    #[test]
    fn test_negative_horizon_rejected() {
        let mut cfg = small();
        cfg.t_max = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(VnaeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_theta_length_mismatch() {
        let mut cfg = small();
        cfg.theta.push(1.0);
        assert_eq!(
            cfg.validate(),
            Err(VnaeError::DimensionMismatch {
                what: "theta",
                expected: 3,
                got: 4
            })
        );
    }

    #[test]
    fn test_x0_length_mismatch() {
        let mut cfg = small();
        cfg.x0.pop();
        assert_eq!(
            cfg.validate(),
            Err(VnaeError::DimensionMismatch {
                what: "x0",
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"n":3,"theta":[1.0,1.0,1.0],"x0":[1.0,0.0,0.0],"dt":0.1,"t_max":0.1}"#;
        let cfg = SimulationConfig::from_json(json).unwrap();
        assert_eq!(cfg, small());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SimulationConfig::from_json("{not json"),
            Err(VnaeError::Config(_))
        ));
    }

    #[test]
    fn test_json_round_trip_reference() {
        let cfg = SimulationConfig::reference();
        let back = SimulationConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
