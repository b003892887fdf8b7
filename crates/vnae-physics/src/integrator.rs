// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Euler Integrator
// ─────────────────────────────────────────────────────────────────────
//! Forward-Euler integrator for the damped ring-diffusion dynamics:
//!
//!   dx/dt = -L x - Θ x        (Θ = diag(θ))
//!   x[t]  = x[t-1] + dt · dx
//!
//! The coupling matrix and the derivative scratch are allocated once;
//! the step loop only does arithmetic. No clamping: NaN/Inf propagate.

use serde::{Deserialize, Serialize};

use vnae_types::{SimulationConfig, VnaeError, VnaeResult, MAX_TRAJECTORY_LEN};

use crate::params::{build_ring_laplacian, mat_vec};

/// Time-indexed state matrix, n_steps × n_nodes, row-major.
///
/// Always holds at least one state of at least one node; deserialisation
/// goes through the same shape check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrajectory")]
pub struct Trajectory {
    n_nodes: usize,
    n_steps: usize,
    data: Vec<f64>,
}

/// Unchecked wire form of [`Trajectory`].
#[derive(Deserialize)]
struct RawTrajectory {
    n_nodes: usize,
    n_steps: usize,
    data: Vec<f64>,
}

impl TryFrom<RawTrajectory> for Trajectory {
    type Error = VnaeError;

    fn try_from(raw: RawTrajectory) -> VnaeResult<Self> {
        if raw.n_nodes == 0 || raw.n_steps == 0 {
            return Err(VnaeError::InvalidConfiguration(format!(
                "trajectory needs at least one node and one step, got {} x {}",
                raw.n_steps, raw.n_nodes
            )));
        }
        let expected = buffer_len(raw.n_steps, raw.n_nodes)?;
        if raw.data.len() != expected {
            return Err(VnaeError::mismatch("trajectory data", expected, raw.data.len()));
        }
        Ok(Self {
            n_nodes: raw.n_nodes,
            n_steps: raw.n_steps,
            data: raw.data,
        })
    }
}

fn buffer_len(n_steps: usize, n_nodes: usize) -> VnaeResult<usize> {
    match n_steps.checked_mul(n_nodes) {
        Some(len) if len <= MAX_TRAJECTORY_LEN => Ok(len),
        _ => Err(VnaeError::InvalidConfiguration(format!(
            "trajectory of {n_steps} steps x {n_nodes} nodes does not fit in memory"
        ))),
    }
}

impl Trajectory {
    fn with_initial(x0: &[f64], n_steps: usize) -> VnaeResult<Self> {
        let n_nodes = x0.len();
        let mut data = vec![0.0; buffer_len(n_steps, n_nodes)?];
        data[..n_nodes].copy_from_slice(x0);
        Ok(Self {
            n_nodes,
            n_steps,
            data,
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// State vector X[t]. Panics if `t >= n_steps`.
    pub fn state(&self, t: usize) -> &[f64] {
        &self.data[t * self.n_nodes..(t + 1) * self.n_nodes]
    }

    /// Iterate over X[0], X[1], ...
    pub fn states(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_nodes.max(1))
    }

    /// Time series of a single node (one trajectory line).
    pub fn node_series(&self, node: usize) -> Vec<f64> {
        self.states().map(|x| x[node]).collect()
    }

    pub fn initial_state(&self) -> &[f64] {
        self.state(0)
    }

    pub fn final_state(&self) -> &[f64] {
        self.state(self.n_steps - 1)
    }

    /// Raw row-major buffer.
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }

    /// Copy out as one `Vec` per time step.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.states().map(<[f64]>::to_vec).collect()
    }

    /// True if no entry is NaN or Inf.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// Explicit Euler stepper for `dx/dt = -L x - θ ⊙ x`.
pub struct EulerIntegrator {
    laplacian: Vec<f64>,
    theta: Vec<f64>,
    dt: f64,
    n: usize,
    // Pre-allocated scratch
    lx: Vec<f64>,
    dx: Vec<f64>,
}

impl EulerIntegrator {
    /// Build from a parameter set; validates it and constructs the ring Laplacian.
    pub fn new(config: &SimulationConfig) -> VnaeResult<Self> {
        config.validate()?;
        let laplacian = build_ring_laplacian(config.n)?;
        Self::with_params(laplacian, config.theta.clone(), config.dt)
    }

    /// Build from an explicit n×n coupling matrix (row-major) and damping vector.
    pub fn with_params(laplacian: Vec<f64>, theta: Vec<f64>, dt: f64) -> VnaeResult<Self> {
        let n = theta.len();
        if n == 0 {
            return Err(VnaeError::InvalidConfiguration(
                "theta must have at least one node".to_string(),
            ));
        }
        if laplacian.len() != n * n {
            return Err(VnaeError::mismatch("laplacian", n * n, laplacian.len()));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(VnaeError::InvalidConfiguration(format!(
                "dt must be finite and > 0, got {dt}"
            )));
        }
        Ok(Self {
            laplacian,
            theta,
            dt,
            n,
            lx: vec![0.0; n],
            dx: vec![0.0; n],
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.n
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn laplacian(&self) -> &[f64] {
        &self.laplacian
    }

    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Right-hand side: `dx = -(L · x) - θ ⊙ x`.
    pub fn derivative(&mut self, x: &[f64], dx: &mut [f64]) -> VnaeResult<()> {
        self.check_len("state", x.len())?;
        self.check_len("derivative", dx.len())?;
        mat_vec(&self.laplacian, x, &mut self.lx);
        for i in 0..self.n {
            dx[i] = -self.lx[i] - self.theta[i] * x[i];
        }
        Ok(())
    }

    /// One Euler step: `x_next = x_prev + dt · dx(x_prev)`.
    pub fn step(&mut self, x_prev: &[f64], x_next: &mut [f64]) -> VnaeResult<()> {
        self.check_len("next state", x_next.len())?;
        let mut dx = std::mem::take(&mut self.dx);
        let res = self.derivative(x_prev, &mut dx);
        if res.is_ok() {
            for i in 0..self.n {
                x_next[i] = x_prev[i] + self.dt * dx[i];
            }
        }
        self.dx = dx;
        res
    }

    /// Integrate from `x0`, storing `n_steps` states (X[0] = x0).
    ///
    /// `n_steps == 0` still stores the initial condition.
    pub fn run(&mut self, x0: &[f64], n_steps: usize) -> VnaeResult<Trajectory> {
        self.check_len("x0", x0.len())?;
        let n = self.n;
        let mut traj = Trajectory::with_initial(x0, n_steps.max(1))?;
        let mut warned = !x0.iter().all(|v| v.is_finite());

        for t in 1..traj.n_steps {
            let (done, rest) = traj.data.split_at_mut(t * n);
            let x_prev = &done[(t - 1) * n..];
            let x_next = &mut rest[..n];
            self.step(x_prev, x_next)?;

            if !warned && !x_next.iter().all(|v| v.is_finite()) {
                log::warn!(
                    "non-finite state at step {t} (t = {:.4}); dt = {} may exceed the stability bound",
                    t as f64 * self.dt,
                    self.dt
                );
                warned = true;
            }
        }

        Ok(traj)
    }

    fn check_len(&self, what: &'static str, got: usize) -> VnaeResult<()> {
        if got != self.n {
            return Err(VnaeError::mismatch(what, self.n, got));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_node() -> SimulationConfig {
        SimulationConfig::new(vec![1.0; 3], vec![1.0, 0.0, 0.0], 0.1, 0.1)
    }

    #[test]
    fn test_three_node_single_step() {
        let cfg = three_node();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        assert_eq!(traj.n_steps(), 2);
        assert_eq!(traj.state(0), &[1.0, 0.0, 0.0]);
        assert_eq!(traj.state(1), &[0.7, 0.1, 0.1]);
    }

    #[test]
    fn test_derivative_three_node() {
        let cfg = three_node();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let mut dx = [0.0; 3];
        integrator.derivative(&cfg.x0, &mut dx).unwrap();
        assert_eq!(dx, [-3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_initial_condition_preserved() {
        let cfg = SimulationConfig::reference();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        assert_eq!(traj.initial_state(), cfg.x0.as_slice());
    }

    #[test]
    fn test_trajectory_length_matches_time_axis() {
        let cfg = SimulationConfig::reference();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        assert_eq!(traj.n_steps(), cfg.time_seq().len());
        assert_eq!(traj.n_steps(), 1501);
        assert_eq!(traj.as_flat().len(), 1501 * 20);
        assert_eq!(traj.to_rows().len(), 1501);
    }

    #[test]
    fn test_bit_identical_reruns() {
        let cfg = SimulationConfig::reference();
        let a = EulerIntegrator::new(&cfg)
            .unwrap()
            .run(&cfg.x0, cfg.n_steps())
            .unwrap();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let b = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        // Reusing the same integrator must not leak scratch state either.
        let c = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        let bits = |t: &Trajectory| t.as_flat().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(bits(&b), bits(&c));
    }

    #[test]
    fn test_euler_consistency_every_step() {
        let cfg = SimulationConfig::reference();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        let l = integrator.laplacian().to_vec();
        let n = cfg.n;

        for t in 1..traj.n_steps() {
            let prev = traj.state(t - 1);
            let next = traj.state(t);
            for i in 0..n {
                let lx: f64 = (0..n).map(|j| l[i * n + j] * prev[j]).sum();
                let expected = cfg.dt * (-lx - cfg.theta[i] * prev[i]);
                let got = next[i] - prev[i];
                assert!(
                    (got - expected).abs() <= 1e-12 * expected.abs() + 1e-15,
                    "step {t} node {i}: {got} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn test_reference_run_finite() {
        let cfg = SimulationConfig::reference();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        assert!(traj.is_finite());
    }

    #[test]
    fn test_node_series() {
        let cfg = three_node();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        assert_eq!(traj.node_series(0), vec![1.0, 0.7]);
        assert_eq!(traj.node_series(2), vec![0.0, 0.1]);
        assert_eq!(traj.final_state(), &[0.7, 0.1, 0.1]);
    }

    #[test]
    fn test_zero_steps_keeps_initial_condition() {
        let cfg = three_node();
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, 0).unwrap();
        assert_eq!(traj.n_steps(), 1);
        assert_eq!(traj.final_state(), cfg.x0.as_slice());
    }

    #[test]
    fn test_zero_state_stays_zero() {
        let mut integrator =
            EulerIntegrator::with_params(build_ring_laplacian(5).unwrap(), vec![0.5; 5], 0.01)
                .unwrap();
        let traj = integrator.run(&[0.0; 5], 100).unwrap();
        assert!(traj.as_flat().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unstable_dt_propagates_without_error() {
        // dt far beyond 2/λ_max: the scheme blows up but the run still succeeds.
        let cfg = SimulationConfig {
            dt: 5.0,
            t_max: 5000.0,
            ..SimulationConfig::reference()
        };
        let mut integrator = EulerIntegrator::new(&cfg).unwrap();
        let traj = integrator.run(&cfg.x0, cfg.n_steps()).unwrap();
        assert_eq!(traj.n_steps(), 1001);
        assert!(!traj.is_finite());
    }

    #[test]
    fn test_oversized_run_rejected() {
        let mut integrator = EulerIntegrator::new(&three_node()).unwrap();
        assert!(matches!(
            integrator.run(&[1.0, 0.0, 0.0], usize::MAX),
            Err(VnaeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_trajectory_json_round_trip() {
        let cfg = three_node();
        let traj = EulerIntegrator::new(&cfg)
            .unwrap()
            .run(&cfg.x0, cfg.n_steps())
            .unwrap();
        let json = serde_json::to_string(&traj).unwrap();
        let back: Trajectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, traj);
    }

    #[test]
    fn test_inconsistent_trajectory_json_rejected() {
        let short = r#"{"n_nodes":3,"n_steps":2,"data":[1.0,0.0,0.0]}"#;
        assert!(serde_json::from_str::<Trajectory>(short).is_err());
        let empty = r#"{"n_nodes":3,"n_steps":0,"data":[]}"#;
        assert!(serde_json::from_str::<Trajectory>(empty).is_err());
        let overflow = format!(r#"{{"n_nodes":4,"n_steps":{},"data":[]}}"#, usize::MAX);
        assert!(serde_json::from_str::<Trajectory>(&overflow).is_err());
    }

    #[test]
    fn test_x0_length_mismatch_rejected() {
        let mut integrator = EulerIntegrator::new(&three_node()).unwrap();
        assert_eq!(
            integrator.run(&[1.0, 2.0], 3),
            Err(VnaeError::mismatch("x0", 3, 2))
        );
    }

    #[test]
    fn test_laplacian_size_mismatch_rejected() {
        let res = EulerIntegrator::with_params(vec![0.0; 8], vec![1.0; 3], 0.1);
        assert!(matches!(res, Err(VnaeError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = three_node();
        cfg.dt = 0.0;
        assert!(matches!(
            EulerIntegrator::new(&cfg),
            Err(VnaeError::InvalidConfiguration(_))
        ));
    }
}
