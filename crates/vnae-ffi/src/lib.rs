// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — VNAE Ring Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the VNAE ring kernel.
//!
//! The Rust side stops at the numeric products; plotting stays in
//! Python (matplotlib). `simulate()` returns plain lists so they can be
//! handed straight to `np.asarray`.
//!
//! # FFI Safety
//!
//! - Every `VnaeError` surfaces as `ValueError`.
//! - All config validated before storage (`SimulationConfig::validate()`).
//!
//! Install: `pip install -e crates/vnae-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! import numpy as np
//! import matplotlib.pyplot as plt
//! from vnae_kernel import simulate, plot_labels
//!
//! run = simulate()
//! t, X, norm = (np.asarray(run[k]) for k in ("time_seq", "trajectory", "state_norm"))
//! labels = plot_labels()
//! fig, (ax1, ax2) = plt.subplots(2, 1, figsize=(10, 10))
//! ax1.plot(t, X, alpha=0.7, linewidth=1.5)
//! ax1.set_title(labels["trajectory_title"])
//! ax2.fill_between(t, norm, color="black", alpha=0.2)
//! ax2.plot(t, norm, color="black", linewidth=2)
//! ax2.set_title(labels["norm_title"])
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use vnae_physics::{
    analyse_stability, build_ring_laplacian, EulerIntegrator, NormSummary, StabilityReport,
};
use vnae_types::{SimulationConfig, VnaeError, REFERENCE_DT, REFERENCE_T_MAX};

fn to_py_err(e: VnaeError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn stability_dict<'py>(py: Python<'py>, s: &StabilityReport) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("lambda_min", s.lambda_min)?;
    dict.set_item("lambda_max", s.lambda_max)?;
    dict.set_item("max_stable_dt", s.max_stable_dt)?;
    dict.set_item("spectral_radius", s.spectral_radius)?;
    dict.set_item("stable", s.stable)?;
    dict.set_item("method", s.method.as_str())?;
    Ok(dict)
}

fn summary_dict<'py>(py: Python<'py>, s: &NormSummary) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("initial", s.initial)?;
    dict.set_item("final", s.final_)?;
    dict.set_item("peak", s.peak)?;
    dict.set_item("decay_ratio", s.decay_ratio)?;
    Ok(dict)
}

// ─── PySimulationConfig ─────────────────────────────────────────────

/// Python-visible parameter set. Omitted vectors fall back to the
/// N = 20 reference values.
#[pyclass(name = "SimulationConfig")]
#[derive(Clone)]
struct PySimulationConfig {
    inner: SimulationConfig,
}

#[pymethods]
impl PySimulationConfig {
    #[new]
    #[pyo3(signature = (theta = None, x0 = None, dt = REFERENCE_DT, t_max = REFERENCE_T_MAX))]
    fn new(
        theta: Option<Vec<f64>>,
        x0: Option<Vec<f64>>,
        dt: f64,
        t_max: f64,
    ) -> PyResult<Self> {
        let reference = SimulationConfig::reference();
        let theta = theta.unwrap_or(reference.theta);
        let x0 = x0.unwrap_or(reference.x0);
        let config = SimulationConfig::new(theta, x0, dt, t_max);
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    /// The literal reference configuration.
    #[staticmethod]
    fn reference() -> Self {
        Self {
            inner: SimulationConfig::reference(),
        }
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = SimulationConfig::from_json(json).map_err(to_py_err)?;
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    #[getter]
    fn n(&self) -> usize {
        self.inner.n
    }

    #[getter]
    fn theta(&self) -> Vec<f64> {
        self.inner.theta.clone()
    }

    #[getter]
    fn x0(&self) -> Vec<f64> {
        self.inner.x0.clone()
    }

    #[getter]
    fn dt(&self) -> f64 {
        self.inner.dt
    }

    #[getter]
    fn t_max(&self) -> f64 {
        self.inner.t_max
    }

    #[getter]
    fn n_steps(&self) -> usize {
        self.inner.n_steps()
    }

    fn time_seq(&self) -> Vec<f64> {
        self.inner.time_seq()
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(n={}, dt={}, t_max={}, n_steps={})",
            self.inner.n,
            self.inner.dt,
            self.inner.t_max,
            self.inner.n_steps()
        )
    }
}

// ─── RustEulerIntegrator ────────────────────────────────────────────

/// Forward-Euler ring integrator with a persistent scratch buffer.
#[pyclass(name = "RustEulerIntegrator")]
struct PyEulerIntegrator {
    inner: EulerIntegrator,
}

#[pymethods]
impl PyEulerIntegrator {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PySimulationConfig>) -> PyResult<Self> {
        let config = config.map(|c| c.inner).unwrap_or_default();
        let inner = EulerIntegrator::new(&config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// One Euler step from `x`. Returns the next state.
    fn step(&mut self, x: Vec<f64>) -> PyResult<Vec<f64>> {
        let mut next = vec![0.0; x.len()];
        self.inner.step(&x, &mut next).map_err(to_py_err)?;
        Ok(next)
    }

    /// Right-hand side -(L·x) - θ⊙x.
    fn derivative(&mut self, x: Vec<f64>) -> PyResult<Vec<f64>> {
        let mut dx = vec![0.0; x.len()];
        self.inner.derivative(&x, &mut dx).map_err(to_py_err)?;
        Ok(dx)
    }

    /// Integrate `n_steps` states from `x0`. Returns one list per step.
    fn run(&mut self, x0: Vec<f64>, n_steps: usize) -> PyResult<Vec<Vec<f64>>> {
        let traj = self.inner.run(&x0, n_steps).map_err(to_py_err)?;
        Ok(traj.to_rows())
    }

    #[getter]
    fn n(&self) -> usize {
        self.inner.n_nodes()
    }

    #[getter]
    fn dt(&self) -> f64 {
        self.inner.dt()
    }
}

// ─── Module functions ───────────────────────────────────────────────

/// Run the full pipeline.
///
/// Returns dict with time_seq, trajectory (n_steps rows of n values),
/// state_norm, stability, summary.
#[pyfunction]
#[pyo3(signature = (config = None))]
fn simulate<'py>(
    py: Python<'py>,
    config: Option<PySimulationConfig>,
) -> PyResult<Bound<'py, PyDict>> {
    let config = config.map(|c| c.inner).unwrap_or_default();
    let result = vnae_physics::simulate(&config).map_err(to_py_err)?;
    let dict = PyDict::new(py);
    dict.set_item("time_seq", result.time_seq.clone())?;
    dict.set_item("trajectory", result.trajectory.to_rows())?;
    dict.set_item("state_norm", result.state_norm.clone())?;
    dict.set_item("stability", stability_dict(py, &result.stability)?)?;
    dict.set_item("summary", summary_dict(py, &result.summary())?)?;
    Ok(dict)
}

/// Exact (Jacobi) Euler stability report for a configuration.
#[pyfunction]
#[pyo3(signature = (config = None))]
fn stability<'py>(
    py: Python<'py>,
    config: Option<PySimulationConfig>,
) -> PyResult<Bound<'py, PyDict>> {
    let config = config.map(|c| c.inner).unwrap_or_default();
    config.validate().map_err(to_py_err)?;
    let l = build_ring_laplacian(config.n).map_err(to_py_err)?;
    let report = analyse_stability(&l, &config.theta, config.dt).map_err(to_py_err)?;
    stability_dict(py, &report)
}

/// n×n ring Laplacian as nested lists.
#[pyfunction]
fn ring_laplacian(n: usize) -> PyResult<Vec<Vec<f64>>> {
    let l = build_ring_laplacian(n).map_err(to_py_err)?;
    Ok(l.chunks_exact(n).map(<[f64]>::to_vec).collect())
}

/// Titles and axis labels for the two diagnostic charts.
#[pyfunction]
#[pyo3(signature = (n = vnae_types::REFERENCE_N))]
fn plot_labels(py: Python<'_>, n: usize) -> PyResult<Bound<'_, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item(
        "trajectory_title",
        format!("Asymmetric Coordination under VNAE (N = {n})"),
    )?;
    dict.set_item("trajectory_xlabel", "Time")?;
    dict.set_item("trajectory_ylabel", "Protocol intensity")?;
    dict.set_item("norm_title", "Structural Convergence (Global State Norm)")?;
    dict.set_item("norm_xlabel", "Time")?;
    dict.set_item("norm_ylabel", "||X||")?;
    Ok(dict)
}

// ─── Module Registration ────────────────────────────────────────────

/// VNAE Kernel — Rust ring-diffusion integrator for Director-Class AI.
///
/// - `SimulationConfig` — parameter set
/// - `RustEulerIntegrator` — step-level access
/// - `simulate` — full run: time_seq, trajectory, state_norm
/// - `stability`, `ring_laplacian`, `plot_labels` — helpers
#[pymodule]
fn vnae_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulationConfig>()?;
    m.add_class::<PyEulerIntegrator>()?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(stability, m)?)?;
    m.add_function(wrap_pyfunction!(ring_laplacian, m)?)?;
    m.add_function(wrap_pyfunction!(plot_labels, m)?)?;
    Ok(())
}
