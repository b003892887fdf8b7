// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Euler Stability Analysis
// ─────────────────────────────────────────────────────────────────────
//! Spectrum of the system matrix A = L + diag(θ) and the explicit-Euler
//! stability bound derived from it.
//!
//! With A symmetric, one Euler step is x ← (I - dt·A) x, so
//!   ||x[t]|| ≤ ρ ||x[t-1]||,   ρ = max_k |1 - dt·λ_k|
//! and the step is non-expansive iff ρ ≤ 1. When A is positive
//! semidefinite (λ_min ≥ 0, e.g. θ ≥ 0) that is dt ≤ 2 / λ_max; a negative
//! eigenvalue makes the flow itself grow and no dt is stable.
//!
//! Two estimators:
//!   - Jacobi: exact eigenvalues via a pure-Rust cyclic Jacobi solver, O(N³)
//!   - Gershgorin: enclosing interval of the spectrum, O(N²); conservative

use serde::{Deserialize, Serialize};

use vnae_types::{VnaeError, VnaeResult};

/// Slack on ρ ≤ 1 so a round-off-level negative zero eigenvalue of the
/// plain Laplacian still counts as neutral.
const STABILITY_TOL: f64 = 1e-12;

/// How the spectrum bounds in a [`StabilityReport`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectrumMethod {
    /// Exact eigenvalues (cyclic Jacobi).
    Jacobi,
    /// Gershgorin disc enclosure; λ bounds and ρ are upper estimates.
    Gershgorin,
}

impl SpectrumMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jacobi => "jacobi",
            Self::Gershgorin => "gershgorin",
        }
    }
}

/// Outcome of the stability check for one (L, θ, dt) triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Smallest eigenvalue of L + diag(θ) (slowest decay rate), or its lower bound.
    pub lambda_min: f64,
    /// Largest eigenvalue of L + diag(θ), or its upper bound.
    pub lambda_max: f64,
    /// Largest non-expansive dt: 2 / λ_max; 0 when λ_min < 0;
    /// infinite when the spectrum is zero.
    pub max_stable_dt: f64,
    /// Per-step norm amplification bound max |1 - dt·λ|.
    pub spectral_radius: f64,
    /// spectral_radius ≤ 1.
    pub stable: bool,
    pub method: SpectrumMethod,
}

impl StabilityReport {
    fn from_bounds(lambda_min: f64, lambda_max: f64, dt: f64, method: SpectrumMethod) -> Self {
        // |1 - dt·λ| is convex in λ, so its maximum sits at an endpoint.
        let spectral_radius = (1.0 - dt * lambda_min)
            .abs()
            .max((1.0 - dt * lambda_max).abs());
        let max_stable_dt = if lambda_min < -STABILITY_TOL {
            0.0
        } else if lambda_max > 0.0 {
            2.0 / lambda_max
        } else {
            f64::INFINITY
        };
        Self {
            lambda_min,
            lambda_max,
            max_stable_dt,
            spectral_radius,
            stable: spectral_radius <= 1.0 + STABILITY_TOL,
            method,
        }
    }
}

fn system_matrix(laplacian: &[f64], theta: &[f64]) -> VnaeResult<Vec<f64>> {
    let n = theta.len();
    if n == 0 {
        return Err(VnaeError::InvalidConfiguration(
            "stability analysis needs at least one node".to_string(),
        ));
    }
    if laplacian.len() != n * n {
        return Err(VnaeError::mismatch("laplacian", n * n, laplacian.len()));
    }
    let mut a = laplacian.to_vec();
    for (i, &th) in theta.iter().enumerate() {
        a[i * n + i] += th;
    }
    Ok(a)
}

/// Ascending eigenvalues of `laplacian + diag(theta)`.
///
/// `laplacian` is n×n row-major and assumed symmetric.
pub fn system_eigenvalues(laplacian: &[f64], theta: &[f64]) -> VnaeResult<Vec<f64>> {
    let n = theta.len();
    let mut a = system_matrix(laplacian, theta)?;
    let mut eigvals = vec![0.0; n];
    jacobi_eigenvalues(&mut a, n, &mut eigvals);
    eigvals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(eigvals)
}

/// Interval [lo, hi] containing every eigenvalue of `laplacian + diag(theta)`.
///
/// Union of Gershgorin discs: center A_ii, radius Σ_{j≠i} |A_ij|.
/// For the ring this is [min θ, 4 + max θ].
pub fn gershgorin_bounds(laplacian: &[f64], theta: &[f64]) -> VnaeResult<(f64, f64)> {
    let n = theta.len();
    let a = system_matrix(laplacian, theta)?;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (i, row) in a.chunks_exact(n).enumerate() {
        let radius: f64 = row
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, v)| v.abs())
            .sum();
        lo = lo.min(row[i] - radius);
        hi = hi.max(row[i] + radius);
    }
    Ok((lo, hi))
}

/// Exact check: is forward Euler with step `dt` non-expansive for (L, θ)?
pub fn analyse_stability(laplacian: &[f64], theta: &[f64], dt: f64) -> VnaeResult<StabilityReport> {
    let eigvals = system_eigenvalues(laplacian, theta)?;
    let (Some(&lambda_min), Some(&lambda_max)) = (eigvals.first(), eigvals.last()) else {
        return Err(VnaeError::InvalidConfiguration(
            "stability analysis needs at least one node".to_string(),
        ));
    };
    Ok(StabilityReport::from_bounds(
        lambda_min,
        lambda_max,
        dt,
        SpectrumMethod::Jacobi,
    ))
}

/// Cheap conservative check from the Gershgorin interval, same cost as one
/// dense step. `stable == true` is guaranteed; `false` may be pessimistic.
pub fn estimate_stability(laplacian: &[f64], theta: &[f64], dt: f64) -> VnaeResult<StabilityReport> {
    let (lo, hi) = gershgorin_bounds(laplacian, theta)?;
    Ok(StabilityReport::from_bounds(
        lo,
        hi,
        dt,
        SpectrumMethod::Gershgorin,
    ))
}

/// Cyclic Jacobi eigenvalues for a symmetric n×n matrix.
///
/// `a` is n×n row-major and is destroyed (the diagonal converges to the
/// eigenvalues). `eigvals_out` receives them unsorted.
fn jacobi_eigenvalues(a: &mut [f64], n: usize, eigvals_out: &mut [f64]) {
    const MAX_SWEEPS: usize = 50;
    const TOL: f64 = 1e-14;

    for sweep in 0..MAX_SWEEPS {
        let mut max_off = 0.0f64;
        for p in 0..n {
            for q in (p + 1)..n {
                max_off = max_off.max(a[p * n + q].abs());
            }
        }
        if max_off < TOL {
            break;
        }

        // Skip tiny rotations during the first sweeps
        let threshold = if sweep < 4 {
            0.2 * max_off / (n * n) as f64
        } else {
            0.0
        };

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() < threshold || apq == 0.0 {
                    continue;
                }

                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let diff = aqq - app;

                let t = if diff.abs() < 1e-300 {
                    apq.signum()
                } else {
                    let tau = diff / (2.0 * apq);
                    // Smaller root
                    if tau >= 0.0 {
                        1.0 / (tau + (1.0 + tau * tau).sqrt())
                    } else {
                        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                    }
                };

                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;
                let tau_rot = s / (1.0 + c);

                a[p * n + p] -= t * apq;
                a[q * n + q] += t * apq;
                a[p * n + q] = 0.0;
                a[q * n + p] = 0.0;

                for r in 0..n {
                    if r == p || r == q {
                        continue;
                    }
                    let arp = a[r * n + p];
                    let arq = a[r * n + q];
                    a[r * n + p] = arp - s * (arq + tau_rot * arp);
                    a[p * n + r] = a[r * n + p];
                    a[r * n + q] = arq + s * (arp - tau_rot * arq);
                    a[q * n + r] = a[r * n + q];
                }
            }
        }
    }

    for (i, out) in eigvals_out.iter_mut().enumerate().take(n) {
        *out = a[i * n + i];
    }
}
