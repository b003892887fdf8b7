// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Ring Coupling Structure
// ─────────────────────────────────────────────────────────────────────
//! Graph Laplacian for the ring coordination topology.
//!
//! Every node exchanges with its two ring neighbours:
//!   L_ii = 2,  L_i,(i+1) mod N = -1,  L_i,(i-1+N) mod N = -1
//!
//! Matrices are n×n row-major, `L[i][j]` at index `i * n + j`.

use vnae_types::{VnaeError, VnaeResult, REFERENCE_N};

/// Degree of every node in the ring.
pub const RING_DEGREE: f64 = 2.0;

/// Build the n×n ring Laplacian.
///
/// Entries are written diagonal first, then next neighbour, then previous
/// neighbour. For n < 3 the neighbour indices collide and later writes win:
/// n = 1 gives `[[-1]]`, n = 2 gives `[[2, -1], [-1, 2]]`.
pub fn build_ring_laplacian(n: usize) -> VnaeResult<Vec<f64>> {
    if n == 0 {
        return Err(VnaeError::InvalidConfiguration(
            "ring Laplacian needs at least one node".to_string(),
        ));
    }

    Ok(ring_laplacian(n))
}

/// Ring Laplacian for the N = 20 reference network.
pub fn reference_laplacian() -> Vec<f64> {
    ring_laplacian(REFERENCE_N)
}

fn ring_laplacian(n: usize) -> Vec<f64> {
    let mut l = vec![0.0f64; n * n];
    for i in 0..n {
        l[i * n + i] = RING_DEGREE;
        // Next neighbour (ring)
        l[i * n + (i + 1) % n] = -1.0;
        // Previous neighbour (ring)
        l[i * n + (i + n - 1) % n] = -1.0;
    }
    l
}

/// Dense row-major matrix-vector product `out = m · x`.
///
/// `m` must be `x.len() × x.len()`; `out` must have the same length as `x`.
#[inline]
pub fn mat_vec(m: &[f64], x: &[f64], out: &mut [f64]) {
    let n = x.len();
    for (i, o) in out.iter_mut().enumerate().take(n) {
        let row = &m[i * n..(i + 1) * n];
        *o = row.iter().zip(x).map(|(a, b)| a * b).sum();
    }
}
