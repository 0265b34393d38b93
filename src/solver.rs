//! Eigenvalue solve of the assembled system.
//!
//! The quadratic problem `(G1 + i K F1 + K² H1) a = 0` is linearized with
//! `λ = i / K` into the companion pencil
//!
//! ```text
//! M1 = [[F1, -I], [-H1, 0]]      M2 = [[G1, 0], [0, I]]      M1 v = λ M2 v
//! ```
//!
//! Roots at infinite `K` (rows of H1 that only hold constraints) map to
//! `λ = 0` instead of blowing up. `M2` is block diagonal, so the pencil is
//! reduced to the standard problem `M2⁻¹ M1`, balanced, and handed to faer's
//! dense eigenvalue routine.
//!
//! Evanescent roots come in quadruples `±a ± ib`; the QR iteration needs
//! exceptional shifts to deflate them, which faer's real Schur provides.

use std::cmp::Ordering;

use log::trace;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::assembly::SystemMatrices;
use crate::error::SolveError;
use crate::types::IMAG_RATIO_TOL;

/// NaN placeholder for rejected roots.
pub const NAN_ROOT: Complex64 = Complex64::new(f64::NAN, f64::NAN);

/// Companion matrices `(M1, M2)` of the linearized pencil.
pub fn companion_matrices(sys: &SystemMatrices) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = sys.num_nodes();
    let eye = DMatrix::<f64>::identity(n, n);

    let mut m1 = DMatrix::<f64>::zeros(2 * n, 2 * n);
    m1.view_mut((0, 0), (n, n)).copy_from(&sys.f1);
    m1.view_mut((0, n), (n, n)).copy_from(&(-&eye));
    m1.view_mut((n, 0), (n, n)).copy_from(&(-&sys.h1));

    let mut m2 = DMatrix::<f64>::zeros(2 * n, 2 * n);
    m2.view_mut((0, 0), (n, n)).copy_from(&sys.g1);
    m2.view_mut((n, n), (n, n)).copy_from(&eye);

    (m1, m2)
}

/// `M2⁻¹ M1 = [[G1⁻¹ F1, -G1⁻¹], [-H1, 0]]`.
///
/// Fails when G1 is singular, which happens when `omega` sits exactly on a
/// cutoff frequency (a root at `K = 0`).
pub fn reduced_companion(sys: &SystemMatrices, omega: f64) -> Result<DMatrix<f64>, SolveError> {
    let n = sys.num_nodes();
    let g1_inv = sys
        .g1
        .clone()
        .lu()
        .try_inverse()
        .ok_or(SolveError::SingularSystem { omega })?;

    let mut a = DMatrix::<f64>::zeros(2 * n, 2 * n);
    a.view_mut((0, 0), (n, n)).copy_from(&(&g1_inv * &sys.f1));
    a.view_mut((0, n), (n, n)).copy_from(&(-&g1_inv));
    a.view_mut((n, 0), (n, n)).copy_from(&(-&sys.h1));
    Ok(a)
}

/// Diagonal similarity scaling by powers of two that evens out row and
/// column norms. Eigenvalues are unchanged and no rounding is introduced.
pub fn balance(a: &mut DMatrix<f64>) {
    const RADIX: f64 = 2.0;
    let n = a.nrows();
    let mut converged = false;
    while !converged {
        converged = true;
        for i in 0..n {
            let mut c = 0.0;
            let mut r = 0.0;
            for j in 0..n {
                if j != i {
                    c += a[(j, i)].abs();
                    r += a[(i, j)].abs();
                }
            }
            if c == 0.0 || r == 0.0 {
                continue;
            }

            let s = c + r;
            let mut f = 1.0;
            let mut g = r / RADIX;
            while c < g {
                f *= RADIX;
                c *= RADIX * RADIX;
            }
            g = r * RADIX;
            while c > g {
                f /= RADIX;
                c /= RADIX * RADIX;
            }

            if (c + r) / f < 0.95 * s {
                converged = false;
                a.row_mut(i).scale_mut(1.0 / f);
                a.column_mut(i).scale_mut(f);
            }
        }
    }
}

/// All `2 * nNodes` eigenvalues `λ` of the companion pencil.
pub fn companion_eigenvalues(
    sys: &SystemMatrices,
    omega: f64,
) -> Result<Vec<Complex64>, SolveError> {
    let mut a = reduced_companion(sys, omega)?;
    if a.iter().any(|v| !v.is_finite()) {
        return Err(SolveError::NonFinite { omega });
    }
    balance(&mut a);

    let dense = faer::Mat::<f64>::from_fn(a.nrows(), a.ncols(), |i, j| a[(i, j)]);
    let eigenvalues: Vec<Complex64> = dense
        .eigenvalues()
        .map_err(|_| SolveError::NoConvergence { omega })?;

    if eigenvalues.iter().any(|l| !l.re.is_finite() || !l.im.is_finite()) {
        return Err(SolveError::NonFinite { omega });
    }
    Ok(eigenvalues)
}

/// `k = i / λ * ka`; a zero eigenvalue gives NaN.
#[inline]
pub fn eigenvalue_to_wavenumber(lambda: Complex64, ka: f64) -> Complex64 {
    if lambda.re == 0.0 && lambda.im == 0.0 {
        return NAN_ROOT;
    }
    Complex64::i() / lambda * ka
}

/// Replace evanescent or degenerate roots with NaN.
///
/// A root is kept only if its real part is non-zero and
/// `|Im k| / |Re k| <= IMAG_RATIO_TOL`.
#[inline]
pub fn reject_nonphysical(k: Complex64) -> Complex64 {
    if k.is_nan() || k.re == 0.0 || k.im.abs() / k.re.abs() > IMAG_RATIO_TOL {
        NAN_ROOT
    } else {
        k
    }
}

/// Ascending by modulus, ties by argument, NaN last.
pub fn candidate_order(a: &Complex64, b: &Complex64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a
            .norm()
            .total_cmp(&b.norm())
            .then_with(|| a.arg().total_cmp(&b.arg())),
    }
}

/// Sort wavenumber candidates in place with [`candidate_order`].
pub fn sort_candidates(candidates: &mut [Complex64]) {
    candidates.sort_by(candidate_order);
}

/// Filtered and sorted wavenumbers (rad/m) of one frequency step,
/// truncated to `nNodes` entries.
pub fn solve_wavenumbers(sys: &SystemMatrices, omega: f64) -> Result<Vec<Complex64>, SolveError> {
    let eigenvalues = companion_eigenvalues(sys, omega)?;

    let mut candidates: Vec<Complex64> = eigenvalues
        .into_iter()
        .map(|lambda| reject_nonphysical(eigenvalue_to_wavenumber(lambda, sys.ka)))
        .collect();
    sort_candidates(&mut candidates);

    let kept = candidates.iter().filter(|k| !k.is_nan()).count();
    trace!("omega={:.3e}: {} of {} roots kept", omega, kept, candidates.len());

    candidates.truncate(sys.num_nodes());
    Ok(candidates)
}
