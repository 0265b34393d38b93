//! Rotation of Voigt stiffness tensors.
//!
//! The 4th-order tensor transforms as `C'_ijkl = a_ip a_jq a_kr a_ls C_pqrs`.
//! In Voigt notation this is `C' = M C Mᵀ` with `M` the 6×6 Bond matrix of
//! the direction-cosine matrix `a`.

use crate::types::{Matrix3, Matrix6};

/// Tensor index pairs of the Voigt positions 11, 22, 33, 23, 13, 12.
pub const VOIGT_PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (1, 2), (0, 2), (0, 1)];

/// Voigt position of the tensor index pair `(i, j)`.
pub const VOIGT_INDEX: [[usize; 3]; 3] = [[0, 5, 4], [5, 1, 3], [4, 3, 2]];

/// Direction cosines for `Rz(alpha) * Ry(beta) * Rx(gamma)`.
pub fn direction_cosines(angles: [f64; 3]) -> Matrix3 {
    let [alpha, beta, gamma] = angles;
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let (sg, cg) = gamma.sin_cos();

    let rz = Matrix3::new(ca, -sa, 0.0, sa, ca, 0.0, 0.0, 0.0, 1.0);
    let ry = Matrix3::new(cb, 0.0, sb, 0.0, 1.0, 0.0, -sb, 0.0, cb);
    let rx = Matrix3::new(1.0, 0.0, 0.0, 0.0, cg, -sg, 0.0, sg, cg);

    rz * ry * rx
}

/// Bond stress-transformation matrix for direction cosines `a`.
pub fn bond_matrix(a: &Matrix3) -> Matrix6 {
    let mut m = Matrix6::zeros();
    for (row, &(i, j)) in VOIGT_PAIRS.iter().enumerate() {
        for (col, &(k, l)) in VOIGT_PAIRS.iter().enumerate() {
            m[(row, col)] = if k == l {
                a[(i, k)] * a[(j, l)]
            } else {
                a[(i, k)] * a[(j, l)] + a[(i, l)] * a[(j, k)]
            };
        }
    }
    m
}

/// Rotate a symmetric stiffness tensor by the given Euler-like angles.
pub fn rotate_stiffness(c: &Matrix6, angles: [f64; 3]) -> Matrix6 {
    let m = bond_matrix(&direction_cosines(angles));
    m * c * m.transpose()
}
