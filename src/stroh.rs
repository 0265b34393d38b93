//! Per-layer 3×3 sub-matrices of the wave equation.
//!
//! Writing `F_jl[i][k] = C_ijkl`, a plane wave travelling along
//! `(cos psi, sin psi, 0)` with through-thickness profile `u(z)` satisfies
//!
//! ```text
//! -k² A1 u + i k BB u' + F33 u'' + rho omega² u = 0
//! t = i k ABC u + F33 u'        (traction on a z = const plane)
//! ```
//!
//! The matrices here are computed once per layer and reused at every
//! frequency.

use crate::material::Layer;
use crate::rotation::rotate_stiffness;
use crate::types::{Matrix3, Matrix6, CA, RHOA};

/// Voigt `(row, col)` positions read by one 3×3 block.
pub type BlockIndex = [[(usize, usize); 3]; 3];

/// `F11[i][k] = C_i1k1`.
pub const F11_INDEX: BlockIndex = [
    [(0, 0), (0, 5), (0, 4)],
    [(5, 0), (5, 5), (5, 4)],
    [(4, 0), (4, 5), (4, 4)],
];

/// `F12[i][k] = C_i1k2`.
pub const F12_INDEX: BlockIndex = [
    [(0, 5), (0, 1), (0, 3)],
    [(5, 5), (5, 1), (5, 3)],
    [(4, 5), (4, 1), (4, 3)],
];

/// `F22[i][k] = C_i2k2`.
pub const F22_INDEX: BlockIndex = [
    [(5, 5), (5, 1), (5, 3)],
    [(1, 5), (1, 1), (1, 3)],
    [(3, 5), (3, 1), (3, 3)],
];

/// `F33[i][k] = C_i3k3`.
pub const F33_INDEX: BlockIndex = [
    [(4, 4), (4, 3), (4, 2)],
    [(3, 4), (3, 3), (3, 2)],
    [(2, 4), (2, 3), (2, 2)],
];

/// `F31[i][k] = C_i3k1`.
pub const F31_INDEX: BlockIndex = [
    [(4, 0), (4, 5), (4, 4)],
    [(3, 0), (3, 5), (3, 4)],
    [(2, 0), (2, 5), (2, 4)],
];

/// `F32[i][k] = C_i3k2`.
pub const F32_INDEX: BlockIndex = [
    [(4, 5), (4, 1), (4, 3)],
    [(3, 5), (3, 1), (3, 3)],
    [(2, 5), (2, 1), (2, 3)],
];

/// Gather a 3×3 block out of a Voigt stiffness matrix.
pub fn gather_block(c: &Matrix6, index: &BlockIndex) -> Matrix3 {
    Matrix3::from_fn(|i, k| {
        let (row, col) = index[i][k];
        c[(row, col)]
    })
}

/// Normalized per-layer matrices, cached for the whole frequency sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMatrices {
    /// In-plane stiffness along the propagation direction.
    pub a1: Matrix3,
    /// In-plane/out-of-plane coupling.
    pub bb: Matrix3,
    /// `-F33`.
    pub cc: Matrix3,
    /// Traction coupling to the in-plane derivative.
    pub abc: Matrix3,
    /// `-rho I`.
    pub a2: Matrix3,
    /// `C_i3k3`, the through-thickness stiffness used by the traction rows.
    pub f33: Matrix3,
    /// Rotated stiffness divided by `CA`.
    pub stiffness: Matrix6,
    /// Density divided by `RHOA`.
    pub density: f64,
    /// Thickness (m), not normalized.
    pub thickness: f64,
}

impl LayerMatrices {
    /// Build the matrices of `layer` for propagation angle `psi` (rad).
    pub fn new(layer: &Layer, psi: f64) -> Self {
        let stiffness = rotate_stiffness(&layer.stiffness, layer.orientation) / CA;
        let density = layer.density / RHOA;
        Self::from_normalized(stiffness, density, layer.thickness, psi)
    }

    /// Build from an already rotated and normalized stiffness.
    pub fn from_normalized(stiffness: Matrix6, density: f64, thickness: f64, psi: f64) -> Self {
        let f11 = gather_block(&stiffness, &F11_INDEX);
        let f12 = gather_block(&stiffness, &F12_INDEX);
        let f22 = gather_block(&stiffness, &F22_INDEX);
        let f33 = gather_block(&stiffness, &F33_INDEX);
        let f31 = gather_block(&stiffness, &F31_INDEX);
        let f32 = gather_block(&stiffness, &F32_INDEX);
        let f21 = f12.transpose();
        let f13 = f31.transpose();
        let f23 = f32.transpose();

        let (s, c) = psi.sin_cos();

        let a1 = f11 * (c * c) + (f12 + f21) * (c * s) + f22 * (s * s);
        let bb = (f13 + f31) * c + (f23 + f32) * s;
        let cc = -f33;
        let abc = f31 * c + f32 * s;
        let a2 = Matrix3::identity() * -density;

        Self {
            a1,
            bb,
            cc,
            abc,
            a2,
            f33,
            stiffness,
            density,
            thickness,
        }
    }

    /// Jacobian `dξ/dz` of the layer's local coordinate.
    #[inline]
    pub fn jacobian(&self) -> f64 {
        2.0 / self.thickness
    }
}

/// Build the cached matrices for every ply of a stack.
pub fn build_layer_matrices(layers: &[Layer], psi: f64) -> Vec<LayerMatrices> {
    layers.iter().map(|l| LayerMatrices::new(l, psi)).collect()
}
