//! Global system assembly for one frequency.
//!
//! With `K = k / ka` the discretized stack satisfies
//!
//! ```text
//! (G1 + i K F1 + K² H1) a = 0
//! ```
//!
//! where `a` holds the Legendre coefficients of every layer. Rows are filled
//! in three blocks: bulk equations of each layer, interface continuity, and
//! the two free outer faces.

use nalgebra::DMatrix;

use crate::legendre::{pm_d2pn, pm_dpn, pm_pn, Endpoint};
use crate::stroh::LayerMatrices;
use crate::types::{Matrix3, COMPONENTS, CA, MIN_LEGENDRE_DEGREE, RHOA};

/// Reference wavenumber `ka = omega * sqrt(rhoa / Ca)`.
#[inline]
pub fn reference_wavenumber(omega: f64) -> f64 {
    omega * (RHOA / CA).sqrt()
}

/// Size bookkeeping of the expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discretization {
    /// Legendre coefficients per component in every layer.
    pub leg_deg: usize,
    pub num_layers: usize,
}

impl Discretization {
    pub fn new(leg_deg: usize, num_layers: usize) -> Self {
        assert!(
            leg_deg >= MIN_LEGENDRE_DEGREE,
            "Legendre degree must be at least {}",
            MIN_LEGENDRE_DEGREE
        );
        assert!(num_layers > 0, "sample must contain at least one layer");
        Self {
            leg_deg,
            num_layers,
        }
    }

    /// Unknowns per layer.
    #[inline]
    pub fn layer_dofs(&self) -> usize {
        COMPONENTS * self.leg_deg
    }

    /// Total unknowns, `3 * Σ legDeg`.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.layer_dofs() * self.num_layers
    }

    /// Column of coefficient `n` of layer `layer` (first component).
    #[inline]
    pub fn column(&self, layer: usize, n: usize) -> usize {
        layer * self.layer_dofs() + COMPONENTS * n
    }

    /// Bulk equations per layer, `legDeg - 2`.
    #[inline]
    pub fn bulk_equations(&self) -> usize {
        self.leg_deg - 2
    }

    /// First interface row.
    #[inline]
    pub fn interface_offset(&self) -> usize {
        COMPONENTS * self.bulk_equations() * self.num_layers
    }

    /// First boundary row.
    #[inline]
    pub fn boundary_offset(&self) -> usize {
        self.interface_offset() + 2 * COMPONENTS * (self.num_layers - 1)
    }
}

/// The three real matrices of the quadratic eigenproblem.
#[derive(Debug, Clone)]
pub struct SystemMatrices {
    /// Coefficient of `i K`.
    pub f1: DMatrix<f64>,
    /// Constant term.
    pub g1: DMatrix<f64>,
    /// Coefficient of `K²`.
    pub h1: DMatrix<f64>,
    /// Reference wavenumber the system was built with.
    pub ka: f64,
}

impl SystemMatrices {
    fn zeros(n: usize, ka: f64) -> Self {
        Self {
            f1: DMatrix::zeros(n, n),
            g1: DMatrix::zeros(n, n),
            h1: DMatrix::zeros(n, n),
            ka,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.g1.nrows()
    }
}

/// Add a 3×3 block into `mat` at (`row`, `col`).
#[inline]
fn add_block(mat: &mut DMatrix<f64>, row: usize, col: usize, block: &Matrix3) {
    for i in 0..COMPONENTS {
        for k in 0..COMPONENTS {
            let val = block[(i, k)];
            if val != 0.0 {
                mat[(row + i, col + k)] += val;
            }
        }
    }
}

/// Add `scale * I₃` into `mat` at (`row`, `col`).
#[inline]
fn add_identity(mat: &mut DMatrix<f64>, row: usize, col: usize, scale: f64) {
    for i in 0..COMPONENTS {
        mat[(row + i, col + i)] += scale;
    }
}

/// Assemble F1, G1, H1 at angular frequency `omega`.
pub fn assemble_system(
    layers: &[LayerMatrices],
    leg_deg: usize,
    omega: f64,
) -> SystemMatrices {
    let disc = Discretization::new(leg_deg, layers.len());
    let ka = reference_wavenumber(omega);
    let mut sys = SystemMatrices::zeros(disc.num_nodes(), ka);

    assemble_bulk(&mut sys, &disc, layers);
    assemble_interfaces(&mut sys, &disc, layers);
    assemble_free_faces(&mut sys, &disc, layers);

    sys
}

/// Galerkin projection of the layer equations onto `P_0 .. P_{legDeg-3}`.
fn assemble_bulk(sys: &mut SystemMatrices, disc: &Discretization, layers: &[LayerMatrices]) {
    let ka = sys.ka;
    for (p, layer) in layers.iter().enumerate() {
        let jac = layer.jacobian();
        let row0 = COMPONENTS * disc.bulk_equations() * p;
        for m in 0..disc.bulk_equations() {
            let row = row0 + COMPONENTS * m;
            for n in 0..disc.leg_deg {
                let col = disc.column(p, n);

                let first = pm_dpn(m, n);
                if first != 0.0 {
                    add_block(&mut sys.f1, row, col, &(layer.bb * (-jac * first / ka)));
                }

                let second = pm_d2pn(m, n);
                if second != 0.0 {
                    add_block(
                        &mut sys.g1,
                        row,
                        col,
                        &(layer.cc * (jac * jac * second / (ka * ka))),
                    );
                }

                if m == n {
                    let mass = pm_pn(m, n);
                    add_block(&mut sys.h1, row, col, &(layer.a1 * mass));
                    add_block(&mut sys.g1, row, col, &(layer.a2 * mass));
                }
            }
        }
    }
}

/// Traction `i K ABC u + F33 u_z / ka` of `layer` at `end`, scaled by `sign`.
fn add_traction(
    sys: &mut SystemMatrices,
    disc: &Discretization,
    row: usize,
    p: usize,
    layer: &LayerMatrices,
    end: Endpoint,
    sign: f64,
) {
    let scale = sign * layer.jacobian() / sys.ka;
    for n in 0..disc.leg_deg {
        let col = disc.column(p, n);
        add_block(&mut sys.f1, row, col, &(layer.abc * (sign * end.value(n))));
        add_block(&mut sys.g1, row, col, &(layer.f33 * (scale * end.slope(n))));
    }
}

/// Displacement and traction continuity between neighbouring plies.
fn assemble_interfaces(sys: &mut SystemMatrices, disc: &Discretization, layers: &[LayerMatrices]) {
    for (q, pair) in layers.windows(2).enumerate() {
        let (below, above) = (&pair[0], &pair[1]);
        let row = disc.interface_offset() + 2 * COMPONENTS * q;

        // u(top of q) - u(bottom of q+1) = 0
        for n in 0..disc.leg_deg {
            add_identity(&mut sys.g1, row, disc.column(q, n), Endpoint::Upper.value(n));
            add_identity(
                &mut sys.g1,
                row,
                disc.column(q + 1, n),
                -Endpoint::Lower.value(n),
            );
        }

        let row = row + COMPONENTS;
        add_traction(sys, disc, row, q, below, Endpoint::Upper, 1.0);
        add_traction(sys, disc, row, q + 1, above, Endpoint::Lower, -1.0);
    }
}

/// Stress-free bottom and top faces of the stack.
fn assemble_free_faces(sys: &mut SystemMatrices, disc: &Discretization, layers: &[LayerMatrices]) {
    let last = layers.len() - 1;
    let row = disc.boundary_offset();
    // outward normal of the bottom face is -z
    add_traction(sys, disc, row, 0, &layers[0], Endpoint::Lower, -1.0);
    add_traction(
        sys,
        disc,
        row + COMPONENTS,
        last,
        &layers[last],
        Endpoint::Upper,
        1.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Layer;

    const OMEGA: f64 = 2.0 * std::f64::consts::PI * 50e3;

    fn aluminium(thickness: f64) -> LayerMatrices {
        LayerMatrices::new(&Layer::isotropic(70e9, 0.33, 2700.0, thickness), 0.0)
    }

    fn row_is_empty(sys: &SystemMatrices, r: usize) -> bool {
        (0..sys.num_nodes())
            .all(|c| sys.f1[(r, c)] == 0.0 && sys.g1[(r, c)] == 0.0 && sys.h1[(r, c)] == 0.0)
    }

    #[test]
    fn every_row_is_filled() {
        for num_layers in 1..=3 {
            for leg_deg in [2, 3, 6, 10] {
                let layers = vec![aluminium(0.4e-3); num_layers];
                let sys = assemble_system(&layers, leg_deg, OMEGA);
                assert_eq!(sys.num_nodes(), 3 * leg_deg * num_layers);
                assert_eq!(sys.f1.shape(), sys.g1.shape());
                assert_eq!(sys.h1.shape(), sys.g1.shape());
                for r in 0..sys.num_nodes() {
                    assert!(
                        !row_is_empty(&sys, r),
                        "row {} empty (layers={}, legDeg={})",
                        r,
                        num_layers,
                        leg_deg
                    );
                }
            }
        }
    }

    #[test]
    fn row_blocks_partition_the_system() {
        let disc = Discretization::new(8, 3);
        assert_eq!(disc.interface_offset(), 3 * 6 * 3);
        assert_eq!(disc.boundary_offset(), 3 * 6 * 3 + 12);
        assert_eq!(disc.boundary_offset() + 6, disc.num_nodes());
    }

    #[test]
    fn constraint_rows_carry_no_k_squared_term() {
        let layers = vec![aluminium(0.5e-3), aluminium(0.5e-3)];
        let sys = assemble_system(&layers, 6, OMEGA);
        let disc = Discretization::new(6, 2);
        for r in disc.interface_offset()..disc.num_nodes() {
            assert!((0..sys.num_nodes()).all(|c| sys.h1[(r, c)] == 0.0));
        }
    }

    #[test]
    fn displacement_continuity_uses_alternating_signs() {
        let layers = vec![aluminium(0.5e-3), aluminium(0.5e-3)];
        let sys = assemble_system(&layers, 4, OMEGA);
        let disc = Discretization::new(4, 2);
        let row = disc.interface_offset();
        for n in 0..4 {
            assert_eq!(sys.g1[(row, disc.column(0, n))], 1.0);
            let expected = if n % 2 == 0 { -1.0 } else { 1.0 };
            assert_eq!(sys.g1[(row, disc.column(1, n))], expected);
            assert_eq!(sys.f1[(row, disc.column(1, n))], 0.0);
        }
    }

    #[test]
    fn reference_wavenumber_scales_with_frequency() {
        let ka = reference_wavenumber(1e4);
        assert!((ka - 1e4 * 1e-4).abs() < 1e-15);
        assert!((reference_wavenumber(2e4) - 2.0 * ka).abs() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "Legendre degree")]
    fn degree_below_two_is_rejected() {
        assemble_system(&[aluminium(1e-3)], 1, OMEGA);
    }
}
