//! Layer and sample descriptions.
//!
//! A [`Sample`] is the stack of plies the solver works on, bottom ply first.
//! Loading samples from files is left to the caller; this module only holds
//! the data plus a couple of stiffness constructors for common materials.

use crate::types::Matrix6;

/// One ply of the stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Stiffness in Voigt notation (Pa), expressed in the ply's material axes.
    pub stiffness: Matrix6,
    /// Orientation angles `[alpha, beta, gamma]` (rad) of the material axes,
    /// applied as `Rz(alpha) * Ry(beta) * Rx(gamma)`.
    pub orientation: [f64; 3],
    /// Density (kg/m³).
    pub density: f64,
    /// Thickness (m).
    pub thickness: f64,
}

impl Layer {
    pub fn new(stiffness: Matrix6, density: f64, thickness: f64) -> Self {
        Self {
            stiffness,
            orientation: [0.0; 3],
            density,
            thickness,
        }
    }

    /// Same ply with its material axes rotated by `angles`.
    pub fn with_orientation(mut self, angles: [f64; 3]) -> Self {
        self.orientation = angles;
        self
    }

    /// Isotropic ply from Young's modulus and Poisson's ratio.
    pub fn isotropic(e: f64, nu: f64, density: f64, thickness: f64) -> Self {
        Self::new(isotropic_stiffness(e, nu), density, thickness)
    }
}

/// Layered plate, bottom ply first.
///
/// Preconditions (not checked at runtime beyond non-emptiness in the
/// solver): every thickness and density is positive and every stiffness is
/// symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub layers: Vec<Layer>,
}

impl Sample {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Single-ply sample.
    pub fn single(layer: Layer) -> Self {
        Self {
            layers: vec![layer],
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn total_thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }
}

/// 3D isotropic stiffness matrix (6×6, Voigt).
pub fn isotropic_stiffness(e: f64, nu: f64) -> Matrix6 {
    let factor = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
    let mut c = Matrix6::zeros();

    for i in 0..3 {
        for j in 0..3 {
            c[(i, j)] = if i == j {
                factor * (1.0 - nu)
            } else {
                factor * nu
            };
        }
    }

    let shear = e / (2.0 * (1.0 + nu));
    c[(3, 3)] = shear;
    c[(4, 4)] = shear;
    c[(5, 5)] = shear;

    c
}

/// Engineering constants of an orthotropic ply (moduli in Pa).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthotropic {
    pub e1: f64,
    pub e2: f64,
    pub e3: f64,
    pub nu12: f64,
    pub nu13: f64,
    pub nu23: f64,
    pub g12: f64,
    pub g13: f64,
    pub g23: f64,
}

impl Orthotropic {
    /// Stiffness obtained by inverting the compliance matrix.
    ///
    /// Returns `None` for constants that give a singular compliance.
    pub fn stiffness(&self) -> Option<Matrix6> {
        let mut s = Matrix6::zeros();
        s[(0, 0)] = 1.0 / self.e1;
        s[(1, 1)] = 1.0 / self.e2;
        s[(2, 2)] = 1.0 / self.e3;
        s[(0, 1)] = -self.nu12 / self.e1;
        s[(0, 2)] = -self.nu13 / self.e1;
        s[(1, 2)] = -self.nu23 / self.e2;
        s[(1, 0)] = s[(0, 1)];
        s[(2, 0)] = s[(0, 2)];
        s[(2, 1)] = s[(1, 2)];
        s[(3, 3)] = 1.0 / self.g23;
        s[(4, 4)] = 1.0 / self.g13;
        s[(5, 5)] = 1.0 / self.g12;

        let c = s.try_inverse()?;
        Some(0.5 * (c + c.transpose()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn isotropic_stiffness_matches_lame_constants() {
        let (e, nu) = (70e9, 0.33);
        let c = isotropic_stiffness(e, nu);
        let lambda = e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu));
        let mu = e / (2.0 * (1.0 + nu));

        assert!((c[(0, 0)] - (lambda + 2.0 * mu)).abs() / c[(0, 0)] < TOL);
        assert!((c[(0, 1)] - lambda).abs() / lambda < TOL);
        assert!((c[(3, 3)] - mu).abs() / mu < TOL);
        assert_eq!(c[(0, 3)], 0.0);
        assert_eq!(c, c.transpose());
    }

    #[test]
    fn orthotropic_with_isotropic_constants_reduces_to_isotropic() {
        let (e, nu) = (200e9, 0.3);
        let g = e / (2.0 * (1.0 + nu));
        let ortho = Orthotropic {
            e1: e,
            e2: e,
            e3: e,
            nu12: nu,
            nu13: nu,
            nu23: nu,
            g12: g,
            g13: g,
            g23: g,
        };
        let c = ortho.stiffness().expect("compliance should be invertible");
        let iso = isotropic_stiffness(e, nu);
        for i in 0..6 {
            for j in 0..6 {
                assert!((c[(i, j)] - iso[(i, j)]).abs() < TOL * e);
            }
        }
    }

    #[test]
    fn sample_total_thickness_sums_layers() {
        let ply = Layer::isotropic(70e9, 0.33, 2700.0, 0.5e-3);
        let sample = Sample::new(vec![ply.clone(), ply.clone(), ply]);
        assert_eq!(sample.num_layers(), 3);
        assert!((sample.total_thickness() - 1.5e-3).abs() < 1e-15);
    }
}
