//! Type aliases, constants, and core enums for the dispersion solver.

use nalgebra::SMatrix;

// Type aliases for common matrix sizes
pub type Matrix6 = SMatrix<f64, 6, 6>;
pub type Matrix3 = SMatrix<f64, 3, 3>;

// Core constants
/// Displacement components per Legendre coefficient (u_x, u_y, u_z).
pub const COMPONENTS: usize = 3;

/// Reference stiffness (Pa) used to normalize elastic constants.
pub const CA: f64 = 1e11;

/// Reference density (kg/m³) used to normalize layer densities.
pub const RHOA: f64 = 1e3;

/// Smallest usable Legendre truncation degree.
pub const MIN_LEGENDRE_DEGREE: usize = 2;

/// Largest |Im k| / |Re k| ratio still treated as a propagating mode.
pub const IMAG_RATIO_TOL: f64 = 1e-8;

/// Cyclic wavenumbers (1/m) above this ceiling are numerically spurious.
pub const WAVENUMBER_CEILING: f64 = 2500.0;

/// Relative mismatch above which a duplicate root pair is reported.
pub const PAIR_MISMATCH_TOL: f64 = 1e-6;

/// Execution backend for the frequency sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// One frequency step after another on the calling thread.
    #[default]
    Sequential,
    /// Frequency steps distributed over the rayon thread pool.
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Prediction used when following a mode branch to the next frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingRule {
    /// Nearest candidate to the branch's previous value.
    #[default]
    NearestValue,
    /// Nearest candidate to the linear extrapolation of the last two values.
    LinearExtrapolation,
}
