//! Guided-wave dispersion curves for layered anisotropic plates.
//!
//! The displacement through the thickness of every ply is expanded in
//! Legendre polynomials, which turns the elastodynamic wave equation into a
//! generalized eigenvalue problem at each frequency. The eigenvalues are
//! wavenumbers; filtering, sorting and mode tracking turn them into
//! dispersion curves.
//!
//! ```
//! use plate_dispersion::{solve, Layer, Sample, SolverOptions};
//!
//! let plate = Sample::single(Layer::isotropic(70e9, 0.33, 2700.0, 1e-3));
//! let curves = solve(&plate, 0.0, 10e3, 2, 8, 3, &SolverOptions::default());
//! assert_eq!(curves.wavenumbers.shape(), (3, 2));
//! ```
//!
//! ## Parallelization
//!
//! With the `parallel` feature (on by default) frequency steps can be spread
//! over the rayon thread pool through [`Execution::Parallel`].

pub mod assembly;
pub mod dispersion;
pub mod error;
pub mod legendre;
pub mod material;
pub mod modes;
pub mod rotation;
pub mod solver;
pub mod stroh;
pub mod types;

pub use assembly::{assemble_system, reference_wavenumber, Discretization, SystemMatrices};
pub use dispersion::{
    raw_wavenumbers, solve, sweep_frequencies, wavenumbers_at, DispersionCurves,
    SerializableCurves, SolverOptions,
};
pub use error::{ConfigError, SolveError};
pub use material::{isotropic_stiffness, Layer, Orthotropic, Sample};
pub use modes::{decimate_duplicate_pairs, phase_velocities, track_modes};
pub use rotation::rotate_stiffness;
pub use solver::{companion_matrices, solve_wavenumbers};
pub use stroh::{build_layer_matrices, LayerMatrices};
pub use types::*;
