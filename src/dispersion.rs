//! Frequency sweep orchestration.
//!
//! Per-layer matrices are built once, then every frequency step assembles
//! and solves its own system. Steps share nothing but the read-only layer
//! matrices, so they run either sequentially or on the rayon pool (with the
//! `parallel` feature), each step producing its own column of the raw
//! wavenumber matrix.
//!
//! A step whose eigenvalue solve fails is logged and left as a NaN column;
//! the rest of the sweep carries on.

use std::f64::consts::TAU;

use log::{debug, info, warn};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::assembly::{assemble_system, Discretization};
use crate::error::ConfigError;
use crate::material::Sample;
use crate::modes::{decimated_len, phase_velocities, process_column, track_modes};
use crate::solver::solve_wavenumbers;
use crate::stroh::{build_layer_matrices, LayerMatrices};
use crate::types::{Execution, TrackingRule};

/// Solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverOptions {
    pub execution: Execution,
    pub tracking: TrackingRule,
}

impl SolverOptions {
    /// Positional option slots understood by [`SolverOptions::from_args`].
    pub const SLOTS: [&'static str; 2] = ["execution", "tracking"];

    pub fn sequential() -> Self {
        Self::default()
    }

    #[cfg(feature = "parallel")]
    pub fn parallel() -> Self {
        Self {
            execution: Execution::Parallel,
            ..Self::default()
        }
    }

    pub fn with_tracking(mut self, tracking: TrackingRule) -> Self {
        self.tracking = tracking;
        self
    }

    /// Parse positional option values, in [`SolverOptions::SLOTS`] order.
    ///
    /// Missing trailing values keep their defaults. Supplying more values
    /// than there are slots fails before anything is parsed.
    ///
    /// ```
    /// use plate_dispersion::{SolverOptions, TrackingRule};
    ///
    /// let opts = SolverOptions::from_args(&["sequential", "extrapolate"]).unwrap();
    /// assert_eq!(opts.tracking, TrackingRule::LinearExtrapolation);
    /// assert!(SolverOptions::from_args(&["sequential", "nearest", "extra"]).is_err());
    /// ```
    pub fn from_args(args: &[&str]) -> Result<Self, ConfigError> {
        if args.len() > Self::SLOTS.len() {
            return Err(ConfigError::TooManyOptions {
                given: args.len(),
                max: Self::SLOTS.len(),
            });
        }

        let mut opts = Self::default();
        if let Some(&value) = args.first() {
            opts.execution = parse_execution(value)?;
        }
        if let Some(&value) = args.get(1) {
            opts.tracking = match value.trim().to_ascii_lowercase().as_str() {
                "nearest" => TrackingRule::NearestValue,
                "extrapolate" | "linear" => TrackingRule::LinearExtrapolation,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        slot: Self::SLOTS[1],
                        value: value.to_string(),
                    })
                }
            };
        }
        Ok(opts)
    }
}

fn parse_execution(value: &str) -> Result<Execution, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "sequential" | "serial" => Ok(Execution::Sequential),
        #[cfg(feature = "parallel")]
        "parallel" => Ok(Execution::Parallel),
        #[cfg(not(feature = "parallel"))]
        "parallel" => Err(ConfigError::ParallelUnavailable),
        _ => Err(ConfigError::InvalidValue {
            slot: SolverOptions::SLOTS[0],
            value: value.to_string(),
        }),
    }
}

/// Dispersion curves of a sample, co-indexed by mode and frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct DispersionCurves {
    /// Frequencies (Hz).
    pub frequencies: Vec<f64>,
    /// Cyclic wavenumbers (1/m), modes × frequencies, NaN where untracked.
    pub wavenumbers: DMatrix<f64>,
    /// Phase velocities (m/s), same shape as `wavenumbers`.
    pub phase_velocities: DMatrix<f64>,
}

/// JSON-friendly mirror of [`DispersionCurves`]; NaN is written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableCurves {
    pub frequencies: Vec<f64>,
    /// One row per mode.
    pub wavenumbers: Vec<Vec<Option<f64>>>,
    /// One row per mode.
    pub phase_velocities: Vec<Vec<Option<f64>>>,
}

fn rows_of(mat: &DMatrix<f64>) -> Vec<Vec<Option<f64>>> {
    mat.row_iter()
        .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
        .collect()
}

impl DispersionCurves {
    pub fn num_modes(&self) -> usize {
        self.wavenumbers.nrows()
    }

    pub fn num_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    /// Wavenumbers of mode `m` across the sweep.
    pub fn mode_wavenumbers(&self, m: usize) -> Vec<f64> {
        self.wavenumbers.row(m).iter().copied().collect()
    }

    /// Phase velocities of mode `m` across the sweep.
    pub fn mode_velocities(&self, m: usize) -> Vec<f64> {
        self.phase_velocities.row(m).iter().copied().collect()
    }

    pub fn to_serializable(&self) -> SerializableCurves {
        SerializableCurves {
            frequencies: self.frequencies.clone(),
            wavenumbers: rows_of(&self.wavenumbers),
            phase_velocities: rows_of(&self.phase_velocities),
        }
    }

    /// Export curves to a JSON string for plotting or storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_serializable())
    }

    /// Export curves to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_serializable())
    }
}

/// Frequencies (Hz) of the sweep: `df * (i + 1)`.
pub fn sweep_frequencies(freq_step: f64, num_freq_steps: usize) -> Vec<f64> {
    (0..num_freq_steps)
        .map(|i| freq_step * (i + 1) as f64)
        .collect()
}

/// Run `step` for every index with the selected backend, keeping index order.
fn run_steps<F>(execution: Execution, n: usize, step: F) -> Vec<Vec<f64>>
where
    F: Fn(usize) -> Vec<f64> + Sync + Send,
{
    match execution {
        Execution::Sequential => (0..n).map(step).collect(),
        #[cfg(feature = "parallel")]
        Execution::Parallel => (0..n).into_par_iter().map(step).collect(),
    }
}

/// Decimated cyclic wavenumbers of one frequency, or a NaN column.
fn frequency_step(layers: &[LayerMatrices], leg_deg: usize, omega: f64, rows: usize) -> Vec<f64> {
    let sys = assemble_system(layers, leg_deg, omega);
    match solve_wavenumbers(&sys, omega) {
        Ok(sorted) => process_column(&sorted),
        Err(err) => {
            warn!("{}; column left as NaN", err);
            vec![f64::NAN; rows]
        }
    }
}

/// Raw (untracked) cyclic wavenumber matrix, `ceil(nNodes/2)` × frequencies.
///
/// Each column is sorted ascending with NaN last.
pub fn raw_wavenumbers(
    sample: &Sample,
    propagation_angle: f64,
    freq_step: f64,
    num_freq_steps: usize,
    legendre_degree: usize,
    execution: Execution,
) -> (Vec<f64>, DMatrix<f64>) {
    let frequencies = sweep_frequencies(freq_step, num_freq_steps);
    let raw = wavenumbers_at(
        sample,
        propagation_angle,
        &frequencies,
        legendre_degree,
        execution,
    );
    (frequencies, raw)
}

/// Raw cyclic wavenumbers at arbitrary frequencies (Hz), one column each.
///
/// A frequency whose eigenvalue solve fails yields a NaN column.
pub fn wavenumbers_at(
    sample: &Sample,
    propagation_angle: f64,
    frequencies: &[f64],
    legendre_degree: usize,
    execution: Execution,
) -> DMatrix<f64> {
    let disc = Discretization::new(legendre_degree, sample.num_layers());
    let layers = build_layer_matrices(&sample.layers, propagation_angle);
    let rows = decimated_len(disc.num_nodes());
    let n = frequencies.len();

    info!(
        "dispersion sweep: layers={} legDeg={} nNodes={} steps={} backend={:?}",
        disc.num_layers,
        legendre_degree,
        disc.num_nodes(),
        n,
        execution
    );

    let columns = run_steps(execution, n, |i| {
        let omega = TAU * frequencies[i];
        let column = frequency_step(&layers, legendre_degree, omega, rows);
        debug!("step {}/{} done (f = {:.1} Hz)", i + 1, n, frequencies[i]);
        column
    });

    DMatrix::from_fn(rows, n, |r, c| columns[c][r])
}

/// Compute tracked dispersion curves of `sample`.
///
/// * `propagation_angle` - in-plane propagation direction (rad) from the x axis
/// * `freq_step` - frequency increment `df` (Hz); step `i` sits at `df * (i + 1)`
/// * `legendre_degree` - Legendre coefficients per component and layer (>= 2)
/// * `num_modes_to_track` - rows of the returned matrices
///
/// Panics if the sample is empty or `legendre_degree < 2`.
pub fn solve(
    sample: &Sample,
    propagation_angle: f64,
    freq_step: f64,
    num_freq_steps: usize,
    legendre_degree: usize,
    num_modes_to_track: usize,
    options: &SolverOptions,
) -> DispersionCurves {
    let (frequencies, raw) = raw_wavenumbers(
        sample,
        propagation_angle,
        freq_step,
        num_freq_steps,
        legendre_degree,
        options.execution,
    );

    let wavenumbers = track_modes(&raw, num_modes_to_track, options.tracking);
    let phase_velocities = phase_velocities(&frequencies, &wavenumbers);

    let tracked = wavenumbers.iter().filter(|v| v.is_finite()).count();
    info!(
        "dispersion sweep finished: {} of {} entries tracked",
        tracked,
        wavenumbers.len()
    );

    DispersionCurves {
        frequencies,
        wavenumbers,
        phase_velocities,
    }
}
