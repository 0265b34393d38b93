//! Error types for option parsing and per-frequency solves.

/// Solver option parsing errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("too many options: got {given}, at most {max} are recognized")]
    TooManyOptions { given: usize, max: usize },

    #[error("invalid value {value:?} for option `{slot}`")]
    InvalidValue { slot: &'static str, value: String },

    #[error("parallel execution requested but the `parallel` feature is disabled")]
    ParallelUnavailable,
}

/// Failure of the eigenvalue solve at a single frequency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("system matrix G1 is singular at omega = {omega} rad/s")]
    SingularSystem { omega: f64 },

    #[error("eigenvalue iteration did not converge at omega = {omega} rad/s")]
    NoConvergence { omega: f64 },

    #[error("non-finite eigenvalues at omega = {omega} rad/s")]
    NonFinite { omega: f64 },
}
