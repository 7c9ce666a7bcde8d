//! Engine-level error type: the full taxonomy surfaced to the host.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Circuit(#[from] voltlab_core::Error),

    #[error(transparent)]
    Solver(#[from] voltlab_solver::Error),

    #[error("no AC source in circuit")]
    NoAcSource,

    #[error("cannot perform DC sweep on non-DC source '{0}'")]
    UnknownSource(String),

    #[error("netlist line {line}: {message}")]
    Netlist { line: usize, message: String },
}

impl Error {
    /// Whether this error is the per-point singular-matrix failure.
    pub fn is_singular(&self) -> bool {
        matches!(self, Error::Solver(voltlab_solver::Error::SingularMatrix))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
