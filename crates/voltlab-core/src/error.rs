//! Error types for voltlab-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value: '{0}'")]
    InvalidValue(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("device '{0}' connects a node to itself")]
    DegenerateDevice(String),

    #[error("no ground node defined")]
    NoGround,
}

pub type Result<T> = std::result::Result<T, Error>;
