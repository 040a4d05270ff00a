use thiserror::Error;

/// Failures of a tick or of the host wiring around the engine.
#[derive(Debug, Error, Clone)]
pub enum TankError {
    #[error("device error: {0}")]
    Device(String),
    #[error("device detached: {0}")]
    Detached(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing directory")]
    MissingDirectory,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
