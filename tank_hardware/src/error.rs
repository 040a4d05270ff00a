use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("device detached: {0}")]
    Detached(String),
    #[error("no such device: {0}")]
    NoSuchDevice(String),
    #[error("non-finite value {value} written to {device}")]
    NonFinite { device: String, value: f32 },
}

pub type Result<T> = std::result::Result<T, HwError>;
