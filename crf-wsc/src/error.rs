//! Error types for the WSC library
use crate::model::DataSource;
use thiserror::Error;

/// Main error type for WSC operations
#[derive(Error, Debug)]
pub enum WscError {
    /// Station identifier does not match the WSC pattern
    #[error("Invalid station id {0:?}: expected 2 digits, 2 letters, 3 digits")]
    InvalidStation(String),

    /// An upstream feed could not be used: transport failure, bad HTTP
    /// status, timeout, or a payload that does not parse
    #[error("{feed} feed unavailable: {reason}")]
    SourceUnavailable { feed: DataSource, reason: String },

    /// The feed responded and parsed, but held no usable samples
    #[error("{feed} feed returned no usable samples")]
    NoData { feed: DataSource },

    /// Not enough samples to compute the requested product
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Coarse classification of a `WscError`, cloneable so failures can be
/// carried inside published snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidStation,
    SourceUnavailable,
    NoData,
    InsufficientData,
}

impl WscError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WscError::InvalidStation(_) => ErrorKind::InvalidStation,
            WscError::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            WscError::NoData { .. } => ErrorKind::NoData,
            WscError::InsufficientData(_) => ErrorKind::InsufficientData,
        }
    }
}

/// Type alias for Results using WscError
pub type Result<T> = std::result::Result<T, WscError>;
