//! Error taxonomy of the surface station.
//!
//! Every subsystem has its own error enum; all of them convert into the root
//! [`SurfaceError`] so callers can match broadly or narrowly.
//!
//! | Error | Raised by |
//! |-------|-----------|
//! | [`StoreError`] | unregistered keys, cache or (de)serialisation failures |
//! | [`NetworkingError`] | connect and cleanup failures of a link |
//! | [`ControlSystemError`] | out-of-range motions, normalisation, input devices |
//! | [`ConfigError`] | configuration loading and validation |

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised by the partitioned state store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Key is not part of the segment's declared key set.
    #[error("Key {key} not registered in segment {segment}")]
    NotRegistered {
        /// Segment name
        segment: String,
        /// Offending key
        key: String,
    },

    /// Cache access, serialisation or deserialisation failed.
    #[error("Backend failure in segment {segment} for key {key}: {reason}")]
    Backend {
        /// Segment name
        segment: String,
        /// Key being accessed
        key: String,
        /// Underlying failure
        reason: String,
    },
}

/// Errors raised by a network link.
#[derive(Debug, Error)]
pub enum NetworkingError {
    /// Socket connect failed.
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        /// Remote address
        address: String,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Socket shutdown or worker termination failed.
    #[error("Failed to cleanup the connection to {address}: {source}")]
    Cleanup {
        /// Remote address
        address: String,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Exchange worker panicked or could not be joined.
    #[error("Exchange worker for {address} failed: {reason}")]
    Worker {
        /// Remote address
        address: String,
        /// Join failure description
        reason: String,
    },
}

/// Errors raised by the control system.
#[derive(Debug, Error)]
pub enum ControlSystemError {
    /// A motion was assigned a value outside the normalised range.
    #[error("{value} isn't normalised for motion {name} (between {min} and {max} inclusive)")]
    NotNormalised {
        /// Motion name
        name: String,
        /// Rejected value
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// A bulk motion assignment lacked one of the nine axes.
    #[error("Motion {0} missing from the assigned values")]
    MissingMotion(String),

    /// Min-max normalisation was asked to use an empty range.
    #[error("Minimum and maximum must not be equal (got {min} and {max})")]
    DegenerateRange {
        /// Range minimum
        min: f64,
        /// Range maximum
        max: f64,
    },

    /// Min-max normalisation received a value outside its source range.
    #[error("Value {value} is not between {min} and {max}")]
    OutOfRange {
        /// Rejected value
        value: f64,
        /// Range minimum
        min: f64,
        /// Range maximum
        max: f64,
    },

    /// No input device could be opened.
    #[error("No input device available: {0}")]
    NoInputDevice(String),

    /// Reading from the input device failed.
    #[error("Input device error: {source}")]
    Device {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },
}

/// Root error of the surface station.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// State store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Networking error
    #[error(transparent)]
    Networking(#[from] NetworkingError),

    /// Control system error
    #[error(transparent)]
    Control(#[from] ControlSystemError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlSystemError>;

/// Result type spanning every subsystem.
pub type SurfaceResult<T> = Result<T, SurfaceError>;
