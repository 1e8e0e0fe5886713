//! Prelude module for common re-exports.
//!
//! ```rust
//! use rov_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SurfaceConfig};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{
    ControlResult, ControlSystemError, NetworkingError, StoreError, StoreResult, SurfaceError,
    SurfaceResult,
};

// ─── Shared state enums ─────────────────────────────────────────────
pub use crate::types::{ConnectionStatus, DrivingMode};
