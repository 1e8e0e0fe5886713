//! ROV Common Library
//!
//! This crate provides shared constants, enumerations, error types and
//! configuration loading utilities for all surface station crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Normalised ranges, hardware ranges, store keys
//! - [`types`] - Driving mode and connection status enums
//! - [`error`] - Application error taxonomy rooted at [`error::SurfaceError`]
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rov_common::prelude::*;
//!
//! let mode = DrivingMode::from_i64(2);
//! assert_eq!(mode, Some(DrivingMode::Assisted));
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod prelude;
pub mod types;
