//! # ROV Surface State Store
//!
//! A partitioned key-value store that is the single source of truth between
//! the control loops and the network link. Nothing in the station calls
//! across components directly: every loop pulls from the store, computes,
//! and pushes its results back.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────┐     ┌──────────────────────────────────┐     ┌──────────────┐
//! │ ManualController  ├────►│           DataManager            │◄────┤  Connection  │
//! └───────────────────┘     │ connections │ received │ control │     └──────────────┘
//! ┌───────────────────┐     │ transmission│ miscellaneous      │
//! │ ControlManager    ├────►│          (DataSegment)           │
//! └───────────────────┘     └────────────────┬─────────────────┘
//!                                            │ "<segment>:<key>" → MessagePack bytes
//!                                   ┌────────▼────────┐
//!                                   │   dyn Cache     │
//!                                   └─────────────────┘
//! ```
//!
//! Each segment declares its keys once, at creation. Strict accessors
//! (`get`, `set`, `all`) reject undeclared keys; bulk merges (`fetch`,
//! `update`) skip them with a warning so partial telemetry never aborts the
//! caller.
//!
//! ## Usage
//!
//! ```rust
//! use rov_store::{DataManager, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DataManager::in_memory()?;
//! store.received().set("S_A", Value::Int(42))?;
//! assert_eq!(store.received().get("S_A")?, Value::Int(42));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod manager;
pub mod segment;
pub mod value;

pub use cache::{Cache, CacheError, MemoryCache};
pub use manager::DataManager;
pub use rov_common::error::{StoreError, StoreResult};
pub use segment::DataSegment;
pub use value::Value;

/// Initialize a plain tracing subscriber for tools and tests.
///
/// Binaries install their own subscriber; calling this afterwards is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
