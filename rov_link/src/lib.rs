//! # ROV Link
//!
//! TCP link between the surface station and the onboard controller.
//!
//! While connected, an exchange worker loops over:
//!
//! 1. send the whole `transmission` partition as one MessagePack map
//! 2. read one frame of at most `buffer_size` bytes
//! 3. merge it into the `received` partition, skipping unknown keys
//!
//! A closed stream, an I/O error or a malformed frame ends the loop and
//! leaves the link `IDLE`. The link never reconnects by itself.
//!
//! ```rust,no_run
//! use rov_common::config::ConnectionConfig;
//! use rov_link::Connection;
//! use rov_store::DataManager;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DataManager::in_memory()?;
//! let link = Connection::new(store, &ConnectionConfig::default());
//! if let Some(attempt) = link.connect() {
//!     attempt.await?;
//! }
//! println!("link is {}", link.status()?);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod wire;

pub use connection::{Connection, WORKER_STOP_TIMEOUT};
pub use wire::{decode_frame, encode_frame};
