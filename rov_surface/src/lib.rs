//! # ROV Surface Station
//!
//! Runs the station: one state store, the control manager loop, the manual
//! controller and the link to the onboard controller.
//!
//! ```text
//!            ┌──────────────── Supervisor ────────────────┐
//!            │  every poll_interval_ms:                   │
//!            │    DISCONNECTED → connect                  │
//!            │    IDLE         → reconnect                │
//!            └────────────────────┬───────────────────────┘
//!                                 │
//!  ManualController ──► DataManager ◄── ControlManager
//!   (blocking task)        ▲   │           (10 ms tick)
//!                          │   ▼
//!                        Connection ◄──► onboard controller
//! ```

pub mod supervisor;

pub use supervisor::Supervisor;
