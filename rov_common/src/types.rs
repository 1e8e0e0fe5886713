//! Enumerations shared between the control loops and the network link.
//!
//! Both enums are persisted in the state store as plain integers, so any
//! component holding the store can observe them without access to the
//! object that owns the state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which motion source is authoritative for the control manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum DrivingMode {
    /// Manual motions are used outright.
    #[default]
    Manual = 0,
    /// Autonomous motions are used outright.
    Autonomous = 1,
    /// Per axis: manual if non-idle, autonomous otherwise.
    Assisted = 2,
}

impl DrivingMode {
    /// Convert from the stored integer. Returns `None` for invalid values.
    #[inline]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Manual),
            1 => Some(Self::Autonomous),
            2 => Some(Self::Assisted),
            _ => None,
        }
    }

    /// Integer stored in the control partition.
    #[inline]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for DrivingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manual => "MANUAL",
            Self::Autonomous => "AUTONOMOUS",
            Self::Assisted => "ASSISTED",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a client connection.
///
/// ```text
/// DISCONNECTED ─connect─► CONNECTING ─ok─► CONNECTED ─peer close / I/O error─► IDLE
///       ▲                     │                 │                              │
///       └──────── error ──────┘                 └──────── disconnect ──────────┤
///       └──────────────────────────── DISCONNECTING ◄──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConnectionStatus {
    /// Exchange running.
    Connected = 0,
    /// No socket, ready to connect.
    Disconnected = 1,
    /// Connect attempt in flight.
    Connecting = 2,
    /// Cleanup in progress.
    Disconnecting = 3,
    /// Exchange stopped but the link has not been cleaned up yet.
    Idle = 4,
}

impl ConnectionStatus {
    /// Convert from the stored integer. Returns `None` for invalid values.
    #[inline]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Connected),
            1 => Some(Self::Disconnected),
            2 => Some(Self::Connecting),
            3 => Some(Self::Disconnecting),
            4 => Some(Self::Idle),
            _ => None,
        }
    }

    /// Integer stored in the connections partition.
    #[inline]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Disconnecting => "DISCONNECTING",
            Self::Idle => "IDLE",
        };
        f.write_str(name)
    }
}
