//! The station-wide store: five fixed segments over one cache.

use crate::cache::{Cache, MemoryCache};
use crate::segment::DataSegment;
use crate::value::Value;
use rov_common::consts::{
    CONTROL_AUTONOMOUS_NAME, CONTROL_MANAGER_NAME, CONTROL_MANUAL_NAME, CONTROL_NORM_IDLE,
    CORD_IDLE, GRIPPER_IDLE, M_C, M_G, MOTION_NAMES, RK_CONNECTION_SURFACE_PI,
    RK_CONTROL_DRIVING_MODE, SEGMENT_CONNECTIONS, SEGMENT_CONTROL, SEGMENT_MISCELLANEOUS,
    SEGMENT_RECEIVED, SEGMENT_TRANSMISSION, T_HAP, T_HAS, T_HFP, T_HFS, T_M, T_VAP, T_VAS, T_VFP,
    T_VFS, THRUSTER_IDLE,
};
use rov_common::error::StoreResult;
use rov_common::types::{ConnectionStatus, DrivingMode};
use std::sync::Arc;
use tracing::info;

struct Segments {
    connections: DataSegment,
    received: DataSegment,
    transmission: DataSegment,
    control: DataSegment,
    miscellaneous: DataSegment,
}

/// Handle to every segment of the store.
///
/// Cloning is cheap; every component receives its own clone.
#[derive(Clone)]
pub struct DataManager {
    segments: Arc<Segments>,
}

impl DataManager {
    /// Build the store over `cache` with the default link peer.
    pub fn new(cache: Arc<dyn Cache>) -> StoreResult<Self> {
        Self::with_peers(cache, &[RK_CONNECTION_SURFACE_PI])
    }

    /// Build the store over a fresh [`MemoryCache`].
    pub fn in_memory() -> StoreResult<Self> {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Build the store over `cache`, declaring one connection status key per peer.
    pub fn with_peers(cache: Arc<dyn Cache>, peers: &[&str]) -> StoreResult<Self> {
        let connections = DataSegment::create(
            SEGMENT_CONNECTIONS,
            cache.clone(),
            peers
                .iter()
                .map(|peer| (*peer, Value::Int(ConnectionStatus::Disconnected.as_i64()))),
        )?;

        let received = DataSegment::create(
            SEGMENT_RECEIVED,
            cache.clone(),
            [
                ("A_A", Value::Bool(false)),
                ("A_B", Value::Bool(false)),
                ("S_A", Value::Int(0)),
                ("S_B", Value::Int(0)),
            ],
        )?;

        let transmission = DataSegment::create(
            SEGMENT_TRANSMISSION,
            cache.clone(),
            [T_HFP, T_HFS, T_HAP, T_HAS, T_VFP, T_VFS, T_VAP, T_VAS, T_M]
                .into_iter()
                .map(|key| (key, Value::Int(THRUSTER_IDLE)))
                .chain([(M_G, Value::Int(GRIPPER_IDLE)), (M_C, Value::Int(CORD_IDLE))]),
        )?;

        let control = DataSegment::create(SEGMENT_CONTROL, cache.clone(), control_defaults())?;

        let miscellaneous = DataSegment::create(
            SEGMENT_MISCELLANEOUS,
            cache,
            std::iter::empty::<(String, Value)>(),
        )?;

        info!(peers = ?peers, "State store initialised");

        Ok(Self {
            segments: Arc::new(Segments {
                connections,
                received,
                transmission,
                control,
                miscellaneous,
            }),
        })
    }

    /// Status of every network link, keyed by peer.
    pub fn connections(&self) -> &DataSegment {
        &self.segments.connections
    }

    /// Telemetry received from the vehicle.
    pub fn received(&self) -> &DataSegment {
        &self.segments.received
    }

    /// Actuator values shipped to the vehicle.
    pub fn transmission(&self) -> &DataSegment {
        &self.segments.transmission
    }

    /// Motions of every control model plus the driving mode.
    pub fn control(&self) -> &DataSegment {
        &self.segments.control
    }

    /// Unclassified data.
    pub fn miscellaneous(&self) -> &DataSegment {
        &self.segments.miscellaneous
    }

    /// Look a segment up by name.
    pub fn segment(&self, name: &str) -> Option<&DataSegment> {
        match name {
            SEGMENT_CONNECTIONS => Some(self.connections()),
            SEGMENT_RECEIVED => Some(self.received()),
            SEGMENT_TRANSMISSION => Some(self.transmission()),
            SEGMENT_CONTROL => Some(self.control()),
            SEGMENT_MISCELLANEOUS => Some(self.miscellaneous()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for DataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataManager")
            .field("connections", &self.segments.connections)
            .field("received", &self.segments.received)
            .field("transmission", &self.segments.transmission)
            .field("control", &self.segments.control)
            .field("miscellaneous", &self.segments.miscellaneous)
            .finish()
    }
}

fn control_defaults() -> Vec<(String, Value)> {
    let mut defaults: Vec<(String, Value)> = [
        CONTROL_MANAGER_NAME,
        CONTROL_MANUAL_NAME,
        CONTROL_AUTONOMOUS_NAME,
    ]
    .iter()
    .flat_map(|model| {
        MOTION_NAMES
            .iter()
            .map(move |motion| (format!("{model}-{motion}"), Value::Float(CONTROL_NORM_IDLE)))
    })
    .collect();

    defaults.push((
        RK_CONTROL_DRIVING_MODE.to_owned(),
        Value::Int(DrivingMode::Manual.as_i64()),
    ));
    defaults
}
