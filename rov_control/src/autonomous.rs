//! Autonomous control model.
//!
//! Holds the motions proposed by autonomous software. Nothing here decides
//! what those motions are; callers assign them and call `update`.

use crate::model::{ControlModel, ModelCore};
use crate::motion::MotionSet;
use rov_common::consts::CONTROL_AUTONOMOUS_NAME;
use rov_common::error::{ControlResult, SurfaceResult};
use rov_store::DataManager;
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Motions published under the `autonomous` namespace.
#[derive(Debug, Clone)]
pub struct AutonomousModel {
    core: ModelCore,
}

impl AutonomousModel {
    /// Idle autonomous model.
    pub fn new(store: DataManager) -> Self {
        Self {
            core: ModelCore::new(CONTROL_AUTONOMOUS_NAME, store),
        }
    }

    /// Replace every motion at once.
    pub fn set_motions<K>(&mut self, values: &BTreeMap<K, f64>) -> ControlResult<()>
    where
        K: Borrow<str> + Ord,
    {
        self.core.motions_mut().assign(values)
    }

    /// Individual motion access.
    pub fn motions_mut(&mut self) -> &mut MotionSet {
        self.core.motions_mut()
    }
}

impl ControlModel for AutonomousModel {
    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }

    fn update(&mut self) -> SurfaceResult<()> {
        self.push()
    }
}
