//! Control manager: the model that decides what the vehicle actually does.
//!
//! Every cycle runs four steps:
//!
//! 1. **pull** the manual and autonomous motions from the `control` segment
//! 2. **merge** them according to the driving mode
//! 3. **convert** the merged motions to actuator values
//! 4. **push** its own motions to `control` and the actuator values to
//!    `transmission`, where the network link picks them up

use crate::converter::{Actuators, Converter};
use crate::model::{ControlModel, ModelCore};
use rov_common::consts::{
    CONTROL_AUTONOMOUS_NAME, CONTROL_MANAGER_NAME, CONTROL_MANUAL_NAME, CONTROL_NORM_IDLE,
    MOTION_NAMES,
};
use rov_common::error::{StoreResult, SurfaceResult};
use rov_common::types::DrivingMode;
use rov_store::{DataManager, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

type Motions = BTreeMap<&'static str, f64>;

/// Merges manual and autonomous motions and feeds the transmission segment.
#[derive(Debug)]
pub struct ControlManager {
    core: ModelCore,
    manual_keys: Vec<(String, &'static str)>,
    autonomous_keys: Vec<(String, &'static str)>,
    manual: Motions,
    autonomous: Motions,
    converted: Actuators,
}

impl ControlManager {
    /// Idle manager over `store`.
    pub fn new(store: DataManager) -> Self {
        let keys = |model: &str| -> Vec<(String, &'static str)> {
            MOTION_NAMES
                .iter()
                .map(|motion| (format!("{model}-{motion}"), *motion))
                .collect()
        };
        let idle = || -> Motions { MOTION_NAMES.iter().map(|m| (*m, CONTROL_NORM_IDLE)).collect() };

        Self {
            core: ModelCore::new(CONTROL_MANAGER_NAME, store),
            manual_keys: keys(CONTROL_MANUAL_NAME),
            autonomous_keys: keys(CONTROL_AUTONOMOUS_NAME),
            manual: idle(),
            autonomous: idle(),
            converted: Actuators::new(),
        }
    }

    /// Actuator values computed in the last cycle.
    pub fn converted(&self) -> &Actuators {
        &self.converted
    }

    /// Run `update` every `tick` until the task is dropped.
    ///
    /// A failed cycle is logged and the loop carries on.
    pub async fn run(mut self, tick: Duration) {
        info!(tick_ms = tick.as_millis() as u64, "Control manager started");

        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.update() {
                error!(error = %e, "Control manager cycle failed");
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self, tick: Duration) -> JoinHandle<()> {
        tokio::spawn(self.run(tick))
    }

    // ─── Pipeline ───────────────────────────────────────────────────

    fn pull(&mut self) -> StoreResult<()> {
        self.manual = self.fetch(&self.manual_keys)?;
        self.autonomous = self.fetch(&self.autonomous_keys)?;
        Ok(())
    }

    /// Missing or non-numeric values count as idle.
    fn fetch(&self, keys: &[(String, &'static str)]) -> StoreResult<Motions> {
        let values = self
            .core
            .store()
            .control()
            .fetch(keys.iter().map(|(key, _)| key.as_str()))?;

        Ok(keys
            .iter()
            .map(|(key, motion)| {
                let value = values
                    .get(key)
                    .and_then(Value::as_f64)
                    .unwrap_or(CONTROL_NORM_IDLE);
                (*motion, value)
            })
            .collect())
    }

    fn merge(&mut self) -> SurfaceResult<()> {
        let mode = self.core.mode()?;
        let merged = merge_motions(mode, &self.manual, &self.autonomous);
        debug!(%mode, "Merged motions");
        self.core.motions_mut().assign(&merged)?;
        Ok(())
    }

    fn convert(&mut self) -> SurfaceResult<()> {
        self.converted = Converter::convert(self.core.motions())?;
        Ok(())
    }
}

/// Select the final motions for `mode`.
///
/// In assisted mode a manual axis wins whenever it is not exactly idle.
fn merge_motions(mode: DrivingMode, manual: &Motions, autonomous: &Motions) -> Motions {
    match mode {
        DrivingMode::Manual => manual.clone(),
        DrivingMode::Autonomous => autonomous.clone(),
        DrivingMode::Assisted => manual
            .iter()
            .map(|(motion, value)| {
                let value = if *value != CONTROL_NORM_IDLE {
                    *value
                } else {
                    autonomous.get(motion).copied().unwrap_or(CONTROL_NORM_IDLE)
                };
                (*motion, value)
            })
            .collect(),
    }
}

impl ControlModel for ControlManager {
    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }

    fn update(&mut self) -> SurfaceResult<()> {
        self.pull()?;
        self.merge()?;
        self.convert()?;
        self.push()
    }

    /// Publishes the merged motions and the actuator values.
    fn push(&self) -> SurfaceResult<()> {
        self.core.push()?;
        self.core.store().transmission().update(
            self.converted
                .iter()
                .map(|(key, value)| (*key, Value::Int(*value))),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motions(pairs: &[(&'static str, f64)]) -> Motions {
        let mut out: Motions = MOTION_NAMES.iter().map(|m| (*m, 0.0)).collect();
        out.extend(pairs.iter().copied());
        out
    }

    #[test]
    fn manual_and_autonomous_modes_pick_one_source() {
        let manual = motions(&[("yaw", 0.2)]);
        let autonomous = motions(&[("yaw", -0.7)]);
        assert_eq!(merge_motions(DrivingMode::Manual, &manual, &autonomous)["yaw"], 0.2);
        assert_eq!(merge_motions(DrivingMode::Autonomous, &manual, &autonomous)["yaw"], -0.7);
    }

    #[test]
    fn assisted_falls_back_to_autonomous_on_idle_axes() {
        let manual = motions(&[("yaw", 0.0), ("pitch", 0.5)]);
        let autonomous = motions(&[("yaw", 0.3), ("pitch", 0.1)]);
        let merged = merge_motions(DrivingMode::Assisted, &manual, &autonomous);
        assert_eq!(merged["yaw"], 0.3);
        assert_eq!(merged["pitch"], 0.5);
    }

    #[test]
    fn assisted_treats_a_tiny_manual_value_as_intent() {
        // Only an exact idle defers to autonomous; 0.001 of stick wins.
        let manual = motions(&[("surge", 0.001)]);
        let autonomous = motions(&[("surge", 1.0)]);
        assert_eq!(merge_motions(DrivingMode::Assisted, &manual, &autonomous)["surge"], 0.001);
    }

    #[test]
    fn update_writes_transmission() {
        let store = DataManager::in_memory().unwrap();
        store.control().set("manual-surge", 1.0).unwrap();

        let mut manager = ControlManager::new(store.clone());
        manager.update().unwrap();

        assert_eq!(store.control().get("manager-surge").unwrap(), Value::Float(1.0));
        assert_eq!(store.transmission().get("T_HFP").unwrap(), Value::Int(1100));
        assert_eq!(store.transmission().get("T_HAP").unwrap(), Value::Int(1900));
        assert_eq!(manager.converted()["T_HAS"], 1900);
    }

    #[test]
    fn non_numeric_values_count_as_idle() {
        let store = DataManager::in_memory().unwrap();
        store.control().set("manual-yaw", "left").unwrap();

        let mut manager = ControlManager::new(store.clone());
        manager.update().unwrap();
        assert_eq!(store.control().get("manager-yaw").unwrap(), Value::Float(0.0));
    }
}
