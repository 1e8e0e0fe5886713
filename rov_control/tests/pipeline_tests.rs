//! End-to-end control pipeline: input events through to transmission values

use rov_common::error::{ControlResult, ControlSystemError, SurfaceResult};
use rov_common::types::DrivingMode;
use rov_control::{
    AutonomousModel, ControlManager, ControlModel, InputDevice, InputEvent, ManualController,
};
use rov_store::{DataManager, Value};
use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::time::Duration;

/// Replays canned event batches, then reports the device as gone.
struct ScriptedPad {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedPad {
    fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }
}

impl InputDevice for ScriptedPad {
    fn read(&mut self) -> ControlResult<Vec<InputEvent>> {
        self.batches.pop_front().ok_or_else(|| {
            ControlSystemError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "unplugged"))
        })
    }
}

fn transmission(store: &DataManager, key: &str) -> i64 {
    store
        .transmission()
        .get(key)
        .ok()
        .and_then(|value| value.as_i64())
        .unwrap_or_default()
}

#[test]
fn test_full_surge_reaches_the_horizontal_thrusters() -> SurfaceResult<()> {
    let store = DataManager::in_memory()?;
    let mut pad = ManualController::new(store.clone());
    let mut manager = ControlManager::new(store.clone());

    pad.dispatch(&InputEvent::new("ABS_Y", 32767))?;
    manager.update()?;

    assert_eq!(transmission(&store, "T_HFP"), 1100);
    assert_eq!(transmission(&store, "T_HFS"), 1100);
    assert_eq!(transmission(&store, "T_HAP"), 1900);
    assert_eq!(transmission(&store, "T_HAS"), 1900);
    for vertical in ["T_VFP", "T_VFS", "T_VAP", "T_VAS"] {
        assert_eq!(transmission(&store, vertical), 1500, "{vertical}");
    }
    Ok(())
}

#[test]
fn test_autonomous_mode_ignores_the_pad() -> SurfaceResult<()> {
    let store = DataManager::in_memory()?;
    let mut pad = ManualController::new(store.clone());
    let mut autonomy = AutonomousModel::new(store.clone());
    let mut manager = ControlManager::new(store.clone());

    autonomy.core().set_mode(DrivingMode::Autonomous)?;
    autonomy.motions_mut().set_gripper(1.0)?;
    autonomy.update()?;
    pad.dispatch(&InputEvent::new("BTN_SOUTH", 1))?;
    manager.update()?;

    assert_eq!(manager.motions().gripper(), 1.0);
    assert_eq!(transmission(&store, "M_G"), 1600);
    Ok(())
}

#[test]
fn test_assisted_mode_mixes_both_sources() -> SurfaceResult<()> {
    let store = DataManager::in_memory()?;
    let mut pad = ManualController::new(store.clone());
    let mut autonomy = AutonomousModel::new(store.clone());
    let mut manager = ControlManager::new(store.clone());

    // BTN_START selects assisted driving.
    pad.dispatch(&InputEvent::new("BTN_START", 1))?;
    assert_eq!(pad.mode()?, DrivingMode::Assisted);

    let mut plan = BTreeMap::new();
    for motion in rov_common::consts::MOTION_NAMES {
        plan.insert(motion, 0.0);
    }
    plan.insert("yaw", 0.3);
    plan.insert("pitch", 0.1);
    autonomy.set_motions(&plan)?;
    autonomy.update()?;

    pad.dispatch(&InputEvent::new("ABS_RY", -32768))?;
    manager.update()?;

    assert_eq!(manager.motions().yaw(), 0.3);
    assert_eq!(manager.motions().pitch(), -1.0);
    assert_eq!(store.control().get("manager-yaw")?, Value::Float(0.3));
    Ok(())
}

#[test]
fn test_manual_controller_without_device_refuses_to_start() {
    let store = DataManager::in_memory().unwrap();
    let result = ManualController::new(store).start::<ScriptedPad>(None);
    assert!(matches!(result, Err(ControlSystemError::NoInputDevice(_))));
}

#[tokio::test]
async fn test_manual_controller_dispatches_every_event_of_a_batch() -> SurfaceResult<()> {
    let store = DataManager::in_memory()?;
    let device = ScriptedPad::new(vec![
        vec![
            InputEvent::new("ABS_Y", 32767),
            InputEvent::new("BTN_EAST", 1),
            InputEvent::new("SYN_REPORT", 0),
        ],
        vec![InputEvent::new("ABS_HAT0X", -1)],
    ]);

    let handle = ManualController::new(store.clone()).start(Some(device))?;
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("manual controller did not stop at end of input")
        .expect("manual controller panicked");

    assert_eq!(store.control().get("manual-surge")?, Value::Float(1.0));
    assert_eq!(store.control().get("manual-roll")?, Value::Float(1.0));
    assert_eq!(store.control().get("manual-cord")?, Value::Float(-1.0));
    Ok(())
}

#[tokio::test]
async fn test_control_manager_loop_keeps_transmission_fresh() -> SurfaceResult<()> {
    let store = DataManager::in_memory()?;
    let handle = ControlManager::new(store.clone()).spawn(Duration::from_millis(10));

    store.control().set("manual-heave", 1.0)?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(transmission(&store, "T_VFP"), 1900);
    handle.abort();
    Ok(())
}
