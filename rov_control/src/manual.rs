//! Manual driving from a gamepad.
//!
//! Every hardware event updates a shadow copy of the pad, then recomputes
//! the one motion that channel drives:
//!
//! | Channel | Motion |
//! |---------|--------|
//! | left stick Y | surge |
//! | right stick X | sway |
//! | right stick Y | pitch |
//! | triggers (right wins, left negated) | yaw |
//! | B / X | roll max / min |
//! | RB / LB | heave max / min |
//! | Y / A | gripper max / min |
//! | hat X | cord |
//! | hat Y | micro thruster |
//!
//! The `BTN_SELECT` key forces manual mode and stops the vehicle; `BTN_START`
//! switches to assisted mode. Autonomous-only driving is never entered from
//! the pad.

pub mod device;

pub use device::{EvdevGamepad, InputDevice, InputEvent};

use crate::model::{ControlModel, ModelCore};
use crate::motion::MotionSet;
use crate::normalise::normalise;
use rov_common::consts::{
    CONTROL_MANUAL_NAME, CONTROL_NORM_IDLE, CONTROL_NORM_MAX, CONTROL_NORM_MIN, DEAD_ZONE,
    HARDWARE_AXIS_MAX, HARDWARE_AXIS_MIN, HARDWARE_TRIGGER_MAX, HARDWARE_TRIGGER_MIN,
    INTENDED_AXIS_MAX, INTENDED_AXIS_MIN, INTENDED_TRIGGER_MAX, INTENDED_TRIGGER_MIN,
};
use rov_common::error::{ControlResult, ControlSystemError, SurfaceResult};
use rov_common::types::DrivingMode;
use rov_store::DataManager;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Synchronisation marker sent after every batch of events.
pub const SYN_REPORT: &str = "SYN_REPORT";

// ─── Channels ───────────────────────────────────────────────────────

/// Physical input channel of the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    LeftAxisX,
    LeftAxisY,
    RightAxisX,
    RightAxisY,
    LeftTrigger,
    RightTrigger,
    HatX,
    HatY,
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    ButtonLb,
    ButtonRb,
    ButtonLeftStick,
    ButtonRightStick,
    ButtonSelect,
    ButtonStart,
}

impl Channel {
    /// Channel fed by a hardware event code.
    ///
    /// `BTN_START` drives the select channel and `BTN_SELECT` the start
    /// channel; this matches the labels printed on the supported pads.
    pub fn from_code(code: &str) -> Option<Self> {
        let channel = match code {
            "ABS_X" => Self::LeftAxisX,
            "ABS_Y" => Self::LeftAxisY,
            "ABS_RX" => Self::RightAxisX,
            "ABS_RY" => Self::RightAxisY,
            "ABS_Z" => Self::LeftTrigger,
            "ABS_RZ" => Self::RightTrigger,
            "ABS_HAT0X" => Self::HatX,
            "ABS_HAT0Y" => Self::HatY,
            "BTN_SOUTH" => Self::ButtonA,
            "BTN_EAST" => Self::ButtonB,
            "BTN_WEST" => Self::ButtonX,
            "BTN_NORTH" => Self::ButtonY,
            "BTN_TL" => Self::ButtonLb,
            "BTN_TR" => Self::ButtonRb,
            "BTN_THUMBL" => Self::ButtonLeftStick,
            "BTN_THUMBR" => Self::ButtonRightStick,
            "BTN_START" => Self::ButtonSelect,
            "BTN_SELECT" => Self::ButtonStart,
            _ => return None,
        };
        Some(channel)
    }
}

/// Shadow state of every pad channel.
///
/// Sticks and triggers are stored normalised, the hat raw, buttons as pressed flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadState {
    pub left_axis_x: f64,
    pub left_axis_y: f64,
    pub right_axis_x: f64,
    pub right_axis_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
    pub hat_x: i64,
    pub hat_y: i64,
    pub button_a: bool,
    pub button_b: bool,
    pub button_x: bool,
    pub button_y: bool,
    pub button_lb: bool,
    pub button_rb: bool,
    pub button_left_stick: bool,
    pub button_right_stick: bool,
    pub button_select: bool,
    pub button_start: bool,
}

/// `max` if `high`, else `min` if `low`, else idle.
fn ternary(high: bool, low: bool) -> f64 {
    if high {
        CONTROL_NORM_MAX
    } else if low {
        CONTROL_NORM_MIN
    } else {
        CONTROL_NORM_IDLE
    }
}

// ─── ManualController ───────────────────────────────────────────────

/// Control model driven by a gamepad.
#[derive(Debug, Clone)]
pub struct ManualController {
    core: ModelCore,
    pad: PadState,
    dead_zone: i64,
}

impl ManualController {
    /// Controller with the default stick dead zone.
    pub fn new(store: DataManager) -> Self {
        Self::with_dead_zone(store, DEAD_ZONE)
    }

    /// Controller treating stick values strictly inside `(-dead_zone, dead_zone)` as idle.
    pub fn with_dead_zone(store: DataManager, dead_zone: i64) -> Self {
        Self {
            core: ModelCore::new(CONTROL_MANUAL_NAME, store),
            pad: PadState::default(),
            dead_zone,
        }
    }

    /// Shadow pad state.
    pub fn pad(&self) -> &PadState {
        &self.pad
    }

    /// Apply one hardware event and push the resulting motions.
    ///
    /// `SYN_REPORT` is skipped and unknown codes are logged and ignored.
    pub fn dispatch(&mut self, event: &InputEvent) -> SurfaceResult<()> {
        if event.code == SYN_REPORT {
            return Ok(());
        }

        let Some(channel) = Channel::from_code(&event.code) else {
            warn!(code = %event.code, "Skipping event not registered in the dispatch map");
            return Ok(());
        };

        self.apply(channel, event.state)?;
        self.update()
    }

    /// Spawn the blocking read loop.
    ///
    /// # Errors
    ///
    /// `NoInputDevice` when `device` is `None`; the loop is not started.
    pub fn start<D>(self, device: Option<D>) -> ControlResult<JoinHandle<()>>
    where
        D: InputDevice + Send + 'static,
    {
        let Some(device) = device else {
            error!("Failed to detect the game controller");
            return Err(ControlSystemError::NoInputDevice(
                "can't start the manual controller without a game controller".to_owned(),
            ));
        };

        info!("Manual controller started");
        Ok(tokio::task::spawn_blocking(move || self.run(device)))
    }

    /// Read and dispatch events until the device fails.
    pub fn run<D: InputDevice>(mut self, mut device: D) {
        loop {
            let events = match device.read() {
                Ok(events) => events,
                Err(e) => {
                    error!(error = %e, "Input device read failed, manual controller stopped");
                    return;
                }
            };

            for event in &events {
                if let Err(e) = self.dispatch(event) {
                    error!(code = %event.code, state = event.state, error = %e, "Failed to dispatch input event");
                }
            }
        }
    }

    // ─── Channel updates ────────────────────────────────────────────

    fn apply(&mut self, channel: Channel, state: i64) -> SurfaceResult<()> {
        match channel {
            Channel::LeftAxisX => {
                self.pad.left_axis_x = self.normalise_axis(state)?;
            }
            Channel::LeftAxisY => {
                self.pad.left_axis_y = self.normalise_axis(state)?;
                let surge = self.pad.left_axis_y;
                self.motions_mut().set_surge(surge)?;
            }
            Channel::RightAxisX => {
                self.pad.right_axis_x = self.normalise_axis(state)?;
                let sway = self.pad.right_axis_x;
                self.motions_mut().set_sway(sway)?;
            }
            Channel::RightAxisY => {
                self.pad.right_axis_y = self.normalise_axis(state)?;
                let pitch = self.pad.right_axis_y;
                self.motions_mut().set_pitch(pitch)?;
            }
            Channel::LeftTrigger => {
                self.pad.left_trigger = normalise_trigger(state)?;
                self.update_yaw()?;
            }
            Channel::RightTrigger => {
                self.pad.right_trigger = normalise_trigger(state)?;
                self.update_yaw()?;
            }
            Channel::HatX => {
                self.pad.hat_x = state;
                let cord = ternary(state > 0, state < 0);
                self.motions_mut().set_cord(cord)?;
            }
            Channel::HatY => {
                self.pad.hat_y = state;
                // Hat up reports negative values.
                let micro = ternary(state < 0, state > 0);
                self.motions_mut().set_micro(micro)?;
            }
            Channel::ButtonA | Channel::ButtonY => {
                self.set_button(channel, state != 0);
                let gripper = ternary(self.pad.button_y, self.pad.button_a);
                self.motions_mut().set_gripper(gripper)?;
            }
            Channel::ButtonB | Channel::ButtonX => {
                self.set_button(channel, state != 0);
                let roll = ternary(self.pad.button_b, self.pad.button_x);
                self.motions_mut().set_roll(roll)?;
            }
            Channel::ButtonLb | Channel::ButtonRb => {
                self.set_button(channel, state != 0);
                let heave = ternary(self.pad.button_rb, self.pad.button_lb);
                self.motions_mut().set_heave(heave)?;
            }
            Channel::ButtonLeftStick | Channel::ButtonRightStick => {
                self.set_button(channel, state != 0);
            }
            Channel::ButtonSelect | Channel::ButtonStart => {
                self.set_button(channel, state != 0);
                self.update_mode()?;
            }
        }
        Ok(())
    }

    fn set_button(&mut self, channel: Channel, pressed: bool) {
        let slot = match channel {
            Channel::ButtonA => &mut self.pad.button_a,
            Channel::ButtonB => &mut self.pad.button_b,
            Channel::ButtonX => &mut self.pad.button_x,
            Channel::ButtonY => &mut self.pad.button_y,
            Channel::ButtonLb => &mut self.pad.button_lb,
            Channel::ButtonRb => &mut self.pad.button_rb,
            Channel::ButtonLeftStick => &mut self.pad.button_left_stick,
            Channel::ButtonRightStick => &mut self.pad.button_right_stick,
            Channel::ButtonSelect => &mut self.pad.button_select,
            Channel::ButtonStart => &mut self.pad.button_start,
            _ => return,
        };
        *slot = pressed;
    }

    fn update_yaw(&mut self) -> ControlResult<()> {
        let yaw = if self.pad.right_trigger != CONTROL_NORM_IDLE {
            self.pad.right_trigger
        } else if self.pad.left_trigger != CONTROL_NORM_IDLE {
            -self.pad.left_trigger
        } else {
            CONTROL_NORM_IDLE
        };
        self.motions_mut().set_yaw(yaw)
    }

    fn update_mode(&mut self) -> SurfaceResult<()> {
        if self.pad.button_start {
            if self.core.mode()? != DrivingMode::Manual {
                self.core.set_mode(DrivingMode::Manual)?;
                self.core.motions_mut().reset();
                info!("Switched to manual driving, motions reset");
            }
        } else if self.pad.button_select {
            self.core.set_mode(DrivingMode::Assisted)?;
            info!("Switched to assisted driving");
        }
        Ok(())
    }

    fn motions_mut(&mut self) -> &mut MotionSet {
        self.core.motions_mut()
    }

    fn normalise_axis(&self, value: i64) -> ControlResult<f64> {
        let value = if -self.dead_zone < value && value < self.dead_zone {
            debug!(value, "Stick value inside the dead zone");
            0
        } else {
            value
        };
        normalise(
            value as f64,
            HARDWARE_AXIS_MIN as f64,
            HARDWARE_AXIS_MAX as f64,
            INTENDED_AXIS_MIN,
            INTENDED_AXIS_MAX,
        )
    }
}

fn normalise_trigger(value: i64) -> ControlResult<f64> {
    normalise(
        value as f64,
        HARDWARE_TRIGGER_MIN as f64,
        HARDWARE_TRIGGER_MAX as f64,
        INTENDED_TRIGGER_MIN,
        INTENDED_TRIGGER_MAX,
    )
}

impl ControlModel for ManualController {
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
