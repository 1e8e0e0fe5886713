//! Input device boundary.
//!
//! The manual controller consumes a stream of `{code, state}` events. Codes
//! use the Linux kernel names (`ABS_Y`, `BTN_SOUTH`, `SYN_REPORT`, ...).

use rov_common::config::InputConfig;
use rov_common::error::{ControlResult, ControlSystemError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// One hardware event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Kernel event code name.
    pub code: String,
    /// Raw event value.
    pub state: i64,
}

impl InputEvent {
    /// Build an event from a code name and value.
    pub fn new(code: impl Into<String>, state: i64) -> Self {
        Self {
            code: code.into(),
            state,
        }
    }
}

/// A blocking source of input events.
pub trait InputDevice {
    /// Block until at least one event is available.
    ///
    /// # Errors
    ///
    /// `Device` when the device can no longer be read.
    fn read(&mut self) -> ControlResult<Vec<InputEvent>>;
}

// ─── Linux evdev ────────────────────────────────────────────────────

const EV_SYN: u16 = 0x00;
const EV_KEY: u16 = 0x01;
const EV_ABS: u16 = 0x03;

/// Size of one `struct input_event` on this target.
pub const EVENT_SIZE: usize = std::mem::size_of::<libc::input_event>();

static_assertions::const_assert!(EVENT_SIZE >= 16);

/// Directory scanned for joysticks when no device is configured.
pub const BY_ID_DIR: &str = "/dev/input/by-id";

const JOYSTICK_SUFFIX: &str = "-event-joystick";

fn code_name(kind: u16, code: u16) -> Option<&'static str> {
    let name = match (kind, code) {
        (EV_SYN, 0x00) => "SYN_REPORT",
        (EV_SYN, 0x03) => "SYN_DROPPED",

        (EV_ABS, 0x00) => "ABS_X",
        (EV_ABS, 0x01) => "ABS_Y",
        (EV_ABS, 0x02) => "ABS_Z",
        (EV_ABS, 0x03) => "ABS_RX",
        (EV_ABS, 0x04) => "ABS_RY",
        (EV_ABS, 0x05) => "ABS_RZ",
        (EV_ABS, 0x10) => "ABS_HAT0X",
        (EV_ABS, 0x11) => "ABS_HAT0Y",

        (EV_KEY, 0x130) => "BTN_SOUTH",
        (EV_KEY, 0x131) => "BTN_EAST",
        (EV_KEY, 0x133) => "BTN_NORTH",
        (EV_KEY, 0x134) => "BTN_WEST",
        (EV_KEY, 0x136) => "BTN_TL",
        (EV_KEY, 0x137) => "BTN_TR",
        (EV_KEY, 0x13a) => "BTN_SELECT",
        (EV_KEY, 0x13b) => "BTN_START",
        (EV_KEY, 0x13c) => "BTN_MODE",
        (EV_KEY, 0x13d) => "BTN_THUMBL",
        (EV_KEY, 0x13e) => "BTN_THUMBR",
        _ => return None,
    };
    Some(name)
}

/// Decode one raw `input_event` record.
///
/// The record ends with `type: u16, code: u16, value: i32` after the
/// timestamp, whatever the timestamp width. Only key, absolute and sync
/// events are reported.
pub fn decode_event(record: &[u8]) -> Option<InputEvent> {
    let tail = record.len().checked_sub(8).map(|at| &record[at..])?;
    let kind = u16::from_ne_bytes([tail[0], tail[1]]);
    let code = u16::from_ne_bytes([tail[2], tail[3]]);
    let value = i32::from_ne_bytes([tail[4], tail[5], tail[6], tail[7]]);

    let name = match kind {
        EV_SYN | EV_KEY | EV_ABS => code_name(kind, code)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("UNKNOWN_{kind:#04x}_{code:#05x}")),
        _ => {
            trace!(kind, code, value, "Ignoring non-gamepad event");
            return None;
        }
    };

    Some(InputEvent::new(name, i64::from(value)))
}

/// Gamepad read from a Linux event device.
#[derive(Debug)]
pub struct EvdevGamepad {
    path: PathBuf,
    file: File,
}

impl EvdevGamepad {
    /// Open an event device.
    pub fn open(path: impl AsRef<Path>) -> ControlResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            ControlSystemError::NoInputDevice(format!("{}: {e}", path.display()))
        })?;
        info!(device = %path.display(), "Opened input device");
        Ok(Self { path, file })
    }

    /// Open the first joystick listed in `dir`.
    pub fn discover_in(dir: impl AsRef<Path>) -> ControlResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ControlSystemError::NoInputDevice(format!("{}: {e}", dir.display()))
        })?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(JOYSTICK_SUFFIX))
            })
            .collect();
        candidates.sort();
        debug!(dir = %dir.display(), found = candidates.len(), "Scanned for joysticks");

        let first = candidates.into_iter().next().ok_or_else(|| {
            ControlSystemError::NoInputDevice(format!("no joystick in {}", dir.display()))
        })?;
        Self::open(first)
    }

    /// Open the configured device, or discover one.
    pub fn from_config(config: &InputConfig) -> ControlResult<Self> {
        match &config.device {
            Some(path) => Self::open(path),
            None => Self::discover_in(BY_ID_DIR),
        }
    }

    /// Device path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InputDevice for EvdevGamepad {
    fn read(&mut self) -> ControlResult<Vec<InputEvent>> {
        loop {
            let mut record = [0u8; EVENT_SIZE];
            self.file.read_exact(&mut record)?;
            if let Some(event) = decode_event(&record) {
                return Ok(vec![event]);
            }
        }
    }
}
