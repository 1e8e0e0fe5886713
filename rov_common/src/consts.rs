//! System-wide constants for the surface workspace.
//!
//! Single source of truth for normalised ranges, hardware ranges and store
//! keys. Imported by all crates; never duplicate a value locally.

use static_assertions::const_assert;

// ─── Normalised control range ───────────────────────────────────────

/// Lower bound of every motion value.
pub const CONTROL_NORM_MIN: f64 = -1.0;

/// Idle motion value.
pub const CONTROL_NORM_IDLE: f64 = 0.0;

/// Upper bound of every motion value.
pub const CONTROL_NORM_MAX: f64 = 1.0;

/// Decimal places kept by min-max normalisation.
pub const NORMALISATION_PRECISION: i32 = 3;

// ─── Hardware ranges ────────────────────────────────────────────────

/// Thruster PWM-equivalent minimum (full reverse).
pub const THRUSTER_MIN: i64 = 1100;
/// Thruster idle value.
pub const THRUSTER_IDLE: i64 = 1500;
/// Thruster PWM-equivalent maximum (full forward).
pub const THRUSTER_MAX: i64 = 1900;

/// Gripper minimum.
pub const GRIPPER_MIN: i64 = 1400;
/// Gripper idle value.
pub const GRIPPER_IDLE: i64 = 1500;
/// Gripper maximum.
pub const GRIPPER_MAX: i64 = 1600;

/// Cord minimum.
pub const CORD_MIN: i64 = 1400;
/// Cord idle value.
pub const CORD_IDLE: i64 = 1500;
/// Cord maximum.
pub const CORD_MAX: i64 = 1600;

const_assert!(THRUSTER_MIN < THRUSTER_IDLE && THRUSTER_IDLE < THRUSTER_MAX);
const_assert!(GRIPPER_MIN < GRIPPER_IDLE && GRIPPER_IDLE < GRIPPER_MAX);
const_assert!(CORD_MIN < CORD_IDLE && CORD_IDLE < CORD_MAX);

// ─── Input device ranges ────────────────────────────────────────────

/// Analog stick values strictly inside `(-DEAD_ZONE, DEAD_ZONE)` are idle.
pub const DEAD_ZONE: i64 = 1025;

/// Analog stick hardware maximum.
pub const HARDWARE_AXIS_MAX: i64 = 32767;
/// Analog stick hardware minimum.
pub const HARDWARE_AXIS_MIN: i64 = -32768;
/// Trigger hardware maximum.
pub const HARDWARE_TRIGGER_MAX: i64 = 1023;
/// Trigger hardware minimum.
pub const HARDWARE_TRIGGER_MIN: i64 = 0;

/// Stick values are normalised into the full motion range.
pub const INTENDED_AXIS_MIN: f64 = CONTROL_NORM_MIN;
/// Stick values are normalised into the full motion range.
pub const INTENDED_AXIS_MAX: f64 = CONTROL_NORM_MAX;
/// Triggers only ever produce a non-negative magnitude.
pub const INTENDED_TRIGGER_MIN: f64 = CONTROL_NORM_IDLE;
/// Triggers only ever produce a non-negative magnitude.
pub const INTENDED_TRIGGER_MAX: f64 = CONTROL_NORM_MAX;

// ─── Control models ─────────────────────────────────────────────────

/// Namespace of the autonomous control model keys.
pub const CONTROL_AUTONOMOUS_NAME: &str = "autonomous";
/// Namespace of the manual control model keys.
pub const CONTROL_MANUAL_NAME: &str = "manual";
/// Namespace of the merged (control manager) keys.
pub const CONTROL_MANAGER_NAME: &str = "manager";

/// The nine motion axes, in canonical order.
pub const MOTION_NAMES: [&str; 9] = [
    "yaw", "pitch", "roll", "sway", "surge", "heave", "cord", "gripper", "micro",
];

// ─── Store partitions and keys ──────────────────────────────────────

/// Partition holding the status of every network link.
pub const SEGMENT_CONNECTIONS: &str = "connections";
/// Partition holding telemetry received from the vehicle.
pub const SEGMENT_RECEIVED: &str = "received";
/// Partition holding actuator values shipped to the vehicle.
pub const SEGMENT_TRANSMISSION: &str = "transmission";
/// Partition holding every control model's motions and the driving mode.
pub const SEGMENT_CONTROL: &str = "control";
/// Partition for un-classified data.
pub const SEGMENT_MISCELLANEOUS: &str = "miscellaneous";

/// Driving mode key inside the control partition.
pub const RK_CONTROL_DRIVING_MODE: &str = "driving-mode";

/// Link status key of the surface ↔ onboard controller connection.
pub const RK_CONNECTION_SURFACE_PI: &str = "surface-pi";

/// Telemetry keys reported by the onboard controller.
pub const RECEIVED_KEYS: [&str; 4] = ["A_A", "A_B", "S_A", "S_B"];

/// Horizontal fore port thruster.
pub const T_HFP: &str = "T_HFP";
/// Horizontal fore starboard thruster.
pub const T_HFS: &str = "T_HFS";
/// Horizontal aft port thruster.
pub const T_HAP: &str = "T_HAP";
/// Horizontal aft starboard thruster.
pub const T_HAS: &str = "T_HAS";
/// Vertical fore port thruster.
pub const T_VFP: &str = "T_VFP";
/// Vertical fore starboard thruster.
pub const T_VFS: &str = "T_VFS";
/// Vertical aft port thruster.
pub const T_VAP: &str = "T_VAP";
/// Vertical aft starboard thruster.
pub const T_VAS: &str = "T_VAS";
/// Micro ROV thruster.
pub const T_M: &str = "T_M";
/// Cord motor.
pub const M_C: &str = "M_C";
/// Gripper motor.
pub const M_G: &str = "M_G";

// ─── Networking defaults ────────────────────────────────────────────

/// Default onboard controller host.
pub const DEFAULT_CONNECTION_HOST: &str = "localhost";
/// Default onboard controller port.
pub const DEFAULT_CONNECTION_PORT: u16 = 50000;
/// Default maximum size of a single inbound frame.
pub const DEFAULT_CONNECTION_DATA_SIZE: usize = 4096;
