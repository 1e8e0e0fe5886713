//! # ROV Control System
//!
//! Turns operator and autonomous intent into actuator values.
//!
//! ## Data Flow
//!
//! ```text
//! gamepad ──► ManualController ──► control:manual-*     ──┐
//!                                                          ├──► ControlManager ──► control:manager-*
//! autonomy ─► AutonomousModel ───► control:autonomous-* ──┘          │
//!                                                                    └──► transmission:T_*, M_*
//! ```
//!
//! Every model owns nine normalised motions (`yaw`, `pitch`, `roll`, `sway`,
//! `surge`, `heave`, `cord`, `gripper`, `micro`), each in `[-1, 1]`. The
//! driving mode stored under `control:driving-mode` decides which source the
//! [`ControlManager`] forwards:
//!
//! - **Manual**: manual motions only
//! - **Autonomous**: autonomous motions only
//! - **Assisted**: manual where the operator is touching the axis, autonomous elsewhere
//!
//! Models never call each other. They share state exclusively through the
//! [`rov_store::DataManager`].

pub mod autonomous;
pub mod converter;
pub mod manager;
pub mod manual;
pub mod model;
pub mod motion;
pub mod normalise;

pub use autonomous::AutonomousModel;
pub use converter::{Actuators, Converter};
pub use manager::ControlManager;
pub use manual::{EvdevGamepad, InputDevice, InputEvent, ManualController};
pub use model::{ControlModel, ModelCore};
pub use motion::{Motion, MotionSet};
pub use normalise::normalise;
