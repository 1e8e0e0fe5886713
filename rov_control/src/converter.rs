//! Motion mixing: normalised motions to hardware actuator values.
//!
//! Eight thrusters sit at the corners of the frame, four horizontal and four
//! vertical. Each one follows a fixed priority rule over three axes and a
//! sign table that encodes its mounting. The micro thruster, cord and
//! gripper are single-axis pass-throughs.
//!
//! ```text
//!   fore
//!  HFP ─── HFS      VFP ─── VFS
//!   │       │        │       │
//!  HAP ─── HAS      VAP ─── VAS
//!   aft
//! ```

use crate::motion::MotionSet;
use crate::normalise::normalise;
use rov_common::consts::{
    CONTROL_NORM_IDLE, CONTROL_NORM_MAX, CONTROL_NORM_MIN, CORD_MAX, CORD_MIN, GRIPPER_MAX,
    GRIPPER_MIN, M_C, M_G, T_HAP, T_HAS, T_HFP, T_HFS, T_M, T_VAP, T_VAS, T_VFP, T_VFS,
    THRUSTER_MAX, THRUSTER_MIN,
};
use rov_common::error::{ControlResult, ControlSystemError};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Actuator values keyed by transmission key.
pub type Actuators = BTreeMap<&'static str, i64>;

// ─── Sign tables ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Axis {
    Surge,
    Yaw,
}

/// Horizontal thruster rule over surge, yaw and sway.
///
/// Evaluated in order: surge and yaw together, surge, sway, yaw, idle.
#[derive(Debug, Clone, Copy)]
struct HorizontalThruster {
    key: &'static str,
    /// Surge and yaw both active, surge backwards.
    backward: (Axis, f64),
    /// Surge and yaw both active, surge forwards.
    forward: (Axis, f64),
    surge: f64,
    sway: f64,
    yaw: f64,
}

/// Vertical thruster rule over heave, pitch and roll, evaluated in that order.
#[derive(Debug, Clone, Copy)]
struct VerticalThruster {
    key: &'static str,
    heave: f64,
    pitch: f64,
    roll: f64,
}

const HORIZONTAL: [HorizontalThruster; 4] = [
    HorizontalThruster {
        key: T_HFP,
        backward: (Axis::Surge, -1.0),
        forward: (Axis::Yaw, -1.0),
        surge: -1.0,
        sway: 1.0,
        yaw: -1.0,
    },
    HorizontalThruster {
        key: T_HFS,
        backward: (Axis::Surge, -1.0),
        forward: (Axis::Yaw, 1.0),
        surge: -1.0,
        sway: -1.0,
        yaw: 1.0,
    },
    HorizontalThruster {
        key: T_HAP,
        backward: (Axis::Yaw, -1.0),
        forward: (Axis::Surge, 1.0),
        surge: 1.0,
        sway: 1.0,
        yaw: 1.0,
    },
    HorizontalThruster {
        key: T_HAS,
        backward: (Axis::Yaw, 1.0),
        forward: (Axis::Surge, 1.0),
        surge: 1.0,
        sway: -1.0,
        yaw: -1.0,
    },
];

const VERTICAL: [VerticalThruster; 4] = [
    VerticalThruster {
        key: T_VFP,
        heave: 1.0,
        pitch: -1.0,
        roll: 1.0,
    },
    VerticalThruster {
        key: T_VFS,
        heave: 1.0,
        pitch: -1.0,
        roll: -1.0,
    },
    VerticalThruster {
        key: T_VAP,
        heave: 1.0,
        pitch: 1.0,
        roll: 1.0,
    },
    VerticalThruster {
        key: T_VAS,
        heave: 1.0,
        pitch: 1.0,
        roll: -1.0,
    },
];

#[inline]
fn active(value: f64) -> bool {
    value != CONTROL_NORM_IDLE
}

impl HorizontalThruster {
    fn mix(&self, surge: f64, yaw: f64, sway: f64) -> f64 {
        if active(surge) && active(yaw) {
            let (axis, sign) = if surge < CONTROL_NORM_IDLE {
                self.backward
            } else {
                self.forward
            };
            match axis {
                Axis::Surge => sign * surge,
                Axis::Yaw => sign * yaw,
            }
        } else if active(surge) {
            self.surge * surge
        } else if active(sway) {
            self.sway * sway
        } else if active(yaw) {
            self.yaw * yaw
        } else {
            CONTROL_NORM_IDLE
        }
    }
}

impl VerticalThruster {
    fn mix(&self, heave: f64, pitch: f64, roll: f64) -> f64 {
        if active(heave) {
            self.heave * heave
        } else if active(pitch) {
            self.pitch * pitch
        } else if active(roll) {
            self.roll * roll
        } else {
            CONTROL_NORM_IDLE
        }
    }
}

// ─── Converter ──────────────────────────────────────────────────────

/// Stateless motion to actuator conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter;

impl Converter {
    /// Actuator values for a motion set.
    pub fn convert(motions: &MotionSet) -> ControlResult<Actuators> {
        Self::mix(&Axes {
            yaw: motions.yaw(),
            pitch: motions.pitch(),
            roll: motions.roll(),
            sway: motions.sway(),
            surge: motions.surge(),
            heave: motions.heave(),
            cord: motions.cord(),
            gripper: motions.gripper(),
            micro: motions.micro(),
        })
    }

    /// Actuator values for a name → value map.
    ///
    /// # Errors
    ///
    /// `MissingMotion` if an axis is absent, `OutOfRange` if a value is not
    /// normalised.
    pub fn convert_map<K>(motions: &BTreeMap<K, f64>) -> ControlResult<Actuators>
    where
        K: Borrow<str> + Ord,
    {
        let axis = |name: &str| {
            motions
                .get(name)
                .copied()
                .ok_or_else(|| ControlSystemError::MissingMotion(name.to_owned()))
        };

        Self::mix(&Axes {
            yaw: axis("yaw")?,
            pitch: axis("pitch")?,
            roll: axis("roll")?,
            sway: axis("sway")?,
            surge: axis("surge")?,
            heave: axis("heave")?,
            cord: axis("cord")?,
            gripper: axis("gripper")?,
            micro: axis("micro")?,
        })
    }

    fn mix(axes: &Axes) -> ControlResult<Actuators> {
        let mut out = Actuators::new();

        for thruster in &HORIZONTAL {
            let value = thruster.mix(axes.surge, axes.yaw, axes.sway);
            out.insert(thruster.key, to_hardware(value, THRUSTER_MIN, THRUSTER_MAX)?);
        }
        for thruster in &VERTICAL {
            let value = thruster.mix(axes.heave, axes.pitch, axes.roll);
            out.insert(thruster.key, to_hardware(value, THRUSTER_MIN, THRUSTER_MAX)?);
        }

        out.insert(T_M, to_hardware(axes.micro, THRUSTER_MIN, THRUSTER_MAX)?);
        out.insert(M_C, to_hardware(axes.cord, CORD_MIN, CORD_MAX)?);
        out.insert(M_G, to_hardware(axes.gripper, GRIPPER_MIN, GRIPPER_MAX)?);
        Ok(out)
    }
}

struct Axes {
    yaw: f64,
    pitch: f64,
    roll: f64,
    sway: f64,
    surge: f64,
    heave: f64,
    cord: f64,
    gripper: f64,
    micro: f64,
}

/// Rescale a normalised value into `[min, max]` and truncate.
fn to_hardware(value: f64, min: i64, max: i64) -> ControlResult<i64> {
    let scaled = normalise(
        value,
        CONTROL_NORM_MIN,
        CONTROL_NORM_MAX,
        min as f64,
        max as f64,
    )?;
    Ok(scaled as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rov_common::consts::{CORD_IDLE, GRIPPER_IDLE, THRUSTER_IDLE};

    fn motions(pairs: &[(&str, f64)]) -> MotionSet {
        let mut set = MotionSet::default();
        let mut values: BTreeMap<&str, f64> = rov_common::consts::MOTION_NAMES
            .iter()
            .map(|name| (*name, 0.0))
            .collect();
        for &(name, value) in pairs {
            values.insert(name, value);
        }
        set.assign(&values).unwrap();
        set
    }

    #[test]
    fn idle_motions_idle_every_actuator() {
        let out = Converter::convert(&MotionSet::default()).unwrap();
        assert_eq!(out.len(), 11);
        for key in [T_HFP, T_HFS, T_HAP, T_HAS, T_VFP, T_VFS, T_VAP, T_VAS, T_M] {
            assert_eq!(out[key], THRUSTER_IDLE, "{key}");
        }
        assert_eq!(out[M_C], CORD_IDLE);
        assert_eq!(out[M_G], GRIPPER_IDLE);
    }

    #[test]
    fn full_surge_drives_fore_thrusters_reversed() {
        let out = Converter::convert(&motions(&[("surge", 1.0)])).unwrap();
        assert_eq!(out[T_HFP], THRUSTER_MIN);
        assert_eq!(out[T_HFS], THRUSTER_MIN);
        assert_eq!(out[T_HAP], THRUSTER_MAX);
        assert_eq!(out[T_HAS], THRUSTER_MAX);
    }

    #[test]
    fn sway_table() {
        let out = Converter::convert(&motions(&[("sway", 0.5)])).unwrap();
        assert_eq!(out[T_HFP], 1700);
        assert_eq!(out[T_HFS], 1300);
        assert_eq!(out[T_HAP], 1700);
        assert_eq!(out[T_HAS], 1300);
    }

    #[test]
    fn yaw_table() {
        let out = Converter::convert(&motions(&[("yaw", 0.5)])).unwrap();
        assert_eq!(out[T_HFP], 1300);
        assert_eq!(out[T_HFS], 1700);
        assert_eq!(out[T_HAP], 1700);
        assert_eq!(out[T_HAS], 1300);
    }

    #[test]
    fn surge_beats_sway_and_yaw_alone() {
        let out = Converter::convert(&motions(&[("surge", 0.5), ("sway", 1.0)])).unwrap();
        assert_eq!(out[T_HFP], 1300);
        assert_eq!(out[T_HAS], 1700);
    }

    #[test]
    fn surge_and_yaw_forward() {
        let out = Converter::convert(&motions(&[("surge", 0.5), ("yaw", 0.25)])).unwrap();
        assert_eq!(out[T_HFP], 1400); // -yaw
        assert_eq!(out[T_HFS], 1600); // +yaw
        assert_eq!(out[T_HAP], 1700); // +surge
        assert_eq!(out[T_HAS], 1700); // +surge
    }

    #[test]
    fn surge_and_yaw_backward() {
        let out = Converter::convert(&motions(&[("surge", -0.5), ("yaw", 0.25)])).unwrap();
        assert_eq!(out[T_HFP], 1700); // -surge
        assert_eq!(out[T_HFS], 1700); // -surge
        assert_eq!(out[T_HAP], 1400); // -yaw
        assert_eq!(out[T_HAS], 1600); // +yaw
    }

    #[test]
    fn vertical_priority_and_signs() {
        let out = Converter::convert(&motions(&[("heave", 0.5), ("pitch", 1.0)])).unwrap();
        for key in [T_VFP, T_VFS, T_VAP, T_VAS] {
            assert_eq!(out[key], 1700, "{key}");
        }

        let out = Converter::convert(&motions(&[("pitch", 0.5), ("roll", 1.0)])).unwrap();
        assert_eq!(out[T_VFP], 1300);
        assert_eq!(out[T_VFS], 1300);
        assert_eq!(out[T_VAP], 1700);
        assert_eq!(out[T_VAS], 1700);

        let out = Converter::convert(&motions(&[("roll", 0.5)])).unwrap();
        assert_eq!(out[T_VFP], 1700);
        assert_eq!(out[T_VFS], 1300);
        assert_eq!(out[T_VAP], 1700);
        assert_eq!(out[T_VAS], 1300);
    }

    #[test]
    fn pass_throughs_use_their_own_ranges() {
        let out = Converter::convert(&motions(&[
            ("micro", 1.0),
            ("cord", -1.0),
            ("gripper", 1.0),
        ]))
        .unwrap();
        assert_eq!(out[T_M], THRUSTER_MAX);
        assert_eq!(out[M_C], CORD_MIN);
        assert_eq!(out[M_G], GRIPPER_MAX);
    }

    #[test]
    fn fractional_values_truncate() {
        // 1500.16
        let out = Converter::convert(&motions(&[("micro", 0.0004)])).unwrap();
        assert_eq!(out[T_M], 1500);
        // 1499.84
        let out = Converter::convert(&motions(&[("micro", -0.0004)])).unwrap();
        assert_eq!(out[T_M], 1499);
    }

    #[test]
    fn map_input_requires_every_axis() {
        let values = BTreeMap::from([("yaw", 0.0), ("pitch", 0.0)]);
        assert!(matches!(
            Converter::convert_map(&values),
            Err(ControlSystemError::MissingMotion(_))
        ));
    }

    #[test]
    fn map_input_rejects_unnormalised_values() {
        let mut values: BTreeMap<String, f64> = rov_common::consts::MOTION_NAMES
            .iter()
            .map(|name| (name.to_string(), 0.0))
            .collect();
        values.insert("surge".into(), 3.0);
        assert!(matches!(
            Converter::convert_map(&values),
            Err(ControlSystemError::OutOfRange { .. })
        ));
    }
}
