//! Normalised motion values.
//!
//! A motion is one degree-of-freedom command in `[-1.0, 1.0]`. Nine of them
//! (six rigid-body axes plus cord, gripper and micro thruster) form a
//! [`MotionSet`], the unit every control model works with.

use rov_common::consts::{CONTROL_NORM_IDLE, CONTROL_NORM_MAX, CONTROL_NORM_MIN, MOTION_NAMES};
use rov_common::error::{ControlResult, ControlSystemError};
use std::collections::BTreeMap;

// ─── Motion ─────────────────────────────────────────────────────────

/// A named scalar bounded to the normalised control range.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    name: &'static str,
    value: f64,
}

impl Motion {
    /// Idle motion.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            value: CONTROL_NORM_IDLE,
        }
    }

    /// Motion name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current value.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Assign a new value.
    ///
    /// # Errors
    ///
    /// `NotNormalised` if `value` is outside `[-1.0, 1.0]` (NaN included).
    /// The stored value is left unchanged.
    pub fn set(&mut self, value: f64) -> ControlResult<()> {
        if !(CONTROL_NORM_MIN..=CONTROL_NORM_MAX).contains(&value) {
            return Err(ControlSystemError::NotNormalised {
                name: self.name.to_owned(),
                value,
                min: CONTROL_NORM_MIN,
                max: CONTROL_NORM_MAX,
            });
        }
        self.value = value;
        Ok(())
    }
}

// ─── MotionSet ──────────────────────────────────────────────────────

/// The nine motions owned by every control model.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSet {
    yaw: Motion,
    pitch: Motion,
    roll: Motion,
    sway: Motion,
    surge: Motion,
    heave: Motion,
    cord: Motion,
    gripper: Motion,
    micro: Motion,
}

impl Default for MotionSet {
    fn default() -> Self {
        Self {
            yaw: Motion::new("yaw"),
            pitch: Motion::new("pitch"),
            roll: Motion::new("roll"),
            sway: Motion::new("sway"),
            surge: Motion::new("surge"),
            heave: Motion::new("heave"),
            cord: Motion::new("cord"),
            gripper: Motion::new("gripper"),
            micro: Motion::new("micro"),
        }
    }
}

macro_rules! motion_accessors {
    ($($field:ident => $setter:ident),* $(,)?) => {
        $(
            #[doc = concat!("Current ", stringify!($field), ".")]
            #[inline]
            pub const fn $field(&self) -> f64 {
                self.$field.value()
            }

            #[doc = concat!("Assign ", stringify!($field), "; rejects values outside the normalised range.")]
            pub fn $setter(&mut self, value: f64) -> ControlResult<()> {
                self.$field.set(value)
            }
        )*
    };
}

impl MotionSet {
    motion_accessors! {
        yaw => set_yaw,
        pitch => set_pitch,
        roll => set_roll,
        sway => set_sway,
        surge => set_surge,
        heave => set_heave,
        cord => set_cord,
        gripper => set_gripper,
        micro => set_micro,
    }

    /// Every motion, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Motion> {
        [
            &self.yaw,
            &self.pitch,
            &self.roll,
            &self.sway,
            &self.surge,
            &self.heave,
            &self.cord,
            &self.gripper,
            &self.micro,
        ]
        .into_iter()
    }

    /// Name → value view.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        self.iter().map(|m| (m.name(), m.value())).collect()
    }

    /// Assign every motion from `values`, looked up by name.
    ///
    /// Assignment happens field by field; on error, motions assigned before
    /// the failing one keep their new value.
    ///
    /// # Errors
    ///
    /// `MissingMotion` naming the first absent axis, or `NotNormalised`.
    pub fn assign<K>(&mut self, values: &BTreeMap<K, f64>) -> ControlResult<()>
    where
        K: std::borrow::Borrow<str> + Ord,
    {
        let lookup = |name: &str| {
            values
                .get(name)
                .copied()
                .ok_or_else(|| ControlSystemError::MissingMotion(name.to_owned()))
        };

        self.yaw.set(lookup("yaw")?)?;
        self.pitch.set(lookup("pitch")?)?;
        self.roll.set(lookup("roll")?)?;
        self.sway.set(lookup("sway")?)?;
        self.surge.set(lookup("surge")?)?;
        self.heave.set(lookup("heave")?)?;
        self.cord.set(lookup("cord")?)?;
        self.gripper.set(lookup("gripper")?)?;
        self.micro.set(lookup("micro")?)?;
        Ok(())
    }

    /// Return every motion to idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether every motion is idle.
    pub fn is_idle(&self) -> bool {
        self.iter().all(|m| m.value() == CONTROL_NORM_IDLE)
    }
}

static_assertions::const_assert_eq!(MOTION_NAMES.len(), 9);
