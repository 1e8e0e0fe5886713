//! Control model abstraction.
//!
//! Every motion source (manual, autonomous, the merging manager) owns a
//! [`MotionSet`] and publishes it to the `control` segment under its own
//! namespace, e.g. `manual-yaw`. The driving mode is not owned by any
//! model: it lives in the store so every model reads the same value.

use crate::motion::MotionSet;
use rov_common::consts::RK_CONTROL_DRIVING_MODE;
use rov_common::error::{StoreError, StoreResult, SurfaceResult};
use rov_common::types::DrivingMode;
use rov_store::{DataManager, Value};
use std::collections::BTreeSet;
use tracing::trace;

/// State shared by every control model.
#[derive(Debug, Clone)]
pub struct ModelCore {
    name: String,
    motions: MotionSet,
    store: DataManager,
}

impl ModelCore {
    /// Idle model publishing under `name`.
    pub fn new(name: impl Into<String>, store: DataManager) -> Self {
        Self {
            name: name.into(),
            motions: MotionSet::default(),
            store,
        }
    }

    /// Namespace of this model's keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current motions.
    pub fn motions(&self) -> &MotionSet {
        &self.motions
    }

    /// Mutable motions.
    pub fn motions_mut(&mut self) -> &mut MotionSet {
        &mut self.motions
    }

    /// Store handle.
    pub fn store(&self) -> &DataManager {
        &self.store
    }

    /// Store key of one motion, e.g. `manual-yaw`.
    pub fn key(&self, motion: &str) -> String {
        format!("{}-{}", self.name, motion)
    }

    /// Store keys of every motion of this model.
    pub fn keys(&self) -> BTreeSet<String> {
        self.motions.iter().map(|m| self.key(m.name())).collect()
    }

    /// Driving mode currently stored in the `control` segment.
    ///
    /// # Errors
    ///
    /// Store failures, or `Backend` if the stored value is not a known mode.
    pub fn mode(&self) -> StoreResult<DrivingMode> {
        let value = self.store.control().get(RK_CONTROL_DRIVING_MODE)?;
        value
            .as_i64()
            .and_then(DrivingMode::from_i64)
            .ok_or_else(|| StoreError::Backend {
                segment: self.store.control().name().to_owned(),
                key: RK_CONTROL_DRIVING_MODE.to_owned(),
                reason: format!("invalid driving mode {value}"),
            })
    }

    /// Store a new driving mode.
    pub fn set_mode(&self, mode: DrivingMode) -> StoreResult<()> {
        self.store
            .control()
            .set(RK_CONTROL_DRIVING_MODE, mode.as_i64())
    }

    /// Write every motion into the `control` segment.
    pub fn push(&self) -> StoreResult<()> {
        trace!(model = %self.name, "Pushing motions");
        self.store.control().update(
            self.motions
                .iter()
                .map(|m| (self.key(m.name()), Value::Float(m.value()))),
        )
    }
}

/// A source of vehicle motions.
///
/// Implementors recompute their motions in [`update`](Self::update) and
/// finish by calling [`push`](Self::push).
pub trait ControlModel {
    /// Shared model state.
    fn core(&self) -> &ModelCore;

    /// Mutable shared model state.
    fn core_mut(&mut self) -> &mut ModelCore;

    /// Recompute the motions from this model's inputs, then push them.
    fn update(&mut self) -> SurfaceResult<()>;

    /// Publish the motions to the store.
    fn push(&self) -> SurfaceResult<()> {
        self.core().push()?;
        Ok(())
    }

    /// Current motions.
    fn motions(&self) -> &MotionSet {
        self.core().motions()
    }

    /// Driving mode from the store.
    fn mode(&self) -> StoreResult<DrivingMode> {
        self.core().mode()
    }

    /// Store keys of this model.
    fn keys(&self) -> BTreeSet<String> {
        self.core().keys()
    }
}
