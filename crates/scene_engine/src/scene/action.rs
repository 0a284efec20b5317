//! Actions: transient behaviors attached to an entity
//!
//! An action runs alongside its entity's own hooks. Each update pass drives
//! every attached action once; an action that reports
//! [`ActionStatus::Finished`] is destroyed and detached in the same pass.

use super::entity::{AsAny, EntityCore, EntityId};

slotmap::new_key_type! {
    /// Handle to an action attached to an entity
    pub struct ActionId;
}

/// Result of driving an action for one update pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// Keep the action attached
    Continue,
    /// Destroy and detach the action
    Finished,
}

impl ActionStatus {
    /// `Finished` when `done` is true
    pub fn finished_if(done: bool) -> Self {
        if done {
            Self::Finished
        } else {
            Self::Continue
        }
    }
}

/// A one-shot or repeating behavior attached to an entity
pub trait Action: AsAny {
    /// Called once before the first update, when the entity is initialized
    fn init(&mut self, entity: &mut EntityCore) {
        let _ = entity;
    }

    /// Advance the action by one update pass
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> ActionStatus;

    /// Called once when the action is detached or its entity destroyed
    fn destroy(&mut self, entity: &mut EntityCore) {
        let _ = entity;
    }
}

/// Arena slot holding one attached action
pub(crate) struct ActionSlot {
    pub(crate) owner: EntityId,
    pub(crate) initialized: bool,
    pub(crate) action: Box<dyn Action>,
}

impl ActionSlot {
    pub(crate) fn new(owner: EntityId, action: Box<dyn Action>) -> Self {
        Self {
            owner,
            initialized: false,
            action,
        }
    }

    pub(crate) fn ensure_init(&mut self, entity: &mut EntityCore) {
        if !self.initialized {
            self.action.init(entity);
            self.initialized = true;
        }
    }

    pub(crate) fn teardown(mut self, entity: &mut EntityCore) {
        if self.initialized {
            self.action.destroy(entity);
        }
    }
}
