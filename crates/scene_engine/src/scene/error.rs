//! Scene graph errors

use thiserror::Error;

use super::{ActionId, EntityId};
use crate::render::RenderError;

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised by scene graph operations
///
/// Structural variants are caller-recoverable: the caller passed a bad index
/// or reference and the tree is left unchanged. Lifecycle variants signal an
/// ordering bug (update before init, use after destroy).
#[derive(Error, Debug)]
pub enum SceneError {
    /// Entity id does not name a live arena slot
    #[error("entity {0:?} does not exist")]
    EntityNotFound(EntityId),

    /// Entity is not a child of the given parent
    #[error("entity {child:?} is not a child of {parent:?}")]
    ChildNotFound {
        /// Container searched
        parent: EntityId,
        /// Entity looked for
        child: EntityId,
    },

    /// Action is not attached to the given entity
    #[error("action {action:?} is not attached to {entity:?}")]
    ActionNotFound {
        /// Entity searched
        entity: EntityId,
        /// Action looked for
        action: ActionId,
    },

    /// Index past the end of a child or action list
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// List length
        len: usize,
    },

    /// Child already has a parent and must be detached first
    #[error("entity {child:?} is already attached to {parent:?}")]
    AlreadyAttached {
        /// Entity being attached
        child: EntityId,
        /// Its current parent
        parent: EntityId,
    },

    /// Attaching would make an entity its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent
        parent: EntityId,
        /// Requested child
        child: EntityId,
    },

    /// Attaching would nest the tree deeper than configured
    #[error("attaching would reach depth {depth}, limit is {max_depth}")]
    DepthExceeded {
        /// Resulting depth
        depth: usize,
        /// Configured limit
        max_depth: usize,
    },

    /// Lifecycle call on an entity that was never initialized
    #[error("entity {0:?} used before init")]
    NotInitialized(EntityId),

    /// Lifecycle call on a destroyed entity
    #[error("entity {0:?} used after destroy")]
    Destroyed(EntityId),

    /// Render dispatch failure surfaced through a render pass
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Failure reported by an entity behavior hook
    #[error("behavior failed on {entity:?}: {message}")]
    Behavior {
        /// Entity whose hook failed
        entity: EntityId,
        /// Hook-provided description
        message: String,
    },
}

impl SceneError {
    /// Whether the error is a structural (bad index or reference) error
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::EntityNotFound(_)
                | Self::ChildNotFound { .. }
                | Self::ActionNotFound { .. }
                | Self::IndexOutOfBounds { .. }
                | Self::AlreadyAttached { .. }
                | Self::CycleDetected { .. }
                | Self::DepthExceeded { .. }
        )
    }

    /// Whether the error is a lifecycle ordering violation
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::NotInitialized(_) | Self::Destroyed(_))
    }
}
