//! # Rendering
//!
//! Routes each rendered entity type to its registered protocol.
//!
//! ## Frame flow
//!
//! ```text
//! Scene::render ──► EntityBehavior::render ──► RenderFrame::submit
//!                                                   │
//!                             RenderDispatch queue ◄┘
//!                                   │
//! RenderDispatch::render_frame ──► RenderProtocol::render ──► GraphicsContext
//! ```
//!
//! Protocols are the only place draw calls are issued. The graphics context
//! is an external collaborator; [`HeadlessGraphics`] records calls instead
//! of drawing.

pub mod dispatch;
pub mod graphics;
pub mod headless;
pub mod sprite;

use thiserror::Error;

use crate::scene::EntityId;

pub use dispatch::{ProtocolIndex, RenderDispatch, RenderFrame, RenderProtocol, Renderable};
pub use graphics::{
    DrawCall, GraphicsContext, GraphicsError, GraphicsResult, ResourceHandle, ResourceKind, Viewport,
};
pub use headless::{GraphicsCommand, HeadlessGraphics};
pub use sprite::{Image, ImageProtocol};

/// Errors raised while queueing or dispatching rendered entities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No protocol is registered under this index
    #[error("no render protocol registered at {0}")]
    UnknownProtocol(ProtocolIndex),

    /// Queued entity does not have the type its protocol draws
    #[error("render protocol expects {expected}, found {found}")]
    TypeMismatch {
        /// Target type of the protocol
        expected: &'static str,
        /// Behavior type of the queued entity
        found: &'static str,
    },

    /// Queued entity has no behavior to hand to the protocol
    #[error("entity {0:?} has no behavior to render")]
    MissingBehavior(EntityId),

    /// Queued entity no longer exists
    #[error("queued entity {0:?} no longer exists")]
    StaleEntity(EntityId),

    /// The registry was destroyed
    #[error("render dispatch has been shut down")]
    RegistryShutDown,

    /// Graphics context failure
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}
