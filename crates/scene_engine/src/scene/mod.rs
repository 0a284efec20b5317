//! Scene graph core
//!
//! A tree of entities driven once per frame through
//! `init` → `update` → `render` → `destroy`.
//!
//! ## Architecture
//!
//! ```text
//! Scene (arena of entities and actions)
//!   ├─ EntityNode: properties, transform, parent, children, actions
//!   │     └─ EntityBehavior (per-type hooks)
//!   └─ ActionSlot: transient per-entity behaviors
//! ```
//!
//! - Structural changes happen only through [`Scene`] methods and the update
//!   pass; `render` borrows the scene immutably.
//! - Dead children are swept by their parent's update pass, all of them in
//!   the same pass.

mod action;
pub mod actions;
mod entity;
mod error;
mod graph;
pub mod properties;
mod snapshot;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionId, ActionStatus};
pub use entity::{AsAny, EntityBehavior, EntityCore, EntityId, Group, Lifecycle};
pub use error::{SceneError, SceneResult};
pub use graph::Scene;
pub use properties::{EntityFlags, Properties, PropertiesExt, Property};
pub use snapshot::EntitySnapshot;
