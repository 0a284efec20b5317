//! Entity node types
//!
//! An entity is a node in the scene tree. Its per-type customization lives in
//! an [`EntityBehavior`] object rather than in a subclass chain: the behavior
//! receives the four lifecycle hooks and sees only its own [`EntityCore`],
//! never the tree around it.

use std::any::Any;

use log::trace;

use super::action::ActionId;
use super::error::{SceneError, SceneResult};
use super::properties::{default_properties, Properties, PropertiesExt, Property};
use crate::foundation::math::{Mat4, Transform};
use crate::render::RenderFrame;

slotmap::new_key_type! {
    /// Generational handle to an entity in a [`Scene`](super::Scene)
    ///
    /// Ids of released entities never alias a later entity.
    pub struct EntityId;
}

/// Lifecycle state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Spawned or re-parented, `init` has not completed since
    Uninitialized,
    /// `init` completed
    Initialized,
    /// `destroy` ran; terminal
    Destroyed,
}

/// Downcast support for trait objects
pub trait AsAny: Any {
    /// View as [`Any`]
    fn as_any(&self) -> &dyn Any;

    /// View as mutable [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-type customization hooks of an entity
///
/// All hooks default to no-ops. `render` takes `&self` and an immutable
/// [`EntityCore`]: rendering can queue work but never change the scene.
pub trait EntityBehavior: AsAny {
    /// Called once per initialization (again after re-parenting)
    fn init(&mut self, entity: &mut EntityCore) -> SceneResult<()> {
        let _ = entity;
        Ok(())
    }

    /// Called every update pass while `UpdateEnabled` is set
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> SceneResult<()> {
        let _ = (entity, delta_time);
        Ok(())
    }

    /// Called every render pass while `RenderEnabled` is set
    ///
    /// Renderable types queue themselves here with [`RenderFrame::submit`].
    fn render(&self, entity: &EntityCore, frame: &mut RenderFrame<'_>) -> SceneResult<()> {
        let _ = (entity, frame);
        Ok(())
    }

    /// Called once when the entity is destroyed
    fn destroy(&mut self, entity: &mut EntityCore) -> SceneResult<()> {
        let _ = entity;
        Ok(())
    }

    /// Type name used in diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Behavior of entities that only group children
#[derive(Debug, Default, Clone, Copy)]
pub struct Group;

impl EntityBehavior for Group {}

/// The part of an entity its hooks and actions may touch
#[derive(Debug, Clone)]
pub struct EntityCore {
    id: EntityId,
    properties: Properties,
    transform: Transform,
    world_matrix: Mat4,
}

impl EntityCore {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            properties: default_properties(),
            transform: Transform::identity(),
            world_matrix: Mat4::identity(),
        }
    }

    /// Id of the owning entity
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Property bits
    pub fn properties(&self) -> Properties {
        self.properties
    }

    /// Mutable property bits
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Read a named property
    pub fn property(&self, property: Property) -> bool {
        self.properties.has(property)
    }

    /// Write a named property
    pub fn set_property(&mut self, property: Property, value: bool) {
        self.properties.put(property, value);
    }

    /// Whether the entity asked to be removed
    pub fn is_dead(&self) -> bool {
        self.property(Property::Dead)
    }

    /// Ask the parent to remove this entity on its next update
    pub fn mark_dead(&mut self) {
        self.set_property(Property::Dead, true);
    }

    /// Local transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable local transform; marks the entity dirty
    pub fn transform_mut(&mut self) -> &mut Transform {
        self.set_property(Property::Dirty, true);
        &mut self.transform
    }

    /// World matrix as of the last init or update pass
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Build a behavior error attributed to this entity
    pub fn fail(&self, message: impl Into<String>) -> SceneError {
        SceneError::Behavior {
            entity: self.id,
            message: message.into(),
        }
    }

    pub(crate) fn refresh_world(&mut self, parent_world: &Mat4) {
        let local = self.transform.to_matrix();
        self.world_matrix = if self.property(Property::InheritTransform) {
            parent_world * local
        } else {
            local
        };
        self.set_property(Property::Dirty, false);
        trace!("Refreshed world matrix of {:?}", self.id);
    }
}

/// Arena slot holding one entity
pub(crate) struct EntityNode {
    pub(crate) core: EntityCore,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) actions: Vec<ActionId>,
    pub(crate) behavior: Option<Box<dyn EntityBehavior>>,
    /// The init hook ran and the matching destroy hook has not yet.
    /// Survives detaching, unlike the `Initialized` bit.
    pub(crate) destroy_owed: bool,
    pub(crate) destroyed: bool,
}

impl EntityNode {
    pub(crate) fn new(id: EntityId, behavior: Option<Box<dyn EntityBehavior>>) -> Self {
        Self {
            core: EntityCore::new(id),
            parent: None,
            children: Vec::new(),
            actions: Vec::new(),
            behavior,
            destroy_owed: false,
            destroyed: false,
        }
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        if self.destroyed {
            Lifecycle::Destroyed
        } else if self.core.property(Property::Initialized) {
            Lifecycle::Initialized
        } else {
            Lifecycle::Uninitialized
        }
    }

    /// Initialized, not destroyed and not waiting for the sweep
    pub(crate) fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Initialized && !self.core.is_dead()
    }
}
