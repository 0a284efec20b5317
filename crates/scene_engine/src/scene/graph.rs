//! The scene tree
//!
//! [`Scene`] owns every entity and action in generational arenas. Parent and
//! child links are ids, so a child can never outlive its slot and a stale id
//! is reported instead of dereferenced.
//!
//! ## Lifecycle
//!
//! ```text
//! spawn ──► Uninitialized ──init──► Initialized ──destroy/kill──► Destroyed
//!                 ▲                      │
//!                 └──── re-parented ─────┘
//! ```
//!
//! `update` and `render` require an initialized entity. `destroy` is
//! idempotent. `kill` marks the entity dead and destroys it; the parent
//! detaches it during its next update sweep.
//!
//! Re-parenting runs the init hook again but not the destroy hook in between.
//! The destroy hook runs exactly once for an entity whose init hook ran at
//! least once, even when it is destroyed while detached.

use log::{debug, trace, warn};
use slotmap::SlotMap;

use super::action::{Action, ActionId, ActionSlot, ActionStatus};
use super::entity::{EntityBehavior, EntityCore, EntityId, EntityNode, Group, Lifecycle};
use super::error::{SceneError, SceneResult};
use super::properties::{Properties, Property};
use crate::core::config::SceneConfig;
use crate::foundation::math::{Mat4, Transform};
use crate::render::RenderFrame;

/// Hierarchy of entities with their attached actions
pub struct Scene {
    entities: SlotMap<EntityId, EntityNode>,
    actions: SlotMap<ActionId, ActionSlot>,
    config: SceneConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            entities: SlotMap::with_key(),
            actions: SlotMap::with_key(),
            config,
        }
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // --- storage ---------------------------------------------------------

    /// Spawn a detached, uninitialized entity
    pub fn spawn(&mut self, behavior: impl EntityBehavior) -> EntityId {
        self.spawn_boxed(Box::new(behavior))
    }

    /// Spawn a detached entity from a boxed behavior
    pub fn spawn_boxed(&mut self, behavior: Box<dyn EntityBehavior>) -> EntityId {
        let id = self.entities.insert_with_key(|id| EntityNode::new(id, Some(behavior)));
        trace!("Spawned entity {id:?}");
        id
    }

    /// Spawn a detached entity that only groups children
    pub fn spawn_group(&mut self) -> EntityId {
        self.spawn(Group)
    }

    /// Spawn a detached entity without any behavior
    pub fn spawn_empty(&mut self) -> EntityId {
        self.entities.insert_with_key(|id| EntityNode::new(id, None))
    }

    /// Detach, destroy and release an entity with its whole subtree
    ///
    /// Destruction is best-effort: storage is released even when a hook fails,
    /// and the first failure is returned afterwards.
    pub fn despawn(&mut self, id: EntityId) -> SceneResult<()> {
        let node = self.node(id)?;
        if let Some(parent) = node.parent {
            self.detach(parent, id)?;
        }

        let result = self.destroy_subtree(id);
        self.release_subtree(id);
        debug!("Despawned entity {id:?}");
        result
    }

    /// Whether `id` names a live arena slot
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of entities held by the scene
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn node(&self, id: EntityId) -> SceneResult<&EntityNode> {
        self.entities.get(id).ok_or(SceneError::EntityNotFound(id))
    }

    fn node_mut(&mut self, id: EntityId) -> SceneResult<&mut EntityNode> {
        self.entities.get_mut(id).ok_or(SceneError::EntityNotFound(id))
    }

    // --- per-entity state ------------------------------------------------

    /// Hook-visible state of an entity
    pub fn core(&self, id: EntityId) -> SceneResult<&EntityCore> {
        Ok(&self.node(id)?.core)
    }

    /// Mutable hook-visible state of an entity
    pub fn core_mut(&mut self, id: EntityId) -> SceneResult<&mut EntityCore> {
        Ok(&mut self.node_mut(id)?.core)
    }

    /// Lifecycle state of an entity
    pub fn lifecycle(&self, id: EntityId) -> SceneResult<Lifecycle> {
        Ok(self.node(id)?.lifecycle())
    }

    /// Property bits of an entity
    pub fn properties(&self, id: EntityId) -> SceneResult<Properties> {
        Ok(self.node(id)?.core.properties())
    }

    /// Read a named property
    pub fn property(&self, id: EntityId, property: Property) -> SceneResult<bool> {
        Ok(self.node(id)?.core.property(property))
    }

    /// Write a named property
    pub fn set_property(&mut self, id: EntityId, property: Property, value: bool) -> SceneResult<()> {
        self.node_mut(id)?.core.set_property(property, value);
        Ok(())
    }

    /// Local transform of an entity
    pub fn transform(&self, id: EntityId) -> SceneResult<&Transform> {
        Ok(self.node(id)?.core.transform())
    }

    /// Mutable local transform; marks the entity dirty
    pub fn transform_mut(&mut self, id: EntityId) -> SceneResult<&mut Transform> {
        Ok(self.node_mut(id)?.core.transform_mut())
    }

    /// World matrix as of the last init or update pass
    pub fn world_matrix(&self, id: EntityId) -> SceneResult<Mat4> {
        Ok(*self.node(id)?.core.world_matrix())
    }

    /// Behavior of an entity, if it has type `T`
    pub fn behavior<T: EntityBehavior>(&self, id: EntityId) -> Option<&T> {
        self.entities
            .get(id)?
            .behavior
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Mutable behavior of an entity, if it has type `T`
    pub fn behavior_mut<T: EntityBehavior>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(id)?
            .behavior
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    // --- container -------------------------------------------------------

    /// Attach `child` as the last child of `parent`
    ///
    /// The child loses its `Initialized` bit. When `parent` is initialized the
    /// child subtree is initialized straight away; if that fails the child is
    /// detached again and the error returned.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        let parent_node = self.node(parent)?;
        if parent_node.destroyed {
            return Err(SceneError::Destroyed(parent));
        }
        let child_node = self.node(child)?;
        if child_node.destroyed {
            return Err(SceneError::Destroyed(child));
        }
        if let Some(current) = child_node.parent {
            return Err(SceneError::AlreadyAttached { child, parent: current });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CycleDetected { parent, child });
        }

        let depth = self.depth(parent)? + 1 + self.height(child);
        if depth > self.config.max_depth {
            return Err(SceneError::DepthExceeded {
                depth,
                max_depth: self.config.max_depth,
            });
        }

        let parent_initialized = self.node(parent)?.lifecycle() == Lifecycle::Initialized;
        self.node_mut(parent)?.children.push(child);

        let child_node = self.node_mut(child)?;
        child_node.parent = Some(parent);
        child_node.core.set_property(Property::Initialized, false);
        child_node.core.set_property(Property::Dirty, true);
        debug!("Attached {child:?} to {parent:?}");

        if parent_initialized {
            let parent_world = self.world_matrix(parent)?;
            if let Err(err) = self.init_node(child, &parent_world) {
                warn!("Initializing {child:?} under {parent:?} failed, detaching: {err}");
                self.node_mut(parent)?.children.retain(|&candidate| candidate != child);
                self.orphan(child);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Detach `child` from `parent`
    ///
    /// The child keeps its storage and state but loses its `Initialized` bit.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        self.detach(parent, child)
    }

    /// Detach the child at `index`, leaving the list untouched on error
    pub fn remove_child_at(&mut self, parent: EntityId, index: usize) -> SceneResult<EntityId> {
        let child = self.get_child(parent, index)?;
        self.detach(parent, child)?;
        Ok(child)
    }

    /// Detach every child of `parent`, returning them in order
    pub fn clear_children(&mut self, parent: EntityId) -> SceneResult<Vec<EntityId>> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        for &child in &children {
            self.orphan(child);
        }
        debug!("Cleared {} children of {parent:?}", children.len());
        Ok(children)
    }

    /// Whether `child` is a direct child of `parent`
    pub fn has_child(&self, parent: EntityId, child: EntityId) -> bool {
        self.index_of(parent, child).is_some()
    }

    /// Position of `child` in the child list of `parent`
    pub fn index_of(&self, parent: EntityId, child: EntityId) -> Option<usize> {
        self.entities
            .get(parent)?
            .children
            .iter()
            .position(|&candidate| candidate == child)
    }

    /// Child at `index`, or `None` when out of range
    pub fn child_at(&self, parent: EntityId, index: usize) -> Option<EntityId> {
        self.entities.get(parent)?.children.get(index).copied()
    }

    /// Child at `index`, reporting `IndexOutOfBounds` when out of range
    pub fn get_child(&self, parent: EntityId, index: usize) -> SceneResult<EntityId> {
        let children = &self.node(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(SceneError::IndexOutOfBounds {
                index,
                len: children.len(),
            })
    }

    /// Ordered child list
    pub fn children(&self, parent: EntityId) -> SceneResult<&[EntityId]> {
        Ok(&self.node(parent)?.children)
    }

    /// Number of direct children
    pub fn child_count(&self, parent: EntityId) -> SceneResult<usize> {
        Ok(self.node(parent)?.children.len())
    }

    /// Parent of an entity, `None` for roots and detached entities
    pub fn parent_of(&self, id: EntityId) -> SceneResult<Option<EntityId>> {
        Ok(self.node(id)?.parent)
    }

    /// Number of ancestors
    pub fn depth(&self, id: EntityId) -> SceneResult<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent)?.parent;
        }
        Ok(depth)
    }

    /// Every entity below `id`, depth-first in child order
    pub fn descendants(&self, id: EntityId) -> SceneResult<Vec<EntityId>> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self.node(id)?.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    fn height(&self, id: EntityId) -> usize {
        self.entities.get(id).map_or(0, |node| {
            node.children
                .iter()
                .map(|&child| self.height(child) + 1)
                .max()
                .unwrap_or(0)
        })
    }

    fn is_ancestor_or_self(&self, candidate: EntityId, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == candidate {
                return true;
            }
            current = self.entities.get(node_id).and_then(|node| node.parent);
        }
        false
    }

    fn detach(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        let index = self
            .index_of(parent, child)
            .ok_or(SceneError::ChildNotFound { parent, child })?;
        self.node_mut(parent)?.children.remove(index);
        self.orphan(child);
        debug!("Detached {child:?} from {parent:?}");
        Ok(())
    }

    fn orphan(&mut self, child: EntityId) {
        if let Some(node) = self.entities.get_mut(child) {
            node.parent = None;
            node.core.set_property(Property::Initialized, false);
            node.core.set_property(Property::Dirty, true);
        }
    }

    fn parent_world(&self, id: EntityId) -> SceneResult<Mat4> {
        match self.node(id)?.parent {
            Some(parent) => self.world_matrix(parent),
            None => Ok(Mat4::identity()),
        }
    }

    // --- actions ---------------------------------------------------------

    /// Attach an action; it is initialized now if the entity already is
    pub fn attach_action(&mut self, id: EntityId, action: impl Action) -> SceneResult<ActionId> {
        self.attach_action_boxed(id, Box::new(action))
    }

    /// Attach a boxed action
    pub fn attach_action_boxed(&mut self, id: EntityId, action: Box<dyn Action>) -> SceneResult<ActionId> {
        let node = self.entities.get_mut(id).ok_or(SceneError::EntityNotFound(id))?;
        if node.destroyed {
            return Err(SceneError::Destroyed(id));
        }

        let mut slot = ActionSlot::new(id, action);
        if node.lifecycle() == Lifecycle::Initialized {
            slot.ensure_init(&mut node.core);
        }
        let action_id = self.actions.insert(slot);
        node.actions.push(action_id);
        trace!("Attached action {action_id:?} to {id:?}");
        Ok(action_id)
    }

    /// Destroy and detach an action
    pub fn detach_action(&mut self, id: EntityId, action: ActionId) -> SceneResult<()> {
        let node = self.entities.get_mut(id).ok_or(SceneError::EntityNotFound(id))?;
        let index = node
            .actions
            .iter()
            .position(|&candidate| candidate == action)
            .ok_or(SceneError::ActionNotFound { entity: id, action })?;
        node.actions.remove(index);

        if let Some(slot) = self.actions.remove(action) {
            slot.teardown(&mut node.core);
        }
        Ok(())
    }

    /// Action at `index`, reporting `IndexOutOfBounds` when out of range
    pub fn action_at(&self, id: EntityId, index: usize) -> SceneResult<ActionId> {
        let actions = &self.node(id)?.actions;
        actions
            .get(index)
            .copied()
            .ok_or(SceneError::IndexOutOfBounds {
                index,
                len: actions.len(),
            })
    }

    /// Ordered list of attached actions
    pub fn actions(&self, id: EntityId) -> SceneResult<&[ActionId]> {
        Ok(&self.node(id)?.actions)
    }

    /// Number of attached actions
    pub fn action_count(&self, id: EntityId) -> SceneResult<usize> {
        Ok(self.node(id)?.actions.len())
    }

    /// Attached action, if it has type `T`
    pub fn action<T: Action>(&self, action: ActionId) -> Option<&T> {
        self.actions.get(action)?.action.as_ref().as_any().downcast_ref::<T>()
    }

    /// Entity an action is attached to
    pub fn action_owner(&self, action: ActionId) -> Option<EntityId> {
        self.actions.get(action).map(|slot| slot.owner)
    }

    // --- lifecycle -------------------------------------------------------

    fn ensure_initialized(&self, id: EntityId) -> SceneResult<()> {
        match self.node(id)?.lifecycle() {
            Lifecycle::Initialized => Ok(()),
            Lifecycle::Uninitialized => Err(SceneError::NotInitialized(id)),
            Lifecycle::Destroyed => Err(SceneError::Destroyed(id)),
        }
    }

    /// Initialize an entity and every uninitialized entity below it
    ///
    /// The init hook runs only while the `Initialized` bit is clear, so a
    /// second call is a no-op unless the entity was re-parented in between.
    /// A failing child stays uninitialized; its siblings are still
    /// initialized and the first error is returned.
    pub fn init(&mut self, id: EntityId) -> SceneResult<()> {
        let parent_world = self.parent_world(id)?;
        self.init_node(id, &parent_world)
    }

    fn init_node(&mut self, id: EntityId, parent_world: &Mat4) -> SceneResult<()> {
        let node = self.entities.get_mut(id).ok_or(SceneError::EntityNotFound(id))?;
        match node.lifecycle() {
            Lifecycle::Destroyed => return Err(SceneError::Destroyed(id)),
            Lifecycle::Uninitialized => {
                if let Some(behavior) = node.behavior.as_mut() {
                    behavior.init(&mut node.core)?;
                }
                node.destroy_owed = true;
                for action_id in &node.actions {
                    if let Some(slot) = self.actions.get_mut(*action_id) {
                        slot.ensure_init(&mut node.core);
                    }
                }
                node.core.refresh_world(parent_world);
                node.core.set_property(Property::Initialized, true);
                trace!("Initialized entity {id:?}");
            }
            Lifecycle::Initialized => {}
        }

        let world = *node.core.world_matrix();
        let children = node.children.clone();
        let mut first_error = None;
        for child in children {
            if self.node(child)?.destroyed {
                continue;
            }
            if let Err(err) = self.init_node(child, &world) {
                warn!("Initializing child {child:?} of {id:?} failed: {err}");
                first_error = first_error.or(Some(err));
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Run one update pass over an entity and its subtree
    ///
    /// Order per entity: attached actions, the update hook, the world matrix
    /// refresh, then the dead-child sweep and the live children. Nothing runs
    /// while `UpdateEnabled` is clear.
    pub fn update(&mut self, id: EntityId, delta_time: f32) -> SceneResult<()> {
        self.ensure_initialized(id)?;
        let parent_world = self.parent_world(id)?;
        self.update_node(id, delta_time, &parent_world, false)
    }

    /// Container pass: sweep dead children, then update the live ones
    pub fn update_children(&mut self, id: EntityId, delta_time: f32) -> SceneResult<()> {
        self.ensure_initialized(id)?;
        let world = self.world_matrix(id)?;
        self.update_children_of(id, delta_time, &world, false)
    }

    fn update_node(
        &mut self,
        id: EntityId,
        delta_time: f32,
        parent_world: &Mat4,
        parent_moved: bool,
    ) -> SceneResult<()> {
        if !self.node(id)?.core.property(Property::UpdateEnabled) {
            return Ok(());
        }

        self.drive_actions(id, delta_time)?;

        let node = self.node_mut(id)?;
        if let Some(behavior) = node.behavior.as_mut() {
            behavior.update(&mut node.core, delta_time)?;
        }

        let moved = parent_moved || node.core.property(Property::Dirty);
        if moved {
            node.core.refresh_world(parent_world);
        }
        let world = *node.core.world_matrix();

        self.update_children_of(id, delta_time, &world, moved)
    }

    fn drive_actions(&mut self, id: EntityId, delta_time: f32) -> SceneResult<()> {
        let node = self.entities.get_mut(id).ok_or(SceneError::EntityNotFound(id))?;

        // Drive a snapshot so the list can shrink without skipping entries.
        let pending = node.actions.clone();
        let mut finished = Vec::new();
        for action_id in pending {
            let Some(slot) = self.actions.get_mut(action_id) else {
                continue;
            };
            if slot.action.update(&mut node.core, delta_time) == ActionStatus::Finished {
                finished.push(action_id);
            }
        }

        if finished.is_empty() {
            return Ok(());
        }
        node.actions.retain(|action_id| !finished.contains(action_id));
        for action_id in finished {
            if let Some(slot) = self.actions.remove(action_id) {
                slot.teardown(&mut node.core);
                trace!("Action {action_id:?} on {id:?} finished");
            }
        }
        Ok(())
    }

    fn update_children_of(
        &mut self,
        id: EntityId,
        delta_time: f32,
        world: &Mat4,
        moved: bool,
    ) -> SceneResult<()> {
        let children = self.node(id)?.children.clone();
        let mut dead = Vec::new();
        let mut live = Vec::with_capacity(children.len());
        for child in children {
            let node = self.node(child)?;
            if node.destroyed || node.core.is_dead() {
                dead.push(child);
            } else if node.lifecycle() == Lifecycle::Initialized {
                live.push(child);
            } else {
                trace!("Skipping uninitialized child {child:?} of {id:?}");
            }
        }

        if !dead.is_empty() {
            self.sweep(id, &dead)?;
        }

        for child in live {
            self.update_node(child, delta_time, world, moved)?;
        }
        Ok(())
    }

    /// Kill and detach every child in `dead`, all within this pass
    fn sweep(&mut self, parent: EntityId, dead: &[EntityId]) -> SceneResult<()> {
        let mut first_error = None;
        for &child in dead {
            if let Err(err) = self.kill(child) {
                warn!("Destroying swept entity {child:?} failed: {err}");
                first_error = first_error.or(Some(err));
            }
        }

        self.node_mut(parent)?
            .children
            .retain(|child| !dead.contains(child));
        for &child in dead {
            if self.config.release_swept_entities {
                self.release_subtree(child);
            } else {
                self.orphan(child);
            }
        }
        debug!("Swept {} dead children from {parent:?}", dead.len());

        first_error.map_or(Ok(()), Err)
    }

    /// Run one render pass over an entity and its subtree
    ///
    /// Takes `&self`: rendering can queue draw work but cannot change the
    /// tree. Dead children awaiting the sweep are skipped.
    pub fn render(&self, id: EntityId, frame: &mut RenderFrame<'_>) -> SceneResult<()> {
        self.ensure_initialized(id)?;
        self.render_node(id, frame)
    }

    fn render_node(&self, id: EntityId, frame: &mut RenderFrame<'_>) -> SceneResult<()> {
        let node = self.node(id)?;
        if !node.core.property(Property::RenderEnabled) {
            return Ok(());
        }

        if let Some(behavior) = node.behavior.as_deref() {
            behavior.render(&node.core, frame)?;
        }

        for &child in &node.children {
            if self.node(child)?.is_active() {
                self.render_node(child, frame)?;
            }
        }
        Ok(())
    }

    /// Destroy an entity with its actions and subtree
    ///
    /// Idempotent: destroying a destroyed entity does nothing. An entity that
    /// was initialized and then detached can still be destroyed. Child failures
    /// do not stop the remaining children from being destroyed; the first
    /// error is returned once everything was attempted.
    pub fn destroy(&mut self, id: EntityId) -> SceneResult<()> {
        let node = self.node(id)?;
        let owed = node.destroy_owed;
        match node.lifecycle() {
            Lifecycle::Uninitialized if !owed => Err(SceneError::NotInitialized(id)),
            Lifecycle::Destroyed => Ok(()),
            Lifecycle::Uninitialized | Lifecycle::Initialized => self.destroy_subtree(id),
        }
    }

    /// Mark an entity dead and destroy it
    ///
    /// The entity stays in its parent's child list until the parent's next
    /// update sweep detaches it.
    pub fn kill(&mut self, id: EntityId) -> SceneResult<()> {
        self.node_mut(id)?.core.mark_dead();
        self.destroy_subtree(id)
    }

    fn destroy_subtree(&mut self, id: EntityId) -> SceneResult<()> {
        let node = self.entities.get_mut(id).ok_or(SceneError::EntityNotFound(id))?;
        if node.destroyed {
            return Ok(());
        }

        for action_id in std::mem::take(&mut node.actions) {
            if let Some(slot) = self.actions.remove(action_id) {
                slot.teardown(&mut node.core);
            }
        }

        let mut first_error = None;
        for child in node.children.clone() {
            if let Err(err) = self.destroy_subtree(child) {
                warn!("Destroying child {child:?} of {id:?} failed: {err}");
                first_error = first_error.or(Some(err));
            }
        }

        let node = self.node_mut(id)?;
        if std::mem::take(&mut node.destroy_owed) {
            if let Some(behavior) = node.behavior.as_mut() {
                if let Err(err) = behavior.destroy(&mut node.core) {
                    first_error = first_error.or(Some(err));
                }
            }
        }
        node.destroyed = true;
        node.core.set_property(Property::Initialized, false);
        node.core.mark_dead();
        trace!("Destroyed entity {id:?}");

        first_error.map_or(Ok(()), Err)
    }

    fn release_subtree(&mut self, id: EntityId) {
        let Some(node) = self.entities.remove(id) else {
            return;
        };
        for action_id in node.actions {
            self.actions.remove(action_id);
        }
        for child in node.children {
            self.release_subtree(child);
        }
    }

    // --- comparison ------------------------------------------------------

    /// Deep structural equality of two entities
    ///
    /// Compares properties, parent, transform, attached action ids and,
    /// recursively and pairwise, the children. Behaviors are not compared.
    /// Cost is O(size of the smaller subtree).
    pub fn structurally_eq(&self, a: EntityId, b: EntityId) -> bool {
        self.subtree_eq(a, b, true)
    }

    fn subtree_eq(&self, a: EntityId, b: EntityId, compare_parent: bool) -> bool {
        let (Some(left), Some(right)) = (self.entities.get(a), self.entities.get(b)) else {
            return false;
        };

        left.core.properties() == right.core.properties()
            && (!compare_parent || left.parent == right.parent)
            && left.core.transform() == right.core.transform()
            && left.actions == right.actions
            && left.children.len() == right.children.len()
            && left
                .children
                .iter()
                .zip(&right.children)
                .all(|(&l, &r)| self.subtree_eq(l, r, false))
    }
}
