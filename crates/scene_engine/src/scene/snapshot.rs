//! Debug snapshots of a subtree
//!
//! Snapshots are plain serde data so a subtree can be dumped to RON for
//! inspection. Properties are written with the [`EntityFlags`] names, which
//! follow the fixed bit layout in [`properties`](super::properties).

use serde::{Deserialize, Serialize};

use super::entity::Lifecycle;
use super::error::SceneResult;
use super::graph::Scene;
use super::properties::EntityFlags;
use super::EntityId;

/// Serializable view of one entity and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Behavior type name, `None` for behavior-less entities
    pub behavior: Option<String>,
    /// Lifecycle state name
    pub lifecycle: String,
    /// Property bits
    pub flags: EntityFlags,
    /// Local position
    pub position: [f32; 3],
    /// Local rotation as `[i, j, k, w]`
    pub rotation: [f32; 4],
    /// Local scale
    pub scale: [f32; 3],
    /// Number of attached actions
    pub actions: usize,
    /// Child snapshots in order
    pub children: Vec<EntitySnapshot>,
}

impl Scene {
    /// Capture `id` and everything below it
    pub fn snapshot(&self, id: EntityId) -> SceneResult<EntitySnapshot> {
        let node = self.node(id)?;
        let transform = node.core.transform();
        let rotation = transform.rotation.quaternion().coords;

        let children = node
            .children
            .iter()
            .map(|&child| self.snapshot(child))
            .collect::<SceneResult<Vec<_>>>()?;

        Ok(EntitySnapshot {
            behavior: node.behavior.as_deref().map(|behavior| behavior.type_name().to_string()),
            lifecycle: match node.lifecycle() {
                Lifecycle::Uninitialized => "uninitialized",
                Lifecycle::Initialized => "initialized",
                Lifecycle::Destroyed => "destroyed",
            }
            .to_string(),
            flags: node.core.properties().into(),
            position: transform.position.into(),
            rotation: [rotation.x, rotation.y, rotation.z, rotation.w],
            scale: transform.scale.into(),
            actions: node.actions.len(),
            children,
        })
    }

    /// Capture `id` as pretty-printed RON
    pub fn dump_ron(&self, id: EntityId) -> SceneResult<String> {
        let snapshot = self.snapshot(id)?;
        Ok(ron::ser::to_string_pretty(&snapshot, ron::ser::PrettyConfig::default())
            .unwrap_or_else(|err| format!("<snapshot serialization failed: {err}>")))
    }
}
