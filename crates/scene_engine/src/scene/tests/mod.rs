//! Scenario tests for the scene tree lifecycle
//!
//! Tracing behaviors and actions append to a shared log so each test can assert
//! on exactly which hooks ran and in which order.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::SceneConfig;
use crate::foundation::math::Vec3;
use crate::render::{HeadlessGraphics, RenderDispatch, RenderFrame};

use super::*;

type Log = Rc<RefCell<Vec<String>>>;

struct Tracer {
    name: &'static str,
    log: Log,
    fail_init: bool,
    fail_destroy: bool,
}

impl Tracer {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            fail_init: false,
            fail_destroy: false,
        }
    }

    fn failing_init(name: &'static str, log: &Log) -> Self {
        Self {
            fail_init: true,
            ..Self::new(name, log)
        }
    }

    fn failing(name: &'static str, log: &Log) -> Self {
        Self {
            fail_destroy: true,
            ..Self::new(name, log)
        }
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.name));
    }
}

impl EntityBehavior for Tracer {
    fn init(&mut self, entity: &mut EntityCore) -> SceneResult<()> {
        self.record("init");
        if self.fail_init {
            return Err(entity.fail("init failed"));
        }
        Ok(())
    }

    fn update(&mut self, _entity: &mut EntityCore, _delta_time: f32) -> SceneResult<()> {
        self.record("update");
        Ok(())
    }

    fn render(&self, _entity: &EntityCore, _frame: &mut RenderFrame<'_>) -> SceneResult<()> {
        self.record("render");
        Ok(())
    }

    fn destroy(&mut self, entity: &mut EntityCore) -> SceneResult<()> {
        self.record("destroy");
        if self.fail_destroy {
            return Err(entity.fail("destroy failed"));
        }
        Ok(())
    }
}

/// Finishes on its `finish_after`th update
struct CountingAction {
    log: Log,
    finish_after: u32,
    calls: u32,
}

impl CountingAction {
    fn new(log: &Log, finish_after: u32) -> Self {
        Self {
            log: log.clone(),
            finish_after,
            calls: 0,
        }
    }
}

impl Action for CountingAction {
    fn init(&mut self, _entity: &mut EntityCore) {
        self.log.borrow_mut().push(format!("action{}:init", self.finish_after));
    }

    fn update(&mut self, _entity: &mut EntityCore, _delta_time: f32) -> ActionStatus {
        self.calls += 1;
        ActionStatus::finished_if(self.calls >= self.finish_after)
    }

    fn destroy(&mut self, _entity: &mut EntityCore) {
        self.log.borrow_mut().push(format!("action{}:destroy", self.finish_after));
    }
}

fn count(log: &Log, entry: &str) -> usize {
    log.borrow().iter().filter(|line| *line == entry).count()
}

fn render_pass(scene: &Scene, root: EntityId) -> SceneResult<()> {
    let mut gfx = HeadlessGraphics::new();
    let mut dispatch = RenderDispatch::new();
    let mut frame = RenderFrame::new(&mut dispatch, &mut gfx);
    scene.render(root, &mut frame)
}

#[test]
fn test_update_disabled_skips_hooks_and_children() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn(Tracer::new("parent", &log));
    let child = scene.spawn(Tracer::new("child", &log));
    scene.add_child(parent, child).unwrap();
    scene.init(parent).unwrap();
    scene.attach_action(parent, CountingAction::new(&log, 1)).unwrap();

    scene.set_property(parent, Property::UpdateEnabled, false).unwrap();
    log.borrow_mut().clear();
    scene.update(parent, 0.016).unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(scene.action_count(parent).unwrap(), 1);
}

#[test]
fn test_dead_child_swept_and_destroyed_once() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let child = scene.spawn(Tracer::new("child", &log));
    scene.add_child(parent, child).unwrap();
    scene.init(parent).unwrap();

    scene.set_property(child, Property::Dead, true).unwrap();
    scene.update(parent, 0.016).unwrap();
    scene.update(parent, 0.016).unwrap();

    assert!(!scene.has_child(parent, child));
    assert_eq!(count(&log, "child:destroy"), 1);
    assert_eq!(count(&log, "child:update"), 0);
    assert!(!scene.contains(child));
}

#[test]
fn test_sweep_removes_all_dead_children_in_one_pass() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let names = ["a", "b", "c", "d"];
    let children: Vec<_> = names
        .iter()
        .map(|name| {
            let id = scene.spawn(Tracer::new(name, &log));
            scene.add_child(parent, id).unwrap();
            id
        })
        .collect();
    scene.init(parent).unwrap();

    // Adjacent dead children must not shadow each other.
    scene.set_property(children[0], Property::Dead, true).unwrap();
    scene.set_property(children[1], Property::Dead, true).unwrap();
    scene.set_property(children[3], Property::Dead, true).unwrap();
    scene.update(parent, 0.016).unwrap();

    assert_eq!(scene.children(parent).unwrap(), &[children[2]]);
    for name in ["a", "b", "d"] {
        assert_eq!(count(&log, &format!("{name}:destroy")), 1);
    }
    assert_eq!(count(&log, "c:update"), 1);
}

#[test]
fn test_swept_children_can_be_retained() {
    let config = SceneConfig {
        release_swept_entities: false,
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_config(config);
    let parent = scene.spawn_group();
    let child = scene.spawn_group();
    scene.add_child(parent, child).unwrap();
    scene.init(parent).unwrap();

    scene.kill(child).unwrap();
    scene.update(parent, 0.016).unwrap();

    assert!(scene.contains(child));
    assert_eq!(scene.parent_of(child).unwrap(), None);
    assert_eq!(scene.lifecycle(child).unwrap(), Lifecycle::Destroyed);
}

#[test]
fn test_action_finishes_after_mth_call() {
    let log = Log::default();
    let mut scene = Scene::new();
    let entity = scene.spawn_group();
    scene.init(entity).unwrap();
    scene.attach_action(entity, CountingAction::new(&log, 2)).unwrap();
    scene.attach_action(entity, CountingAction::new(&log, 3)).unwrap();
    let long = scene.attach_action(entity, CountingAction::new(&log, 5)).unwrap();
    assert_eq!(count(&log, "action2:init"), 1);

    scene.update(entity, 0.1).unwrap();
    assert_eq!(scene.action_count(entity).unwrap(), 3);

    scene.update(entity, 0.1).unwrap();
    assert_eq!(scene.action_count(entity).unwrap(), 2);
    assert_eq!(count(&log, "action2:destroy"), 1);

    scene.update(entity, 0.1).unwrap();
    assert_eq!(scene.actions(entity).unwrap(), &[long]);
    assert_eq!(count(&log, "action3:destroy"), 1);

    scene.update(entity, 0.1).unwrap();
    scene.update(entity, 0.1).unwrap();
    assert_eq!(scene.action_count(entity).unwrap(), 0);
    assert_eq!(count(&log, "action2:destroy"), 1);
    assert_eq!(count(&log, "action5:destroy"), 1);
}

#[test]
fn test_action_lookup_and_detach() {
    let log = Log::default();
    let mut scene = Scene::new();
    let entity = scene.spawn_group();
    let action = scene.attach_action(entity, CountingAction::new(&log, 9)).unwrap();

    // Not initialized yet: the action waits for the entity's init.
    assert_eq!(count(&log, "action9:init"), 0);
    scene.init(entity).unwrap();
    assert_eq!(count(&log, "action9:init"), 1);

    assert_eq!(scene.action_at(entity, 0).unwrap(), action);
    assert_eq!(scene.action_owner(action), Some(entity));
    assert!(scene.action::<CountingAction>(action).is_some());
    assert!(matches!(
        scene.action_at(entity, 1),
        Err(SceneError::IndexOutOfBounds { index: 1, len: 1 })
    ));

    scene.detach_action(entity, action).unwrap();
    assert_eq!(count(&log, "action9:destroy"), 1);
    assert!(matches!(
        scene.detach_action(entity, action),
        Err(SceneError::ActionNotFound { .. })
    ));
}

#[test]
fn test_init_is_idempotent_until_reparented() {
    let log = Log::default();
    let mut scene = Scene::new();
    let first = scene.spawn_group();
    let second = scene.spawn_group();
    let child = scene.spawn(Tracer::new("child", &log));
    scene.add_child(first, child).unwrap();

    scene.init(first).unwrap();
    scene.init(first).unwrap();
    assert_eq!(count(&log, "child:init"), 1);

    scene.init(second).unwrap();
    scene.remove_child(first, child).unwrap();
    assert_eq!(scene.lifecycle(child).unwrap(), Lifecycle::Uninitialized);
    scene.add_child(second, child).unwrap();
    assert_eq!(count(&log, "child:init"), 2);
    assert_eq!(scene.lifecycle(child).unwrap(), Lifecycle::Initialized);
}

#[test]
fn test_lifecycle_order_is_enforced() {
    let log = Log::default();
    let mut scene = Scene::new();
    let entity = scene.spawn(Tracer::new("e", &log));

    assert!(matches!(scene.update(entity, 0.1), Err(SceneError::NotInitialized(_))));
    assert!(matches!(render_pass(&scene, entity), Err(SceneError::NotInitialized(_))));
    assert!(matches!(scene.destroy(entity), Err(SceneError::NotInitialized(_))));

    scene.init(entity).unwrap();
    scene.destroy(entity).unwrap();
    scene.destroy(entity).unwrap();
    assert_eq!(count(&log, "e:destroy"), 1);

    let err = scene.update(entity, 0.1).unwrap_err();
    assert!(err.is_lifecycle());
    assert!(matches!(scene.init(entity), Err(SceneError::Destroyed(_))));
}

#[test]
fn test_structural_equality() {
    let mut scene = Scene::new();
    let a = scene.spawn_group();
    let b = scene.spawn_group();
    assert!(scene.structurally_eq(a, b));

    let child = scene.spawn_empty();
    scene.add_child(a, child).unwrap();
    assert!(!scene.structurally_eq(a, b));

    let other = scene.spawn_empty();
    scene.add_child(b, other).unwrap();
    assert!(scene.structurally_eq(a, b));

    scene.transform_mut(other).unwrap().translate(Vec3::new(1.0, 0.0, 0.0));
    assert!(!scene.structurally_eq(a, b));
}

#[test]
fn test_update_children_scenario() {
    let log = Log::default();
    let mut scene = Scene::new();
    let container = scene.spawn_group();
    let entity = scene.spawn(Tracer::new("e", &log));
    scene.add_child(container, entity).unwrap();
    scene.init(container).unwrap();

    scene.update_children(container, 0.016).unwrap();
    assert_eq!(count(&log, "e:update"), 1);
    assert!(scene.has_child(container, entity));

    scene.set_property(entity, Property::Dead, true).unwrap();
    scene.update_children(container, 0.016).unwrap();
    assert_eq!(count(&log, "e:destroy"), 1);
    assert!(!scene.has_child(container, entity));
}

#[test]
fn test_remove_child_at_out_of_bounds() {
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let a = scene.spawn_empty();
    let b = scene.spawn_empty();
    scene.add_child(parent, a).unwrap();
    scene.add_child(parent, b).unwrap();

    let err = scene.remove_child_at(parent, 2).unwrap_err();
    assert!(matches!(err, SceneError::IndexOutOfBounds { index: 2, len: 2 }));
    assert!(err.is_structural());
    assert_eq!(scene.children(parent).unwrap(), &[a, b]);

    assert_eq!(scene.remove_child_at(parent, 0).unwrap(), a);
    assert_eq!(scene.children(parent).unwrap(), &[b]);
    assert_eq!(scene.child_at(parent, 5), None);
}

#[test]
fn test_kill_keeps_entity_attached_until_sweep() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let child = scene.spawn(Tracer::new("child", &log));
    scene.add_child(parent, child).unwrap();
    scene.init(parent).unwrap();

    scene.kill(child).unwrap();
    assert!(scene.has_child(parent, child));
    assert_eq!(scene.lifecycle(child).unwrap(), Lifecycle::Destroyed);
    assert_eq!(count(&log, "child:destroy"), 1);

    scene.update(parent, 0.016).unwrap();
    assert!(!scene.has_child(parent, child));
    assert_eq!(count(&log, "child:destroy"), 1);
}

#[test]
fn test_structural_errors() {
    let mut scene = Scene::with_config(SceneConfig {
        max_depth: 2,
        ..SceneConfig::default()
    });
    let root = scene.spawn_group();
    let mid = scene.spawn_group();
    let leaf = scene.spawn_group();
    scene.add_child(root, mid).unwrap();
    scene.add_child(mid, leaf).unwrap();

    assert!(matches!(
        scene.add_child(leaf, root),
        Err(SceneError::CycleDetected { .. })
    ));
    let lone = scene.spawn_group();
    assert!(matches!(
        scene.add_child(lone, lone),
        Err(SceneError::CycleDetected { .. })
    ));
    assert!(matches!(
        scene.add_child(root, leaf),
        Err(SceneError::AlreadyAttached { .. })
    ));

    let deep = scene.spawn_group();
    assert!(matches!(
        scene.add_child(leaf, deep),
        Err(SceneError::DepthExceeded { depth: 3, max_depth: 2 })
    ));
    assert!(matches!(
        scene.remove_child(root, leaf),
        Err(SceneError::ChildNotFound { .. })
    ));
    assert_eq!(scene.depth(leaf).unwrap(), 2);
    assert_eq!(scene.descendants(root).unwrap(), vec![mid, leaf]);
}

#[test]
fn test_destroy_is_best_effort() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn(Tracer::new("parent", &log));
    let broken = scene.spawn(Tracer::failing("broken", &log));
    let sibling = scene.spawn(Tracer::new("sibling", &log));
    scene.add_child(parent, broken).unwrap();
    scene.add_child(parent, sibling).unwrap();
    scene.init(parent).unwrap();

    let err = scene.destroy(parent).unwrap_err();
    assert!(matches!(err, SceneError::Behavior { entity, .. } if entity == broken));
    assert_eq!(count(&log, "sibling:destroy"), 1);
    assert_eq!(count(&log, "parent:destroy"), 1);
    assert_eq!(scene.lifecycle(sibling).unwrap(), Lifecycle::Destroyed);
}

#[test]
fn test_render_skips_dead_and_disabled_children() {
    let log = Log::default();
    let mut scene = Scene::new();
    let root = scene.spawn(Tracer::new("root", &log));
    let alive = scene.spawn(Tracer::new("alive", &log));
    let dead = scene.spawn(Tracer::new("dead", &log));
    let hidden = scene.spawn(Tracer::new("hidden", &log));
    for child in [alive, dead, hidden] {
        scene.add_child(root, child).unwrap();
    }
    scene.init(root).unwrap();
    scene.set_property(dead, Property::Dead, true).unwrap();
    scene.set_property(hidden, Property::RenderEnabled, false).unwrap();

    render_pass(&scene, root).unwrap();
    assert_eq!(count(&log, "root:render"), 1);
    assert_eq!(count(&log, "alive:render"), 1);
    assert_eq!(count(&log, "dead:render"), 0);
    assert_eq!(count(&log, "hidden:render"), 0);
}

#[test]
fn test_world_matrix_follows_parent() {
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let child = scene.spawn_group();
    let detached = scene.spawn_group();
    scene.add_child(parent, child).unwrap();
    scene.add_child(parent, detached).unwrap();
    scene.set_property(detached, Property::InheritTransform, false).unwrap();
    scene.init(parent).unwrap();

    scene.transform_mut(parent).unwrap().translate(Vec3::new(5.0, 0.0, 0.0));
    scene.transform_mut(child).unwrap().translate(Vec3::new(0.0, 2.0, 0.0));
    scene.update(parent, 0.016).unwrap();

    let world = scene.world_matrix(child).unwrap();
    assert_eq!(world[(0, 3)], 5.0);
    assert_eq!(world[(1, 3)], 2.0);
    assert_eq!(scene.world_matrix(detached).unwrap()[(0, 3)], 0.0);
    assert!(!scene.property(child, Property::Dirty).unwrap());
}

#[test]
fn test_clear_children_and_despawn() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let a = scene.spawn(Tracer::new("a", &log));
    let b = scene.spawn(Tracer::new("b", &log));
    scene.add_child(parent, a).unwrap();
    scene.add_child(a, b).unwrap();
    scene.init(parent).unwrap();

    assert_eq!(scene.clear_children(parent).unwrap(), vec![a]);
    assert_eq!(scene.parent_of(a).unwrap(), None);
    assert_eq!(scene.child_count(parent).unwrap(), 0);

    scene.despawn(a).unwrap();
    assert!(!scene.contains(a));
    assert!(!scene.contains(b));
    assert_eq!(count(&log, "a:destroy"), 1);
    assert_eq!(count(&log, "b:destroy"), 1);
}

#[test]
fn test_detached_entity_still_runs_destroy_once() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let child = scene.spawn(Tracer::new("c", &log));
    scene.add_child(parent, child).unwrap();
    scene.init(parent).unwrap();

    scene.remove_child(parent, child).unwrap();
    assert_eq!(scene.lifecycle(child).unwrap(), Lifecycle::Uninitialized);

    scene.destroy(child).unwrap();
    assert_eq!(scene.lifecycle(child).unwrap(), Lifecycle::Destroyed);
    scene.despawn(child).unwrap();
    assert_eq!(*log.borrow(), vec!["c:init", "c:destroy"]);
}

#[test]
fn test_reparented_entity_runs_destroy_once() {
    let log = Log::default();
    let mut scene = Scene::new();
    let first = scene.spawn_group();
    let second = scene.spawn_group();
    let child = scene.spawn(Tracer::new("c", &log));
    scene.add_child(first, child).unwrap();
    scene.init(first).unwrap();
    scene.init(second).unwrap();

    scene.remove_child(first, child).unwrap();
    scene.add_child(second, child).unwrap();
    scene.despawn(second).unwrap();

    assert_eq!(*log.borrow(), vec!["c:init", "c:init", "c:destroy"]);
}

#[test]
fn test_failed_init_rolls_back_add_child() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn_group();
    let sibling = scene.spawn(Tracer::new("s", &log));
    let broken = scene.spawn(Tracer::failing_init("f", &log));
    scene.add_child(parent, sibling).unwrap();
    scene.init(parent).unwrap();

    let err = scene.add_child(parent, broken).unwrap_err();
    assert!(matches!(err, SceneError::Behavior { entity, .. } if entity == broken));
    assert_eq!(scene.children(parent).unwrap(), &[sibling]);
    assert_eq!(scene.parent_of(broken).unwrap(), None);
    assert_eq!(scene.lifecycle(broken).unwrap(), Lifecycle::Uninitialized);
    assert_eq!(scene.lifecycle(sibling).unwrap(), Lifecycle::Initialized);

    scene.update(parent, 0.016).unwrap();
    assert_eq!(count(&log, "f:update"), 0);
    assert_eq!(count(&log, "s:update"), 1);

    // The init hook never completed, so nothing is owed.
    assert!(matches!(scene.destroy(broken), Err(SceneError::NotInitialized(_))));
    scene.despawn(broken).unwrap();
    assert_eq!(count(&log, "f:destroy"), 0);
}

#[test]
fn test_failed_child_init_keeps_siblings_and_skips_child() {
    let log = Log::default();
    let mut scene = Scene::new();
    let parent = scene.spawn(Tracer::new("p", &log));
    let a = scene.spawn(Tracer::new("a", &log));
    let broken = scene.spawn(Tracer::failing_init("f", &log));
    let b = scene.spawn(Tracer::new("b", &log));
    for child in [a, broken, b] {
        scene.add_child(parent, child).unwrap();
    }

    assert!(matches!(scene.init(parent), Err(SceneError::Behavior { .. })));
    assert_eq!(scene.lifecycle(parent).unwrap(), Lifecycle::Initialized);
    assert_eq!(scene.lifecycle(a).unwrap(), Lifecycle::Initialized);
    assert_eq!(scene.lifecycle(b).unwrap(), Lifecycle::Initialized);
    assert_eq!(scene.lifecycle(broken).unwrap(), Lifecycle::Uninitialized);
    assert_eq!(scene.children(parent).unwrap(), &[a, broken, b]);

    log.borrow_mut().clear();
    scene.update(parent, 0.016).unwrap();
    render_pass(&scene, parent).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["p:update", "a:update", "b:update", "p:render", "a:render", "b:render"]
    );
    assert_eq!(scene.child_count(parent).unwrap(), 3);
}
