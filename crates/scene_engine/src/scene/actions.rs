//! Built-in actions

use super::action::{Action, ActionStatus};
use super::entity::EntityCore;
use crate::foundation::math::Vec3;

/// Fraction of `duration` covered by the next step, and whether it is the last
fn advance(elapsed: &mut f32, duration: f32, delta_time: f32) -> (f32, bool) {
    if duration <= 0.0 {
        return (1.0, true);
    }
    let step = delta_time.min(duration - *elapsed).max(0.0);
    *elapsed += step;
    (step / duration, *elapsed >= duration)
}

/// Translate an entity by `delta` spread evenly over `duration` seconds
#[derive(Debug, Clone)]
pub struct MoveBy {
    delta: Vec3,
    duration: f32,
    elapsed: f32,
}

impl MoveBy {
    /// Create a move over `duration` seconds
    pub fn new(delta: Vec3, duration: f32) -> Self {
        Self {
            delta,
            duration,
            elapsed: 0.0,
        }
    }
}

impl Action for MoveBy {
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> ActionStatus {
        let (fraction, done) = advance(&mut self.elapsed, self.duration, delta_time);
        entity.transform_mut().translate(self.delta * fraction);
        ActionStatus::finished_if(done)
    }
}

/// Rotate an entity by Euler angles (radians) spread over `duration` seconds
#[derive(Debug, Clone)]
pub struct RotateBy {
    angles: Vec3,
    duration: f32,
    elapsed: f32,
}

impl RotateBy {
    /// Create a rotation of `(roll, pitch, yaw)` over `duration` seconds
    pub fn new(angles: Vec3, duration: f32) -> Self {
        Self {
            angles,
            duration,
            elapsed: 0.0,
        }
    }
}

impl Action for RotateBy {
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> ActionStatus {
        let (fraction, done) = advance(&mut self.elapsed, self.duration, delta_time);
        let step = self.angles * fraction;
        entity.transform_mut().rotate_euler(step.x, step.y, step.z);
        ActionStatus::finished_if(done)
    }
}

/// Mark the entity dead once `duration` seconds have passed
#[derive(Debug, Clone)]
pub struct Lifetime {
    remaining: f32,
}

impl Lifetime {
    /// Create a lifetime of `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self { remaining: duration }
    }

    /// Seconds left before the entity is marked dead
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl Action for Lifetime {
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> ActionStatus {
        self.remaining -= delta_time;
        if self.remaining <= 0.0 {
            entity.mark_dead();
            ActionStatus::Finished
        } else {
            ActionStatus::Continue
        }
    }
}

/// Run a copy of `template` to completion `times` times in a row
#[derive(Debug, Clone)]
pub struct Repeat<A: Action + Clone> {
    template: A,
    current: A,
    remaining: u32,
}

impl<A: Action + Clone> Repeat<A> {
    /// Repeat `action` `times` times; zero behaves like one
    pub fn new(action: A, times: u32) -> Self {
        Self {
            current: action.clone(),
            template: action,
            remaining: times.max(1),
        }
    }
}

impl<A: Action + Clone> Action for Repeat<A> {
    fn init(&mut self, entity: &mut EntityCore) {
        self.current.init(entity);
    }

    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> ActionStatus {
        if self.current.update(entity, delta_time) == ActionStatus::Continue {
            return ActionStatus::Continue;
        }

        self.current.destroy(entity);
        self.remaining -= 1;
        if self.remaining == 0 {
            return ActionStatus::Finished;
        }
        self.current = self.template.clone();
        self.current.init(entity);
        ActionStatus::Continue
    }
}

/// Action driven by a closure
pub struct FnAction<F>
where
    F: FnMut(&mut EntityCore, f32) -> ActionStatus + 'static,
{
    step: F,
}

impl<F> FnAction<F>
where
    F: FnMut(&mut EntityCore, f32) -> ActionStatus + 'static,
{
    /// Wrap a closure called once per update pass
    pub fn new(step: F) -> Self {
        Self { step }
    }
}

impl<F> Action for FnAction<F>
where
    F: FnMut(&mut EntityCore, f32) -> ActionStatus + 'static,
{
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> ActionStatus {
        (self.step)(entity, delta_time)
    }
}
