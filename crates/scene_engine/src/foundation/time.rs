//! Frame timing

use std::time::Instant;

/// Frame timer driving the per-frame `delta_time`
///
/// With a fixed delta the timer ignores the wall clock entirely, which keeps
/// headless runs and tests deterministic.
pub struct Timer {
    last_frame: Instant,
    fixed_delta: Option<f32>,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new wall-clock timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            fixed_delta: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Create a timer that advances by `delta` seconds every tick
    pub fn fixed(delta: f32) -> Self {
        Self {
            fixed_delta: Some(delta),
            ..Self::new()
        }
    }

    /// Advance one frame and return the new delta time
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_time = match self.fixed_delta {
            Some(delta) => delta,
            None => now.duration_since(self.last_frame).as_secs_f32(),
        };
        self.last_frame = now;
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_timer_is_deterministic() {
        let mut timer = Timer::fixed(0.25);
        assert_relative_eq!(timer.tick(), 0.25);
        assert_relative_eq!(timer.tick(), 0.25);

        assert_eq!(timer.frame_count(), 2);
        assert_relative_eq!(timer.total_time(), 0.5);
        assert_relative_eq!(timer.average_fps(), 4.0);
    }
}
