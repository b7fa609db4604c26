use std::time::{Duration, Instant};

use crate::foundation::core::Fps;

/// Source of animation ticks, one per frame the pipeline should draw.
pub trait FrameClock {
    /// Block until the next tick is due.
    fn wait_next(&mut self);
}

/// Ticks as fast as the pipeline can draw; for offline rendering and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateClock;

impl FrameClock for ImmediateClock {
    fn wait_next(&mut self) {}
}

/// Ticks at a fixed frame rate. A late tick re-anchors the schedule instead of bursting to catch
/// up, like a display refresh callback.
#[derive(Clone, Debug)]
pub struct PacedClock {
    interval: Duration,
    next: Option<Instant>,
}

impl PacedClock {
    pub fn new(fps: Fps) -> Self {
        Self {
            interval: Duration::from_secs_f64(fps.frame_duration_secs()),
            next: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameClock for PacedClock {
    fn wait_next(&mut self) {
        let now = Instant::now();
        let due = match self.next {
            Some(due) if due > now => {
                std::thread::sleep(due - now);
                due
            }
            Some(_) | None => now,
        };
        self.next = Some(due + self.interval);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/clock.rs"]
mod tests;
