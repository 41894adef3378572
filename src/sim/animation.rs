//! Frame-cycling clock for sprite animation

use serde::{Deserialize, Serialize};

/// Cycles `frame_count` frames, one per `interval` seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClock {
    interval: f32,
    frame_count: u32,
    elapsed: f32,
    frame: u32,
}

impl AnimationClock {
    pub fn new(interval: f32, frame_count: u32) -> Self {
        Self {
            interval,
            frame_count: frame_count.max(1),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Advance by `dt`, consuming whole intervals. Returns true if any
    /// interval elapsed. Negative and non-finite `dt` are ignored.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.interval <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.elapsed += dt;
        let steps = (self.elapsed / self.interval).floor();
        if steps < 1.0 {
            return false;
        }
        let advance = (steps % self.frame_count as f32) as u32;
        self.frame = (self.frame + advance) % self.frame_count;
        // Rounding at large magnitudes can leave the remainder just outside [0, interval)
        self.elapsed = (self.elapsed - steps * self.interval).clamp(0.0, self.interval);
        true
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frame = 0;
    }
}
