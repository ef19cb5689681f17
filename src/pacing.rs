//! Frame pacing
//!
//! Turns wall-clock timestamps into the clamped `delta_seconds` handed to the
//! frame orchestrator and tracks FPS over the last 60 frames.

use crate::consts::{FPS, MAX_FRAME_DELTA};

const RING: usize = 60;

/// Clamp a raw delta into `[0, MAX_FRAME_DELTA]`; non-finite becomes 0
pub fn clamp_delta(raw: f32) -> f32 {
    if raw.is_finite() {
        raw.clamp(0.0, MAX_FRAME_DELTA)
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_time: Option<f64>,
    frame_times: [f64; RING],
    frame_index: usize,
    recorded: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_time: None,
            frame_times: [0.0; RING],
            frame_index: 0,
            recorded: 0,
            fps: 0,
        }
    }

    /// Nominal delta for a fixed-rate loop
    pub fn fixed_delta() -> f32 {
        1.0 / FPS as f32
    }

    /// Record a frame at `time` (seconds) and return the clamped delta since
    /// the previous one. The first tick yields 0.
    pub fn tick(&mut self, time: f64) -> f32 {
        let delta = match self.last_time {
            Some(last) => clamp_delta((time - last) as f32),
            None => 0.0,
        };
        self.last_time = Some(time);
        self.record(time);
        delta
    }

    /// Push a timestamp into the FPS ring
    pub fn record(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % RING;
        self.recorded = (self.recorded + 1).min(RING);

        // Oldest sample is the one about to be overwritten
        let oldest = if self.recorded == RING {
            self.frame_times[self.frame_index]
        } else {
            self.frame_times[0]
        };
        let elapsed = time - oldest;
        if self.recorded > 1 && elapsed > 0.0 {
            self.fps = ((self.recorded - 1) as f64 / elapsed).round() as u32;
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}
