//! Game settings and preferences
//!
//! Stored as JSON next to the binary. Missing fields take their defaults so
//! older files keep loading.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FPS, INITIAL_LIVES, MAX_FRAME_DELTA, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::FrameConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    pub width: f32,
    pub height: f32,
    pub target_fps: u32,
    /// Show FPS counter
    pub show_fps: bool,

    // === Simulation ===
    pub initial_lives: i32,
    /// Largest delta handed to a frame (seconds)
    pub max_frame_delta: f32,
    /// Distance past the screen edge before a bounded entity is culled;
    /// negative disables cleanup
    pub cleanup_margin: f32,
    pub max_drain_depth: usize,
    pub max_drain_steps: usize,
    /// Spawner RNG seed
    pub seed: u64,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            target_fps: FPS,
            show_fps: false,

            initial_lives: INITIAL_LIVES,
            max_frame_delta: MAX_FRAME_DELTA,
            cleanup_margin: 256.0,
            max_drain_depth: 64,
            max_drain_steps: 100_000,
            seed: 0x5eed,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Seconds per frame at the target rate
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Orchestrator configuration derived from these settings
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            initial_lives: self.initial_lives.max(0),
            bounds: Vec2::new(self.width, self.height),
            cleanup_margin: (self.cleanup_margin >= 0.0).then_some(self.cleanup_margin),
            max_drain_depth: self.max_drain_depth.max(1),
            max_drain_steps: self.max_drain_steps.max(1),
        }
    }
}
