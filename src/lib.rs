//! Starshot - a side-scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic frame core (actions, entities, collisions, orchestrator)
//! - `game`: Gameplay entities built on the entity capability set
//! - `renderer`: Layered draw surfaces (headless display lists)
//! - `audio`: Sound handles and playback sinks
//! - `input`: Discrete per-frame input events
//! - `settings`: Data-driven configuration
//! - `pacing`: Wall-clock frame pacing and FPS measurement

pub mod audio;
pub mod game;
pub mod input;
pub mod pacing;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Target frame rate
    pub const FPS: u32 = 60;
    /// Largest delta the outer loop hands to the core (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Screen dimensions in pixels
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Draw layers
    pub const Z_BACKGROUND: i32 = -1;
    pub const Z_DEFAULT: i32 = 0;
    pub const Z_PLAYER: i32 = 10;
    pub const Z_EXPLOSION: i32 = 12;
    pub const Z_HUD: i32 = 20;

    /// Lives at the start of an episode
    pub const INITIAL_LIVES: i32 = 3;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 28.0;
    pub const PLAYER_SPEED: f32 = 400.0;
    /// Seconds between offered shield power-ups
    pub const SHIELD_OFFER_INTERVAL: f32 = 10.0;

    /// Projectile defaults
    pub const SHOT_SPEED: f32 = 1200.0;
    pub const SHOT_RADIUS: f32 = 6.0;
    pub const LASER_RADIUS: f32 = 12.0;
    /// Nuke ring stops growing past this radius
    pub const NUKE_MAX_RADIUS: f32 = 1280.0;
    /// Shots granted by the nuke power
    pub const NUKE_SHOTS: u32 = 5;

    /// Foe defaults
    pub const FOE_RADIUS: f32 = 24.0;
    pub const FOE_SENSOR_RADIUS: f32 = 100.0;
    pub const FOE_SENSOR_REACH: f32 = 100.0;

    /// Power-up defaults
    pub const POWERUP_RADIUS: f32 = 24.0;

    /// Hits a shield absorbs before breaking
    pub const SHIELD_HP: u32 = 10;
    pub const SHIELD_MAX_SIZE: f32 = 128.0;

    /// Seconds the reload collaborator waits before a new player appears
    pub const RELOAD_DELAY: f32 = 3.0;
}

/// Position for entities without spatial meaning (HUD, spawners, timers).
///
/// Entities resting here are exempt from out-of-bounds cleanup.
pub const RESTING: Vec2 = Vec2::new(-1.0e6, -1.0e6);

/// Screen size as a vector
#[inline]
pub fn screen_size() -> Vec2 {
    Vec2::new(consts::SCREEN_WIDTH, consts::SCREEN_HEIGHT)
}

/// Unit direction for a heading angle (radians, y down)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Move `current` toward `target` by `rate * dt` of the remaining gap.
///
/// The factor is clamped to 1 so large deltas land on the target instead of
/// overshooting.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}
