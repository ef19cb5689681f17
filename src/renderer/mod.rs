//! Rendering seam
//!
//! Entities describe what they look like as `DrawCommand`s submitted to a
//! `Surface`. A `Renderer` hands out one surface per `z` layer and composites
//! them bottom to top. Rasterization belongs to whatever backend implements
//! `Renderer`; the crate ships a recording one.

pub mod display_list;

use glam::Vec2;
use serde::Serialize;

pub use display_list::{DisplayList, DisplayListRenderer};

/// Sprite sheet entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sprite {
    Player,
    Bullet,
    EnemyBullet,
    Laser,
    Foe,
    /// Meteor variant
    Meteor(u8),
    /// Power-up badge by power level
    PowerUp(u8),
    Shield,
    /// Explosion animation frame
    Explosion(u8),
    /// Remaining-life marker
    Life,
    /// Parallax star layer
    Starfield(u8),
}

/// One primitive in screen coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Sprite {
        sprite: Sprite,
        center: Vec2,
        size: Vec2,
        /// Radians
        angle: f32,
    },
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: [f32; 4],
    },
    Disc {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    Text {
        anchor: Vec2,
        text: String,
        size: f32,
        color: [f32; 4],
    },
}

/// Draw target for one layer
pub trait Surface {
    fn submit(&mut self, cmd: DrawCommand);
}

/// Layered presentation backend
pub trait Renderer {
    type Layer: Surface;

    /// Fresh transparent layer for entities at `z`
    fn begin_layer(&mut self, z: i32) -> Self::Layer;

    /// Present `layers`, already sorted ascending by `z`
    fn composite(&mut self, layers: Vec<(i32, Self::Layer)>);
}

/// Color palette
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const HUD: [f32; 4] = [0.9, 0.9, 0.95, 1.0];
    pub const HUD_ALERT: [f32; 4] = [1.0, 0.35, 0.3, 1.0];
    pub const FORCE_FIELD: [f32; 4] = [0.6, 0.2, 0.8, 0.6];
    pub const SHIELD: [f32; 4] = [0.3, 0.7, 1.0, 0.8];
    pub const NUKE: [f32; 4] = [1.0, 0.85, 0.3, 0.9];
    pub const SENSOR: [f32; 4] = [0.2, 0.8, 0.4, 0.25];
}
