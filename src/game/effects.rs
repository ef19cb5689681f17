//! Short-lived and ambient entities: explosions, the respawn timer and the
//! star background

use glam::Vec2;

use super::player::Player;
use crate::audio::Sound;
use crate::consts::{RELOAD_DELAY, SCREEN_HEIGHT, SCREEN_WIDTH, Z_BACKGROUND, Z_EXPLOSION};
use crate::renderer::{DrawCommand, Sprite, Surface};
use crate::sim::{Action, Entity, EntityKind, FrameContext, WorldView};

/// Animation frames in an explosion
const EXPLOSION_FRAMES: f32 = 9.0;
/// Animation frames per second
const EXPLOSION_RATE: f32 = 40.0;

pub struct Explosion {
    pos: Vec2,
    size: f32,
    frame: f32,
    /// Played on the first update
    sound: Option<Sound>,
}

impl Explosion {
    pub fn new(pos: Vec2, size: f32, sound: Option<Sound>) -> Self {
        Self {
            pos,
            size,
            frame: 0.0,
            sound,
        }
    }

    pub fn small(pos: Vec2) -> Self {
        Self::new(pos, 72.0, Some(Sound::SmallExplosion))
    }

    pub fn large(pos: Vec2) -> Self {
        Self::new(pos, 120.0, Some(Sound::LargeExplosion))
    }
}

impl Entity for Explosion {
    fn kind(&self) -> EntityKind {
        EntityKind::Explosion
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn z(&self) -> i32 {
        Z_EXPLOSION
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        if let Some(sound) = self.sound.take() {
            return Some(Action::play_audio(sound));
        }
        self.frame += ctx.delta * EXPLOSION_RATE;
        (self.frame >= EXPLOSION_FRAMES).then(|| Action::despawn(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Sprite {
            sprite: Sprite::Explosion(self.frame.min(EXPLOSION_FRAMES - 1.0) as u8),
            center: self.pos,
            size: Vec2::splat(self.size),
            angle: 0.0,
        });
    }
}

/// Respawn collaborator: keeps the field clear, then brings a new player
pub struct Reload {
    delay: f32,
    seed: u64,
}

impl Reload {
    pub fn new(seed: u64) -> Self {
        Self {
            delay: RELOAD_DELAY,
            seed,
        }
    }
}

impl Entity for Reload {
    fn kind(&self) -> EntityKind {
        EntityKind::Reload
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        self.delay -= ctx.delta;
        if self.delay <= 0.0 {
            log::info!("respawning player");
            return Some(Action::composite([
                Action::despawn(ctx.me),
                Action::spawn(Player::new(self.seed)),
            ]));
        }
        Some(Action::despawn_where(|e| e.as_collidable().is_some()))
    }
}

/// Three parallax star layers scrolling left, wrapping at the screen width
pub struct Stars {
    offsets: [f32; 3],
}

impl Stars {
    const SPEEDS: [f32; 3] = [10.0, 20.0, 40.0];

    pub fn new() -> Self {
        Self {
            offsets: [10.0, 0.0, 0.0],
        }
    }

    pub fn offsets(&self) -> [f32; 3] {
        self.offsets
    }
}

impl Default for Stars {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Stars {
    fn kind(&self) -> EntityKind {
        EntityKind::Scenery
    }

    fn z(&self) -> i32 {
        Z_BACKGROUND
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        for (offset, speed) in self.offsets.iter_mut().zip(Self::SPEEDS) {
            *offset = (*offset - speed * ctx.delta).rem_euclid(SCREEN_WIDTH);
        }
        None
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        let size = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        for (layer, offset) in self.offsets.iter().enumerate() {
            // Two copies side by side cover the wrap
            for x in [offset - SCREEN_WIDTH, *offset] {
                surface.submit(DrawCommand::Sprite {
                    sprite: Sprite::Starfield(layer as u8),
                    center: Vec2::new(x, 0.0) + size / 2.0,
                    size,
                    angle: 0.0,
                });
            }
        }
    }
}
