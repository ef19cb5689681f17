//! Power-up badges
//!
//! The badge handles its own pickup (score, sound, removal); the player
//! adopts the power on its side of the same collision.

use glam::Vec2;
use rand::Rng;

use crate::audio::Sound;
use crate::consts::{POWERUP_RADIUS, SCREEN_WIDTH};
use crate::renderer::{DrawCommand, Sprite, Surface};
use crate::sim::{Action, Body, Collidable, Entity, EntityKind, FrameContext, WorldView};

/// Power value of the shield badge offered by the player
pub const SHIELD_POWER: u8 = 6;

/// Score for each foe or meteor cleared by the power-5 badge
const SWEEP_SCORE: i64 = 10;

/// Weighted roll over powers 0..=5 (1:4:3:2:1:1)
pub fn roll_power(rng: &mut impl Rng) -> u8 {
    match rng.random_range(0..12) {
        0 => 0,
        1..=4 => 1,
        5..=7 => 2,
        8 | 9 => 3,
        10 => 4,
        _ => 5,
    }
}

/// Points for picking up a badge of `power`
pub fn pickup_score(power: u8) -> i64 {
    if power == 0 {
        100
    } else {
        20 + 10 * power as i64
    }
}

pub struct PowerUp {
    pos: Vec2,
    speed: f32,
    power: u8,
}

impl PowerUp {
    /// Enter from the right edge at height `y`
    pub fn new(y: f32, speed: f32, power: u8) -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH + POWERUP_RADIUS, y),
            speed,
            power,
        }
    }

    /// Resting badge at `pos`
    pub fn at(pos: Vec2, power: u8) -> Self {
        Self {
            pos,
            speed: 0.0,
            power,
        }
    }

    pub fn power(&self) -> u8 {
        self.power
    }

    fn pickup_sound(&self, player_power: u8) -> Sound {
        if player_power < self.power && self.power != 5 {
            Sound::PowerUp
        } else if player_power > self.power {
            Sound::PowerDown
        } else if self.power == 5 {
            Sound::LargeExplosion
        } else {
            Sound::Catch
        }
    }
}

impl Entity for PowerUp {
    fn kind(&self) -> EntityKind {
        EntityKind::PowerUp { power: self.power }
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        self.pos.x -= self.speed * ctx.delta;
        (self.pos.x < -POWERUP_RADIUS * 2.0).then(|| Action::despawn(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        let sprite = if self.power == SHIELD_POWER {
            Sprite::Shield
        } else {
            Sprite::PowerUp(self.power)
        };
        surface.submit(DrawCommand::Sprite {
            sprite,
            center: self.pos,
            size: Vec2::splat(POWERUP_RADIUS * 2.0),
            angle: 0.0,
        });
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for PowerUp {
    fn radius(&self) -> f32 {
        POWERUP_RADIUS
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        let EntityKind::Player { power: player_power } = other.kind else {
            return None;
        };
        log::debug!("power-up {} collected", self.power);

        let mut actions = vec![
            Action::despawn(&me.handle),
            Action::play_audio(self.pickup_sound(player_power)),
            Action::adjust_score(pickup_score(self.power)),
        ];
        if self.power == 5 {
            actions.push(Action::for_each(|handle, entity| {
                matches!(entity.kind(), EntityKind::Foe | EntityKind::Meteor).then(|| {
                    Action::composite([Action::adjust_score(SWEEP_SCORE), Action::despawn(handle)])
                })
            }));
        }
        Some(Action::composite(actions))
    }
}
