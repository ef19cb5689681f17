//! Player projectiles
//!
//! Power levels:
//! - 0: bullet
//! - 1: triple bullet
//! - 2: laser
//! - 3: triple laser
//! - 4: nuke (limited shots)
//! - 5: nuke ring from the power-up

use std::f32::consts::PI;

use glam::Vec2;

use crate::audio::Sound;
use crate::consts::{LASER_RADIUS, NUKE_MAX_RADIUS, SCREEN_WIDTH, SHOT_RADIUS, SHOT_SPEED};
use crate::heading;
use crate::renderer::{DrawCommand, Sprite, Surface, colors};
use crate::sim::{Action, Body, Collidable, Entity, EntityKind, FrameContext, WorldView};

/// Angle between the center shot and each side shot of a triple
const SPLIT_ANGLE: f32 = PI / 12.0;

/// Score for each foe or meteor swept by a nuke ring
const SWEEP_SCORE: i64 = 10;

pub struct Fire {
    pos: Vec2,
    angle: f32,
    power: u8,
    radius: f32,
    /// Launch sound already played (or suppressed)
    started: bool,
}

impl Fire {
    pub fn new(pos: Vec2, angle: f32, power: u8) -> Self {
        let radius = match power {
            2 | 3 => LASER_RADIUS,
            _ => SHOT_RADIUS,
        };
        Self {
            pos,
            angle,
            power,
            radius,
            started: false,
        }
    }

    /// Side shot of a triple; makes no sound of its own
    pub fn quiet(pos: Vec2, angle: f32, power: u8) -> Self {
        Self {
            started: true,
            ..Self::new(pos, angle, power)
        }
    }

    /// Cooldown the shooter waits after this shot
    pub fn delay(&self) -> f32 {
        match self.power {
            1 => 0.1875,
            2 | 3 => 0.0,
            4 => 3.0,
            _ => 0.125,
        }
    }

    pub fn power(&self) -> u8 {
        self.power
    }

    fn is_nuke(&self) -> bool {
        matches!(self.power, 4 | 5)
    }

    fn launch_sound(&self) -> Sound {
        match self.power {
            2 | 3 => Sound::Laser,
            4 => Sound::LargeExplosion,
            _ => Sound::Bullet,
        }
    }

    /// Score and remove every foe or meteor inside the ring
    fn sweep(&self) -> Action {
        let (center, radius) = (self.pos, self.radius);
        Action::for_each(move |handle, entity| {
            let target = matches!(entity.kind(), EntityKind::Foe | EntityKind::Meteor);
            (target && entity.position().distance(center) <= radius).then(|| {
                Action::composite([Action::adjust_score(SWEEP_SCORE), Action::despawn(handle)])
            })
        })
    }
}

impl Entity for Fire {
    fn kind(&self) -> EntityKind {
        EntityKind::Fire { power: self.power }
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        if matches!(self.power, 1 | 3) {
            self.power -= 1;
            return Some(Action::composite([
                Action::spawn(Fire::quiet(self.pos, self.angle - SPLIT_ANGLE, self.power)),
                Action::spawn(Fire::quiet(self.pos, self.angle + SPLIT_ANGLE, self.power)),
            ]));
        }

        if !self.started {
            self.started = true;
            return Some(Action::play_audio(self.launch_sound()));
        }

        if self.is_nuke() {
            self.radius += SHOT_SPEED * ctx.delta;
            if self.radius > NUKE_MAX_RADIUS {
                return Some(Action::despawn(ctx.me));
            }
            return Some(self.sweep());
        }

        self.pos += heading(self.angle) * SHOT_SPEED * ctx.delta;
        (self.pos.x > SCREEN_WIDTH + self.radius).then(|| Action::despawn(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        let cmd = match self.power {
            0 | 1 => DrawCommand::Sprite {
                sprite: Sprite::Bullet,
                center: self.pos,
                size: Vec2::splat(12.0),
                angle: 0.0,
            },
            2 | 3 => DrawCommand::Sprite {
                sprite: Sprite::Laser,
                center: self.pos,
                size: Vec2::new(24.0, 4.0),
                angle: self.angle,
            },
            _ => DrawCommand::Disc {
                center: self.pos,
                radius: self.radius,
                color: colors::NUKE,
            },
        };
        surface.submit(cmd);
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for Fire {
    fn radius(&self) -> f32 {
        self.radius
    }

    /// Bullets are spent on a foe; lasers and nukes go through
    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        (other.kind == EntityKind::Foe && self.power <= 1).then(|| Action::despawn(&me.handle))
    }
}
