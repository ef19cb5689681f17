//! Player shield
//!
//! Trails the player's nose using the frame-start roster and the shared tilt
//! cell, absorbs a fixed number of hits, and breaks on a foe.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use super::effects::Explosion;
use crate::audio::Sound;
use crate::consts::{FPS, SHIELD_HP, SHIELD_MAX_SIZE};
use crate::renderer::{DrawCommand, Sprite, Surface};
use crate::sim::{
    Action, Body, Collidable, Entity, EntityKind, FrameContext, WeakRef, WorldView,
};
use crate::{approach, heading};

/// Distance ahead of the player's center
const LEAD: f32 = 48.0;

pub struct Shield {
    owner: WeakRef,
    tilt: Rc<Cell<f32>>,
    pos: Vec2,
    angle: f32,
    size: f32,
    hp: u32,
}

impl Shield {
    pub fn new(owner: WeakRef, pos: Vec2, tilt: Rc<Cell<f32>>) -> Self {
        Self {
            owner,
            angle: tilt.get(),
            tilt,
            pos,
            size: 2.0,
            hp: SHIELD_HP,
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    fn shatter(&self, me: &Body) -> Action {
        Action::composite([
            Action::despawn(&me.handle),
            Action::play_audio(Sound::LargeExplosion),
            Action::spawn(Explosion::new(me.position, SHIELD_MAX_SIZE, None)),
        ])
    }
}

impl Entity for Shield {
    fn kind(&self) -> EntityKind {
        EntityKind::Shield
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        let Some(owner) = ctx.roster.locate_weak(&self.owner) else {
            return Some(Action::despawn(ctx.me));
        };
        let dt = ctx.delta;
        let tilt = self.tilt.get();
        let target = owner + heading(tilt) * LEAD;

        self.angle = approach(self.angle, tilt, 10.0, dt);
        self.pos.x = approach(self.pos.x, target.x, 10.0, dt);
        self.pos.y = approach(self.pos.y, target.y, 10.0, dt);
        self.size = approach(self.size, SHIELD_MAX_SIZE, 5.0, dt);
        None
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Sprite {
            sprite: Sprite::Shield,
            center: self.pos,
            size: Vec2::splat(self.size),
            angle: self.angle,
        });
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for Shield {
    /// The hit area reaches the full sprite size, twice the drawn radius
    fn radius(&self) -> f32 {
        self.size
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        match other.kind {
            EntityKind::Foe => Some(self.shatter(me)),
            EntityKind::EnemyFire | EntityKind::ForceField => {
                self.hp = self.hp.saturating_sub(1);
                if self.hp == 0 {
                    log::debug!("shield broken");
                    Some(self.shatter(me))
                } else {
                    Some(Action::play_audio(Sound::SmallExplosion))
                }
            }
            EntityKind::Meteor => {
                self.pos.x -= 10.0 / FPS as f32;
                None
            }
            _ => None,
        }
    }
}
