//! Drifting rocks
//!
//! Meteors destroy foes and small fire on contact. The player reacts to a
//! meteor on its own side of the collision.

use glam::Vec2;

use super::effects::Explosion;
use crate::renderer::{DrawCommand, Sprite, Surface};
use crate::sim::{Action, Body, Collidable, Entity, EntityKind, FrameContext, WorldView};

pub struct Meteor {
    pos: Vec2,
    speed: f32,
    size: f32,
    angle: f32,
    /// Radians per second
    rotation: f32,
    variant: u8,
}

impl Meteor {
    pub fn new(pos: Vec2, speed: f32, size: f32, rotation: f32, variant: u8) -> Self {
        Self {
            pos,
            speed,
            size,
            angle: 0.0,
            rotation,
            variant,
        }
    }
}

impl Entity for Meteor {
    fn kind(&self) -> EntityKind {
        EntityKind::Meteor
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        self.pos.x -= self.speed * ctx.delta;
        self.angle += self.rotation * ctx.delta;
        (self.pos.x < -self.size).then(|| Action::despawn(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Sprite {
            sprite: Sprite::Meteor(self.variant),
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

impl Collidable for Meteor {
    fn radius(&self) -> f32 {
        self.size / 2.0
    }

    fn on_collision(&mut self, _me: &Body, other: &Body) -> Option<Action> {
        match other.kind {
            EntityKind::Foe | EntityKind::Fire { power: 0 | 1 } => Some(Action::composite([
                Action::despawn(&other.handle),
                Action::spawn(Explosion::small(other.position)),
            ])),
            // Lasers are absorbed without a blast
            EntityKind::Fire { power: 2 | 3 } => Some(Action::despawn(&other.handle)),
            _ => None,
        }
    }
}
