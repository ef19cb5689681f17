//! Foes and everything they own or shoot
//!
//! A `Foe` owns a `FoeSensor` satellite placed ahead of it. The sensor feels
//! nearby ships and rocks and nudges the foe through a shared steering cell:
//! away from obstacles, toward the player. The foe despawns its sensor along
//! with itself; a sensor whose foe vanished otherwise removes itself.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::Explosion;
use crate::audio::Sound;
use crate::consts::{
    FOE_RADIUS, FOE_SENSOR_RADIUS, FOE_SENSOR_REACH, SCREEN_HEIGHT, SHOT_RADIUS, SHOT_SPEED,
};
use crate::renderer::{DrawCommand, Sprite, Surface, colors};
use crate::sim::{
    Action, Body, Collidable, Entity, EntityKind, EntityRef, FrameContext, WeakRef, WorldView,
};
use crate::approach;

/// Vertical impulse one sensor contact adds to the steering cell
const STEER_IMPULSE: f32 = 80.0;
/// Score for shooting a foe down
const FOE_SCORE: i64 = 10;
/// Force fields stop growing here
const FORCE_FIELD_MAX: f32 = 120.0;

pub struct Foe {
    pos: Vec2,
    speed: f32,
    vy: f32,
    /// Written by the sensor, consumed here
    steer: Rc<Cell<f32>>,
    sensor: EntityRef,
    shot_timer: f32,
    /// Retired this frame; further contacts are ignored
    dead: bool,
    rng: Pcg32,
}

impl Foe {
    /// Build a foe and its sensor. The action spawns both.
    pub fn spawn(pos: Vec2, speed: f32, seed: u64) -> (EntityRef, Action) {
        let mut sensor_handle = None;
        let foe = EntityRef::new_cyclic(|me| {
            let steer = Rc::new(Cell::new(0.0));
            let sensor = EntityRef::new(FoeSensor::new(me, pos, steer.clone()));
            sensor_handle = Some(sensor.clone());
            let mut rng = Pcg32::seed_from_u64(seed);
            Foe {
                pos,
                speed,
                vy: 0.0,
                steer,
                sensor,
                shot_timer: rng.random_range(0.5..2.0),
                dead: false,
                rng,
            }
        });
        let action = Action::composite(
            [Action::spawn_handle(foe.clone())]
                .into_iter()
                .chain(sensor_handle.map(Action::spawn_handle)),
        );
        (foe, action)
    }

    /// Remove self and the sensor
    fn retire(&mut self, me: &EntityRef) -> Action {
        self.dead = true;
        Action::composite([Action::despawn(me), Action::despawn(&self.sensor)])
    }

    fn shoot(&mut self, me: &EntityRef) -> Action {
        self.shot_timer = self.rng.random_range(1.0..3.0);
        if self.rng.random_bool(0.25) {
            Action::spawn(ForceField::new(self.pos, self.speed))
        } else {
            Action::spawn(EnemyFire::new(self.pos, me.downgrade()))
        }
    }
}

impl Entity for Foe {
    fn kind(&self) -> EntityKind {
        EntityKind::Foe
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        let dt = ctx.delta;
        self.vy += self.steer.replace(0.0);
        self.vy = approach(self.vy, 0.0, 1.0, dt);
        self.pos.x -= self.speed * dt;
        self.pos.y = (self.pos.y + self.vy * dt).clamp(FOE_RADIUS, SCREEN_HEIGHT - FOE_RADIUS);

        if self.pos.x < -FOE_RADIUS * 2.0 {
            return Some(self.retire(ctx.me));
        }

        self.shot_timer -= dt;
        (self.shot_timer <= 0.0).then(|| self.shoot(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Sprite {
            sprite: Sprite::Foe,
            center: self.pos,
            size: Vec2::new(64.0, 40.0),
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

impl Collidable for Foe {
    fn radius(&self) -> f32 {
        FOE_RADIUS
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        if self.dead {
            return None;
        }
        match other.kind {
            EntityKind::Fire { power } if power <= 3 => Some(Action::composite([
                self.retire(&me.handle),
                Action::spawn(Explosion::small(me.position)),
                Action::adjust_score(FOE_SCORE),
            ])),
            EntityKind::Player { .. } | EntityKind::Shield => Some(Action::composite([
                self.retire(&me.handle),
                Action::spawn(Explosion::small(me.position)),
            ])),
            // The meteor removes the foe itself
            EntityKind::Meteor => {
                self.dead = true;
                Some(Action::despawn(&self.sensor))
            }
            _ => None,
        }
    }
}

/// Proximity sensor riding ahead of its foe
pub struct FoeSensor {
    owner: WeakRef,
    pos: Vec2,
    steer: Rc<Cell<f32>>,
    closed: bool,
}

impl FoeSensor {
    fn new(owner: WeakRef, owner_pos: Vec2, steer: Rc<Cell<f32>>) -> Self {
        Self {
            owner,
            pos: owner_pos - Vec2::new(FOE_SENSOR_REACH, 0.0),
            steer,
            closed: false,
        }
    }
}

impl Entity for FoeSensor {
    fn kind(&self) -> EntityKind {
        EntityKind::FoeSensor
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        if self.closed {
            return None;
        }
        match ctx.roster.locate_weak(&self.owner) {
            Some(owner) => {
                self.pos = owner - Vec2::new(FOE_SENSOR_REACH, 0.0);
                None
            }
            None => {
                self.closed = true;
                Some(Action::despawn(ctx.me))
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        if cfg!(debug_assertions) {
            surface.submit(DrawCommand::Ring {
                center: self.pos,
                radius: FOE_SENSOR_RADIUS,
                width: 1.0,
                color: colors::SENSOR,
            });
        }
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for FoeSensor {
    fn radius(&self) -> f32 {
        FOE_SENSOR_RADIUS
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        if self.closed || self.owner.is(&other.handle) {
            return None;
        }
        let push = match other.kind {
            EntityKind::Player { .. } => STEER_IMPULSE,
            EntityKind::Foe | EntityKind::Meteor => -STEER_IMPULSE,
            _ => return None,
        };
        let steer = if other.position.y < me.position.y {
            -push
        } else {
            push
        };
        self.steer.set(self.steer.get() + steer);
        None
    }
}

/// Foe bullet flying left
pub struct EnemyFire {
    pos: Vec2,
    shooter: WeakRef,
    started: bool,
}

impl EnemyFire {
    pub fn new(pos: Vec2, shooter: WeakRef) -> Self {
        Self {
            pos,
            shooter,
            started: false,
        }
    }
}

impl Entity for EnemyFire {
    fn kind(&self) -> EntityKind {
        EntityKind::EnemyFire
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        if !self.started {
            self.started = true;
            return Some(Action::play_audio(Sound::SmallExplosion));
        }
        self.pos.x -= SHOT_SPEED * ctx.delta;
        (self.pos.x < -SHOT_RADIUS).then(|| Action::despawn(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Sprite {
            sprite: Sprite::EnemyBullet,
            center: self.pos,
            size: Vec2::splat(12.0),
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

impl Collidable for EnemyFire {
    fn radius(&self) -> f32 {
        SHOT_RADIUS
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        let spent = match other.kind {
            EntityKind::Foe => !self.shooter.is(&other.handle),
            EntityKind::Player { .. } | EntityKind::Shield => true,
            _ => false,
        };
        spent.then(|| Action::despawn(&me.handle))
    }
}

/// Expanding ring fired by a foe
pub struct ForceField {
    pos: Vec2,
    size: f32,
    speed: f32,
}

impl ForceField {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            size: 12.0,
            speed,
        }
    }
}

impl Entity for ForceField {
    fn kind(&self) -> EntityKind {
        EntityKind::ForceField
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        self.size += self.size * 5.0 * ctx.delta;
        self.pos.x -= self.speed * ctx.delta;
        (self.size > FORCE_FIELD_MAX).then(|| Action::despawn(ctx.me))
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Ring {
            center: self.pos,
            radius: self.size,
            width: 4.0,
            color: colors::FORCE_FIELD,
        });
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for ForceField {
    fn radius(&self) -> f32 {
        self.size
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        (other.kind == EntityKind::Shield).then(|| {
            Action::composite([
                Action::despawn(&me.handle),
                Action::play_audio(Sound::SmallExplosion),
            ])
        })
    }
}
