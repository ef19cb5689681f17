//! The player ship

use std::cell::Cell;
use std::f32::consts::FRAC_PI_4;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::Explosion;
use super::fire::Fire;
use super::powerup::{PowerUp, SHIELD_POWER};
use super::shield::Shield;
use crate::audio::Sound;
use crate::consts::*;
use crate::input::{InputEvent, Key};
use crate::renderer::{DrawCommand, Sprite, Surface};
use crate::sim::{Action, Body, Collidable, Entity, EntityKind, EntityRef, FrameContext, WorldView};
use crate::approach;

/// Held movement/fire keys
#[derive(Debug, Clone, Copy, Default)]
struct Held {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    fire: bool,
}

pub struct Player {
    pos: Vec2,
    /// Unit-ish movement direction from held keys
    dir: Vec2,
    /// Tilt the ship eases toward
    tilt_target: f32,
    /// Current tilt, shared with the shield
    tilt: Rc<Cell<f32>>,
    held: Held,
    power: u8,
    previous_power: u8,
    /// Nuke shots left at power 4
    shots: u32,
    cooldown: f32,
    shield: Option<EntityRef>,
    /// Seconds until the next shield power-up may be offered
    shield_offer: f32,
    /// Set by the first hostile contact; later contacts in the same pass
    /// are ignored
    destroyed: bool,
    rng: Pcg32,
}

impl Player {
    pub fn new(seed: u64) -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH / 4.0, SCREEN_HEIGHT / 2.0),
            dir: Vec2::ZERO,
            tilt_target: 0.0,
            tilt: Rc::new(Cell::new(0.0)),
            held: Held::default(),
            power: 0,
            previous_power: 0,
            shots: 0,
            cooldown: 0.0,
            shield: None,
            shield_offer: 0.0,
            destroyed: false,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn power(&self) -> u8 {
        self.power
    }

    pub fn shield(&self) -> Option<&EntityRef> {
        self.shield.as_ref()
    }

    fn set_power(&mut self, value: u8) {
        if self.power != value && self.power != 4 {
            self.previous_power = self.power;
        }
        if value == 4 {
            self.shots = NUKE_SHOTS;
        }
        self.cooldown = 0.0;
        self.power = value;
    }

    fn offer_shield(&mut self) -> Action {
        self.shield_offer = SHIELD_OFFER_INTERVAL;
        let y = self
            .rng
            .random_range(POWERUP_RADIUS..SCREEN_HEIGHT - POWERUP_RADIUS);
        let speed = 50.0 + self.rng.random::<f32>() * 50.0;
        Action::spawn(PowerUp::new(y, speed, SHIELD_POWER))
    }

    fn fire(&mut self) -> Action {
        let (pos, angle) = (self.pos, self.tilt.get());
        // Half the laser shots are silent
        let fire = if matches!(self.power, 2 | 3) && self.rng.random_bool(0.5) {
            Fire::quiet(pos, angle, self.power)
        } else {
            Fire::new(pos, angle, self.power)
        };
        self.cooldown = fire.delay();
        let shot = Action::spawn(fire);
        if self.power != 4 {
            return shot;
        }
        self.shots = self.shots.saturating_sub(1);
        if self.shots > 0 {
            return shot;
        }
        log::debug!("nuke shots spent, back to power {}", self.previous_power);
        self.power = self.previous_power;
        self.cooldown = 0.5;
        Action::composite([Action::play_audio(Sound::PowerDown), shot])
    }

    fn steer(&mut self) {
        let held = self.held;
        self.dir = Vec2::ZERO;
        self.tilt_target = 0.0;
        if held.up {
            self.dir.y -= 1.0;
            self.tilt_target -= FRAC_PI_4;
        }
        if held.down {
            self.dir.y += 1.0;
            self.tilt_target += FRAC_PI_4;
        }
        if held.left {
            self.dir.x -= 1.0;
        }
        if held.right {
            self.dir.x += 1.0;
        }
    }
}

impl Entity for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player { power: self.power }
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn z(&self) -> i32 {
        Z_PLAYER
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        let dt = ctx.delta;

        // Forget a shield that is no longer live
        if self
            .shield
            .as_ref()
            .is_some_and(|shield| ctx.roster.get(shield).is_none())
        {
            self.shield = None;
        }

        self.cooldown = (self.cooldown - dt).max(0.0);
        self.pos += self.dir * PLAYER_SPEED * dt;
        self.pos = self.pos.clamp(
            Vec2::ZERO,
            Vec2::new(SCREEN_WIDTH * 2.0 / 3.0, SCREEN_HEIGHT),
        );
        let tilt = approach(self.tilt.get(), self.tilt_target, 4.0, dt);
        self.tilt.set(tilt.clamp(-FRAC_PI_4, FRAC_PI_4));

        self.shield_offer = (self.shield_offer - dt).max(0.0);
        if self.shield_offer == 0.0 && self.shield.is_none() {
            return Some(self.offer_shield());
        }

        if self.held.fire && self.cooldown == 0.0 {
            return Some(self.fire());
        }
        None
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(DrawCommand::Sprite {
            sprite: Sprite::Player,
            center: self.pos,
            size: Vec2::splat(64.0),
            angle: self.tilt.get(),
        });
    }

    fn react(&mut self, events: &[InputEvent]) {
        for event in events {
            let (key, down) = match *event {
                InputEvent::KeyDown(key) => (key, true),
                InputEvent::KeyUp(key) => (key, false),
                InputEvent::Quit => continue,
            };
            match key {
                Key::Up => self.held.up = down,
                Key::Down => self.held.down = down,
                Key::Left => self.held.left = down,
                Key::Right => self.held.right = down,
                Key::Fire => self.held.fire = down,
                _ => {}
            }
        }
        self.steer();
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for Player {
    fn radius(&self) -> f32 {
        PLAYER_RADIUS
    }

    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action> {
        if self.destroyed {
            return None;
        }
        if other.kind.is_hostile() {
            self.destroyed = true;
            log::info!("player destroyed by {:?}", other.kind);
            let shield = self.shield.take().map(|shield| Action::despawn(&shield));
            return Some(Action::composite(
                [
                    Action::despawn(&me.handle),
                    Action::spawn(Explosion::large(me.position)),
                    Action::player_hit(),
                ]
                .into_iter()
                .chain(shield),
            ));
        }

        let EntityKind::PowerUp { power } = other.kind else {
            return None;
        };
        match power {
            0..=3 => {
                self.set_power(power);
                None
            }
            4 => {
                self.previous_power = self.power;
                self.set_power(4);
                None
            }
            5 => Some(Action::spawn(Fire::new(me.position, 0.0, 5))),
            SHIELD_POWER => {
                let shield = EntityRef::new(Shield::new(
                    me.handle.downgrade(),
                    me.position,
                    self.tilt.clone(),
                ));
                let old = self.shield.replace(shield.clone());
                Some(Action::composite(
                    old.map(|old| Action::despawn(&old))
                        .into_iter()
                        .chain([Action::spawn_handle(shield)]),
                ))
            }
            _ => None,
        }
    }
}
