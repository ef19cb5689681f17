//! Seeded wave source
//!
//! Three independent countdowns bring in foes, meteors and power-ups from the
//! right edge. All randomness comes from one `Pcg32`, so a seed replays the
//! same sequence for the same deltas.

use std::ops::Range;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::foe::Foe;
use super::meteor::Meteor;
use super::powerup::{PowerUp, roll_power};
use crate::consts::{FOE_RADIUS, POWERUP_RADIUS, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::{Action, Entity, EntityKind, FrameContext};

/// Seconds between spawns, per kind
const FOE_INTERVAL: Range<f32> = 0.5..3.5;
const METEOR_INTERVAL: Range<f32> = 2.0..6.0;
const POWERUP_INTERVAL: Range<f32> = 8.0..15.0;

pub struct Spawner {
    rng: Pcg32,
    next_foe: f32,
    next_meteor: f32,
    next_powerup: f32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self {
            next_foe: rng.random_range(FOE_INTERVAL),
            next_meteor: rng.random_range(METEOR_INTERVAL),
            next_powerup: rng.random_range(POWERUP_INTERVAL),
            rng,
        }
    }

    fn foe(&mut self) -> Action {
        let y = self.rng.random_range(FOE_RADIUS..SCREEN_HEIGHT - FOE_RADIUS);
        let speed = self.rng.random_range(200.0..400.0);
        let pos = Vec2::new(SCREEN_WIDTH + FOE_RADIUS, y);
        Foe::spawn(pos, speed, self.rng.random()).1
    }

    fn meteor(&mut self) -> Action {
        let size: f32 = self.rng.random_range(32.0..96.0);
        let y = self.rng.random_range(0.0..SCREEN_HEIGHT);
        let speed = self.rng.random_range(100.0..300.0);
        let rotation = self.rng.random_range(-2.0..2.0);
        let variant = self.rng.random_range(0..4);
        let pos = Vec2::new(SCREEN_WIDTH + size, y);
        Action::spawn(Meteor::new(pos, speed, size, rotation, variant))
    }

    fn powerup(&mut self) -> Action {
        let y = self
            .rng
            .random_range(POWERUP_RADIUS..SCREEN_HEIGHT - POWERUP_RADIUS);
        let speed = self.rng.random_range(50.0..100.0);
        let power = roll_power(&mut self.rng);
        Action::spawn(PowerUp::new(y, speed, power))
    }
}

impl Entity for Spawner {
    fn kind(&self) -> EntityKind {
        EntityKind::Spawner
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        let dt = ctx.delta;
        let mut actions = Vec::new();

        self.next_foe -= dt;
        if self.next_foe <= 0.0 {
            self.next_foe = self.rng.random_range(FOE_INTERVAL);
            actions.push(self.foe());
        }
        self.next_meteor -= dt;
        if self.next_meteor <= 0.0 {
            self.next_meteor = self.rng.random_range(METEOR_INTERVAL);
            actions.push(self.meteor());
        }
        self.next_powerup -= dt;
        if self.next_powerup <= 0.0 {
            self.next_powerup = self.rng.random_range(POWERUP_INTERVAL);
            actions.push(self.powerup());
        }

        (!actions.is_empty()).then(|| Action::composite(actions))
    }
}
