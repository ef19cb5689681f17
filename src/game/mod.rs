//! Gameplay: a side-scrolling shooter built on the entity capability set
//!
//! Every type here is an ordinary `Entity`; none of them gets special
//! treatment from the frame core. `ShooterScenario` supplies the seed set and
//! the respawn / game-over / pause entities.

pub mod effects;
pub mod fire;
pub mod foe;
pub mod hud;
pub mod meteor;
pub mod player;
pub mod powerup;
pub mod shield;
pub mod spawner;

pub use effects::{Explosion, Reload, Stars};
pub use fire::Fire;
pub use foe::{EnemyFire, Foe, FoeSensor, ForceField};
pub use hud::{FpsDisplay, GameOverBanner, LivesDisplay, PausedBanner, ScoreDisplay};
pub use meteor::Meteor;
pub use player::Player;
pub use powerup::PowerUp;
pub use shield::Shield;
pub use spawner::Spawner;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{EntityRef, Scenario};

/// Seeds an episode with the background, spawner, player and HUD
pub struct ShooterScenario {
    rng: Pcg32,
    show_fps: bool,
}

impl ShooterScenario {
    pub fn new(seed: u64, show_fps: bool) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            show_fps,
        }
    }
}

impl Scenario for ShooterScenario {
    fn seed(&mut self) -> Vec<EntityRef> {
        vec![
            EntityRef::new(Stars::new()),
            EntityRef::new(Spawner::new(self.rng.random())),
            EntityRef::new(Player::new(self.rng.random())),
            EntityRef::new(ScoreDisplay),
            EntityRef::new(LivesDisplay),
            EntityRef::new(FpsDisplay::new(self.show_fps)),
        ]
    }

    fn respawn(&mut self) -> EntityRef {
        EntityRef::new(Reload::new(self.rng.random()))
    }

    fn game_over(&mut self) -> EntityRef {
        EntityRef::new(GameOverBanner)
    }

    fn paused(&mut self) -> Option<EntityRef> {
        Some(EntityRef::new(PausedBanner))
    }
}
