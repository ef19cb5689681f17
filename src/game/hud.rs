//! Heads-up display
//!
//! HUD entities hold no game state of their own. Score and lives come from
//! the `WorldView` handed to `draw`.

use glam::Vec2;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH, Z_HUD};
use crate::input::{InputEvent, Key};
use crate::renderer::{DrawCommand, Sprite, Surface, colors};
use crate::sim::{Action, Entity, EntityKind, FrameContext, WorldView};

const LIFE_ICON: f32 = 32.0;

fn text(anchor: Vec2, text: String, size: f32, color: [f32; 4]) -> DrawCommand {
    DrawCommand::Text {
        anchor,
        text,
        size,
        color,
    }
}

fn center() -> Vec2 {
    Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) / 2.0
}

pub struct ScoreDisplay;

impl Entity for ScoreDisplay {
    fn kind(&self) -> EntityKind {
        EntityKind::Hud
    }

    fn z(&self) -> i32 {
        Z_HUD
    }

    fn draw(&self, surface: &mut dyn Surface, view: &WorldView) {
        surface.submit(text(
            Vec2::new(8.0, 8.0),
            format!("Score: {}", view.score),
            24.0,
            colors::HUD,
        ));
    }
}

/// One ship icon per life beyond the current one
pub struct LivesDisplay;

impl Entity for LivesDisplay {
    fn kind(&self) -> EntityKind {
        EntityKind::Hud
    }

    fn z(&self) -> i32 {
        Z_HUD
    }

    fn draw(&self, surface: &mut dyn Surface, view: &WorldView) {
        let spare = (view.lives - 1).max(0);
        let left = SCREEN_WIDTH / 2.0 - spare as f32 * LIFE_ICON / 2.0;
        for i in 0..spare {
            surface.submit(DrawCommand::Sprite {
                sprite: Sprite::Life,
                center: Vec2::new(left + (i as f32 + 0.5) * LIFE_ICON, LIFE_ICON / 2.0),
                size: Vec2::splat(LIFE_ICON),
                angle: 0.0,
            });
        }
    }
}

/// Instantaneous FPS, toggled with F2
pub struct FpsDisplay {
    fps: f32,
    visible: bool,
}

impl FpsDisplay {
    pub fn new(visible: bool) -> Self {
        Self { fps: 0.0, visible }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

impl Entity for FpsDisplay {
    fn kind(&self) -> EntityKind {
        EntityKind::Hud
    }

    fn z(&self) -> i32 {
        Z_HUD
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        if ctx.delta > 0.0 {
            self.fps = 1.0 / ctx.delta;
        }
        None
    }

    fn react(&mut self, events: &[InputEvent]) {
        if events.iter().any(|e| e.is_up(Key::ToggleFps)) {
            self.visible = !self.visible;
        }
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        if self.visible {
            surface.submit(text(
                Vec2::new(SCREEN_WIDTH - 120.0, 8.0),
                format!("FPS: {:.1}", self.fps),
                24.0,
                colors::WHITE,
            ));
        }
    }
}

pub struct PausedBanner;

impl Entity for PausedBanner {
    fn kind(&self) -> EntityKind {
        EntityKind::Hud
    }

    fn z(&self) -> i32 {
        Z_HUD
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        surface.submit(text(center(), "Paused".into(), 120.0, colors::SHIELD));
    }
}

pub struct GameOverBanner;

impl Entity for GameOverBanner {
    fn kind(&self) -> EntityKind {
        EntityKind::Hud
    }

    fn z(&self) -> i32 {
        Z_HUD
    }

    fn draw(&self, surface: &mut dyn Surface, view: &WorldView) {
        surface.submit(text(center(), "Game Over".into(), 120.0, colors::HUD_ALERT));
        surface.submit(text(
            center() + Vec2::new(0.0, 96.0),
            format!("Final score {}. Press Enter to restart", view.score),
            24.0,
            colors::WHITE,
        ));
    }
}
