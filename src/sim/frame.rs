//! Frame orchestrator
//!
//! One call to `Game::frame` runs the whole pipeline to completion:
//! 1. dispatch the input batch to every entity, then handle pause/restart
//! 2. fan out `update` over a snapshot of the live collection
//! 3. fan out the collision pass over a snapshot of the collidables
//! 4. drain every collected action through the processor
//! 5. cull bounded entities that left the screen
//! 6. draw per `z` layer and composite bottom to top
//!
//! No entity sees another's pending effects during steps 2 and 3: nothing is
//! interpreted until step 4.

use std::collections::BTreeMap;

use glam::Vec2;

use super::action::Action;
use super::collision;
use super::entity::{Entity, EntityRef, FrameContext, Roster};
use super::error::FrameError;
use super::processor::{DrainReport, Processor};
use super::state::{Phase, World, WorldView};
use crate::audio::Sound;
use crate::consts::INITIAL_LIVES;
use crate::input::{InputEvent, Key};
use crate::renderer::Renderer;
use crate::screen_size;

/// Factory collaborator for the entities the orchestrator itself introduces
pub trait Scenario {
    /// Initial population of an episode
    fn seed(&mut self) -> Vec<EntityRef>;

    /// Spawned after a player hit that leaves lives
    fn respawn(&mut self) -> EntityRef;

    /// Spawned when the last life is lost
    fn game_over(&mut self) -> EntityRef;

    /// Overlay shown while paused
    fn paused(&mut self) -> Option<EntityRef> {
        None
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct FrameConfig {
    pub initial_lives: i32,
    /// Playfield size; bounded entities beyond it plus the margin are culled
    pub bounds: Vec2,
    /// `None` leaves cleanup entirely to the entities
    pub cleanup_margin: Option<f32>,
    pub max_drain_depth: usize,
    pub max_drain_steps: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            bounds: screen_size(),
            cleanup_margin: Some(256.0),
            max_drain_depth: 64,
            max_drain_steps: 100_000,
        }
    }
}

/// Summary of one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub phase: Option<Phase>,
    /// Entities whose `update` ran
    pub updated: usize,
    pub collisions: usize,
    pub drain: DrainReport,
    pub culled: usize,
    pub layers: usize,
}

/// Owns the world and runs frames
pub struct Game<S: Scenario> {
    world: World,
    scenario: S,
    processor: Processor,
    config: FrameConfig,
    frame: u64,
    overlay: Option<EntityRef>,
    quit: bool,
}

impl<S: Scenario> Game<S> {
    /// Create a game and populate its first episode
    pub fn new(scenario: S, config: FrameConfig) -> Result<Self, FrameError> {
        let mut game = Self {
            world: World::new(config.initial_lives),
            scenario,
            processor: Processor::new(config.max_drain_depth, config.max_drain_steps),
            config,
            frame: 0,
            overlay: None,
            quit: false,
        };
        game.populate()?;
        Ok(game)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn view(&self) -> WorldView {
        self.world.view(self.frame)
    }

    pub fn phase(&self) -> Phase {
        self.world.phase
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// True once a quit gesture was seen
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Audio triggered since the last call, in enqueue order
    pub fn take_audio(&mut self) -> Vec<Sound> {
        self.world.take_audio()
    }

    /// Run one complete frame
    pub fn frame<R: Renderer>(
        &mut self,
        events: &[InputEvent],
        delta: f32,
        renderer: &mut R,
    ) -> Result<FrameReport, FrameError> {
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            ..Default::default()
        };

        let controls = self.events(events)?;
        report.drain.merge(controls);
        if self.world.phase != Phase::Paused {
            self.update(delta, &mut report)?;
            let culled = self.cleanup()?;
            report.culled = culled.despawned;
            report.drain.merge(culled);
        }
        report.layers = self.draw(renderer)?;
        report.phase = Some(self.world.phase);
        Ok(report)
    }

    /// Dispatch the batch to every entity, then apply control gestures.
    /// Returns what the pause and restart drains did.
    pub fn events(&mut self, events: &[InputEvent]) -> Result<DrainReport, FrameError> {
        let mut report = DrainReport::default();
        for handle in self.world.handles() {
            handle.try_borrow_mut()?.react(events);
        }

        for event in events {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => self.quit = true,
                InputEvent::KeyDown(Key::Pause) => report.merge(self.toggle_pause()?),
                InputEvent::KeyDown(Key::Confirm) if self.world.phase == Phase::GameOver => {
                    log::info!("restart confirmed");
                    self.world.phase = Phase::ResetPending;
                }
                _ => {}
            }
        }

        if self.world.phase == Phase::ResetPending {
            report.merge(self.reset()?);
        }
        Ok(report)
    }

    /// Update and collision fan-out, then drain
    pub fn update(&mut self, delta: f32, report: &mut FrameReport) -> Result<(), FrameError> {
        let delta = sanitize_delta(delta);
        let handles = self.world.handles();
        let roster = Roster::capture(&handles)?;
        let view = self.view();

        let mut pending = Vec::new();
        for handle in &handles {
            let ctx = FrameContext {
                delta,
                me: handle,
                view: &view,
                roster: &roster,
            };
            if let Some(action) = handle.try_borrow_mut()?.update(&ctx) {
                pending.push(action);
            }
        }
        report.updated = handles.len();

        let bodies = collision::snapshot(self.world.iter())?;
        let resolution = collision::resolve(&bodies)?;
        report.collisions = resolution.pairs.len();
        pending.extend(resolution.actions);

        let drained = self
            .processor
            .drain(&mut self.world, &mut self.scenario, pending)?;
        report.drain.merge(drained);
        Ok(())
    }

    /// Cull bounded entities outside the playfield margin
    fn cleanup(&mut self) -> Result<DrainReport, FrameError> {
        let Some(margin) = self.config.cleanup_margin else {
            return Ok(DrainReport::default());
        };
        let bounds = self.config.bounds;
        let cull = Action::despawn_where(move |e: &dyn Entity| {
            e.bounded() && out_of_bounds(e.position(), bounds, margin)
        });
        let report = self
            .processor
            .drain(&mut self.world, &mut self.scenario, [cull])?;
        if report.despawned > 0 {
            log::debug!("culled {} out-of-bounds entities", report.despawned);
        }
        Ok(report)
    }

    /// Draw every entity on its own layer and composite ascending by `z`.
    /// Returns the number of layers.
    pub fn draw<R: Renderer>(&self, renderer: &mut R) -> Result<usize, FrameError> {
        let mut layers: BTreeMap<i32, Vec<&EntityRef>> = BTreeMap::new();
        for handle in self.world.iter() {
            let z = handle.try_borrow()?.z();
            layers.entry(z).or_default().push(handle);
        }

        let view = self.view();
        let mut composed = Vec::with_capacity(layers.len());
        for (z, members) in layers {
            let mut surface = renderer.begin_layer(z);
            for handle in members {
                handle.try_borrow()?.draw(&mut surface, &view);
            }
            composed.push((z, surface));
        }
        let count = composed.len();
        renderer.composite(composed);
        Ok(count)
    }

    /// Tear down and start a fresh episode from the seed set
    pub fn reset(&mut self) -> Result<DrainReport, FrameError> {
        log::info!(
            "resetting episode (score {}, {} entities)",
            self.world.score,
            self.world.len()
        );
        self.world.clear();
        self.world.reset_counters();
        self.overlay = None;
        self.populate()
    }

    fn populate(&mut self) -> Result<DrainReport, FrameError> {
        let seeds: Vec<Action> = self
            .scenario
            .seed()
            .into_iter()
            .map(Action::spawn_handle)
            .collect();
        let report = self
            .processor
            .drain(&mut self.world, &mut self.scenario, seeds)?;
        log::info!("episode seeded with {} entities", report.spawned);
        Ok(report)
    }

    fn toggle_pause(&mut self) -> Result<DrainReport, FrameError> {
        let action = match self.world.phase {
            Phase::Running => {
                self.world.phase = Phase::Paused;
                log::info!("paused");
                self.overlay = self.scenario.paused();
                self.overlay.clone().map(Action::spawn_handle)
            }
            Phase::Paused => {
                self.world.phase = Phase::Running;
                log::info!("resumed");
                self.overlay.take().map(|overlay| Action::despawn(&overlay))
            }
            Phase::GameOver | Phase::ResetPending => None,
        };
        match action {
            Some(action) => self
                .processor
                .drain(&mut self.world, &mut self.scenario, [action]),
            None => Ok(DrainReport::default()),
        }
    }
}

/// Non-finite or negative deltas become zero; anything else passes through
fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta >= 0.0 {
        delta
    } else {
        log::warn!("invalid frame delta {delta}, using 0");
        0.0
    }
}

fn out_of_bounds(pos: Vec2, bounds: Vec2, margin: f32) -> bool {
    pos.x < -margin || pos.y < -margin || pos.x > bounds.x + margin || pos.y > bounds.y + margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RESTING;
    use crate::renderer::{DisplayListRenderer, DrawCommand};
    use crate::sim::entity::EntityKind;
    use crate::sim::testkit::{Probe, Seen, TestScenario, count, probe_log};

    fn game(scenario: TestScenario) -> Game<TestScenario> {
        Game::new(scenario, FrameConfig::default()).unwrap()
    }

    fn step(game: &mut Game<TestScenario>, events: &[InputEvent]) -> FrameReport {
        game.frame(events, 1.0 / 60.0, &mut DisplayListRenderer::default())
            .unwrap()
    }

    #[test]
    fn test_seeds_populate_world() {
        let game = game(
            TestScenario::new()
                .with(|| EntityRef::new(Probe::at("a", Vec2::ZERO)))
                .with(|| EntityRef::new(Probe::at("b", Vec2::ZERO))),
        );
        assert_eq!(game.world().len(), 2);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.view().lives, INITIAL_LIVES);
    }

    #[test]
    fn test_every_entity_reacts_updates_and_draws_once() {
        let log = probe_log();
        let l1 = log.clone();
        let l2 = log.clone();
        let mut game = game(
            TestScenario::new()
                .with(move || EntityRef::new(Probe::at("a", Vec2::ZERO).logging(&l1)))
                .with(move || EntityRef::new(Probe::at("b", Vec2::ZERO).logging(&l2))),
        );
        let events = [InputEvent::KeyDown(Key::Fire), InputEvent::KeyUp(Key::Fire)];
        let report = step(&mut game, &events);

        assert_eq!(report.updated, 2);
        for label in ["a", "b"] {
            assert_eq!(count(&log, label, |s| *s == Seen::Reacted(2)), 1);
            assert_eq!(count(&log, label, |s| matches!(s, Seen::Updated(_))), 1);
            assert_eq!(count(&log, label, |s| *s == Seen::Drawn), 1);
        }
    }

    #[test]
    fn test_spawned_then_despawned_entity_never_runs() {
        let log = probe_log();
        let ghost = EntityRef::new(Probe::at("ghost", Vec2::ZERO).logging(&log));
        let action = Action::composite([Action::spawn_handle(ghost.clone()), Action::despawn(&ghost)]);
        let mut game = game(
            TestScenario::new()
                .with(move || EntityRef::new(Probe::at("parent", Vec2::ZERO).on_update(action.clone()))),
        );
        let report = step(&mut game, &[]);

        assert!(!game.world().contains(&ghost));
        assert!(report.drain.diagnostics.is_empty());
        assert_eq!(count(&log, "ghost", |_| true), 0);
    }

    #[test]
    fn test_spawned_entity_runs_from_next_frame() {
        let log = probe_log();
        let child = EntityRef::new(Probe::at("child", Vec2::ZERO).logging(&log));
        let spawn_once = Action::spawn_handle(child.clone());
        let mut game = game(TestScenario::new().with(move || {
            EntityRef::new(Probe::at("parent", Vec2::ZERO).on_update(spawn_once.clone()))
        }));

        step(&mut game, &[]);
        assert_eq!(count(&log, "child", |s| matches!(s, Seen::Updated(_))), 0);
        // Drawn at the end of the frame it was interpreted in
        assert_eq!(count(&log, "child", |s| *s == Seen::Drawn), 1);
        assert_eq!(game.world().handles().first(), Some(&child));

        step(&mut game, &[]);
        assert_eq!(count(&log, "child", |s| matches!(s, Seen::Updated(_))), 1);
    }

    #[test]
    fn test_updates_do_not_see_pending_despawns() {
        let log = probe_log();
        let victim = EntityRef::new(Probe::at("victim", Vec2::ZERO).logging(&log));
        let kill = Action::despawn(&victim);
        let v = victim.clone();
        let mut game = game(
            TestScenario::new()
                .with(move || v.clone())
                .with(move || EntityRef::new(Probe::at("killer", Vec2::ZERO).on_update(kill.clone()))),
        );
        step(&mut game, &[]);
        // The killer runs first (head insertion) but the victim still updates
        assert_eq!(count(&log, "victim", |s| matches!(s, Seen::Updated(_))), 1);
        assert!(!game.world().contains(&victim));
    }

    #[test]
    fn test_collision_scenario() {
        let log = probe_log();
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let mut game = game(
            TestScenario::new()
                .with(move || EntityRef::new(Probe::collider("a", Vec2::new(100.0, 100.0), 5.0).logging(&l1)))
                .with(move || EntityRef::new(Probe::collider("b", Vec2::new(108.0, 100.0), 4.0).logging(&l2)))
                .with(move || EntityRef::new(Probe::collider("c", Vec2::new(120.0, 100.0), 4.0).logging(&l3))),
        );
        let report = step(&mut game, &[]);
        assert_eq!(report.collisions, 1);
        assert_eq!(count(&log, "a", |s| matches!(s, Seen::Collided(_))), 1);
        assert_eq!(count(&log, "b", |s| matches!(s, Seen::Collided(_))), 1);
        assert_eq!(count(&log, "c", |s| matches!(s, Seen::Collided(_))), 0);
    }

    #[test]
    fn test_zero_delta_moves_nothing() {
        let probe = EntityRef::new(Probe::at("mover", Vec2::new(50.0, 50.0)).moving(Vec2::new(-900.0, 0.0)));
        let p = probe.clone();
        let mut game = game(TestScenario::new().with(move || p.clone()));
        for _ in 0..10 {
            let report = game
                .frame(&[], 0.0, &mut DisplayListRenderer::default())
                .unwrap();
            assert_eq!(report.culled, 0);
        }
        assert_eq!(probe.borrow().position(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_invalid_delta_is_zeroed() {
        let log = probe_log();
        let l = log.clone();
        let mut game = game(TestScenario::new().with(move || EntityRef::new(Probe::at("p", Vec2::ZERO).logging(&l))));
        for delta in [f32::NAN, -1.0, f32::INFINITY] {
            game.frame(&[], delta, &mut DisplayListRenderer::default())
                .unwrap();
        }
        assert_eq!(count(&log, "p", |s| *s == Seen::Updated(0.0)), 3);
    }

    #[test]
    fn test_large_delta_culls_runaways_but_not_resting() {
        let mut game = game(
            TestScenario::new()
                .with(|| EntityRef::new(Probe::at("runner", Vec2::new(100.0, 100.0)).moving(Vec2::new(-100.0, 0.0))))
                .with(|| EntityRef::new(Probe::at("hud", RESTING))),
        );
        let report = game
            .frame(&[], 1.0e4, &mut DisplayListRenderer::default())
            .unwrap();
        assert_eq!(report.culled, 1);
        assert_eq!(report.drain.despawned, 1);
        assert_eq!(game.world().len(), 1);
    }

    #[test]
    fn test_report_covers_pause_drains() {
        let mut game = game(TestScenario::new());
        let paused = step(&mut game, &[InputEvent::KeyDown(Key::Pause)]);
        assert_eq!(paused.drain.spawned, 1);
        let resumed = step(&mut game, &[InputEvent::KeyDown(Key::Pause)]);
        assert_eq!(resumed.drain.despawned, 1);
        assert!(resumed.drain.diagnostics.is_empty());
    }

    #[test]
    fn test_pause_skips_update_and_shows_overlay() {
        let log = probe_log();
        let l = log.clone();
        let mut game = game(TestScenario::new().with(move || EntityRef::new(Probe::at("p", Vec2::ZERO).logging(&l))));

        step(&mut game, &[InputEvent::KeyDown(Key::Pause)]);
        assert_eq!(game.phase(), Phase::Paused);
        assert_eq!(game.world().len(), 2);
        step(&mut game, &[]);
        assert_eq!(count(&log, "p", |s| matches!(s, Seen::Updated(_))), 0);
        assert_eq!(count(&log, "p", |s| *s == Seen::Drawn), 2);

        step(&mut game, &[InputEvent::KeyDown(Key::Pause)]);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.world().len(), 1);
        assert_eq!(count(&log, "p", |s| matches!(s, Seen::Updated(_))), 1);
    }

    #[test]
    fn test_game_over_then_confirm_resets() {
        let mut game = Game::new(
            TestScenario::new().with(|| {
                EntityRef::new(Probe::at("doomed", Vec2::ZERO).on_update(Action::composite([
                    Action::adjust_score(7),
                    Action::player_hit(),
                ])))
            }),
            FrameConfig {
                initial_lives: 1,
                ..Default::default()
            },
        )
        .unwrap();

        step(&mut game, &[]);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.view().lives, 0);
        assert_eq!(game.view().score, 7);
        assert_eq!(game.scenario().terminals, 1);

        // Score frozen while the terminal state keeps running
        step(&mut game, &[]);
        assert_eq!(game.view().score, 7);

        let restart = game.events(&[InputEvent::KeyDown(Key::Confirm)]).unwrap();
        assert_eq!(restart.spawned, 1);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.view().score, 0);
        assert_eq!(game.view().lives, 1);
        let kinds: Vec<_> = game.world().iter().map(|h| h.borrow().kind()).collect();
        assert!(!kinds.contains(&EntityKind::Hud));
    }

    #[test]
    fn test_quit_gesture() {
        let mut game = game(TestScenario::new());
        assert!(!game.quit_requested());
        step(&mut game, &[InputEvent::KeyDown(Key::Escape)]);
        assert!(game.quit_requested());
    }

    #[test]
    fn test_draw_layers_ascending_z() {
        let mut game = game(
            TestScenario::new()
                .with(|| EntityRef::new(Probe::at("top", Vec2::ZERO).layer(20)))
                .with(|| EntityRef::new(Probe::at("back", Vec2::ZERO).layer(-1)))
                .with(|| EntityRef::new(Probe::at("mid", Vec2::ZERO))),
        );
        let mut renderer = DisplayListRenderer::default();
        let report = game.frame(&[], 0.0, &mut renderer).unwrap();
        assert_eq!(report.layers, 3);

        let labels: Vec<_> = renderer
            .commands()
            .into_iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["back", "mid", "top"]);
    }

    #[test]
    fn test_audio_drained_by_owner() {
        let mut game = game(TestScenario::new().with(|| {
            EntityRef::new(Probe::at("noisy", Vec2::ZERO).on_update(Action::play_audio(Sound::Bullet)))
        }));
        step(&mut game, &[]);
        step(&mut game, &[]);
        assert_eq!(game.take_audio(), vec![Sound::Bullet, Sound::Bullet]);
        assert!(game.take_audio().is_empty());
    }

    #[test]
    fn test_fatal_error_propagates() {
        let mut game = game(
            TestScenario::new().with(|| EntityRef::new(Probe::collider("bad", Vec2::ZERO, -3.0))),
        );
        let err = game
            .frame(&[], 0.1, &mut DisplayListRenderer::default())
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidRadius { .. }));
    }
}
