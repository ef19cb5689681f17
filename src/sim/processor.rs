//! Action interpreter
//!
//! Drains a FIFO of pending actions against the world until it is empty.
//! Composites expand in place, depth first, in their given order.
//! `ForEachEntity` results go to the back of the queue and are drained in the
//! same call.

use std::collections::VecDeque;

use super::action::Action;
use super::entity::{EntityId, EntityRef};
use super::error::FrameError;
use super::frame::Scenario;
use super::state::{Phase, World};

/// Non-fatal inconsistency found while draining
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Despawn of a handle that is not live
    MissingEntity { entity: EntityId },
    /// Spawn of a handle that is already live
    AlreadyLive { entity: EntityId },
}

/// What one drain did
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// Actions interpreted, composites included
    pub steps: usize,
    pub spawned: usize,
    pub despawned: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl DrainReport {
    pub fn merge(&mut self, other: DrainReport) {
        self.steps += other.steps;
        self.spawned += other.spawned;
        self.despawned += other.despawned;
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Interpreter limits; exceeding either aborts the frame
#[derive(Debug, Clone, Copy)]
pub struct Processor {
    pub max_depth: usize,
    pub max_steps: usize,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_steps: 100_000,
        }
    }
}

impl Processor {
    pub fn new(max_depth: usize, max_steps: usize) -> Self {
        Self {
            max_depth,
            max_steps,
        }
    }

    /// Interpret `pending` and everything it produces
    pub fn drain(
        &self,
        world: &mut World,
        scenario: &mut dyn Scenario,
        pending: impl IntoIterator<Item = Action>,
    ) -> Result<DrainReport, FrameError> {
        let mut drain = Drain {
            limits: *self,
            world,
            scenario,
            queue: pending.into_iter().collect(),
            report: DrainReport::default(),
        };
        while let Some(action) = drain.queue.pop_front() {
            drain.interpret(action, 0)?;
        }
        Ok(drain.report)
    }
}

struct Drain<'a> {
    limits: Processor,
    world: &'a mut World,
    scenario: &'a mut dyn Scenario,
    queue: VecDeque<Action>,
    report: DrainReport,
}

impl Drain<'_> {
    fn interpret(&mut self, action: Action, depth: usize) -> Result<(), FrameError> {
        if depth > self.limits.max_depth {
            return Err(FrameError::NestingTooDeep {
                limit: self.limits.max_depth,
            });
        }
        self.report.steps += 1;
        if self.report.steps > self.limits.max_steps {
            return Err(FrameError::DrainBudgetExceeded {
                limit: self.limits.max_steps,
            });
        }

        match action {
            Action::Composite(members) => {
                for member in members {
                    self.interpret(member, depth + 1)?;
                }
            }
            Action::Spawn(handle) => self.spawn(handle),
            Action::Despawn(handle) => self.despawn(&handle),
            Action::DespawnWhere(predicate) => {
                let mut doomed = Vec::new();
                for handle in self.world.iter() {
                    if predicate(&*handle.try_borrow()?) {
                        doomed.push(handle.clone());
                    }
                }
                for handle in &doomed {
                    self.despawn(handle);
                }
            }
            Action::ForEachEntity(visitor) => {
                for handle in self.world.handles() {
                    let entity = handle.try_borrow()?;
                    if let Some(follow_up) = visitor(&handle, &*entity)? {
                        self.queue.push_back(follow_up);
                    }
                }
            }
            Action::AdjustScore(delta) => {
                if self.world.phase == Phase::GameOver {
                    log::debug!("score frozen, ignoring {delta:+}");
                } else {
                    self.world.score = self.world.score.saturating_add(delta);
                }
            }
            Action::AdjustLives(delta) => {
                self.world.lives = self.world.lives.saturating_add(delta).max(0);
            }
            Action::PlayerHit => self.player_hit(),
            Action::PlayAudio(sound) => self.world.queue_audio(sound),
            Action::NoOp => {}
        }
        Ok(())
    }

    fn spawn(&mut self, handle: EntityRef) {
        if self.world.contains(&handle) {
            log::warn!("spawn of live entity {handle:?} ignored");
            self.report.diagnostics.push(Diagnostic::AlreadyLive {
                entity: handle.id(),
            });
            return;
        }
        self.world.spawn(handle);
        self.report.spawned += 1;
    }

    fn despawn(&mut self, handle: &EntityRef) {
        if self.world.despawn(handle) {
            self.report.despawned += 1;
        } else {
            log::warn!("despawn of absent entity {}", handle.id());
            self.report.diagnostics.push(Diagnostic::MissingEntity {
                entity: handle.id(),
            });
        }
    }

    fn player_hit(&mut self) {
        if self.world.phase == Phase::GameOver {
            log::debug!("player hit after game over ignored");
            return;
        }
        self.world.lives = (self.world.lives - 1).max(0);
        if self.world.lives == 0 {
            log::info!("game over, final score {}", self.world.score);
            self.world.phase = Phase::GameOver;
            let terminal = self.scenario.game_over();
            self.spawn(terminal);
        } else {
            log::info!("player hit, {} lives left", self.world.lives);
            let respawn = self.scenario.respawn();
            self.spawn(respawn);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::audio::Sound;
    use crate::sim::action::CallbackError;
    use crate::sim::entity::EntityKind;
    use crate::sim::testkit::{Probe, TestScenario};
    use proptest::prelude::*;

    fn drain(world: &mut World, actions: Vec<Action>) -> Result<DrainReport, FrameError> {
        Processor::default().drain(world, &mut TestScenario::new(), actions)
    }

    fn probe(label: &'static str) -> EntityRef {
        EntityRef::new(Probe::at(label, Vec2::ZERO))
    }

    #[test]
    fn test_composite_equals_sequential() {
        let mut world = World::new(3);
        drain(
            &mut world,
            vec![Action::Composite(vec![
                Action::adjust_score(10),
                Action::adjust_score(5),
            ])],
        )
        .unwrap();
        assert_eq!(world.score, 15);

        let mut sequential = World::new(3);
        drain(
            &mut sequential,
            vec![Action::adjust_score(10), Action::adjust_score(5)],
        )
        .unwrap();
        assert_eq!(sequential.score, world.score);
    }

    #[test]
    fn test_nested_composites_expand_in_order() {
        let mut world = World::new(3);
        let a = probe("a");
        let action = Action::Composite(vec![
            Action::Composite(vec![Action::spawn_handle(a.clone())]),
            Action::Composite(vec![Action::Composite(vec![Action::despawn(&a)])]),
        ]);
        let report = drain(&mut world, vec![action]).unwrap();
        assert!(world.is_empty());
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.steps, 6);
    }

    #[test]
    fn test_spawn_inserts_at_head() {
        let mut world = World::new(3);
        let old = probe("old");
        world.spawn(old.clone());
        let new = probe("new");
        drain(&mut world, vec![Action::spawn_handle(new.clone())]).unwrap();
        assert_eq!(world.handles(), vec![new, old]);
    }

    #[test]
    fn test_despawn_absent_is_diagnostic() {
        let mut world = World::new(3);
        world.spawn(probe("live"));
        let ghost = probe("ghost");
        let report = drain(&mut world, vec![Action::despawn(&ghost)]).unwrap();
        assert_eq!(world.len(), 1);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::MissingEntity { entity: ghost.id() }]
        );
    }

    #[test]
    fn test_spawn_then_despawn_same_list() {
        let mut world = World::new(3);
        let e = probe("e");
        let report = drain(
            &mut world,
            vec![Action::spawn_handle(e.clone()), Action::despawn(&e)],
        )
        .unwrap();
        assert!(!world.contains(&e));
        assert_eq!(report.spawned, 1);
        assert_eq!(report.despawned, 1);
    }

    #[test]
    fn test_double_spawn_is_diagnostic() {
        let mut world = World::new(3);
        let e = probe("e");
        let report = drain(
            &mut world,
            vec![Action::spawn_handle(e.clone()), Action::spawn_handle(e.clone())],
        )
        .unwrap();
        assert_eq!(world.len(), 1);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn test_despawn_where_filters_by_predicate() {
        let mut world = World::new(3);
        world.spawn(EntityRef::new(Probe::collider("rock", Vec2::ZERO, 4.0)));
        world.spawn(probe("hud"));
        world.spawn(EntityRef::new(Probe::collider("rock", Vec2::ONE, 4.0)));
        let report = drain(
            &mut world,
            vec![Action::despawn_where(|e| e.as_collidable().is_some())],
        )
        .unwrap();
        assert_eq!(world.len(), 1);
        assert_eq!(report.despawned, 2);
    }

    #[test]
    fn test_for_each_visits_snapshot_once_each() {
        let mut world = World::new(3);
        for _ in 0..4 {
            world.spawn(probe("e"));
        }
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let action = Action::for_each(move |handle, _| {
            counter.set(counter.get() + 1);
            Some(Action::despawn(handle))
        });
        drain(&mut world, vec![action]).unwrap();
        assert_eq!(calls.get(), 4);
        assert!(world.is_empty());
    }

    #[test]
    fn test_for_each_results_are_drained_same_call() {
        let mut world = World::new(3);
        world.spawn(probe("a"));
        world.spawn(probe("b"));
        let action = Action::for_each(|_, _| {
            Some(Action::for_each(|_, _| Some(Action::adjust_score(1))))
        });
        drain(&mut world, vec![action]).unwrap();
        assert_eq!(world.score, 4);
    }

    #[test]
    fn test_for_each_failure_is_fatal() {
        let mut world = World::new(3);
        world.spawn(probe("a"));
        let action = Action::try_for_each(|_, _| Err(CallbackError::new("boom")));
        let err = drain(&mut world, vec![action]).unwrap_err();
        assert!(matches!(err, FrameError::CallbackFailed(_)));
    }

    #[test]
    fn test_score_frozen_after_game_over() {
        let mut world = World::new(3);
        world.score = 40;
        world.phase = Phase::GameOver;
        drain(
            &mut world,
            vec![Action::adjust_score(100), Action::adjust_score(-5)],
        )
        .unwrap();
        assert_eq!(world.score, 40);
    }

    #[test]
    fn test_negative_score_adjustment() {
        let mut world = World::new(3);
        world.score = 10;
        drain(&mut world, vec![Action::adjust_score(-25)]).unwrap();
        assert_eq!(world.score, -15);
    }

    #[test]
    fn test_lives_never_negative() {
        let mut world = World::new(2);
        drain(&mut world, vec![Action::adjust_lives(-5)]).unwrap();
        assert_eq!(world.lives, 0);
        assert_eq!(world.phase, Phase::Running);
        drain(&mut world, vec![Action::adjust_lives(2)]).unwrap();
        assert_eq!(world.lives, 2);
    }

    #[test]
    fn test_player_hit_with_lives_left_respawns() {
        let mut world = World::new(3);
        let mut scenario = TestScenario::new();
        Processor::default()
            .drain(&mut world, &mut scenario, vec![Action::player_hit()])
            .unwrap();
        assert_eq!(world.lives, 2);
        assert_eq!(world.phase, Phase::Running);
        assert_eq!(scenario.respawns, 1);
        assert_eq!(world.iter().next().map(|h| h.borrow().kind()), Some(EntityKind::Reload));
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut world = World::new(1);
        let mut scenario = TestScenario::new();
        Processor::default()
            .drain(&mut world, &mut scenario, vec![Action::player_hit()])
            .unwrap();
        assert_eq!(world.lives, 0);
        assert_eq!(world.phase, Phase::GameOver);
        assert_eq!(scenario.terminals, 1);
        assert_eq!(scenario.respawns, 0);
    }

    #[test]
    fn test_every_player_hit_costs_a_life() {
        let mut world = World::new(3);
        let mut scenario = TestScenario::new();
        let report = Processor::default()
            .drain(
                &mut world,
                &mut scenario,
                vec![Action::player_hit(), Action::player_hit()],
            )
            .unwrap();
        assert_eq!(world.lives, 1);
        assert_eq!(scenario.respawns, 2);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_audio_queued_in_order() {
        let mut world = World::new(3);
        drain(
            &mut world,
            vec![Action::composite([
                Action::play_audio(Sound::Bullet),
                Action::play_audio(Sound::Catch),
                Action::play_audio(Sound::Bullet),
            ])],
        )
        .unwrap();
        assert_eq!(world.pending_audio(), &[Sound::Bullet, Sound::Catch, Sound::Bullet]);
    }

    #[test]
    fn test_nesting_limit() {
        let mut action = Action::NoOp;
        for _ in 0..10 {
            action = Action::Composite(vec![action]);
        }
        let mut world = World::new(3);
        let err = Processor::new(4, 1000)
            .drain(&mut world, &mut TestScenario::new(), vec![action])
            .unwrap_err();
        assert!(matches!(err, FrameError::NestingTooDeep { limit: 4 }));
    }

    #[test]
    fn test_runaway_for_each_hits_step_budget() {
        fn forever() -> Action {
            Action::for_each(|_, _| Some(forever()))
        }
        let mut world = World::new(3);
        world.spawn(probe("a"));
        let err = Processor::new(8, 500)
            .drain(&mut world, &mut TestScenario::new(), vec![forever()])
            .unwrap_err();
        assert!(matches!(err, FrameError::DrainBudgetExceeded { limit: 500 }));
    }

    proptest! {
        #[test]
        fn prop_grouping_does_not_change_the_score(
            deltas in prop::collection::vec(-1000i64..1000, 0..40),
            chunk in 1usize..6,
        ) {
            let flat: Vec<Action> = deltas.iter().map(|&d| Action::adjust_score(d)).collect();
            let nested = Action::composite(
                deltas
                    .chunks(chunk)
                    .map(|c| Action::composite(c.iter().map(|&d| Action::adjust_score(d)))),
            );
            let mut a = World::new(3);
            let mut b = World::new(3);
            drain(&mut a, flat).unwrap();
            drain(&mut b, vec![nested]).unwrap();
            prop_assert_eq!(a.score, deltas.iter().sum::<i64>());
            prop_assert_eq!(a.score, b.score);
        }

        #[test]
        fn prop_nested_audio_keeps_enqueue_order(
            picks in prop::collection::vec(any::<bool>(), 0..30),
            chunk in 1usize..5,
        ) {
            let sound = |p: bool| if p { Sound::Bullet } else { Sound::Laser };
            let nested = Action::composite(
                picks
                    .chunks(chunk)
                    .map(|c| Action::composite(c.iter().map(|&p| Action::play_audio(sound(p))))),
            );
            let mut world = World::new(3);
            drain(&mut world, vec![nested]).unwrap();
            let expected: Vec<Sound> = picks.iter().map(|&p| sound(p)).collect();
            prop_assert_eq!(world.pending_audio(), expected.as_slice());
        }
    }
}
