//! Scripted entities and a minimal scenario for exercising the core

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::action::Action;
use super::collision::Body;
use super::entity::{Collidable, Entity, EntityId, EntityKind, EntityRef, FrameContext};
use super::frame::Scenario;
use super::state::WorldView;
use crate::input::InputEvent;
use crate::renderer::{DrawCommand, Surface};

/// What a probe observed
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Updated(f32),
    Drawn,
    Reacted(usize),
    Collided(EntityId),
}

pub type ProbeLog = Rc<RefCell<Vec<(&'static str, Seen)>>>;

pub fn probe_log() -> ProbeLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Count entries for `label` matching `pred`
pub fn count(log: &ProbeLog, label: &str, pred: impl Fn(&Seen) -> bool) -> usize {
    log.borrow()
        .iter()
        .filter(|(l, seen)| *l == label && pred(seen))
        .count()
}

/// Configurable test entity
pub struct Probe {
    pub label: &'static str,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub z: i32,
    pub radius: Option<f32>,
    pub log: Option<ProbeLog>,
    /// Returned from every update
    pub on_update: Option<Action>,
    /// Returned from every collision
    pub on_hit: Option<Action>,
}

impl Probe {
    pub fn at(label: &'static str, pos: Vec2) -> Self {
        Self {
            label,
            kind: EntityKind::Scenery,
            pos,
            vel: Vec2::ZERO,
            z: 0,
            radius: None,
            log: None,
            on_update: None,
            on_hit: None,
        }
    }

    pub fn collider(label: &'static str, pos: Vec2, radius: f32) -> Self {
        Self {
            radius: Some(radius),
            kind: EntityKind::Meteor,
            ..Self::at(label, pos)
        }
    }

    pub fn logging(mut self, log: &ProbeLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn moving(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn layer(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn on_update(mut self, action: Action) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn on_hit(mut self, action: Action) -> Self {
        self.on_hit = Some(action);
        self
    }

    fn record(&self, seen: Seen) {
        if let Some(log) = &self.log {
            log.borrow_mut().push((self.label, seen));
        }
    }
}

impl Entity for Probe {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn z(&self) -> i32 {
        self.z
    }

    fn update(&mut self, ctx: &FrameContext<'_>) -> Option<Action> {
        self.record(Seen::Updated(ctx.delta));
        self.pos += self.vel * ctx.delta;
        self.on_update.clone()
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &WorldView) {
        self.record(Seen::Drawn);
        surface.submit(DrawCommand::Text {
            anchor: self.pos,
            text: self.label.to_string(),
            size: 12.0,
            color: [1.0; 4],
        });
    }

    fn react(&mut self, events: &[InputEvent]) {
        self.record(Seen::Reacted(events.len()));
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        self.radius.map(|_| self as &dyn Collidable)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        if self.radius.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Collidable for Probe {
    fn radius(&self) -> f32 {
        self.radius.unwrap_or(0.0)
    }

    fn on_collision(&mut self, _me: &Body, other: &Body) -> Option<Action> {
        self.record(Seen::Collided(other.handle.id()));
        self.on_hit.clone()
    }
}

/// Seeds a fixed entity list; respawn/terminal entities are inert markers
pub struct TestScenario {
    pub seeds: Vec<Box<dyn Fn() -> EntityRef>>,
    pub respawns: usize,
    pub terminals: usize,
}

impl TestScenario {
    pub fn new() -> Self {
        Self {
            seeds: Vec::new(),
            respawns: 0,
            terminals: 0,
        }
    }

    pub fn with(mut self, seed: impl Fn() -> EntityRef + 'static) -> Self {
        self.seeds.push(Box::new(seed));
        self
    }
}

impl Scenario for TestScenario {
    fn seed(&mut self) -> Vec<EntityRef> {
        self.seeds.iter().map(|make| make()).collect()
    }

    fn respawn(&mut self) -> EntityRef {
        self.respawns += 1;
        EntityRef::new(Probe::at("respawn", crate::RESTING).kind(EntityKind::Reload))
    }

    fn game_over(&mut self) -> EntityRef {
        self.terminals += 1;
        EntityRef::new(Probe::at("game-over", crate::RESTING).kind(EntityKind::Hud))
    }

    fn paused(&mut self) -> Option<EntityRef> {
        Some(EntityRef::new(
            Probe::at("paused", crate::RESTING).kind(EntityKind::Hud),
        ))
    }
}
