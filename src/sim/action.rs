//! Deferred action algebra
//!
//! An `Action` describes one effect on world state. Entities produce them,
//! the processor interprets each exactly once, nothing mutates them in
//! between. `Composite` nests arbitrarily and always expands in order.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use super::entity::{Entity, EntityRef};
use crate::audio::Sound;

/// Filter for `DespawnWhere`. Must not have side effects on the world.
pub type Predicate = Rc<dyn Fn(&dyn Entity) -> bool>;

/// Callback for `ForEachEntity`, run once per live entity
pub type Visitor = Rc<dyn Fn(&EntityRef, &dyn Entity) -> Result<Option<Action>, CallbackError>>;

/// Failure raised by a `ForEachEntity` callback
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[derive(Clone)]
pub enum Action {
    Composite(Vec<Action>),
    Spawn(EntityRef),
    Despawn(EntityRef),
    DespawnWhere(Predicate),
    ForEachEntity(Visitor),
    AdjustScore(i64),
    AdjustLives(i32),
    PlayerHit,
    PlayAudio(Sound),
    NoOp,
}

impl Action {
    /// Group actions, dropping `NoOp`s. A single survivor is returned as is.
    pub fn composite(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut members: Vec<Action> = actions.into_iter().filter(|a| !a.is_noop()).collect();
        match members.len() {
            0 => Action::NoOp,
            1 => members.pop().unwrap_or(Action::NoOp),
            _ => Action::Composite(members),
        }
    }

    pub fn spawn<E: Entity + 'static>(entity: E) -> Self {
        Action::Spawn(EntityRef::new(entity))
    }

    /// Spawn an entity whose handle the caller keeps
    pub fn spawn_handle(handle: EntityRef) -> Self {
        Action::Spawn(handle)
    }

    pub fn despawn(handle: &EntityRef) -> Self {
        Action::Despawn(handle.clone())
    }

    pub fn despawn_where(predicate: impl Fn(&dyn Entity) -> bool + 'static) -> Self {
        Action::DespawnWhere(Rc::new(predicate))
    }

    pub fn for_each(
        callback: impl Fn(&EntityRef, &dyn Entity) -> Option<Action> + 'static,
    ) -> Self {
        let visitor: Visitor =
            Rc::new(move |handle: &EntityRef, entity: &dyn Entity| Ok(callback(handle, entity)));
        Action::ForEachEntity(visitor)
    }

    /// `for_each` with a callback that may fail; a failure aborts the frame
    pub fn try_for_each(
        callback: impl Fn(&EntityRef, &dyn Entity) -> Result<Option<Action>, CallbackError>
        + 'static,
    ) -> Self {
        Action::ForEachEntity(Rc::new(callback))
    }

    pub fn adjust_score(delta: i64) -> Self {
        Action::AdjustScore(delta)
    }

    pub fn adjust_lives(delta: i32) -> Self {
        Action::AdjustLives(delta)
    }

    pub fn player_hit() -> Self {
        Action::PlayerHit
    }

    pub fn play_audio(sound: Sound) -> Self {
        Action::PlayAudio(sound)
    }

    pub fn none() -> Self {
        Action::NoOp
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Action::NoOp)
    }

    /// Sequence `self` before `next`
    pub fn then(self, next: Action) -> Self {
        Action::composite([self, next])
    }

    /// Number of leaf actions after flattening composites
    pub fn leaf_count(&self) -> usize {
        match self {
            Action::Composite(members) => members.iter().map(Action::leaf_count).sum(),
            _ => 1,
        }
    }
}

impl FromIterator<Action> for Action {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Action::composite(iter)
    }
}

impl From<Option<Action>> for Action {
    fn from(action: Option<Action>) -> Self {
        action.unwrap_or(Action::NoOp)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Composite(members) => f.debug_tuple("Composite").field(members).finish(),
            Action::Spawn(handle) => f.debug_tuple("Spawn").field(handle).finish(),
            Action::Despawn(handle) => f.debug_tuple("Despawn").field(handle).finish(),
            Action::DespawnWhere(_) => f.write_str("DespawnWhere(..)"),
            Action::ForEachEntity(_) => f.write_str("ForEachEntity(..)"),
            Action::AdjustScore(delta) => f.debug_tuple("AdjustScore").field(delta).finish(),
            Action::AdjustLives(delta) => f.debug_tuple("AdjustLives").field(delta).finish(),
            Action::PlayerHit => f.write_str("PlayerHit"),
            Action::PlayAudio(sound) => f.debug_tuple("PlayAudio").field(sound).finish(),
            Action::NoOp => f.write_str("NoOp"),
        }
    }
}
