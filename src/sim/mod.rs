//! Deterministic frame core
//!
//! Everything that decides what happens in a frame lives here:
//! - Entities only compute intents; cross-entity effects are `Action` values
//! - Collisions are resolved over a single per-frame snapshot
//! - One processor interprets every action against the world
//! - No rendering, audio device or input polling dependencies

pub mod action;
pub mod collision;
pub mod entity;
pub mod error;
pub mod frame;
pub mod processor;
pub mod state;

#[cfg(test)]
pub(crate) mod testkit;

pub use action::{Action, CallbackError, Predicate, Visitor};
pub use collision::{Body, Resolution, distance, overlapping_pairs, overlaps, resolve, snapshot};
pub use entity::{
    Collidable, Entity, EntityId, EntityKind, EntityRef, FrameContext, Roster, Sighting, WeakRef,
};
pub use error::FrameError;
pub use frame::{FrameConfig, FrameReport, Game, Scenario};
pub use processor::{Diagnostic, DrainReport, Processor};
pub use state::{Phase, World, WorldView};
