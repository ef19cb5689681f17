//! Fatal frame errors
//!
//! Anything here aborts the current frame: actions interpreted before the
//! fault have already been applied and cannot be rolled back. Benign
//! inconsistencies are `Diagnostic`s instead (see `processor`).

use thiserror::Error;

use super::action::CallbackError;
use super::entity::{EntityId, EntityKind};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{kind:?} {entity} reports invalid collision radius {radius}")]
    InvalidRadius {
        entity: EntityId,
        kind: EntityKind,
        radius: f32,
    },
    #[error("for-each callback failed: {0}")]
    CallbackFailed(#[from] CallbackError),
    #[error("composite nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("drain exceeded {limit} interpretation steps")]
    DrainBudgetExceeded { limit: usize },
    #[error("entity {entity} is already borrowed")]
    EntityBusy { entity: EntityId },
}
