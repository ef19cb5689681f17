//! Broad/narrow-phase collision resolution for circle colliders
//!
//! One snapshot per frame: bodies are captured once, every unordered pair
//! `(i, j)` with `i < j` is tested once, and both sides of an overlapping pair
//! get exactly one `on_collision` call. O(n²) over collidables; entity counts
//! are in the tens.

use glam::Vec2;

use super::action::Action;
use super::entity::{EntityKind, EntityRef};
use super::error::FrameError;

/// Snapshot of one collidable entity
#[derive(Debug, Clone)]
pub struct Body {
    pub handle: EntityRef,
    pub kind: EntityKind,
    pub position: Vec2,
    pub radius: f32,
}

impl Body {
    /// Capture `handle` if it is collidable. Non-collidables yield `None`.
    pub fn capture(handle: &EntityRef) -> Result<Option<Body>, FrameError> {
        let entity = handle.try_borrow()?;
        let Some(collider) = entity.as_collidable() else {
            return Ok(None);
        };
        let radius = collider.radius();
        if !radius.is_finite() || radius < 0.0 {
            return Err(FrameError::InvalidRadius {
                entity: handle.id(),
                kind: entity.kind(),
                radius,
            });
        }
        Ok(Some(Body {
            handle: handle.clone(),
            kind: entity.kind(),
            position: entity.position(),
            radius,
        }))
    }
}

/// Outcome of one collision pass
#[derive(Debug, Default)]
pub struct Resolution {
    /// Overlapping pairs as snapshot indices, `i < j`, in enumeration order
    pub pairs: Vec<(usize, usize)>,
    /// Reactions in pair-enumeration order
    pub actions: Vec<Action>,
}

/// Capture every collidable among `handles`
pub fn snapshot<'a>(
    handles: impl IntoIterator<Item = &'a EntityRef>,
) -> Result<Vec<Body>, FrameError> {
    let mut bodies = Vec::new();
    for handle in handles {
        if let Some(body) = Body::capture(handle)? {
            bodies.push(body);
        }
    }
    Ok(bodies)
}

/// Circle overlap, touching counts. No square root.
#[inline]
pub fn overlaps(a: &Body, b: &Body) -> bool {
    let reach = a.radius + b.radius;
    a.position.distance_squared(b.position) <= reach * reach
}

/// Exact center distance
#[inline]
pub fn distance(a: &Body, b: &Body) -> f32 {
    a.position.distance(b.position)
}

/// Every overlapping unordered pair, each once, never a self pair
pub fn overlapping_pairs(bodies: &[Body]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if bodies[i].handle == bodies[j].handle {
                continue;
            }
            if overlaps(&bodies[i], &bodies[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Test all pairs and collect both sides' reactions
pub fn resolve(bodies: &[Body]) -> Result<Resolution, FrameError> {
    let pairs = overlapping_pairs(bodies);
    let mut actions = Vec::with_capacity(pairs.len());
    for &(i, j) in &pairs {
        let (a, b) = (&bodies[i], &bodies[j]);
        actions.extend(react(a, b)?);
        actions.extend(react(b, a)?);
    }
    if !pairs.is_empty() {
        log::debug!("{} overlapping pairs, {} reactions", pairs.len(), actions.len());
    }
    Ok(Resolution { pairs, actions })
}

fn react(me: &Body, other: &Body) -> Result<Option<Action>, FrameError> {
    let mut entity = me.handle.try_borrow_mut()?;
    Ok(entity
        .as_collidable_mut()
        .and_then(|collider| collider.on_collision(me, other)))
}
