//! Entity capability set and reference-identity handles
//!
//! Every world-resident object implements `Entity`. Capabilities beyond the
//! base set are opt-in: an entity is collidable only if `as_collidable`
//! returns `Some`. Identity is the handle, never the value: two `EntityRef`s
//! are equal only when they point at the same allocation.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec2;

use super::action::Action;
use super::collision::Body;
use super::error::FrameError;
use super::state::WorldView;
use crate::RESTING;
use crate::consts::Z_DEFAULT;
use crate::input::InputEvent;
use crate::renderer::Surface;

/// Tag describing what an entity is, used by reactions to dispatch by `match`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player { power: u8 },
    Shield,
    /// Player projectile at the given power level
    Fire { power: u8 },
    EnemyFire,
    Foe,
    FoeSensor,
    ForceField,
    Meteor,
    PowerUp { power: u8 },
    Explosion,
    Spawner,
    Reload,
    /// Ambient background
    Scenery,
    Hud,
}

impl EntityKind {
    /// Kinds that destroy the player on contact
    pub fn is_hostile(self) -> bool {
        matches!(
            self,
            EntityKind::Foe | EntityKind::EnemyFire | EntityKind::ForceField | EntityKind::Meteor
        )
    }
}

/// Base capability set: update, draw, react, close.
///
/// All methods except `kind` have inert defaults so an entity only implements
/// what it takes part in.
pub trait Entity {
    fn kind(&self) -> EntityKind;

    /// World position; `RESTING` for entities without spatial meaning
    fn position(&self) -> Vec2 {
        RESTING
    }

    /// Draw layer. Ties are broken by collection order.
    fn z(&self) -> i32 {
        Z_DEFAULT
    }

    /// Advance one frame. Must not touch other entities; cross-entity
    /// effects are returned as an `Action`.
    fn update(&mut self, _ctx: &FrameContext<'_>) -> Option<Action> {
        None
    }

    fn draw(&self, _surface: &mut dyn Surface, _view: &WorldView) {}

    /// Receives the full ordered event batch of the frame
    fn react(&mut self, _events: &[InputEvent]) {}

    /// Called by an owning entity when it goes away
    fn on_close(&mut self, _me: &EntityRef) -> Option<Action> {
        None
    }

    /// Whether out-of-bounds cleanup applies to this entity
    fn bounded(&self) -> bool {
        self.position() != RESTING
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        None
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        None
    }
}

/// Circle collider capability
pub trait Collidable {
    /// Non-negative collision radius
    fn radius(&self) -> f32;

    /// React to overlapping `other`. The symmetric call on `other` happens in
    /// the same pass, in unspecified order.
    fn on_collision(&mut self, me: &Body, other: &Body) -> Option<Action>;
}

/// Opaque identity of an entity allocation (for diagnostics and logs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Shared handle to a live entity
#[derive(Clone)]
pub struct EntityRef(Rc<RefCell<dyn Entity>>);

impl EntityRef {
    pub fn new<E: Entity + 'static>(entity: E) -> Self {
        Self(Rc::new(RefCell::new(entity)))
    }

    /// Build an entity that knows its own (weak) handle, e.g. to hand it to
    /// satellites it owns.
    pub fn new_cyclic<E, F>(build: F) -> Self
    where
        E: Entity + 'static,
        F: FnOnce(WeakRef) -> E,
    {
        let rc: Rc<RefCell<E>> = Rc::new_cyclic(|weak: &Weak<RefCell<E>>| {
            let weak: Weak<RefCell<dyn Entity>> = weak.clone();
            RefCell::new(build(WeakRef(weak)))
        });
        Self(rc)
    }

    pub fn id(&self) -> EntityId {
        EntityId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn downgrade(&self) -> WeakRef {
        WeakRef(Rc::downgrade(&self.0))
    }

    pub fn borrow(&self) -> Ref<'_, dyn Entity> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn Entity> {
        self.0.borrow_mut()
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, dyn Entity>, FrameError> {
        let entity = self.id();
        match self.0.try_borrow() {
            Ok(guard) => Ok(guard),
            Err(_) => Err(FrameError::EntityBusy { entity }),
        }
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Entity>, FrameError> {
        let entity = self.id();
        match self.0.try_borrow_mut() {
            Ok(guard) => Ok(guard),
            Err(_) => Err(FrameError::EntityBusy { entity }),
        }
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(entity) => write!(f, "{:?}{}", entity.kind(), self.id()),
            Err(_) => write!(f, "<busy>{}", self.id()),
        }
    }
}

/// Non-owning handle, used by satellites to refer back to their owner
#[derive(Clone)]
pub struct WeakRef(Weak<RefCell<dyn Entity>>);

impl WeakRef {
    pub fn upgrade(&self) -> Option<EntityRef> {
        self.0.upgrade().map(EntityRef)
    }

    /// True if this points at the same allocation as `handle`
    pub fn is(&self, handle: &EntityRef) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), Rc::as_ptr(&handle.0))
    }
}

impl fmt::Debug for WeakRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakRef(#{:x})", self.0.as_ptr() as *const () as usize)
    }
}

/// One entry of the pre-update roster
#[derive(Debug, Clone)]
pub struct Sighting {
    pub handle: EntityRef,
    pub kind: EntityKind,
    pub position: Vec2,
}

/// Membership and positions of the live collection as they were before the
/// update fan-out began. Entities read each other only through this.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    sightings: Vec<Sighting>,
}

impl Roster {
    pub fn capture<'a>(
        handles: impl IntoIterator<Item = &'a EntityRef>,
    ) -> Result<Self, FrameError> {
        let mut sightings = Vec::new();
        for handle in handles {
            let entity = handle.try_borrow()?;
            sightings.push(Sighting {
                handle: handle.clone(),
                kind: entity.kind(),
                position: entity.position(),
            });
        }
        Ok(Self { sightings })
    }

    pub fn get(&self, handle: &EntityRef) -> Option<&Sighting> {
        self.sightings.iter().find(|s| s.handle == *handle)
    }

    /// Position of `handle` at frame start, `None` if it was not live
    pub fn locate(&self, handle: &EntityRef) -> Option<Vec2> {
        self.get(handle).map(|s| s.position)
    }

    /// Like `locate`, for a weak handle whose target may be gone
    pub fn locate_weak(&self, handle: &WeakRef) -> Option<Vec2> {
        self.sightings
            .iter()
            .find(|s| handle.is(&s.handle))
            .map(|s| s.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sighting> {
        self.sightings.iter()
    }

    pub fn len(&self) -> usize {
        self.sightings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sightings.is_empty()
    }
}

/// Everything an entity may look at while updating
pub struct FrameContext<'a> {
    /// Seconds since the previous frame (never negative or NaN)
    pub delta: f32,
    /// The updating entity's own handle. Do not borrow it: the entity is
    /// already mutably borrowed for the duration of the call.
    pub me: &'a EntityRef,
    pub view: &'a WorldView,
    pub roster: &'a Roster,
}
