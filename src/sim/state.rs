//! World state owned by the frame orchestrator
//!
//! Only the action processor mutates this, on the orchestrator's behalf.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::entity::EntityRef;
use crate::audio::Sound;

/// Current phase of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Active gameplay
    Running,
    /// Update and collision skipped; draw and input continue
    Paused,
    /// Lives exhausted, score frozen
    GameOver,
    /// Confirmed restart; torn down and re-seeded before the next update
    ResetPending,
}

/// Read-only counters handed to entities that display shared state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldView {
    pub score: i64,
    pub lives: i32,
    pub initial_lives: i32,
    pub phase: Phase,
    /// Frames run since the game was created
    pub frame: u64,
    pub entities: usize,
}

/// Live entities, counters and per-frame transient queues
#[derive(Debug)]
pub struct World {
    /// Newest first
    entities: VecDeque<EntityRef>,
    pub score: i64,
    pub lives: i32,
    pub phase: Phase,
    initial_lives: i32,
    /// Audio triggered this frame, in enqueue order
    audio: Vec<Sound>,
}

impl World {
    pub fn new(initial_lives: i32) -> Self {
        Self {
            entities: VecDeque::with_capacity(128),
            score: 0,
            lives: initial_lives,
            phase: Phase::Running,
            initial_lives,
            audio: Vec::new(),
        }
    }

    pub fn initial_lives(&self) -> i32 {
        self.initial_lives
    }

    /// Insert at the head of the collection
    pub fn spawn(&mut self, handle: EntityRef) {
        self.entities.push_front(handle);
    }

    /// Remove by identity. Returns false if the handle was not live.
    pub fn despawn(&mut self, handle: &EntityRef) -> bool {
        if let Some(idx) = self.entities.iter().position(|e| e == handle) {
            self.entities.remove(idx);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, handle: &EntityRef) -> bool {
        self.entities.iter().any(|e| e == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.entities.iter()
    }

    /// Snapshot of the current membership, immune to later spawns/despawns
    pub fn handles(&self) -> Vec<EntityRef> {
        self.entities.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every entity (episode teardown)
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Fresh counters for a new episode
    pub fn reset_counters(&mut self) {
        self.score = 0;
        self.lives = self.initial_lives;
        self.phase = Phase::Running;
        self.audio.clear();
    }

    pub fn queue_audio(&mut self, sound: Sound) {
        self.audio.push(sound);
    }

    pub fn pending_audio(&self) -> &[Sound] {
        &self.audio
    }

    /// Hand this frame's audio triggers to the owner
    pub fn take_audio(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.audio)
    }

    pub fn view(&self, frame: u64) -> WorldView {
        WorldView {
            score: self.score,
            lives: self.lives,
            initial_lives: self.initial_lives,
            phase: self.phase,
            frame,
            entities: self.entities.len(),
        }
    }
}
