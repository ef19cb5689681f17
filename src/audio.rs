//! Audio triggers and playback
//!
//! The core only queues `Sound` handles. The owner drains them once per frame
//! and hands them to an `AudioMixer`, which applies volume and mute and plays
//! them through an `AudioSink` in enqueue order.

use serde::{Deserialize, Serialize};

/// Sound effect handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// Bullet shot
    Bullet,
    /// Laser or nuke shot
    Laser,
    /// Foe or meteor destroyed
    SmallExplosion,
    /// Player destroyed
    LargeExplosion,
    /// Power-up collected
    PowerUp,
    /// Power-up weaker than the current power
    PowerDown,
    /// Power-up matching the current power
    Catch,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Bullet => "bullet",
            Sound::Laser => "laser",
            Sound::SmallExplosion => "small-explosion",
            Sound::LargeExplosion => "large-explosion",
            Sound::PowerUp => "power-up",
            Sound::PowerDown => "power-down",
            Sound::Catch => "catch",
        }
    }
}

/// Playback backend
pub trait AudioSink {
    /// Play `sound` at `volume` (0.0 - 1.0)
    fn play(&mut self, sound: Sound, volume: f32);
}

/// Headless sink that logs what it would play
#[derive(Debug, Default)]
pub struct LogSink {
    played: usize,
}

impl LogSink {
    pub fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LogSink {
    fn play(&mut self, sound: Sound, volume: f32) {
        self.played += 1;
        log::debug!("play {} at {:.2}", sound.as_str(), volume);
    }
}

/// Volume and mute in front of a sink
pub struct AudioMixer<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioMixer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn play(&mut self, sound: Sound) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(sound, vol);
    }

    /// Play a frame's triggers in order. Repeats are played repeatedly.
    pub fn play_all(&mut self, sounds: impl IntoIterator<Item = Sound>) {
        for sound in sounds {
            self.play(sound);
        }
    }
}
