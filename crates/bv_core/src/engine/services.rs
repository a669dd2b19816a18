//! Injected collaborator traits: audio, sprites, clock.
//!
//! No process-wide singletons: every service is a trait object handed to
//! whoever needs it at construction.
//! All of them are allowed to do nothing; a missing asset or a muted sink
//! degrades the presentation, never the simulation.

use std::time::Instant;

use super::character::CharacterKind;
use super::events::SoundCue;

// ============================================================
// Audio
// ============================================================

/// Fire-and-forget audio. The core never waits on playback and never
/// learns whether a cue actually sounded.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Sink that swallows every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Sink that records cues; used by tests and the headless summary.
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
    }
}

// ============================================================
// Sprites
// ============================================================

/// Opaque handle to a loaded drawable; meaningful only to the provider.
pub type SpriteHandle = u32;

pub trait SpriteProvider {
    fn sprite(&self, key: &str) -> Option<SpriteHandle>;
}

/// Provider with no sprites loaded; everything renders as fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSprites;

impl SpriteProvider for NullSprites {
    fn sprite(&self, _key: &str) -> Option<SpriteHandle> {
        None
    }
}

/// What a renderer should draw for a character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteRef {
    Handle(SpriteHandle),
    /// No sprite loaded: draw a colored box with the display name.
    Fallback { name: &'static str, color: &'static str },
}

/// Resolve a character's visual, falling back to roster cosmetics when the
/// provider has nothing for the key.
pub fn resolve_sprite(provider: &dyn SpriteProvider, kind: CharacterKind) -> SpriteRef {
    let entry = kind.roster();
    match provider.sprite(entry.sprite_key) {
        Some(handle) => SpriteRef::Handle(handle),
        None => SpriteRef::Fallback { name: entry.name, color: entry.accent_color },
    }
}

// ============================================================
// Clock
// ============================================================

/// Monotonic millisecond source for the embedder's frame loop. The
/// simulation itself runs on accumulated tick deltas and never reads this.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `Instant`.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Hand-cranked clock for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualClock {
    pub now: u64,
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}
