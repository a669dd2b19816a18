//! Character bodies: movement, jump physics and the hit-animation machine.
//!
//! A `Character` is deliberately dumb about rules: it moves where it is told
//! and animates when told. Hit eligibility lives in the rally coordinator,
//! and the NPC brain drives its character through the same methods the
//! human input path uses.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::math::{frame_decay, lerp};
use super::physics_constants::{character as consts, court};

/// Closed roster of playable characters. Unknown keys parse to the default
/// entry instead of erroring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterKind {
    #[default]
    DonQ,
    Sinclair,
    Ishmael,
}

/// Cosmetic data for one roster entry. The accent color doubles as the
/// fallback visual when the sprite provider has nothing for the key.
#[derive(Clone, Copy, Debug)]
pub struct RosterEntry {
    pub name: &'static str,
    pub sprite_key: &'static str,
    pub accent_color: &'static str,
}

const ROSTER_DON_Q: RosterEntry =
    RosterEntry { name: "Don Quixote", sprite_key: "donQ", accent_color: "#FFD700" };
const ROSTER_SINCLAIR: RosterEntry =
    RosterEntry { name: "Sinclair", sprite_key: "sinclair", accent_color: "#9ACD32" };
const ROSTER_ISHMAEL: RosterEntry =
    RosterEntry { name: "Ishmael", sprite_key: "ishmael", accent_color: "#FF6347" };

impl CharacterKind {
    pub fn roster(&self) -> &'static RosterEntry {
        match self {
            CharacterKind::DonQ => &ROSTER_DON_Q,
            CharacterKind::Sinclair => &ROSTER_SINCLAIR,
            CharacterKind::Ishmael => &ROSTER_ISHMAEL,
        }
    }

    /// Parse a sprite key; anything unrecognized falls back to the default.
    pub fn from_key(key: &str) -> Self {
        match key {
            "donQ" => CharacterKind::DonQ,
            "sinclair" => CharacterKind::Sinclair,
            "ishmael" => CharacterKind::Ishmael,
            _ => CharacterKind::default(),
        }
    }
}

/// Who steers this character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    Human,
    Npc,
    /// Online opponent: state arrives as snapshots, never simulated locally.
    Remote,
}

/// One keyframe of a hit animation: time is normalized 0..1.
#[derive(Clone, Copy, Debug)]
struct Keyframe {
    t: f32,
    scale: f32,
    rotation: f32,
    lift: f32,
}

// A hit picks one of these at random so repeated rallies don't loop the
// exact same motion.
const TRACK_POP: [Keyframe; 4] = [
    Keyframe { t: 0.0, scale: 1.0, rotation: 0.0, lift: 0.0 },
    Keyframe { t: 0.35, scale: 1.3, rotation: 0.2, lift: -12.0 },
    Keyframe { t: 0.7, scale: 1.1, rotation: -0.08, lift: -4.0 },
    Keyframe { t: 1.0, scale: 1.0, rotation: 0.0, lift: 0.0 },
];
const TRACK_LEAN: [Keyframe; 4] = [
    Keyframe { t: 0.0, scale: 1.0, rotation: 0.0, lift: 0.0 },
    Keyframe { t: 0.3, scale: 1.15, rotation: -0.25, lift: -8.0 },
    Keyframe { t: 0.65, scale: 1.2, rotation: 0.1, lift: -14.0 },
    Keyframe { t: 1.0, scale: 1.0, rotation: 0.0, lift: 0.0 },
];
const TRACK_HOP: [Keyframe; 4] = [
    Keyframe { t: 0.0, scale: 1.0, rotation: 0.0, lift: 0.0 },
    Keyframe { t: 0.25, scale: 1.1, rotation: 0.05, lift: -18.0 },
    Keyframe { t: 0.55, scale: 1.25, rotation: -0.15, lift: -10.0 },
    Keyframe { t: 1.0, scale: 1.0, rotation: 0.0, lift: 0.0 },
];

const TRACKS: [&[Keyframe]; 3] = [&TRACK_POP, &TRACK_LEAN, &TRACK_HOP];

/// Animation state; purely visual, never blocks physics or input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    Hitting,
}

/// Per-frame movement intent, polled from the input source (or synthesized
/// by the NPC brain) before the physics update.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Character {
    pub body: Body,
    pub kind: CharacterKind,
    pub control: ControlKind,
    pub speed: f32,
    pub jump_power: f32,
    pub gravity: f32,
    pub friction: f32,
    /// Hit-eligibility gate, independent of physics.
    pub can_interact: bool,
    court_width: f32,

    // Animation output; renderers read these, nothing else does.
    pub anim_state: AnimState,
    pub animation_progress: f32,
    pub scale: f32,
    pub rotation_offset: f32,
    pub vertical_offset: f32,
    track_index: usize,
}

impl Character {
    pub fn new(x: f32, y: f32, kind: CharacterKind, control: ControlKind) -> Self {
        Self {
            body: Body::new(x, y, consts::SIZE, consts::SIZE, 2),
            kind,
            control,
            speed: consts::SPEED,
            jump_power: consts::JUMP_POWER,
            gravity: consts::GRAVITY,
            friction: consts::FRICTION,
            can_interact: true,
            court_width: court::WIDTH,
            anim_state: AnimState::Idle,
            animation_progress: 0.0,
            scale: 1.0,
            rotation_offset: 0.0,
            vertical_offset: 0.0,
            track_index: 0,
        }
    }

    pub fn set_ground_level(&mut self, ground_y: f32) {
        self.body.set_ground_level(ground_y);
    }

    pub fn set_court_bounds(&mut self, court_width: f32) {
        self.court_width = court_width;
    }

    pub fn roster(&self) -> &'static RosterEntry {
        self.kind.roster()
    }

    pub fn set_interactable(&mut self, can_interact: bool) {
        self.can_interact = can_interact;
    }

    /// Apply a movement intent for this tick. Directional input overrides
    /// the decaying velocity; a jump only connects from the ground.
    pub fn apply_intent(&mut self, intent: MoveIntent) {
        if intent.left {
            self.body.vx = -self.speed;
        }
        if intent.right {
            self.body.vx = self.speed;
        }
        if intent.jump && self.body.on_ground {
            self.body.vy = self.jump_power;
            self.body.on_ground = false;
        }
    }

    /// Direct horizontal drive, used by the NPC brain.
    pub fn drive(&mut self, vx: f32) {
        self.body.vx = vx;
    }

    /// Pointer hit-test against the bounding box.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.body.x
            && x <= self.body.x + self.body.width
            && y >= self.body.y
            && y <= self.body.y + self.body.height
    }

    /// Integrate one tick of movement physics and advance the animation.
    pub fn update(&mut self, dt_ms: f32) {
        let dt = dt_ms / 1000.0;

        if !self.body.on_ground {
            self.body.vy += self.gravity * dt;
        }

        self.body.x += self.body.vx * dt;
        self.body.y += self.body.vy * dt;

        if self.body.collide_ground() {
            self.body.vy = 0.0;
            self.body.on_ground = true;
        } else {
            self.body.on_ground = false;
        }

        self.body.clamp_horizontal(self.court_width);

        // Skating stop: decays every tick whether or not a key is held.
        self.body.vx *= frame_decay(self.friction, dt_ms);

        self.advance_animation(dt_ms);
    }

    /// Start the hit animation on a randomly chosen keyframe track.
    pub fn play_hit_animation(&mut self, rng: &mut ChaCha8Rng) {
        self.track_index = rng.gen_range(0..TRACKS.len());
        self.anim_state = AnimState::Hitting;
        self.animation_progress = 0.0;
    }

    fn advance_animation(&mut self, dt_ms: f32) {
        if self.anim_state != AnimState::Hitting {
            return;
        }

        self.animation_progress += dt_ms / consts::HIT_ANIM_MS;
        if self.animation_progress >= 1.0 {
            self.anim_state = AnimState::Idle;
            self.animation_progress = 0.0;
            self.scale = 1.0;
            self.rotation_offset = 0.0;
            self.vertical_offset = 0.0;
            return;
        }

        let track = TRACKS[self.track_index];
        let (scale, rotation, lift) = sample_track(track, self.animation_progress);
        self.scale = scale;
        self.rotation_offset = rotation;
        self.vertical_offset = lift;
    }
}

/// Piecewise-linear sample of a keyframe track at normalized time `t`.
fn sample_track(track: &[Keyframe], t: f32) -> (f32, f32, f32) {
    debug_assert!(track.len() >= 2);
    for pair in track.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.t {
            let span = (b.t - a.t).max(f32::EPSILON);
            let f = ((t - a.t) / span).clamp(0.0, 1.0);
            return (
                lerp(a.scale, b.scale, f),
                lerp(a.rotation, b.rotation, f),
                lerp(a.lift, b.lift, f),
            );
        }
    }
    let last = track[track.len() - 1];
    (last.scale, last.rotation, last.lift)
}
