//! Gameplay events emitted by the coordinator.
//!
//! No ad-hoc callback fields anywhere: the coordinator
//! queues events during a tick and the embedder drains them afterwards, in
//! emission order. An undrained queue is only ever bounded by rally length,
//! and dropping events on the floor is legal (the renderer of a headless
//! run simply never looks).

use serde::{Deserialize, Serialize};

use super::ball::HitKind;
use super::Side;

/// Fire-and-forget sound identifiers; the audio sink maps them to real
/// assets and may silently skip unknown or unloaded ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Ball contact thump.
    Hit,
    /// Character voice bark layered over a hit.
    Voice,
    /// Celebration after a rally worth celebrating.
    RallyCheer,
    /// Menu / selection blip.
    UiSelect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An accepted hit; `pass_count` is the count after this hit.
    BallHit { side: Side, kind: HitKind, pass_count: u32 },
    /// The ball touched sand during a rally.
    RallyEnded { passes: u32 },
    /// Ball settled and the next serve may begin.
    ServeReady,
    /// Online: the opponent connected.
    PeerJoined,
    /// Online: the opponent disconnected.
    PeerLeft,
    /// Online: transport trouble; play continues locally.
    NetworkDegraded { reason: String },
}
