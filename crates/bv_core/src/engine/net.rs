//! Online session: snapshot exchange and remote-state blending.
//!
//! One side is locally authoritative for its own character, and for the
//! ball whenever it hit last. The opponent arrives as plain numeric
//! snapshots which are blended into the local world, never simulated.
//! Delivery is at-most-once and may reorder; the blend tolerates both, and
//! a suppression window after each local hit keeps a stale echo from
//! cancelling the hit that just happened.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ball::Ball;
use super::body::Body;
use super::character::Character;
use super::events::GameEvent;
use super::math::lerp;
use super::physics_constants::net as consts;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,
    #[error("send failed: {0}")]
    Send(String),
}

/// Position + velocity of one body, in court coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl BodySnapshot {
    fn of(body: &Body) -> Self {
        Self { x: body.x, y: body.y, vx: body.vx, vy: body.vy }
    }
}

/// The whole per-frame sync payload. No schema versioning on purpose: both
/// ends ship together and unknown fields are ignored by serde.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub t_ms: u64,
    pub ball: BodySnapshot,
    pub ball_moving: bool,
    pub character: BodySnapshot,
}

#[derive(Clone, Debug)]
pub enum TransportEvent {
    Snapshot(StateSnapshot),
    PeerJoined,
    PeerLeft,
    Error(String),
}

/// The wire. Implementations wrap whatever signaling backend exists;
/// the simulation only sees these two calls.
pub trait Transport {
    fn send_snapshot(&mut self, snapshot: &StateSnapshot) -> Result<(), TransportError>;
    fn poll(&mut self) -> Vec<TransportEvent>;
}

/// In-memory transport that echoes every sent snapshot back on the next
/// poll. Good enough for tests and the suppression rule is exactly what
/// keeps the echo harmless.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    inbox: Vec<TransportEvent>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an arbitrary event, as if the peer had produced it.
    pub fn inject(&mut self, event: TransportEvent) {
        self.inbox.push(event);
    }
}

impl Transport for LoopbackTransport {
    fn send_snapshot(&mut self, snapshot: &StateSnapshot) -> Result<(), TransportError> {
        self.inbox.push(TransportEvent::Snapshot(*snapshot));
        Ok(())
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.inbox)
    }
}

/// Per-match online state: rate limiting, hit suppression, degradation.
pub struct NetSession {
    transport: Box<dyn Transport>,
    last_sync_ms: Option<u64>,
    last_local_hit_ms: Option<u64>,
    degraded: bool,
}

impl NetSession {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport, last_sync_ms: None, last_local_hit_ms: None, degraded: false }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Record a local hit; remote ball state is ignored for the
    /// suppression window after this.
    pub fn note_local_hit(&mut self, now_ms: u64) {
        self.last_local_hit_ms = Some(now_ms);
    }

    fn suppressing_remote_ball(&self, now_ms: u64) -> bool {
        match self.last_local_hit_ms {
            Some(t) => now_ms.saturating_sub(t) < consts::LOCAL_HIT_SUPPRESS_MS,
            None => false,
        }
    }

    /// Send the local-authority state, rate-limited. Returns a degradation
    /// event the first time the transport fails; play continues locally.
    pub fn maybe_send(
        &mut self,
        now_ms: u64,
        ball: &Ball,
        local_character: &Character,
    ) -> Option<GameEvent> {
        if self.degraded {
            return None;
        }
        if let Some(last) = self.last_sync_ms {
            if now_ms.saturating_sub(last) < consts::SYNC_INTERVAL_MS {
                return None;
            }
        }
        self.last_sync_ms = Some(now_ms);

        let snapshot = StateSnapshot {
            t_ms: now_ms,
            ball: BodySnapshot::of(&ball.body),
            ball_moving: ball.is_moving,
            character: BodySnapshot::of(&local_character.body),
        };
        match self.transport.send_snapshot(&snapshot) {
            Ok(()) => None,
            Err(err) => {
                log::warn!("snapshot send failed, continuing local-only: {err}");
                self.degraded = true;
                Some(GameEvent::NetworkDegraded { reason: err.to_string() })
            }
        }
    }

    /// Poll the transport and fold remote state into the local world.
    pub fn service(
        &mut self,
        now_ms: u64,
        ball: &mut Ball,
        remote_character: &mut Character,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for event in self.transport.poll() {
            match event {
                TransportEvent::Snapshot(snapshot) => {
                    blend_body(&mut remote_character.body, &snapshot.character);
                    if !self.suppressing_remote_ball(now_ms) {
                        blend_body(&mut ball.body, &snapshot.ball);
                        ball.is_moving = snapshot.ball_moving;
                        ball.is_in_air = snapshot.ball_moving;
                    }
                }
                TransportEvent::PeerJoined => events.push(GameEvent::PeerJoined),
                TransportEvent::PeerLeft => events.push(GameEvent::PeerLeft),
                TransportEvent::Error(reason) => {
                    log::warn!("transport error, continuing local-only: {reason}");
                    self.degraded = true;
                    events.push(GameEvent::NetworkDegraded { reason });
                }
            }
        }
        events
    }
}

/// Half-step the position toward the snapshot and adopt its velocity; a
/// missing or reordered snapshot then shows as a small correction instead
/// of a teleport.
fn blend_body(body: &mut Body, snapshot: &BodySnapshot) {
    body.x = lerp(body.x, snapshot.x, 0.5);
    body.y = lerp(body.y, snapshot.y, 0.5);
    body.vx = snapshot.vx;
    body.vy = snapshot.vy;
}
