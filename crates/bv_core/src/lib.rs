//! # bv_core - Deterministic Beach Volleyball Rally Engine
//!
//! Headless simulation core for a 2D arcade beach-volleyball game: ball
//! physics, character movement, an NPC opponent and the rally lifecycle,
//! driven by an external frame tick.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same result)
//! - Analytic hit arcs that land where they aim
//! - Predictive-intercept NPC opponent
//! - JSON API for headless match summaries
//!
//! Rendering, assets, audio and the network transport are injected
//! collaborators; the crate never touches a screen, a file or a socket.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;

// Re-export the main API surface.
pub use api::{simulate_match, simulate_match_json, MatchRequest, MatchResponse};
pub use config::{CourtConfig, MatchConfig};
pub use error::{CoreError, Result};

// Re-export the simulation types embedders drive directly.
pub use engine::ball::{Ball, HitKind};
pub use engine::character::{Character, CharacterKind, ControlKind};
pub use engine::events::{GameEvent, SoundCue};
pub use engine::input::{Control, InputAction, InputSource, PlayerSlot, QueuedInput, SharedInput};
pub use engine::net::{StateSnapshot, Transport, TransportEvent};
pub use engine::npc::{NpcBrain, NpcState};
pub use engine::rally::{MatchCoordinator, MatchStats, RallyPhase};
pub use engine::services::{AudioSink, Clock, NullAudio, SpriteProvider, SystemClock};
pub use engine::{GameMode, Side};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_library_surface_runs_a_match() {
        let config = MatchConfig { autopilot: true, seed: 123, ..MatchConfig::default() };
        let mut coordinator =
            MatchCoordinator::new(config, Box::new(QueuedInput::new()), Box::new(NullAudio))
                .expect("default config is valid");

        for _ in 0..1_000 {
            coordinator.tick(16.0);
        }
        let events = coordinator.take_events();
        assert!(
            events.iter().any(|e| matches!(e, GameEvent::BallHit { .. })),
            "a demo match should produce hits"
        );
    }

    proptest! {
        /// The ground invariant holds for arbitrary launches.
        #[test]
        fn prop_ball_never_sinks_below_ground(
            vx in -2_000.0f32..2_000.0,
            vy in -2_000.0f32..2_000.0,
            x in 0.0f32..1_200.0,
            y in 0.0f32..500.0,
        ) {
            let mut ball = Ball::new(x, y, 1_280.0);
            ball.set_ground_level(540.0);
            ball.is_moving = true;
            ball.body.vx = vx;
            ball.body.vy = vy;

            let mut now = 0u64;
            for _ in 0..300 {
                ball.step(16.0, now);
                now += 16;
                prop_assert!(ball.body.y + ball.body.height <= ball.body.ground_y + 1.0);
                prop_assert!(ball.body.x >= 0.0);
                prop_assert!(ball.body.x <= 1_280.0 - ball.body.width);
            }
        }

        /// Arbitrary (sane) deltas never push a character out of bounds.
        #[test]
        fn prop_character_stays_in_court(
            dir in prop::bool::ANY,
            dt in 1.0f32..60.0,
        ) {
            let mut character = Character::new(
                600.0,
                400.0,
                CharacterKind::DonQ,
                ControlKind::Human,
            );
            character.set_ground_level(540.0);

            for _ in 0..200 {
                character.drive(if dir { 10_000.0 } else { -10_000.0 });
                character.update(dt);
                prop_assert!(character.body.x >= 0.0);
                prop_assert!(
                    character.body.x <= crate::engine::physics_constants::court::WIDTH
                        - character.body.width
                );
            }
        }
    }
}
