//! JSON API for headless match simulation.
//!
//! The entry point mirrors the library's integration story: hand in a small
//! request document, get a summary document back. Both sides are plain
//! serde structs so any host (CLI, server, another engine) can call this
//! without linking against the internal types.

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::engine::character::CharacterKind;
use crate::engine::events::GameEvent;
use crate::engine::input::NullInput;
use crate::engine::rally::{MatchCoordinator, RallyPhase};
use crate::engine::services::NullAudio;
use crate::engine::{GameMode, Side};
use crate::error::{CoreError, Result};
use crate::SCHEMA_VERSION;

const MAX_DURATION_MS: u64 = 600_000;

fn default_schema_version() -> u8 {
    SCHEMA_VERSION
}

fn default_duration_ms() -> u64 {
    60_000
}

fn default_tick_ms() -> f64 {
    16.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    #[serde(default)]
    pub seed: u64,
    /// Simulated time, not wall time.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: f64,
    /// Roster keys; unknown keys fall back to the default character.
    #[serde(default)]
    pub left_character: Option<String>,
    #[serde(default)]
    pub right_character: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchResponse {
    pub schema_version: u8,
    pub seed: u64,
    pub simulated_ms: u64,
    pub rallies: u32,
    pub total_passes: u32,
    pub longest_rally: u32,
    pub hits_left: u32,
    pub hits_right: u32,
    pub final_phase: RallyPhase,
}

/// Simulate a self-playing match and return the JSON summary.
pub fn simulate_match_json(request_json: &str) -> Result<String> {
    let request: MatchRequest = serde_json::from_str(request_json)?;
    let response = simulate_match(&request)?;
    Ok(serde_json::to_string(&response)?)
}

/// Typed variant of [`simulate_match_json`].
pub fn simulate_match(request: &MatchRequest) -> Result<MatchResponse> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(CoreError::UnsupportedSchema {
            found: request.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    if !(request.tick_ms.is_finite() && request.tick_ms > 0.0 && request.tick_ms <= 100.0) {
        return Err(CoreError::InvalidConfig(format!("tick_ms {} out of range", request.tick_ms)));
    }
    if request.duration_ms == 0 || request.duration_ms > MAX_DURATION_MS {
        return Err(CoreError::InvalidConfig(format!(
            "duration_ms {} out of range (1..={MAX_DURATION_MS})",
            request.duration_ms
        )));
    }

    let config = MatchConfig {
        mode: GameMode::VsNpc,
        autopilot: true,
        seed: request.seed,
        left_character: request
            .left_character
            .as_deref()
            .map_or_else(CharacterKind::default, CharacterKind::from_key),
        right_character: request
            .right_character
            .as_deref()
            .map_or_else(CharacterKind::default, CharacterKind::from_key),
        ..MatchConfig::default()
    };

    let mut coordinator =
        MatchCoordinator::new(config, Box::new(NullInput), Box::new(NullAudio))?;

    let mut hits_left = 0u32;
    let mut hits_right = 0u32;
    let mut simulated_ms = 0u64;
    while simulated_ms < request.duration_ms {
        coordinator.tick(request.tick_ms);
        simulated_ms = coordinator.now_ms();
        for event in coordinator.take_events() {
            match event {
                GameEvent::BallHit { side: Side::Left, .. } => hits_left += 1,
                GameEvent::BallHit { side: Side::Right, .. } => hits_right += 1,
                _ => {}
            }
        }
    }

    let stats = coordinator.stats();
    Ok(MatchResponse {
        schema_version: SCHEMA_VERSION,
        seed: request.seed,
        simulated_ms,
        rallies: stats.rallies,
        total_passes: stats.total_passes,
        longest_rally: stats.longest_rally,
        hits_left,
        hits_right,
        final_phase: coordinator.phase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simulation_produces_play() {
        let request = json!({
            "schema_version": 1,
            "seed": 42,
            "duration_ms": 30_000,
        });

        let result = simulate_match_json(&request.to_string()).expect("simulation should run");
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

        assert_eq!(parsed["schema_version"], 1);
        assert_eq!(parsed["seed"], 42);
        assert!(parsed["simulated_ms"].as_u64().unwrap() >= 30_000);
        assert!(parsed["hits_left"].as_u64().unwrap() >= 1);
        let activity = parsed["hits_left"].as_u64().unwrap() + parsed["hits_right"].as_u64().unwrap();
        assert!(activity >= 2, "half a minute should see several hits");
    }

    #[test]
    fn test_same_seed_same_result() {
        let request = json!({ "seed": 9, "duration_ms": 20_000 }).to_string();
        let a = simulate_match_json(&request).unwrap();
        let b = simulate_match_json(&request).unwrap();
        assert_eq!(a, b, "simulation must be deterministic per seed");
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let request = json!({ "schema_version": 99 }).to_string();
        let err = simulate_match_json(&request).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedSchema { found: 99, expected: _ }));
    }

    #[test]
    fn test_unknown_character_key_falls_back() {
        let request = json!({
            "seed": 1,
            "duration_ms": 5_000,
            "left_character": "definitely-not-real",
        })
        .to_string();
        assert!(simulate_match_json(&request).is_ok());
    }

    #[test]
    fn test_bad_tick_rejected() {
        let request = json!({ "tick_ms": 0.0 }).to_string();
        assert!(matches!(
            simulate_match_json(&request),
            Err(CoreError::InvalidConfig(_))
        ));
    }
}
