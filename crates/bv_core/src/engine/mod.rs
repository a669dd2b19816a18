//! Simulation engine: physics, characters, NPC brain and rally flow.
//!
//! Everything in here runs synchronously inside one external tick; the only
//! state that survives between ticks lives in the `MatchCoordinator`.

pub mod ball;
pub mod body;
pub mod character;
pub mod events;
pub mod input;
pub mod math;
pub mod net;
pub mod npc;
pub mod physics_constants;
pub mod rally;
pub mod scheduler;
pub mod services;

use serde::{Deserialize, Serialize};

/// Court half, viewed from the renderer. The net sits between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Who occupies the two halves. Fixed at match setup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Human on the left, NPC brain on the right.
    #[default]
    VsNpc,
    /// Two humans on one keyboard; first to reach the ball hits it.
    LocalTwoPlayer,
    /// Human on the left, snapshot-blended peer on the right.
    Online,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_game_mode_parses_kebab_case() {
        let mode: GameMode = serde_json::from_str("\"local-two-player\"").unwrap();
        assert_eq!(mode, GameMode::LocalTwoPlayer);
        let mode: GameMode = serde_json::from_str("\"vs-npc\"").unwrap();
        assert_eq!(mode, GameMode::VsNpc);
    }
}
