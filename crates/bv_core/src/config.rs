//! Match setup: court geometry, mode, roster picks and the RNG seed.
//!
//! Everything the menu screen decides lands here, as plain data. A default
//! config is always playable; validation only rejects geometry the
//! simulation cannot run on.

use serde::{Deserialize, Serialize};

use crate::engine::character::CharacterKind;
use crate::engine::physics_constants::{character, court, rally};
use crate::engine::GameMode;
use crate::error::{CoreError, Result};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtConfig {
    pub width: f32,
    pub height: f32,
    /// Fraction of the height where the sand line sits.
    pub ground_ratio: f32,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self { width: court::WIDTH, height: court::HEIGHT, ground_ratio: court::GROUND_RATIO }
    }
}

impl CourtConfig {
    pub fn ground_y(&self) -> f32 {
        self.height * self.ground_ratio
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub court: CourtConfig,
    pub mode: GameMode,
    pub seed: u64,
    pub left_character: CharacterKind,
    pub right_character: CharacterKind,
    /// Passes required before the rally-end celebration cue fires.
    pub cue_min_passes: u32,
    /// Replace the left human with a second NPC brain (demo / headless).
    pub autopilot: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            court: CourtConfig::default(),
            mode: GameMode::default(),
            seed: 0,
            left_character: CharacterKind::default(),
            right_character: CharacterKind::default(),
            cue_min_passes: rally::CUE_MIN_PASSES,
            autopilot: false,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.court.width.is_finite() || !self.court.height.is_finite() {
            return Err(CoreError::InvalidConfig("court dimensions must be finite".into()));
        }
        // Both characters and a net gap have to fit side by side.
        let min_width = 2.0 * character::SIZE + 200.0;
        if self.court.width < min_width {
            return Err(CoreError::InvalidConfig(format!(
                "court width {} too narrow, need at least {}",
                self.court.width, min_width
            )));
        }
        if !(0.1..=0.95).contains(&self.court.ground_ratio) {
            return Err(CoreError::InvalidConfig(format!(
                "ground ratio {} outside 0.1..=0.95",
                self.court.ground_ratio
            )));
        }
        if self.court.ground_y() <= character::SIZE {
            return Err(CoreError::InvalidConfig(
                "characters do not fit above the ground line".into(),
            ));
        }
        Ok(())
    }
}
