//! Battle tuning, loaded from `battle_config.json` with an environment override.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use squad_core::constants::*;

use crate::error::ConfigError;

pub const BUILTIN_BATTLE_CONFIG: &str = include_str!("data/battle_config.json");

/// Environment variable naming a config file that replaces the builtin one.
pub const CONFIG_ENV_VAR: &str = "SQUAD_BATTLE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub tick_ms: u32,
    /// Tiles per second.
    pub move_speed: f32,
    /// Applied when neither end of a step is visible to the player.
    pub unseen_move_multiplier: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
    pub sight_range_day: i32,
    pub sight_range_night: i32,
    pub reaction: ReactionConfig,
    /// Reaction fire with an explosive mode is skipped inside this many tiles.
    pub explosive_range: i32,
    pub smoke_min_turns: u8,
    pub smoke_random_turns: u8,
    pub max_think_steps: u32,
    pub camera_speed: f32,
    /// Save the battle at the start of every Terran phase.
    pub autosave: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            move_speed: MOVE_SPEED,
            unseen_move_multiplier: UNSEEN_MOVE_MULTIPLIER,
            rotation_speed: ROTATION_SPEED,
            sight_range_day: SIGHT_RANGE_DAY,
            sight_range_night: SIGHT_RANGE_NIGHT,
            reaction: ReactionConfig::default(),
            explosive_range: EXPLOSIVE_RANGE,
            smoke_min_turns: SMOKE_MIN_TURNS,
            smoke_random_turns: SMOKE_RANDOM_TURNS,
            max_think_steps: MAX_THINK_STEPS,
            camera_speed: CAMERA_SPEED,
            autosave: false,
        }
    }
}

/// Reaction-fire roll shape.
///
/// `mod = dot(facing, to_target) * facing_weight + facing_bias`, the roll succeeds
/// when `r <= reaction * mod`, and the shot's error factor is `error_base - mod`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    pub facing_weight: f32,
    pub facing_bias: f32,
    pub error_base: f32,
    /// A reaction shot cancels the target's pending move.
    pub clear_move_if_shoot: bool,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            facing_weight: 0.5,
            facing_bias: 0.5,
            error_base: 2.0,
            clear_move_if_shoot: true,
        }
    }
}

impl BattleConfig {
    /// The config shipped with the game. Falls back to compiled defaults if it
    /// fails to parse.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_BATTLE_CONFIG).unwrap_or_else(|err| {
            warn!(target: "squad::config", error = %err, "battle_config.builtin_invalid");
            Self::default()
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Builtin config, or the file named by `SQUAD_BATTLE_CONFIG` when set.
    /// A bad override is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from) else {
            return Self::builtin();
        };
        match Self::from_path(&path) {
            Ok(config) => {
                info!(target: "squad::config", path = %path.display(), "battle_config.loaded=file");
                config
            }
            Err(err) => {
                warn!(
                    target: "squad::config",
                    path = %path.display(),
                    error = %err,
                    "battle_config.load_failed"
                );
                Self::builtin()
            }
        }
    }

    /// Sight radius for the time of day.
    pub fn sight_range(&self, day_time: bool) -> i32 {
        if day_time {
            self.sight_range_day
        } else {
            self.sight_range_night
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_matches_defaults() {
        assert_eq!(BattleConfig::builtin(), BattleConfig::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BattleConfig::from_json_str(r#"{ "tick_ms": 50, "reaction": { "error_base": 3.0 } }"#).unwrap();
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.reaction.error_base, 3.0);
        assert_eq!(config.reaction.facing_weight, 0.5);
        assert_eq!(config.sight_range_day, SIGHT_RANGE_DAY);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = BattleConfig::from_path(Path::new("/nonexistent/battle.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
