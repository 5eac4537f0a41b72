use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::collision::PlayerVolume;

pub const TUNING_PATH_ENV_VAR: &str = "PARABLE_TUNING_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionTuning {
    pub player_half_width: f32,
    pub player_height: f32,
    pub eye_height: f32,
    pub ground_height: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            player_half_width: 0.25,
            player_height: 1.7,
            eye_height: 1.6,
            ground_height: 0.0,
        }
    }
}

impl CollisionTuning {
    pub fn player_volume(&self) -> PlayerVolume {
        PlayerVolume {
            half_width: self.player_half_width,
            height: self.player_height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocomotionTuning {
    pub move_speed: f32,
    pub snap_turn_degrees: f32,
    pub snap_turn_cooldown_seconds: f32,
    pub turn_deadzone: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,
    pub gravity: f32,
    pub float_gravity: f32,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            snap_turn_degrees: 30.0,
            snap_turn_cooldown_seconds: 0.3,
            turn_deadzone: 0.5,
            jump_velocity: 4.5,
            double_jump_velocity: 5.5,
            gravity: 9.8,
            float_gravity: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionTuning {
    pub proximity_radius: f32,
    pub ray_max_distance: f32,
    pub desktop_carry_distance: f32,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            proximity_radius: 0.2,
            ray_max_distance: 10.0,
            desktop_carry_distance: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PuzzleTuning {
    pub advance_delay_seconds: f32,
}

impl Default for PuzzleTuning {
    fn default() -> Self {
        Self {
            advance_delay_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameTuning {
    pub max_frame_delta_seconds: f32,
}

impl Default for FrameTuning {
    fn default() -> Self {
        Self {
            max_frame_delta_seconds: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningConfig {
    pub collision: CollisionTuning,
    pub locomotion: LocomotionTuning,
    pub interaction: InteractionTuning,
    pub puzzles: PuzzleTuning,
    pub frame: FrameTuning,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning json at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning value {field}={value}: {reason}")]
    Invalid {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
}

impl TuningConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config = serde_path_to_error::deserialize::<_, TuningConfig>(&mut deserializer)
            .map_err(|error| {
                let path = error.path().to_string();
                let location = if path.is_empty() || path == "." {
                    "document root".to_string()
                } else {
                    path
                };
                ConfigError::Parse {
                    location,
                    source: error.into_inner(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "tuning_loaded");
        Ok(config)
    }

    /// Loads the file named by `PARABLE_TUNING_PATH`, or the defaults when the
    /// variable is unset or blank.
    pub fn resolve_from_env() -> Result<Self, ConfigError> {
        match env::var(TUNING_PATH_ENV_VAR) {
            Ok(value) if value.trim().is_empty() => {
                warn!(env_var = TUNING_PATH_ENV_VAR, "blank tuning path; using defaults");
                Ok(Self::default())
            }
            Ok(value) => Self::load(Path::new(value.trim())),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(source) => Err(ConfigError::EnvVar {
                var: TUNING_PATH_ENV_VAR,
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("collision.player_half_width", self.collision.player_half_width),
            ("collision.player_height", self.collision.player_height),
            ("locomotion.move_speed", self.locomotion.move_speed),
            ("locomotion.snap_turn_degrees", self.locomotion.snap_turn_degrees),
            ("locomotion.jump_velocity", self.locomotion.jump_velocity),
            ("locomotion.double_jump_velocity", self.locomotion.double_jump_velocity),
            ("locomotion.gravity", self.locomotion.gravity),
            ("locomotion.float_gravity", self.locomotion.float_gravity),
            ("interaction.proximity_radius", self.interaction.proximity_radius),
            ("interaction.ray_max_distance", self.interaction.ray_max_distance),
            ("interaction.desktop_carry_distance", self.interaction.desktop_carry_distance),
            ("frame.max_frame_delta_seconds", self.frame.max_frame_delta_seconds),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    value,
                    reason: "must be finite",
                });
            }
            if value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    value,
                    reason: "must be greater than zero",
                });
            }
        }

        let non_negative = [
            ("collision.eye_height", self.collision.eye_height),
            (
                "locomotion.snap_turn_cooldown_seconds",
                self.locomotion.snap_turn_cooldown_seconds,
            ),
            ("puzzles.advance_delay_seconds", self.puzzles.advance_delay_seconds),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    value,
                    reason: "must be a finite non-negative number",
                });
            }
        }

        if !self.collision.ground_height.is_finite() {
            return Err(ConfigError::Invalid {
                field: "collision.ground_height",
                value: self.collision.ground_height,
                reason: "must be finite",
            });
        }
        if !(0.0..1.0).contains(&self.locomotion.turn_deadzone) {
            return Err(ConfigError::Invalid {
                field: "locomotion.turn_deadzone",
                value: self.locomotion.turn_deadzone,
                reason: "must be in [0, 1)",
            });
        }
        Ok(())
    }
}
