use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::critics::{CriticConfig, CriticKind};
use crate::ai::ActorConfig;
use crate::error::ConfigError;
use crate::game::BoardConfig;
use crate::training::TrainerConfig;

/// Top-level application configuration, loaded from TOML. Every section
/// and field falls back to its default when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub actor: ActorConfig,
    pub critic: CriticConfig,
    pub training: TrainerConfig,
}

impl AppConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // The state encoding packs one bit per cell into a u64; a size-8
        // diamond board is the largest that fits.
        if !(3..=8).contains(&self.board.size) {
            return Err(ConfigError::Validation(format!(
                "board.size must be between 3 and 8, got {}",
                self.board.size
            )));
        }
        if self.board.holes.is_empty() {
            return Err(ConfigError::Validation(
                "board.holes must name at least one starting hole".to_string(),
            ));
        }

        Self::check_rate("actor.learning_rate", self.actor.learning_rate)?;
        Self::check_unit_interval("actor.discount_factor", self.actor.discount_factor)?;
        Self::check_unit_interval("actor.trace_decay", self.actor.trace_decay)?;
        if !(0.0..=1.0).contains(&self.actor.epsilon_start) {
            return Err(ConfigError::Validation(format!(
                "actor.epsilon_start must be in [0, 1], got {}",
                self.actor.epsilon_start
            )));
        }
        Self::check_unit_interval("actor.epsilon_decay", self.actor.epsilon_decay)?;

        Self::check_rate("critic.learning_rate", self.critic.learning_rate as f32)?;
        Self::check_unit_interval("critic.discount_factor", self.critic.discount_factor)?;
        Self::check_unit_interval("critic.trace_decay", self.critic.trace_decay)?;

        if self.critic.kind == CriticKind::Approximate {
            if self.critic.hidden_sizes.iter().any(|&w| w == 0) {
                return Err(ConfigError::Validation(
                    "critic.hidden_sizes must not contain zero-width layers".to_string(),
                ));
            }
            if self.critic.epochs == 0 {
                return Err(ConfigError::Validation(
                    "critic.epochs must be at least 1".to_string(),
                ));
            }
            if self.critic.minibatch_size == 0 {
                return Err(ConfigError::Validation(
                    "critic.minibatch_size must be at least 1".to_string(),
                ));
            }
            if !(0.0..1.0).contains(&self.critic.validation_fraction) {
                return Err(ConfigError::Validation(format!(
                    "critic.validation_fraction must be in [0, 1), got {}",
                    self.critic.validation_fraction
                )));
            }
        }

        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be at least 1".to_string(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn check_rate(name: &str, value: f32) -> Result<(), ConfigError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} must be a positive finite number, got {}",
                name, value
            )));
        }
        Ok(())
    }

    fn check_unit_interval(name: &str, value: f32) -> Result<(), ConfigError> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "{} must be in (0, 1], got {}",
                name, value
            )));
        }
        Ok(())
    }
}
