use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("board error: {0}")]
    Board(#[from] BoardError),
}

/// Errors that can occur while building a board from its geometry description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("initial hole ({row}, {col}) is outside the board")]
    HoleOutOfBounds { row: usize, col: usize },
}

/// Errors that can occur during training.
///
/// Numerical divergence is fatal: continuing with corrupted values or
/// parameters produces meaningless results, so it is reported rather than
/// recovered.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("training loss is not finite ({0}); value function diverged")]
    NonFiniteLoss(f32),

    #[error("TD-error is not finite ({0}); value function diverged")]
    NonFiniteTdError(f32),

    #[error("training run configured with zero episodes")]
    NoEpisodes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("actor.learning_rate must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: actor.learning_rate must be > 0"
        );
    }

    #[test]
    fn test_board_error_display() {
        let err = BoardError::HoleOutOfBounds { row: 9, col: 2 };
        assert_eq!(err.to_string(), "initial hole (9, 2) is outside the board");
    }

    #[test]
    fn test_training_error_display() {
        let err = TrainingError::NonFiniteTdError(f32::NAN);
        assert!(err.to_string().contains("TD-error is not finite"));
    }
}
