//! Error taxonomy for the harness

use std::path::PathBuf;

use tradesim_core::{Color, EngineError, ObserverError};

/// Problems with the games a caller asked for; the batch does not start
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("duplicate game id `{0}`")]
    DuplicateGameId(String),

    #[error("game `{0}` has no players")]
    EmptyPlayers(String),

    #[error("game `{game_id}` seats {count} players (engine supports {min}..={max})")]
    PlayerCount {
        game_id: String,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("game `{game_id}` seats {color} more than once")]
    DuplicateColor { game_id: String, color: Color },

    #[error("invalid generation options: {0}")]
    InvalidOptions(String),
}

/// Errors surfaced by the runner, orchestrator and persistence sink
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Recorder hooks arrived out of sequence; an integration defect
    #[error("game `{game_id}`: {source}")]
    ObserverOrder {
        game_id: String,
        source: ObserverError,
    },

    /// The game did not reach a terminal state; its rows are discarded
    #[error("game `{game_id}` failed after {partial_rows} recorded rows: {source}")]
    GameExecution {
        game_id: String,
        partial_rows: usize,
        source: EngineError,
    },

    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Errors that abort a batch whatever the configured policy
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarnessError::Configuration(_) | HarnessError::ObserverOrder { .. }
        )
    }

    /// Game the error belongs to, if any
    pub fn game_id(&self) -> Option<&str> {
        match self {
            HarnessError::ObserverOrder { game_id, .. }
            | HarnessError::GameExecution { game_id, .. } => Some(game_id),
            _ => None,
        }
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
