//! Configuration types for batch play
//!
//! Level 4 - Utilities and configuration

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tradesim_core::{Agent, AgentKind, Color};

/// One game to play: its seated agents and a batch-unique identifier
pub struct GameConfig {
    /// Unique within a batch; also names the persisted file
    pub game_id: String,
    /// Agents in seat order, each bound to its color
    pub players: Vec<Box<dyn Agent>>,
    /// Seed for the engine's random stream
    pub seed: u64,
}

impl GameConfig {
    /// Create a config with seed 0
    pub fn new(game_id: impl Into<String>, players: Vec<Box<dyn Agent>>) -> Self {
        Self {
            game_id: game_id.into(),
            players,
            seed: 0,
        }
    }

    /// Set the engine seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seated colors in order
    pub fn colors(&self) -> Vec<Color> {
        self.players.iter().map(|p| p.color()).collect()
    }
}

impl fmt::Debug for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let players: Vec<String> = self
            .players
            .iter()
            .map(|p| format!("{}:{}", p.color(), p.label()))
            .collect();
        f.debug_struct("GameConfig")
            .field("game_id", &self.game_id)
            .field("players", &players)
            .field("seed", &self.seed)
            .finish()
    }
}

/// What the orchestrator does when a game fails to finish
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameErrorPolicy {
    /// Log the failure, record it, and keep going
    #[default]
    Skip,
    /// Stop the batch and return the error
    Abort,
}

/// Batch orchestration options
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Directory for per-game CSV files (None = keep results in memory only)
    pub results_dir: Option<PathBuf>,
    /// Whether to run games in parallel
    pub parallel: bool,
    /// Policy for games that fail to finish
    pub on_game_error: GameErrorPolicy,
    /// Wait before the single retry of a failed save
    pub save_retry_backoff: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            results_dir: None,
            parallel: false,
            on_game_error: GameErrorPolicy::Skip,
            save_retry_backoff: Duration::from_millis(100),
        }
    }
}

impl BatchOptions {
    /// Persist each game under `dir`
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_policy(mut self, policy: GameErrorPolicy) -> Self {
        self.on_game_error = policy;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.save_retry_backoff = backoff;
        self
    }
}

/// Options for generating a batch of random game configs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Number of games to generate
    pub num_games: usize,
    /// Fewest players per game
    pub min_players: usize,
    /// Most players per game
    pub max_players: usize,
    /// Colors to seat, taken in order
    pub palette: Vec<Color>,
    /// Agent types drawn for each seat
    pub agent_kinds: Vec<AgentKind>,
    /// Seed for the generation stream
    pub seed: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_games: 10,
            min_players: 2,
            max_players: 4,
            palette: Color::ALL.to_vec(),
            agent_kinds: AgentKind::ALL.to_vec(),
            seed: 42,
        }
    }
}

impl GenerateOptions {
    /// Create options for `num_games` games
    pub fn new(num_games: usize) -> Self {
        Self {
            num_games,
            ..Default::default()
        }
    }

    /// Set the generation seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Restrict the player count range
    pub fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    /// Restrict the agent types drawn
    pub fn with_agent_kinds(mut self, kinds: Vec<AgentKind>) -> Self {
        self.agent_kinds = kinds;
        self
    }

    /// Load a batch plan from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options = serde_json::from_str(&content)?;
        Ok(options)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
