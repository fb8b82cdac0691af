//! Batch orchestration - many games, one combined result
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::HashSet;

use rayon::prelude::*;
use tradesim_core::{Engine, Observer};

use crate::config::{BatchOptions, GameConfig, GameErrorPolicy};
use crate::error::{ConfigurationError, Result};
use crate::game_runner::{check_seating, GameRunner};
use crate::result::{BatchResult, GameFailure, GameRecord, GameResult};
use crate::sink::{game_file_name, save_with_retry};
use crate::tally::ActionTally;

/// Plays a batch of configured games and gathers their results
pub struct BatchOrchestrator<E: Engine> {
    runner: GameRunner<E>,
    options: BatchOptions,
}

impl<E: Engine> BatchOrchestrator<E> {
    pub fn new(runner: GameRunner<E>, options: BatchOptions) -> Self {
        Self { runner, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn runner(&self) -> &GameRunner<E> {
        &self.runner
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Run every config and return the finished games in config order
    pub fn run_batch(&self, configs: Vec<GameConfig>) -> Result<BatchResult> {
        self.run_batch_with_callback(configs, |_| {})
    }

    /// Like [`run_batch`](Self::run_batch), calling `on_game` as each game finishes
    ///
    /// In parallel mode `on_game` is invoked from worker threads in completion
    /// order.
    pub fn run_batch_with_callback<F>(&self, configs: Vec<GameConfig>, on_game: F) -> Result<BatchResult>
    where
        F: Fn(&GameResult) + Sync,
    {
        self.validate_configs(&configs)?;

        let total = configs.len();
        tracing::info!(
            "Starting batch of {} games ({})",
            total,
            if self.options.parallel { "parallel" } else { "sequential" }
        );

        let batch = if self.options.parallel {
            self.run_parallel(configs, &on_game)?
        } else {
            self.run_sequential(configs, &on_game)?
        };

        tracing::info!(
            "Batch finished: {} of {} games completed, {} failed",
            batch.records.len(),
            total,
            batch.failures.len()
        );
        Ok(batch)
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Reject the whole batch before any game runs
    ///
    /// When results are persisted, ids that sanitize to the same file name
    /// count as duplicates.
    fn validate_configs(&self, configs: &[GameConfig]) -> Result<(), ConfigurationError> {
        let range = self.runner.engine().player_range();
        let persisting = self.options.results_dir.is_some();
        let mut seen = HashSet::with_capacity(configs.len());
        let mut file_names = HashSet::with_capacity(configs.len());
        for config in configs {
            if !seen.insert(config.game_id.as_str())
                || (persisting && !file_names.insert(game_file_name(&config.game_id)))
            {
                return Err(ConfigurationError::DuplicateGameId(config.game_id.clone()));
            }
            check_seating(&config.game_id, &config.colors(), &range)?;
        }
        Ok(())
    }

    fn run_sequential<F>(&self, configs: Vec<GameConfig>, on_game: &F) -> Result<BatchResult>
    where
        F: Fn(&GameResult) + Sync,
    {
        let mut batch = BatchResult::default();
        for config in configs {
            let game_id = config.game_id.clone();
            let outcome = self.play_one(config, on_game);
            self.absorb(&mut batch, game_id, outcome)?;
        }
        Ok(batch)
    }

    /// Games run concurrently; results are folded back in config order
    fn run_parallel<F>(&self, configs: Vec<GameConfig>, on_game: &F) -> Result<BatchResult>
    where
        F: Fn(&GameResult) + Sync,
    {
        let outcomes: Vec<(String, Result<GameRecord>)> = configs
            .into_par_iter()
            .map(|config| {
                let game_id = config.game_id.clone();
                (game_id, self.play_one(config, on_game))
            })
            .collect();

        let mut batch = BatchResult::default();
        for (game_id, outcome) in outcomes {
            self.absorb(&mut batch, game_id, outcome)?;
        }
        Ok(batch)
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    /// Play, report and persist a single game
    fn play_one<F>(&self, mut config: GameConfig, on_game: &F) -> Result<GameRecord>
    where
        F: Fn(&GameResult) + Sync,
    {
        let mut tally = ActionTally::new();
        let mut observers: [&mut dyn Observer; 1] = [&mut tally];
        let result = self.runner.run(
            &config.game_id,
            &mut config.players,
            config.seed,
            &mut observers,
        )?;

        tracing::info!(
            "Game {} complete: {} actions, winner {}",
            result.game_id(),
            result.total_turns(),
            result.winner().map_or("none".to_string(), |c| c.to_string())
        );
        on_game(&result);

        if let Some(dir) = &self.options.results_dir {
            let table = result.to_stamped_table();
            if let Err(e) =
                save_with_retry(&table, result.game_id(), dir, self.options.save_retry_backoff)
            {
                tracing::warn!("Could not save game {}: {}", result.game_id(), e);
            }
        }

        Ok(GameRecord { result, tally })
    }

    /// Fold one game's outcome into the batch, honoring the error policy
    fn absorb(
        &self,
        batch: &mut BatchResult,
        game_id: String,
        outcome: Result<GameRecord>,
    ) -> Result<()> {
        match outcome {
            Ok(record) => batch.records.push(record),
            Err(error) => {
                if error.is_fatal() || self.options.on_game_error == GameErrorPolicy::Abort {
                    tracing::error!("Aborting batch at game {}: {}", game_id, error);
                    return Err(error);
                }
                tracing::warn!("Skipping game {}: {}", game_id, error);
                batch.failures.push(GameFailure { game_id, error });
            }
        }
        Ok(())
    }
}
