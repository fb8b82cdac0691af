//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use tradesim_core::{Agent, Color, Engine, EngineError, Observer, ObserverError};

use crate::error::{ConfigurationError, HarnessError, Result};
use crate::recorder::TurnRecorder;
use crate::result::GameResult;
use crate::schema::Schema;

/// Default per-game action ceiling
pub const DEFAULT_MAX_ACTIONS: u64 = 20_000;

/// Game runner that plays one game to completion and packages its rows
pub struct GameRunner<E: Engine> {
    /// Engine the games are played on
    engine: E,
    /// Actions allowed before a game is declared non-terminating
    max_actions: u64,
}

impl<E: Engine> GameRunner<E> {
    /// Create a new game runner with the default action ceiling
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }

    /// Set the per-game action ceiling
    pub fn with_max_actions(mut self, max_actions: u64) -> Self {
        self.max_actions = max_actions;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn max_actions(&self) -> u64 {
        self.max_actions
    }

    /// Play a single game, returning its recorded rows and metadata
    ///
    /// A fresh [`TurnRecorder`] is attached ahead of `extra_observers`. A game
    /// that does not finish produces no result; the error carries the number
    /// of rows recorded before it stopped.
    pub fn run(
        &self,
        game_id: &str,
        players: &mut [Box<dyn Agent>],
        seed: u64,
        extra_observers: &mut [&mut dyn Observer],
    ) -> Result<GameResult> {
        let colors: Vec<Color> = players.iter().map(|p| p.color()).collect();
        let agent_labels: BTreeMap<Color, String> = players
            .iter()
            .map(|p| (p.color(), p.label().to_string()))
            .collect();

        check_seating(game_id, &colors, &self.engine.player_range())?;
        let mut state = self
            .engine
            .new_game(&colors, seed)
            .map_err(|e| execution_error(game_id, 0, e))?;

        let schema = Schema::for_colors(&colors);
        let mut recorder = TurnRecorder::new(schema.clone(), agent_labels.clone());

        let played = {
            let mut observers: Vec<&mut dyn Observer> = Vec::with_capacity(1 + extra_observers.len());
            observers.push(&mut recorder);
            for observer in extra_observers.iter_mut() {
                observers.push(&mut **observer);
            }
            self.engine
                .play_with_observers(&mut state, players, &mut observers, self.max_actions)
        };

        let outcome = match played {
            Ok(outcome) => outcome,
            Err(error) => {
                let partial_rows = recorder.rows().len();
                tracing::warn!(
                    "Game {} stopped after {} recorded rows: {}",
                    game_id,
                    partial_rows,
                    error
                );
                return Err(execution_error(game_id, partial_rows, error));
            }
        };

        recorder
            .check_complete(outcome.actions_applied)
            .map_err(|source| HarnessError::ObserverOrder {
                game_id: game_id.to_string(),
                source,
            })?;
        let total_turns = outcome.actions_applied;

        if let Some(winner) = outcome.winner.filter(|c| !colors.contains(c)) {
            return Err(HarnessError::GameExecution {
                game_id: game_id.to_string(),
                partial_rows: recorder.rows().len(),
                source: EngineError::InvalidAction(format!("winner {} is not seated", winner)),
            });
        }

        tracing::debug!(
            "Game {} finished: winner={:?}, {} actions",
            game_id,
            outcome.winner,
            total_turns
        );

        Ok(GameResult::new(
            game_id.to_string(),
            schema,
            agent_labels,
            recorder.into_rows(),
            outcome.winner,
            total_turns,
        ))
    }
}

/// Check a seating against the engine's supported range
pub(crate) fn check_seating(
    game_id: &str,
    colors: &[Color],
    range: &RangeInclusive<usize>,
) -> std::result::Result<(), ConfigurationError> {
    if colors.is_empty() {
        return Err(ConfigurationError::EmptyPlayers(game_id.to_string()));
    }
    if !range.contains(&colors.len()) {
        return Err(ConfigurationError::PlayerCount {
            game_id: game_id.to_string(),
            count: colors.len(),
            min: *range.start(),
            max: *range.end(),
        });
    }
    for (i, color) in colors.iter().enumerate() {
        if colors[..i].contains(color) {
            return Err(ConfigurationError::DuplicateColor {
                game_id: game_id.to_string(),
                color: *color,
            });
        }
    }
    Ok(())
}

/// Map a play-loop failure onto the error taxonomy
fn execution_error(game_id: &str, partial_rows: usize, error: EngineError) -> HarnessError {
    match error {
        EngineError::Observer(source @ ObserverError::OutOfOrder { .. }) => {
            HarnessError::ObserverOrder {
                game_id: game_id.to_string(),
                source,
            }
        }
        source => HarnessError::GameExecution {
            game_id: game_id.to_string(),
            partial_rows,
            source,
        },
    }
}
