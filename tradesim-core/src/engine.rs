//! Engine boundary - the play loop and its observer hooks
//!
//! An [`Engine`] owns the rules; the harness only drives it through the
//! provided [`Engine::play_with_observers`] loop and reads state through
//! [`StateQuery`].

use std::ops::RangeInclusive;

use crate::action::Action;
use crate::agent::Agent;
use crate::resources::Color;
use crate::state::StateQuery;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised by an observer hook
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObserverError {
    #[error("observer hook `{hook}` called while {phase}")]
    OutOfOrder {
        hook: &'static str,
        phase: &'static str,
    },

    #[error("observer failed: {0}")]
    Failed(String),
}

/// Errors raised while setting up or playing a game
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unsupported player count {count} (engine supports {min}..={max})")]
    UnsupportedPlayerCount { count: usize, min: usize, max: usize },

    #[error("no legal actions for {color}")]
    NoLegalActions { color: Color },

    #[error("no agent seated for {color}")]
    MissingAgent { color: Color },

    #[error("agent chose an action outside the legal set: {action:?}")]
    IllegalAction { action: Action },

    #[error("action could not be applied: {0}")]
    InvalidAction(String),

    #[error("no terminal state after {limit} actions")]
    TurnLimitExceeded { limit: u64 },

    #[error(transparent)]
    Observer(#[from] ObserverError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

// ============================================================================
// OBSERVERS
// ============================================================================

/// Hooks invoked by the play loop
///
/// Observers are registered independently and only see the state passed to
/// them; they never read each other.
pub trait Observer {
    /// Called once, before the first action
    fn on_game_start(&mut self, state: &dyn StateQuery) -> Result<(), ObserverError>;

    /// Called with the state as it is immediately before `action` is applied
    fn on_before_action(
        &mut self,
        state: &dyn StateQuery,
        action: &Action,
    ) -> Result<(), ObserverError>;

    /// Called once, after the terminal state is reached
    fn on_game_end(&mut self, state: &dyn StateQuery) -> Result<(), ObserverError>;
}

// ============================================================================
// ENGINE
// ============================================================================

/// Result of a completed play loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayOutcome {
    pub winner: Option<Color>,
    pub actions_applied: u64,
}

/// Game rules consumed by the harness
pub trait Engine: Sync {
    type State: StateQuery + Clone + Send;

    /// Supported number of seated players
    fn player_range(&self) -> RangeInclusive<usize>;

    /// Set up a new game for `colors` (seat order) with its own random stream
    fn new_game(&self, colors: &[Color], seed: u64) -> Result<Self::State>;

    fn legal_actions(&self, state: &Self::State) -> Vec<Action>;

    fn apply_action(&self, state: &mut Self::State, action: &Action) -> Result<()>;

    fn is_terminal(&self, state: &Self::State) -> bool;

    fn winner(&self, state: &Self::State) -> Option<Color>;

    /// Drive `state` to a terminal state, one agent decision per action
    ///
    /// Every observer sees `on_before_action` exactly once per applied
    /// action, with the untouched pre-action state. Stops with
    /// [`EngineError::TurnLimitExceeded`] once `max_actions` actions have
    /// been applied without reaching a terminal state.
    fn play_with_observers(
        &self,
        state: &mut Self::State,
        agents: &mut [Box<dyn Agent>],
        observers: &mut [&mut dyn Observer],
        max_actions: u64,
    ) -> Result<PlayOutcome> {
        for observer in observers.iter_mut() {
            observer.on_game_start(&*state)?;
        }

        let mut applied = 0u64;
        while !self.is_terminal(state) {
            if applied >= max_actions {
                return Err(EngineError::TurnLimitExceeded { limit: max_actions });
            }

            let color = state.current_color();
            let legal = self.legal_actions(state);
            if legal.is_empty() {
                return Err(EngineError::NoLegalActions { color });
            }

            let agent = agents
                .iter_mut()
                .find(|a| a.color() == color)
                .ok_or(EngineError::MissingAgent { color })?;
            let action = agent.decide(&*state, &legal);
            if !legal.contains(&action) {
                return Err(EngineError::IllegalAction { action });
            }

            for observer in observers.iter_mut() {
                observer.on_before_action(&*state, &action)?;
            }
            self.apply_action(state, &action)?;
            applied += 1;
        }

        for observer in observers.iter_mut() {
            observer.on_game_end(&*state)?;
        }

        Ok(PlayOutcome {
            winner: self.winner(state),
            actions_applied: applied,
        })
    }
}

/// Check a player count against an engine's supported range
pub fn check_player_count(range: &RangeInclusive<usize>, count: usize) -> Result<()> {
    if range.contains(&count) {
        Ok(())
    } else {
        Err(EngineError::UnsupportedPlayerCount {
            count,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
