//! Turn recorder - snapshots derived state before every action
//!
//! Level 3 - Step-level implementation

use std::collections::BTreeMap;

use tradesim_core::{Action, Color, Observer, ObserverError, StateQuery};

use crate::schema::{PlayerMetrics, Schema, TurnRow};

const UNKNOWN_AGENT: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    AwaitingStart,
    Recording,
    Finished,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::AwaitingStart => "awaiting game start",
            Phase::Recording => "recording",
            Phase::Finished => "finished",
        }
    }
}

/// Observer that appends one [`TurnRow`] per applied action
///
/// Hooks must arrive as `on_game_start`, any number of `on_before_action`,
/// then `on_game_end`. Anything else is rejected with
/// [`ObserverError::OutOfOrder`] rather than producing a malformed table.
#[derive(Debug)]
pub struct TurnRecorder {
    schema: Schema,
    agent_labels: BTreeMap<Color, String>,
    phase: Phase,
    colors: Vec<Color>,
    rows: Vec<TurnRow>,
    turn: u64,
    final_turn_count: Option<u64>,
}

impl TurnRecorder {
    /// Create a recorder for a game laid out by `schema`
    pub fn new(schema: Schema, agent_labels: BTreeMap<Color, String>) -> Self {
        Self {
            schema,
            agent_labels,
            phase: Phase::AwaitingStart,
            colors: Vec::new(),
            rows: Vec::new(),
            turn: 0,
            final_turn_count: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Colors captured at game start
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn agent_labels(&self) -> &BTreeMap<Color, String> {
        &self.agent_labels
    }

    pub fn rows(&self) -> &[TurnRow] {
        &self.rows
    }

    /// Row count recorded at game end (None until then)
    pub fn final_turn_count(&self) -> Option<u64> {
        self.final_turn_count
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Confirm the game ended cleanly with one row per applied action
    pub fn check_complete(&self, actions_applied: u64) -> Result<(), ObserverError> {
        if self.phase != Phase::Finished {
            return Err(ObserverError::OutOfOrder {
                hook: "on_game_end",
                phase: self.phase.describe(),
            });
        }
        if self.rows.len() as u64 != actions_applied {
            return Err(ObserverError::Failed(format!(
                "recorded {} rows for {} applied actions",
                self.rows.len(),
                actions_applied
            )));
        }
        Ok(())
    }

    pub fn into_rows(self) -> Vec<TurnRow> {
        self.rows
    }

    fn expect_phase(&self, hook: &'static str, expected: Phase) -> Result<(), ObserverError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ObserverError::OutOfOrder {
                hook,
                phase: self.phase.describe(),
            })
        }
    }

    fn label(&self, color: Color) -> &str {
        self.agent_labels
            .get(&color)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_AGENT)
    }
}

impl Observer for TurnRecorder {
    fn on_game_start(&mut self, state: &dyn StateQuery) -> Result<(), ObserverError> {
        self.expect_phase("on_game_start", Phase::AwaitingStart)?;

        if state.colors() != self.schema.colors() {
            return Err(ObserverError::Failed(format!(
                "seated colors {:?} do not match schema colors {:?}",
                state.colors(),
                self.schema.colors()
            )));
        }

        self.colors = state.colors().to_vec();
        self.turn = 0;
        self.phase = Phase::Recording;
        Ok(())
    }

    fn on_before_action(
        &mut self,
        state: &dyn StateQuery,
        _action: &Action,
    ) -> Result<(), ObserverError> {
        self.expect_phase("on_before_action", Phase::Recording)?;

        let players = self
            .colors
            .iter()
            .map(|&color| PlayerMetrics::capture(state, color, self.label(color)))
            .collect();

        self.rows.push(TurnRow {
            turn: self.turn,
            current_color: state.current_color(),
            num_actions: state.num_actions(),
            bank: state.bank(),
            players,
        });
        self.turn += 1;
        Ok(())
    }

    fn on_game_end(&mut self, _state: &dyn StateQuery) -> Result<(), ObserverError> {
        self.expect_phase("on_game_end", Phase::Recording)?;
        self.final_turn_count = Some(self.turn);
        self.phase = Phase::Finished;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradesim_core::{ActionKind, Engine, TradingEngine, TradingState};

    fn setup() -> (TradingState, TurnRecorder) {
        let colors = [Color::Red, Color::Blue, Color::Orange];
        let state = TradingEngine::default().new_game(&colors, 4).unwrap();
        let labels = colors
            .iter()
            .map(|&c| (c, "RandomPlayer".to_string()))
            .collect();
        (state, TurnRecorder::new(Schema::for_colors(&colors), labels))
    }

    fn roll() -> Action {
        Action::new(Color::Red, ActionKind::RollDice)
    }

    #[test]
    fn test_records_one_row_per_action() {
        let (state, mut recorder) = setup();
        recorder.on_game_start(&state).unwrap();
        for _ in 0..4 {
            recorder.on_before_action(&state, &roll()).unwrap();
        }
        recorder.on_game_end(&state).unwrap();

        let turns: Vec<u64> = recorder.rows().iter().map(|r| r.turn).collect();
        assert_eq!(turns, vec![0, 1, 2, 3]);
        assert_eq!(recorder.final_turn_count(), Some(4));
        assert!(recorder.is_finished());
    }

    #[test]
    fn test_every_color_in_every_row() {
        let (state, mut recorder) = setup();
        recorder.on_game_start(&state).unwrap();
        recorder.on_before_action(&state, &roll()).unwrap();

        let row = &recorder.rows()[0];
        let colors: Vec<Color> = row.players.iter().map(|p| p.color).collect();
        assert_eq!(colors, vec![Color::Red, Color::Blue, Color::Orange]);
        assert_eq!(row.players[1].victory_points, 2);
        assert_eq!(row.players[2].agent, "RandomPlayer");
        assert_eq!(row.cells().len(), recorder.schema().columns().len());
    }

    #[test]
    fn test_before_action_without_start_fails() {
        let (state, mut recorder) = setup();
        let err = recorder.on_before_action(&state, &roll()).unwrap_err();
        assert_eq!(
            err,
            ObserverError::OutOfOrder {
                hook: "on_before_action",
                phase: "awaiting game start"
            }
        );
        assert!(recorder.rows().is_empty());
    }

    #[test]
    fn test_double_start_fails() {
        let (state, mut recorder) = setup();
        recorder.on_game_start(&state).unwrap();
        assert!(matches!(
            recorder.on_game_start(&state),
            Err(ObserverError::OutOfOrder { hook: "on_game_start", .. })
        ));
    }

    #[test]
    fn test_no_rows_after_end() {
        let (state, mut recorder) = setup();
        recorder.on_game_start(&state).unwrap();
        recorder.on_game_end(&state).unwrap();
        assert!(recorder.on_before_action(&state, &roll()).is_err());
        assert!(recorder.on_game_end(&state).is_err());
        assert_eq!(recorder.final_turn_count(), Some(0));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let (state, _) = setup();
        let mut recorder = TurnRecorder::new(
            Schema::for_colors(&[Color::Red, Color::Blue]),
            BTreeMap::new(),
        );
        assert!(matches!(
            recorder.on_game_start(&state),
            Err(ObserverError::Failed(_))
        ));
    }

    #[test]
    fn test_missing_label_is_unknown() {
        let colors = [Color::Red, Color::Blue];
        let state = TradingEngine::default().new_game(&colors, 1).unwrap();
        let mut recorder = TurnRecorder::new(Schema::for_colors(&colors), BTreeMap::new());
        recorder.on_game_start(&state).unwrap();
        recorder.on_before_action(&state, &roll()).unwrap();
        assert_eq!(recorder.rows()[0].players[0].agent, "unknown");
    }

    #[test]
    fn test_check_complete_requires_finished_game() {
        let (state, mut recorder) = setup();
        assert!(matches!(
            recorder.check_complete(0),
            Err(ObserverError::OutOfOrder { hook: "on_game_end", .. })
        ));

        recorder.on_game_start(&state).unwrap();
        recorder.on_before_action(&state, &roll()).unwrap();
        assert!(recorder.check_complete(1).is_err());

        recorder.on_game_end(&state).unwrap();
        assert!(recorder.check_complete(1).is_ok());
        assert!(matches!(
            recorder.check_complete(2),
            Err(ObserverError::Failed(_))
        ));
    }
}
