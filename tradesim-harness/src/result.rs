//! Game and batch results
//!
//! Level 4 - Result types

use std::collections::BTreeMap;

use serde::Serialize;
use tradesim_core::Color;

use crate::error::HarnessError;
use crate::schema::{Schema, TurnRow, GAME_ID_COLUMN};
use crate::table::{Cell, Table};
use crate::tally::ActionTally;

/// Rows and metadata of one finished game (immutable once built)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    game_id: String,
    schema: Schema,
    agent_labels: BTreeMap<Color, String>,
    rows: Vec<TurnRow>,
    winner: Option<Color>,
    total_turns: u64,
}

impl GameResult {
    pub(crate) fn new(
        game_id: String,
        schema: Schema,
        agent_labels: BTreeMap<Color, String>,
        rows: Vec<TurnRow>,
        winner: Option<Color>,
        total_turns: u64,
    ) -> Self {
        Self {
            game_id,
            schema,
            agent_labels,
            rows,
            winner,
            total_turns,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Seated colors in order
    pub fn colors(&self) -> &[Color] {
        self.schema.colors()
    }

    pub fn agent_labels(&self) -> &BTreeMap<Color, String> {
        &self.agent_labels
    }

    /// Agent label of the winner, if any
    pub fn winner_label(&self) -> Option<&str> {
        self.winner
            .and_then(|c| self.agent_labels.get(&c))
            .map(String::as_str)
    }

    pub fn rows(&self) -> &[TurnRow] {
        &self.rows
    }

    /// Winning color, or None for a draw
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Actions applied during the game
    pub fn total_turns(&self) -> u64 {
        self.total_turns
    }

    pub fn num_players(&self) -> usize {
        self.schema.colors().len()
    }

    /// Rows with the metadata columns appended to each
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.schema.columns_with_metadata());
        let winner = match self.winner {
            Some(color) => Cell::text(color.as_str()),
            None => Cell::Empty,
        };
        for row in &self.rows {
            let mut cells = row.cells();
            cells.push(self.num_players().into());
            cells.push(self.total_turns.into());
            cells.push(winner.clone());
            table.push_row(cells);
        }
        table
    }

    /// Table with the game id stamped in front of every row
    pub fn to_stamped_table(&self) -> Table {
        let mut table = self.to_table();
        table.prepend_column(GAME_ID_COLUMN, Cell::text(self.game_id.as_str()));
        table
    }
}

/// A finished game plus its per-game statistics
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub result: GameResult,
    pub tally: ActionTally,
}

/// A game that produced no result
#[derive(Debug)]
pub struct GameFailure {
    pub game_id: String,
    pub error: HarnessError,
}

/// All finished games of a batch, in config order
#[derive(Debug, Default)]
pub struct BatchResult {
    pub records: Vec<GameRecord>,
    pub failures: Vec<GameFailure>,
}

impl BatchResult {
    pub fn games(&self) -> impl Iterator<Item = &GameResult> {
        self.records.iter().map(|r| &r.result)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Combined table: game order, then turn order, with a `Game_ID` column
    pub fn to_table(&self) -> Table {
        let tables: Vec<Table> = self.games().map(GameResult::to_stamped_table).collect();
        Table::concat(&tables)
    }

    /// Aggregate statistics across the batch
    pub fn summary(&self) -> BatchSummary {
        let mut wins_by_color: BTreeMap<String, u32> = BTreeMap::new();
        let mut wins_by_agent: BTreeMap<String, u32> = BTreeMap::new();
        let mut draws = 0;
        let mut total_turns = 0u64;

        for game in self.games() {
            total_turns += game.total_turns();
            match game.winner() {
                Some(color) => {
                    *wins_by_color.entry(color.to_string()).or_insert(0) += 1;
                    if let Some(label) = game.winner_label() {
                        *wins_by_agent.entry(label.to_string()).or_insert(0) += 1;
                    }
                }
                None => draws += 1,
            }
        }

        let mean_turns = if self.records.is_empty() {
            0.0
        } else {
            total_turns as f64 / self.records.len() as f64
        };

        BatchSummary {
            games_completed: self.records.len(),
            games_failed: self.failures.len(),
            draws,
            wins_by_color,
            wins_by_agent,
            mean_turns,
            failures: self
                .failures
                .iter()
                .map(|f| (f.game_id.clone(), f.error.to_string()))
                .collect(),
        }
    }
}

/// Serializable overview of a batch
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchSummary {
    pub games_completed: usize,
    pub games_failed: usize,
    pub draws: u32,
    pub wins_by_color: BTreeMap<String, u32>,
    pub wins_by_agent: BTreeMap<String, u32>,
    pub mean_turns: f64,
    pub failures: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PlayerMetrics;
    use tradesim_core::{DevCardCounts, ResourceCounts, StructureCounts};

    fn game(id: &str, colors: &[Color], turns: u64, winner: Option<Color>) -> GameResult {
        let labels: BTreeMap<Color, String> = colors
            .iter()
            .map(|&c| (c, format!("{}-bot", c.as_str().to_lowercase())))
            .collect();
        let rows = (0..turns)
            .map(|t| TurnRow {
                turn: t,
                current_color: colors[0],
                num_actions: t,
                bank: ResourceCounts::uniform(19),
                players: colors
                    .iter()
                    .map(|&color| PlayerMetrics {
                        color,
                        agent: labels[&color].clone(),
                        victory_points: 2,
                        structures: StructureCounts::default(),
                        resources: ResourceCounts::default(),
                        dev_cards: DevCardCounts::default(),
                    })
                    .collect(),
            })
            .collect();
        GameResult::new(
            id.to_string(),
            Schema::for_colors(colors),
            labels,
            rows,
            winner,
            turns,
        )
    }

    fn record(result: GameResult) -> GameRecord {
        GameRecord {
            result,
            tally: ActionTally::new(),
        }
    }

    #[test]
    fn test_game_table_has_metadata() {
        let result = game("g", &[Color::Red, Color::Blue], 3, Some(Color::Blue));
        let table = result.to_table();
        assert_eq!(table.len(), 3);
        let winners = table.column("WINNER").unwrap();
        assert!(winners.iter().all(|c| **c == Cell::text("BLUE")));
        let players = table.column("NUM_PLAYERS").unwrap();
        assert!(players.iter().all(|c| **c == Cell::Int(2)));
        let turns = table.column("TOTAL_TURNS").unwrap();
        assert!(turns.iter().all(|c| **c == Cell::Int(3)));
    }

    #[test]
    fn test_draw_has_empty_winner() {
        let result = game("g", &[Color::Red, Color::Blue], 1, None);
        assert_eq!(result.to_table().column("WINNER").unwrap(), vec![&Cell::Empty]);
        assert_eq!(result.winner_label(), None);
    }

    #[test]
    fn test_batch_table_order_and_game_id() {
        let batch = BatchResult {
            records: vec![
                record(game("a", &[Color::Red, Color::Blue], 2, Some(Color::Red))),
                record(game("b", &[Color::Red, Color::Blue, Color::Orange], 3, None)),
                record(game("c", &[Color::Red, Color::Blue], 1, Some(Color::Blue))),
            ],
            failures: vec![],
        };
        let table = batch.to_table();
        assert_eq!(table.columns()[0], GAME_ID_COLUMN);
        let ids: Vec<&str> = table
            .column(GAME_ID_COLUMN)
            .unwrap()
            .into_iter()
            .filter_map(|c| c.as_text())
            .collect();
        assert_eq!(ids, vec!["a", "a", "b", "b", "b", "c"]);

        let orange = table.column("ORANGE_VICTORY_POINTS").unwrap();
        assert_eq!(orange[0], &Cell::Empty);
        assert_eq!(orange[2], &Cell::Int(2));
    }

    #[test]
    fn test_summary() {
        let batch = BatchResult {
            records: vec![
                record(game("a", &[Color::Red, Color::Blue], 2, Some(Color::Red))),
                record(game("b", &[Color::Red, Color::Blue], 4, Some(Color::Red))),
                record(game("c", &[Color::Red, Color::Blue], 3, None)),
            ],
            failures: vec![],
        };
        let summary = batch.summary();
        assert_eq!(summary.games_completed, 3);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.wins_by_color.get("RED"), Some(&2));
        assert_eq!(summary.wins_by_agent.get("red-bot"), Some(&2));
        assert!((summary.mean_turns - 3.0).abs() < 1e-9);
    }
}
