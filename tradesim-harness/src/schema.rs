//! Turn row schema
//!
//! The column layout is derived from the seated colors before a game starts,
//! never from the contents of recorded rows.

use tradesim_core::{
    Color, DevCard, DevCardCounts, Resource, ResourceCounts, StateQuery, StructureCounts,
};

use crate::table::Cell;

/// Bumped whenever the column layout changes
pub const SCHEMA_VERSION: u32 = 1;

/// Metadata columns appended to every row of a finished game
pub const METADATA_COLUMNS: [&str; 3] = ["NUM_PLAYERS", "TOTAL_TURNS", "WINNER"];

/// Column added to every row of a combined batch table
pub const GAME_ID_COLUMN: &str = "Game_ID";

/// Derived metrics for one color at one point in time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerMetrics {
    pub color: Color,
    pub agent: String,
    pub victory_points: u32,
    pub structures: StructureCounts,
    pub resources: ResourceCounts,
    pub dev_cards: DevCardCounts,
}

impl PlayerMetrics {
    /// Read one color's metrics from the state
    pub fn capture(state: &dyn StateQuery, color: Color, agent: &str) -> Self {
        Self {
            color,
            agent: agent.to_string(),
            victory_points: state.victory_points(color),
            structures: state.structures(color),
            resources: state.resources(color),
            dev_cards: state.dev_cards(color),
        }
    }

    fn push_cells(&self, cells: &mut Vec<Cell>) {
        cells.push(Cell::text(self.agent.as_str()));
        cells.push(self.victory_points.into());
        cells.push(self.structures.roads.into());
        cells.push(self.structures.settlements.into());
        cells.push(self.structures.cities.into());
        cells.extend(self.resources.iter().map(|(_, n)| Cell::from(n)));
        cells.extend(self.dev_cards.iter().map(|(_, n)| Cell::from(n)));
    }
}

/// One record per action, captured just before the action is applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnRow {
    /// Contiguous index starting at 0
    pub turn: u64,
    pub current_color: Color,
    /// Engine's cumulative action count
    pub num_actions: u64,
    pub bank: ResourceCounts,
    /// One entry per seated color, in seat order
    pub players: Vec<PlayerMetrics>,
}

impl TurnRow {
    /// Cells in the order given by [`Schema::columns`]
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(8 + self.players.len() * 15);
        cells.push(self.turn.into());
        cells.push(Cell::text(self.current_color.as_str()));
        cells.push(self.num_actions.into());
        cells.extend(self.bank.iter().map(|(_, n)| Cell::from(n)));
        for player in &self.players {
            player.push_cells(&mut cells);
        }
        cells
    }
}

/// Ordered column layout for one game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    colors: Vec<Color>,
    columns: Vec<String>,
}

impl Schema {
    /// Build the layout for the given seat order
    pub fn for_colors(colors: &[Color]) -> Self {
        let mut columns: Vec<String> = vec![
            "TURN".to_string(),
            "CURRENT_COLOR".to_string(),
            "NUM_ACTIONS".to_string(),
        ];
        columns.extend(Resource::ALL.iter().map(|r| format!("BANK_{}", r.as_str())));

        for color in colors {
            let c = color.as_str();
            for field in ["AGENT", "VICTORY_POINTS", "ROADS", "SETTLEMENTS", "CITIES"] {
                columns.push(format!("{}_{}", c, field));
            }
            columns.extend(Resource::ALL.iter().map(|r| format!("{}_{}", c, r.as_str())));
            columns.extend(DevCard::ALL.iter().map(|d| format!("{}_{}", c, d.as_str())));
        }

        Self {
            colors: colors.to_vec(),
            columns,
        }
    }

    pub fn version(&self) -> u32 {
        SCHEMA_VERSION
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Turn row columns (without metadata)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Turn row columns followed by the metadata columns
    pub fn columns_with_metadata(&self) -> Vec<String> {
        self.columns
            .iter()
            .cloned()
            .chain(METADATA_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(colors: &[Color]) -> TurnRow {
        TurnRow {
            turn: 3,
            current_color: colors[0],
            num_actions: 3,
            bank: ResourceCounts::uniform(19),
            players: colors
                .iter()
                .map(|&color| PlayerMetrics {
                    color,
                    agent: "RandomPlayer".to_string(),
                    victory_points: 2,
                    structures: StructureCounts {
                        roads: 2,
                        settlements: 2,
                        cities: 0,
                    },
                    resources: ResourceCounts::of(&[(Resource::Ore, 1)]),
                    dev_cards: DevCardCounts::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_schema_width_matches_row() {
        for n in 2..=4 {
            let colors = &Color::ALL[..n];
            let schema = Schema::for_colors(colors);
            assert_eq!(schema.columns().len(), 8 + 15 * n);
            assert_eq!(sample_row(colors).cells().len(), schema.columns().len());
        }
    }

    #[test]
    fn test_schema_is_deterministic() {
        let colors = [Color::Blue, Color::Red];
        assert_eq!(Schema::for_colors(&colors), Schema::for_colors(&colors));
    }

    #[test]
    fn test_schema_follows_seat_order() {
        let schema = Schema::for_colors(&[Color::Blue, Color::Red]);
        let blue = schema.columns().iter().position(|c| c == "BLUE_VICTORY_POINTS");
        let red = schema.columns().iter().position(|c| c == "RED_VICTORY_POINTS");
        assert!(blue < red);
        assert_eq!(schema.columns()[3], "BANK_WOOD");
    }

    #[test]
    fn test_cells_line_up_with_columns() {
        let colors = [Color::Red, Color::White];
        let schema = Schema::for_colors(&colors);
        let cells = sample_row(&colors).cells();
        let idx = |name: &str| schema.columns().iter().position(|c| c == name).unwrap();

        assert_eq!(cells[idx("TURN")], Cell::Int(3));
        assert_eq!(cells[idx("CURRENT_COLOR")], Cell::text("RED"));
        assert_eq!(cells[idx("WHITE_AGENT")], Cell::text("RandomPlayer"));
        assert_eq!(cells[idx("WHITE_ORE")], Cell::Int(1));
        assert_eq!(cells[idx("RED_SETTLEMENTS")], Cell::Int(2));
        assert_eq!(cells[idx("RED_VICTORY_POINT")], Cell::Int(0));
    }

    #[test]
    fn test_metadata_columns_appended() {
        let schema = Schema::for_colors(&[Color::Red, Color::Blue]);
        let all = schema.columns_with_metadata();
        assert_eq!(all.len(), schema.columns().len() + 3);
        assert_eq!(all.last().map(String::as_str), Some("WINNER"));
    }
}
