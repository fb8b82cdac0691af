//! Read-only state query interface
//!
//! Observers and agents only ever see game state through this trait.

use crate::resources::{Color, DevCardCounts, ResourceCounts, StructureCounts};

/// Derived-state queries exposed by an engine's game state
pub trait StateQuery {
    /// Seated colors in turn order
    fn colors(&self) -> &[Color];

    /// Color whose agent decides the next action
    fn current_color(&self) -> Color;

    fn victory_points(&self, color: Color) -> u32;

    fn structures(&self, color: Color) -> StructureCounts;

    fn resources(&self, color: Color) -> ResourceCounts;

    fn dev_cards(&self, color: Color) -> DevCardCounts;

    /// Resources left in the bank
    fn bank(&self) -> ResourceCounts;

    /// Actions applied so far
    fn num_actions(&self) -> u64;

    /// Completed turns (end-of-turn count)
    fn num_turns(&self) -> u64;
}
