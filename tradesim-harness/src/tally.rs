//! Action distribution collector

use std::collections::BTreeMap;

use serde::Serialize;
use tradesim_core::{Action, Color, Observer, ObserverError, StateQuery};

/// Counts applied actions by color and kind for one game
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActionTally {
    counts: BTreeMap<Color, BTreeMap<String, u64>>,
}

impl ActionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-color counts keyed by action label
    pub fn counts(&self) -> &BTreeMap<Color, BTreeMap<String, u64>> {
        &self.counts
    }

    /// Count of one action label for one color
    pub fn count(&self, color: Color, label: &str) -> u64 {
        self.counts
            .get(&color)
            .and_then(|by_kind| by_kind.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// Total actions counted
    pub fn total(&self) -> u64 {
        self.counts.values().flat_map(|m| m.values()).sum()
    }
}

impl Observer for ActionTally {
    fn on_game_start(&mut self, state: &dyn StateQuery) -> Result<(), ObserverError> {
        self.counts = state
            .colors()
            .iter()
            .map(|&c| (c, BTreeMap::new()))
            .collect();
        Ok(())
    }

    fn on_before_action(
        &mut self,
        _state: &dyn StateQuery,
        action: &Action,
    ) -> Result<(), ObserverError> {
        *self
            .counts
            .entry(action.color)
            .or_default()
            .entry(action.kind.label().to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    fn on_game_end(&mut self, _state: &dyn StateQuery) -> Result<(), ObserverError> {
        Ok(())
    }
}
