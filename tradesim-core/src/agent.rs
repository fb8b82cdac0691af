//! Scripted agents
//!
//! An agent is bound to one color and picks one action from the legal set
//! each time it is asked. Agents own their random stream, so a game replays
//! identically from the same seed.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{Action, ActionKind};
use crate::resources::Color;
use crate::state::StateQuery;

/// Decision-making capability bound to one color
pub trait Agent: Send {
    /// Color this agent plays
    fn color(&self) -> Color;

    /// Agent type label recorded alongside each game
    fn label(&self) -> &str;

    /// Pick one element of `legal` (never empty)
    fn decide(&mut self, state: &dyn StateQuery, legal: &[Action]) -> Action;
}

// ============================================================================
// AGENT KINDS
// ============================================================================

/// Built-in agent types, used when generating batches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Uniform random choice
    Random,
    /// Settlements first, then roads, otherwise random
    ResourceHoarder,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Random, AgentKind::ResourceHoarder];

    pub fn label(self) -> &'static str {
        match self {
            AgentKind::Random => "RandomPlayer",
            AgentKind::ResourceHoarder => "ResourceHoarderPlayer",
        }
    }

    /// Parse from a label or short name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "random" | "randomplayer" => Some(AgentKind::Random),
            "hoarder" | "resourcehoarder" | "resourcehoarderplayer" => {
                Some(AgentKind::ResourceHoarder)
            }
            _ => None,
        }
    }

    /// Create a fresh agent of this kind
    pub fn build(self, color: Color, seed: u64) -> Box<dyn Agent> {
        match self {
            AgentKind::Random => Box::new(RandomAgent::new(color, seed)),
            AgentKind::ResourceHoarder => Box::new(ResourceHoarderAgent::new(color, seed)),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

/// Picks uniformly among legal actions
pub struct RandomAgent {
    color: Color,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(color: Color, seed: u64) -> Self {
        Self {
            color,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn color(&self) -> Color {
        self.color
    }

    fn label(&self) -> &str {
        AgentKind::Random.label()
    }

    fn decide(&mut self, _state: &dyn StateQuery, legal: &[Action]) -> Action {
        pick_random(&mut self.rng, self.color, legal)
    }
}

/// Builds a settlement whenever it can, else a road, else plays randomly
pub struct ResourceHoarderAgent {
    color: Color,
    rng: ChaCha8Rng,
}

impl ResourceHoarderAgent {
    pub fn new(color: Color, seed: u64) -> Self {
        Self {
            color,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for ResourceHoarderAgent {
    fn color(&self) -> Color {
        self.color
    }

    fn label(&self) -> &str {
        AgentKind::ResourceHoarder.label()
    }

    fn decide(&mut self, _state: &dyn StateQuery, legal: &[Action]) -> Action {
        let preferred = [ActionKind::BuildSettlement, ActionKind::BuildRoad];
        for kind in preferred {
            if let Some(action) = legal.iter().find(|a| a.kind == kind) {
                return *action;
            }
        }
        pick_random(&mut self.rng, self.color, legal)
    }
}

fn pick_random(rng: &mut ChaCha8Rng, color: Color, legal: &[Action]) -> Action {
    // Engines never ask with an empty set; fall back to ending the turn.
    match legal.choose(rng) {
        Some(action) => *action,
        None => Action::new(color, ActionKind::EndTurn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_actions(color: Color) -> Vec<Action> {
        vec![
            Action::new(color, ActionKind::EndTurn),
            Action::new(color, ActionKind::BuildRoad),
            Action::new(color, ActionKind::BuyDevelopmentCard),
        ]
    }

    struct NullState;

    impl StateQuery for NullState {
        fn colors(&self) -> &[Color] {
            &[]
        }
        fn current_color(&self) -> Color {
            Color::Red
        }
        fn victory_points(&self, _: Color) -> u32 {
            0
        }
        fn structures(&self, _: Color) -> crate::StructureCounts {
            Default::default()
        }
        fn resources(&self, _: Color) -> crate::ResourceCounts {
            Default::default()
        }
        fn dev_cards(&self, _: Color) -> crate::DevCardCounts {
            Default::default()
        }
        fn bank(&self) -> crate::ResourceCounts {
            Default::default()
        }
        fn num_actions(&self) -> u64 {
            0
        }
        fn num_turns(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_random_agent_picks_legal_action() {
        let legal = sample_actions(Color::Blue);
        let mut agent = RandomAgent::new(Color::Blue, 7);
        for _ in 0..20 {
            let chosen = agent.decide(&NullState, &legal);
            assert!(legal.contains(&chosen));
        }
    }

    #[test]
    fn test_random_agent_is_seeded() {
        let legal = sample_actions(Color::Red);
        let mut a = RandomAgent::new(Color::Red, 99);
        let mut b = RandomAgent::new(Color::Red, 99);
        let picks_a: Vec<_> = (0..10).map(|_| a.decide(&NullState, &legal)).collect();
        let picks_b: Vec<_> = (0..10).map(|_| b.decide(&NullState, &legal)).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn test_hoarder_prefers_settlement_then_road() {
        let mut agent = ResourceHoarderAgent::new(Color::Orange, 1);
        let mut legal = sample_actions(Color::Orange);
        assert_eq!(agent.decide(&NullState, &legal).kind, ActionKind::BuildRoad);

        legal.push(Action::new(Color::Orange, ActionKind::BuildSettlement));
        assert_eq!(agent.decide(&NullState, &legal).kind, ActionKind::BuildSettlement);
    }

    #[test]
    fn test_agent_kind_parse_and_build() {
        assert_eq!(AgentKind::parse("random"), Some(AgentKind::Random));
        assert_eq!(AgentKind::parse("Hoarder"), Some(AgentKind::ResourceHoarder));
        assert_eq!(AgentKind::parse("alphabeta"), None);

        let agent = AgentKind::ResourceHoarder.build(Color::White, 3);
        assert_eq!(agent.color(), Color::White);
        assert_eq!(agent.label(), "ResourceHoarderPlayer");
    }
}
