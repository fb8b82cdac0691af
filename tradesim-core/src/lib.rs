//! TRADESIM Core - Engine boundary and reference game
//!
//! This crate provides what the simulation harness consumes:
//! - Player identities, resources and development cards
//! - Actions and the read-only state query interface
//! - The agent capability and two scripted agents
//! - The engine trait, its play loop and observer hooks
//! - A compact reference trading engine

pub mod resources;
pub mod action;
pub mod state;
pub mod agent;
pub mod engine;
pub mod trading;

// Re-exports for convenient access
pub use resources::{Color, DevCard, DevCardCounts, Resource, ResourceCounts, StructureCounts};
pub use action::{Action, ActionKind};
pub use state::StateQuery;
pub use agent::{Agent, AgentKind, RandomAgent, ResourceHoarderAgent};
pub use engine::{check_player_count, Engine, EngineError, Observer, ObserverError, PlayOutcome};
pub use trading::{TradingEngine, TradingRules, TradingState};
