//! TRADESIM Harness - batch simulation and turn-level data capture
//!
//! This crate turns many played games into one analysis table:
//! - Turn recording through engine observer hooks
//! - Single-game execution with an action ceiling
//! - Batch orchestration (sequential or parallel) with per-game persistence
//! - Random roster generation with memorable game ids
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: BatchOrchestrator::run_batch (orchestration)
//! - Level 2: validation, sequential and parallel phases
//! - Level 3: GameRunner::run, TurnRecorder hooks, save_table (steps)
//! - Level 4: Table, Schema, configuration, errors

mod batch;
mod config;
mod error;
mod game_runner;
mod generate;
mod recorder;
mod result;
mod schema;
mod sink;
mod table;
mod tally;

pub use batch::BatchOrchestrator;
pub use config::{BatchOptions, GameConfig, GameErrorPolicy, GenerateOptions};
pub use error::{ConfigurationError, HarnessError, Result};
pub use game_runner::{GameRunner, DEFAULT_MAX_ACTIONS};
pub use generate::{game_name, generate_configs};
pub use recorder::TurnRecorder;
pub use result::{BatchResult, BatchSummary, GameFailure, GameRecord, GameResult};
pub use schema::{PlayerMetrics, Schema, TurnRow, GAME_ID_COLUMN, METADATA_COLUMNS, SCHEMA_VERSION};
pub use sink::{game_file_name, save_table, save_with_retry};
pub use table::{Cell, Table};
pub use tally::ActionTally;
