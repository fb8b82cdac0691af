//! Play command - one recorded game between listed agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: seat_players(), play_game(), report_game()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tradesim_core::{Agent, AgentKind, Color, Observer, TradingEngine};
use tradesim_harness::{ActionTally, GameResult, GameRunner, DEFAULT_MAX_ACTIONS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Agents in seat order (comma-separated: random, hoarder)
    #[arg(long, value_delimiter = ',', default_value = "random,hoarder")]
    pub agents: Vec<String>,

    /// Action ceiling for the game
    #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
    pub max_actions: u64,

    /// Write the turn table to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(crate::random_seed);
    tracing::info!("Playing {} agents with seed {}", args.agents.len(), seed);
    let mut players = seat_players(&args.agents, seed)?;

    let (result, tally) = play_game(&mut players, seed, args.max_actions)?;

    if let Some(path) = &args.csv {
        std::fs::write(path, result.to_table().to_csv())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {} rows to {}", result.rows().len(), path.display());
    }

    report_game(&result, &tally);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Bind each named agent to the next color, seeding each from `seed`
fn seat_players(names: &[String], seed: u64) -> Result<Vec<Box<dyn Agent>>> {
    if names.len() > Color::ALL.len() {
        bail!("At most {} agents can be seated", Color::ALL.len());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    names
        .iter()
        .zip(Color::ALL)
        .map(|(name, color)| {
            let kind = AgentKind::parse(name.trim())
                .with_context(|| format!("Unknown agent type: {}", name))?;
            Ok(kind.build(color, rng.gen()))
        })
        .collect()
}

fn play_game(
    players: &mut [Box<dyn Agent>],
    seed: u64,
    max_actions: u64,
) -> Result<(GameResult, ActionTally)> {
    let runner = GameRunner::new(TradingEngine::default()).with_max_actions(max_actions);
    let mut tally = ActionTally::new();
    let mut observers: [&mut dyn Observer; 1] = [&mut tally];

    let result = runner.run("game", players, seed, &mut observers)?;
    Ok((result, tally))
}

fn report_game(result: &GameResult, tally: &ActionTally) {
    println!("\n=== Game Result ===");
    println!("Players:  {}", result.num_players());
    println!("Actions:  {}", result.total_turns());
    match result.winner() {
        Some(color) => println!(
            "Winner:   {} ({})",
            color,
            result.winner_label().unwrap_or("unknown")
        ),
        None => println!("Winner:   none"),
    }

    if let Some(last) = result.rows().last() {
        println!("\nStanding before the final action:");
        for player in &last.players {
            println!(
                "  {:<7} {:<22} {:>2} VP  {} roads, {} settlements, {} cities",
                player.color.as_str(),
                player.agent,
                player.victory_points,
                player.structures.roads,
                player.structures.settlements,
                player.structures.cities
            );
        }
    }

    println!("\nActions by color:");
    for (color, counts) in tally.counts() {
        let line: Vec<String> = counts
            .iter()
            .map(|(label, n)| format!("{}={}", label, n))
            .collect();
        println!("  {:<7} {}", color.as_str(), line.join(" "));
    }
}

// ============================================================================
// TESTS
// ============================================================================
