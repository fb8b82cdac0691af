//! TRADESIM CLI - Command-line interface
//!
//! Commands:
//! - batch: Generate and play a batch of games, writing turn-level CSVs
//! - play: Play a single game and print its action breakdown

mod batch_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tradesim")]
#[command(about = "TRADESIM batch simulation harness")]
struct Cli {
    /// Seed for reproducible runs (random if omitted; a batch plan keeps its own seed)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and play a batch of games
    Batch(batch_cmd::BatchArgs),
    /// Play a single game
    Play(play_cmd::PlayArgs),
}

/// Fresh seed from OS entropy, used when `--seed` is omitted
pub(crate) fn random_seed() -> u64 {
    ChaCha8Rng::from_entropy().gen()
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Batch(args) => batch_cmd::run(args, cli.seed),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
    }
}
