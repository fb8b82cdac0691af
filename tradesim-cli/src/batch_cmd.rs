//! Batch command - generate rosters, play them, and export turn-level data
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_options(), play_batch(), write_combined(), report_results()
//! - Level 3: progress bar and orchestrator wiring
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use tradesim_core::{AgentKind, TradingEngine};
use tradesim_harness::{
    generate_configs, BatchOptions, BatchOrchestrator, BatchResult, BatchSummary,
    GameErrorPolicy, GameRunner, GenerateOptions, DEFAULT_MAX_ACTIONS,
};

/// Name of the combined table written next to the per-game files
pub const COMBINED_FILE: &str = "combined.csv";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BatchArgs {
    /// Number of games to generate
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Fewest players per game
    #[arg(long, default_value = "2")]
    pub min_players: usize,

    /// Most players per game
    #[arg(long, default_value = "4")]
    pub max_players: usize,

    /// Agent types to draw from (comma-separated: random, hoarder)
    #[arg(long, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Load generation options from a JSON plan instead of the flags above
    #[arg(long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// Results directory for per-game and combined CSV files
    #[arg(long, default_value = "results")]
    pub output: PathBuf,

    /// Run games in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Action ceiling per game
    #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
    pub max_actions: u64,

    /// Stop the batch at the first game that fails to finish
    #[arg(long)]
    pub abort_on_error: bool,

    /// Output summary as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run batch command
///
/// 1. Resolve generation options (plan file or flags)
/// 2. Generate configs and play them
/// 3. Write the combined table
/// 4. Report the summary
pub fn run(args: BatchArgs, seed: Option<u64>) -> Result<()> {
    let options = build_options(&args, seed)?;

    tracing::info!(
        "Starting batch: {} games, {}-{} players, seed {}",
        options.num_games,
        options.min_players,
        options.max_players,
        options.seed
    );

    let batch = play_batch(&options, &args)?;
    let combined = write_combined(&batch, &args.output)?;

    report_results(&batch.summary(), &options, &combined, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Generation options from the plan file or the command-line flags
fn build_options(args: &BatchArgs, seed: Option<u64>) -> Result<GenerateOptions> {
    let mut options = match &args.plan {
        Some(path) => GenerateOptions::load(path)
            .with_context(|| format!("Failed to load batch plan: {}", path.display()))?,
        None => {
            let mut options = GenerateOptions::new(args.games)
                .with_players(args.min_players, args.max_players);
            if !args.agents.is_empty() {
                options = options.with_agent_kinds(parse_agent_kinds(&args.agents)?);
            }
            options.with_seed(crate::random_seed())
        }
    };

    if let Some(seed) = seed {
        options.seed = seed;
    }
    Ok(options)
}

/// Generate the configs and play them with a progress bar
fn play_batch(options: &GenerateOptions, args: &BatchArgs) -> Result<BatchResult> {
    let configs = generate_configs(options).context("Invalid batch options")?;

    let policy = if args.abort_on_error {
        GameErrorPolicy::Abort
    } else {
        GameErrorPolicy::Skip
    };
    let orchestrator = BatchOrchestrator::new(
        GameRunner::new(TradingEngine::default()).with_max_actions(args.max_actions),
        BatchOptions::default()
            .with_results_dir(&args.output)
            .with_parallel(args.parallel)
            .with_policy(policy),
    );

    let progress = create_progress(configs.len() as u64);
    let batch = orchestrator.run_batch_with_callback(configs, |_| progress.inc(1))?;
    progress.finish_and_clear();

    Ok(batch)
}

/// Write the combined table to `<output>/combined.csv`
fn write_combined(batch: &BatchResult, output: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let path = output.join(COMBINED_FILE);
    std::fs::write(&path, batch.to_table().to_csv())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote combined table to {}", path.display());
    Ok(path)
}

/// Report batch results
fn report_results(
    summary: &BatchSummary,
    options: &GenerateOptions,
    combined: &Path,
    json: bool,
) -> Result<()> {
    if json {
        print_json_results(summary, options, combined)?;
    } else {
        print_text_results(summary, combined);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn parse_agent_kinds(names: &[String]) -> Result<Vec<AgentKind>> {
    names
        .iter()
        .map(|name| {
            AgentKind::parse(name.trim())
                .with_context(|| format!("Unknown agent type: {}", name))
        })
        .collect()
}

fn create_progress(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} games ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(summary: &BatchSummary, options: &GenerateOptions, combined: &Path) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        finished_at: chrono::DateTime<chrono::Utc>,
        options: &'a GenerateOptions,
        combined_csv: String,
        summary: &'a BatchSummary,
    }

    let output = JsonOutput {
        finished_at: chrono::Utc::now(),
        options,
        combined_csv: combined.display().to_string(),
        summary,
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize batch summary")?;
    println!("{}", json);
    Ok(())
}

/// Print results as text
fn print_text_results(summary: &BatchSummary, combined: &Path) {
    let total = summary.games_completed + summary.games_failed;

    println!("\n=== Batch Results ===");
    println!("Games:       {} ({} failed)", total, summary.games_failed);
    println!(
        "Draws:       {} ({:.1}%)",
        summary.draws,
        percent(summary.draws as usize, summary.games_completed)
    );
    println!("Mean turns:  {:.1}", summary.mean_turns);

    println!("\nWins by color:");
    for (color, wins) in &summary.wins_by_color {
        println!(
            "  {:<8} {} ({:.1}%)",
            color,
            wins,
            percent(*wins as usize, summary.games_completed)
        );
    }

    println!("\nWins by agent:");
    for (agent, wins) in &summary.wins_by_agent {
        println!("  {:<24} {}", agent, wins);
    }

    if !summary.failures.is_empty() {
        println!("\nFailed games:");
        for (game_id, error) in &summary.failures {
            println!("  {}: {}", game_id, error);
        }
    }

    println!("\nCombined table: {}", combined.display());
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(output: &Path) -> BatchArgs {
        BatchArgs {
            games: 3,
            min_players: 2,
            max_players: 3,
            agents: vec![],
            plan: None,
            output: output.to_path_buf(),
            parallel: false,
            max_actions: 200,
            abort_on_error: false,
            json: false,
        }
    }

    #[test]
    fn test_build_options_from_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path());
        a.agents = vec!["hoarder".to_string()];

        let options = build_options(&a, Some(5)).unwrap();
        assert_eq!(options.num_games, 3);
        assert_eq!(options.max_players, 3);
        assert_eq!(options.seed, 5);
        assert_eq!(options.agent_kinds, vec![AgentKind::ResourceHoarder]);
    }

    #[test]
    fn test_build_options_without_seed_draws_one() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(dir.path());
        let first = build_options(&a, None).unwrap();
        let second = build_options(&a, None).unwrap();
        assert_ne!(first.seed, second.seed);
        assert_eq!(build_options(&a, Some(3)).unwrap().seed, 3);
    }

    #[test]
    fn test_build_options_from_plan() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.json");
        GenerateOptions::new(8).with_seed(1).save(&plan).unwrap();

        let mut a = args(dir.path());
        a.plan = Some(plan);
        let options = build_options(&a, None).unwrap();
        assert_eq!(options.num_games, 8);
        assert_eq!(options.seed, 1);

        let options = build_options(&a, Some(99)).unwrap();
        assert_eq!(options.seed, 99);
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path());
        a.agents = vec!["random".to_string(), "oracle".to_string()];
        assert!(build_options(&a, None).is_err());
    }

    #[test]
    fn test_batch_writes_combined_and_per_game_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let a = args(&output);

        let options = build_options(&a, Some(7)).unwrap();
        let batch = play_batch(&options, &a).unwrap();
        let combined = write_combined(&batch, &output).unwrap();

        assert!(combined.exists());
        let content = std::fs::read_to_string(&combined).unwrap();
        if batch.is_empty() {
            assert!(content.trim().is_empty());
        } else {
            assert!(content.starts_with("Game_ID,"));
        }
        let summary = batch.summary();
        assert_eq!(summary.games_completed + summary.games_failed, 3);

        let csv_files = std::fs::read_dir(&output)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "csv"))
            .count();
        assert_eq!(csv_files, batch.len() + 1);
    }

    #[test]
    fn test_json_report_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let options = GenerateOptions::new(1);
        let summary = BatchResult::default().summary();
        let combined = dir.path().join(COMBINED_FILE);
        assert!(report_results(&summary, &options, &combined, true).is_ok());
        assert!(report_results(&summary, &options, &combined, false).is_ok());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(3, 0), 0.0);
    }
}
