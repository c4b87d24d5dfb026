//! Headless demo runner (default binary).
//!
//! Sets up a board, autoplays hint moves with the instant presenter and prints
//! the board after every move, as text rows or JSON snapshots.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tile_cascade::core::BoardConfig;
use tile_cascade::engine::{InstantPresenter, MatchBoard, SwapOutcome};

/// Autoplay a tile-matching board and print every step.
#[derive(Debug, Parser)]
#[command(name = "tile-cascade", version, about)]
struct Args {
    /// RNG seed; the same seed replays the same game
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Number of moves to autoplay
    #[arg(short, long, default_value_t = 10)]
    moves: u32,

    /// Board config JSON (defaults plus CASCADE_* environment overrides if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print JSON snapshots instead of text rows
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => BoardConfig::from_json_file(path)?.with_env_overrides(),
        None => BoardConfig::from_env(),
    };
    config.validate().context("board config rejected")?;

    let mut board = MatchBoard::new(config, args.seed, InstantPresenter::new());
    board.setup();
    print_board(&board, args.json, "start")?;

    for turn in 1..=args.moves {
        if board.is_game_over() {
            break;
        }
        let Some(mv) = board.hint() else {
            println!("no moves left after {} turns", turn - 1);
            break;
        };

        board.presenter_mut().clear_log();
        match board.submit_swap(mv).await {
            Ok(SwapOutcome::Resolved { points, report, .. }) => {
                let label = format!(
                    "move {} {}->{}: +{} (chain x{}, shuffles {})",
                    turn, mv.clicked, mv.target, points, report.max_multiplier, report.shuffles
                );
                print_board(&board, args.json, &label)?;
            }
            Ok(SwapOutcome::Reverted) => {
                println!("move {} {}->{} reverted", turn, mv.clicked, mv.target);
            }
            Err(reason) => {
                println!("move {} rejected: {}", turn, reason);
                break;
            }
        }
    }

    let stats = board.stats();
    println!(
        "score {} after {} moves ({} pieces cleared, best chain x{})",
        stats.score, stats.moves, stats.pieces_cleared, stats.best_chain
    );
    if let Some(goal) = board.goal() {
        let verdict = if board.is_winner() {
            "won"
        } else if goal.is_game_over() {
            "lost"
        } else {
            "in progress"
        };
        println!(
            "level {} with {} stars, {} moves left",
            verdict,
            goal.stars(),
            goal.moves_left()
        );
    }
    Ok(())
}

fn print_board(board: &MatchBoard<InstantPresenter>, json: bool, label: &str) -> Result<()> {
    if json {
        println!("{}", board.snapshot().to_json()?);
    } else {
        println!("{}", label);
        for row in board.grid().to_rows() {
            println!("  {}", row);
        }
    }
    Ok(())
}
