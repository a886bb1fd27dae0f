use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use twenty48_core::engine::{self as GameEngine, Move};
use twenty48_core::game::{Game, Phase};

#[derive(Parser, Debug)]
#[command(
    name = "twenty48",
    version,
    about = "Play headless 2048 games with a random-legal-move policy"
)]
struct Cli {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u32,

    /// Base RNG seed; game g plays with seed + g
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Show a progress bar across games
    #[arg(long)]
    progress: bool,

    /// Write per-game summaries as JSON
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,

    /// Print the board after every accepted move
    #[arg(long)]
    print_boards: bool,
}

#[derive(Debug, Serialize)]
struct GameSummary {
    game: u32,
    seed: u64,
    steps: u64,
    score: u64,
    highest_tile: u16,
}

/// Pick uniformly among the directions that would change the board.
fn random_legal_move<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> Option<Move> {
    let legal = game.legal_moves();
    let n = legal.iter().filter(|&&l| l).count();
    if n == 0 {
        return None;
    }
    let pick = rng.gen_range(0..n);
    Move::ALL
        .iter()
        .zip(legal)
        .filter(|(_, l)| *l)
        .nth(pick)
        .map(|(&m, _)| m)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    GameEngine::new();

    let pb = if cli.progress {
        let pb = ProgressBar::new(cli.games as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})",
            )
            .unwrap()
            .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut policy_rng = StdRng::seed_from_u64(cli.seed.wrapping_mul(0x9e37_79b9));
    let mut best = 0u64;
    let mut summaries = Vec::with_capacity(cli.games as usize);

    for g in 0..cli.games {
        let game_seed = cli.seed + g as u64;
        let mut game = Game::new(game_seed).with_best_score(best);
        game.reset();

        let mut steps = 0u64;
        while game.phase() == Phase::Playing {
            let Some(dir) = random_legal_move(&game, &mut policy_rng) else {
                break;
            };
            let report = game.step(dir);
            if report.changed {
                steps += 1;
            }
            if let Some(b) = report.best_score_updated {
                best = b;
            }
            if cli.print_boards && report.changed {
                println!("{}", game.board());
            }
        }

        let summary = GameSummary {
            game: g,
            seed: game_seed,
            steps,
            score: game.score(),
            highest_tile: game.board().highest_tile(),
        };
        info!(
            "game {}: seed={} steps={} score={} highest={}",
            summary.game, summary.seed, summary.steps, summary.score, summary.highest_tile
        );
        summaries.push(summary);
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("played games");
    }

    if let Some(path) = &cli.results {
        let json = serde_json::to_string_pretty(&summaries)?;
        fs::write(path, json).with_context(|| format!("writing results to {}", path.display()))?;
        info!("wrote {} summaries to {}", summaries.len(), path.display());
    }

    info!("played {} games; best score {}", cli.games, best);
    Ok(())
}
