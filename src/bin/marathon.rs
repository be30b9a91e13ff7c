use std::collections::BTreeMap;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use grid_2048::{Direction, Engine, GameConfig};

#[derive(Debug, Parser)]
#[command(
    name = "marathon",
    about = "Play many random games in parallel and summarize the outcomes"
)]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: u64,

    /// Base seed; game i plays with seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Safety cap on move attempts per game
    #[arg(long, default_value_t = 100_000)]
    max_moves: u64,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

struct Outcome {
    score: u64,
    highest_tile: u32,
    moves: u64,
}

fn main() {
    let args = Args::parse();

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.games)
    };
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} games").expect("static template"));

    let outcomes: Vec<Outcome> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let outcome = play_one(args.seed + i, args.max_moves);
            pb.inc(1);
            outcome
        })
        .collect();
    pb.finish_and_clear();

    let best = outcomes.iter().map(|o| o.score).max().unwrap_or(0);
    let total_score: u64 = outcomes.iter().map(|o| o.score).sum();
    let total_moves: u64 = outcomes.iter().map(|o| o.moves).sum();
    let count = outcomes.len().max(1) as f64;
    let mut tiles: BTreeMap<u32, u64> = BTreeMap::new();
    for outcome in &outcomes {
        *tiles.entry(outcome.highest_tile).or_insert(0) += 1;
    }

    println!(
        "games: {}  best score: {}  mean score: {:.1}  mean moves: {:.1}",
        outcomes.len(),
        best,
        total_score as f64 / count,
        total_moves as f64 / count
    );
    for (tile, games) in tiles {
        println!("  reached {:>6}: {} game(s)", tile, games);
    }
}

fn play_one(seed: u64, max_moves: u64) -> Outcome {
    let mut engine = Engine::with_seed(GameConfig::default(), seed);
    engine
        .setup()
        .expect("default configuration is always satisfiable");
    // Direction picks come from a separate stream so they never perturb the
    // engine's tile draws.
    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(1));

    let mut moves = 0u64;
    let mut attempts = 0u64;
    while !engine.is_finished() && attempts < max_moves {
        attempts += 1;
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        if engine.make_move(direction) {
            moves += 1;
        }
    }

    Outcome {
        score: engine.score(),
        highest_tile: engine.board().highest_tile(),
        moves,
    }
}
