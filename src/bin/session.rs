use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use grid_2048::{CheckpointStore, Direction, Engine, GameConfig, LocalStore, StorageError};

#[derive(Debug, Parser)]
#[command(
    name = "session",
    about = "Run checkpointed game sessions against a local save directory"
)]
struct Args {
    /// Directory holding per-user save files
    #[arg(long, default_value = "saves")]
    data_dir: PathBuf,

    /// Optional TOML game configuration (ignored when resuming a checkpoint)
    #[arg(long)]
    config: Option<PathBuf>,

    /// User whose checkpoint is loaded and saved
    #[arg(short, long, default_value = "player")]
    user: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Resume (or start) a session, play random moves, save on exit
    Play {
        /// Seed for deterministic play
        #[arg(long)]
        seed: Option<u64>,
        /// Maximum number of moves this session
        #[arg(long, default_value_t = 50)]
        moves: u64,
    },
    /// Print the stored checkpoint
    Show,
    /// Delete the stored checkpoint
    Reset,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut store = LocalStore::open(&args.data_dir);

    match args.cmd {
        Cmd::Play { seed, moves } => play(&args, &mut store, seed, moves),
        Cmd::Show => show(&args, &store),
        Cmd::Reset => {
            match store.delete(&args.user) {
                Ok(()) => println!("deleted checkpoint for `{}`", args.user),
                Err(StorageError::NotFound(_)) => println!("no checkpoint for `{}`", args.user),
                Err(err) => return Err(err.into()),
            }
            Ok(())
        }
    }
}

fn play(args: &Args, store: &mut LocalStore, seed: Option<u64>, moves: u64) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => GameConfig::from_toml(path)?,
        None => GameConfig::default(),
    };
    let mut engine = match seed {
        Some(seed) => Engine::with_seed(config, seed),
        None => Engine::new(config),
    };

    match store.get(&args.user) {
        Ok(Some(checkpoint)) => match engine.load_state(checkpoint) {
            // A finished saved game means this session starts over, keeping
            // the best score.
            Ok(()) => {
                if engine.is_finished() {
                    engine.restart()?;
                }
            }
            Err(err) => {
                warn!("discarding corrupted checkpoint for `{}`: {err}", args.user);
                engine.setup()?;
            }
        },
        Ok(None) => engine.setup()?,
        Err(err) => {
            warn!("discarding unreadable checkpoint for `{}`: {err}", args.user);
            engine.setup()?;
        }
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ 0x5DEE_CE66),
        None => StdRng::from_entropy(),
    };
    for _ in 0..moves {
        if engine.is_finished() {
            break;
        }
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        engine.make_move(direction);
    }

    println!("{}", engine.board());
    println!(
        "score: {}  best: {}  finished: {}",
        engine.score(),
        engine.best(),
        engine.is_finished()
    );
    store.set(&args.user, &engine.save_state())?;
    Ok(())
}

fn show(args: &Args, store: &LocalStore) -> anyhow::Result<()> {
    match store.get(&args.user)? {
        Some(checkpoint) => {
            println!("{}", checkpoint.board);
            println!(
                "score: {}  best: {}  finished: {}",
                checkpoint.score, checkpoint.best, checkpoint.finished
            );
        }
        None => println!("no checkpoint for `{}`", args.user),
    }
    Ok(())
}
