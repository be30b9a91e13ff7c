//! grid-2048: a 2048 board simulation engine with checkpointed sessions.
//!
//! This crate provides:
//! - A [`Board`] of tile entities with cell-level queries, row-major tile
//!   enumeration, and uniform random empty-cell selection (`board` module)
//! - An [`Engine`] implementing the canonical slide/merge move algorithm,
//!   exhaustive terminal-state detection, and the save/restore contract
//!   (`engine` module)
//! - A framed, checksummed checkpoint codec (`checkpoint` module) and a
//!   per-user file store (`storage` module)
//!
//! Quick start:
//! ```
//! use grid_2048::{Direction, Engine, GameConfig};
//!
//! // Deterministic session with a seeded PRNG stream
//! let mut engine = Engine::with_seed(GameConfig::default(), 42);
//! engine.setup().unwrap();
//! engine.make_move(Direction::Left);
//! assert!(engine.board().tile_count() >= 2);
//!
//! // State round-trips through an opaque checkpoint
//! let checkpoint = engine.save_state();
//! let mut restored = Engine::with_seed(GameConfig::default(), 7);
//! restored.load_state(checkpoint).unwrap();
//! assert_eq!(restored.score(), engine.score());
//! ```
//!
//! Note: the engine is single-threaded and synchronous; one engine instance
//! is one logical session. Prefer [`Engine::with_seed`] when you need
//! determinism.

pub mod board;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod storage;

pub use board::{Board, Direction, Position, Tile, TileId};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::{ConfigError, GameConfig};
pub use engine::{Engine, EngineError};
pub use storage::{CheckpointStore, LocalStore, StorageError};
