//! The board simulation engine: directional move/merge, random-tile
//! insertion, terminal-state detection, and the save/restore contract.
//!
//! The engine is a pure, synchronous state machine. It owns its [`Board`]
//! and a single seedable PRNG stream; collaborators get read-only access to
//! the board and scores, and the only mutating entry points are the
//! operations below. One engine instance is one logical session.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Direction, Position, Tile, TileId};
use crate::checkpoint::Checkpoint;
use crate::config::GameConfig;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// `setup` could not place the configured number of starting tiles.
    /// Fatal to game start; never retried internally.
    #[error("cannot place {start_tiles} starting tiles on a board with {cells} cells")]
    Configuration { start_tiles: u32, cells: usize },
    /// `load_state` received a structurally inconsistent checkpoint. The
    /// caller decides whether to fall back to a fresh `setup`.
    #[error("corrupted game state: {0}")]
    CorruptedState(String),
}

/// One game session: a board, the accumulated merge total, and the
/// configuration needed to reproduce behavior after reload.
///
/// Example
/// ```
/// use grid_2048::{Direction, Engine, GameConfig};
///
/// let mut engine = Engine::with_seed(GameConfig::default(), 42);
/// engine.setup().unwrap();
/// assert_eq!(engine.board().tile_count(), 2);
///
/// engine.make_move(Direction::Left);
/// assert!(engine.board().tile_count() >= 2);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: GameConfig,
    board: Board,
    score: u64,
    best: u64,
    finished: bool,
    next_tile_id: TileId,
    rng: StdRng,
}

impl Engine {
    /// New engine with an entropy-seeded PRNG stream.
    ///
    /// The board starts empty; call [`Engine::setup`] or
    /// [`Engine::load_state`] before the first move.
    pub fn new(config: GameConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// New engine with a deterministic PRNG stream.
    ///
    /// A fixed seed, `setup`, and a fixed move sequence reproduce the same
    /// board and score on every run.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: GameConfig, rng: StdRng) -> Self {
        Engine {
            config,
            board: Board::new(config.width, config.height),
            score: 0,
            best: 0,
            finished: false,
            next_tile_id: 0,
            rng,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Cumulative value of all merges this game.
    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Highest score reached across restarts of this session.
    #[inline]
    pub fn best(&self) -> u64 {
        self.best
    }

    /// True once a move left the board full with no move available in any
    /// direction. Cleared by `setup`/`restart`.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Clear the board and insert the configured number of starting tiles,
    /// one at a time through the same random-insertion routine used during
    /// play.
    pub fn setup(&mut self) -> Result<(), EngineError> {
        self.score = 0;
        self.finished = false;
        self.board.empty();
        for _ in 0..self.config.start_tiles {
            if !self.insert_random_tile() {
                return Err(EngineError::Configuration {
                    start_tiles: self.config.start_tiles,
                    cells: self.board.cell_count(),
                });
            }
        }
        Ok(())
    }

    /// Promote the best score and start a fresh game on the same board.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.best = self.best.max(self.score);
        self.setup()
    }

    /// Move all tiles in `direction`, merging as the canonical rules allow,
    /// then insert one random tile if anything changed.
    ///
    /// Returns whether the move changed the board. A move that cannot slide
    /// or merge any tile is a no-op: no insertion, no score change.
    pub fn make_move(&mut self, direction: Direction) -> bool {
        self.clear_merge_metadata();

        let mut changed = false;
        // Tiles farther along the direction are processed first so trailing
        // tiles slide into the space they vacate and see fresh occupancy.
        for position in self.traversals(direction) {
            let Some(mut tile) = self.board.take(position) else {
                continue;
            };
            tile.save_position();
            let farthest = self.farthest_position(position, direction);
            if farthest != position {
                changed = true;
            }
            tile.position = farthest;

            // At most one merge per tile per move: the target one cell
            // beyond the slide must hold an equal value and must not itself
            // be the product of a merge this move.
            if let Some(target) = self.merge_target(&tile, direction) {
                if let Some(other) = self.board.take(target) {
                    let merged = Tile::merged(self.allocate_id(), target, &tile, &other);
                    self.score += u64::from(merged.value);
                    self.best = self.best.max(self.score);
                    self.board.insert(merged);
                    changed = true;
                    continue;
                }
            }
            self.board.insert(tile);
        }

        if changed {
            self.insert_random_tile();
            if !self.board.has_available_cells() && !self.moves_available() {
                self.finished = true;
            }
        }
        changed
    }

    /// Exhaustive check for any legal move in any direction.
    ///
    /// This scans every tile four times and is the expensive path; the
    /// engine only consults it when an insertion has just filled the board.
    pub fn moves_available(&self) -> bool {
        for direction in Direction::ALL {
            for tile in self.board.tiles() {
                if self.farthest_position(tile.position, direction) != tile.position {
                    return true;
                }
                if self.merge_target(tile, direction).is_some() {
                    return true;
                }
            }
        }
        false
    }

    /// Snapshot the session without mutating it.
    pub fn save_state(&self) -> Checkpoint {
        Checkpoint {
            config: self.config,
            board: self.board.clone(),
            score: self.score,
            best: self.best,
            finished: self.finished,
        }
    }

    /// Replace board, scores, and configuration from a checkpoint.
    ///
    /// Structurally inconsistent checkpoints are rejected with
    /// [`EngineError::CorruptedState`] and leave the engine untouched.
    pub fn load_state(&mut self, checkpoint: Checkpoint) -> Result<(), EngineError> {
        checkpoint
            .validate()
            .map_err(EngineError::CorruptedState)?;
        let Checkpoint {
            config,
            board,
            score,
            best,
            finished,
        } = checkpoint;
        self.next_tile_id = board.tiles().map(|t| t.id).max().map_or(0, |id| id + 1);
        self.config = config;
        self.board = board;
        self.score = score;
        self.best = best;
        self.finished = finished;
        Ok(())
    }

    fn allocate_id(&mut self) -> TileId {
        let id = self.next_tile_id;
        self.next_tile_id += 1;
        id
    }

    fn clear_merge_metadata(&mut self) {
        for tile in self.board.tiles_mut() {
            tile.merged_from = None;
        }
    }

    /// Board positions ordered so that tiles farther along `direction` come
    /// first: each axis runs descending when its delta is +1.
    fn traversals(&self, direction: Direction) -> Vec<Position> {
        let (dx, dy) = direction.delta();
        let mut xs: Vec<i32> = (0..self.board.width() as i32).collect();
        let mut ys: Vec<i32> = (0..self.board.height() as i32).collect();
        if dx == 1 {
            xs.reverse();
        }
        if dy == 1 {
            ys.reverse();
        }
        let mut positions = Vec::with_capacity(xs.len() * ys.len());
        for &x in &xs {
            for &y in &ys {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// The last empty cell reachable from `start` along `direction` before
    /// the board edge or another tile; `start` itself when the adjacent cell
    /// is already blocked.
    fn farthest_position(&self, start: Position, direction: Direction) -> Position {
        let mut current = start;
        let mut next = current.step(direction);
        while self.board.is_within(next) && self.board.is_empty(next) {
            current = next;
            next = current.step(direction);
        }
        current
    }

    /// The cell one step beyond `tile` holding an equal-valued tile that has
    /// not already been produced by a merge this move.
    fn merge_target(&self, tile: &Tile, direction: Direction) -> Option<Position> {
        let position = tile.position.step(direction);
        match self.board.get(position) {
            Some(candidate)
                if candidate.value == tile.value && candidate.merged_from.is_none() =>
            {
                Some(position)
            }
            _ => None,
        }
    }

    fn random_tile(&mut self) -> Option<Tile> {
        if !self.board.has_available_cells() {
            return None;
        }
        let value = if self.rng.gen_range(0..10) < 9 { 2 } else { 4 };
        let position = self.board.random_empty_cell(&mut self.rng)?;
        Some(Tile::new(self.allocate_id(), position, value))
    }

    fn insert_random_tile(&mut self) -> bool {
        match self.random_tile() {
            Some(tile) => self.board.insert(tile),
            None => false,
        }
    }
}
