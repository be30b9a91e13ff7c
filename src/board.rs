use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A cell coordinate on the board.
///
/// Components are signed so that stepping one cell past the edge is
/// representable; [`Board::is_within`] decides whether such a position is
/// actually on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighboring position one cell along `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All four directions, for exhaustive scans.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit delta `(dx, dy)` for this direction. `Up` decreases `y`.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

/// Arena identifier for a tile.
///
/// `merged_from` refers to consumed tiles by id only, so the relation never
/// implies ownership.
pub type TileId = u32;

/// A single numbered piece occupying one board cell.
///
/// A tile is owned by exactly one cell at a time; moving it means taking it
/// out of its old cell and inserting it into a new one. `previous_position`
/// and `merged_from` are per-move metadata for consumers such as renderers:
/// `merged_from` names the two tiles consumed to produce this tile during the
/// current move and is reset at the start of the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
    pub position: Position,
    pub previous_position: Option<Position>,
    pub merged_from: Option<[TileId; 2]>,
}

impl Tile {
    pub fn new(id: TileId, position: Position, value: u32) -> Self {
        Tile {
            id,
            value,
            position,
            previous_position: None,
            merged_from: None,
        }
    }

    /// The tile produced by merging `a` and `b`, placed at `position`.
    pub(crate) fn merged(id: TileId, position: Position, a: &Tile, b: &Tile) -> Self {
        Tile {
            id,
            value: a.value + b.value,
            position,
            previous_position: None,
            merged_from: Some([a.id, b.id]),
        }
    }

    /// Record the current position so consumers can interpolate the move.
    #[inline]
    pub fn save_position(&mut self) {
        self.previous_position = Some(self.position);
    }
}

/// A W×H grid of cells, each holding at most one [`Tile`].
///
/// Dimensions are fixed for the lifetime of the board. Cells are stored
/// row-major; every stored tile's `position` matches the cell that owns it.
///
/// Example
/// ```
/// use grid_2048::{Board, Position, Tile};
///
/// let mut board = Board::new(4, 4);
/// assert!(board.insert(Tile::new(0, Position::new(1, 2), 2)));
/// assert!(!board.insert(Tile::new(1, Position::new(1, 2), 4))); // occupied
/// assert_eq!(board.get(Position::new(1, 2)).map(|t| t.value), Some(2));
/// assert_eq!(board.get(Position::new(9, 9)), None); // out of bounds
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Option<Tile>>,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Board {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn index(&self, position: Position) -> usize {
        position.y as usize * self.width as usize + position.x as usize
    }

    /// Replace every cell with "no tile".
    pub fn empty(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Bounds predicate.
    #[inline]
    pub fn is_within(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    /// The tile at `position`, or `None` when the cell is empty *or* the
    /// position is out of bounds. Callers that need to tell the two apart
    /// check [`Board::is_within`] separately.
    pub fn get(&self, position: Position) -> Option<&Tile> {
        if !self.is_within(position) {
            return None;
        }
        self.cells[self.index(position)].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, position: Position) -> bool {
        self.get(position).is_none()
    }

    #[inline]
    pub fn is_filled(&self, position: Position) -> bool {
        self.get(position).is_some()
    }

    /// Insert `tile` at its own `position`.
    ///
    /// Fails when the position is out of bounds or the cell is occupied.
    pub fn insert(&mut self, tile: Tile) -> bool {
        if !self.is_within(tile.position) || self.is_filled(tile.position) {
            return false;
        }
        let idx = self.index(tile.position);
        self.cells[idx] = Some(tile);
        true
    }

    /// Remove and return the tile at `position`.
    ///
    /// `None` when the position is out of bounds or the cell is empty.
    pub fn take(&mut self, position: Position) -> Option<Tile> {
        if !self.is_within(position) {
            return None;
        }
        let idx = self.index(position);
        self.cells[idx].take()
    }

    /// Boolean view of [`Board::take`].
    pub fn remove(&mut self, position: Position) -> bool {
        self.take(position).is_some()
    }

    /// All tiles currently on the board, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.cells.iter_mut().flatten()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    pub fn has_available_cells(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_none())
    }

    /// Positions of all currently empty cells, in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        let w = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| Position::new((i % w) as i32, (i / w) as i32))
            .collect()
    }

    /// Uniformly select one position among all currently empty cells.
    ///
    /// `None` when the board is full.
    ///
    /// Example
    /// ```
    /// use grid_2048::{Board, Position, Tile};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut board = Board::new(2, 2);
    /// board.insert(Tile::new(0, Position::new(0, 0), 2));
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let cell = board.random_empty_cell(&mut rng).unwrap();
    /// assert!(board.is_empty(cell));
    /// ```
    pub fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let empties = self.empty_positions();
        if empties.is_empty() {
            return None;
        }
        Some(empties[rng.gen_range(0..empties.len())])
    }

    /// The highest tile value present, or 0 for an empty board.
    pub fn highest_tile(&self) -> u32 {
        self.tiles().map(|tile| tile.value).max().unwrap_or(0)
    }

    /// Structural consistency check used when restoring persisted boards:
    /// the cell vector must match the stated dimensions and every stored
    /// tile's `position` must name the cell that owns it.
    pub fn check_integrity(&self) -> Result<(), String> {
        let expected = self.width as usize * self.height as usize;
        if self.cells.len() != expected {
            return Err(format!(
                "cell count {} does not match a {}x{} board",
                self.cells.len(),
                self.width,
                self.height
            ));
        }
        let w = self.width as usize;
        for (i, cell) in self.cells.iter().enumerate() {
            if let Some(tile) = cell {
                let owner = Position::new((i % w) as i32, (i / w) as i32);
                if tile.position != owner {
                    return Err(format!(
                        "tile {} stored at ({}, {}) claims position ({}, {})",
                        tile.id, owner.x, owner.y, tile.position.x, tile.position.y
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                match self.get(Position::new(x, y)) {
                    Some(tile) => write!(f, "[{:^6}]", tile.value)?,
                    None => write!(f, "[{:^6}]", "")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn it_rejects_out_of_bounds_and_occupied_inserts() {
        let mut board = Board::new(4, 4);
        assert!(board.insert(Tile::new(0, Position::new(0, 0), 2)));
        assert!(!board.insert(Tile::new(1, Position::new(0, 0), 2)));
        assert!(!board.insert(Tile::new(2, Position::new(-1, 0), 2)));
        assert!(!board.insert(Tile::new(3, Position::new(4, 0), 2)));
        assert!(!board.insert(Tile::new(4, Position::new(0, 4), 2)));
        assert_eq!(board.tile_count(), 1);
    }

    #[test]
    fn it_takes_and_removes() {
        let mut board = Board::new(4, 4);
        board.insert(Tile::new(7, Position::new(2, 3), 8));
        assert!(board.take(Position::new(-1, 3)).is_none());
        assert!(board.take(Position::new(0, 0)).is_none());
        let tile = board.take(Position::new(2, 3)).unwrap();
        assert_eq!(tile.id, 7);
        assert!(board.is_empty(Position::new(2, 3)));
        assert!(!board.remove(Position::new(2, 3)));
    }

    #[test]
    fn it_never_panics_on_out_of_bounds_get() {
        let board = Board::new(2, 2);
        assert!(board.get(Position::new(-1, -1)).is_none());
        assert!(board.get(Position::new(2, 0)).is_none());
        assert!(board.get(Position::new(0, 2)).is_none());
        assert!(!board.is_within(Position::new(2, 0)));
        assert!(board.is_within(Position::new(1, 1)));
    }

    #[test]
    fn it_enumerates_tiles_row_major() {
        let mut board = Board::new(3, 2);
        board.insert(Tile::new(0, Position::new(2, 1), 2));
        board.insert(Tile::new(1, Position::new(0, 0), 4));
        board.insert(Tile::new(2, Position::new(1, 0), 8));
        let ids: Vec<TileId> = board.tiles().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn it_empties_the_board() {
        let mut board = Board::new(2, 2);
        board.insert(Tile::new(0, Position::new(0, 0), 2));
        board.insert(Tile::new(1, Position::new(1, 1), 4));
        board.empty();
        assert_eq!(board.tile_count(), 0);
        assert_eq!(board.empty_positions().len(), 4);
    }

    #[test]
    fn it_selects_the_only_empty_cell() {
        let mut board = Board::new(2, 2);
        board.insert(Tile::new(0, Position::new(0, 0), 2));
        board.insert(Tile::new(1, Position::new(1, 0), 2));
        board.insert(Tile::new(2, Position::new(0, 1), 2));
        let mut rng = StdRng::seed_from_u64(99);
        assert_eq!(
            board.random_empty_cell(&mut rng),
            Some(Position::new(1, 1))
        );
        board.insert(Tile::new(3, Position::new(1, 1), 2));
        assert_eq!(board.random_empty_cell(&mut rng), None);
        assert!(!board.has_available_cells());
    }

    #[test]
    fn it_reports_highest_tile() {
        let mut board = Board::new(4, 4);
        assert_eq!(board.highest_tile(), 0);
        board.insert(Tile::new(0, Position::new(0, 0), 2));
        board.insert(Tile::new(1, Position::new(1, 0), 64));
        board.insert(Tile::new(2, Position::new(2, 0), 16));
        assert_eq!(board.highest_tile(), 64);
    }

    #[test]
    fn it_catches_position_mismatch_in_integrity_check() {
        let mut board = Board::new(2, 2);
        board.insert(Tile::new(0, Position::new(0, 0), 2));
        assert!(board.check_integrity().is_ok());

        // Corrupt the backing store directly: the tile in cell (1, 0)
        // claims to live at (0, 0).
        board.cells[1] = Some(Tile::new(1, Position::new(0, 0), 4));
        assert!(board.check_integrity().is_err());
    }

    #[test]
    fn it_catches_cell_count_mismatch_in_integrity_check() {
        let mut board = Board::new(2, 2);
        board.cells.push(None);
        assert!(board.check_integrity().is_err());
    }
}
