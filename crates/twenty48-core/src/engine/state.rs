use rand::Rng;
use std::fmt;

use super::ops;
use serde::{Deserialize, Serialize};

// Internal type aliases for packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
pub(crate) type Tile = u64;

/// Merge score gained by a move.
pub type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in a fixed order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

/// Outcome of a single slide/merge: the resulting board, whether anything
/// moved, and the merge score gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftResult {
    pub board: Board,
    pub changed: bool,
    pub score_delta: Score,
}

/// Packed 4x4 2048 board as 16 4-bit nibbles in a `u64`.
///
/// Each nibble holds the log2 of the tile value (0 = empty cell), row-major
/// with the top-left cell in the most significant nibble. Public methods
/// provide ergonomic, safe operations while preserving an escape hatch to
/// the raw packed representation for advanced use.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Construct a `Board` from a grid of actual tile values (0 = empty).
    ///
    /// Every non-zero value must be a power of two in `2..=32768`.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::from_grid([[2, 0, 2, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn from_grid(grid: [[u32; 4]; 4]) -> Self {
        let mut raw: BoardRaw = 0;
        for row in grid.iter() {
            for &val in row.iter() {
                debug_assert!(
                    val == 0 || (val.is_power_of_two() && (2..=32768).contains(&val)),
                    "tile value {val} is not a power of two in range"
                );
                let exp = if val == 0 { 0 } else { val.trailing_zeros() as u64 };
                raw = (raw << 4) | exp;
            }
        }
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// Example
    /// ```
    /// use twenty48_core::engine::{self as GameEngine, Board, Move};
    /// GameEngine::new();
    /// let b = Board::EMPTY;
    /// let _ = b.shift(Move::Left);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        ops::shift(self, dir)
    }

    /// Slide/merge in `dir`, also reporting whether the board changed and the
    /// merge score gained by this move.
    ///
    /// ```
    /// use twenty48_core::engine::{self as GameEngine, Board, Move};
    /// GameEngine::new();
    /// let b = Board::from_grid([[2, 0, 2, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    /// let res = b.shift_with_score(Move::Left);
    /// assert!(res.changed);
    /// assert_eq!(res.score_delta, 4);
    /// ```
    #[inline]
    pub fn shift_with_score(self, dir: Move) -> ShiftResult {
        ops::shift_with_score(self, dir)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot,
    /// using the provided RNG. Returns `None` if the board is full.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).unwrap();
    /// assert_eq!(b.count_empty(), 15);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Option<Self> {
        let empty = ops::count_empty(self);
        if empty == 0 {
            return None;
        }
        let mut index = rng.gen_range(0..empty);
        let mut tmp = self.0;
        let mut tile = ops::generate_random_tile(rng);
        loop {
            while (tmp & 0xf) != 0 {
                tmp >>= 4;
                tile <<= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp >>= 4;
            tile <<= 4;
        }
        Some(Board(self.0 | tile))
    }

    /// True iff the board is full and no shift in any direction changes it.
    #[inline]
    pub fn is_terminal(self) -> bool {
        ops::is_terminal(self)
    }

    /// True iff a tile of exactly `value` is present anywhere on the board.
    #[inline]
    pub fn contains_tile(self, value: u32) -> bool {
        ops::contains_tile(self, value)
    }

    /// Return the highest tile value (e.g., 2048) present on the board.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::get_highest_tile_val(self)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        ops::count_empty(self)
    }

    /// Get the actual value at index (0 if empty).
    ///
    /// Index runs 0..16 row-major.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        ops::get_tile_val(self, idx)
    }

    /// Iterate over tile exponents (nibbles) in row-major order.
    /// Returns 0 for empty, 1 for 2, 2 for 4, etc.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter { raw: self.0, idx: 0 }
    }

    /// Convenience: collect tile exponents into a `Vec<u8>`.
    #[inline]
    pub fn to_vec(self) -> Vec<u8> {
        self.tiles().collect()
    }

    /// Snapshot the board as a grid of actual tile values (0 = empty).
    pub fn to_grid(self) -> [[u32; 4]; 4] {
        let mut grid = [[0u32; 4]; 4];
        for (idx, exp) in self.tiles().enumerate() {
            grid[idx / 4][idx % 4] = if exp == 0 { 0 } else { 1 << exp };
        }
        grid
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board: Vec<_> = self.tiles().map(|n| super::ops::format_val(&n)).collect();
        write!(
            f,
            "\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n",
            board[0],
            board[1],
            board[2],
            board[3],
            board[4],
            board[5],
            board[6],
            board[7],
            board[8],
            board[9],
            board[10],
            board[11],
            board[12],
            board[13],
            board[14],
            board[15]
        )
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}
impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.into_raw()
    }
}

/// Iterator over board tiles (exponents) in row-major order.
pub struct TilesIter {
    pub raw: BoardRaw,
    pub idx: usize,
}

impl Iterator for TilesIter {
    type Item = u8;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= 16 {
            return None;
        }
        let n = ((self.raw >> (60 - (4 * self.idx))) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

impl IntoIterator for &Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}
