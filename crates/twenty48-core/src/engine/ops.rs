use rand::Rng;

use super::state::{Board, BoardRaw, Line, Move, Score, ShiftResult, Tile};
use super::tables::{get_line_entry, get_score_entry, stores};

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: Board, direction: Move) -> Board {
    match direction {
        Move::Left | Move::Right => shift_rows(board, direction),
        Move::Up | Move::Down => shift_cols(board, direction),
    }
}

/// Slide/merge tiles in the given direction, reporting whether the board
/// changed and the merge score gained by this move.
pub fn shift_with_score(board: Board, direction: Move) -> ShiftResult {
    let shifted = shift(board, direction);
    ShiftResult {
        board: shifted,
        changed: shifted != board,
        score_delta: move_gain(board, direction),
    }
}

/// Sum of doubled values produced by the merges of this move.
///
/// The gain of sliding a line is the same toward either end (merges pair up
/// within runs of equal tiles), so one per-line table serves all four
/// directions.
fn move_gain(board: Board, direction: Move) -> Score {
    let packed = match direction {
        Move::Left | Move::Right => board.0,
        Move::Up | Move::Down => transpose(board.0),
    };
    (0..4).fold(0, |acc, idx| {
        acc + get_score_entry(extract_line(packed, idx) as u16)
    })
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Return the cell's actual value (0 if empty), e.g., 2, 4, 8, ...
pub fn get_tile_val(board: Board, idx: usize) -> u32 {
    let raw_val = (board.0 >> (60 - (4 * idx))) & 0xf;
    if raw_val == 0 {
        0
    } else {
        1 << raw_val
    }
}

pub(crate) fn line_to_vec(line: Line) -> Vec<Tile> {
    (0..4).fold(Vec::new(), |mut tiles, tile_idx| {
        tiles.push(line >> ((3 - tile_idx) * 4) & 0xf);
        tiles
    })
}

/// True iff the board is full and no shift in any direction changes it.
///
/// On a full board "no shift changes it" is exactly "no two adjacent cells
/// are equal". The empty-count check answers first on non-full boards.
pub fn is_terminal(board: Board) -> bool {
    if count_empty(board) > 0 {
        return false;
    }
    Move::ALL.iter().all(|&dir| shift(board, dir) == board)
}

/// True iff a tile of exactly `value` is present anywhere on the board.
///
/// `value` must be a power of two >= 2.
pub fn contains_tile(board: Board, value: u32) -> bool {
    debug_assert!(
        value >= 2 && value.is_power_of_two(),
        "tile value {value} is not a power of two"
    );
    let exp = value.trailing_zeros() as u8;
    board.tiles().any(|n| n == exp)
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the number of zero tiles.
pub fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 1 } else { 2 }
}

fn shift_rows(board: Board, move_dir: Move) -> Board {
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Left => &s.shift_left,
        Move::Right => &s.shift_right,
        _ => panic!("Trying to move up or down in shift rows"),
    };
    let res = (0..4).fold(0, |new_board, row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = get_line_entry(table, row_val);
        new_board | (new_row_val << (48 - (16 * row_idx)))
    });
    Board(res)
}

fn shift_cols(board: Board, move_dir: Move) -> Board {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Up => &s.shift_up,
        Move::Down => &s.shift_down,
        _ => panic!("Trying to move left or right in shift cols"),
    };
    let res = (0..4).fold(0, |new_board, col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = get_line_entry(table, col_val);
        new_board | (new_col_val << (12 - (4 * col_idx)))
    });
    Board(res)
}

pub(crate) fn shift_line(line: Line, direction: Move) -> Line {
    let tiles = line_to_vec(line);
    match direction {
        Move::Left | Move::Right => vec_to_row(shift_vec(tiles, direction)),
        Move::Up | Move::Down => vec_to_col(shift_vec(tiles, direction)),
    }
}

/// Merge score gained by sliding `line` toward either end.
pub(crate) fn line_merge_score(line: Line) -> Score {
    slide_vec_left(line_to_vec(line)).1
}

fn vec_to_row(tiles: Vec<Tile>) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn vec_to_col(tiles: Vec<Tile>) -> Line {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

fn shift_vec(vec: Vec<Tile>, direction: Move) -> Vec<Tile> {
    match direction {
        Move::Left | Move::Up => slide_vec_left(vec).0,
        Move::Right | Move::Down => shift_vec_right(vec),
    }
}

fn shift_vec_right(vec: Vec<Tile>) -> Vec<Tile> {
    let rev_vec: Vec<Tile> = vec.into_iter().rev().collect();
    slide_vec_left(rev_vec).0.iter().rev().copied().collect()
}

fn slide_vec_left(mut vec: Vec<Tile>) -> (Vec<Tile>, Score) {
    let mut gained = 0;
    for i in 0..4 {
        gained += slide_slice_left(&mut vec[i..]);
    }
    (vec, gained)
}

/// Pull the first tile of the slice into slot 0, merging it with the next
/// equal tile at most once. Returns the doubled value if a merge happened.
fn slide_slice_left(slice: &mut [Tile]) -> Score {
    let mut acc = 0;
    let mut gained = 0;
    for s in slice.iter_mut() {
        let val = *s;
        if acc != 0 && acc == val {
            *s = 0;
            acc += 1;
            gained = 1 << acc;
            break;
        } else if acc != 0 && val != 0 && acc != val {
            break;
        } else if acc == 0 && val != 0 {
            *s = 0;
            acc = val;
        }
        // continue scan otherwise
    }
    slice[0] = acc;
    gained
}

pub(crate) fn format_val(val: &u8) -> String {
    match val {
        0 => String::from("       "),
        &x => {
            let mut x = (2_i32.pow(x as u32)).to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}

pub fn get_highest_tile_val(board: Board) -> u32 {
    let max_exp = board.tiles().max().expect("board has 16 tiles");
    if max_exp == 0 {
        0
    } else {
        1 << max_exp
    }
}
