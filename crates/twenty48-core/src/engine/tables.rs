use std::sync::OnceLock;

use super::state::Score;

/// Precomputed lookup tables for all possible 4-tile lines (16-bit packed).
///
/// Why: shifting/merging a row or column depends only on its 4 nibbles.
/// There are 2^16 possible 16-bit values. We precompute the result of
/// shifting left/right/up/down and the merge score gained for each line.
/// This keeps moves branch-light and fast at runtime.
///
/// Layout:
/// - `shift_left/right/up/down[i]`: replacement 16-bit line after applying the move.
/// - `move_score[i]`: sum of doubled values produced by the line's merges
///   (identical toward either end, so one table covers all four moves).
///
/// Access is via `stores()` which lazily initializes a single global `Stores`
/// on first use. The public `engine::new()` simply forces init early.
pub(crate) struct Stores {
    pub(crate) shift_left: Box<[u64]>,
    pub(crate) shift_right: Box<[u64]>,
    pub(crate) shift_up: Box<[u64]>,
    pub(crate) shift_down: Box<[u64]>,
    pub(crate) move_score: Box<[Score]>,
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub fn init() {
    let _ = STORES.get_or_init(create_stores);
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES
        .get()
        .expect("Engine stores not initialized; call engine::new() first")
}

fn create_stores() -> Stores {
    // Allocate on the heap to keep stack frames small during init.
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut move_score = vec![0u64; LINE_TABLE_SIZE];

    let mut val: usize = 0;
    while val < LINE_TABLE_SIZE {
        let line = val as u64;
        shift_left[val] = super::ops::shift_line(line, super::state::Move::Left);
        shift_right[val] = super::ops::shift_line(line, super::state::Move::Right);
        shift_up[val] = super::ops::shift_line(line, super::state::Move::Up);
        shift_down[val] = super::ops::shift_line(line, super::state::Move::Down);
        move_score[val] = super::ops::line_merge_score(line);
        val += 1;
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        move_score: move_score.into_boxed_slice(),
    }
}

#[inline(always)]
pub(crate) fn get_line_entry(table: &[u64], idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}

#[inline(always)]
pub(crate) fn get_score_entry(idx: u16) -> Score {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    let score_table = &stores().move_score;
    unsafe { *score_table.get_unchecked(idx as usize) }
}
