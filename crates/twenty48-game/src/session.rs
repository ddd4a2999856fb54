use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use twenty48_core::engine::{self, Board, Move};

use crate::store::{RunSummary, ScorePersistence};

/// Reaching this tile wins the game (informational only; play continues).
pub const WIN_TILE: u32 = 2048;

/// Session lifecycle. Game over is entered at most once per game and left
/// only through `new_game`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    GameOver,
}

/// Outcome of one `apply_move` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    pub game_over: bool,
}

/// One player's game: the board, the current and best score, and the
/// lifecycle state. The board is mutated only through `apply_move` and
/// `new_game`; the best score is re-persisted the moment it increases.
pub struct GameSession {
    board: Board,
    score: u64,
    best: u64,
    steps: u64,
    state: GameState,
    rng: StdRng,
    store: Box<dyn ScorePersistence>,
}

impl GameSession {
    /// Start a session with an entropy-seeded tile sequence.
    pub fn new(store: Box<dyn ScorePersistence>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Start a session with a reproducible tile sequence.
    pub fn seeded(store: Box<dyn ScorePersistence>, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut store: Box<dyn ScorePersistence>, rng: StdRng) -> Self {
        engine::new();
        let best = store.load_best();
        let mut session = Self {
            board: Board::EMPTY,
            score: 0,
            best,
            steps: 0,
            state: GameState::Playing,
            rng,
            store,
        };
        session.new_game();
        session
    }

    /// Reset to a fresh game: empty board, zero score, two spawned tiles.
    pub fn new_game(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.steps = 0;
        self.state = GameState::Playing;
        for _ in 0..2 {
            if let Some(board) = self.board.with_random_tile(&mut self.rng) {
                self.board = board;
            }
        }
    }

    /// Apply one directional move.
    ///
    /// A move that does not change the board spawns nothing and scores
    /// nothing. A changed move accumulates its merge score (raising and
    /// persisting the best score if passed), spawns one random tile, and
    /// ends the game if the board is then full with no merge available.
    pub fn apply_move(&mut self, direction: Move) -> MoveOutcome {
        if self.state != GameState::Playing {
            return MoveOutcome {
                moved: false,
                game_over: self.state == GameState::GameOver,
            };
        }
        let shifted = self.board.shift_with_score(direction);
        if !shifted.changed {
            return MoveOutcome {
                moved: false,
                game_over: false,
            };
        }
        self.board = shifted.board;
        self.steps += 1;
        self.score += shifted.score_delta;
        if self.score > self.best {
            self.best = self.score;
            self.store.save_best(self.best);
        }
        // A changed shift always leaves at least one empty cell behind.
        if let Some(board) = self.board.with_random_tile(&mut self.rng) {
            self.board = board;
        }
        if self.board.is_terminal() {
            self.state = GameState::GameOver;
            self.store.record_run(RunSummary {
                score: self.score,
                highest_tile: self.board.highest_tile(),
                steps: self.steps,
            });
        }
        MoveOutcome {
            moved: true,
            game_over: self.state == GameState::GameOver,
        }
    }

    /// Snapshot of the board as actual tile values (0 = empty).
    pub fn grid(&self) -> [[u32; 4]; 4] {
        self.board.to_grid()
    }

    /// Copy of the board (for rendering).
    pub fn board(&self) -> Board {
        self.board
    }

    /// `(current, best)` scores.
    pub fn scores(&self) -> (u64, u64) {
        (self.score, self.best)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Moves applied in the current game.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// True iff a 2048 tile is on the board. Does not end the game.
    pub fn has_won(&self) -> bool {
        self.board.contains_tile(WIN_TILE)
    }

    /// Finished games from the store, newest first.
    pub fn history(&mut self, limit: usize) -> Vec<RunSummary> {
        self.store.recent_runs(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store handle the test keeps a view into after the session takes the box.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl ScorePersistence for SharedStore {
        fn load_best(&mut self) -> u64 {
            self.0.borrow_mut().load_best()
        }
        fn save_best(&mut self, best: u64) {
            self.0.borrow_mut().save_best(best)
        }
        fn record_run(&mut self, run: RunSummary) {
            self.0.borrow_mut().record_run(run)
        }
        fn recent_runs(&mut self, limit: usize) -> Vec<RunSummary> {
            self.0.borrow_mut().recent_runs(limit)
        }
    }

    fn count_tiles(session: &GameSession) -> usize {
        session
            .grid()
            .iter()
            .flatten()
            .filter(|&&v| v != 0)
            .count()
    }

    #[test]
    fn fresh_game_has_two_tiles_and_zero_score() {
        let session = GameSession::seeded(Box::new(MemoryStore::default()), 3);
        assert_eq!(count_tiles(&session), 2);
        assert_eq!(session.scores(), (0, 0));
        assert_eq!(session.steps(), 0);
        assert_eq!(session.state(), GameState::Playing);
        assert!(!session.has_won());
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let a = GameSession::seeded(Box::new(MemoryStore::default()), 99);
        let b = GameSession::seeded(Box::new(MemoryStore::default()), 99);
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn unchanged_move_spawns_nothing() {
        let mut session = GameSession::seeded(Box::new(MemoryStore::default()), 5);
        session.board = Board::from_grid([
            [2, 4, 8, 16],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let outcome = session.apply_move(Move::Left);
        assert!(!outcome.moved);
        assert!(!outcome.game_over);
        assert_eq!(count_tiles(&session), 4);
        assert_eq!(session.scores().0, 0);
        assert_eq!(session.steps(), 0);
    }

    #[test]
    fn merge_updates_score_and_persists_best() {
        let shared = SharedStore::default();
        let mut session = GameSession::seeded(Box::new(shared.clone()), 5);
        session.board = Board::from_grid([
            [2, 0, 2, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let outcome = session.apply_move(Move::Left);
        assert!(outcome.moved);
        assert!(!outcome.game_over);
        assert_eq!(session.grid()[0][0], 4);
        assert_eq!(session.scores(), (4, 4));
        assert_eq!(session.steps(), 1);
        // merged tile plus the one spawned after the move
        assert_eq!(count_tiles(&session), 2);
        // best was pushed to the store the moment it increased
        assert_eq!(shared.0.borrow_mut().load_best(), 4);
    }

    #[test]
    fn best_from_store_is_not_overwritten_by_lower_scores() {
        let shared = SharedStore::default();
        shared.0.borrow_mut().save_best(500);
        let mut session = GameSession::seeded(Box::new(shared.clone()), 5);
        assert_eq!(session.scores(), (0, 500));
        session.board = Board::from_grid([
            [2, 0, 2, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        session.apply_move(Move::Left);
        assert_eq!(session.scores(), (4, 500));
        assert_eq!(shared.0.borrow_mut().load_best(), 500);
    }

    #[test]
    fn terminal_board_ends_the_game_and_records_the_run() {
        // Only Left/Right change this board (the 2,2 pair in row 0). After
        // the merge the single empty cell is (0,3); whatever spawns there,
        // no adjacent pair remains anywhere.
        let shared = SharedStore::default();
        let mut session = GameSession::seeded(Box::new(shared.clone()), 17);
        session.board = Board::from_grid([
            [2, 2, 8, 16],
            [16, 4, 2, 32],
            [4, 16, 8, 2],
            [2, 4, 2, 8],
        ]);
        let outcome = session.apply_move(Move::Left);
        assert!(outcome.moved);
        assert!(outcome.game_over);
        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.scores().0, 4);

        let runs = session.history(10);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].score, 4);
        assert_eq!(runs[0].highest_tile, 32);
        assert_eq!(runs[0].steps, 1);

        // a finished game rejects further moves
        let after = session.apply_move(Move::Up);
        assert!(!after.moved);
        assert!(after.game_over);

        // and only new_game leaves game over
        session.new_game();
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.scores().0, 0);
        assert_eq!(count_tiles(&session), 2);
    }

    #[test]
    fn reaching_2048_does_not_end_the_game() {
        let mut session = GameSession::seeded(Box::new(MemoryStore::default()), 5);
        session.board = Board::from_grid([
            [2048, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(session.has_won());
        assert_eq!(session.state(), GameState::Playing);

        let outcome = session.apply_move(Move::Right);
        assert!(outcome.moved);
        assert!(!outcome.game_over);
        assert!(session.has_won());
        assert_eq!(session.state(), GameState::Playing);
    }
}
