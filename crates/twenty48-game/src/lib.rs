//! twenty48-game: the playable layer around `twenty48-core`.
//!
//! `GameSession` owns the board, the current/best score, and the
//! playing/game-over lifecycle; `store` persists the best score and a history
//! of finished games. The `twenty48` binary wires both to a terminal loop.

pub mod session;
pub mod store;

pub use session::{GameSession, GameState, MoveOutcome};
pub use store::{MemoryStore, RunSummary, ScorePersistence, ScoreStore};
