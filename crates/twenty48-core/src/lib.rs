//! twenty48-core: the 2048 grid engine
//!
//! This crate provides a compact `Board` type for the 4x4 sliding-tile game:
//! - table-driven slide/merge for all four directions (`shift`,
//!   `shift_with_score`)
//! - random tile spawning with an injected RNG (`with_random_tile`)
//! - terminal detection (`is_terminal`) and win lookup (`contains_tile`)
//!
//! Quick start:
//! ```
//! use twenty48_core::engine::{self as GameEngine, Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // One-time table init
//! GameEngine::new();
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY
//!     .with_random_tile(&mut rng)
//!     .unwrap()
//!     .with_random_tile(&mut rng)
//!     .unwrap();
//! let shifted = b0.shift_with_score(Move::Left);
//! assert!(shifted.board.count_empty() >= 14);
//! ```
pub mod engine;

pub use engine::{Board, Move, ShiftResult};
