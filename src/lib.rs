//! twenty48-core: the 2048 game core — grid engine, tile spawner, and
//! game-over detection.
//!
//! This crate provides:
//! - A compact `Board` type with ergonomic methods (`shift`, `slide`,
//!   `spawn_tiles`, `is_game_over`, ...) over a packed 4x4 representation
//! - A caller-owned `Game` session tracking score, best score, and phase,
//!   reporting every turn as plain data for renderer/persistence/audio
//!   collaborators to react to
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
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let out = b0.slide(Move::Left);
//! assert_eq!(out.changed, out.board != b0);
//! ```
//!
//! Note: For convenience, there are also free functions mirroring the `Board`
//! methods (e.g., `engine::shift`, `engine::slide`). Prefer the `Game`
//! session for whole-game flow: it owns the RNG, so equal seeds replay
//! identical games.
//!
//! Full loop (simplest possible)
//! ```
//! use twenty48_core::engine::Move;
//! use twenty48_core::game::{Game, Phase};
//!
//! // 1) Start a session and spawn the two opening tiles
//! let mut game = Game::new(123);
//! let spawned = game.reset();
//! assert_eq!(spawned.len(), 2);
//!
//! // 2) Loop a couple of moves to demonstrate flow (keep doctests fast)
//! let mut turns = 0u32;
//! for step in 0..8 {
//!     if game.phase() != Phase::Playing {
//!         break;
//!     }
//!     let report = game.step(Move::ALL[step % 4]);
//!     if report.changed {
//!         turns += 1;
//!     }
//! }
//!
//! // 3) Inspect final state (score, highest tile, etc.)
//! assert!(turns > 0);
//! let _score = game.score();
//! let _snapshot = game.rows();
//! ```
pub mod engine;
pub mod game;
