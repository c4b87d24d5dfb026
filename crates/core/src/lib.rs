//! Core board logic - pure, deterministic and testable
//!
//! This crate holds every rule of the tile-matching board and none of its
//! presentation. Nothing here awaits, renders or sleeps, which makes it:
//!
//! - **Deterministic**: the same seed and moves produce the same board
//! - **Testable**: boards are built from text rows with [`GridState::from_rows`]
//! - **Portable**: the async cascade driver lives in the engine crate
//!
//! # Module Structure
//!
//! - [`grid`]: cells, pieces, blocker counter and pending bombs
//! - [`matcher`]: straight-run match detection
//! - [`bomb`]: bomb classification, areas of effect, color-bomb swaps
//! - [`filler`]: weighted refill of empty cells, blocker spawning
//! - [`deadlock`]: "is there any move left" windows
//! - [`shuffle`]: Fisher-Yates reshuffle of ordinary pieces
//! - [`rng`]: seedable random source
//! - [`config`]: board configuration (JSON + environment overrides)
//! - [`scoring`]: per-piece score awards and running totals
//! - [`goal`]: move/time budgets, score stars and collection targets
//! - [`snapshot`]: serializable read-only board view
//!
//! # Rules
//!
//! - Three or more same-colored pieces in a row or column match
//! - A matched half of a swap with 4+ pieces leaves a bomb in the swapped cell
//! - Cleared columns collapse downward; obstacles are permanent holes
//! - Blockers never match; they clear on row 0 or, if flagged, inside bomb blasts
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::{GridState, MatchFinder};
//! use tile_cascade_core::types::Coord;
//!
//! let grid = GridState::from_rows(&[
//!     "GBY",
//!     "RRR",
//! ]);
//! let matches = MatchFinder::new(&grid).find_all_matches();
//! assert_eq!(matches.len(), 3);
//! assert!(matches.contains(&Coord::new(1, 0)));
//! ```

pub mod bomb;
pub mod config;
pub mod deadlock;
pub mod filler;
pub mod goal;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod shuffle;
pub mod snapshot;

pub use tile_cascade_types as types;

// Re-export commonly used types for convenience
pub use bomb::{color_bomb_swap, is_corner_match, spawn_bomb, BombEngine, BombSpawn, Expansion};
pub use config::{
    BlockerConfig, BoardConfig, BombConfig, ColorBombChain, PaletteEntry, StartingPiece,
    StartingTile, Timing,
};
pub use deadlock::DeadlockDetector;
pub use filler::{FillSpawn, Filler};
pub use goal::{CollectionTarget, GoalConfig, LevelCounter, LevelGoal};
pub use grid::{GridState, TileBreak};
pub use matcher::MatchFinder;
pub use rng::GameRng;
pub use scoring::{clear_bonus, ScoreAward, ScoreBoard};
pub use shuffle::{ShuffleMove, ShuffleRecovery};
pub use snapshot::{BoardSnapshot, CellSnapshot, PieceSnapshot};
