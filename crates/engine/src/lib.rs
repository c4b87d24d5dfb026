//! Async cascade engine
//!
//! Drives the pure rules in `tile-cascade-core` through their animated
//! lifecycle: a swap is validated, animated and resolved by the
//! [`CascadeResolver`], which suspends only while pieces are in flight
//! ([`barrier::await_arrival`]) and between steps ([`barrier::pace`]).
//!
//! Everything runs on a single task; `MatchBoard::submit_swap` takes
//! `&mut self`, so only one resolution can touch the grid at a time.
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::{BoardConfig, Timing};
//! use tile_cascade_engine::{InstantPresenter, MatchBoard, SwapOutcome};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let config = BoardConfig { timing: Timing::instant(), ..BoardConfig::default() };
//! let mut board = MatchBoard::new(config, 7, InstantPresenter::new());
//! board.setup();
//!
//! let mv = board.hint().expect("fresh boards always have a move");
//! let outcome = board.submit_swap(mv).await.unwrap();
//! assert!(matches!(outcome, SwapOutcome::Resolved { .. }));
//! # });
//! ```

pub mod barrier;
pub mod board;
pub mod cascade;
pub mod hint;
pub mod presenter;

pub use board::{MatchBoard, SwapOutcome};
pub use cascade::{CascadeReport, CascadeResolver, Phase};
pub use hint::find_swap;
pub use presenter::{CellEvent, InstantPresenter, MoveCommand, Presenter, TweenPresenter};
