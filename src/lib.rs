//! Tile cascade (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so integration tests, benches
//! and the demo binary can use `tile_cascade::{core, engine, types}`.

pub use tile_cascade_core as core;
pub use tile_cascade_engine as engine;
pub use tile_cascade_types as types;
