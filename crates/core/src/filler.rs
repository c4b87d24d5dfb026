//! Refill of empty cells
//!
//! Scans bottom-up in row-major order. The top row may spawn blockers; every
//! other spawn is a weighted palette draw that avoids creating a match when it
//! can.

use tracing::{debug, trace};

use crate::config::BoardConfig;
use crate::grid::GridState;
use crate::matcher::MatchFinder;
use crate::rng::GameRng;
use crate::types::{Coord, MatchColor, PieceId, PieceKind, FILL_MAX_ATTEMPTS};

/// A piece the filler put on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillSpawn {
    pub piece: PieceId,
    pub at: Coord,
}

pub struct Filler<'a> {
    grid: &'a mut GridState,
    config: &'a BoardConfig,
    rng: &'a mut GameRng,
}

impl<'a> Filler<'a> {
    pub fn new(grid: &'a mut GridState, config: &'a BoardConfig, rng: &'a mut GameRng) -> Self {
        Self { grid, config, rng }
    }

    /// Fill every vacant cell, returning the spawns in placement order
    pub fn fill(&mut self) -> Vec<FillSpawn> {
        let top = self.grid.height() as i32 - 1;
        let vacant: Vec<Coord> = self
            .grid
            .coords()
            .filter(|&c| self.grid.is_vacant(c))
            .collect();

        let mut spawns = Vec::with_capacity(vacant.len());
        for at in vacant {
            let spawned = if at.y == top && self.should_spawn_blocker() {
                self.spawn_blocker(at)
            } else {
                self.spawn_normal(at)
            };
            if let Some(piece) = spawned {
                spawns.push(FillSpawn { piece, at });
            }
        }
        spawns
    }

    fn should_spawn_blocker(&mut self) -> bool {
        let blockers = &self.config.blockers;
        !blockers.kinds.is_empty()
            && self.grid.blocker_count() < blockers.max_count
            && self.rng.chance(blockers.spawn_chance)
    }

    fn spawn_blocker(&mut self, at: Coord) -> Option<PieceId> {
        let kinds = &self.config.blockers.kinds;
        let traits = kinds[self.rng.next_range(kinds.len())];
        let mut piece = self.grid.mint(MatchColor::None, PieceKind::Blocker(traits));
        piece.score_value = self.config.piece_score;
        let id = piece.id;
        self.grid.place(at, piece).ok()?;
        self.grid.add_blocker();
        trace!(at = %at, "blocker spawned");
        Some(id)
    }

    fn spawn_normal(&mut self, at: Coord) -> Option<PieceId> {
        let weights = self.config.palette_weights();
        let mut attempts = 0;

        loop {
            let idx = self.rng.weighted_index(&weights)?;
            let color = self.config.palette.get(idx)?.color;
            let mut piece = self.grid.mint(color, PieceKind::Normal);
            piece.score_value = self.config.piece_score;
            let id = piece.id;
            self.grid.place(at, piece).ok()?;
            attempts += 1;

            if !MatchFinder::new(self.grid).has_match(at) {
                return Some(id);
            }
            if attempts >= FILL_MAX_ATTEMPTS {
                debug!(at = %at, attempts, "fill exhausted, keeping matching piece");
                return Some(id);
            }
            self.grid.take(at);
        }
    }
}
