//! Scoring module - per-piece awards handed to the scoring collaborator
//!
//! Points for one cleared piece are `score_value * multiplier + bonus`, where the
//! multiplier counts the settle steps of the current cascade (starting at 1) and
//! the bonus is `CLEAR_BONUS` when the batch reaches `BONUS_BATCH_SIZE` pieces.

use serde::Serialize;

use crate::types::{MatchColor, Piece, PieceId, BONUS_BATCH_SIZE, CLEAR_BONUS};

/// Award for one cleared piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreAward {
    pub piece: PieceId,
    /// Color of a cleared ordinary piece; `None` for bombs and blockers
    pub color: MatchColor,
    pub score_value: u32,
    pub multiplier: u32,
    pub bonus: u32,
}

impl ScoreAward {
    pub fn new(piece: &Piece, multiplier: u32, batch_size: usize) -> Self {
        Self {
            piece: piece.id,
            color: if piece.is_normal() {
                piece.color
            } else {
                MatchColor::None
            },
            score_value: piece.score_value,
            multiplier,
            bonus: clear_bonus(batch_size),
        }
    }

    pub fn points(&self) -> u64 {
        u64::from(self.score_value) * u64::from(self.multiplier) + u64::from(self.bonus)
    }
}

/// Bonus per piece for a clear batch of `batch_size`
pub fn clear_bonus(batch_size: usize) -> u32 {
    if batch_size >= BONUS_BATCH_SIZE {
        CLEAR_BONUS
    } else {
        0
    }
}

/// Running totals kept by the board facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBoard {
    pub score: u64,
    pub moves: u32,
    pub pieces_cleared: u32,
    /// Highest multiplier reached in any cascade
    pub best_chain: u32,
}

impl ScoreBoard {
    pub fn record(&mut self, award: &ScoreAward) {
        self.score += award.points();
        self.pieces_cleared = self.pieces_cleared.saturating_add(1);
        self.best_chain = self.best_chain.max(award.multiplier);
    }

    pub fn count_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }
}
