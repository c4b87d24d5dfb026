//! Shuffle recovery for deadlocked boards
//!
//! Only Normal pieces move. Bombs, blockers and cell kinds stay where they are,
//! so the multiset of ordinary colors is preserved.

use tracing::{debug, warn};

use crate::grid::GridState;
use crate::rng::GameRng;
use crate::types::{Coord, PieceId};

/// One piece relocated by a shuffle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleMove {
    pub piece: PieceId,
    pub from: Coord,
    pub to: Coord,
}

pub struct ShuffleRecovery<'a> {
    grid: &'a mut GridState,
    rng: &'a mut GameRng,
}

impl<'a> ShuffleRecovery<'a> {
    pub fn new(grid: &'a mut GridState, rng: &'a mut GameRng) -> Self {
        Self { grid, rng }
    }

    /// Lift every Normal piece, permute them and put them back into the
    /// vacated cells in row-major order
    pub fn shuffle(&mut self) -> Vec<ShuffleMove> {
        let slots: Vec<Coord> = self
            .grid
            .pieces()
            .filter(|p| p.is_normal())
            .map(|p| p.coord)
            .collect();

        let mut lifted = Vec::with_capacity(slots.len());
        for &slot in &slots {
            if let Some(piece) = self.grid.take(slot) {
                lifted.push(piece);
            }
        }

        self.rng.shuffle(&mut lifted);

        let mut moves = Vec::with_capacity(lifted.len());
        for (piece, &to) in lifted.into_iter().zip(&slots) {
            let from = piece.coord;
            let id = piece.id;
            if let Err(piece) = self.grid.place(to, piece) {
                warn!(piece = piece.id.0, to = %to, "shuffle slot unexpectedly taken");
                continue;
            }
            moves.push(ShuffleMove { piece: id, from, to });
        }

        debug!(pieces = moves.len(), "board shuffled");
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchColor;

    fn color_counts(grid: &GridState) -> Vec<(MatchColor, usize)> {
        let mut counts: Vec<(MatchColor, usize)> = Vec::new();
        for piece in grid.pieces() {
            match counts.iter_mut().find(|(c, _)| *c == piece.color) {
                Some((_, n)) => *n += 1,
                None => counts.push((piece.color, 1)),
            }
        }
        counts.sort();
        counts
    }

    #[test]
    fn test_shuffle_preserves_color_multiset() {
        let mut grid = GridState::from_rows(&["RGB", "GBR", "BRG"]);
        let before = color_counts(&grid);
        let mut rng = GameRng::new(4);
        let moves = ShuffleRecovery::new(&mut grid, &mut rng).shuffle();
        assert_eq!(moves.len(), 9);
        assert_eq!(color_counts(&grid), before);
        for c in grid.coords() {
            assert_eq!(grid.piece(c).map(|p| p.coord), Some(c));
        }
    }

    #[test]
    fn test_shuffle_leaves_special_pieces_and_holes() {
        let mut grid = GridState::from_rows(&["RX#", "GB."]);
        let blocker = grid.piece(Coord::new(1, 1)).map(|p| p.id);
        let mut rng = GameRng::new(1);
        ShuffleRecovery::new(&mut grid, &mut rng).shuffle();

        assert_eq!(grid.piece(Coord::new(1, 1)).map(|p| p.id), blocker);
        assert!(grid.is_obstacle(Coord::new(2, 1)));
        assert!(grid.piece(Coord::new(2, 0)).is_none());
        assert_eq!(grid.piece_count(), 4);
    }

    #[test]
    fn test_shuffle_deterministic_for_seed() {
        let mut a = GridState::from_rows(&["RGBY", "OPTR"]);
        let mut b = a.clone();
        ShuffleRecovery::new(&mut a, &mut GameRng::new(77)).shuffle();
        ShuffleRecovery::new(&mut b, &mut GameRng::new(77)).shuffle();
        assert_eq!(a, b);
    }
}
