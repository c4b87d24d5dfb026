//! Move hint search

use tracing::instrument;

use tile_cascade_core::{GridState, MatchFinder};
use tile_cascade_types::{Coord, Direction, Move};

/// First swap that produces a match, scanning row-major and trying the right
/// neighbor before the one above. Color bombs always count as a match.
#[instrument(level = "trace", skip(grid), ret)]
pub fn find_swap(grid: &GridState) -> Option<Move> {
    let mut scratch = grid.clone();
    let coords: Vec<Coord> = grid.coords().collect();

    for at in coords {
        for dir in [Direction::RIGHT, Direction::UP] {
            let other = at.offset(dir, 1);
            if grid.piece(at).is_none() || grid.piece(other).is_none() {
                continue;
            }
            if grid.piece(at).is_some_and(|p| p.is_color_bomb())
                || grid.piece(other).is_some_and(|p| p.is_color_bomb())
            {
                return Some(Move::new(at, other));
            }

            scratch.swap(at, other);
            let finder = MatchFinder::new(&scratch);
            let found = finder.has_match(at) || finder.has_match(other);
            scratch.swap(at, other);
            if found {
                return Some(Move::new(at, other));
            }
        }
    }
    None
}
