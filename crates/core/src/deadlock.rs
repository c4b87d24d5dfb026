//! Deadlock detection
//!
//! A board is deadlocked when no single swap can produce a match. The check
//! slides a window of `L` cells (default `DEADLOCK_WINDOW`) along every row and
//! column. A window holding `L - 1` pieces of one color plus a single outsider
//! has a move when the outsider has a same-colored orthogonal neighbor that
//! could be swapped in.

use std::collections::BTreeSet;

use tracing::instrument;

use crate::grid::GridState;
use crate::types::{Coord, Direction, MatchColor, DEADLOCK_WINDOW};

#[derive(Debug, Clone, Copy)]
pub struct DeadlockDetector<'a> {
    grid: &'a GridState,
    window: usize,
}

impl<'a> DeadlockDetector<'a> {
    pub fn new(grid: &'a GridState) -> Self {
        Self::with_window(grid, DEADLOCK_WINDOW)
    }

    pub fn with_window(grid: &'a GridState, window: usize) -> Self {
        Self {
            grid,
            window: window.max(2),
        }
    }

    /// True when no window on the board has a move
    #[instrument(level = "trace", skip(self), fields(window = self.window))]
    pub fn is_deadlocked(&self) -> bool {
        self.first_open_window().is_none()
    }

    /// First window (row-major origin, row before column) that has a move
    pub fn first_open_window(&self) -> Option<(Coord, Direction)> {
        self.grid.coords().find_map(|origin| {
            [Direction::RIGHT, Direction::UP]
                .into_iter()
                .find(|&dir| self.window_has_move(origin, dir))
                .map(|dir| (origin, dir))
        })
    }

    /// Whether the window starting at `origin` and running along `dir` has a move.
    /// Windows that leave the board never do.
    pub fn window_has_move(&self, origin: Coord, dir: Direction) -> bool {
        let len = self.window;
        let cells: Vec<Coord> = (0..len as i32).map(|i| origin.offset(dir, i)).collect();
        if !cells.iter().all(|&c| self.grid.in_bounds(c)) {
            return false;
        }

        let Some((color, mut group)) = self.largest_group(&cells) else {
            return false;
        };
        if group.len() < len - 1 {
            return false;
        }

        let full = cells.iter().all(|&c| self.grid.piece(c).is_some());
        let outsiders: Vec<Coord> = cells
            .iter()
            .copied()
            .filter(|c| !group.contains(c))
            .collect();

        if full && outsiders.len() == 1 {
            let outsider = outsiders[0];
            for neighbor in outsider.neighbors() {
                if group.contains(&neighbor) {
                    continue;
                }
                if self.grid.color_at(neighbor).is_some_and(|c| c.matches(color)) {
                    group.insert(neighbor);
                }
            }
        }

        group.len() >= len
    }

    /// Largest same-colored subgroup in the window, ignoring `None`. Ties go
    /// to the color seen first.
    fn largest_group(&self, cells: &[Coord]) -> Option<(MatchColor, BTreeSet<Coord>)> {
        let mut best: Option<(MatchColor, BTreeSet<Coord>)> = None;
        for &cell in cells {
            let Some(color) = self.grid.color_at(cell) else {
                continue;
            };
            if !color.is_matchable() || best.as_ref().is_some_and(|(c, _)| *c == color) {
                continue;
            }
            let group: BTreeSet<Coord> = cells
                .iter()
                .copied()
                .filter(|&c| self.grid.color_at(c) == Some(color))
                .collect();
            if best.as_ref().map_or(true, |(_, g)| group.len() > g.len()) {
                best = Some((color, group));
            }
        }
        best
    }
}
