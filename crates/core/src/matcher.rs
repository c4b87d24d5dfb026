//! Match detection - straight same-color runs of three or more
//!
//! All results are `BTreeSet<Coord>`, so unions are cheap and iteration is
//! row-major. `MatchColor::None` never matches; `Wild` only matches `Wild`.

use std::collections::BTreeSet;

use crate::grid::GridState;
use crate::types::{Axis, Coord, Direction, MatchColor, MIN_MATCH_LEN};

/// Read-only match queries over a grid
#[derive(Debug, Clone, Copy)]
pub struct MatchFinder<'a> {
    grid: &'a GridState,
}

impl<'a> MatchFinder<'a> {
    pub fn new(grid: &'a GridState) -> Self {
        Self { grid }
    }

    /// Walk from `origin` along `direction` while the color holds.
    ///
    /// The origin is included. The walk stops at the board edge, an empty slot,
    /// a color mismatch or a `None`-colored piece. Returns the walked cells if
    /// there are at least `min_len` of them, otherwise an empty set. A zero
    /// direction never walks past the origin.
    pub fn find_line_matches(
        &self,
        origin: Coord,
        direction: Direction,
        min_len: usize,
    ) -> BTreeSet<Coord> {
        let mut run = BTreeSet::new();
        let Some(color) = self.grid.color_at(origin) else {
            return run;
        };
        if !color.is_matchable() {
            return run;
        }

        run.insert(origin);
        if !direction.is_zero() {
            let mut cursor = origin.offset(direction, 1);
            while self.grid.color_at(cursor).is_some_and(|c| color.matches(c)) {
                run.insert(cursor);
                cursor = cursor.offset(direction, 1);
            }
        }

        if run.len() >= min_len {
            run
        } else {
            BTreeSet::new()
        }
    }

    /// Union of the two opposite walks along `axis`, kept only if it reaches
    /// `MIN_MATCH_LEN`
    pub fn find_axis_matches(&self, origin: Coord, axis: Axis) -> BTreeSet<Coord> {
        let [forward, backward] = axis.directions();
        let mut run = self.find_line_matches(origin, forward, 2);
        run.extend(self.find_line_matches(origin, backward, 2));

        if run.len() >= MIN_MATCH_LEN {
            run
        } else {
            BTreeSet::new()
        }
    }

    /// Horizontal and vertical matches through `coord`
    pub fn find_matches_at(&self, coord: Coord) -> BTreeSet<Coord> {
        let mut matches = self.find_axis_matches(coord, Axis::Horizontal);
        matches.extend(self.find_axis_matches(coord, Axis::Vertical));
        matches
    }

    /// Union of `find_matches_at` over several coordinates
    pub fn find_matches_for<I>(&self, coords: I) -> BTreeSet<Coord>
    where
        I: IntoIterator<Item = Coord>,
    {
        coords
            .into_iter()
            .flat_map(|c| self.find_matches_at(c))
            .collect()
    }

    /// Every match on the board
    pub fn find_all_matches(&self) -> BTreeSet<Coord> {
        self.find_matches_for(self.grid.coords())
    }

    /// Every piece of `color`; empty for `None`
    pub fn find_all_of_color(&self, color: MatchColor) -> BTreeSet<Coord> {
        if !color.is_matchable() {
            return BTreeSet::new();
        }
        self.grid
            .pieces()
            .filter(|p| p.color == color)
            .map(|p| p.coord)
            .collect()
    }

    pub fn has_match(&self, coord: Coord) -> bool {
        !self.find_matches_at(coord).is_empty()
    }
}
