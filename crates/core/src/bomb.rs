//! Bomb module - spawn classification and areas of effect
//!
//! A swap whose matched half holds at least `min_match` pieces leaves a bomb
//! behind in the swapped cell:
//!
//! | Shape of the matched set | Bomb |
//! |--------------------------|------|
//! | spans more than one row and more than one column | Area |
//! | straight, `>= color_match` pieces | Color |
//! | straight, horizontal swap | Row |
//! | straight, vertical swap | Column |
//!
//! Bomb-driven expansion never sweeps in a blocker unless its
//! `cleared_by_bomb` flag is set.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::{BombConfig, ColorBombChain};
use crate::grid::GridState;
use crate::matcher::MatchFinder;
use crate::rng::GameRng;
use crate::types::{Axis, BombKind, Coord, MatchColor, Move, Piece, PieceKind};

/// A bomb the classifier decided to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BombSpawn {
    pub kind: BombKind,
    /// Matched color; `None` for Color bombs
    pub color: MatchColor,
}

/// Result of growing a clear-set to its bomb fixed point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub cleared: BTreeSet<Coord>,
    /// Bombs that went off (cleared as `BombBurst`)
    pub detonated: BTreeSet<Coord>,
}

/// A set spanning more than one row and more than one column is a corner
/// (L, T or cross) shape.
///
/// ```
/// use std::collections::BTreeSet;
/// use tile_cascade_core::bomb::is_corner_match;
/// use tile_cascade_core::types::Coord;
///
/// let l: BTreeSet<_> = [Coord::new(0, 0), Coord::new(1, 0), Coord::new(0, 1)].into();
/// let line: BTreeSet<_> = [Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)].into();
/// assert!(is_corner_match(&l));
/// assert!(!is_corner_match(&line));
/// ```
pub fn is_corner_match(set: &BTreeSet<Coord>) -> bool {
    let xs: BTreeSet<i32> = set.iter().map(|c| c.x).collect();
    let ys: BTreeSet<i32> = set.iter().map(|c| c.y).collect();
    xs.len() > 1 && ys.len() > 1
}

/// Read-only bomb rules over a grid
#[derive(Debug, Clone, Copy)]
pub struct BombEngine<'a> {
    grid: &'a GridState,
    config: &'a BombConfig,
}

impl<'a> BombEngine<'a> {
    pub fn new(grid: &'a GridState, config: &'a BombConfig) -> Self {
        Self { grid, config }
    }

    /// Pick the bomb for one matched half of a swap, if any.
    ///
    /// Returns `None` when the set is too small, carries no color, or the
    /// variant table has no such bomb for the color.
    pub fn classify(&self, matched: &BTreeSet<Coord>, axis: Axis) -> Option<BombSpawn> {
        if matched.len() < self.config.min_match {
            return None;
        }
        let color = matched.iter().find_map(|&c| self.grid.color_at(c))?;
        if !color.is_matchable() {
            return None;
        }

        let kind = if is_corner_match(matched) {
            BombKind::Area
        } else if matched.len() >= self.config.color_match {
            BombKind::Color
        } else if axis == Axis::Horizontal {
            BombKind::Row
        } else {
            BombKind::Column
        };

        if !self.config.has_variant(kind, color) {
            debug!(kind = kind.as_str(), color = color.as_str(), "missing bomb variant, no spawn");
            return None;
        }

        let color = if kind == BombKind::Color {
            MatchColor::None
        } else {
            color
        };
        Some(BombSpawn { kind, color })
    }

    /// Cells a bomb at `at` sweeps, itself included
    pub fn area_of_effect(&self, at: Coord, rng: &mut GameRng) -> BTreeSet<Coord> {
        let Some(bomb) = self.grid.piece(at) else {
            return BTreeSet::new();
        };
        let Some(kind) = bomb.bomb_kind() else {
            return BTreeSet::from([at]);
        };

        let mut area: BTreeSet<Coord> = match kind {
            BombKind::Row => self.occupied((0..self.grid.width() as i32).map(|x| Coord::new(x, at.y))),
            BombKind::Column => {
                self.occupied((0..self.grid.height() as i32).map(|y| Coord::new(at.x, y)))
            }
            BombKind::Area => self.occupied(
                (-1..=1).flat_map(|dy| (-1..=1).map(move |dx| Coord::new(at.x + dx, at.y + dy))),
            ),
            BombKind::Color => self.color_area(bomb, rng),
        };
        area.insert(at);
        area.retain(|&c| self.sweepable(c));
        area
    }

    /// Grow `initial` until no bomb inside it adds anything new
    pub fn expand(&self, initial: &BTreeSet<Coord>, rng: &mut GameRng) -> Expansion {
        let mut expansion = Expansion {
            cleared: initial.clone(),
            detonated: BTreeSet::new(),
        };

        loop {
            let pending: Vec<Coord> = expansion
                .cleared
                .iter()
                .copied()
                .filter(|&c| {
                    !expansion.detonated.contains(&c)
                        && self.grid.piece(c).is_some_and(|p| p.bomb_kind().is_some())
                })
                .collect();
            if pending.is_empty() {
                break;
            }
            for at in pending {
                expansion.detonated.insert(at);
                let area = self.area_of_effect(at, rng);
                expansion.cleared.extend(area);
            }
        }
        expansion
    }

    fn occupied<I>(&self, coords: I) -> BTreeSet<Coord>
    where
        I: IntoIterator<Item = Coord>,
    {
        coords
            .into_iter()
            .filter(|&c| self.grid.piece(c).is_some())
            .collect()
    }

    /// A Color bomb that adopted a color (swap-triggered) clears that color.
    /// A colorless one reached by a chain follows the configured rule.
    fn color_area(&self, bomb: &Piece, rng: &mut GameRng) -> BTreeSet<Coord> {
        let finder = MatchFinder::new(self.grid);
        if bomb.color.is_matchable() {
            return finder.find_all_of_color(bomb.color);
        }
        match self.config.chain {
            ColorBombChain::Inert => BTreeSet::new(),
            ColorBombChain::RandomColor => {
                let colors: BTreeSet<MatchColor> = self
                    .grid
                    .pieces()
                    .filter(|p| p.is_normal() && p.color.is_matchable())
                    .map(|p| p.color)
                    .collect();
                let colors: Vec<MatchColor> = colors.into_iter().collect();
                if colors.is_empty() {
                    return BTreeSet::new();
                }
                let color = colors[rng.next_range(colors.len())];
                debug!(color = color.as_str(), "chained color bomb picked a color");
                finder.find_all_of_color(color)
            }
        }
    }

    fn sweepable(&self, coord: Coord) -> bool {
        match self.grid.piece(coord).and_then(|p| p.blocker()) {
            Some(traits) => traits.cleared_by_bomb,
            None => true,
        }
    }
}

/// Mint the classified bomb for the swapped cell `at` and queue it as pending.
///
/// Returns the queued bomb, or `None` if nothing was classified or the pending
/// slot for that cell is already taken.
pub fn spawn_bomb(
    grid: &mut GridState,
    config: &BombConfig,
    matched: &BTreeSet<Coord>,
    at: Coord,
    axis: Axis,
    score_value: u32,
) -> Option<Piece> {
    let spawn = BombEngine::new(grid, config).classify(matched, axis)?;
    let mut bomb = grid.mint(spawn.color, PieceKind::Bomb { bomb: spawn.kind });
    bomb.coord = at;
    bomb.score_value = score_value;
    match grid.push_pending_bomb(bomb) {
        Ok(()) => {
            debug!(kind = spawn.kind.as_str(), at = %at, "bomb pending");
            Some(bomb)
        }
        Err(_) => None,
    }
}

/// Color-bomb handling for a swap that has already been applied to the grid.
///
/// One Color bomb adopts the other piece's color and the clear-set becomes
/// every piece of that color. Two Color bombs clear the entire board. Returns
/// `None` if neither piece is a Color bomb.
pub fn color_bomb_swap(grid: &mut GridState, mv: Move) -> Option<BTreeSet<Coord>> {
    let a = *grid.piece(mv.clicked)?;
    let b = *grid.piece(mv.target)?;

    match (a.is_color_bomb(), b.is_color_bomb()) {
        (true, true) => Some(grid.pieces().map(|p| p.coord).collect()),
        (true, false) => Some(adopt_color(grid, a.coord, b.color)),
        (false, true) => Some(adopt_color(grid, b.coord, a.color)),
        (false, false) => None,
    }
}

fn adopt_color(grid: &mut GridState, bomb_at: Coord, color: MatchColor) -> BTreeSet<Coord> {
    if let Some(bomb) = grid.piece_mut(bomb_at) {
        bomb.color = color;
    }
    let mut set = MatchFinder::new(grid).find_all_of_color(color);
    set.insert(bomb_at);
    set
}
