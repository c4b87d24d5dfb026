//! Grid module - owns cells, pieces and the blocker counter
//!
//! The grid is `width x height` with flat row-major storage (`y * width + x`).
//! Row 0 is the bottom row. Every access is bounds-checked and returns `None`
//! (or `false`) outside the board instead of panicking.

use arrayvec::ArrayVec;

use crate::types::{BlockerTraits, CellKind, Coord, MatchColor, Piece, PieceId, PieceKind};

/// Result of clearing a piece on top of a breakable cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBreak {
    pub coord: Coord,
    /// Counter after the decrement; 0 means the cell is Normal now
    pub remaining: u8,
}

/// Board storage: cells, pieces, blocker counter and pending swap bombs
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
    pieces: Vec<Option<Piece>>,
    /// Authoritative count of live blockers
    blocker_count: u32,
    /// Bombs spawned by the in-flight swap, placed once the clear step completes
    pending_bombs: ArrayVec<Piece, 2>,
    next_id: u32,
}

impl GridState {
    /// Create an empty grid of Normal cells
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellKind::Normal; width * height],
            pieces: vec![None; width * height],
            blocker_count: 0,
            pending_bombs: ArrayVec::new(),
            next_id: 0,
        }
    }

    /// Build a grid from text rows, top row first.
    ///
    /// Glyphs: palette letters `R O Y G B T P` and `W` (wild) place normal pieces,
    /// `.` leaves the cell empty, `#` is an obstacle, `X` a blocker (cleared at the
    /// bottom, not by bombs) and `x` a blocker cleared by bombs. Digits `1`-`9` are
    /// empty breakable cells with that counter. Short rows are padded with empty
    /// cells. The blocker counter is set from the placed blockers.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_core::GridState;
    /// use tile_cascade_core::types::{Coord, MatchColor};
    ///
    /// let grid = GridState::from_rows(&["RGB", "R.#"]);
    /// assert_eq!(grid.width(), 3);
    /// assert_eq!(grid.color_at(Coord::new(0, 1)), Some(MatchColor::Red));
    /// assert!(grid.is_obstacle(Coord::new(2, 0)));
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);

        for (row_idx, row) in rows.iter().enumerate() {
            let y = (height - 1 - row_idx) as i32;
            for (x, glyph) in row.chars().enumerate() {
                let coord = Coord::new(x as i32, y);
                match glyph {
                    '.' => {}
                    '#' => {
                        grid.set_cell(coord, CellKind::Obstacle);
                    }
                    'X' | 'x' => {
                        let traits = BlockerTraits {
                            cleared_by_bomb: glyph == 'x',
                            ..BlockerTraits::default()
                        };
                        let piece = grid.mint(MatchColor::None, PieceKind::Blocker(traits));
                        let _ = grid.place(coord, piece);
                    }
                    '1'..='9' => {
                        let counter = glyph as u8 - b'0';
                        grid.set_cell(coord, CellKind::Breakable { counter });
                    }
                    other => {
                        if let Some(color) = MatchColor::from_glyph(other) {
                            let piece = grid.mint(color, PieceKind::Normal);
                            let _ = grid.place(coord, piece);
                        }
                    }
                }
            }
        }

        grid.recount_blockers();
        grid
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Every coordinate in row-major order (bottom row first)
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coord::new(x, y)))
    }

    /// Hand out a fresh piece with a unique id (not yet on the grid)
    pub fn mint(&mut self, color: MatchColor, kind: PieceKind) -> Piece {
        let id = PieceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Piece::new(id, color, kind)
    }

    pub fn cell(&self, coord: Coord) -> Option<CellKind> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Replace a cell kind. Turning a cell into an obstacle evicts its piece.
    /// Returns false if out of bounds.
    pub fn set_cell(&mut self, coord: Coord, kind: CellKind) -> bool {
        let Some(idx) = self.index(coord) else {
            return false;
        };
        self.cells[idx] = kind;
        if kind.is_obstacle() {
            self.pieces[idx] = None;
        }
        true
    }

    pub fn is_obstacle(&self, coord: Coord) -> bool {
        matches!(self.cell(coord), Some(CellKind::Obstacle))
    }

    /// In bounds, not an obstacle and holding no piece
    pub fn is_vacant(&self, coord: Coord) -> bool {
        match self.index(coord) {
            Some(idx) => !self.cells[idx].is_obstacle() && self.pieces[idx].is_none(),
            None => false,
        }
    }

    pub fn piece(&self, coord: Coord) -> Option<&Piece> {
        self.index(coord).and_then(|idx| self.pieces[idx].as_ref())
    }

    pub fn piece_mut(&mut self, coord: Coord) -> Option<&mut Piece> {
        let idx = self.index(coord)?;
        self.pieces[idx].as_mut()
    }

    pub fn color_at(&self, coord: Coord) -> Option<MatchColor> {
        self.piece(coord).map(|p| p.color)
    }

    /// Put a piece into a slot, stamping its coordinate.
    ///
    /// Returns the piece back if the slot is out of bounds, an obstacle or
    /// already occupied.
    pub fn place(&mut self, coord: Coord, mut piece: Piece) -> Result<(), Piece> {
        let Some(idx) = self.index(coord) else {
            return Err(piece);
        };
        if self.cells[idx].is_obstacle() || self.pieces[idx].is_some() {
            return Err(piece);
        }
        piece.coord = coord;
        self.pieces[idx] = Some(piece);
        Ok(())
    }

    /// Remove and return the piece at a slot
    pub fn take(&mut self, coord: Coord) -> Option<Piece> {
        let idx = self.index(coord)?;
        self.pieces[idx].take()
    }

    /// Move the piece at `from` into the vacant slot `to`
    pub fn relocate(&mut self, from: Coord, to: Coord) -> bool {
        if from == to || !self.is_vacant(to) {
            return false;
        }
        match self.take(from) {
            Some(piece) => self.place(to, piece).is_ok(),
            None => false,
        }
    }

    /// Exchange the contents of two slots. Both must be in bounds and not obstacles.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        if self.cells[ia].is_obstacle() || self.cells[ib].is_obstacle() {
            return false;
        }
        self.pieces.swap(ia, ib);
        if let Some(piece) = self.pieces[ia].as_mut() {
            piece.coord = a;
        }
        if let Some(piece) = self.pieces[ib].as_mut() {
            piece.coord = b;
        }
        true
    }

    /// Decrement the breakable counter under a cleared piece
    pub fn break_tile(&mut self, coord: Coord) -> Option<TileBreak> {
        let idx = self.index(coord)?;
        match self.cells[idx] {
            CellKind::Breakable { counter } => {
                let remaining = counter.saturating_sub(1);
                self.cells[idx] = if remaining == 0 {
                    CellKind::Normal
                } else {
                    CellKind::Breakable { counter: remaining }
                };
                Some(TileBreak { coord, remaining })
            }
            _ => None,
        }
    }

    /// All pieces, row-major
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter_map(|p| p.as_ref())
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Live blockers, optionally restricted to one row
    pub fn blockers_in_row(&self, row: i32, cleared_at_bottom_only: bool) -> Vec<Coord> {
        (0..self.width as i32)
            .map(|x| Coord::new(x, row))
            .filter(|&c| match self.piece(c).and_then(|p| p.blocker()) {
                Some(traits) => !cleared_at_bottom_only || traits.cleared_at_bottom,
                None => false,
            })
            .collect()
    }

    pub fn all_blockers(&self) -> Vec<Coord> {
        self.pieces()
            .filter(|p| p.is_blocker())
            .map(|p| p.coord)
            .collect()
    }

    pub fn blocker_count(&self) -> u32 {
        self.blocker_count
    }

    pub fn add_blocker(&mut self) {
        self.blocker_count = self.blocker_count.saturating_add(1);
    }

    pub fn remove_blockers(&mut self, n: u32) {
        self.blocker_count = self.blocker_count.saturating_sub(n);
    }

    /// Reset the blocker counter from the live blockers on the board
    pub fn recount_blockers(&mut self) {
        self.blocker_count = self.all_blockers().len() as u32;
    }

    /// Queue a bomb for activation after the current clear step.
    ///
    /// At most one bomb per cell and two in total; extras are returned.
    pub fn push_pending_bomb(&mut self, bomb: Piece) -> Result<(), Piece> {
        if self.pending_bombs.iter().any(|b| b.coord == bomb.coord) {
            return Err(bomb);
        }
        self.pending_bombs.try_push(bomb).map_err(|e| e.element())
    }

    pub fn pending_bombs(&self) -> &[Piece] {
        &self.pending_bombs
    }

    /// Drain pending bombs; each is handed out exactly once
    pub fn take_pending_bombs(&mut self) -> ArrayVec<Piece, 2> {
        std::mem::take(&mut self.pending_bombs)
    }

    /// Render as text rows, top row first (inverse of `from_rows` for normal pieces)
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height as i32)
            .rev()
            .map(|y| {
                (0..self.width as i32)
                    .map(|x| {
                        let c = Coord::new(x, y);
                        match (self.cell(c), self.piece(c)) {
                            (Some(CellKind::Obstacle), _) => '#',
                            (_, Some(p)) => match p.kind {
                                PieceKind::Normal => p.color.glyph(),
                                PieceKind::Bomb { .. } => '*',
                                PieceKind::Blocker(t) if t.cleared_by_bomb => 'x',
                                PieceKind::Blocker(_) => 'X',
                            },
                            (Some(CellKind::Breakable { counter }), None) => {
                                char::from_digit(counter.min(9) as u32, 10).unwrap_or('9')
                            }
                            _ => '.',
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
