//! Core types module - shared data structures and constants
//!
//! This module defines the vocabulary shared by the grid simulation, the cascade
//! resolver and any presentation layer. All types are plain data with no behavior
//! beyond small helpers, so they can be used anywhere (core logic, renderers, tools).
//!
//! # Coordinates
//!
//! - `x` grows left to right, `y` grows bottom to top
//! - Row `0` is the bottom row; pieces fall towards lower `y`
//! - Coordinates order row-major (`y` first, then `x`), which fixes every scan order
//!
//! # Match Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_MATCH_LEN` | 3 | Shortest run that clears |
//! | `DEADLOCK_WINDOW` | 3 | Window length used by deadlock detection |
//! | `BONUS_BATCH_SIZE` | 4 | Clear batch size that earns a bonus |
//! | `CLEAR_BONUS` | 20 | Bonus points per piece in a large batch |
//! | `DEFAULT_PIECE_SCORE` | 20 | Base points per cleared piece |
//! | `FILL_MAX_ATTEMPTS` | 100 | Respawn budget when a new piece self-matches |
//! | `ARRIVAL_EPSILON` | 0.001 | Distance at which a tween counts as arrived |
//!
//! # Examples
//!
//! ```
//! use tile_cascade_types::{Coord, MatchColor, Move};
//!
//! let color = MatchColor::from_str("teal").unwrap();
//! assert_eq!(color, MatchColor::Teal);
//! assert!(color.is_matchable());
//! assert!(!MatchColor::None.is_matchable());
//!
//! let mv = Move::new(Coord::new(2, 3), Coord::new(3, 3));
//! assert!(mv.is_adjacent());
//! assert!(!Move::new(Coord::new(0, 0), Coord::new(1, 1)).is_adjacent());
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest same-color run that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Window length scanned by the deadlock detector
pub const DEADLOCK_WINDOW: usize = 3;

/// A clear batch at least this large awards `CLEAR_BONUS` per piece
pub const BONUS_BATCH_SIZE: usize = 4;

/// Bonus points per piece when the batch reaches `BONUS_BATCH_SIZE`
pub const CLEAR_BONUS: u32 = 20;

/// Base points for clearing one piece
pub const DEFAULT_PIECE_SCORE: u32 = 20;

/// Respawn attempts before the filler accepts a self-matching piece
pub const FILL_MAX_ATTEMPTS: u32 = 100;

/// A presented piece within this distance of its slot (per axis) has arrived
pub const ARRIVAL_EPSILON: f32 = 0.001;

/// Grid coordinate. Ordered row-major: bottom row first, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Step `n` cells along `dir`
    pub fn offset(self, dir: Direction, n: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx * n, self.y + dy * n)
    }

    /// Manhattan distance between two coordinates
    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbors (left, right, up, down); callers bounds-check
    pub fn neighbors(self) -> [Coord; 4] {
        [
            Coord::new(self.x - 1, self.y),
            Coord::new(self.x + 1, self.y),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x, self.y - 1),
        ]
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Continuous position reported by the presentation layer, in cell units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Within `ARRIVAL_EPSILON` of `slot` on both axes
    pub fn has_arrived(&self, slot: Coord) -> bool {
        (self.x - slot.x as f32).abs() <= ARRIVAL_EPSILON
            && (self.y - slot.y as f32).abs() <= ARRIVAL_EPSILON
    }

    /// Linear interpolation towards `to` by `t` in `[0, 1]`
    pub fn lerp(self, to: Position, t: f32) -> Position {
        Position::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

impl From<Coord> for Position {
    fn from(c: Coord) -> Self {
        Position::new(c.x as f32, c.y as f32)
    }
}

/// Unit step used when walking the grid
///
/// Arbitrary `(dx, dy)` vectors are clamped per component to `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    dx: i32,
    dy: i32,
}

impl Direction {
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };
    pub const UP: Direction = Direction { dx: 0, dy: 1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: -1 };

    /// Build a direction from any vector, clamping each component
    pub fn clamped(dx: i32, dy: i32) -> Self {
        Self {
            dx: dx.clamp(-1, 1),
            dy: dy.clamp(-1, 1),
        }
    }

    pub fn delta(self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Board axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The two opposite walking directions along this axis
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::Horizontal => [Direction::RIGHT, Direction::LEFT],
            Axis::Vertical => [Direction::UP, Direction::DOWN],
        }
    }
}

/// Piece color ("match value")
///
/// The seven palette colors match by equality. `Wild` is an ordinary value that
/// only matches another `Wild`. `None` never matches anything, itself included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Teal,
    Purple,
    Wild,
    None,
}

impl MatchColor {
    /// The seven palette colors in declaration order
    pub const PALETTE: [MatchColor; 7] = [
        MatchColor::Red,
        MatchColor::Orange,
        MatchColor::Yellow,
        MatchColor::Green,
        MatchColor::Blue,
        MatchColor::Teal,
        MatchColor::Purple,
    ];

    /// Whether pieces of this color can ever take part in a match
    pub fn is_matchable(self) -> bool {
        self != MatchColor::None
    }

    /// Whether two colors match (`None` matches nothing)
    pub fn matches(self, other: MatchColor) -> bool {
        self.is_matchable() && self == other
    }

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::MatchColor;
    ///
    /// assert_eq!(MatchColor::from_str("RED"), Some(MatchColor::Red));
    /// assert_eq!(MatchColor::from_str("wild"), Some(MatchColor::Wild));
    /// assert_eq!(MatchColor::from_str("mauve"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(MatchColor::Red),
            "orange" => Some(MatchColor::Orange),
            "yellow" => Some(MatchColor::Yellow),
            "green" => Some(MatchColor::Green),
            "blue" => Some(MatchColor::Blue),
            "teal" => Some(MatchColor::Teal),
            "purple" => Some(MatchColor::Purple),
            "wild" => Some(MatchColor::Wild),
            "none" => Some(MatchColor::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchColor::Red => "red",
            MatchColor::Orange => "orange",
            MatchColor::Yellow => "yellow",
            MatchColor::Green => "green",
            MatchColor::Blue => "blue",
            MatchColor::Teal => "teal",
            MatchColor::Purple => "purple",
            MatchColor::Wild => "wild",
            MatchColor::None => "none",
        }
    }

    /// Single-letter glyph used by text boards (`GridState::from_rows`, demo output)
    pub fn glyph(&self) -> char {
        match self {
            MatchColor::Red => 'R',
            MatchColor::Orange => 'O',
            MatchColor::Yellow => 'Y',
            MatchColor::Green => 'G',
            MatchColor::Blue => 'B',
            MatchColor::Teal => 'T',
            MatchColor::Purple => 'P',
            MatchColor::Wild => 'W',
            MatchColor::None => '?',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            'R' => Some(MatchColor::Red),
            'O' => Some(MatchColor::Orange),
            'Y' => Some(MatchColor::Yellow),
            'G' => Some(MatchColor::Green),
            'B' => Some(MatchColor::Blue),
            'T' => Some(MatchColor::Teal),
            'P' => Some(MatchColor::Purple),
            'W' => Some(MatchColor::Wild),
            _ => None,
        }
    }
}

/// Bomb variants and their area of effect
///
/// - **Row**: every piece in the bomb's row
/// - **Column**: every piece in the bomb's column
/// - **Area**: the 3x3 block centered on the bomb
/// - **Color**: every piece of one color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BombKind {
    Row,
    Column,
    Area,
    Color,
}

impl BombKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BombKind::Row => "row",
            BombKind::Column => "column",
            BombKind::Area => "area",
            BombKind::Color => "color",
        }
    }
}

/// Blocker behavior flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockerTraits {
    /// Relative heaviness of the blocker
    pub weight: u8,
    /// Swept into expanding bomb areas
    pub cleared_by_bomb: bool,
    /// Cleared once it rests on row 0
    pub cleared_at_bottom: bool,
}

impl Default for BlockerTraits {
    fn default() -> Self {
        Self {
            weight: 1,
            cleared_by_bomb: false,
            cleared_at_bottom: true,
        }
    }
}

/// What a piece is, beyond its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PieceKind {
    Normal,
    Bomb { bomb: BombKind },
    Blocker(BlockerTraits),
}

/// Stable identity of a piece for its whole life on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// A grid occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    /// Always equal to the grid slot holding this piece
    pub coord: Coord,
    pub color: MatchColor,
    pub kind: PieceKind,
    pub score_value: u32,
}

impl Piece {
    pub fn new(id: PieceId, color: MatchColor, kind: PieceKind) -> Self {
        Self {
            id,
            coord: Coord::new(0, 0),
            color,
            kind,
            score_value: DEFAULT_PIECE_SCORE,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self.kind, PieceKind::Normal)
    }

    pub fn bomb_kind(&self) -> Option<BombKind> {
        match self.kind {
            PieceKind::Bomb { bomb } => Some(bomb),
            _ => None,
        }
    }

    pub fn is_color_bomb(&self) -> bool {
        self.bomb_kind() == Some(BombKind::Color)
    }

    pub fn blocker(&self) -> Option<BlockerTraits> {
        match self.kind {
            PieceKind::Blocker(traits) => Some(traits),
            _ => None,
        }
    }

    pub fn is_blocker(&self) -> bool {
        self.blocker().is_some()
    }
}

/// Cell kinds
///
/// - **Normal**: holds at most one piece
/// - **Obstacle**: never holds a piece; a permanent hole for collapse
/// - **Breakable**: holds pieces; each clear on top decrements the counter and the
///   cell turns Normal at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CellKind {
    Normal,
    Obstacle,
    Breakable { counter: u8 },
}

impl CellKind {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, CellKind::Obstacle)
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Normal
    }
}

/// Player swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub clicked: Coord,
    pub target: Coord,
}

impl Move {
    pub fn new(clicked: Coord, target: Coord) -> Self {
        Self { clicked, target }
    }

    /// Valid swaps are between Manhattan-adjacent cells
    pub fn is_adjacent(&self) -> bool {
        self.clicked.manhattan(self.target) == 1
    }

    /// Axis of the swap; only meaningful for adjacent moves
    pub fn axis(&self) -> Axis {
        if self.target.x != self.clicked.x {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// The same swap undone
    pub fn reversed(&self) -> Self {
        Self::new(self.target, self.clicked)
    }
}

/// Why a swap request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// A resolution is in flight
    InputDisabled,
    /// A coordinate lies outside the board
    OutOfBounds,
    /// The cells are not Manhattan-adjacent
    NotAdjacent,
    /// One of the cells holds no piece
    EmptyCell,
    /// The level goal is already decided
    GameOver,
}

impl MoveRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveRejection::InputDisabled => "input disabled",
            MoveRejection::OutOfBounds => "out of bounds",
            MoveRejection::NotAdjacent => "not adjacent",
            MoveRejection::EmptyCell => "empty cell",
            MoveRejection::GameOver => "game over",
        }
    }
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tween curves understood by the presentation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    SmoothStep,
    #[default]
    SmootherStep,
}

impl Easing {
    /// Map linear progress `t` (clamped to `[0, 1]`) onto the curve
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::Easing;
    ///
    /// assert_eq!(Easing::Linear.apply(0.25), 0.25);
    /// assert_eq!(Easing::SmoothStep.apply(0.5), 0.5);
    /// assert_eq!(Easing::SmootherStep.apply(1.0), 1.0);
    /// ```
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => (t * std::f32::consts::FRAC_PI_2).sin(),
            Easing::EaseIn => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::SmootherStep => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_orders_row_major() {
        let mut coords = vec![Coord::new(2, 0), Coord::new(0, 1), Coord::new(1, 0)];
        coords.sort();
        assert_eq!(coords, vec![Coord::new(1, 0), Coord::new(2, 0), Coord::new(0, 1)]);
    }

    #[test]
    fn direction_clamps_components() {
        assert_eq!(Direction::clamped(5, -3).delta(), (1, -1));
        assert_eq!(Direction::clamped(0, 2), Direction::UP);
        assert!(Direction::clamped(0, 0).is_zero());
    }

    #[test]
    fn none_never_matches() {
        assert!(!MatchColor::None.matches(MatchColor::None));
        assert!(MatchColor::Wild.matches(MatchColor::Wild));
        assert!(!MatchColor::Wild.matches(MatchColor::Red));
    }

    #[test]
    fn glyph_roundtrip_covers_palette() {
        for color in MatchColor::PALETTE {
            assert_eq!(MatchColor::from_glyph(color.glyph()), Some(color));
        }
    }

    #[test]
    fn move_axis_and_adjacency() {
        let horizontal = Move::new(Coord::new(1, 1), Coord::new(0, 1));
        assert!(horizontal.is_adjacent());
        assert_eq!(horizontal.axis(), Axis::Horizontal);

        let vertical = Move::new(Coord::new(1, 1), Coord::new(1, 2));
        assert_eq!(vertical.axis(), Axis::Vertical);

        assert!(!Move::new(Coord::new(1, 1), Coord::new(1, 1)).is_adjacent());
        assert!(!Move::new(Coord::new(0, 0), Coord::new(0, 2)).is_adjacent());
    }

    #[test]
    fn easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::SmoothStep,
            Easing::SmootherStep,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
            assert!((easing.apply(2.0) - 1.0).abs() < 1e-6, "{:?} clamps", easing);
        }
    }

    #[test]
    fn position_arrival_uses_epsilon() {
        let slot = Coord::new(2, 5);
        assert!(Position::new(2.0005, 4.9995).has_arrived(slot));
        assert!(!Position::new(2.01, 5.0).has_arrived(slot));
        let half = Position::from(Coord::new(0, 0)).lerp(Position::from(slot), 0.5);
        assert_eq!(half, Position::new(1.0, 2.5));
    }

    #[test]
    fn piece_kind_queries() {
        let bomb = Piece::new(PieceId(1), MatchColor::None, PieceKind::Bomb { bomb: BombKind::Color });
        assert!(bomb.is_color_bomb());
        assert!(!bomb.is_normal());

        let blocker = Piece::new(PieceId(2), MatchColor::None, PieceKind::Blocker(BlockerTraits::default()));
        assert!(blocker.is_blocker());
        assert_eq!(blocker.bomb_kind(), None);
    }
}
