//! Board configuration
//!
//! Everything a level can tune: size, palette weights, blocker spawning, bomb
//! variant tables, animation timing, the starting layout and the level goal.
//! Loaded from JSON and optionally overridden from `CASCADE_*` environment
//! variables.

use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::goal::GoalConfig;
use crate::types::{
    BlockerTraits, BombKind, CellKind, Coord, Easing, MatchColor, PieceKind, DEFAULT_PIECE_SCORE,
    MIN_MATCH_LEN,
};

/// One palette color and its relative spawn weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: MatchColor,
    pub weight: u32,
}

/// Blocker spawning rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockerConfig {
    /// Blocker variants the filler may spawn; empty disables blocker spawning
    pub kinds: Vec<BlockerTraits>,
    /// Upper bound on live blockers
    pub max_count: u32,
    /// Probability that a top-row refill spawns a blocker
    pub spawn_chance: f64,
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            max_count: 3,
            spawn_chance: 0.1,
        }
    }
}

/// What a Color bomb does when another bomb's blast reaches it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBombChain {
    /// Clears only itself
    #[default]
    Inert,
    /// Picks a random palette color and clears every piece of it
    RandomColor,
}

/// Bomb variant tables and spawn thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BombConfig {
    /// Colors that have a Row bomb variant
    pub row: Vec<MatchColor>,
    /// Colors that have a Column bomb variant
    pub column: Vec<MatchColor>,
    /// Colors that have an Area bomb variant
    pub area: Vec<MatchColor>,
    /// Whether the colorless Color bomb exists
    pub color: bool,
    /// Smallest matched set that spawns a bomb
    pub min_match: usize,
    /// Straight runs this long spawn a Color bomb
    pub color_match: usize,
    pub chain: ColorBombChain,
}

impl Default for BombConfig {
    fn default() -> Self {
        Self {
            row: MatchColor::PALETTE.to_vec(),
            column: MatchColor::PALETTE.to_vec(),
            area: MatchColor::PALETTE.to_vec(),
            color: true,
            min_match: 4,
            color_match: 5,
            chain: ColorBombChain::Inert,
        }
    }
}

impl BombConfig {
    /// Whether the variant table holds `kind` for `color`
    pub fn has_variant(&self, kind: BombKind, color: MatchColor) -> bool {
        match kind {
            BombKind::Row => self.row.contains(&color),
            BombKind::Column => self.column.contains(&color),
            BombKind::Area => self.area.contains(&color),
            BombKind::Color => self.color,
        }
    }
}

/// Animation and pacing durations, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub swap_ms: u64,
    /// Pause between cascade steps
    pub step_delay_ms: u64,
    /// Collapse move time per cell fallen
    pub collapse_ms_per_cell: u64,
    pub fill_ms: u64,
    /// Rows above its slot that a new piece starts from
    pub fill_y_offset: i32,
    pub easing: Easing,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            swap_ms: 500,
            step_delay_ms: 200,
            collapse_ms_per_cell: 100,
            fill_ms: 500,
            fill_y_offset: 10,
            easing: Easing::SmootherStep,
        }
    }
}

impl Timing {
    /// Zero-duration pacing for headless runs and tests
    pub fn instant() -> Self {
        Self {
            swap_ms: 0,
            step_delay_ms: 0,
            collapse_ms_per_cell: 0,
            fill_ms: 0,
            ..Self::default()
        }
    }

    pub fn swap(&self) -> Duration {
        Duration::from_millis(self.swap_ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn fill(&self) -> Duration {
        Duration::from_millis(self.fill_ms)
    }

    /// Collapse duration for a piece falling `cells` rows
    pub fn collapse(&self, cells: u32) -> Duration {
        Duration::from_millis(self.collapse_ms_per_cell.saturating_mul(u64::from(cells)))
    }
}

/// Cell kind applied at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingTile {
    pub at: Coord,
    pub cell: CellKind,
}

/// Piece placed at setup before the filler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingPiece {
    pub at: Coord,
    pub color: MatchColor,
    pub kind: PieceKind,
}

/// Complete board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    pub palette: Vec<PaletteEntry>,
    /// Base points for every spawned piece
    pub piece_score: u32,
    pub blockers: BlockerConfig,
    pub bombs: BombConfig,
    pub timing: Timing,
    pub starting_tiles: Vec<StartingTile>,
    pub starting_pieces: Vec<StartingPiece>,
    /// Consecutive shuffles allowed before giving up on a deadlocked board
    pub max_shuffles: u32,
    /// Clear passes allowed in one resolution before it stops refilling
    pub max_passes: u32,
    /// Level goal; `None` plays without limits
    pub goal: Option<GoalConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            palette: MatchColor::PALETTE
                .iter()
                .map(|&color| PaletteEntry { color, weight: 1 })
                .collect(),
            piece_score: DEFAULT_PIECE_SCORE,
            blockers: BlockerConfig::default(),
            bombs: BombConfig::default(),
            timing: Timing::default(),
            starting_tiles: Vec::new(),
            starting_pieces: Vec::new(),
            max_shuffles: 16,
            max_passes: 64,
            goal: None,
        }
    }
}

impl BoardConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid board config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in config {}", path.display()))
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `CASCADE_WIDTH`, `CASCADE_HEIGHT`, `CASCADE_MAX_BLOCKERS` and
    /// `CASCADE_BLOCKER_CHANCE`. Unset or unparsable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(width) = lookup("CASCADE_WIDTH").and_then(|s| s.trim().parse().ok()) {
            self.width = width;
        }
        if let Some(height) = lookup("CASCADE_HEIGHT").and_then(|s| s.trim().parse().ok()) {
            self.height = height;
        }
        if let Some(max) = lookup("CASCADE_MAX_BLOCKERS").and_then(|s| s.trim().parse().ok()) {
            self.blockers.max_count = max;
        }
        if let Some(p) = lookup("CASCADE_BLOCKER_CHANCE").and_then(|s| s.trim().parse().ok()) {
            self.blockers.spawn_chance = p;
        }
        self
    }

    /// Palette weights in palette order, for `GameRng::weighted_index`
    pub fn palette_weights(&self) -> Vec<u32> {
        self.palette.iter().map(|e| e.weight).collect()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0 && self.height > 0, "board must be at least 1x1");
        ensure!(
            self.width <= i32::MAX as usize && self.height <= i32::MAX as usize,
            "board dimensions too large"
        );
        ensure!(
            self.palette.iter().all(|e| e.color.is_matchable()),
            "palette cannot contain the none color"
        );
        let mut drawable: Vec<MatchColor> = self
            .palette
            .iter()
            .filter(|e| e.weight > 0)
            .map(|e| e.color)
            .collect();
        drawable.sort();
        drawable.dedup();
        ensure!(
            drawable.len() >= MIN_MATCH_LEN,
            "palette needs at least {} distinct colors with a positive weight, got {}",
            MIN_MATCH_LEN,
            drawable.len()
        );
        ensure!(self.max_passes > 0, "max_passes must be positive");
        if let Some(goal) = &self.goal {
            goal.validate()?;
        }
        ensure!(
            (0.0..=1.0).contains(&self.blockers.spawn_chance),
            "blocker spawn chance must be within [0, 1], got {}",
            self.blockers.spawn_chance
        );
        ensure!(
            self.bombs.min_match >= MIN_MATCH_LEN,
            "bomb min_match must be at least {}",
            MIN_MATCH_LEN
        );
        ensure!(
            self.bombs.color_match >= self.bombs.min_match,
            "bomb color_match must not be below min_match"
        );

        let in_bounds = |c: Coord| {
            c.x >= 0 && c.y >= 0 && (c.x as usize) < self.width && (c.y as usize) < self.height
        };
        for tile in &self.starting_tiles {
            ensure!(in_bounds(tile.at), "starting tile {} is off the board", tile.at);
        }
        for piece in &self.starting_pieces {
            ensure!(in_bounds(piece.at), "starting piece {} is off the board", piece.at);
        }
        Ok(())
    }
}
