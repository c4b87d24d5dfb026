//! Read-only board snapshots for presentation layers and the demo's JSON output

use serde::Serialize;

use crate::grid::GridState;
use crate::scoring::ScoreBoard;
use crate::types::{CellKind, Coord, MatchColor, PieceId, PieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub at: Coord,
    pub color: MatchColor,
    pub kind: PieceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    pub at: Coord,
    pub cell: CellKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub width: usize,
    pub height: usize,
    /// Text rows, top row first
    pub rows: Vec<String>,
    /// Non-Normal cells only
    pub cells: Vec<CellSnapshot>,
    pub pieces: Vec<PieceSnapshot>,
    pub blocker_count: u32,
    pub score: ScoreBoard,
}

impl BoardSnapshot {
    pub fn capture(grid: &GridState, score: ScoreBoard) -> Self {
        let cells = grid
            .coords()
            .filter_map(|at| match grid.cell(at) {
                Some(CellKind::Normal) | None => None,
                Some(cell) => Some(CellSnapshot { at, cell }),
            })
            .collect();
        let pieces = grid
            .pieces()
            .map(|p| PieceSnapshot {
                id: p.id,
                at: p.coord,
                color: p.color,
                kind: p.kind,
            })
            .collect();

        Self {
            width: grid.width(),
            height: grid.height(),
            rows: grid.to_rows(),
            cells,
            pieces,
            blocker_count: grid.blocker_count(),
            score,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
