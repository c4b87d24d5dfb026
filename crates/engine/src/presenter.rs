//! Presentation boundary
//!
//! The resolver never draws anything. It issues move commands and cell events
//! to a [`Presenter`], then polls piece positions frame by frame until every
//! moved piece has arrived.

use std::collections::HashMap;
use std::time::Duration;

use tile_cascade_core::ScoreAward;
use tile_cascade_types::{BombKind, Coord, Easing, PieceId, Position};

/// Tween a piece from `from` to the slot `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    pub piece: PieceId,
    pub from: Position,
    pub to: Coord,
    pub duration: Duration,
    pub easing: Easing,
}

/// Things that happen to cells during a clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEvent {
    /// An ordinary piece was destroyed
    Clear { piece: PieceId, at: Coord },
    /// A bomb went off
    BombBurst {
        piece: PieceId,
        at: Coord,
        kind: BombKind,
    },
    /// A breakable counter went down; 0 means the cell is Normal now
    BreakTile { at: Coord, remaining: u8 },
}

impl CellEvent {
    /// Piece removed by this event, if any
    pub fn cleared_piece(&self) -> Option<PieceId> {
        match *self {
            CellEvent::Clear { piece, .. } | CellEvent::BombBurst { piece, .. } => Some(piece),
            CellEvent::BreakTile { .. } => None,
        }
    }
}

/// Collaborator that animates pieces and receives score awards.
///
/// `position` reports where a piece is currently drawn; `None` means the
/// presenter does not track it, which counts as arrived.
#[allow(async_fn_in_trait)]
pub trait Presenter {
    fn move_piece(&mut self, cmd: MoveCommand);

    fn cell_event(&mut self, event: CellEvent);

    fn score(&mut self, award: ScoreAward);

    fn position(&self, piece: PieceId) -> Option<Position>;

    /// Let one frame of animation pass
    async fn next_frame(&mut self);
}

/// Headless presenter: pieces snap to their destination and every event is recorded
#[derive(Debug, Default)]
pub struct InstantPresenter {
    positions: HashMap<PieceId, Position>,
    pub moves: Vec<MoveCommand>,
    pub events: Vec<CellEvent>,
    pub awards: Vec<ScoreAward>,
    pub frames: u64,
}

impl InstantPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far (positions are kept)
    pub fn clear_log(&mut self) {
        self.moves.clear();
        self.events.clear();
        self.awards.clear();
    }

    pub fn points(&self) -> u64 {
        self.awards.iter().map(ScoreAward::points).sum()
    }
}

impl Presenter for InstantPresenter {
    fn move_piece(&mut self, cmd: MoveCommand) {
        self.positions.insert(cmd.piece, Position::from(cmd.to));
        self.moves.push(cmd);
    }

    fn cell_event(&mut self, event: CellEvent) {
        if let Some(piece) = event.cleared_piece() {
            self.positions.remove(&piece);
        }
        self.events.push(event);
    }

    fn score(&mut self, award: ScoreAward) {
        self.awards.push(award);
    }

    fn position(&self, piece: PieceId) -> Option<Position> {
        self.positions.get(&piece).copied()
    }

    async fn next_frame(&mut self) {
        self.frames += 1;
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: Position,
    to: Position,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    fn position(&self) -> Position {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, self.easing.apply(t))
    }
}

/// Presenter that interpolates moves with their easing, advancing a fixed
/// frame step per `next_frame`
#[derive(Debug)]
pub struct TweenPresenter {
    tweens: HashMap<PieceId, Tween>,
    frame: Duration,
    /// Sleep one frame step per frame instead of only yielding
    realtime: bool,
    pub frames: u64,
}

impl TweenPresenter {
    /// Real-time pacing: each frame sleeps `frame`
    pub fn new(frame: Duration) -> Self {
        Self {
            tweens: HashMap::new(),
            frame,
            realtime: true,
            frames: 0,
        }
    }

    /// Simulated time: each frame advances `frame` without sleeping
    pub fn headless(frame: Duration) -> Self {
        Self {
            realtime: false,
            ..Self::new(frame)
        }
    }

    /// Pieces still travelling
    pub fn in_flight(&self) -> usize {
        self.tweens
            .values()
            .filter(|t| t.elapsed < t.duration)
            .count()
    }
}

impl Presenter for TweenPresenter {
    fn move_piece(&mut self, cmd: MoveCommand) {
        let from = self
            .tweens
            .get(&cmd.piece)
            .map(Tween::position)
            .unwrap_or(cmd.from);
        self.tweens.insert(
            cmd.piece,
            Tween {
                from,
                to: Position::from(cmd.to),
                elapsed: Duration::ZERO,
                duration: cmd.duration,
                easing: cmd.easing,
            },
        );
    }

    fn cell_event(&mut self, event: CellEvent) {
        if let Some(piece) = event.cleared_piece() {
            self.tweens.remove(&piece);
        }
    }

    fn score(&mut self, _award: ScoreAward) {}

    fn position(&self, piece: PieceId) -> Option<Position> {
        self.tweens.get(&piece).map(Tween::position)
    }

    async fn next_frame(&mut self) {
        if self.realtime {
            tokio::time::sleep(self.frame).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.frames += 1;
        for tween in self.tweens.values_mut() {
            tween.elapsed = (tween.elapsed + self.frame).min(tween.duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(piece: u32, from: (f32, f32), to: (i32, i32), ms: u64) -> MoveCommand {
        MoveCommand {
            piece: PieceId(piece),
            from: Position::new(from.0, from.1),
            to: Coord::new(to.0, to.1),
            duration: Duration::from_millis(ms),
            easing: Easing::Linear,
        }
    }

    #[test]
    fn test_instant_presenter_snaps() {
        let mut presenter = InstantPresenter::new();
        presenter.move_piece(cmd(1, (0.0, 9.0), (0, 2), 500));
        assert_eq!(presenter.position(PieceId(1)), Some(Position::new(0.0, 2.0)));

        presenter.cell_event(CellEvent::Clear { piece: PieceId(1), at: Coord::new(0, 2) });
        assert_eq!(presenter.position(PieceId(1)), None);
        assert_eq!(presenter.events.len(), 1);
    }

    #[tokio::test]
    async fn test_tween_presenter_advances_per_frame() {
        let mut presenter = TweenPresenter::headless(Duration::from_millis(100));
        presenter.move_piece(cmd(7, (0.0, 4.0), (0, 0), 400));
        assert_eq!(presenter.position(PieceId(7)), Some(Position::new(0.0, 4.0)));

        presenter.next_frame().await;
        presenter.next_frame().await;
        let halfway = presenter.position(PieceId(7)).unwrap();
        assert!((halfway.y - 2.0).abs() < 1e-4);
        assert_eq!(presenter.in_flight(), 1);

        presenter.next_frame().await;
        presenter.next_frame().await;
        presenter.next_frame().await;
        assert!(presenter.position(PieceId(7)).unwrap().has_arrived(Coord::new(0, 0)));
        assert_eq!(presenter.in_flight(), 0);
    }

    #[test]
    fn test_zero_duration_tween_is_at_destination() {
        let mut presenter = TweenPresenter::headless(Duration::from_millis(16));
        presenter.move_piece(cmd(2, (3.0, 3.0), (1, 1), 0));
        assert!(presenter.position(PieceId(2)).unwrap().has_arrived(Coord::new(1, 1)));
    }
}
