//! Board facade - setup, swap entry and the running score
//!
//! `MatchBoard` owns the grid, configuration, random source and presenter and
//! lends them to a [`CascadeResolver`] for every accepted swap.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::barrier::{await_arrival, pace};
use crate::cascade::{CascadeReport, CascadeResolver, Phase};
use crate::hint::find_swap;
use crate::presenter::{MoveCommand, Presenter};
use tile_cascade_core::{
    color_bomb_swap, spawn_bomb, BoardConfig, BoardSnapshot, DeadlockDetector, Filler, GameRng,
    GridState, LevelGoal, MatchFinder, ScoreBoard, ShuffleRecovery,
};
use tile_cascade_types::{Coord, Move, MoveRejection, PieceId, Position};

/// Result of an accepted swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// No match; both pieces went back
    Reverted,
    Resolved {
        /// Points earned by this swap and its cascade
        points: u64,
        bombs_spawned: u8,
        report: CascadeReport,
    },
}

pub struct MatchBoard<P: Presenter> {
    grid: GridState,
    config: BoardConfig,
    rng: GameRng,
    presenter: P,
    phase: Phase,
    input_enabled: bool,
    stats: ScoreBoard,
    goal: Option<LevelGoal>,
}

impl<P: Presenter> MatchBoard<P> {
    /// Empty board sized from `config`; call [`setup`](Self::setup) to populate it
    pub fn new(config: BoardConfig, seed: u64, presenter: P) -> Self {
        let grid = GridState::new(config.width, config.height);
        Self::with_grid(grid, config, seed, presenter)
    }

    /// Board over an existing layout (no fill)
    pub fn with_grid(mut grid: GridState, config: BoardConfig, seed: u64, presenter: P) -> Self {
        grid.recount_blockers();
        let goal = config.goal.as_ref().map(LevelGoal::new);
        let mut board = Self {
            grid,
            config,
            rng: GameRng::new(seed),
            presenter,
            phase: Phase::Idle,
            input_enabled: true,
            stats: ScoreBoard::default(),
            goal,
        };
        board.snap_presenter();
        board
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn stats(&self) -> ScoreBoard {
        self.stats
    }

    pub fn goal(&self) -> Option<&LevelGoal> {
        self.goal.as_ref()
    }

    /// Whether the level goal is decided; always false without a goal
    pub fn is_game_over(&self) -> bool {
        self.goal.as_ref().is_some_and(LevelGoal::is_game_over)
    }

    pub fn is_winner(&self) -> bool {
        self.goal.as_ref().is_some_and(LevelGoal::is_winner)
    }

    /// Run the level clock of a timed goal
    pub fn tick(&mut self, elapsed_ms: u32) {
        if let Some(goal) = self.goal.as_mut() {
            goal.tick(elapsed_ms);
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(&self.grid, self.stats)
    }

    /// A swap that would match, if one exists
    pub fn hint(&self) -> Option<Move> {
        find_swap(&self.grid)
    }

    /// Apply starting tiles and pieces, fill the rest and recount blockers.
    ///
    /// A deadlocked or pre-matched fill is reshuffled (up to `max_shuffles`)
    /// so play starts from a stable board with a move available.
    pub fn setup(&mut self) {
        for tile in &self.config.starting_tiles {
            self.grid.set_cell(tile.at, tile.cell);
        }
        for start in &self.config.starting_pieces {
            let mut piece = self.grid.mint(start.color, start.kind);
            piece.score_value = self.config.piece_score;
            if self.grid.place(start.at, piece).is_err() {
                warn!(at = %start.at, "starting piece slot unavailable");
            }
        }

        Filler::new(&mut self.grid, &self.config, &mut self.rng).fill();
        self.grid.recount_blockers();

        let mut shuffles = 0;
        while shuffles < self.config.max_shuffles && !self.is_playable() {
            ShuffleRecovery::new(&mut self.grid, &mut self.rng).shuffle();
            shuffles += 1;
        }
        if shuffles > 0 {
            debug!(shuffles, "setup reshuffled the initial fill");
        }

        self.snap_presenter();
        debug!(
            width = self.grid.width(),
            height = self.grid.height(),
            blockers = self.grid.blocker_count(),
            "board ready"
        );
    }

    fn is_playable(&self) -> bool {
        MatchFinder::new(&self.grid).find_all_matches().is_empty()
            && !DeadlockDetector::new(&self.grid).is_deadlocked()
    }

    /// Put every piece at its slot in the presenter without animation
    fn snap_presenter(&mut self) {
        let easing = self.config.timing.easing;
        let pieces: Vec<(PieceId, Coord)> =
            self.grid.pieces().map(|p| (p.id, p.coord)).collect();
        for (piece, at) in pieces {
            self.presenter.move_piece(MoveCommand {
                piece,
                from: Position::from(at),
                to: at,
                duration: std::time::Duration::ZERO,
                easing,
            });
        }
    }

    fn validate(&self, mv: Move) -> Result<(), MoveRejection> {
        if !self.input_enabled {
            return Err(MoveRejection::InputDisabled);
        }
        if self.is_game_over() {
            return Err(MoveRejection::GameOver);
        }
        if !self.grid.in_bounds(mv.clicked) || !self.grid.in_bounds(mv.target) {
            return Err(MoveRejection::OutOfBounds);
        }
        if !mv.is_adjacent() {
            return Err(MoveRejection::NotAdjacent);
        }
        if self.grid.piece(mv.clicked).is_none() || self.grid.piece(mv.target).is_none() {
            return Err(MoveRejection::EmptyCell);
        }
        Ok(())
    }

    /// Swap two adjacent pieces and resolve everything the swap sets off.
    ///
    /// Invalid requests are rejected without touching the board. A swap that
    /// matches nothing is animated back and reported as `Reverted`.
    pub async fn submit_swap(&mut self, mv: Move) -> Result<SwapOutcome, MoveRejection> {
        if let Err(reason) = self.validate(mv) {
            debug!(clicked = %mv.clicked, target = %mv.target, %reason, "swap rejected");
            return Err(reason);
        }

        self.input_enabled = false;
        self.phase = Phase::Swapping;
        let outcome = self.resolve_swap(mv).await;
        self.phase = Phase::Idle;
        self.input_enabled = true;
        Ok(outcome)
    }

    async fn resolve_swap(&mut self, mv: Move) -> SwapOutcome {
        self.animate_swap(mv).await;

        let finder = MatchFinder::new(&self.grid);
        let halves: ArrayVec<(Coord, BTreeSet<Coord>), 2> = [
            (mv.clicked, finder.find_matches_at(mv.clicked)),
            (mv.target, finder.find_matches_at(mv.target)),
        ]
        .into();

        let mut clear_set: BTreeSet<Coord> = halves
            .iter()
            .flat_map(|(_, matched)| matched.iter().copied())
            .collect();
        if let Some(colored) = color_bomb_swap(&mut self.grid, mv) {
            clear_set.extend(colored);
        }

        if clear_set.is_empty() {
            self.animate_swap(mv.reversed()).await;
            debug!(clicked = %mv.clicked, target = %mv.target, "no match, swap reverted");
            return SwapOutcome::Reverted;
        }

        self.stats.count_move();
        if let Some(goal) = self.goal.as_mut() {
            goal.count_move();
        }
        let before = self.stats.score;

        let axis = mv.axis();
        let mut bombs_spawned = 0u8;
        for (at, matched) in &halves {
            let spawned = spawn_bomb(
                &mut self.grid,
                &self.config.bombs,
                matched,
                *at,
                axis,
                self.config.piece_score,
            );
            if spawned.is_some() {
                bombs_spawned += 1;
            }
        }
        if bombs_spawned > 0 {
            pace(self.config.timing.step_delay() / 2).await;
        }

        let report = CascadeResolver::new(
            &mut self.grid,
            &self.config,
            &mut self.rng,
            &mut self.presenter,
            &mut self.stats,
            &mut self.phase,
        )
        .with_goal(self.goal.as_mut())
        .run(clear_set)
        .await;

        SwapOutcome::Resolved {
            points: self.stats.score - before,
            bombs_spawned,
            report,
        }
    }

    /// Exchange the two cells in the grid, tween both pieces and wait for them
    async fn animate_swap(&mut self, mv: Move) {
        self.grid.swap(mv.clicked, mv.target);

        let timing = self.config.timing;
        let mut targets: ArrayVec<(PieceId, Coord), 2> = ArrayVec::new();
        for (from, to) in [(mv.target, mv.clicked), (mv.clicked, mv.target)] {
            let Some(piece) = self.grid.piece(to).map(|p| p.id) else {
                continue;
            };
            let start = self.presenter.position(piece).unwrap_or(Position::from(from));
            self.presenter.move_piece(MoveCommand {
                piece,
                from: start,
                to,
                duration: timing.swap(),
                easing: timing.easing,
            });
            targets.push((piece, to));
        }
        await_arrival(&mut self.presenter, &targets).await;
    }
}
