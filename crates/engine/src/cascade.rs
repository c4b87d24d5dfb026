//! Cascade resolver - the clear, collapse, refill state machine
//!
//! # Phases
//!
//! ```text
//! Idle -> Swapping -> Resolving -> Collapsing -> SettleCheck -> Resolving (chain)
//!                                                            -> Refilling
//! Refilling -> Resolving (refill matched) | Shuffling (deadlock) | Idle
//! ```
//!
//! # One pass
//!
//! 1. Grow the clear-set to its bomb fixed point
//! 2. Add live blockers in the set plus bottom-row blockers; update the counter
//! 3. Destroy the set, award points, count down breakable cells
//! 4. Place the swap's pending bombs
//! 5. Collapse touched columns; pieces fall through obstacle cells
//! 6. Wait for the moved pieces to arrive
//! 7. Matches among the moved pieces (plus bottom blockers) start the next
//!    step with the multiplier raised by one
//!
//! The driver repeats pass, refill and full scan until a refill leaves no
//! match, then checks for deadlock and shuffles if needed. Passes are capped
//! by `max_passes` and consecutive shuffles by `max_shuffles`.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::barrier::{await_arrival, pace};
use crate::presenter::{CellEvent, MoveCommand, Presenter};
use tile_cascade_core::{
    BoardConfig, BombEngine, DeadlockDetector, Filler, GameRng, GridState, LevelGoal,
    MatchFinder, ScoreAward, ScoreBoard, ShuffleRecovery,
};
use tile_cascade_types::{Coord, PieceId, Position};

/// Where the board is in its resolution cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Swapping,
    Resolving,
    Collapsing,
    SettleCheck,
    Refilling,
    Shuffling,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Swapping => "swapping",
            Phase::Resolving => "resolving",
            Phase::Collapsing => "collapsing",
            Phase::SettleCheck => "settle_check",
            Phase::Refilling => "refilling",
            Phase::Shuffling => "shuffling",
        }
    }
}

/// What one driver run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    /// Passes run (one per driver iteration)
    pub passes: u32,
    /// Highest multiplier reached
    pub max_multiplier: u32,
    pub pieces_cleared: u32,
    pub shuffles: u32,
}

/// Borrowed view of the board that drives one resolution to completion
pub struct CascadeResolver<'a, P: Presenter> {
    pub(crate) grid: &'a mut GridState,
    pub(crate) config: &'a BoardConfig,
    pub(crate) rng: &'a mut GameRng,
    pub(crate) presenter: &'a mut P,
    pub(crate) stats: &'a mut ScoreBoard,
    pub(crate) phase: &'a mut Phase,
    pub(crate) goal: Option<&'a mut LevelGoal>,
}

impl<'a, P: Presenter> CascadeResolver<'a, P> {
    pub fn new(
        grid: &'a mut GridState,
        config: &'a BoardConfig,
        rng: &'a mut GameRng,
        presenter: &'a mut P,
        stats: &'a mut ScoreBoard,
        phase: &'a mut Phase,
    ) -> Self {
        Self {
            grid,
            config,
            rng,
            presenter,
            stats,
            phase,
            goal: None,
        }
    }

    /// Also feed every score award to a level goal
    pub fn with_goal(mut self, goal: Option<&'a mut LevelGoal>) -> Self {
        self.goal = goal;
        self
    }

    fn enter(&mut self, phase: Phase) {
        if *self.phase != phase {
            trace!(from = self.phase.as_str(), to = phase.as_str(), "phase");
            *self.phase = phase;
        }
    }

    /// Resolve `initial` and everything it sets off, ending Idle with no match
    /// on the board
    pub async fn run(&mut self, initial: BTreeSet<Coord>) -> CascadeReport {
        let mut report = CascadeReport::default();
        let mut set = initial;

        'driver: loop {
            while !set.is_empty() {
                if report.passes >= self.config.max_passes {
                    warn!(
                        passes = report.passes,
                        pending = set.len(),
                        "pass limit reached, leaving matches on the board"
                    );
                    break 'driver;
                }
                let multiplier = self.resolve_pass(set, &mut report).await;
                report.passes += 1;
                report.max_multiplier = report.max_multiplier.max(multiplier);

                self.refill().await;
                set = MatchFinder::new(self.grid).find_all_matches();
                if !set.is_empty() {
                    debug!(pieces = set.len(), "refill produced matches");
                }
            }

            if !DeadlockDetector::new(self.grid).is_deadlocked() {
                break;
            }
            if report.shuffles >= self.config.max_shuffles {
                warn!(
                    shuffles = report.shuffles,
                    "board still deadlocked, giving up on shuffling"
                );
                break;
            }

            report.shuffles += 1;
            set = self.shuffle().await;
        }

        self.enter(Phase::Idle);
        report
    }

    /// One pass with its chained settle steps. Returns the final multiplier.
    pub async fn resolve_pass(
        &mut self,
        initial: BTreeSet<Coord>,
        report: &mut CascadeReport,
    ) -> u32 {
        let mut multiplier = 1;
        let mut set = initial;

        loop {
            self.enter(Phase::Resolving);
            let expansion = BombEngine::new(self.grid, &self.config.bombs).expand(&set, self.rng);
            let mut cleared = expansion.cleared;

            let blockers: BTreeSet<Coord> = cleared
                .iter()
                .copied()
                .filter(|&c| self.grid.piece(c).is_some_and(|p| p.is_blocker()))
                .chain(self.grid.blockers_in_row(0, true))
                .collect();
            if !blockers.is_empty() {
                self.grid.remove_blockers(blockers.len() as u32);
                debug!(
                    blockers = blockers.len(),
                    remaining = self.grid.blocker_count(),
                    "blockers cleared"
                );
            }
            cleared.extend(blockers);

            let mut columns = self.clear(&cleared, &expansion.detonated, multiplier, report);
            columns.extend(self.activate_pending_bombs());
            pace(self.config.timing.step_delay()).await;

            self.enter(Phase::Collapsing);
            let moved = self.collapse(&columns);
            await_arrival(self.presenter, &moved).await;

            self.enter(Phase::SettleCheck);
            let mut next =
                MatchFinder::new(self.grid).find_matches_for(moved.iter().map(|&(_, to)| to));
            next.extend(self.grid.blockers_in_row(0, true));
            if next.is_empty() {
                return multiplier;
            }

            multiplier += 1;
            debug!(multiplier, pieces = next.len(), "chain continues");
            set = next;
        }
    }

    /// Destroy every piece in `cleared`; returns the touched columns
    fn clear(
        &mut self,
        cleared: &BTreeSet<Coord>,
        detonated: &BTreeSet<Coord>,
        multiplier: u32,
        report: &mut CascadeReport,
    ) -> BTreeSet<i32> {
        let batch = cleared.len();
        let mut columns = BTreeSet::new();

        for &at in cleared {
            let Some(piece) = self.grid.take(at) else {
                continue;
            };
            columns.insert(at.x);

            let event = match piece.bomb_kind() {
                Some(kind) if detonated.contains(&at) => CellEvent::BombBurst {
                    piece: piece.id,
                    at,
                    kind,
                },
                _ => CellEvent::Clear { piece: piece.id, at },
            };
            self.presenter.cell_event(event);

            let award = ScoreAward::new(&piece, multiplier, batch);
            self.stats.record(&award);
            if let Some(goal) = self.goal.as_deref_mut() {
                goal.record(&award);
            }
            self.presenter.score(award);
            report.pieces_cleared += 1;

            if let Some(tile) = self.grid.break_tile(at) {
                self.presenter.cell_event(CellEvent::BreakTile {
                    at: tile.coord,
                    remaining: tile.remaining,
                });
            }
        }

        debug!(pieces = report.pieces_cleared, batch, multiplier, "cleared");
        columns
    }

    /// Place the swap's pending bombs into their (now empty) cells
    fn activate_pending_bombs(&mut self) -> BTreeSet<i32> {
        let mut columns = BTreeSet::new();
        for bomb in self.grid.take_pending_bombs() {
            let at = bomb.coord;
            let id = bomb.id;
            if self.grid.place(at, bomb).is_err() {
                warn!(at = %at, "bomb cell occupied, bomb dropped");
                continue;
            }
            self.presenter.move_piece(MoveCommand {
                piece: id,
                from: Position::from(at),
                to: at,
                duration: std::time::Duration::ZERO,
                easing: self.config.timing.easing,
            });
            columns.insert(at.x);
        }
        columns
    }

    /// Compact every listed column downwards. Obstacles are holes that never
    /// hold a piece: pieces fall through them into the next free slot below.
    /// Returns `(piece, new slot)` for every piece that moved.
    fn collapse(&mut self, columns: &BTreeSet<i32>) -> Vec<(PieceId, Coord)> {
        let height = self.grid.height() as i32;
        let mut moved = Vec::new();

        for &x in columns {
            let slots: Vec<i32> = (0..height)
                .filter(|&y| !self.grid.is_obstacle(Coord::new(x, y)))
                .collect();
            let mut write = 0;
            for &y in &slots {
                let at = Coord::new(x, y);
                let Some(piece) = self.grid.piece(at).map(|p| p.id) else {
                    continue;
                };
                let target = slots[write];
                write += 1;
                if target == y {
                    continue;
                }

                let to = Coord::new(x, target);
                if self.grid.relocate(at, to) {
                    let from = self.presenter.position(piece).unwrap_or(Position::from(at));
                    self.presenter.move_piece(MoveCommand {
                        piece,
                        from,
                        to,
                        duration: self.config.timing.collapse((y - target) as u32),
                        easing: self.config.timing.easing,
                    });
                    moved.push((piece, to));
                }
            }
        }

        trace!(moved = moved.len(), "collapsed");
        moved
    }

    /// Fill every vacancy and wait for the new pieces to land
    pub async fn refill(&mut self) {
        self.enter(Phase::Refilling);
        let spawns = Filler::new(self.grid, self.config, self.rng).fill();
        if spawns.is_empty() {
            return;
        }

        let timing = self.config.timing;
        let targets: Vec<(PieceId, Coord)> = spawns.iter().map(|s| (s.piece, s.at)).collect();
        for &(piece, at) in &targets {
            self.presenter.move_piece(MoveCommand {
                piece,
                from: Position::new(at.x as f32, (at.y + timing.fill_y_offset) as f32),
                to: at,
                duration: timing.fill(),
                easing: timing.easing,
            });
        }
        await_arrival(self.presenter, &targets).await;
        debug!(pieces = targets.len(), "refilled");
        pace(timing.step_delay()).await;
    }

    /// Reshuffle ordinary pieces, send every piece to its slot and return the
    /// matches the new layout holds
    pub async fn shuffle(&mut self) -> BTreeSet<Coord> {
        self.enter(Phase::Shuffling);
        debug!("board deadlocked, shuffling");
        pace(self.config.timing.step_delay()).await;

        let moves = ShuffleRecovery::new(self.grid, self.rng).shuffle();
        let origins: HashMap<PieceId, Coord> = moves.iter().map(|m| (m.piece, m.from)).collect();
        let targets: Vec<(PieceId, Coord)> = self.grid.pieces().map(|p| (p.id, p.coord)).collect();

        let timing = self.config.timing;
        for &(piece, to) in &targets {
            let origin = origins.get(&piece).copied().unwrap_or(to);
            let from = self
                .presenter
                .position(piece)
                .unwrap_or(Position::from(origin));
            self.presenter.move_piece(MoveCommand {
                piece,
                from,
                to,
                duration: timing.swap(),
                easing: timing.easing,
            });
        }
        await_arrival(self.presenter, &targets).await;
        trace!(shuffled = moves.len(), pieces = targets.len(), "shuffle settled");

        MatchFinder::new(self.grid).find_all_matches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::InstantPresenter;
    use tile_cascade_core::Timing;
    use tile_cascade_types::MatchColor;

    struct Fixture {
        grid: GridState,
        config: BoardConfig,
        rng: GameRng,
        presenter: InstantPresenter,
        stats: ScoreBoard,
        phase: Phase,
    }

    impl Fixture {
        fn new(rows: &[&str]) -> Self {
            let grid = GridState::from_rows(rows);
            let config = BoardConfig {
                width: grid.width(),
                height: grid.height(),
                timing: Timing::instant(),
                ..BoardConfig::default()
            };
            Self {
                grid,
                config,
                rng: GameRng::new(1),
                presenter: InstantPresenter::new(),
                stats: ScoreBoard::default(),
                phase: Phase::Idle,
            }
        }

        fn resolver(&mut self) -> CascadeResolver<'_, InstantPresenter> {
            CascadeResolver::new(
                &mut self.grid,
                &self.config,
                &mut self.rng,
                &mut self.presenter,
                &mut self.stats,
                &mut self.phase,
            )
        }
    }

    fn set(list: &[(i32, i32)]) -> BTreeSet<Coord> {
        list.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_collapse_falls_through_obstacles() {
        let mut fx = Fixture::new(&["R", "G", "#", "B", ".", "Y", "."]);
        let moved = fx.resolver().collapse(&BTreeSet::from([0]));
        assert_eq!(fx.grid.to_rows(), vec![".", ".", "#", "R", "G", "B", "Y"]);
        assert_eq!(moved.len(), 4);
    }

    #[test]
    fn test_collapse_duration_scales_with_distance() {
        let mut fx = Fixture::new(&["R", ".", ".", "G"]);
        fx.config.timing.collapse_ms_per_cell = 100;
        fx.resolver().collapse(&BTreeSet::from([0]));
        let cmd = fx.presenter.moves.last().unwrap();
        assert_eq!(cmd.to, Coord::new(0, 1));
        assert_eq!(cmd.duration, std::time::Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_pass_clears_and_collapses() {
        let mut fx = Fixture::new(&["G..", "B..", "RRR"]);
        let mut report = CascadeReport::default();
        let multiplier = fx
            .resolver()
            .resolve_pass(set(&[(0, 0), (1, 0), (2, 0)]), &mut report)
            .await;

        assert_eq!(multiplier, 1);
        assert_eq!(fx.grid.to_rows(), vec!["...", "G..", "B.."]);
        assert_eq!(fx.stats.score, 60);
        assert_eq!(report.pieces_cleared, 3);
        assert_eq!(fx.phase, Phase::SettleCheck);
    }

    #[tokio::test]
    async fn test_chain_raises_multiplier() {
        // Clearing the red column drops the top G between two other Gs
        let mut fx = Fixture::new(&[".G.", "BRY", "YRB", "GRG"]);
        let mut report = CascadeReport::default();
        let multiplier = fx
            .resolver()
            .resolve_pass(set(&[(1, 0), (1, 1), (1, 2)]), &mut report)
            .await;

        assert_eq!(multiplier, 2);
        assert_eq!(fx.grid.to_rows(), vec!["...", "...", "B.Y", "Y.B"]);
        // 3 reds at x1, then 3 greens at x2
        assert_eq!(fx.stats.score, 3 * 20 + 3 * 40);
        assert_eq!(fx.stats.best_chain, 2);
    }

    #[tokio::test]
    async fn test_bottom_blockers_clear_and_count() {
        let mut fx = Fixture::new(&["X..", "RRR"]);
        assert_eq!(fx.grid.blocker_count(), 1);
        let mut report = CascadeReport::default();
        fx.resolver()
            .resolve_pass(set(&[(0, 0), (1, 0), (2, 0)]), &mut report)
            .await;

        assert_eq!(fx.grid.blocker_count(), 0);
        assert!(fx.grid.all_blockers().is_empty());
        assert_eq!(report.pieces_cleared, 4);
    }

    #[tokio::test]
    async fn test_breakable_counts_down() {
        let mut fx = Fixture::new(&["RRR"]);
        fx.grid
            .set_cell(Coord::new(1, 0), tile_cascade_types::CellKind::Breakable { counter: 2 });
        let mut report = CascadeReport::default();
        fx.resolver()
            .resolve_pass(set(&[(0, 0), (1, 0), (2, 0)]), &mut report)
            .await;

        assert!(fx.presenter.events.contains(&CellEvent::BreakTile {
            at: Coord::new(1, 0),
            remaining: 1
        }));
    }

    #[tokio::test]
    async fn test_run_ends_stable() {
        let mut fx = Fixture::new(&["GBYR", "BYRG", "RRRB", "YGBY"]);
        let report = fx.resolver().run(set(&[(0, 1), (1, 1), (2, 1)])).await;

        assert!(report.passes >= 1);
        assert_eq!(fx.phase, Phase::Idle);
        assert!(MatchFinder::new(&fx.grid).find_all_matches().is_empty());
        assert!(fx.grid.coords().all(|c| !fx.grid.is_vacant(c)));
        assert_eq!(fx.grid.blocker_count() as usize, fx.grid.all_blockers().len());
    }

    #[tokio::test]
    async fn test_pending_bomb_is_placed_after_clear() {
        let mut fx = Fixture::new(&["GBY", "RRR"]);
        let mut bomb = fx.grid.mint(
            MatchColor::Red,
            tile_cascade_types::PieceKind::Bomb {
                bomb: tile_cascade_types::BombKind::Row,
            },
        );
        bomb.coord = Coord::new(1, 0);
        fx.grid.push_pending_bomb(bomb).unwrap();

        let mut report = CascadeReport::default();
        fx.resolver()
            .resolve_pass(set(&[(0, 0), (1, 0), (2, 0)]), &mut report)
            .await;

        // G and Y fall beside the bomb; B stays on top of it
        let at_bottom = fx.grid.piece(Coord::new(1, 0)).unwrap();
        assert_eq!(at_bottom.id, bomb.id);
        assert!(fx.grid.pending_bombs().is_empty());
    }

    #[tokio::test]
    async fn test_pass_limit_ends_run() {
        // A one-color palette refills straight into new matches
        let mut fx = Fixture::new(&["GGG"]);
        fx.config.palette = vec![tile_cascade_core::PaletteEntry {
            color: MatchColor::Green,
            weight: 1,
        }];
        fx.config.max_passes = 5;

        let report = fx.resolver().run(set(&[(0, 0), (1, 0), (2, 0)])).await;
        assert_eq!(report.passes, 5);
        assert_eq!(report.pieces_cleared, 15);
        assert_eq!(fx.phase, Phase::Idle);
        assert_eq!(fx.grid.piece_count(), 3);
    }

    #[tokio::test]
    async fn test_awards_feed_level_goal() {
        let mut fx = Fixture::new(&["G..", "B..", "RRR"]);
        let mut goal = LevelGoal::new(&tile_cascade_core::GoalConfig {
            collect: vec![tile_cascade_core::CollectionTarget {
                color: MatchColor::Red,
                count: 4,
            }],
            ..tile_cascade_core::GoalConfig::default()
        });
        let mut report = CascadeReport::default();
        fx.resolver()
            .with_goal(Some(&mut goal))
            .resolve_pass(set(&[(0, 0), (1, 0), (2, 0)]), &mut report)
            .await;

        assert_eq!(goal.score(), fx.stats.score);
        assert_eq!(goal.remaining()[0].count, 1);
    }

    #[tokio::test]
    async fn test_shuffle_moves_every_piece() {
        let mut fx = Fixture::new(&["RX.", "BGY"]);
        let bomb = fx.grid.mint(
            MatchColor::None,
            tile_cascade_types::PieceKind::Bomb {
                bomb: tile_cascade_types::BombKind::Color,
            },
        );
        fx.grid.place(Coord::new(2, 1), bomb).unwrap();

        fx.resolver().shuffle().await;

        assert_eq!(fx.presenter.moves.len(), 6);
        for piece in fx.grid.pieces() {
            let cmd = fx.presenter.moves.iter().find(|m| m.piece == piece.id).unwrap();
            assert_eq!(cmd.to, piece.coord);
        }
        assert_eq!(fx.grid.piece(Coord::new(2, 1)).map(|p| p.id), Some(bomb.id));
        assert!(fx.grid.piece(Coord::new(1, 1)).is_some_and(|p| p.is_blocker()));
    }
}
