//! Cascade tests - swaps resolved end to end through the board facade

use std::time::Duration;

use tile_cascade::core::{
    BlockerConfig, BoardConfig, GridState, MatchFinder, PaletteEntry, ScoreAward, Timing,
};
use tile_cascade::engine::{
    CellEvent, InstantPresenter, MatchBoard, MoveCommand, Phase, Presenter, SwapOutcome,
    TweenPresenter,
};
use tile_cascade::types::{BlockerTraits, BombKind, Coord, MatchColor, Move, PieceId, Position};

fn instant_config(grid: &GridState) -> BoardConfig {
    BoardConfig {
        width: grid.width(),
        height: grid.height(),
        timing: Timing::instant(),
        ..BoardConfig::default()
    }
}

fn board(rows: &[&str]) -> MatchBoard<InstantPresenter> {
    let grid = GridState::from_rows(rows);
    let config = instant_config(&grid);
    MatchBoard::with_grid(grid, config, 3, InstantPresenter::new())
}

fn assert_stable<P: Presenter>(board: &MatchBoard<P>) {
    let grid = board.grid();
    assert!(MatchFinder::new(grid).find_all_matches().is_empty());
    assert!(grid.coords().all(|c| grid.is_obstacle(c) || !grid.is_vacant(c)));
    assert_eq!(grid.blocker_count() as usize, grid.all_blockers().len());
    assert_eq!(board.phase(), Phase::Idle);
    assert!(board.input_enabled());
}

/// Board whose refills never spawn red, so a red bomb stays where it lands
fn board_without_red(rows: &[&str]) -> MatchBoard<InstantPresenter> {
    let grid = GridState::from_rows(rows);
    let mut config = instant_config(&grid);
    config.palette.retain(|e| e.color != MatchColor::Red);
    MatchBoard::with_grid(grid, config, 3, InstantPresenter::new())
}

#[tokio::test]
async fn test_non_matching_swap_restores_both_pieces() {
    let mut b = board(&["YRB", "BYR", "RBY"]);
    let a = b.grid().piece(Coord::new(0, 0)).copied().unwrap();
    let c = b.grid().piece(Coord::new(0, 1)).copied().unwrap();

    let outcome = b.submit_swap(Move::new(a.coord, c.coord)).await;
    assert_eq!(outcome, Ok(SwapOutcome::Reverted));
    assert_eq!(b.grid().piece(Coord::new(0, 0)).map(|p| p.id), Some(a.id));
    assert_eq!(b.grid().piece(Coord::new(0, 1)).map(|p| p.id), Some(c.id));
    // Out and back again
    assert_eq!(b.presenter().moves.len(), 9 + 4);
}

#[tokio::test]
async fn test_straight_five_spawns_color_bomb() {
    let mut b = board(&["BYOPT", "YBRGB", "RRGRR"]);
    let outcome = b.submit_swap(Move::new(Coord::new(2, 0), Coord::new(2, 1))).await;

    let Ok(SwapOutcome::Resolved { bombs_spawned, .. }) = outcome else {
        panic!("expected resolved swap, got {:?}", outcome);
    };
    assert_eq!(bombs_spawned, 1);
    // A colorless bomb never matches and nothing else can sweep it here
    assert!(b.grid().piece(Coord::new(2, 0)).is_some_and(|p| p.is_color_bomb()));
    assert_stable(&b);
}

#[tokio::test]
async fn test_corner_five_spawns_area_bomb() {
    let mut b = board_without_red(&["BRYG", "YRGB", "TGRR", "GRBY"]);
    let outcome = b.submit_swap(Move::new(Coord::new(1, 0), Coord::new(1, 1))).await;

    let Ok(SwapOutcome::Resolved { bombs_spawned, .. }) = outcome else {
        panic!("expected resolved swap, got {:?}", outcome);
    };
    assert_eq!(bombs_spawned, 1);
    // The G below holds the bomb in the swapped cell
    let bomb = b.grid().piece(Coord::new(1, 1)).unwrap();
    assert_eq!(bomb.bomb_kind(), Some(BombKind::Area));
    assert_eq!(bomb.color, MatchColor::Red);
    assert_stable(&b);
}

#[tokio::test]
async fn test_horizontal_swap_completing_four_spawns_row_bomb() {
    let mut b = board_without_red(&["BRY", "RGB", "YRG", "GRB"]);
    let outcome = b.submit_swap(Move::new(Coord::new(1, 2), Coord::new(0, 2))).await;

    let Ok(SwapOutcome::Resolved { bombs_spawned, .. }) = outcome else {
        panic!("expected resolved swap, got {:?}", outcome);
    };
    assert_eq!(bombs_spawned, 1);
    // The whole column cleared, so the bomb dropped to the bottom
    let bomb = b.grid().piece(Coord::new(1, 0)).unwrap();
    assert_eq!(bomb.bomb_kind(), Some(BombKind::Row));
    assert!(!b
        .presenter()
        .events
        .iter()
        .any(|e| matches!(e, CellEvent::BombBurst { .. })));
    assert_stable(&b);
}

#[tokio::test]
async fn test_swapping_color_bomb_detonates_it() {
    let mut b = board(&["BYOPT", "YBRGB", "RRGRR"]);
    // First make a color bomb in the bottom row
    let first = b.submit_swap(Move::new(Coord::new(2, 0), Coord::new(2, 1))).await;
    assert!(matches!(first, Ok(SwapOutcome::Resolved { bombs_spawned: 1, .. })));

    let bomb = *b.grid().piece(Coord::new(2, 0)).unwrap();
    assert!(bomb.is_color_bomb());
    let neighbor = bomb
        .coord
        .neighbors()
        .into_iter()
        .find(|&n| b.grid().piece(n).is_some_and(|p| p.is_normal()))
        .unwrap();

    b.presenter_mut().clear_log();
    let outcome = b.submit_swap(Move::new(bomb.coord, neighbor)).await;
    assert!(matches!(outcome, Ok(SwapOutcome::Resolved { .. })));
    let burst = b.presenter().events.iter().any(|e| {
        matches!(e, CellEvent::BombBurst { piece, kind: BombKind::Color, .. } if *piece == bomb.id)
    });
    assert!(burst);
    assert!(!b.grid().pieces().any(|p| p.id == bomb.id));
    assert_stable(&b);
}

#[tokio::test]
async fn test_score_awards_follow_formula() {
    let mut b = board(&["YBPO", "BRBT", "RGRO", "TPYG"]);
    let outcome = b.submit_swap(Move::new(Coord::new(1, 1), Coord::new(1, 2))).await;
    let Ok(SwapOutcome::Resolved { points, .. }) = outcome else {
        panic!("expected resolved swap, got {:?}", outcome);
    };

    let awards: &[ScoreAward] = &b.presenter().awards;
    assert!(awards.len() >= 3);
    assert!(awards[..3].iter().all(|a| a.multiplier == 1 && a.bonus == 0));
    assert_eq!(points, b.presenter().points());
    assert_eq!(b.stats().score, points);
}

#[tokio::test]
async fn test_blocker_falls_to_bottom_and_clears() {
    let mut b = board(&["BXGY", "RRGR"]);
    assert_eq!(b.grid().blocker_count(), 1);

    let outcome = b.submit_swap(Move::new(Coord::new(2, 0), Coord::new(3, 0))).await;
    assert!(matches!(outcome, Ok(SwapOutcome::Resolved { .. })));
    // No blocker kinds configured, so the refill never brings one back
    assert_eq!(b.grid().blocker_count(), 0);
    assert!(b.grid().all_blockers().is_empty());
    assert_stable(&b);
}

#[tokio::test]
async fn test_autoplay_keeps_invariants() {
    for seed in [1u64, 7, 42, 1234] {
        let config = BoardConfig {
            width: 7,
            height: 7,
            timing: Timing::instant(),
            blockers: BlockerConfig {
                kinds: vec![
                    BlockerTraits::default(),
                    BlockerTraits {
                        cleared_by_bomb: true,
                        ..BlockerTraits::default()
                    },
                ],
                max_count: 3,
                spawn_chance: 0.3,
            },
            ..BoardConfig::default()
        };
        let mut b = MatchBoard::new(config, seed, InstantPresenter::new());
        b.setup();

        for _ in 0..15 {
            let Some(mv) = b.hint() else { break };
            let outcome = b.submit_swap(mv).await;
            assert!(matches!(outcome, Ok(SwapOutcome::Resolved { .. })), "seed {}", seed);
            assert_stable(&b);
            assert!(b.grid().blocker_count() <= 3);
        }
    }
}

#[tokio::test]
async fn test_tween_presenter_drives_barrier() {
    let grid = GridState::from_rows(&["YBPO", "BRBT", "RGRO", "TPYG"]);
    let config = BoardConfig {
        width: 4,
        height: 4,
        timing: Timing {
            step_delay_ms: 0,
            ..Timing::default()
        },
        ..BoardConfig::default()
    };
    let presenter = TweenPresenter::headless(Duration::from_millis(50));
    let mut b = MatchBoard::with_grid(grid, config, 9, presenter);

    let outcome = b.submit_swap(Move::new(Coord::new(1, 1), Coord::new(1, 2))).await;
    assert!(matches!(outcome, Ok(SwapOutcome::Resolved { .. })));
    // 500ms swap at 50ms per frame needs ten frames on its own
    assert!(b.presenter().frames >= 10);
    assert_eq!(b.presenter().in_flight(), 0);
    assert_stable(&b);
}

/// Presenter that tracks nothing; every piece counts as arrived
#[derive(Default)]
struct BlindPresenter {
    moves: usize,
    events: usize,
    awards: usize,
}

impl Presenter for BlindPresenter {
    fn move_piece(&mut self, _cmd: MoveCommand) {
        self.moves += 1;
    }

    fn cell_event(&mut self, _event: CellEvent) {
        self.events += 1;
    }

    fn score(&mut self, _award: ScoreAward) {
        self.awards += 1;
    }

    fn position(&self, _piece: PieceId) -> Option<Position> {
        None
    }

    async fn next_frame(&mut self) {
        unreachable!("untracked pieces never wait");
    }
}

#[tokio::test]
async fn test_untracked_pieces_do_not_block() {
    let grid = GridState::from_rows(&["YBPO", "BRBT", "RGRO", "TPYG"]);
    let config = instant_config(&grid);
    let mut b = MatchBoard::with_grid(grid, config, 2, BlindPresenter::default());

    let outcome = b.submit_swap(Move::new(Coord::new(1, 1), Coord::new(1, 2))).await;
    assert!(matches!(outcome, Ok(SwapOutcome::Resolved { .. })));
    assert!(b.presenter().events >= 3);
    assert_eq!(b.presenter().awards, b.stats().pieces_cleared as usize);
    assert!(b.presenter().moves > 0);
}

#[tokio::test]
async fn test_one_color_palette_swap_still_returns() {
    let grid = GridState::from_rows(&["GGB", "GBG", "BGG"]);
    let config = BoardConfig {
        palette: vec![PaletteEntry { color: MatchColor::Green, weight: 1 }],
        max_passes: 8,
        ..instant_config(&grid)
    };
    assert!(config.validate().is_err());
    let mut b = MatchBoard::with_grid(grid, config, 1, InstantPresenter::new());

    let mv = Move::new(Coord::new(2, 1), Coord::new(1, 1));
    let outcome = tokio::time::timeout(Duration::from_secs(5), b.submit_swap(mv))
        .await
        .expect("swap resolution must finish");

    let Ok(SwapOutcome::Resolved { report, .. }) = outcome else {
        panic!("expected resolved swap, got {:?}", outcome);
    };
    assert_eq!(report.passes, 8);
    assert_eq!(b.phase(), Phase::Idle);
    assert!(b.input_enabled());
}
