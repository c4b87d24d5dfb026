//! Arrival barrier and step pacing
//!
//! The only two places the resolver suspends.

use std::time::Duration;

use tracing::trace;

use crate::presenter::Presenter;
use tile_cascade_types::{Coord, PieceId};

/// Wait until every `(piece, slot)` pair has arrived.
///
/// A piece the presenter does not report counts as arrived.
pub async fn await_arrival<P: Presenter>(presenter: &mut P, targets: &[(PieceId, Coord)]) {
    let mut frames = 0u64;
    while !all_arrived(presenter, targets) {
        presenter.next_frame().await;
        frames += 1;
    }
    if frames > 0 {
        trace!(pieces = targets.len(), frames, "pieces arrived");
    }
}

pub fn all_arrived<P: Presenter>(presenter: &P, targets: &[(PieceId, Coord)]) -> bool {
    targets.iter().all(|&(piece, slot)| {
        presenter
            .position(piece)
            .map_or(true, |pos| pos.has_arrived(slot))
    })
}

/// Pause between cascade steps; a zero delay still yields once
pub async fn pace(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
