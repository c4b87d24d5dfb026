//! Level goals - move or time budget, score stars and collection targets
//!
//! A level ends when its counter runs out (moves spent or time elapsed) or when
//! every collection target is met and the top score goal is reached. It is won
//! when the first score goal is reached and every collection target is met.
//!
//! Stars count the score goals reached so far.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreAward;
use crate::types::MatchColor;

/// What runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelCounter {
    #[default]
    Moves,
    Timer,
}

/// Clear `count` ordinary pieces of `color`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionTarget {
    pub color: MatchColor,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    pub counter: LevelCounter,
    /// Move budget when counting moves
    pub moves: u32,
    /// Time budget in seconds when counting time
    pub time_secs: u32,
    /// Ascending score thresholds, one star each
    pub score_goals: Vec<u64>,
    pub collect: Vec<CollectionTarget>,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            counter: LevelCounter::Moves,
            moves: 10,
            time_secs: 60,
            score_goals: vec![1000, 2000, 3000],
            collect: Vec::new(),
        }
    }
}

impl GoalConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.score_goals.is_empty(), "goal needs at least one score goal");
        ensure!(
            self.score_goals.windows(2).all(|w| w[0] <= w[1]),
            "score goals must be ascending"
        );
        match self.counter {
            LevelCounter::Moves => ensure!(self.moves > 0, "move budget must be positive"),
            LevelCounter::Timer => ensure!(self.time_secs > 0, "time budget must be positive"),
        }
        for target in &self.collect {
            ensure!(
                target.color.is_matchable() && target.count > 0,
                "invalid collection target {} x{}",
                target.color.as_str(),
                target.count
            );
        }
        Ok(())
    }
}

/// Running state of a level goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelGoal {
    counter: LevelCounter,
    score_goals: Vec<u64>,
    moves_left: u32,
    time_left_ms: u64,
    score: u64,
    stars: usize,
    /// Pieces still to clear, per target
    remaining: Vec<CollectionTarget>,
}

impl LevelGoal {
    pub fn new(config: &GoalConfig) -> Self {
        Self {
            counter: config.counter,
            score_goals: config.score_goals.clone(),
            moves_left: config.moves,
            time_left_ms: u64::from(config.time_secs) * 1000,
            score: 0,
            stars: 0,
            remaining: config.collect.clone(),
        }
    }

    pub fn counter(&self) -> LevelCounter {
        self.counter
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn time_left_ms(&self) -> u64 {
        self.time_left_ms
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn stars(&self) -> usize {
        self.stars
    }

    pub fn remaining(&self) -> &[CollectionTarget] {
        &self.remaining
    }

    /// Spend one move (no effect on timed levels)
    pub fn count_move(&mut self) {
        if self.counter == LevelCounter::Moves {
            self.moves_left = self.moves_left.saturating_sub(1);
        }
    }

    /// Advance the clock (no effect on move-counted levels)
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.counter == LevelCounter::Timer {
            self.time_left_ms = self.time_left_ms.saturating_sub(u64::from(elapsed_ms));
        }
    }

    /// Feed one cleared piece
    pub fn record(&mut self, award: &ScoreAward) {
        self.score += award.points();
        self.stars = self.score_goals.iter().filter(|&&g| self.score >= g).count();

        if award.color.is_matchable() {
            for target in self.remaining.iter_mut().filter(|t| t.color == award.color) {
                target.count = target.count.saturating_sub(1);
            }
        }
    }

    pub fn collection_complete(&self) -> bool {
        self.remaining.iter().all(|t| t.count == 0)
    }

    fn counter_exhausted(&self) -> bool {
        match self.counter {
            LevelCounter::Moves => self.moves_left == 0,
            LevelCounter::Timer => self.time_left_ms == 0,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.counter_exhausted()
            || (self.collection_complete() && self.stars >= self.score_goals.len())
    }

    pub fn is_winner(&self) -> bool {
        self.stars >= 1 && self.collection_complete()
    }
}
