//! The Ebbinghaus interval ladder
//!
//! Reviews are spaced on a fixed sequence of day counts. A good review
//! climbs one rung, an adequate one holds, a poor one drops one rung.

use crate::config::EngineConfig;

/// A review score between 0.0 (forgot) and 1.0 (perfect recall)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Performance(f64);

impl Performance {
    /// Score a correct review answer
    pub const CORRECT: Performance = Performance(1.0);
    /// Score an incorrect review answer
    pub const INCORRECT: Performance = Performance(0.4);

    /// Clamp a raw score into `[0, 1]`; NaN counts as a failed review
    pub fn new(score: f64) -> Self {
        if score.is_nan() { Self(0.0) } else { Self(score.clamp(0.0, 1.0)) }
    }

    /// Map a right/wrong review answer to a score
    pub fn from_answer(correct: bool) -> Self {
        if correct { Self::CORRECT } else { Self::INCORRECT }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Performance {
    fn from(score: f64) -> Self {
        Self::new(score)
    }
}

/// Where a review moves the item on the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advance,
    Hold,
    Regress,
}

/// Interval ladder with performance thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalLadder {
    rungs: Vec<u32>,
    good: f64,
    adequate: f64,
}

impl Default for IntervalLadder {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl IntervalLadder {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            rungs: config.ladder(),
            good: config.good_performance,
            adequate: config.adequate_performance,
        }
    }

    /// Ladder rungs in days, ascending and never empty
    pub fn rungs(&self) -> &[u32] {
        &self.rungs
    }

    /// Interval for a newly scheduled item
    pub fn first(&self) -> u32 {
        self.rungs[0]
    }

    /// Longest interval
    pub fn last(&self) -> u32 {
        self.rungs[self.rungs.len() - 1]
    }

    /// Classify a review score
    pub fn step(&self, performance: Performance) -> Step {
        let score = performance.value();
        if score >= self.good {
            Step::Advance
        } else if score >= self.adequate {
            Step::Hold
        } else {
            Step::Regress
        }
    }

    /// Rung index for an interval
    ///
    /// Intervals that are not on the ladder (hand-edited data, a changed
    /// ladder) snap to the first rung at or above them, or to the last rung.
    pub fn index_of(&self, interval: u32) -> usize {
        self.rungs.iter().position(|&r| r >= interval).unwrap_or(self.rungs.len() - 1)
    }

    /// Interval after a review
    pub fn next_interval(&self, current: u32, performance: Performance) -> u32 {
        let index = self.index_of(current);
        let next = match self.step(performance) {
            Step::Advance => (index + 1).min(self.rungs.len() - 1),
            Step::Hold => index,
            Step::Regress => index.saturating_sub(1),
        };
        self.rungs[next]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> IntervalLadder {
        IntervalLadder::default()
    }

    #[test]
    fn good_review_advances() {
        assert_eq!(ladder().next_interval(7, Performance::new(0.9)), 14);
        assert_eq!(ladder().next_interval(1, Performance::CORRECT), 3);
    }

    #[test]
    fn poor_review_regresses() {
        assert_eq!(ladder().next_interval(14, Performance::new(0.5)), 7);
        assert_eq!(ladder().next_interval(3, Performance::INCORRECT), 1);
    }

    #[test]
    fn adequate_review_holds() {
        assert_eq!(ladder().next_interval(7, Performance::new(0.7)), 7);
        assert_eq!(ladder().next_interval(7, Performance::new(0.6)), 7);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(ladder().step(Performance::new(0.8)), Step::Advance);
        assert_eq!(ladder().step(Performance::new(0.6)), Step::Hold);
        assert_eq!(ladder().step(Performance::new(0.59)), Step::Regress);
    }

    #[test]
    fn ladder_ends_are_clamped() {
        assert_eq!(ladder().next_interval(120, Performance::CORRECT), 120);
        assert_eq!(ladder().next_interval(1, Performance::new(0.0)), 1);
    }

    #[test]
    fn out_of_range_performance_is_clamped() {
        assert_eq!(Performance::new(7.0).value(), 1.0);
        assert_eq!(Performance::new(-3.0).value(), 0.0);
        assert_eq!(Performance::new(f64::NAN).value(), 0.0);
        assert_eq!(ladder().next_interval(14, Performance::from(-1.0)), 7);
    }

    #[test]
    fn off_ladder_intervals_snap_up() {
        assert_eq!(ladder().index_of(5), 2);
        assert_eq!(ladder().index_of(0), 0);
        assert_eq!(ladder().index_of(500), 6);
        assert_eq!(ladder().next_interval(5, Performance::new(0.7)), 7);
    }

    #[test]
    fn custom_ladder_from_config() {
        let config = EngineConfig { review_intervals: vec![2, 4], ..EngineConfig::default() };
        let ladder = IntervalLadder::from_config(&config);
        assert_eq!(ladder.first(), 2);
        assert_eq!(ladder.last(), 4);
        assert_eq!(ladder.next_interval(2, Performance::CORRECT), 4);
    }

    #[test]
    fn answer_mapping() {
        assert_eq!(Performance::from_answer(true).value(), 1.0);
        assert_eq!(Performance::from_answer(false).value(), 0.4);
    }
}
