//! Tuning constants for mastery scoring and review scheduling

use serde::{Deserialize, Serialize};

/// Exercises a learner must attempt before the volume factor reaches full credit
pub const MIN_EXERCISES_PER_CONCEPT: u32 = 25;

/// Accuracy required for a lesson to count as mastered
pub const MIN_CORRECT_RATE: f64 = 0.8;

/// Default mastery percentage a prerequisite module must reach
pub const MASTERY_THRESHOLD: u8 = 80;

/// Review interval ladder in days
pub const REVIEW_INTERVALS: [u32; 7] = [1, 3, 7, 14, 30, 60, 120];

/// Longest review interval accepted from configuration (about a century)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Specific error snippets kept per weak point
pub const MAX_SPECIFIC_ERRORS: usize = 10;

/// Engine configuration
///
/// Every field falls back to its default when missing from `config.json`,
/// so a config file only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attempts needed before the volume factor of the mastery score saturates
    pub min_exercises_per_concept: u32,

    /// Accuracy a lesson needs to be considered mastered (0.0-1.0)
    pub min_correct_rate: f64,

    /// Module mastery (0-100) needed to unlock the next module
    pub mastery_threshold: u8,

    /// Review interval ladder in days, ascending
    pub review_intervals: Vec<u32>,

    /// Review performance at or above which the interval advances
    pub good_performance: f64,

    /// Review performance at or above which the interval holds
    pub adequate_performance: f64,

    /// Ease factor stored on new review items
    pub initial_ease_factor: f64,

    /// Specific error snippets kept per weak point
    pub max_specific_errors: usize,

    /// Daily XP goal for new learners
    pub daily_goal: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_exercises_per_concept: MIN_EXERCISES_PER_CONCEPT,
            min_correct_rate: MIN_CORRECT_RATE,
            mastery_threshold: MASTERY_THRESHOLD,
            review_intervals: REVIEW_INTERVALS.to_vec(),
            good_performance: 0.8,
            adequate_performance: 0.6,
            initial_ease_factor: 2.5,
            max_specific_errors: MAX_SPECIFIC_ERRORS,
            daily_goal: 50,
        }
    }
}

impl EngineConfig {
    /// Ladder with unusable entries removed
    ///
    /// Zero-day rungs are dropped, rungs above [`MAX_INTERVAL_DAYS`] are
    /// capped, and the rest sorted and deduplicated; an empty result falls
    /// back to the default ladder.
    pub fn ladder(&self) -> Vec<u32> {
        let mut rungs: Vec<u32> = self
            .review_intervals
            .iter()
            .filter(|days| **days > 0)
            .map(|days| (*days).min(MAX_INTERVAL_DAYS))
            .collect();
        rungs.sort_unstable();
        rungs.dedup();
        if rungs.is_empty() { REVIEW_INTERVALS.to_vec() } else { rungs }
    }

    /// Attempts floor used by the mastery formula, never zero
    pub fn exercise_floor(&self) -> u32 {
        self.min_exercises_per_concept.max(1)
    }
}
