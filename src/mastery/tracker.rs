//! Per-lesson exercise statistics and the mastery score derived from them

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::curriculum::{Lesson, Module};

/// Exercise statistics for one lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStats {
    /// Lesson identifier
    pub lesson_id: String,

    /// Owning module, resolved from the catalog when first known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    /// Exercises answered, right or wrong
    #[serde(default)]
    pub exercises_completed: u32,

    /// Exercises answered correctly
    #[serde(default)]
    pub correct_answers: u32,

    /// Submitted attempts
    #[serde(default)]
    pub total_attempts: u32,

    /// Last attempt or, for review-only records, creation time
    pub last_practiced: DateTime<Utc>,

    /// Mastery score (0-100)
    #[serde(default)]
    pub mastery_level: u8,

    /// Completed reviews for this lesson
    #[serde(default)]
    pub review_count: u32,
}

impl LessonStats {
    /// Zeroed stats for a lesson
    pub fn new(lesson_id: &str, module_id: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            lesson_id: lesson_id.to_string(),
            module_id: module_id.map(str::to_string),
            exercises_completed: 0,
            correct_answers: 0,
            total_attempts: 0,
            last_practiced: now,
            mastery_level: 0,
            review_count: 0,
        }
    }

    /// Fraction of attempts answered correctly, 0 before the first attempt
    pub fn correct_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) / f64::from(self.total_attempts)
        }
    }

    /// Recompute the mastery score from the counters
    ///
    /// `round(correct_rate * min(1, completed / floor) * 100)`. Accuracy and
    /// volume multiply, so neither one alone yields a high score.
    pub fn compute_mastery(&self, config: &EngineConfig) -> u8 {
        let progress =
            (f64::from(self.exercises_completed) / f64::from(config.exercise_floor())).min(1.0);
        (self.correct_rate() * progress * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Accuracy for possibly missing stats
pub fn correct_rate(stats: Option<&LessonStats>) -> f64 {
    stats.map_or(0.0, LessonStats::correct_rate)
}

/// Apply one exercise attempt to a lesson's stats
///
/// Creates the record on first use. The caller is responsible for copying
/// the returned `mastery_level` into any cache it keeps.
pub fn record_attempt(
    stats: &mut HashMap<String, LessonStats>,
    lesson_id: &str,
    module_id: Option<&str>,
    was_correct: bool,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> LessonStats {
    let entry = stats
        .entry(lesson_id.to_string())
        .or_insert_with(|| LessonStats::new(lesson_id, module_id, now));

    if entry.module_id.is_none() {
        entry.module_id = module_id.map(str::to_string);
    }

    entry.exercises_completed = entry.exercises_completed.saturating_add(1);
    entry.total_attempts = entry.total_attempts.saturating_add(1);
    if was_correct {
        entry.correct_answers = entry.correct_answers.saturating_add(1);
    }
    entry.last_practiced = now;
    entry.mastery_level = entry.compute_mastery(config);

    tracing::debug!(
        lesson = lesson_id,
        correct = was_correct,
        attempts = entry.total_attempts,
        mastery = entry.mastery_level,
        "Recorded attempt"
    );

    entry.clone()
}

/// Has the learner done enough, accurately enough, to stop serving exercises?
pub fn has_mastered(stats: Option<&LessonStats>, lesson: &Lesson, config: &EngineConfig) -> bool {
    let Some(stats) = stats else {
        return false;
    };
    let required = lesson.exercises_required.max(config.min_exercises_per_concept);
    stats.exercises_completed >= required && stats.correct_rate() >= config.min_correct_rate
}

/// Mean mastery across a module's lessons, unstarted lessons counting as zero
pub fn module_mastery(module: &Module, stats: &HashMap<String, LessonStats>) -> u8 {
    if module.lessons.is_empty() {
        return 0;
    }
    let total: u32 = module
        .lessons
        .iter()
        .map(|l| stats.get(&l.id).map_or(0, |s| u32::from(s.mastery_level)))
        .sum();
    (f64::from(total) / module.lessons.len() as f64).round() as u8
}

/// Estimated retention since the lesson was last practiced
///
/// `100 * exp(-days / 7)`; a dashboard indicator only.
pub fn retention_since_practice(last_practiced: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - last_practiced).num_seconds().max(0) as f64 / 86_400.0;
    (100.0 * (-days / 7.0).exp()).max(0.0)
}
