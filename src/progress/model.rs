//! The persisted progress aggregate

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mastery::{BlockedModule, LessonStats};
use crate::review::ReviewItem;
use crate::weak_points::WeakPoint;

/// Badge rarity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

/// An earned achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub earned_at: DateTime<Utc>,
    #[serde(default)]
    pub rarity: Rarity,
}

/// Exam difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamMode {
    #[default]
    Normal,
    Hard,
}

/// Outcome of a timed exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Percentage score (0-100)
    pub score: u8,
    pub total_questions: u32,
    #[serde(alias = "timeSpent")]
    pub time_spent_seconds: u64,
    #[serde(default)]
    pub mode: ExamMode,
    #[serde(default)]
    pub topics_covered: Vec<String>,
    #[serde(default)]
    pub incorrect_questions: Vec<String>,
}

/// Everything the engine knows about the learner
///
/// Missing fields deserialize to their defaults, so documents written by
/// older versions load with empty collections instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub total_xp: u64,
    pub level: u32,
    pub streak: u32,
    pub longest_streak: u32,
    /// Completed lesson ids in completion order, no duplicates
    pub completed_lessons: Vec<String>,
    /// Cache of `lesson_stats[id].mastery_level`, written together with it
    pub mastery_levels: HashMap<String, u8>,
    pub weak_points: Vec<WeakPoint>,
    pub strength_points: Vec<String>,
    pub last_active: DateTime<Utc>,
    pub daily_goal: u32,
    pub daily_progress: u32,
    pub badges: Vec<Badge>,
    pub exam_history: Vec<ExamResult>,
    pub review_schedule: Vec<ReviewItem>,
    pub lesson_stats: HashMap<String, LessonStats>,
    /// Last computed gate results; recomputed on demand, never written
    #[serde(skip_serializing)]
    pub blocked_modules: Vec<BlockedModule>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            user_id: "guest".to_string(),
            total_xp: 0,
            level: 1,
            streak: 0,
            longest_streak: 0,
            completed_lessons: Vec::new(),
            mastery_levels: HashMap::new(),
            weak_points: Vec::new(),
            strength_points: Vec::new(),
            last_active: DateTime::<Utc>::default(),
            daily_goal: 50,
            daily_progress: 0,
            badges: Vec::new(),
            exam_history: Vec::new(),
            review_schedule: Vec::new(),
            lesson_stats: HashMap::new(),
            blocked_modules: Vec::new(),
        }
    }
}

impl UserProgress {
    /// Fresh progress for a new learner
    pub fn new(daily_goal: u32, now: DateTime<Utc>) -> Self {
        Self { daily_goal, last_active: now, ..Self::default() }
    }

    /// Store a lesson's stats and mirror its mastery into the cache
    ///
    /// The only write path for `lesson_stats`, which keeps
    /// `mastery_levels` in step with it.
    pub fn put_lesson_stats(&mut self, stats: LessonStats) {
        self.mastery_levels.insert(stats.lesson_id.clone(), stats.mastery_level);
        self.lesson_stats.insert(stats.lesson_id.clone(), stats);
    }

    /// Rebuild the mastery cache from the stats
    pub fn sync_mastery_levels(&mut self) {
        self.mastery_levels = self.derived_mastery_levels();
    }

    /// Mastery per lesson computed from the stats
    pub fn derived_mastery_levels(&self) -> HashMap<String, u8> {
        self.lesson_stats.iter().map(|(id, s)| (id.clone(), s.mastery_level)).collect()
    }

    /// Does the cache agree with the stats for every lesson?
    pub fn mastery_cache_consistent(&self) -> bool {
        self.lesson_stats
            .iter()
            .all(|(id, s)| self.mastery_levels.get(id) == Some(&s.mastery_level))
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.iter().any(|id| id == lesson_id)
    }

    pub fn weak_point(&self, topic: &str) -> Option<&WeakPoint> {
        self.weak_points.iter().find(|wp| wp.topic == topic)
    }

    pub fn review_item(&self, lesson_id: &str, concept_id: &str) -> Option<&ReviewItem> {
        self.review_schedule.iter().find(|r| r.matches(lesson_id, concept_id))
    }
}
