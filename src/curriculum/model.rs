//! Curriculum model
//!
//! A course is an ordered list of modules, each holding an ordered list of
//! lessons. The engine only reads this structure; lesson prose lives with
//! the front end.

use serde::{Deserialize, Serialize};

use crate::config::engine::{MASTERY_THRESHOLD, MIN_EXERCISES_PER_CONCEPT};

/// Exercises required to finish a theory lesson
pub const THEORY_EXERCISES_REQUIRED: u32 = 3;

/// What a lesson asks of the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LessonKind {
    Theory,
    Concept,
    Exercise,
    Challenge,
    Review,
}

/// Lesson difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// A lesson within a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier (e.g., "py-fund-1")
    pub id: String,
    /// Display title
    pub title: String,
    /// Lesson kind
    pub kind: LessonKind,
    /// Difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
    /// XP granted when the lesson's theory check passes
    pub xp_reward: u32,
    /// Minimum exercises before the lesson can count as mastered
    pub exercises_required: u32,
}

impl Lesson {
    /// Create a lesson with the standard exercise requirement for its kind
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: LessonKind,
        difficulty: Difficulty,
        xp_reward: u32,
    ) -> Self {
        let exercises_required = match kind {
            LessonKind::Theory => THEORY_EXERCISES_REQUIRED,
            _ => MIN_EXERCISES_PER_CONCEPT,
        };
        Self { id: id.into(), title: title.into(), kind, difficulty, xp_reward, exercises_required }
    }

    /// Concept id used when scheduling a review after the theory check
    pub fn theory_concept_id(&self) -> String {
        format!("theory-{}", self.id)
    }

    /// Concept id used when scheduling a review after exercise mastery
    pub fn exercise_concept_id(&self) -> String {
        format!("exercises-{}", self.id)
    }
}

/// A module in the course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Unique module identifier (e.g., "py-fundamentals")
    pub id: String,
    /// Display title
    pub title: String,
    /// Grouping used by analytics (e.g., "python-basics")
    #[serde(default)]
    pub category: String,
    /// Mastery this module must reach before the next one unlocks
    #[serde(default = "default_required_mastery")]
    pub required_mastery: u8,
    /// Exercises across the module expected for mastery
    #[serde(default)]
    pub min_exercises_to_master: u32,
    /// Lessons in order
    pub lessons: Vec<Lesson>,
}

fn default_required_mastery() -> u8 {
    MASTERY_THRESHOLD
}

impl Module {
    /// Create an empty module
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        min_exercises_to_master: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            required_mastery: MASTERY_THRESHOLD,
            min_exercises_to_master,
            lessons: Vec::new(),
        }
    }

    /// Builder-style lesson append
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Find a lesson in this module
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Does this module contain the lesson?
    pub fn contains(&self, lesson_id: &str) -> bool {
        self.lesson(lesson_id).is_some()
    }

    /// Total XP available from the module's lessons
    pub fn total_xp(&self) -> u32 {
        self.lessons.iter().map(|l| l.xp_reward).sum()
    }
}

/// XP level: `floor(sqrt(xp / 100)) + 1`
pub fn level_from_xp(xp: u64) -> u32 {
    ((xp as f64 / 100.0).sqrt().floor() as u32).saturating_add(1)
}

/// XP at which `level` ends and the next one begins
pub fn xp_for_level(level: u32) -> u64 {
    u64::from(level).pow(2) * 100
}
