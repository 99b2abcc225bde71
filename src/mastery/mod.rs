//! Mastery scoring and module gating

pub mod gate;
pub mod tracker;

pub use gate::{BlockedModule, check_access, check_module, relevant_weak_points};
pub use tracker::{LessonStats, correct_rate, has_mastered, module_mastery, record_attempt};
