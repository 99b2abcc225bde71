//! Module gating
//!
//! A module opens once the learner's mean mastery over the lessons of its
//! prerequisite module reaches the required threshold. Checks are pure and
//! cheap enough to run on every navigation into a module.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tracker::LessonStats;
use crate::curriculum::Catalog;
use crate::weak_points::WeakPoint;

/// Shown when the prerequisite module has no recorded practice at all
pub const NOT_STARTED_MESSAGE: &str = "Prerequisite module not started";

/// Why a module is locked, and what to review to unlock it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedModule {
    /// The locked module
    pub module_id: String,
    /// Its prerequisite
    pub required_module_id: String,
    /// Mastery the prerequisite must reach
    pub required_mastery: u8,
    /// Current mean mastery of the prerequisite (rounded)
    pub current_mastery: u8,
    /// Human-readable list of what is missing
    pub missing_concepts: Vec<String>,
    /// Lesson ids to review, in order
    pub recommended_review: Vec<String>,
}

impl BlockedModule {
    /// Percentage points still missing
    pub fn mastery_gap(&self) -> u8 {
        self.required_mastery.saturating_sub(self.current_mastery)
    }

    /// Progress towards unlocking (0-100)
    pub fn unlock_progress(&self) -> u8 {
        if self.required_mastery == 0 {
            return 100;
        }
        let pct = f64::from(self.current_mastery) / f64::from(self.required_mastery) * 100.0;
        pct.round().min(100.0) as u8
    }
}

/// Does a stats record belong to the module?
///
/// The explicit `module_id` wins. Records without one come from documents
/// written before it existed: ask the catalog, then fall back to the old
/// naming convention where lesson ids start with the first two dash
/// segments of the module id.
fn belongs_to(stats: &LessonStats, module_id: &str, catalog: Option<&Catalog>) -> bool {
    if let Some(owner) = &stats.module_id {
        return owner == module_id;
    }
    if let Some(owner) = catalog.and_then(|c| c.module_of_lesson(&stats.lesson_id)) {
        return owner.id == module_id;
    }
    legacy_prefix(module_id).is_some_and(|prefix| stats.lesson_id.starts_with(&prefix))
}

fn legacy_prefix(module_id: &str) -> Option<String> {
    let mut parts = module_id.split('-');
    let first = parts.next().filter(|p| !p.is_empty())?;
    let second = parts.next().unwrap_or_default();
    Some(format!("{first}-{second}"))
}

/// Decide access to `module_id` given its prerequisite
///
/// Returns `None` when access is granted.
pub fn check_access(
    stats: &HashMap<String, LessonStats>,
    module_id: &str,
    required_module_id: &str,
    required_mastery: u8,
    catalog: Option<&Catalog>,
) -> Option<BlockedModule> {
    let mut prerequisite: Vec<&LessonStats> =
        stats.values().filter(|s| belongs_to(s, required_module_id, catalog)).collect();
    prerequisite.sort_by(|a, b| a.lesson_id.cmp(&b.lesson_id));

    if prerequisite.is_empty() {
        return Some(BlockedModule {
            module_id: module_id.to_string(),
            required_module_id: required_module_id.to_string(),
            required_mastery,
            current_mastery: 0,
            missing_concepts: vec![NOT_STARTED_MESSAGE.to_string()],
            recommended_review: Vec::new(),
        });
    }

    let total: f64 = prerequisite.iter().map(|s| f64::from(s.mastery_level)).sum();
    let mean = total / prerequisite.len() as f64;

    if mean >= f64::from(required_mastery) {
        return None;
    }

    let weak_lessons: Vec<String> = prerequisite
        .iter()
        .filter(|s| s.mastery_level < required_mastery)
        .map(|s| s.lesson_id.clone())
        .collect();

    Some(BlockedModule {
        module_id: module_id.to_string(),
        required_module_id: required_module_id.to_string(),
        required_mastery,
        current_mastery: mean.round() as u8,
        missing_concepts: weak_lessons.iter().map(|id| format!("Lesson: {id}")).collect(),
        recommended_review: weak_lessons,
    })
}

/// Check a module against the prerequisite the catalog assigns it
///
/// The first module, and modules the catalog does not know, are open.
pub fn check_module(
    catalog: &Catalog,
    stats: &HashMap<String, LessonStats>,
    module_id: &str,
) -> Option<BlockedModule> {
    let prerequisite = catalog.previous_module(module_id)?;
    check_access(stats, module_id, &prerequisite.id, prerequisite.required_mastery, Some(catalog))
}

/// Weak points worth showing on a locked module's remediation screen
pub fn relevant_weak_points<'a>(
    blocked: &BlockedModule,
    weak_points: &'a [WeakPoint],
) -> Vec<&'a WeakPoint> {
    weak_points
        .iter()
        .filter(|wp| {
            blocked.missing_concepts.contains(&wp.topic)
                || wp.module_id == blocked.required_module_id
        })
        .collect()
}
