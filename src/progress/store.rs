//! The progress store
//!
//! Owns the learner's aggregate and is the only way to change it. Every
//! command mutates the in-memory state and then writes the whole document
//! back; a failed write is logged and the in-memory state is kept. A stored
//! document that cannot be read is moved aside, never overwritten.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use super::model::{Badge, ExamResult, UserProgress};
use super::storage::{self, PROGRESS_KEY, Storage};
use crate::config::EngineConfig;
use crate::curriculum::Catalog;
use crate::error::StorageError;
use crate::mastery::{self, BlockedModule, LessonStats};
use crate::review::{self, Performance, ReviewBuckets, ReviewItem};
use crate::weak_points::{self, ErrorReport, WeakPoint};

/// Single-learner progress store
pub struct ProgressStore<S: Storage> {
    progress: UserProgress,
    config: EngineConfig,
    catalog: Option<Catalog>,
    storage: S,
    /// Off when an unreadable document could not be moved aside
    writes_enabled: bool,
}

impl<S: Storage> ProgressStore<S> {
    /// Open the store, loading and migrating any saved progress
    ///
    /// An unreadable document is moved aside and replaced with fresh
    /// progress, so opening never fails and nothing is overwritten. If it
    /// cannot be moved, the session runs without saving.
    pub fn open(mut storage: S, config: EngineConfig, now: DateTime<Utc>) -> Self {
        let mut writes_enabled = true;
        let progress = match storage::load(&storage) {
            Ok(Some(progress)) => progress,
            Ok(None) => {
                tracing::info!("No saved progress, starting fresh");
                UserProgress::new(config.daily_goal, now)
            }
            Err(e) => {
                tracing::error!("Failed to load progress: {}", e);
                let tag = now.format("%Y%m%dT%H%M%SZ").to_string();
                match storage.set_aside(PROGRESS_KEY, &tag) {
                    Ok(moved) => {
                        tracing::warn!("Unreadable progress kept at {}, starting fresh", moved);
                    }
                    Err(e) => {
                        tracing::error!("Could not move unreadable progress aside, not saving: {}", e);
                        writes_enabled = false;
                    }
                }
                UserProgress::new(config.daily_goal, now)
            }
        };
        Self { progress, config, catalog: None, storage, writes_enabled }
    }

    /// Attach the course catalog used to resolve lesson ownership
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Current snapshot
    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Is progress being written back to storage?
    pub fn writes_enabled(&self) -> bool {
        self.writes_enabled
    }

    /// Write the document, logging instead of failing
    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to save progress: {}", e);
        }
    }

    /// Force a save and report the outcome
    pub fn flush(&mut self) -> crate::error::Result<()> {
        if !self.writes_enabled {
            return Err(StorageError::WritesDisabled);
        }
        storage::save(&mut self.storage, &self.progress)
    }

    // ----- commands -----

    /// Record one exercise answer for a lesson
    pub fn record_attempt(
        &mut self,
        lesson_id: &str,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> LessonStats {
        let module_id = self
            .catalog
            .as_ref()
            .and_then(|c| c.module_of_lesson(lesson_id))
            .map(|m| m.id.clone());

        let updated = mastery::record_attempt(
            &mut self.progress.lesson_stats,
            lesson_id,
            module_id.as_deref(),
            was_correct,
            now,
            &self.config,
        );
        self.progress.put_lesson_stats(updated.clone());
        self.persist();
        updated
    }

    /// Schedule the first review of a concept; a second call is a no-op
    pub fn schedule_review(
        &mut self,
        lesson_id: &str,
        concept_id: &str,
        topic: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let created = review::schedule_review(
            &mut self.progress.review_schedule,
            lesson_id,
            concept_id,
            topic,
            now,
            &self.config,
        );
        if created {
            self.persist();
        }
        created
    }

    /// Apply a review result and bump the lesson's review count
    pub fn complete_review(
        &mut self,
        lesson_id: &str,
        concept_id: &str,
        performance: impl Into<Performance>,
        now: DateTime<Utc>,
    ) -> Option<ReviewItem> {
        let item = review::complete_review(
            &mut self.progress.review_schedule,
            lesson_id,
            concept_id,
            performance.into(),
            now,
            &self.config,
        )?;

        let mut stats = self.progress.lesson_stats.get(lesson_id).cloned().unwrap_or_else(|| {
            let module_id =
                self.catalog.as_ref().and_then(|c| c.module_of_lesson(lesson_id)).map(|m| m.id.as_str());
            LessonStats::new(lesson_id, module_id, now)
        });
        stats.review_count = stats.review_count.saturating_add(1);
        self.progress.put_lesson_stats(stats);

        self.persist();
        Some(item)
    }

    /// Note a wrong answer against its topic
    pub fn record_error(&mut self, report: ErrorReport, now: DateTime<Utc>) -> WeakPoint {
        let point =
            weak_points::record_error(&mut self.progress.weak_points, report, now, &self.config)
                .clone();
        self.persist();
        point
    }

    pub fn remove_weak_point(&mut self, topic: &str) -> bool {
        let removed = weak_points::remove_weak_point(&mut self.progress.weak_points, topic);
        if removed {
            self.persist();
        }
        removed
    }

    /// Mark a lesson completed, independent of its mastery
    pub fn complete_lesson(&mut self, lesson_id: &str) -> bool {
        let added = self.progress.complete_lesson(lesson_id);
        if added {
            self.persist();
        }
        added
    }

    pub fn add_xp(&mut self, amount: u64) {
        self.progress.add_xp(amount);
        self.persist();
    }

    pub fn increment_streak(&mut self, now: DateTime<Utc>) {
        self.progress.increment_streak(now);
        self.persist();
    }

    pub fn reset_streak(&mut self) {
        self.progress.reset_streak();
        self.persist();
    }

    pub fn award_badge(&mut self, badge: Badge) -> bool {
        let awarded = self.progress.award_badge(badge);
        if awarded {
            self.persist();
        }
        awarded
    }

    pub fn record_exam(&mut self, result: ExamResult) {
        self.progress.record_exam(result);
        self.persist();
    }

    pub fn update_daily_progress(&mut self, amount: u32) {
        self.progress.update_daily_progress(amount);
        self.persist();
    }

    pub fn reset_daily_progress(&mut self) {
        self.progress.reset_daily_progress();
        self.persist();
    }

    /// Recompute the gate for every catalog module
    ///
    /// The result is kept in memory only.
    pub fn refresh_blocked_modules(&mut self) -> &[BlockedModule] {
        self.progress.blocked_modules = match &self.catalog {
            Some(catalog) => catalog
                .modules()
                .iter()
                .filter_map(|m| mastery::check_module(catalog, &self.progress.lesson_stats, &m.id))
                .collect(),
            None => Vec::new(),
        };
        &self.progress.blocked_modules
    }

    // ----- queries -----

    pub fn lesson_stats(&self, lesson_id: &str) -> Option<&LessonStats> {
        self.progress.lesson_stats.get(lesson_id)
    }

    /// Mastery per lesson, derived from the stats
    pub fn mastery_levels(&self) -> HashMap<String, u8> {
        self.progress.derived_mastery_levels()
    }

    /// `None` when `module_id` may be entered
    pub fn check_module_access(
        &self,
        module_id: &str,
        required_module_id: &str,
        required_mastery: u8,
    ) -> Option<BlockedModule> {
        mastery::check_access(
            &self.progress.lesson_stats,
            module_id,
            required_module_id,
            required_mastery,
            self.catalog.as_ref(),
        )
    }

    /// Gate a module against its catalog prerequisite
    pub fn check_module(&self, module_id: &str) -> Option<BlockedModule> {
        let catalog = self.catalog.as_ref()?;
        mastery::check_module(catalog, &self.progress.lesson_stats, module_id)
    }

    /// Has the lesson reached mastery? `false` for lessons outside the catalog
    pub fn has_mastered(&self, lesson_id: &str) -> bool {
        self.catalog
            .as_ref()
            .and_then(|c| c.lesson(lesson_id))
            .is_some_and(|lesson| {
                mastery::has_mastered(self.lesson_stats(lesson_id), lesson, &self.config)
            })
    }

    /// Mean mastery of a module's lessons; 0 for unknown modules
    pub fn module_mastery(&self, module_id: &str) -> u8 {
        self.catalog
            .as_ref()
            .and_then(|c| c.module(module_id))
            .map_or(0, |m| mastery::module_mastery(m, &self.progress.lesson_stats))
    }

    pub fn overdue_reviews<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<&ReviewItem> {
        review::overdue(&self.progress.review_schedule, now)
    }

    pub fn today_reviews<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<&ReviewItem> {
        review::due_today(&self.progress.review_schedule, now)
    }

    pub fn review_buckets<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ReviewBuckets<'_> {
        ReviewBuckets::collect(&self.progress.review_schedule, now)
    }
}
