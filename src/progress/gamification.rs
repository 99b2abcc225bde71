//! XP, levels, streaks, badges and exams

use chrono::{DateTime, Utc};

use super::model::{Badge, ExamMode, ExamResult, UserProgress};
use crate::curriculum::{Catalog, level_from_xp};

/// XP for an exam: 200 / 100 / 50 by score band, times 1.5 in hard mode
pub fn exam_xp(score: u8, mode: ExamMode) -> u64 {
    let base: f64 = match score {
        70.. => 200.0,
        50..=69 => 100.0,
        _ => 50.0,
    };
    let bonus = match mode {
        ExamMode::Hard => 1.5,
        ExamMode::Normal => 1.0,
    };
    (base * bonus).round() as u64
}

impl UserProgress {
    /// Add XP, recompute the level and count it toward today's goal
    pub fn add_xp(&mut self, amount: u64) {
        self.total_xp = self.total_xp.saturating_add(amount);
        self.level = level_from_xp(self.total_xp);
        let daily = u32::try_from(amount).unwrap_or(u32::MAX);
        self.daily_progress = self.daily_progress.saturating_add(daily);
    }

    /// Mark a lesson completed; completing it again changes nothing
    pub fn complete_lesson(&mut self, lesson_id: &str) -> bool {
        if self.is_lesson_completed(lesson_id) {
            return false;
        }
        self.completed_lessons.push(lesson_id.to_string());
        true
    }

    pub fn increment_streak(&mut self, now: DateTime<Utc>) {
        self.streak = self.streak.saturating_add(1);
        self.longest_streak = self.longest_streak.max(self.streak);
        self.last_active = now;
    }

    pub fn reset_streak(&mut self) {
        self.streak = 0;
    }

    /// Award a badge unless one with the same id was already earned
    pub fn award_badge(&mut self, badge: Badge) -> bool {
        if self.badges.iter().any(|b| b.id == badge.id) {
            return false;
        }
        self.badges.push(badge);
        true
    }

    pub fn record_exam(&mut self, result: ExamResult) {
        self.exam_history.push(result);
    }

    pub fn update_daily_progress(&mut self, amount: u32) {
        self.daily_progress = self.daily_progress.saturating_add(amount);
    }

    pub fn reset_daily_progress(&mut self) {
        self.daily_progress = 0;
    }

    /// Today's progress toward the daily goal (0-100)
    pub fn daily_goal_percent(&self) -> u8 {
        if self.daily_goal == 0 {
            return 100;
        }
        let pct = f64::from(self.daily_progress) / f64::from(self.daily_goal) * 100.0;
        pct.min(100.0).round() as u8
    }

    /// XP earned inside the current level
    pub fn xp_into_level(&self) -> u64 {
        let floor = crate::curriculum::xp_for_level(self.level.saturating_sub(1));
        self.total_xp.saturating_sub(floor)
    }

    /// Mean exam score, rounded; 0 with no exams
    pub fn exam_average(&self) -> u8 {
        if self.exam_history.is_empty() {
            return 0;
        }
        let total: u32 = self.exam_history.iter().map(|e| u32::from(e.score)).sum();
        (f64::from(total) / self.exam_history.len() as f64).round() as u8
    }

    /// Share of the catalog's lessons completed (0-100)
    pub fn completion_rate(&self, catalog: &Catalog) -> u8 {
        let total = catalog.lesson_count();
        if total == 0 {
            return 0;
        }
        let done = self.completed_lessons.iter().filter(|id| catalog.lesson(id).is_some()).count();
        (done as f64 / total as f64 * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn exam(score: u8) -> ExamResult {
        ExamResult {
            id: format!("exam-{score}"),
            date: now(),
            score,
            total_questions: 10,
            time_spent_seconds: 600,
            mode: ExamMode::Normal,
            topics_covered: vec![],
            incorrect_questions: vec![],
        }
    }

    #[test]
    fn xp_raises_level_and_daily_progress() {
        let mut progress = UserProgress::default();
        progress.add_xp(150);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.daily_progress, 150);

        progress.add_xp(250);
        assert_eq!(progress.total_xp, 400);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.xp_into_level(), 0);
    }

    #[test]
    fn completing_a_lesson_is_idempotent() {
        let mut progress = UserProgress::default();
        assert!(progress.complete_lesson("py-fund-1"));
        assert!(!progress.complete_lesson("py-fund-1"));
        assert!(progress.complete_lesson("py-fund-2"));
        assert_eq!(progress.completed_lessons, vec!["py-fund-1", "py-fund-2"]);
    }

    #[test]
    fn streak_tracks_longest() {
        let mut progress = UserProgress::default();
        progress.increment_streak(now());
        progress.increment_streak(now());
        progress.reset_streak();
        progress.increment_streak(now());

        assert_eq!(progress.streak, 1);
        assert_eq!(progress.longest_streak, 2);
        assert_eq!(progress.last_active, now());
    }

    #[test]
    fn badges_are_unique_by_id() {
        let mut progress = UserProgress::default();
        let badge = Badge {
            id: "first-review".into(),
            name: "First Review".into(),
            description: String::new(),
            earned_at: now(),
            rarity: Default::default(),
        };
        assert!(progress.award_badge(badge.clone()));
        assert!(!progress.award_badge(badge));
        assert_eq!(progress.badges.len(), 1);
    }

    #[test]
    fn exam_xp_bands() {
        assert_eq!(exam_xp(90, ExamMode::Normal), 200);
        assert_eq!(exam_xp(70, ExamMode::Hard), 300);
        assert_eq!(exam_xp(55, ExamMode::Normal), 100);
        assert_eq!(exam_xp(49, ExamMode::Hard), 75);
    }

    #[test]
    fn exam_average_rounds() {
        let mut progress = UserProgress::default();
        assert_eq!(progress.exam_average(), 0);
        progress.record_exam(exam(70));
        progress.record_exam(exam(75));
        assert_eq!(progress.exam_average(), 73);
    }

    #[test]
    fn daily_goal_percent_caps_at_100() {
        let mut progress = UserProgress::default();
        progress.update_daily_progress(25);
        assert_eq!(progress.daily_goal_percent(), 50);
        progress.update_daily_progress(100);
        assert_eq!(progress.daily_goal_percent(), 100);
        progress.reset_daily_progress();
        assert_eq!(progress.daily_goal_percent(), 0);
    }

    #[test]
    fn completion_rate_ignores_unknown_lessons() {
        let catalog = Catalog::builtin();
        let mut progress = UserProgress::default();
        for lesson in &catalog.modules()[0].lessons {
            progress.complete_lesson(&lesson.id);
        }
        progress.complete_lesson("retired-lesson");
        // 5 of 63
        assert_eq!(progress.completion_rate(&catalog), 8);
    }
}
