//! Review scheduling
//!
//! One `ReviewItem` per learned concept. Items are created once, when a
//! lesson phase completes, and move along the interval ladder each time a
//! review is completed. Due sets are computed on read against the `now`
//! the caller passes in; nothing here runs on a timer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::ladder::{IntervalLadder, Performance};
use crate::config::EngineConfig;

/// A scheduled review of one concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub lesson_id: String,
    pub concept_id: String,
    /// Display label
    pub topic: String,
    /// When the review is due
    pub scheduled_for: DateTime<Utc>,
    /// Current ladder interval in days
    pub interval: u32,
    /// Stored for display; the ladder does not use it
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Completed reviews
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
    EngineConfig::default().initial_ease_factor
}

impl ReviewItem {
    /// Is this the item for `(lesson_id, concept_id)`?
    pub fn matches(&self, lesson_id: &str, concept_id: &str) -> bool {
        self.lesson_id == lesson_id && self.concept_id == concept_id
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for < now
    }
}

/// `now` plus `days`, saturating at the latest representable instant
fn due_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days))).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Schedule the first review of a concept
///
/// Returns `false` without changing anything when the concept already has
/// an item; scheduling is idempotent per `(lesson_id, concept_id)`.
pub fn schedule_review(
    items: &mut Vec<ReviewItem>,
    lesson_id: &str,
    concept_id: &str,
    topic: &str,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> bool {
    if items.iter().any(|r| r.matches(lesson_id, concept_id)) {
        tracing::debug!(lesson = lesson_id, concept = concept_id, "Review already scheduled");
        return false;
    }

    let interval = IntervalLadder::from_config(config).first();
    items.push(ReviewItem {
        lesson_id: lesson_id.to_string(),
        concept_id: concept_id.to_string(),
        topic: topic.to_string(),
        scheduled_for: due_after(now, interval),
        interval,
        ease_factor: config.initial_ease_factor,
        repetitions: 0,
        last_reviewed: None,
    });
    tracing::info!(lesson = lesson_id, concept = concept_id, interval, "Scheduled review");
    true
}

/// Apply a completed review to its item
///
/// Returns the updated item, or `None` if the concept was never scheduled.
pub fn complete_review(
    items: &mut [ReviewItem],
    lesson_id: &str,
    concept_id: &str,
    performance: Performance,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Option<ReviewItem> {
    let item = items.iter_mut().find(|r| r.matches(lesson_id, concept_id))?;
    let next = IntervalLadder::from_config(config).next_interval(item.interval, performance);

    item.scheduled_for = due_after(now, next);
    item.interval = next;
    item.repetitions = item.repetitions.saturating_add(1);
    item.last_reviewed = Some(now);

    tracing::info!(
        lesson = lesson_id,
        concept = concept_id,
        performance = performance.value(),
        interval = next,
        "Completed review"
    );
    Some(item.clone())
}

/// First instant of the calendar day after `now`, in `now`'s time zone
fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let now_utc = now.with_timezone(&Utc);
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or_else(|| now_utc + Duration::days(1))
}

/// Items whose due time has passed
pub fn overdue<'a, Tz: TimeZone>(
    items: &'a [ReviewItem],
    now: &DateTime<Tz>,
) -> Vec<&'a ReviewItem> {
    let now = now.with_timezone(&Utc);
    items.iter().filter(|r| r.scheduled_for < now).collect()
}

/// Items due from now until the end of the current calendar day
///
/// Never overlaps with [`overdue`] for the same `now`.
pub fn due_today<'a, Tz: TimeZone>(
    items: &'a [ReviewItem],
    now: &DateTime<Tz>,
) -> Vec<&'a ReviewItem> {
    let end = next_midnight(now);
    let now = now.with_timezone(&Utc);
    items.iter().filter(|r| r.scheduled_for >= now && r.scheduled_for < end).collect()
}

/// Items due on the next calendar day
pub fn due_tomorrow<'a, Tz: TimeZone>(
    items: &'a [ReviewItem],
    now: &DateTime<Tz>,
) -> Vec<&'a ReviewItem> {
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return Vec::new();
    };
    let tz = now.timezone();
    items.iter().filter(|r| r.scheduled_for.with_timezone(&tz).date_naive() == tomorrow).collect()
}

/// Items due in more than one and at most seven whole days
pub fn due_this_week<'a, Tz: TimeZone>(
    items: &'a [ReviewItem],
    now: &DateTime<Tz>,
) -> Vec<&'a ReviewItem> {
    let now = now.with_timezone(&Utc);
    items
        .iter()
        .filter(|r| {
            let days = (r.scheduled_for - now).num_days();
            days > 1 && days <= 7
        })
        .collect()
}

/// Review dashboard groupings for one instant
#[derive(Debug, Default)]
pub struct ReviewBuckets<'a> {
    pub overdue: Vec<&'a ReviewItem>,
    pub today: Vec<&'a ReviewItem>,
    pub tomorrow: Vec<&'a ReviewItem>,
    pub this_week: Vec<&'a ReviewItem>,
}

impl<'a> ReviewBuckets<'a> {
    pub fn collect<Tz: TimeZone>(items: &'a [ReviewItem], now: &DateTime<Tz>) -> Self {
        Self {
            overdue: overdue(items, now),
            today: due_today(items, now),
            tomorrow: due_tomorrow(items, now),
            this_week: due_this_week(items, now),
        }
    }

    /// Reviews to do right now
    pub fn due_now(&self) -> usize {
        self.overdue.len() + self.today.len()
    }
}

/// Estimated retention (0-100) since the last review
///
/// Loses 20 points per whole day. `None` before the first review.
pub fn estimated_retention(item: &ReviewItem, now: DateTime<Utc>) -> Option<u8> {
    let last = item.last_reviewed?;
    let days = (now - last).num_days().max(0);
    Some((100 - days.saturating_mul(20)).max(0) as u8)
}

/// How pressing a review is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue,
    /// Due within six hours
    Soon,
    /// Due within a day
    Today,
    Later,
}

pub fn urgency(item: &ReviewItem, now: DateTime<Utc>) -> Urgency {
    if item.is_overdue(now) {
        return Urgency::Overdue;
    }
    match (item.scheduled_for - now).num_hours() {
        h if h < 6 => Urgency::Soon,
        h if h < 24 => Urgency::Today,
        _ => Urgency::Later,
    }
}

/// Display label for a ladder interval
pub fn interval_label(days: u32) -> String {
    match days {
        1 => "1 day".to_string(),
        7 => "1 week".to_string(),
        14 => "2 weeks".to_string(),
        30 => "1 month".to_string(),
        60 => "2 months".to_string(),
        120 => "4 months".to_string(),
        n => format!("{n} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn item_due(concept: &str, scheduled_for: DateTime<Utc>) -> ReviewItem {
        ReviewItem {
            lesson_id: "py-fund-1".into(),
            concept_id: concept.into(),
            topic: "Variables".into(),
            scheduled_for,
            interval: 1,
            ease_factor: 2.5,
            repetitions: 0,
            last_reviewed: None,
        }
    }

    fn item_at_interval(interval: u32) -> Vec<ReviewItem> {
        vec![ReviewItem { interval, ..item_due("c", now()) }]
    }

    #[test]
    fn schedule_creates_first_rung_item() {
        let mut items = Vec::new();
        let config = EngineConfig::default();
        assert!(schedule_review(&mut items, "py-fund-1", "theory-py-fund-1", "Vars", now(), &config));

        let item = &items[0];
        assert_eq!(item.interval, 1);
        assert_eq!(item.scheduled_for, now() + Duration::days(1));
        assert_eq!(item.repetitions, 0);
        assert_eq!(item.ease_factor, 2.5);
        assert!(item.last_reviewed.is_none());
    }

    #[test]
    fn scheduling_twice_is_a_no_op() {
        let mut items = Vec::new();
        let config = EngineConfig::default();
        assert!(schedule_review(&mut items, "l", "c", "T", now(), &config));
        assert!(!schedule_review(&mut items, "l", "c", "Other", now() + Duration::days(3), &config));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].topic, "T");
        assert!(schedule_review(&mut items, "l", "c2", "T", now(), &config));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn oversized_configured_interval_stays_in_range() {
        let config =
            EngineConfig { review_intervals: vec![1, 100_000_000], ..EngineConfig::default() };
        let mut items = Vec::new();
        schedule_review(&mut items, "l", "c", "T", now(), &config);

        let item = complete_review(&mut items, "l", "c", Performance::CORRECT, now(), &config).unwrap();
        assert_eq!(item.interval, crate::config::engine::MAX_INTERVAL_DAYS);
        assert_eq!(item.scheduled_for, now() + Duration::days(36_500));
    }

    #[test]
    fn due_date_saturates_at_the_end_of_time() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(due_after(late, 120), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn complete_review_walks_the_ladder() {
        let config = EngineConfig::default();
        let mut items = item_at_interval(7);

        let item = complete_review(&mut items, "py-fund-1", "c", Performance::new(0.9), now(), &config)
            .unwrap();
        assert_eq!(item.interval, 14);
        assert_eq!(item.scheduled_for, now() + Duration::days(14));
        assert_eq!(item.repetitions, 1);
        assert_eq!(item.last_reviewed, Some(now()));

        let item = complete_review(&mut items, "py-fund-1", "c", Performance::new(0.5), now(), &config)
            .unwrap();
        assert_eq!(item.interval, 7);

        let item = complete_review(&mut items, "py-fund-1", "c", Performance::new(0.7), now(), &config)
            .unwrap();
        assert_eq!(item.interval, 7);
        assert_eq!(item.repetitions, 3);
    }

    #[test]
    fn complete_review_clamps_at_both_ends() {
        let config = EngineConfig::default();
        let mut top = item_at_interval(120);
        let item = complete_review(&mut top, "py-fund-1", "c", Performance::CORRECT, now(), &config);
        assert_eq!(item.map(|i| i.interval), Some(120));

        let mut bottom = item_at_interval(1);
        let item = complete_review(&mut bottom, "py-fund-1", "c", Performance::INCORRECT, now(), &config);
        assert_eq!(item.map(|i| i.interval), Some(1));
    }

    #[test]
    fn completing_an_unknown_review_changes_nothing() {
        let config = EngineConfig::default();
        let mut items = item_at_interval(3);
        let before = items.clone();
        assert!(complete_review(&mut items, "x", "y", Performance::CORRECT, now(), &config).is_none());
        assert_eq!(items, before);
    }

    #[test]
    fn overdue_and_today_are_disjoint() {
        let items = vec![
            item_due("past", now() - Duration::minutes(1)),
            item_due("exact", now()),
            item_due("tonight", now() + Duration::hours(10)),
            item_due("tomorrow", now() + Duration::hours(20)),
        ];

        let overdue: Vec<&str> = overdue(&items, &now()).iter().map(|r| r.concept_id.as_str()).collect();
        let today: Vec<&str> = due_today(&items, &now()).iter().map(|r| r.concept_id.as_str()).collect();

        assert_eq!(overdue, vec!["past"]);
        assert_eq!(today, vec!["exact", "tonight"]);
    }

    #[test]
    fn today_respects_the_callers_time_zone() {
        // 09:00 UTC is 18:00 at +09:00, so only six hours of "today" remain there
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let local_now = now().with_timezone(&tokyo);
        let items = vec![
            item_due("in-5h", now() + Duration::hours(5)),
            item_due("in-7h", now() + Duration::hours(7)),
        ];

        let today: Vec<&str> =
            due_today(&items, &local_now).iter().map(|r| r.concept_id.as_str()).collect();
        assert_eq!(today, vec!["in-5h"]);
        let tomorrow: Vec<&str> =
            due_tomorrow(&items, &local_now).iter().map(|r| r.concept_id.as_str()).collect();
        assert_eq!(tomorrow, vec!["in-7h"]);
    }

    #[test]
    fn buckets_group_the_week() {
        let items = vec![
            item_due("overdue", now() - Duration::days(2)),
            item_due("today", now() + Duration::hours(3)),
            item_due("tomorrow", now() + Duration::days(1)),
            item_due("in-3d", now() + Duration::days(3)),
            item_due("in-7d", now() + Duration::days(7)),
            item_due("in-9d", now() + Duration::days(9)),
        ];
        let buckets = ReviewBuckets::collect(&items, &now());

        let names = |v: &[&ReviewItem]| v.iter().map(|r| r.concept_id.clone()).collect::<Vec<_>>();
        assert_eq!(names(&buckets.overdue), vec!["overdue"]);
        assert_eq!(names(&buckets.today), vec!["today"]);
        assert_eq!(names(&buckets.tomorrow), vec!["tomorrow"]);
        assert_eq!(names(&buckets.this_week), vec!["in-3d", "in-7d"]);
        assert_eq!(buckets.due_now(), 2);
    }

    #[test]
    fn retention_loses_twenty_points_a_day() {
        let mut item = item_due("c", now());
        assert_eq!(estimated_retention(&item, now()), None);

        item.last_reviewed = Some(now() - Duration::days(2));
        assert_eq!(estimated_retention(&item, now()), Some(60));

        item.last_reviewed = Some(now() - Duration::days(9));
        assert_eq!(estimated_retention(&item, now()), Some(0));

        item.last_reviewed = Some(now() - Duration::hours(23));
        assert_eq!(estimated_retention(&item, now()), Some(100));
    }

    #[test]
    fn urgency_levels() {
        assert_eq!(urgency(&item_due("c", now() - Duration::seconds(1)), now()), Urgency::Overdue);
        assert_eq!(urgency(&item_due("c", now() + Duration::hours(2)), now()), Urgency::Soon);
        assert_eq!(urgency(&item_due("c", now() + Duration::hours(12)), now()), Urgency::Today);
        assert_eq!(urgency(&item_due("c", now() + Duration::days(3)), now()), Urgency::Later);
    }

    #[test]
    fn labels() {
        assert_eq!(interval_label(1), "1 day");
        assert_eq!(interval_label(3), "3 days");
        assert_eq!(interval_label(14), "2 weeks");
        assert_eq!(interval_label(120), "4 months");
    }

    #[test]
    fn review_item_json_uses_camel_case() {
        let json = serde_json::to_string(&item_due("c", now())).unwrap();
        assert!(json.contains("\"scheduledFor\""));
        assert!(json.contains("\"conceptId\""));
        assert!(!json.contains("lastReviewed"));
    }
}
