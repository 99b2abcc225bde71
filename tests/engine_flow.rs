use chrono::{DateTime, Duration, TimeZone, Utc};
use dojo::review::{IntervalLadder, Performance};
use dojo::weak_points::ErrorReport;
use dojo::{Catalog, EngineConfig, MemoryStorage, ProgressStore};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 8, 30, 0).unwrap()
}

fn store() -> ProgressStore<MemoryStorage> {
    ProgressStore::open(MemoryStorage::new(), EngineConfig::default(), start())
        .with_catalog(Catalog::builtin())
}

#[test]
fn learner_unlocks_the_second_module() {
    let mut store = store();
    let blocked = store.check_module("py-logic").unwrap();
    assert_eq!(blocked.missing_concepts, vec!["Prerequisite module not started"]);

    // Shaky first pass on two lessons
    for i in 0..25 {
        store.record_attempt("py-fund-1", i % 2 == 0, start());
        store.record_attempt("py-fund-2", true, start());
    }
    let blocked = store.check_module("py-logic").unwrap();
    assert_eq!(blocked.current_mastery, 76);
    assert_eq!(blocked.recommended_review, vec!["py-fund-1"]);
    assert_eq!(blocked.missing_concepts, vec!["Lesson: py-fund-1"]);

    // Catch up on the weak lesson
    for _ in 0..40 {
        store.record_attempt("py-fund-1", true, start());
    }
    assert!(store.check_module("py-logic").is_none());
    assert!(store.progress().mastery_cache_consistent());
}

#[test]
fn review_walks_up_and_down_the_ladder() {
    let mut store = store();
    let mut now = start();
    store.schedule_review("py-fund-2", "theory-py-fund-2", "Variables", now);

    let mut seen = Vec::new();
    for performance in [1.0, 1.0, 0.7, 0.2, 0.9] {
        now += Duration::days(1);
        let item = store.complete_review("py-fund-2", "theory-py-fund-2", performance, now).unwrap();
        assert_eq!(item.scheduled_for, now + Duration::days(i64::from(item.interval)));
        seen.push(item.interval);
    }
    assert_eq!(seen, vec![3, 7, 7, 3, 7]);

    let item = store.progress().review_item("py-fund-2", "theory-py-fund-2").unwrap();
    assert_eq!(item.repetitions, 5);
    assert_eq!(store.lesson_stats("py-fund-2").unwrap().review_count, 5);
}

#[test]
fn due_sets_follow_the_clock() {
    let mut store = store();
    store.schedule_review("py-fund-1", "a", "A", start());
    store.schedule_review("py-fund-2", "b", "B", start() - Duration::days(3));

    let buckets = store.review_buckets(&start());
    assert_eq!(buckets.overdue.len(), 1);
    assert_eq!(buckets.overdue[0].concept_id, "b");
    assert_eq!(buckets.tomorrow.len(), 1);
    assert!(buckets.today.is_empty());
}

#[test]
fn weak_point_errors_stay_capped() {
    let mut store = store();
    for i in 0..15 {
        let report = ErrorReport::new("loops", "py-loops", "py-loops-1", format!("prompt {i}"));
        store.record_error(report, start());
    }
    let point = store.progress().weak_point("loops").unwrap();
    assert_eq!(point.error_count, 15);
    assert_eq!(point.specific_errors.len(), 10);
    assert_eq!(point.specific_errors[0], "prompt 5");
}

proptest! {
    #[test]
    fn mastery_stays_in_range(answers in proptest::collection::vec(any::<bool>(), 1..80)) {
        let mut store = store();
        for correct in answers {
            let stats = store.record_attempt("py-fund-3", correct, start());
            prop_assert!(stats.mastery_level <= 100);
            prop_assert!(stats.correct_answers <= stats.total_attempts);
        }
        prop_assert!(store.progress().mastery_cache_consistent());
    }

    #[test]
    fn ladder_always_lands_on_a_rung(current in 0u32..200, score in -1.0f64..2.0) {
        let ladder = IntervalLadder::default();
        let next = ladder.next_interval(current, Performance::new(score));
        prop_assert!(ladder.rungs().contains(&next));
    }

    #[test]
    fn overdue_and_today_never_overlap(offsets in proptest::collection::vec(-72i64..72, 0..20)) {
        let mut store = store();
        for (i, hours) in offsets.iter().enumerate() {
            let lesson = format!("lesson-{i}");
            store.schedule_review(&lesson, "c", "T", start() + Duration::hours(*hours));
        }
        let now = start() + Duration::days(1);
        let overdue = store.overdue_reviews(&now);
        let today = store.today_reviews(&now);
        for item in &today {
            prop_assert!(!overdue.iter().any(|o| o.lesson_id == item.lesson_id));
        }
    }
}
