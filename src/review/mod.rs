//! Spaced-repetition reviews on a fixed interval ladder

pub mod ladder;
pub mod scheduler;

pub use ladder::{IntervalLadder, Performance, Step};
pub use scheduler::{
    ReviewBuckets, ReviewItem, Urgency, complete_review, due_this_week, due_today, due_tomorrow,
    estimated_retention, interval_label, overdue, schedule_review, urgency,
};
