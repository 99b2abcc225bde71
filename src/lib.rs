//! Dojo - mastery tracking and spaced review for a self-paced course
//!
//! Dojo turns exercise attempts into mastery scores, gates modules on the
//! mastery of their prerequisites, schedules concept reviews on a fixed
//! interval ladder, and keeps a ledger of the learner's weak points.

pub mod config;
pub mod curriculum;
pub mod error;
pub mod mastery;
pub mod progress;
pub mod review;
pub mod weak_points;

pub use config::{Config, EngineConfig};
pub use curriculum::Catalog;
pub use error::StorageError;
pub use progress::{FileStorage, MemoryStorage, ProgressStore, Storage, UserProgress};
