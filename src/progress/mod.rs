//! Learner progress: the aggregate, its persistence and the store that owns it

pub mod gamification;
pub mod migrations;
pub mod model;
pub mod storage;
pub mod store;

pub use gamification::exam_xp;
pub use migrations::CURRENT_SCHEMA_VERSION;
pub use model::{Badge, ExamMode, ExamResult, Rarity, UserProgress};
pub use storage::{FileStorage, MemoryStorage, PROGRESS_KEY, Storage};
pub use store::ProgressStore;
