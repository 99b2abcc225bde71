//! Course structure: modules, lessons and the catalog that orders them

pub mod catalog;
pub mod model;

pub use catalog::Catalog;
pub use model::{Difficulty, Lesson, LessonKind, Module, level_from_xp, xp_for_level};
