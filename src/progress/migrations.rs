//! Progress document migrations
//!
//! Each migration upgrades the raw JSON of the progress aggregate by one
//! schema version. They run in order on load, before deserialization, so
//! a document from any older version ends up in the current shape.

use serde_json::{Map, Value, json};

use crate::config::engine::MAX_SPECIFIC_ERRORS;
use crate::error::{Result, StorageError};

/// Current progress schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// One upgrade step
pub struct Migration {
    /// Version this migration produces
    pub version: u32,
    /// Short description for logs
    pub name: &'static str,
    apply: fn(&mut Map<String, Value>) -> Result<()>,
}

/// All migrations, ordered by version
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "add review schedule, lesson stats and blocked modules",
            apply: add_review_collections,
        },
        Migration {
            version: 2,
            name: "rebuild mastery cache and cap error snippets",
            apply: rebuild_mastery_cache,
        },
    ]
}

/// Upgrade a progress object from `from_version` to the current version
///
/// Returns the version the document ended at. Documents from a newer
/// version are left untouched.
pub fn migrate(progress: &mut Value, from_version: u32) -> Result<u32> {
    let Some(object) = progress.as_object_mut() else {
        return Err(StorageError::Migration {
            version: from_version,
            message: "progress is not a JSON object".to_string(),
        });
    };

    let mut version = from_version;
    for migration in migrations().into_iter().filter(|m| m.version > from_version) {
        (migration.apply)(object)?;
        tracing::info!(version = migration.version, name = migration.name, "Applied migration");
        version = migration.version;
    }
    Ok(version)
}

fn add_review_collections(progress: &mut Map<String, Value>) -> Result<()> {
    for (field, empty) in [
        ("reviewSchedule", json!([])),
        ("lessonStats", json!({})),
        ("blockedModules", json!([])),
    ] {
        let entry = progress.entry(field).or_insert(Value::Null);
        if entry.is_null() {
            *entry = empty;
        }
    }
    Ok(())
}

fn rebuild_mastery_cache(progress: &mut Map<String, Value>) -> Result<()> {
    let mut levels = Map::new();
    if let Some(stats) = progress.get("lessonStats").and_then(Value::as_object) {
        for (lesson_id, entry) in stats {
            let mastery = entry.get("masteryLevel").and_then(Value::as_u64).unwrap_or(0);
            levels.insert(lesson_id.clone(), json!(mastery.min(100)));
        }
    }
    progress.insert("masteryLevels".to_string(), Value::Object(levels));

    if let Some(points) = progress.get_mut("weakPoints").and_then(Value::as_array_mut) {
        for errors in points.iter_mut().filter_map(|wp| wp.get_mut("specificErrors")) {
            if let Some(list) = errors.as_array_mut() {
                let excess = list.len().saturating_sub(MAX_SPECIFIC_ERRORS);
                list.drain(..excess);
            }
        }
    }
    Ok(())
}
