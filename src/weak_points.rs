//! Weak point ledger
//!
//! Recurring error topics, tracked independently of the mastery score and
//! used to suggest remediation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Characters of an exercise prompt kept as an error snippet
pub const SNIPPET_CHARS: usize = 100;

/// A topic the learner keeps getting wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakPoint {
    pub topic: String,
    pub module_id: String,
    pub lesson_id: String,
    #[serde(default)]
    pub error_count: u32,
    pub last_error: DateTime<Utc>,
    pub recommended_review: DateTime<Utc>,
    /// Most recent error snippets, oldest first
    #[serde(default)]
    pub specific_errors: Vec<String>,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

impl WeakPoint {
    /// A weak point with its first recorded error
    pub fn new(
        topic: &str,
        module_id: &str,
        lesson_id: &str,
        snippet: &str,
        suggestion: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let suggestion = suggestion
            .map(str::to_string)
            .unwrap_or_else(|| format!("Review the concept: {lesson_id}"));
        Self {
            topic: topic.to_string(),
            module_id: module_id.to_string(),
            lesson_id: lesson_id.to_string(),
            error_count: 1,
            last_error: now,
            recommended_review: now,
            specific_errors: vec![snippet.to_string()],
            improvement_suggestions: vec![suggestion],
        }
    }

    fn push_error(&mut self, snippet: &str, cap: usize) {
        self.specific_errors.push(snippet.to_string());
        let excess = self.specific_errors.len().saturating_sub(cap);
        self.specific_errors.drain(..excess);
    }
}

/// A wrong answer worth remembering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub topic: String,
    pub module_id: String,
    pub lesson_id: String,
    pub snippet: String,
    pub suggestion: Option<String>,
}

impl ErrorReport {
    pub fn new(
        topic: impl Into<String>,
        module_id: impl Into<String>,
        lesson_id: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            module_id: module_id.into(),
            lesson_id: lesson_id.into(),
            snippet: snippet.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Record an error against its topic, creating the weak point if needed
pub fn record_error<'a>(
    points: &'a mut Vec<WeakPoint>,
    report: ErrorReport,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> &'a WeakPoint {
    let cap = config.max_specific_errors.max(1);

    if let Some(index) = points.iter().position(|wp| wp.topic == report.topic) {
        let point = &mut points[index];
        point.error_count = point.error_count.saturating_add(1);
        point.last_error = now;
        // A new mistake brings the topic back up for review
        point.recommended_review = now;
        point.push_error(&report.snippet, cap);
        if let Some(suggestion) = report.suggestion {
            if !point.improvement_suggestions.contains(&suggestion) {
                point.improvement_suggestions.push(suggestion);
            }
        }
        tracing::debug!(topic = %point.topic, errors = point.error_count, "Weak point updated");
        return &points[index];
    }

    points.push(WeakPoint::new(
        &report.topic,
        &report.module_id,
        &report.lesson_id,
        &report.snippet,
        report.suggestion.as_deref(),
        now,
    ));
    tracing::debug!(topic = %report.topic, "Weak point created");
    &points[points.len() - 1]
}

/// Remove a weak point by topic
pub fn remove_weak_point(points: &mut Vec<WeakPoint>, topic: &str) -> bool {
    let len_before = points.len();
    points.retain(|wp| wp.topic != topic);
    points.len() < len_before
}

/// Weak points recorded against a module
pub fn by_module<'a>(points: &'a [WeakPoint], module_id: &str) -> Vec<&'a WeakPoint> {
    points.iter().filter(|wp| wp.module_id == module_id).collect()
}

/// The `n` topics with the most errors, most recent first on ties
pub fn most_frequent(points: &[WeakPoint], n: usize) -> Vec<&WeakPoint> {
    let mut sorted: Vec<&WeakPoint> = points.iter().collect();
    sorted.sort_by(|a, b| b.error_count.cmp(&a.error_count).then(b.last_error.cmp(&a.last_error)));
    sorted.truncate(n);
    sorted
}

/// First characters of an exercise prompt, as stored in `specific_errors`
pub fn snippet_excerpt(prompt: &str) -> String {
    prompt.chars().take(SNIPPET_CHARS).collect()
}
