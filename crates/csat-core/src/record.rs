// ABOUTME: Defines the Record struct, one persisted survey response, and its creation input.
// ABOUTME: Also owns timestamp generation and the most-recent-first ordering shared by all views.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Format used for every store-assigned timestamp. UTC, no offset suffix,
/// fixed-width microseconds so lexicographic order is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A single survey response as persisted on disk.
///
/// `timestamp` is kept as the stored string rather than a parsed instant:
/// files written by older deployments may hold values that do not parse, and
/// those must survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub rating: i64,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Caller-supplied fields for a new response. The store assigns id and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResponse {
    pub rating: i64,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewResponse {
    pub fn new(rating: i64) -> Self {
        Self {
            rating,
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Materialize the response into a Record with the given id and timestamp.
    /// Missing context and comment become empty strings.
    pub fn into_record(self, id: u64, timestamp: String) -> Record {
        Record {
            id,
            rating: self.rating,
            context: self.context.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            timestamp,
        }
    }
}

/// Current UTC instant rendered with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Next id for a collection: one past the largest existing id, or 1 when empty.
pub fn next_id<'a>(records: impl IntoIterator<Item = &'a Record>) -> u64 {
    records.into_iter().map(|r| r.id).max().unwrap_or(0) + 1
}

/// Return the records ordered by timestamp descending.
///
/// `records` is expected in insertion order. Records with equal timestamps
/// come out in reverse insertion order (newest insert first).
pub fn most_recent_first(records: &[Record]) -> Vec<Record> {
    let mut sorted: Vec<Record> = records.iter().rev().cloned().collect();
    // Stable sort keeps the reversed insertion order for ties.
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}
