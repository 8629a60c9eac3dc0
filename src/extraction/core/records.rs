//! Records exchanged with the persistence boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored note (the raw text an extraction ran on).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Row identifier.
    pub id: i64,
    /// Human-readable title.
    pub title: String,
    /// Raw note content.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A persisted action item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItemRecord {
    /// Row identifier.
    pub id: i64,
    /// Note the item was extracted from, if any.
    pub note_id: Option<i64>,
    /// Item text as returned by the extractor.
    pub description: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Result of applying extracted items to a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// Rows created by this apply.
    pub created: Vec<ActionItemRecord>,
    /// Candidates skipped because an equivalent description already existed.
    pub skipped: Vec<String>,
}

impl ApplyOutcome {
    /// Whether the apply created nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}
