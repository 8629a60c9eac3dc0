//! Extraction orchestration over a strategy and a store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::extraction::core::config::{ExtractionConfig, ExtractorMode};
use crate::extraction::core::errors::{ExtractError, ExtractResult};
use crate::extraction::core::records::{ApplyOutcome, NoteRecord};
use crate::extraction::strategy::{ActionItemExtractor, build_extractor};
use crate::storage::action_store::{ActionItemStore, SqliteActionItemStore};

/// What to do around an extraction.
#[derive(Clone, Debug, Default)]
pub struct ApplyRequest {
    /// Save the input as a note with this title first.
    pub title: Option<String>,
    /// Persist the extracted items.
    pub apply: bool,
}

/// Result of one extraction run.
#[derive(Clone, Debug, Serialize)]
pub struct ExtractionReport {
    /// Strategy that produced the items.
    pub mode: ExtractorMode,
    /// Note the text was stored as, if any.
    pub note: Option<NoteRecord>,
    /// Extracted items, in order.
    pub items: Vec<String>,
    /// Persistence outcome, when applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<ApplyOutcome>,
}

/// Persist `items`, skipping any whose normalized text is already stored
/// or repeated earlier in the batch.
///
/// The store checks and inserts atomically, so concurrent calls never
/// duplicate an item.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn apply_action_items(
    store: &dyn ActionItemStore,
    note_id: Option<i64>,
    items: &[String],
) -> ExtractResult<ApplyOutcome> {
    let outcome = store.apply_items(note_id, items.to_vec()).await?;
    info!(
        "Applied action items: {} created, {} skipped",
        outcome.created.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Extraction engine with an optional persistence step.
pub struct ActionItemEngine {
    extractor: Arc<dyn ActionItemExtractor>,
    store: Arc<dyn ActionItemStore>,
}

impl ActionItemEngine {
    /// Create an engine from its parts.
    #[must_use]
    pub const fn new(
        extractor: Arc<dyn ActionItemExtractor>,
        store: Arc<dyn ActionItemStore>,
    ) -> Self {
        Self { extractor, store }
    }

    /// Build the configured strategy and open the `SQLite` store.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or a backend cannot be initialized.
    pub async fn from_config(config: &ExtractionConfig) -> ExtractResult<Self> {
        let extractor = build_extractor(config)?;
        let store = Arc::new(SqliteActionItemStore::new(&config.storage).await?);
        Ok(Self::new(extractor, store))
    }

    /// Active strategy.
    #[must_use]
    pub fn mode(&self) -> ExtractorMode {
        self.extractor.mode()
    }

    /// Extract without touching the store.
    pub async fn extract(&self, text: &str) -> Vec<String> {
        self.extractor.extract(text).await
    }

    /// Optionally save `text` as a note, extract, and optionally persist.
    ///
    /// Saving reuses an identical note; applying skips stored descriptions, so
    /// repeated runs on unchanged text create nothing new.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    pub async fn extract_and_apply(
        &self,
        text: &str,
        request: ApplyRequest,
    ) -> ExtractResult<ExtractionReport> {
        let note = match request.title {
            Some(title) => Some(self.save_note(title, text).await?),
            None => None,
        };
        self.run(note, text, request.apply).await
    }

    /// Re-extract a stored note, optionally persisting the items against it.
    ///
    /// # Errors
    /// Returns `NoteNotFound` if the note does not exist, or a storage error.
    pub async fn extract_note(&self, note_id: i64, apply: bool) -> ExtractResult<ExtractionReport> {
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(ExtractError::NoteNotFound(note_id))?;
        let content = note.content.clone();
        self.run(Some(note), &content, apply).await
    }

    async fn save_note(&self, title: String, text: &str) -> ExtractResult<NoteRecord> {
        if let Some(note) = self
            .store
            .find_note(title.clone(), text.to_string())
            .await?
        {
            debug!("Reusing note {}", note.id);
            return Ok(note);
        }
        self.store.create_note(title, text.to_string()).await
    }

    async fn run(
        &self,
        note: Option<NoteRecord>,
        text: &str,
        apply: bool,
    ) -> ExtractResult<ExtractionReport> {
        let items = self.extractor.extract(text).await;
        debug!("Extracted {} action items ({})", items.len(), self.mode());

        let applied = if apply {
            let note_id = note.as_ref().map(|note| note.id);
            Some(apply_action_items(self.store.as_ref(), note_id, &items).await?)
        } else {
            None
        };

        Ok(ExtractionReport {
            mode: self.mode(),
            note,
            items,
            applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::core::config::{RuleConfig, StorageConfig};
    use crate::extraction::rules::extractor_rules::RuleExtractor;

    const NOTES: &str = "- [ ] Set up database\n\
                         * implement API extract endpoint\n\
                         Some narrative sentence.";

    async fn engine() -> ActionItemEngine {
        let extractor = Arc::new(RuleExtractor::new(RuleConfig::default()).unwrap());
        let store = Arc::new(
            SqliteActionItemStore::new(&StorageConfig::in_memory())
                .await
                .unwrap(),
        );
        ActionItemEngine::new(extractor, store)
    }

    #[tokio::test]
    async fn test_extract_only_does_not_persist() {
        let engine = engine().await;
        let report = engine
            .extract_and_apply(NOTES, ApplyRequest::default())
            .await
            .unwrap();
        assert_eq!(report.mode, ExtractorMode::Rules);
        assert!(report.note.is_none());
        assert!(report.applied.is_none());
        assert_eq!(
            report.items,
            vec!["Set up database", "implement API extract endpoint"]
        );
        assert!(engine.store.list_items(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_apply_is_idempotent() {
        let engine = engine().await;
        let request = ApplyRequest {
            title: Some("Standup".to_string()),
            apply: true,
        };

        let first = engine
            .extract_and_apply(NOTES, request.clone())
            .await
            .unwrap();
        let applied = first.applied.unwrap();
        assert_eq!(applied.created.len(), 2);
        assert!(applied.skipped.is_empty());
        let note = first.note.unwrap();
        assert!(applied.created.iter().all(|item| item.note_id == Some(note.id)));

        let second = engine.extract_and_apply(NOTES, request).await.unwrap();
        assert_eq!(second.note.unwrap().id, note.id);
        let repeat = second.applied.unwrap();
        assert!(repeat.is_noop());
        assert_eq!(repeat.skipped.len(), 2);
        assert_eq!(engine.store.list_items(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_skips_case_insensitive_matches() {
        let engine = engine().await;
        engine
            .store
            .insert_items(None, vec!["SET UP  database".to_string()])
            .await
            .unwrap();
        let items = vec![
            "Set up database".to_string(),
            "Book the room".to_string(),
            "book the ROOM".to_string(),
        ];
        let outcome = apply_action_items(engine.store.as_ref(), None, &items)
            .await
            .unwrap();
        let created: Vec<_> = outcome
            .created
            .iter()
            .map(|item| item.description.as_str())
            .collect();
        assert_eq!(created, vec!["Book the room"]);
        assert_eq!(outcome.skipped, vec!["Set up database", "book the ROOM"]);
    }

    #[tokio::test]
    async fn test_concurrent_applies_do_not_duplicate() {
        let engine = engine().await;
        let items = vec![
            "Send the report".to_string(),
            "Book the room".to_string(),
            "send the REPORT".to_string(),
        ];
        let (left, right) = tokio::join!(
            apply_action_items(engine.store.as_ref(), None, &items),
            apply_action_items(engine.store.as_ref(), None, &items),
        );
        let (left, right) = (left.unwrap(), right.unwrap());
        assert_eq!(left.created.len() + right.created.len(), 2);
        assert_eq!(left.skipped.len() + right.skipped.len(), 4);
        assert_eq!(engine.store.list_items(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_extract_note() {
        let engine = engine().await;
        let note = engine
            .store
            .create_note("Sync".to_string(), "Please send the report by EOD.".to_string())
            .await
            .unwrap();
        let report = engine.extract_note(note.id, true).await.unwrap();
        assert_eq!(report.items, vec!["Please send the report by EOD."]);
        assert_eq!(report.applied.unwrap().created[0].note_id, Some(note.id));
    }

    #[tokio::test]
    async fn test_extract_missing_note() {
        let engine = engine().await;
        let err = engine.extract_note(99, false).await.unwrap_err();
        assert!(matches!(err, ExtractError::NoteNotFound(99)));
    }

    #[tokio::test]
    async fn test_report_serializes_without_apply() {
        let engine = engine().await;
        let report = engine
            .extract_and_apply("Please update the docs.", ApplyRequest::default())
            .await
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "rules");
        assert_eq!(json["items"][0], "Please update the docs.");
        assert!(json.get("applied").is_none());
    }
}
