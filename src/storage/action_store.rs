//! Note and action-item storage.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{OptionalExtension, TransactionBehavior};
use tokio_rusqlite::Connection;

use crate::extraction::core::config::StorageConfig;
use crate::extraction::core::errors::{ExtractError, ExtractResult};
use crate::extraction::core::records::{ActionItemRecord, ApplyOutcome, NoteRecord};
use crate::extraction::rules::dedupe::dedupe_key;

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence boundary for notes and action items.
pub trait ActionItemStore: Send + Sync {
    /// Store a note and return it with its assigned id.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn create_note(
        &self,
        title: String,
        content: String,
    ) -> StoreFuture<'_, ExtractResult<NoteRecord>>;
    /// Load a note by id.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get_note(&self, id: i64) -> StoreFuture<'_, ExtractResult<Option<NoteRecord>>>;
    /// Find the earliest note with exactly this title and content.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn find_note(
        &self,
        title: String,
        content: String,
    ) -> StoreFuture<'_, ExtractResult<Option<NoteRecord>>>;
    /// Every stored action-item description.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn existing_descriptions(&self) -> StoreFuture<'_, ExtractResult<Vec<String>>>;
    /// Insert items in order, optionally linked to a note.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn insert_items(
        &self,
        note_id: Option<i64>,
        descriptions: Vec<String>,
    ) -> StoreFuture<'_, ExtractResult<Vec<ActionItemRecord>>>;
    /// Insert the descriptions whose dedupe key is neither stored nor
    /// repeated earlier in the batch; the rest are reported as skipped.
    ///
    /// The key check and the inserts run in one write transaction, so
    /// concurrent applies cannot both insert the same item.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn apply_items(
        &self,
        note_id: Option<i64>,
        descriptions: Vec<String>,
    ) -> StoreFuture<'_, ExtractResult<ApplyOutcome>>;
    /// List items in insertion order, for one note or for all notes.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list_items(
        &self,
        note_id: Option<i64>,
    ) -> StoreFuture<'_, ExtractResult<Vec<ActionItemRecord>>>;
}

/// `SQLite` implementation of note and action-item storage.
pub struct SqliteActionItemStore {
    conn: Connection,
    notes_table: String,
    items_table: String,
}

impl SqliteActionItemStore {
    /// Open the database and create the tables if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> ExtractResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        let notes_table = config.notes_table.clone();
        let items_table = config.items_table.clone();
        let (notes, items) = (notes_table.clone(), items_table.clone());

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {notes} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS {items} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    note_id INTEGER REFERENCES {notes} (id),
                    description TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{items}_note
                    ON {items} (note_id);"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            notes_table,
            items_table,
        })
    }
}

impl ActionItemStore for SqliteActionItemStore {
    fn create_note(
        &self,
        title: String,
        content: String,
    ) -> StoreFuture<'_, ExtractResult<NoteRecord>> {
        Box::pin(async move {
            let table = self.notes_table.clone();
            let created_at = now_millis()?;
            let millis = created_at.timestamp_millis();
            let (row_title, row_content) = (title.clone(), content.clone());
            let id = self
                .conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT INTO {table} (title, content, created_at) VALUES (?1, ?2, ?3)"
                        ),
                        rusqlite::params![row_title, row_content, millis],
                    )?;
                    Ok(conn.last_insert_rowid())
                })
                .await?;

            Ok(NoteRecord {
                id,
                title,
                content,
                created_at,
            })
        })
    }

    fn get_note(&self, id: i64) -> StoreFuture<'_, ExtractResult<Option<NoteRecord>>> {
        Box::pin(async move {
            let table = self.notes_table.clone();
            let row = self
                .conn
                .call(move |conn| {
                    let found = conn
                        .query_row(
                            &format!(
                                "SELECT title, content, created_at FROM {table} WHERE id = ?1"
                            ),
                            rusqlite::params![id],
                            |row| {
                                let title: String = row.get(0)?;
                                let content: String = row.get(1)?;
                                let created_at: i64 = row.get(2)?;
                                Ok((title, content, created_at))
                            },
                        )
                        .optional()?;
                    Ok(found)
                })
                .await?;

            row.map(|(title, content, created_at)| {
                Ok::<_, ExtractError>(NoteRecord {
                    id,
                    title,
                    content,
                    created_at: decode_timestamp(created_at)?,
                })
            })
            .transpose()
        })
    }

    fn find_note(
        &self,
        title: String,
        content: String,
    ) -> StoreFuture<'_, ExtractResult<Option<NoteRecord>>> {
        Box::pin(async move {
            let table = self.notes_table.clone();
            let (row_title, row_content) = (title.clone(), content.clone());
            let row = self
                .conn
                .call(move |conn| {
                    let found = conn
                        .query_row(
                            &format!(
                                "SELECT id, created_at FROM {table}
                                 WHERE title = ?1 AND content = ?2
                                 ORDER BY id
                                 LIMIT 1"
                            ),
                            rusqlite::params![row_title, row_content],
                            |row| {
                                let id: i64 = row.get(0)?;
                                let created_at: i64 = row.get(1)?;
                                Ok((id, created_at))
                            },
                        )
                        .optional()?;
                    Ok(found)
                })
                .await?;

            row.map(|(id, created_at)| {
                Ok::<_, ExtractError>(NoteRecord {
                    id,
                    title,
                    content,
                    created_at: decode_timestamp(created_at)?,
                })
            })
            .transpose()
        })
    }

    fn existing_descriptions(&self) -> StoreFuture<'_, ExtractResult<Vec<String>>> {
        Box::pin(async move {
            let table = self.items_table.clone();
            let descriptions = self
                .conn
                .call(move |conn| {
                    let mut stmt =
                        conn.prepare(&format!("SELECT description FROM {table} ORDER BY id"))?;
                    let rows = stmt
                        .query_map([], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;
            Ok(descriptions)
        })
    }

    fn insert_items(
        &self,
        note_id: Option<i64>,
        descriptions: Vec<String>,
    ) -> StoreFuture<'_, ExtractResult<Vec<ActionItemRecord>>> {
        Box::pin(async move {
            if descriptions.is_empty() {
                return Ok(Vec::new());
            }

            let table = self.items_table.clone();
            let created_at = now_millis()?;
            let millis = created_at.timestamp_millis();
            let ids = self
                .conn
                .call(move |conn| {
                    let tx = conn.transaction()?;
                    let mut inserted = Vec::with_capacity(descriptions.len());
                    {
                        let mut stmt = tx.prepare(&format!(
                            "INSERT INTO {table} (note_id, description, completed, created_at)
                             VALUES (?1, ?2, 0, ?3)"
                        ))?;
                        for description in descriptions {
                            stmt.execute(rusqlite::params![note_id, description, millis])?;
                            inserted.push((tx.last_insert_rowid(), description));
                        }
                    }
                    tx.commit()?;
                    Ok(inserted)
                })
                .await?;

            Ok(ids
                .into_iter()
                .map(|(id, description)| ActionItemRecord {
                    id,
                    note_id,
                    description,
                    completed: false,
                    created_at,
                })
                .collect())
        })
    }

    fn apply_items(
        &self,
        note_id: Option<i64>,
        descriptions: Vec<String>,
    ) -> StoreFuture<'_, ExtractResult<ApplyOutcome>> {
        Box::pin(async move {
            let table = self.items_table.clone();
            let created_at = now_millis()?;
            let millis = created_at.timestamp_millis();
            let (inserted, skipped) = self
                .conn
                .call(move |conn| {
                    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                    let mut seen = HashSet::new();
                    {
                        let mut stmt = tx.prepare(&format!("SELECT description FROM {table}"))?;
                        let mut rows = stmt.query([])?;
                        while let Some(row) = rows.next()? {
                            let description: String = row.get(0)?;
                            seen.insert(dedupe_key(&description));
                        }
                    }

                    let mut inserted = Vec::new();
                    let mut skipped = Vec::new();
                    {
                        let mut stmt = tx.prepare(&format!(
                            "INSERT INTO {table} (note_id, description, completed, created_at)
                             VALUES (?1, ?2, 0, ?3)"
                        ))?;
                        for description in descriptions {
                            if seen.insert(dedupe_key(&description)) {
                                stmt.execute(rusqlite::params![note_id, description, millis])?;
                                inserted.push((tx.last_insert_rowid(), description));
                            } else {
                                skipped.push(description);
                            }
                        }
                    }
                    tx.commit()?;
                    Ok((inserted, skipped))
                })
                .await?;

            let created = inserted
                .into_iter()
                .map(|(id, description)| ActionItemRecord {
                    id,
                    note_id,
                    description,
                    completed: false,
                    created_at,
                })
                .collect();
            Ok(ApplyOutcome { created, skipped })
        })
    }

    fn list_items(
        &self,
        note_id: Option<i64>,
    ) -> StoreFuture<'_, ExtractResult<Vec<ActionItemRecord>>> {
        Box::pin(async move {
            let table = self.items_table.clone();
            let rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT id, note_id, description, completed, created_at
                         FROM {table}
                         WHERE ?1 IS NULL OR note_id = ?1
                         ORDER BY id"
                    ))?;
                    let found = stmt
                        .query_map(rusqlite::params![note_id], |row| {
                            let id: i64 = row.get(0)?;
                            let note_id: Option<i64> = row.get(1)?;
                            let description: String = row.get(2)?;
                            let completed: bool = row.get(3)?;
                            let created_at: i64 = row.get(4)?;
                            Ok((id, note_id, description, completed, created_at))
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(found)
                })
                .await?;

            rows.into_iter()
                .map(|(id, note_id, description, completed, created_at)| {
                    Ok(ActionItemRecord {
                        id,
                        note_id,
                        description,
                        completed,
                        created_at: decode_timestamp(created_at)?,
                    })
                })
                .collect::<ExtractResult<Vec<_>>>()
        })
    }
}

/// Current time truncated to the stored (millisecond) precision.
fn now_millis() -> ExtractResult<DateTime<Utc>> {
    decode_timestamp(Utc::now().timestamp_millis())
}

fn decode_timestamp(millis: i64) -> ExtractResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ExtractError::InvalidRecord(format!("invalid timestamp: {millis}")))
}
