//! Content repository: CRUD and status transitions for the `content_items` table.
//!
//! Status writes are conditional on the current status so that terminal
//! states stay absorbing even if two writers race on the same id.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Row};

use super::{Database, DatabaseError};
use crate::content::{
    ContentItem, ContentSource, ContentStatus, ContentType, PipelineOutcome, ProcessingOptions,
    QuizItem,
};

/// A raw content row from the database.
#[derive(Debug, Clone)]
struct ContentRow {
    id: String,
    owner_id: String,
    title: String,
    content_type: String,
    source_file_name: Option<String>,
    source_url: Option<String>,
    status: String,
    extracted_text: Option<String>,
    summary: Option<String>,
    audio_locator: Option<String>,
    quiz_items: Option<String>,
    error_message: Option<String>,
    processing_options: String,
    created_at: String,
    updated_at: String,
}

impl ContentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            content_type: row.get("content_type")?,
            source_file_name: row.get("source_file_name")?,
            source_url: row.get("source_url")?,
            status: row.get("status")?,
            extracted_text: row.get("extracted_text")?,
            summary: row.get("summary")?,
            audio_locator: row.get("audio_locator")?,
            quiz_items: row.get("quiz_items")?,
            error_message: row.get("error_message")?,
            processing_options: row.get("processing_options")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_item(self) -> Result<ContentItem, DatabaseError> {
        let id = self.id;
        let corrupt = |reason: String| DatabaseError::CorruptRow {
            id: id.clone(),
            reason,
        };

        let content_type: ContentType = self.content_type.parse().map_err(&corrupt)?;
        let status: ContentStatus = self.status.parse().map_err(&corrupt)?;
        let source = match (self.source_file_name, self.source_url) {
            (Some(file_name), None) => ContentSource::File { file_name },
            (None, Some(url)) => ContentSource::Url { url },
            _ => return Err(corrupt("exactly one source must be set".to_string())),
        };
        let processing_options: ProcessingOptions =
            serde_json::from_str(&self.processing_options)
                .map_err(|e| corrupt(format!("processing_options: {}", e)))?;
        let quiz_items: Option<Vec<QuizItem>> = self
            .quiz_items
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| corrupt(format!("quiz_items: {}", e)))?;
        let created_at = parse_timestamp(&self.created_at).map_err(&corrupt)?;
        let updated_at = parse_timestamp(&self.updated_at).map_err(&corrupt)?;

        Ok(ContentItem {
            id,
            owner_id: self.owner_id,
            title: self.title,
            content_type,
            source,
            status,
            extracted_text: self.extracted_text,
            summary: self.summary,
            audio_locator: self.audio_locator,
            quiz_items,
            error_message: self.error_message,
            processing_options,
            created_at,
            updated_at,
        })
    }
}

/// Formats a timestamp the way it is stored: RFC 3339, microseconds, `Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("timestamp '{}': {}", raw, e))
}

fn to_json<T: serde::Serialize>(id: &str, value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::CorruptRow {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// Inserts a new content row.
pub fn insert(db: &Database, item: &ContentItem) -> Result<(), DatabaseError> {
    let options = to_json(&item.id, &item.processing_options)?;
    let quiz = item
        .quiz_items
        .as_ref()
        .map(|q| to_json(&item.id, q))
        .transpose()?;

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO content_items (id, owner_id, title, content_type, source_file_name,
             source_url, status, extracted_text, summary, audio_locator, quiz_items,
             error_message, processing_options, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                item.id,
                item.owner_id,
                item.title,
                item.content_type.as_str(),
                item.source.file_name(),
                item.source.url(),
                item.status.as_str(),
                item.extracted_text,
                item.summary,
                item.audio_locator,
                quiz,
                item.error_message,
                options,
                format_timestamp(&item.created_at),
                format_timestamp(&item.updated_at),
            ],
        )?;
        Ok(())
    })
}

/// Finds a content item by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<ContentItem>, DatabaseError> {
    let row = db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM content_items WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], ContentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })?;
    row.map(ContentRow::into_item).transpose()
}

/// Lists an owner's items, most recent first.
pub fn list_by_owner(db: &Database, owner_id: &str) -> Result<Vec<ContentItem>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM content_items WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map(params![owner_id], ContentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    rows.into_iter().map(ContentRow::into_item).collect()
}

/// Returns the current status of an item, if it exists.
pub fn status_of(db: &Database, id: &str) -> Result<Option<ContentStatus>, DatabaseError> {
    let raw: Option<String> = db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT status FROM content_items WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], |r| r.get::<_, String>(0))?;
        match rows.next() {
            Some(Ok(status)) => Ok(Some(status)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })?;
    raw.map(|s| {
        s.parse().map_err(|reason| DatabaseError::CorruptRow {
            id: id.to_string(),
            reason,
        })
    })
    .transpose()
}

/// Moves a pending item to processing. Returns false if the item is missing
/// or not pending.
pub fn mark_processing(
    db: &Database,
    id: &str,
    now: &DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE content_items SET status = 'processing', updated_at = ?2
             WHERE id = ?1 AND status = 'pending'",
            params![id, format_timestamp(now)],
        )?;
        Ok(changed == 1)
    })
}

/// Writes the terminal outcome of a run. Only a processing item can finish;
/// returns false otherwise.
pub fn finish(
    db: &Database,
    id: &str,
    outcome: &PipelineOutcome,
    now: &DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let updated_at = format_timestamp(now);

    match outcome {
        PipelineOutcome::Completed(done) => {
            let quiz = done
                .quiz_items
                .as_ref()
                .filter(|items| !items.is_empty())
                .map(|items| to_json(id, items))
                .transpose()?;
            db.with_conn(|conn| {
                let changed = conn.execute(
                    "UPDATE content_items SET status = 'completed', extracted_text = ?2,
                     summary = ?3, audio_locator = ?4, quiz_items = ?5, error_message = NULL,
                     updated_at = ?6
                     WHERE id = ?1 AND status = 'processing'",
                    params![
                        id,
                        done.extracted_text,
                        done.summary,
                        done.audio_locator,
                        quiz,
                        updated_at,
                    ],
                )?;
                Ok(changed == 1)
            })
        }
        PipelineOutcome::Failed { message } => db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE content_items SET status = 'failed', error_message = ?2,
                 extracted_text = NULL, summary = NULL, audio_locator = NULL, quiz_items = NULL,
                 updated_at = ?3
                 WHERE id = ?1 AND status = 'processing'",
                params![id, message, updated_at],
            )?;
            Ok(changed == 1)
        }),
    }
}

/// Fails an item that never reached a worker. Returns false unless it was pending.
pub fn fail_pending(
    db: &Database,
    id: &str,
    message: &str,
    now: &DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE content_items SET status = 'failed', error_message = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'pending'",
            params![id, message, format_timestamp(now)],
        )?;
        Ok(changed == 1)
    })
}

/// Deletes an item. Returns false if no row matched.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute("DELETE FROM content_items WHERE id = ?1", params![id])?;
        Ok(changed == 1)
    })
}
