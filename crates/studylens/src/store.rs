//! Async record store used by the pipeline and the HTTP layer.

use async_trait::async_trait;
use chrono::Utc;

use crate::content::{ContentItem, ContentStatus, PipelineOutcome};
use crate::db::{content_repo, Database};
use crate::error::StoreError;

/// Durable record of each content item's lifecycle.
///
/// Status writes are conditional: `mark_processing` only succeeds from
/// pending, `finish` only from processing, `fail_pending` only from pending.
/// A rejected write reports `InvalidTransition` (or `NotFound`).
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create(&self, item: &ContentItem) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<ContentItem>, StoreError>;

    /// Most recent first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ContentItem>, StoreError>;

    async fn mark_processing(&self, id: &str) -> Result<(), StoreError>;

    async fn finish(&self, id: &str, outcome: &PipelineOutcome) -> Result<(), StoreError>;

    async fn fail_pending(&self, id: &str, message: &str) -> Result<(), StoreError>;

    /// Returns false when no record matched.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// `ContentStore` over the SQLite database. Every call runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteContentStore {
    db: Database,
}

impl SqliteContentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

/// Turns a rejected conditional update into the matching error.
fn rejected(db: &Database, id: &str, to: ContentStatus) -> StoreError {
    match content_repo::status_of(db, id) {
        Ok(Some(from)) => StoreError::InvalidTransition {
            id: id.to_string(),
            from,
            to,
        },
        Ok(None) => StoreError::NotFound(id.to_string()),
        Err(e) => StoreError::Database(e),
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn create(&self, item: &ContentItem) -> Result<(), StoreError> {
        let item = item.clone();
        self.blocking(move |db| Ok(content_repo::insert(db, &item)?))
            .await
    }

    async fn get(&self, id: &str) -> Result<Option<ContentItem>, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| Ok(content_repo::find_by_id(db, &id)?))
            .await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ContentItem>, StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| Ok(content_repo::list_by_owner(db, &owner_id)?))
            .await
    }

    async fn mark_processing(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            if content_repo::mark_processing(db, &id, &Utc::now())? {
                Ok(())
            } else {
                Err(rejected(db, &id, ContentStatus::Processing))
            }
        })
        .await
    }

    async fn finish(&self, id: &str, outcome: &PipelineOutcome) -> Result<(), StoreError> {
        let id = id.to_string();
        let outcome = outcome.clone();
        self.blocking(move |db| {
            if content_repo::finish(db, &id, &outcome, &Utc::now())? {
                Ok(())
            } else {
                Err(rejected(db, &id, outcome.status()))
            }
        })
        .await
    }

    async fn fail_pending(&self, id: &str, message: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        let message = message.to_string();
        self.blocking(move |db| {
            if content_repo::fail_pending(db, &id, &message, &Utc::now())? {
                Ok(())
            } else {
                Err(rejected(db, &id, ContentStatus::Failed))
            }
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| Ok(content_repo::delete(db, &id)?))
            .await
    }
}
