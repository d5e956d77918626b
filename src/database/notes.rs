use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, PoolManager};

/// A note as returned to its owner. `user_id` is never part of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage for notes. Every operation is scoped to the owning `user_id`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a note owned by `user_id` and return it with generated fields
    async fn create(&self, user_id: &str, title: &str, content: &str) -> Result<Note, DatabaseError>;

    /// All notes owned by `user_id`, most recently updated first
    async fn list(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError>;

    /// Delete note `id` if owned by `user_id`; `None` when nothing matched
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<Option<Uuid>, DatabaseError>;

    /// Whether the backing connection pool has been built
    fn is_ready(&self) -> bool {
        true
    }
}

const INSERT_NOTE: &str = r#"
    INSERT INTO notes (user_id, title, content)
    VALUES ($1, $2, $3)
    RETURNING id, title, content, created_at, updated_at
"#;

const SELECT_NOTES: &str = r#"
    SELECT id, title, content, created_at, updated_at
    FROM notes
    WHERE user_id = $1
    ORDER BY updated_at DESC
"#;

const DELETE_NOTE: &str = r#"
    DELETE FROM notes
    WHERE id = $1 AND user_id = $2
    RETURNING id
"#;

/// Postgres-backed note store using the shared pool
pub struct PgNoteStore {
    pools: Arc<PoolManager<PgPool>>,
}

impl PgNoteStore {
    pub fn new(pools: Arc<PoolManager<PgPool>>) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn create(&self, user_id: &str, title: &str, content: &str) -> Result<Note, DatabaseError> {
        let pool = self.pools.get().await?;
        let note = sqlx::query_as::<_, Note>(INSERT_NOTE)
            .bind(user_id)
            .bind(title)
            .bind(content)
            .fetch_one(pool)
            .await?;
        Ok(note)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError> {
        let pool = self.pools.get().await?;
        let notes = sqlx::query_as::<_, Note>(SELECT_NOTES)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(notes)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<Option<Uuid>, DatabaseError> {
        let pool = self.pools.get().await?;
        let deleted = sqlx::query_scalar::<_, Uuid>(DELETE_NOTE)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(deleted)
    }

    fn is_ready(&self) -> bool {
        self.pools.is_ready()
    }
}
