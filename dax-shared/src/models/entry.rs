/// Entry model and database operations
///
/// An entry is a free-form record (heading, body, attributes) belonging to
/// exactly one vault. Deleting the vault deletes its entries.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE entries (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     vault_id UUID NOT NULL REFERENCES vaults(id) ON DELETE CASCADE,
///     heading VARCHAR(255) NOT NULL DEFAULT '',
///     body TEXT NOT NULL DEFAULT '',
///     attributes JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `updated_at` is refreshed by every [`Entry::update`], including one that
/// changes no column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::Document;

/// Maximum heading length, matching the column width
pub const HEADING_MAX_LEN: usize = 255;

/// An entry row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: Uuid,

    /// Containing vault
    pub vault_id: Uuid,

    /// Short title, may be empty
    pub heading: String,

    /// Free text, may be empty
    pub body: String,

    /// Free-form entry attributes
    pub attributes: Json<Document>,

    /// Creation time, never modified
    pub created_at: DateTime<Utc>,

    /// Time of the last modification
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an entry. Optional content defaults to blank/empty.
#[derive(Debug, Clone)]
pub struct CreateEntry {
    pub vault_id: Uuid,
    pub heading: String,
    pub body: String,
    pub attributes: Document,
}

impl CreateEntry {
    /// Entry in `vault_id` with blank heading/body and no attributes
    pub fn blank(vault_id: Uuid) -> Self {
        Self {
            vault_id,
            heading: String::new(),
            body: String::new(),
            attributes: Document::new(),
        }
    }
}

/// Fields to change on an existing entry. `None` leaves a column as is.
#[derive(Debug, Clone, Default)]
pub struct UpdateEntry {
    pub vault_id: Option<Uuid>,
    pub heading: Option<String>,
    pub body: Option<String>,
    pub attributes: Option<Document>,
}

/// List filters. Empty filter lists everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilter {
    /// Only entries in this vault
    pub vault: Option<Uuid>,

    /// Case-insensitive substring of the heading or body
    pub search: Option<String>,
}

impl Entry {
    /// Inserts an entry.
    ///
    /// # Errors
    ///
    /// Foreign key violation if `vault_id` doesn't exist.
    pub async fn create(pool: &PgPool, data: CreateEntry) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (vault_id, heading, body, attributes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, vault_id, heading, body, attributes, created_at, updated_at
            "#,
        )
        .bind(data.vault_id)
        .bind(data.heading)
        .bind(data.body)
        .bind(Json(data.attributes))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, vault_id, heading, body, attributes, created_at, updated_at
            FROM entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists entries, most recently modified first.
    pub async fn list(pool: &PgPool, filter: &EntryFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, vault_id, heading, body, attributes, created_at, updated_at
            FROM entries
            WHERE ($1::uuid IS NULL OR vault_id = $1)
              AND ($2::text IS NULL
                   OR strpos(lower(heading), lower($2)) > 0
                   OR strpos(lower(body), lower($2)) > 0)
            ORDER BY updated_at DESC, id
            "#,
        )
        .bind(filter.vault)
        .bind(filter.search.as_deref())
        .fetch_all(pool)
        .await
    }

    /// Applies the non-`None` fields of `data` and refreshes `updated_at`.
    ///
    /// Returns `None` if the entry doesn't exist. Moving to a nonexistent
    /// vault fails with a foreign key violation.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEntry,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
            SET vault_id = COALESCE($2, vault_id),
                heading = COALESCE($3, heading),
                body = COALESCE($4, body),
                attributes = COALESCE($5, attributes),
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, vault_id, heading, body, attributes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.vault_id)
        .bind(data.heading)
        .bind(data.body)
        .bind(data.attributes.map(Json))
        .fetch_optional(pool)
        .await
    }

    /// Returns false if the entry didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of entries in a vault
    pub async fn count_by_vault(pool: &PgPool, vault_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE vault_id = $1")
            .bind(vault_id)
            .fetch_one(pool)
            .await
    }
}
