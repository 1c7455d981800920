/// Vault model and database operations
///
/// A vault is a named container of entries owned by one user. Names are
/// unique per owner; the store rejects duplicates through the
/// `unique_vault_name_per_owner` constraint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vaults (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     settings JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT unique_vault_name_per_owner UNIQUE (owner_id, name)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use dax_shared::models::vault::{Vault, VaultFilter};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// // Newest first
/// for vault in Vault::list(&pool, &VaultFilter::default()).await? {
///     println!("{} ({})", vault.name, vault.created_at);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::Document;

/// Maximum vault name length, matching the column width
pub const NAME_MAX_LEN: usize = 255;

/// Name of the store constraint guarding `(owner_id, name)`
pub const UNIQUE_NAME_PER_OWNER: &str = "unique_vault_name_per_owner";

/// A vault row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vault {
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Display name, unique per owner
    pub name: String,

    /// Free-form vault settings
    pub settings: Json<Document>,

    /// Creation time, never modified
    pub created_at: DateTime<Utc>,
}

/// Input for creating a vault
#[derive(Debug, Clone)]
pub struct CreateVault {
    pub owner_id: Uuid,
    pub name: String,
    pub settings: Document,
}

/// Fields to change on an existing vault. `None` leaves a column as is.
///
/// `created_at` is deliberately absent: it is immutable.
#[derive(Debug, Clone, Default)]
pub struct UpdateVault {
    pub owner_id: Option<Uuid>,
    pub name: Option<String>,
    pub settings: Option<Document>,
}

/// List filters. Empty filter lists everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultFilter {
    /// Only vaults owned by this user
    pub owner: Option<Uuid>,

    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

impl Vault {
    /// Inserts a vault.
    ///
    /// # Errors
    ///
    /// - unique violation on [`UNIQUE_NAME_PER_OWNER`] for a duplicate name
    /// - foreign key violation if `owner_id` doesn't exist
    pub async fn create(pool: &PgPool, data: CreateVault) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Vault>(
            r#"
            INSERT INTO vaults (owner_id, name, settings)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, settings, created_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(Json(data.settings))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vault>(
            r#"
            SELECT id, owner_id, name, settings, created_at
            FROM vaults
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists vaults, newest first.
    pub async fn list(pool: &PgPool, filter: &VaultFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vault>(
            r#"
            SELECT id, owner_id, name, settings, created_at
            FROM vaults
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(filter.owner)
        .bind(filter.search.as_deref())
        .fetch_all(pool)
        .await
    }

    /// Applies the non-`None` fields of `data`.
    ///
    /// Returns `None` if the vault doesn't exist. Renaming onto a name the
    /// owner already uses fails with a unique violation.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateVault,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vault>(
            r#"
            UPDATE vaults
            SET owner_id = COALESCE($2, owner_id),
                name = COALESCE($3, name),
                settings = COALESCE($4, settings)
            WHERE id = $1
            RETURNING id, owner_id, name, settings, created_at
            "#,
        )
        .bind(id)
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.settings.map(Json))
        .fetch_optional(pool)
        .await
    }

    /// Deletes a vault. Its entries and contributor rows go with it.
    ///
    /// Returns false if the vault didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vaults WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
