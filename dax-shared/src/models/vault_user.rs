/// Contributor rows: the many-to-many link between vaults and users
///
/// A user appears at most once per vault (`unique_vault_user`). Rows are
/// removed by the store when either the vault or the user is deleted.
/// Contributors are recorded only; nothing consults them for access.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vault_users (
///     vault_id UUID NOT NULL REFERENCES vaults(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT unique_vault_user PRIMARY KEY (vault_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the store constraint guarding `(vault_id, user_id)`
pub const UNIQUE_VAULT_USER: &str = "unique_vault_user";

/// A contributor row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VaultUser {
    pub vault_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl VaultUser {
    /// Adds `user_id` as a contributor of `vault_id`.
    ///
    /// # Errors
    ///
    /// - unique violation on [`UNIQUE_VAULT_USER`] if already a contributor
    /// - foreign key violation if either side doesn't exist
    pub async fn create(pool: &PgPool, vault_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, VaultUser>(
            r#"
            INSERT INTO vault_users (vault_id, user_id)
            VALUES ($1, $2)
            RETURNING vault_id, user_id, created_at
            "#,
        )
        .bind(vault_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Contributors of a vault in the order they were added
    pub async fn list_by_vault(pool: &PgPool, vault_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, VaultUser>(
            r#"
            SELECT vault_id, user_id, created_at
            FROM vault_users
            WHERE vault_id = $1
            ORDER BY created_at, user_id
            "#,
        )
        .bind(vault_id)
        .fetch_all(pool)
        .await
    }

    /// Vaults a user contributes to
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, VaultUser>(
            r#"
            SELECT vault_id, user_id, created_at
            FROM vault_users
            WHERE user_id = $1
            ORDER BY created_at, vault_id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Returns false if the user wasn't a contributor.
    pub async fn delete(pool: &PgPool, vault_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vault_users WHERE vault_id = $1 AND user_id = $2")
            .bind(vault_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
