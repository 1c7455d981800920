/// Database models for Dax
///
/// Each model owns its CRUD queries as associated functions taking a
/// `&PgPool`, so every operation is exactly one statement.
///
/// # Models
///
/// - `user`: Accounts that own and contribute to vaults
/// - `vault`: Named containers of entries, unique per owner
/// - `vault_user`: Contributor rows linking users to vaults
/// - `entry`: Free-form records inside a vault
///
/// # Example
///
/// ```no_run
/// use dax_shared::models::{vault::{CreateVault, Vault}, Document};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let vault = Vault::create(&pool, CreateVault {
///     owner_id: owner,
///     name: "Personal".to_string(),
///     settings: Document::new(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod entry;
pub mod user;
pub mod vault;
pub mod vault_user;

/// Schemaless JSON object stored in a `JSONB` column.
///
/// Used for `Vault::settings`, `Entry::attributes` and `User::settings`.
/// Keys are strings; values are arbitrary JSON.
pub type Document = serde_json::Map<String, serde_json::Value>;
