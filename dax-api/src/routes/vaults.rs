/// Vault endpoints
///
/// - `GET    /v1/vaults/` - List vaults, newest first (`?owner=`, `?search=`)
/// - `POST   /v1/vaults/` - Create a vault
/// - `GET    /v1/vaults/:id/` - Retrieve a vault
/// - `PUT    /v1/vaults/:id/` - Full update (`owner` and `name` required)
/// - `PATCH  /v1/vaults/:id/` - Partial update
/// - `DELETE /v1/vaults/:id/` - Delete a vault with its entries and contributors
///
/// # Representation
///
/// ```json
/// {
///   "url": "https://dax.example.com/v1/vaults/6f1c.../",
///   "id": "6f1c...",
///   "owner": "0b7e...",
///   "name": "Personal",
///   "settings": {},
///   "created_at": "2025-01-01T00:00:00Z"
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::{
        into_document, nullable, nullable_trimmed, validate_document, validate_request,
        validate_text, Links, Presence,
    },
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use dax_shared::{
    auth::middleware::AuthContext,
    models::{
        vault::{CreateVault, UpdateVault, Vault, VaultFilter},
        Document,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Vault request body, shared by create, PUT and PATCH.
///
/// A field may be omitted but never `null`; `name` is trimmed.
#[derive(Debug, Deserialize, Validate)]
pub struct VaultRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub owner: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable_trimmed")]
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = validate_text)
    )]
    pub name: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = validate_document))]
    pub settings: Option<Option<serde_json::Value>>,
}

impl VaultRequest {
    /// Required on create and PUT
    const REQUIRED: &'static [&'static str] = &["owner", "name"];

    fn fields(&self) -> [(&'static str, Presence); 3] {
        [
            ("owner", Presence::of(&self.owner)),
            ("name", Presence::of(&self.name)),
            ("settings", Presence::of(&self.settings)),
        ]
    }

    fn into_update(self) -> UpdateVault {
        UpdateVault {
            owner_id: self.owner.flatten(),
            name: self.name.flatten(),
            settings: self.settings.flatten().map(into_document),
        }
    }
}

/// Vault representation
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultResponse {
    pub url: String,
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub settings: Document,
    pub created_at: DateTime<Utc>,
}

impl VaultResponse {
    pub fn new(vault: Vault, links: Links<'_>) -> Self {
        Self {
            url: links.vault(vault.id),
            id: vault.id,
            owner: vault.owner_id,
            name: vault.name,
            settings: vault.settings.0,
            created_at: vault.created_at,
        }
    }
}

fn vault_not_found() -> ApiError {
    ApiError::NotFound("Vault not found".to_string())
}

pub async fn list_vaults(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<VaultFilter>,
) -> ApiResult<Json<Vec<VaultResponse>>> {
    let links = state.links();
    let vaults = Vault::list(&state.db, &filter).await?;

    Ok(Json(
        vaults
            .into_iter()
            .map(|vault| VaultResponse::new(vault, links))
            .collect(),
    ))
}

/// Create a vault
///
/// # Errors
///
/// - `422`: `owner` or `name` missing, name too long, `settings` not an object
/// - `404`: `owner` is not a user
/// - `409`: the owner already has a vault with this name
pub async fn create_vault(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<VaultRequest>,
) -> ApiResult<(StatusCode, Json<VaultResponse>)> {
    validate_request(&req, &req.fields(), VaultRequest::REQUIRED)?;

    let (Some(owner_id), Some(name)) = (req.owner.flatten(), req.name.flatten()) else {
        return Err(ApiError::BadRequest("owner and name are required".to_string()));
    };

    let vault = Vault::create(
        &state.db,
        CreateVault {
            owner_id,
            name,
            settings: req.settings.flatten().map(into_document).unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(vault_id = %vault.id, owner_id = %vault.owner_id, user_id = %auth.user_id, "Vault created");

    Ok((
        StatusCode::CREATED,
        Json(VaultResponse::new(vault, state.links())),
    ))
}

pub async fn get_vault(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<VaultResponse>> {
    let vault = Vault::find_by_id(&state.db, id)
        .await?
        .ok_or_else(vault_not_found)?;

    Ok(Json(VaultResponse::new(vault, state.links())))
}

/// Full update. `owner` and `name` must be present; an omitted
/// `settings` keeps its current value.
pub async fn replace_vault(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<VaultRequest>,
) -> ApiResult<Json<VaultResponse>> {
    validate_request(&req, &req.fields(), VaultRequest::REQUIRED)?;
    apply_update(&state, id, req.into_update()).await
}

/// Partial update. Only the supplied fields change.
pub async fn update_vault(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<VaultRequest>,
) -> ApiResult<Json<VaultResponse>> {
    validate_request(&req, &req.fields(), &[])?;
    apply_update(&state, id, req.into_update()).await
}

async fn apply_update(
    state: &AppState,
    id: Uuid,
    update: UpdateVault,
) -> ApiResult<Json<VaultResponse>> {
    let vault = Vault::update(&state.db, id, update)
        .await?
        .ok_or_else(vault_not_found)?;

    tracing::debug!(vault_id = %vault.id, "Vault updated");
    Ok(Json(VaultResponse::new(vault, state.links())))
}

pub async fn delete_vault(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !Vault::delete(&state.db, id).await? {
        return Err(vault_not_found());
    }

    tracing::info!(vault_id = %id, user_id = %auth.user_id, "Vault deleted");
    Ok(StatusCode::NO_CONTENT)
}
