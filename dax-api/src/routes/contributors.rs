/// Vault contributor endpoints
///
/// - `GET    /v1/vaults/:id/contributors/` - List contributors, oldest first
/// - `POST   /v1/vaults/:id/contributors/` - Add a contributor `{"user": "<uuid>"}`
/// - `DELETE /v1/vaults/:id/contributors/:user_id/` - Remove a contributor
///
/// Contributors are recorded only; they grant nothing.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use dax_shared::models::{vault::Vault, vault_user::VaultUser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Add-contributor request body
#[derive(Debug, Deserialize)]
pub struct AddContributorRequest {
    pub user: Uuid,
}

/// Contributor representation
#[derive(Debug, Serialize, Deserialize)]
pub struct ContributorResponse {
    pub vault: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<VaultUser> for ContributorResponse {
    fn from(row: VaultUser) -> Self {
        Self {
            vault: row.vault_id,
            user: row.user_id,
            created_at: row.created_at,
        }
    }
}

pub async fn list_contributors(
    State(state): State<AppState>,
    ApiPath(vault_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ContributorResponse>>> {
    if Vault::find_by_id(&state.db, vault_id).await?.is_none() {
        return Err(ApiError::NotFound("Vault not found".to_string()));
    }

    let rows = VaultUser::list_by_vault(&state.db, vault_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Add a contributor
///
/// # Errors
///
/// - `404`: vault or user doesn't exist
/// - `409`: user is already a contributor
pub async fn add_contributor(
    State(state): State<AppState>,
    ApiPath(vault_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddContributorRequest>,
) -> ApiResult<(StatusCode, Json<ContributorResponse>)> {
    let row = VaultUser::create(&state.db, vault_id, req.user).await?;

    tracing::info!(vault_id = %vault_id, contributor_id = %req.user, "Contributor added");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn remove_contributor(
    State(state): State<AppState>,
    ApiPath((vault_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if !VaultUser::delete(&state.db, vault_id, user_id).await? {
        return Err(ApiError::NotFound("Contributor not found".to_string()));
    }

    tracing::info!(vault_id = %vault_id, contributor_id = %user_id, "Contributor removed");
    Ok(StatusCode::NO_CONTENT)
}
