/// Entry endpoints
///
/// - `GET    /v1/entries/` - List entries, most recently updated first (`?vault=`, `?search=`)
/// - `POST   /v1/entries/` - Create an entry
/// - `GET    /v1/entries/:id/` - Retrieve an entry
/// - `PUT    /v1/entries/:id/` - Full update (`vault` required)
/// - `PATCH  /v1/entries/:id/` - Partial update
/// - `DELETE /v1/entries/:id/` - Delete an entry
///
/// Every update moves `updated_at` forward; `created_at` never changes.

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
        entry::{CreateEntry, Entry, EntryFilter, UpdateEntry},
        Document,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Entry request body, shared by create, PUT and PATCH.
///
/// Fields may be omitted but never `null`; text is trimmed.
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub vault: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable_trimmed")]
    #[validate(
        length(max = 255, message = "Heading must be at most 255 characters"),
        custom(function = validate_text)
    )]
    pub heading: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable_trimmed")]
    #[validate(custom(function = validate_text))]
    pub body: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = validate_document))]
    pub attributes: Option<Option<serde_json::Value>>,
}

impl EntryRequest {
    /// Required on create and PUT
    const REQUIRED: &'static [&'static str] = &["vault"];

    fn fields(&self) -> [(&'static str, Presence); 4] {
        [
            ("vault", Presence::of(&self.vault)),
            ("heading", Presence::of(&self.heading)),
            ("body", Presence::of(&self.body)),
            ("attributes", Presence::of(&self.attributes)),
        ]
    }

    fn into_update(self) -> UpdateEntry {
        UpdateEntry {
            vault_id: self.vault.flatten(),
            heading: self.heading.flatten(),
            body: self.body.flatten(),
            attributes: self.attributes.flatten().map(into_document),
        }
    }
}

/// Entry representation
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub url: String,
    pub id: Uuid,
    pub vault: Uuid,
    pub heading: String,
    pub body: String,
    pub attributes: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntryResponse {
    pub fn new(entry: Entry, links: Links<'_>) -> Self {
        Self {
            url: links.entry(entry.id),
            id: entry.id,
            vault: entry.vault_id,
            heading: entry.heading,
            body: entry.body,
            attributes: entry.attributes.0,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

fn entry_not_found() -> ApiError {
    ApiError::NotFound("Entry not found".to_string())
}

pub async fn list_entries(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<EntryFilter>,
) -> ApiResult<Json<Vec<EntryResponse>>> {
    let links = state.links();
    let entries = Entry::list(&state.db, &filter).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| EntryResponse::new(entry, links))
            .collect(),
    ))
}

/// Create an entry. Only `vault` is required; missing content is blank.
///
/// # Errors
///
/// - `422`: `vault` missing, heading too long, `attributes` not an object
/// - `404`: `vault` doesn't exist
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<EntryRequest>,
) -> ApiResult<(StatusCode, Json<EntryResponse>)> {
    validate_request(&req, &req.fields(), EntryRequest::REQUIRED)?;

    let Some(vault_id) = req.vault.flatten() else {
        return Err(ApiError::invalid_field("vault", "This field is required."));
    };

    let blank = CreateEntry::blank(vault_id);
    let entry = Entry::create(
        &state.db,
        CreateEntry {
            heading: req.heading.flatten().unwrap_or(blank.heading),
            body: req.body.flatten().unwrap_or(blank.body),
            attributes: req
                .attributes
                .flatten()
                .map(into_document)
                .unwrap_or(blank.attributes),
            vault_id,
        },
    )
    .await?;

    tracing::info!(entry_id = %entry.id, vault_id = %entry.vault_id, user_id = %auth.user_id, "Entry created");

    Ok((
        StatusCode::CREATED,
        Json(EntryResponse::new(entry, state.links())),
    ))
}

pub async fn get_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<EntryResponse>> {
    let entry = Entry::find_by_id(&state.db, id)
        .await?
        .ok_or_else(entry_not_found)?;

    Ok(Json(EntryResponse::new(entry, state.links())))
}

/// Full update. `vault` must be present; omitted content keeps its value.
pub async fn replace_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EntryRequest>,
) -> ApiResult<Json<EntryResponse>> {
    validate_request(&req, &req.fields(), EntryRequest::REQUIRED)?;
    apply_update(&state, id, req.into_update()).await
}

pub async fn update_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EntryRequest>,
) -> ApiResult<Json<EntryResponse>> {
    validate_request(&req, &req.fields(), &[])?;
    apply_update(&state, id, req.into_update()).await
}

async fn apply_update(
    state: &AppState,
    id: Uuid,
    update: UpdateEntry,
) -> ApiResult<Json<EntryResponse>> {
    let entry = Entry::update(&state.db, id, update)
        .await?
        .ok_or_else(entry_not_found)?;

    tracing::debug!(entry_id = %entry.id, updated_at = %entry.updated_at, "Entry updated");
    Ok(Json(EntryResponse::new(entry, state.links())))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !Entry::delete(&state.db, id).await? {
        return Err(entry_not_found());
    }

    tracing::debug!(entry_id = %id, "Entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
