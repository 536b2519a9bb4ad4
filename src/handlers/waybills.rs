use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{load_identity, AuthUser};
use crate::errors::ServiceError;
use crate::services::waybills::{WaybillForm, WaybillListing};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListWaybillsParams {
    /// Page number, 1-based
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Exact waybill number to search for; covers the whole archive
    pub waybill_number: Option<i64>,
    /// Archive year; without it the listing covers the recent window
    pub year: Option<i32>,
    /// Month within `year`, 1-12
    pub month: Option<u32>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    25
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NewWaybillParams {
    /// Ship on behalf of this company instead of the primary one
    pub client_id: Option<Uuid>,
    /// Keep the staged draft (returning from the preview screen)
    #[serde(default)]
    pub resume: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CommitRequest {
    /// Whether to notify the shipper about piece-count discrepancies
    pub notify_discrepancies: Option<bool>,
}

/// List waybills visible to the requester
#[utoipa::path(
    get,
    path = "/api/v1/waybills",
    params(ListWaybillsParams),
    responses(
        (status = 200, description = "Waybills for the requester's companies", body = WaybillListing),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Requester cannot access waybills")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn list_waybills(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListWaybillsParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let listing = state
        .services
        .waybills
        .list_waybills(
            &identity,
            params.page.max(1),
            params.limit.clamp(1, 100),
            params.waybill_number,
            params.year,
            params.month,
        )
        .await?;

    Ok(Json(listing))
}

/// Seed data for the waybill creation form
#[utoipa::path(
    get,
    path = "/api/v1/waybills/new",
    params(NewWaybillParams),
    responses(
        (status = 200, description = "Form context: company, staged draft, service catalog"),
        (status = 403, description = "Requester cannot ship for this company")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn new_waybill(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<NewWaybillParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let context = state
        .services
        .waybills
        .form_context(&identity, params.client_id, params.resume)
        .await?;
    Ok(Json(context))
}

/// Validate a waybill form, stage it as a draft and render a preview
#[utoipa::path(
    post,
    path = "/api/v1/waybills/preview",
    request_body = WaybillForm,
    responses(
        (status = 200, description = "Draft staged; preview artifact rendered"),
        (status = 422, description = "Field validation failed"),
        (status = 403, description = "Requester cannot ship for this company")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn preview_waybill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<WaybillForm>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let outcome = state.services.waybills.preview(&identity, form).await?;
    Ok(Json(outcome))
}

/// Commit the staged draft into a numbered waybill
#[utoipa::path(
    post,
    path = "/api/v1/waybills/commit",
    request_body = CommitRequest,
    responses(
        (status = 201, description = "Waybill committed and numbered"),
        (status = 409, description = "No staged draft to commit"),
        (status = 403, description = "Requester cannot ship for this company")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn commit_waybill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CommitRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let outcome = state
        .services
        .waybills
        .commit(&identity, request.notify_discrepancies)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Discard the staged draft
#[utoipa::path(
    delete,
    path = "/api/v1/waybills/draft",
    responses(
        (status = 204, description = "Draft discarded (idempotent)")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn discard_draft(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    identity.forbid_shipping_clerks()?;
    state.drafts.clear(auth.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Seed a waybill draft from an existing quote
#[utoipa::path(
    post,
    path = "/api/v1/waybills/convert/{quote_id}",
    params(("quote_id" = Uuid, Path, description = "Quote to convert")),
    responses(
        (status = 200, description = "Draft seeded from the quote (or the in-progress draft, untouched)"),
        (status = 404, description = "Quote not found"),
        (status = 403, description = "Quote belongs to another company")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn convert_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let outcome = state.services.quotes.convert(&identity, quote_id).await?;
    Ok(Json(outcome))
}

/// Fetch a committed waybill with its service lines
#[utoipa::path(
    get,
    path = "/api/v1/waybills/{id}",
    params(("id" = Uuid, Path, description = "Waybill id")),
    responses(
        (status = 200, description = "The waybill and its service lines"),
        (status = 404, description = "Waybill not found"),
        (status = 403, description = "Waybill belongs to another company")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn get_waybill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let found = state.services.waybills.get_waybill(&identity, id).await?;
    Ok(Json(found))
}

/// Regenerate and return the document reference for a waybill
#[utoipa::path(
    get,
    path = "/api/v1/waybills/{id}/document",
    params(("id" = Uuid, Path, description = "Waybill id")),
    responses(
        (status = 200, description = "Reference to the rendered document"),
        (status = 404, description = "Waybill not found"),
        (status = 502, description = "Document generation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "waybills"
)]
pub async fn get_waybill_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let artifact = state.services.waybills.document(&identity, id).await?;
    Ok(Json(artifact))
}
