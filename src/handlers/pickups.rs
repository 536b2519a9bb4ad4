use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::auth::{load_identity, AuthUser};
use crate::errors::ServiceError;
use crate::services::pickups::PickupRequestInput;
use crate::AppState;

/// Schedule a pickup for a committed waybill
#[utoipa::path(
    post,
    path = "/api/v1/pickup-requests",
    request_body = PickupRequestInput,
    responses(
        (status = 201, description = "Pickup request recorded with its skids"),
        (status = 422, description = "Field validation failed, including an unrecognized waybill number"),
        (status = 403, description = "Requester cannot schedule pickups")
    ),
    security(("bearer_auth" = [])),
    tag = "pickups"
)]
pub async fn create_pickup_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<PickupRequestInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = load_identity(&state.db, auth.user_id).await?;
    let outcome = state.services.pickups.submit(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
