//! Check-in routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use model::{CheckInPatch, NewCheckIn};
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::{ApiFailure, ok};
use crate::services::check_in::{self, CheckInError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CheckInListQuery {
    #[serde(rename = "courtId")]
    court_id: Option<String>,
}

/// Parse the `courtId` query parameter; blank or malformed ids are rejected.
pub(crate) fn parse_court_id(raw: Option<&str>) -> Result<Uuid, ApiFailure> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| ApiFailure::bad_request("Missing courtId"))?;
    Uuid::parse_str(raw).map_err(|_| ApiFailure::bad_request("Invalid courtId"))
}

/// `GET /api/checkin?courtId=`: the caller's check-ins at a court.
pub async fn list_check_ins(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CheckInListQuery>,
) -> Result<Response, ApiFailure> {
    let court_id = parse_court_id(query.court_id.as_deref())?;
    let check_ins = check_in::list_check_ins(&state.pool, court_id, auth.id())
        .await
        .map_err(|e| check_in_error_to_status(e, "Failed to retrieve check-ins"))?;
    Ok(ok(StatusCode::OK, check_ins, ""))
}

/// `POST /api/checkin`: record a visit. Does not change the court's play count.
pub async fn create_check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewCheckIn>,
) -> Result<Response, ApiFailure> {
    let created = check_in::create_check_in(&state.pool, body.court_id, auth.id())
        .await
        .map_err(|e| check_in_error_to_status(e, "Failed to create check-in"))?;
    Ok(ok(StatusCode::OK, created, "Check-in created successfully"))
}

/// `GET /api/checkin/:id`
pub async fn get_check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiFailure> {
    let found = check_in::get_check_in(&state.pool, id, auth.id())
        .await
        .map_err(|e| check_in_error_to_status(e, "Failed to retrieve check-in"))?;
    Ok(ok(StatusCode::OK, found, ""))
}

/// `PUT /api/checkin/:id`
pub async fn update_check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<CheckInPatch>,
) -> Result<Response, ApiFailure> {
    let updated = check_in::update_check_in(&state.pool, id, auth.id(), &patch)
        .await
        .map_err(|e| check_in_error_to_status(e, "Failed to update check-in"))?;
    Ok(ok(StatusCode::OK, updated, "Check-in updated successfully"))
}

pub(crate) fn check_in_error_to_status(err: CheckInError, fallback: &str) -> ApiFailure {
    match err {
        CheckInError::NotFound(_) => ApiFailure::not_found("Checkin not found"),
        CheckInError::CourtNotFound(_) => ApiFailure::not_found("Court not found"),
        CheckInError::Database(e) => ApiFailure::internal(&e, fallback),
    }
}
