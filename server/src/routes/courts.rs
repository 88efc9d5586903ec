//! Court routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use model::{CourtPatch, NewCourt};
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::{ApiFailure, ok};
use crate::services::court::{self, CourtError};
use crate::state::AppState;

/// `GET /api/court`: courts owned by the caller.
pub async fn list_courts(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiFailure> {
    let courts = court::list_courts(&state.pool, auth.id())
        .await
        .map_err(|e| court_error_to_status(e, "Failed to retrieve courts"))?;
    Ok(ok(StatusCode::OK, courts, ""))
}

/// `POST /api/court`: create a court.
pub async fn create_court(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewCourt>,
) -> Result<Response, ApiFailure> {
    let created = court::create_court(&state.pool, auth.id(), &body)
        .await
        .map_err(|e| court_error_to_status(e, "Failed to create court"))?;
    Ok(ok(StatusCode::CREATED, created, "Court created successfully"))
}

/// `GET /api/court/:id`: one court with the caller's check-ins.
pub async fn get_court(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiFailure> {
    let detail = court::get_court(&state.pool, id, auth.id())
        .await
        .map_err(|e| court_error_to_status(e, "Failed to retrieve court"))?;
    Ok(ok(StatusCode::OK, detail, ""))
}

/// `PUT /api/court/:id`: partial update of an owned court.
pub async fn update_court(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<CourtPatch>,
) -> Result<Response, ApiFailure> {
    let updated = court::update_court(&state.pool, id, auth.id(), &patch)
        .await
        .map_err(|e| court_error_to_status(e, "Failed to update court"))?;
    Ok(ok(StatusCode::OK, updated, "Court updated successfully"))
}

/// Map a service error to a failure response; `fallback` is the 500 message.
pub(crate) fn court_error_to_status(err: CourtError, fallback: &str) -> ApiFailure {
    match err {
        CourtError::NotFound(_) => ApiFailure::not_found("Court not found"),
        CourtError::Invalid(e) => ApiFailure::bad_request(e.to_string()),
        CourtError::Database(e) => ApiFailure::internal(&e, fallback),
    }
}
