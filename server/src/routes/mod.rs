//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every `/api` route answers with the `{success, data, message}` envelope,
//! including failures, so clients parse one shape. Stored images are served
//! as static files under `/uploads`.

pub mod auth;
pub mod checkins;
pub mod courts;
pub mod images;


use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use model::Envelope;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Room for multipart boundaries and text fields around the image bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let upload_limit = state.images.max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    let uploads = ServeDir::new(&state.images.storage_dir);

    Router::new()
        .route("/api/court", get(courts::list_courts).post(courts::create_court))
        .route("/api/court/{id}", get(courts::get_court).put(courts::update_court))
        .route("/api/checkin", get(checkins::list_check_ins).post(checkins::create_check_in))
        .route("/api/checkin/{id}", get(checkins::get_check_in).put(checkins::update_check_in))
        .route(
            "/api/image",
            get(images::list_images)
                .post(images::upload_image)
                .delete(images::delete_image)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/healthz", get(healthz))
        .nest_service("/uploads", uploads)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// RESPONSES
// =============================================================================

/// A failed request rendered as an envelope with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// A 500 whose cause is logged but not exposed to the caller.
    pub fn internal(error: &dyn std::error::Error, message: impl Into<String>) -> Self {
        tracing::error!(%error, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope::<()>::fail(self.message))).into_response()
    }
}

/// A successful envelope response.
pub(crate) fn ok<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    (status, Json(Envelope::ok(data, message))).into_response()
}
