//! Image routes: multipart upload, listing, and deletion.

use axum::body::Bytes;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use model::{ImageQuery, ValidationError};
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::{ApiFailure, ok};
use crate::services::image::{self, ImageError, ImageUpload};
use crate::state::AppState;

const UPLOAD_FAILED: &str = "We're having trouble uploading your image right now. Please try again.";
const DELETE_FAILED: &str = "We're having trouble deleting your image right now. Please try again.";

#[derive(Deserialize)]
struct DeleteImageBody {
    #[serde(default)]
    id: Option<String>,
}

fn parse_association_id(name: &str, raw: &str) -> Result<Option<Uuid>, ApiFailure> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw).map(Some).map_err(|_| ApiFailure::bad_request(format!("Invalid {name}")))
}

/// Collect the `image` file part and the optional association fields.
async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, ApiFailure> {
    let invalid = || ApiFailure::bad_request(ValidationError::InvalidImage.to_string());
    let mut upload = ImageUpload { bytes: Vec::new(), content_type: String::new(), association: ImageQuery::default() };

    while let Some(field) = multipart.next_field().await.map_err(|_| invalid())? {
        match field.name() {
            Some("image") => {
                upload.content_type = field.content_type().unwrap_or_default().to_ascii_lowercase();
                upload.bytes = field.bytes().await.map_err(|_| invalid())?.to_vec();
            }
            Some(name @ ("courtId" | "checkinId")) => {
                let name = name.to_owned();
                let text = field.text().await.map_err(|_| invalid())?;
                let id = parse_association_id(&name, &text)?;
                if name == "courtId" {
                    upload.association.court_id = id;
                } else {
                    upload.association.checkin_id = id;
                }
            }
            _ => {}
        }
    }
    Ok(upload)
}

/// `POST /api/image`: multipart upload.
pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Response, ApiFailure> {
    let upload = read_upload(multipart).await?;
    let uploaded = image::upload_image(&state, auth.id(), upload)
        .await
        .map_err(|e| image_error_to_status(e, UPLOAD_FAILED))?;
    Ok(ok(StatusCode::OK, uploaded, "Image uploaded successfully!"))
}

/// `GET /api/image?courtId=|checkinId=`
pub async fn list_images(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiFailure> {
    let images = image::list_images(&state, auth.id(), query)
        .await
        .map_err(|e| image_error_to_status(e, "Failed to fetch images"))?;
    Ok(ok(StatusCode::OK, images, ""))
}

/// `DELETE /api/image` with body `{id}`.
pub async fn delete_image(State(state): State<AppState>, auth: AuthUser, body: Bytes) -> Result<Response, ApiFailure> {
    let id = serde_json::from_slice::<DeleteImageBody>(&body)
        .ok()
        .and_then(|b| b.id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Image information is missing."))?;

    image::delete_image(&state, auth.id(), &id)
        .await
        .map_err(|e| image_error_to_status(e, DELETE_FAILED))?;
    Ok(ok(StatusCode::OK, (), "Image deleted successfully!"))
}

pub(crate) fn image_error_to_status(err: ImageError, fallback: &str) -> ApiFailure {
    match err {
        ImageError::Invalid(e) => ApiFailure::bad_request(e.to_string()),
        ImageError::MissingAssociation => ApiFailure::bad_request("Either courtId or checkinId is required"),
        ImageError::CourtNotFound(_) => ApiFailure::not_found("Court not found"),
        ImageError::CheckInNotFound(_) => ApiFailure::not_found("Checkin not found"),
        ImageError::NotFound(_) => ApiFailure::not_found("Image not found or already deleted."),
        ImageError::Forbidden(_) => ApiFailure::new(StatusCode::FORBIDDEN, "You can only delete your own images."),
        ImageError::Storage(e) => ApiFailure::internal(&e, fallback),
        ImageError::Database(e) => ApiFailure::internal(&e, fallback),
    }
}
