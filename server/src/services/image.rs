//! Image service: uploads, listing, and owner-only deletion.
//!
//! DESIGN
//! ======
//! Bytes go to the [`BlobStore`] under `{user_id}/{image_id}.{ext}`; the
//! `images` row records the key together with the owning user and the court
//! or check-in the image belongs to. Bytes are stored as uploaded.
//!
//! ERROR HANDLING
//! ==============
//! Upload writes the blob first and removes it again if the row insert
//! fails. Delete checks ownership before touching anything; once the row
//! is gone a failed blob removal is logged and the delete still succeeds.

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;

use model::{Image, ImageQuery, ImageWithUrl, UploadedImage, ValidationError, validate_image};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::storage::StorageError;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("either courtId or checkinId is required")]
    MissingAssociation,
    #[error("court not found: {0}")]
    CourtNotFound(Uuid),
    #[error("check-in not found: {0}")]
    CheckInNotFound(Uuid),
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("image {0} belongs to another user")]
    Forbidden(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageRow {
    pub id: Uuid,
    pub image_id: String,
    pub storage_key: String,
    pub user_id: String,
    pub court_id: Option<Uuid>,
    pub checkin_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            image_id: row.image_id,
            user_id: row.user_id,
            court_id: row.court_id,
            checkin_id: row.checkin_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// An upload as received by the route, before validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub association: ImageQuery,
}

const IMAGE_COLUMNS: &str = "id, image_id, storage_key, user_id, court_id, checkin_id, created_at, updated_at";

pub(crate) fn storage_key(user_id: &str, image_id: &str, ext: &str) -> String {
    format!("{user_id}/{image_id}.{ext}")
}

/// Reject deletes by anyone other than the uploader.
pub(crate) fn ensure_image_owner(row: &ImageRow, user_id: &str) -> Result<(), ImageError> {
    if row.user_id == user_id { Ok(()) } else { Err(ImageError::Forbidden(row.image_id.clone())) }
}

/// Map a foreign-key violation on the association columns to the missing
/// court or check-in.
fn missing_association(err: &sqlx::Error, association: ImageQuery) -> Option<ImageError> {
    let db = err.as_database_error()?;
    if !db.is_foreign_key_violation() {
        return None;
    }
    match db.constraint() {
        Some("images_court_id_fkey") => association.court_id.map(ImageError::CourtNotFound),
        Some("images_checkin_id_fkey") => association.checkin_id.map(ImageError::CheckInNotFound),
        _ => None,
    }
}

/// Validate and store an uploaded image.
///
/// # Errors
///
/// Returns `Invalid` for an empty, oversized, mistyped or doubly-associated
/// upload, `CourtNotFound`/`CheckInNotFound` when the association does not
/// exist, and `Storage`/`Database` when persisting fails.
pub async fn upload_image(state: &AppState, user_id: &str, upload: ImageUpload) -> Result<UploadedImage, ImageError> {
    upload.association.validate_upload()?;
    let ext = validate_image(&upload.content_type, upload.bytes.len(), state.images.max_bytes)?;

    let association = upload.association;
    let image_id = Uuid::new_v4().simple().to_string();
    let key = storage_key(user_id, &image_id, ext);
    state.blobs.put(&key, upload.bytes, &upload.content_type).await?;

    let inserted = sqlx::query(
        "INSERT INTO images (id, image_id, storage_key, user_id, court_id, checkin_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::new_v4())
    .bind(&image_id)
    .bind(&key)
    .bind(user_id)
    .bind(association.court_id)
    .bind(association.checkin_id)
    .execute(&state.pool)
    .await;

    if let Err(e) = inserted {
        if let Err(cleanup) = state.blobs.delete(&key).await {
            tracing::warn!(%key, error = %cleanup, "orphaned blob after failed insert");
        }
        return Err(missing_association(&e, association).unwrap_or_else(|| e.into()));
    }

    tracing::info!(%image_id, %user_id, "image uploaded");
    Ok(UploadedImage { url: state.images.url_for(&key), id: image_id })
}

/// The caller's images attached to a court or a check-in.
///
/// # Errors
///
/// Returns `MissingAssociation` for an empty query.
pub async fn list_images(state: &AppState, user_id: &str, query: ImageQuery) -> Result<Vec<ImageWithUrl>, ImageError> {
    if query.is_empty() {
        return Err(ImageError::MissingAssociation);
    }
    let rows = sqlx::query_as::<_, ImageRow>(&format!(
        "SELECT {IMAGE_COLUMNS} FROM images
         WHERE user_id = $1
           AND ($2::uuid IS NULL OR court_id = $2)
           AND ($3::uuid IS NULL OR checkin_id = $3)
         ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .bind(query.court_id)
    .bind(query.checkin_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let url = state.images.url_for(&row.storage_key);
            ImageWithUrl { image: row.into(), url }
        })
        .collect())
}

/// Delete an image owned by the caller.
///
/// # Errors
///
/// Returns `NotFound` for an unknown image id and `Forbidden` when the
/// image belongs to another user; neither removes anything.
pub async fn delete_image(state: &AppState, user_id: &str, image_id: &str) -> Result<(), ImageError> {
    let row = sqlx::query_as::<_, ImageRow>(&format!("SELECT {IMAGE_COLUMNS} FROM images WHERE image_id = $1"))
        .bind(image_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ImageError::NotFound(image_id.to_owned()))?;
    ensure_image_owner(&row, user_id)?;

    sqlx::query("DELETE FROM images WHERE id = $1").bind(row.id).execute(&state.pool).await?;
    if let Err(e) = state.blobs.delete(&row.storage_key).await {
        tracing::warn!(key = %row.storage_key, error = %e, "blob removal failed after row delete");
    }

    tracing::info!(%image_id, %user_id, "image deleted");
    Ok(())
}
