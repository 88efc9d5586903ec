//! Image metadata records. The bytes live in external blob storage under
//! `{user_id}/{image_id}.{ext}`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::validate::ValidationError;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Storage extension for an accepted upload content type.
#[must_use]
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Check an upload's content type and size, returning its storage extension.
///
/// # Errors
///
/// [`ValidationError::MissingImage`] for an empty body,
/// [`ValidationError::InvalidImage`] for an unsupported type or a body over
/// `max_bytes`.
pub fn validate_image(content_type: &str, len: usize, max_bytes: usize) -> Result<&'static str, ValidationError> {
    if len == 0 {
        return Err(ValidationError::MissingImage);
    }
    match image_extension(content_type) {
        Some(ext) if len <= max_bytes => Ok(ext),
        _ => Err(ValidationError::InvalidImage),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    /// Stable storage key shared with the blob store.
    pub image_id: String,
    pub user_id: String,
    pub court_id: Option<Uuid>,
    pub checkin_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Image row plus its public URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageWithUrl {
    #[serde(flatten)]
    pub image: Image,
    pub url: String,
}

/// Data returned by a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: String,
    pub url: String,
}

/// Query of `GET /api/image`, also the association of an upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin_id: Option<Uuid>,
}

impl ImageQuery {
    #[must_use]
    pub fn court(court_id: Uuid) -> Self {
        Self { court_id: Some(court_id), checkin_id: None }
    }

    #[must_use]
    pub fn check_in(checkin_id: Uuid) -> Self {
        Self { court_id: None, checkin_id: Some(checkin_id) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.court_id.is_none() && self.checkin_id.is_none()
    }

    /// Uploads attach to at most one of court / check-in.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmbiguousAssociation`] when both are set.
    pub fn validate_upload(&self) -> Result<(), ValidationError> {
        if self.court_id.is_some() && self.checkin_id.is_some() {
            return Err(ValidationError::AmbiguousAssociation);
        }
        Ok(())
    }
}

/// Body of `DELETE /api/image`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImage {
    pub id: String,
}
