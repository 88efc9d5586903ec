//! Shared wire model for the court map API.
//!
//! This crate owns the JSON representation used by both `server` and
//! `client`: the entity records (courts, check-ins, images), the map viewport
//! types persisted by the client store, and the uniform response envelope
//! every API route returns.

pub mod check_in;
pub mod court;
pub mod image;
pub mod validate;
pub mod view;

pub use check_in::{CheckIn, CheckInPatch, NewCheckIn};
pub use court::{Court, CourtPatch, CourtWithCheckIns, NewCourt};
pub use image::{
    DeleteImage, Image, ImageQuery, ImageWithUrl, MAX_IMAGE_BYTES, UploadedImage, image_extension, validate_image,
};
pub use validate::ValidationError;
pub use view::{Bounds, Coordinates, ViewState};

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "lib_test.rs"]
mod lib_test;

/// Message used when a failed response carries no readable body.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Message used when the request never reached the server.
pub const CONNECT_FAILURE_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection and try again.";

/// Coarse classification of a failed request, derived from the HTTP status.
///
/// Never sent over the wire; the client attaches it so callers can decide
/// how to surface the failure (inline, toast, "not found" state).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// 400: payload rejected by validation.
    Validation,
    /// 401: missing or invalid session.
    Unauthorized,
    /// 403: authenticated but not the owner.
    Forbidden,
    /// 404: resource absent.
    NotFound,
    /// 5xx, network errors and unreadable bodies.
    Transient,
}

impl Failure {
    /// Classify an HTTP status code. Success codes return `None`.
    #[must_use]
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            400 | 422 => Some(Self::Validation),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            _ => Some(Self::Transient),
        }
    }
}

/// Uniform `{success, data, message}` response wrapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    /// Client-side classification of a failure; absent on success.
    #[serde(skip)]
    pub failure: Option<Failure>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data: Some(data), message: message.into(), failure: None }
    }

    /// Failed envelope with no data.
    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: message.into(), failure: None }
    }

    /// Attach a failure class.
    #[must_use]
    pub fn with_failure(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Convert the payload type, keeping success, message and failure class.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope { success: self.success, data: self.data.map(f), message: self.message, failure: self.failure }
    }

    /// `Ok(data)` when the envelope is a success carrying data, otherwise
    /// `Err(message)`.
    ///
    /// # Errors
    ///
    /// Returns the envelope message when `success` is false or `data` is null.
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            if let Some(data) = self.data {
                return Ok(data);
            }
        }
        if self.message.is_empty() { Err(GENERIC_FAILURE_MESSAGE.to_owned()) } else { Err(self.message) }
    }
}
