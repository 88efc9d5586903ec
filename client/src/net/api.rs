//! REST data access layer for the court map API.
//!
//! Every operation issues exactly one HTTP request and resolves to an
//! [`Envelope`]. Transport problems never surface as `Err`: they are folded
//! into a failed envelope so callers handle one shape.
//!
//! ERROR HANDLING
//! ==============
//! - non-2xx status: the server's `message` if the body has one, otherwise
//!   [`GENERIC_FAILURE_MESSAGE`]; the status is kept as a [`Failure`] class.
//! - connection/timeout: [`CONNECT_FAILURE_MESSAGE`], class `Transient`.
//! - 2xx with an unreadable body: generic message, class `Transient`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use model::{
    CONNECT_FAILURE_MESSAGE, CheckIn, CheckInPatch, Court, CourtPatch, CourtWithCheckIns, DeleteImage, Envelope,
    Failure, GENERIC_FAILURE_MESSAGE, ImageQuery, ImageWithUrl, NewCheckIn, NewCourt, UploadedImage,
};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::config::ClientConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Internal transport failures, converted to envelopes at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be assembled (bad multipart content type).
    #[error("request build failed: {0}")]
    Build(String),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("response status {status}")]
    Status { status: u16, message: Option<String> },

    /// A success response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl ApiError {
    #[must_use]
    pub fn failure(&self) -> Failure {
        match self {
            Self::Build(_) => Failure::Validation,
            Self::Status { status, .. } => Failure::from_status(*status).unwrap_or(Failure::Transient),
            Self::HttpClientBuild(_) | Self::Request(_) | Self::Parse(_) => Failure::Transient,
        }
    }

    /// User-facing message for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(_) => CONNECT_FAILURE_MESSAGE.to_owned(),
            Self::Status { message: Some(message), .. } => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_owned(),
        }
    }

    #[must_use]
    pub fn into_envelope<T>(self) -> Envelope<T> {
        let failure = self.failure();
        Envelope::fail(self.user_message()).with_failure(failure)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

// =============================================================================
// BACKEND
// =============================================================================

/// An image upload: the file plus at most one association.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub association: ImageQuery,
}

/// The API surface consumed by the sync hooks.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_courts(&self) -> Envelope<Vec<Court>>;
    async fn get_court(&self, id: Uuid) -> Envelope<CourtWithCheckIns>;
    async fn add_court(&self, court: &NewCourt) -> Envelope<Court>;
    async fn edit_court(&self, id: Uuid, patch: &CourtPatch) -> Envelope<Court>;

    async fn get_check_ins(&self, court_id: Uuid) -> Envelope<Vec<CheckIn>>;
    async fn get_check_in(&self, id: Uuid) -> Envelope<CheckIn>;
    async fn add_check_in(&self, court_id: Uuid) -> Envelope<CheckIn>;
    async fn edit_check_in(&self, id: Uuid, patch: &CheckInPatch) -> Envelope<CheckIn>;

    async fn upload_image(&self, upload: ImageUpload) -> Envelope<UploadedImage>;
    async fn get_images(&self, query: ImageQuery) -> Envelope<Vec<ImageWithUrl>>;
    async fn delete_image(&self, image_id: &str) -> Envelope<()>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to
    /// initialise.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.url(path));
        match &self.config.session_token {
            Some(token) => builder.header(reqwest::header::COOKIE, format!("session_token={token}")),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, route: &'static str, builder: RequestBuilder) -> Envelope<T> {
        match execute(builder).await {
            Ok(envelope) => {
                tracing::debug!(route, success = envelope.success, "api response");
                envelope
            }
            Err(e) => {
                tracing::warn!(route, error = %e, "api request failed");
                e.into_envelope()
            }
        }
    }
}

async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Envelope<T>, ApiError> {
    let response = builder.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;

    if Failure::from_status(status).is_some() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .map(|body| body.message)
            .filter(|m| !m.trim().is_empty());
        return Err(ApiError::Status { status, message });
    }

    serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
}

fn image_form(upload: ImageUpload) -> Result<reqwest::multipart::Form, ApiError> {
    let part = reqwest::multipart::Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .map_err(|e| ApiError::Build(e.to_string()))?;
    let mut form = reqwest::multipart::Form::new().part("image", part);
    if let Some(court_id) = upload.association.court_id {
        form = form.text("courtId", court_id.to_string());
    }
    if let Some(checkin_id) = upload.association.checkin_id {
        form = form.text("checkinId", checkin_id.to_string());
    }
    Ok(form)
}

#[async_trait]
impl Backend for ApiClient {
    async fn get_courts(&self) -> Envelope<Vec<Court>> {
        self.send("GET /api/court", self.request(Method::GET, "/api/court")).await
    }

    async fn get_court(&self, id: Uuid) -> Envelope<CourtWithCheckIns> {
        self.send("GET /api/court/{id}", self.request(Method::GET, &format!("/api/court/{id}"))).await
    }

    async fn add_court(&self, court: &NewCourt) -> Envelope<Court> {
        self.send("POST /api/court", self.request(Method::POST, "/api/court").json(court)).await
    }

    async fn edit_court(&self, id: Uuid, patch: &CourtPatch) -> Envelope<Court> {
        self.send("PUT /api/court/{id}", self.request(Method::PUT, &format!("/api/court/{id}")).json(patch)).await
    }

    async fn get_check_ins(&self, court_id: Uuid) -> Envelope<Vec<CheckIn>> {
        let builder = self.request(Method::GET, "/api/checkin").query(&[("courtId", court_id)]);
        self.send("GET /api/checkin", builder).await
    }

    async fn get_check_in(&self, id: Uuid) -> Envelope<CheckIn> {
        self.send("GET /api/checkin/{id}", self.request(Method::GET, &format!("/api/checkin/{id}"))).await
    }

    async fn add_check_in(&self, court_id: Uuid) -> Envelope<CheckIn> {
        let builder = self.request(Method::POST, "/api/checkin").json(&NewCheckIn { court_id });
        self.send("POST /api/checkin", builder).await
    }

    async fn edit_check_in(&self, id: Uuid, patch: &CheckInPatch) -> Envelope<CheckIn> {
        let builder = self.request(Method::PUT, &format!("/api/checkin/{id}")).json(patch);
        self.send("PUT /api/checkin/{id}", builder).await
    }

    async fn upload_image(&self, upload: ImageUpload) -> Envelope<UploadedImage> {
        match image_form(upload) {
            Ok(form) => self.send("POST /api/image", self.request(Method::POST, "/api/image").multipart(form)).await,
            Err(e) => {
                tracing::warn!(error = %e, "image upload rejected before sending");
                e.into_envelope()
            }
        }
    }

    async fn get_images(&self, query: ImageQuery) -> Envelope<Vec<ImageWithUrl>> {
        self.send("GET /api/image", self.request(Method::GET, "/api/image").query(&query)).await
    }

    async fn delete_image(&self, image_id: &str) -> Envelope<()> {
        let body = DeleteImage { id: image_id.to_owned() };
        self.send("DELETE /api/image", self.request(Method::DELETE, "/api/image").json(&body)).await
    }
}
