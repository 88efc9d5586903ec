//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool, the blob store for image bytes, and the image
//! settings used to build keys and public URLs. Nothing else is kept in
//! process memory; every request reads through to Postgres.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ImageConfig;
use crate::services::storage::BlobStore;

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub blobs: Arc<dyn BlobStore>,
    pub images: Arc<ImageConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, blobs: Arc<dyn BlobStore>, images: ImageConfig) -> Self {
        Self { pool, blobs, images: Arc::new(images) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
