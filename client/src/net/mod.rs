//! HTTP access to the court map API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `config` holds the base URL and session cookie, `api` defines the
//! [`api::Backend`] trait and its reqwest implementation.

pub mod api;
pub mod config;

pub use api::{ApiClient, ApiError, Backend, ImageUpload};
pub use config::ClientConfig;
