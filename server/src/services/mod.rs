//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and persistence so route handlers can stay
//! focused on request decoding, auth plumbing, and status mapping.

pub mod check_in;
pub mod court;
pub mod image;
pub mod session;
pub mod storage;

#[cfg(all(test, feature = "live-db-tests"))]
pub(crate) mod test_support;
