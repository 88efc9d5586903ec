//! Server-state synchronization: cached queries and mutations.
//!
//! ARCHITECTURE
//! ============
//! [`Hooks`] ties a [`Backend`] to the [`QueryCache`] and the client
//! [`Store`]. Queries read through the cache; mutations call the backend,
//! invalidate affected keys when they settle, push follow-up transitions into
//! the store, and hand UI side effects (toasts, navigation, inline field
//! errors) back to the caller as [`Effect`] values.
//!
//! Submodules add the per-entity operations as further `impl Hooks` blocks.

pub mod cache;
mod check_ins;
mod courts;
mod images;
mod viewport;

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

use std::future::Future;

use model::{Envelope, Failure, ValidationError};

pub use cache::{FetchTicket, QueryCache, QueryKey, Segment};
pub use check_ins::CheckInOutcome;
pub use viewport::LocationError;

use crate::net::Backend;
use crate::state::Store;

/// A UI side effect requested by a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ToastSuccess(String),
    ToastError(String),
    /// Return to the previous screen.
    NavigateBack,
    /// Inline error next to a form field; no request was sent.
    FieldError { field: &'static str, message: String },
}

/// Result of a mutation plus the effects the UI should apply.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationOutcome<T> {
    pub envelope: Envelope<T>,
    pub effects: Vec<Effect>,
}

impl<T> MutationOutcome<T> {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.envelope.success
    }

    fn rejected(err: &ValidationError) -> Self {
        Self {
            envelope: Envelope::fail(err.to_string()).with_failure(Failure::Validation),
            effects: vec![Effect::FieldError { field: err.field(), message: err.to_string() }],
        }
    }
}

/// Toast text for a failed mutation: the server message, else `fallback`.
fn error_toast<T>(envelope: &Envelope<T>, fallback: &str) -> Effect {
    let message = if envelope.message.trim().is_empty() { fallback } else { envelope.message.as_str() };
    Effect::ToastError(message.to_owned())
}

pub struct Hooks<B> {
    backend: B,
    cache: QueryCache,
    store: Store,
}

impl<B: Backend> Hooks<B> {
    pub fn new(backend: B, store: Store) -> Self {
        Self { backend, cache: QueryCache::new(), store }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Serve `key` from the cache when fresh; otherwise run `fetch` and store
    /// a successful result unless the key was invalidated meanwhile.
    async fn read_through<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Envelope<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Envelope<T>>,
    {
        if let Some(hit) = self.cache.fresh::<T>(&key) {
            tracing::debug!(key = %key, "query cache hit");
            return Envelope::ok((*hit).clone(), "");
        }

        let ticket = self.cache.begin_fetch(&key);
        let envelope = fetch().await;
        if envelope.success {
            if let Some(data) = &envelope.data {
                if !self.cache.complete(ticket, data.clone()) {
                    tracing::debug!(key = %key, "discarding response for invalidated query");
                }
            }
        }
        envelope
    }
}
