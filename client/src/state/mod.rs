//! Client state: the map/selection reducer and the store that owns it.
//!
//! DESIGN
//! ======
//! `app` is pure data plus a reducer so each transition can be exercised
//! without a store. `store` adds subscriptions and persistence of the
//! whitelisted fields.

pub mod app;
pub mod store;

pub use app::{Action, AppState, Modal, ModalState, PersistedState, reduce};
pub use store::{Store, Subscription};
