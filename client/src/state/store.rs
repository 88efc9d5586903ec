//! Observable container around [`AppState`].
//!
//! DESIGN
//! ======
//! `Store` is a cheap `Rc` handle. `dispatch` runs the reducer to completion
//! and releases the state borrow before subscribers run, so a subscriber may
//! read the store (or dispatch again) from inside its callback.
//!
//! When a storage backend is attached, the persisted slice is written after
//! any transition that changed it. Write failures are logged and otherwise
//! ignored; the in-memory state stays authoritative.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::app::{Action, AppState, PersistedState, reduce};
use crate::util::persistence::{StateStorage, load_json, save_json};

/// Storage key for the persisted slice.
pub const PERSIST_KEY: &str = "persist:root";

type Listener = Rc<dyn Fn(&AppState)>;

struct Inner {
    state: RefCell<AppState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
    storage: Option<Box<dyn StateStorage>>,
}

#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

/// Keeps a listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// In-memory store starting from the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::build(AppState::default(), None)
    }

    /// Store backed by `storage`. Any previously persisted slice is loaded
    /// and applied through [`Action::Rehydrated`]; unreadable data is logged
    /// and the store starts from defaults.
    #[must_use]
    pub fn with_storage(storage: Box<dyn StateStorage>) -> Self {
        let persisted = match load_json::<PersistedState>(storage.as_ref(), PERSIST_KEY) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable persisted state");
                None
            }
        };
        let mut state = AppState::default();
        if let Some(persisted) = persisted {
            reduce(&mut state, Action::Rehydrated(persisted));
            tracing::debug!(latch = state.has_initialized_location, "store rehydrated");
        }
        Self::build(state, Some(storage))
    }

    fn build(state: AppState, storage: Option<Box<dyn StateStorage>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                storage,
            }),
        }
    }

    /// Apply `action`, persist if needed, then notify subscribers.
    pub fn dispatch(&self, action: Action) {
        let (changed, persist) = {
            let mut state = self.inner.state.borrow_mut();
            let before_persisted = PersistedState::from(&*state);
            let before = state.clone();
            reduce(&mut state, action);
            let after_persisted = PersistedState::from(&*state);
            let persist = (after_persisted != before_persisted).then_some(after_persisted);
            (*state != before, persist)
        };

        if let (Some(persisted), Some(storage)) = (persist, self.inner.storage.as_deref()) {
            if let Err(e) = save_json(storage, PERSIST_KEY, &persisted) {
                tracing::warn!(error = %e, "failed to persist store state");
            }
        }

        if changed {
            self.notify();
        }
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        let snapshot = self.state();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Project the current state without cloning all of it.
    pub fn select<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Call `listener` after every transition that changes state.
    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription { id, store: Rc::downgrade(&self.inner) }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}
