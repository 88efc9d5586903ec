//! Keyed query cache with prefix invalidation.
//!
//! DESIGN
//! ======
//! Each key owns a slot holding the last successful value and a generation
//! counter. A fetch takes a [`FetchTicket`] carrying the generation it
//! started at. Both invalidation and starting another fetch bump the
//! generation, so only the newest ticket for a key can write. A response
//! that was overtaken by an invalidation or a later fetch is discarded.
//!
//! Invalidated values stay readable (marked stale) until the next fetch
//! replaces them.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use model::ImageQuery;
use uuid::Uuid;

pub const COURTS_KEY: &str = "courts";
pub const CHECKIN_KEY: &str = "checkin";
pub const CHECKINS_KEY: &str = "checkins";
pub const IMAGES_KEY: &str = "images";

/// One component of a [`QueryKey`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Kind(&'static str),
    Id(Uuid),
    Images(ImageQuery),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => f.write_str(kind),
            Self::Id(id) => write!(f, "{id}"),
            Self::Images(query) => match (query.court_id, query.checkin_id) {
                (Some(court), None) => write!(f, "courtId={court}"),
                (None, Some(checkin)) => write!(f, "checkinId={checkin}"),
                (Some(court), Some(checkin)) => write!(f, "courtId={court}&checkinId={checkin}"),
                (None, None) => f.write_str("{}"),
            },
        }
    }
}

/// Ordered key segments; a key matches every key it is a prefix of.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<Segment>);

impl QueryKey {
    #[must_use]
    pub fn kind(kind: &'static str) -> Self {
        Self(vec![Segment::Kind(kind)])
    }

    #[must_use]
    pub fn courts() -> Self {
        Self::kind(COURTS_KEY)
    }

    #[must_use]
    pub fn court(id: Uuid) -> Self {
        Self(vec![Segment::Kind(COURTS_KEY), Segment::Id(id)])
    }

    #[must_use]
    pub fn check_in(id: Uuid) -> Self {
        Self(vec![Segment::Kind(CHECKIN_KEY), Segment::Id(id)])
    }

    #[must_use]
    pub fn check_ins(court_id: Uuid) -> Self {
        Self(vec![Segment::Kind(CHECKINS_KEY), Segment::Id(court_id)])
    }

    #[must_use]
    pub fn images(query: ImageQuery) -> Self {
        Self(vec![Segment::Kind(IMAGES_KEY), Segment::Images(query)])
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Proof of which generation a fetch started at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    stale: bool,
    value: Option<Rc<dyn Any>>,
}

#[derive(Default)]
pub struct QueryCache {
    slots: RefCell<HashMap<QueryKey, Slot>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value regardless of staleness.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &QueryKey) -> Option<Rc<T>> {
        let slots = self.slots.borrow();
        let value = slots.get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    /// Cached value only if it has not been invalidated since it was written.
    #[must_use]
    pub fn fresh<T: 'static>(&self, key: &QueryKey) -> Option<Rc<T>> {
        if self.is_stale(key) { None } else { self.get(key) }
    }

    /// `true` when the key has no value or was invalidated.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.slots.borrow().get(key).is_none_or(|slot| slot.stale || slot.value.is_none())
    }

    /// Every cached value of type `T` whose key starts with `prefix`.
    #[must_use]
    pub fn values_with_prefix<T: 'static>(&self, prefix: &QueryKey) -> Vec<Rc<T>> {
        self.slots
            .borrow()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter_map(|(_, slot)| slot.value.clone()?.downcast::<T>().ok())
            .collect()
    }

    /// Start a fetch for `key`. Tickets issued earlier for the same key can
    /// no longer complete.
    pub fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let mut slots = self.slots.borrow_mut();
        let slot = slots.entry(key.clone()).or_default();
        slot.generation += 1;
        FetchTicket { key: key.clone(), generation: slot.generation }
    }

    /// Store a fetch result. Returns `false` (and stores nothing) when the
    /// key was invalidated or fetched again after `ticket` was issued.
    pub fn complete<T: 'static>(&self, ticket: FetchTicket, value: T) -> bool {
        let mut slots = self.slots.borrow_mut();
        let slot = slots.entry(ticket.key).or_default();
        if slot.generation != ticket.generation {
            return false;
        }
        slot.value = Some(Rc::new(value));
        slot.stale = false;
        true
    }

    /// Provide a placeholder value that a fetch is still expected to replace.
    pub fn seed<T: 'static>(&self, key: &QueryKey, value: T) {
        let mut slots = self.slots.borrow_mut();
        let slot = slots.entry(key.clone()).or_default();
        if slot.value.is_none() {
            slot.value = Some(Rc::new(value));
            slot.stale = true;
        }
    }

    /// Mark every key starting with `prefix` stale and bump its generation.
    /// Returns the number of keys affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for (key, slot) in self.slots.borrow_mut().iter_mut() {
            if key.starts_with(prefix) {
                slot.generation += 1;
                slot.stale = true;
                count += 1;
            }
        }
        if count > 0 {
            tracing::debug!(prefix = %prefix, count, "queries invalidated");
        }
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}
