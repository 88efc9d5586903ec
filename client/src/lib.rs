//! Client core for the court map.
//!
//! ARCHITECTURE
//! ============
//! Leaves first: `util::geometry` (rectangle overlap, geographic bounds),
//! `util::visibility` (which markers sit inside the map container),
//! `state` (the reducer-driven client store and its persistence), `net`
//! (typed API calls returning envelopes) and `sync` (request cache plus the
//! hooks that bind API calls to the store and invalidate after mutations).
//!
//! The UI layer owns rendering, toasts and navigation; this crate hands it
//! [`sync::Effect`] values instead of performing those side effects itself.

pub mod net;
pub mod state;
pub mod sync;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;
