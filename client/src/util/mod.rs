//! Pure helpers: viewport geometry, marker visibility, and durable storage
//! for the persisted slice of the client store.

pub mod geometry;
pub mod persistence;
pub mod visibility;
