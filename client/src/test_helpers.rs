//! Fixtures shared by unit tests.

use model::{CheckIn, Court};
use time::OffsetDateTime;
use uuid::Uuid;

/// A court owned by `user-1` at the given position.
#[must_use]
pub fn court_at(name: &str, latitude: f64, longitude: f64) -> Court {
    Court {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        latitude,
        longitude,
        play_count: 0,
        image: None,
        user_id: "user-1".to_owned(),
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

#[must_use]
pub fn court(name: &str) -> Court {
    court_at(name, 45.0, -122.0)
}

#[must_use]
pub fn check_in(court_id: Uuid) -> CheckIn {
    CheckIn {
        id: Uuid::new_v4(),
        court_id,
        user_id: "user-1".to_owned(),
        title: None,
        notes: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}
