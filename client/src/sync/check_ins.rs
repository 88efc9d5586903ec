//! Check-in queries and mutations.
//!
//! Checking in at a court is two independent requests: the check-in itself
//! and a play-count bump on the court. Neither waits on the other's outcome
//! and nothing reconciles them, so both outcomes are reported.

use model::{CheckIn, CheckInPatch, Court, CourtPatch, CourtWithCheckIns, Envelope};
use uuid::Uuid;

use super::cache::{CHECKIN_KEY, CHECKINS_KEY};
use super::{Effect, Hooks, MutationOutcome, QueryKey, error_toast};
use crate::net::Backend;

/// Both halves of a check-in.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckInOutcome {
    pub check_in: MutationOutcome<CheckIn>,
    pub play_count: MutationOutcome<Court>,
}

impl CheckInOutcome {
    /// Exactly one of the two requests failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.check_in.succeeded() != self.play_count.succeeded()
    }
}

impl<B: Backend> Hooks<B> {
    /// The user's check-ins at `court_id`.
    pub async fn check_ins(&self, court_id: Uuid) -> Envelope<Vec<CheckIn>> {
        self.read_through(QueryKey::check_ins(court_id), || self.backend.get_check_ins(court_id)).await
    }

    /// One check-in. A copy found in any cached court is seeded first so it
    /// can be shown while the request is in flight.
    pub async fn check_in(&self, id: Uuid) -> Envelope<CheckIn> {
        let key = QueryKey::check_in(id);
        if let Some(seed) = self.check_in_from_cache(id) {
            self.cache.seed(&key, seed);
        }
        self.read_through(key, || self.backend.get_check_in(id)).await
    }

    /// Find check-in `id` inside any cached court-with-check-ins entry.
    #[must_use]
    pub fn check_in_from_cache(&self, id: Uuid) -> Option<CheckIn> {
        self.cache
            .values_with_prefix::<CourtWithCheckIns>(&QueryKey::courts())
            .iter()
            .find_map(|court| court.check_ins.iter().find(|c| c.id == id).cloned())
    }

    pub async fn add_check_in(&self, court_id: Uuid) -> MutationOutcome<CheckIn> {
        let envelope = self.backend.add_check_in(court_id).await;
        let effects = if envelope.success {
            tracing::info!(court_id = %court_id, "checked in");
            vec![Effect::ToastSuccess("Check-in added successfully!".to_owned())]
        } else {
            vec![error_toast(&envelope, "Failed to add check-in")]
        };

        self.cache.invalidate(&QueryKey::courts());
        self.cache.invalidate(&QueryKey::kind(CHECKIN_KEY));
        self.cache.invalidate(&QueryKey::kind(CHECKINS_KEY));
        MutationOutcome { envelope, effects }
    }

    /// Update title/notes. Success navigates back.
    pub async fn edit_check_in(&self, id: Uuid, patch: CheckInPatch) -> MutationOutcome<CheckIn> {
        let envelope = self.backend.edit_check_in(id, &patch).await;
        let effects =
            if envelope.success { vec![Effect::NavigateBack] } else { vec![error_toast(&envelope, "Failed to update check-in")] };

        self.cache.invalidate(&QueryKey::check_in(id));
        self.cache.invalidate(&QueryKey::kind(CHECKINS_KEY));
        self.cache.invalidate(&QueryKey::courts());
        MutationOutcome { envelope, effects }
    }

    /// Check in at `court`: create the check-in, then bump the court's play
    /// count from the value the caller holds.
    pub async fn check_in_at(&self, court: &Court) -> CheckInOutcome {
        let check_in = self.add_check_in(court.id).await;
        let play_count = self.edit_court(court.id, CourtPatch::play_count(court.play_count + 1)).await;
        if check_in.succeeded() != play_count.succeeded() {
            tracing::warn!(
                court_id = %court.id,
                check_in = check_in.succeeded(),
                play_count = play_count.succeeded(),
                "check-in partially applied"
            );
        }
        CheckInOutcome { check_in, play_count }
    }
}
