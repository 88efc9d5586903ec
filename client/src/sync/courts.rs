use model::{Court, CourtPatch, CourtWithCheckIns, Envelope, NewCourt};
use uuid::Uuid;

use super::{Hooks, MutationOutcome, QueryKey, error_toast};
use crate::net::Backend;
use crate::state::Action;

impl<B: Backend> Hooks<B> {
    /// The session user's courts.
    pub async fn courts(&self) -> Envelope<Vec<Court>> {
        self.read_through(QueryKey::courts(), || self.backend.get_courts()).await
    }

    /// One court with the user's check-ins at it.
    pub async fn court(&self, id: Uuid) -> Envelope<CourtWithCheckIns> {
        self.read_through(QueryKey::court(id), || self.backend.get_court(id)).await
    }

    /// Create a court. On success the add-court flow is closed out in the
    /// store (dialog closed, picked location cleared).
    pub async fn add_court(&self, court: NewCourt) -> MutationOutcome<Court> {
        if let Err(e) = court.validate() {
            return MutationOutcome::rejected(&e);
        }

        let envelope = self.backend.add_court(&court).await;
        let mut effects = Vec::new();
        if envelope.success {
            tracing::info!(name = %court.name, "court added");
            self.store.dispatch(Action::CourtSubmitted);
        } else {
            effects.push(error_toast(&envelope, "Failed to add court"));
        }

        self.cache.invalidate(&QueryKey::courts());
        MutationOutcome { envelope, effects }
    }

    /// Patch a court. The selection is refreshed only when the edited court
    /// is the one currently selected.
    pub async fn edit_court(&self, id: Uuid, patch: CourtPatch) -> MutationOutcome<Court> {
        if let Err(e) = patch.validate() {
            return MutationOutcome::rejected(&e);
        }

        let envelope = self.backend.edit_court(id, &patch).await;
        let mut effects = Vec::new();
        match (&envelope.data, envelope.success) {
            (Some(court), true) => {
                self.store.dispatch(Action::RefreshSelectedCourt(court.clone()));
            }
            _ => effects.push(error_toast(&envelope, "Failed to update court")),
        }

        self.cache.invalidate(&QueryKey::courts());
        self.cache.invalidate(&QueryKey::court(id));
        MutationOutcome { envelope, effects }
    }
}
