//! Map viewport settling and geolocation results.

use model::{Bounds, Coordinates, Court, ViewState};

use super::{Hooks, QueryKey};
use crate::net::Backend;
use crate::state::Action;
use crate::util::geometry::bounds_from_view;
use crate::util::visibility::{MapSurface, visible_by_bounds, visible_entity_ids};

/// Why a device position could not be obtained.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Geolocation is not supported by this device.")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl<B: Backend> Hooks<B> {
    fn cached_courts(&self) -> Vec<Court> {
        self.cache.get::<Vec<Court>>(&QueryKey::courts()).map(|courts| (*courts).clone()).unwrap_or_default()
    }

    /// Move-end with a rendered map: visibility comes from marker geometry.
    pub fn settle_from_surface<M: MapSurface + ?Sized>(&self, view_state: ViewState, bounds: Option<Bounds>, map: Option<&M>) {
        let visible_ids = visible_entity_ids(map);
        let courts = self.cached_courts();
        tracing::debug!(visible = visible_ids.len(), courts = courts.len(), "viewport settled");
        self.store.dispatch(Action::SettleViewport { view_state, bounds, visible_ids, courts });
    }

    /// Move-end without a rendered map: bounds are projected from the camera
    /// and visibility is a coordinate containment test.
    pub fn settle_from_view(&self, view_state: ViewState, width: f64, height: f64) {
        let bounds = bounds_from_view(&view_state, width, height);
        let courts = self.cached_courts();
        let visible_ids = visible_by_bounds(&courts, &bounds);
        tracing::debug!(visible = visible_ids.len(), courts = courts.len(), "viewport settled");
        self.store.dispatch(Action::SettleViewport { view_state, bounds: Some(bounds), visible_ids, courts });
    }

    /// Feed a geolocation result into the one-shot location latch.
    pub fn apply_location(&self, result: Result<Coordinates, LocationError>) {
        match result {
            Ok(coords) => self.store.dispatch(Action::LocationFix(coords)),
            Err(e) => {
                tracing::info!(error = %e, "device location unavailable");
                self.store.dispatch(Action::LocationFailed);
            }
        }
    }
}
