//! Map viewport and selection state with named transitions.
//!
//! DESIGN
//! ======
//! Every mutation goes through [`reduce`]. Transitions that touch more than
//! one field (map click while picking a location, viewport settle, location
//! fix) do so in a single call so observers never see a half-applied state.
//!
//! The location latch (`has_initialized_location`) only ever goes from
//! `false` to `true`; once set, geolocation results no longer move the view.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::cmp::Ordering;
use std::collections::HashSet;

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_provider::DataLocale;

use model::{Bounds, Coordinates, Court, ViewState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dialogs whose open/closed flag lives in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modal {
    AddCourt,
    EditCourt,
}

/// Open/closed flags for dialogs. Not persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModalState {
    pub add_court: bool,
    pub edit_court: bool,
}

impl ModalState {
    #[must_use]
    pub fn is_open(&self, modal: Modal) -> bool {
        match modal {
            Modal::AddCourt => self.add_court,
            Modal::EditCourt => self.edit_court,
        }
    }

    fn set(&mut self, modal: Modal, open: bool) {
        match modal {
            Modal::AddCourt => self.add_court = open,
            Modal::EditCourt => self.edit_court = open,
        }
    }
}

/// Complete client state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub view_state: ViewState,
    pub selected_court: Option<Court>,
    /// Courts inside the viewport after the last settle, sorted by name.
    pub visible_courts: Vec<Court>,
    pub bounds: Option<Bounds>,
    pub is_selecting_location: bool,
    pub custom_coordinates: Option<Coordinates>,
    pub has_initialized_location: bool,
    pub modals: ModalState,
}

impl AppState {
    /// Court shown in the summary card: the explicit selection, or the only
    /// visible court when nothing is selected.
    #[must_use]
    pub fn card_court(&self) -> Option<&Court> {
        match (&self.selected_court, self.visible_courts.as_slice()) {
            (Some(selected), _) => Some(selected),
            (None, [only]) => Some(only),
            _ => None,
        }
    }

    /// Where a new court is placed: the picked location, else the device.
    #[must_use]
    pub fn placement_coordinates(&self, device: Option<Coordinates>) -> Option<Coordinates> {
        self.custom_coordinates.or(device)
    }
}

/// The subset of [`AppState`] written to durable storage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub view_state: ViewState,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub selected_court: Option<Court>,
    #[serde(default)]
    pub is_selecting_location: bool,
    #[serde(default)]
    pub custom_coordinates: Option<Coordinates>,
    #[serde(default)]
    pub has_initialized_location: bool,
}

impl From<&AppState> for PersistedState {
    fn from(state: &AppState) -> Self {
        Self {
            view_state: state.view_state,
            bounds: state.bounds,
            selected_court: state.selected_court.clone(),
            is_selecting_location: state.is_selecting_location,
            custom_coordinates: state.custom_coordinates,
            has_initialized_location: state.has_initialized_location,
        }
    }
}

/// Named state transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Map moved; replace the camera wholesale.
    SetViewState(ViewState),
    /// Viewport settled after a move: store camera and bounds, and replace
    /// the visible list with `visible_ids ∩ courts` sorted by name.
    SettleViewport {
        view_state: ViewState,
        bounds: Option<Bounds>,
        visible_ids: Vec<Uuid>,
        courts: Vec<Court>,
    },
    /// Marker or card selected.
    SelectCourt(Court),
    /// Court card closed.
    CloseCourt,
    /// Fresh copy of a court from the server; replaces the selection only
    /// when that court is the one selected.
    RefreshSelectedCourt(Court),
    /// Start picking a location on the map; defers the add-court dialog.
    BeginSelectingLocation,
    /// Stop picking without choosing; reopens the add-court dialog.
    CancelSelectingLocation,
    /// Map clicked. Consumed only while picking a location.
    MapClick(Coordinates),
    /// Drop the picked location and fall back to the device position.
    ClearCustomCoordinates,
    /// The add-court submission settled.
    CourtSubmitted,
    /// Geolocation produced a fix.
    LocationFix(Coordinates),
    /// Geolocation failed or is unavailable.
    LocationFailed,
    /// Persisted fields loaded from storage.
    Rehydrated(PersistedState),
    SetModal { modal: Modal, open: bool },
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetViewState(view_state) => {
            state.view_state = view_state;
        }
        Action::SettleViewport { view_state, bounds, visible_ids, courts } => {
            state.view_state = view_state;
            if bounds.is_some() {
                state.bounds = bounds;
            }
            state.visible_courts = visible_sorted(&visible_ids, courts);
        }
        Action::SelectCourt(court) => {
            state.selected_court = Some(court);
        }
        Action::CloseCourt => {
            state.selected_court = None;
        }
        Action::RefreshSelectedCourt(court) => {
            if state.selected_court.as_ref().is_some_and(|selected| selected.id == court.id) {
                state.selected_court = Some(court);
            }
        }
        Action::BeginSelectingLocation => {
            state.is_selecting_location = true;
            state.modals.add_court = false;
        }
        Action::CancelSelectingLocation => {
            state.is_selecting_location = false;
            state.custom_coordinates = None;
            state.modals.add_court = true;
        }
        Action::MapClick(coords) => {
            if state.is_selecting_location {
                state.custom_coordinates = Some(coords);
                state.is_selecting_location = false;
                state.modals.add_court = true;
            }
        }
        Action::ClearCustomCoordinates => {
            state.custom_coordinates = None;
            state.is_selecting_location = false;
        }
        Action::CourtSubmitted => {
            state.custom_coordinates = None;
            state.is_selecting_location = false;
            state.modals.add_court = false;
        }
        Action::LocationFix(coords) => {
            if !state.has_initialized_location {
                state.view_state = ViewState::centred_on(coords);
                state.has_initialized_location = true;
            }
        }
        Action::LocationFailed => {
            state.has_initialized_location = true;
        }
        Action::Rehydrated(persisted) => {
            let customized = !persisted.view_state.is_default();
            state.view_state = persisted.view_state;
            state.bounds = persisted.bounds;
            state.selected_court = persisted.selected_court;
            state.is_selecting_location = persisted.is_selecting_location;
            state.custom_coordinates = persisted.custom_coordinates;
            state.has_initialized_location =
                state.has_initialized_location || persisted.has_initialized_location || customized;
            state.visible_courts.clear();
        }
        Action::SetModal { modal, open } => {
            state.modals.set(modal, open);
        }
    }
}

thread_local! {
    /// Root-locale collator at secondary strength: accents count, case does not.
    static NAME_COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        Collator::try_new(&DataLocale::default(), options)
            .inspect_err(|e| tracing::warn!(error = %e, "collator unavailable, falling back to lowercase order"))
            .ok()
    };
}

/// Compare court names case-insensitively in collation order.
fn compare_names(a: &str, b: &str) -> Ordering {
    NAME_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    })
}

/// Keep courts whose id is in `visible_ids`, then stable-sort them by name
/// so names that collate equal keep their server order.
fn visible_sorted(visible_ids: &[Uuid], courts: Vec<Court>) -> Vec<Court> {
    let visible: HashSet<&Uuid> = visible_ids.iter().collect();
    let mut shown: Vec<Court> = courts.into_iter().filter(|court| visible.contains(&court.id)).collect();
    shown.sort_by(|a, b| compare_names(&a.name, &b.name));
    shown
}
