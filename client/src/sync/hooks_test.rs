use std::sync::Mutex;

use async_trait::async_trait;
use model::{
    CheckIn, CheckInPatch, Coordinates, Court, CourtPatch, CourtWithCheckIns, ImageQuery, ImageWithUrl, NewCourt,
    UploadedImage, ViewState,
};
use tokio::sync::Notify;
use uuid::Uuid;

use super::*;
use crate::net::ImageUpload;
use crate::state::{Action, Modal};
use crate::test_helpers::{check_in, court, court_at};
use crate::util::geometry::Rect;
use crate::util::visibility::{MapSnapshot, Marker};

// =============================================================================
// Fake backend
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Call {
    GetCourts,
    GetCourt(Uuid),
    AddCourt(String),
    EditCourt(Uuid, CourtPatch),
    GetCheckIns(Uuid),
    GetCheckIn(Uuid),
    AddCheckIn(Uuid),
    EditCheckIn(Uuid),
    UploadImage(ImageQuery),
    GetImages(ImageQuery),
    DeleteImage(String),
}

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    courts: Mutex<Vec<Court>>,
    court_detail: Mutex<Option<CourtWithCheckIns>>,
    check_in_detail: Mutex<Option<CheckIn>>,
    fail_add_court: bool,
    fail_check_in: bool,
    fail_edit_court: bool,
    delete_forbidden: bool,
    courts_gate: Option<Notify>,
}

impl FakeBackend {
    fn with_courts(courts: Vec<Court>) -> Self {
        Self { courts: Mutex::new(courts), ..Self::default() }
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get_courts(&self) -> Envelope<Vec<Court>> {
        self.record(Call::GetCourts);
        if let Some(gate) = &self.courts_gate {
            gate.notified().await;
        }
        Envelope::ok(self.courts.lock().expect("courts lock").clone(), "")
    }

    async fn get_court(&self, id: Uuid) -> Envelope<CourtWithCheckIns> {
        self.record(Call::GetCourt(id));
        match self.court_detail.lock().expect("detail lock").clone() {
            Some(detail) if detail.court.id == id => Envelope::ok(detail, ""),
            _ => Envelope::fail("Court not found").with_failure(Failure::NotFound),
        }
    }

    async fn add_court(&self, new: &NewCourt) -> Envelope<Court> {
        self.record(Call::AddCourt(new.name.clone()));
        if self.fail_add_court {
            return Envelope::fail("Database unavailable").with_failure(Failure::Transient);
        }
        Envelope::ok(court_at(&new.name, new.latitude, new.longitude), "Court added")
    }

    async fn edit_court(&self, id: Uuid, patch: &CourtPatch) -> Envelope<Court> {
        self.record(Call::EditCourt(id, patch.clone()));
        if self.fail_edit_court {
            return Envelope::fail("").with_failure(Failure::Transient);
        }
        let mut courts = self.courts.lock().expect("courts lock");
        let Some(existing) = courts.iter_mut().find(|c| c.id == id) else {
            return Envelope::fail("Court not found").with_failure(Failure::NotFound);
        };
        if let Some(play_count) = patch.play_count {
            existing.play_count = play_count;
        }
        if let Some(name) = &patch.name {
            existing.name.clone_from(name);
        }
        Envelope::ok(existing.clone(), "Court updated")
    }

    async fn get_check_ins(&self, court_id: Uuid) -> Envelope<Vec<CheckIn>> {
        self.record(Call::GetCheckIns(court_id));
        Envelope::ok(vec![check_in(court_id)], "")
    }

    async fn get_check_in(&self, id: Uuid) -> Envelope<CheckIn> {
        self.record(Call::GetCheckIn(id));
        match self.check_in_detail.lock().expect("detail lock").clone() {
            Some(found) if found.id == id => Envelope::ok(found, ""),
            _ => Envelope::fail("Check-in not found").with_failure(Failure::NotFound),
        }
    }

    async fn add_check_in(&self, court_id: Uuid) -> Envelope<CheckIn> {
        self.record(Call::AddCheckIn(court_id));
        if self.fail_check_in {
            return Envelope::fail("Failed to create check-in").with_failure(Failure::Transient);
        }
        Envelope::ok(check_in(court_id), "Checked in")
    }

    async fn edit_check_in(&self, id: Uuid, patch: &CheckInPatch) -> Envelope<CheckIn> {
        self.record(Call::EditCheckIn(id));
        let mut updated = check_in(Uuid::new_v4());
        updated.id = id;
        updated.title.clone_from(&patch.title);
        Envelope::ok(updated, "Check-in updated")
    }

    async fn upload_image(&self, upload: ImageUpload) -> Envelope<UploadedImage> {
        self.record(Call::UploadImage(upload.association));
        Envelope::ok(UploadedImage { id: "img-1".into(), url: "http://cdn/user-1/img-1.png".into() }, "")
    }

    async fn get_images(&self, query: ImageQuery) -> Envelope<Vec<ImageWithUrl>> {
        self.record(Call::GetImages(query));
        Envelope::ok(Vec::new(), "")
    }

    async fn delete_image(&self, image_id: &str) -> Envelope<()> {
        self.record(Call::DeleteImage(image_id.to_owned()));
        if self.delete_forbidden {
            return Envelope::fail("You can only delete your own images.").with_failure(Failure::Forbidden);
        }
        Envelope { success: true, data: None, message: "Image deleted successfully!".into(), failure: None }
    }
}

fn hooks(backend: FakeBackend) -> Hooks<FakeBackend> {
    Hooks::new(backend, Store::new())
}

fn png(association: ImageQuery) -> ImageUpload {
    ImageUpload {
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
        file_name: "court.png".into(),
        content_type: "image/png".into(),
        association,
    }
}

// =============================================================================
// Courts
// =============================================================================

#[tokio::test]
async fn courts_query_is_served_from_cache_until_invalidated() {
    let hooks = hooks(FakeBackend::with_courts(vec![court("Riverside")]));

    assert!(hooks.courts().await.success);
    assert!(hooks.courts().await.success);
    assert_eq!(hooks.backend().count(|c| *c == Call::GetCourts), 1);

    hooks.cache().invalidate(&QueryKey::courts());
    hooks.courts().await;
    assert_eq!(hooks.backend().count(|c| *c == Call::GetCourts), 2);
}

#[tokio::test]
async fn failed_query_is_not_cached() {
    let hooks = hooks(FakeBackend::default());
    let id = Uuid::new_v4();

    let envelope = hooks.court(id).await;

    assert_eq!(envelope.failure, Some(Failure::NotFound));
    assert!(hooks.cache().get::<CourtWithCheckIns>(&QueryKey::court(id)).is_none());
}

#[tokio::test]
async fn invalid_new_court_is_rejected_without_request() {
    let hooks = hooks(FakeBackend::default());

    let outcome = hooks.add_court(NewCourt { name: "A".into(), latitude: 45.0, longitude: -122.0, description: None }).await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.envelope.failure, Some(Failure::Validation));
    assert!(matches!(outcome.effects.as_slice(), [Effect::FieldError { field: "name", .. }]));
    assert!(hooks.backend().calls().is_empty());
}

#[tokio::test]
async fn add_court_success_closes_out_the_add_flow() {
    let hooks = hooks(FakeBackend::default());
    hooks.store().dispatch(Action::BeginSelectingLocation);
    hooks.store().dispatch(Action::MapClick(Coordinates { latitude: 45.0, longitude: -122.0 }));
    assert!(hooks.store().state().modals.is_open(Modal::AddCourt));
    hooks.courts().await;

    let outcome = hooks
        .add_court(NewCourt { name: "Laurelhurst".into(), latitude: 45.0, longitude: -122.0, description: None })
        .await;

    assert!(outcome.succeeded());
    assert!(outcome.effects.is_empty());
    let state = hooks.store().state();
    assert!(!state.modals.add_court);
    assert!(state.custom_coordinates.is_none());
    assert!(hooks.cache().is_stale(&QueryKey::courts()));
}

#[tokio::test]
async fn add_court_failure_toasts_and_still_invalidates() {
    let hooks = hooks(FakeBackend { fail_add_court: true, ..FakeBackend::default() });
    hooks.courts().await;
    hooks.store().dispatch(Action::SetModal { modal: Modal::AddCourt, open: true });

    let outcome =
        hooks.add_court(NewCourt { name: "Irving".into(), latitude: 45.0, longitude: -122.0, description: None }).await;

    assert_eq!(outcome.effects, vec![Effect::ToastError("Database unavailable".into())]);
    assert!(hooks.store().state().modals.add_court);
    assert!(hooks.cache().is_stale(&QueryKey::courts()));
}

#[tokio::test]
async fn edit_court_refreshes_selection_only_when_selected() {
    let selected = court("Selected");
    let other = court("Other");
    let hooks = hooks(FakeBackend::with_courts(vec![selected.clone(), other.clone()]));
    hooks.store().dispatch(Action::SelectCourt(selected.clone()));

    hooks.edit_court(other.id, CourtPatch { name: Some("Renamed".into()), ..CourtPatch::default() }).await;
    assert_eq!(hooks.store().state().selected_court.map(|c| c.name), Some("Selected".to_owned()));

    hooks.edit_court(selected.id, CourtPatch::play_count(4)).await;
    assert_eq!(hooks.store().state().selected_court.map(|c| c.play_count), Some(4));
}

#[tokio::test]
async fn edit_court_failure_uses_fallback_toast() {
    let c = court("Any");
    let hooks = hooks(FakeBackend { fail_edit_court: true, ..FakeBackend::with_courts(vec![c.clone()]) });

    let outcome = hooks.edit_court(c.id, CourtPatch::play_count(1)).await;

    assert_eq!(outcome.effects, vec![Effect::ToastError("Failed to update court".into())]);
}

#[tokio::test]
async fn negative_play_count_never_reaches_backend() {
    let c = court("Any");
    let hooks = hooks(FakeBackend::with_courts(vec![c.clone()]));

    let outcome = hooks.edit_court(c.id, CourtPatch::play_count(-1)).await;

    assert!(matches!(outcome.effects.as_slice(), [Effect::FieldError { field: "playCount", .. }]));
    assert!(hooks.backend().calls().is_empty());
}

// =============================================================================
// Check-ins
// =============================================================================

#[tokio::test]
async fn check_in_posts_then_bumps_play_count_independently() {
    let mut c1 = court("Wilshire");
    c1.play_count = 6;
    let hooks = hooks(FakeBackend::with_courts(vec![c1.clone()]));

    let outcome = hooks.check_in_at(&c1).await;

    assert_eq!(hooks.backend().calls(), vec![Call::AddCheckIn(c1.id), Call::EditCourt(c1.id, CourtPatch::play_count(7))]);
    assert!(outcome.check_in.succeeded());
    assert_eq!(outcome.check_in.envelope.data.as_ref().map(|c| c.court_id), Some(c1.id));
    assert_eq!(outcome.play_count.envelope.data.as_ref().map(|c| c.play_count), Some(7));
    assert!(!outcome.is_partial());
    assert_eq!(outcome.check_in.effects, vec![Effect::ToastSuccess("Check-in added successfully!".into())]);
}

#[tokio::test]
async fn failed_check_in_still_bumps_play_count() {
    let c1 = court("Wilshire");
    let hooks = hooks(FakeBackend { fail_check_in: true, ..FakeBackend::with_courts(vec![c1.clone()]) });

    let outcome = hooks.check_in_at(&c1).await;

    assert_eq!(hooks.backend().count(|c| matches!(c, Call::EditCourt(..))), 1);
    assert!(!outcome.check_in.succeeded());
    assert!(outcome.play_count.succeeded());
    assert!(outcome.is_partial());
    assert_eq!(outcome.check_in.effects, vec![Effect::ToastError("Failed to create check-in".into())]);
}

#[tokio::test]
async fn add_check_in_invalidates_check_in_lists() {
    let c1 = court("Wilshire");
    let hooks = hooks(FakeBackend::with_courts(vec![c1.clone()]));
    hooks.check_ins(c1.id).await;
    assert!(!hooks.cache().is_stale(&QueryKey::check_ins(c1.id)));

    hooks.add_check_in(c1.id).await;

    assert!(hooks.cache().is_stale(&QueryKey::check_ins(c1.id)));
}

#[tokio::test]
async fn edit_check_in_success_navigates_back() {
    let c1 = court("Wilshire");
    let hooks = hooks(FakeBackend::with_courts(vec![c1.clone()]));
    let id = Uuid::new_v4();
    hooks.check_ins(c1.id).await;
    assert!(!hooks.cache().is_stale(&QueryKey::check_ins(c1.id)));

    let outcome = hooks.edit_check_in(id, CheckInPatch { title: Some("Morning doubles".into()), notes: None }).await;

    assert_eq!(outcome.effects, vec![Effect::NavigateBack]);
    assert_eq!(outcome.envelope.data.and_then(|c| c.title), Some("Morning doubles".to_owned()));
    assert!(hooks.cache().is_stale(&QueryKey::check_ins(c1.id)));

    hooks.check_ins(c1.id).await;
    assert_eq!(hooks.backend().count(|c| matches!(c, Call::GetCheckIns(_))), 2);
}

#[tokio::test]
async fn check_in_is_found_inside_cached_court() {
    let c1 = court("Wilshire");
    let visit = check_in(c1.id);
    let detail = CourtWithCheckIns { court: c1.clone(), check_ins: vec![visit.clone()] };
    let hooks = hooks(FakeBackend { court_detail: Mutex::new(Some(detail)), ..FakeBackend::default() });

    assert!(hooks.check_in_from_cache(visit.id).is_none());
    hooks.court(c1.id).await;

    assert_eq!(hooks.check_in_from_cache(visit.id), Some(visit.clone()));
}

#[tokio::test]
async fn check_in_read_is_seeded_then_fetched() {
    let c1 = court("Wilshire");
    let visit = check_in(c1.id);
    let detail = CourtWithCheckIns { court: c1.clone(), check_ins: vec![visit.clone()] };
    let mut fetched = visit.clone();
    fetched.notes = Some("fresh".into());
    let hooks = hooks(FakeBackend {
        court_detail: Mutex::new(Some(detail)),
        check_in_detail: Mutex::new(Some(fetched.clone())),
        ..FakeBackend::default()
    });
    hooks.court(c1.id).await;

    let envelope = hooks.check_in(visit.id).await;

    assert_eq!(envelope.data, Some(fetched.clone()));
    assert_eq!(hooks.cache().fresh::<CheckIn>(&QueryKey::check_in(visit.id)).as_deref(), Some(&fetched));
}

// =============================================================================
// Images
// =============================================================================

#[tokio::test]
async fn empty_image_query_is_not_sent() {
    let hooks = hooks(FakeBackend::default());

    let envelope = hooks.images(ImageQuery::default()).await;

    assert_eq!(envelope.failure, Some(Failure::Validation));
    assert!(hooks.backend().calls().is_empty());
}

#[tokio::test]
async fn unsupported_upload_is_rejected_locally() {
    let hooks = hooks(FakeBackend::default());
    let mut upload = png(ImageQuery::court(Uuid::new_v4()));
    upload.content_type = "image/gif".into();

    let outcome = hooks.upload_image(upload).await;

    assert!(matches!(outcome.effects.as_slice(), [Effect::FieldError { field: "image", .. }]));
    assert!(hooks.backend().calls().is_empty());
}

#[tokio::test]
async fn upload_with_both_associations_is_rejected() {
    let hooks = hooks(FakeBackend::default());
    let association = ImageQuery { court_id: Some(Uuid::new_v4()), checkin_id: Some(Uuid::new_v4()) };

    let outcome = hooks.upload_image(png(association)).await;

    assert!(matches!(outcome.effects.as_slice(), [Effect::FieldError { field: "courtId", .. }]));
}

#[tokio::test]
async fn upload_invalidates_only_its_association() {
    let hooks = hooks(FakeBackend::default());
    let court_a = ImageQuery::court(Uuid::new_v4());
    let court_b = ImageQuery::court(Uuid::new_v4());
    hooks.images(court_a).await;
    hooks.images(court_b).await;

    let outcome = hooks.upload_image(png(court_a)).await;

    assert_eq!(outcome.effects, vec![Effect::ToastSuccess("Image uploaded successfully!".into())]);
    assert!(hooks.cache().is_stale(&QueryKey::images(court_a)));
    assert!(!hooks.cache().is_stale(&QueryKey::images(court_b)));
}

#[tokio::test]
async fn forbidden_delete_reports_message_and_invalidates_lists() {
    let hooks = hooks(FakeBackend { delete_forbidden: true, ..FakeBackend::default() });
    let query = ImageQuery::court(Uuid::new_v4());
    hooks.images(query).await;

    let outcome = hooks.delete_image("img-1").await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.envelope.failure, Some(Failure::Forbidden));
    assert_eq!(outcome.effects, vec![Effect::ToastError("You can only delete your own images.".into())]);
    assert!(hooks.cache().is_stale(&QueryKey::images(query)));
}

#[tokio::test]
async fn delete_invalidates_every_image_list() {
    let hooks = hooks(FakeBackend::default());
    let by_court = ImageQuery::court(Uuid::new_v4());
    let by_checkin = ImageQuery::check_in(Uuid::new_v4());
    hooks.images(by_court).await;
    hooks.images(by_checkin).await;

    let outcome = hooks.delete_image("img-1").await;

    assert!(outcome.succeeded());
    assert!(hooks.cache().is_stale(&QueryKey::images(by_court)));
    assert!(hooks.cache().is_stale(&QueryKey::images(by_checkin)));
}

// =============================================================================
// Stale responses
// =============================================================================

#[tokio::test]
async fn response_overtaken_by_invalidation_is_not_cached() {
    let hooks = hooks(FakeBackend { courts_gate: Some(Notify::new()), ..FakeBackend::with_courts(vec![court("Old")]) });

    let (envelope, ()) = tokio::join!(hooks.courts(), async {
        hooks.cache().invalidate(&QueryKey::courts());
        if let Some(gate) = &hooks.backend().courts_gate {
            gate.notify_one();
        }
    });

    assert!(envelope.success);
    assert!(hooks.cache().get::<Vec<Court>>(&QueryKey::courts()).is_none());
}

// =============================================================================
// Viewport
// =============================================================================

#[tokio::test]
async fn settle_from_view_lists_nearby_courts_by_name() {
    let zeta = court_at("Zeta", 45.0, -122.0);
    let alpha = court_at("Alpha", 45.01, -122.01);
    let far = court_at("Far", 0.0, 0.0);
    let hooks = hooks(FakeBackend::with_courts(vec![zeta.clone(), alpha.clone(), far]));
    hooks.courts().await;

    let view = ViewState { longitude: -122.0, latitude: 45.0, zoom: 10.0, bearing: None, pitch: None };
    hooks.settle_from_view(view, 800.0, 600.0);

    let state = hooks.store().state();
    assert_eq!(state.visible_courts, vec![alpha, zeta]);
    assert!(state.bounds.is_some());
    assert_eq!(state.view_state, view);
}

#[tokio::test]
async fn settle_from_surface_uses_marker_geometry() {
    let inside = court("Inside");
    let outside = court("Outside");
    let hooks = hooks(FakeBackend::with_courts(vec![inside.clone(), outside.clone()]));
    hooks.courts().await;

    let map = MapSnapshot {
        container: Some(Rect::new(0.0, 100.0, 0.0, 100.0)),
        markers: vec![
            Marker { id: inside.id, rect: Rect::new(50.0, 60.0, 50.0, 60.0) },
            Marker { id: outside.id, rect: Rect::new(200.0, 210.0, 200.0, 210.0) },
        ],
    };
    hooks.settle_from_surface(ViewState::default(), None, Some(&map));

    assert_eq!(hooks.store().state().visible_courts, vec![inside]);
}

#[tokio::test]
async fn settle_without_cached_courts_clears_list() {
    let hooks = hooks(FakeBackend::default());
    hooks.store().dispatch(Action::SettleViewport {
        view_state: ViewState::default(),
        bounds: None,
        visible_ids: Vec::new(),
        courts: Vec::new(),
    });

    hooks.settle_from_surface::<MapSnapshot>(ViewState::default(), None, None);

    assert!(hooks.store().state().visible_courts.is_empty());
}

#[test]
fn location_results_feed_the_latch_once() {
    let hooks = hooks(FakeBackend::default());
    let home = Coordinates { latitude: 45.5, longitude: -122.6 };

    hooks.apply_location(Ok(home));
    hooks.apply_location(Ok(Coordinates { latitude: 0.0, longitude: 0.0 }));
    hooks.apply_location(Err(LocationError::PermissionDenied));

    let state = hooks.store().state();
    assert!(state.has_initialized_location);
    assert_eq!(state.view_state, ViewState::centred_on(home));
}

#[test]
fn location_failure_sets_latch_without_moving() {
    let hooks = hooks(FakeBackend::default());
    hooks.apply_location(Err(LocationError::Unsupported));
    let state = hooks.store().state();
    assert!(state.has_initialized_location);
    assert!(state.view_state.is_default());
}
