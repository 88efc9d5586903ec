use super::*;
use serde_json::json;

// =============================================================================
// Envelope
// =============================================================================

#[test]
fn envelope_parses_missing_message_and_null_data() {
    let env: Envelope<Court> = serde_json::from_value(json!({ "success": false, "data": null })).expect("parse");
    assert!(!env.success);
    assert!(env.data.is_none());
    assert_eq!(env.message, "");
    assert!(env.failure.is_none());
}

#[test]
fn envelope_failure_class_is_not_serialized() {
    let env = Envelope::<()>::fail("nope").with_failure(Failure::Forbidden);
    let value = serde_json::to_value(&env).expect("serialize");
    assert_eq!(value, json!({ "success": false, "data": null, "message": "nope" }));
}

#[test]
fn into_result_falls_back_to_generic_message() {
    let env = Envelope::<u32>::fail("");
    assert_eq!(env.into_result(), Err(GENERIC_FAILURE_MESSAGE.to_owned()));
    assert_eq!(Envelope::ok(7_u32, "").into_result(), Ok(7));
}

#[test]
fn map_keeps_failure_class() {
    let env = Envelope::<u32>::fail("gone").with_failure(Failure::NotFound).map(|n| n + 1);
    assert_eq!(env.failure, Some(Failure::NotFound));
    assert_eq!(env.message, "gone");
}

#[test]
fn failure_from_status_classes() {
    assert_eq!(Failure::from_status(200), None);
    assert_eq!(Failure::from_status(201), None);
    assert_eq!(Failure::from_status(400), Some(Failure::Validation));
    assert_eq!(Failure::from_status(401), Some(Failure::Unauthorized));
    assert_eq!(Failure::from_status(403), Some(Failure::Forbidden));
    assert_eq!(Failure::from_status(404), Some(Failure::NotFound));
    assert_eq!(Failure::from_status(500), Some(Failure::Transient));
    assert_eq!(Failure::from_status(503), Some(Failure::Transient));
}

// =============================================================================
// Court wire format
// =============================================================================

#[test]
fn court_uses_camel_case_wire_names() {
    let raw = json!({
        "id": "6f1c1f5e-2b59-4c3a-9d0e-0b8a4a1d2c3b",
        "name": "Riverside",
        "description": null,
        "latitude": 45.5,
        "longitude": -122.6,
        "playCount": 3,
        "image": null,
        "userId": "user-1",
        "createdAt": "2025-01-02T03:04:05Z",
        "updatedAt": "2025-01-02T03:04:05Z",
        "checkIns": []
    });
    let court: CourtWithCheckIns = serde_json::from_value(raw).expect("parse");
    assert_eq!(court.court.name, "Riverside");
    assert_eq!(court.court.play_count, 3);
    assert_eq!(court.court.user_id, "user-1");
    assert!(court.check_ins.is_empty());
}

#[test]
fn court_patch_serializes_only_present_fields() {
    let patch = CourtPatch::play_count(4);
    assert_eq!(serde_json::to_value(&patch).expect("serialize"), json!({ "playCount": 4 }));
}

#[test]
fn new_court_validation() {
    let mut court = NewCourt { name: "Ok".into(), latitude: 10.0, longitude: 20.0, description: None };
    assert!(court.validate().is_ok());

    court.name = "A".into();
    assert_eq!(court.validate(), Err(ValidationError::NameTooShort));

    court.name = "x".repeat(101);
    assert_eq!(court.validate(), Err(ValidationError::NameTooLong));

    court.name = "Valid".into();
    court.latitude = 90.5;
    let err = court.validate().expect_err("latitude out of range");
    assert_eq!(err.field(), "latitude");

    court.latitude = -90.0;
    court.longitude = 180.1;
    assert_eq!(court.validate().expect_err("longitude").field(), "longitude");
}

#[test]
fn court_patch_rejects_negative_play_count() {
    assert_eq!(CourtPatch::play_count(-1).validate(), Err(ValidationError::NegativePlayCount));
    assert!(CourtPatch::play_count(0).validate().is_ok());
}

// =============================================================================
// Images
// =============================================================================

#[test]
fn image_query_association() {
    let id = uuid::Uuid::new_v4();
    assert!(ImageQuery::default().is_empty());
    assert!(ImageQuery::court(id).validate_upload().is_ok());
    let both = ImageQuery { court_id: Some(id), checkin_id: Some(id) };
    assert_eq!(both.validate_upload(), Err(ValidationError::AmbiguousAssociation));
    assert_eq!(serde_json::to_value(ImageQuery::check_in(id)).expect("serialize"), json!({ "checkinId": id }));
}

// =============================================================================
// Viewport
// =============================================================================

#[test]
fn bounds_serialize_flattened() {
    let bounds = Bounds { west: -10.0, south: -5.0, east: 10.0, north: 5.0 };
    let value = serde_json::to_value(bounds).expect("serialize");
    assert_eq!(value, json!([-10.0, -5.0, 10.0, 5.0]));
    let back: Bounds = serde_json::from_value(value).expect("parse");
    assert_eq!(back, bounds);
}

#[test]
fn default_view_is_sentinel() {
    assert!(ViewState::default().is_default());
    let fixed = ViewState::centred_on(Coordinates { latitude: 1.0, longitude: 2.0 });
    assert!(!fixed.is_default());
    assert!((fixed.zoom - view::LOCATION_FIX_ZOOM).abs() < f64::EPSILON);
}

#[test]
fn coordinates_validate_ranges() {
    assert!(Coordinates { latitude: 90.0, longitude: -180.0 }.validate().is_ok());
    assert!(Coordinates { latitude: 91.0, longitude: 0.0 }.validate().is_err());
}

#[test]
fn image_upload_validation() {
    assert_eq!(validate_image("image/jpeg", 10, MAX_IMAGE_BYTES), Ok("jpg"));
    assert_eq!(validate_image("image/jpg", 10, MAX_IMAGE_BYTES), Ok("jpg"));
    assert_eq!(validate_image("image/webp", MAX_IMAGE_BYTES, MAX_IMAGE_BYTES), Ok("webp"));
    assert_eq!(validate_image("image/gif", 10, MAX_IMAGE_BYTES), Err(ValidationError::InvalidImage));
    assert_eq!(validate_image("image/png", MAX_IMAGE_BYTES + 1, MAX_IMAGE_BYTES), Err(ValidationError::InvalidImage));
    assert_eq!(validate_image("image/png", 0, MAX_IMAGE_BYTES), Err(ValidationError::MissingImage));
    assert_eq!(ValidationError::InvalidImage.field(), "image");
}
