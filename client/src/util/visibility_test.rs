use super::*;
use crate::test_helpers::court_at;

fn marker(left: f64, right: f64, top: f64, bottom: f64) -> Marker {
    Marker { id: Uuid::new_v4(), rect: Rect::new(left, right, top, bottom) }
}

#[test]
fn returns_only_markers_inside_container() {
    let inside = marker(50.0, 60.0, 50.0, 60.0);
    let outside = marker(200.0, 210.0, 0.0, 10.0);
    let map = MapSnapshot { container: Some(Rect::new(0.0, 100.0, 0.0, 100.0)), markers: vec![inside, outside] };

    assert_eq!(visible_entity_ids(Some(&map)), vec![inside.id]);
}

#[test]
fn keeps_marker_order() {
    let a = marker(10.0, 20.0, 10.0, 20.0);
    let b = marker(0.0, 5.0, 0.0, 5.0);
    let c = marker(90.0, 110.0, 90.0, 110.0);
    let map = MapSnapshot { container: Some(Rect::new(0.0, 100.0, 0.0, 100.0)), markers: vec![a, b, c] };

    assert_eq!(visible_entity_ids(Some(&map)), vec![a.id, b.id, c.id]);
}

#[test]
fn missing_map_yields_empty() {
    assert!(visible_entity_ids::<MapSnapshot>(None).is_empty());
}

#[test]
fn unmounted_container_yields_empty() {
    let map = MapSnapshot { container: None, markers: vec![marker(0.0, 1.0, 0.0, 1.0)] };
    assert!(visible_entity_ids(Some(&map)).is_empty());
}

#[test]
fn zero_markers_yields_empty() {
    let map = MapSnapshot { container: Some(Rect::new(0.0, 100.0, 0.0, 100.0)), markers: Vec::new() };
    assert!(visible_entity_ids(Some(&map)).is_empty());
}

#[test]
fn geographic_variant_filters_by_coordinates() {
    let portland = court_at("Portland", 45.52, -122.68);
    let seattle = court_at("Seattle", 47.6, -122.33);
    let bounds = Bounds { west: -123.0, south: 45.0, east: -122.0, north: 46.0 };

    assert_eq!(visible_by_bounds([&portland, &seattle], &bounds), vec![portland.id]);
}
