//! Resolve which court markers are currently inside the map viewport.
//!
//! The rendered variant inspects layout rectangles reported by the host map
//! and must only run after layout has settled (the host waits for move-end
//! plus a short delay). The geographic variant needs no rendered map.

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use model::{Bounds, Court};
use uuid::Uuid;

use super::geometry::{Rect, bounds_contains, intersects};

/// A rendered marker element tagged with its entity id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub id: Uuid,
    pub rect: Rect,
}

/// Read-only view of a live map container and its rendered markers.
pub trait MapSurface {
    /// Bounding rectangle of the map container, or `None` if it is not
    /// mounted.
    fn container_rect(&self) -> Option<Rect>;

    /// Rendered markers in layout order.
    fn markers(&self) -> Vec<Marker>;
}

/// Snapshot of a rendered map, captured by the host after layout settles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapSnapshot {
    pub container: Option<Rect>,
    pub markers: Vec<Marker>,
}

impl MapSurface for MapSnapshot {
    fn container_rect(&self) -> Option<Rect> {
        self.container
    }

    fn markers(&self) -> Vec<Marker> {
        self.markers.clone()
    }
}

/// Ids of markers overlapping the map container, in marker order.
///
/// A missing map or unmounted container yields an empty list.
#[must_use]
pub fn visible_entity_ids<M: MapSurface + ?Sized>(map: Option<&M>) -> Vec<Uuid> {
    let Some(map) = map else {
        return Vec::new();
    };
    let Some(container) = map.container_rect() else {
        return Vec::new();
    };
    map.markers()
        .into_iter()
        .filter(|marker| intersects(&container, &marker.rect))
        .map(|marker| marker.id)
        .collect()
}

/// Ids of courts whose stored coordinates fall inside `bounds`, in input
/// order.
pub fn visible_by_bounds<'a>(courts: impl IntoIterator<Item = &'a Court>, bounds: &Bounds) -> Vec<Uuid> {
    courts
        .into_iter()
        .filter(|court| bounds_contains(bounds, court.coordinates()))
        .map(|court| court.id)
        .collect()
}
