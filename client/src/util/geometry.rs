//! Screen-space rectangle overlap and geographic viewport math.
//!
//! DESIGN
//! ======
//! Marker visibility is decided two ways. With a rendered map, the host
//! reports pixel rectangles and [`intersects`] compares them. Without one,
//! [`bounds_from_view`] projects the camera onto Web Mercator (512 px tiles,
//! the same grid the map renderer uses) and [`bounds_contains`] tests stored
//! coordinates against the result.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::f64::consts::PI;

use model::{Bounds, Coordinates, ViewState};

/// Tile edge length of the map renderer, in CSS pixels.
pub const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Axis-aligned rectangle in pixel space (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }
}

/// Whether two rectangles overlap. Touching edges count as overlap.
#[must_use]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left <= b.right && b.left <= a.right && a.top <= b.bottom && b.top <= a.bottom
}

/// Whether `point` lies inside `bounds`, edges included.
///
/// Bounds whose west edge is east of their east edge wrap across the
/// antimeridian.
#[must_use]
pub fn bounds_contains(bounds: &Bounds, point: Coordinates) -> bool {
    if point.latitude < bounds.south || point.latitude > bounds.north {
        return false;
    }
    if bounds.west <= bounds.east {
        point.longitude >= bounds.west && point.longitude <= bounds.east
    } else {
        point.longitude >= bounds.west || point.longitude <= bounds.east
    }
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

fn project(coords: Coordinates, world: f64) -> (f64, f64) {
    let lat = coords.latitude.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE).to_radians();
    let x = (coords.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * world;
    (x, y)
}

fn unproject_longitude(x: f64, world: f64) -> f64 {
    wrap_longitude(x / world * 360.0 - 180.0)
}

fn unproject_latitude(y: f64, world: f64) -> f64 {
    let y = y.clamp(0.0, world);
    (PI * (1.0 - 2.0 * y / world)).sinh().atan().to_degrees()
}

/// Wrap a longitude into `[-180, 180]`.
#[must_use]
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if longitude > 0.0 && wrapped <= -180.0 { 180.0 } else { wrapped }
}

/// Geographic bounds visible in a `width` × `height` pixel viewport.
///
/// Bearing and pitch are ignored; the box is the north-up footprint.
/// A viewport wider than the whole world yields full longitude coverage.
#[must_use]
pub fn bounds_from_view(view: &ViewState, width: f64, height: f64) -> Bounds {
    let world = world_size(view.zoom);
    let (cx, cy) = project(Coordinates { latitude: view.latitude, longitude: view.longitude }, world);
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    let (west, east) = if width >= world {
        (-180.0, 180.0)
    } else {
        (unproject_longitude(cx - half_w, world), unproject_longitude(cx + half_w, world))
    };

    Bounds {
        west,
        south: unproject_latitude(cy + half_h, world),
        east,
        north: unproject_latitude(cy - half_h, world),
    }
}
