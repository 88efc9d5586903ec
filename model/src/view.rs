//! Map viewport types owned by the client store.

use serde::{Deserialize, Serialize};

/// Default viewport: a continental view far from any real court. Used as the
/// "never customized" sentinel when deciding whether to auto-locate.
pub const DEFAULT_LONGITUDE: f64 = -100.0;
pub const DEFAULT_LATITUDE: f64 = 40.0;
pub const DEFAULT_ZOOM: f64 = 3.5;

/// Zoom applied when centring on a geolocation fix.
pub const LOCATION_FIX_ZOOM: f64 = 15.0;

/// Camera position of the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { longitude: DEFAULT_LONGITUDE, latitude: DEFAULT_LATITUDE, zoom: DEFAULT_ZOOM, bearing: None, pitch: None }
    }
}

impl ViewState {
    /// View centred on `coords` at street level, facing north.
    #[must_use]
    pub fn centred_on(coords: Coordinates) -> Self {
        Self {
            longitude: coords.longitude,
            latitude: coords.latitude,
            zoom: LOCATION_FIX_ZOOM,
            bearing: Some(0.0),
            pitch: Some(0.0),
        }
    }

    /// Whether this is still the untouched default viewport.
    #[must_use]
    pub fn is_default(&self) -> bool {
        let default = Self::default();
        (self.longitude - default.longitude).abs() < f64::EPSILON
            && (self.latitude - default.latitude).abs() < f64::EPSILON
            && (self.zoom - default.zoom).abs() < f64::EPSILON
    }
}

/// A geographic point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Viewport bounding box: the south-west / north-east corner pair,
/// serialized flattened as `[west, south, east, north]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl From<[f64; 4]> for Bounds {
    fn from([west, south, east, north]: [f64; 4]) -> Self {
        Self { west, south, east, north }
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.west, b.south, b.east, b.north]
    }
}
