use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.0511287798;

/// A geographic position with an optional label.
///
/// Fields are private so a point cannot change after construction; two points
/// with the same coordinates and label compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }

    pub fn labelled(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: Some(label.into()),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Same coordinates, label dropped
    pub fn unlabelled(&self) -> Self {
        Self::new(self.latitude, self.longitude)
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<&GeoPoint> for geo_types::Point<f64> {
    fn from(point: &GeoPoint) -> Self {
        geo_types::Point::new(point.longitude, point.latitude)
    }
}

impl From<geo_types::Point<f64>> for GeoPoint {
    fn from(point: geo_types::Point<f64>) -> Self {
        GeoPoint::new(point.y(), point.x())
    }
}

/// A position in screen pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<ScreenPoint> for geo_types::Coord<f64> {
    fn from(point: ScreenPoint) -> Self {
        geo_types::coord! { x: point.x, y: point.y }
    }
}

/// Axis-aligned screen rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenRect {
    pub fn from_origin_size(origin: ScreenPoint, width: f64, height: f64) -> Self {
        Self {
            min: origin,
            max: ScreenPoint::new(origin.x + width, origin.y + height),
        }
    }

    pub fn contains(&self, point: &ScreenPoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// A tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// The tile containing `point` at zoom `zoom`
    pub fn from_geo(point: &GeoPoint, zoom: u8) -> Self {
        let lat_rad = GeoPoint::clamp_lat(point.latitude()).to_radians();
        let n = 2_f64.powi(zoom as i32);
        let max = (n as u32).saturating_sub(1);

        let x = ((point.longitude() + 180.0) / 360.0 * n).floor().max(0.0) as u32;
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor().max(0.0) as u32;

        Self::new(x.min(max), y.min(max), zoom)
    }

    /// Northwest corner of the tile
    pub fn to_geo(&self) -> GeoPoint {
        let n = 2_f64.powi(self.z as i32);
        let lng = self.x as f64 / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        GeoPoint::new(lat, lng)
    }

    pub fn is_valid(&self) -> bool {
        let max_coord = 2_u64.pow(self.z as u32);
        (self.x as u64) < max_coord && (self.y as u64) < max_coord
    }
}
