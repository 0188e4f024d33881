use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM},
    geo::GeoPoint,
};
use serde::{Deserialize, Serialize};

/// Inclusive zoom range supported by a tile source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub fn new(min: f64, max: f64) -> Self {
        let min = min.clamp(MIN_ZOOM, MAX_ZOOM);
        let max = max.clamp(min, MAX_ZOOM);
        Self { min, max }
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(MIN_ZOOM, MAX_ZOOM)
    }
}

/// The surface's view state: center point, zoom level and map rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: GeoPoint,
    pub zoom_level: f64,
    /// Map rotation in degrees, always in `[0, 360)`
    #[serde(default)]
    pub orientation: f64,
}

impl CameraState {
    pub fn new(center: GeoPoint, zoom_level: f64) -> Self {
        Self {
            center,
            zoom_level,
            orientation: 0.0,
        }
    }

    /// Copy of this camera with the zoom clamped into `range`
    pub fn clamped(&self, range: &ZoomRange) -> Self {
        Self {
            center: self.center.clone(),
            zoom_level: range.clamp(self.zoom_level),
            orientation: normalize_degrees(self.orientation),
        }
    }

    /// Rotates the map by `delta` degrees
    pub fn rotate_by(&mut self, delta: f64) {
        self.orientation = normalize_degrees(self.orientation + delta);
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(GeoPoint::default(), MIN_ZOOM)
    }
}

/// Wraps an angle into `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_range_clamp() {
        let range = ZoomRange::new(0.0, 19.0);
        assert_eq!(range.clamp(25.0), 19.0);
        assert_eq!(range.clamp(-3.0), 0.0);
        assert_eq!(range.clamp(14.5), 14.5);
        assert_eq!(range.clamp(f64::NAN), 0.0);
    }

    #[test]
    fn test_zoom_range_is_bounded() {
        let range = ZoomRange::new(-5.0, 40.0);
        assert_eq!(range.min, MIN_ZOOM);
        assert_eq!(range.max, MAX_ZOOM);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut camera = CameraState::new(GeoPoint::default(), 10.0);
        camera.rotate_by(370.0);
        assert!((camera.orientation - 10.0).abs() < 1e-9);
        camera.rotate_by(-20.0);
        assert!((camera.orientation - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_camera_serde() {
        let camera = CameraState::new(GeoPoint::new(55.0, 37.0), 12.0);
        let json = serde_json::to_string(&camera).unwrap();
        let back: CameraState = serde_json::from_str(&json).unwrap();
        assert_eq!(camera, back);
    }
}
