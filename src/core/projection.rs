//! Geographic to screen conversion
//!
//! The real projection engine belongs to the host renderer. The core only needs
//! the forward mapping to place overlays and hit-test taps, so it consumes it
//! through [`Projection`].

use crate::core::{
    camera::CameraState,
    constants::TILE_SIZE,
    geo::{GeoPoint, ScreenPoint},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

pub trait Projection {
    /// Screen position of `point` for the given camera
    fn to_screen(&self, point: &GeoPoint, camera: &CameraState, size: ScreenSize) -> ScreenPoint;
}

/// Spherical Web Mercator (EPSG:3857) with the camera center at the screen center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    tile_size: f64,
}

impl WebMercator {
    pub fn new(tile_size: f64) -> Self {
        Self { tile_size }
    }

    /// World pixel coordinates at `zoom`
    pub fn project(&self, point: &GeoPoint, zoom: f64) -> ScreenPoint {
        let scale = self.tile_size * 2_f64.powf(zoom);
        let lat = GeoPoint::clamp_lat(point.latitude()).to_radians();

        let x = (point.longitude() + 180.0) / 360.0 * scale;
        let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * scale;
        ScreenPoint::new(x, y)
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(TILE_SIZE as f64)
    }
}

impl Projection for WebMercator {
    fn to_screen(&self, point: &GeoPoint, camera: &CameraState, size: ScreenSize) -> ScreenPoint {
        let origin = self.project(&camera.center, camera.zoom_level);
        let world = self.project(point, camera.zoom_level);
        let center = size.center();

        let dx = world.x - origin.x;
        let dy = world.y - origin.y;
        if camera.orientation == 0.0 {
            return ScreenPoint::new(center.x + dx, center.y + dy);
        }

        // Rotate around the screen center
        let (sin, cos) = camera.orientation.to_radians().sin_cos();
        ScreenPoint::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_center_maps_to_screen_center() {
        let projection = WebMercator::default();
        let camera = CameraState::new(GeoPoint::new(55.4331145, 37.5562910), 14.5);
        let size = ScreenSize::new(800.0, 600.0);

        let p = projection.to_screen(&camera.center, &camera, size);
        assert!((p.x - 400.0).abs() < 1e-6);
        assert!((p.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_north_is_up_east_is_right() {
        let projection = WebMercator::default();
        let camera = CameraState::new(GeoPoint::new(0.0, 0.0), 5.0);
        let size = ScreenSize::new(100.0, 100.0);

        let north = projection.to_screen(&GeoPoint::new(1.0, 0.0), &camera, size);
        let east = projection.to_screen(&GeoPoint::new(0.0, 1.0), &camera, size);
        assert!(north.y < 50.0);
        assert!(east.x > 50.0);
    }

    #[test]
    fn test_world_size_at_zoom_zero() {
        let projection = WebMercator::default();
        let right_edge = projection.project(&GeoPoint::new(0.0, 180.0), 0.0);
        assert!((right_edge.x - 256.0).abs() < 1e-9);
        assert!((right_edge.y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_preserves_distance_from_center() {
        let projection = WebMercator::default();
        let mut camera = CameraState::new(GeoPoint::new(0.0, 0.0), 5.0);
        let size = ScreenSize::new(100.0, 100.0);
        let point = GeoPoint::new(0.0, 1.0);

        let before = projection.to_screen(&point, &camera, size);
        camera.rotate_by(90.0);
        let after = projection.to_screen(&point, &camera, size);

        let center = size.center();
        assert!((before.distance_to(&center) - after.distance_to(&center)).abs() < 1e-9);
        assert!((after.x - 50.0).abs() < 1e-9);
    }
}
