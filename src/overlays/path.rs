use crate::{
    core::{
        constants::PATH_HIT_TOLERANCE_PX,
        geo::{GeoPoint, ScreenPoint},
    },
    input::{events::MapEvent, handler::EventManager},
    overlays::base::{FrameContext, HitResult, OverlayKind, OverlayTrait, Rank},
    rendering::context::{DrawCommand, RenderContext},
};
use geo::EuclideanDistance;

/// A polyline through an ordered sequence of points.
///
/// Tapping near any segment reports the point count through a
/// [`MapEvent::PathTapped`] event, then lets the tap fall through to whatever
/// lies below.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOverlay {
    enabled: bool,
    points: Vec<GeoPoint>,
    /// Hit tolerance in density-independent pixels
    tolerance: f64,
}

impl PathOverlay {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            enabled: true,
            points,
            tolerance: PATH_HIT_TOLERANCE_PX,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Whether `point` lies within tolerance of any segment
    pub fn is_hit(&self, point: ScreenPoint, frame: &FrameContext<'_>) -> bool {
        if self.points.len() < 2 {
            return false;
        }

        let tolerance = frame.dp(self.tolerance);
        let tap = geo::Point::from(geo::Coord::from(point));
        let projected: Vec<ScreenPoint> = self.points.iter().map(|p| frame.to_screen(p)).collect();

        projected.windows(2).any(|segment| {
            let line = geo::Line::new(segment[0], segment[1]);
            tap.euclidean_distance(&line) <= tolerance
        })
    }
}

impl OverlayTrait for PathOverlay {
    crate::impl_overlay_common!(OverlayKind::Path, enabled);

    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext) {
        if self.points.len() < 2 {
            return;
        }
        context.push(DrawCommand::Line {
            rank,
            points: self.points.iter().map(|p| frame.to_screen(p)).collect(),
        });
    }

    fn hit_test(
        &self,
        rank: Rank,
        point: ScreenPoint,
        frame: &FrameContext<'_>,
        events: &mut EventManager,
    ) -> HitResult {
        if self.is_hit(point, frame) {
            log::debug!("path {} tapped ({} points)", rank, self.points.len());
            events.emit(MapEvent::PathTapped {
                rank,
                point_count: self.points.len(),
            });
        }
        // Taps always continue to the overlays underneath
        HitResult::Passthrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        camera::CameraState,
        projection::{Projection, ScreenSize},
    };

    /// Longitude on x, latitude on y, one degree per pixel
    struct Planar;

    impl Projection for Planar {
        fn to_screen(&self, point: &GeoPoint, _camera: &CameraState, _size: ScreenSize) -> ScreenPoint {
            ScreenPoint::new(point.longitude(), point.latitude())
        }
    }

    fn segment() -> PathOverlay {
        PathOverlay::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 10.0)])
    }

    #[test]
    fn test_tap_near_midpoint_reports_point_count() {
        let camera = CameraState::default();
        let frame = FrameContext::new(&camera, &Planar, ScreenSize::new(100.0, 100.0), 1.0);
        let mut events = EventManager::new();

        let result = segment().hit_test(Rank::new(4), ScreenPoint::new(5.0, 3.0), &frame, &mut events);
        assert_eq!(result, HitResult::Passthrough);
        assert_eq!(
            events.process_events(),
            vec![MapEvent::PathTapped {
                rank: Rank::new(4),
                point_count: 2
            }]
        );
    }

    #[test]
    fn test_far_tap_is_not_a_hit() {
        let camera = CameraState::default();
        let frame = FrameContext::new(&camera, &Planar, ScreenSize::new(100.0, 100.0), 1.0);
        let mut events = EventManager::new();

        let path = segment();
        assert!(!path.is_hit(ScreenPoint::new(5.0, 40.0), &frame));
        assert!(!path.is_hit(ScreenPoint::new(30.0, 0.0), &frame));
        path.hit_test(Rank::new(4), ScreenPoint::new(5.0, 40.0), &frame, &mut events);
        assert_eq!(events.pending_events(), 0);
    }

    #[test]
    fn test_tolerance_scales_with_density() {
        let camera = CameraState::default();
        let size = ScreenSize::new(100.0, 100.0);
        let tap = ScreenPoint::new(5.0, 20.0);

        let sparse = FrameContext::new(&camera, &Planar, size, 1.0);
        let dense = FrameContext::new(&camera, &Planar, size, 2.0);
        assert!(!segment().is_hit(tap, &sparse));
        assert!(segment().is_hit(tap, &dense));
    }

    #[test]
    fn test_degenerate_paths_never_hit() {
        let camera = CameraState::default();
        let frame = FrameContext::new(&camera, &Planar, ScreenSize::new(100.0, 100.0), 1.0);
        let mut ctx = RenderContext::new(100.0, 100.0);

        let empty = PathOverlay::new(Vec::new());
        assert!(!empty.is_hit(ScreenPoint::new(0.0, 0.0), &frame));
        empty.render(Rank::new(0), &frame, &mut ctx);
        assert!(ctx.commands().is_empty());
    }
}
