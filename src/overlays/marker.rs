use crate::{
    core::{
        constants::MARKER_ICON_SIZE,
        geo::{GeoPoint, ScreenPoint, ScreenRect},
    },
    input::{events::MapEvent, handler::EventManager},
    overlays::base::{FrameContext, HitResult, OverlayKind, OverlayTrait, Rank},
    rendering::context::{DrawCommand, RenderContext},
};

/// A titled pin at a fixed position
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOverlay {
    enabled: bool,
    position: GeoPoint,
    /// Fractions of the icon size; `(0.5, 0.5)` centers the icon on the position
    anchor: (f64, f64),
    title: String,
}

impl MarkerOverlay {
    pub fn new(position: GeoPoint, anchor: (f64, f64), title: impl Into<String>) -> Self {
        Self {
            enabled: true,
            position,
            anchor: (anchor.0.clamp(0.0, 1.0), anchor.1.clamp(0.0, 1.0)),
            title: title.into(),
        }
    }

    pub fn position(&self) -> &GeoPoint {
        &self.position
    }

    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Icon rectangle on screen for this frame
    pub fn icon_rect(&self, frame: &FrameContext<'_>) -> ScreenRect {
        let width = frame.dp(MARKER_ICON_SIZE.0 as f64);
        let height = frame.dp(MARKER_ICON_SIZE.1 as f64);
        let at = frame.to_screen(&self.position);
        ScreenRect::from_origin_size(
            ScreenPoint::new(at.x - self.anchor.0 * width, at.y - self.anchor.1 * height),
            width,
            height,
        )
    }
}

impl OverlayTrait for MarkerOverlay {
    crate::impl_overlay_common!(OverlayKind::Marker, enabled);

    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext) {
        context.push(DrawCommand::Marker {
            rank,
            icon: self.icon_rect(frame),
            title: self.title.clone(),
        });
    }

    fn hit_test(
        &self,
        rank: Rank,
        point: ScreenPoint,
        frame: &FrameContext<'_>,
        events: &mut EventManager,
    ) -> HitResult {
        if !self.icon_rect(frame).contains(&point) {
            return HitResult::Passthrough;
        }
        events.emit(MapEvent::MarkerTapped {
            rank,
            title: self.title.clone(),
        });
        HitResult::Consumed
    }
}
