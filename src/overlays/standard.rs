//! The five standard overlays every surface carries.
//!
//! Location and compass state is fed from sensor events by the surface; the
//! overlays themselves never talk to a provider.

use crate::{
    core::{
        camera::normalize_degrees,
        constants::{
            ATTRIBUTION_OFFSET_PX, COMPASS_CENTER_PX, MINIMAP_PADDING_PX, MINIMAP_SCREEN_DIVISOR,
            MINIMAP_ZOOM_DIFFERENCE,
        },
        geo::{GeoPoint, ScreenPoint, ScreenRect},
    },
    input::handler::EventManager,
    overlays::base::{FrameContext, HitResult, OverlayKind, OverlayTrait, Rank},
    rendering::context::{DrawCommand, RenderContext},
};

/// Current-location indicator.
///
/// Present from startup but only live once the location permission is granted;
/// until then (or when no provider exists) it draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationIndicator {
    enabled: bool,
    live: bool,
    fix: Option<GeoPoint>,
    heading: Option<f64>,
}

impl LocationIndicator {
    pub fn new() -> Self {
        Self {
            enabled: true,
            live: false,
            fix: None,
            heading: None,
        }
    }

    /// Permission granted: accept position fixes from now on
    pub fn activate(&mut self) {
        self.live = true;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Applies a fix; ignored while not live
    pub fn apply_fix(&mut self, position: GeoPoint, heading: Option<f64>) -> bool {
        if !self.live {
            return false;
        }
        self.fix = Some(position);
        self.heading = heading.map(normalize_degrees);
        true
    }

    pub fn fix(&self) -> Option<&GeoPoint> {
        self.fix.as_ref()
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }
}

impl Default for LocationIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayTrait for LocationIndicator {
    crate::impl_overlay_common!(OverlayKind::LocationIndicator, enabled);

    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext) {
        if !self.live {
            return;
        }
        if let Some(fix) = &self.fix {
            context.push(DrawCommand::Location {
                rank,
                position: frame.to_screen(fix),
                heading: self.heading,
            });
        }
    }
}

/// On-screen compass rose
#[derive(Debug, Clone, PartialEq)]
pub struct Compass {
    enabled: bool,
    heading: Option<f64>,
}

impl Compass {
    pub fn new() -> Self {
        Self {
            enabled: true,
            heading: None,
        }
    }

    pub fn set_heading(&mut self, degrees: f64) {
        self.heading = Some(normalize_degrees(degrees));
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }
}

impl Default for Compass {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayTrait for Compass {
    crate::impl_overlay_common!(OverlayKind::Compass, enabled);

    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext) {
        let Some(heading) = self.heading else {
            return;
        };
        context.push(DrawCommand::Compass {
            rank,
            center: ScreenPoint::new(frame.dp(COMPASS_CENTER_PX.0), frame.dp(COMPASS_CENTER_PX.1)),
            bearing: normalize_degrees(heading - frame.camera.orientation),
        });
    }
}

/// Overview map in the bottom-right corner
#[derive(Debug, Clone, PartialEq)]
pub struct MiniMap {
    enabled: bool,
    zoom_difference: f64,
}

impl MiniMap {
    pub fn new() -> Self {
        Self {
            enabled: true,
            zoom_difference: MINIMAP_ZOOM_DIFFERENCE,
        }
    }

    /// Screen rectangle: a fifth of the screen, padded from the bottom-right edge
    pub fn rect(&self, frame: &FrameContext<'_>) -> ScreenRect {
        let width = frame.size.width / MINIMAP_SCREEN_DIVISOR;
        let height = frame.size.height / MINIMAP_SCREEN_DIVISOR;
        let padding = frame.dp(MINIMAP_PADDING_PX);
        ScreenRect::from_origin_size(
            ScreenPoint::new(
                frame.size.width - width - padding,
                frame.size.height - height - padding,
            ),
            width,
            height,
        )
    }

    pub fn zoom_for(&self, camera_zoom: f64) -> f64 {
        (camera_zoom - self.zoom_difference).max(0.0)
    }
}

impl Default for MiniMap {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayTrait for MiniMap {
    crate::impl_overlay_common!(OverlayKind::MiniMap, enabled);

    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext) {
        context.push(DrawCommand::MiniMap {
            rank,
            rect: self.rect(frame),
            zoom: self.zoom_for(frame.camera.zoom_level),
        });
    }

    fn hit_test(
        &self,
        _rank: Rank,
        point: ScreenPoint,
        frame: &FrameContext<'_>,
        _events: &mut EventManager,
    ) -> HitResult {
        if self.rect(frame).contains(&point) {
            HitResult::Consumed
        } else {
            HitResult::Passthrough
        }
    }
}

/// Tile source copyright notice
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    enabled: bool,
    text: String,
}

impl Attribution {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            enabled: true,
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl OverlayTrait for Attribution {
    crate::impl_overlay_common!(OverlayKind::Attribution, enabled);

    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext) {
        if self.text.is_empty() {
            return;
        }
        context.push(DrawCommand::Text {
            rank,
            position: ScreenPoint::new(
                frame.dp(ATTRIBUTION_OFFSET_PX.0),
                frame.size.height - frame.dp(ATTRIBUTION_OFFSET_PX.1),
            ),
            text: self.text.clone(),
        });
    }
}

/// Turns two-finger rotation into map rotation; draws nothing
#[derive(Debug, Clone, PartialEq)]
pub struct RotationGesture {
    enabled: bool,
}

impl RotationGesture {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Default for RotationGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayTrait for RotationGesture {
    crate::impl_overlay_common!(OverlayKind::RotationGesture, enabled);

    fn render(&self, _rank: Rank, _frame: &FrameContext<'_>, _context: &mut RenderContext) {}

    fn handles_rotation(&self) -> bool {
        self.enabled
    }
}
