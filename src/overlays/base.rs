use crate::{
    core::{
        camera::CameraState,
        geo::{GeoPoint, ScreenPoint},
        projection::{Projection, ScreenSize},
    },
    input::handler::EventManager,
    overlays::{
        marker::MarkerOverlay,
        path::PathOverlay,
        standard::{Attribution, Compass, LocationIndicator, MiniMap, RotationGesture},
    },
    rendering::context::RenderContext,
};
use serde::{Deserialize, Serialize};

/// Permanent paint/hit-test order of an overlay entry.
///
/// Ranks are handed out in insertion order and never reused or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(u32);

impl Rank {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    LocationIndicator,
    Compass,
    MiniMap,
    Attribution,
    RotationGesture,
    Path,
    Marker,
}

impl OverlayKind {
    /// The five overlays created once at startup and never removed
    pub fn is_standard(&self) -> bool {
        !matches!(self, OverlayKind::Path | OverlayKind::Marker)
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OverlayKind::LocationIndicator => "location",
            OverlayKind::Compass => "compass",
            OverlayKind::MiniMap => "minimap",
            OverlayKind::Attribution => "attribution",
            OverlayKind::RotationGesture => "rotation",
            OverlayKind::Path => "path",
            OverlayKind::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// Outcome of an overlay's hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// The tap belongs to this overlay; lower overlays never see it
    Consumed,
    /// Keep looking further down the stack
    Passthrough,
}

impl HitResult {
    pub fn is_consumed(&self) -> bool {
        matches!(self, HitResult::Consumed)
    }
}

/// Everything an overlay needs to turn geography into pixels for one frame
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub camera: &'a CameraState,
    pub projection: &'a dyn Projection,
    pub size: ScreenSize,
    pub density: f64,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        camera: &'a CameraState,
        projection: &'a dyn Projection,
        size: ScreenSize,
        density: f64,
    ) -> Self {
        Self {
            camera,
            projection,
            size,
            density,
        }
    }

    pub fn to_screen(&self, point: &GeoPoint) -> ScreenPoint {
        self.projection.to_screen(point, self.camera, self.size)
    }

    /// Scales a density-independent pixel length
    pub fn dp(&self, value: f64) -> f64 {
        value * self.density
    }
}

/// Capability interface shared by every overlay
pub trait OverlayTrait {
    fn kind(&self) -> OverlayKind;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Queue draw commands for this overlay
    fn render(&self, rank: Rank, frame: &FrameContext<'_>, context: &mut RenderContext);

    /// Test a tap against this overlay; may emit events as a side effect
    fn hit_test(
        &self,
        _rank: Rank,
        _point: ScreenPoint,
        _frame: &FrameContext<'_>,
        _events: &mut EventManager,
    ) -> HitResult {
        HitResult::Passthrough
    }

    /// Whether this overlay turns two-finger rotation into map rotation
    fn handles_rotation(&self) -> bool {
        false
    }
}

/// One entry of the overlay stack
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEntry {
    LocationIndicator(LocationIndicator),
    Compass(Compass),
    MiniMap(MiniMap),
    Attribution(Attribution),
    RotationGesture(RotationGesture),
    Path(PathOverlay),
    Marker(MarkerOverlay),
}

impl OverlayEntry {
    pub fn location_indicator() -> Self {
        OverlayEntry::LocationIndicator(LocationIndicator::new())
    }

    pub fn compass() -> Self {
        OverlayEntry::Compass(Compass::new())
    }

    pub fn mini_map() -> Self {
        OverlayEntry::MiniMap(MiniMap::new())
    }

    pub fn attribution(text: impl Into<String>) -> Self {
        OverlayEntry::Attribution(Attribution::new(text))
    }

    pub fn rotation_gesture() -> Self {
        OverlayEntry::RotationGesture(RotationGesture::new())
    }

    pub fn path(points: Vec<GeoPoint>) -> Self {
        OverlayEntry::Path(PathOverlay::new(points))
    }

    pub fn marker(position: GeoPoint, anchor: (f64, f64), title: impl Into<String>) -> Self {
        OverlayEntry::Marker(MarkerOverlay::new(position, anchor, title))
    }

    pub fn overlay(&self) -> &dyn OverlayTrait {
        match self {
            OverlayEntry::LocationIndicator(o) => o,
            OverlayEntry::Compass(o) => o,
            OverlayEntry::MiniMap(o) => o,
            OverlayEntry::Attribution(o) => o,
            OverlayEntry::RotationGesture(o) => o,
            OverlayEntry::Path(o) => o,
            OverlayEntry::Marker(o) => o,
        }
    }

    pub fn overlay_mut(&mut self) -> &mut dyn OverlayTrait {
        match self {
            OverlayEntry::LocationIndicator(o) => o,
            OverlayEntry::Compass(o) => o,
            OverlayEntry::MiniMap(o) => o,
            OverlayEntry::Attribution(o) => o,
            OverlayEntry::RotationGesture(o) => o,
            OverlayEntry::Path(o) => o,
            OverlayEntry::Marker(o) => o,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.overlay().kind()
    }

    pub fn is_standard(&self) -> bool {
        self.kind().is_standard()
    }
}
