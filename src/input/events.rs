use crate::{
    core::geo::{GeoPoint, ScreenPoint},
    overlays::base::{OverlayKind, Rank},
    permissions::gate::PermissionStatus,
};
use serde::{Deserialize, Serialize};

/// Raw input the host shell forwards to the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single tap / click
    Tap { position: ScreenPoint },
    /// Two-finger rotation
    Rotate { delta_degrees: f64 },
}

impl InputEvent {
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            InputEvent::Tap { position } => Some(*position),
            InputEvent::Rotate { .. } => None,
        }
    }
}

/// Observable events emitted by the core
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Camera center or zoom changed
    ViewChanged { center: GeoPoint, zoom: f64 },
    /// Map rotation changed
    Rotated { orientation: f64 },
    OverlayAdded { rank: Rank, kind: OverlayKind },
    OverlayRemoved { rank: Rank, kind: OverlayKind },
    /// A path was tapped; carries the number of points it holds
    PathTapped { rank: Rank, point_count: usize },
    MarkerTapped { rank: Rank, title: String },
    PermissionChanged {
        permission: String,
        status: PermissionStatus,
    },
    /// New position fix applied to the location indicator
    LocationFix { position: GeoPoint },
}

impl MapEvent {
    /// Listener key for this event
    pub fn kind(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::Rotated { .. } => "rotated",
            MapEvent::OverlayAdded { .. } => "overlayadd",
            MapEvent::OverlayRemoved { .. } => "overlayremove",
            MapEvent::PathTapped { .. } => "pathtap",
            MapEvent::MarkerTapped { .. } => "markertap",
            MapEvent::PermissionChanged { .. } => "permission",
            MapEvent::LocationFix { .. } => "locationfix",
        }
    }

    /// Text for a user-visible notification, if this event warrants one
    pub fn notification(&self) -> Option<String> {
        match self {
            MapEvent::PathTapped { point_count, .. } => {
                Some(format!("polyline with {}pts was tapped", point_count))
            }
            MapEvent::MarkerTapped { title, .. } => Some(title.clone()),
            _ => None,
        }
    }
}
