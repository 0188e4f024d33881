//! # mapstack
//!
//! Overlay composition and runtime-permission gating for a tiled map view.
//!
//! The crate owns the camera, an ordered stack of overlays painted over the
//! basemap, the permission state machine that unlocks the current-location
//! overlay, and the lifecycle bridge that starts and stops sensor
//! subscriptions. Tile fetching, OS permission dialogs and sensors stay
//! outside; the host shell plugs them in through traits and calls the
//! [`MapSession`] entry points from its UI thread.

pub mod catalog;
pub mod core;
pub mod input;
pub mod overlays;
pub mod permissions;
pub mod prelude;
pub mod rendering;
pub mod sensors;
pub mod session;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use catalog::GeoEntityCatalog;

pub use crate::core::{
    camera::{CameraState, ZoomRange},
    config::{MapConfig, MemoryPreferences, PreferenceStore},
    geo::{GeoPoint, ScreenPoint, TileCoord},
    projection::{Projection, ScreenSize, WebMercator},
    surface::MapSurface,
};

pub use overlays::{HitResult, OverlayEntry, OverlayKind, OverlayStack, OverlayTrait, Rank};

pub use permissions::{PermissionGate, PermissionResult, PermissionStatus, PermissionSystem};

pub use sensors::{LifecycleBridge, SensorEvent, SensorKind, SensorProvider, SensorSink};

pub use input::{events::InputEvent, events::MapEvent, handler::EventManager};

pub use rendering::context::{DrawCommand, RenderContext};

pub use session::MapSession;

pub use tiles::source::{TileRequest, TileSource, TileSourceFactory};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Setup calls made out of order or twice
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown tile source: {0}")]
    UnknownTileSource(String),

    /// The OS answered a batched request with fewer results than ids
    #[error("Permission result mismatch: requested {requested}, received {received}")]
    PermissionResultMismatch { requested: usize, received: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = MapError;
