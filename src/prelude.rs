//! Prelude module for common mapstack types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapstack::prelude::*;`

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use crate::core::{
    camera::{CameraState, ZoomRange},
    config::{MapConfig, MemoryPreferences, PreferenceStore},
    geo::{GeoPoint, ScreenPoint, ScreenRect, TileCoord},
    projection::{Projection, ScreenSize, WebMercator},
    surface::MapSurface,
};

pub use crate::overlays::{
    FrameContext, HitResult, MarkerOverlay, OverlayEntry, OverlayKind, OverlayStack,
    OverlayTrait, PathOverlay, Rank,
};

pub use crate::permissions::{
    PermissionGate, PermissionResult, PermissionStatus, PermissionSystem, PermissionTransition,
};

pub use crate::sensors::{LifecycleBridge, SensorEvent, SensorKind, SensorProvider, SensorSink};

pub use crate::input::{
    events::{InputEvent, MapEvent},
    handler::EventManager,
};

pub use crate::rendering::context::{DrawCommand, RenderContext};

pub use crate::tiles::source::{TileRequest, TileSource, TileSourceFactory};

pub use crate::{catalog::GeoEntityCatalog, session::MapSession};

pub use crate::{Error as MapError, Result};
