//! Engine-wide defaults collected in one place.
//! Most values follow the osmdroid/OSM conventions the overlays imitate.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Hard zoom bounds for any tile source.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Tile source id used when nothing else is configured.
pub const DEFAULT_TILE_SOURCE: &str = "MAPNIK";

/// Marker icon default size (regular PNG).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Anchor fractions inside the marker icon.
pub const ANCHOR_CENTER: f64 = 0.5;
pub const ANCHOR_BOTTOM: f64 = 1.0;

/// Distance in pixels within which a tap counts as a hit on a path segment.
pub const PATH_HIT_TOLERANCE_PX: f64 = 12.0;

/// Mini-map is this fraction of the screen in each dimension.
pub const MINIMAP_SCREEN_DIVISOR: f64 = 5.0;

/// Padding between the mini-map and the screen edge.
pub const MINIMAP_PADDING_PX: f64 = 10.0;

/// How many zoom levels below the camera the mini-map renders.
pub const MINIMAP_ZOOM_DIFFERENCE: f64 = 3.0;

/// Compass rose center, before density scaling.
pub const COMPASS_CENTER_PX: (f64, f64) = (35.0, 35.0);

/// Attribution text offset from the bottom-left corner.
pub const ATTRIBUTION_OFFSET_PX: (f64, f64) = (10.0, 10.0);

/// Default capacity of the inbound sensor event channel.
pub const SENSOR_CHANNEL_CAPACITY: usize = 64;

/// Zoom the session opens at when no camera was saved.
pub const DEFAULT_ZOOM: f64 = 14.5;
