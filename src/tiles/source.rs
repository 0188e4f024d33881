use crate::{
    core::{camera::ZoomRange, constants::TILE_SIZE, geo::TileCoord},
    MapError, Result,
};

/// Anything that can describe a remote tile set.
///
/// The core never downloads tiles; it only builds requests that the external
/// tile provider executes and caches.
pub trait TileSource: Send + Sync + std::fmt::Debug {
    /// Identifier the source is selected by, e.g. `"MAPNIK"`
    fn id(&self) -> &str;

    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    fn zoom_range(&self) -> ZoomRange;

    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }

    /// Copyright notice drawn by the attribution overlay
    fn attribution(&self) -> &str;
}

/// A single tile fetch handed to the tile provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub coord: TileCoord,
    pub url: String,
    pub user_agent: String,
}

/// OpenStreetMap standard (Mapnik) tiles
#[derive(Debug, Clone)]
pub struct OpenStreetMapSource {
    subdomains: Vec<&'static str>,
}

impl OpenStreetMapSource {
    pub const ID: &'static str = "MAPNIK";

    pub fn new() -> Self {
        Self {
            subdomains: vec!["a", "b", "c"],
        }
    }
}

impl Default for OpenStreetMapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OpenStreetMapSource {
    fn id(&self) -> &str {
        Self::ID
    }

    fn url(&self, coord: TileCoord) -> String {
        if self.subdomains.is_empty() {
            return format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                coord.z, coord.x, coord.y
            );
        }

        let idx = ((coord.x as u64 + coord.y as u64) % self.subdomains.len() as u64) as usize;
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            self.subdomains[idx], coord.z, coord.x, coord.y
        )
    }

    fn zoom_range(&self) -> ZoomRange {
        ZoomRange::new(0.0, 19.0)
    }

    fn attribution(&self) -> &str {
        "© OpenStreetMap contributors"
    }
}

/// Resolves tile source identifiers
pub struct TileSourceFactory;

impl TileSourceFactory {
    pub fn from_id(id: &str) -> Result<Box<dyn TileSource>> {
        match id.trim().to_ascii_uppercase().as_str() {
            OpenStreetMapSource::ID => Ok(Box::new(OpenStreetMapSource::new())),
            _ => Err(MapError::UnknownTileSource(id.to_string())),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &[OpenStreetMapSource::ID]
    }
}
