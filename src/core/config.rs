//! Surface configuration
//!
//! `MapConfig` is built once at startup, usually from the host's persisted
//! preferences, and handed to `MapSurface::configure`. Nothing here is global:
//! the tile cache path and HTTP user agent travel with the config value.

use crate::{
    core::{
        camera::CameraState,
        constants::{DEFAULT_TILE_SOURCE, SENSOR_CHANNEL_CAPACITY},
    },
    prelude::HashMap,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Preference keys read by [`MapConfig::load`]
pub mod keys {
    pub const TILE_SOURCE: &str = "tile_source";
    pub const USER_AGENT: &str = "user_agent";
    pub const CACHE_PATH: &str = "cache_path";
    pub const CAMERA: &str = "camera";
}

/// External persisted key-value store owned by the host application
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory preference store
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Identifier of the tile source, e.g. `"MAPNIK"`
    pub tile_source: String,
    /// User agent the tile provider must send; OSM servers ban anonymous clients
    pub user_agent: String,
    /// Writable directory for the tile cache
    pub cache_path: Option<PathBuf>,
    pub screen_width: f64,
    pub screen_height: f64,
    /// Display density multiplier applied to pixel sizes
    pub density: f64,
    pub tiles_scaled_to_dpi: bool,
    /// Enables pinch zoom and rotation gestures
    pub multi_touch_controls: bool,
    pub sensor_channel_capacity: usize,
    /// Camera restored from a previous session
    pub saved_camera: Option<CameraState>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_source: DEFAULT_TILE_SOURCE.to_string(),
            user_agent: format!("mapstack/{}", env!("CARGO_PKG_VERSION")),
            cache_path: None,
            screen_width: 1080.0,
            screen_height: 1920.0,
            density: 1.0,
            tiles_scaled_to_dpi: true,
            multi_touch_controls: true,
            sensor_channel_capacity: SENSOR_CHANNEL_CAPACITY,
            saved_camera: None,
        }
    }
}

impl MapConfig {
    /// Reads the persisted keys once; anything missing keeps its default
    pub fn load(store: &dyn PreferenceStore) -> Result<Self> {
        let mut config = Self::default();

        if let Some(tile_source) = store.get(keys::TILE_SOURCE) {
            config.tile_source = tile_source;
        }
        if let Some(user_agent) = store.get(keys::USER_AGENT) {
            config.user_agent = user_agent;
        }
        if let Some(cache_path) = store.get(keys::CACHE_PATH) {
            config.cache_path = Some(PathBuf::from(cache_path));
        }
        if let Some(camera) = store.get(keys::CAMERA) {
            config.saved_camera = Some(serde_json::from_str(&camera)?);
        }

        log::debug!(
            "loaded map config: tile source {}, user agent {}",
            config.tile_source,
            config.user_agent
        );
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_screen_size(mut self, width: f64, height: f64) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_source.trim().is_empty() {
            return Err(MapError::Configuration("tile source id is empty".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(MapError::Configuration("user agent is empty".into()));
        }
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            return Err(MapError::Configuration(format!(
                "screen size must be positive, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if !(self.density > 0.0) {
            return Err(MapError::Configuration(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        if self.sensor_channel_capacity == 0 {
            return Err(MapError::Configuration(
                "sensor channel capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Tile edge in screen pixels
    pub fn effective_tile_size(&self, tile_size: u32) -> f64 {
        if self.tiles_scaled_to_dpi {
            tile_size as f64 * self.density
        } else {
            tile_size as f64
        }
    }
}
