use crate::{
    core::{
        camera::{CameraState, ZoomRange},
        config::MapConfig,
        geo::{GeoPoint, ScreenPoint, TileCoord},
        projection::{Projection, ScreenSize, WebMercator},
    },
    input::{
        events::{InputEvent, MapEvent},
        handler::EventManager,
    },
    overlays::{
        base::{FrameContext, OverlayEntry, Rank},
        stack::OverlayStack,
    },
    rendering::context::{DrawCommand, RenderContext},
    sensors::{
        lifecycle::LifecycleBridge,
        provider::{SensorEvent, SensorKind, SensorProvider},
    },
    tiles::source::{TileRequest, TileSource, TileSourceFactory},
    MapError, Result,
};

/// The map view: camera, tile source and the overlay stack painted over it.
///
/// A surface starts unconfigured. `configure` must run exactly once before an
/// overlay stack can be attached; camera changes made before then are ignored.
pub struct MapSurface {
    config: MapConfig,
    tile_source: Option<Box<dyn TileSource>>,
    camera: CameraState,
    zoom_range: ZoomRange,
    stack: Option<OverlayStack>,
    projection: Box<dyn Projection>,
    /// The projection is the built-in Web Mercator, rebuilt for the tile size on configure
    default_projection: bool,
    events: EventManager,
    lifecycle: Option<LifecycleBridge>,
    needs_redraw: bool,
}

impl MapSurface {
    pub fn new() -> Self {
        Self {
            default_projection: true,
            ..Self::with_projection(Box::new(WebMercator::default()))
        }
    }

    pub fn with_projection(projection: Box<dyn Projection>) -> Self {
        Self {
            config: MapConfig::default(),
            tile_source: None,
            camera: CameraState::default(),
            zoom_range: ZoomRange::default(),
            stack: None,
            projection,
            default_projection: false,
            events: EventManager::new(),
            lifecycle: None,
            needs_redraw: false,
        }
    }

    /// One-time setup: selects the tile source and places the camera
    pub fn configure(&mut self, config: MapConfig, camera: CameraState) -> Result<()> {
        if self.is_configured() {
            return Err(MapError::Configuration(
                "map surface is already configured".into(),
            ));
        }
        config.validate()?;

        let source = TileSourceFactory::from_id(&config.tile_source)?;
        self.zoom_range = source.zoom_range();
        self.camera = camera.clamped(&self.zoom_range);
        self.lifecycle = Some(LifecycleBridge::new(config.sensor_channel_capacity));
        if self.default_projection {
            // Overlays must land on the same pixel grid as the basemap tiles
            let tile_size = config.effective_tile_size(source.tile_size());
            self.projection = Box::new(WebMercator::new(tile_size));
        }

        log::info!(
            "map surface configured: source {}, zoom {:.2}, user agent {}",
            source.id(),
            self.camera.zoom_level,
            config.user_agent
        );
        self.tile_source = Some(source);
        self.config = config;
        self.needs_redraw = true;
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.tile_source.is_some()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    pub fn set_center(&mut self, center: GeoPoint) {
        if !self.is_configured() {
            log::debug!("ignoring set_center on unconfigured surface");
            return;
        }
        if !center.is_valid() {
            log::warn!(
                "{}",
                MapError::InvalidCoordinates(format!(
                    "({}, {})",
                    center.latitude(),
                    center.longitude()
                ))
            );
            return;
        }
        self.camera.center = center;
        self.view_changed();
    }

    /// Sets the zoom level, clamped to the tile source's range
    pub fn set_zoom(&mut self, level: f64) {
        if !self.is_configured() {
            log::debug!("ignoring set_zoom on unconfigured surface");
            return;
        }
        self.camera.zoom_level = self.zoom_range.clamp(level);
        self.view_changed();
    }

    /// Associates the one overlay stack this surface paints
    pub fn attach_overlay_stack(&mut self, stack: OverlayStack) -> Result<()> {
        if !self.is_configured() {
            return Err(MapError::Configuration(
                "overlay stack attached before the surface was configured".into(),
            ));
        }
        if self.stack.is_some() {
            return Err(MapError::Configuration(
                "an overlay stack is already attached".into(),
            ));
        }
        self.stack = Some(stack);
        self.needs_redraw = true;
        Ok(())
    }

    pub fn overlays(&self) -> Option<&OverlayStack> {
        self.stack.as_ref()
    }

    pub fn overlays_mut(&mut self) -> Option<&mut OverlayStack> {
        self.stack.as_mut()
    }

    pub fn append_overlay(&mut self, entry: OverlayEntry) -> Result<Rank> {
        let stack = self
            .stack
            .as_mut()
            .ok_or_else(|| MapError::Configuration("no overlay stack attached".into()))?;

        let kind = entry.kind();
        let rank = stack.append(entry);
        self.events.emit(MapEvent::OverlayAdded { rank, kind });
        self.needs_redraw = true;
        Ok(rank)
    }

    pub fn remove_overlay(&mut self, rank: Rank) -> Option<OverlayEntry> {
        let entry = self.stack.as_mut()?.remove(rank)?;
        self.events.emit(MapEvent::OverlayRemoved {
            rank,
            kind: entry.kind(),
        });
        self.needs_redraw = true;
        Some(entry)
    }

    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize::new(self.config.screen_width, self.config.screen_height)
    }

    /// Projection state for the current camera
    pub fn frame(&self) -> FrameContext<'_> {
        FrameContext::new(
            &self.camera,
            self.projection.as_ref(),
            self.screen_size(),
            self.config.density,
        )
    }

    /// Queues one frame: the basemap, then every enabled overlay in ascending rank
    pub fn render(&mut self, context: &mut RenderContext) {
        context.begin_frame();
        let Some(source) = self.tile_source.as_ref() else {
            return;
        };

        context.push(DrawCommand::Basemap {
            tile_source: source.id().to_string(),
            zoom: self.camera.zoom_level,
            tiles: self.visible_tiles(),
        });
        if let Some(stack) = &self.stack {
            stack.render(&self.frame(), context);
        }
        self.needs_redraw = false;
    }

    /// Offers a tap to the overlays, topmost first
    pub fn dispatch_click(&mut self, point: ScreenPoint) -> bool {
        let Some(stack) = self.stack.as_ref() else {
            return false;
        };
        let frame = FrameContext::new(
            &self.camera,
            self.projection.as_ref(),
            ScreenSize::new(self.config.screen_width, self.config.screen_height),
            self.config.density,
        );
        stack.dispatch_click(point, &frame, &mut self.events)
    }

    /// Rotates the map when a rotation gesture overlay accepts it
    pub fn dispatch_rotation(&mut self, delta_degrees: f64) -> bool {
        if !self.config.multi_touch_controls {
            return false;
        }
        let handled = self
            .stack
            .as_ref()
            .and_then(OverlayStack::rotation_handler)
            .is_some();
        if !handled || !delta_degrees.is_finite() {
            return false;
        }

        self.camera.rotate_by(delta_degrees);
        self.events.emit(MapEvent::Rotated {
            orientation: self.camera.orientation,
        });
        self.needs_redraw = true;
        true
    }

    pub fn handle_input(&mut self, input: InputEvent) -> bool {
        match input {
            InputEvent::Tap { position } => self.dispatch_click(position),
            InputEvent::Rotate { delta_degrees } => self.dispatch_rotation(delta_degrees),
        }
    }

    pub fn on_resume(&mut self) {
        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.resume();
            self.needs_redraw = true;
        }
    }

    pub fn on_pause(&mut self) {
        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.pause();
        }
    }

    /// Hands a sensor provider to the lifecycle bridge.
    ///
    /// Location providers stay idle until the location overlay goes live.
    pub fn register_sensor(&mut self, provider: Box<dyn SensorProvider>) -> Result<()> {
        let enabled = provider.kind() != SensorKind::Location || self.location_live();
        let lifecycle = self.lifecycle.as_mut().ok_or_else(|| {
            MapError::Configuration("sensor registered before the surface was configured".into())
        })?;
        lifecycle.register(provider, enabled);
        Ok(())
    }

    /// Switches the location overlay to its live subscription
    pub fn activate_location(&mut self) {
        match self.stack.as_mut().and_then(OverlayStack::location_indicator_mut) {
            Some(indicator) => indicator.activate(),
            None => log::warn!("location granted but no location overlay is attached"),
        }
        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.enable(SensorKind::Location);
        }
        self.needs_redraw = true;
    }

    pub fn location_live(&self) -> bool {
        self.stack
            .as_ref()
            .and_then(OverlayStack::location_indicator)
            .map_or(false, |indicator| indicator.is_live())
    }

    /// Applies the sensor events queued since the last call
    pub fn apply_sensor_events(&mut self) -> usize {
        let Some(lifecycle) = self.lifecycle.as_mut() else {
            return 0;
        };
        let events = lifecycle.drain();
        let count = events.len();
        for event in events {
            self.apply_sensor_event(event);
        }
        count
    }

    fn apply_sensor_event(&mut self, event: SensorEvent) {
        let Some(stack) = self.stack.as_mut() else {
            return;
        };
        match event {
            SensorEvent::Position {
                latitude,
                longitude,
                heading,
            } => {
                let position = GeoPoint::new(latitude, longitude);
                if !position.is_valid() {
                    log::warn!(
                        "{}",
                        MapError::InvalidCoordinates(format!("fix ({latitude}, {longitude})"))
                    );
                    return;
                }
                let applied = stack
                    .location_indicator_mut()
                    .map_or(false, |indicator| indicator.apply_fix(position.clone(), heading));
                if applied {
                    self.events.emit(MapEvent::LocationFix { position });
                    self.needs_redraw = true;
                }
            }
            SensorEvent::Heading { degrees } => {
                if let Some(compass) = stack.compass_mut() {
                    compass.set_heading(degrees);
                    self.needs_redraw = true;
                }
            }
        }
    }

    pub fn lifecycle(&self) -> Option<&LifecycleBridge> {
        self.lifecycle.as_ref()
    }

    pub fn tile_source(&self) -> Option<&dyn TileSource> {
        self.tile_source.as_deref()
    }

    pub fn attribution_text(&self) -> Option<&str> {
        self.tile_source.as_deref().map(|source| source.attribution())
    }

    /// Request the external tile provider should execute for `coord`
    pub fn tile_request(&self, coord: TileCoord) -> Result<TileRequest> {
        let source = self
            .tile_source
            .as_deref()
            .ok_or_else(|| MapError::Configuration("no tile source configured".into()))?;
        if !coord.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "tile {}/{}/{}",
                coord.z, coord.x, coord.y
            )));
        }
        Ok(TileRequest {
            coord,
            url: source.url(coord),
            user_agent: self.config.user_agent.clone(),
        })
    }

    /// Tiles covering the screen at the integer zoom below the camera zoom
    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        let Some(source) = self.tile_source.as_deref() else {
            return Vec::new();
        };

        let zoom = self.camera.zoom_level.floor().max(0.0);
        let z = zoom as u8;
        let tile_size = self.config.effective_tile_size(source.tile_size());
        let scale = 2_f64.powf(self.camera.zoom_level - zoom);

        let size = self.screen_size();
        let (half_w, half_h) = if self.camera.orientation == 0.0 {
            (size.width / 2.0, size.height / 2.0)
        } else {
            // A rotated screen can reach as far as its half diagonal
            let r = size.width.hypot(size.height) / 2.0;
            (r, r)
        };

        let center = WebMercator::new(tile_size).project(&self.camera.center, zoom);
        let max_index = 2_f64.powi(z as i32) - 1.0;
        let to_index = |pixel: f64| (pixel / tile_size).floor().clamp(0.0, max_index) as u32;

        let (x0, x1) = (
            to_index(center.x - half_w / scale),
            to_index(center.x + half_w / scale),
        );
        let (y0, y1) = (
            to_index(center.y - half_h / scale),
            to_index(center.y + half_h / scale),
        );

        let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                tiles.push(TileCoord::new(x, y, z));
            }
        }
        tiles
    }

    /// Register a listener for one event kind
    pub fn on<F>(&mut self, event_kind: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.events.on(event_kind, callback);
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    /// Deliver queued events to listeners and return them
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.process_events()
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Returns and clears the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    fn view_changed(&mut self) {
        self.events.emit(MapEvent::ViewChanged {
            center: self.camera.center.clone(),
            zoom: self.camera.zoom_level,
        });
        self.needs_redraw = true;
    }
}

impl Default for MapSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSurface")
            .field("tile_source", &self.tile_source)
            .field("camera", &self.camera)
            .field("stack", &self.stack)
            .field("lifecycle", &self.lifecycle)
            .field("needs_redraw", &self.needs_redraw)
            .finish()
    }
}
