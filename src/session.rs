//! Lifecycle entry points the host shell calls on the UI thread.
//!
//! A [`MapSession`] wires the surface, the overlay stack and the permission
//! gate together in the usual map screen startup order:
//!
//! 1. configure the surface and attach an empty overlay stack
//! 2. append the standard overlays (location, mini-map, attribution, compass,
//!    rotation gesture)
//! 3. move the camera to the saved view, or zoom 14.5 over the first point
//! 4. append catalog paths, then catalog markers
//! 5. request the missing runtime permissions in one batch
//!
//! Permission results, sensor events and taps arrive later and are applied on
//! the same thread through [`MapSession::on_request_permissions_result`],
//! [`MapSession::tick`] and [`MapSession::handle_input`].

use crate::{
    catalog::GeoEntityCatalog,
    core::{
        camera::CameraState, config::MapConfig, constants::DEFAULT_ZOOM, projection::Projection,
        surface::MapSurface,
    },
    input::events::{InputEvent, MapEvent},
    overlays::{base::OverlayEntry, stack::OverlayStack},
    permissions::gate::{
        PermissionGate, PermissionResult, PermissionStatus, PermissionSystem, PermissionTransition,
    },
    rendering::context::RenderContext,
    sensors::provider::SensorProvider,
    MapError, Result,
};

/// Permissions requested when the session is created
pub const STARTUP_PERMISSIONS: [&str; 2] = ["LOCATION", "WRITE_EXTERNAL_STORAGE"];

pub struct MapSession {
    surface: MapSurface,
    gate: PermissionGate,
    permissions: Box<dyn PermissionSystem>,
    /// Providers waiting for the surface to be configured
    pending_sensors: Vec<Box<dyn SensorProvider>>,
    notifications: Vec<String>,
    created: bool,
}

impl MapSession {
    pub fn new(permissions: Box<dyn PermissionSystem>) -> Self {
        Self {
            surface: MapSurface::new(),
            gate: PermissionGate::new(),
            permissions,
            pending_sensors: Vec::new(),
            notifications: Vec::new(),
            created: false,
        }
    }

    /// Replaces the projection; only meaningful before `on_create`
    pub fn with_projection(mut self, projection: Box<dyn Projection>) -> Self {
        self.surface = MapSurface::with_projection(projection);
        self
    }

    pub fn with_sensor(mut self, provider: Box<dyn SensorProvider>) -> Self {
        self.pending_sensors.push(provider);
        self
    }

    pub fn with_permission_gate(mut self, gate: PermissionGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn on_create(&mut self, config: MapConfig, catalog: &GeoEntityCatalog) -> Result<()> {
        if self.created {
            return Err(MapError::Configuration("session already created".into()));
        }

        let saved_camera = config.saved_camera.clone();
        let initial = saved_camera
            .clone()
            .unwrap_or_else(|| CameraState::new(Default::default(), DEFAULT_ZOOM));
        self.surface.configure(config, initial)?;
        self.surface.attach_overlay_stack(OverlayStack::new())?;

        let attribution = self.surface.attribution_text().unwrap_or_default().to_string();
        for entry in [
            OverlayEntry::location_indicator(),
            OverlayEntry::mini_map(),
            OverlayEntry::attribution(attribution),
            OverlayEntry::compass(),
            OverlayEntry::rotation_gesture(),
        ] {
            self.surface.append_overlay(entry)?;
        }

        match saved_camera {
            Some(camera) => log::info!("restored camera at zoom {:.2}", camera.zoom_level),
            None => {
                self.surface.set_zoom(DEFAULT_ZOOM);
                if let Some(point) = catalog.points().first() {
                    self.surface.set_center(point.unlabelled());
                }
            }
        }

        for entry in catalog.to_overlays() {
            self.surface.append_overlay(entry)?;
        }

        // A grant recorded before the stack existed had no indicator to activate
        if self.gate.location_granted() {
            self.surface.activate_location();
        }

        for provider in std::mem::take(&mut self.pending_sensors) {
            self.surface.register_sensor(provider)?;
        }

        self.created = true;
        self.request_permissions(&STARTUP_PERMISSIONS);
        Ok(())
    }

    pub fn on_resume(&mut self) {
        self.surface.on_resume();
    }

    pub fn on_pause(&mut self) {
        self.surface.on_pause();
    }

    /// Requests every id not yet granted; also the retry path after a denial
    pub fn request_permissions<S: AsRef<str>>(&mut self, permissions: &[S]) {
        let transitions = self
            .gate
            .request_missing(permissions, self.permissions.as_mut());
        self.apply_transitions(transitions);
    }

    /// OS callback carrying the result vector of a batched request
    pub fn on_request_permissions_result<S: AsRef<str>>(
        &mut self,
        permissions: &[S],
        results: &[PermissionResult],
    ) {
        let transitions = self.gate.on_permission_result(permissions, results);
        self.apply_transitions(transitions);
    }

    /// One pass of the UI loop: sensor events, then listeners.
    ///
    /// Returns whether the map needs to be redrawn.
    pub fn tick(&mut self) -> bool {
        let applied = self.surface.apply_sensor_events();
        if applied > 0 {
            log::trace!("applied {} sensor events", applied);
        }

        for event in self.surface.process_events() {
            if let Some(text) = event.notification() {
                log::info!("{}", text);
                self.notifications.push(text);
            }
        }
        self.surface.take_redraw()
    }

    pub fn render(&mut self, context: &mut RenderContext) {
        self.surface.render(context);
    }

    pub fn handle_input(&mut self, input: InputEvent) -> bool {
        self.surface.handle_input(input)
    }

    pub fn permission_status(&self, permission: &str) -> PermissionStatus {
        self.gate.current_status(permission)
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut MapSurface {
        &mut self.surface
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// User-visible messages produced since the last call
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    fn apply_transitions(&mut self, transitions: Vec<PermissionTransition>) {
        for transition in transitions {
            if transition.grants_location() {
                self.surface.activate_location();
            }
            self.surface
                .events_mut()
                .emit(MapEvent::PermissionChanged {
                    permission: transition.permission,
                    status: transition.to,
                });
        }
    }
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("surface", &self.surface)
            .field("gate", &self.gate)
            .field("pending_sensors", &self.pending_sensors.len())
            .field("created", &self.created)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlays::base::{OverlayKind, Rank};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSystem {
        requests: Arc<Mutex<Vec<Vec<String>>>>,
        /// Ids the OS reports as already granted
        granted: Arc<Mutex<Vec<String>>>,
    }

    impl PermissionSystem for RecordingSystem {
        fn check(&self, permission: &str) -> bool {
            self.granted.lock().unwrap().iter().any(|p| p == permission)
        }

        fn request(&mut self, permissions: &[String]) {
            self.requests.lock().unwrap().push(permissions.to_vec());
        }
    }

    fn created() -> (MapSession, RecordingSystem) {
        let system = RecordingSystem::default();
        let mut session = MapSession::new(Box::new(system.clone()));
        session
            .on_create(MapConfig::default(), &GeoEntityCatalog::default_scenario())
            .unwrap();
        (session, system)
    }

    #[test]
    fn test_startup_order() {
        let (session, _) = created();
        let stack = session.surface().overlays().unwrap();
        let kinds: Vec<_> = stack.iter().map(|(_, entry)| entry.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                OverlayKind::LocationIndicator,
                OverlayKind::MiniMap,
                OverlayKind::Attribution,
                OverlayKind::Compass,
                OverlayKind::RotationGesture,
                OverlayKind::Path,
                OverlayKind::Marker,
            ]
        );
        assert_eq!(stack.find(OverlayKind::Marker), Some(Rank::new(6)));

        let camera = session.surface().camera();
        assert_eq!(camera.zoom_level, DEFAULT_ZOOM);
        assert_eq!(camera.center.latitude(), 55.4331145);
    }

    #[test]
    fn test_startup_requests_permissions_once() {
        let (session, system) = created();
        assert_eq!(
            *system.requests.lock().unwrap(),
            vec![vec!["LOCATION".to_string(), "WRITE_EXTERNAL_STORAGE".to_string()]]
        );
        assert_eq!(
            session.permission_status("LOCATION"),
            PermissionStatus::Requested
        );
    }

    #[test]
    fn test_create_twice_fails() {
        let (mut session, _) = created();
        let err = session
            .on_create(MapConfig::default(), &GeoEntityCatalog::default())
            .unwrap_err();
        assert!(matches!(err, MapError::Configuration(_)));
    }

    #[test]
    fn test_saved_camera_wins_over_default_view() {
        let saved = CameraState::new(crate::core::geo::GeoPoint::new(48.0, 11.0), 9.0);
        let config = MapConfig {
            saved_camera: Some(saved.clone()),
            ..MapConfig::default()
        };
        let mut session = MapSession::new(Box::new(RecordingSystem::default()));
        session
            .on_create(config, &GeoEntityCatalog::default_scenario())
            .unwrap();
        assert_eq!(session.surface().camera(), &saved);
    }

    #[test]
    fn test_location_grant_goes_live() {
        let (mut session, _) = created();
        assert!(!session.surface().location_live());

        session.on_request_permissions_result(
            &STARTUP_PERMISSIONS,
            &[PermissionResult::Granted, PermissionResult::Denied],
        );
        assert!(session.surface().location_live());
        assert_eq!(
            session.permission_status("WRITE_EXTERNAL_STORAGE"),
            PermissionStatus::Denied
        );
        assert!(session.tick());
    }

    #[test]
    fn test_retry_after_denial_granted_in_settings_goes_live() {
        let (mut session, system) = created();
        session.on_request_permissions_result(&["LOCATION"], &[PermissionResult::Denied]);
        assert!(!session.surface().location_live());

        system.granted.lock().unwrap().push("LOCATION".into());
        session.request_permissions(&["LOCATION"]);

        assert_eq!(
            session.permission_status("LOCATION"),
            PermissionStatus::Granted
        );
        assert!(session.surface().location_live());
        assert_eq!(system.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_grant_before_create_is_applied_on_create() {
        let system = RecordingSystem::default();
        system.granted.lock().unwrap().push("LOCATION".into());
        let mut session = MapSession::new(Box::new(system.clone()));

        session.request_permissions(&["LOCATION"]);
        assert_eq!(
            session.permission_status("LOCATION"),
            PermissionStatus::Granted
        );
        assert!(!session.surface().location_live());

        session
            .on_create(MapConfig::default(), &GeoEntityCatalog::default_scenario())
            .unwrap();
        assert!(session.surface().location_live());
        assert_eq!(
            *system.requests.lock().unwrap(),
            vec![vec!["WRITE_EXTERNAL_STORAGE".to_string()]]
        );
    }
}
