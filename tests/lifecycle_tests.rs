use mapstack::prelude::*;
use std::sync::{Arc, Mutex};

/// Lifecycle tests: sensor subscriptions across pause/resume and permission grants
#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    struct GrantNothing;

    impl PermissionSystem for GrantNothing {
        fn check(&self, _permission: &str) -> bool {
            false
        }

        fn request(&mut self, _permissions: &[String]) {}
    }

    /// Shared view of a fake provider, kept by the test after the provider moves
    #[derive(Default)]
    struct Probe {
        starts: usize,
        stops: usize,
        sink: Option<SensorSink>,
    }

    struct FakeSensor {
        kind: SensorKind,
        probe: Arc<Mutex<Probe>>,
    }

    impl SensorProvider for FakeSensor {
        fn kind(&self) -> SensorKind {
            self.kind
        }

        fn start(&mut self, sink: SensorSink) -> bool {
            let mut probe = self.probe.lock().unwrap();
            probe.starts += 1;
            probe.sink = Some(sink);
            true
        }

        fn stop(&mut self) {
            self.probe.lock().unwrap().stops += 1;
        }
    }

    fn sensor(kind: SensorKind) -> (Box<dyn SensorProvider>, Arc<Mutex<Probe>>) {
        let probe = Arc::new(Mutex::new(Probe::default()));
        (
            Box::new(FakeSensor {
                kind,
                probe: probe.clone(),
            }),
            probe,
        )
    }

    fn post(probe: &Arc<Mutex<Probe>>, event: SensorEvent) -> bool {
        let probe = probe.lock().unwrap();
        probe.sink.as_ref().map_or(false, |sink| sink.post(event))
    }

    fn fix(latitude: f64, longitude: f64) -> SensorEvent {
        SensorEvent::Position {
            latitude,
            longitude,
            heading: None,
        }
    }

    /// Routes library logging to the test output; `RUST_LOG=debug` shows it
    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn session_with(sensors: Vec<Box<dyn SensorProvider>>) -> MapSession {
        init_logger();
        let mut session = MapSession::new(Box::new(GrantNothing));
        for provider in sensors {
            session = session.with_sensor(provider);
        }
        session
            .on_create(
                MapConfig::default().with_screen_size(400.0, 400.0),
                &GeoEntityCatalog::default_scenario(),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_location_sensor_waits_for_grant() {
        println!("🧪 [TEST] Testing location subscription gating");

        let (provider, probe) = sensor(SensorKind::Location);
        let mut session = session_with(vec![provider]);
        session.on_resume();
        assert_eq!(probe.lock().unwrap().starts, 0);

        session.on_request_permissions_result(&["LOCATION"], &[PermissionResult::Granted]);
        assert_eq!(probe.lock().unwrap().starts, 1);

        assert!(post(&probe, fix(55.4331, 37.5563)));
        session.tick();
        let indicator = session
            .surface()
            .overlays()
            .and_then(OverlayStack::location_indicator)
            .unwrap();
        assert_eq!(indicator.fix(), Some(&GeoPoint::new(55.4331, 37.5563)));
        println!("✅ [TEST] Location gating test passed");
    }

    #[test]
    fn test_denied_location_stays_inert() {
        let (provider, probe) = sensor(SensorKind::Location);
        let mut session = session_with(vec![provider]);
        session.on_resume();
        session.on_request_permissions_result(&["LOCATION"], &[PermissionResult::Denied]);

        assert_eq!(probe.lock().unwrap().starts, 0);
        assert!(!session.surface().location_live());

        let mut context = RenderContext::new(400.0, 400.0);
        session.render(&mut context);
        assert!(!context
            .commands()
            .iter()
            .any(|command| matches!(command, DrawCommand::Location { .. })));
        assert!(session.surface().overlays().unwrap().location_indicator().is_some());
    }

    #[test]
    fn test_double_pause_and_resume_are_idempotent() {
        let (provider, probe) = sensor(SensorKind::Orientation);
        let mut session = session_with(vec![provider]);

        session.on_resume();
        session.on_resume();
        let active_once = session.surface().lifecycle().unwrap().active_count();
        assert_eq!(active_once, 1);
        assert_eq!(probe.lock().unwrap().starts, 1);

        session.on_pause();
        session.on_pause();
        assert_eq!(session.surface().lifecycle().unwrap().active_count(), 0);
        assert_eq!(probe.lock().unwrap().stops, 1);

        session.on_resume();
        assert_eq!(
            session.surface().lifecycle().unwrap().active_count(),
            active_once
        );
        assert_eq!(probe.lock().unwrap().starts, 2);
    }

    #[test]
    fn test_no_sensor_events_delivered_while_paused() {
        println!("🧪 [TEST] Testing sensor delivery across pause");

        let (provider, probe) = sensor(SensorKind::Orientation);
        let mut session = session_with(vec![provider]);
        session.on_resume();

        post(&probe, SensorEvent::Heading { degrees: 90.0 });
        session.on_pause();
        post(&probe, SensorEvent::Heading { degrees: 180.0 });
        session.tick();

        let mut context = RenderContext::new(400.0, 400.0);
        session.render(&mut context);
        assert!(!context
            .commands()
            .iter()
            .any(|command| matches!(command, DrawCommand::Compass { .. })));
        assert_eq!(session.surface().lifecycle().unwrap().discarded(), 2);

        session.on_resume();
        post(&probe, SensorEvent::Heading { degrees: 270.0 });
        assert!(session.tick());
        session.render(&mut context);
        let bearing = context.commands().iter().find_map(|command| match command {
            DrawCommand::Compass { bearing, .. } => Some(*bearing),
            _ => None,
        });
        assert_eq!(bearing, Some(270.0));
        println!("✅ [TEST] Pause delivery test passed");
    }

    #[test]
    fn test_compass_bearing_follows_map_rotation() {
        let (provider, probe) = sensor(SensorKind::Orientation);
        let mut session = session_with(vec![provider]);
        session.on_resume();

        assert!(session.handle_input(InputEvent::Rotate { delta_degrees: 30.0 }));
        post(&probe, SensorEvent::Heading { degrees: 10.0 });
        session.tick();

        let mut context = RenderContext::new(400.0, 400.0);
        session.render(&mut context);
        let bearing = context.commands().iter().find_map(|command| match command {
            DrawCommand::Compass { bearing, .. } => Some(*bearing),
            _ => None,
        });
        assert_eq!(bearing, Some(340.0));
    }

    #[test]
    fn test_full_channel_drops_events() {
        init_logger();
        let (provider, probe) = sensor(SensorKind::Orientation);
        let mut session = MapSession::new(Box::new(GrantNothing)).with_sensor(provider);
        let config = MapConfig {
            sensor_channel_capacity: 2,
            ..MapConfig::default()
        };
        session
            .on_create(config, &GeoEntityCatalog::default())
            .unwrap();
        session.on_resume();

        assert!(post(&probe, SensorEvent::Heading { degrees: 1.0 }));
        assert!(post(&probe, SensorEvent::Heading { degrees: 2.0 }));
        assert!(!post(&probe, SensorEvent::Heading { degrees: 3.0 }));
    }

    #[test]
    fn test_invalid_fix_is_ignored() {
        let (provider, probe) = sensor(SensorKind::Location);
        let mut session = session_with(vec![provider]);
        session.on_resume();
        session.on_request_permissions_result(&["LOCATION"], &[PermissionResult::Granted]);
        session.tick();

        post(&probe, fix(123.0, 0.0));
        session.tick();
        assert!(session
            .surface()
            .overlays()
            .and_then(OverlayStack::location_indicator)
            .and_then(|indicator| indicator.fix())
            .is_none());
    }
}
