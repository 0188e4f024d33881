use anyhow::Context;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use mapstack::{
    core::config::keys,
    prelude::*,
};
use std::{thread, time::Duration};

const TICK: Duration = Duration::from_millis(50);
const TICKS: usize = 40;

/// Headless shell: runs one map session against simulated OS services
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let preferences = MemoryPreferences::new()
        .with(keys::USER_AGENT, format!("mapstack-app/{}", env!("CARGO_PKG_VERSION")))
        .with(keys::CACHE_PATH, std::env::temp_dir().join("mapstack").display().to_string());
    let config = MapConfig::load(&preferences)
        .context("reading preferences")?
        .with_screen_size(1080.0, 1920.0)
        .with_density(2.0);

    let (permission_tx, permission_rx) = unbounded();
    let mut session = MapSession::new(Box::new(SimulatedPermissions { outbox: permission_tx }))
        .with_sensor(Box::new(SimulatedSensor::new(SensorKind::Location)))
        .with_sensor(Box::new(SimulatedSensor::new(SensorKind::Orientation)));

    session
        .on_create(config, &GeoEntityCatalog::default_scenario())
        .context("creating map session")?;
    session.surface_mut().on("locationfix", |event| {
        if let MapEvent::LocationFix { position } = event {
            log::info!("fix at {:.6}, {:.6}", position.latitude(), position.longitude());
        }
    });
    session.on_resume();

    let mut context = RenderContext::new(1080.0, 1920.0);
    for tick in 0..TICKS {
        answer_permission_requests(&mut session, &permission_rx);

        if session.tick() {
            session.render(&mut context);
            log::debug!(
                "frame {}: {} draw commands",
                context.frame(),
                context.commands().len()
            );
        }

        if tick == TICKS / 2 {
            let center = session.surface().screen_size().center();
            session.handle_input(InputEvent::Tap { position: center });
            session.handle_input(InputEvent::Rotate { delta_degrees: 15.0 });
        }
        thread::sleep(TICK);
    }

    for notification in session.take_notifications() {
        println!("{}", notification);
    }

    session.on_pause();
    session.on_pause();
    println!(
        "location {}, storage {}, {} sensor events discarded",
        session.permission_status("LOCATION"),
        session.permission_status("WRITE_EXTERNAL_STORAGE"),
        session.surface().lifecycle().map_or(0, LifecycleBridge::discarded)
    );
    Ok(())
}

/// Grants every request that arrived since the last tick
fn answer_permission_requests(session: &mut MapSession, requests: &Receiver<Vec<String>>) {
    for ids in requests.try_iter() {
        let results = vec![PermissionResult::Granted; ids.len()];
        session.on_request_permissions_result(&ids, &results);
    }
}

/// Answers asynchronously: requests are queued and resolved on a later tick
struct SimulatedPermissions {
    outbox: Sender<Vec<String>>,
}

impl PermissionSystem for SimulatedPermissions {
    fn check(&self, _permission: &str) -> bool {
        false
    }

    fn request(&mut self, permissions: &[String]) {
        if self.outbox.send(permissions.to_vec()).is_err() {
            log::warn!("permission dialog closed");
        }
    }
}

/// Walks north-east from the scenario point on a background thread.
///
/// `stop` drops the stop sender, which wakes the worker out of its wait at
/// once; the UI thread never joins it.
struct SimulatedSensor {
    kind: SensorKind,
    stop_signal: Option<Sender<()>>,
}

impl SimulatedSensor {
    fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            stop_signal: None,
        }
    }
}

impl SensorProvider for SimulatedSensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn start(&mut self, sink: SensorSink) -> bool {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        self.stop_signal = Some(stop_tx);
        let kind = self.kind;

        thread::spawn(move || {
            let mut step = 0.0_f64;
            loop {
                let event = match kind {
                    SensorKind::Location => SensorEvent::Position {
                        latitude: 55.4331145 + step * 1e-4,
                        longitude: 37.5562910 + step * 1e-4,
                        heading: Some(45.0),
                    },
                    SensorKind::Orientation => SensorEvent::Heading {
                        degrees: (step * 7.5) % 360.0,
                    },
                };
                sink.post(event);
                step += 1.0;

                match stop_rx.recv_timeout(TICK * 2) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::debug!("{} simulator stopped", kind);
        });
        true
    }

    fn stop(&mut self) {
        // Dropping the sender disconnects the worker's receiver
        self.stop_signal.take();
    }
}
