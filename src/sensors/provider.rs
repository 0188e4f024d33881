use crossbeam_channel::{Sender, TrySendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Position provider (GPS / network)
    Location,
    /// Orientation provider backing the compass
    Orientation,
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorKind::Location => write!(f, "location"),
            SensorKind::Orientation => write!(f, "orientation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Position {
        latitude: f64,
        longitude: f64,
        heading: Option<f64>,
    },
    Heading { degrees: f64 },
}

impl SensorEvent {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorEvent::Position { .. } => SensorKind::Location,
            SensorEvent::Heading { .. } => SensorKind::Orientation,
        }
    }
}

/// Sending half handed to a provider when it starts.
///
/// Never blocks: when the UI loop falls behind and the channel is full the
/// event is dropped.
#[derive(Debug, Clone)]
pub struct SensorSink {
    sender: Sender<SensorEvent>,
}

impl SensorSink {
    pub(crate) fn new(sender: Sender<SensorEvent>) -> Self {
        Self { sender }
    }

    /// Posts an event; returns `false` if it was dropped
    pub fn post(&self, event: SensorEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::debug!("sensor channel full, dropping {:?}", event.kind());
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// External location / orientation service
pub trait SensorProvider: Send {
    fn kind(&self) -> SensorKind;

    /// Begin delivering events to `sink`; `false` when the sensor is unavailable
    fn start(&mut self, sink: SensorSink) -> bool;

    /// Stop delivering events
    fn stop(&mut self);
}
