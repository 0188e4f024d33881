use crate::sensors::provider::{SensorEvent, SensorKind, SensorProvider, SensorSink};
use crossbeam_channel::{bounded, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, never resumed
    Created,
    Resumed,
    Paused,
}

struct Subscription {
    provider: Box<dyn SensorProvider>,
    /// Allowed to run while resumed (e.g. permission granted)
    enabled: bool,
    /// Provider currently started
    active: bool,
}

/// Relays pause/resume to the sensor providers behind live overlays.
///
/// While paused no provider runs and every event still in flight is thrown
/// away, so nothing reaches the overlays until the matching resume. Repeated
/// pause or resume calls do nothing.
pub struct LifecycleBridge {
    state: LifecycleState,
    subscriptions: Vec<Subscription>,
    sender: Sender<SensorEvent>,
    receiver: Receiver<SensorEvent>,
    capacity: usize,
    discarded: u64,
}

impl LifecycleBridge {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            state: LifecycleState::Created,
            subscriptions: Vec::new(),
            sender,
            receiver,
            capacity,
            discarded: 0,
        }
    }

    /// Adds a provider; an enabled provider starts right away if resumed
    pub fn register(&mut self, provider: Box<dyn SensorProvider>, enabled: bool) {
        log::debug!(
            "registered {} provider (enabled: {})",
            provider.kind(),
            enabled
        );
        self.subscriptions.push(Subscription {
            provider,
            enabled,
            active: false,
        });
        if enabled && self.is_resumed() {
            let sender = self.sender.clone();
            if let Some(sub) = self.subscriptions.last_mut() {
                Self::start(sub, &sender);
            }
        }
    }

    /// Allows providers of `kind` to run, starting them now if resumed
    pub fn enable(&mut self, kind: SensorKind) {
        let resumed = self.is_resumed();
        for sub in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.provider.kind() == kind)
        {
            sub.enabled = true;
            if resumed && !sub.active {
                Self::start(sub, &self.sender);
            }
        }
    }

    pub fn disable(&mut self, kind: SensorKind) {
        for sub in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.provider.kind() == kind)
        {
            sub.enabled = false;
            Self::stop(sub);
        }
    }

    pub fn resume(&mut self) {
        if self.state == LifecycleState::Resumed {
            return;
        }
        self.state = LifecycleState::Resumed;
        for sub in self.subscriptions.iter_mut().filter(|s| s.enabled && !s.active) {
            Self::start(sub, &self.sender);
        }
        log::debug!("lifecycle resumed");
    }

    pub fn pause(&mut self) {
        if self.state != LifecycleState::Resumed {
            return;
        }
        self.state = LifecycleState::Paused;
        for sub in self.subscriptions.iter_mut() {
            Self::stop(sub);
        }
        let stale = self.receiver.try_iter().count();
        self.discarded += stale as u64;
        log::debug!("lifecycle paused, discarded {} in-flight sensor events", stale);
    }

    /// Takes the events queued since the last drain.
    ///
    /// Events arriving while not resumed, or from a provider that is no longer
    /// active, are discarded. At most one channel's worth is taken per call so
    /// a chatty provider cannot stall the loop.
    pub fn drain(&mut self) -> Vec<SensorEvent> {
        let resumed = self.is_resumed();
        let mut delivered = Vec::new();
        for event in self.receiver.try_iter().take(self.capacity) {
            if resumed && self.is_active(event.kind()) {
                delivered.push(event);
            } else {
                self.discarded += 1;
            }
        }
        delivered
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_resumed(&self) -> bool {
        self.state == LifecycleState::Resumed
    }

    /// Whether any provider of `kind` is currently started
    pub fn is_active(&self, kind: SensorKind) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.active && s.provider.kind() == kind)
    }

    pub fn active_count(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.active).count()
    }

    /// Events thrown away so far
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn start(sub: &mut Subscription, sender: &Sender<SensorEvent>) {
        let kind = sub.provider.kind();
        if sub.provider.start(SensorSink::new(sender.clone())) {
            sub.active = true;
            log::info!("{} sensor subscription started", kind);
        } else {
            log::warn!("{} sensor unavailable, overlay stays without data", kind);
        }
    }

    fn stop(sub: &mut Subscription) {
        if sub.active {
            sub.provider.stop();
            sub.active = false;
            log::info!("{} sensor subscription stopped", sub.provider.kind());
        }
    }
}

impl std::fmt::Debug for LifecycleBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleBridge")
            .field("state", &self.state)
            .field("subscriptions", &self.subscriptions.len())
            .field("active", &self.active_count())
            .field("discarded", &self.discarded)
            .finish()
    }
}
