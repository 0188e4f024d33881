use crate::{input::events::MapEvent, prelude::HashMap};
use std::collections::VecDeque;

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Listener registry plus a queue of events waiting for the next tick
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event kind
    listeners: HashMap<String, Vec<EventCallback>>,
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind (see [`MapEvent::kind`])
    pub fn on<F>(&mut self, event_kind: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_kind.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Queue an event
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Deliver queued events to listeners in emission order and return them
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.kind()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Queued events, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &MapEvent> {
        self.event_queue.iter()
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.len())
            .field("event_queue", &self.event_queue)
            .finish()
    }
}
