//! Sensor plumbing: providers post events into a bounded channel that the
//! surface drains once per tick; the lifecycle bridge starts and stops them.

pub mod lifecycle;
pub mod provider;

pub use lifecycle::{LifecycleBridge, LifecycleState};
pub use provider::{SensorEvent, SensorKind, SensorProvider, SensorSink};
