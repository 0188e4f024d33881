//! Overlays composited above the basemap and the stack that orders them

pub mod base;
pub mod macros;
pub mod marker;
pub mod path;
pub mod stack;
pub mod standard;

pub use base::{FrameContext, HitResult, OverlayEntry, OverlayKind, OverlayTrait, Rank};
pub use marker::MarkerOverlay;
pub use path::PathOverlay;
pub use stack::OverlayStack;
pub use standard::{Attribution, Compass, LocationIndicator, MiniMap, RotationGesture};
