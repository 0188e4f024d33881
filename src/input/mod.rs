pub mod events;
pub mod handler;

pub use events::{InputEvent, MapEvent};
pub use handler::{EventCallback, EventManager};
