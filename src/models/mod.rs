pub mod event;

pub use event::{Event, EventForm, EventView, NewEvent, Upload};
