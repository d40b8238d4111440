pub mod document;
pub mod element;
pub mod event;
pub mod focus;

pub use document::{Document, NodeId};
pub use element::{find_element, Element};
pub use event::{EventType, ListenerId, ParseEventTypeError};
pub use focus::FocusState;
