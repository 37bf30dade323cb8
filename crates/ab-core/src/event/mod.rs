//! Lifecycle events emitted by the host application object.
//!
//! Event names are open: the constants below are the names the host is known
//! to emit, but any other name is delivered unchanged.

mod names;

pub use names::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named notification with an ordered, opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub payload: Vec<Value>,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Event without payload values.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_ready(&self) -> bool {
        self.name == READY
    }

    /// Whether the name is one the host is documented to emit.
    pub fn is_known(&self) -> bool {
        KNOWN_EVENTS.contains(&self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ready_event_is_recognised() {
        assert!(Event::bare(READY).is_ready());
        assert!(!Event::bare(WILL_QUIT).is_ready());
    }

    #[test]
    fn unknown_names_are_still_valid_events() {
        let event = Event::new("plugin-installed", vec![json!("x")]);
        assert!(!event.is_known());
        assert_eq!(event.name, "plugin-installed");
        assert_eq!(event.payload, vec![json!("x")]);
    }
}
