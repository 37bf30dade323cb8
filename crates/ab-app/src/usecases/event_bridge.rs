//! Many-listener event bridge between the host emitter and in-process subscribers.
//!
//! Dispatch works on a snapshot of the listener sequence taken when the
//! emission starts. Handlers are therefore free to subscribe, unsubscribe or
//! emit again from inside a handler: the live sequence is never iterated
//! while handlers run, and the registry lock is never held across a call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ab_core::{Event, ListenerId};
use tracing::{debug, error};

/// Handler invoked for every emission of the event it is subscribed to.
///
/// Returning `Err` marks the handler as failed for that emission only.
pub type EventHandler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Identity of one subscription, returned by [`EventBridge::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Listener {
    id: ListenerId,
    event: String,
}

impl Listener {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event
    }
}

/// Outcome of one emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers invoked, including failed ones.
    pub invoked: usize,
    pub failed: usize,
}

#[derive(Clone)]
struct Registration {
    id: ListenerId,
    handler: EventHandler,
    once: bool,
}

#[derive(Default)]
pub struct EventBridge {
    listeners: Mutex<HashMap<String, Vec<Registration>>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the sequence for `event`. Never fails, whatever the name.
    pub fn subscribe<F>(&self, event: &str, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(event, Arc::new(handler), false)
    }

    /// Like [`subscribe`](Self::subscribe), but the registration is removed
    /// from the live sequence as soon as an emission picks it up.
    pub fn subscribe_once<F>(&self, event: &str, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(event, Arc::new(handler), true)
    }

    /// Subscribe an already shared handler.
    pub fn subscribe_handler(&self, event: &str, handler: EventHandler) -> Listener {
        self.register(event, handler, false)
    }

    fn register(&self, event: &str, handler: EventHandler, once: bool) -> Listener {
        let id = ListenerId::next();
        self.registry()
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, handler, once });
        debug!(event, listener = %id, once, "Listener subscribed");
        Listener {
            id,
            event: event.to_string(),
        }
    }

    /// Remove the registration identified by `listener`.
    ///
    /// Returns `false` when it was already gone; calling this twice has the
    /// same effect as calling it once.
    pub fn unsubscribe(&self, listener: &Listener) -> bool {
        let mut registry = self.registry();
        let Some(sequence) = registry.get_mut(&listener.event) else {
            return false;
        };
        let Some(index) = sequence.iter().position(|r| r.id == listener.id) else {
            return false;
        };
        sequence.remove(index);
        if sequence.is_empty() {
            registry.remove(&listener.event);
        }
        debug!(event = %listener.event, listener = %listener.id, "Listener unsubscribed");
        true
    }

    /// Drop every registration for `event`, returning how many were removed.
    pub fn remove_all_listeners(&self, event: &str) -> usize {
        self.registry()
            .remove(event)
            .map(|sequence| sequence.len())
            .unwrap_or(0)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.registry().get(event).map(Vec::len).unwrap_or(0)
    }

    /// Names with at least one registration, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry().keys().cloned().collect();
        names.sort();
        names
    }

    /// Deliver `event` to the listeners registered for its name.
    ///
    /// Handler failures are logged and isolated; they never stop the
    /// remaining handlers and never reach the emitter.
    pub fn emit(&self, event: &Event) -> EmitReport {
        let snapshot = self.snapshot(&event.name);
        let mut report = EmitReport::default();

        for registration in snapshot {
            report.invoked += 1;
            if let Err(err) = (registration.handler)(event) {
                report.failed += 1;
                error!(
                    event = %event.name,
                    listener = %registration.id,
                    error = %err,
                    "Listener failed"
                );
            }
        }

        debug!(
            event = %event.name,
            invoked = report.invoked,
            failed = report.failed,
            "Event dispatched"
        );
        report
    }

    fn snapshot(&self, event: &str) -> Vec<Registration> {
        let mut registry = self.registry();
        let Some(sequence) = registry.get_mut(event) else {
            return Vec::new();
        };
        let snapshot = sequence.clone();
        sequence.retain(|r| !r.once);
        if sequence.is_empty() {
            registry.remove(event);
        }
        snapshot
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<String, Vec<Registration>>> {
        // A panicking handler never holds this lock, so poisoning only means
        // a panic elsewhere; the map itself is still consistent.
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> EventHandler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |tag: &str| -> EventHandler {
                let log = log.clone();
                let tag = tag.to_string();
                Arc::new(move |_event: &Event| -> anyhow::Result<()> {
                    log.lock().unwrap().push(tag.clone());
                    Ok(())
                })
            }
        };
        (log, make)
    }

    #[test]
    fn dispatch_follows_subscription_order() {
        let bridge = EventBridge::new();
        let (log, make) = recorder();
        bridge.subscribe_handler("ready", make("a"));
        bridge.subscribe_handler("ready", make("b"));
        bridge.subscribe_handler("ready", make("c"));

        let report = bridge.emit(&Event::bare("ready"));

        assert_eq!(report, EmitReport { invoked: 3, failed: 0 });
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_handlers_get_distinct_listeners() {
        let bridge = EventBridge::new();
        let (log, make) = recorder();
        let handler = make("dup");
        let first = bridge.subscribe_handler("quit", handler.clone());
        let second = bridge.subscribe_handler("quit", handler);
        assert_ne!(first, second);

        bridge.emit(&Event::bare("quit"));
        assert_eq!(log.lock().unwrap().len(), 2);

        assert!(bridge.unsubscribe(&first));
        bridge.emit(&Event::bare("quit"));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn unsubscribe_twice_is_a_no_op() {
        let bridge = EventBridge::new();
        let listener = bridge.subscribe("activate", |_| Ok(()));
        let other = bridge.subscribe("activate", |_| Ok(()));

        assert!(bridge.unsubscribe(&listener));
        assert!(!bridge.unsubscribe(&listener));
        assert_eq!(bridge.listener_count("activate"), 1);
        assert!(bridge.unsubscribe(&other));
        assert_eq!(bridge.listener_count("activate"), 0);
        assert!(bridge.event_names().is_empty());
    }

    #[test]
    fn failing_handler_does_not_stop_the_rest() {
        let bridge = EventBridge::new();
        let (log, make) = recorder();
        bridge.subscribe_handler("will-quit", make("first"));
        bridge.subscribe("will-quit", |_| Err(anyhow::anyhow!("boom")));
        bridge.subscribe_handler("will-quit", make("last"));

        let report = bridge.emit(&Event::bare("will-quit"));

        assert_eq!(report, EmitReport { invoked: 3, failed: 1 });
        assert_eq!(*log.lock().unwrap(), vec!["first", "last"]);
    }

    #[test]
    fn unknown_event_names_are_delivered() {
        let bridge = EventBridge::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        bridge.subscribe("third-party-event", move |event| {
            *sink.lock().unwrap() = Some(event.payload.clone());
            Ok(())
        });

        bridge.emit(&Event::new("third-party-event", vec![json!(1), json!("two")]));

        assert_eq!(*seen.lock().unwrap(), Some(vec![json!(1), json!("two")]));
    }

    #[test]
    fn emit_without_listeners_reports_nothing() {
        let bridge = EventBridge::new();
        assert_eq!(bridge.emit(&Event::bare("ready")), EmitReport::default());
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let bridge = EventBridge::new();
        let (log, make) = recorder();
        let handler = make("once");
        bridge.subscribe_once("ready", move |event| handler(event));

        bridge.emit(&Event::bare("ready"));
        bridge.emit(&Event::bare("ready"));

        assert_eq!(*log.lock().unwrap(), vec!["once"]);
        assert_eq!(bridge.listener_count("ready"), 0);
    }

    #[test]
    fn remove_all_listeners_only_touches_one_name() {
        let bridge = EventBridge::new();
        bridge.subscribe("a", |_| Ok(()));
        bridge.subscribe("a", |_| Ok(()));
        bridge.subscribe("b", |_| Ok(()));

        assert_eq!(bridge.remove_all_listeners("a"), 2);
        assert_eq!(bridge.remove_all_listeners("a"), 0);
        assert_eq!(bridge.event_names(), vec!["b".to_string()]);
    }
}
