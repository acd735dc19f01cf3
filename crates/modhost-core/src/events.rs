//! Typed, synchronous event dispatch.
//!
//! Handlers are keyed by the event's type and run on the dispatching thread
//! in registration order.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::sink::{ConsoleColor, LogSink};

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Registry of event handlers.
#[derive(Default)]
pub struct EventManager {
    handlers: RwLock<HashMap<TypeId, Vec<Handler>>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events of type `E`.
    pub fn register<E, F>(&self, handler: F)
    where
        E: 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let erased: Handler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });
        self.handlers
            .write()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(erased);
    }

    /// Run every handler registered for `E`. Returns how many ran.
    pub fn dispatch<E: 'static>(&self, event: &E) -> usize {
        // Cloned out so handlers may register further handlers.
        let handlers = self
            .handlers
            .read()
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn handler_count<E: 'static>(&self) -> usize {
        self.handlers
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

/// Sends a message to every connected player.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, message: &str, duration: Duration);
}

/// The host's warhead has detonated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarheadDetonated;

pub const WARHEAD_LOG_MESSAGE: &str = "[modhost] The warhead has detonated! The end is coming!";
pub const WARHEAD_BROADCAST: &str = "The warhead has detonated. The round is over.";
pub const WARHEAD_BROADCAST_DURATION: Duration = Duration::from_secs(10);

/// Log and broadcast on every [`WarheadDetonated`].
pub fn register_warhead_handler(
    events: &EventManager,
    sink: Arc<dyn LogSink>,
    broadcaster: Arc<dyn Broadcaster>,
) {
    events.register::<WarheadDetonated, _>(move |_| {
        sink.log(WARHEAD_LOG_MESSAGE, ConsoleColor::DarkRed);
        broadcaster.broadcast(WARHEAD_BROADCAST, WARHEAD_BROADCAST_DURATION);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingBroadcaster {
        sent: Mutex<Vec<(String, Duration)>>,
    }

    impl Broadcaster for RecordingBroadcaster {
        fn broadcast(&self, message: &str, duration: Duration) {
            self.sent.lock().push((message.to_string(), duration));
        }
    }

    struct RoundStarted(u32);

    #[test]
    fn test_dispatch_by_type() {
        let events = EventManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        events.register::<RoundStarted, _>(move |e| s.lock().push(e.0));

        assert_eq!(events.dispatch(&RoundStarted(3)), 1);
        assert_eq!(events.dispatch(&WarheadDetonated), 0);
        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let events = EventManager::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let o = order.clone();
            events.register::<RoundStarted, _>(move |_| o.lock().push(i));
        }

        events.dispatch(&RoundStarted(0));
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(events.handler_count::<RoundStarted>(), 3);
    }

    #[test]
    fn test_warhead_handler() {
        let events = EventManager::new();
        let sink = Arc::new(MemorySink::new());
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        register_warhead_handler(&events, sink.clone(), broadcaster.clone());

        events.dispatch(&WarheadDetonated);

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].color, ConsoleColor::DarkRed);
        assert_eq!(
            *broadcaster.sent.lock(),
            vec![(WARHEAD_BROADCAST.to_string(), Duration::from_secs(10))]
        );
    }
}
