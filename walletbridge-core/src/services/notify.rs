//! Notification bridge - fans the node's push channel out to listeners

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

pub use crate::ports::CONNECTION_CLOSED;
use crate::ports::{GatewayError, NotificationHandler};

/// A decoded push message
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    ConnectionClosed,
    Payload(JsonValue),
}

impl PushMessage {
    /// Decode a raw frame; the sentinel is recognised before JSON parsing
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        if raw == CONNECTION_CLOSED {
            return Ok(PushMessage::ConnectionClosed);
        }
        serde_json::from_str(raw).map(PushMessage::Payload)
    }
}

pub type MessageCallback = Arc<dyn Fn(&PushMessage) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&GatewayError) + Send + Sync>;

#[derive(Clone)]
struct Listener {
    on_message: MessageCallback,
    on_error: ErrorCallback,
}

/// Ordered listener registry fed by the gateway's single push channel
///
/// Listeners are only ever appended or cleared all at once. Delivery runs
/// on a snapshot of the list, so callbacks may subscribe or reset freely.
#[derive(Default)]
pub struct NotificationBridge {
    listeners: Mutex<Vec<Listener>>,
}

impl NotificationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Listener>> {
        // Listeners never run under the lock; a poisoned list is still whole.
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self) -> Vec<Listener> {
        self.lock().clone()
    }

    /// Register a message and an error callback; duplicates are allowed
    pub fn subscribe<M, E>(&self, on_message: M, on_error: E)
    where
        M: Fn(&PushMessage) + Send + Sync + 'static,
        E: Fn(&GatewayError) + Send + Sync + 'static,
    {
        self.lock().push(Listener {
            on_message: Arc::new(on_message),
            on_error: Arc::new(on_error),
        });
    }

    /// Register a message callback with a no-op error callback
    pub fn subscribe_messages<M>(&self, on_message: M)
    where
        M: Fn(&PushMessage) + Send + Sync + 'static,
    {
        self.subscribe(on_message, |_| {});
    }

    /// Drop every listener; the gateway subscription stays in place
    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver a raw frame to every listener in registration order
    pub fn dispatch(&self, raw: &str) {
        let message = match PushMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping malformed push message: {}", e);
                return;
            }
        };

        let listeners = self.snapshot();
        debug!(listeners = listeners.len(), "Delivering push message");
        for listener in listeners {
            (listener.on_message)(&message);
        }
    }

    /// Deliver a transport error to every listener in registration order
    pub fn dispatch_error(&self, error: &GatewayError) {
        for listener in self.snapshot() {
            (listener.on_error)(error);
        }
    }
}

impl NotificationHandler for NotificationBridge {
    fn on_message(&self, raw: &str) {
        self.dispatch(raw);
    }

    fn on_error(&self, error: &GatewayError) {
        self.dispatch_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&PushMessage) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |name: &str| -> Box<dyn Fn(&PushMessage) + Send + Sync> {
            let sink = Arc::clone(&sink);
            let name = name.to_string();
            Box::new(move |message: &PushMessage| {
                let entry = match message {
                    PushMessage::ConnectionClosed => format!("{}:closed", name),
                    PushMessage::Payload(value) => format!("{}:{}", name, value),
                };
                sink.lock().unwrap().push(entry);
            })
        };
        (log, make)
    }

    #[test]
    fn test_sentinel_is_not_json() {
        assert_eq!(
            PushMessage::decode("ConnectionClosed").unwrap(),
            PushMessage::ConnectionClosed
        );
        assert_eq!(
            PushMessage::decode(r#"{"tag":"NetworkDifficultyChanged"}"#).unwrap(),
            PushMessage::Payload(json!({ "tag": "NetworkDifficultyChanged" }))
        );
        assert!(PushMessage::decode("ConnectionClosed ").is_err());
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let bridge = NotificationBridge::new();
        let (log, make) = recorder();
        bridge.subscribe_messages(make("a"));
        bridge.subscribe_messages(make("b"));

        bridge.dispatch(r#"{"n":1}"#);
        bridge.dispatch(CONNECTION_CLOSED);

        assert_eq!(
            *log.lock().unwrap(),
            vec![r#"a:{"n":1}"#, r#"b:{"n":1}"#, "a:closed", "b:closed"]
        );
    }

    #[test]
    fn test_duplicate_subscription_delivers_twice() {
        let bridge = NotificationBridge::new();
        let (log, make) = recorder();
        let callback: Arc<dyn Fn(&PushMessage) + Send + Sync> = Arc::from(make("x"));
        let first = Arc::clone(&callback);
        let second = Arc::clone(&callback);
        bridge.subscribe_messages(move |m| first(m));
        bridge.subscribe_messages(move |m| second(m));

        bridge.dispatch("1");
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_reset_silences_listeners() {
        let bridge = NotificationBridge::new();
        let (log, make) = recorder();
        bridge.subscribe_messages(make("a"));
        bridge.reset();
        assert_eq!(bridge.listener_count(), 0);

        bridge.dispatch("true");
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let bridge = NotificationBridge::new();
        let (log, make) = recorder();
        bridge.subscribe_messages(make("a"));

        bridge.dispatch("{not json");
        bridge.dispatch("42");

        assert_eq!(*log.lock().unwrap(), vec!["a:42"]);
    }

    #[test]
    fn test_errors_reach_every_error_callback() {
        let bridge = NotificationBridge::new();
        let errors = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second"] {
            let errors = Arc::clone(&errors);
            bridge.subscribe(|_| {}, move |e: &GatewayError| {
                errors.lock().unwrap().push(format!("{}:{}", name, e));
            });
        }
        bridge.subscribe_messages(|_| {});

        bridge.dispatch_error(&GatewayError::new("socket reset"));
        assert_eq!(
            *errors.lock().unwrap(),
            vec!["first:socket reset", "second:socket reset"]
        );
    }

    #[test]
    fn test_callback_may_subscribe_during_delivery() {
        let bridge = Arc::new(NotificationBridge::new());
        let inner = Arc::clone(&bridge);
        bridge.subscribe_messages(move |_| inner.subscribe_messages(|_| {}));

        bridge.dispatch("null");
        assert_eq!(bridge.listener_count(), 2);
    }
}
