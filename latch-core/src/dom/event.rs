//! Events and listeners.
//!
//! A listener is a callback registered on one node for one event name.
//! Dispatch runs the node's matching listeners in registration order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::node::Node;

/// Unique identifier for a registered listener.
///
/// Returned by [`Node::add_event_listener`] and used to remove the listener
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// An event delivered to listeners.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    target: Node,
}

impl Event {
    pub fn new(kind: impl Into<String>, target: Node) -> Self {
        Self {
            kind: kind.into(),
            target,
        }
    }

    /// The event name, e.g. `"click"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> &Node {
        &self.target
    }
}

/// Callback type stored for each listener.
pub type ListenerFn = Arc<dyn Fn(&Event) + Send + Sync>;

/// A callback registered for one event name.
pub(crate) struct Listener {
    id: ListenerId,
    event: String,
    callback: ListenerFn,
}

impl Listener {
    pub(crate) fn new(event: String, callback: ListenerFn) -> Self {
        Self {
            id: ListenerId::new(),
            event,
            callback,
        }
    }

    pub(crate) fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether this listener handles events named `kind`.
    pub(crate) fn handles(&self, kind: &str) -> bool {
        self.event == kind
    }

    pub(crate) fn callback(&self) -> ListenerFn {
        Arc::clone(&self.callback)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("event", &self.event)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
