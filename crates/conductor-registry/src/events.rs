//! Change-event bus.
//!
//! The bus provides a lightweight publish/subscribe channel built on top of
//! [`tokio::sync::broadcast`].  The registry publishes a [`ChangeEvent`] on
//! every task mutation, and the coordinator publishes session transitions on
//! the same bus, so downstream consumers (UIs, loggers, exporters) can react
//! to state changes without polling.
//!
//! Events are wrapped in [`Arc`] so that broadcasting to multiple
//! subscribers does not clone the payload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::task::TaskId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A state change observed somewhere in the orchestration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// A new task was registered.
    TaskCreated {
        task_id: TaskId,
        /// Title of the created task, for cheap display without a lookup.
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// An existing task was mutated.
    TaskUpdated {
        task_id: TaskId,
        /// New status as a string (e.g. "in_progress").
        status: String,
        timestamp: DateTime<Utc>,
    },

    /// The registry was administratively cleared.
    RegistryCleared { timestamp: DateTime<Utc> },

    /// A coordination session began.
    SessionStarted {
        /// The session anchor task.
        session_task_id: TaskId,
        timestamp: DateTime<Utc>,
    },

    /// The active coordination session ended.
    SessionStopped {
        session_task_id: TaskId,
        timestamp: DateTime<Utc>,
    },
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

/// Default broadcast channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Publish/subscribe bus backed by [`tokio::sync::broadcast`].
///
/// The bus is cheaply cloneable (`Arc`-backed) and `Send + Sync`.
/// Subscribers receive [`Arc<ChangeEvent>`] references.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    sender: broadcast::Sender<Arc<ChangeEvent>>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// A subscriber that falls behind by more than `capacity` events will
    /// observe a `Lagged` receive error indicating how many it missed.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(EventBusInner { sender }),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of receivers that will observe the event.  When
    /// nobody is subscribed the event is dropped; that is common during
    /// startup and not an error.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        match self.inner.sender.send(Arc::new(event)) {
            Ok(n) => {
                tracing::trace!(receivers = n, "change event published");
                n
            }
            Err(_) => 0,
        }
    }

    /// Create a new subscriber that will receive all future events.
    ///
    /// Events published *before* this call are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeEvent>> {
        self.inner.sender.subscribe()
    }

    /// Return the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let id = Uuid::now_v7();
        let receivers = bus.publish(ChangeEvent::TaskCreated {
            task_id: id,
            title: "demo".into(),
            timestamp: Utc::now(),
        });
        assert_eq!(receivers, 1);

        let event = rx.recv().await.expect("should receive event");
        match event.as_ref() {
            ChangeEvent::TaskCreated { task_id, title, .. } => {
                assert_eq!(*task_id, id);
                assert_eq!(title, "demo");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_ok() {
        let bus = EventBus::new(16);
        let receivers = bus.publish(ChangeEvent::RegistryCleared {
            timestamp: Utc::now(),
        });
        assert_eq!(receivers, 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_share_the_payload() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(ChangeEvent::RegistryCleared {
            timestamp: Utc::now(),
        });

        let e1 = rx1.recv().await.expect("rx1");
        let e2 = rx2.recv().await.expect("rx2");
        assert!(Arc::ptr_eq(&e1, &e2));
    }
}
