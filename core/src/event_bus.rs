//! In-process publish/subscribe register.
//!
//! An [`EventBus`] maps topic names to ordered lists of callbacks. Publishing
//! an event invokes every callback currently registered for the event's
//! topic, synchronously, in subscription order, on the publisher's stack.
//!
//! # Delivery
//!
//! - **Same tick**: `publish` returns after every callback has run
//! - **Ordered within a topic**: callbacks fire in the order they subscribed
//! - **No ordering across topics**, no persistence, no replay
//! - **Panics propagate**: a panicking callback unwinds into the publisher
//!
//! The registry lock is released before callbacks run, so a callback may
//! subscribe, unsubscribe, or publish to another topic. Publishing the same
//! topic from inside one of its own callbacks recurses without bound.
//!
//! # Example
//!
//! ```
//! use todo_pubsub_core::event_bus::{EventBus, Topic};
//! use std::sync::{Arc, Mutex};
//!
//! struct Ping(u32);
//!
//! impl Topic for Ping {
//!     fn topic(&self) -> &'static str {
//!         "ping"
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let first = Arc::clone(&log);
//! let subscription = bus.subscribe("ping", move |ping: &Ping| first.lock().unwrap().push(("first", ping.0)));
//! let second = Arc::clone(&log);
//! let _keep = bus.subscribe("ping", move |ping: &Ping| second.lock().unwrap().push(("second", ping.0)));
//!
//! assert_eq!(bus.publish(&Ping(1)), 2);
//! assert!(subscription.unsubscribe());
//! assert_eq!(bus.publish(&Ping(2)), 1);
//!
//! assert_eq!(*log.lock().unwrap(), vec![("first", 1), ("second", 1), ("second", 2)]);
//! ```

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Names the topic an event is published on.
///
/// Similar to an event type tag: every value of an event enum maps to one
/// stable topic string.
pub trait Topic {
    /// Topic this event is delivered to
    fn topic(&self) -> &'static str;
}

/// Identifies one registered callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Callbacks for one topic, in subscription order.
type Subscribers<E> = SmallVec<[(SubscriptionId, Callback<E>); 4]>;

struct Registry<E> {
    topics: HashMap<String, Subscribers<E>>,
    next_id: u64,
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    // Callbacks never run under the lock, so poisoning can only come from a
    // panic inside the registry's own bookkeeping; the map is still usable.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publish/subscribe register shared by every clone of the handle.
///
/// Construct one per application (or per test) and hand clones to the
/// components that need it.
pub struct EventBus<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> EventBus<E> {
    /// Creates an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                topics: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Registers `callback` for `topic`.
    ///
    /// The returned [`Subscription`] removes exactly this callback when
    /// [`Subscription::unsubscribe`] is called. Dropping it keeps the
    /// callback registered.
    pub fn subscribe<F>(&self, topic: &str, callback: F) -> Subscription<E>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry
            .topics
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(callback)));

        tracing::trace!(topic, subscription = id.0, "Subscribed");

        Subscription {
            id,
            topic: topic.to_string(),
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of callbacks currently registered for `topic`
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        lock(&self.registry)
            .topics
            .get(topic)
            .map_or(0, SmallVec::len)
    }
}

impl<E: Topic> EventBus<E> {
    /// Delivers `event` to every callback registered for its topic.
    ///
    /// Callbacks subscribed or unsubscribed while the event is being
    /// delivered do not affect this delivery. Returns the number of
    /// callbacks invoked; publishing to a topic nobody listens on is a no-op.
    pub fn publish(&self, event: &E) -> usize {
        let topic = event.topic();
        let callbacks: SmallVec<[Callback<E>; 4]> = lock(&self.registry)
            .topics
            .get(topic)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .map(|(_, callback)| Arc::clone(callback))
                    .collect()
            })
            .unwrap_or_default();

        tracing::trace!(topic, subscribers = callbacks.len(), "Publishing event");

        for callback in &callbacks {
            callback(event);
        }

        callbacks.len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        let mut topics: Vec<(&str, usize)> = registry
            .topics
            .iter()
            .map(|(topic, subscribers)| (topic.as_str(), subscribers.len()))
            .collect();
        topics.sort_unstable();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}

/// Capability to remove one callback from the bus it was registered on.
pub struct Subscription<E> {
    id: SubscriptionId,
    topic: String,
    registry: Weak<Mutex<Registry<E>>>,
}

impl<E> Subscription<E> {
    /// Identifier of the registered callback
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Topic the callback listens on
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Removes the callback.
    ///
    /// Returns `false` when the callback was already gone (the bus was
    /// dropped).
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let mut registry = lock(&registry);
        let Some(subscribers) = registry.topics.get_mut(&self.topic) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != self.id);
        let removed = subscribers.len() < before;
        if subscribers.is_empty() {
            registry.topics.remove(&self.topic);
        }

        tracing::trace!(topic = %self.topic, subscription = self.id.0, removed, "Unsubscribed");
        removed
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
