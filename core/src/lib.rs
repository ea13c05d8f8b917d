//! # Todo Pubsub Core
//!
//! Core types and traits for the todo-pubsub demo.
//!
//! This crate provides the pieces every other crate in the workspace builds on:
//!
//! - **Todo**: the flat four-field record and its validated patch
//! - **Events**: the domain events containers exchange (`todo:added`, ...)
//! - **Event bus**: an in-process, synchronous publish/subscribe register
//! - **Api**: the asynchronous record store contract (list, create, update, delete)
//! - **Environment**: injected dependencies (clock, identifier generator)
//!
//! ## Data Flow
//!
//! ```text
//! user action → view callback → container method → TodoApi call (async)
//!     → container state update → EventBus::publish
//!     → subscribed containers update their own state → views re-render
//! ```
//!
//! ## Example
//!
//! ```
//! use todo_pubsub_core::event_bus::EventBus;
//! use todo_pubsub_core::events::{TodoEvent, topics};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let bus: EventBus<TodoEvent> = EventBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! let _subscription = bus.subscribe(topics::TODOS_LOADED, move |_event| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.publish(&TodoEvent::Loaded { todos: vec![] });
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

pub mod api;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod todo;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub use api::{ApiFuture, DeleteAck, TodoApi};
pub use error::{ApiError, ValidationError};
pub use event_bus::{EventBus, Subscription, SubscriptionId, Topic};
pub use events::{TodoBus, TodoEvent};
pub use todo::{MAX_TEXT_CHARS, Todo, TodoId, TodoPatch, validate_text};

/// Environment module - Dependency injection traits
///
/// Everything a record store needs from the outside world is abstracted
/// behind a trait here, so tests can pin time and identifiers.
pub mod environment {
    use crate::todo::TodoId;
    use chrono::{DateTime, Utc};
    use rand::Rng;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use todo_pubsub_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh todo identifiers.
    ///
    /// Implementations must never hand out the same value twice from one
    /// instance. Uniqueness across independent instances is enforced by the
    /// record store, which re-draws on collision with the persisted collection.
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier
        fn next_id(&self) -> TodoId;
    }

    /// Largest identifier a JSON reader can hold without losing precision (2^53 - 1).
    pub const MAX_SAFE_ID: u64 = (1 << 53) - 1;

    /// Random identifiers in `1..=MAX_SAFE_ID`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIdGenerator;

    impl IdGenerator for RandomIdGenerator {
        fn next_id(&self) -> TodoId {
            TodoId::new(rand::thread_rng().gen_range(1..=MAX_SAFE_ID))
        }
    }

    /// Atomically incremented identifiers starting at a given value.
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first identifier is `start`
        #[must_use]
        pub const fn starting_at(start: u64) -> Self {
            Self {
                next: AtomicU64::new(start),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::starting_at(1)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> TodoId {
            TodoId::new(self.next.fetch_add(1, Ordering::Relaxed))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn sequential_ids_increment() {
            let ids = SequentialIdGenerator::starting_at(7);
            assert_eq!(ids.next_id(), TodoId::new(7));
            assert_eq!(ids.next_id(), TodoId::new(8));
        }

        #[test]
        fn random_ids_stay_json_safe() {
            let ids = RandomIdGenerator;
            let drawn: HashSet<TodoId> = (0..1_000).map(|_| ids.next_id()).collect();
            assert!(drawn.iter().all(|id| (1..=MAX_SAFE_ID).contains(&id.get())));
            // 1000 draws from 2^53 values; a collision here means the generator is broken
            assert_eq!(drawn.len(), 1_000);
        }
    }
}
