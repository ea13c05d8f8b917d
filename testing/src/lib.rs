//! # Todo Pubsub Testing
//!
//! Test doubles for the todo-pubsub workspace.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic time for the record store
//! - [`RecordingScreen`]: mount points whose views record every render
//! - [`ScriptedConfirm`]: a [`Confirm`](todo_pubsub_components::Confirm) that answers from a script
//! - [`FaultyApi`]: a [`TodoApi`](todo_pubsub_core::TodoApi) wrapper that fails on demand and counts calls
//!
//! ## Example
//!
//! ```ignore
//! use todo_pubsub_testing::{RecordingScreen, test_clock};
//!
//! #[tokio::test]
//! async fn header_counts_loaded_todos() {
//!     let screen = RecordingScreen::new();
//!     let header = HeaderContainer::new(&bus);
//!     header.init(&screen);
//!
//!     list.init(&screen).await;
//!     assert_eq!(screen.header().unwrap().total_todos, 2);
//! }
//! ```

use chrono::{DateTime, Utc};
use todo_pubsub_core::environment::Clock;

pub mod faults;
pub mod screen;

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_pubsub_testing::mocks::FixedClock;
    /// use todo_pubsub_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Route `tracing` output through the test harness.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

// Re-export commonly used items
pub use faults::{ApiOp, FaultyApi, ScriptedConfirm};
pub use mocks::{FixedClock, test_clock};
pub use screen::RecordingScreen;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
