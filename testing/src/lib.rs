//! # Order Detail Testing
//!
//! Testing utilities and helpers for the order detail engine.
//!
//! This crate provides:
//! - Deterministic implementations of environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - One-call tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use order_detail_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(OrderDetailReducer::new())
//!     .with_env(test_environment(test_clock()))
//!     .given_state(OrderDetailState::new(identifier))
//!     .when_action(OrderDetailAction::RefreshRequested)
//!     .then_state(|state| assert!(state.snapshot.get_snapshot().is_refreshing.is_true()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use order_detail_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use order_detail_testing::mocks::FixedClock;
    /// use order_detail_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
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

/// Install a test-friendly tracing subscriber once per process
///
/// Honors `RUST_LOG`; output goes through the test harness writer so it is
/// only shown for failing tests. Later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
