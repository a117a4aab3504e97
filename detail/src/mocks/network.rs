//! Switchable connectivity check.

use crate::environment::NetworkStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Mock network status
///
/// Cloning yields another handle to the same switch.
#[derive(Debug, Clone)]
pub struct MockNetworkStatus {
    connected: Arc<AtomicBool>,
}

impl MockNetworkStatus {
    /// A connected check
    #[must_use]
    pub fn online() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A disconnected check
    #[must_use]
    pub fn offline() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flip connectivity
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

impl Default for MockNetworkStatus {
    fn default() -> Self {
        Self::online()
    }
}

impl NetworkStatus for MockNetworkStatus {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
