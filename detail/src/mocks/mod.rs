//! Mock port implementations for testing.
//!
//! In-memory stand-ins for the repository and the connectivity check, used by
//! the integration tests and the demo binary.

pub mod network;
pub mod repository;

pub use network::MockNetworkStatus;
pub use repository::{MockOrderDetailRepository, RepositoryCall};
