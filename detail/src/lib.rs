//! State orchestration and mutation engine behind one order detail screen.
//!
//! An [`OrderDetailViewModel`] loads an order and five related sections from
//! a local cache and a remote store, derives what the screen should show, and
//! applies user changes optimistically with rollback.
//!
//! # Architecture
//!
//! 1. **Snapshot** ([`snapshot`]): one observable view state, updated by patches
//! 2. **Sections** ([`sections`]): independently observable lists
//! 3. **Rules** ([`rules`]): products and trackings derived from order, refunds and labels
//! 4. **Reducer** ([`reducer`]): loading and mutations as actions and effects
//! 5. **Events** ([`events`]): one-shot notices, some with an undo prompt
//!
//! # Example Usage
//!
//! ```no_run
//! use order_detail::mocks::{MockNetworkStatus, MockOrderDetailRepository};
//! use order_detail::{OrderDetailConfig, OrderDetailDependencies, OrderDetailViewModel};
//! use order_detail::types::OrderIdentifier;
//! use order_detail_core::environment::SystemClock;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dependencies = OrderDetailDependencies {
//!     repository: Arc::new(MockOrderDetailRepository::new()),
//!     network: Arc::new(MockNetworkStatus::online()),
//!     clock: Arc::new(SystemClock),
//! };
//!
//! let view_model = OrderDetailViewModel::open(
//!     OrderIdentifier::new(1, 42),
//!     dependencies,
//!     &OrderDetailConfig::from_env(),
//! )
//! .await?;
//!
//! view_model.wait_for_idle(Duration::from_secs(1)).await?;
//! println!("{:?}", view_model.snapshot().toolbar_title);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod mocks;
pub mod reducer;
pub mod rules;
pub mod sections;
pub mod snapshot;
pub mod state;
pub mod types;
pub mod view_model;

// Re-export commonly used types
pub use actions::{OrderDetailAction, Refresh};
pub use config::OrderDetailConfig;
pub use environment::{FeatureFlags, NetworkStatus, OrderDetailEnvironment, OrderDetailRepository};
pub use error::{Mutation, OrderDetailError, RepositoryError, Section};
pub use events::{Notice, OrderDetailEvent, UndoHandle, UndoOutcome};
pub use reducer::OrderDetailReducer;
pub use snapshot::{OrderDetailViewState, SnapshotStore, TriState, ViewStatePatch};
pub use state::OrderDetailState;
pub use view_model::{OrderDetailDependencies, OrderDetailViewModel};
