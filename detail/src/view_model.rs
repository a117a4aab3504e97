//! The public face of the engine: one instance per open order detail screen.

use crate::actions::OrderDetailAction;
use crate::config::OrderDetailConfig;
use crate::environment::{NetworkStatus, OrderDetailEnvironment, OrderDetailRepository};
use crate::events::OrderDetailEvent;
use crate::reducer::OrderDetailReducer;
use crate::sections::Sections;
use crate::snapshot::{OrderDetailViewState, SnapshotStore};
use crate::state::OrderDetailState;
use crate::types::{OrderIdentifier, OrderShipmentTracking, OrderStatus};
use order_detail_core::environment::Clock;
use order_detail_runtime::{events, EventStream, Store, StoreError, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type OrderDetailStore =
    Store<OrderDetailState, OrderDetailAction, OrderDetailEnvironment, OrderDetailReducer>;

/// Ports the engine talks to
#[derive(Clone)]
pub struct OrderDetailDependencies {
    /// Data access
    pub repository: Arc<dyn OrderDetailRepository>,
    /// Connectivity check
    pub network: Arc<dyn NetworkStatus>,
    /// Timestamps for locally created notes
    pub clock: Arc<dyn Clock>,
}

/// State orchestration for one order detail screen
///
/// Opening loads the order and its sections in the background. The snapshot
/// and section lists can be read or subscribed to at any time; notifications
/// arrive once each on the stream returned by [`Self::take_events`].
///
/// Closing (explicitly or by dropping) cancels all work in flight. Effects
/// cancelled this way change nothing and emit nothing.
pub struct OrderDetailViewModel {
    store: OrderDetailStore,
    snapshot: SnapshotStore,
    sections: Sections,
    repository: Arc<dyn OrderDetailRepository>,
    events: Mutex<Option<EventStream<OrderDetailEvent>>>,
    closed: AtomicBool,
}

impl OrderDetailViewModel {
    /// Open the screen for `identifier` and start loading
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store refuses the initial action.
    #[tracing::instrument(skip_all, fields(order = %identifier))]
    pub async fn open(
        identifier: OrderIdentifier,
        dependencies: OrderDetailDependencies,
        config: &OrderDetailConfig,
    ) -> Result<Self, StoreError> {
        let (emitter, stream) = events::channel();
        let environment = OrderDetailEnvironment::new(
            Arc::clone(&dependencies.repository),
            dependencies.network,
            dependencies.clock,
            config.features(),
            emitter,
        );

        let state = OrderDetailState::new(identifier);
        let snapshot = state.snapshot.clone();
        let sections = state.sections.clone();
        let store = Store::with_config(
            state,
            OrderDetailReducer::new(),
            environment,
            config.store_config(),
        );

        let view_model = Self {
            store,
            snapshot,
            sections,
            repository: dependencies.repository,
            events: Mutex::new(Some(stream)),
            closed: AtomicBool::new(false),
        };
        view_model.dispatch(OrderDetailAction::Start).await?;
        Ok(view_model)
    }

    async fn dispatch(&self, action: OrderDetailAction) -> Result<(), StoreError> {
        self.store.send(action).await
    }

    // ========== Intents ==========

    /// Pull-to-refresh
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::close`].
    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.dispatch(OrderDetailAction::RefreshRequested).await
    }

    /// Add a note; it is listed at once and removed again if the server refuses it
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::close`].
    pub async fn add_order_note(
        &self,
        note: impl Into<String>,
        is_customer_note: bool,
    ) -> Result<(), StoreError> {
        self.dispatch(OrderDetailAction::AddOrderNote {
            note: note.into(),
            is_customer_note,
        })
        .await
    }

    /// Add a shipment tracking; it is listed at once and removed again on failure
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::close`].
    pub async fn add_shipment_tracking(
        &self,
        tracking: OrderShipmentTracking,
    ) -> Result<(), StoreError> {
        self.dispatch(OrderDetailAction::AddShipmentTracking { tracking })
            .await
    }

    /// Delete a shipment tracking behind an undo prompt
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::close`].
    pub async fn delete_shipment_tracking(
        &self,
        tracking_number: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.dispatch(OrderDetailAction::DeleteShipmentTracking {
            tracking_number: tracking_number.into(),
        })
        .await
    }

    /// Change the order status behind an undo prompt
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::close`].
    pub async fn change_order_status(&self, status_key: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(OrderDetailAction::ChangeOrderStatus {
            status_key: status_key.into(),
        })
        .await
    }

    /// Reload shipping labels after one was refunded
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::close`].
    pub async fn shipping_label_refunded(&self) -> Result<(), StoreError> {
        self.dispatch(OrderDetailAction::ShippingLabelRefunded)
            .await
    }

    // ========== Observation ==========

    /// The current snapshot
    #[must_use]
    pub fn snapshot(&self) -> OrderDetailViewState {
        self.snapshot.get_snapshot()
    }

    /// Call `listener` with `(previous, current)` on every snapshot change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&OrderDetailViewState, &OrderDetailViewState) + Send + Sync + 'static,
    {
        self.snapshot.subscribe(listener)
    }

    /// The section lists
    #[must_use]
    pub const fn sections(&self) -> &Sections {
        &self.sections
    }

    /// The notification stream; `Some` only on the first call
    pub fn take_events(&self) -> Option<EventStream<OrderDetailEvent>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Every status the order can be moved to
    #[must_use]
    pub fn status_options(&self) -> Vec<OrderStatus> {
        self.repository.get_order_status_options()
    }

    /// True when any product of the loaded order is virtual
    #[must_use]
    pub fn has_virtual_products(&self) -> bool {
        let Some(order) = self.snapshot.get_snapshot().order else {
            return false;
        };
        self.repository
            .get_products_by_remote_ids(&order.product_ids())
            .iter()
            .any(|product| product.is_virtual)
    }

    /// Wait until no load or mutation is in flight
    ///
    /// A mutation waiting on its undo prompt counts as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdleTimeout`] if work is still running after `timeout`.
    pub async fn wait_for_idle(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.wait_for_idle(timeout).await
    }

    // ========== Lifecycle ==========

    /// True once [`Self::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Cancel all work in flight and release repository resources
    ///
    /// Later calls do nothing.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!(pending_effects = self.store.pending_effects(), "Closing order detail");
        self.store.teardown();
        self.repository.on_cleanup();
    }
}

impl Drop for OrderDetailViewModel {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for OrderDetailViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderDetailViewModel")
            .field("snapshot", &self.snapshot.get_snapshot())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
