//! Injected dependencies of the order detail reducer.
//!
//! The repository and connectivity ports are dyn-compatible traits so that the
//! environment can hold them behind `Arc` and clone them into effects. Async
//! operations return boxed futures borrowing only `&self`; every argument is
//! owned.

use crate::error::RepositoryError;
use crate::events::OrderDetailEvent;
use crate::types::{
    Order, OrderIdSet, OrderIdentifier, OrderNote, OrderShipmentTracking, OrderStatus, Product,
    Refund, RequestResult, ShippingLabel,
};
use futures::future::BoxFuture;
use order_detail_core::environment::Clock;
use order_detail_runtime::EventEmitter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type of repository operations that can fail
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Data access for one order: a local cache plus the remote store
///
/// `get_*` methods read the local cache. `fetch_*` methods call the remote
/// store and update the cache.
pub trait OrderDetailRepository: Send + Sync {
    /// Read the order from the local cache
    fn get_order(&self, identifier: OrderIdentifier) -> BoxFuture<'_, Option<Order>>;

    /// Fetch the order from the remote store
    fn fetch_order(&self, identifier: OrderIdentifier) -> BoxFuture<'_, RepositoryResult<Order>>;

    /// Refresh the cached notes from the remote store
    fn fetch_order_notes(&self, ids: OrderIdSet) -> BoxFuture<'_, RepositoryResult<()>>;

    /// Read cached notes, newest first
    fn get_order_notes(&self, local_order_id: i64) -> BoxFuture<'_, Vec<OrderNote>>;

    /// Send a new note to the remote store
    fn add_order_note(&self, ids: OrderIdSet, note: OrderNote) -> BoxFuture<'_, RepositoryResult<()>>;

    /// Read cached refunds
    fn get_order_refunds(&self, remote_order_id: i64) -> BoxFuture<'_, Vec<Refund>>;

    /// Fetch refunds from the remote store
    fn fetch_order_refunds(&self, remote_order_id: i64) -> BoxFuture<'_, RepositoryResult<Vec<Refund>>>;

    /// Refresh the cached shipment trackings from the remote store
    fn fetch_order_shipment_tracking_list(&self, ids: OrderIdSet) -> BoxFuture<'_, RequestResult>;

    /// Read cached shipment trackings, newest first
    fn get_order_shipment_trackings(&self, local_order_id: i64) -> BoxFuture<'_, Vec<OrderShipmentTracking>>;

    /// Send a new shipment tracking to the remote store
    fn add_order_shipment_tracking(
        &self,
        ids: OrderIdSet,
        tracking: OrderShipmentTracking,
        is_custom_provider: bool,
    ) -> BoxFuture<'_, RepositoryResult<()>>;

    /// Delete a shipment tracking on the remote store
    fn delete_order_shipment_tracking(
        &self,
        ids: OrderIdSet,
        tracking: OrderShipmentTracking,
    ) -> BoxFuture<'_, RepositoryResult<()>>;

    /// Read cached shipping labels
    fn get_order_shipping_labels(&self, remote_order_id: i64) -> BoxFuture<'_, Vec<ShippingLabel>>;

    /// Fetch shipping labels from the remote store
    fn fetch_order_shipping_labels(
        &self,
        remote_order_id: i64,
    ) -> BoxFuture<'_, RepositoryResult<Vec<ShippingLabel>>>;

    /// Change the order status on the remote store
    fn update_order_status(&self, ids: OrderIdSet, status_key: String) -> BoxFuture<'_, RepositoryResult<()>>;

    /// Look up a cached shipment tracking by its number
    fn get_order_shipment_tracking_by_tracking_number(
        &self,
        local_order_id: i64,
        tracking_number: &str,
    ) -> Option<OrderShipmentTracking>;

    /// Resolve a status key to its display status
    fn get_order_status(&self, status_key: &str) -> OrderStatus;

    /// Every status the order can be moved to
    fn get_order_status_options(&self) -> Vec<OrderStatus>;

    /// Read cached products
    fn get_products_by_remote_ids(&self, remote_product_ids: &[i64]) -> Vec<Product>;

    /// Release resources held for this order; called once when the screen closes
    fn on_cleanup(&self);
}

/// Connectivity check
pub trait NetworkStatus: Send + Sync {
    /// True when the device can reach the network
    fn is_connected(&self) -> bool;
}

/// Feature switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Load and show shipping labels
    pub shipping_labels: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            shipping_labels: true,
        }
    }
}

/// Environment dependencies for the order detail reducer
#[derive(Clone)]
pub struct OrderDetailEnvironment {
    /// Data access
    pub repository: Arc<dyn OrderDetailRepository>,
    /// Connectivity check
    pub network: Arc<dyn NetworkStatus>,
    /// Timestamps for locally created notes
    pub clock: Arc<dyn Clock>,
    /// Feature switches
    pub features: FeatureFlags,
    /// Outgoing notifications
    pub events: EventEmitter<OrderDetailEvent>,
}

impl OrderDetailEnvironment {
    /// Creates a new `OrderDetailEnvironment`
    #[must_use]
    pub fn new(
        repository: Arc<dyn OrderDetailRepository>,
        network: Arc<dyn NetworkStatus>,
        clock: Arc<dyn Clock>,
        features: FeatureFlags,
        events: EventEmitter<OrderDetailEvent>,
    ) -> Self {
        Self {
            repository,
            network,
            clock,
            features,
            events,
        }
    }

    /// Poll the connectivity check
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.network.is_connected()
    }
}

impl std::fmt::Debug for OrderDetailEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderDetailEnvironment")
            .field("features", &self.features)
            .field("connected", &self.network.is_connected())
            .finish_non_exhaustive()
    }
}
