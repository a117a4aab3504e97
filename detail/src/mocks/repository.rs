//! In-memory repository.

use crate::environment::{OrderDetailRepository, RepositoryResult};
use crate::error::RepositoryError;
use crate::types::{
    Order, OrderIdSet, OrderIdentifier, OrderNote, OrderShipmentTracking, OrderStatus, Product,
    Refund, RequestResult, ShippingLabel,
};
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Repository operations, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryCall {
    /// `get_order`
    GetOrder,
    /// `fetch_order`
    FetchOrder,
    /// `fetch_order_notes`
    FetchNotes,
    /// `get_order_notes`
    GetNotes,
    /// `add_order_note`
    AddNote,
    /// `get_order_refunds`
    GetRefunds,
    /// `fetch_order_refunds`
    FetchRefunds,
    /// `fetch_order_shipment_tracking_list`
    FetchTrackings,
    /// `get_order_shipment_trackings`
    GetTrackings,
    /// `add_order_shipment_tracking`
    AddTracking,
    /// `delete_order_shipment_tracking`
    DeleteTracking,
    /// `get_order_shipping_labels`
    GetLabels,
    /// `fetch_order_shipping_labels`
    FetchLabels,
    /// `update_order_status`
    UpdateStatus,
    /// `on_cleanup`
    Cleanup,
}

#[derive(Debug, Default)]
struct MockData {
    cached_order: Option<Order>,
    remote_order: Option<Order>,
    notes: Vec<OrderNote>,
    remote_notes: Option<Vec<OrderNote>>,
    refunds: Vec<Refund>,
    remote_refunds: Option<Vec<Refund>>,
    trackings: Vec<OrderShipmentTracking>,
    remote_trackings: Option<Vec<OrderShipmentTracking>>,
    tracking_list_result: Option<RequestResult>,
    labels: Vec<ShippingLabel>,
    remote_labels: Option<Vec<ShippingLabel>>,
    statuses: Vec<OrderStatus>,
    products: Vec<Product>,
    failures: HashSet<RepositoryCall>,
    calls: HashMap<RepositoryCall, usize>,
    next_note_id: i64,
    write_gate: Option<Arc<Semaphore>>,
}

/// Mock order detail repository
///
/// Holds one cached copy and one remote copy of every section. Remote copies
/// default to the cached ones. Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MockOrderDetailRepository {
    data: Arc<Mutex<MockData>>,
}

impl MockOrderDetailRepository {
    /// An empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Seeding ==========

    /// Seed the cached order; the remote store knows it too
    #[must_use]
    pub fn with_order(self, order: Order) -> Self {
        {
            let mut data = self.data();
            data.cached_order = Some(order.clone());
            data.remote_order = Some(order);
        }
        self
    }

    /// Seed an order only the remote store knows
    #[must_use]
    pub fn with_remote_order(self, order: Order) -> Self {
        self.data().remote_order = Some(order);
        self
    }

    /// Seed cached notes
    #[must_use]
    pub fn with_notes(self, notes: Vec<OrderNote>) -> Self {
        self.data().notes = notes;
        self
    }

    /// Notes the next note refresh brings into the cache
    #[must_use]
    pub fn with_remote_notes(self, notes: Vec<OrderNote>) -> Self {
        self.data().remote_notes = Some(notes);
        self
    }

    /// Seed cached refunds
    #[must_use]
    pub fn with_refunds(self, refunds: Vec<Refund>) -> Self {
        self.data().refunds = refunds;
        self
    }

    /// Refunds returned by the remote store
    #[must_use]
    pub fn with_remote_refunds(self, refunds: Vec<Refund>) -> Self {
        self.data().remote_refunds = Some(refunds);
        self
    }

    /// Seed cached shipment trackings
    #[must_use]
    pub fn with_trackings(self, trackings: Vec<OrderShipmentTracking>) -> Self {
        self.data().trackings = trackings;
        self
    }

    /// Trackings the next tracking refresh brings into the cache
    #[must_use]
    pub fn with_remote_trackings(self, trackings: Vec<OrderShipmentTracking>) -> Self {
        self.data().remote_trackings = Some(trackings);
        self
    }

    /// What the tracking list request reports (default: success)
    #[must_use]
    pub fn with_tracking_list_result(self, result: RequestResult) -> Self {
        self.data().tracking_list_result = Some(result);
        self
    }

    /// Seed cached shipping labels
    #[must_use]
    pub fn with_labels(self, labels: Vec<ShippingLabel>) -> Self {
        self.data().labels = labels;
        self
    }

    /// Labels returned by the remote store
    #[must_use]
    pub fn with_remote_labels(self, labels: Vec<ShippingLabel>) -> Self {
        self.data().remote_labels = Some(labels);
        self
    }

    /// Seed the known statuses
    #[must_use]
    pub fn with_statuses(self, statuses: Vec<OrderStatus>) -> Self {
        self.data().statuses = statuses;
        self
    }

    /// Seed cached products
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.data().products = products;
        self
    }

    /// Replace the remote labels after construction
    pub fn set_remote_labels(&self, labels: Vec<ShippingLabel>) {
        self.data().remote_labels = Some(labels);
    }

    // ========== Behaviour ==========

    /// Make `call` fail with a network error from now on
    pub fn fail(&self, call: RepositoryCall) {
        self.data().failures.insert(call);
    }

    /// Let `call` succeed again
    pub fn succeed(&self, call: RepositoryCall) {
        self.data().failures.remove(&call);
    }

    /// Park every remote write until [`Self::release_writes`]
    pub fn hold_writes(&self) {
        self.data().write_gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let parked and future remote writes through
    pub fn release_writes(&self) {
        if let Some(gate) = self.data().write_gate.take() {
            gate.close();
        }
    }

    // ========== Inspection ==========

    /// Number of times `call` was made
    #[must_use]
    pub fn calls(&self, call: RepositoryCall) -> usize {
        self.data().calls.get(&call).copied().unwrap_or(0)
    }

    /// Cached shipment trackings
    #[must_use]
    pub fn stored_trackings(&self) -> Vec<OrderShipmentTracking> {
        self.data().trackings.clone()
    }

    /// Cached notes
    #[must_use]
    pub fn stored_notes(&self) -> Vec<OrderNote> {
        self.data().notes.clone()
    }

    /// Status key of the remote order
    #[must_use]
    pub fn remote_status(&self) -> Option<String> {
        self.data().remote_order.as_ref().map(|order| order.status.clone())
    }

    /// Count the call and report whether it should fail
    fn record(&self, call: RepositoryCall) -> RepositoryResult<()> {
        let mut data = self.data();
        *data.calls.entry(call).or_default() += 1;
        if data.failures.contains(&call) {
            Err(RepositoryError::Network(format!("{call:?} failed")))
        } else {
            Ok(())
        }
    }

    fn write_gate(&self) -> Option<Arc<Semaphore>> {
        self.data().write_gate.clone()
    }

    /// Run a remote write once the write gate, if any, opens
    fn write<T, F>(&self, call: RepositoryCall, apply: F) -> BoxFuture<'_, RepositoryResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut MockData) -> RepositoryResult<T> + Send + 'static,
    {
        let gate = self.write_gate();
        Box::pin(async move {
            if let Some(gate) = gate {
                // A closed gate means released
                let _ = gate.acquire().await;
            }
            self.record(call)?;
            apply(&mut self.data())
        })
    }
}

impl OrderDetailRepository for MockOrderDetailRepository {
    fn get_order(&self, identifier: OrderIdentifier) -> BoxFuture<'_, Option<Order>> {
        let _ = self.record(RepositoryCall::GetOrder);
        let order = self
            .data()
            .cached_order
            .clone()
            .filter(|order| order.identifier == identifier);
        Box::pin(async move { order })
    }

    fn fetch_order(&self, identifier: OrderIdentifier) -> BoxFuture<'_, RepositoryResult<Order>> {
        let result = self.record(RepositoryCall::FetchOrder).and_then(|()| {
            let mut data = self.data();
            let order = data
                .remote_order
                .clone()
                .filter(|order| order.identifier == identifier)
                .ok_or(RepositoryError::NotFound)?;
            data.cached_order = Some(order.clone());
            Ok(order)
        });
        Box::pin(async move { result })
    }

    fn fetch_order_notes(&self, _ids: OrderIdSet) -> BoxFuture<'_, RepositoryResult<()>> {
        let result = self.record(RepositoryCall::FetchNotes).map(|()| {
            let mut data = self.data();
            if let Some(notes) = data.remote_notes.clone() {
                data.notes = notes;
            }
        });
        Box::pin(async move { result })
    }

    fn get_order_notes(&self, _local_order_id: i64) -> BoxFuture<'_, Vec<OrderNote>> {
        let _ = self.record(RepositoryCall::GetNotes);
        let notes = self.data().notes.clone();
        Box::pin(async move { notes })
    }

    fn add_order_note(&self, _ids: OrderIdSet, note: OrderNote) -> BoxFuture<'_, RepositoryResult<()>> {
        self.write(RepositoryCall::AddNote, move |data| {
            data.next_note_id += 1;
            let stored = OrderNote {
                remote_note_id: 1000 + data.next_note_id,
                ..note
            };
            data.notes.insert(0, stored);
            Ok(())
        })
    }

    fn get_order_refunds(&self, _remote_order_id: i64) -> BoxFuture<'_, Vec<Refund>> {
        let _ = self.record(RepositoryCall::GetRefunds);
        let refunds = self.data().refunds.clone();
        Box::pin(async move { refunds })
    }

    fn fetch_order_refunds(&self, _remote_order_id: i64) -> BoxFuture<'_, RepositoryResult<Vec<Refund>>> {
        let result = self.record(RepositoryCall::FetchRefunds).map(|()| {
            let mut data = self.data();
            let refunds = data.remote_refunds.clone().unwrap_or_else(|| data.refunds.clone());
            data.refunds.clone_from(&refunds);
            refunds
        });
        Box::pin(async move { result })
    }

    fn fetch_order_shipment_tracking_list(&self, _ids: OrderIdSet) -> BoxFuture<'_, RequestResult> {
        let result = match self.record(RepositoryCall::FetchTrackings) {
            Err(_) => RequestResult::Error,
            Ok(()) => {
                let mut data = self.data();
                let result = data.tracking_list_result.unwrap_or(RequestResult::Success);
                if result == RequestResult::Success {
                    if let Some(trackings) = data.remote_trackings.clone() {
                        data.trackings = trackings;
                    }
                }
                result
            },
        };
        Box::pin(async move { result })
    }

    fn get_order_shipment_trackings(&self, _local_order_id: i64) -> BoxFuture<'_, Vec<OrderShipmentTracking>> {
        let _ = self.record(RepositoryCall::GetTrackings);
        let trackings = self.data().trackings.clone();
        Box::pin(async move { trackings })
    }

    fn add_order_shipment_tracking(
        &self,
        _ids: OrderIdSet,
        tracking: OrderShipmentTracking,
        is_custom_provider: bool,
    ) -> BoxFuture<'_, RepositoryResult<()>> {
        self.write(RepositoryCall::AddTracking, move |data| {
            data.trackings.insert(
                0,
                OrderShipmentTracking {
                    is_custom_provider,
                    ..tracking
                },
            );
            Ok(())
        })
    }

    fn delete_order_shipment_tracking(
        &self,
        _ids: OrderIdSet,
        tracking: OrderShipmentTracking,
    ) -> BoxFuture<'_, RepositoryResult<()>> {
        self.write(RepositoryCall::DeleteTracking, move |data| {
            data.trackings
                .retain(|stored| stored.tracking_number != tracking.tracking_number);
            Ok(())
        })
    }

    fn get_order_shipping_labels(&self, _remote_order_id: i64) -> BoxFuture<'_, Vec<ShippingLabel>> {
        let _ = self.record(RepositoryCall::GetLabels);
        let labels = self.data().labels.clone();
        Box::pin(async move { labels })
    }

    fn fetch_order_shipping_labels(
        &self,
        _remote_order_id: i64,
    ) -> BoxFuture<'_, RepositoryResult<Vec<ShippingLabel>>> {
        let result = self.record(RepositoryCall::FetchLabels).map(|()| {
            let mut data = self.data();
            let labels = data.remote_labels.clone().unwrap_or_else(|| data.labels.clone());
            data.labels.clone_from(&labels);
            labels
        });
        Box::pin(async move { result })
    }

    fn update_order_status(&self, _ids: OrderIdSet, status_key: String) -> BoxFuture<'_, RepositoryResult<()>> {
        self.write(RepositoryCall::UpdateStatus, move |data| {
            for order in [&mut data.cached_order, &mut data.remote_order].into_iter().flatten() {
                order.status.clone_from(&status_key);
            }
            Ok(())
        })
    }

    fn get_order_shipment_tracking_by_tracking_number(
        &self,
        _local_order_id: i64,
        tracking_number: &str,
    ) -> Option<OrderShipmentTracking> {
        self.data()
            .trackings
            .iter()
            .find(|tracking| tracking.tracking_number == tracking_number)
            .cloned()
    }

    fn get_order_status(&self, status_key: &str) -> OrderStatus {
        self.data()
            .statuses
            .iter()
            .find(|status| status.status_key == status_key)
            .cloned()
            .unwrap_or_else(|| OrderStatus {
                status_key: status_key.to_string(),
                label: status_key.to_string(),
            })
    }

    fn get_order_status_options(&self) -> Vec<OrderStatus> {
        self.data().statuses.clone()
    }

    fn get_products_by_remote_ids(&self, remote_product_ids: &[i64]) -> Vec<Product> {
        self.data()
            .products
            .iter()
            .filter(|product| remote_product_ids.contains(&product.remote_product_id))
            .cloned()
            .collect()
    }

    fn on_cleanup(&self) {
        let _ = self.record(RepositoryCall::Cleanup);
    }
}
