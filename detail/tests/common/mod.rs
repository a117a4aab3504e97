//! Shared fixtures for order detail integration tests

#![allow(dead_code)] // Each test binary uses a different subset
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::Utc;
use order_detail::mocks::{MockNetworkStatus, MockOrderDetailRepository};
use order_detail::types::{
    Order, OrderIdSet, OrderIdentifier, OrderItem, OrderNote, OrderShipmentTracking, OrderStatus,
    Product, Refund, RefundItem, ShippingLabel,
};
use order_detail::{
    Notice, OrderDetailConfig, OrderDetailDependencies, OrderDetailEvent, OrderDetailViewModel,
    UndoHandle,
};
use order_detail_runtime::EventStream;
use order_detail_testing::{init_test_tracing, test_clock};
use std::sync::Arc;
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Data
// ============================================================================

pub fn identifier() -> OrderIdentifier {
    OrderIdentifier::new(1, 42)
}

pub fn item(item_id: i64, quantity: u32) -> OrderItem {
    OrderItem {
        item_id,
        product_id: 100 + item_id,
        name: format!("Item {item_id}"),
        quantity,
    }
}

pub fn order_with(items: Vec<OrderItem>) -> Order {
    Order {
        identifier: identifier(),
        ids: OrderIdSet {
            id: 7,
            remote_order_id: 42,
        },
        number: "42".to_string(),
        status: "processing".to_string(),
        items,
    }
}

pub fn order() -> Order {
    order_with(vec![item(1, 1), item(2, 1), item(3, 1)])
}

pub fn note(remote_note_id: i64, text: &str) -> OrderNote {
    OrderNote {
        remote_note_id,
        date_created: Utc::now(),
        note: text.to_string(),
        is_customer_note: false,
    }
}

pub fn notes(count: i64) -> Vec<OrderNote> {
    (1..=count).map(|id| note(id, &format!("Note {id}"))).collect()
}

pub fn tracking(number: &str) -> OrderShipmentTracking {
    OrderShipmentTracking {
        tracking_number: number.to_string(),
        tracking_provider: "DHL".to_string(),
        tracking_link: format!("https://track.example/{number}"),
        date_shipped: "2025-01-02".to_string(),
        is_custom_provider: false,
    }
}

pub fn label(product_names: &[&str]) -> ShippingLabel {
    ShippingLabel {
        id: 9,
        tracking_number: "LBL-1".to_string(),
        carrier_id: "usps".to_string(),
        service_name: "Priority Mail".to_string(),
        product_names: product_names.iter().map(ToString::to_string).collect(),
        products: Vec::new(),
    }
}

pub fn refund(lines: &[(i64, u32)]) -> Refund {
    Refund {
        id: 1,
        date_created: Utc::now(),
        amount_cents: 1000,
        reason: None,
        items: lines
            .iter()
            .map(|&(item_id, quantity)| RefundItem { item_id, quantity })
            .collect(),
    }
}

pub fn status(key: &str, label: &str) -> OrderStatus {
    OrderStatus {
        status_key: key.to_string(),
        label: label.to_string(),
    }
}

pub fn statuses() -> Vec<OrderStatus> {
    vec![
        status("processing", "Processing"),
        status("on-hold", "On hold"),
        status("completed", "Completed"),
    ]
}

pub fn product(remote_product_id: i64, is_virtual: bool) -> Product {
    Product {
        remote_product_id,
        name: format!("Product {remote_product_id}"),
        is_virtual,
    }
}

/// A cached order with notes, three trackings and known statuses
pub fn seeded_repository() -> MockOrderDetailRepository {
    MockOrderDetailRepository::new()
        .with_order(order())
        .with_notes(notes(2))
        .with_trackings(vec![tracking("A"), tracking("B"), tracking("C")])
        .with_statuses(statuses())
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub view_model: OrderDetailViewModel,
    pub repository: MockOrderDetailRepository,
    pub network: MockNetworkStatus,
    events: EventStream<OrderDetailEvent>,
    seen: Vec<Notice>,
}

impl Harness {
    pub async fn open(repository: MockOrderDetailRepository, network: MockNetworkStatus) -> Self {
        Self::open_with(repository, network, &OrderDetailConfig::default()).await
    }

    pub async fn open_with(
        repository: MockOrderDetailRepository,
        network: MockNetworkStatus,
        config: &OrderDetailConfig,
    ) -> Self {
        init_test_tracing();

        let dependencies = OrderDetailDependencies {
            repository: Arc::new(repository.clone()),
            network: Arc::new(network.clone()),
            clock: Arc::new(test_clock()),
        };
        let view_model = OrderDetailViewModel::open(identifier(), dependencies, config)
            .await
            .expect("store should accept Start");
        let events = view_model.take_events().expect("fresh event stream");

        Self {
            view_model,
            repository,
            network,
            events,
            seen: Vec::new(),
        }
    }

    /// Open and wait for every loader to finish
    pub async fn loaded(repository: MockOrderDetailRepository) -> Self {
        let harness = Self::open(repository, MockNetworkStatus::online()).await;
        harness.idle().await;
        harness
    }

    pub async fn idle(&self) {
        self.view_model
            .wait_for_idle(TIMEOUT)
            .await
            .expect("engine should settle");
    }

    /// Wait for the next undo prompt, remembering plain notices met on the way
    pub async fn next_prompt(&mut self) -> (Notice, UndoHandle) {
        loop {
            let event = tokio::time::timeout(TIMEOUT, self.events.next())
                .await
                .expect("an undo prompt should arrive")
                .expect("event stream open");
            let notice = event.notice().clone();
            match event.into_undo_handle() {
                Some(handle) => return (notice, handle),
                None => self.seen.push(notice),
            }
        }
    }

    /// Every notice delivered so far and not yet returned
    pub fn notices(&mut self) -> Vec<Notice> {
        let mut notices = std::mem::take(&mut self.seen);
        notices.extend(
            self.events
                .drain()
                .into_iter()
                .map(|event| event.notice().clone()),
        );
        notices
    }

    pub fn notes(&self) -> Vec<OrderNote> {
        self.view_model.sections().notes.get()
    }

    pub fn tracking_numbers(&self) -> Vec<String> {
        self.view_model
            .sections()
            .shipment_trackings
            .get()
            .into_iter()
            .map(|tracking| tracking.tracking_number)
            .collect()
    }

    pub fn status_label(&self) -> Option<String> {
        self.view_model
            .snapshot()
            .order_status
            .map(|status| status.label)
    }
}
