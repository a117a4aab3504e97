//! Order detail walkthrough against the in-memory repository.
//!
//! Opens an order, adds a note, deletes a tracking (settling its undo
//! prompt), then marks the order complete and undoes it.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=order_detail=debug cargo run --bin order-detail-demo
//! ```

use anyhow::Context;
use chrono::Utc;
use order_detail::mocks::{MockNetworkStatus, MockOrderDetailRepository};
use order_detail::types::{
    Order, OrderIdSet, OrderIdentifier, OrderItem, OrderShipmentTracking, OrderStatus, Refund,
    RefundItem,
};
use order_detail::{OrderDetailConfig, OrderDetailDependencies, OrderDetailEvent, OrderDetailViewModel};
use order_detail_core::environment::SystemClock;
use order_detail_runtime::EventStream;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const IDLE_TIMEOUT: Duration = Duration::from_secs(2);

fn seed() -> MockOrderDetailRepository {
    let identifier = OrderIdentifier::new(1, 1042);
    let item = |item_id: i64, name: &str, quantity: u32| OrderItem {
        item_id,
        product_id: 500 + item_id,
        name: name.to_string(),
        quantity,
    };

    MockOrderDetailRepository::new()
        .with_order(Order {
            identifier,
            ids: OrderIdSet {
                id: 3,
                remote_order_id: 1042,
            },
            number: "1042".to_string(),
            status: "processing".to_string(),
            items: vec![item(1, "Mug", 2), item(2, "Poster", 1), item(3, "Stickers", 5)],
        })
        .with_refunds(vec![Refund {
            id: 1,
            date_created: Utc::now(),
            amount_cents: 1200,
            reason: Some("Damaged".to_string()),
            items: vec![RefundItem {
                item_id: 2,
                quantity: 1,
            }],
        }])
        .with_trackings(vec![OrderShipmentTracking {
            tracking_number: "1Z999".to_string(),
            tracking_provider: "UPS".to_string(),
            tracking_link: "https://ups.example/1Z999".to_string(),
            date_shipped: "2025-01-03".to_string(),
            is_custom_provider: false,
        }])
        .with_statuses(vec![
            OrderStatus {
                status_key: "processing".to_string(),
                label: "Processing".to_string(),
            },
            OrderStatus {
                status_key: "completed".to_string(),
                label: "Completed".to_string(),
            },
        ])
}

/// Log notices until the next undo prompt, then resolve it
async fn resolve_next_prompt(events: &mut EventStream<OrderDetailEvent>, undo: bool) {
    while let Some(event) = events.next().await {
        match event {
            OrderDetailEvent::Snackbar(notice) => info!(%notice, "Notice"),
            OrderDetailEvent::UndoSnackbar { notice, handle } => {
                info!(%notice, undo, "Resolving undo prompt");
                if undo {
                    handle.undo();
                } else {
                    handle.settle();
                }
                return;
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = OrderDetailConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Order Detail Demo ===");

    let dependencies = OrderDetailDependencies {
        repository: Arc::new(seed()),
        network: Arc::new(MockNetworkStatus::online()),
        clock: Arc::new(SystemClock),
    };

    let view_model =
        OrderDetailViewModel::open(OrderIdentifier::new(1, 1042), dependencies, &config).await?;
    let mut events = view_model
        .take_events()
        .context("event stream already taken")?;

    let _subscription = view_model.subscribe(|previous, current| {
        if previous.order_status != current.order_status {
            info!(status = ?current.order_status.as_ref().map(|s| &s.label), "Status shown");
        }
    });

    view_model.wait_for_idle(IDLE_TIMEOUT).await?;
    let snapshot = view_model.snapshot();
    info!(title = ?snapshot.toolbar_title, "Order loaded");
    for product in view_model.sections().products.get() {
        info!(name = %product.name, quantity = product.quantity, "Product to ship");
    }

    view_model.add_order_note("Packed and ready", false).await?;
    view_model.wait_for_idle(IDLE_TIMEOUT).await?;
    info!(notes = view_model.sections().notes.get().len(), "Note added");

    view_model.delete_shipment_tracking("1Z999").await?;
    resolve_next_prompt(&mut events, false).await;
    view_model.wait_for_idle(IDLE_TIMEOUT).await?;

    view_model.change_order_status("completed").await?;
    resolve_next_prompt(&mut events, true).await;
    view_model.wait_for_idle(IDLE_TIMEOUT).await?;

    for event in events.drain() {
        info!(notice = %event.notice(), "Notice");
    }
    info!(
        trackings = view_model.sections().shipment_trackings.get().len(),
        status = ?view_model.snapshot().order_status.map(|s| s.label),
        virtual_products = view_model.has_virtual_products(),
        "Final state"
    );

    view_model.close();
    Ok(())
}
