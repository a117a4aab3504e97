//! End-to-end behaviour of one order detail screen against the mock ports

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

mod common;

use common::{
    item, label, note, notes, order, order_with, product, refund, seeded_repository, statuses,
    tracking, Harness,
};
use order_detail::mocks::{MockNetworkStatus, MockOrderDetailRepository, RepositoryCall};
use order_detail::types::RequestResult;
use order_detail::{Mutation, Notice, OrderDetailError, Section, TriState};
use order_detail_core::environment::Clock;
use order_detail_testing::test_clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_ok;

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_cache_hit_shows_order_without_skeleton() {
    let repository = seeded_repository().with_refunds(vec![refund(&[(2, 1)])]);
    let harness = Harness::loaded(repository).await;

    let snapshot = harness.view_model.snapshot();
    assert_eq!(snapshot.order, Some(order()));
    assert_eq!(snapshot.toolbar_title.as_deref(), Some("Order #42"));
    assert_eq!(harness.status_label().as_deref(), Some("Processing"));
    assert!(!snapshot.is_order_detail_skeleton_shown.is_true());
    assert!(snapshot.is_order_notes_skeleton_shown.is_false());
    assert!(snapshot.is_shipment_tracking_available.is_true());

    let products = harness.view_model.sections().products.get();
    assert_eq!(products, vec![item(1, 1), item(3, 1)]);
    assert_eq!(harness.notes().len(), 2);
    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);

    assert_eq!(harness.repository.calls(RepositoryCall::FetchOrder), 0);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchNotes), 1);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchRefunds), 1);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchTrackings), 1);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchLabels), 1);
}

#[tokio::test]
async fn test_cache_miss_fetches_behind_skeleton() {
    let repository = MockOrderDetailRepository::new()
        .with_remote_order(order())
        .with_statuses(statuses());
    let harness = Harness::open(repository, MockNetworkStatus::online()).await;

    let transitions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&transitions);
    let _subscription = harness.view_model.subscribe(move |previous, current| {
        if let Some(shown) = current
            .is_order_detail_skeleton_shown
            .changed_from(previous.is_order_detail_skeleton_shown)
        {
            sink.lock().unwrap().push(shown);
        }
    });

    assert!(!harness
        .view_model
        .snapshot()
        .is_shipment_tracking_available
        .is_known());

    harness.idle().await;

    assert_eq!(*transitions.lock().unwrap(), vec![true, false]);
    let snapshot = harness.view_model.snapshot();
    assert_eq!(snapshot.order, Some(order()));
    assert!(snapshot.is_order_detail_skeleton_shown.is_false());
    assert_eq!(harness.repository.calls(RepositoryCall::FetchOrder), 1);
}

#[tokio::test]
async fn test_cache_miss_offline_reports_once_and_stops() {
    let repository = MockOrderDetailRepository::new().with_remote_order(order());
    let mut harness = Harness::open(repository, MockNetworkStatus::offline()).await;
    harness.idle().await;

    let snapshot = harness.view_model.snapshot();
    assert!(snapshot.order.is_none());
    assert!(snapshot.is_order_detail_skeleton_shown.is_false());
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::Offline)]
    );
    assert_eq!(harness.repository.calls(RepositoryCall::FetchOrder), 0);
}

#[tokio::test]
async fn test_order_fetch_failure_reports_and_clears_skeleton() {
    let repository = MockOrderDetailRepository::new();
    let mut harness = Harness::open(repository, MockNetworkStatus::online()).await;
    harness.idle().await;

    assert!(harness
        .view_model
        .snapshot()
        .is_order_detail_skeleton_shown
        .is_false());
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::Fetch(Section::Order))]
    );
}

#[tokio::test]
async fn test_offline_shows_cached_sections_only() {
    let repository = seeded_repository().with_remote_notes(notes(5));
    let harness = Harness::open(repository, MockNetworkStatus::offline()).await;
    harness.idle().await;

    assert_eq!(harness.notes().len(), 2);
    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);
    let snapshot = harness.view_model.snapshot();
    assert!(snapshot.is_order_notes_skeleton_shown.is_false());
    assert!(snapshot.is_shipment_tracking_available.is_false());
    assert_eq!(harness.repository.calls(RepositoryCall::FetchNotes), 0);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchTrackings), 0);
}

#[tokio::test]
async fn test_remote_refresh_replaces_cached_notes() {
    let fresh = vec![note(9, "From server")];
    let repository = seeded_repository().with_remote_notes(fresh.clone());
    let harness = Harness::loaded(repository).await;

    assert_eq!(harness.notes(), fresh);
}

#[tokio::test]
async fn test_note_fetch_failure_keeps_cache_and_reports() {
    let repository = seeded_repository();
    repository.fail(RepositoryCall::FetchNotes);
    let mut harness = Harness::loaded(repository).await;

    assert_eq!(harness.notes().len(), 2);
    assert!(harness
        .view_model
        .snapshot()
        .is_order_notes_skeleton_shown
        .is_false());
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::Fetch(Section::Notes))]
    );
}

#[tokio::test]
async fn test_missing_tracking_extension_hides_tracking() {
    let repository = seeded_repository().with_tracking_list_result(RequestResult::ApiNotFound);
    let harness = Harness::loaded(repository).await;

    assert!(harness.tracking_numbers().is_empty());
    assert!(harness
        .view_model
        .snapshot()
        .is_shipment_tracking_available
        .is_false());
}

#[tokio::test]
async fn test_shipping_labels_take_precedence() {
    let repository = seeded_repository().with_labels(vec![label(&["Item 1"])]);
    let harness = Harness::loaded(repository).await;

    let sections = harness.view_model.sections();
    assert!(sections.products.get().is_empty());
    assert!(sections.shipment_trackings.get().is_empty());
    assert_eq!(
        harness.view_model.snapshot().is_shipment_tracking_available,
        TriState::Known(false)
    );

    let labels = sections.shipping_labels.get();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].products, vec![item(1, 1)]);
}

#[tokio::test]
async fn test_fully_refunded_order_lists_no_products() {
    let items: Vec<_> = (1..=5).map(|id| item(id, 1)).collect();
    let lines: Vec<(i64, u32)> = (1..=5).map(|id| (id, 1)).collect();
    let repository = MockOrderDetailRepository::new()
        .with_order(order_with(items))
        .with_refunds(vec![refund(&lines)])
        .with_statuses(statuses());
    let harness = Harness::loaded(repository).await;

    let sections = harness.view_model.sections();
    assert!(sections.products.get().is_empty());
    assert_eq!(sections.refunds.get().len(), 1);
}

#[tokio::test]
async fn test_derived_sections_ignore_arrival_order() {
    let labels_first = MockOrderDetailRepository::new()
        .with_order(order())
        .with_labels(vec![label(&["Item 1"])])
        .with_trackings(vec![tracking("A")])
        .with_remote_refunds(vec![refund(&[(2, 1)])])
        .with_statuses(statuses());
    let refunds_first = MockOrderDetailRepository::new()
        .with_order(order())
        .with_refunds(vec![refund(&[(2, 1)])])
        .with_trackings(vec![tracking("A")])
        .with_statuses(statuses());

    let labels_first = Harness::loaded(labels_first).await;
    let refunds_first = Harness::loaded(refunds_first).await;
    refunds_first
        .repository
        .set_remote_labels(vec![label(&["Item 1"])]);
    refunds_first.view_model.shipping_label_refunded().await.unwrap();
    refunds_first.idle().await;

    for harness in [&labels_first, &refunds_first] {
        let sections = harness.view_model.sections();
        assert!(sections.products.get().is_empty());
        assert!(sections.shipment_trackings.get().is_empty());
        assert_eq!(sections.refunds.get().len(), 1);
        assert_eq!(
            harness.view_model.snapshot().is_shipment_tracking_available,
            TriState::Known(false)
        );
    }
}

#[tokio::test]
async fn test_disabled_labels_are_never_loaded() {
    let repository = seeded_repository().with_labels(vec![label(&["Item 1"])]);
    let config = order_detail::OrderDetailConfig {
        shipping_labels: false,
        ..Default::default()
    };
    let harness = Harness::open_with(repository, MockNetworkStatus::online(), &config).await;
    harness.idle().await;

    assert!(harness.view_model.sections().shipping_labels.get().is_empty());
    assert_eq!(harness.view_model.sections().products.get().len(), 3);
    assert_eq!(harness.repository.calls(RepositoryCall::GetLabels), 0);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchLabels), 0);
}

#[tokio::test]
async fn test_refunded_label_reloads_labels_only() {
    let repository = seeded_repository();
    let harness = Harness::loaded(repository).await;
    assert_eq!(harness.view_model.sections().products.get().len(), 3);

    harness.repository.set_remote_labels(vec![label(&["Item 2"])]);
    harness.view_model.shipping_label_refunded().await.unwrap();
    harness.idle().await;

    assert_eq!(harness.view_model.sections().shipping_labels.get().len(), 1);
    assert!(harness.view_model.sections().products.get().is_empty());
    assert_eq!(harness.repository.calls(RepositoryCall::FetchLabels), 2);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchNotes), 1);
}

#[tokio::test]
async fn test_refresh_clears_refreshing_flag() {
    let harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.refresh().await.unwrap();
    assert!(harness.view_model.snapshot().is_refreshing.is_true());
    harness.idle().await;

    let snapshot = harness.view_model.snapshot();
    assert!(snapshot.is_refreshing.is_false());
    assert!(!snapshot.is_order_detail_skeleton_shown.is_true());
    assert_eq!(harness.repository.calls(RepositoryCall::FetchOrder), 1);
    assert_eq!(harness.repository.calls(RepositoryCall::FetchNotes), 2);
}

#[tokio::test]
async fn test_refresh_offline_reports_and_stops() {
    let mut harness = Harness::loaded(seeded_repository()).await;
    harness.network.set_connected(false);

    harness.view_model.refresh().await.unwrap();
    harness.idle().await;

    assert!(harness.view_model.snapshot().is_refreshing.is_false());
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::Offline)]
    );
    assert_eq!(harness.repository.calls(RepositoryCall::FetchOrder), 0);
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_note_is_shown_then_rolled_back_on_failure() {
    let mut harness = Harness::loaded(seeded_repository()).await;
    let before = harness.notes();
    harness.repository.hold_writes();
    harness.repository.fail(RepositoryCall::AddNote);

    harness
        .view_model
        .add_order_note("Gift wrap please", true)
        .await
        .unwrap();

    let shown = harness.notes();
    assert_eq!(shown.len(), before.len() + 1);
    assert_eq!(shown[0].remote_note_id, -1);
    assert!(shown[0].is_provisional());
    assert!(shown[0].is_customer_note);
    assert_eq!(shown[0].date_created, test_clock().now());

    harness.repository.release_writes();
    harness.idle().await;

    assert_eq!(harness.notes(), before);
    assert_eq!(
        harness.notices(),
        vec![
            Notice::NoteAdded,
            Notice::Failure(OrderDetailError::MutationCommit(Mutation::AddNote)),
        ]
    );
}

#[tokio::test]
async fn test_committed_note_stays() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.add_order_note("First", false).await.unwrap();
    harness.view_model.add_order_note("Second", false).await.unwrap();
    harness.idle().await;

    let ids: Vec<i64> = harness
        .notes()
        .iter()
        .map(|note| note.remote_note_id)
        .collect();
    assert_eq!(ids, vec![-2, -1, 1, 2]);
    assert_eq!(harness.notices(), vec![Notice::NoteAdded, Notice::NoteAdded]);
    assert_eq!(harness.repository.stored_notes().len(), 4);
}

#[tokio::test]
async fn test_note_in_flight_survives_a_reload() {
    let harness = Harness::loaded(seeded_repository()).await;
    harness.repository.hold_writes();

    harness.view_model.add_order_note("pending", false).await.unwrap();
    harness.view_model.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.repository.calls(RepositoryCall::FetchNotes), 2);
    let shown = harness.notes();
    assert_eq!(shown.len(), 3);
    assert_eq!(shown[0].note, "pending");
    assert!(shown[0].is_provisional());

    harness.repository.release_writes();
    harness.idle().await;
    assert_eq!(harness.notes().len(), 3);
    assert_eq!(harness.notes()[0].note, "pending");

    // The next reload shows the stored copy instead of the provisional one
    harness.view_model.refresh().await.unwrap();
    harness.idle().await;
    let shown = harness.notes();
    assert_eq!(shown.len(), 3);
    assert_eq!(shown[0].note, "pending");
    assert!(!shown[0].is_provisional());
}

#[tokio::test]
async fn test_failed_note_stays_gone_after_a_reload() {
    let harness = Harness::loaded(seeded_repository()).await;
    let before = harness.notes();
    harness.repository.hold_writes();
    harness.repository.fail(RepositoryCall::AddNote);

    harness.view_model.add_order_note("doomed", false).await.unwrap();
    harness.repository.release_writes();
    harness.idle().await;
    harness.view_model.refresh().await.unwrap();
    harness.idle().await;

    assert_eq!(harness.notes(), before);
}

#[tokio::test]
async fn test_tracking_in_flight_survives_a_reload() {
    let harness = Harness::loaded(seeded_repository()).await;
    harness.repository.hold_writes();

    harness
        .view_model
        .add_shipment_tracking(tracking("NEW"))
        .await
        .unwrap();
    harness.view_model.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.repository.calls(RepositoryCall::FetchTrackings), 2);
    assert_eq!(harness.tracking_numbers(), vec!["NEW", "A", "B", "C"]);

    harness.repository.release_writes();
    harness.idle().await;
    harness.view_model.refresh().await.unwrap();
    harness.idle().await;

    assert_eq!(harness.tracking_numbers(), vec!["NEW", "A", "B", "C"]);
}

#[tokio::test]
async fn test_tracking_add_commits_and_rolls_back() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness
        .view_model
        .add_shipment_tracking(tracking("NEW"))
        .await
        .unwrap();
    harness.idle().await;
    assert_eq!(harness.tracking_numbers(), vec!["NEW", "A", "B", "C"]);
    assert_eq!(harness.repository.stored_trackings().len(), 4);

    harness.repository.fail(RepositoryCall::AddTracking);
    harness
        .view_model
        .add_shipment_tracking(tracking("BAD"))
        .await
        .unwrap();
    harness.idle().await;

    assert_eq!(harness.tracking_numbers(), vec!["NEW", "A", "B", "C"]);
    assert_eq!(
        harness.notices(),
        vec![
            Notice::ShipmentTrackingAdded,
            Notice::ShipmentTrackingAdded,
            Notice::Failure(OrderDetailError::MutationCommit(
                Mutation::AddShipmentTracking
            )),
        ]
    );
}

#[tokio::test]
async fn test_tracking_deletion_undo_restores_position() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.delete_shipment_tracking("B").await.unwrap();
    let (notice, handle) = harness.next_prompt().await;
    assert_eq!(notice, Notice::ShipmentTrackingDeleted);
    assert_eq!(harness.tracking_numbers(), vec!["A", "C"]);

    handle.undo();
    harness.idle().await;

    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);
    assert_eq!(harness.repository.calls(RepositoryCall::DeleteTracking), 0);
    assert!(harness.notices().is_empty());
}

#[tokio::test]
async fn test_tracking_deletion_settles_and_commits() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.delete_shipment_tracking("A").await.unwrap();
    let (_, handle) = harness.next_prompt().await;
    handle.settle();
    harness.idle().await;

    assert_eq!(harness.tracking_numbers(), vec!["B", "C"]);
    assert_eq!(harness.repository.stored_trackings().len(), 2);
    assert_eq!(
        harness.notices(),
        vec![Notice::ShipmentTrackingDeleteSucceeded]
    );
}

#[tokio::test]
async fn test_tracking_deletion_failure_restores_position() {
    let mut harness = Harness::loaded(seeded_repository()).await;
    harness.repository.fail(RepositoryCall::DeleteTracking);

    harness.view_model.delete_shipment_tracking("C").await.unwrap();
    let (_, handle) = harness.next_prompt().await;
    drop(handle);
    harness.idle().await;

    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::MutationCommit(
            Mutation::DeleteShipmentTracking
        ))]
    );
}

#[tokio::test]
async fn test_unknown_or_repeated_deletion_is_ignored() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.delete_shipment_tracking("nope").await.unwrap();
    harness.idle().await;
    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);

    harness.view_model.delete_shipment_tracking("B").await.unwrap();
    harness.view_model.delete_shipment_tracking("B").await.unwrap();
    let (_, handle) = harness.next_prompt().await;
    handle.undo();
    harness.idle().await;

    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);
    assert!(harness.notices().is_empty());
}

#[tokio::test]
async fn test_status_change_commits_after_settle() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.change_order_status("on-hold").await.unwrap();
    let (notice, handle) = harness.next_prompt().await;
    assert_eq!(
        notice,
        Notice::OrderStatusChanged {
            label: "On hold".to_string()
        }
    );
    assert_eq!(harness.status_label().as_deref(), Some("On hold"));

    handle.settle();
    harness.idle().await;

    let snapshot = harness.view_model.snapshot();
    assert_eq!(harness.status_label().as_deref(), Some("On hold"));
    assert_eq!(
        snapshot.order.map(|order| order.status).as_deref(),
        Some("on-hold")
    );
    assert_eq!(harness.repository.remote_status().as_deref(), Some("on-hold"));
    assert!(harness.notices().is_empty());
}

#[tokio::test]
async fn test_status_change_offline_at_commit_reverts() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.change_order_status("completed").await.unwrap();
    let (notice, handle) = harness.next_prompt().await;
    assert_eq!(notice, Notice::OrderMarkedComplete);
    assert_eq!(harness.status_label().as_deref(), Some("Completed"));

    harness.network.set_connected(false);
    handle.settle();
    harness.idle().await;

    assert_eq!(harness.status_label().as_deref(), Some("Processing"));
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::Offline)]
    );
    assert_eq!(harness.repository.calls(RepositoryCall::UpdateStatus), 0);
}

#[tokio::test]
async fn test_status_change_failure_and_undo_revert() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.change_order_status("completed").await.unwrap();
    let (_, handle) = harness.next_prompt().await;
    handle.undo();
    harness.idle().await;
    assert_eq!(harness.status_label().as_deref(), Some("Processing"));

    harness.repository.fail(RepositoryCall::UpdateStatus);
    harness.view_model.change_order_status("on-hold").await.unwrap();
    let (_, handle) = harness.next_prompt().await;
    handle.settle();
    harness.idle().await;

    assert_eq!(harness.status_label().as_deref(), Some("Processing"));
    assert_eq!(
        harness.view_model.snapshot().order.map(|order| order.status).as_deref(),
        Some("processing")
    );
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::MutationCommit(
            Mutation::ChangeOrderStatus
        ))]
    );
}

#[tokio::test]
async fn test_undoing_an_earlier_status_change_keeps_the_later_one() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.change_order_status("completed").await.unwrap();
    let (_, first) = harness.next_prompt().await;
    harness.view_model.change_order_status("on-hold").await.unwrap();
    let (_, second) = harness.next_prompt().await;
    assert_eq!(harness.status_label().as_deref(), Some("On hold"));

    first.undo();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(harness.status_label().as_deref(), Some("On hold"));

    second.settle();
    harness.idle().await;

    let snapshot = harness.view_model.snapshot();
    assert_eq!(
        snapshot.order.map(|order| order.status).as_deref(),
        Some("on-hold")
    );
    assert_eq!(harness.status_label().as_deref(), Some("On hold"));
    assert_eq!(harness.repository.calls(RepositoryCall::UpdateStatus), 1);
}

#[tokio::test]
async fn test_undoing_both_status_changes_restores_the_original() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.change_order_status("completed").await.unwrap();
    let (_, first) = harness.next_prompt().await;
    harness.view_model.change_order_status("on-hold").await.unwrap();
    let (_, second) = harness.next_prompt().await;

    first.undo();
    second.undo();
    harness.idle().await;

    assert_eq!(harness.status_label().as_deref(), Some("Processing"));
    assert_eq!(
        harness.view_model.snapshot().order.map(|order| order.status).as_deref(),
        Some("processing")
    );
    assert_eq!(harness.repository.calls(RepositoryCall::UpdateStatus), 0);
}

#[tokio::test]
async fn test_earlier_status_commit_does_not_override_a_later_pending_change() {
    let mut harness = Harness::loaded(seeded_repository()).await;

    harness.view_model.change_order_status("completed").await.unwrap();
    let (_, first) = harness.next_prompt().await;
    harness.view_model.change_order_status("on-hold").await.unwrap();
    let (_, second) = harness.next_prompt().await;

    first.settle();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(harness.status_label().as_deref(), Some("On hold"));
    assert_eq!(
        harness.view_model.snapshot().order.map(|order| order.status).as_deref(),
        Some("completed")
    );

    second.undo();
    harness.idle().await;

    assert_eq!(harness.status_label().as_deref(), Some("Completed"));
    assert_eq!(
        harness.view_model.snapshot().order.map(|order| order.status).as_deref(),
        Some("completed")
    );
}

#[tokio::test]
async fn test_every_mutation_is_refused_offline() {
    let mut harness = Harness::loaded(seeded_repository()).await;
    harness.network.set_connected(false);
    let before = harness.view_model.snapshot();
    let notes_before = harness.notes();

    assert_ok!(harness.view_model.add_order_note("x", false).await);
    assert_ok!(harness.view_model.add_shipment_tracking(tracking("X")).await);
    assert_ok!(harness.view_model.delete_shipment_tracking("A").await);
    assert_ok!(harness.view_model.change_order_status("completed").await);
    harness.idle().await;

    assert_eq!(harness.view_model.snapshot(), before);
    assert_eq!(harness.notes(), notes_before);
    assert_eq!(harness.tracking_numbers(), vec!["A", "B", "C"]);
    assert_eq!(
        harness.notices(),
        vec![Notice::Failure(OrderDetailError::Offline); 4]
    );
    for call in [
        RepositoryCall::AddNote,
        RepositoryCall::AddTracking,
        RepositoryCall::DeleteTracking,
        RepositoryCall::UpdateStatus,
    ] {
        assert_eq!(harness.repository.calls(call), 0);
    }
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_status_options_and_virtual_products() {
    let repository = MockOrderDetailRepository::new()
        .with_order(order_with(vec![item(1, 1), item(2, 1)]))
        .with_statuses(statuses())
        .with_products(vec![product(101, false), product(102, true)]);
    let harness = Harness::loaded(repository).await;

    assert_eq!(harness.view_model.status_options(), statuses());
    assert!(harness.view_model.has_virtual_products());
}

#[tokio::test]
async fn test_no_virtual_products_without_order() {
    let repository = MockOrderDetailRepository::new().with_products(vec![product(101, true)]);
    let harness = Harness::open(repository, MockNetworkStatus::offline()).await;
    harness.idle().await;

    assert!(!harness.view_model.has_virtual_products());
}
