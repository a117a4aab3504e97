//! User-initiated changes.
//!
//! Note and tracking additions are shown at once and sent right away; a
//! failure removes exactly what was added. Tracking deletion and status
//! changes are shown at once but sent only after their undo prompt settles;
//! undo or failure restores exactly what was there before.
//!
//! Every mutation is refused while offline with a single notice and no other
//! change.

use super::{Effects, OrderDetailReducer};
use crate::actions::OrderDetailAction;
use crate::environment::OrderDetailEnvironment;
use crate::error::{Mutation, OrderDetailError, RepositoryError};
use crate::events::{Notice, OrderDetailEvent, UndoHandle, UndoOutcome};
use crate::snapshot::ViewStatePatch;
use crate::state::{OrderDetailState, PendingDeletion, PendingStatusChange};
use crate::types::{CoreOrderStatus, OrderNote, OrderShipmentTracking};
use order_detail_core::{async_effect, smallvec, SmallVec};
use std::sync::Arc;

impl OrderDetailReducer {
    // ========== Notes ==========

    pub(super) fn add_order_note(
        state: &mut OrderDetailState,
        text: String,
        is_customer_note: bool,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        if !env.is_connected() {
            return Self::reject_offline(env, Mutation::AddNote);
        }
        let Some(ids) = state.ids() else {
            tracing::warn!("Ignoring note added before the order is loaded");
            return SmallVec::new();
        };

        let note = OrderNote {
            remote_note_id: state.allocate_provisional_note_id(),
            date_created: env.clock.now(),
            note: text,
            is_customer_note,
        };
        let provisional_id = note.remote_note_id;
        state.pending_notes.insert(0, note.clone());
        let shown = note.clone();
        state.sections.notes.update(|notes| notes.insert(0, shown));
        tracing::debug!(provisional_id, "Note shown before commit");

        let repository = Arc::clone(&env.repository);
        let events = env.events.clone();
        smallvec![async_effect! {
            events.emit(OrderDetailEvent::Snackbar(Notice::NoteAdded));
            let result = repository.add_order_note(ids, note).await;
            Some(OrderDetailAction::NoteAddCommitted { provisional_id, result })
        }]
    }

    pub(super) fn note_add_committed(
        state: &mut OrderDetailState,
        provisional_id: i64,
        result: Result<(), RepositoryError>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        state
            .pending_notes
            .retain(|note| note.remote_note_id != provisional_id);

        match result {
            Ok(()) => {
                Self::record_mutation(Mutation::AddNote, "committed");
                SmallVec::new()
            },
            Err(error) => {
                tracing::warn!(provisional_id, %error, "Note addition failed");
                state
                    .sections
                    .notes
                    .update(|notes| notes.retain(|note| note.remote_note_id != provisional_id));
                Self::commit_failed(env, Mutation::AddNote)
            },
        }
    }

    // ========== Shipment tracking ==========

    pub(super) fn add_shipment_tracking(
        state: &mut OrderDetailState,
        tracking: OrderShipmentTracking,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        if !env.is_connected() {
            return Self::reject_offline(env, Mutation::AddShipmentTracking);
        }
        let Some(ids) = state.ids() else {
            tracing::warn!("Ignoring tracking added before the order is loaded");
            return SmallVec::new();
        };

        state.pending_trackings.insert(0, tracking.clone());
        state.raw_trackings.insert(0, tracking.clone());
        state.recompute();

        let repository = Arc::clone(&env.repository);
        let events = env.events.clone();
        smallvec![async_effect! {
            events.emit(OrderDetailEvent::Snackbar(Notice::ShipmentTrackingAdded));
            let is_custom_provider = tracking.is_custom_provider;
            let result = repository
                .add_order_shipment_tracking(ids, tracking.clone(), is_custom_provider)
                .await;
            Some(OrderDetailAction::TrackingAddCommitted { tracking, result })
        }]
    }

    pub(super) fn tracking_add_committed(
        state: &mut OrderDetailState,
        tracking: &OrderShipmentTracking,
        result: Result<(), RepositoryError>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        if let Some(index) = state.pending_trackings.iter().position(|pending| pending == tracking) {
            state.pending_trackings.remove(index);
        }

        match result {
            Ok(()) => {
                Self::record_mutation(Mutation::AddShipmentTracking, "committed");
                SmallVec::new()
            },
            Err(error) => {
                tracing::warn!(
                    tracking_number = %tracking.tracking_number,
                    %error,
                    "Shipment tracking addition failed"
                );
                if let Some(index) = state.raw_trackings.iter().position(|shown| shown == tracking) {
                    state.raw_trackings.remove(index);
                    state.recompute();
                }
                Self::commit_failed(env, Mutation::AddShipmentTracking)
            },
        }
    }

    pub(super) fn delete_shipment_tracking(
        state: &mut OrderDetailState,
        tracking_number: String,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        if !env.is_connected() {
            return Self::reject_offline(env, Mutation::DeleteShipmentTracking);
        }
        let Some(ids) = state.ids() else {
            tracing::warn!("Ignoring tracking deletion before the order is loaded");
            return SmallVec::new();
        };
        if state.pending_deletions.contains_key(&tracking_number) {
            tracing::debug!(%tracking_number, "Deletion already pending");
            return SmallVec::new();
        }
        let Some(tracking) = env
            .repository
            .get_order_shipment_tracking_by_tracking_number(ids.id, &tracking_number)
        else {
            tracing::debug!(%tracking_number, "Unknown shipment tracking");
            return SmallVec::new();
        };

        let index = state
            .raw_trackings
            .iter()
            .position(|shown| shown.tracking_number == tracking_number);
        if let Some(index) = index {
            state.raw_trackings.remove(index);
        }
        state
            .pending_deletions
            .insert(tracking_number.clone(), PendingDeletion { tracking, index });
        state.recompute();

        let (handle, resolution) = UndoHandle::new();
        let events = env.events.clone();
        smallvec![async_effect! {
            events.emit(OrderDetailEvent::UndoSnackbar {
                notice: Notice::ShipmentTrackingDeleted,
                handle,
            });
            let outcome = resolution.outcome().await;
            Some(OrderDetailAction::TrackingDeletionResolved { tracking_number, outcome })
        }]
    }

    pub(super) fn tracking_deletion_resolved(
        state: &mut OrderDetailState,
        tracking_number: String,
        outcome: UndoOutcome,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        let Some(pending) = state.pending_deletions.get(&tracking_number) else {
            return SmallVec::new();
        };

        if outcome == UndoOutcome::Undone {
            tracing::debug!(%tracking_number, "Tracking deletion undone");
            Self::restore_tracking(state, &tracking_number);
            Self::record_mutation(Mutation::DeleteShipmentTracking, "undone");
            return SmallVec::new();
        }

        if !env.is_connected() {
            Self::restore_tracking(state, &tracking_number);
            return Self::reject_offline(env, Mutation::DeleteShipmentTracking);
        }
        let Some(ids) = state.ids() else {
            return SmallVec::new();
        };

        let tracking = pending.tracking.clone();
        let repository = Arc::clone(&env.repository);
        smallvec![async_effect! {
            let result = repository.delete_order_shipment_tracking(ids, tracking).await;
            Some(OrderDetailAction::TrackingDeletionCommitted { tracking_number, result })
        }]
    }

    pub(super) fn tracking_deletion_committed(
        state: &mut OrderDetailState,
        tracking_number: &str,
        result: Result<(), RepositoryError>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        match result {
            Ok(()) => {
                state.pending_deletions.remove(tracking_number);
                Self::record_mutation(Mutation::DeleteShipmentTracking, "committed");
                smallvec![Self::notify(env, Notice::ShipmentTrackingDeleteSucceeded)]
            },
            Err(error) => {
                tracing::warn!(%tracking_number, %error, "Shipment tracking deletion failed");
                Self::restore_tracking(state, tracking_number);
                Self::commit_failed(env, Mutation::DeleteShipmentTracking)
            },
        }
    }

    /// Put a removed tracking back where it was
    fn restore_tracking(state: &mut OrderDetailState, tracking_number: &str) {
        let Some(pending) = state.pending_deletions.remove(tracking_number) else {
            return;
        };
        if let Some(index) = pending.index {
            let index = index.min(state.raw_trackings.len());
            state.raw_trackings.insert(index, pending.tracking);
        }
        state.recompute();
    }

    // ========== Order status ==========

    pub(super) fn change_order_status(
        state: &mut OrderDetailState,
        status_key: String,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        if !env.is_connected() {
            return Self::reject_offline(env, Mutation::ChangeOrderStatus);
        }
        if state.ids().is_none() {
            tracing::warn!("Ignoring status change before the order is loaded");
            return SmallVec::new();
        }

        let previous = state.snapshot.get_snapshot().order_status;
        let next = env.repository.get_order_status(&status_key);
        let notice = if status_key == CoreOrderStatus::Completed.key() {
            Notice::OrderMarkedComplete
        } else {
            Notice::OrderStatusChanged {
                label: next.label.clone(),
            }
        };

        let change_id = state.allocate_change_id();
        tracing::debug!(change_id, %status_key, "Status change shown before commit");
        state
            .pending_status_changes
            .insert(change_id, PendingStatusChange { status_key, previous });
        state
            .snapshot
            .apply_patch(&ViewStatePatch::new().order_status(next));

        let (handle, resolution) = UndoHandle::new();
        let events = env.events.clone();
        smallvec![async_effect! {
            events.emit(OrderDetailEvent::UndoSnackbar { notice, handle });
            let outcome = resolution.outcome().await;
            Some(OrderDetailAction::StatusChangeResolved { change_id, outcome })
        }]
    }

    pub(super) fn status_change_resolved(
        state: &mut OrderDetailState,
        change_id: u64,
        outcome: UndoOutcome,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        let Some(pending) = state.pending_status_changes.get(&change_id) else {
            return SmallVec::new();
        };

        if outcome == UndoOutcome::Undone {
            tracing::debug!(change_id, "Status change undone");
            Self::restore_status(state, change_id);
            Self::record_mutation(Mutation::ChangeOrderStatus, "undone");
            return SmallVec::new();
        }

        if !env.is_connected() {
            Self::restore_status(state, change_id);
            return Self::reject_offline(env, Mutation::ChangeOrderStatus);
        }
        let Some(ids) = state.ids() else {
            return SmallVec::new();
        };

        let status_key = pending.status_key.clone();
        let repository = Arc::clone(&env.repository);
        smallvec![async_effect! {
            let result = repository.update_order_status(ids, status_key).await;
            Some(OrderDetailAction::StatusChangeCommitted { change_id, result })
        }]
    }

    pub(super) fn status_change_committed(
        state: &mut OrderDetailState,
        change_id: u64,
        result: Result<(), RepositoryError>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        match result {
            Ok(()) => {
                let Some(pending) = state.pending_status_changes.remove(&change_id) else {
                    return SmallVec::new();
                };
                Self::record_mutation(Mutation::ChangeOrderStatus, "committed");

                if state.last_committed_change > change_id {
                    tracing::debug!(change_id, "A later status change already committed");
                    return SmallVec::new();
                }
                state.last_committed_change = change_id;

                let Some(order) = state.order() else {
                    return SmallVec::new();
                };
                let mut patch = ViewStatePatch::new().order(order.with_status(&pending.status_key));
                // A later change still pending keeps showing its own status
                if state.pending_status_changes.range(change_id + 1..).next().is_none() {
                    patch = patch.order_status(env.repository.get_order_status(&pending.status_key));
                }
                state.snapshot.apply_patch(&patch);
                SmallVec::new()
            },
            Err(error) => {
                tracing::warn!(change_id, %error, "Status change failed");
                Self::restore_status(state, change_id);
                Self::commit_failed(env, Mutation::ChangeOrderStatus)
            },
        }
    }

    /// Revert one status change
    ///
    /// A later change still pending inherits the status to go back to, and a
    /// later change that already committed keeps what it shows.
    fn restore_status(state: &mut OrderDetailState, change_id: u64) {
        let Some(pending) = state.pending_status_changes.remove(&change_id) else {
            return;
        };
        if let Some((_, later)) = state.pending_status_changes.range_mut(change_id + 1..).next() {
            later.previous = pending.previous;
            return;
        }
        if state.last_committed_change > change_id {
            return;
        }
        if let Some(previous) = pending.previous {
            state
                .snapshot
                .apply_patch(&ViewStatePatch::new().order_status(previous));
        }
    }

    fn commit_failed(env: &OrderDetailEnvironment, mutation: Mutation) -> Effects {
        Self::record_mutation(mutation, "rolled_back");
        smallvec![Self::notify(
            env,
            Notice::Failure(OrderDetailError::MutationCommit(mutation))
        )]
    }
}
