//! The order detail reducer.
//!
//! Loading lives in [`loaders`], user-initiated changes in [`mutations`]. Both
//! are `impl` blocks on [`OrderDetailReducer`]; this module only dispatches.

mod loaders;
mod mutations;

use crate::actions::OrderDetailAction;
use crate::environment::OrderDetailEnvironment;
use crate::error::{Mutation, OrderDetailError};
use crate::events::{Notice, OrderDetailEvent};
use crate::state::OrderDetailState;
use order_detail_core::effect::Effect;
use order_detail_core::fire_and_forget;
use order_detail_core::reducer::Reducer;
use order_detail_core::SmallVec;

/// Effects returned by every handler
pub(crate) type Effects = SmallVec<[Effect<OrderDetailAction>; 4]>;

/// Reducer driving one order detail screen
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderDetailReducer;

impl OrderDetailReducer {
    /// Creates a new order detail reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effect delivering a transient notice to the screen
    fn notify(env: &OrderDetailEnvironment, notice: Notice) -> Effect<OrderDetailAction> {
        let events = env.events.clone();
        fire_and_forget! {
            events.emit(OrderDetailEvent::Snackbar(notice));
        }
    }

    fn record_mutation(mutation: Mutation, outcome: &'static str) {
        metrics::counter!(
            "order_detail.mutations",
            "kind" => mutation.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }

    /// The offline guard shared by every mutation
    fn reject_offline(env: &OrderDetailEnvironment, mutation: Mutation) -> Effects {
        tracing::info!(mutation = mutation.as_str(), "Rejected mutation while offline");
        Self::record_mutation(mutation, "offline");
        order_detail_core::smallvec![Self::notify(
            env,
            Notice::Failure(OrderDetailError::Offline)
        )]
    }
}

impl Reducer for OrderDetailReducer {
    type State = OrderDetailState;
    type Action = OrderDetailAction;
    type Environment = OrderDetailEnvironment;

    fn reduce(
        &self,
        state: &mut OrderDetailState,
        action: OrderDetailAction,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        tracing::debug!(
            action = action.name(),
            command = action.is_command(),
            order = %state.identifier,
            "Reducing order detail action"
        );

        match action {
            // Loading
            OrderDetailAction::Start => Self::start(state, env),
            OrderDetailAction::RefreshRequested => Self::refresh_requested(state, env),
            OrderDetailAction::LocalOrderLoaded { order } => {
                Self::local_order_loaded(state, order, env)
            },
            OrderDetailAction::OrderFetched { result } => Self::order_fetched(state, result, env),
            OrderDetailAction::NotesLoaded { notes } => {
                state.replace_notes(notes);
                SmallVec::new()
            },
            OrderDetailAction::NotesRefreshed { outcome } => {
                Self::notes_refreshed(state, outcome, env)
            },
            OrderDetailAction::RefundsLoaded { refunds } => {
                state.sections.refunds.set(refunds);
                state.recompute();
                SmallVec::new()
            },
            OrderDetailAction::RefundsRefreshed { outcome } => {
                Self::refunds_refreshed(state, outcome, env)
            },
            OrderDetailAction::TrackingsLoaded { trackings } => {
                Self::trackings_loaded(state, trackings);
                SmallVec::new()
            },
            OrderDetailAction::TrackingsRefreshed { result, trackings } => {
                Self::trackings_refreshed(state, result, trackings);
                SmallVec::new()
            },
            OrderDetailAction::LabelsLoaded { labels } => {
                Self::labels_loaded(state, labels);
                SmallVec::new()
            },
            OrderDetailAction::LabelsRefreshed { outcome } => {
                Self::labels_refreshed(state, outcome, env)
            },
            OrderDetailAction::ShippingLabelRefunded => Self::reload_labels(state, env),

            // Mutations
            OrderDetailAction::AddOrderNote {
                note,
                is_customer_note,
            } => Self::add_order_note(state, note, is_customer_note, env),
            OrderDetailAction::NoteAddCommitted {
                provisional_id,
                result,
            } => Self::note_add_committed(state, provisional_id, result, env),
            OrderDetailAction::AddShipmentTracking { tracking } => {
                Self::add_shipment_tracking(state, tracking, env)
            },
            OrderDetailAction::TrackingAddCommitted { tracking, result } => {
                Self::tracking_add_committed(state, &tracking, result, env)
            },
            OrderDetailAction::DeleteShipmentTracking { tracking_number } => {
                Self::delete_shipment_tracking(state, tracking_number, env)
            },
            OrderDetailAction::TrackingDeletionResolved {
                tracking_number,
                outcome,
            } => Self::tracking_deletion_resolved(state, tracking_number, outcome, env),
            OrderDetailAction::TrackingDeletionCommitted {
                tracking_number,
                result,
            } => Self::tracking_deletion_committed(state, &tracking_number, result, env),
            OrderDetailAction::ChangeOrderStatus { status_key } => {
                Self::change_order_status(state, status_key, env)
            },
            OrderDetailAction::StatusChangeResolved { change_id, outcome } => {
                Self::status_change_resolved(state, change_id, outcome, env)
            },
            OrderDetailAction::StatusChangeCommitted { change_id, result } => {
                Self::status_change_committed(state, change_id, result, env)
            },
        }
    }
}
