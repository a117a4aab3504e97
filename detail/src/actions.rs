//! Actions of the order detail reducer.
//!
//! Commands are what the screen asks for. Events are results of effects fed
//! back into the store.

use crate::error::RepositoryError;
use crate::events::UndoOutcome;
use crate::types::{Order, OrderNote, OrderShipmentTracking, Refund, RequestResult, ShippingLabel};
use order_detail_macros::Action;

/// Outcome of the remote phase of a section loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh<T> {
    /// Offline; the local value stands
    Skipped,
    /// Fresh value from the remote store
    Fetched(T),
    /// The remote call failed; the local value stands
    Failed(RepositoryError),
}

impl<T> Refresh<T> {
    /// Convert a repository result into a refresh outcome
    pub fn from_result(result: Result<T, RepositoryError>) -> Self {
        match result {
            Ok(value) => Self::Fetched(value),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Every input the order detail reducer handles
#[derive(Action, Clone, Debug, PartialEq)]
pub enum OrderDetailAction {
    // ========== Commands ==========
    /// Load the order and every section
    #[command]
    Start,

    /// Re-fetch the order from the remote store
    #[command]
    RefreshRequested,

    /// Add a note to the order
    #[command]
    AddOrderNote {
        /// Note text
        note: String,
        /// Whether the customer is notified
        is_customer_note: bool,
    },

    /// Add a shipment tracking to the order
    #[command]
    AddShipmentTracking {
        /// The new tracking
        tracking: OrderShipmentTracking,
    },

    /// Delete a shipment tracking, behind an undo prompt
    #[command]
    DeleteShipmentTracking {
        /// Number of the tracking to delete
        tracking_number: String,
    },

    /// Change the order status, behind an undo prompt
    #[command]
    ChangeOrderStatus {
        /// New status key
        status_key: String,
    },

    /// A shipping label was refunded elsewhere; reload labels
    #[command]
    ShippingLabelRefunded,

    // ========== Events ==========
    /// The local cache was read for the order
    #[event]
    LocalOrderLoaded {
        /// Cached order, if any
        order: Option<Order>,
    },

    /// The remote fetch of the order finished
    #[event]
    OrderFetched {
        /// Fetched order or the failure
        result: Result<Order, RepositoryError>,
    },

    /// Cached notes were read
    #[event]
    NotesLoaded {
        /// Cached notes
        notes: Vec<OrderNote>,
    },

    /// The remote note refresh settled
    #[event]
    NotesRefreshed {
        /// Refresh outcome
        outcome: Refresh<Vec<OrderNote>>,
    },

    /// Cached refunds were read
    #[event]
    RefundsLoaded {
        /// Cached refunds
        refunds: Vec<Refund>,
    },

    /// The remote refund refresh settled
    #[event]
    RefundsRefreshed {
        /// Refresh outcome
        outcome: Refresh<Vec<Refund>>,
    },

    /// Cached shipment trackings were read
    #[event]
    TrackingsLoaded {
        /// Cached trackings
        trackings: Vec<OrderShipmentTracking>,
    },

    /// The remote shipment tracking refresh settled
    #[event]
    TrackingsRefreshed {
        /// What the tracking list request reported
        result: RequestResult,
        /// Trackings re-read after a successful refresh, empty otherwise
        trackings: Vec<OrderShipmentTracking>,
    },

    /// Cached shipping labels were read
    #[event]
    LabelsLoaded {
        /// Cached labels
        labels: Vec<ShippingLabel>,
    },

    /// The remote shipping label refresh settled
    #[event]
    LabelsRefreshed {
        /// Refresh outcome
        outcome: Refresh<Vec<ShippingLabel>>,
    },

    /// The remote store answered a note addition
    #[event]
    NoteAddCommitted {
        /// Id of the provisional note shown meanwhile
        provisional_id: i64,
        /// Remote outcome
        result: Result<(), RepositoryError>,
    },

    /// The remote store answered a shipment tracking addition
    #[event]
    TrackingAddCommitted {
        /// The tracking shown meanwhile
        tracking: OrderShipmentTracking,
        /// Remote outcome
        result: Result<(), RepositoryError>,
    },

    /// The undo prompt of a tracking deletion closed
    #[event]
    TrackingDeletionResolved {
        /// Number of the deleted tracking
        tracking_number: String,
        /// How the prompt closed
        outcome: UndoOutcome,
    },

    /// The remote store answered a tracking deletion
    #[event]
    TrackingDeletionCommitted {
        /// Number of the deleted tracking
        tracking_number: String,
        /// Remote outcome
        result: Result<(), RepositoryError>,
    },

    /// The undo prompt of a status change closed
    #[event]
    StatusChangeResolved {
        /// Pending change id
        change_id: u64,
        /// How the prompt closed
        outcome: UndoOutcome,
    },

    /// The remote store answered a status change
    #[event]
    StatusChangeCommitted {
        /// Pending change id
        change_id: u64,
        /// Remote outcome
        result: Result<(), RepositoryError>,
    },
}
