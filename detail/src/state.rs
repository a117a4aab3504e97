//! Reducer state for one order detail screen.

use crate::rules::{self, RuleInputs};
use crate::sections::Sections;
use crate::snapshot::{SnapshotStore, ViewStatePatch};
use crate::types::{
    Order, OrderIdSet, OrderIdentifier, OrderNote, OrderShipmentTracking, OrderStatus,
    RequestResult,
};
use std::collections::{BTreeMap, HashMap};

/// A tracking deletion waiting behind its undo prompt or its remote commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    /// The removed tracking
    pub tracking: OrderShipmentTracking,
    /// Where it sat in the tracking list, if it was listed
    pub index: Option<usize>,
}

/// A status change waiting behind its undo prompt or its remote commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStatusChange {
    /// Requested status key
    pub status_key: String,
    /// Display status before the change
    pub previous: Option<OrderStatus>,
}

/// State of the order detail reducer
///
/// The snapshot and section lists are observable handles; cloning the state
/// shares them. Everything else is private bookkeeping of the reducer.
#[derive(Debug, Clone)]
pub struct OrderDetailState {
    /// The order this screen was opened for
    pub identifier: OrderIdentifier,
    /// Published view snapshot
    pub snapshot: SnapshotStore,
    /// Published section lists
    pub sections: Sections,
    /// Set once `Start` has been handled
    pub started: bool,
    /// Trackings as last loaded, before label precedence
    pub raw_trackings: Vec<OrderShipmentTracking>,
    /// Outcome of the last remote tracking refresh
    pub tracking_result: Option<RequestResult>,
    /// Notes shown before their remote add has answered, newest first
    pub pending_notes: Vec<OrderNote>,
    /// Trackings shown before their remote add has answered, newest first
    pub pending_trackings: Vec<OrderShipmentTracking>,
    /// Tracking deletions keyed by tracking number
    pub pending_deletions: HashMap<String, PendingDeletion>,
    /// Status changes keyed by change id, in the order they were applied
    pub pending_status_changes: BTreeMap<u64, PendingStatusChange>,
    /// Id of the most recent status change that committed, 0 before any
    pub last_committed_change: u64,
    next_provisional_note_id: i64,
    next_change_id: u64,
}

impl OrderDetailState {
    /// Fresh state for `identifier`
    #[must_use]
    pub fn new(identifier: OrderIdentifier) -> Self {
        Self {
            identifier,
            snapshot: SnapshotStore::new(),
            sections: Sections::default(),
            started: false,
            raw_trackings: Vec::new(),
            tracking_result: None,
            pending_notes: Vec::new(),
            pending_trackings: Vec::new(),
            pending_deletions: HashMap::new(),
            pending_status_changes: BTreeMap::new(),
            last_committed_change: 0,
            next_provisional_note_id: -1,
            next_change_id: 1,
        }
    }

    /// The loaded order
    #[must_use]
    pub fn order(&self) -> Option<Order> {
        self.snapshot.get_snapshot().order
    }

    /// Ids of the loaded order
    #[must_use]
    pub fn ids(&self) -> Option<OrderIdSet> {
        self.snapshot.get_snapshot().order.map(|order| order.ids)
    }

    /// Publish a newly read or fetched order with its display status
    pub fn set_order(&mut self, order: Order, status: OrderStatus) {
        let title = order.toolbar_title();
        self.snapshot.apply_patch(
            &ViewStatePatch::new()
                .order(order)
                .order_status(status)
                .toolbar_title(title),
        );
        self.recompute();
    }

    /// Next id for a locally created note: -1, -2, ...
    pub fn allocate_provisional_note_id(&mut self) -> i64 {
        let id = self.next_provisional_note_id;
        self.next_provisional_note_id -= 1;
        id
    }

    /// Next id for a pending status change
    pub fn allocate_change_id(&mut self) -> u64 {
        let id = self.next_change_id;
        self.next_change_id += 1;
        id
    }

    /// Publish reloaded notes under the ones still being added
    pub fn replace_notes(&self, notes: Vec<OrderNote>) {
        let mut shown = self.pending_notes.clone();
        shown.extend(notes);
        self.sections.notes.set(shown);
    }

    /// Take reloaded trackings, keeping additions in flight and hiding
    /// deletions in flight
    pub fn replace_trackings(&mut self, trackings: Vec<OrderShipmentTracking>) {
        let mut shown: Vec<OrderShipmentTracking> = self
            .pending_trackings
            .iter()
            .filter(|pending| !trackings.contains(pending))
            .cloned()
            .collect();
        shown.extend(
            trackings
                .into_iter()
                .filter(|tracking| !self.pending_deletions.contains_key(&tracking.tracking_number)),
        );
        self.raw_trackings = shown;
        self.recompute();
    }

    /// Recompute products, listed trackings and tracking availability
    pub fn recompute(&self) {
        let snapshot = self.snapshot.get_snapshot();
        let refunds = self.sections.refunds.get();
        let labels = self.sections.shipping_labels.get();

        let derived = rules::derive(&RuleInputs {
            order: snapshot.order.as_ref(),
            refunds: &refunds,
            labels: &labels,
            trackings: &self.raw_trackings,
            tracking_result: self.tracking_result,
        });

        if self.sections.products.with(|products| *products != derived.products) {
            self.sections.products.set(derived.products);
        }
        if self
            .sections
            .shipment_trackings
            .with(|shown| *shown != derived.shipment_trackings)
        {
            self.sections.shipment_trackings.set(derived.shipment_trackings);
        }

        if snapshot.is_shipment_tracking_available != derived.is_shipment_tracking_available {
            self.snapshot.apply_patch(
                &ViewStatePatch::new()
                    .shipment_tracking_available(derived.is_shipment_tracking_available),
            );
        }
    }
}
