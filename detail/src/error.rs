//! Error types.
//!
//! [`RepositoryError`] is what the data layer reports. [`OrderDetailError`] is
//! what the user gets to see; it travels inside a failure notice and is never
//! returned from the engine's public methods.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure reported by the repository port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The request did not reach the server or timed out
    #[error("network error: {0}")]
    Network(String),

    /// The server does not know the requested resource
    #[error("resource not found")]
    NotFound,

    /// The server refused the request
    #[error("rejected by server: {0}")]
    Rejected(String),
}

/// Data section fetched from the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// The order itself
    Order,
    /// Order notes
    Notes,
    /// Refunds
    Refunds,
    /// Shipment trackings
    ShipmentTrackings,
    /// Shipping labels
    ShippingLabels,
}

impl Section {
    /// Stable name for logs and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Notes => "notes",
            Self::Refunds => "refunds",
            Self::ShipmentTrackings => "shipment_trackings",
            Self::ShippingLabels => "shipping_labels",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-initiated change sent to the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    /// Add an order note
    AddNote,
    /// Add a shipment tracking
    AddShipmentTracking,
    /// Delete a shipment tracking
    DeleteShipmentTracking,
    /// Change the order status
    ChangeOrderStatus,
}

impl Mutation {
    /// Stable name for logs and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddNote => "add_note",
            Self::AddShipmentTracking => "add_shipment_tracking",
            Self::DeleteShipmentTracking => "delete_shipment_tracking",
            Self::ChangeOrderStatus => "change_order_status",
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-visible failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDetailError {
    /// The device was offline; nothing was changed
    #[error("no network connection")]
    Offline,

    /// A remote read failed; cached data is still shown
    #[error("failed to fetch {0}")]
    Fetch(Section),

    /// A remote write failed after the local change; the change was rolled back
    #[error("failed to commit {0}")]
    MutationCommit(Mutation),
}
