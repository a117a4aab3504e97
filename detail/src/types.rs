//! Domain types for one order and the sections shown alongside it.
//!
//! All of these are plain values. The engine replaces them wholesale when a
//! newer copy arrives and never mutates a shared instance in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual identifier of an order, `"{site_id}-{remote_order_id}"`
///
/// This is what the screen is opened with; the numeric [`OrderIdSet`] is only
/// known once the order itself has been read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIdentifier(String);

impl OrderIdentifier {
    /// Build the identifier for an order on a site
    #[must_use]
    pub fn new(site_id: i64, remote_order_id: i64) -> Self {
        Self(format!("{site_id}-{remote_order_id}"))
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Paired local and remote identifiers of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIdSet {
    /// Row id in the local cache
    pub id: i64,
    /// Id on the remote store
    pub remote_order_id: i64,
}

/// Order status keys with special meaning to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreOrderStatus {
    /// Awaiting payment
    Pending,
    /// Paid, being fulfilled
    Processing,
    /// Waiting on the merchant
    OnHold,
    /// Fulfilled
    Completed,
    /// Cancelled by merchant or customer
    Cancelled,
    /// Fully refunded
    Refunded,
    /// Payment failed
    Failed,
}

impl CoreOrderStatus {
    /// The status key used by the remote store
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }

    /// Parse a status key; custom statuses return `None`
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        [
            Self::Pending,
            Self::Processing,
            Self::OnHold,
            Self::Completed,
            Self::Cancelled,
            Self::Refunded,
            Self::Failed,
        ]
        .into_iter()
        .find(|status| status.key() == key)
    }
}

/// One purchased line of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Line item id, referenced by refunds
    pub item_id: i64,
    /// Remote id of the purchased product
    pub product_id: i64,
    /// Product name at the time of purchase
    pub name: String,
    /// Number of units bought
    pub quantity: u32,
}

/// A business order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Textual identifier the order was opened with
    pub identifier: OrderIdentifier,
    /// Local and remote ids
    pub ids: OrderIdSet,
    /// Display number
    pub number: String,
    /// Status key, see [`CoreOrderStatus`] for the well-known ones
    pub status: String,
    /// Purchased lines
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Copy of this order carrying a different status key
    #[must_use]
    pub fn with_status(&self, status_key: &str) -> Self {
        Self {
            status: status_key.to_string(),
            ..self.clone()
        }
    }

    /// Title shown above the order detail
    #[must_use]
    pub fn toolbar_title(&self) -> String {
        format!("Order #{}", self.number)
    }

    /// Remote product ids of every line item
    #[must_use]
    pub fn product_ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.product_id).collect()
    }
}

/// Resolved display status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Status key
    pub status_key: String,
    /// Human readable label
    pub label: String,
}

/// A note attached to an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    /// Remote id; negative while the note only exists locally
    pub remote_note_id: i64,
    /// Creation time
    pub date_created: DateTime<Utc>,
    /// Note text
    pub note: String,
    /// Whether the customer is notified about this note
    pub is_customer_note: bool,
}

impl OrderNote {
    /// True for a note created locally and not yet confirmed by the server
    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        self.remote_note_id < 0
    }
}

/// Shipment tracking entry; the tracking number is its natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipmentTracking {
    /// Carrier tracking number
    pub tracking_number: String,
    /// Carrier name
    pub tracking_provider: String,
    /// Link to the carrier's tracking page
    pub tracking_link: String,
    /// Shipping date as entered by the merchant
    pub date_shipped: String,
    /// True when the provider is not one of the built-in carriers
    pub is_custom_provider: bool,
}

/// A purchased shipping label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLabel {
    /// Label id
    pub id: i64,
    /// Carrier tracking number printed on the label
    pub tracking_number: String,
    /// Carrier id
    pub carrier_id: String,
    /// Carrier service name
    pub service_name: String,
    /// Names of the products packed under this label
    pub product_names: Vec<String>,
    /// Order line items matching `product_names`
    #[serde(default)]
    pub products: Vec<OrderItem>,
}

impl ShippingLabel {
    /// Attach the order line items whose names are listed on this label
    #[must_use]
    pub fn with_products(mut self, items: &[OrderItem]) -> Self {
        self.products = items
            .iter()
            .filter(|item| self.product_names.iter().any(|name| *name == item.name))
            .cloned()
            .collect();
        self
    }
}

/// Quantity of one line item covered by a refund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundItem {
    /// Refunded line item id
    pub item_id: i64,
    /// Refunded units
    pub quantity: u32,
}

/// A refund issued against an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    /// Refund id
    pub id: i64,
    /// Creation time
    pub date_created: DateTime<Utc>,
    /// Refunded amount in minor currency units
    pub amount_cents: i64,
    /// Reason given by the merchant
    pub reason: Option<String>,
    /// Refunded line items
    pub items: Vec<RefundItem>,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Remote product id
    pub remote_product_id: i64,
    /// Product name
    pub name: String,
    /// Virtual products need no shipping
    pub is_virtual: bool,
}

/// Outcome reported by the shipment tracking list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestResult {
    /// The list was fetched and stored locally
    Success,
    /// The request failed
    Error,
    /// Nothing was requested
    NoAction,
    /// The shipment tracking extension is not installed on the store
    ApiNotFound,
    /// No network connection
    NoConnection,
}
