//! Derived visibility rules.
//!
//! Products, shipment trackings and the tracking availability flag are never
//! stored directly. They are recomputed from the latest order, refunds,
//! shipping labels and raw tracking data whenever one of those changes.
//!
//! Precedence:
//! 1. Any shipping label hides products and trackings and marks tracking
//!    unavailable.
//! 2. Otherwise products are the line items not fully covered by refunds,
//!    with partially refunded lines showing their remaining quantity.

use crate::snapshot::TriState;
use crate::types::{Order, OrderItem, OrderShipmentTracking, Refund, RequestResult, ShippingLabel};
use std::collections::HashMap;

/// Inputs of the rule engine
#[derive(Debug, Clone, Copy)]
pub struct RuleInputs<'a> {
    /// The order, if loaded
    pub order: Option<&'a Order>,
    /// Refunds last loaded
    pub refunds: &'a [Refund],
    /// Shipping labels last loaded
    pub labels: &'a [ShippingLabel],
    /// Trackings last loaded, before label precedence
    pub trackings: &'a [OrderShipmentTracking],
    /// Outcome of the last remote tracking refresh, `None` until one settles
    pub tracking_result: Option<RequestResult>,
}

/// Output of the rule engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView {
    /// Line items to list under products
    pub products: Vec<OrderItem>,
    /// Trackings to list
    pub shipment_trackings: Vec<OrderShipmentTracking>,
    /// Whether the tracking section is offered
    pub is_shipment_tracking_available: TriState,
}

/// Recompute the derived sections
#[must_use]
pub fn derive(inputs: &RuleInputs<'_>) -> DerivedView {
    if !inputs.labels.is_empty() {
        return DerivedView {
            products: Vec::new(),
            shipment_trackings: Vec::new(),
            is_shipment_tracking_available: TriState::Known(false),
        };
    }

    let products = inputs
        .order
        .map(|order| non_refunded_items(&order.items, inputs.refunds))
        .unwrap_or_default();

    let is_shipment_tracking_available = inputs
        .tracking_result
        .map_or(TriState::Unknown, |result| {
            TriState::Known(result == RequestResult::Success)
        });

    DerivedView {
        products,
        shipment_trackings: inputs.trackings.to_vec(),
        is_shipment_tracking_available,
    }
}

/// Line items with quantity left after subtracting every refund
///
/// Lines whose whole quantity was refunded are dropped; the others keep their
/// order and carry the remaining quantity.
#[must_use]
pub fn non_refunded_items(items: &[OrderItem], refunds: &[Refund]) -> Vec<OrderItem> {
    let mut refunded: HashMap<i64, u32> = HashMap::new();
    for refund_item in refunds.iter().flat_map(|refund| refund.items.iter()) {
        let covered = refunded.entry(refund_item.item_id).or_default();
        *covered = covered.saturating_add(refund_item.quantity);
    }

    items
        .iter()
        .filter_map(|item| {
            let covered = refunded.get(&item.item_id).copied().unwrap_or(0);
            let remaining = item.quantity.saturating_sub(covered);
            (remaining > 0).then(|| OrderItem {
                quantity: remaining,
                ..item.clone()
            })
        })
        .collect()
}
