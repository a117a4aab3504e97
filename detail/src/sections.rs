//! Independently observable section lists.

use crate::types::{OrderItem, OrderNote, OrderShipmentTracking, Refund, ShippingLabel};
use order_detail_runtime::Observable;

/// The five lists shown next to the order
///
/// Each list is replaced as a whole on update. Products and shipment
/// trackings are derived; the other three hold what was last loaded.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    /// Order notes, newest first
    pub notes: Observable<Vec<OrderNote>>,
    /// Refunds issued against the order
    pub refunds: Observable<Vec<Refund>>,
    /// Line items still to be shipped
    pub products: Observable<Vec<OrderItem>>,
    /// Shipment trackings, newest first
    pub shipment_trackings: Observable<Vec<OrderShipmentTracking>>,
    /// Purchased shipping labels
    pub shipping_labels: Observable<Vec<ShippingLabel>>,
}
