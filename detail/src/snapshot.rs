//! The aggregate view snapshot and the store that publishes it.

use crate::types::{Order, OrderStatus};
use order_detail_runtime::{Observable, Subscription};
use serde::{Deserialize, Serialize};

/// A boolean flag that may not have been decided yet
///
/// `Unknown` is the state before the first load settles. Consumers that need
/// to react to transitions should compare against the previous value, since
/// `Unknown -> false` and `true -> false` mean different things on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriState {
    /// Not decided yet
    #[default]
    Unknown,
    /// Decided
    Known(bool),
}

impl TriState {
    /// True only for `Known(true)`
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::Known(true))
    }

    /// True only for `Known(false)`
    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::Known(false))
    }

    /// True once a value has been decided
    #[must_use]
    pub const fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The decided value, if any
    #[must_use]
    pub const fn as_option(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Known(value) => Some(value),
        }
    }

    /// The newly decided value when moving from `previous` to `self`
    ///
    /// Returns `None` when `self` is still unknown or did not change.
    #[must_use]
    pub fn changed_from(self, previous: Self) -> Option<bool> {
        match self {
            Self::Known(value) if self != previous => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        Self::Known(value)
    }
}

/// Everything the order detail screen shows outside the section lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailViewState {
    /// The order, once read locally or fetched
    pub order: Option<Order>,
    /// Display status; may differ from `order.status` while a status change is pending
    pub order_status: Option<OrderStatus>,
    /// Title shown above the order
    pub toolbar_title: Option<String>,
    /// Whole-screen placeholder while the order is fetched remotely
    pub is_order_detail_skeleton_shown: TriState,
    /// Placeholder for the notes section while notes are refreshed
    pub is_order_notes_skeleton_shown: TriState,
    /// Pull-to-refresh indicator
    pub is_refreshing: TriState,
    /// Whether the shipment tracking section is offered at all
    pub is_shipment_tracking_available: TriState,
}

/// A partial update to [`OrderDetailViewState`]
///
/// Only fields that were set are applied.
///
/// ```
/// use order_detail::snapshot::{OrderDetailViewState, TriState, ViewStatePatch};
///
/// let patch = ViewStatePatch::new().refreshing(true).toolbar_title("Order #12");
/// let next = patch.apply_to(&OrderDetailViewState::default());
/// assert_eq!(next.is_refreshing, TriState::Known(true));
/// assert_eq!(next.toolbar_title.as_deref(), Some("Order #12"));
/// assert_eq!(next.is_order_notes_skeleton_shown, TriState::Unknown);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStatePatch {
    order: Option<Order>,
    order_status: Option<OrderStatus>,
    toolbar_title: Option<String>,
    detail_skeleton: Option<TriState>,
    notes_skeleton: Option<TriState>,
    refreshing: Option<TriState>,
    shipment_tracking_available: Option<TriState>,
}

impl ViewStatePatch {
    /// An empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the order
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the display status
    #[must_use]
    pub fn order_status(mut self, status: OrderStatus) -> Self {
        self.order_status = Some(status);
        self
    }

    /// Set the toolbar title
    #[must_use]
    pub fn toolbar_title(mut self, title: impl Into<String>) -> Self {
        self.toolbar_title = Some(title.into());
        self
    }

    /// Set the whole-screen skeleton flag
    #[must_use]
    pub fn detail_skeleton(mut self, shown: impl Into<TriState>) -> Self {
        self.detail_skeleton = Some(shown.into());
        self
    }

    /// Set the notes skeleton flag
    #[must_use]
    pub fn notes_skeleton(mut self, shown: impl Into<TriState>) -> Self {
        self.notes_skeleton = Some(shown.into());
        self
    }

    /// Set the refreshing flag
    #[must_use]
    pub fn refreshing(mut self, refreshing: impl Into<TriState>) -> Self {
        self.refreshing = Some(refreshing.into());
        self
    }

    /// Set the shipment tracking availability flag
    #[must_use]
    pub fn shipment_tracking_available(mut self, available: impl Into<TriState>) -> Self {
        self.shipment_tracking_available = Some(available.into());
        self
    }

    /// True when no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch over `state`
    #[must_use]
    pub fn apply_to(&self, state: &OrderDetailViewState) -> OrderDetailViewState {
        let mut next = state.clone();
        if let Some(order) = &self.order {
            next.order = Some(order.clone());
        }
        if let Some(status) = &self.order_status {
            next.order_status = Some(status.clone());
        }
        if let Some(title) = &self.toolbar_title {
            next.toolbar_title = Some(title.clone());
        }
        if let Some(flag) = self.detail_skeleton {
            next.is_order_detail_skeleton_shown = flag;
        }
        if let Some(flag) = self.notes_skeleton {
            next.is_order_notes_skeleton_shown = flag;
        }
        if let Some(flag) = self.refreshing {
            next.is_refreshing = flag;
        }
        if let Some(flag) = self.shipment_tracking_available {
            next.is_shipment_tracking_available = flag;
        }
        next
    }
}

/// Holder of the current [`OrderDetailViewState`]
///
/// Cloning yields another handle to the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    cell: Observable<OrderDetailViewState>,
}

impl SnapshotStore {
    /// A store holding the empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot
    #[must_use]
    pub fn get_snapshot(&self) -> OrderDetailViewState {
        self.cell.get()
    }

    /// Merge `patch` into the snapshot and notify every subscriber
    pub fn apply_patch(&self, patch: &ViewStatePatch) -> OrderDetailViewState {
        self.cell.update(|state| *state = patch.apply_to(state))
    }

    /// Call `listener` with `(previous, current)` after every patch
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&OrderDetailViewState, &OrderDetailViewState) + Send + Sync + 'static,
    {
        self.cell.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_tri_state_transitions() {
        assert_eq!(TriState::Known(false).changed_from(TriState::Unknown), Some(false));
        assert_eq!(TriState::Known(false).changed_from(TriState::Known(true)), Some(false));
        assert_eq!(TriState::Known(true).changed_from(TriState::Known(true)), None);
        assert_eq!(TriState::Unknown.changed_from(TriState::Known(true)), None);
        assert_eq!(TriState::Unknown.as_option(), None);
        assert!(!TriState::Unknown.is_known());
        assert!(TriState::Known(false).is_known());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let base = OrderDetailViewState {
            toolbar_title: Some("Order #1".to_string()),
            is_refreshing: TriState::Known(true),
            ..OrderDetailViewState::default()
        };

        let next = ViewStatePatch::new().notes_skeleton(true).apply_to(&base);

        assert_eq!(next.toolbar_title.as_deref(), Some("Order #1"));
        assert!(next.is_refreshing.is_true());
        assert!(next.is_order_notes_skeleton_shown.is_true());
        assert_eq!(next.is_order_detail_skeleton_shown, TriState::Unknown);
    }

    #[test]
    fn test_apply_patch_notifies_every_subscriber() {
        let store = SnapshotStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _first = store.subscribe(move |previous, current| {
            sink.lock().unwrap().push((
                previous.is_refreshing,
                current.is_refreshing,
            ));
        });
        let sink = Arc::clone(&seen);
        let _second = store.subscribe(move |_, current| {
            sink.lock().unwrap().push((TriState::Unknown, current.is_refreshing));
        });

        let returned = store.apply_patch(&ViewStatePatch::new().refreshing(true));

        assert!(returned.is_refreshing.is_true());
        assert_eq!(store.get_snapshot(), returned);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .all(|(_, current)| current.is_true()));
    }

    #[test]
    fn test_empty_patch() {
        assert!(ViewStatePatch::new().is_empty());
        assert!(!ViewStatePatch::new().refreshing(false).is_empty());
    }
}
