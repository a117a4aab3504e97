//! One-shot notifications sent to the screen.

use crate::error::OrderDetailError;
use std::fmt;
use tokio::sync::oneshot;

/// Message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A note was added
    NoteAdded,
    /// A shipment tracking was added
    ShipmentTrackingAdded,
    /// A shipment tracking was removed and can still be restored
    ShipmentTrackingDeleted,
    /// The server confirmed a shipment tracking deletion
    ShipmentTrackingDeleteSucceeded,
    /// The order was marked complete and can still be restored
    OrderMarkedComplete,
    /// The order status was changed and can still be restored
    OrderStatusChanged {
        /// Label of the new status
        label: String,
    },
    /// Something went wrong
    Failure(OrderDetailError),
}

impl Notice {
    /// True for failure notices
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The failure carried by this notice, if any
    #[must_use]
    pub const fn error(&self) -> Option<OrderDetailError> {
        match self {
            Self::Failure(error) => Some(*error),
            _ => None,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoteAdded => f.write_str("Note added"),
            Self::ShipmentTrackingAdded => f.write_str("Shipment tracking added"),
            Self::ShipmentTrackingDeleted => f.write_str("Shipment tracking deleted"),
            Self::ShipmentTrackingDeleteSucceeded => {
                f.write_str("Shipment tracking successfully deleted")
            },
            Self::OrderMarkedComplete => f.write_str("Order marked complete"),
            Self::OrderStatusChanged { label } => write!(f, "Order status changed to {label}"),
            Self::Failure(error) => write!(f, "Error: {error}"),
        }
    }
}

/// How an undo prompt was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The user pressed undo
    Undone,
    /// The prompt went away any other way
    Settled,
}

/// Resolution side of an undo prompt
///
/// Exactly one of [`UndoHandle::undo`] or [`UndoHandle::settle`] takes
/// effect. Dropping the handle without calling either counts as settling.
#[derive(Debug)]
pub struct UndoHandle {
    sender: oneshot::Sender<UndoOutcome>,
}

impl UndoHandle {
    pub(crate) fn new() -> (Self, UndoResolution) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, UndoResolution { receiver })
    }

    /// Revert the change; nothing is sent to the server
    pub fn undo(self) {
        self.resolve(UndoOutcome::Undone);
    }

    /// Close the prompt and commit the change
    pub fn settle(self) {
        self.resolve(UndoOutcome::Settled);
    }

    fn resolve(self, outcome: UndoOutcome) {
        if self.sender.send(outcome).is_err() {
            tracing::debug!(?outcome, "Undo prompt resolved after the screen was closed");
        }
    }
}

/// Awaitable side of an undo prompt, held by the pending effect
pub(crate) struct UndoResolution {
    receiver: oneshot::Receiver<UndoOutcome>,
}

impl UndoResolution {
    pub(crate) async fn outcome(self) -> UndoOutcome {
        self.receiver.await.unwrap_or(UndoOutcome::Settled)
    }
}

/// Event delivered once to the screen
#[derive(Debug)]
pub enum OrderDetailEvent {
    /// Transient message
    Snackbar(Notice),
    /// Message offering to revert a change that has not been sent yet
    UndoSnackbar {
        /// Message to show
        notice: Notice,
        /// Resolves the prompt
        handle: UndoHandle,
    },
}

impl OrderDetailEvent {
    /// The message carried by this event
    #[must_use]
    pub const fn notice(&self) -> &Notice {
        match self {
            Self::Snackbar(notice) | Self::UndoSnackbar { notice, .. } => notice,
        }
    }

    /// The undo handle, for prompts
    #[must_use]
    pub fn into_undo_handle(self) -> Option<UndoHandle> {
        match self {
            Self::Snackbar(_) => None,
            Self::UndoSnackbar { handle, .. } => Some(handle),
        }
    }
}
