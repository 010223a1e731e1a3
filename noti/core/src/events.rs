//! Coordinator Events
//!
//! Everything that mutates toast state arrives at the coordinator as a
//! [`ToastEvent`]. Caller requests come in on the managers' queue; progress
//! ticks, expiry and user dismissals fired by the surface come in on the
//! coordinator's internal queue. The coordinator handles them one at a time,
//! which keeps the backlog and visible list consistent without locks.

use tokio::sync::mpsc;

use crate::notification::{Notification, ToastId};

/// Events processed by the coordinator
#[derive(Debug)]
pub enum ToastEvent {
    // ============================================
    // Caller Requests
    // ============================================
    /// Queue a notification (ID already assigned by the caller side)
    Add {
        /// Assigned toast ID
        id: ToastId,
        /// The request
        notification: Notification,
    },

    /// Remove a toast by ID, wherever it currently is
    Dismiss(ToastId),

    /// The viewport changed height; recompute capacity
    Resized {
        /// New viewport height in surface units
        height: u32,
    },

    /// Tear everything down and stop the event loop
    Shutdown,

    // ============================================
    // Timer Events
    // ============================================
    /// A visible toast's progress advanced
    Progress {
        /// Which toast
        id: ToastId,
        /// Progress percentage (0-100)
        percent: u8,
    },

    /// A visible toast's lifetime ran out
    Expired(ToastId),

    // ============================================
    // Surface Events
    // ============================================
    /// The user interacted with a toast's handle
    Interacted(ToastId),
}

impl ToastEvent {
    /// Short name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Dismiss(_) => "dismiss",
            Self::Resized { .. } => "resized",
            Self::Shutdown => "shutdown",
            Self::Progress { .. } => "progress",
            Self::Expired(_) => "expired",
            Self::Interacted(_) => "interacted",
        }
    }
}

/// Sender half of a coordinator event queue
pub type EventSender = mpsc::UnboundedSender<ToastEvent>;

/// Receiver half of a coordinator event queue
pub type EventReceiver = mpsc::UnboundedReceiver<ToastEvent>;

/// Create a coordinator event queue
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// One-shot dismiss trigger handed to the surface for a visible toast
///
/// The surface keeps it next to the handle and calls [`DismissTrigger::fire`]
/// when the user clicks the toast. Firing consumes the trigger, so a handle can
/// dismiss its toast at most once.
#[derive(Debug)]
pub struct DismissTrigger {
    id: ToastId,
    tx: EventSender,
}

impl DismissTrigger {
    pub(crate) fn new(id: ToastId, tx: EventSender) -> Self {
        Self { id, tx }
    }

    /// The toast this trigger dismisses
    #[must_use]
    pub fn toast_id(&self) -> ToastId {
        self.id
    }

    /// Post the dismissal to the coordinator
    ///
    /// A stopped coordinator is not an error; the event is dropped.
    pub fn fire(self) {
        if self.tx.send(ToastEvent::Interacted(self.id)).is_err() {
            tracing::debug!(id = %self.id, "Dismiss fired after coordinator stopped");
        }
    }
}
