//! Sync status events.
//!
//! Mutations persist in the background; callers observe the outcome through
//! a broadcast channel rather than blocking on it. The presentation layer
//! typically renders the latest status as a transient message.

use tokio::sync::broadcast;

/// Progress and outcome of persistence operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new status
/// variants in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SyncStatus {
    /// Initial fetch from the remote table is in flight.
    Loading,
    /// Initial fetch finished.
    Loaded {
        /// How many items were adopted.
        items: usize,
    },
    /// A background save started.
    Saving {
        /// What is being saved ("vehicle" or an item title).
        what: String,
    },
    /// A background save landed.
    Saved {
        /// What was saved.
        what: String,
    },
    /// A full wipe is in flight.
    Wiping,
    /// A full wipe finished cleanly.
    Wiped,
    /// An operation failed.
    Failed {
        /// Which operation ("load", "save", "delete", "reset").
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },
}

/// Receiver for status events.
pub type StatusReceiver = broadcast::Receiver<SyncStatus>;

/// Dispatcher fanning status events out to any number of observers.
#[derive(Debug, Clone)]
pub struct StatusDispatcher {
    sender: broadcast::Sender<SyncStatus>,
}

impl StatusDispatcher {
    /// Create a dispatcher with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to status events.
    pub fn subscribe(&self) -> StatusReceiver {
        self.sender.subscribe()
    }

    /// Send a status event.
    pub fn send(&self, status: SyncStatus) {
        // Ignore error if no receivers
        let _ = self.sender.send(status);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StatusDispatcher {
    fn default() -> Self {
        Self::new(64)
    }
}
