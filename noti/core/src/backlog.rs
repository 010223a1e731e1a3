//! Backlog Queue
//!
//! Strict FIFO of toasts that were accepted but cannot be shown yet. The
//! coordinator pops from the head once per promotion tick and pushes failed
//! promotions back onto the tail.
//!
//! The queue is unbounded unless a [`BacklogPolicy`] with a capacity is
//! configured; a slow surface then degrades to "toasts pile up" rather than
//! losing requests.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::notification::QueuedToast;

/// What to do when a bounded backlog is full
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BacklogPolicy {
    /// Never drop anything
    #[default]
    Unbounded,
    /// Evict the head to make room for the new toast
    DropOldest {
        /// Maximum queued toasts
        capacity: usize,
    },
    /// Refuse the new toast
    RejectNewest {
        /// Maximum queued toasts
        capacity: usize,
    },
}

impl BacklogPolicy {
    /// Capacity limit, if any
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::DropOldest { capacity } | Self::RejectNewest { capacity } => Some(*capacity),
        }
    }
}

/// Result of [`BacklogQueue::append`]
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum AppendOutcome {
    /// Queued at the tail
    Queued,
    /// Queued at the tail; the returned head was evicted to make room
    DroppedOldest(QueuedToast),
    /// Not queued; handed back to the caller
    Rejected(QueuedToast),
}

/// FIFO backlog of toasts waiting for screen space
#[derive(Debug, Default)]
pub struct BacklogQueue {
    items: VecDeque<QueuedToast>,
    policy: BacklogPolicy,
}

impl BacklogQueue {
    /// Create an unbounded backlog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backlog with the given overflow policy
    #[must_use]
    pub fn with_policy(policy: BacklogPolicy) -> Self {
        Self {
            items: VecDeque::new(),
            policy,
        }
    }

    /// Add a toast at the tail
    pub fn append(&mut self, toast: QueuedToast) -> AppendOutcome {
        let full = self
            .policy
            .capacity()
            .is_some_and(|cap| self.items.len() >= cap);

        if !full {
            self.items.push_back(toast);
            return AppendOutcome::Queued;
        }

        match self.policy {
            BacklogPolicy::DropOldest { .. } => match self.items.pop_front() {
                Some(dropped) => {
                    self.items.push_back(toast);
                    AppendOutcome::DroppedOldest(dropped)
                }
                // Zero capacity: nothing to evict, nowhere to put it
                None => AppendOutcome::Rejected(toast),
            },
            BacklogPolicy::RejectNewest { .. } | BacklogPolicy::Unbounded => {
                AppendOutcome::Rejected(toast)
            }
        }
    }

    /// Remove and return the head, or `None` when empty
    pub fn pop(&mut self) -> Option<QueuedToast> {
        self.items.pop_front()
    }

    /// Whether nothing is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of waiting toasts
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Overflow policy in effect
    #[must_use]
    pub fn policy(&self) -> BacklogPolicy {
        self.policy
    }

    /// Iterate in FIFO order without removing
    pub fn iter(&self) -> impl Iterator<Item = &QueuedToast> {
        self.items.iter()
    }

    /// Remove a specific toast (caller-requested dismiss before display)
    pub fn remove(&mut self, id: crate::ToastId) -> Option<QueuedToast> {
        let index = self.items.iter().position(|t| t.id == id)?;
        self.items.remove(index)
    }
}
