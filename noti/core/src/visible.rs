//! Visible List
//!
//! The toasts currently on screen, in insertion order (oldest first), stacked
//! bottom-up: each new toast sits above the previous one. The list owns every
//! rendered handle between creation and destruction.
//!
//! # Placement
//!
//! ```text
//!   ┌──────────────┐  ← newest
//!   │   toast C    │  bottom_offset = 120
//!   └──────────────┘
//!   ┌──────────────┐
//!   │   toast B    │  bottom_offset = 75
//!   └──────────────┘
//!   ┌──────────────┐  ← oldest
//!   │   toast A    │  bottom_offset = 20
//!   └──────────────┘
//!  ───────────────────  viewport bottom (base_offset = 15, padding = 5)
//! ```
//!
//! Heights are measured by the surface, not assumed, since styled content may
//! wrap. Admission is gated on a height budget so toasts never crowd out the
//! rest of the UI.

use crate::notification::{Notification, QueuedToast, ToastId};
use crate::surface::RenderSurface;

/// Geometry parameters for stacking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackLayout {
    /// Maximum occupied height (checked against `current_height + height`)
    pub capacity: u32,
    /// Gap between consecutive toasts
    pub padding: u32,
    /// Starting value of the running height (distance of the stack from the
    /// viewport bottom, minus one padding)
    pub base_offset: u32,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self {
            capacity: 540,
            padding: 5,
            base_offset: 15,
        }
    }
}

/// A toast while it is on screen
#[derive(Debug)]
pub struct VisibleEntry<H> {
    /// Stable toast ID
    pub id: ToastId,
    /// The request being shown
    pub notification: Notification,
    /// Rendered box (owned)
    pub handle: H,
    /// Current distance from the viewport bottom
    pub bottom_offset: u32,
    /// Measured height, fixed at insertion
    pub height: u32,
}

/// What is left of an entry after removal (its handle is already destroyed)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedEntry {
    /// Stable toast ID
    pub id: ToastId,
    /// The request that was shown
    pub notification: Notification,
    /// Offset at the moment of removal
    pub bottom_offset: u32,
    /// Measured height
    pub height: u32,
}

/// Ordered collection of on-screen toasts
pub struct VisibleList<S: RenderSurface> {
    entries: Vec<VisibleEntry<S::Handle>>,
    current_height: u32,
    layout: StackLayout,
}

impl<S: RenderSurface> std::fmt::Debug for VisibleList<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibleList")
            .field("size", &self.entries.len())
            .field("current_height", &self.current_height)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<S: RenderSurface> VisibleList<S> {
    /// Create an empty list
    #[must_use]
    pub fn new(layout: StackLayout) -> Self {
        Self {
            entries: Vec::new(),
            current_height: layout.base_offset,
            layout,
        }
    }

    /// Try to put `toast` on screen
    ///
    /// Creates a handle, measures it, and either places it on top of the
    /// stack or destroys it again and hands the toast back when it would
    /// exceed the capacity. A rejection is not an error; the caller re-queues.
    ///
    /// # Errors
    ///
    /// Returns the toast unchanged when there is no room.
    pub fn try_insert(
        &mut self,
        toast: QueuedToast,
        surface: &mut S,
    ) -> Result<ToastId, QueuedToast> {
        let (handle, height) = surface.create_handle(&toast.notification);

        if self.current_height.saturating_add(height) > self.layout.capacity {
            surface.destroy(handle);
            tracing::trace!(
                id = %toast.id,
                height,
                current_height = self.current_height,
                capacity = self.layout.capacity,
                "No room for toast"
            );
            return Err(toast);
        }

        let bottom_offset = self.current_height + self.layout.padding;
        self.current_height += height + self.layout.padding;

        surface.set_colours(&handle, &toast.notification.resolved_colours());
        surface.set_position(&handle, bottom_offset);
        surface.set_visible(&handle, true);

        let id = toast.id;
        self.entries.push(VisibleEntry {
            id,
            notification: toast.notification,
            handle,
            bottom_offset,
            height,
        });

        tracing::debug!(%id, height, bottom_offset, "Toast placed");
        Ok(id)
    }

    /// Take a toast off screen and close the gap
    ///
    /// Entries inserted after the removed one move down by its height plus
    /// padding (never below zero); earlier entries stay put. Removing an ID
    /// that is not on screen does nothing and returns `None`.
    pub fn remove(&mut self, id: ToastId, surface: &mut S) -> Option<RemovedEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(index);

        let shift = entry.height + self.layout.padding;
        self.current_height = self.current_height.saturating_sub(shift);

        for later in &mut self.entries[index..] {
            later.bottom_offset = later.bottom_offset.saturating_sub(shift);
            surface.set_position(&later.handle, later.bottom_offset);
        }

        surface.destroy(entry.handle);

        Some(RemovedEntry {
            id: entry.id,
            notification: entry.notification,
            bottom_offset: entry.bottom_offset,
            height: entry.height,
        })
    }

    /// Destroy every handle and reset the stack
    pub fn drain(&mut self, surface: &mut S) -> Vec<ToastId> {
        let ids = self.entries.iter().map(|e| e.id).collect();
        for entry in self.entries.drain(..) {
            surface.destroy(entry.handle);
        }
        self.current_height = self.layout.base_offset;
        ids
    }

    /// Number of toasts on screen
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is on screen
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Running height used for admission (starts at `base_offset`)
    #[must_use]
    pub fn current_height(&self) -> u32 {
        self.current_height
    }

    /// Sum of `height + padding` over visible entries
    #[must_use]
    pub fn occupied(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.height + self.layout.padding)
            .sum()
    }

    /// Admission threshold
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.layout.capacity
    }

    /// Change the admission threshold; on-screen toasts are not evicted
    pub fn set_capacity(&mut self, capacity: u32) {
        self.layout.capacity = capacity;
    }

    /// Layout in effect
    #[must_use]
    pub fn layout(&self) -> StackLayout {
        self.layout
    }

    /// Look up an on-screen toast
    #[must_use]
    pub fn get(&self, id: ToastId) -> Option<&VisibleEntry<S::Handle>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether `id` is on screen
    #[must_use]
    pub fn contains(&self, id: ToastId) -> bool {
        self.get(id).is_some()
    }

    /// On-screen toasts, oldest first
    #[must_use]
    pub fn entries(&self) -> &[VisibleEntry<S::Handle>] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::RecordingSurface;

    fn toast(msg: &str) -> QueuedToast {
        QueuedToast::new(Notification::new(msg, Duration::from_secs(1)))
    }

    fn layout(capacity: u32) -> StackLayout {
        StackLayout {
            capacity,
            ..StackLayout::default()
        }
    }

    #[test]
    fn test_insert_stacks_bottom_up() {
        let mut surface = RecordingSurface::new(10)
            .with_height("a", 50)
            .with_height("b", 40)
            .with_height("c", 30);
        let probe = surface.probe();
        let mut list = VisibleList::new(layout(1000));

        for msg in ["a", "b", "c"] {
            list.try_insert(toast(msg), &mut surface).unwrap();
        }

        assert_eq!(list.size(), 3);
        assert_eq!(probe.offset_of("a"), Some(20));
        assert_eq!(probe.offset_of("b"), Some(75));
        assert_eq!(probe.offset_of("c"), Some(120));
        assert_eq!(list.current_height(), 150);
        assert!(probe.is_visible("c"));
        assert_eq!(probe.stacked_messages(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_rejects_over_capacity() {
        let mut surface = RecordingSurface::new(60);
        let probe = surface.probe();
        let mut list = VisibleList::new(layout(100));

        let first = toast("first");
        let second = toast("second");

        assert_eq!(list.try_insert(first.clone(), &mut surface), Ok(first.id));
        assert_eq!(list.current_height(), 80);

        // 80 + 60 = 140 > 100
        assert_eq!(list.try_insert(second.clone(), &mut surface), Err(second));
        assert_eq!(list.size(), 1);
        assert_eq!(list.current_height(), 80);

        // The probe handle was created and destroyed again
        assert_eq!(probe.live_count(), 1);
        assert_eq!(probe.destroyed_count(), 1);
    }

    #[test]
    fn test_insert_exactly_at_capacity() {
        let mut surface = RecordingSurface::new(85);
        let mut list = VisibleList::new(layout(100));

        // 15 + 85 = 100, not over
        assert!(list.try_insert(toast("fits"), &mut surface).is_ok());
    }

    #[test]
    fn test_remove_middle_repacks_later_entries() {
        let mut surface = RecordingSurface::new(10)
            .with_height("a", 50)
            .with_height("b", 40)
            .with_height("c", 30);
        let probe = surface.probe();
        let mut list = VisibleList::new(layout(1000));

        list.try_insert(toast("a"), &mut surface).unwrap();
        let middle = list.try_insert(toast("b"), &mut surface).unwrap();
        list.try_insert(toast("c"), &mut surface).unwrap();

        let removed = list.remove(middle, &mut surface).unwrap();
        assert_eq!(removed.height, 40);
        assert_eq!(removed.bottom_offset, 75);

        assert_eq!(probe.offset_of("a"), Some(20));
        assert_eq!(probe.offset_of("c"), Some(75));
        assert_eq!(probe.offset_of("b"), None);
        assert_eq!(list.current_height(), 105);
        assert_eq!(list.size(), 2);
    }

    #[test]
    fn test_remove_newest_leaves_others() {
        let mut surface = RecordingSurface::new(20);
        let probe = surface.probe();
        let mut list = VisibleList::new(layout(1000));

        list.try_insert(toast("a"), &mut surface).unwrap();
        let top = list.try_insert(toast("b"), &mut surface).unwrap();
        let before = probe.calls().len();

        list.remove(top, &mut surface).unwrap();

        // Only the destroy call; nobody was repositioned
        assert_eq!(probe.calls().len(), before + 1);
        assert_eq!(probe.offset_of("a"), Some(20));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut surface = RecordingSurface::new(20);
        let probe = surface.probe();
        let mut list = VisibleList::new(layout(1000));

        let id = list.try_insert(toast("a"), &mut surface).unwrap();
        list.try_insert(toast("b"), &mut surface).unwrap();

        assert!(list.remove(id, &mut surface).is_some());
        let height = list.current_height();
        let calls = probe.calls().len();

        assert!(list.remove(id, &mut surface).is_none());
        assert_eq!(list.current_height(), height);
        assert_eq!(probe.calls().len(), calls);
        assert_eq!(probe.destroyed_count(), 1);
    }

    #[test]
    fn test_capacity_invariant_holds_under_churn() {
        let mut surface = RecordingSurface::new(17);
        let mut list = VisibleList::new(layout(200));
        let mut ids = Vec::new();

        for round in 0..50 {
            match list.try_insert(toast(&format!("t{round}")), &mut surface) {
                Ok(id) => ids.push(id),
                Err(_) => {
                    let oldest = ids.remove(0);
                    list.remove(oldest, &mut surface);
                }
            }
            assert!(list.occupied() <= list.capacity());
            assert_eq!(list.current_height(), list.layout().base_offset + list.occupied());
        }
    }

    #[test]
    fn test_drain_destroys_everything() {
        let mut surface = RecordingSurface::new(20);
        let probe = surface.probe();
        let mut list = VisibleList::new(layout(1000));

        list.try_insert(toast("a"), &mut surface).unwrap();
        list.try_insert(toast("b"), &mut surface).unwrap();

        let drained = list.drain(&mut surface);
        assert_eq!(drained.len(), 2);
        assert!(list.is_empty());
        assert_eq!(list.current_height(), 15);
        assert_eq!(probe.live_count(), 0);
    }
}
