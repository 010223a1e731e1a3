//! Coordinator - The Toast Scheduler
//!
//! The Coordinator owns the backlog, the visible list and the rendering
//! surface, and is the only code that mutates any of them. Everything else
//! talks to it through [`ToastEvent`]s:
//!
//! ```text
//!   ToastManager::add ─────────┐
//!   ToastManager::dismiss ─────┴──► request queue ──┐
//!                                                   ├──► Coordinator ──► RenderSurface
//!   expiry ticks (per toast) ──┬──► internal queue ─┘        ▲
//!   dismiss triggers (clicks) ─┘                             │
//!                                        promotion tick ─────┘
//! ```
//!
//! Only managers hold senders to the request queue. When the last manager is
//! dropped the queue closes and the coordinator shuts down as if asked to.
//!
//! # Promotion
//!
//! Once per promotion interval the coordinator pops one toast from the
//! backlog and tries to place it. If it does not fit it goes back to the
//! tail of the backlog. Only one attempt is made per tick, which rate-limits
//! how fast the screen fills.
//!
//! # Removal
//!
//! Expiry, clicks and caller dismissals all funnel into the same removal
//! path. The entry's tick task is aborted first, then the entry is removed;
//! a second removal of the same toast finds nothing and does nothing.

use std::collections::HashMap;
use std::ops::ControlFlow;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::backlog::{AppendOutcome, BacklogQueue};
use crate::config::{ToastConfig, DEFAULT_VIEWPORT_HEIGHT};
use crate::events::{self, DismissTrigger, EventReceiver, EventSender, ToastEvent};
use crate::expiry::spawn_expiry;
use crate::notification::{Notification, QueuedToast, ToastId};
use crate::surface::RenderSurface;
use crate::visible::VisibleList;

/// Snapshot of the manager's state, published after every change
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ToastStats {
    /// Toasts waiting in the backlog
    pub backlog_len: usize,
    /// Toasts on screen
    pub visible: usize,
    /// Sum of `height + padding` over on-screen toasts
    pub occupied_height: u32,
    /// Current admission threshold
    pub capacity: u32,
    /// Toasts ever placed on screen
    pub shown_total: u64,
    /// Toasts removed by expiry
    pub expired_total: u64,
    /// Toasts removed by click or caller dismissal
    pub dismissed_total: u64,
    /// Toasts lost to a backlog overflow policy
    pub dropped_total: u64,
}

/// What a single promotion tick did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Promotion {
    /// Backlog was empty
    Idle,
    /// The head of the backlog is now on screen
    Shown(ToastId),
    /// The head did not fit and went back to the tail
    Deferred(ToastId),
}

/// Why a visible toast left the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RemovalReason {
    Expired,
    Dismissed,
}

/// Owner of all toast state; see the module docs
pub struct Coordinator<S: RenderSurface> {
    /// Configuration
    config: ToastConfig,
    /// The rendering surface
    surface: S,
    /// Toasts waiting for room
    backlog: BacklogQueue,
    /// Toasts on screen
    visible: VisibleList<S>,
    /// Per-toast tick tasks
    timers: HashMap<ToastId, AbortHandle>,
    /// Internal queue, cloned into timers and dismiss triggers
    tx: EventSender,
    /// Running counters and last published snapshot
    stats: ToastStats,
    /// Snapshot publisher
    stats_tx: watch::Sender<ToastStats>,
}

impl<S: RenderSurface> Coordinator<S> {
    /// Create a coordinator drawing on `surface`
    ///
    /// `tx` must be the sender half of the internal queue later passed to
    /// [`Coordinator::run`]; timers and dismiss triggers post to it.
    pub fn new(surface: S, config: ToastConfig, tx: EventSender) -> Self {
        let viewport = config
            .viewport_height
            .or_else(|| surface.viewport_height())
            .unwrap_or(DEFAULT_VIEWPORT_HEIGHT);
        let visible = VisibleList::new(config.stack_layout(viewport));
        let backlog = BacklogQueue::with_policy(config.backlog_policy);
        let (stats_tx, _) = watch::channel(ToastStats::default());

        let mut coordinator = Self {
            config,
            surface,
            backlog,
            visible,
            timers: HashMap::new(),
            tx,
            stats: ToastStats::default(),
            stats_tx,
        };
        coordinator.publish();
        coordinator
    }

    /// Queue a notification; never blocks, never fails
    pub fn add(&mut self, notification: Notification) -> ToastId {
        let toast = QueuedToast::new(notification);
        let id = toast.id;
        self.enqueue(toast);
        id
    }

    fn enqueue(&mut self, toast: QueuedToast) {
        let id = toast.id;
        match self.backlog.append(toast) {
            AppendOutcome::Queued => trace!(%id, backlog = self.backlog.len(), "Toast queued"),
            AppendOutcome::DroppedOldest(dropped) => {
                self.stats.dropped_total += 1;
                warn!(dropped = %dropped.id, %id, "Backlog full, dropped oldest toast");
            }
            AppendOutcome::Rejected(rejected) => {
                self.stats.dropped_total += 1;
                warn!(id = %rejected.id, "Backlog full, rejected toast");
            }
        }
    }

    /// Run one promotion step
    pub fn promote(&mut self) -> Promotion {
        let Some(toast) = self.backlog.pop() else {
            return Promotion::Idle;
        };

        match self.visible.try_insert(toast, &mut self.surface) {
            Ok(id) => {
                self.arm(id);
                self.stats.shown_total += 1;
                Promotion::Shown(id)
            }
            Err(toast) => {
                let id = toast.id;
                // We just popped, so a bounded backlog has room for it
                self.enqueue(toast);
                Promotion::Deferred(id)
            }
        }
    }

    /// Register the dismiss trigger and start the tick for a freshly placed toast
    fn arm(&mut self, id: ToastId) {
        let Some(entry) = self.visible.get(id) else {
            return;
        };

        self.surface
            .on_interaction(&entry.handle, DismissTrigger::new(id, self.tx.clone()));

        let timer = spawn_expiry(
            id,
            entry.notification.duration,
            self.config.tick_resolution,
            self.tx.clone(),
        );
        self.timers.insert(id, timer);
    }

    /// Remove a toast wherever it is
    ///
    /// Returns `false` if the toast is neither on screen nor waiting.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        if self.visible.contains(id) {
            return self.remove_visible(id, RemovalReason::Dismissed);
        }

        match self.backlog.remove(id) {
            Some(_) => {
                self.stats.dismissed_total += 1;
                debug!(%id, "Toast dismissed from backlog");
                true
            }
            None => {
                debug!(%id, "Dismiss for unknown toast ignored");
                false
            }
        }
    }

    fn remove_visible(&mut self, id: ToastId, reason: RemovalReason) -> bool {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }

        match self.visible.remove(id, &mut self.surface) {
            Some(removed) => {
                match reason {
                    RemovalReason::Expired => self.stats.expired_total += 1,
                    RemovalReason::Dismissed => self.stats.dismissed_total += 1,
                }
                debug!(%id, ?reason, height = removed.height, "Toast removed");
                true
            }
            None => {
                debug!(%id, ?reason, "Toast already removed");
                false
            }
        }
    }

    /// Recompute the capacity for a new viewport height
    ///
    /// Toasts already on screen stay; only new placements see the new budget.
    pub fn resize(&mut self, viewport_height: u32) {
        let capacity = self.config.capacity_for(viewport_height);
        self.visible.set_capacity(capacity);
        debug!(viewport_height, capacity, "Viewport resized");
    }

    /// Process one event
    pub fn handle_event(&mut self, event: ToastEvent) -> ControlFlow<()> {
        trace!(event = event.name(), "Handling event");

        match event {
            ToastEvent::Add { id, notification } => {
                self.enqueue(QueuedToast { id, notification });
            }
            ToastEvent::Dismiss(id) => {
                self.dismiss(id);
            }
            ToastEvent::Resized { height } => self.resize(height),
            ToastEvent::Shutdown => return ControlFlow::Break(()),
            ToastEvent::Progress { id, percent } => {
                if let Some(entry) = self.visible.get(id) {
                    self.surface.set_progress(&entry.handle, percent);
                }
                // Progress changes nothing the stats report
                return ControlFlow::Continue(());
            }
            ToastEvent::Expired(id) => {
                self.remove_visible(id, RemovalReason::Expired);
            }
            ToastEvent::Interacted(id) => {
                self.remove_visible(id, RemovalReason::Dismissed);
            }
        }

        self.publish();
        ControlFlow::Continue(())
    }

    /// Cancel every tick and destroy every handle
    pub fn shutdown(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        let cleared = self.visible.drain(&mut self.surface);
        info!(
            cleared = cleared.len(),
            backlog = self.backlog.len(),
            "Toast coordinator shut down"
        );
        self.publish();
    }

    /// Event loop: promotion ticks plus queued events
    ///
    /// Runs until a `Shutdown` arrives or every sender to `requests` is
    /// dropped. `internal` is the receiver paired with the sender given to
    /// [`Coordinator::new`].
    pub async fn run(mut self, mut requests: EventReceiver, mut internal: EventReceiver) {
        let interval = self.config.promotion_interval;
        let first = tokio::time::Instant::now() + interval;
        let mut promotion = tokio::time::interval_at(first, interval);
        promotion.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            promotion_ms = interval.as_millis(),
            tick_ms = self.config.tick_resolution.as_millis(),
            capacity = self.visible.capacity(),
            "Toast coordinator started"
        );

        loop {
            tokio::select! {
                biased;

                _ = promotion.tick() => {
                    if self.promote() != Promotion::Idle {
                        self.publish();
                    }
                }

                Some(event) = internal.recv() => {
                    let _ = self.handle_event(event);
                }

                request = requests.recv() => match request {
                    Some(event) => {
                        if self.handle_event(event).is_break() {
                            break;
                        }
                    }
                    None => {
                        debug!("All toast managers dropped");
                        break;
                    }
                }
            }
        }

        self.shutdown();
    }

    fn publish(&mut self) {
        self.stats.backlog_len = self.backlog.len();
        self.stats.visible = self.visible.size();
        self.stats.occupied_height = self.visible.occupied();
        self.stats.capacity = self.visible.capacity();
        self.stats_tx.send_replace(self.stats);
    }

    /// Latest snapshot
    #[must_use]
    pub fn stats(&self) -> ToastStats {
        self.stats
    }

    /// Receive snapshots as they are published
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ToastStats> {
        self.stats_tx.subscribe()
    }

    /// Toasts waiting for room
    #[must_use]
    pub fn backlog(&self) -> &BacklogQueue {
        &self.backlog
    }

    /// Toasts on screen
    #[must_use]
    pub fn visible(&self) -> &VisibleList<S> {
        &self.visible
    }

    /// The rendering surface
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of live tick tasks
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}

// ============================================================================
// ToastManager - caller-facing context
// ============================================================================

/// Handle to a running coordinator
///
/// Cheap to clone; pass it to whatever needs to raise toasts. All methods
/// return immediately. Requests sent after the coordinator stopped are
/// logged and dropped.
#[derive(Clone, Debug)]
pub struct ToastManager {
    tx: EventSender,
    stats: watch::Receiver<ToastStats>,
}

impl ToastManager {
    /// Start a coordinator on the current tokio runtime
    ///
    /// The task ends after [`ToastManager::shutdown`] or once every clone of
    /// the returned manager has been dropped.
    pub fn spawn<S: RenderSurface>(surface: S, config: ToastConfig) -> (Self, JoinHandle<()>) {
        let (tx, requests) = events::channel();
        let (internal_tx, internal) = events::channel();
        let coordinator = Coordinator::new(surface, config, internal_tx);
        let stats = coordinator.subscribe();
        let task = tokio::spawn(coordinator.run(requests, internal));
        (Self { tx, stats }, task)
    }

    /// Queue a notification for display
    pub fn add(&self, notification: Notification) -> ToastId {
        let id = ToastId::generate();
        self.send(ToastEvent::Add { id, notification });
        id
    }

    /// Remove a toast, whether on screen or still waiting
    pub fn dismiss(&self, id: ToastId) {
        self.send(ToastEvent::Dismiss(id));
    }

    /// Report a new viewport height
    pub fn resize(&self, viewport_height: u32) {
        self.send(ToastEvent::Resized {
            height: viewport_height,
        });
    }

    /// Stop the coordinator and clear the screen
    pub fn shutdown(&self) {
        self.send(ToastEvent::Shutdown);
    }

    /// Latest published snapshot
    #[must_use]
    pub fn stats(&self) -> ToastStats {
        *self.stats.borrow()
    }

    /// Receive snapshots as they are published
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ToastStats> {
        self.stats.clone()
    }

    fn send(&self, event: ToastEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            warn!(event = name, "Toast coordinator stopped, request dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backlog::BacklogPolicy;
    use crate::test_utils::RecordingSurface;

    fn config(viewport: u32) -> ToastConfig {
        let mut config = ToastConfig::default();
        config.viewport_height = Some(viewport);
        config
    }

    fn note(msg: &str) -> Notification {
        Notification::new(msg, Duration::from_secs(5))
    }

    fn coordinator(
        surface: RecordingSurface,
        config: ToastConfig,
    ) -> (Coordinator<RecordingSurface>, EventReceiver) {
        let (tx, rx) = events::channel();
        (Coordinator::new(surface, config, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotion_is_one_per_tick() {
        let (mut coord, _rx) = coordinator(RecordingSurface::new(10), config(1000));

        let a = coord.add(note("a"));
        let b = coord.add(note("b"));
        assert_eq!(coord.backlog().len(), 2);
        assert_eq!(coord.visible().size(), 0);

        assert_eq!(coord.promote(), Promotion::Shown(a));
        assert_eq!(coord.backlog().len(), 1);
        assert_eq!(coord.promote(), Promotion::Shown(b));
        assert_eq!(coord.promote(), Promotion::Idle);
        assert_eq!(coord.visible().size(), 2);
        assert_eq!(coord.active_timers(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_scenario_defers_to_backlog() {
        // viewport 200 → capacity 100
        let surface = RecordingSurface::new(60);
        let probe = surface.probe();
        let (mut coord, _rx) = coordinator(surface, config(200));

        let first = coord.add(note("first"));
        let second = coord.add(note("second"));

        assert_eq!(coord.promote(), Promotion::Shown(first));
        assert_eq!(coord.visible().current_height(), 80);

        assert_eq!(coord.promote(), Promotion::Deferred(second));
        assert_eq!(coord.visible().size(), 1);
        assert_eq!(coord.backlog().len(), 1);
        assert_eq!(probe.live_count(), 1);
        assert!(!probe.is_visible("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_toast_goes_behind_later_arrivals() {
        let surface = RecordingSurface::new(10).with_height("big", 500);
        let (mut coord, _rx) = coordinator(surface, config(200));

        let big = coord.add(note("big"));
        let small = coord.add(note("small"));

        assert_eq!(coord.promote(), Promotion::Deferred(big));
        assert_eq!(coord.promote(), Promotion::Shown(small));
        assert_eq!(coord.backlog().iter().map(|t| t.id).collect::<Vec<_>>(), vec![big]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interaction_registered_once_per_toast() {
        let surface = RecordingSurface::new(10);
        let probe = surface.probe();
        let (mut coord, mut rx) = coordinator(surface, config(1000));

        coord.add(note("a"));
        coord.promote();

        // Feed a burst of progress ticks through
        for _ in 0..10 {
            tokio::time::advance(Duration::from_millis(30)).await;
            tokio::task::yield_now().await;
            while let Ok(event) = rx.try_recv() {
                let _ = coord.handle_event(event);
            }
        }

        assert_eq!(probe.interaction_registrations(), 1);
        assert!(probe.progress_of("a").unwrap() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_then_expiry_is_single_removal() {
        let surface = RecordingSurface::new(10);
        let probe = surface.probe();
        let (mut coord, mut rx) = coordinator(surface, config(1000));

        let id = coord.add(note("a"));
        coord.promote();

        assert!(probe.click("a"));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ToastEvent::Interacted(got) if got == id));
        let _ = coord.handle_event(event);

        // A late expiry for the same toast is a no-op
        let _ = coord.handle_event(ToastEvent::Expired(id));
        let _ = coord.handle_event(ToastEvent::Progress { id, percent: 50 });

        assert_eq!(coord.visible().size(), 0);
        assert_eq!(coord.active_timers(), 0);
        assert_eq!(probe.destroyed_count(), 1);
        assert_eq!(coord.stats().dismissed_total, 1);
        assert_eq!(coord.stats().expired_total, 0);
        assert!(!probe.click("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_from_backlog() {
        let (mut coord, _rx) = coordinator(RecordingSurface::new(10), config(1000));

        let a = coord.add(note("a"));
        let b = coord.add(note("b"));

        assert!(coord.dismiss(a));
        assert!(!coord.dismiss(a));
        assert_eq!(coord.promote(), Promotion::Shown(b));
        assert_eq!(coord.promote(), Promotion::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_policy_counts_drops() {
        let mut cfg = config(1000);
        cfg.backlog_policy = BacklogPolicy::DropOldest { capacity: 2 };
        let (mut coord, _rx) = coordinator(RecordingSurface::new(10), cfg);

        coord.add(note("a"));
        let b = coord.add(note("b"));
        coord.add(note("c"));

        assert_eq!(coord.backlog().len(), 2);
        assert_eq!(coord.stats().dropped_total, 1);
        assert_eq!(coord.promote(), Promotion::Shown(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_changes_future_admission() {
        let surface = RecordingSurface::new(60);
        let (mut coord, _rx) = coordinator(surface, config(200));

        coord.add(note("a"));
        let b = coord.add(note("b"));
        coord.promote();
        assert_eq!(coord.promote(), Promotion::Deferred(b));

        let _ = coord.handle_event(ToastEvent::Resized { height: 400 });
        assert_eq!(coord.visible().capacity(), 200);
        assert_eq!(coord.promote(), Promotion::Shown(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_from_surface() {
        let surface = RecordingSurface::new(10).with_viewport(300);
        let (coord, _rx) = coordinator(surface, ToastConfig::default());
        assert_eq!(coord.visible().capacity(), 150);

        let (coord, _rx) = coordinator(RecordingSurface::new(10), ToastConfig::default());
        assert_eq!(coord.visible().capacity(), 540);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_screen() {
        let surface = RecordingSurface::new(10);
        let probe = surface.probe();
        let (mut coord, _rx) = coordinator(surface, config(1000));

        coord.add(note("a"));
        coord.add(note("b"));
        coord.promote();
        coord.promote();

        assert!(coord.handle_event(ToastEvent::Shutdown).is_break());
        coord.shutdown();

        assert_eq!(probe.live_count(), 0);
        assert_eq!(coord.active_timers(), 0);
        assert_eq!(coord.stats().visible, 0);
    }
}
