//! Expiry and Progress
//!
//! Every visible toast gets its own periodic tick. Each tick advances the
//! toast's progress by `resolution / duration`; at 100% the toast expires.
//! The tick task only posts events, it never touches the visible list, so a
//! tick that races a click-dismiss is harmless: whichever event the
//! coordinator sees second finds nothing to remove.
//!
//! Progress is tracked in whole milliseconds, so a toast with duration `d`
//! expires after exactly `ceil(d / resolution)` ticks.

use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use crate::events::{EventSender, ToastEvent};
use crate::notification::ToastId;

/// Progress accumulator for one toast
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    elapsed_ms: u64,
    duration_ms: u64,
    resolution_ms: u64,
}

impl Progress {
    /// Create an accumulator at 0%
    #[must_use]
    pub fn new(duration: Duration, resolution: Duration) -> Self {
        Self {
            elapsed_ms: 0,
            duration_ms: millis(duration),
            resolution_ms: millis(resolution),
        }
    }

    /// Advance by one tick and return the new percentage
    ///
    /// A zero duration never advances.
    pub fn advance(&mut self) -> u8 {
        if self.duration_ms > 0 {
            self.elapsed_ms = self
                .elapsed_ms
                .saturating_add(self.resolution_ms)
                .min(self.duration_ms);
        }
        self.percent()
    }

    /// Current percentage (0-100)
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.duration_ms == 0 {
            return 0;
        }
        let pct = self.elapsed_ms.saturating_mul(100) / self.duration_ms;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }

    /// Whether the toast has run its course
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.duration_ms > 0 && self.elapsed_ms >= self.duration_ms
    }

    /// Ticks needed from 0% to completion, or `None` for a zero duration
    #[must_use]
    pub fn ticks_to_complete(&self) -> Option<u64> {
        if self.duration_ms == 0 || self.resolution_ms == 0 {
            return None;
        }
        Some(self.duration_ms.div_ceil(self.resolution_ms))
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Start the periodic progress tick for a visible toast
///
/// Posts [`ToastEvent::Progress`] every `resolution` and a final
/// [`ToastEvent::Expired`] at 100%, then stops. The returned handle cancels
/// the tick; the coordinator aborts it before removing the toast.
///
/// A zero duration starts no task at all (progress would never move); the
/// returned handle then belongs to an already-finished task.
pub fn spawn_expiry(
    id: ToastId,
    duration: Duration,
    resolution: Duration,
    tx: EventSender,
) -> AbortHandle {
    let mut progress = Progress::new(duration, resolution);

    if progress.ticks_to_complete().is_none() {
        tracing::debug!(%id, "Zero duration toast, progress will not advance");
        return tokio::spawn(async {}).abort_handle();
    }

    let task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + resolution;
        let mut ticker = tokio::time::interval_at(start, resolution);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let percent = progress.advance();

            if tx.send(ToastEvent::Progress { id, percent }).is_err() {
                break;
            }

            if progress.is_complete() {
                tracing::trace!(%id, "Toast expired");
                let _ = tx.send(ToastEvent::Expired(id));
                break;
            }
        }
    });

    task.abort_handle()
}
