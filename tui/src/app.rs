//! Main Application
//!
//! The App is a thin display client over a running toast coordinator:
//! - Event loop (keyboard, mouse, resize)
//! - [`ToastManager`] for raising and dismissing toasts
//! - The shared [`ToastBoard`](crate::surface::ToastBoard) for rendering
//!
//! The coordinator task writes the board through the terminal surface; the
//! App only reads it to draw, and takes dismiss triggers from it on click.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::{Frame, Terminal};
use tracing::{debug, info, warn};

use noti_core::{Notification, NotifyKind, ToastManager, ToastStats};

use crate::surface::SharedBoard;
use crate::theme::{ACCENT, DIM_GRAY, WARN_YELLOW};
use crate::widgets::ToastWidget;

/// Toasts queued by one press of `b`
pub const BURST_SIZE: usize = 10;

/// Shortest random toast
const MIN_DEMO_MS: u64 = 1000;

/// Longest random toast
const MAX_DEMO_MS: u64 = 8000;

/// Messages for random demo toasts
const DEMO_MESSAGES: &[&str] = &[
    "Build finished",
    "3 new messages",
    "Backup completed successfully",
    "Battery low",
    "Download failed: connection reset by peer",
    "Update available",
    "Tests passed",
    "Disk usage above 90% on /var, consider cleaning old logs",
    "Meeting in 5 minutes",
    "Deploy to staging succeeded",
    "Certificate expires in 7 days",
    "Sync paused",
];

const DEMO_KINDS: &[NotifyKind] = &[
    NotifyKind::Success,
    NotifyKind::Error,
    NotifyKind::Warning,
    NotifyKind::Info,
];

/// A random notification for the demo
#[must_use]
pub fn random_notification() -> Notification {
    let mut rng = rand::thread_rng();
    let message = DEMO_MESSAGES.choose(&mut rng).copied().unwrap_or("Hello");
    let duration = Duration::from_millis(rng.gen_range(MIN_DEMO_MS..=MAX_DEMO_MS));

    let notification = Notification::new(message, duration);
    match DEMO_KINDS.choose(&mut rng) {
        // One in five stays plain
        Some(kind) if rng.gen_ratio(4, 5) => notification.with_kind(*kind),
        _ => notification,
    }
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Handle to the coordinator
    toasts: ToastManager,
    /// What the coordinator has put on screen
    board: SharedBoard,
    /// Latest coordinator snapshot
    stats: ToastStats,
    /// One-off note for the status bar
    notice: Option<String>,
}

impl App {
    /// Create an App over a running coordinator and its board
    pub fn new(toasts: ToastManager, board: SharedBoard) -> Self {
        let stats = toasts.stats();
        Self {
            running: true,
            toasts,
            board,
            stats,
            notice: None,
        }
    }

    /// Show a note in the status bar until the next key press
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Queue `count` random toasts
    pub fn burst(&self, count: usize) {
        for _ in 0..count {
            self.toasts.add(random_notification());
        }
        debug!(count, "Queued burst");
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~30 FPS keeps progress bars smooth
        let frame_duration = Duration::from_millis(33);

        let mut event_stream = EventStream::new();

        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                // Frame tick - redraw moving progress bars
                () = tokio::time::sleep(frame_duration) => {}
            }

            self.stats = self.toasts.stats();
            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        self.toasts.shutdown();
        info!(shown = self.stats.shown_total, "App exiting");
        Ok(())
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.handle_resize(width, height),
            _ => {}
        }
    }

    /// Whether the loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            KeyCode::Char('n') => {
                self.toasts.add(random_notification());
            }
            KeyCode::Char('b') => self.burst(BURST_SIZE),

            // Dismiss the oldest toast on screen
            KeyCode::Char('d') => {
                let oldest = self.board.lock().toast_ids().first().copied();
                if let Some(id) = oldest {
                    self.toasts.dismiss(id);
                }
            }

            // Clear the screen
            KeyCode::Char('c') => {
                let ids = self.board.lock().toast_ids();
                for id in ids {
                    self.toasts.dismiss(id);
                }
            }

            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }

        let trigger = self.board.lock().trigger_at(mouse.column, mouse.row);
        if let Some(trigger) = trigger {
            debug!(id = %trigger.toast_id(), "Toast clicked");
            trigger.fire();
        }
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        let rows = {
            let mut board = self.board.lock();
            board.resize(width, height);
            board.viewport_rows()
        };
        self.toasts.resize(rows);
    }

    /// Render the UI
    fn render(&self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    /// Draw toasts and the status bar into `frame`
    pub fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.area();

        {
            let board = self.board.lock();
            let toast_area = board.toast_area().intersection(area);
            for toast in board.visible_boxes() {
                if let Some(rect) = toast.rect(toast_area) {
                    frame.render_widget(ToastWidget::new(toast), rect);
                }
            }
        }

        if area.height > 0 {
            let status = Rect::new(area.x, area.bottom() - 1, area.width, 1);
            frame.render_widget(self.status_line(), status);
        }
    }

    fn status_line(&self) -> Line<'static> {
        let stats = &self.stats;
        let dim = Style::default().fg(DIM_GRAY);

        let mut spans = vec![Span::styled(
            format!(
                " on screen {} ({}/{}) | waiting {} | shown {} | expired {} | dismissed {}",
                stats.visible,
                stats.occupied_height,
                stats.capacity,
                stats.backlog_len,
                stats.shown_total,
                stats.expired_total,
                stats.dismissed_total,
            ),
            dim,
        )];

        if stats.dropped_total > 0 {
            spans.push(Span::styled(
                format!(" | dropped {}", stats.dropped_total),
                Style::default().fg(WARN_YELLOW),
            ));
        }

        match &self.notice {
            Some(notice) => spans.push(Span::styled(format!(" | {notice}"), dim)),
            None => spans.push(Span::styled(
                " | n new  b burst  d dismiss  c clear  q quit",
                Style::default().fg(ACCENT),
            )),
        }

        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_notification_in_range() {
        for _ in 0..100 {
            let n = random_notification();
            assert!(DEMO_MESSAGES.contains(&n.message.as_str()));
            let ms = u64::try_from(n.duration.as_millis()).unwrap();
            assert!((MIN_DEMO_MS..=MAX_DEMO_MS).contains(&ms));
        }
    }
}
