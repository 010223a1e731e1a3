//! JSON-Lines Feed
//!
//! Reads notifications from a file, one JSON object per line, and queues
//! each one on the toast manager. Blank lines and `#` comments are skipped;
//! malformed lines are logged and skipped.
//!
//! ```text
//! {"message":"Deploy finished","duration_ms":4000,"kind":"success"}
//! {"message":"Disk 91% full","duration_ms":8000,"background_colour":"#fff3cd"}
//! ```

use std::path::Path;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use noti_core::{Notification, ToastManager};

/// Outcome of reading a feed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Lines turned into toasts
    pub queued: usize,
    /// Lines that failed to parse
    pub skipped: usize,
}

/// Queue every notification in the file at `path`
///
/// # Errors
///
/// Fails if the file cannot be opened or read. Bad lines are not errors.
pub async fn load_feed(path: &Path, toasts: &ToastManager) -> anyhow::Result<FeedSummary> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open feed: {}", path.display()))?;

    let summary = read_feed(BufReader::new(file), toasts).await?;
    debug!(path = %path.display(), ?summary, "Feed loaded");
    Ok(summary)
}

/// Queue every notification read from `reader`
///
/// # Errors
///
/// Fails on an I/O error from the reader.
pub async fn read_feed<R>(reader: R, toasts: &ToastManager) -> anyhow::Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read feed")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match Notification::from_json(line) {
            Ok(notification) => {
                toasts.add(notification);
                summary.queued += 1;
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed feed line");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}
