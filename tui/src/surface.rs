//! Terminal Rendering Surface
//!
//! [`TerminalSurface`] implements [`RenderSurface`] on top of a shared
//! [`ToastBoard`]. The coordinator task mutates the board through the
//! surface; the app locks it once per frame to draw and to hit-test clicks.
//!
//! Units are terminal rows. A toast's bottom offset is the number of rows
//! between the bottom of the toast area (just above the status bar) and the
//! toast's bottom border.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::layout::Rect;

use noti_core::{
    DismissTrigger, Notification, RenderSurface, ResolvedColours, ToastConfig, ToastId,
};

/// Preferred toast width in columns
pub const TOAST_WIDTH: u16 = 40;

/// Rows reserved below the toast area for the status bar
pub const STATUS_ROWS: u16 = 1;

/// Narrowest text column we wrap to
const MIN_TEXT_WIDTH: usize = 8;

/// Top border, bottom border and the progress bar row
const CHROME_ROWS: usize = 3;

/// Layout in terminal rows, before file, environment and CLI are applied
///
/// One blank row between toasts and one below the lowest toast.
#[must_use]
pub fn terminal_defaults() -> ToastConfig {
    let mut config = ToastConfig::default();
    config.padding = 1;
    config.base_offset = 1;
    config
}

/// Handle to one box on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u64);

/// One toast as the terminal sees it
#[derive(Debug)]
pub struct ToastBox {
    /// Title shown in the top border
    pub title: String,
    /// Message, already wrapped to the box width
    pub lines: Vec<String>,
    /// Width in columns including borders
    pub width: u16,
    /// Height in rows including borders and progress bar
    pub height: u32,
    /// Rows between the toast area bottom and the box
    pub bottom_offset: u32,
    /// Whether the box is drawn
    pub visible: bool,
    /// Progress bar fill (0-100)
    pub progress: u8,
    /// Bar and background colours
    pub colours: ResolvedColours,
    trigger: Option<DismissTrigger>,
}

impl ToastBox {
    /// Screen rectangle inside `area`
    ///
    /// `None` when the box would poke out above the top of the area, which
    /// can happen right after the terminal shrinks.
    #[must_use]
    pub fn rect(&self, area: Rect) -> Option<Rect> {
        let height = u16::try_from(self.height).ok()?;
        let offset = u16::try_from(self.bottom_offset).ok()?;

        let bottom_edge = area.bottom().checked_sub(offset)?;
        let y = bottom_edge.checked_sub(height)?;
        if y < area.y {
            return None;
        }

        let width = self.width.min(area.width);
        let x = area.right().saturating_sub(width + 1).max(area.x);
        Some(Rect::new(x, y, width, height))
    }

    /// Toast this box belongs to, once the coordinator has registered it
    #[must_use]
    pub fn toast_id(&self) -> Option<ToastId> {
        self.trigger.as_ref().map(DismissTrigger::toast_id)
    }
}

#[cfg(test)]
pub(crate) fn test_box(
    title: &str,
    lines: Vec<String>,
    width: u16,
    height: u32,
    progress: u8,
    colours: ResolvedColours,
) -> ToastBox {
    ToastBox {
        title: title.to_string(),
        lines,
        width,
        height,
        bottom_offset: 0,
        visible: true,
        progress,
        colours,
        trigger: None,
    }
}

/// Every box the coordinator has created and not yet destroyed
#[derive(Debug)]
pub struct ToastBoard {
    boxes: BTreeMap<BoxId, ToastBox>,
    next_id: u64,
    width: u16,
    height: u16,
}

/// Board shared between the surface and the app
pub type SharedBoard = Arc<Mutex<ToastBoard>>;

impl ToastBoard {
    /// Empty board for a terminal of `width` x `height`
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            boxes: BTreeMap::new(),
            next_id: 0,
            width,
            height,
        }
    }

    /// Wrap in the shared handle
    #[must_use]
    pub fn shared(self) -> SharedBoard {
        Arc::new(Mutex::new(self))
    }

    /// Record a new terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Rows available to toasts
    #[must_use]
    pub fn viewport_rows(&self) -> u32 {
        u32::from(self.height.saturating_sub(STATUS_ROWS))
    }

    /// Area toasts are drawn in
    #[must_use]
    pub fn toast_area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height.saturating_sub(STATUS_ROWS))
    }

    /// Visible boxes, oldest first
    pub fn visible_boxes(&self) -> impl Iterator<Item = &ToastBox> {
        self.boxes.values().filter(|b| b.visible)
    }

    /// Toast IDs of every visible box
    #[must_use]
    pub fn toast_ids(&self) -> Vec<ToastId> {
        self.visible_boxes().filter_map(ToastBox::toast_id).collect()
    }

    /// Number of live boxes, visible or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether there are no live boxes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Take the dismiss trigger of the visible box under (`column`, `row`)
    ///
    /// The trigger is removed from the box, so a second click on the same
    /// box finds nothing.
    pub fn trigger_at(&mut self, column: u16, row: u16) -> Option<DismissTrigger> {
        let area = self.toast_area();
        self.boxes
            .values_mut()
            .filter(|b| b.visible)
            .find(|b| {
                b.rect(area).is_some_and(|r| {
                    column >= r.x && column < r.right() && row >= r.y && row < r.bottom()
                })
            })
            .and_then(|b| b.trigger.take())
    }

    fn box_width(&self) -> u16 {
        TOAST_WIDTH.min(self.width.saturating_sub(2))
    }
}

/// Wrap `message` to `width` columns; never returns an empty list
#[must_use]
pub fn wrap_message(message: &str, width: usize) -> Vec<String> {
    let width = width.max(MIN_TEXT_WIDTH);
    let lines: Vec<String> = message
        .lines()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.into_owned())
                    .collect()
            }
        })
        .collect();

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// [`RenderSurface`] drawing into a [`ToastBoard`]
#[derive(Clone, Debug)]
pub struct TerminalSurface {
    board: SharedBoard,
}

impl TerminalSurface {
    /// Surface over `board`
    #[must_use]
    pub fn new(board: SharedBoard) -> Self {
        Self { board }
    }

    /// The board this surface draws into
    #[must_use]
    pub fn board(&self) -> SharedBoard {
        Arc::clone(&self.board)
    }
}

impl RenderSurface for TerminalSurface {
    type Handle = BoxId;

    fn create_handle(&mut self, notification: &Notification) -> (BoxId, u32) {
        let mut board = self.board.lock();

        let width = board.box_width();
        // Two border columns plus one column of padding each side
        let lines = wrap_message(&notification.message, usize::from(width).saturating_sub(4));
        let height = u32::try_from(lines.len() + CHROME_ROWS).unwrap_or(u32::MAX);
        let title = notification
            .kind
            .map_or_else(|| "notice".to_string(), |k| k.label().to_string());

        let id = BoxId(board.next_id);
        board.next_id += 1;
        board.boxes.insert(
            id,
            ToastBox {
                title,
                lines,
                width,
                height,
                bottom_offset: 0,
                visible: false,
                progress: 0,
                colours: notification.resolved_colours(),
                trigger: None,
            },
        );

        (id, height)
    }

    fn set_position(&mut self, handle: &BoxId, bottom_offset: u32) {
        if let Some(b) = self.board.lock().boxes.get_mut(handle) {
            b.bottom_offset = bottom_offset;
        }
    }

    fn set_visible(&mut self, handle: &BoxId, visible: bool) {
        if let Some(b) = self.board.lock().boxes.get_mut(handle) {
            b.visible = visible;
        }
    }

    fn destroy(&mut self, handle: BoxId) {
        self.board.lock().boxes.remove(&handle);
    }

    fn on_interaction(&mut self, handle: &BoxId, trigger: DismissTrigger) {
        if let Some(b) = self.board.lock().boxes.get_mut(handle) {
            b.trigger = Some(trigger);
        }
    }

    fn set_progress(&mut self, handle: &BoxId, percent: u8) {
        if let Some(b) = self.board.lock().boxes.get_mut(handle) {
            b.progress = percent;
        }
    }

    fn set_colours(&mut self, handle: &BoxId, colours: &ResolvedColours) {
        if let Some(b) = self.board.lock().boxes.get_mut(handle) {
            b.colours = *colours;
        }
    }

    fn viewport_height(&self) -> Option<u32> {
        Some(self.board.lock().viewport_rows())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn note(message: &str) -> Notification {
        Notification::new(message, Duration::from_secs(1))
    }

    #[test]
    fn test_height_follows_wrapped_lines() {
        let board = ToastBoard::new(80, 24).shared();
        let mut surface = TerminalSurface::new(Arc::clone(&board));

        let (_, short) = surface.create_handle(&note("hi"));
        assert_eq!(short, 4);

        let long = "word ".repeat(20);
        let (id, tall) = surface.create_handle(&note(&long));
        let lines = board.lock().boxes[&id].lines.len();
        assert!(lines > 1);
        assert_eq!(tall, 3 + u32::try_from(lines).unwrap());
    }

    #[test]
    fn test_wrap_message_keeps_blank_lines() {
        assert_eq!(wrap_message("", 20), vec![String::new()]);
        assert_eq!(wrap_message("a\n\nb", 20), vec!["a", "", "b"]);
    }

    #[test]
    fn test_rect_anchors_bottom_right() {
        let board = ToastBoard::new(80, 25);
        let area = board.toast_area();
        assert_eq!(area.height, 24);

        let mut toast = test_box("", vec![String::new()], 40, 4, 0, ResolvedColours::default());
        toast.bottom_offset = 1;

        assert_eq!(toast.rect(area), Some(Rect::new(39, 19, 40, 4)));

        let off_screen = ToastBox {
            bottom_offset: 22,
            ..toast
        };
        assert_eq!(off_screen.rect(area), None);
    }

    #[test]
    fn test_viewport_excludes_status_bar() {
        let board = ToastBoard::new(80, 30).shared();
        let surface = TerminalSurface::new(board);
        assert_eq!(surface.viewport_height(), Some(29));
    }

    #[test]
    fn test_terminal_defaults_keep_stack_within_capacity() {
        use noti_core::test_utils::RecordingSurface;
        use noti_core::{QueuedToast, VisibleList};

        let config = terminal_defaults();
        assert!(config.validate().is_ok());

        // 20 rows -> capacity 10
        let layout = config.stack_layout(20);
        assert_eq!(layout.capacity, 10);

        let mut surface = RecordingSurface::new(10).with_height("fits", 9);
        let mut list = VisibleList::new(layout);

        assert!(list
            .try_insert(QueuedToast::new(note("too tall")), &mut surface)
            .is_err());
        assert!(list
            .try_insert(QueuedToast::new(note("fits")), &mut surface)
            .is_ok());
        assert_eq!(list.occupied(), 10);
        assert!(list.occupied() <= list.capacity());
    }

    #[test]
    fn test_destroy_removes_box() {
        let board = ToastBoard::new(80, 24).shared();
        let mut surface = TerminalSurface::new(Arc::clone(&board));

        let (id, _) = surface.create_handle(&note("x"));
        surface.set_visible(&id, true);
        assert_eq!(board.lock().len(), 1);

        surface.destroy(id);
        assert!(board.lock().is_empty());
    }
}
