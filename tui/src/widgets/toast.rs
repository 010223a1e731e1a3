//! Toast Widget
//!
//! Draws one [`ToastBox`]: rounded border with the kind as title, the
//! wrapped message, and a gradient progress bar on the last inner row.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Widget};
use unicode_width::UnicodeWidthChar;

use crate::surface::ToastBox;
use crate::theme::{self, PROGRESS_END, PROGRESS_START, PROGRESS_TRACK, TOAST_BACKGROUND};

const BAR_FILLED: &str = "█";
const BAR_EMPTY: &str = "░";

/// Widget for a single toast
pub struct ToastWidget<'a> {
    toast: &'a ToastBox,
}

impl<'a> ToastWidget<'a> {
    pub fn new(toast: &'a ToastBox) -> Self {
        Self { toast }
    }
}

impl Widget for ToastWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colours = self.toast.colours;
        let background = colours.background.unwrap_or(TOAST_BACKGROUND);
        let text = theme::text_on(background);
        let style = Style::default().bg(theme::to_color(background)).fg(text);

        Clear.render(area, buf);

        let title_width = usize::from(area.width.saturating_sub(4));
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(Line::from(truncate(&self.toast.title, title_width)).bold())
            .style(style);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 3 || inner.height == 0 {
            return;
        }

        // Message rows, leaving the last inner row for the bar
        let text_rows = inner.height.saturating_sub(1);
        let text_width = usize::from(inner.width - 2);
        for (row, line) in self.toast.lines.iter().take(usize::from(text_rows)).enumerate() {
            let y = inner.y + u16::try_from(row).unwrap_or(u16::MAX);
            buf.set_stringn(inner.x + 1, y, line, text_width, style);
        }

        let start = colours.progress_start.unwrap_or(PROGRESS_START);
        let end = colours.progress_end.unwrap_or(PROGRESS_END);
        render_bar(
            Rect::new(inner.x + 1, inner.bottom() - 1, inner.width - 2, 1),
            buf,
            self.toast.progress,
            (start, end),
        );
    }
}

fn render_bar(
    area: Rect,
    buf: &mut Buffer,
    percent: u8,
    (start, end): (noti_core::Colour, noti_core::Colour),
) {
    let width = u32::from(area.width);
    let filled = width * u32::from(percent.min(100)) / 100;

    for col in 0..area.width {
        let cell = &mut buf[(area.x + col, area.y)];
        if u32::from(col) < filled {
            let at = u8::try_from(u32::from(col) * 100 / width.max(1)).unwrap_or(100);
            cell.set_symbol(BAR_FILLED)
                .set_fg(theme::to_color(theme::blend(start, end, at)));
        } else {
            cell.set_symbol(BAR_EMPTY).set_fg(PROGRESS_TRACK);
        }
    }
}

/// Cut `text` to at most `max` display columns
fn truncate(text: &str, max: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= max
        })
        .collect()
}
