//! Theme and Colors
//!
//! Terminal palette for toasts and the status bar, and the mapping from
//! core [`Colour`]s onto ratatui colours.

use ratatui::style::Color;

use noti_core::Colour;

// ============================================================================
// Toast Defaults
// ============================================================================

/// Background when a toast has no colour of its own
pub const TOAST_BACKGROUND: Colour = Colour::rgb(38, 38, 46);

/// Progress bar start when a toast has no gradient
pub const PROGRESS_START: Colour = Colour::rgb(100, 180, 255);

/// Progress bar end when a toast has no gradient
pub const PROGRESS_END: Colour = Colour::rgb(170, 110, 255);

/// Unfilled part of the progress bar
pub const PROGRESS_TRACK: Color = Color::Rgb(70, 70, 80);

/// Text on dark backgrounds
pub const TEXT_LIGHT: Color = Color::Rgb(235, 235, 235);

/// Text on light backgrounds
pub const TEXT_DARK: Color = Color::Rgb(30, 30, 30);

// ============================================================================
// UI Colors
// ============================================================================

/// Status bar text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Status bar accent (key hints)
pub const ACCENT: Color = Color::Magenta;

/// Warning accent (drops, full backlog)
pub const WARN_YELLOW: Color = Color::Rgb(255, 200, 80);

/// Convert a core colour to a terminal colour
#[must_use]
pub fn to_color(colour: Colour) -> Color {
    Color::Rgb(colour.r, colour.g, colour.b)
}

/// Linear blend between `start` (0%) and `end` (100%)
#[must_use]
pub fn blend(start: Colour, end: Colour, percent: u8) -> Colour {
    let t = u16::from(percent.min(100));
    let mix = |a: u8, b: u8| -> u8 {
        let a = u16::from(a);
        let b = u16::from(b);
        // Stays within 0..=255 since t <= 100
        let v = (a * (100 - t) + b * t) / 100;
        u8::try_from(v).unwrap_or(u8::MAX)
    };
    Colour::rgb(
        mix(start.r, end.r),
        mix(start.g, end.g),
        mix(start.b, end.b),
    )
}

/// Readable text colour for `background`
#[must_use]
pub fn text_on(background: Colour) -> Color {
    // Rec. 601 luma, scaled by 1000
    let luma = 299 * u32::from(background.r)
        + 587 * u32::from(background.g)
        + 114 * u32::from(background.b);
    if luma > 140_000 {
        TEXT_DARK
    } else {
        TEXT_LIGHT
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_blend_endpoints() {
        let a = Colour::rgb(0, 100, 200);
        let b = Colour::rgb(200, 100, 0);

        assert_eq!(blend(a, b, 0), a);
        assert_eq!(blend(a, b, 100), b);
        assert_eq!(blend(a, b, 50), Colour::rgb(100, 100, 100));
        assert_eq!(blend(a, b, 250), b);
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(text_on(Colour::rgb(255, 243, 205)), TEXT_DARK);
        assert_eq!(text_on(TOAST_BACKGROUND), TEXT_LIGHT);
    }

    #[test]
    fn test_to_color() {
        assert_eq!(to_color(Colour::rgb(1, 2, 3)), Color::Rgb(1, 2, 3));
    }
}
