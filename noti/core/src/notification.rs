//! Notification Records
//!
//! The immutable value a caller submits, plus the identifiers and colour
//! types the rest of the core passes around. A notification never changes
//! after creation; only its placement (owned by the visible list) does.
//!
//! # Wire Format
//!
//! Notifications deserialize from JSON so surfaces can accept feeds:
//!
//! ```json
//! {"message": "Build finished", "duration_ms": 4000, "kind": "success"}
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Toast identifier
///
/// Assigned once when a notification is added and stable for its whole
/// lifetime, whether it sits in the backlog or on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToastId(pub u64);

impl ToastId {
    /// Generate a new process-unique toast ID
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "toast_{}", self.0)
    }
}

// ============================================================================
// Colours
// ============================================================================

/// Errors from parsing a colour string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColourError {
    /// Hex colour with the wrong number of digits
    #[error("Invalid hex colour length in {0:?} (expected #rgb or #rrggbb)")]
    BadLength(String),

    /// Non-hex digit in a hex colour
    #[error("Invalid hex digit in colour {0:?}")]
    BadDigit(String),

    /// Not a hex colour and not a known name
    #[error("Unknown colour name {0:?}")]
    UnknownName(String),
}

/// An sRGB colour
///
/// Serialized as a `#rrggbb` string so config files and feeds stay readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Colour {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Colour {
    /// Create a colour from channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or one of the named colours
    ///
    /// # Errors
    ///
    /// Returns a [`ColourError`] when the string is neither valid hex nor a
    /// known colour name.
    pub fn parse(s: &str) -> Result<Self, ColourError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(s, hex);
        }

        match s.to_lowercase().as_str() {
            "black" => Ok(Self::rgb(0, 0, 0)),
            "white" => Ok(Self::rgb(255, 255, 255)),
            "red" => Ok(Self::rgb(220, 53, 69)),
            "green" => Ok(Self::rgb(40, 167, 69)),
            "blue" => Ok(Self::rgb(0, 123, 255)),
            "yellow" | "orange" => Ok(Self::rgb(255, 193, 7)),
            "grey" | "gray" => Ok(Self::rgb(108, 117, 125)),
            _ => Err(ColourError::UnknownName(s.to_string())),
        }
    }

    fn parse_hex(original: &str, hex: &str) -> Result<Self, ColourError> {
        let digit = |c: char| {
            c.to_digit(16)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or_else(|| ColourError::BadDigit(original.to_string()))
        };

        let chars: Vec<char> = hex.chars().collect();
        match chars.len() {
            3 => {
                let r = digit(chars[0])?;
                let g = digit(chars[1])?;
                let b = digit(chars[2])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let pair = |hi: char, lo: char| -> Result<u8, ColourError> {
                    Ok(digit(hi)? * 16 + digit(lo)?)
                };
                Ok(Self::rgb(
                    pair(chars[0], chars[1])?,
                    pair(chars[2], chars[3])?,
                    pair(chars[4], chars[5])?,
                ))
            }
            _ => Err(ColourError::BadLength(original.to_string())),
        }
    }

    /// Format as `#rrggbb`
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Colour {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Colour {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Notification category
///
/// Only affects the default palette; explicit colours always win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    /// Something finished well
    Success,
    /// Something failed
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

impl NotifyKind {
    /// Default (progress start, progress end, background) for this kind
    #[must_use]
    pub fn palette(&self) -> (Colour, Colour, Colour) {
        match self {
            Self::Success => (
                Colour::rgb(40, 167, 69),
                Colour::rgb(25, 135, 84),
                Colour::rgb(209, 231, 221),
            ),
            Self::Error => (
                Colour::rgb(220, 53, 69),
                Colour::rgb(176, 42, 55),
                Colour::rgb(248, 215, 218),
            ),
            Self::Warning => (
                Colour::rgb(255, 193, 7),
                Colour::rgb(204, 154, 6),
                Colour::rgb(255, 243, 205),
            ),
            Self::Info => (
                Colour::rgb(13, 202, 240),
                Colour::rgb(0, 123, 255),
                Colour::rgb(207, 244, 252),
            ),
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

/// Colours a surface should apply, after kind defaults are folded in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolvedColours {
    /// Progress bar colour at 0%
    pub progress_start: Option<Colour>,
    /// Progress bar colour at 100%
    pub progress_end: Option<Colour>,
    /// Box background
    pub background: Option<Colour>,
}

// ============================================================================
// Notification
// ============================================================================

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    /// Negative values clamp to zero (never expires)
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = i64::deserialize(d)?;
        Ok(Duration::from_millis(u64::try_from(ms).unwrap_or(0)))
    }
}

/// A notification request
///
/// Immutable once built. `duration` is the total on-screen lifetime before
/// auto-dismiss; a zero duration never expires on its own. Negative
/// `duration_ms` values in JSON read as zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Text shown in the toast
    pub message: String,
    /// Lifetime once visible
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    /// Progress bar colour at 0%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_colour_start: Option<Colour>,
    /// Progress bar colour at 100%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_colour_end: Option<Colour>,
    /// Box background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_colour: Option<Colour>,
    /// Category (drives default colours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NotifyKind>,
}

impl Notification {
    /// Create a plain notification
    pub fn new(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            duration,
            progress_colour_start: None,
            progress_colour_end: None,
            background_colour: None,
            kind: None,
        }
    }

    /// Set the category
    #[must_use]
    pub fn with_kind(mut self, kind: NotifyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the progress bar gradient
    #[must_use]
    pub fn with_progress_colours(mut self, start: Colour, end: Colour) -> Self {
        self.progress_colour_start = Some(start);
        self.progress_colour_end = Some(end);
        self
    }

    /// Set the background colour
    #[must_use]
    pub fn with_background(mut self, colour: Colour) -> Self {
        self.background_colour = Some(colour);
        self
    }

    /// Parse one JSON object (one line of a JSON-lines feed)
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error for malformed input.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Colours to apply, explicit values first, then kind defaults
    #[must_use]
    pub fn resolved_colours(&self) -> ResolvedColours {
        let defaults = self.kind.map(|k| k.palette());
        ResolvedColours {
            progress_start: self.progress_colour_start.or(defaults.map(|d| d.0)),
            progress_end: self.progress_colour_end.or(defaults.map(|d| d.1)),
            background: self.background_colour.or(defaults.map(|d| d.2)),
        }
    }
}

/// A notification waiting in the backlog, tagged with its ID
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedToast {
    /// Stable ID assigned at `add()` time
    pub id: ToastId,
    /// The request itself
    pub notification: Notification,
}

impl QueuedToast {
    /// Tag a notification with a fresh ID
    #[must_use]
    pub fn new(notification: Notification) -> Self {
        Self {
            id: ToastId::generate(),
            notification,
        }
    }
}
