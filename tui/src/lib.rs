//! Noti TUI - Terminal surface for opennoti toasts
//!
//! This crate puts the headless toast core on a terminal: toasts stack up
//! from the bottom-right corner, progress bars drain as they age, and a
//! click dismisses one.
//!
//! # Architecture
//!
//! - **Surface**: [`TerminalSurface`] implements the core's render trait over
//!   a shared [`ToastBoard`]
//! - **Widgets**: One ratatui widget per toast box
//! - **App**: Event loop, key bindings, status bar
//! - **Feed**: JSON-lines notification input

pub mod app;
pub mod feed;
pub mod surface;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use surface::{SharedBoard, TerminalSurface, ToastBoard};
