//! Noti Core - Headless Toast Scheduling for opennoti
//!
//! This crate decides when a toast notification appears, where it sits in
//! the stack, how its progress bar advances, and when it goes away. It does
//! no drawing itself: everything visual goes through the [`RenderSurface`]
//! trait, so the same core drives a terminal, a desktop overlay, or a
//! recording surface in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Callers                               │
//! │      ToastManager::add / dismiss / resize / shutdown          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ ToastEvent
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                        NOTI CORE                              │
//! │  ┌───────────────────────────┴──────────────────────────────┐ │
//! │  │                      Coordinator                          │ │
//! │  │  ┌───────────┐  promote  ┌─────────────┐  ┌────────────┐ │ │
//! │  │  │  Backlog  │ ────────► │ VisibleList │  │ Expiry     │ │ │
//! │  │  │  (FIFO)   │ ◄──────── │ (stacking)  │  │ ticks      │ │ │
//! │  │  └───────────┘  no room  └──────┬──────┘  └─────┬──────┘ │ │
//! │  └─────────────────────────────────┼───────────────┼────────┘ │
//! └────────────────────────────────────┼───────────────┼──────────┘
//!                                      ▼               │
//!                               RenderSurface ◄────────┘ progress
//!                          (terminal, overlay, tests)
//! ```
//!
//! # Key Types
//!
//! - [`ToastManager`]: Cloneable handle for raising and dismissing toasts
//! - [`Coordinator`]: Owns all toast state and runs the promotion tick
//! - [`Notification`]: What to show and for how long
//! - [`RenderSurface`]: What a display backend must provide
//! - [`ToastConfig`]: Timing, layout and backlog settings
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use noti_core::{Notification, ToastConfig, ToastManager};
//! use noti_core::test_utils::RecordingSurface;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (toasts, task) = ToastManager::spawn(RecordingSurface::new(40), ToastConfig::default());
//!
//! toasts.add(Notification::new("Build finished", Duration::from_secs(3)));
//!
//! toasts.shutdown();
//! task.await.ok();
//! # }
//! ```
//!
//! # Module Overview
//!
//! - [`backlog`]: FIFO of toasts waiting for room
//! - [`config`]: Config file, environment and override loading
//! - [`coordinator`]: The scheduler task and its caller handle
//! - [`events`]: Events into the coordinator and dismiss triggers
//! - [`expiry`]: Per-toast progress ticks
//! - [`notification`]: Toast content, colours and identity
//! - [`surface`]: The rendering abstraction
//! - [`visible`]: The on-screen stack and its capacity rule
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backlog;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod expiry;
pub mod notification;
pub mod surface;
pub mod test_utils;
pub mod visible;

pub use backlog::{AppendOutcome, BacklogPolicy, BacklogQueue};
pub use coordinator::{Coordinator, Promotion, ToastManager, ToastStats};
pub use events::{DismissTrigger, EventReceiver, EventSender, ToastEvent};
pub use expiry::{spawn_expiry, Progress};
pub use notification::{
    Colour, ColourError, Notification, NotifyKind, QueuedToast, ResolvedColours, ToastId,
};
pub use surface::RenderSurface;
pub use visible::{RemovedEntry, StackLayout, VisibleEntry, VisibleList};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_over, ConfigError,
    ConfigOverrides, ConfigSource, NotiToml, ToastConfig,
};
