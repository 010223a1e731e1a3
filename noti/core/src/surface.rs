//! Rendering Capability
//!
//! The core never draws anything. It drives a [`RenderSurface`], which owns
//! the actual visual boxes and hands back opaque handles. Units are whatever
//! the surface measures in (pixels for a GUI, rows for a terminal); the core
//! only adds and compares them.
//!
//! # Handle Ownership
//!
//! Handles are created by [`RenderSurface::create_handle`] and returned by
//! value to [`RenderSurface::destroy`]. The visible list is the only holder
//! in between, so a destroyed handle can never be touched again.

use crate::events::DismissTrigger;
use crate::notification::{Notification, ResolvedColours};

/// A surface that can materialize, position and remove toast boxes
pub trait RenderSurface: Send + 'static {
    /// Opaque reference to one rendered box
    type Handle: Send + std::fmt::Debug;

    /// Materialize an invisible box for `notification` and report its height
    ///
    /// Never fails; a surface that cannot render has no business being
    /// handed notifications.
    fn create_handle(&mut self, notification: &Notification) -> (Self::Handle, u32);

    /// Place the box with its bottom edge `bottom_offset` units above the
    /// bottom of the viewport
    fn set_position(&mut self, handle: &Self::Handle, bottom_offset: u32);

    /// Show or hide the box
    fn set_visible(&mut self, handle: &Self::Handle, visible: bool);

    /// Remove the box for good
    fn destroy(&mut self, handle: Self::Handle);

    /// Register the one-shot dismiss trigger for user interaction
    fn on_interaction(&mut self, handle: &Self::Handle, trigger: DismissTrigger);

    /// Update the progress indicator (0-100)
    fn set_progress(&mut self, handle: &Self::Handle, percent: u8);

    /// Apply colours
    fn set_colours(&mut self, handle: &Self::Handle, colours: &ResolvedColours);

    /// Height of the viewport, if the surface knows it
    ///
    /// Used to derive the capacity when the configuration does not pin a
    /// viewport height.
    fn viewport_height(&self) -> Option<u32> {
        None
    }
}
