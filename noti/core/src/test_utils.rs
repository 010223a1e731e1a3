//! In-Memory Surface for Tests
//!
//! [`RecordingSurface`] implements [`RenderSurface`] without drawing
//! anything. It hands out numbered handles, reports configurable heights,
//! and records every call so tests can assert on positions, progress and
//! handle lifetimes after the surface has been moved into a coordinator.
//!
//! # Usage
//!
//! ```
//! use noti_core::test_utils::RecordingSurface;
//!
//! let surface = RecordingSurface::new(40).with_height("tall", 90);
//! let probe = surface.probe();
//!
//! // ... move `surface` into a coordinator, drive it ...
//!
//! assert_eq!(probe.live_count(), 0);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::DismissTrigger;
use crate::notification::{Notification, ResolvedColours};
use crate::surface::RenderSurface;

/// Handle issued by [`RecordingSurface`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordedHandle(pub u64);

/// One recorded surface call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceCall {
    /// `create_handle`
    Create {
        /// Issued handle
        handle: RecordedHandle,
        /// Reported height
        height: u32,
    },
    /// `set_position`
    Position {
        /// Target handle
        handle: RecordedHandle,
        /// New bottom offset
        bottom_offset: u32,
    },
    /// `set_visible`
    Visible {
        /// Target handle
        handle: RecordedHandle,
        /// New visibility
        visible: bool,
    },
    /// `destroy`
    Destroy {
        /// Destroyed handle
        handle: RecordedHandle,
    },
    /// `on_interaction`
    Interaction {
        /// Target handle
        handle: RecordedHandle,
    },
    /// `set_progress`
    Progress {
        /// Target handle
        handle: RecordedHandle,
        /// New percentage
        percent: u8,
    },
    /// `set_colours`
    Colours {
        /// Target handle
        handle: RecordedHandle,
    },
}

#[derive(Debug)]
struct RecordedBox {
    message: String,
    height: u32,
    bottom_offset: Option<u32>,
    visible: bool,
    progress: u8,
    colours: ResolvedColours,
    trigger: Option<DismissTrigger>,
}

#[derive(Debug, Default)]
struct RecordingState {
    boxes: BTreeMap<RecordedHandle, RecordedBox>,
    calls: Vec<SurfaceCall>,
    next_handle: u64,
    destroyed: usize,
}

impl RecordingState {
    fn find(&self, message: &str) -> Option<&RecordedBox> {
        self.boxes.values().find(|b| b.message == message)
    }
}

/// Rendering surface that records instead of drawing
#[derive(Debug)]
pub struct RecordingSurface {
    default_height: u32,
    heights: HashMap<String, u32>,
    viewport: Option<u32>,
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingSurface {
    /// Every box reports `default_height`
    #[must_use]
    pub fn new(default_height: u32) -> Self {
        Self {
            default_height,
            heights: HashMap::new(),
            viewport: None,
            state: Arc::new(Mutex::new(RecordingState::default())),
        }
    }

    /// Boxes whose message equals `message` report `height`
    #[must_use]
    pub fn with_height(mut self, message: impl Into<String>, height: u32) -> Self {
        self.heights.insert(message.into(), height);
        self
    }

    /// Report a viewport height
    #[must_use]
    pub fn with_viewport(mut self, height: u32) -> Self {
        self.viewport = Some(height);
        self
    }

    /// Shared view onto the recorded state
    #[must_use]
    pub fn probe(&self) -> SurfaceProbe {
        SurfaceProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl RenderSurface for RecordingSurface {
    type Handle = RecordedHandle;

    fn create_handle(&mut self, notification: &Notification) -> (Self::Handle, u32) {
        let height = self
            .heights
            .get(&notification.message)
            .copied()
            .unwrap_or(self.default_height);

        let mut state = self.state.lock();
        let handle = RecordedHandle(state.next_handle);
        state.next_handle += 1;
        state.boxes.insert(
            handle,
            RecordedBox {
                message: notification.message.clone(),
                height,
                bottom_offset: None,
                visible: false,
                progress: 0,
                colours: ResolvedColours::default(),
                trigger: None,
            },
        );
        state.calls.push(SurfaceCall::Create { handle, height });
        (handle, height)
    }

    fn set_position(&mut self, handle: &Self::Handle, bottom_offset: u32) {
        let mut state = self.state.lock();
        if let Some(b) = state.boxes.get_mut(handle) {
            b.bottom_offset = Some(bottom_offset);
        }
        state.calls.push(SurfaceCall::Position {
            handle: *handle,
            bottom_offset,
        });
    }

    fn set_visible(&mut self, handle: &Self::Handle, visible: bool) {
        let mut state = self.state.lock();
        if let Some(b) = state.boxes.get_mut(handle) {
            b.visible = visible;
        }
        state.calls.push(SurfaceCall::Visible {
            handle: *handle,
            visible,
        });
    }

    fn destroy(&mut self, handle: Self::Handle) {
        let mut state = self.state.lock();
        if state.boxes.remove(&handle).is_some() {
            state.destroyed += 1;
        }
        state.calls.push(SurfaceCall::Destroy { handle });
    }

    fn on_interaction(&mut self, handle: &Self::Handle, trigger: DismissTrigger) {
        let mut state = self.state.lock();
        if let Some(b) = state.boxes.get_mut(handle) {
            b.trigger = Some(trigger);
        }
        state.calls.push(SurfaceCall::Interaction { handle: *handle });
    }

    fn set_progress(&mut self, handle: &Self::Handle, percent: u8) {
        let mut state = self.state.lock();
        if let Some(b) = state.boxes.get_mut(handle) {
            b.progress = percent;
        }
        state.calls.push(SurfaceCall::Progress {
            handle: *handle,
            percent,
        });
    }

    fn set_colours(&mut self, handle: &Self::Handle, colours: &ResolvedColours) {
        let mut state = self.state.lock();
        if let Some(b) = state.boxes.get_mut(handle) {
            b.colours = *colours;
        }
        state.calls.push(SurfaceCall::Colours { handle: *handle });
    }

    fn viewport_height(&self) -> Option<u32> {
        self.viewport
    }
}

/// Read access to a [`RecordingSurface`] that outlives the move
///
/// Boxes are looked up by message text, so tests should give their toasts
/// distinct messages.
#[derive(Clone, Debug)]
pub struct SurfaceProbe {
    state: Arc<Mutex<RecordingState>>,
}

impl SurfaceProbe {
    /// Bottom offset of the live box showing `message`
    #[must_use]
    pub fn offset_of(&self, message: &str) -> Option<u32> {
        self.state.lock().find(message).and_then(|b| b.bottom_offset)
    }

    /// Height reported for the live box showing `message`
    #[must_use]
    pub fn height_of(&self, message: &str) -> Option<u32> {
        self.state.lock().find(message).map(|b| b.height)
    }

    /// Progress of the live box showing `message`
    #[must_use]
    pub fn progress_of(&self, message: &str) -> Option<u8> {
        self.state.lock().find(message).map(|b| b.progress)
    }

    /// Whether a live, visible box shows `message`
    #[must_use]
    pub fn is_visible(&self, message: &str) -> bool {
        self.state.lock().find(message).is_some_and(|b| b.visible)
    }

    /// Colours applied to the live box showing `message`
    #[must_use]
    pub fn colours_of(&self, message: &str) -> Option<ResolvedColours> {
        self.state.lock().find(message).map(|b| b.colours)
    }

    /// Messages of live boxes, lowest bottom offset first
    #[must_use]
    pub fn stacked_messages(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut live: Vec<_> = state
            .boxes
            .values()
            .filter(|b| b.visible)
            .map(|b| (b.bottom_offset.unwrap_or(0), b.message.clone()))
            .collect();
        live.sort();
        live.into_iter().map(|(_, m)| m).collect()
    }

    /// Simulate a click on the box showing `message`
    ///
    /// Returns `false` when there is no such box or its trigger was already
    /// used.
    pub fn click(&self, message: &str) -> bool {
        let trigger = {
            let mut state = self.state.lock();
            state
                .boxes
                .values_mut()
                .find(|b| b.message == message)
                .and_then(|b| b.trigger.take())
        };
        match trigger {
            Some(trigger) => {
                trigger.fire();
                true
            }
            None => false,
        }
    }

    /// Number of boxes created and not yet destroyed
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.state.lock().boxes.len()
    }

    /// Number of boxes destroyed so far
    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.state.lock().destroyed
    }

    /// Number of `on_interaction` registrations so far
    #[must_use]
    pub fn interaction_registrations(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Interaction { .. }))
            .count()
    }

    /// Every call in order
    #[must_use]
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().calls.clone()
    }
}
