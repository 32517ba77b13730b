use foundation::bounds::Rect;
use foundation::math::Vec2;
use parking_lot::Mutex;

use crate::selection::SelectionMode;

/// State of one rectangle drag.
///
/// `mode` is captured when the drag starts and never re-evaluated, even if
/// the modifier keys change before release.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Gesture {
    pub active: bool,
    pub start: Vec2,
    pub current: Vec2,
    pub mode: SelectionMode,
}

impl Gesture {
    fn idle() -> Self {
        Self {
            active: false,
            start: Vec2::default(),
            current: Vec2::default(),
            mode: SelectionMode::Set,
        }
    }

    /// Normalized rectangle from `start` to `current` (at least 1×1).
    pub fn rect(&self) -> Rect {
        Rect::from_drag(self.start, self.current)
    }
}

/// A finished drag, ready to be hit-tested.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CompletedGesture {
    pub rect: Rect,
    pub mode: SelectionMode,
}

/// Tracks the in-progress drag.
///
/// Updates arrive on the input thread while the render thread reads the
/// rectangle to draw it, so the state sits behind its own lock.
#[derive(Debug)]
pub struct GestureTracker {
    state: Mutex<Gesture>,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Gesture::idle()),
        }
    }

    /// Starts a drag at `pos`, replacing any drag still in progress.
    pub fn begin(&self, pos: Vec2, mode: SelectionMode) {
        *self.state.lock() = Gesture {
            active: true,
            start: pos,
            current: pos,
            mode,
        };
    }

    /// Moves the drag's free corner. Returns `false` if no drag is active.
    pub fn update(&self, pos: Vec2) -> bool {
        let mut state = self.state.lock();
        if !state.active {
            return false;
        }
        state.current = pos;
        true
    }

    /// Ends the drag at `pos`.
    ///
    /// Returns `None` if no drag was active.
    pub fn finish(&self, pos: Vec2) -> Option<CompletedGesture> {
        let mut state = self.state.lock();
        if !state.active {
            return None;
        }
        state.current = pos;
        state.active = false;
        Some(CompletedGesture {
            rect: state.rect(),
            mode: state.mode,
        })
    }

    pub fn snapshot(&self) -> Gesture {
        *self.state.lock()
    }

    /// Rectangle to draw this frame, if a drag is in progress.
    pub fn active_rect(&self) -> Option<Rect> {
        let state = self.state.lock();
        state.active.then(|| state.rect())
    }
}
