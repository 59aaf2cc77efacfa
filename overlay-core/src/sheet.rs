//! Bottom sheet with drag-to-dismiss.
//!
//! ```text
//! Closed -> Opening -> Open -> Dragging -> Closing -> Closed
//!                       ^         |
//!                       +---------+  (released under both thresholds)
//! ```
//!
//! Enter/exit transitions are logical: the host calls
//! [`DismissibleSheet::settle`] once its animation (if any) finishes, and a
//! host without animations calls it every frame.

use std::time::{Duration, Instant};

use crate::config::SheetConfig;
use crate::event::PointerTarget;
use crate::scroll_lock::{ScrollLock, ScrollLockGuard};

/// A release this long after the last move carries no velocity.
pub const VELOCITY_STALE_AFTER: Duration = Duration::from_millis(100);

/// State of an in-progress drag. Discarded when the pointer is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Pointer y at drag start.
    pub start_y: f32,
    /// Downward displacement from the resting position, never negative.
    pub current_offset_y: f32,
    /// Downward velocity over the last move interval, per second.
    pub velocity_y: f32,
    last_y: f32,
    last_at: Instant,
}

impl DragSession {
    fn new(start_y: f32, at: Instant) -> Self {
        Self {
            start_y,
            current_offset_y: 0.0,
            velocity_y: 0.0,
            last_y: start_y,
            last_at: at,
        }
    }

    /// Pointer y of the most recent sample.
    pub fn last_y(&self) -> f32 {
        self.last_y
    }

    fn update(&mut self, y: f32, at: Instant) {
        let dt = at.saturating_duration_since(self.last_at).as_secs_f32();
        if dt > 0.0 {
            self.velocity_y = (y - self.last_y) / dt;
        }
        self.current_offset_y = (y - self.start_y).max(0.0);
        self.last_y = y;
        self.last_at = at;
    }

    fn release_velocity(&self, at: Instant) -> f32 {
        if at.saturating_duration_since(self.last_at) > VELOCITY_STALE_AFTER {
            0.0
        } else {
            self.velocity_y
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetPhase {
    Closed,
    Opening,
    Open,
    Dragging(DragSession),
    Closing,
}

/// What the owner must do after feeding the sheet an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SheetOutcome {
    /// Nothing for the owner to do.
    Ignored,
    /// The sheet consumed the input and stays open.
    Handled,
    /// The sheet started closing; the owner must run its close callback.
    Dismissed,
}

/// A bottom-anchored panel dismissible by dragging it down.
///
/// Holds a [`ScrollLock`] guard from open until close (or drop).
#[derive(Debug)]
pub struct DismissibleSheet {
    config: SheetConfig,
    phase: SheetPhase,
    lock: Option<ScrollLockGuard>,
}

impl DismissibleSheet {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            config,
            phase: SheetPhase::Closed,
            lock: None,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SheetConfig) {
        self.config = config;
    }

    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    /// Whether the sheet is on screen (any phase but `Closed`).
    pub fn is_rendered(&self) -> bool {
        self.phase != SheetPhase::Closed
    }

    /// Whether the sheet is logically open (rendered and not closing).
    pub fn is_open(&self) -> bool {
        matches!(
            self.phase,
            SheetPhase::Opening | SheetPhase::Open | SheetPhase::Dragging(_)
        )
    }

    /// Current downward drag offset; zero unless dragging.
    pub fn offset(&self) -> f32 {
        match self.phase {
            SheetPhase::Dragging(session) => session.current_offset_y,
            _ => 0.0,
        }
    }

    pub fn drag(&self) -> Option<&DragSession> {
        match &self.phase {
            SheetPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Start opening and lock page scrolling.
    pub fn open(&mut self, scroll_lock: &ScrollLock) {
        if self.is_open() {
            return;
        }
        if self.lock.is_none() {
            self.lock = Some(scroll_lock.acquire());
        }
        self.phase = SheetPhase::Opening;
        log::debug!("[sheet] opening");
    }

    /// Finish any pending enter/exit transition.
    pub fn settle(&mut self) {
        match self.phase {
            SheetPhase::Opening => {
                self.phase = SheetPhase::Open;
                log::trace!("[sheet] open");
            }
            SheetPhase::Closing => {
                self.phase = SheetPhase::Closed;
                log::trace!("[sheet] closed");
            }
            _ => {}
        }
    }

    /// Start closing and release the scroll lock.
    pub fn close(&mut self) -> SheetOutcome {
        if !self.is_open() {
            return SheetOutcome::Ignored;
        }
        self.lock = None;
        self.phase = SheetPhase::Closing;
        log::debug!("[sheet] closing");
        SheetOutcome::Dismissed
    }

    /// Pointer pressed somewhere on or around the sheet.
    pub fn pointer_down(&mut self, target: PointerTarget, y: f32, at: Instant) -> SheetOutcome {
        match (self.phase, target) {
            (SheetPhase::Open, PointerTarget::Handle) => {
                self.phase = SheetPhase::Dragging(DragSession::new(y, at));
                log::trace!("[sheet] drag start y={}", y);
                SheetOutcome::Handled
            }
            (_, PointerTarget::Backdrop) if self.is_open() => {
                log::debug!("[sheet] backdrop pressed");
                self.close()
            }
            _ => SheetOutcome::Ignored,
        }
    }

    /// Pointer moved while possibly dragging.
    pub fn pointer_move(&mut self, y: f32, at: Instant) -> SheetOutcome {
        match &mut self.phase {
            SheetPhase::Dragging(session) => {
                session.update(y, at);
                log::trace!(
                    "[sheet] drag offset={} velocity={}",
                    session.current_offset_y,
                    session.velocity_y
                );
                SheetOutcome::Handled
            }
            _ => SheetOutcome::Ignored,
        }
    }

    /// Pointer released. Dismisses past either threshold, snaps back otherwise.
    pub fn pointer_up(&mut self, at: Instant) -> SheetOutcome {
        let SheetPhase::Dragging(session) = self.phase else {
            return SheetOutcome::Ignored;
        };

        let velocity = session.release_velocity(at);
        let offset = session.current_offset_y;
        log::debug!("[sheet] release offset={} velocity={}", offset, velocity);

        if offset > self.config.dismiss_distance || velocity > self.config.dismiss_velocity {
            // Leave Dragging first so close() sees an open sheet.
            self.phase = SheetPhase::Open;
            self.close()
        } else {
            self.phase = SheetPhase::Open;
            SheetOutcome::Handled
        }
    }

    /// The gesture was interrupted. Snaps back to open.
    pub fn cancel_drag(&mut self) {
        if let SheetPhase::Dragging(_) = self.phase {
            self.phase = SheetPhase::Open;
            log::debug!("[sheet] drag cancelled");
        }
    }

    /// Sheet height for a viewport, capped by the configured ratio and an
    /// optional explicit maximum.
    pub fn height(&self, viewport_height: f32, content_height: f32, max_height: Option<f32>) -> f32 {
        let mut cap = viewport_height * self.config.max_height_ratio;
        if let Some(max) = max_height {
            cap = cap.min(max);
        }
        content_height.min(cap).max(0.0)
    }
}

impl Default for DismissibleSheet {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}
