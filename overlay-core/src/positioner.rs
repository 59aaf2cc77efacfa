//! Floating panel placement.
//!
//! A floating panel renders below its trigger in document coordinates.
//! Placement is a two-phase process: the panel is first mounted invisibly
//! (its size is unknown until content exists), then positioned on the next
//! tick and revealed.
//!
//! The panel is always placed below the trigger. There is no vertical flip
//! when space below runs out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::PositionerConfig;
use crate::geometry::{ComputedPosition, Point, Rect, Size};
use crate::viewport::{ListenerGuard, Measure, Viewport, ViewportListeners};

/// Compute where a panel of `panel` size goes under `trigger`.
///
/// The panel is left-aligned with the trigger unless that would push its
/// right edge within `edge_margin` of the viewport, in which case it is
/// right-aligned with the trigger instead. The result never sits closer than
/// `edge_margin` to the left edge.
///
/// `trigger` is viewport-relative; the returned `top` is in document
/// coordinates. Horizontal scroll is not applied.
pub fn compute_position(
    trigger: Rect,
    panel: Size,
    viewport: &Viewport,
    edge_margin: f32,
) -> ComputedPosition {
    let top = trigger.bottom() + viewport.scroll_y;

    let mut left = trigger.left();
    if left + panel.width > viewport.width - edge_margin {
        left = trigger.right() - panel.width;
    }
    let left = left.max(edge_margin);

    ComputedPosition::new(top, left)
}

/// Placement phase of a floating panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelPhase {
    /// Not rendered.
    Closed,
    /// Rendered invisibly, waiting for a measurable panel.
    Measuring,
    /// Visible at a computed position.
    Placed(ComputedPosition),
}

/// Positions one floating panel and keeps it positioned while open.
///
/// While open, the panel holds a viewport listener that marks it dirty on
/// scroll or resize; the next [`tick`](Self::tick) recomputes once no matter
/// how many events arrived. A change in measured content size also triggers
/// a recomputation.
#[derive(Debug)]
pub struct FloatingPanel {
    config: PositionerConfig,
    phase: PanelPhase,
    dirty: Arc<AtomicBool>,
    listener: Option<ListenerGuard>,
    /// Effective panel size used for the current position.
    size: Option<Size>,
}

impl FloatingPanel {
    pub fn new(config: PositionerConfig) -> Self {
        Self {
            config,
            phase: PanelPhase::Closed,
            dirty: Arc::new(AtomicBool::new(false)),
            listener: None,
            size: None,
        }
    }

    pub fn config(&self) -> &PositionerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PositionerConfig) {
        self.config = config;
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != PanelPhase::Closed
    }

    /// Start showing the panel and attach the scroll/resize listener.
    ///
    /// Positioning is deferred to the next [`tick`](Self::tick). Does
    /// nothing if already open.
    pub fn open(&mut self, listeners: &ViewportListeners) {
        if self.is_open() {
            return;
        }
        self.phase = PanelPhase::Measuring;
        self.dirty.store(false, Ordering::SeqCst);

        let dirty = Arc::clone(&self.dirty);
        self.listener = Some(listeners.listen(move |event| {
            log::trace!("[positioner] viewport changed: {:?}", event);
            dirty.store(true, Ordering::SeqCst);
        }));
        log::debug!("[positioner] open, measuring");
    }

    /// Hide the panel. Detaches the listener before returning.
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.listener = None;
        self.phase = PanelPhase::Closed;
        self.size = None;
        self.dirty.store(false, Ordering::SeqCst);
        log::debug!("[positioner] closed");
    }

    /// Run the deferred positioning phase.
    ///
    /// Returns the position to render at, or `None` when the panel is
    /// closed or cannot be measured yet.
    pub fn tick(&mut self, measure: &dyn Measure) -> Option<ComputedPosition> {
        match self.phase {
            PanelPhase::Closed => None,
            PanelPhase::Measuring => {
                let (position, size) = self.measure_and_compute(measure)?;
                self.dirty.store(false, Ordering::SeqCst);
                self.size = Some(size);
                self.phase = PanelPhase::Placed(position);
                log::debug!(
                    "[positioner] placed top={} left={} size={}x{}",
                    position.top,
                    position.left,
                    size.width,
                    size.height
                );
                Some(position)
            }
            PanelPhase::Placed(current) => {
                let resized = measure
                    .panel_size()
                    .map(|measured| Some(self.effective_size(measured)) != self.size)
                    .unwrap_or(false);
                let dirty = self.dirty.swap(false, Ordering::SeqCst);

                if !(dirty || resized) {
                    return Some(current);
                }

                // Keep the old position if the host cannot measure right now.
                let Some((position, size)) = self.measure_and_compute(measure) else {
                    return Some(current);
                };
                log::trace!(
                    "[positioner] reposition dirty={} resized={} top={} left={}",
                    dirty,
                    resized,
                    position.top,
                    position.left
                );
                self.size = Some(size);
                self.phase = PanelPhase::Placed(position);
                Some(position)
            }
        }
    }

    /// Current position; `Some` only while open and placed.
    pub fn position(&self) -> Option<ComputedPosition> {
        match self.phase {
            PanelPhase::Placed(position) => Some(position),
            _ => None,
        }
    }

    /// Effective panel size for the current position.
    pub fn size(&self) -> Option<Size> {
        match self.phase {
            PanelPhase::Placed(_) => self.size,
            _ => None,
        }
    }

    /// Placed panel rectangle in document coordinates.
    pub fn panel_rect(&self) -> Option<Rect> {
        Some(self.position()?.to_rect(self.size()?))
    }

    /// Whether a document-space point falls on the placed panel.
    pub fn contains(&self, point: Point) -> bool {
        self.panel_rect().is_some_and(|rect| rect.contains(point))
    }

    fn effective_size(&self, measured: Size) -> Size {
        let width = self.config.width.unwrap_or(measured.width);
        let height = match self.config.max_height {
            Some(max) => measured.height.min(max),
            None => measured.height,
        };
        Size::new(width, height)
    }

    fn measure_and_compute(&self, measure: &dyn Measure) -> Option<(ComputedPosition, Size)> {
        let (Some(viewport), Some(trigger), Some(measured)) =
            (measure.viewport(), measure.trigger_rect(), measure.panel_size())
        else {
            log::debug!("[positioner] measurement not ready, deferring");
            return None;
        };
        let size = self.effective_size(measured);
        let position = compute_position(trigger, size, &viewport, self.config.edge_margin);
        Some((position, size))
    }
}

impl Default for FloatingPanel {
    fn default() -> Self {
        Self::new(PositionerConfig::default())
    }
}
