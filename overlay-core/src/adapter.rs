//! Responsive overlay: one contract, two rendering strategies.
//!
//! A [`ResponsiveOverlay`] renders its content as a [`FloatingPanel`] on wide
//! viewports and as a [`DismissibleSheet`] below the mobile breakpoint. The
//! caller only supplies an open flag and a close callback each frame and
//! draws whatever [`RenderPlan`] comes back.
//!
//! Crossing the breakpoint while open closes the overlay instead of moving
//! live state from one strategy to the other.
//!
//! # Example
//!
//! ```
//! use overlay_core::{AdapterProps, Measure, OverlayEnv, Rect, RenderPlan, ResponsiveOverlay, Size, Viewport};
//!
//! struct Page;
//! impl Measure for Page {
//!     fn viewport(&self) -> Option<Viewport> { Some(Viewport::new(1280.0, 800.0)) }
//!     fn trigger_rect(&self) -> Option<Rect> { Some(Rect::new(40.0, 10.0, 120.0, 32.0)) }
//!     fn panel_size(&self) -> Option<Size> { Some(Size::new(240.0, 300.0)) }
//! }
//!
//! let env = OverlayEnv::new();
//! let service = env.controller("service");
//! let mut overlay = ResponsiveOverlay::new(&env, AdapterProps::default(), {
//!     let handle = service.close_handle();
//!     move || handle.close()
//! });
//!
//! service.open();
//! assert!(matches!(overlay.frame(service.is_open(), &Page), RenderPlan::Floating { .. }));
//! ```

use std::sync::Arc;

use crate::config::{OverlayConfig, PositionerConfig};
use crate::controller::OverlayController;
use crate::event::{Key, PointerEvent};
use crate::geometry::{ComputedPosition, Point, Size};
use crate::positioner::FloatingPanel;
use crate::registry::OverlayRegistry;
use crate::scroll_lock::ScrollLock;
use crate::sheet::{DismissibleSheet, SheetOutcome, SheetPhase};
use crate::viewport::{Measure, ViewportListeners};

/// Page-level resources shared by every overlay on a page.
///
/// Cheap to clone; clones share the registry, listeners and scroll lock.
#[derive(Debug, Clone, Default)]
pub struct OverlayEnv {
    pub registry: OverlayRegistry,
    pub listeners: ViewportListeners,
    pub scroll_lock: ScrollLock,
    pub config: OverlayConfig,
}

impl OverlayEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OverlayConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a controller registered with this page's registry.
    pub fn controller(&self, label: &str) -> OverlayController {
        OverlayController::named(&self.registry, label)
    }
}

/// Per-overlay overrides of the shared [`OverlayConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterProps {
    /// Heading shown at the top of the bottom sheet.
    pub title: Option<String>,
    /// Maximum panel/sheet height.
    pub max_height: Option<f32>,
    /// Fixed floating panel width.
    pub width: Option<f32>,
    /// Breakpoint override for this overlay.
    pub mobile_breakpoint: Option<f32>,
}

impl AdapterProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn max_height(mut self, height: f32) -> Self {
        self.max_height = Some(height);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn mobile_breakpoint(mut self, width: f32) -> Self {
        self.mobile_breakpoint = Some(width);
        self
    }
}

/// Rendering strategy currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No viewport measurement yet.
    #[default]
    Unknown,
    Floating,
    Sheet,
}

/// What the host should draw this frame, besides the trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPlan {
    /// Draw the trigger only.
    TriggerOnly,
    /// Mount the panel content invisibly so it can be measured.
    Measuring {
        width: Option<f32>,
        max_height: Option<f32>,
    },
    /// Draw the panel at `position` (document coordinates).
    Floating {
        position: ComputedPosition,
        size: Size,
    },
    /// Draw a bottom sheet `height` tall, pushed down by `offset_y`.
    Sheet {
        phase: SheetPhase,
        offset_y: f32,
        height: f32,
        title: Option<String>,
    },
}

impl RenderPlan {
    /// Whether any overlay content is visible.
    pub fn is_visible(&self) -> bool {
        matches!(self, RenderPlan::Floating { .. } | RenderPlan::Sheet { .. })
    }
}

type CloseFn = Arc<dyn Fn() + Send + Sync>;

/// Chooses between a floating panel and a bottom sheet per frame.
pub struct ResponsiveOverlay {
    props: AdapterProps,
    config: OverlayConfig,
    listeners: ViewportListeners,
    scroll_lock: ScrollLock,
    on_close: CloseFn,
    mode: Mode,
    panel: FloatingPanel,
    sheet: DismissibleSheet,
}

impl ResponsiveOverlay {
    pub fn new<F>(env: &OverlayEnv, props: AdapterProps, on_close: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let config = env.config.clone();
        let positioner = positioner_config(&config, &props);
        Self {
            panel: FloatingPanel::new(positioner),
            sheet: DismissibleSheet::new(config.sheet()),
            props,
            config,
            listeners: env.listeners.clone(),
            scroll_lock: env.scroll_lock.clone(),
            on_close: Arc::new(on_close),
            mode: Mode::Unknown,
        }
    }

    pub fn props(&self) -> &AdapterProps {
        &self.props
    }

    /// Replace the per-overlay props. Takes effect on the next frame.
    pub fn set_props(&mut self, props: AdapterProps) {
        self.panel
            .set_config(positioner_config(&self.config, &props));
        self.props = props;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn panel(&self) -> &FloatingPanel {
        &self.panel
    }

    pub fn sheet(&self) -> &DismissibleSheet {
        &self.sheet
    }

    fn breakpoint(&self) -> f32 {
        self.props
            .mobile_breakpoint
            .unwrap_or(self.config.mobile_breakpoint)
    }

    /// Whether the active strategy currently shows content.
    pub fn is_active(&self) -> bool {
        self.panel.is_open() || self.sheet.is_open()
    }

    /// Reconcile with the caller's open flag and produce this frame's plan.
    pub fn frame(&mut self, is_open: bool, measure: &dyn Measure) -> RenderPlan {
        let Some(viewport) = measure.viewport() else {
            log::trace!("[adapter] no viewport yet, trigger only");
            return RenderPlan::TriggerOnly;
        };

        let next = if viewport.width < self.breakpoint() {
            Mode::Sheet
        } else {
            Mode::Floating
        };

        if self.mode != Mode::Unknown && next != self.mode {
            log::debug!(
                "[adapter] breakpoint crossed {:?} -> {:?} (width={}, open={})",
                self.mode,
                next,
                viewport.width,
                is_open
            );
            let was_active = self.is_active();
            self.teardown();
            self.mode = next;
            if was_active || is_open {
                (self.on_close)();
                return RenderPlan::TriggerOnly;
            }
        }
        self.mode = next;

        match self.mode {
            Mode::Floating => self.frame_floating(is_open, measure),
            Mode::Sheet => self.frame_sheet(is_open, measure, viewport.height),
            Mode::Unknown => RenderPlan::TriggerOnly,
        }
    }

    fn frame_floating(&mut self, is_open: bool, measure: &dyn Measure) -> RenderPlan {
        if is_open {
            self.panel.open(&self.listeners);
        } else {
            self.panel.close();
        }

        if !self.panel.is_open() {
            return RenderPlan::TriggerOnly;
        }

        match self.panel.tick(measure) {
            Some(position) => RenderPlan::Floating {
                position,
                size: self.panel.size().unwrap_or_default(),
            },
            None => {
                let config = self.panel.config();
                RenderPlan::Measuring {
                    width: config.width,
                    max_height: config.max_height,
                }
            }
        }
    }

    fn frame_sheet(&mut self, is_open: bool, measure: &dyn Measure, viewport_height: f32) -> RenderPlan {
        // Transitions are treated as instantaneous: whatever phase the last
        // frame started completes now.
        self.sheet.settle();

        if is_open {
            self.sheet.open(&self.scroll_lock);
        } else if self.sheet.is_open() {
            // The caller already knows it is closed.
            let _ = self.sheet.close();
        }

        if !self.sheet.is_rendered() {
            return RenderPlan::TriggerOnly;
        }

        let content_height = measure
            .panel_size()
            .map(|size| size.height)
            .unwrap_or(viewport_height);
        RenderPlan::Sheet {
            phase: self.sheet.phase(),
            offset_y: self.sheet.offset(),
            height: self
                .sheet
                .height(viewport_height, content_height, self.props.max_height),
            title: self.props.title.clone(),
        }
    }

    /// Feed a pointer event. Returns true if the overlay consumed it.
    ///
    /// Positions are viewport-relative.
    pub fn pointer(&mut self, event: PointerEvent, measure: &dyn Measure) -> bool {
        match self.mode {
            Mode::Sheet => self.pointer_sheet(event),
            Mode::Floating => self.pointer_floating(event, measure),
            Mode::Unknown => false,
        }
    }

    fn pointer_sheet(&mut self, event: PointerEvent) -> bool {
        let outcome = match event {
            PointerEvent::Down { target, position, at } => {
                self.sheet.pointer_down(target, position.y, at)
            }
            PointerEvent::Move { position, at } => self.sheet.pointer_move(position.y, at),
            PointerEvent::Up { position, at } => {
                // A release where the last move already was carries no new
                // motion and must not zero the velocity.
                let moved = self
                    .sheet
                    .drag()
                    .is_some_and(|session| session.last_y() != position.y);
                if moved {
                    let _ = self.sheet.pointer_move(position.y, at);
                }
                self.sheet.pointer_up(at)
            }
            PointerEvent::Cancel => {
                self.sheet.cancel_drag();
                SheetOutcome::Handled
            }
        };
        self.apply(outcome)
    }

    fn pointer_floating(&mut self, event: PointerEvent, measure: &dyn Measure) -> bool {
        let PointerEvent::Down { position, .. } = event else {
            return false;
        };
        if !self.config.close_on_outside_click || self.panel.position().is_none() {
            return false;
        }

        let scroll_y = measure.viewport().map_or(0.0, |viewport| viewport.scroll_y);
        let document_point = Point::new(position.x, position.y + scroll_y);
        if self.panel.contains(document_point) {
            return false;
        }
        // The trigger toggles on its own; a second close here would race it.
        if measure
            .trigger_rect()
            .is_some_and(|trigger| trigger.contains(position))
        {
            return false;
        }

        log::debug!("[adapter] outside click at ({}, {})", position.x, position.y);
        self.panel.close();
        (self.on_close)();
        true
    }

    /// Feed a key press. Returns true if the overlay consumed it.
    pub fn key(&mut self, key: Key) -> bool {
        if key != Key::Escape || !self.config.close_on_escape || !self.is_active() {
            return false;
        }
        log::debug!("[adapter] escape pressed, closing");
        self.panel.close();
        let _ = self.sheet.close();
        (self.on_close)();
        true
    }

    /// Close programmatically (e.g. after an option was picked).
    pub fn close(&mut self) {
        if !self.is_active() {
            return;
        }
        self.panel.close();
        let _ = self.sheet.close();
        (self.on_close)();
    }

    fn apply(&mut self, outcome: SheetOutcome) -> bool {
        match outcome {
            SheetOutcome::Ignored => false,
            SheetOutcome::Handled => true,
            SheetOutcome::Dismissed => {
                (self.on_close)();
                true
            }
        }
    }

    /// Drop both strategies' live state immediately.
    fn teardown(&mut self) {
        self.panel.close();
        let _ = self.sheet.close();
        self.sheet.settle();
    }
}

impl std::fmt::Debug for ResponsiveOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsiveOverlay")
            .field("mode", &self.mode)
            .field("panel", &self.panel.phase())
            .field("sheet", &self.sheet.phase())
            .field("props", &self.props)
            .finish()
    }
}

fn positioner_config(config: &OverlayConfig, props: &AdapterProps) -> PositionerConfig {
    let mut positioner = config.positioner();
    if props.width.is_some() {
        positioner.width = props.width;
    }
    if props.max_height.is_some() {
        positioner.max_height = props.max_height;
    }
    positioner
}

