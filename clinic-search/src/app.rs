//! Search bar state and input handling.

use std::time::Instant;

use crossterm::event::{
    Event as CtEvent, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use overlay_core::{
    AdapterProps, Key, OverlayController, OverlayEnv, Point, PointerEvent, PointerTarget, Rect,
    RenderPlan, ResponsiveOverlay, SheetPhase, Size, Viewport, ViewportEvent,
};
use unicode_width::UnicodeWidthStr;

use crate::host::{self, FilterMeasure, BAR_LEFT, BAR_ROW, TRIGGER_GAP};

pub const SERVICES: &[&str] = &[
    "General consultation",
    "Dental cleaning",
    "Physiotherapy",
    "Vaccination",
    "Blood test",
    "Eye examination",
];

pub const SPECIALTIES: &[&str] = &[
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "Orthopedics",
    "Neurology",
    "Gynecology",
    "Psychiatry",
];

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One dropdown filter on the search bar.
pub struct Filter {
    pub name: &'static str,
    pub options: &'static [&'static str],
    pub selected: Option<usize>,
    pub controller: OverlayController,
    pub overlay: ResponsiveOverlay,
    pub plan: RenderPlan,
}

impl Filter {
    fn new(env: &OverlayEnv, name: &'static str, options: &'static [&'static str]) -> Self {
        let controller = env.controller(&name.to_lowercase());
        let handle = controller.close_handle();
        let overlay = ResponsiveOverlay::new(env, AdapterProps::new().title(name), move || {
            handle.close()
        });
        Self {
            name,
            options,
            selected: None,
            controller,
            overlay,
            plan: RenderPlan::TriggerOnly,
        }
    }

    pub fn trigger_label(&self) -> String {
        let value = self.selected.map_or("Any", |i| self.options[i]);
        let arrow = if self.controller.is_open() { '▴' } else { '▾' };
        format!("[ {}: {} {} ]", self.name, value, arrow)
    }

    /// Content size: one row per option inside a one-cell border.
    pub fn panel_size(&self) -> Size {
        let widest = self
            .options
            .iter()
            .map(|option| option.width())
            .max()
            .unwrap_or(0);
        Size::new(widest as f32 + 4.0, self.options.len() as f32 + 2.0)
    }

    fn select(&mut self, index: usize) {
        if index < self.options.len() {
            log::debug!("[app] {} -> {}", self.name, self.options[index]);
            self.selected = Some(index);
        }
        self.overlay.close();
    }
}

/// The landing-page search bar with its two filters.
pub struct SearchBar {
    pub env: OverlayEnv,
    pub filters: Vec<Filter>,
    pub viewport: Viewport,
}

impl SearchBar {
    pub fn new(env: OverlayEnv, width: u16, height: u16) -> Self {
        let filters = vec![
            Filter::new(&env, "Service", SERVICES),
            Filter::new(&env, "Specialty", SPECIALTIES),
        ];
        Self {
            env,
            filters,
            viewport: Viewport::new(width as f32, height as f32),
        }
    }

    /// Trigger rectangles in viewport coordinates, in filter order.
    pub fn trigger_rects(&self) -> Vec<Rect> {
        let row = host::to_viewport_row(BAR_ROW, &self.viewport);
        let mut x = BAR_LEFT;
        self.filters
            .iter()
            .map(|filter| {
                let width = filter.trigger_label().width() as f32;
                let rect = Rect::new(x, row, width, 1.0);
                x += width + TRIGGER_GAP;
                rect
            })
            .collect()
    }

    fn measure(&self, index: usize, trigger: Rect) -> FilterMeasure {
        FilterMeasure {
            viewport: self.viewport,
            trigger,
            panel: self.filters[index].panel_size(),
        }
    }

    /// Reconcile every overlay with its controller for this frame.
    pub fn frame(&mut self) {
        let triggers = self.trigger_rects();
        for (index, trigger) in triggers.into_iter().enumerate() {
            let measure = self.measure(index, trigger);
            let filter = &mut self.filters[index];
            filter.plan = filter.overlay.frame(filter.controller.is_open(), &measure);
        }
    }

    pub fn handle(&mut self, event: &CtEvent) -> Flow {
        match event {
            CtEvent::Key(key_event) => {
                if key_event.kind != KeyEventKind::Press {
                    return Flow::Continue;
                }
                if key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Flow::Quit;
                }
                self.handle_key(key_event.code.into())
            }
            CtEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Flow::Continue
            }
            CtEvent::Resize(width, height) => {
                self.resize(*width, *height);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: Key) -> Flow {
        match key {
            Key::Char('q') => return Flow::Quit,
            Key::Char('1') => self.filters[0].controller.toggle(),
            Key::Char('2') => self.filters[1].controller.toggle(),
            Key::Escape => {
                for filter in &mut self.filters {
                    filter.overlay.key(Key::Escape);
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let position = Point::new(mouse.column as f32, mouse.row as f32);
        let at = Instant::now();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_down(position, at),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.forward(PointerEvent::Move { position, at });
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.forward(PointerEvent::Up { position, at });
            }
            MouseEventKind::ScrollDown => self.scroll_by(1.0),
            MouseEventKind::ScrollUp => self.scroll_by(-1.0),
            _ => {}
        }
    }

    fn pointer_down(&mut self, position: Point, at: Instant) {
        let triggers = self.trigger_rects();
        let viewport = self.viewport;

        for index in 0..self.filters.len() {
            let measure = self.measure(index, triggers[index]);
            let filter = &mut self.filters[index];

            match filter.plan.clone() {
                // A closing sheet is on its way out and takes no input.
                RenderPlan::Sheet {
                    phase: SheetPhase::Closing,
                    ..
                } => {}
                RenderPlan::Sheet {
                    offset_y, height, ..
                } => {
                    let top = (viewport.height - height.round() + offset_y.round()).max(0.0);
                    let target = if position.y < top {
                        PointerTarget::Backdrop
                    } else if position.y < top + 1.0 {
                        PointerTarget::Handle
                    } else {
                        PointerTarget::Content
                    };

                    if target == PointerTarget::Content {
                        // Option rows start under the handle row
                        if filter.controller.is_open() {
                            filter.select((position.y - top - 1.0) as usize);
                        }
                    } else {
                        filter
                            .overlay
                            .pointer(PointerEvent::Down { target, position, at }, &measure);
                    }
                    // A sheet covers the page: nothing underneath sees the press.
                    return;
                }
                RenderPlan::Floating { position: placed, size } => {
                    let panel = Rect::new(
                        placed.left,
                        host::to_viewport_row(placed.top, &viewport),
                        size.width,
                        size.height,
                    );
                    if panel.contains(position) {
                        let row = position.y - panel.y - 1.0;
                        if row >= 0.0 && row < filter.options.len() as f32 {
                            filter.select(row as usize);
                        }
                        return;
                    }
                    let down = PointerEvent::Down {
                        target: PointerTarget::Content,
                        position,
                        at,
                    };
                    filter.overlay.pointer(down, &measure);
                }
                _ => {}
            }
        }

        if let Some(index) = triggers.iter().position(|rect| rect.contains(position)) {
            self.filters[index].controller.toggle();
        }
    }

    fn forward(&mut self, event: PointerEvent) {
        let triggers = self.trigger_rects();
        for index in 0..self.filters.len() {
            let measure = self.measure(index, triggers[index]);
            self.filters[index].overlay.pointer(event, &measure);
        }
    }

    fn scroll_by(&mut self, delta: f32) {
        if self.env.scroll_lock.is_locked() {
            log::trace!("[app] scroll suppressed by lock");
            return;
        }
        let next = (self.viewport.scroll_y + delta).clamp(0.0, host::max_scroll(&self.viewport));
        if next == self.viewport.scroll_y {
            return;
        }
        self.viewport.scroll_y = next;
        self.env.listeners.dispatch(&ViewportEvent::Scroll {
            scroll_x: self.viewport.scroll_x,
            scroll_y: next,
        });
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.viewport.width = width as f32;
        self.viewport.height = height as f32;
        self.viewport.scroll_y = self.viewport.scroll_y.min(host::max_scroll(&self.viewport));
        self.env.listeners.dispatch(&ViewportEvent::Resize {
            width: self.viewport.width,
            height: self.viewport.height,
        });
    }
}
