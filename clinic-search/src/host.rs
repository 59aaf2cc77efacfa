//! Terminal geometry for the overlay core.
//!
//! One terminal cell is one logical pixel. The page is taller than the
//! terminal, so document rows and viewport rows differ by the page scroll.

use overlay_core::{Measure, OverlayConfig, Rect, Size, Viewport};

/// Document row the search bar sits on.
pub const BAR_ROW: f32 = 3.0;

/// Total document height in rows.
pub const PAGE_HEIGHT: f32 = 60.0;

/// Column where the first trigger starts.
pub const BAR_LEFT: f32 = 2.0;

/// Gap between triggers.
pub const TRIGGER_GAP: f32 = 2.0;

/// Overlay config scaled to terminal cells.
pub fn cell_config() -> OverlayConfig {
    OverlayConfig::new()
        .edge_margin(1.0)
        .dismiss_thresholds(4.0, 20.0)
        .mobile_breakpoint(80.0)
        .sheet_max_height_ratio(0.7)
}

/// Measurements for one filter's overlay this frame.
#[derive(Debug, Clone, Copy)]
pub struct FilterMeasure {
    pub viewport: Viewport,
    pub trigger: Rect,
    pub panel: Size,
}

impl Measure for FilterMeasure {
    fn viewport(&self) -> Option<Viewport> {
        // Zero-sized terminals happen briefly during resizes.
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return None;
        }
        Some(self.viewport)
    }

    fn trigger_rect(&self) -> Option<Rect> {
        Some(self.trigger)
    }

    fn panel_size(&self) -> Option<Size> {
        Some(self.panel)
    }
}

/// Convert a document row to a viewport row.
pub fn to_viewport_row(document_row: f32, viewport: &Viewport) -> f32 {
    document_row - viewport.scroll_y
}

/// Largest valid page scroll for a viewport.
pub fn max_scroll(viewport: &Viewport) -> f32 {
    (PAGE_HEIGHT - viewport.height).max(0.0)
}
