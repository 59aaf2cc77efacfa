//! Overlay configuration types.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default gap kept between a floating panel and the viewport edge.
pub const EDGE_MARGIN: f32 = 16.0;

/// Drag distance past which releasing a sheet dismisses it.
pub const DISMISS_DISTANCE_PX: f32 = 100.0;

/// Downward release velocity past which a sheet is dismissed.
pub const DISMISS_VELOCITY_PX_PER_S: f32 = 500.0;

/// Viewports narrower than this use a bottom sheet instead of a floating panel.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

/// Shared configuration for every overlay in a coordinated set.
///
/// Lengths are logical pixels. Hosts with a different unit (terminal cells)
/// scale every length together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Minimum distance between a floating panel and the viewport's left
    /// and right edges.
    pub edge_margin: f32,

    /// Drag distance (downward) that dismisses a sheet on release.
    pub dismiss_distance: f32,

    /// Release velocity (downward, per second) that dismisses a sheet even
    /// when the distance threshold was not reached.
    pub dismiss_velocity: f32,

    /// Width below which the bottom sheet strategy is used.
    pub mobile_breakpoint: f32,

    /// Maximum sheet height as a fraction of the viewport height.
    pub sheet_max_height_ratio: f32,

    /// Fixed floating panel width (None = use the measured content width).
    pub panel_width: Option<f32>,

    /// Maximum floating panel height (None = unbounded).
    pub panel_max_height: Option<f32>,

    /// Close the open overlay when Escape is pressed.
    pub close_on_escape: bool,

    /// Close a floating panel when the user clicks outside it and its trigger.
    pub close_on_outside_click: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            edge_margin: EDGE_MARGIN,
            dismiss_distance: DISMISS_DISTANCE_PX,
            dismiss_velocity: DISMISS_VELOCITY_PX_PER_S,
            mobile_breakpoint: MOBILE_BREAKPOINT,
            sheet_max_height_ratio: 0.85,
            panel_width: None,
            panel_max_height: None,
            close_on_escape: true,
            close_on_outside_click: true,
        }
    }
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport edge margin.
    pub fn edge_margin(mut self, margin: f32) -> Self {
        self.edge_margin = margin;
        self
    }

    /// Set both sheet dismissal thresholds.
    pub fn dismiss_thresholds(mut self, distance: f32, velocity: f32) -> Self {
        self.dismiss_distance = distance;
        self.dismiss_velocity = velocity;
        self
    }

    /// Set the width at which rendering switches to the bottom sheet.
    pub fn mobile_breakpoint(mut self, width: f32) -> Self {
        self.mobile_breakpoint = width;
        self
    }

    /// Set the maximum sheet height ratio.
    pub fn sheet_max_height_ratio(mut self, ratio: f32) -> Self {
        self.sheet_max_height_ratio = ratio;
        self
    }

    /// Fix the floating panel width.
    pub fn panel_width(mut self, width: f32) -> Self {
        self.panel_width = Some(width);
        self
    }

    /// Cap the floating panel height.
    pub fn panel_max_height(mut self, height: f32) -> Self {
        self.panel_max_height = Some(height);
        self
    }

    /// Enable or disable closing on Escape.
    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    /// Enable or disable closing on outside clicks.
    pub fn close_on_outside_click(mut self, enabled: bool) -> Self {
        self.close_on_outside_click = enabled;
        self
    }

    /// Check every field for values the overlay math cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("edge_margin", self.edge_margin)?;
        positive("dismiss_distance", self.dismiss_distance)?;
        positive("dismiss_velocity", self.dismiss_velocity)?;
        positive("mobile_breakpoint", self.mobile_breakpoint)?;

        let ratio = self.sheet_max_height_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(ConfigError::InvalidRatio {
                field: "sheet_max_height_ratio",
                value: ratio,
            });
        }

        if let Some(width) = self.panel_width {
            positive("panel_width", width)?;
        }
        if let Some(height) = self.panel_max_height {
            positive("panel_max_height", height)?;
        }
        Ok(())
    }

    pub(crate) fn positioner(&self) -> PositionerConfig {
        PositionerConfig {
            edge_margin: self.edge_margin,
            width: self.panel_width,
            max_height: self.panel_max_height,
        }
    }

    pub(crate) fn sheet(&self) -> SheetConfig {
        SheetConfig {
            dismiss_distance: self.dismiss_distance,
            dismiss_velocity: self.dismiss_velocity,
            max_height_ratio: self.sheet_max_height_ratio,
        }
    }
}

/// The slice of [`OverlayConfig`] a floating panel needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionerConfig {
    pub edge_margin: f32,
    pub width: Option<f32>,
    pub max_height: Option<f32>,
}

impl Default for PositionerConfig {
    fn default() -> Self {
        OverlayConfig::default().positioner()
    }
}

/// The slice of [`OverlayConfig`] a bottom sheet needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetConfig {
    pub dismiss_distance: f32,
    pub dismiss_velocity: f32,
    pub max_height_ratio: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        OverlayConfig::default().sheet()
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLength { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
