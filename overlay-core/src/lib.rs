pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod geometry;
pub mod positioner;
pub mod registry;
pub mod scroll_lock;
pub mod sheet;
pub mod viewport;

pub use adapter::{AdapterProps, Mode, OverlayEnv, RenderPlan, ResponsiveOverlay};
pub use config::{OverlayConfig, PositionerConfig, SheetConfig};
pub use controller::{CloseHandle, OverlayController};
pub use error::ConfigError;
pub use event::{Key, PointerEvent, PointerTarget};
pub use geometry::{ComputedPosition, Point, Rect, Size};
pub use positioner::{compute_position, FloatingPanel, PanelPhase};
pub use registry::{OverlayId, OverlayRegistry, SubscriptionId};
pub use scroll_lock::{ScrollLock, ScrollLockGuard};
pub use sheet::{DismissibleSheet, DragSession, SheetOutcome, SheetPhase};
pub use viewport::{ListenerGuard, Measure, Viewport, ViewportEvent, ViewportListeners};
