use std::time::{Duration, Instant};

use overlay_core::{
    AdapterProps, ComputedPosition, Key, Measure, Mode, OverlayController, OverlayEnv, Point,
    PointerEvent, PointerTarget, Rect, RenderPlan, ResponsiveOverlay, SheetPhase, Size, Viewport,
    ViewportEvent,
};

struct Page {
    viewport: Option<Viewport>,
    trigger: Option<Rect>,
    panel: Option<Size>,
}

impl Page {
    fn desktop() -> Self {
        Self {
            viewport: Some(Viewport::new(1280.0, 800.0)),
            trigger: Some(Rect::new(100.0, 20.0, 160.0, 40.0)),
            panel: Some(Size::new(240.0, 300.0)),
        }
    }

    fn phone() -> Self {
        Self {
            viewport: Some(Viewport::new(390.0, 800.0)),
            trigger: Some(Rect::new(16.0, 20.0, 160.0, 40.0)),
            panel: Some(Size::new(390.0, 300.0)),
        }
    }
}

impl Measure for Page {
    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn trigger_rect(&self) -> Option<Rect> {
        self.trigger
    }

    fn panel_size(&self) -> Option<Size> {
        self.panel
    }
}

fn overlay_for(env: &OverlayEnv, controller: &OverlayController) -> ResponsiveOverlay {
    let handle = controller.close_handle();
    ResponsiveOverlay::new(env, AdapterProps::new().title("Service"), move || handle.close())
}

// ============================================================================
// Strategy selection
// ============================================================================

#[test]
fn test_trigger_only_before_first_measurement() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page {
        viewport: None,
        trigger: None,
        panel: None,
    };

    service.open();
    assert_eq!(overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
    assert_eq!(overlay.mode(), Mode::Unknown);
    assert!(env.listeners.is_empty());
    assert!(!env.scroll_lock.is_locked());
}

#[test]
fn test_wide_viewport_floats() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::desktop();

    assert_eq!(overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
    assert_eq!(overlay.mode(), Mode::Floating);

    service.open();
    let plan = overlay.frame(service.is_open(), &page);
    assert_eq!(
        plan,
        RenderPlan::Floating {
            position: ComputedPosition::new(60.0, 100.0),
            size: Size::new(240.0, 300.0),
        }
    );
    assert_eq!(env.listeners.len(), 1);
    assert!(!env.scroll_lock.is_locked());
}

#[test]
fn test_unmeasured_panel_renders_invisibly_first() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = ResponsiveOverlay::new(
        &env,
        AdapterProps::new().width(320.0).max_height(200.0),
        || {},
    );
    let mut page = Page::desktop();
    page.panel = None;

    service.open();
    let plan = overlay.frame(service.is_open(), &page);
    assert_eq!(
        plan,
        RenderPlan::Measuring {
            width: Some(320.0),
            max_height: Some(200.0),
        }
    );
    assert!(!plan.is_visible());

    page.panel = Some(Size::new(180.0, 500.0));
    let plan = overlay.frame(service.is_open(), &page);
    assert!(matches!(
        plan,
        RenderPlan::Floating { size, .. } if size == Size::new(320.0, 200.0)
    ));
}

#[test]
fn test_narrow_viewport_uses_sheet() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::phone();

    service.open();
    let plan = overlay.frame(service.is_open(), &page);
    assert_eq!(overlay.mode(), Mode::Sheet);
    assert_eq!(
        plan,
        RenderPlan::Sheet {
            phase: SheetPhase::Opening,
            offset_y: 0.0,
            height: 300.0,
            title: Some("Service".to_string()),
        }
    );
    assert!(env.scroll_lock.is_locked());
    assert!(env.listeners.is_empty());

    let plan = overlay.frame(service.is_open(), &page);
    assert!(matches!(plan, RenderPlan::Sheet { phase: SheetPhase::Open, .. }));
}

#[test]
fn test_breakpoint_override() {
    let env = OverlayEnv::new();
    let mut overlay = ResponsiveOverlay::new(&env, AdapterProps::new().mobile_breakpoint(1400.0), || {});
    overlay.frame(false, &Page::desktop());
    assert_eq!(overlay.mode(), Mode::Sheet);
}

// ============================================================================
// Responsive handoff
// ============================================================================

#[test]
fn test_crossing_breakpoint_while_open_closes() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let mut page = Page::desktop();

    service.open();
    assert!(overlay.frame(service.is_open(), &page).is_visible());

    page.viewport = Some(Viewport::new(600.0, 800.0));
    env.listeners.dispatch(&ViewportEvent::Resize {
        width: 600.0,
        height: 800.0,
    });
    assert_eq!(overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
    assert!(!service.is_open());
    assert!(!env.registry.is_open(service.id()));
    assert_eq!(overlay.mode(), Mode::Sheet);
    assert!(env.listeners.is_empty());
    assert!(!env.scroll_lock.is_locked());

    // Stays closed on the following frame
    assert_eq!(overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
}

#[test]
fn test_crossing_back_from_sheet_releases_lock() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let mut page = Page::phone();

    service.open();
    overlay.frame(service.is_open(), &page);
    assert!(env.scroll_lock.is_locked());

    page.viewport = Some(Viewport::new(1024.0, 800.0));
    assert_eq!(overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
    assert!(!service.is_open());
    assert!(!env.scroll_lock.is_locked());
    assert_eq!(overlay.mode(), Mode::Floating);
}

#[test]
fn test_crossing_breakpoint_while_closed_is_quiet() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let other = env.controller("specialty");
    let mut overlay = overlay_for(&env, &service);
    let mut page = Page::desktop();

    overlay.frame(service.is_open(), &page);
    other.open();

    page.viewport = Some(Viewport::new(600.0, 800.0));
    overlay.frame(service.is_open(), &page);
    assert!(other.is_open(), "closed overlay must not disturb its peers");
}

// ============================================================================
// Mutual exclusion through adapters
// ============================================================================

#[test]
fn test_opening_peer_closes_panel_next_frame() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let specialty = env.controller("specialty");
    let mut service_overlay = overlay_for(&env, &service);
    let mut specialty_overlay = overlay_for(&env, &specialty);
    let page = Page::desktop();

    service.open();
    assert!(service_overlay.frame(service.is_open(), &page).is_visible());

    specialty.open();
    // The broadcast landed before anyone renders
    assert!(!service.is_open());
    assert_eq!(service_overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
    assert!(specialty_overlay.frame(specialty.is_open(), &page).is_visible());
    assert_eq!(env.listeners.len(), 1);
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_escape_closes() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::desktop();

    assert!(!overlay.key(Key::Escape));

    service.open();
    overlay.frame(service.is_open(), &page);
    assert!(!overlay.key(Key::Enter));
    assert!(overlay.key(Key::Escape));
    assert!(!service.is_open());
    assert!(env.listeners.is_empty());
}

#[test]
fn test_outside_click_closes_floating_panel() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::desktop();
    let now = Instant::now();

    service.open();
    overlay.frame(service.is_open(), &page);

    // On the panel: stays open
    let inside = PointerEvent::Down {
        target: PointerTarget::Content,
        position: Point::new(150.0, 100.0),
        at: now,
    };
    assert!(!overlay.pointer(inside, &page));
    assert!(service.is_open());

    // On the trigger: left to the trigger's own toggle
    let on_trigger = PointerEvent::Down {
        target: PointerTarget::Content,
        position: Point::new(120.0, 30.0),
        at: now,
    };
    assert!(!overlay.pointer(on_trigger, &page));
    assert!(service.is_open());

    let outside = PointerEvent::Down {
        target: PointerTarget::Content,
        position: Point::new(900.0, 600.0),
        at: now,
    };
    assert!(overlay.pointer(outside, &page));
    assert!(!service.is_open());
}

#[test]
fn test_sheet_drag_dismiss_closes_controller() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::phone();
    let t0 = Instant::now();

    service.open();
    overlay.frame(service.is_open(), &page);
    overlay.frame(service.is_open(), &page);

    overlay.pointer(
        PointerEvent::Down {
            target: PointerTarget::Handle,
            position: Point::new(200.0, 500.0),
            at: t0,
        },
        &page,
    );
    overlay.pointer(
        PointerEvent::Move {
            position: Point::new(200.0, 560.0),
            at: t0 + Duration::from_millis(400),
        },
        &page,
    );
    let plan = overlay.frame(service.is_open(), &page);
    assert!(matches!(plan, RenderPlan::Sheet { offset_y, .. } if offset_y == 60.0));

    overlay.pointer(
        PointerEvent::Up {
            position: Point::new(200.0, 660.0),
            at: t0 + Duration::from_millis(800),
        },
        &page,
    );
    assert!(!service.is_open());
    assert!(!env.scroll_lock.is_locked());

    // One frame in Closing, then gone
    assert!(matches!(
        overlay.frame(service.is_open(), &page),
        RenderPlan::TriggerOnly | RenderPlan::Sheet { phase: SheetPhase::Closing, .. }
    ));
    assert_eq!(overlay.frame(service.is_open(), &page), RenderPlan::TriggerOnly);
}

#[test]
fn test_flick_released_in_place_dismisses() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::phone();
    let t0 = Instant::now();

    service.open();
    overlay.frame(service.is_open(), &page);
    overlay.frame(service.is_open(), &page);

    overlay.pointer(
        PointerEvent::Down {
            target: PointerTarget::Handle,
            position: Point::new(200.0, 400.0),
            at: t0,
        },
        &page,
    );
    // 6px every 5ms: well above the velocity threshold, short of the distance one
    for step in 1..=10u64 {
        overlay.pointer(
            PointerEvent::Move {
                position: Point::new(200.0, 400.0 + 6.0 * step as f32),
                at: t0 + Duration::from_millis(5 * step),
            },
            &page,
        );
    }
    let velocity = overlay.sheet().drag().map(|session| session.velocity_y);
    assert!(velocity.is_some_and(|v| v > 1000.0));

    // Lifted exactly where the last move was reported
    overlay.pointer(
        PointerEvent::Up {
            position: Point::new(200.0, 460.0),
            at: t0 + Duration::from_millis(55),
        },
        &page,
    );
    assert_eq!(overlay.sheet().phase(), SheetPhase::Closing);
    assert!(!service.is_open());
    assert!(!env.scroll_lock.is_locked());
}

#[test]
fn test_slow_drag_released_in_place_snaps_back() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::phone();
    let t0 = Instant::now();

    service.open();
    overlay.frame(service.is_open(), &page);
    overlay.frame(service.is_open(), &page);

    overlay.pointer(
        PointerEvent::Down {
            target: PointerTarget::Handle,
            position: Point::new(200.0, 400.0),
            at: t0,
        },
        &page,
    );
    overlay.pointer(
        PointerEvent::Move {
            position: Point::new(200.0, 440.0),
            at: t0 + Duration::from_millis(200),
        },
        &page,
    );
    overlay.pointer(
        PointerEvent::Up {
            position: Point::new(200.0, 440.0),
            at: t0 + Duration::from_millis(210),
        },
        &page,
    );
    assert_eq!(overlay.sheet().phase(), SheetPhase::Open);
    assert!(service.is_open());
}

#[test]
fn test_backdrop_press_closes_sheet() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let mut overlay = overlay_for(&env, &service);
    let page = Page::phone();

    service.open();
    overlay.frame(service.is_open(), &page);
    overlay.frame(service.is_open(), &page);

    let consumed = overlay.pointer(
        PointerEvent::Down {
            target: PointerTarget::Backdrop,
            position: Point::new(10.0, 10.0),
            at: Instant::now(),
        },
        &page,
    );
    assert!(consumed);
    assert!(!service.is_open());
}

#[test]
fn test_dropping_adapter_releases_everything() {
    let env = OverlayEnv::new();
    let service = env.controller("service");
    let specialty = env.controller("specialty");
    {
        let mut sheet_overlay = overlay_for(&env, &service);
        service.open();
        sheet_overlay.frame(service.is_open(), &Page::phone());

        let mut panel_overlay = overlay_for(&env, &specialty);
        specialty.open();
        panel_overlay.frame(specialty.is_open(), &Page::desktop());

        assert!(env.scroll_lock.is_locked());
        assert_eq!(env.listeners.len(), 1);
    }
    assert!(!env.scroll_lock.is_locked());
    assert!(env.listeners.is_empty());
}
