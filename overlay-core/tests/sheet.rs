use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use overlay_core::{
    DismissibleSheet, PointerTarget, ScrollLock, SheetConfig, SheetOutcome, SheetPhase,
};

fn open_sheet(lock: &ScrollLock) -> DismissibleSheet {
    let mut sheet = DismissibleSheet::default();
    sheet.open(lock);
    sheet.settle();
    assert_eq!(sheet.phase(), SheetPhase::Open);
    sheet
}

/// Drag from y=400 down by `distance` over `duration`, in ten even steps.
fn drag(sheet: &mut DismissibleSheet, t0: Instant, distance: f32, duration: Duration) -> Instant {
    assert_eq!(
        sheet.pointer_down(PointerTarget::Handle, 400.0, t0),
        SheetOutcome::Handled
    );
    let mut at = t0;
    for step in 1..=10 {
        at = t0 + duration * step / 10;
        let _ = sheet.pointer_move(400.0 + distance * step as f32 / 10.0, at);
    }
    at
}

// ============================================================================
// Phases
// ============================================================================

#[test]
fn test_open_settle_close_settle() {
    let lock = ScrollLock::new();
    let mut sheet = DismissibleSheet::default();
    assert!(!sheet.is_rendered());

    sheet.open(&lock);
    assert_eq!(sheet.phase(), SheetPhase::Opening);
    assert!(sheet.is_rendered());

    sheet.settle();
    assert_eq!(sheet.phase(), SheetPhase::Open);

    assert_eq!(sheet.close(), SheetOutcome::Dismissed);
    assert_eq!(sheet.phase(), SheetPhase::Closing);
    assert!(sheet.is_rendered());
    assert!(!sheet.is_open());

    sheet.settle();
    assert_eq!(sheet.phase(), SheetPhase::Closed);
    assert!(!sheet.is_rendered());
}

#[test]
fn test_close_when_closed_is_ignored() {
    let mut sheet = DismissibleSheet::default();
    assert_eq!(sheet.close(), SheetOutcome::Ignored);
    assert_eq!(sheet.phase(), SheetPhase::Closed);
}

#[test]
fn test_handle_ignored_while_opening() {
    let lock = ScrollLock::new();
    let mut sheet = DismissibleSheet::default();
    sheet.open(&lock);

    let outcome = sheet.pointer_down(PointerTarget::Handle, 400.0, Instant::now());
    assert_eq!(outcome, SheetOutcome::Ignored);
    assert_eq!(sheet.phase(), SheetPhase::Opening);
}

#[test]
fn test_content_press_does_not_drag() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);

    let outcome = sheet.pointer_down(PointerTarget::Content, 400.0, Instant::now());
    assert_eq!(outcome, SheetOutcome::Ignored);
    assert_eq!(sheet.phase(), SheetPhase::Open);
}

// ============================================================================
// Drag to dismiss
// ============================================================================

#[test]
fn test_long_drag_dismisses() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let t0 = Instant::now();

    // 150px over a full second: 150px/s, well under the velocity threshold
    let end = drag(&mut sheet, t0, 150.0, Duration::from_secs(1));
    assert_eq!(sheet.offset(), 150.0);

    assert_eq!(sheet.pointer_up(end), SheetOutcome::Dismissed);
    assert_eq!(sheet.phase(), SheetPhase::Closing);
}

#[test]
fn test_short_slow_drag_snaps_back() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let t0 = Instant::now();

    let end = drag(&mut sheet, t0, 50.0, Duration::from_secs(1));
    assert_eq!(sheet.offset(), 50.0);

    assert_eq!(sheet.pointer_up(end), SheetOutcome::Handled);
    assert_eq!(sheet.phase(), SheetPhase::Open);
    assert_eq!(sheet.offset(), 0.0);
    assert!(lock.is_locked());
}

#[test]
fn test_short_fast_flick_dismisses() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let t0 = Instant::now();

    // 60px in 50ms: 1200px/s
    let end = drag(&mut sheet, t0, 60.0, Duration::from_millis(50));
    assert!(sheet.drag().is_some_and(|d| d.velocity_y > 500.0));

    assert_eq!(sheet.pointer_up(end), SheetOutcome::Dismissed);
}

#[test]
fn test_flick_then_hold_snaps_back() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let t0 = Instant::now();

    let end = drag(&mut sheet, t0, 60.0, Duration::from_millis(50));
    // Finger held still for half a second before lifting
    let outcome = sheet.pointer_up(end + Duration::from_millis(500));
    assert_eq!(outcome, SheetOutcome::Handled);
    assert_eq!(sheet.phase(), SheetPhase::Open);
}

#[test]
fn test_cannot_drag_above_rest() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let t0 = Instant::now();

    let _ = sheet.pointer_down(PointerTarget::Handle, 400.0, t0);
    let _ = sheet.pointer_move(300.0, t0 + Duration::from_millis(100));
    assert_eq!(sheet.offset(), 0.0);
}

#[test]
fn test_cancel_snaps_back() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let t0 = Instant::now();

    drag(&mut sheet, t0, 300.0, Duration::from_secs(1));
    sheet.cancel_drag();
    assert_eq!(sheet.phase(), SheetPhase::Open);
    assert_eq!(sheet.offset(), 0.0);
}

#[test]
fn test_custom_thresholds() {
    let lock = ScrollLock::new();
    let mut sheet = DismissibleSheet::new(SheetConfig {
        dismiss_distance: 4.0,
        dismiss_velocity: 20.0,
        max_height_ratio: 0.5,
    });
    sheet.open(&lock);
    sheet.settle();

    let t0 = Instant::now();
    let end = drag(&mut sheet, t0, 5.0, Duration::from_secs(1));
    assert_eq!(sheet.pointer_up(end), SheetOutcome::Dismissed);
}

#[test]
fn test_moves_without_drag_are_ignored() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);
    let now = Instant::now();

    assert_eq!(sheet.pointer_move(500.0, now), SheetOutcome::Ignored);
    assert_eq!(sheet.pointer_up(now), SheetOutcome::Ignored);
    assert_eq!(sheet.phase(), SheetPhase::Open);
}

// ============================================================================
// Backdrop and height
// ============================================================================

#[test]
fn test_backdrop_closes() {
    let lock = ScrollLock::new();
    let mut sheet = open_sheet(&lock);

    let outcome = sheet.pointer_down(PointerTarget::Backdrop, 10.0, Instant::now());
    assert_eq!(outcome, SheetOutcome::Dismissed);
    assert!(!lock.is_locked());
}

#[test]
fn test_height_is_capped() {
    let sheet = DismissibleSheet::default();
    // 85% of 800 = 680
    assert_eq!(sheet.height(800.0, 1000.0, None), 680.0);
    assert_eq!(sheet.height(800.0, 300.0, None), 300.0);
    assert_eq!(sheet.height(800.0, 1000.0, Some(400.0)), 400.0);
}

// ============================================================================
// Scroll lock
// ============================================================================

#[test]
fn test_sheet_holds_lock_while_open() {
    let lock = ScrollLock::new();
    let mut sheet = DismissibleSheet::default();

    sheet.open(&lock);
    assert!(lock.is_locked());
    sheet.open(&lock);
    assert_eq!(lock.holders(), 1);

    let _ = sheet.close();
    assert!(!lock.is_locked());
}

#[test]
fn test_lock_released_when_dropped_mid_open() {
    let lock = ScrollLock::new();
    {
        let _sheet = open_sheet(&lock);
        assert!(lock.is_locked());
    }
    assert!(!lock.is_locked());
    assert_eq!(lock.holders(), 0);
}

#[test]
fn test_lock_released_when_dropped_mid_drag() {
    let lock = ScrollLock::new();
    {
        let mut sheet = open_sheet(&lock);
        drag(&mut sheet, Instant::now(), 30.0, Duration::from_millis(300));
    }
    assert!(!lock.is_locked());
}

#[test]
fn test_two_sheets_share_lock() {
    let lock = ScrollLock::new();
    let mut first = open_sheet(&lock);
    let mut second = open_sheet(&lock);
    assert_eq!(lock.holders(), 2);

    let _ = first.close();
    assert!(lock.is_locked(), "second sheet still open");

    let _ = second.close();
    assert!(!lock.is_locked());
}

#[test]
fn test_lock_hook_fires_on_edges_only() {
    let lock = ScrollLock::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    lock.on_change(move |locked| sink.lock().unwrap().push(locked));

    let a = lock.acquire();
    let b = lock.acquire();
    drop(a);
    drop(b);
    let c = lock.acquire();
    drop(c);

    assert_eq!(*seen.lock().unwrap(), vec![true, false, true, false]);
}
