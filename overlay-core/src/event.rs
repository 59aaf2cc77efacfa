use std::time::Instant;

use crate::geometry::Point;

/// Simplified key representation.
///
/// Overlays only react to a handful of keys; everything else maps to
/// `Key::Other` and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Up,
    Down,
    Other,
}

/// Which part of a bottom sheet a pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    /// The drag handle strip at the top of the sheet.
    Handle,
    /// Sheet content below the handle. Does not start a drag.
    Content,
    /// The dimmed area behind the sheet.
    Backdrop,
}

/// A pointer (mouse or touch) sample delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        target: PointerTarget,
        position: Point,
        at: Instant,
    },
    Move {
        position: Point,
        at: Instant,
    },
    Up {
        position: Point,
        at: Instant,
    },
    /// The gesture was taken away from us (touch cancel, focus loss).
    Cancel,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::Cancel => None,
        }
    }
}

// Conversion from crossterm types
impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            _ => Key::Other,
        }
    }
}
