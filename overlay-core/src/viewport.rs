//! Host environment: viewport geometry, scroll/resize listeners and the
//! measurement seam.
//!
//! The core never reads the environment on its own. Hosts implement
//! [`Measure`] to answer geometry questions and push scroll/resize changes
//! through a shared [`ViewportListeners`] table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::geometry::{Rect, Size};

/// Visible area of the page and how far it is scrolled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn with_scroll(mut self, scroll_x: f32, scroll_y: f32) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

/// A change to the viewport the host observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Scroll { scroll_x: f32, scroll_y: f32 },
    Resize { width: f32, height: f32 },
}

/// Geometry queries answered by the host.
///
/// Every method may return `None` when the answer is not available yet
/// (before first paint, or before panel content has mounted). Callers treat
/// `None` as "render the trigger only and try again next tick".
pub trait Measure {
    /// Current viewport size and scroll offsets.
    fn viewport(&self) -> Option<Viewport>;

    /// Trigger bounding box, relative to the viewport.
    fn trigger_rect(&self) -> Option<Rect>;

    /// Size of the rendered panel content.
    fn panel_size(&self) -> Option<Size>;
}

type ListenerFn = Arc<dyn Fn(&ViewportEvent) + Send + Sync>;

/// Unique identifier for an attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Shared table of scroll/resize listeners.
///
/// Cheap to clone; clones share the same table. The host owns one instance
/// per page and calls [`dispatch`](Self::dispatch) from its event loop.
#[derive(Clone, Default)]
pub struct ViewportListeners {
    inner: Arc<Mutex<HashMap<ListenerId, ListenerFn>>>,
}

impl ViewportListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener. It stays attached until the returned guard drops.
    #[must_use = "dropping the guard detaches the listener immediately"]
    pub fn listen<F>(&self, callback: F) -> ListenerGuard
    where
        F: Fn(&ViewportEvent) + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.lock().insert(id, Arc::new(callback));
        log::trace!("[viewport] attach listener={:?}", id);
        ListenerGuard {
            id,
            listeners: self.clone(),
        }
    }

    /// Deliver an event to every attached listener, synchronously.
    pub fn dispatch(&self, event: &ViewportEvent) {
        // Snapshot first so listeners may attach/detach while being called.
        let callbacks: Vec<ListenerFn> = self.lock().values().cloned().collect();
        log::trace!("[viewport] dispatch {:?} to {} listener(s)", event, callbacks.len());
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn detach(&self, id: ListenerId) {
        if self.lock().remove(&id).is_some() {
            log::trace!("[viewport] detach listener={:?}", id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ListenerId, ListenerFn>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ViewportListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportListeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Keeps a viewport listener attached. Dropping it detaches the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    id: ListenerId,
    listeners: ViewportListeners,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.listeners.detach(self.id);
    }
}
