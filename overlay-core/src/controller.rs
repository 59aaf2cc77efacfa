//! Per-overlay open/closed state.
//!
//! An [`OverlayController`] registers itself with an [`OverlayRegistry`] on
//! creation and subscribes to close requests for its own id. Opening any
//! peer in the same registry flips this controller closed synchronously.
//! Dropping the controller unsubscribes and unregisters it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::registry::{OverlayId, OverlayRegistry, SubscriptionId};

/// Owns one overlay's open flag and keeps the registry in sync with it.
///
/// # Example
///
/// ```
/// use overlay_core::{OverlayController, OverlayRegistry};
///
/// let registry = OverlayRegistry::new();
/// let service = OverlayController::named(&registry, "service");
/// let specialty = OverlayController::named(&registry, "specialty");
///
/// service.open();
/// specialty.open();
/// assert!(!service.is_open());
/// assert!(specialty.is_open());
/// ```
#[derive(Debug)]
pub struct OverlayController {
    id: OverlayId,
    is_open: Arc<AtomicBool>,
    registry: OverlayRegistry,
    /// Current registry subscription.
    subscription: Mutex<Option<SubscriptionId>>,
}

impl OverlayController {
    /// Create a controller with a generated id.
    pub fn new(registry: &OverlayRegistry) -> Self {
        Self::with_id(registry, OverlayId::new())
    }

    /// Create a controller whose id carries a readable label.
    pub fn named(registry: &OverlayRegistry, label: &str) -> Self {
        Self::with_id(registry, OverlayId::named(label))
    }

    /// Create a controller for a caller-chosen id.
    pub fn with_id(registry: &OverlayRegistry, id: OverlayId) -> Self {
        let controller = Self {
            id,
            is_open: Arc::new(AtomicBool::new(false)),
            registry: registry.clone(),
            subscription: Mutex::new(None),
        };
        controller.attach();
        controller
    }

    /// Create a controller bound to the process-wide registry.
    pub fn detached() -> Self {
        Self::new(&OverlayRegistry::global())
    }

    pub fn id(&self) -> &OverlayId {
        &self.id
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    /// Open this overlay, closing every peer in the registry.
    pub fn open(&self) {
        if !self.registry.contains(&self.id) {
            log::debug!("[controller] id={} missing from registry, re-attaching", self.id);
            self.attach();
        }
        self.is_open.store(true, Ordering::SeqCst);
        self.registry.set_open(&self.id, true);
    }

    /// Close this overlay. Does nothing if it is already closed.
    pub fn close(&self) {
        if !self.is_open.swap(false, Ordering::SeqCst) {
            return;
        }
        log::debug!("[controller] close id={}", self.id);
        self.registry.set_open(&self.id, false);
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// A cloneable handle that closes this overlay, for use as an
    /// `on_close` callback.
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            id: self.id.clone(),
            is_open: Arc::clone(&self.is_open),
            registry: self.registry.clone(),
        }
    }

    /// Tear the controller down explicitly. Equivalent to dropping it.
    pub fn destroy(self) {
        drop(self);
    }

    fn attach(&self) {
        self.registry.register(&self.id);

        let mut subscription = self.subscription();
        if let Some(previous) = subscription.take() {
            self.registry.unsubscribe(&self.id, previous);
        }

        let own_id = self.id.clone();
        let flag = Arc::clone(&self.is_open);
        let sub = self.registry.subscribe(&self.id, move |target| {
            if *target == own_id {
                flag.store(false, Ordering::SeqCst);
                log::debug!("[controller] closed by peer open, id={}", own_id);
            }
        });
        *subscription = Some(sub);
    }

    fn subscription(&self) -> MutexGuard<'_, Option<SubscriptionId>> {
        self.subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        self.is_open.store(false, Ordering::SeqCst);
        if let Some(sub) = self.subscription().take() {
            self.registry.unsubscribe(&self.id, sub);
        }
        self.registry.unregister(&self.id);
        log::debug!("[controller] destroyed id={}", self.id);
    }
}

/// Closes one overlay from anywhere, without borrowing its controller.
///
/// Once the controller is dropped the handle becomes inert.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    id: OverlayId,
    is_open: Arc<AtomicBool>,
    registry: OverlayRegistry,
}

impl CloseHandle {
    pub fn id(&self) -> &OverlayId {
        &self.id
    }

    pub fn close(&self) {
        if !self.is_open.swap(false, Ordering::SeqCst) {
            return;
        }
        self.registry.set_open(&self.id, false);
    }
}
