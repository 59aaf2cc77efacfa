//! Shared open/closed table for a coordinated set of overlays.
//!
//! The registry enforces mutual exclusion: opening one overlay closes every
//! other open overlay in the same registry. Closing is signalled through
//! per-id subscriber callbacks, invoked synchronously before
//! [`OverlayRegistry::set_open`] returns, so no caller can observe two open
//! overlays between the open and the broadcast.
//!
//! # Example
//!
//! ```
//! use overlay_core::{OverlayId, OverlayRegistry};
//!
//! let registry = OverlayRegistry::new();
//! let service = OverlayId::named("service");
//! let specialty = OverlayId::named("specialty");
//! registry.register(&service);
//! registry.register(&specialty);
//!
//! registry.set_open(&service, true);
//! registry.set_open(&specialty, true);
//! assert!(!registry.is_open(&service));
//! assert!(registry.is_open(&specialty));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use uuid::Uuid;

/// Unique, stable identifier for one logical overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(Arc<str>);

impl OverlayId {
    /// Generate a fresh anonymous id.
    pub fn new() -> Self {
        Self(format!("__overlay_{}", Uuid::new_v4().simple()).into())
    }

    /// Generate a fresh id carrying a readable label (e.g. "service").
    ///
    /// Two ids created with the same label are still distinct.
    pub fn named(label: &str) -> Self {
        Self(format!("__overlay_{}_{}", label, Uuid::new_v4().simple()).into())
    }

    /// Use a caller-supplied id verbatim.
    ///
    /// The caller is responsible for uniqueness within a registry.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle for one subscriber callback, returned by [`OverlayRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Callback invoked when the registry forces an overlay closed.
pub type CloseCallback = Arc<dyn Fn(&OverlayId) + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    /// Open/closed flag per registered overlay.
    flags: HashMap<OverlayId, bool>,
    /// Close-requested subscribers per overlay.
    subscribers: HashMap<OverlayId, Vec<(SubscriptionId, CloseCallback)>>,
}

/// Open/closed table shared by every controller in a coordinated set.
///
/// Cheap to clone; clones share state. Build one per page/session with
/// [`OverlayRegistry::new`], or use [`OverlayRegistry::global`].
#[derive(Clone, Default)]
pub struct OverlayRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

static GLOBAL: OnceLock<OverlayRegistry> = OnceLock::new();

impl OverlayRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> Self {
        GLOBAL
            .get_or_init(|| {
                log::debug!("[registry] creating global registry");
                OverlayRegistry::new()
            })
            .clone()
    }

    /// Add `id` as closed. Does nothing if it is already registered.
    pub fn register(&self, id: &OverlayId) {
        let mut inner = self.lock();
        if !inner.flags.contains_key(id) {
            inner.flags.insert(id.clone(), false);
            log::debug!("[registry] register id={} total={}", id, inner.flags.len());
        }
    }

    /// Remove `id` and every subscriber attached to it.
    pub fn unregister(&self, id: &OverlayId) {
        let mut inner = self.lock();
        let had_flag = inner.flags.remove(id).is_some();
        let subs = inner.subscribers.remove(id).map_or(0, |subs| subs.len());
        if had_flag || subs > 0 {
            log::debug!(
                "[registry] unregister id={} dropped_subscribers={} total={}",
                id,
                subs,
                inner.flags.len()
            );
        }
    }

    /// Set the open flag for `id`.
    ///
    /// Opening closes every other open overlay and notifies each of them
    /// before returning. An unknown id is registered on open (and ignored on
    /// close), so callers never have to order registration against use.
    pub fn set_open(&self, id: &OverlayId, open: bool) {
        let pending = {
            let mut inner = self.lock();

            if !open {
                match inner.flags.get_mut(id) {
                    Some(flag) => *flag = false,
                    None => log::debug!("[registry] close for unknown id={} ignored", id),
                }
                return;
            }

            if !inner.flags.contains_key(id) {
                log::debug!("[registry] open for unknown id={}, registering", id);
            }
            inner.flags.insert(id.clone(), true);

            // Flip peers inside the same lock scope as the write above.
            let mut closed = Vec::new();
            for (peer, flag) in inner.flags.iter_mut() {
                if peer != id && *flag {
                    *flag = false;
                    closed.push(peer.clone());
                }
            }

            log::debug!("[registry] open id={} closed_peers={}", id, closed.len());

            closed
                .into_iter()
                .map(|peer| {
                    let callbacks: Vec<CloseCallback> = inner
                        .subscribers
                        .get(&peer)
                        .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                        .unwrap_or_default();
                    (peer, callbacks)
                })
                .collect::<Vec<_>>()
        };

        // The lock is released here; callbacks may call back into the registry.
        for (peer, callbacks) in pending {
            for callback in callbacks {
                callback(&peer);
            }
        }
    }

    /// Close every open overlay, notifying each one.
    pub fn close_all(&self) {
        let pending = {
            let mut inner = self.lock();
            let mut closed = Vec::new();
            for (id, flag) in inner.flags.iter_mut() {
                if *flag {
                    *flag = false;
                    closed.push(id.clone());
                }
            }
            closed
                .into_iter()
                .map(|id| {
                    let callbacks: Vec<CloseCallback> = inner
                        .subscribers
                        .get(&id)
                        .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                        .unwrap_or_default();
                    (id, callbacks)
                })
                .collect::<Vec<_>>()
        };

        log::debug!("[registry] close_all closed={}", pending.len());
        for (id, callbacks) in pending {
            for callback in callbacks {
                callback(&id);
            }
        }
    }

    /// Drop every entry and subscriber without notifying anyone.
    ///
    /// For page/session teardown. Controllers that outlive a clear
    /// re-register themselves on their next open.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.flags.clear();
        inner.subscribers.clear();
        log::debug!("[registry] cleared");
    }

    /// Attach a close-requested callback for `id`.
    pub fn subscribe<F>(&self, id: &OverlayId, callback: F) -> SubscriptionId
    where
        F: Fn(&OverlayId) + Send + Sync + 'static,
    {
        let sub = SubscriptionId::new();
        self.lock()
            .subscribers
            .entry(id.clone())
            .or_default()
            .push((sub, Arc::new(callback)));
        log::trace!("[registry] subscribe id={} sub={:?}", id, sub);
        sub
    }

    /// Detach a callback previously returned by [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, id: &OverlayId, sub: SubscriptionId) {
        let mut inner = self.lock();
        if let Some(subs) = inner.subscribers.get_mut(id) {
            subs.retain(|(existing, _)| *existing != sub);
            if subs.is_empty() {
                inner.subscribers.remove(id);
            }
        }
    }

    /// Whether `id` is currently open. Unknown ids are closed.
    pub fn is_open(&self, id: &OverlayId) -> bool {
        self.lock().flags.get(id).copied().unwrap_or(false)
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.lock().flags.contains_key(id)
    }

    /// Number of registered overlays.
    pub fn len(&self) -> usize {
        self.lock().flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids whose flag is currently open. Holds at most one element.
    pub fn open_ids(&self) -> Vec<OverlayId> {
        self.lock()
            .flags
            .iter()
            .filter(|(_, open)| **open)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of callbacks attached to `id`.
    pub fn subscriber_count(&self, id: &OverlayId) -> usize {
        self.lock().subscribers.get(id).map_or(0, |subs| subs.len())
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for OverlayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("OverlayRegistry")
            .field("flags", &inner.flags)
            .field("subscribed", &inner.subscribers.len())
            .finish()
    }
}
