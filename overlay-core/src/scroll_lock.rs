//! Page scroll lock shared by every bottom sheet.
//!
//! The lock is reference-counted: the page stays locked while at least one
//! [`ScrollLockGuard`] is alive. Guards release on drop, so a sheet torn
//! down while open cannot leave the page locked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type ChangeHook = Arc<dyn Fn(bool) + Send + Sync>;

struct LockInner {
    holders: AtomicUsize,
    on_change: Mutex<Option<ChangeHook>>,
}

/// Reference-counted page scroll lock.
///
/// Cheap to clone; clones share the same count.
#[derive(Clone)]
pub struct ScrollLock {
    inner: Arc<LockInner>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LockInner {
                holders: AtomicUsize::new(0),
                on_change: Mutex::new(None),
            }),
        }
    }

    /// Install a hook called with `true` when the page becomes locked and
    /// `false` when the last holder releases it. Intermediate acquisitions
    /// do not call the hook.
    pub fn on_change<F>(&self, hook: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let mut slot = self
            .inner
            .on_change
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::new(hook));
    }

    /// Take a hold on the lock.
    #[must_use = "dropping the guard releases the scroll lock immediately"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let previous = self.inner.holders.fetch_add(1, Ordering::SeqCst);
        log::debug!("[scroll_lock] acquire holders={}", previous + 1);
        if previous == 0 {
            self.notify(true);
        }
        ScrollLockGuard { lock: self.clone() }
    }

    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }

    /// Number of live guards.
    pub fn holders(&self) -> usize {
        self.inner.holders.load(Ordering::SeqCst)
    }

    fn release(&self) {
        let result = self
            .inner
            .holders
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match result {
            Ok(1) => {
                log::debug!("[scroll_lock] released, page unlocked");
                self.notify(false);
            }
            Ok(previous) => log::debug!("[scroll_lock] release holders={}", previous - 1),
            Err(_) => log::warn!("[scroll_lock] release without a holder"),
        }
    }

    fn notify(&self, locked: bool) {
        let hook = self
            .inner
            .on_change
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(hook) = hook {
            hook(locked);
        }
    }
}

impl Default for ScrollLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.holders())
            .finish()
    }
}

/// One hold on a [`ScrollLock`]. Released on drop.
#[derive(Debug)]
pub struct ScrollLockGuard {
    lock: ScrollLock,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
