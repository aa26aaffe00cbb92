// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Passive aggregation of validation state across many validators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::state::ValidatorState;
use crate::switch::Switchable;
use crate::validator::{Validatable, ValidatorHandle};

type WatchObserver = Box<dyn Fn(bool) + Send + Sync>;

struct WatcherInner {
    handles: Vec<ValidatorHandle>,
    /// Aggregate over the children, ignoring the enabled flag.
    raw: Mutex<bool>,
    enabled: AtomicBool,
    observers: RwLock<Vec<WatchObserver>>,
}

/// Watches a set of validators and answers "does anything have issues".
///
/// At construction only children already `Invalid` raise the flag; a
/// `NotSet` child neither raises nor clears it. Afterwards any transition
/// to `Invalid` raises it, and it clears only once every watched child
/// reports `Valid`. The watcher never triggers validation; it follows
/// state set by others.
///
/// Disabling the watcher (through [`Switchable`]) forces
/// [`has_issues`](Self::has_issues) to `true` until re-enabled, which keeps
/// a submit surface held down while a submission is in flight. Re-enabling
/// recomputes from the children.
///
/// The watcher subscribes to its children for their whole lifetime; a
/// dropped watcher leaves inert subscriptions behind.
pub struct ValidationStateWatcher {
    inner: Arc<WatcherInner>,
}

impl ValidationStateWatcher {
    /// Items without an attached validator are skipped.
    pub fn new(items: &[&dyn Validatable]) -> Self {
        let handles: Vec<_> = items
            .iter()
            .filter_map(|item| item.validation_handle())
            .collect();
        let raw = handles
            .iter()
            .any(|h| h.state() == ValidatorState::Invalid);

        let inner = Arc::new(WatcherInner {
            handles,
            raw: Mutex::new(raw),
            enabled: AtomicBool::new(true),
            observers: RwLock::new(Vec::new()),
        });
        for handle in &inner.handles {
            let weak = Arc::downgrade(&inner);
            handle.observe(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.refresh();
                }
            });
        }
        Self { inner }
    }

    pub fn has_issues(&self) -> bool {
        self.inner.effective()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_issues()
    }

    /// Subscribes to changes of [`has_issues`](Self::has_issues).
    pub fn subscribe(&self, observer: impl Fn(bool) + Send + Sync + 'static) {
        self.inner.observers.write().push(Box::new(observer));
    }
}

impl Switchable for ValidationStateWatcher {
    fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    fn set_enabled(&self, enabled: bool) {
        let inner = &self.inner;
        let raw = inner.raw.lock();
        let before = *raw || !inner.enabled.load(Ordering::Acquire);
        inner.enabled.store(enabled, Ordering::Release);
        let after = *raw || !enabled;
        drop(raw);
        debug!(event = "watcher_switched", enabled, has_issues = after);
        if before != after {
            inner.notify(after);
        }
    }
}

impl WatcherInner {
    fn effective(&self) -> bool {
        *self.raw.lock() || !self.enabled.load(Ordering::Acquire)
    }

    /// Recomputes the aggregate after a child transition. The raw lock
    /// serialises concurrent child notifications.
    fn refresh(&self) {
        let mut any_invalid = false;
        let mut all_valid = true;
        for handle in &self.handles {
            match handle.state() {
                ValidatorState::Invalid => {
                    any_invalid = true;
                    all_valid = false;
                }
                ValidatorState::NotSet => all_valid = false,
                ValidatorState::Valid => {}
            }
        }

        // Read the flag under the same lock as `set_enabled` so the
        // before/after pair never straddles a concurrent toggle.
        let mut raw = self.raw.lock();
        let enabled = self.enabled.load(Ordering::Acquire);
        let before = *raw || !enabled;
        if any_invalid {
            *raw = true;
        } else if all_valid {
            *raw = false;
        }
        let after = *raw || !enabled;
        drop(raw);
        if before != after {
            debug!(event = "watcher_changed", has_issues = after);
            self.notify(after);
        }
    }

    fn notify(&self, has_issues: bool) {
        for observer in self.observers.read().iter() {
            observer(has_issues);
        }
    }
}
