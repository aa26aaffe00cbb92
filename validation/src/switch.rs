// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mass enable/disable of input surfaces.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Anything that can be enabled and disabled as an input target.
pub trait Switchable: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool);
}

/// Flips a whole group of [`Switchable`] items at once.
///
/// The typical use is wrapping a form submission in
/// [`off_while`](Self::off_while) so every field goes inert for the
/// duration. Switches are themselves [`Switchable`], so groups nest.
pub struct InputSwitch {
    items: Vec<Box<dyn Switchable>>,
    enabled: AtomicBool,
}

impl InputSwitch {
    pub fn new(items: Vec<Box<dyn Switchable>>) -> Self {
        Self {
            items,
            enabled: AtomicBool::new(true),
        }
    }

    /// Disables the group, awaits the future, re-enables the group. The
    /// re-enable runs from a drop guard, so it survives errors, panics and
    /// the future being dropped mid-flight.
    pub async fn off_while<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        self.set_enabled(false);
        let _on_again = ReEnable { switch: self };
        fut.await
    }
}

impl Switchable for InputSwitch {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Propagates unconditionally, even when the group state is unchanged.
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        debug!(event = "input_switch", enabled, items = self.items.len());
        for item in &self.items {
            item.set_enabled(enabled);
        }
    }
}

impl<S> Switchable for std::sync::Arc<S>
where
    S: Switchable + ?Sized,
{
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        (**self).set_enabled(enabled)
    }
}

struct ReEnable<'a> {
    switch: &'a InputSwitch,
}

impl Drop for ReEnable<'_> {
    fn drop(&mut self) {
        self.switch.set_enabled(true);
    }
}
