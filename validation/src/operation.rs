// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Single-slot tracking of an in-flight cancellable operation.
//!
//! Properties, custom validators and composites all follow the same
//! supersession rule: at most one managed run at a time, and a newer request
//! cancels the current one and waits for it to unwind before starting. The
//! slot centralises that rule. Completion is signalled by dropping the
//! [`OperationGuard`], so waiters wake no matter how the run ended.

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

struct InFlight {
    cancel: CancellationToken,
    done: watch::Receiver<()>,
}

impl InFlight {
    fn finished(&self) -> bool {
        // The watch sender lives in the guard; a closed channel means the
        // run has fully unwound.
        self.done.has_changed().is_err()
    }
}

#[derive(Default)]
pub(crate) struct OperationSlot {
    current: Mutex<Option<InFlight>>,
}

impl OperationSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cancels and awaits any in-flight operation, then installs a new one.
    /// Holding the slot lock while waiting serialises competing `begin`s in
    /// arrival order.
    pub(crate) async fn begin(&self) -> OperationGuard {
        let mut current = self.current.lock().await;
        if let Some(prev) = current.take() {
            prev.cancel.cancel();
            let mut done = prev.done;
            while done.changed().await.is_ok() {}
        }
        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = watch::channel(());
        *current = Some(InFlight {
            cancel: cancel.clone(),
            done: done_rx,
        });
        OperationGuard {
            cancel,
            _done: done_tx,
        }
    }

    /// True while an operation is running.
    pub(crate) async fn in_flight(&self) -> bool {
        match &*self.current.lock().await {
            Some(op) => !op.finished(),
            None => false,
        }
    }

    /// Waits until no operation is running. Operations started while waiting
    /// are waited out as well.
    pub(crate) async fn wait_idle(&self) {
        loop {
            let mut done = {
                match &*self.current.lock().await {
                    Some(op) if !op.finished() => op.done.clone(),
                    _ => return,
                }
            };
            while done.changed().await.is_ok() {}
        }
    }
}

/// Live half of an operation. Dropping it marks the operation finished and
/// wakes every waiter.
pub(crate) struct OperationGuard {
    cancel: CancellationToken,
    _done: watch::Sender<()>,
}

impl OperationGuard {
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn begin_cancels_and_awaits_predecessor() {
        let slot = Arc::new(OperationSlot::new());
        let first = slot.begin().await;
        assert!(slot.in_flight().await);

        let token = first.token().clone();
        let holder = tokio::spawn(async move {
            token.cancelled().await;
            // Simulate unwinding work after cancellation.
            tokio::time::sleep(Duration::from_millis(30)).await;
            drop(first);
        });

        let second = slot.begin().await;
        // By the time begin returns the predecessor has fully unwound.
        assert!(holder.is_finished());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn wait_idle_returns_once_guard_drops() {
        let slot = Arc::new(OperationSlot::new());
        slot.wait_idle().await; // empty slot is idle

        let guard = slot.begin().await;
        let waiter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.wait_idle().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("wait_idle should settle")
            .unwrap();
        assert!(!slot.in_flight().await);
    }
}
