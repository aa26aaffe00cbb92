// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Shared validator state and the traits built on top of it.
//!
//! Every validator in this crate owns a [`ValidatorHandle`]: a cheap-clone
//! handle over the current [`ValidatorState`], the ordered issue list and a
//! subscriber list for state transitions. Validators mutate their handle
//! while running; watchers and UI bindings observe it from the outside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::ValidationError;
use crate::issue::Issue;
use crate::state::ValidatorState;

/// Callback invoked on every state transition of a handle.
pub type StateObserver = Box<dyn Fn(ValidatorState) + Send + Sync>;

#[derive(Default)]
struct HandleInner {
    state: RwLock<ValidatorState>,
    issues: RwLock<Vec<Issue>>,
    has_issues: AtomicBool,
    observers: RwLock<Vec<StateObserver>>,
}

/// Shared, observable validation state.
///
/// Clones refer to the same underlying record. Issue appends and state
/// changes are safe from concurrent tasks; racing async rules may push into
/// the same handle while their siblings complete.
#[derive(Clone, Default)]
pub struct ValidatorHandle {
    inner: Arc<HandleInner>,
}

impl ValidatorHandle {
    /// New handle in the [`ValidatorState::NotSet`] state with no issues.
    pub fn new() -> Self {
        Self::default()
    }

    /// New handle seeded with the given state.
    pub fn with_state(state: ValidatorState) -> Self {
        let handle = Self::new();
        *handle.inner.state.write() = state;
        handle
    }

    pub fn state(&self) -> ValidatorState {
        *self.inner.state.read()
    }

    /// Sets the state and notifies observers when it actually changed.
    pub fn set_state(&self, state: ValidatorState) {
        {
            let mut current = self.inner.state.write();
            if *current == state {
                return;
            }
            *current = state;
        }
        for observer in self.inner.observers.read().iter() {
            observer(state);
        }
    }

    pub fn has_issues(&self) -> bool {
        self.inner.has_issues.load(Ordering::Acquire)
    }

    pub fn set_has_issues(&self, value: bool) {
        self.inner.has_issues.store(value, Ordering::Release);
    }

    /// Snapshot of the issue list in insertion order.
    pub fn issues(&self) -> Vec<Issue> {
        self.inner.issues.read().clone()
    }

    pub fn first_issue(&self) -> Option<Issue> {
        self.inner.issues.read().first().cloned()
    }

    pub fn issue_count(&self) -> usize {
        self.inner.issues.read().len()
    }

    /// Appends an issue without touching state or `has_issues`; validators
    /// decide both once their run settles.
    pub fn push_issue(&self, issue: Issue) {
        self.inner.issues.write().push(issue);
    }

    pub fn clear_issues(&self) {
        self.inner.issues.write().clear();
    }

    /// Clears issues and moves any settled state back to `Valid`. A handle
    /// that never validated stays `NotSet`.
    pub fn reset(&self) {
        self.clear_issues();
        self.set_has_issues(false);
        if self.state() != ValidatorState::NotSet {
            self.set_state(ValidatorState::Valid);
        }
    }

    /// Subscribes a state observer for the lifetime of the handle.
    pub fn observe(&self, observer: impl Fn(ValidatorState) + Send + Sync + 'static) {
        self.inner.observers.write().push(Box::new(observer));
    }

    /// True when both handles refer to the same record.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ValidatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorHandle")
            .field("state", &self.state())
            .field("has_issues", &self.has_issues())
            .field("issues", &self.issue_count())
            .finish()
    }
}

/// Anything exposing validation state through a [`ValidatorHandle`].
pub trait Validator: Send + Sync {
    fn handle(&self) -> &ValidatorHandle;

    fn state(&self) -> ValidatorState {
        self.handle().state()
    }

    fn has_issues(&self) -> bool {
        self.handle().has_issues()
    }

    fn issues(&self) -> Vec<Issue> {
        self.handle().issues()
    }

    fn first_issue(&self) -> Option<Issue> {
        self.handle().first_issue()
    }

    /// Clears issues and returns a settled state to `Valid`.
    fn reset(&self) {
        self.handle().reset()
    }
}

/// A validator that judges values of a concrete type.
///
/// Issues land on the handle; the `Err` path is reserved for faults, a rule
/// failing to produce a verdict at all.
#[async_trait]
pub trait ValueValidator<T>: Validator
where
    T: Send + Sync,
{
    async fn validate(&self, value: &T, token: &CancellationToken) -> Result<(), ValidationError>;
}

/// An object that can be asked to re-validate itself.
///
/// Properties and composite validators implement this; it is the unit the
/// fan-out and watcher layers operate on.
#[async_trait]
pub trait Validatable: Send + Sync {
    /// Handle of the attached validator, if any.
    fn validation_handle(&self) -> Option<ValidatorHandle>;

    /// Re-validates with instance-managed supersession: a concurrently
    /// running validation of the same instance is cancelled and awaited
    /// before this one starts.
    async fn validate(&self) -> Result<(), ValidationError>;

    /// Re-validates under a caller-provided token, bypassing the instance's
    /// own supersession. Used by composite fan-out.
    async fn validate_with(&self, token: &CancellationToken) -> Result<(), ValidationError>;
}

#[async_trait]
impl<V> Validatable for Arc<V>
where
    V: Validatable + ?Sized,
{
    fn validation_handle(&self) -> Option<ValidatorHandle> {
        (**self).validation_handle()
    }

    async fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate().await
    }

    async fn validate_with(&self, token: &CancellationToken) -> Result<(), ValidationError> {
        (**self).validate_with(token).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn fresh_handle_is_not_set() {
        let handle = ValidatorHandle::new();
        assert_eq!(handle.state(), ValidatorState::NotSet);
        assert!(!handle.has_issues());
        assert!(handle.issues().is_empty());
        assert_eq!(handle.first_issue(), None);
    }

    #[test]
    fn reset_keeps_not_set_but_settles_invalid() {
        let handle = ValidatorHandle::new();
        handle.reset();
        assert_eq!(handle.state(), ValidatorState::NotSet);

        handle.push_issue("bad".into());
        handle.set_has_issues(true);
        handle.set_state(ValidatorState::Invalid);
        handle.reset();

        assert_eq!(handle.state(), ValidatorState::Valid);
        assert!(!handle.has_issues());
        assert!(handle.issues().is_empty());
    }

    #[test]
    fn observers_fire_on_transitions_only() {
        let handle = ValidatorHandle::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        handle.observe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.set_state(ValidatorState::Invalid);
        handle.set_state(ValidatorState::Invalid);
        handle.set_state(ValidatorState::Valid);

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clones_share_the_record() {
        let a = ValidatorHandle::new();
        let b = a.clone();
        b.push_issue(Issue::Flag);
        assert_eq!(a.issue_count(), 1);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&ValidatorHandle::new()));
    }
}
