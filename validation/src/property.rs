// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! View-model property with a cancellable asynchronous set pipeline.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{HookStage, ValidationError};
use crate::operation::OperationSlot;
use crate::state::ValidatorState;
use crate::switch::Switchable;
use crate::validator::{Validatable, Validator, ValidatorHandle, ValueValidator};

/// Snapshot handed to change hooks.
#[derive(Clone)]
pub struct ChangeInfo<T> {
    /// The property being assigned; hooks use it to reach siblings or
    /// trigger follow-up validation.
    pub property: Property<T>,
    /// Value before the assignment.
    pub old: T,
    /// Value being assigned.
    pub new: T,
    /// Token of this pipeline run.
    pub token: CancellationToken,
}

type SyncHook<T> = Arc<dyn Fn(&ChangeInfo<T>) -> anyhow::Result<()> + Send + Sync>;
type AsyncHook<T> =
    Arc<dyn Fn(ChangeInfo<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
type ErrorHook<T> = Arc<dyn Fn(&ChangeInfo<T>, &ValidationError) + Send + Sync>;
type AsyncErrorHook<T> =
    Arc<dyn Fn(ChangeInfo<T>, Arc<ValidationError>) -> BoxFuture<'static, ()> + Send + Sync>;

struct Hooks<T> {
    delay_starting: Option<SyncHook<T>>,
    delay_starting_async: Option<AsyncHook<T>>,
    changing: Option<SyncHook<T>>,
    changing_async: Option<AsyncHook<T>>,
    changed: Option<SyncHook<T>>,
    changed_async: Option<AsyncHook<T>>,
    on_error: Option<ErrorHook<T>>,
    on_error_async: Option<AsyncErrorHook<T>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            delay_starting: None,
            delay_starting_async: None,
            changing: None,
            changing_async: None,
            changed: None,
            changed_async: None,
            on_error: None,
            on_error_async: None,
        }
    }
}

struct PropertyInner<T> {
    value: RwLock<T>,
    /// Last value a set was requested for, committed or not.
    last_set: RwLock<Option<T>>,
    /// True until the first successful commit.
    dirty: AtomicBool,
    read_only: AtomicBool,
    enabled: AtomicBool,
    delay: RwLock<Duration>,
    keep_equal_values: bool,
    metadata: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
    validator: RwLock<Option<Arc<dyn ValueValidator<T>>>>,
    /// Validator state seeded while the property is still untouched.
    initial_state: ValidatorState,
    hooks: Hooks<T>,
    slot: OperationSlot,
    subscribers: RwLock<Vec<Box<dyn Fn(&T) + Send + Sync>>>,
}

/// An observable value with delay, hooks and validation wired into every
/// assignment.
///
/// The handle is cheap to clone; clones share the same underlying property.
/// At most one set pipeline runs at a time: a newer assignment cancels the
/// one in flight and waits for it to unwind before starting (so hooks of
/// two runs never interleave).
///
/// A set pipeline runs delay, change hooks and validation, then commits.
/// Cancellation aborts silently and restores the previous value. A faulting
/// hook or validator also restores the previous value and reports through
/// the error hooks. An *invalid* verdict is not a fault: the value commits
/// and the validator keeps the issues for the UI to show.
pub struct Property<T> {
    inner: Arc<PropertyInner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Property<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Property holding `value`, untouched, with no validator.
    pub fn new(value: T) -> Self {
        Self::builder(value).build()
    }

    pub fn builder(value: T) -> PropertyBuilder<T> {
        PropertyBuilder {
            value,
            initial_state: ValidatorState::Valid,
            validator: None,
            delay: Duration::ZERO,
            read_only: false,
            keep_equal_values: false,
            metadata: None,
            hooks: Hooks::default(),
        }
    }

    /// Current committed value. While a set is in flight this is still the
    /// previous value; use [`get_value_async`](Self::get_value_async) to
    /// wait the pipeline out.
    pub fn value(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Waits for any in-flight set to finish, then returns the value.
    pub async fn get_value_async(&self) -> T {
        self.inner.slot.wait_idle().await;
        self.value()
    }

    /// Fire-and-forget assignment; the pipeline runs on a spawned task.
    pub fn set_value(&self, value: T) {
        let this = self.clone();
        tokio::spawn(async move {
            this.set_value_async(value).await;
        });
    }

    /// Runs the set pipeline to completion. Returns `true` when the value
    /// was committed; cancellation and faults both come back `false`, never
    /// as an error.
    pub async fn set_value_async(&self, value: T) -> bool {
        if self.inner.read_only.load(Ordering::Acquire)
            || !self.inner.enabled.load(Ordering::Acquire)
        {
            return false;
        }
        if !self.inner.keep_equal_values && !self.is_dirty() {
            let repeat = self
                .inner
                .last_set
                .read()
                .as_ref()
                .is_some_and(|last| *last == value);
            if repeat {
                debug!(event = "set_short_circuit");
                return false;
            }
        }

        let guard = self.inner.slot.begin().await;
        *self.inner.last_set.write() = Some(value.clone());

        let info = ChangeInfo {
            property: self.clone(),
            old: self.value(),
            new: value,
            token: guard.token().clone(),
        };
        let committed = match self.apply(&info).await {
            Ok(()) => {
                debug!(event = "set_committed");
                true
            }
            Err(err) => {
                *self.inner.value.write() = info.old.clone();
                // A hook that forwarded a cancellation from a nested
                // validator is still a cancellation, not a fault.
                if err.is_cancelled() || info.token.is_cancelled() {
                    debug!(event = "set_cancelled");
                } else {
                    debug!(event = "set_failed", %err);
                    let err = Arc::new(err);
                    if let Some(hook) = &self.inner.hooks.on_error {
                        hook(&info, &err);
                    }
                    if let Some(hook) = &self.inner.hooks.on_error_async {
                        hook(info.clone(), Arc::clone(&err)).await;
                    }
                }
                false
            }
        };

        if committed {
            self.inner.dirty.store(false, Ordering::Release);
            let current = self.value();
            for subscriber in self.inner.subscribers.read().iter() {
                subscriber(&current);
            }
        }
        committed
    }

    async fn apply(&self, info: &ChangeInfo<T>) -> Result<(), ValidationError> {
        let token = &info.token;
        let hooks = &self.inner.hooks;

        let delay = *self.inner.delay.read();
        if delay > Duration::ZERO {
            // Stale issues come down while the user is still typing.
            if let Some(validator) = self.validator() {
                if validator.state() == ValidatorState::Invalid {
                    validator.reset();
                }
            }

            let mut remaining = delay;
            if hooks.delay_starting.is_some() || hooks.delay_starting_async.is_some() {
                let started = Instant::now();
                if let Some(hook) = &hooks.delay_starting {
                    hook(info).map_err(|source| ValidationError::Hook {
                        stage: HookStage::DelayStarting,
                        source,
                    })?;
                }
                if let Some(hook) = &hooks.delay_starting_async {
                    hook(info.clone())
                        .await
                        .map_err(|source| ValidationError::Hook {
                            stage: HookStage::DelayStarting,
                            source,
                        })?;
                }
                // Hook time counts against the delay.
                remaining = delay.saturating_sub(started.elapsed());
            }
            if remaining > Duration::ZERO {
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {}
                    _ = token.cancelled() => return Err(ValidationError::Cancelled),
                }
            }
            if token.is_cancelled() {
                return Err(ValidationError::Cancelled);
            }
        }

        if let Some(hook) = &hooks.changing {
            hook(info).map_err(|source| ValidationError::Hook {
                stage: HookStage::ValueChanging,
                source,
            })?;
        }
        if let Some(hook) = &hooks.changing_async {
            hook(info.clone())
                .await
                .map_err(|source| ValidationError::Hook {
                    stage: HookStage::ValueChanging,
                    source,
                })?;
        }
        if token.is_cancelled() {
            return Err(ValidationError::Cancelled);
        }

        if let Some(validator) = self.validator() {
            validator.validate(&info.new, token).await?;
        }
        if token.is_cancelled() {
            return Err(ValidationError::Cancelled);
        }

        *self.inner.value.write() = info.new.clone();

        if let Some(hook) = &hooks.changed {
            hook(info).map_err(|source| ValidationError::Hook {
                stage: HookStage::ValueChanged,
                source,
            })?;
        }
        if let Some(hook) = &hooks.changed_async {
            hook(info.clone())
                .await
                .map_err(|source| ValidationError::Hook {
                    stage: HookStage::ValueChanged,
                    source,
                })?;
        }
        if token.is_cancelled() {
            return Err(ValidationError::Cancelled);
        }
        Ok(())
    }

    /// True until the first successful commit.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.read_only.load(Ordering::Acquire)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.inner.read_only.store(read_only, Ordering::Release);
    }

    pub fn delay(&self) -> Duration {
        *self.inner.delay.read()
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.write() = delay;
    }

    pub fn metadata(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.inner.metadata.read().clone()
    }

    pub fn set_metadata(&self, metadata: Arc<dyn Any + Send + Sync>) {
        *self.inner.metadata.write() = Some(metadata);
    }

    pub fn validator(&self) -> Option<Arc<dyn ValueValidator<T>>> {
        self.inner.validator.read().clone()
    }

    /// Attaches a validator. While the property is still untouched the
    /// validator is seeded with the configured initial state, which is how
    /// a form marks required fields invalid before anyone typed into them.
    pub fn set_validator(&self, validator: Arc<dyn ValueValidator<T>>) {
        if self.is_dirty() {
            validator.handle().set_state(self.inner.initial_state);
        }
        *self.inner.validator.write() = Some(validator);
    }

    /// Subscribes to committed values.
    pub fn subscribe(&self, subscriber: impl Fn(&T) + Send + Sync + 'static) {
        self.inner.subscribers.write().push(Box::new(subscriber));
    }
}

impl<T> Switchable for Property<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }
}

#[async_trait]
impl<T> Validatable for Property<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn validation_handle(&self) -> Option<ValidatorHandle> {
        self.validator().map(|v| v.handle().clone())
    }

    async fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&CancellationToken::new()).await
    }

    /// A no-op while a set is in flight; that run validates on its own.
    async fn validate_with(&self, token: &CancellationToken) -> Result<(), ValidationError> {
        let Some(validator) = self.validator() else {
            return Ok(());
        };
        if self.inner.slot.in_flight().await {
            return Ok(());
        }
        if token.is_cancelled() {
            return Err(ValidationError::Cancelled);
        }
        validator.validate(&self.value(), token).await
    }
}

pub struct PropertyBuilder<T> {
    value: T,
    initial_state: ValidatorState,
    validator: Option<Arc<dyn ValueValidator<T>>>,
    delay: Duration,
    read_only: bool,
    keep_equal_values: bool,
    metadata: Option<Arc<dyn Any + Send + Sync>>,
    hooks: Hooks<T>,
}

impl<T> PropertyBuilder<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Validator state to seed while the property is untouched. `Invalid`
    /// here makes a watcher hold a form invalid from the start without
    /// running any rules.
    pub fn initial_state(mut self, state: ValidatorState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn validator(mut self, validator: Arc<dyn ValueValidator<T>>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Defers every assignment, debouncing rapid input.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Re-runs the pipeline even when the assigned value equals the last
    /// requested one.
    pub fn keep_equal_values(mut self) -> Self {
        self.keep_equal_values = true;
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn Any + Send + Sync>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn on_delay_starting(
        mut self,
        hook: impl Fn(&ChangeInfo<T>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.delay_starting = Some(Arc::new(hook));
        self
    }

    pub fn on_delay_starting_async(
        mut self,
        hook: impl Fn(ChangeInfo<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.delay_starting_async = Some(Arc::new(hook));
        self
    }

    pub fn on_changing(
        mut self,
        hook: impl Fn(&ChangeInfo<T>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.changing = Some(Arc::new(hook));
        self
    }

    pub fn on_changing_async(
        mut self,
        hook: impl Fn(ChangeInfo<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.changing_async = Some(Arc::new(hook));
        self
    }

    pub fn on_changed(
        mut self,
        hook: impl Fn(&ChangeInfo<T>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.changed = Some(Arc::new(hook));
        self
    }

    pub fn on_changed_async(
        mut self,
        hook: impl Fn(ChangeInfo<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.changed_async = Some(Arc::new(hook));
        self
    }

    pub fn on_error(
        mut self,
        hook: impl Fn(&ChangeInfo<T>, &ValidationError) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_error_async(
        mut self,
        hook: impl Fn(ChangeInfo<T>, Arc<ValidationError>) -> BoxFuture<'static, ()>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.hooks.on_error_async = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Property<T> {
        if let Some(validator) = &self.validator {
            validator.handle().set_state(self.initial_state);
        }
        Property {
            inner: Arc::new(PropertyInner {
                value: RwLock::new(self.value),
                last_set: RwLock::new(None),
                dirty: AtomicBool::new(true),
                read_only: AtomicBool::new(self.read_only),
                enabled: AtomicBool::new(true),
                delay: RwLock::new(self.delay),
                keep_equal_values: self.keep_equal_values,
                metadata: RwLock::new(self.metadata),
                validator: RwLock::new(self.validator),
                initial_state: self.initial_state,
                hooks: self.hooks,
                slot: OperationSlot::new(),
                subscribers: RwLock::new(Vec::new()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use futures::FutureExt;

    use super::*;
    use crate::rule::RuleExt;
    use crate::rules;
    use crate::rules_validator::RulesValidator;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&c), c)
    }

    #[tokio::test]
    async fn first_set_runs_even_when_equal_to_default() {
        let (calls, seen) = counter();
        let property = Property::builder(String::from("x"))
            .on_changed(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        assert!(property.is_dirty());
        assert!(property.set_value_async("x".into()).await);
        assert!(!property.is_dirty());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_value_short_circuits_after_commit() {
        let (calls, seen) = counter();
        let property = Property::builder(String::new())
            .on_changed(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        assert!(property.set_value_async("a".into()).await);
        assert!(!property.set_value_async("a".into()).await);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(property.value(), "a");
    }

    #[tokio::test]
    async fn keep_equal_values_disables_the_short_circuit() {
        let (calls, seen) = counter();
        let property = Property::builder(String::new())
            .keep_equal_values()
            .on_changed(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        assert!(property.set_value_async("a".into()).await);
        assert!(property.set_value_async("a".into()).await);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn read_only_rejects_assignment() {
        let property = Property::builder(5u32).read_only(true).build();
        assert!(!property.set_value_async(7).await);
        assert_eq!(property.value(), 5);

        property.set_read_only(false);
        assert!(property.set_value_async(7).await);
        assert_eq!(property.value(), 7);
    }

    #[tokio::test]
    async fn disabled_property_rejects_assignment() {
        let property = Property::builder(String::from("kept")).build();
        property.set_enabled(false);

        assert!(!property.set_value_async("after".into()).await);
        assert_eq!(property.value(), "kept");
        assert!(property.is_dirty());

        property.set_enabled(true);
        assert!(property.set_value_async("after".into()).await);
        assert_eq!(property.value(), "after");
    }

    #[tokio::test]
    async fn newer_set_supersedes_a_delayed_one() {
        let (calls, seen) = counter();
        let property = Property::builder(String::new())
            .delay(Duration::from_millis(60))
            .on_changed(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        let racer = {
            let property = property.clone();
            tokio::spawn(async move { property.set_value_async("abandoned".into()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(property.set_value_async("kept".into()).await);
        assert!(!racer.await.unwrap());
        assert_eq!(property.value(), "kept");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_value_still_commits() {
        let validator = Arc::new(
            RulesValidator::builder()
                .rule(rules::not_empty().with_message("required"))
                .build(),
        );
        let property = Property::builder(String::from("seed"))
            .validator(validator.clone())
            .build();

        assert!(property.set_value_async(String::new()).await);
        assert_eq!(property.value(), "");
        assert_eq!(validator.state(), ValidatorState::Invalid);
        assert_eq!(validator.first_issue().unwrap().message(), "required");
    }

    #[tokio::test]
    async fn faulting_validator_rolls_back_and_reports_once() {
        let validator = Arc::new(
            RulesValidator::builder()
                .async_rule(rules::custom_async(|_: String, _ct| {
                    async { Err(anyhow::anyhow!("probe offline")) }.boxed()
                }))
                .build(),
        );
        let (errors, seen) = counter();
        let property = Property::builder(String::from("stable"))
            .validator(validator)
            .on_error(move |info, err| {
                assert_eq!(info.new, "doomed");
                assert!(!err.is_cancelled());
                errors.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        assert!(!property.set_value_async("doomed".into()).await);
        assert_eq!(property.value(), "stable");
        assert!(property.is_dirty());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn faulting_changed_hook_rolls_back() {
        let (errors, seen) = counter();
        let property = Property::builder(0u32)
            .on_changed(|info| {
                if info.new == 13 {
                    anyhow::bail!("unlucky");
                }
                Ok(())
            })
            .on_error(move |_, _| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        assert!(property.set_value_async(7).await);
        assert!(!property.set_value_async(13).await);
        assert_eq!(property.value(), 7);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_is_silent() {
        let (errors, seen) = counter();
        let property = Property::builder(String::from("old"))
            .delay(Duration::from_millis(80))
            .on_error(move |_, _| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        let abandoned = {
            let property = property.clone();
            tokio::spawn(async move { property.set_value_async("never".into()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(property.set_value_async("new".into()).await);

        assert!(!abandoned.await.unwrap());
        assert_eq!(property.value(), "new");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_during_the_changed_hook_reverts_the_commit() {
        let (errors, seen_errors) = counter();
        let property = Property::builder(String::from("old"))
            .on_changed(|info| {
                // By now the new value is committed; the veto must undo it.
                assert_eq!(info.property.value(), "new");
                info.token.cancel();
                Ok(())
            })
            .on_error(move |_, _| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
            .build();
        let committed = Arc::new(AtomicUsize::new(0));
        {
            let committed = Arc::clone(&committed);
            property.subscribe(move |_| {
                committed.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(!property.set_value_async("new".into()).await);
        assert_eq!(property.value(), "old");
        assert!(property.is_dirty());
        assert_eq!(committed.load(Ordering::SeqCst), 0);
        assert_eq!(seen_errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delay_hook_time_counts_against_the_delay() {
        let property = Property::builder(String::new())
            .delay(Duration::from_millis(50))
            .on_delay_starting_async(|_info| {
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(())
                }
                .boxed()
            })
            .build();

        let started = Instant::now();
        assert!(property.set_value_async("v".into()).await);
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(95), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn get_value_async_waits_for_the_pipeline() {
        let property = Property::builder(String::from("old"))
            .delay(Duration::from_millis(40))
            .build();

        property.set_value("new".into());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(property.value(), "old");
        assert_eq!(property.get_value_async().await, "new");
    }

    #[tokio::test]
    async fn validate_rechecks_the_current_value() {
        let validator = Arc::new(
            RulesValidator::builder()
                .rule(rules::min_length(3).with_message("short"))
                .build(),
        );
        let property = Property::builder(String::from("ab"))
            .validator(validator.clone())
            .build();

        property.validate().await.unwrap();
        assert_eq!(validator.state(), ValidatorState::Invalid);

        property.set_value_async("abcd".into()).await;
        assert_eq!(validator.state(), ValidatorState::Valid);
    }

    #[tokio::test]
    async fn attaching_a_validator_seeds_the_initial_state() {
        let validator = Arc::new(RulesValidator::<String>::builder().build());
        let property = Property::builder(String::new())
            .initial_state(ValidatorState::Invalid)
            .build();

        property.set_validator(validator.clone());
        assert_eq!(validator.state(), ValidatorState::Invalid);
        assert_eq!(
            property.validation_handle().unwrap().state(),
            ValidatorState::Invalid
        );

        property.set_value_async("typed".into()).await;
        assert_eq!(validator.state(), ValidatorState::Valid);
    }

    #[tokio::test]
    async fn subscribers_see_committed_values_only() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let property = Property::builder(0u32)
            .on_changed(|info| {
                if info.new == 2 {
                    anyhow::bail!("rejected");
                }
                Ok(())
            })
            .build();
        {
            let seen = Arc::clone(&seen);
            property.subscribe(move |v| seen.lock().push(*v));
        }

        property.set_value_async(1).await;
        property.set_value_async(2).await;
        property.set_value_async(3).await;
        assert_eq!(*seen.lock(), [1, 3]);
    }
}
