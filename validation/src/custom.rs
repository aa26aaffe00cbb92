// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Free-form validator driven by a user function.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ValidationError;
use crate::issue::IssueSink;
use crate::operation::OperationSlot;
use crate::state::ValidatorState;
use crate::validator::{Validatable, Validator, ValidatorHandle};

type ValidationFn =
    Box<dyn Fn(IssueSink, CancellationToken) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Validator whose whole verdict comes from one async function.
///
/// The function reports findings through the [`IssueSink`] it receives;
/// cross-field checks capture whatever state they compare against. Calling
/// [`validate`](Validatable::validate) supersedes a run already in flight
/// on the same instance; [`validate_with`](Validatable::validate_with)
/// leaves run management to the caller.
pub struct CustomValidator {
    handle: ValidatorHandle,
    slot: OperationSlot,
    function: ValidationFn,
}

impl CustomValidator {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(IssueSink, CancellationToken) -> BoxFuture<'static, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handle: ValidatorHandle::new(),
            slot: OperationSlot::new(),
            function: Box::new(function),
        }
    }

    async fn run(&self, token: &CancellationToken) -> Result<(), ValidationError> {
        self.handle.reset();
        let sink = IssueSink::new(self.handle.clone());
        let outcome = (self.function)(sink, token.clone()).await;

        if token.is_cancelled() {
            // Whatever the function reported before being cancelled is
            // incomplete; drop it and leave the verdict unsettled.
            self.handle.clear_issues();
            self.handle.set_has_issues(false);
            debug!(event = "custom_validation_cancelled");
            return Err(ValidationError::Cancelled);
        }
        outcome.map_err(ValidationError::Custom)?;

        let state = if self.handle.has_issues() {
            ValidatorState::Invalid
        } else {
            ValidatorState::Valid
        };
        debug!(event = "custom_validated", %state, issues = self.handle.issue_count());
        self.handle.set_state(state);
        Ok(())
    }
}

impl Validator for CustomValidator {
    fn handle(&self) -> &ValidatorHandle {
        &self.handle
    }
}

#[async_trait]
impl Validatable for CustomValidator {
    fn validation_handle(&self) -> Option<ValidatorHandle> {
        Some(self.handle.clone())
    }

    async fn validate(&self) -> Result<(), ValidationError> {
        let guard = self.slot.begin().await;
        self.run(guard.token()).await
    }

    async fn validate_with(&self, token: &CancellationToken) -> Result<(), ValidationError> {
        self.run(token).await
    }
}
