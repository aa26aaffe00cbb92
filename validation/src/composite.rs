// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fan-out validation over a group of validatable items.

use async_trait::async_trait;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ValidationError;
use crate::operation::OperationSlot;
use crate::state::ValidatorState;
use crate::validator::{Validatable, Validator, ValidatorHandle};

/// Validates every item concurrently and aggregates the outcome.
///
/// Items re-validate under one shared child token; the composite's own
/// issue list is rebuilt from the children in construction order once all
/// of them settle, so aggregate ordering is stable even though children
/// finish in any order. Composites are themselves [`Validatable`] and nest.
pub struct CompositeValidator {
    handle: ValidatorHandle,
    slot: OperationSlot,
    items: Vec<Box<dyn Validatable>>,
}

impl CompositeValidator {
    /// An empty group is legal and always settles `Valid`.
    pub fn new(items: Vec<Box<dyn Validatable>>) -> Self {
        Self {
            handle: ValidatorHandle::new(),
            slot: OperationSlot::new(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    async fn run(&self, token: &CancellationToken) -> Result<(), ValidationError> {
        self.handle.reset();

        let outcomes = join_all(self.items.iter().map(|item| item.validate_with(token))).await;
        if token.is_cancelled() {
            debug!(event = "composite_cancelled", items = self.items.len());
            return Err(ValidationError::Cancelled);
        }
        for outcome in outcomes {
            outcome?;
        }

        let mut any = false;
        for item in &self.items {
            if let Some(child) = item.validation_handle() {
                for issue in child.issues() {
                    self.handle.push_issue(issue);
                }
                any |= child.has_issues();
            }
        }
        self.handle.set_has_issues(any);
        let state = if any {
            ValidatorState::Invalid
        } else {
            ValidatorState::Valid
        };
        debug!(event = "composite_validated", %state, issues = self.handle.issue_count());
        self.handle.set_state(state);
        Ok(())
    }
}

impl Validator for CompositeValidator {
    fn handle(&self) -> &ValidatorHandle {
        &self.handle
    }
}

#[async_trait]
impl Validatable for CompositeValidator {
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
