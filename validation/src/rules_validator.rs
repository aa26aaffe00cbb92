// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rule-list validator.

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ValidationError;
use crate::issue::Issue;
use crate::rule::{AsyncRule, Rule};
use crate::state::ValidatorState;
use crate::validator::{Validator, ValidatorHandle, ValueValidator};

/// Runs a fixed list of rules against a value.
///
/// Synchronous rules run first, in declaration order. Asynchronous rules are
/// then raced concurrently and their issues are recorded as each one
/// finishes, so the issue order across async rules follows completion order
/// and may differ between runs.
///
/// An empty validator is legal and reports `Valid` for every value.
pub struct RulesValidator<T> {
    handle: ValidatorHandle,
    rules: Vec<Box<dyn Rule<T>>>,
    async_rules: Vec<Box<dyn AsyncRule<T>>>,
}

impl<T> RulesValidator<T>
where
    T: Send + Sync,
{
    pub fn builder() -> RulesValidatorBuilder<T> {
        RulesValidatorBuilder {
            rules: Vec::new(),
            async_rules: Vec::new(),
        }
    }

    // Each finding is observable the moment it lands, so state watchers
    // react while slower rules are still running.
    fn record(&self, issue: Issue) {
        self.handle.push_issue(issue);
        self.handle.set_has_issues(true);
        self.handle.set_state(ValidatorState::Invalid);
    }
}

impl<T> Validator for RulesValidator<T>
where
    T: Send + Sync,
{
    fn handle(&self) -> &ValidatorHandle {
        &self.handle
    }
}

#[async_trait]
impl<T> ValueValidator<T> for RulesValidator<T>
where
    T: Send + Sync,
{
    async fn validate(&self, value: &T, token: &CancellationToken) -> Result<(), ValidationError> {
        self.handle.reset();

        for rule in &self.rules {
            if token.is_cancelled() {
                return Err(ValidationError::Cancelled);
            }
            if let Some(issue) = rule.check(value) {
                self.record(issue);
            }
        }

        if !self.async_rules.is_empty() {
            let mut pending: FuturesUnordered<_> = self
                .async_rules
                .iter()
                .map(|rule| rule.check(value, token))
                .collect();
            // Dropping the set on an early return drops the still-pending
            // checks with it.
            while let Some(verdict) = pending.next().await {
                if token.is_cancelled() {
                    return Err(ValidationError::Cancelled);
                }
                match verdict {
                    Ok(Some(issue)) => self.record(issue),
                    Ok(None) => {}
                    Err(fault) => {
                        debug!(event = "rule_fault", %fault);
                        return Err(ValidationError::Rule(fault));
                    }
                }
            }
        }

        if token.is_cancelled() {
            return Err(ValidationError::Cancelled);
        }
        let state = if self.handle.has_issues() {
            ValidatorState::Invalid
        } else {
            ValidatorState::Valid
        };
        debug!(event = "rules_validated", %state, issues = self.handle.issue_count());
        self.handle.set_state(state);
        Ok(())
    }
}

pub struct RulesValidatorBuilder<T> {
    rules: Vec<Box<dyn Rule<T>>>,
    async_rules: Vec<Box<dyn AsyncRule<T>>>,
}

impl<T> RulesValidatorBuilder<T>
where
    T: Send + Sync,
{
    pub fn rule(mut self, rule: impl Rule<T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn async_rule(mut self, rule: impl AsyncRule<T> + 'static) -> Self {
        self.async_rules.push(Box::new(rule));
        self
    }

    pub fn build(self) -> RulesValidator<T> {
        RulesValidator {
            handle: ValidatorHandle::new(),
            rules: self.rules,
            async_rules: self.async_rules,
        }
    }
}
