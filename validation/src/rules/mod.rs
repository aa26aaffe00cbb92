// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ready-made rules for common field checks.
//!
//! Constructors here return concrete [`Rule`]/[`AsyncRule`] types that raise
//! [`Issue::Flag`]; decorate with
//! [`RuleExt::with_message`](crate::rule::RuleExt::with_message) to attach
//! text. String rules treat an empty value as passing, so presence and
//! format can be validated (and messaged) independently.

mod compare;
mod string;

pub use compare::{at_least, at_most, between, greater_than, in_range, less_than, one_of};
pub use string::{
    allowed_chars, digit_count_between, digits_only, email, length_between, matches, max_length,
    min_length, not_blank, not_empty,
};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::issue::Issue;
use crate::rule::{AsyncRule, Rule};

/// Fails on `None`.
pub struct Required;

impl<T> Rule<Option<T>> for Required
where
    T: Send + Sync,
{
    fn check(&self, value: &Option<T>) -> Option<Issue> {
        value.is_none().then_some(Issue::Flag)
    }
}

/// The not-null check for optional fields.
pub fn required() -> Required {
    Required
}

/// Wraps a plain function as a rule.
pub struct Custom<F> {
    f: F,
}

impl<T, F> Rule<T> for Custom<F>
where
    F: Fn(&T) -> Option<Issue> + Send + Sync,
{
    fn check(&self, value: &T) -> Option<Issue> {
        (self.f)(value)
    }
}

pub fn custom<T, F>(f: F) -> Custom<F>
where
    F: Fn(&T) -> Option<Issue> + Send + Sync,
{
    Custom { f }
}

/// Wraps an async function as a cancellable rule. The function receives its
/// own copy of the value, so the future it returns owns everything it needs.
pub struct CustomAsync<F> {
    f: F,
}

#[async_trait::async_trait]
impl<T, F> AsyncRule<T> for CustomAsync<F>
where
    T: Clone + Send + Sync,
    F: Fn(T, CancellationToken) -> BoxFuture<'static, Result<Option<Issue>, anyhow::Error>>
        + Send
        + Sync,
{
    async fn check(
        &self,
        value: &T,
        token: &CancellationToken,
    ) -> Result<Option<Issue>, anyhow::Error> {
        (self.f)(value.clone(), token.clone()).await
    }
}

pub fn custom_async<T, F>(f: F) -> CustomAsync<F>
where
    T: Clone + Send + Sync,
    F: Fn(T, CancellationToken) -> BoxFuture<'static, Result<Option<Issue>, anyhow::Error>>
        + Send
        + Sync,
{
    CustomAsync { f }
}
