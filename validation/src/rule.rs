// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rule traits and message decorators.

use std::borrow::Cow;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::issue::Issue;

/// A pure, synchronous check on a value.
///
/// `None` means the rule found nothing wrong. Rules tolerate values outside
/// their remit (an empty string is not a malformed e-mail address); use a
/// presence rule alongside when emptiness itself is the problem.
pub trait Rule<T>: Send + Sync {
    fn check(&self, value: &T) -> Option<Issue>;
}

impl<T, F> Rule<T> for F
where
    F: Fn(&T) -> Option<Issue> + Send + Sync,
{
    fn check(&self, value: &T) -> Option<Issue> {
        self(value)
    }
}

/// A cancellable asynchronous check. Unlike [`Rule`], it may fault, which
/// aborts the surrounding validation run instead of recording an issue.
#[async_trait]
pub trait AsyncRule<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn check(
        &self,
        value: &T,
        token: &CancellationToken,
    ) -> Result<Option<Issue>, anyhow::Error>;
}

/// Replaces whatever issue the inner rule raised with a fixed message.
pub struct WithMessage<R> {
    inner: R,
    message: Cow<'static, str>,
}

impl<T, R> Rule<T> for WithMessage<R>
where
    R: Rule<T>,
{
    fn check(&self, value: &T) -> Option<Issue> {
        self.inner
            .check(value)
            .map(|_| Issue::Message(self.message.clone()))
    }
}

#[async_trait]
impl<T, R> AsyncRule<T> for WithMessage<R>
where
    T: Send + Sync,
    R: AsyncRule<T>,
{
    async fn check(
        &self,
        value: &T,
        token: &CancellationToken,
    ) -> Result<Option<Issue>, anyhow::Error> {
        let raw = self.inner.check(value, token).await?;
        Ok(raw.map(|_| Issue::Message(self.message.clone())))
    }
}

/// Like [`WithMessage`] but resolves the message at issue time, so it can
/// close over a localisation or resource provider.
pub struct WithMessageFn<R, F> {
    inner: R,
    message: F,
}

impl<T, R, F> Rule<T> for WithMessageFn<R, F>
where
    R: Rule<T>,
    F: Fn() -> String + Send + Sync,
{
    fn check(&self, value: &T) -> Option<Issue> {
        self.inner
            .check(value)
            .map(|_| Issue::Message((self.message)().into()))
    }
}

#[async_trait]
impl<T, R, F> AsyncRule<T> for WithMessageFn<R, F>
where
    T: Send + Sync,
    R: AsyncRule<T>,
    F: Fn() -> String + Send + Sync,
{
    async fn check(
        &self,
        value: &T,
        token: &CancellationToken,
    ) -> Result<Option<Issue>, anyhow::Error> {
        let raw = self.inner.check(value, token).await?;
        Ok(raw.map(|_| Issue::Message((self.message)().into())))
    }
}

/// Message decoration for rules. The wrapper itself carries no `Rule` or
/// `AsyncRule` bound — a decorated value only becomes a rule where the
/// inner value is one — so decoration never has to pin the value type.
pub trait RuleExt: Sized {
    fn with_message(self, message: impl Into<Cow<'static, str>>) -> WithMessage<Self> {
        WithMessage {
            inner: self,
            message: message.into(),
        }
    }

    fn with_message_fn<F>(self, message: F) -> WithMessageFn<Self, F>
    where
        F: Fn() -> String + Send + Sync,
    {
        WithMessageFn {
            inner: self,
            message,
        }
    }
}

impl<R> RuleExt for R {}

/// Message decoration for asynchronous rules.
pub use RuleExt as AsyncRuleExt;
