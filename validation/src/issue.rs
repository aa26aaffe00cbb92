// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;
use std::fmt;

use crate::validator::ValidatorHandle;

/// A single validation finding.
///
/// A bare rule that has no message of its own reports [`Issue::Flag`]; rule
/// decorators replace flags with [`Issue::Message`] without changing the
/// pass/fail outcome. UI layers usually only ever render messages, but a
/// flag still counts towards `has_issues`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Issue {
    /// A silent marker: validation failed but no message was attached.
    Flag,
    /// A human-readable validation message.
    Message(Cow<'static, str>),
}

impl Issue {
    /// Returns the message text, or an empty string for a bare flag.
    pub fn message(&self) -> &str {
        match self {
            Self::Flag => "",
            Self::Message(m) => m,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&'static str> for Issue {
    fn from(message: &'static str) -> Self {
        Self::Message(Cow::Borrowed(message))
    }
}

impl From<String> for Issue {
    fn from(message: String) -> Self {
        Self::Message(Cow::Owned(message))
    }
}

impl From<Cow<'static, str>> for Issue {
    fn from(message: Cow<'static, str>) -> Self {
        Self::Message(message)
    }
}

/// Write-only view of a validator's issue list, handed to custom validation
/// functions so they can report findings while the run is still in flight.
///
/// Appending through the sink is safe from concurrently completing checks;
/// insertion order is preserved.
#[derive(Clone)]
pub struct IssueSink {
    handle: ValidatorHandle,
}

impl IssueSink {
    pub(crate) fn new(handle: ValidatorHandle) -> Self {
        Self { handle }
    }

    /// Appends an issue to the owning validator. The validator's
    /// `has_issues` flag flips immediately, before the run settles.
    pub fn push(&self, issue: impl Into<Issue>) {
        self.handle.push_issue(issue.into());
        self.handle.set_has_issues(true);
    }

    /// Number of issues reported so far in this run.
    pub fn len(&self) -> usize {
        self.handle.issues().len()
    }

    /// True when no issues have been reported so far.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for IssueSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueSink")
            .field("issues", &self.handle.issues())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_text() {
        assert_eq!(Issue::Flag.message(), "");
        assert_eq!(Issue::from("too short").message(), "too short");
        assert_eq!(Issue::from(String::from("bad")).to_string(), "bad");
    }

    #[test]
    fn flag_is_not_a_message() {
        assert_ne!(Issue::Flag, Issue::from(""));
    }
}
