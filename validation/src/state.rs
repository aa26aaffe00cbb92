// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

/// Outcome of the most recent validation run of a validator.
///
/// `NotSet` means validation has not been performed yet; it is also the
/// state a form pre-seeds to show "untouched" fields as neither valid nor
/// invalid. Resetting a validator never moves it back to `NotSet`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidatorState {
    /// Validation has not yet been performed.
    #[default]
    NotSet,
    /// The most recent validation run found no issues.
    Valid,
    /// The most recent validation run found at least one issue.
    Invalid,
}

impl fmt::Display for ValidatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet => write!(f, "not-set"),
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}
