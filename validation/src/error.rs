// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types for the validation pipeline.
//!
//! Validation *issues* are not errors: a rule reporting a problem with the
//! value is the expected outcome and travels through [`crate::Issue`].
//! [`ValidationError`] covers the unexpected paths only: a rule or hook
//! faulting, or a run being cancelled. Property pipelines never surface
//! these to the UI-bound caller; they roll back and route faults to the
//! property's error hooks instead.

use std::fmt;

use thiserror::Error;

/// Pipeline stage a hook belongs to, used in fault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// Fired before the assignment delay starts counting down.
    DelayStarting,
    /// Fired before the new value is committed.
    ValueChanging,
    /// Fired after the new value was committed.
    ValueChanged,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DelayStarting => write!(f, "delay-starting"),
            Self::ValueChanging => write!(f, "value-changing"),
            Self::ValueChanged => write!(f, "value-changed"),
        }
    }
}

/// Faults raised inside a validation run or a property set pipeline.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The run was cancelled, typically because a newer request superseded
    /// it. Never reported through error hooks; the pipeline unwinds
    /// silently.
    #[error("validation cancelled")]
    Cancelled,

    /// An asynchronous rule failed to produce a verdict.
    #[error("validation rule failed")]
    Rule(#[source] anyhow::Error),

    /// A change hook failed.
    #[error("{stage} hook failed")]
    Hook {
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    /// A custom validation function failed.
    #[error("custom validation failed")]
    Custom(#[source] anyhow::Error),
}

impl ValidationError {
    /// True for the silent-abort variant.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
