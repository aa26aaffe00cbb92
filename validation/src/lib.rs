// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Asynchronous validation for interactive forms.
//!
//! The crate is built around two pieces. [`Property`] is an observable
//! value whose every assignment runs a cancellable pipeline: an optional
//! debounce delay, change hooks, validation, then commit, with a newer
//! assignment superseding the one in flight. Validators
//! ([`RulesValidator`], [`CustomValidator`], [`CompositeValidator`]) judge
//! values and keep their verdict and issue list observable through a shared
//! [`ValidatorHandle`].
//!
//! On top of those, [`ValidationStateWatcher`] aggregates "does anything
//! have issues" across a form and [`InputSwitch`] flips groups of inputs
//! inert while a submission runs.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use formgate::rules;
//! use formgate::{Property, RuleExt, RulesValidator, Validatable};
//!
//! # async fn demo() {
//! let email = Property::builder(String::new())
//!     .delay(Duration::from_millis(500))
//!     .validator(Arc::new(
//!         RulesValidator::builder()
//!             .rule(rules::not_empty().with_message("Enter an address"))
//!             .rule(rules::email().with_message("Not an e-mail address"))
//!             .build(),
//!     ))
//!     .build();
//!
//! email.set_value_async("user@example.com".into()).await;
//! assert!(!email.validation_handle().unwrap().has_issues());
//! # }
//! ```

pub mod composite;
pub mod custom;
pub mod error;
pub mod issue;
mod operation;
pub mod property;
pub mod rule;
pub mod rules;
pub mod rules_validator;
pub mod state;
pub mod switch;
pub mod validator;
pub mod watcher;

pub use composite::CompositeValidator;
pub use custom::CustomValidator;
pub use error::{HookStage, ValidationError};
pub use issue::{Issue, IssueSink};
pub use property::{ChangeInfo, Property, PropertyBuilder};
pub use rule::{AsyncRule, AsyncRuleExt, Rule, RuleExt};
pub use rules_validator::{RulesValidator, RulesValidatorBuilder};
pub use state::ValidatorState;
pub use switch::{InputSwitch, Switchable};
pub use validator::{Validatable, Validator, ValidatorHandle, ValueValidator};
pub use watcher::ValidationStateWatcher;
