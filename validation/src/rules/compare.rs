// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ordering and membership rules for comparable values.

use crate::issue::Issue;
use crate::rule::Rule;

macro_rules! cmp_rule {
    ($name:ident, $this:ident, $value:ident, $body:expr) => {
        impl<T> Rule<T> for $name<T>
        where
            T: PartialOrd + Send + Sync,
        {
            fn check(&$this, $value: &T) -> Option<Issue> {
                if $body {
                    None
                } else {
                    Some(Issue::Flag)
                }
            }
        }
    };
}

pub struct AtLeast<T> {
    min: T,
}
cmp_rule!(AtLeast, self, v, *v >= self.min);

pub fn at_least<T: PartialOrd + Send + Sync>(min: T) -> AtLeast<T> {
    AtLeast { min }
}

pub struct AtMost<T> {
    max: T,
}
cmp_rule!(AtMost, self, v, *v <= self.max);

pub fn at_most<T: PartialOrd + Send + Sync>(max: T) -> AtMost<T> {
    AtMost { max }
}

pub struct GreaterThan<T> {
    bound: T,
}
cmp_rule!(GreaterThan, self, v, *v > self.bound);

pub fn greater_than<T: PartialOrd + Send + Sync>(bound: T) -> GreaterThan<T> {
    GreaterThan { bound }
}

pub struct LessThan<T> {
    bound: T,
}
cmp_rule!(LessThan, self, v, *v < self.bound);

pub fn less_than<T: PartialOrd + Send + Sync>(bound: T) -> LessThan<T> {
    LessThan { bound }
}

pub struct InRange<T> {
    min: T,
    max: T,
}
cmp_rule!(InRange, self, v, *v >= self.min && *v <= self.max);

/// Inclusive on both ends.
pub fn in_range<T: PartialOrd + Send + Sync>(min: T, max: T) -> InRange<T> {
    InRange { min, max }
}

pub struct Between<T> {
    min: T,
    max: T,
}
cmp_rule!(Between, self, v, *v > self.min && *v < self.max);

/// Exclusive on both ends.
pub fn between<T: PartialOrd + Send + Sync>(min: T, max: T) -> Between<T> {
    Between { min, max }
}

pub struct OneOf<T> {
    values: Vec<T>,
}

impl<T> Rule<T> for OneOf<T>
where
    T: PartialEq + Send + Sync,
{
    fn check(&self, value: &T) -> Option<Issue> {
        if self.values.contains(value) {
            None
        } else {
            Some(Issue::Flag)
        }
    }
}

pub fn one_of<T: PartialEq + Send + Sync>(values: impl Into<Vec<T>>) -> OneOf<T> {
    OneOf {
        values: values.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert!(at_least(18).check(&17).is_some());
        assert!(at_least(18).check(&18).is_none());
        assert!(at_most(10).check(&11).is_some());
        assert!(greater_than(0.0).check(&0.0).is_some());
        assert!(greater_than(0.0).check(&0.5).is_none());
        assert!(less_than(100).check(&99).is_none());
    }

    #[test]
    fn ranges() {
        assert!(in_range(1, 5).check(&1).is_none());
        assert!(in_range(1, 5).check(&5).is_none());
        assert!(in_range(1, 5).check(&6).is_some());
        assert!(between(1, 5).check(&1).is_some());
        assert!(between(1, 5).check(&3).is_none());
    }

    #[test]
    fn membership() {
        let rule = one_of(["EUR", "USD"].map(String::from));
        assert!(rule.check(&"EUR".to_string()).is_none());
        assert!(rule.check(&"GBP".to_string()).is_some());
    }
}
