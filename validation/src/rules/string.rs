// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! String rules. All of them accept any `AsRef<str>` value and pass on
//! empty input; pair with [`not_empty`] when presence is required.

use std::sync::OnceLock;

use regex::Regex;

use crate::issue::Issue;
use crate::rule::Rule;

macro_rules! str_rule {
    ($name:ident, $this:ident, $value:ident, $body:expr) => {
        impl<T> Rule<T> for $name
        where
            T: AsRef<str>,
        {
            fn check(&$this, value: &T) -> Option<Issue> {
                let $value = value.as_ref();
                if $body {
                    None
                } else {
                    Some(Issue::Flag)
                }
            }
        }
    };
}

pub struct NotEmpty;
str_rule!(NotEmpty, self, v, !v.is_empty());

/// Fails on the empty string.
pub fn not_empty() -> NotEmpty {
    NotEmpty
}

pub struct NotBlank;
str_rule!(NotBlank, self, v, !v.trim().is_empty());

/// Fails when the string is empty or whitespace only.
pub fn not_blank() -> NotBlank {
    NotBlank
}

pub struct MinLength {
    min: usize,
}
str_rule!(MinLength, self, v, v.is_empty() || v.chars().count() >= self.min);

/// At least `min` characters. Length is counted in chars, not bytes.
pub fn min_length(min: usize) -> MinLength {
    MinLength { min }
}

pub struct MaxLength {
    max: usize,
}
str_rule!(MaxLength, self, v, v.chars().count() <= self.max);

/// At most `max` characters.
pub fn max_length(max: usize) -> MaxLength {
    MaxLength { max }
}

pub struct LengthBetween {
    min: usize,
    max: usize,
}
str_rule!(LengthBetween, self, v, {
    let len = v.chars().count();
    v.is_empty() || (self.min..=self.max).contains(&len)
});

/// Character count within `min..=max`.
pub fn length_between(min: usize, max: usize) -> LengthBetween {
    LengthBetween { min, max }
}

pub struct DigitsOnly;
str_rule!(DigitsOnly, self, v, v.chars().all(|c| c.is_ascii_digit()));

/// Only ASCII digits allowed.
pub fn digits_only() -> DigitsOnly {
    DigitsOnly
}

pub struct DigitCountBetween {
    min: usize,
    max: usize,
}
str_rule!(DigitCountBetween, self, v, {
    let digits = v.chars().filter(|c| c.is_ascii_digit()).count();
    v.is_empty() || (self.min..=self.max).contains(&digits)
});

/// Number of digit characters within `min..=max`, ignoring everything else.
/// Suits phone numbers written with separators.
pub fn digit_count_between(min: usize, max: usize) -> DigitCountBetween {
    DigitCountBetween { min, max }
}

pub struct AllowedChars {
    allowed: String,
}
str_rule!(AllowedChars, self, v, v.chars().all(|c| self.allowed.contains(c)));

/// Every character must come from `allowed`.
pub fn allowed_chars(allowed: impl Into<String>) -> AllowedChars {
    AllowedChars {
        allowed: allowed.into(),
    }
}

pub struct Matches {
    re: Regex,
}
str_rule!(Matches, self, v, v.is_empty() || self.re.is_match(v));

/// Non-empty input must match the pattern.
pub fn matches(re: Regex) -> Matches {
    Matches { re }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

pub struct Email;
str_rule!(Email, self, v, {
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("hard-coded pattern")
    });
    v.is_empty() || re.is_match(v)
});

/// Loose e-mail shape check: something before and after a single `@`, with
/// a dot in the domain part.
pub fn email() -> Email {
    Email
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails<R: Rule<&'static str>>(rule: &R, value: &'static str) -> bool {
        rule.check(&value).is_some()
    }

    #[test]
    fn presence() {
        assert!(fails(&not_empty(), ""));
        assert!(!fails(&not_empty(), " "));
        assert!(fails(&not_blank(), "  \t"));
        assert!(!fails(&not_blank(), " x "));
    }

    #[test]
    fn lengths_ignore_empty() {
        assert!(!fails(&min_length(3), ""));
        assert!(fails(&min_length(3), "ab"));
        assert!(!fails(&min_length(3), "abc"));
        assert!(fails(&max_length(2), "abc"));
        assert!(fails(&length_between(2, 4), "a"));
        assert!(!fails(&length_between(2, 4), "abcd"));
        assert!(!fails(&length_between(2, 4), ""));
    }

    #[test]
    fn lengths_count_chars_not_bytes() {
        assert!(!fails(&max_length(2), "éé"));
        assert!(!fails(&min_length(2), "éé"));
    }

    #[test]
    fn digits() {
        assert!(!fails(&digits_only(), "0123"));
        assert!(fails(&digits_only(), "12a"));
        assert!(!fails(&digits_only(), ""));
        assert!(!fails(&digit_count_between(10, 11), "+1 (555) 010-2334"));
        assert!(fails(&digit_count_between(10, 11), "555-0102"));
    }

    #[test]
    fn character_sets() {
        assert!(!fails(&allowed_chars("0123456789-"), "555-0102"));
        assert!(fails(&allowed_chars("0123456789"), "555-0102"));
    }

    #[test]
    fn email_shape() {
        assert!(!fails(&email(), "a@b.co"));
        assert!(!fails(&email(), ""));
        assert!(fails(&email(), "a@b"));
        assert!(fails(&email(), "not an address"));
        assert!(fails(&email(), "a@@b.co"));
    }

    #[test]
    fn regex_rule() {
        let zip = matches(Regex::new(r"^\d{5}$").unwrap());
        assert!(!fails(&zip, "12345"));
        assert!(fails(&zip, "1234"));
        assert!(!fails(&zip, ""));
    }
}
