//! Contact details of people behind the accounts.

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;

define_text! {
    /// Full name of a person.
    FullName(max_len = 512)
}

/// Phone number of a person.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format: an optional leading
        /// `+` followed by digits, optionally grouped with spaces, dashes or
        /// parentheses.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s\-()]{4,30}$").expect("valid regex")
        });

        let number = number.as_ref();
        REGEX.is_match(number) && number.trim_end() == number
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

#[cfg(test)]
mod spec {
    use super::{FullName, Phone};

    #[test]
    fn full_name_is_trimmed_and_non_empty() {
        assert!(FullName::new("A B").is_some());
        assert!(FullName::new("Анна Петрова").is_some());
        assert!(FullName::new("").is_none());
        assert!(FullName::new(" A B").is_none());
        assert!(FullName::new("A".repeat(513)).is_none());
    }

    #[test]
    fn accepts_common_phone_formats() {
        for number in ["+7 (999) 123-45-67", "89991234567", "+79991234567"] {
            assert!(Phone::new(number).is_some(), "`{number}` is rejected");
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        for number in ["", "phone", "12", "+7 999 ", "+7-abc-123-45"] {
            assert!(Phone::new(number).is_none(), "`{number}` is accepted");
        }
    }
}
