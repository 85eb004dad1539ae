//! [Telegram] contact definitions.
//!
//! [Telegram]: https://telegram.org

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;

/// Base of the deep links opening a chat with a [`Handle`].
const DEEP_LINK_BASE: &str = "https://t.me/";

/// Telegram username, stored as entered (with or without a leading `@`).
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Creates a new [`Handle`] if the given `handle` is valid.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Option<Self> {
        let handle = handle.into();
        Self::check(&handle).then_some(Self(handle))
    }

    /// Checks whether the given `handle` is a valid [`Handle`].
    fn check(handle: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Handle`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^@?[A-Za-z0-9_]{1,32}$").expect("valid regex")
        });

        REGEX.is_match(handle.as_ref())
    }

    /// Returns the username of this [`Handle`] without the leading `@`.
    #[must_use]
    pub fn username(&self) -> &str {
        self.0.strip_prefix('@').unwrap_or(&self.0)
    }

    /// Returns the [`DeepLink`] opening a chat with this [`Handle`].
    #[must_use]
    pub fn deep_link(&self) -> DeepLink {
        DeepLink(format!("{DEEP_LINK_BASE}{}", self.username()))
    }
}

impl FromStr for Handle {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Handle`")
    }
}

/// Link opening a chat in the Telegram app.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct DeepLink(String);

/// Text message sent through the Telegram Bot API with the [HTML] parse
/// mode.
///
/// [HTML]: https://core.telegram.org/bots/api#html-style
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Message(String);

impl Message {
    /// Builds a new [`Message`] from the provided `lines`.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        Self(text)
    }
}

/// Escapes the provided `text` to be put into a [`Message`] verbatim.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod spec {
    use super::{escape, Handle, Message};

    #[test]
    fn strips_at_sign_in_deep_link() {
        let handle = Handle::new("@foo").unwrap();

        assert_eq!(handle.username(), "foo");
        assert_eq!(handle.deep_link().as_ref(), "https://t.me/foo");
        assert_eq!(handle.to_string(), "@foo");
    }

    #[test]
    fn keeps_bare_username_in_deep_link() {
        let handle = Handle::new("hotel_bot").unwrap();

        assert_eq!(handle.deep_link().as_ref(), "https://t.me/hotel_bot");
    }

    #[test]
    fn rejects_malformed_handles() {
        for handle in ["", "@", "@@foo", "foo bar", "t.me/foo", "имя"] {
            assert!(Handle::new(handle).is_none(), "`{handle}` is accepted");
        }
    }

    #[test]
    fn escapes_html_markup() {
        assert_eq!(
            escape("<b>Tom & Jerry</b>"),
            "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;",
        );
        assert_eq!(escape("Тверская, 25"), "Тверская, 25");
    }

    #[test]
    fn joins_lines() {
        let msg = Message::from_lines(["a", "", "b"]);

        assert_eq!(msg.as_ref(), "a\n\nb");
    }
}
