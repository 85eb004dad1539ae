//! Domain definitions.

/// Defines a trimmed, non-empty text newtype limited to `max_len` chars.
macro_rules! define_text {
    (
        $(#[doc = $doc:literal])*
        $name:ident(max_len = $max_len:literal)
    ) => {
        $(#[doc = $doc])*
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            PartialEq,
            ::serde::Serialize,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!(
                "Creates a new [`", stringify!($name),
                "`] if the given `text` is valid.",
            )]
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                Self::check(&text).then_some(Self(text))
            }

            #[doc = concat!(
                "Checks whether the given `text` is a valid [`",
                stringify!($name), "`].",
            )]
            fn check(text: impl AsRef<str>) -> bool {
                let text = text.as_ref();
                text.trim() == text
                    && !text.is_empty()
                    && text.chars().count() <= $max_len
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

pub mod admin;
pub mod brief;
pub mod contact;
pub mod credentials;
pub mod image;
pub mod owner;
pub mod pricing;
pub mod promotion;
pub mod property;
pub mod publication;
pub mod room;
pub mod session;
pub mod telegram;

pub use self::{
    admin::Admin, brief::Brief, image::Image, owner::Owner,
    promotion::Promotion, property::Property, publication::Publication,
    room::Room, session::Session,
};
