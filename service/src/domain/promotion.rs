//! [`Promotion`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Global promotional offer, unrelated to any particular listing.
#[derive(Clone, Debug)]
pub struct Promotion {
    /// ID of this [`Promotion`].
    pub id: Id,

    /// [`Title`] of this [`Promotion`].
    pub title: Title,

    /// [`Description`] of this [`Promotion`], if any.
    pub description: Option<Description>,

    /// [`Validity`] period of this [`Promotion`].
    pub validity: Validity,

    /// Indicator whether this [`Promotion`] is shown to clients.
    ///
    /// Expired [`Promotion`]s are never deactivated automatically, so this is
    /// the only flag clients should check.
    pub is_active: bool,

    /// [`DateTime`] when this [`Promotion`] was created.
    pub created_at: CreationDateTime,
}

impl Promotion {
    /// Indicates whether the [`Validity`] of this [`Promotion`] ended before
    /// the provided moment.
    #[must_use]
    pub fn is_expired(&self, at: ValidityDateTime) -> bool {
        self.validity.until.is_some_and(|until| until < at)
    }
}

/// ID of a [`Promotion`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

define_text! {
    /// Title of a [`Promotion`].
    Title(max_len = 256)
}

define_text! {
    /// Free-form description of a [`Promotion`].
    Description(max_len = 10_000)
}

/// Period a [`Promotion`] is valid within.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Validity {
    /// Start of the period.
    from: ValidityDateTime,

    /// End of the period, if any.
    until: Option<ValidityDateTime>,
}

impl Validity {
    /// Creates a new [`Validity`] if `until` doesn't precede `from`.
    #[must_use]
    pub fn new(
        from: ValidityDateTime,
        until: Option<ValidityDateTime>,
    ) -> Option<Self> {
        until
            .map_or(true, |until| from <= until)
            .then_some(Self { from, until })
    }

    /// Returns the start of this [`Validity`].
    #[must_use]
    pub const fn from(self) -> ValidityDateTime {
        self.from
    }

    /// Returns the end of this [`Validity`], if any.
    #[must_use]
    pub const fn until(self) -> Option<ValidityDateTime> {
        self.until
    }
}

/// [`DateTime`] bounding a [`Validity`].
pub type ValidityDateTime = DateTimeOf<Validity>;

/// [`DateTime`] when a [`Promotion`] was created.
pub type CreationDateTime = DateTimeOf<(Promotion, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Promotion, Title, Validity, ValidityDateTime};

    fn promotion(validity: Validity) -> Promotion {
        Promotion {
            id: 1.into(),
            title: Title::new("Скидка 20%").unwrap(),
            description: None,
            validity,
            is_active: true,
            created_at: ValidityDateTime::now().coerce(),
        }
    }

    #[test]
    fn validity_end_does_not_precede_start() {
        let now = ValidityDateTime::now();
        let hour = Duration::from_secs(3600);

        assert!(Validity::new(now, None).is_some());
        assert!(Validity::new(now, Some(now)).is_some());
        assert!(Validity::new(now, Some(now + hour)).is_some());
        assert!(Validity::new(now, Some(now - hour)).is_none());
    }

    #[test]
    fn expires_only_with_end_in_the_past() {
        let now = ValidityDateTime::now();
        let day = Duration::from_secs(24 * 3600);

        let open = promotion(Validity::new(now - day, None).unwrap());
        let ended =
            promotion(Validity::new(now - day - day, Some(now - day)).unwrap());

        assert!(!open.is_expired(now));
        assert!(ended.is_expired(now));
        assert!(ended.is_active);
    }
}
