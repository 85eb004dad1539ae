//! [`Publication`] state shared by [`Property`]s and [`Room`]s.
//!
//! State is kept as two independent flags. The archive flag overlays the
//! publish flag without erasing it, so un-archiving restores whatever
//! [`Status`] was there before:
//!
//! | `is_archived` | `is_published` | [`Status`]             |
//! |---------------|----------------|------------------------|
//! | `false`       | `false`        | [`Status::Draft`]      |
//! | `false`       | `true`         | [`Status::Active`]     |
//! | `true`        | any            | [`Status::Archived`]   |
//!
//! [`Property`]: crate::domain::Property
//! [`Room`]: crate::domain::Room

use common::define_kind;
use derive_more::{Display, Error};

/// Publication state of a listing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Publication {
    /// Indicator whether the listing is visible to the public.
    pub is_published: bool,

    /// Indicator whether the listing is withdrawn, overriding
    /// [`Publication::is_published`].
    pub is_archived: bool,
}

impl Publication {
    /// Creates a new non-archived [`Publication`].
    #[must_use]
    pub const fn new(is_published: bool) -> Self {
        Self {
            is_published,
            is_archived: false,
        }
    }

    /// Returns the derived [`Status`] of this [`Publication`].
    #[must_use]
    pub const fn status(self) -> Status {
        match (self.is_archived, self.is_published) {
            (true, _) => Status::Archived,
            (false, true) => Status::Active,
            (false, false) => Status::Draft,
        }
    }

    /// Indicates whether the listing appears in the public catalog.
    #[must_use]
    pub const fn is_listed(self) -> bool {
        matches!(self.status(), Status::Active)
    }

    /// Returns the current value of the provided [`Flag`].
    #[must_use]
    pub const fn get(self, flag: Flag) -> bool {
        match flag {
            Flag::Published => self.is_published,
            Flag::Archived => self.is_archived,
        }
    }

    /// Negates the provided [`Flag`] if it still equals the `current` value
    /// the caller has observed, returning its new value.
    ///
    /// # Errors
    ///
    /// With [`StaleFlag`] if the `current` value doesn't match, leaving this
    /// [`Publication`] untouched.
    pub fn toggle(
        &mut self,
        flag: Flag,
        current: bool,
    ) -> Result<bool, StaleFlag> {
        let actual = self.get(flag);
        if actual != current {
            return Err(StaleFlag { flag, actual });
        }

        let value = match flag {
            Flag::Published => &mut self.is_published,
            Flag::Archived => &mut self.is_archived,
        };
        *value = !actual;
        Ok(*value)
    }
}

define_kind! {
    #[doc = "Toggleable flag of a [`Publication`]."]
    enum Flag {
        #[doc = "[`Publication::is_published`] flag."]
        Published = 1,

        #[doc = "[`Publication::is_archived`] flag."]
        Archived = 2,
    }
}

define_kind! {
    #[doc = "Status derived from a [`Publication`]."]
    enum Status {
        #[doc = "Neither published, nor archived."]
        Draft = 1,

        #[doc = "Published and not archived, so listed publicly."]
        Active = 2,

        #[doc = "Archived, regardless of being published."]
        Archived = 3,
    }
}

/// Error of toggling a [`Flag`] whose value has been changed by someone else.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("`{flag}` flag is already `{actual}`")]
pub struct StaleFlag {
    /// [`Flag`] being toggled.
    pub flag: Flag,

    /// Actual value of the [`Flag`].
    pub actual: bool,
}

#[cfg(test)]
mod spec {
    use super::{Flag, Publication, Status};

    #[test]
    fn derives_status() {
        assert_eq!(Publication::new(false).status(), Status::Draft);
        assert_eq!(Publication::new(true).status(), Status::Active);
        for is_published in [false, true] {
            let p = Publication {
                is_published,
                is_archived: true,
            };
            assert_eq!(p.status(), Status::Archived);
        }
    }

    #[test]
    fn only_active_is_listed() {
        assert!(Publication::new(true).is_listed());
        assert!(!Publication::new(false).is_listed());
        assert!(!Publication {
            is_published: true,
            is_archived: true,
        }
        .is_listed());
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut p = Publication::new(false);

        assert_eq!(p.toggle(Flag::Published, false), Ok(true));
        assert_eq!(p.toggle(Flag::Published, true), Ok(false));
        assert_eq!(p, Publication::new(false));
    }

    #[test]
    fn archive_overlays_publish_flag() {
        let mut p = Publication::new(true);

        assert_eq!(p.toggle(Flag::Archived, false), Ok(true));
        assert!(p.is_published);
        assert_eq!(p.status(), Status::Archived);

        assert_eq!(p.toggle(Flag::Archived, true), Ok(false));
        assert_eq!(p.status(), Status::Active);
    }

    #[test]
    fn stale_toggle_changes_nothing() {
        let mut p = Publication::new(true);

        let err = p.toggle(Flag::Published, false).unwrap_err();

        assert_eq!(err.flag, Flag::Published);
        assert!(err.actual);
        assert_eq!(p, Publication::new(true));
    }
}
