//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Admin, Owner};
use crate::domain::{admin, owner};

/// Authenticated session, carried as [JWT] claims.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// [`Subject`] this [`Session`] belongs to.
    #[serde(rename = "acc")]
    pub subject: Subject,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Returns the [`Role`] of this [`Session`].
    #[must_use]
    pub const fn role(&self) -> Role {
        match self.subject {
            Subject::Admin(_) => Role::Admin,
            Subject::Owner(_) => Role::Owner,
        }
    }

    /// Indicates whether this [`Session`] may access the data of the
    /// [`Owner`] with the provided ID.
    #[must_use]
    pub fn may_access(&self, owner_id: owner::Id) -> bool {
        match self.subject {
            Subject::Admin(_) => true,
            Subject::Owner(id) => id == owner_id,
        }
    }
}

/// Account a [`Session`] belongs to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// [`Admin`] with the provided ID.
    Admin(admin::Id),

    /// [`Owner`] with the provided ID.
    Owner(owner::Id),
}

define_kind! {
    #[doc = "Role of a [`Session`]."]
    enum Role {
        #[doc = "Staff managing everything."]
        Admin = 1,

        #[doc = "Owner managing its own listings."]
        Owner = 2,
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use super::{ExpirationDateTime, Role, Session, Subject};

    #[test]
    fn serializes_subject_as_tagged_claim() {
        let session = Session {
            subject: Subject::Owner(7.into()),
            expires_at: ExpirationDateTime::from_unix_timestamp(1_700_000_000)
                .unwrap(),
        };

        let json = serde_json::to_value(session).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"acc": {"owner": 7}, "exp": 1_700_000_000}),
        );
        assert_eq!(
            serde_json::from_value::<Session>(json).unwrap(),
            session,
        );
    }

    #[test]
    fn owner_accesses_only_itself() {
        let expires_at = ExpirationDateTime::now();
        let owner = Session {
            subject: Subject::Owner(1.into()),
            expires_at,
        };
        let admin = Session {
            subject: Subject::Admin(1.into()),
            expires_at,
        };

        assert_eq!(owner.role(), Role::Owner);
        assert!(owner.may_access(1.into()));
        assert!(!owner.may_access(2.into()));
        assert_eq!(admin.role(), Role::Admin);
        assert!(admin.may_access(2.into()));
    }
}
