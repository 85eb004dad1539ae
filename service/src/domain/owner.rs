//! [`Owner`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::{contact, credentials, telegram};

/// Registered account controlling one or more [`Property`]s.
///
/// [`Owner`]s are never deleted, only deactivated.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Owner {
    /// ID of this [`Owner`].
    pub id: Id,

    /// [`credentials::Login`] of this [`Owner`].
    pub login: credentials::Login,

    /// [`credentials::PasswordHash`] of this [`Owner`].
    pub password_hash: credentials::PasswordHash,

    /// Full name of this [`Owner`].
    pub full_name: contact::FullName,

    /// [`contact::Phone`] of this [`Owner`], if any.
    pub phone: Option<contact::Phone>,

    /// [`telegram::Handle`] of this [`Owner`], if any.
    pub telegram: Option<telegram::Handle>,

    /// Indicator whether this [`Owner`] may sign in and see its dashboard.
    pub is_active: bool,

    /// [`DateTime`] when this [`Owner`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Owner`].
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

/// [`DateTime`] when an [`Owner`] was created.
pub type CreationDateTime = DateTimeOf<(Owner, unit::Creation)>;
