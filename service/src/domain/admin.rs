//! [`Admin`] definitions.

use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::{contact, credentials};

/// Staff member managing the whole catalog.
#[derive(Clone, Debug)]
pub struct Admin {
    /// ID of this [`Admin`].
    pub id: Id,

    /// [`credentials::Login`] of this [`Admin`].
    pub login: credentials::Login,

    /// [`credentials::PasswordHash`] of this [`Admin`].
    pub password_hash: credentials::PasswordHash,

    /// Full name of this [`Admin`].
    pub full_name: contact::FullName,

    /// When this [`Admin`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Admin`].
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

/// Date and time when an [`Admin`] was created.
pub type CreationDateTime = DateTimeOf<(Admin, unit::Creation)>;
