//! [`Query`] collection related to [`Room`]s.

use common::operations::By;

use crate::domain::{property, room, Room};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a [`Room`] by its [`room::Id`].
pub type ById = DatabaseQuery<By<Option<Room>, room::Id>>;

/// Queries all the [`Room`]s of a [`Property`], ordered by their IDs.
pub type ByProperty = DatabaseQuery<By<Vec<Room>, property::Id>>;
