//! [`Query`] collection related to [`Owner`]s.

use common::operations::By;

use crate::{
    domain::{owner, Owner},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Owner`] by its [`owner::Id`].
pub type ById = DatabaseQuery<By<Option<Owner>, owner::Id>>;

/// Queries all the [`Owner`]s, newest first.
pub type List = DatabaseQuery<By<Vec<read::owner::Summary>, ()>>;
