//! [`Query`] collection related to [`Promotion`]s.

use common::operations::By;

use crate::domain::{promotion, Promotion};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Promotion`] by its [`promotion::Id`].
pub type ById = DatabaseQuery<By<Option<Promotion>, promotion::Id>>;

/// Queries all the [`Promotion`]s, newest first.
pub type List = DatabaseQuery<By<Vec<Promotion>, ()>>;
