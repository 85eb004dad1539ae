//! [`Query`] collection related to [`Property`]s.

use common::operations::By;

use crate::{domain::property, read};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a [`Property`] with its stats by its [`property::Id`].
pub type ById = DatabaseQuery<By<Option<read::property::Entry>, property::Id>>;

/// Queries [`Property`]s with their stats, newest first.
pub type List = DatabaseQuery<
    By<Vec<read::property::Entry>, read::property::list::Filter>,
>;
