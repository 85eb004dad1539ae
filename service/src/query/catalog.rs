//! [`Query`] collection of the public catalog.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{property, publication, Room},
    infra::{database, Database},
    read::{
        self,
        property::{list, Entry},
    },
    Service,
};

use super::Query;

/// Queries listed [`Property`]s matching the [`read::catalog::Filter`], newest
/// first.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct List(pub read::catalog::Filter);

impl<Db, St, Ms> Query<List> for Service<Db, St, Ms>
where
    Db: Database<
        Select<By<Vec<Entry>, list::Filter>>,
        Ok = Vec<Entry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List(filter): List,
    ) -> Result<Self::Ok, Self::Err> {
        let active = self
            .database()
            .execute(Select(By::new(list::Filter {
                status: Some(publication::Status::Active),
                category: filter.category,
                owner_id: None,
            })))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(filter.apply(active))
    }
}

/// Queries [`read::catalog::Details`] of a listed [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Copy, Debug)]
pub struct Details(pub property::Id);

impl<Db, St, Ms> Query<Details> for Service<Db, St, Ms>
where
    Db: Database<
            Select<By<Option<Entry>, property::Id>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Room>, property::Id>>,
            Ok = Vec<Room>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::catalog::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Details(property_id): Details,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(entry) = self
            .database()
            .execute(Select(By::<Option<Entry>, _>::new(property_id)))
            .await
            .map_err(tracerr::wrap!())?
            .filter(|e| e.property.publication.is_listed())
        else {
            return Ok(None);
        };

        let rooms = self
            .database()
            .execute(Select(By::<Vec<Room>, _>::new(property_id)))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter(|r| r.publication.is_listed())
            .collect();

        Ok(Some(read::catalog::Details { entry, rooms }))
    }
}
