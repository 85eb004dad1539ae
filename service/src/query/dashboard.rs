//! [`Query`] of an [`Owner`] dashboard.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{owner, promotion, Owner, Promotion},
    infra::{database, Database},
    read::{
        dashboard::Offer,
        property::{list, Entry},
        Dashboard,
    },
    Service,
};

use super::Query;

/// Queries the [`Dashboard`] of an active [`Owner`].
#[derive(Clone, Copy, Debug)]
pub struct ForOwner(pub owner::Id);

impl<Db, St, Ms> Query<ForOwner> for Service<Db, St, Ms>
where
    Db: Database<
            Select<By<Option<Owner>, owner::Id>>,
            Ok = Option<Owner>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Entry>, list::Filter>>,
            Ok = Vec<Entry>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Promotion>, ()>>,
            Ok = Vec<Promotion>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<Dashboard>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ForOwner(owner_id): ForOwner,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(owner) = self
            .database()
            .execute(Select(By::<Option<Owner>, _>::new(owner_id)))
            .await
            .map_err(tracerr::wrap!())?
            .filter(|o| o.is_active)
        else {
            return Ok(None);
        };

        let objects = self
            .database()
            .execute(Select(By::new(list::Filter {
                owner_id: Some(owner.id),
                ..list::Filter::default()
            })))
            .await
            .map_err(tracerr::wrap!())?;

        let promotions = self
            .database()
            .execute(Select(By::<Vec<Promotion>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(Dashboard {
            owner,
            objects,
            promotions: Offer::select(
                promotions,
                promotion::ValidityDateTime::now(),
            ),
        }))
    }
}
