//! [`image::Url`]-related [`Database`] implementations.

use std::collections::HashSet;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::image,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<HashSet<image::Url>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = HashSet<image::Url>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<HashSet<image::Url>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT cover_image AS url \
            FROM properties \
            WHERE cover_image IS NOT NULL \
            UNION \
            SELECT unnest(photos) AS url \
            FROM properties \
            UNION \
            SELECT unnest(photos) AS url \
            FROM rooms";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("url"))
            .collect())
    }
}
