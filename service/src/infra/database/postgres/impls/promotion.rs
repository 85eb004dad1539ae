//! [`Promotion`]-related [`Database`] implementations.

use common::operations::{
    By, Delete, Insert, Lock, Reserve, Select, Update,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        promotion::{self, Validity},
        Promotion,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `promotions` table.
const COLUMNS: &str = "\
    id, title, description, valid_from, valid_until, is_active, created_at";

/// Reads a [`Promotion`] from the provided `row` selected with [`COLUMNS`].
fn from_row(row: &Row) -> Promotion {
    Promotion {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        validity: Validity::new(row.get("valid_from"), row.get("valid_until"))
            .expect("checked by the schema"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Reserve<promotion::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = promotion::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reserve<promotion::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.next_id("promotions")
            .await
            .map_err(tracerr::wrap!())
            .map(Into::into)
    }
}

impl<C> Database<Select<By<Option<Promotion>, promotion::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Promotion>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Promotion>, promotion::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: promotion::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM promotions \
             WHERE id = $1::INT4",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Promotion>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Promotion>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Promotion>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM promotions \
             ORDER BY created_at DESC, id DESC",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Promotion>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Promotion>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(promotion): Insert<Promotion>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(promotion))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Promotion>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(promotion): Update<Promotion>,
    ) -> Result<Self::Ok, Self::Err> {
        let Promotion {
            id,
            title,
            description,
            validity,
            is_active,
            created_at,
        } = promotion;
        let (valid_from, valid_until) = (validity.from(), validity.until());

        const SQL: &str = "\
            INSERT INTO promotions (\
                id, title, description, \
                valid_from, valid_until, is_active, created_at\
            ) \
            VALUES (\
                $1::INT4, $2::VARCHAR, $3::TEXT, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ, $6::BOOLEAN, \
                $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                valid_from = EXCLUDED.valid_from, \
                valid_until = EXCLUDED.valid_until, \
                is_active = EXCLUDED.is_active";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &valid_from,
                &valid_until,
                &is_active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Promotion, promotion::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Promotion, promotion::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: promotion::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM promotions \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Promotion, promotion::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Promotion, promotion::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: promotion::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM promotions \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
