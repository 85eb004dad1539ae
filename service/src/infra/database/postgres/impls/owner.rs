//! [`Owner`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Reserve, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{credentials, owner, Owner},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `owners` table, prefixed with `o.`.
const COLUMNS: &str = "\
    o.id, o.login, o.password_hash, o.full_name, \
    o.phone, o.telegram, o.is_active, o.created_at";

/// Reads an [`Owner`] from the provided `row` selected with [`COLUMNS`].
fn from_row(row: &Row) -> Owner {
    Owner {
        id: row.get("id"),
        login: row.get("login"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        phone: row.get("phone"),
        telegram: row.get("telegram"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Reserve<owner::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = owner::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reserve<owner::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.next_id("owners")
            .await
            .map_err(tracerr::wrap!())
            .map(Into::into)
    }
}

impl<C, IDs> Database<Select<By<HashMap<owner::Id, Owner>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[owner::Id]>,
{
    type Ok = HashMap<owner::Id, Owner>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<owner::Id, Owner>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[owner::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM owners AS o \
             WHERE o.id = ANY($1::INT4[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let owner = from_row(row);
                (owner.id, owner)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Owner>, owner::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<owner::Id, Owner>, [owner::Id; 1]>>,
        Ok = HashMap<owner::Id, Owner>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Owner>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Owner>, owner::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'l, C> Database<Select<By<Option<Owner>, &'l credentials::Login>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Owner>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Owner>, &'l credentials::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM owners AS o \
             WHERE o.login = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[login])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Owner>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Owner>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(owner): Insert<Owner>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(owner)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Owner>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(owner): Update<Owner>,
    ) -> Result<Self::Ok, Self::Err> {
        let Owner {
            id,
            login,
            password_hash,
            full_name,
            phone,
            telegram,
            is_active,
            created_at,
        } = owner;

        const SQL: &str = "\
            INSERT INTO owners (\
                id, login, password_hash, full_name, \
                phone, telegram, is_active, created_at\
            ) \
            VALUES (\
                $1::INT4, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, $7::BOOLEAN, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET login = EXCLUDED.login, \
                password_hash = EXCLUDED.password_hash, \
                full_name = EXCLUDED.full_name, \
                phone = EXCLUDED.phone, \
                telegram = EXCLUDED.telegram, \
                is_active = EXCLUDED.is_active";
        self.exec(
            SQL,
            &[
                &id,
                &login,
                &password_hash,
                &full_name,
                &phone,
                &telegram,
                &is_active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Owner, owner::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Owner, owner::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: owner::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM owners \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<read::owner::Summary>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::owner::Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<read::owner::Summary>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS}, \
                    (SELECT COUNT(*) \
                     FROM properties AS p \
                     WHERE p.owner_id = o.id) AS properties_count \
             FROM owners AS o \
             ORDER BY o.created_at DESC, o.id DESC",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| read::owner::Summary {
                owner: from_row(row),
                properties_count: row.get("properties_count"),
            })
            .collect())
    }
}
