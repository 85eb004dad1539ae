//! [`Admin`]-related [`Database`] implementations.

use common::operations::{By, Insert, Reserve, Select};
use tracerr::Traced;

use crate::{
    domain::{admin, credentials, Admin},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Reserve<admin::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = admin::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reserve<admin::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.next_id("admins")
            .await
            .map_err(tracerr::wrap!())
            .map(Into::into)
    }
}

impl<C> Database<Insert<Admin>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(admin): Insert<Admin>,
    ) -> Result<Self::Ok, Self::Err> {
        let Admin {
            id,
            login,
            password_hash,
            full_name,
            created_at,
        } = admin;

        const SQL: &str = "\
            INSERT INTO admins (\
                id, login, password_hash, full_name, created_at\
            ) \
            VALUES (\
                $1::INT4, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &login, &password_hash, &full_name, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<'l, C> Database<Select<By<Option<Admin>, &'l credentials::Login>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Admin>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Admin>, &'l credentials::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, password_hash, full_name, created_at \
            FROM admins \
            WHERE login = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[login])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Admin {
                id: row.get("id"),
                login: row.get("login"),
                password_hash: row.get("password_hash"),
                full_name: row.get("full_name"),
                created_at: row.get("created_at"),
            }))
    }
}
