//! [`Room`]-related [`Database`] implementations.

use common::operations::{
    By, Delete, Insert, Lock, Reserve, Select, Update,
};
use postgres_types::Json;
use serde::Deserialize;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, room, Room},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

use super::{min_hours, publication};

/// Columns of the `rooms` table.
const COLUMNS: &str = "\
    id, property_id, name, price_per_hour, area, description, \
    min_hours, photos, features, amenities, telegram, phone, \
    is_published, is_archived, created_at, updated_at";

/// [`room::Feature`] as stored in the `features` JSONB column.
#[derive(Deserialize)]
struct StoredFeature {
    /// Raw [`room::FeatureIcon`].
    icon: String,

    /// Raw [`room::FeatureLabel`].
    label: String,
}

impl From<StoredFeature> for room::Feature {
    fn from(stored: StoredFeature) -> Self {
        Self {
            icon: room::FeatureIcon::new(stored.icon)
                .expect("`icon` is checked before stored"),
            label: room::FeatureLabel::new(stored.label)
                .expect("`label` is checked before stored"),
        }
    }
}

/// Reads a [`Room`] from the provided `row` selected with [`COLUMNS`].
fn from_row(row: &Row) -> Room {
    let Json(features) = row.get::<_, Json<Vec<StoredFeature>>>("features");

    Room {
        id: row.get("id"),
        property_id: row.get("property_id"),
        name: row.get("name"),
        price_per_hour: row.get("price_per_hour"),
        area: row.get("area"),
        description: row.get("description"),
        min_hours: min_hours(row),
        photos: row.get("photos"),
        features: features.into_iter().map(Into::into).collect(),
        amenities: row.get("amenities"),
        telegram: row.get("telegram"),
        phone: row.get("phone"),
        publication: publication(row),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Reserve<room::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = room::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reserve<room::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.next_id("rooms")
            .await
            .map_err(tracerr::wrap!())
            .map(Into::into)
    }
}

impl<C> Database<Select<By<Option<Room>, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms \
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

impl<C> Database<Select<By<Vec<Room>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms \
             WHERE property_id = $1::INT4 \
             ORDER BY id",
        );
        Ok(self
            .query(&sql, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Room>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Room>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room): Insert<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(room)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(room): Update<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let Room {
            id,
            property_id,
            name,
            price_per_hour,
            area,
            description,
            min_hours,
            photos,
            features,
            amenities,
            telegram,
            phone,
            publication,
            created_at,
            updated_at,
        } = room;
        let min_hours = i32::from(min_hours.get());

        const SQL: &str = "\
            INSERT INTO rooms (\
                id, property_id, name, price_per_hour, area, description, \
                min_hours, photos, features, amenities, telegram, phone, \
                is_published, is_archived, created_at, updated_at\
            ) \
            VALUES (\
                $1::INT4, $2::INT4, $3::VARCHAR, $4::NUMERIC, \
                $5::NUMERIC, $6::TEXT, $7::INT4, $8::VARCHAR[], \
                $9::JSONB, $10::VARCHAR[], $11::VARCHAR, $12::VARCHAR, \
                $13::BOOLEAN, $14::BOOLEAN, \
                $15::TIMESTAMPTZ, $16::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                price_per_hour = EXCLUDED.price_per_hour, \
                area = EXCLUDED.area, \
                description = EXCLUDED.description, \
                min_hours = EXCLUDED.min_hours, \
                photos = EXCLUDED.photos, \
                features = EXCLUDED.features, \
                amenities = EXCLUDED.amenities, \
                telegram = EXCLUDED.telegram, \
                phone = EXCLUDED.phone, \
                is_published = EXCLUDED.is_published, \
                is_archived = EXCLUDED.is_archived, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &name,
                &price_per_hour,
                &area,
                &description,
                &min_hours,
                &photos,
                &Json(&features),
                &amenities,
                &telegram,
                &phone,
                &publication.is_published,
                &publication.is_archived,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rooms \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM rooms \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
