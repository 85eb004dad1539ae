//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{
    By, Delete, Insert, Lock, Reserve, Select, Update,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, Capacity, Coordinates},
        publication::Status,
        Property,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::property::{list, Entry, Hit, Stats},
};

use super::{min_hours, publication};

/// Columns of the `properties` table joined with `property_stats`.
const COLUMNS: &str = "\
    p.id, p.owner_id, p.category, p.name, p.description, \
    p.address, p.transit, p.area, p.capacity, \
    p.price_per_hour, p.min_hours, p.latitude, p.longitude, \
    p.cover_image, p.photos, p.telegram, \
    p.is_published, p.is_archived, p.created_at, p.updated_at, \
    COALESCE(s.views, 0) AS views, COALESCE(s.clicks, 0) AS clicks, \
    s.last_view_at, s.last_click_at";

/// Reads an [`Entry`] from the provided `row` selected with [`COLUMNS`].
fn from_row(row: &Row) -> Entry {
    let location = row
        .get::<_, Option<f64>>("latitude")
        .zip(row.get::<_, Option<f64>>("longitude"))
        .map(|(lat, lon)| {
            Coordinates::new(lat, lon).expect("checked by the schema")
        });
    let capacity = row.get::<_, Option<i32>>("capacity").map(|c| {
        u16::try_from(c)
            .ok()
            .and_then(Capacity::new)
            .expect("`capacity` overflow")
    });

    Entry {
        property: Property {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            category: row.get("category"),
            name: row.get("name"),
            description: row.get("description"),
            address: row.get("address"),
            transit: row.get("transit"),
            area: row.get("area"),
            capacity,
            price_per_hour: row.get("price_per_hour"),
            min_hours: min_hours(row),
            location,
            cover_image: row.get("cover_image"),
            photos: row.get("photos"),
            telegram: row.get("telegram"),
            publication: publication(row),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        stats: Stats {
            views: row.get("views"),
            clicks: row.get("clicks"),
            last_view_at: row.get("last_view_at"),
            last_click_at: row.get("last_click_at"),
        },
    }
}

impl<C> Database<Reserve<property::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = property::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Reserve<property::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.next_id("properties")
            .await
            .map_err(tracerr::wrap!())
            .map(Into::into)
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Entry>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Entry>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties AS p \
             LEFT JOIN property_stats AS s ON s.property_id = p.id \
             WHERE p.id = ANY($1::INT4[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let entry = from_row(row);
                (entry.property.id, entry)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Entry>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Entry>, [property::Id; 1]>>,
        Ok = HashMap<property::Id, Entry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Entry>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Entry>, property::Id>>,
        Ok = Option<Entry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .execute(Select(By::<Option<Entry>, _>::new(by.into_inner())))
            .await
            .map_err(tracerr::wrap!())?
            .map(|e| e.property))
    }
}

impl<C> Database<Select<By<Vec<Entry>, list::Filter>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Entry>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Entry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Entry>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Filter {
            status,
            category,
            owner_id,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let category_idx = category.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });
        let owner_idx = owner_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM properties \
             WHERE TRUE \
                   {status_filtering} \
                   {category_filtering} \
                   {owner_filtering} \
             ORDER BY created_at DESC, id DESC",
            status_filtering =
                status.into_iter().format_with("", |s, f| match s {
                    Status::Draft => f(&format_args!(
                        "AND NOT is_published AND NOT is_archived",
                    )),
                    Status::Active => f(&format_args!(
                        "AND is_published AND NOT is_archived",
                    )),
                    Status::Archived => {
                        f(&format_args!("AND is_archived"))
                    }
                }),
            category_filtering =
                category_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND category = ${idx}::INT2"))
                }),
            owner_filtering =
                owner_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND owner_id = ${idx}::INT4"))
                }),
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<property::Id>>();

        let mut entries = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| entries.remove(id)).collect())
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            owner_id,
            category,
            name,
            description,
            address,
            transit,
            area,
            capacity,
            price_per_hour,
            min_hours,
            location,
            cover_image,
            photos,
            telegram,
            publication,
            created_at,
            updated_at,
        } = property;
        let capacity = capacity.map(|c| i32::from(c.get()));
        let min_hours = i32::from(min_hours.get());
        let latitude = location.map(Coordinates::latitude);
        let longitude = location.map(Coordinates::longitude);

        const SQL: &str = "\
            INSERT INTO properties (\
                id, owner_id, category, name, description, \
                address, transit, area, capacity, \
                price_per_hour, min_hours, latitude, longitude, \
                cover_image, photos, telegram, \
                is_published, is_archived, created_at, updated_at\
            ) \
            VALUES (\
                $1::INT4, $2::INT4, $3::INT2, $4::VARCHAR, $5::TEXT, \
                $6::VARCHAR, $7::VARCHAR, $8::NUMERIC, $9::INT4, \
                $10::NUMERIC, $11::INT4, $12::FLOAT8, $13::FLOAT8, \
                $14::VARCHAR, $15::VARCHAR[], $16::VARCHAR, \
                $17::BOOLEAN, $18::BOOLEAN, \
                $19::TIMESTAMPTZ, $20::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET owner_id = EXCLUDED.owner_id, \
                category = EXCLUDED.category, \
                name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                address = EXCLUDED.address, \
                transit = EXCLUDED.transit, \
                area = EXCLUDED.area, \
                capacity = EXCLUDED.capacity, \
                price_per_hour = EXCLUDED.price_per_hour, \
                min_hours = EXCLUDED.min_hours, \
                latitude = EXCLUDED.latitude, \
                longitude = EXCLUDED.longitude, \
                cover_image = EXCLUDED.cover_image, \
                photos = EXCLUDED.photos, \
                telegram = EXCLUDED.telegram, \
                is_published = EXCLUDED.is_published, \
                is_archived = EXCLUDED.is_archived, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &category,
                &name,
                &description,
                &address,
                &transit,
                &area,
                &capacity,
                &price_per_hour,
                &min_hours,
                &latitude,
                &longitude,
                &cover_image,
                &photos,
                &telegram,
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

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Hit>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(hit): Insert<Hit>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut delta = Stats::default();
        delta.record(&hit);

        const SQL: &str = "\
            INSERT INTO property_stats (\
                property_id, views, clicks, last_view_at, last_click_at\
            ) \
            VALUES (\
                $1::INT4, $2::INT8, $3::INT8, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (property_id) DO UPDATE \
            SET views = property_stats.views + EXCLUDED.views, \
                clicks = property_stats.clicks + EXCLUDED.clicks, \
                last_view_at = COALESCE(EXCLUDED.last_view_at, \
                                        property_stats.last_view_at), \
                last_click_at = COALESCE(EXCLUDED.last_click_at, \
                                         property_stats.last_click_at) \
            RETURNING views, clicks, last_view_at, last_click_at";
        let row = self
            .query_opt(
                SQL,
                &[
                    &hit.property_id,
                    &delta.views,
                    &delta.clicks,
                    &delta.last_view_at,
                    &delta.last_click_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("always returned");
        Ok(Stats {
            views: row.get("views"),
            clicks: row.get("clicks"),
            last_view_at: row.get("last_view_at"),
            last_click_at: row.get("last_click_at"),
        })
    }
}
