//! [`Command`] for creating a new [`Property`].

use common::operations::{
    By, Commit, Insert, Reserve, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        image, owner,
        pricing::{MinHours, Price},
        property, telegram, Owner, Property, Publication,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Property`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// ID of the [`Owner`] controlling the new [`Property`], if any.
    pub owner_id: Option<owner::Id>,

    /// [`property::Category`] of the new [`Property`].
    pub category: property::Category,

    /// [`property::Name`] of the new [`Property`].
    pub name: property::Name,

    /// [`property::Description`] of the new [`Property`].
    pub description: Option<property::Description>,

    /// [`property::Address`] of the new [`Property`].
    pub address: property::Address,

    /// [`property::TransitLabel`] of the new [`Property`].
    pub transit: Option<property::TransitLabel>,

    /// [`property::Area`] of the new [`Property`].
    pub area: Option<property::Area>,

    /// [`property::Capacity`] of the new [`Property`].
    pub capacity: Option<property::Capacity>,

    /// [`Price`] of a single hour.
    pub price_per_hour: Price,

    /// [`MinHours`] of a rent.
    pub min_hours: MinHours,

    /// [`property::Coordinates`] of the new [`Property`].
    pub location: Option<property::Coordinates>,

    /// Cover image of the new [`Property`].
    pub cover_image: Option<image::Url>,

    /// Additional photos of the new [`Property`].
    pub photos: Vec<image::Url>,

    /// [`telegram::Handle`] to contact about the new [`Property`].
    pub telegram: Option<telegram::Handle>,

    /// Indicator whether the new [`Property`] is published right away.
    pub is_published: bool,
}

impl CreateProperty {
    /// Name of the constraint referencing the [`Owner`] of a [`Property`].
    const OWNER_CONSTRAINT: &'static str = "properties_owner_id_fkey";
}

impl<Db, St, Ms> Command<CreateProperty> for Service<Db, St, Ms>
where
    Db: Database<
            Select<By<Option<Owner>, owner::Id>>,
            Ok = Option<Owner>,
            Err = Traced<database::Error>,
        > + Database<
            Reserve<property::Id>,
            Ok = property::Id,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::property::Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if let Some(owner_id) = cmd.owner_id {
            drop(
                self.database()
                    .execute(Select(By::<Option<Owner>, _>::new(owner_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::OwnerNotExists(owner_id))
                    .map_err(tracerr::wrap!())?,
            );
        }

        let id = self
            .database()
            .execute(Reserve::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let now = property::CreationDateTime::now();
        let property = Property {
            id,
            owner_id: cmd.owner_id,
            category: cmd.category,
            name: cmd.name,
            description: cmd.description,
            address: cmd.address,
            transit: cmd.transit,
            area: cmd.area,
            capacity: cmd.capacity,
            price_per_hour: cmd.price_per_hour,
            min_hours: cmd.min_hours,
            location: cmd.location,
            cover_image: cmd.cover_image,
            photos: cmd.photos,
            telegram: cmd.telegram,
            publication: Publication::new(cmd.is_published),
            created_at: now,
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Err(e) = tx.execute(Insert(property.clone())).await {
            // The `Owner` may be gone since the check above.
            return Err(match property.owner_id {
                Some(id)
                    if e.as_ref().is_foreign_key_violation(
                        CreateProperty::OWNER_CONSTRAINT,
                    ) =>
                {
                    tracerr::new!(E::OwnerNotExists(id))
                }
                _ => tracerr::map_from_and_wrap!(=> E)(e),
            });
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(read::property::Entry {
            property,
            stats: read::property::Stats::default(),
        })
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Owner`] doesn't exist.
    #[display("`Owner(id: {_0})` does not exist")]
    #[from(ignore)]
    OwnerNotExists(#[error(not(source))] owner::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture,
        domain::{property::Category, publication::Status},
        query,
        read::{catalog, property::list},
        Command as _, Query as _, Service,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn creates_unlisted_draft() {
        let svc = Service::in_memory();
        let owner = fixture::owner(&svc, "owner9").await;

        let created = svc
            .execute(fixture::create_property(Some(owner.id)))
            .await
            .unwrap();

        let p = &created.property;
        assert_eq!(p.category, Category::Apartment);
        assert_eq!(p.price_per_hour.amount(), 3000.into());
        assert_eq!(p.min_hours.get(), 2);
        assert_eq!(p.publication.status(), Status::Draft);
        assert_eq!(created.stats.views, 0);

        let public = svc
            .execute(query::catalog::List(catalog::Filter {
                category: Some(Category::Apartment),
                search: None,
            }))
            .await
            .unwrap();
        assert!(public.is_empty());

        let drafts = svc
            .execute(query::property::List::by(list::Filter {
                status: Some(Status::Draft),
                ..list::Filter::default()
            }))
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].property.id, p.id);
    }

    #[tokio::test]
    async fn creates_unowned() {
        let svc = Service::in_memory();

        let created =
            svc.execute(fixture::create_property(None)).await.unwrap();

        assert_eq!(created.property.owner_id, None);
    }

    #[tokio::test]
    async fn rejects_missing_owner() {
        let svc = Service::in_memory();

        let err = svc
            .execute(fixture::create_property(Some(42.into())))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::OwnerNotExists(id) if i32::from(*id) == 42,
        ));
    }
}
