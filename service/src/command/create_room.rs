//! [`Command`] for creating a new [`Room`].

use common::operations::{
    By, Commit, Insert, Lock, Reserve, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contact, image,
        pricing::{MinHours, Price},
        property, room, telegram, Property, Publication, Room,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Room`] in an existing [`Property`].
#[derive(Clone, Debug)]
pub struct CreateRoom {
    /// ID of the [`Property`] the new [`Room`] belongs to.
    pub property_id: property::Id,

    /// [`room::Name`] of the new [`Room`].
    pub name: room::Name,

    /// [`Price`] of a single hour.
    pub price_per_hour: Price,

    /// Floor area of the new [`Room`].
    pub area: Option<property::Area>,

    /// [`room::Description`] of the new [`Room`].
    pub description: Option<room::Description>,

    /// [`MinHours`] of a rent.
    pub min_hours: MinHours,

    /// Photos of the new [`Room`].
    pub photos: Vec<image::Url>,

    /// [`room::Feature`]s of the new [`Room`].
    pub features: Vec<room::Feature>,

    /// [`room::Amenity`]s of the new [`Room`].
    pub amenities: Vec<room::Amenity>,

    /// [`telegram::Handle`] to book the new [`Room`] with.
    pub telegram: Option<telegram::Handle>,

    /// [`contact::Phone`] to book the new [`Room`] with.
    pub phone: Option<contact::Phone>,

    /// Indicator whether the new [`Room`] is published right away.
    pub is_published: bool,
}

impl<Db, St, Ms> Command<CreateRoom> for Service<Db, St, Ms>
where
    Db: Database<
            Reserve<room::Id>,
            Ok = room::Id,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let id = self
            .database()
            .execute(Reserve::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Keep the `Property` from being deleted until the `Room` is in.
        tx.execute(Lock(By::new(cmd.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(
            tx.execute(Select(By::<Option<Property>, _>::new(
                cmd.property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(cmd.property_id))
            .map_err(tracerr::wrap!())?,
        );

        let now = room::CreationDateTime::now();
        let room = Room {
            id,
            property_id: cmd.property_id,
            name: cmd.name,
            price_per_hour: cmd.price_per_hour,
            area: cmd.area,
            description: cmd.description,
            min_hours: cmd.min_hours,
            photos: cmd.photos,
            features: cmd.features,
            amenities: cmd.amenities,
            telegram: cmd.telegram,
            phone: cmd.phone,
            publication: Publication::new(cmd.is_published),
            created_at: now,
            updated_at: now.coerce(),
        };
        tx.execute(Insert(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room)
    }
}

/// Error of [`CreateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture,
        domain::{room, telegram},
        query, Command as _, Query as _, Service,
    };

    use super::{CreateRoom, ExecutionError};

    #[tokio::test]
    async fn creates_room_in_property() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;

        let room = svc
            .execute(fixture::create_room(property.id))
            .await
            .unwrap();

        assert_eq!(room.property_id, property.id);
        assert!(!room.publication.is_listed());
        let rooms = svc
            .execute(query::room::ByProperty::by(property.id))
            .await
            .unwrap();
        assert_eq!(rooms.len(), 1);
    }

    #[tokio::test]
    async fn keeps_features_and_contacts() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;
        let feature = room::Feature {
            icon: room::FeatureIcon::new("Bath").unwrap(),
            label: room::FeatureLabel::new("Джакузи").unwrap(),
        };
        let amenities = ["Wi-Fi", "Кондиционер"]
            .map(|a| room::Amenity::new(a).unwrap())
            .to_vec();

        let created = svc
            .execute(CreateRoom {
                features: vec![feature.clone()],
                amenities: amenities.clone(),
                telegram: telegram::Handle::new("@suite"),
                ..fixture::create_room(property.id)
            })
            .await
            .unwrap();

        let rooms = svc
            .execute(query::room::ByProperty::by(property.id))
            .await
            .unwrap();
        assert_eq!(rooms[0].id, created.id);
        assert_eq!(rooms[0].features, [feature]);
        assert_eq!(rooms[0].amenities, amenities);
        assert_eq!(rooms[0].telegram, telegram::Handle::new("@suite"));
        assert!(rooms[0].phone.is_none());
    }

    #[tokio::test]
    async fn rejects_missing_property() {
        let svc = Service::in_memory();

        let err = svc
            .execute(fixture::create_room(404.into()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
        let rooms = svc
            .execute(query::room::ByProperty::by(404.into()))
            .await
            .unwrap();
        assert!(rooms.is_empty());
    }
}
