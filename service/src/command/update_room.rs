//! [`Command`] for updating a [`Room`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contact, image,
        pricing::{MinHours, Price},
        property, room, telegram, Room,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for partially updating a [`Room`].
///
/// Neither the [`Property`] it belongs to, nor its [`Publication`] may be
/// changed this way.
///
/// [`Property`]: crate::domain::Property
/// [`Publication`]: crate::domain::Publication
#[derive(Clone, Debug)]
pub struct UpdateRoom {
    /// ID of the [`Room`] to update.
    pub room_id: room::Id,

    /// New [`room::Name`].
    pub name: Option<room::Name>,

    /// New [`Price`] of a single hour.
    pub price_per_hour: Option<Price>,

    /// New floor area, or its removal.
    pub area: Option<Option<property::Area>>,

    /// New [`room::Description`], or its removal.
    pub description: Option<Option<room::Description>>,

    /// New [`MinHours`] of a rent.
    pub min_hours: Option<MinHours>,

    /// New photos.
    pub photos: Option<Vec<image::Url>>,

    /// New [`room::Feature`]s, replacing the existing ones.
    pub features: Option<Vec<room::Feature>>,

    /// New [`room::Amenity`]s, replacing the existing ones.
    pub amenities: Option<Vec<room::Amenity>>,

    /// New [`telegram::Handle`], or its removal.
    pub telegram: Option<Option<telegram::Handle>>,

    /// New [`contact::Phone`], or its removal.
    pub phone: Option<Option<contact::Phone>>,
}

impl UpdateRoom {
    /// Creates a new [`UpdateRoom`] [`Command`] changing nothing.
    #[must_use]
    pub const fn new(room_id: room::Id) -> Self {
        Self {
            room_id,
            name: None,
            price_per_hour: None,
            area: None,
            description: None,
            min_hours: None,
            photos: None,
            features: None,
            amenities: None,
            telegram: None,
            phone: None,
        }
    }
}

impl<Db, St, Ms> Command<UpdateRoom> for Service<Db, St, Ms>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Room, room::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Update<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(cmd.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(cmd.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(cmd.room_id))
            .map_err(tracerr::wrap!())?;

        assign!(room <- cmd:
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
        );
        room.updated_at = room::ModificationDateTime::now();

        tx.execute(Update(room.clone()))
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

/// Error of [`UpdateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Room`] doesn't exist.
    #[display("`Room(id: {_0})` does not exist")]
    #[from(ignore)]
    RoomNotExists(#[error(not(source))] room::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, CreateRoom},
        domain::{contact, image, room},
        Command as _, Service,
    };

    use super::{ExecutionError, UpdateRoom};

    #[tokio::test]
    async fn updates_provided_fields() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;
        let room = fixture::room(&svc, property.id).await;
        let photo = image::Url::new("/images/room.jpg").unwrap();

        let updated = svc
            .execute(UpdateRoom {
                name: room::Name::new("Стандарт"),
                description: Some(room::Description::new("Двуспальная")),
                photos: Some(vec![photo.clone()]),
                ..UpdateRoom::new(room.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.name.to_string(), "Стандарт");
        assert!(updated.description.is_some());
        assert_eq!(updated.photos, [photo]);
        assert_eq!(updated.property_id, property.id);
        assert_eq!(updated.price_per_hour, room.price_per_hour);
    }

    #[tokio::test]
    async fn replaces_amenities_and_clears_contacts() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;
        let room = svc
            .execute(CreateRoom {
                amenities: vec![room::Amenity::new("Wi-Fi").unwrap()],
                phone: contact::Phone::new("+7 900 000-00-00"),
                ..fixture::create_room(property.id)
            })
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateRoom {
                amenities: Some(vec![room::Amenity::new("Сауна").unwrap()]),
                phone: Some(None),
                ..UpdateRoom::new(room.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.amenities, [room::Amenity::new("Сауна").unwrap()]);
        assert!(updated.phone.is_none());
        assert_eq!(updated.features, room.features);
    }

    #[tokio::test]
    async fn fails_on_missing_room() {
        let svc = Service::in_memory();

        let err = svc.execute(UpdateRoom::new(404.into())).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RoomNotExists(_)));
    }
}
