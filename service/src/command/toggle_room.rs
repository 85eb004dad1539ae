//! [`Command`] for toggling a [`Publication`] flag of a [`Room`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Publication;
use crate::{
    domain::{
        publication::{Flag, StaleFlag},
        room, Room,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for negating a single [`Publication`] [`Flag`] of a
/// [`Room`], provided the caller still sees its `current` value.
#[derive(Clone, Copy, Debug)]
pub struct ToggleRoom {
    /// ID of the [`Room`] to toggle the [`Flag`] of.
    pub room_id: room::Id,

    /// [`Flag`] to toggle.
    pub flag: Flag,

    /// Value of the [`Flag`] observed by the caller.
    pub current: bool,
}

impl<Db, St, Ms> Command<ToggleRoom> for Service<Db, St, Ms>
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

    async fn execute(&self, cmd: ToggleRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleRoom {
            room_id,
            flag,
            current,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        _ = room
            .publication
            .toggle(flag, current)
            .map_err(tracerr::from_and_wrap!(=> E))?;
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

/// Error of [`ToggleRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Room`] doesn't exist.
    #[display("`Room(id: {_0})` does not exist")]
    #[from(ignore)]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Flag`] has been changed by someone else.
    #[display("Stale state: {_0}")]
    StaleState(StaleFlag),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture,
        domain::publication::{Flag, Status},
        query, Command as _, Query as _, Service,
    };

    use super::{ExecutionError, ToggleRoom};

    #[tokio::test]
    async fn lists_room_of_listed_property_once_published() {
        let svc = Service::in_memory();
        let property = fixture::listed_property(&svc).await;
        let room = fixture::room(&svc, property.id).await;

        let published = svc
            .execute(ToggleRoom {
                room_id: room.id,
                flag: Flag::Published,
                current: false,
            })
            .await
            .unwrap();

        assert_eq!(published.publication.status(), Status::Active);
        let details = svc
            .execute(query::catalog::Details(property.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.rooms.len(), 1);
    }

    #[tokio::test]
    async fn stale_toggle_is_rejected() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;
        let room = fixture::room(&svc, property.id).await;

        let err = svc
            .execute(ToggleRoom {
                room_id: room.id,
                flag: Flag::Archived,
                current: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::StaleState(_)));
        let stored = svc
            .execute(query::room::ById::by(room.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.publication, room.publication);
    }
}
