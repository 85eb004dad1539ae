//! [`Command`] for deleting a [`Room`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Room`] permanently.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteRoom {
    /// ID of the [`Room`] to delete.
    pub room_id: room::Id,
}

impl<Db, St, Ms> Command<DeleteRoom> for Service<Db, St, Ms>
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
        > + Database<Delete<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteRoom { room_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let room = tx
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Room, _>::new(room_id)))
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

/// Error of [`DeleteRoom`] [`Command`] execution.
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
    use crate::{command::fixture, query, Command as _, Query as _, Service};

    use super::{DeleteRoom, ExecutionError};

    #[tokio::test]
    async fn deletes_room_and_unblocks_property() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;
        let room = fixture::room(&svc, property.id).await;

        let deleted = svc.execute(DeleteRoom::from(room.id)).await.unwrap();

        assert_eq!(deleted.id, room.id);
        let rooms = svc
            .execute(query::room::ByProperty::by(property.id))
            .await
            .unwrap();
        assert!(rooms.is_empty());
        svc.execute(crate::command::DeleteProperty::from(property.id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fails_on_missing_room() {
        let svc = Service::in_memory();

        let err = svc
            .execute(DeleteRoom {
                room_id: 404.into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RoomNotExists(_)));
    }
}
