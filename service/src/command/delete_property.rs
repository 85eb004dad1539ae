//! [`Command`] for deleting a [`Property`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Property, Room},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Property`] having no [`Room`]s.
///
/// Archived [`Room`]s count too.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to delete.
    pub property_id: property::Id,
}

impl<Db, St, Ms> Command<DeleteProperty> for Service<Db, St, Ms>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Room>, property::Id>>,
            Ok = Vec<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty { property_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Rooms are created under the same lock, so none may sneak in.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        drop(
            tx.execute(Select(By::<Option<Property>, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        let rooms = tx
            .execute(Select(By::<Vec<Room>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !rooms.is_empty() {
            return Err(tracerr::new!(E::HasRooms(property_id)));
        }

        tx.execute(Delete(By::<Property, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Property`] still has [`Room`]s.
    #[display("`Property(id: {_0})` has rooms")]
    #[from(ignore)]
    HasRooms(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, ToggleRoom},
        domain::publication::Flag,
        query, Command as _, Query as _, Service,
    };

    use super::{DeleteProperty, ExecutionError};

    #[tokio::test]
    async fn deletes_property_without_rooms() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;

        svc.execute(DeleteProperty::from(property.id)).await.unwrap();

        let stored = svc
            .execute(query::property::ById::by(property.id))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn rejects_property_with_archived_rooms() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;
        let room = fixture::room(&svc, property.id).await;
        drop(
            svc.execute(ToggleRoom {
                room_id: room.id,
                flag: Flag::Archived,
                current: false,
            })
            .await
            .unwrap(),
        );

        let err = svc
            .execute(DeleteProperty::from(property.id))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::HasRooms(_)));
        let stored = svc
            .execute(query::property::ById::by(property.id))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn fails_on_missing_property() {
        let svc = Service::in_memory();

        let err = svc
            .execute(DeleteProperty {
                property_id: 404.into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
    }
}
