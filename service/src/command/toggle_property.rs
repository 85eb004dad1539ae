//! [`Command`] for toggling a [`Publication`] flag of a [`Property`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Publication;
use crate::{
    domain::{
        property,
        publication::{Flag, StaleFlag},
        Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for negating a single [`Publication`] [`Flag`] of a
/// [`Property`], provided the caller still sees its `current` value.
#[derive(Clone, Copy, Debug)]
pub struct ToggleProperty {
    /// ID of the [`Property`] to toggle the [`Flag`] of.
    pub property_id: property::Id,

    /// [`Flag`] to toggle.
    pub flag: Flag,

    /// Value of the [`Flag`] observed by the caller.
    pub current: bool,
}

impl<Db, St, Ms> Command<ToggleProperty> for Service<Db, St, Ms>
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
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleProperty {
            property_id,
            flag,
            current,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        _ = property
            .publication
            .toggle(flag, current)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        property.updated_at = property::ModificationDateTime::now();

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`ToggleProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Flag`] has been changed by someone else.
    #[display("Stale state: {_0}")]
    StaleState(StaleFlag),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture,
        domain::publication::{Flag, Status},
        query,
        read::catalog,
        Command as _, Query as _, Service,
    };

    use super::{ExecutionError, ToggleProperty};

    #[tokio::test]
    async fn double_publish_toggle_restores_state() {
        let svc = Service::in_memory();
        let draft = fixture::property(&svc).await;

        let published = svc
            .execute(ToggleProperty {
                property_id: draft.id,
                flag: Flag::Published,
                current: false,
            })
            .await
            .unwrap();
        let unpublished = svc
            .execute(ToggleProperty {
                property_id: draft.id,
                flag: Flag::Published,
                current: true,
            })
            .await
            .unwrap();

        assert_eq!(published.publication.status(), Status::Active);
        assert_eq!(unpublished.publication, draft.publication);
    }

    #[tokio::test]
    async fn archiving_keeps_publish_flag_and_hides_from_catalog() {
        let svc = Service::in_memory();
        let listed = fixture::listed_property(&svc).await;

        let archived = svc
            .execute(ToggleProperty {
                property_id: listed.id,
                flag: Flag::Archived,
                current: false,
            })
            .await
            .unwrap();

        assert!(archived.publication.is_published);
        assert!(archived.publication.is_archived);
        let public = svc
            .execute(query::catalog::List(catalog::Filter::default()))
            .await
            .unwrap();
        assert!(public.is_empty());
    }

    #[tokio::test]
    async fn stale_toggle_changes_nothing() {
        let svc = Service::in_memory();
        let listed = fixture::listed_property(&svc).await;

        let err = svc
            .execute(ToggleProperty {
                property_id: listed.id,
                flag: Flag::Published,
                current: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::StaleState(_)));
        let stored = svc
            .execute(query::property::ById::by(listed.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.property.publication, listed.publication);
    }

    #[tokio::test]
    async fn fails_on_missing_property() {
        let svc = Service::in_memory();

        let err = svc
            .execute(ToggleProperty {
                property_id: 404.into(),
                flag: Flag::Archived,
                current: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
    }
}
