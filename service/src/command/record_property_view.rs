//! [`Command`] for accounting a view of a listed [`Property`].

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    domain::property,
    infra::{database, Database},
    read::property::{Counter, Entry, Hit, HitDateTime, Stats},
    Service,
};

use super::Command;

/// [`Command`] for incrementing the views counter of a listed [`Property`].
#[derive(Clone, Copy, Debug, From)]
pub struct RecordPropertyView {
    /// ID of the viewed [`Property`].
    pub property_id: property::Id,
}

impl<Db, St, Ms> Command<RecordPropertyView> for Service<Db, St, Ms>
where
    Db: Database<
            Select<By<Option<Entry>, property::Id>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<Insert<Hit>, Ok = Stats, Err = Traced<database::Error>>,
{
    type Ok = Stats;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordPropertyView,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPropertyView { property_id } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Entry>, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|e| e.property.publication.is_listed())
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        self.database()
            .execute(Insert(Hit {
                property_id,
                counter: Counter::View,
                at: HitDateTime::now(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RecordPropertyView`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Listed [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` is not listed")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{command::fixture, Command as _, Service};

    use super::{ExecutionError, RecordPropertyView};

    #[tokio::test]
    async fn increments_views_by_one() {
        let svc = Service::in_memory();
        let property = fixture::listed_property(&svc).await;

        let first = svc
            .execute(RecordPropertyView::from(property.id))
            .await
            .unwrap();
        let second = svc
            .execute(RecordPropertyView::from(property.id))
            .await
            .unwrap();

        assert_eq!(first.views, 1);
        assert_eq!(second.views, 2);
        assert_eq!(second.clicks, 0);
        assert!(second.last_view_at >= first.last_view_at);
    }

    #[tokio::test]
    async fn ignores_unlisted() {
        let svc = Service::in_memory();
        let draft = fixture::property(&svc).await;

        let err = svc
            .execute(RecordPropertyView::from(draft.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
    }
}
