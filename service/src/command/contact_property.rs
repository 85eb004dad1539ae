//! [`Command`] for contacting the [`Owner`] of a listed [`Property`].
//!
//! [`Owner`]: crate::domain::Owner

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    domain::{property, telegram},
    infra::{database, Database},
    read::property::{Counter, Entry, Hit, HitDateTime, Stats},
    Service,
};

use super::Command;

/// [`Command`] resolving a [`telegram::DeepLink`] of a listed [`Property`]
/// and accounting the click.
#[derive(Clone, Copy, Debug, From)]
pub struct ContactProperty {
    /// ID of the [`Property`] to contact about.
    pub property_id: property::Id,
}

/// Output of [`ContactProperty`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`telegram::DeepLink`] to open.
    pub link: telegram::DeepLink,

    /// [`Stats`] of the [`Property`] with the click accounted.
    pub stats: Stats,
}

impl<Db, St, Ms> Command<ContactProperty> for Service<Db, St, Ms>
where
    Db: Database<
            Select<By<Option<Entry>, property::Id>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<Insert<Hit>, Ok = Stats, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ContactProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ContactProperty { property_id } = cmd;

        let entry = self
            .database()
            .execute(Select(By::<Option<Entry>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|e| e.property.publication.is_listed())
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        let link = entry
            .property
            .telegram
            .as_ref()
            .map(telegram::Handle::deep_link)
            .ok_or(E::NoContact(property_id))
            .map_err(tracerr::wrap!())?;

        let stats = self
            .database()
            .execute(Insert(Hit {
                property_id,
                counter: Counter::Click,
                at: HitDateTime::now(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { link, stats })
    }
}

/// Error of [`ContactProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Listed [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` is not listed")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Property`] has no [`telegram::Handle`] to contact.
    #[display("`Property(id: {_0})` has no contact")]
    #[from(ignore)]
    NoContact(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, UpdateProperty},
        domain::telegram,
        query, Command as _, Query as _, Service,
    };

    use super::{ContactProperty, ExecutionError};

    #[tokio::test]
    async fn links_to_handle_without_at_and_counts_click() {
        let svc = Service::in_memory();
        let property = fixture::listed_property(&svc).await;
        drop(
            svc.execute(UpdateProperty {
                telegram: Some(telegram::Handle::new("@foo")),
                ..UpdateProperty::new(property.id)
            })
            .await
            .unwrap(),
        );

        let out = svc
            .execute(ContactProperty::from(property.id))
            .await
            .unwrap();

        assert_eq!(out.link.to_string(), "https://t.me/foo");
        assert_eq!(out.stats.clicks, 1);
        assert_eq!(out.stats.views, 0);
        assert!(out.stats.last_click_at.is_some());
    }

    #[tokio::test]
    async fn leaves_counter_untouched_without_contact() {
        let svc = Service::in_memory();
        let property = fixture::listed_property(&svc).await;

        let err = svc
            .execute(ContactProperty::from(property.id))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoContact(_)));
        let entry = svc
            .execute(query::property::ById::by(property.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.stats.clicks, 0);
    }

    #[tokio::test]
    async fn ignores_unlisted() {
        let svc = Service::in_memory();
        let draft = fixture::property(&svc).await;

        let err = svc
            .execute(ContactProperty::from(draft.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
    }
}
