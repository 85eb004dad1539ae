//! [`Command`] for updating a [`Property`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        image, owner,
        pricing::{MinHours, Price},
        property, telegram, Owner, Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for partially updating a [`Property`].
///
/// [`None`] fields are left untouched, while the [`Publication`] flags are
/// changed by the [`ToggleProperty`] only.
///
/// [`Publication`]: crate::domain::Publication
/// [`ToggleProperty`]: super::ToggleProperty
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to update.
    pub property_id: property::Id,

    /// New [`Owner`] of the [`Property`], or its unlinking.
    pub owner_id: Option<Option<owner::Id>>,

    /// New [`property::Category`].
    pub category: Option<property::Category>,

    /// New [`property::Name`].
    pub name: Option<property::Name>,

    /// New [`property::Description`], or its removal.
    pub description: Option<Option<property::Description>>,

    /// New [`property::Address`].
    pub address: Option<property::Address>,

    /// New [`property::TransitLabel`], or its removal.
    pub transit: Option<Option<property::TransitLabel>>,

    /// New [`property::Area`], or its removal.
    pub area: Option<Option<property::Area>>,

    /// New [`property::Capacity`], or its removal.
    pub capacity: Option<Option<property::Capacity>>,

    /// New [`Price`] of a single hour.
    pub price_per_hour: Option<Price>,

    /// New [`MinHours`] of a rent.
    pub min_hours: Option<MinHours>,

    /// New [`property::Coordinates`], or their removal.
    pub location: Option<Option<property::Coordinates>>,

    /// New cover image, or its removal.
    pub cover_image: Option<Option<image::Url>>,

    /// New photos.
    pub photos: Option<Vec<image::Url>>,

    /// New [`telegram::Handle`], or its removal.
    pub telegram: Option<Option<telegram::Handle>>,
}

impl UpdateProperty {
    /// Creates a new [`UpdateProperty`] [`Command`] changing nothing.
    #[must_use]
    pub const fn new(property_id: property::Id) -> Self {
        Self {
            property_id,
            owner_id: None,
            category: None,
            name: None,
            description: None,
            address: None,
            transit: None,
            area: None,
            capacity: None,
            price_per_hour: None,
            min_hours: None,
            location: None,
            cover_image: None,
            photos: None,
            telegram: None,
        }
    }
}

impl<Db, St, Ms> Command<UpdateProperty> for Service<Db, St, Ms>
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
            Select<By<Option<Owner>, owner::Id>>,
            Ok = Option<Owner>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(cmd.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(cmd.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(cmd.property_id))
            .map_err(tracerr::wrap!())?;

        if let Some(Some(owner_id)) = cmd.owner_id {
            drop(
                tx.execute(Select(By::<Option<Owner>, _>::new(owner_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::OwnerNotExists(owner_id))
                    .map_err(tracerr::wrap!())?,
            );
        }

        assign!(property <- cmd:
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
        );
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

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// New [`Owner`] doesn't exist.
    #[display("`Owner(id: {_0})` does not exist")]
    #[from(ignore)]
    OwnerNotExists(#[error(not(source))] owner::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture,
        domain::{property, telegram},
        Command as _, Service,
    };

    use super::{ExecutionError, UpdateProperty};

    #[tokio::test]
    async fn updates_provided_fields_and_keeps_flags() {
        let svc = Service::in_memory();
        let listed = fixture::listed_property(&svc).await;

        let updated = svc
            .execute(UpdateProperty {
                address: property::Address::new("Арбат, 1"),
                transit: Some(property::TransitLabel::new("Смоленская")),
                telegram: Some(telegram::Handle::new("@foo")),
                ..UpdateProperty::new(listed.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.address.to_string(), "Арбат, 1");
        assert_eq!(
            updated.transit.map(|t| t.to_string()).as_deref(),
            Some("Смоленская"),
        );
        assert_eq!(updated.name, listed.name);
        assert_eq!(updated.publication, listed.publication);
        assert!(updated.updated_at >= listed.updated_at);
    }

    #[tokio::test]
    async fn reassigns_and_unlinks_owner() {
        let svc = Service::in_memory();
        let owner = fixture::owner(&svc, "owner9").await;
        let property = fixture::property(&svc).await;

        let owned = svc
            .execute(UpdateProperty {
                owner_id: Some(Some(owner.id)),
                ..UpdateProperty::new(property.id)
            })
            .await
            .unwrap();
        let unlinked = svc
            .execute(UpdateProperty {
                owner_id: Some(None),
                ..UpdateProperty::new(property.id)
            })
            .await
            .unwrap();

        assert_eq!(owned.owner_id, Some(owner.id));
        assert_eq!(unlinked.owner_id, None);
    }

    #[tokio::test]
    async fn rejects_missing_entities() {
        let svc = Service::in_memory();
        let property = fixture::property(&svc).await;

        let missing_property = svc
            .execute(UpdateProperty::new(404.into()))
            .await
            .unwrap_err();
        let missing_owner = svc
            .execute(UpdateProperty {
                owner_id: Some(Some(404.into())),
                ..UpdateProperty::new(property.id)
            })
            .await
            .unwrap_err();

        assert!(matches!(
            missing_property.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
        assert!(matches!(
            missing_owner.as_ref(),
            ExecutionError::OwnerNotExists(_),
        ));
    }
}
