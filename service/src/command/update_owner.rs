//! [`Command`] for updating an [`Owner`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use crate::{
    domain::{contact, credentials, owner, telegram, Owner},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for partially updating an [`Owner`].
///
/// [`None`] fields are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateOwner {
    /// ID of the [`Owner`] to update.
    pub owner_id: owner::Id,

    /// New [`contact::FullName`] of the [`Owner`].
    pub full_name: Option<contact::FullName>,

    /// New [`contact::Phone`] of the [`Owner`], or its removal.
    pub phone: Option<Option<contact::Phone>>,

    /// New [`telegram::Handle`] of the [`Owner`], or its removal.
    pub telegram: Option<Option<telegram::Handle>>,

    /// New activity state of the [`Owner`].
    pub is_active: Option<bool>,

    /// New [`credentials::Password`] of the [`Owner`].
    pub password: Option<SecretBox<credentials::Password>>,
}

impl UpdateOwner {
    /// Creates a new [`UpdateOwner`] [`Command`] changing nothing.
    #[must_use]
    pub const fn new(owner_id: owner::Id) -> Self {
        Self {
            owner_id,
            full_name: None,
            phone: None,
            telegram: None,
            is_active: None,
            password: None,
        }
    }
}

impl<Db, St, Ms> Command<UpdateOwner> for Service<Db, St, Ms>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Owner, owner::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Owner>, owner::Id>>,
            Ok = Option<Owner>,
            Err = Traced<database::Error>,
        > + Database<Update<Owner>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Owner;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateOwner) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let owner_id = cmd.owner_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Owner`.
        tx.execute(Lock(By::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut owner = tx
            .execute(Select(By::<Option<Owner>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OwnerNotExists(owner_id))
            .map_err(tracerr::wrap!())?;

        if let Some(password) = &cmd.password {
            owner.password_hash =
                credentials::PasswordHash::new(password.expose_secret());
        }
        assign!(owner <- cmd: full_name, phone, telegram, is_active);

        tx.execute(Update(owner.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(owner)
    }
}

/// Error of [`UpdateOwner`] [`Command`] execution.
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
    use secrecy::SecretBox;

    use crate::{
        command::fixture,
        domain::{contact, credentials, telegram},
        Command as _, Service,
    };

    use super::{ExecutionError, UpdateOwner};

    #[tokio::test]
    async fn updates_only_provided_fields() {
        let svc = Service::in_memory();
        let owner = fixture::owner(&svc, "owner9").await;
        drop(
            svc.execute(UpdateOwner {
                telegram: Some(telegram::Handle::new("@foo")),
                ..UpdateOwner::new(owner.id)
            })
            .await
            .unwrap(),
        );

        let updated = svc
            .execute(UpdateOwner {
                full_name: contact::FullName::new("C D"),
                is_active: Some(false),
                password: Some(SecretBox::new(Box::new(
                    credentials::Password::new("y").unwrap(),
                ))),
                ..UpdateOwner::new(owner.id)
            })
            .await
            .unwrap();

        assert_eq!(AsRef::<str>::as_ref(&updated.full_name), "C D");
        assert!(!updated.is_active);
        assert_eq!(updated.telegram, telegram::Handle::new("@foo"));
        assert_eq!(updated.login, owner.login);
        assert!(updated
            .password_hash
            .verify(&credentials::Password::new("y").unwrap()));
    }

    #[tokio::test]
    async fn clears_optional_fields_with_null() {
        let svc = Service::in_memory();
        let owner = fixture::owner(&svc, "owner9").await;
        drop(
            svc.execute(UpdateOwner {
                phone: Some(contact::Phone::new("+7 900 000-00-00")),
                ..UpdateOwner::new(owner.id)
            })
            .await
            .unwrap(),
        );

        let updated = svc
            .execute(UpdateOwner {
                phone: Some(None),
                ..UpdateOwner::new(owner.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.phone, None);
    }

    #[tokio::test]
    async fn fails_on_missing_owner() {
        let svc = Service::in_memory();

        let err = svc
            .execute(UpdateOwner::new(5.into()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::OwnerNotExists(_)));
    }
}
