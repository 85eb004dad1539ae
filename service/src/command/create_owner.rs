//! [`Command`] for creating a new [`Owner`].

use common::operations::{
    By, Commit, Insert, Reserve, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use crate::{
    domain::{contact, credentials, owner, telegram, Owner},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Owner`].
#[derive(Clone, Debug)]
pub struct CreateOwner {
    /// [`credentials::Login`] of a new [`Owner`].
    pub login: credentials::Login,

    /// [`credentials::Password`] of a new [`Owner`].
    pub password: SecretBox<credentials::Password>,

    /// [`contact::FullName`] of a new [`Owner`].
    pub full_name: contact::FullName,

    /// [`contact::Phone`] of a new [`Owner`].
    pub phone: Option<contact::Phone>,

    /// [`telegram::Handle`] of a new [`Owner`].
    pub telegram: Option<telegram::Handle>,
}

impl CreateOwner {
    /// Name of the constraint guarding [`Owner`] logins uniqueness.
    const LOGIN_CONSTRAINT: &'static str = "owners_login_unique";
}

impl<Db, St, Ms> Command<CreateOwner> for Service<Db, St, Ms>
where
    Db: for<'l> Database<
            Select<By<Option<Owner>, &'l credentials::Login>>,
            Ok = Option<Owner>,
            Err = Traced<database::Error>,
        > + Database<
            Reserve<owner::Id>,
            Ok = owner::Id,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Owner>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::owner::Summary;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateOwner) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateOwner {
            login,
            password,
            full_name,
            phone,
            telegram,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::<Option<Owner>, _>::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::LoginOccupied(login)));
        }

        let id = self
            .database()
            .execute(Reserve::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let owner = Owner {
            id,
            login,
            password_hash: credentials::PasswordHash::new(
                password.expose_secret(),
            ),
            full_name,
            phone,
            telegram,
            is_active: true,
            created_at: owner::CreationDateTime::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Err(e) = tx.execute(Insert(owner.clone())).await {
            // Someone has taken the login since the check above.
            return Err(if e.as_ref().is_unique_violation(
                CreateOwner::LOGIN_CONSTRAINT,
            ) {
                tracerr::new!(E::LoginOccupied(owner.login))
            } else {
                tracerr::map_from_and_wrap!(=> E)(e)
            });
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(read::owner::Summary {
            owner,
            properties_count: 0,
        })
    }
}

/// Error of [`CreateOwner`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`credentials::Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    #[from(ignore)]
    LoginOccupied(#[error(not(source))] credentials::Login),
}

#[cfg(test)]
mod spec {
    use crate::{command::fixture, domain::credentials, Command as _, Service};

    use super::ExecutionError;

    #[tokio::test]
    async fn creates_active_owner_without_objects() {
        let svc = Service::in_memory();

        let created =
            svc.execute(fixture::create_owner("owner9")).await.unwrap();

        assert!(created.owner.is_active);
        assert_eq!(created.properties_count, 0);
        assert_eq!(created.owner.login.to_string(), "owner9");
        assert!(created
            .owner
            .password_hash
            .verify(&credentials::Password::new("x").unwrap()));
    }

    #[tokio::test]
    async fn rejects_occupied_login() {
        let svc = Service::in_memory();
        drop(fixture::owner(&svc, "owner9").await);

        let err = svc
            .execute(fixture::create_owner("owner9"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::LoginOccupied(_)));
    }
}
