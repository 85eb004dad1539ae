//! [`Command`] for bootstrapping an [`Admin`].

use common::operations::{
    By, Commit, Insert, Reserve, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use crate::{
    domain::{admin, contact, credentials, Admin},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] ensuring an [`Admin`] with the provided
/// [`credentials::Login`] exists.
///
/// An existing [`Admin`] is left as is, so its password is never reset.
#[derive(Clone, Debug)]
pub struct EnsureAdmin {
    /// [`credentials::Login`] of the [`Admin`].
    pub login: credentials::Login,

    /// [`credentials::Password`] of a newly created [`Admin`].
    pub password: SecretBox<credentials::Password>,

    /// [`contact::FullName`] of a newly created [`Admin`].
    pub full_name: contact::FullName,
}

impl<Db, St, Ms> Command<EnsureAdmin> for Service<Db, St, Ms>
where
    Db: for<'l> Database<
            Select<By<Option<Admin>, &'l credentials::Login>>,
            Ok = Option<Admin>,
            Err = Traced<database::Error>,
        > + Database<
            Reserve<admin::Id>,
            Ok = admin::Id,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Admin>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Admin;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: EnsureAdmin) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EnsureAdmin {
            login,
            password,
            full_name,
        } = cmd;

        if let Some(admin) = self
            .database()
            .execute(Select(By::<Option<Admin>, _>::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        {
            return Ok(admin);
        }

        let id = self
            .database()
            .execute(Reserve::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let admin = Admin {
            id,
            login,
            password_hash: credentials::PasswordHash::new(
                password.expose_secret(),
            ),
            full_name,
            created_at: admin::CreationDateTime::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(admin.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(admin)
    }
}

/// Error of [`EnsureAdmin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::{contact, credentials},
        Command as _, Service,
    };

    use super::EnsureAdmin;

    fn admin(password: &str) -> EnsureAdmin {
        EnsureAdmin {
            login: credentials::Login::new("admin").unwrap(),
            password: SecretBox::new(Box::new(
                credentials::Password::new(password).unwrap(),
            )),
            full_name: contact::FullName::new("Администратор").unwrap(),
        }
    }

    #[tokio::test]
    async fn creates_once_and_keeps_password() {
        let svc = Service::in_memory();

        let created = svc.execute(admin("first")).await.unwrap();
        let existing = svc.execute(admin("second")).await.unwrap();

        assert_eq!(created.id, existing.id);
        assert!(existing
            .password_hash
            .verify(&credentials::Password::new("first").unwrap()));
    }
}
