//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::session::Token;
use crate::{
    domain::{
        credentials,
        session::{self, Role, Subject},
        Admin, Owner, Session,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by account credentials.
#[derive(Clone, Debug)]
pub struct CreateSession {
    /// [`Role`] of the account to sign in as.
    pub role: Role,

    /// [`credentials::Login`] of the account.
    pub login: credentials::Login,

    /// [`credentials::Password`] of the account.
    pub password: SecretBox<credentials::Password>,
}

/// Output of [`CreateSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`Account`] whose [`Session`] has been created.
    pub account: Account,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

/// Account a [`Session`] is created for.
#[derive(Clone, Debug)]
pub enum Account {
    /// [`Admin`] account.
    Admin(Admin),

    /// [`Owner`] account.
    Owner(Owner),
}

impl<Db, St, Ms> Command<CreateSession> for Service<Db, St, Ms>
where
    Db: for<'l> Database<
            Select<By<Option<Admin>, &'l credentials::Login>>,
            Ok = Option<Admin>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Owner>, &'l credentials::Login>>,
            Ok = Option<Owner>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSession {
            role,
            login,
            password,
        } = cmd;

        let (account, subject, ttl) = match role {
            Role::Admin => {
                let admin = self
                    .database()
                    .execute(Select(By::<Option<Admin>, _>::new(&login)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .filter(|a| {
                        a.password_hash.verify(password.expose_secret())
                    })
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                let subject = Subject::Admin(admin.id);
                (Account::Admin(admin), subject, self.config.admin_session_ttl)
            }
            Role::Owner => {
                let owner = self
                    .database()
                    .execute(Select(By::<Option<Owner>, _>::new(&login)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .filter(|o| {
                        o.password_hash.verify(password.expose_secret())
                    })
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;
                if !owner.is_active {
                    return Err(tracerr::new!(E::AccountDisabled));
                }

                let subject = Subject::Owner(owner.id);
                (Account::Owner(owner), subject, self.config.owner_session_ttl)
            }
        };

        let expires_at = (DateTime::now() + ttl).coerce();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Session {
                subject,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            account,
            expires_at,
        })
    }
}

/// Error of [`CreateSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`CreateSession`] contains wrong credentials.
    #[display("Wrong credentials")]
    WrongCredentials,

    /// [`Owner`] is deactivated and may not sign in.
    #[display("Account is disabled")]
    AccountDisabled,
}
