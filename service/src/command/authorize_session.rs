//! [`Command`] for authorizing a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        owner,
        session::{self, Subject},
        Owner, Session,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`session::Token`].
///
/// Checks the signature and the expiration of the [`session::Token`], and
/// whether the [`Owner`] behind it is still allowed in.
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, St, Ms> Command<AuthorizeSession> for Service<Db, St, Ms>
where
    Db: Database<
        Select<By<Option<Owner>, owner::Id>>,
        Ok = Option<Owner>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        if let Subject::Owner(owner_id) = session.subject {
            let owner = self
                .database()
                .execute(Select(By::<Option<Owner>, _>::new(owner_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::OwnerNotExists(owner_id))
                .map_err(tracerr::wrap!())?;
            if !owner.is_active {
                return Err(tracerr::new!(E::AccountDisabled));
            }
        }

        Ok(session)
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`Owner`] the [`Session`] belongs to does not exist.
    #[display("`Owner(id: {_0})` does not exist")]
    #[from(ignore)]
    OwnerNotExists(#[error(not(source))] owner::Id),

    /// [`Owner`] the [`Session`] belongs to has been deactivated.
    #[display("Account is disabled")]
    AccountDisabled,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        command::{fixture, UpdateOwner},
        domain::{
            session::{ExpirationDateTime, Subject, Token},
            Session,
        },
        Command as _, Service,
    };

    use super::{AuthorizeSession, ExecutionError};

    fn token(svc: &fixture::Memory, session: &Session) -> Token {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            session,
            &svc.config().jwt_encoding_key,
        )
        .unwrap();
        token.parse().unwrap()
    }

    #[tokio::test]
    async fn authorizes_admin_token() {
        let svc = Service::in_memory();
        let admin = Session {
            subject: Subject::Admin(1.into()),
            expires_at: ExpirationDateTime::now()
                + Duration::from_secs(60 * 60),
        };

        let session = svc
            .execute(AuthorizeSession {
                token: token(&svc, &admin),
            })
            .await
            .unwrap();

        assert_eq!(session.subject, admin.subject);
    }

    #[tokio::test]
    async fn authorizes_active_owner_token() {
        let svc = Service::in_memory();
        let owner = fixture::owner(&svc, "owner7").await;
        let session = Session {
            subject: Subject::Owner(owner.id),
            expires_at: ExpirationDateTime::now()
                + Duration::from_secs(60 * 60),
        };

        let authorized = svc
            .execute(AuthorizeSession {
                token: token(&svc, &session),
            })
            .await
            .unwrap();

        assert_eq!(authorized.subject, Subject::Owner(owner.id));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = Service::in_memory();
        let admin = Session {
            subject: Subject::Admin(1.into()),
            expires_at: ExpirationDateTime::now()
                - Duration::from_secs(60 * 60),
        };

        let err = svc
            .execute(AuthorizeSession {
                token: token(&svc, &admin),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_forged_token() {
        let svc = Service::in_memory();

        let err = svc
            .execute(AuthorizeSession {
                token: "not.a.token".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_deactivated_owner() {
        let svc = Service::in_memory();
        let owner = fixture::owner(&svc, "owner9").await;
        let session = Session {
            subject: Subject::Owner(owner.id),
            expires_at: ExpirationDateTime::now()
                + Duration::from_secs(60 * 60),
        };
        drop(
            svc.execute(UpdateOwner {
                is_active: Some(false),
                ..UpdateOwner::new(owner.id)
            })
            .await
            .unwrap(),
        );

        let err = svc
            .execute(AuthorizeSession {
                token: token(&svc, &session),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AccountDisabled));
    }
}
