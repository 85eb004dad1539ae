//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::{owner, session, Session},
};
use tokio::sync::OnceCell;

use crate::{define_error, AsError, Error, Service};

/// Application context of a single HTTP request.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Current [`Session`].
    current_session: OnceCell<Session>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid or expired;
    /// - the [`Owner`] of the [`Session`] is deactivated.
    ///
    /// [`Owner`]: service::domain::Owner
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.current_session
            .get_or_try_init(|| self.do_authentication())
            .await
            .copied()
    }

    /// Returns the current [`Session`] if it belongs to an [`Admin`].
    ///
    /// # Errors
    ///
    /// Errors if the current [`Session`] is missing, invalid or doesn't
    /// belong to an [`Admin`].
    ///
    /// [`Admin`]: service::domain::Admin
    pub async fn admin_session(&self) -> Result<Session, Error> {
        let session = self.current_session().await?;
        match session.role() {
            session::Role::Admin => Ok(session),
            session::Role::Owner => Err(AuthError::Forbidden.into()),
        }
    }

    /// Ensures the current [`Session`] may access the data of the [`Owner`]
    /// with the provided ID.
    ///
    /// # Errors
    ///
    /// Errors if the current [`Session`] is missing, invalid or belongs to
    /// another [`Owner`].
    ///
    /// [`Owner`]: service::domain::Owner
    pub async fn owner_session(
        &self,
        owner_id: owner::Id,
    ) -> Result<Session, Error> {
        let session = self.current_session().await?;
        if session.may_access(owner_id) {
            Ok(session)
        } else {
            Err(AuthError::Forbidden.into())
        }
    }

    /// Performs the [`Session`] authentication.
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn do_authentication(&self) -> Result<Session, Error> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        match res {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                self.service
                    .execute(command::AuthorizeSession { token })
                    .await
                    .map_err(AsError::into_error)
            }
            Err(e) => {
                if e.is_missing() {
                    Err(AuthError::AuthorizationRequired.into())
                } else {
                    Err(e.into_error())
                }
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        Ok(Self {
            service,
            parts: parts.clone(),
            current_session: OnceCell::new(),
        })
    }
}

impl AsError for command::authorize_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::OwnerNotExists(_) => {
                Some(AuthError::InvalidToken.into())
            }
            Self::AccountDisabled => Some(AuthError::AccountDisabled.into()),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization token is invalid or expired"]
        InvalidToken,

        #[code = "ACCOUNT_DISABLED"]
        #[status = FORBIDDEN]
        #[message = "Account is disabled"]
        AccountDisabled,

        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Access denied"]
        Forbidden,
    }
}
