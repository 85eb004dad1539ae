//! Authentication definitions.

use common::datetime::serde::rfc3339;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, create_session::Account, Command as _},
    domain::{admin, contact, credentials, owner, session},
};

use crate::{
    api::{self, Json},
    context::AuthError,
    define_error,
    form::{Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// Credentials submitted to sign in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    username: Option<Raw>,
    password: Option<Raw>,
}

impl Credentials {
    /// Parses these [`Credentials`] into a [`command::CreateSession`] for
    /// the provided [`session::Role`].
    fn into_command(
        self,
        role: session::Role,
    ) -> Result<command::CreateSession, ValidationError> {
        let mut form = Form::default();
        let login = form.required("username", self.username);
        let password = form.required("password", self.password);

        form.build(|| {
            let password: credentials::Password = password?;
            Ok(command::CreateSession {
                role,
                login: login?,
                password: SecretBox::init_with(move || password),
            })
        })
    }
}

/// ID of the signed in account.
#[derive(Clone, Copy, Debug, Serialize)]
pub enum AccountId {
    /// ID of an [`Admin`].
    ///
    /// [`Admin`]: service::domain::Admin
    #[serde(rename = "admin_id")]
    Admin(admin::Id),

    /// ID of an [`Owner`].
    ///
    /// [`Owner`]: service::domain::Owner
    #[serde(rename = "owner_id")]
    Owner(owner::Id),
}

/// Created session.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    /// Bearer token of the session.
    pub token: String,

    /// ID of the signed in account.
    #[serde(flatten)]
    pub account_id: AccountId,

    /// Full name of the signed in account.
    pub full_name: contact::FullName,

    /// When the session expires.
    #[serde(with = "rfc3339")]
    pub expires_at: session::ExpirationDateTime,
}

impl From<command::create_session::Output> for Session {
    fn from(output: command::create_session::Output) -> Self {
        let (account_id, full_name) = match output.account {
            Account::Admin(a) => (AccountId::Admin(a.id), a.full_name),
            Account::Owner(o) => (AccountId::Owner(o.id), o.full_name),
        };

        Self {
            token: output.token.to_string(),
            account_id,
            full_name,
            expires_at: output.expires_at,
        }
    }
}

/// Signs in as an [`Owner`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the credentials are empty;
/// - `WRONG_CREDENTIALS` - the login or password is wrong;
/// - `ACCOUNT_DISABLED` - the [`Owner`] is deactivated.
///
/// [`Owner`]: service::domain::Owner
#[tracing::instrument(
    skip_all,
    fields(api.name = "signInOwner", otel.name = api::SPAN_NAME),
)]
pub async fn owner(
    ctx: Context,
    Json(body): Json<Credentials>,
) -> Result<Json<Session>, Error> {
    sign_in(&ctx, body, session::Role::Owner).await
}

/// Signs in as an [`Admin`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the credentials are empty;
/// - `WRONG_CREDENTIALS` - the login or password is wrong.
///
/// [`Admin`]: service::domain::Admin
#[tracing::instrument(
    skip_all,
    fields(api.name = "signInAdmin", otel.name = api::SPAN_NAME),
)]
pub async fn admin(
    ctx: Context,
    Json(body): Json<Credentials>,
) -> Result<Json<Session>, Error> {
    sign_in(&ctx, body, session::Role::Admin).await
}

/// Creates a new [`Session`] with the provided [`Credentials`].
async fn sign_in(
    ctx: &Context,
    credentials: Credentials,
    role: session::Role,
) -> Result<Json<Session>, Error> {
    let cmd = credentials.into_command(role)?;

    let output = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    tracing::info!(?role, "signed in");

    Ok(Json(output.into()))
}

impl AsError for command::create_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Wrong login or password"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => Some(Error::WrongCredentials.into()),
            Self::AccountDisabled => Some(AuthError::AccountDisabled.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTimeOf;
    use secrecy::ExposeSecret as _;
    use service::domain::{contact, credentials, session};

    use super::{AccountId, Credentials, Session};

    #[test]
    fn rejects_empty_credentials() {
        let err = serde_json::from_str::<Credentials>(
            r#"{"username": "", "password": ""}"#,
        )
        .unwrap()
        .into_command(session::Role::Owner)
        .unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, ["username", "password"]);
    }

    #[test]
    fn signs_in_with_role() {
        let cmd = serde_json::from_str::<Credentials>(
            r#"{"username": "admin", "password": "s3cret"}"#,
        )
        .unwrap()
        .into_command(session::Role::Admin)
        .unwrap();

        assert_eq!(cmd.role, session::Role::Admin);
        assert_eq!(cmd.login.to_string(), "admin");
        assert_eq!(
            cmd.password.expose_secret(),
            &credentials::Password::new("s3cret").unwrap(),
        );
    }

    #[test]
    fn names_account_id_by_role() {
        let session = Session {
            token: "t".to_owned(),
            account_id: AccountId::Owner(5.into()),
            full_name: contact::FullName::new("A B").unwrap(),
            expires_at: DateTimeOf::from_unix_timestamp(0).unwrap(),
        };

        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["owner_id"], 5);
        assert!(json.get("admin_id").is_none());
        assert_eq!(json["full_name"], "A B");
        assert_eq!(json["expires_at"], "1970-01-01T00:00:00Z");
    }
}
