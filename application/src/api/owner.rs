//! [`Owner`]-related definitions.

use common::datetime::serde::rfc3339;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, contact, credentials, owner, telegram},
    query::{self, Query as _},
    read,
};

use crate::{
    api::{self, Created, Json, Path},
    define_error,
    form::{self, Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// [`domain::Owner`] as seen by the API clients.
#[derive(Clone, Debug, Serialize)]
pub struct Owner {
    /// ID of this [`Owner`].
    pub id: owner::Id,

    /// Login of this [`Owner`].
    pub username: credentials::Login,

    /// Full name of this [`Owner`].
    pub full_name: contact::FullName,

    /// Phone of this [`Owner`].
    pub phone: Option<contact::Phone>,

    /// Telegram handle of this [`Owner`].
    pub telegram: Option<telegram::Handle>,

    /// Indicator whether this [`Owner`] may sign in.
    pub is_active: bool,

    /// When this [`Owner`] was created.
    #[serde(with = "rfc3339")]
    pub created_at: owner::CreationDateTime,
}

impl From<domain::Owner> for Owner {
    fn from(owner: domain::Owner) -> Self {
        let domain::Owner {
            id,
            login,
            password_hash: _,
            full_name,
            phone,
            telegram,
            is_active,
            created_at,
        } = owner;

        Self {
            id,
            username: login,
            full_name,
            phone,
            telegram,
            is_active,
            created_at,
        }
    }
}

/// [`Owner`] along with the number of its properties.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    /// [`Owner`] itself.
    #[serde(flatten)]
    pub owner: Owner,

    /// Number of properties of the [`Owner`].
    pub objects_count: i64,
}

impl From<read::owner::Summary> for Summary {
    fn from(summary: read::owner::Summary) -> Self {
        Self {
            owner: summary.owner.into(),
            objects_count: summary.properties_count,
        }
    }
}

/// List of [`Summary`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Summary`]s of the list.
    pub owners: Vec<Summary>,
}

/// Lists all the [`Owner`]s, newest first.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listOwners", otel.name = api::SPAN_NAME),
)]
pub async fn list(ctx: Context) -> Result<Json<List>, Error> {
    _ = ctx.admin_session().await?;

    let owners = ctx
        .service()
        .execute(query::owner::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(List {
        owners: owners.into_iter().map(Into::into).collect(),
    }))
}

/// Body of a [`create`] request.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    username: Option<Raw>,
    password: Option<Raw>,
    full_name: Option<Raw>,
    phone: Option<Raw>,
    telegram: Option<Raw>,
}

impl CreateBody {
    /// Parses this [`CreateBody`] into a [`command::CreateOwner`].
    fn into_command(self) -> Result<command::CreateOwner, ValidationError> {
        let mut form = Form::default();
        let login = form.required("username", self.username);
        let password = form.required("password", self.password);
        let full_name = form.required("full_name", self.full_name);
        let phone = form.optional("phone", self.phone);
        let telegram = form.optional("telegram", self.telegram);

        form.build(|| {
            let password: credentials::Password = password?;
            Ok(command::CreateOwner {
                login: login?,
                password: SecretBox::init_with(move || password),
                full_name: full_name?,
                phone: phone?,
                telegram: telegram?,
            })
        })
    }
}

/// Creates a new active [`Owner`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `LOGIN_OCCUPIED` - the `username` is taken by another [`Owner`].
#[tracing::instrument(
    skip_all,
    fields(api.name = "createOwner", otel.name = api::SPAN_NAME),
)]
pub async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Created<Summary>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command()?;

    let summary = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Created(summary.into()))
}

/// Body of an [`update`] request.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    #[serde(default, deserialize_with = "form::patch")]
    full_name: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    phone: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    telegram: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    is_active: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    password: Option<Option<Raw>>,
}

impl UpdateBody {
    /// Parses this [`UpdateBody`] into a [`command::UpdateOwner`] of the
    /// [`Owner`] with the provided ID.
    fn into_command(
        self,
        id: owner::Id,
    ) -> Result<command::UpdateOwner, ValidationError> {
        let mut form = Form::default();
        let full_name = form.update("full_name", self.full_name);
        let phone = form.patch("phone", self.phone);
        let telegram = form.patch("telegram", self.telegram);
        let is_active = form.update("is_active", self.is_active);
        // An empty password keeps the current one.
        let password = form.optional::<credentials::Password>(
            "password",
            self.password.flatten(),
        );

        form.build(|| {
            Ok(command::UpdateOwner {
                full_name: full_name?,
                phone: phone?,
                telegram: telegram?,
                is_active: is_active?,
                password: password?
                    .map(|p| SecretBox::init_with(move || p)),
                ..command::UpdateOwner::new(id)
            })
        })
    }
}

/// Updates the provided fields of an [`Owner`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `OWNER_NOT_EXISTS` - the [`Owner`] does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "updateOwner",
        otel.name = api::SPAN_NAME,
        owner.id = %id,
    ),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<owner::Id>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Owner>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command(id)?;

    let owner = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(owner.into()))
}

define_error! {
    enum OwnerError {
        #[code = "OWNER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Owner` does not exist"]
        NotExists,
    }
}

impl AsError for command::create_owner::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Login is occupied by another `Owner`"]
                LoginOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LoginOccupied(_) => Some(Error::LoginOccupied.into()),
        }
    }
}

impl AsError for command::update_owner::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::OwnerNotExists(_) => Some(OwnerError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::ExposeSecret as _;
    use service::domain::credentials;

    use super::{CreateBody, UpdateBody};

    #[test]
    fn treats_empty_contacts_as_absent() {
        let cmd = serde_json::from_str::<CreateBody>(
            r#"{
                "username": "owner9",
                "password": "x",
                "full_name": "A B",
                "phone": "",
                "telegram": ""
            }"#,
        )
        .unwrap()
        .into_command()
        .unwrap();

        assert_eq!(cmd.login.to_string(), "owner9");
        assert_eq!(cmd.full_name.to_string(), "A B");
        assert!(cmd.phone.is_none());
        assert!(cmd.telegram.is_none());
    }

    #[test]
    fn requires_credentials() {
        let err = serde_json::from_str::<CreateBody>(
            r#"{"username": " ", "full_name": "A B"}"#,
        )
        .unwrap()
        .into_command()
        .unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, ["username", "password"]);
    }

    #[test]
    fn keeps_password_when_empty() {
        let cmd = serde_json::from_str::<UpdateBody>(
            r#"{"password": "", "phone": null, "is_active": false}"#,
        )
        .unwrap()
        .into_command(7.into())
        .unwrap();

        assert!(cmd.password.is_none());
        assert_eq!(cmd.phone, Some(None));
        assert_eq!(cmd.is_active, Some(false));
        assert!(cmd.full_name.is_none());
    }

    #[test]
    fn changes_password() {
        let cmd = serde_json::from_str::<UpdateBody>(r#"{"password": "n3w"}"#)
            .unwrap()
            .into_command(7.into())
            .unwrap();

        let password = cmd.password.unwrap();
        assert_eq!(
            password.expose_secret(),
            &credentials::Password::new("n3w").unwrap(),
        );
    }
}
