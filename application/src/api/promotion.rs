//! [`Promotion`]-related definitions.

use common::datetime::serde::rfc3339;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        self,
        promotion::{self, ValidityDateTime},
    },
    query::{self, Query as _},
    read,
};

use crate::{
    api::{self, Created, Json, Path, Success},
    define_error,
    form::{self, Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// [`domain::Promotion`] as seen by the API clients.
#[derive(Clone, Debug, Serialize)]
pub struct Promotion {
    /// ID of this [`Promotion`].
    pub id: promotion::Id,

    /// Title of this [`Promotion`].
    pub title: promotion::Title,

    /// Description of this [`Promotion`].
    pub description: Option<promotion::Description>,

    /// Start of the validity period.
    #[serde(with = "rfc3339")]
    pub valid_from: ValidityDateTime,

    /// End of the validity period, if any.
    #[serde(with = "rfc3339::option")]
    pub valid_until: Option<ValidityDateTime>,

    /// Indicator whether this [`Promotion`] is shown to clients.
    pub is_active: bool,

    /// Indicator whether the validity period of this [`Promotion`] has
    /// already ended.
    pub is_expired: bool,

    /// When this [`Promotion`] was created.
    #[serde(with = "rfc3339")]
    pub created_at: promotion::CreationDateTime,
}

impl Promotion {
    /// Presents the provided [`domain::Promotion`], checking its expiration
    /// at the provided moment.
    #[must_use]
    pub fn new(promotion: domain::Promotion, at: ValidityDateTime) -> Self {
        let is_expired = promotion.is_expired(at);
        let domain::Promotion {
            id,
            title,
            description,
            validity,
            is_active,
            created_at,
        } = promotion;

        Self {
            id,
            title,
            description,
            valid_from: validity.from(),
            valid_until: validity.until(),
            is_active,
            is_expired,
            created_at,
        }
    }
}

impl From<read::dashboard::Offer> for Promotion {
    fn from(offer: read::dashboard::Offer) -> Self {
        let mut this = Self::new(offer.promotion, ValidityDateTime::now());
        this.is_expired = offer.is_expired;
        this
    }
}

/// List of [`Promotion`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Promotion`]s of the list.
    pub promotions: Vec<Promotion>,
}

/// Lists all the [`Promotion`]s, newest first.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listPromotions", otel.name = api::SPAN_NAME),
)]
pub async fn list(ctx: Context) -> Result<Json<List>, Error> {
    _ = ctx.admin_session().await?;

    let promotions = ctx
        .service()
        .execute(query::promotion::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    let now = ValidityDateTime::now();
    Ok(Json(List {
        promotions: promotions
            .into_iter()
            .map(|p| Promotion::new(p, now))
            .collect(),
    }))
}

/// Body of a [`create`] request.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    title: Option<Raw>,
    description: Option<Raw>,
    valid_from: Option<Raw>,
    valid_until: Option<Raw>,
    is_active: Option<Raw>,
}

impl CreateBody {
    /// Parses this [`CreateBody`] into a [`command::CreatePromotion`].
    ///
    /// Missing `valid_from` means the [`Promotion`] is valid since the
    /// provided moment.
    fn into_command(
        self,
        now: ValidityDateTime,
    ) -> Result<command::CreatePromotion, ValidationError> {
        let mut form = Form::default();
        let title = form.required("title", self.title);
        let description = form.optional("description", self.description);
        let valid_from = form.optional("valid_from", self.valid_from);
        let valid_until = form.optional("valid_until", self.valid_until);
        let is_active = form.optional("is_active", self.is_active);

        form.build(|| {
            Ok(command::CreatePromotion {
                title: title?,
                description: description?,
                valid_from: valid_from?.unwrap_or(now),
                valid_until: valid_until?,
                is_active: is_active?.unwrap_or(true),
            })
        })
    }
}

/// Creates a new [`Promotion`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `INVALID_PERIOD` - the `valid_until` precedes the `valid_from`.
#[tracing::instrument(
    skip_all,
    fields(api.name = "createPromotion", otel.name = api::SPAN_NAME),
)]
pub async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Created<Promotion>, Error> {
    _ = ctx.admin_session().await?;
    let now = ValidityDateTime::now();
    let cmd = body.into_command(now)?;

    let promotion = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Created(Promotion::new(promotion, now)))
}

/// Body of an [`update`] request.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    #[serde(default, deserialize_with = "form::patch")]
    title: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    description: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    valid_from: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    valid_until: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    is_active: Option<Option<Raw>>,
}

impl UpdateBody {
    /// Parses this [`UpdateBody`] into a [`command::UpdatePromotion`] of the
    /// [`Promotion`] with the provided ID.
    fn into_command(
        self,
        id: promotion::Id,
    ) -> Result<command::UpdatePromotion, ValidationError> {
        let mut form = Form::default();
        let title = form.update("title", self.title);
        let description = form.patch("description", self.description);
        let valid_from = form.update("valid_from", self.valid_from);
        let valid_until = form.patch("valid_until", self.valid_until);
        let is_active = form.update("is_active", self.is_active);

        form.build(|| {
            Ok(command::UpdatePromotion {
                title: title?,
                description: description?,
                valid_from: valid_from?,
                valid_until: valid_until?,
                is_active: is_active?,
                ..command::UpdatePromotion::new(id)
            })
        })
    }
}

/// Updates the provided fields of a [`Promotion`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `PROMOTION_NOT_EXISTS` - the [`Promotion`] does not exist;
/// - `INVALID_PERIOD` - the resulting period ends before it starts.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "updatePromotion",
        otel.name = api::SPAN_NAME,
        promotion.id = %id,
    ),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<promotion::Id>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Promotion>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command(id)?;

    let promotion = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Promotion::new(promotion, ValidityDateTime::now())))
}

/// Deletes a [`Promotion`].
///
/// # Errors
///
/// Possible error codes:
/// - `PROMOTION_NOT_EXISTS` - the [`Promotion`] does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "deletePromotion",
        otel.name = api::SPAN_NAME,
        promotion.id = %id,
    ),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<promotion::Id>,
) -> Result<Json<Success>, Error> {
    _ = ctx.admin_session().await?;

    let promotion = ctx
        .service()
        .execute(command::DeletePromotion { promotion_id: id })
        .await
        .map_err(AsError::into_error)?;
    tracing::debug!(title = %promotion.title, "promotion deleted");

    Ok(Json(Success::new()))
}

define_error! {
    enum PromotionError {
        #[code = "PROMOTION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Promotion` does not exist"]
        NotExists,

        #[code = "INVALID_PERIOD"]
        #[status = BAD_REQUEST]
        #[message = "Promotion must not end before it starts"]
        InvalidPeriod,
    }
}

impl AsError for command::create_promotion::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidPeriod => Some(PromotionError::InvalidPeriod.into()),
        }
    }
}

impl AsError for command::update_promotion::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PromotionNotExists(_) => {
                Some(PromotionError::NotExists.into())
            }
            Self::InvalidPeriod => Some(PromotionError::InvalidPeriod.into()),
        }
    }
}

impl AsError for command::delete_promotion::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PromotionNotExists(_) => {
                Some(PromotionError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::domain::{
        self,
        promotion::{Title, Validity, ValidityDateTime},
    };

    use super::{CreateBody, Promotion, UpdateBody};

    #[test]
    fn defaults_to_active_since_now() {
        let now = ValidityDateTime::now();

        let cmd = serde_json::from_str::<CreateBody>(
            r#"{"title": "Скидка 20%", "description": "", "valid_until": ""}"#,
        )
        .unwrap()
        .into_command(now)
        .unwrap();

        assert_eq!(cmd.title.to_string(), "Скидка 20%");
        assert!(cmd.description.is_none());
        assert_eq!(cmd.valid_from, now);
        assert!(cmd.valid_until.is_none());
        assert!(cmd.is_active);
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = serde_json::from_str::<CreateBody>(
            r#"{"title": "A", "valid_from": "tomorrow"}"#,
        )
        .unwrap()
        .into_command(ValidityDateTime::now())
        .unwrap_err();

        assert_eq!(err.0.len(), 1);
        assert_eq!(err.0[0].field, "valid_from");
    }

    #[test]
    fn clears_end_of_period() {
        let cmd = serde_json::from_str::<UpdateBody>(
            r#"{"valid_until": null, "is_active": "false"}"#,
        )
        .unwrap()
        .into_command(3.into())
        .unwrap();

        assert_eq!(cmd.valid_until, Some(None));
        assert_eq!(cmd.is_active, Some(false));
        assert!(cmd.valid_from.is_none());
        assert!(cmd.title.is_none());
    }

    #[test]
    fn presents_expiration() {
        let now = ValidityDateTime::now();
        let day = Duration::from_secs(24 * 3600);
        let promotion = domain::Promotion {
            id: 1.into(),
            title: Title::new("Скидка").unwrap(),
            description: None,
            validity: Validity::new(now - day * 2, Some(now - day)).unwrap(),
            is_active: true,
            created_at: now.coerce(),
        };

        let view = Promotion::new(promotion, now);
        let json = serde_json::to_value(&view).unwrap();

        assert!(view.is_expired);
        assert_eq!(json["is_active"], true);
        assert!(json["valid_until"].is_string());
    }
}
