//! Owner dashboard definitions.

use serde::{Deserialize, Serialize};
use service::{
    domain::owner,
    query::{self, Query as _},
    read,
};

use crate::{
    api::{
        self,
        owner::{Owner, OwnerError},
        promotion::Promotion,
        property::Entry,
        Json, Query,
    },
    form::{Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// Parameters of a [`show`] request.
#[derive(Debug, Deserialize)]
pub struct Params {
    owner_id: Option<Raw>,
}

impl Params {
    /// Parses the ID of the [`Owner`] whose dashboard is requested.
    fn owner_id(self) -> Result<owner::Id, ValidationError> {
        let mut form = Form::default();
        let owner_id = form.required("owner_id", self.owner_id);
        form.build(|| owner_id)
    }
}

/// Everything an [`Owner`] sees on its dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    /// The [`Owner`] itself.
    pub owner: Owner,

    /// All the properties of the [`Owner`] along with their stats.
    pub objects: Vec<Entry>,

    /// Active [`Promotion`]s.
    pub promotions: Vec<Promotion>,
}

impl From<read::Dashboard> for Dashboard {
    fn from(dashboard: read::Dashboard) -> Self {
        Self {
            owner: dashboard.owner.into(),
            objects: dashboard.objects.into_iter().map(Into::into).collect(),
            promotions: dashboard
                .promotions
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Returns the dashboard of an active [`Owner`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the `owner_id` is missing or malformed;
/// - `FORBIDDEN` - the current session belongs to another [`Owner`];
/// - `OWNER_NOT_EXISTS` - the [`Owner`] does not exist or is deactivated.
#[tracing::instrument(
    skip_all,
    fields(api.name = "getDashboard", otel.name = api::SPAN_NAME),
)]
pub async fn show(
    ctx: Context,
    Query(params): Query<Params>,
) -> Result<Json<Dashboard>, Error> {
    let owner_id = params.owner_id()?;
    _ = ctx.owner_session(owner_id).await?;

    let dashboard = ctx
        .service()
        .execute(query::dashboard::ForOwner(owner_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(OwnerError::NotExists)?;
    tracing::debug!(
        owner.id = %owner_id,
        objects = dashboard.objects.len(),
        "dashboard loaded",
    );

    Ok(Json(dashboard.into()))
}

#[cfg(test)]
mod spec {
    use super::Params;

    #[test]
    fn requires_owner_id() {
        let queries = ["{}", r#"{"owner_id": ""}"#, r#"{"owner_id": "x"}"#];
        for query in queries {
            let params = serde_json::from_str::<Params>(query).unwrap();

            let err = params.owner_id().unwrap_err();

            assert_eq!(err.0[0].field, "owner_id");
        }
    }

    #[test]
    fn parses_textual_owner_id() {
        let params =
            serde_json::from_str::<Params>(r#"{"owner_id": "12"}"#).unwrap();

        assert_eq!(i32::from(params.owner_id().unwrap()), 12);
    }
}
