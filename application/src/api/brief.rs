//! Lead [`Brief`] definitions.
//!
//! [`Brief`]: service::domain::Brief

use serde::Deserialize;
use service::{
    command::{self, Command as _},
    domain::Brief,
};

use crate::{
    api::{self, Json, Success},
    define_error,
    form::{Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// Body of a [`submit`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    category: Option<Raw>,
    name: Option<Raw>,
    address: Option<Raw>,
    metro: Option<Raw>,
    objects_count: Option<Raw>,
    website: Option<Raw>,
    phone: Option<Raw>,
    telegram: Option<Raw>,
    owner_name: Option<Raw>,
}

impl Body {
    /// Parses this [`Body`] into a [`Brief`].
    fn into_brief(self) -> Result<Brief, ValidationError> {
        let mut form = Form::default();
        let category = form.required("category", self.category);
        let name = form.required("name", self.name);
        let address = form.required("address", self.address);
        let transit = form.optional("metro", self.metro);
        let objects_count = form.required("objectsCount", self.objects_count);
        let website = form.optional("website", self.website);
        let phone = form.required("phone", self.phone);
        let telegram = form.optional("telegram", self.telegram);
        let owner_name = form.required("ownerName", self.owner_name);

        form.build(|| {
            Ok(Brief {
                category: category?,
                name: name?,
                address: address?,
                transit: transit?,
                objects_count: objects_count?,
                website: website?,
                phone: phone?,
                telegram: telegram?,
                owner_name: owner_name?,
            })
        })
    }
}

/// Relays a [`Brief`] of a prospective owner to the operators.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `MESSENGER_NOT_CONFIGURED` - the Telegram bot is not configured;
/// - `MESSENGER_FAILED` - Telegram refused to deliver the [`Brief`].
#[tracing::instrument(
    skip_all,
    fields(api.name = "submitBrief", otel.name = api::SPAN_NAME),
)]
pub async fn submit(
    ctx: Context,
    Json(body): Json<Body>,
) -> Result<Json<Success>, Error> {
    let brief = body.into_brief()?;

    ctx.service()
        .execute(command::SubmitBrief { brief })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new()))
}

impl AsError for command::submit_brief::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "MESSENGER_NOT_CONFIGURED"]
                #[status = INTERNAL_SERVER_ERROR]
                #[message = "Telegram bot is not configured"]
                NotConfigured,

                #[code = "MESSENGER_FAILED"]
                #[status = BAD_GATEWAY]
                #[message = "Failed to deliver the brief, retry later"]
                Failed,
            }
        }

        match self {
            Self::MessengerNotConfigured => Some(Error::NotConfigured.into()),
            Self::Messenger(e) => {
                tracing::warn!("failed to relay brief: {e}");
                Some(Error::Failed.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain::property;

    use super::Body;

    #[test]
    fn parses_camel_case_brief() {
        let brief = serde_json::from_str::<Body>(
            r#"{
                "category": "sauna",
                "name": "Баня №1",
                "address": "Тверская, 25",
                "metro": "",
                "objectsCount": "3",
                "website": "",
                "phone": "+7 900 000-00-00",
                "telegram": "@owner",
                "ownerName": "Иван"
            }"#,
        )
        .unwrap()
        .into_brief()
        .unwrap();

        assert_eq!(brief.category, property::Category::Sauna);
        assert_eq!(brief.objects_count.get(), 3);
        assert!(brief.transit.is_none());
        assert!(brief.website.is_none());
        assert!(brief.telegram.is_some());
        assert_eq!(brief.owner_name.to_string(), "Иван");
    }

    #[test]
    fn reports_every_missing_field() {
        let err = serde_json::from_str::<Body>(r#"{"objectsCount": 0}"#)
            .unwrap()
            .into_brief()
            .unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(
            fields,
            [
                "category",
                "name",
                "address",
                "objectsCount",
                "phone",
                "ownerName",
            ],
        );
    }
}
