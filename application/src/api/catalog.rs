//! Public catalog definitions.

use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::property,
    query::{self, Query as _},
    read,
};

use crate::{
    api::{
        self,
        property::{Entry, PropertyError, Stats},
        room::Room,
        Json, Path, Query,
    },
    define_error,
    form::{Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// Presentation of a [`property::Category`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Category {
    /// [`property::Category`] itself.
    pub category: property::Category,

    /// Name of a single item of the [`Category`].
    pub label: &'static str,

    /// Title of the [`Category`] section.
    pub title: &'static str,

    /// Name of the icon representing the [`Category`].
    pub icon: &'static str,

    /// Placeholder of the search input.
    pub placeholder: &'static str,
}

impl From<property::Category> for Category {
    fn from(category: property::Category) -> Self {
        let property::CategoryConfig {
            label,
            title,
            icon,
            placeholder,
        } = *category.config();

        Self {
            category,
            label,
            title,
            icon,
            placeholder,
        }
    }
}

/// List of [`Category`]s.
#[derive(Clone, Debug, Serialize)]
pub struct Categories {
    /// [`Category`]s in their display order.
    pub categories: Vec<Category>,
}

/// Lists all the [`Category`]s along with their presentation.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listCategories", otel.name = api::SPAN_NAME),
)]
pub async fn categories() -> Json<Categories> {
    Json(Categories {
        categories: property::Category::ALL
            .iter()
            .copied()
            .map(Into::into)
            .collect(),
    })
}

/// Filters of the [`list`]ed properties.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    category: Option<Raw>,
    search: Option<String>,
}

impl ListParams {
    /// Parses these [`ListParams`] into a [`read::catalog::Filter`].
    fn into_filter(self) -> Result<read::catalog::Filter, ValidationError> {
        let mut form = Form::default();
        let category = form.optional("category", self.category);
        form.build(|| {
            Ok(read::catalog::Filter {
                category: category?,
                search: self.search,
            })
        })
    }
}

/// Listed properties of the catalog.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Entry`]s of the list.
    pub properties: Vec<Entry>,
}

/// Lists the published and not archived properties matching the provided
/// `category` and `search`, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the `category` is unknown.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "listCatalog",
        otel.name = api::SPAN_NAME,
        search = ?params.search,
    ),
)]
pub async fn list(
    ctx: Context,
    Query(params): Query<ListParams>,
) -> Result<Json<List>, Error> {
    let filter = params.into_filter()?;

    let entries = ctx
        .service()
        .execute(query::catalog::List(filter))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(List {
        properties: entries.into_iter().map(Into::into).collect(),
    }))
}

/// Listed property along with its listed rooms.
#[derive(Clone, Debug, Serialize)]
pub struct Details {
    /// Property itself.
    #[serde(flatten)]
    pub entry: Entry,

    /// Listed [`Room`]s of the property.
    pub rooms: Vec<Room>,
}

/// Returns a listed property along with its listed rooms.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - the property does not exist or is not listed.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "getCatalogProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn show(
    ctx: Context,
    Path(id): Path<property::Id>,
) -> Result<Json<Details>, Error> {
    let details = ctx
        .service()
        .execute(query::catalog::Details(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(PropertyError::NotExists)?;

    Ok(Json(Details {
        entry: details.entry.into(),
        rooms: details.rooms.into_iter().map(Into::into).collect(),
    }))
}

/// Counts a view of a listed property.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - the property does not exist or is not listed.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "viewProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn view(
    ctx: Context,
    Path(id): Path<property::Id>,
) -> Result<Json<Stats>, Error> {
    let stats = ctx
        .service()
        .execute(command::RecordPropertyView { property_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(stats.into()))
}

/// Link to contact the owner of a property.
#[derive(Clone, Debug, Serialize)]
pub struct Contact {
    /// Telegram deep link.
    pub url: String,
}

/// Counts a click on the contact of a listed property and returns the link
/// to follow.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - the property does not exist or is not listed;
/// - `NO_CONTACT` - the property has no contact.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "contactProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn contact(
    ctx: Context,
    Path(id): Path<property::Id>,
) -> Result<Json<Contact>, Error> {
    let output = ctx
        .service()
        .execute(command::ContactProperty { property_id: id })
        .await
        .map_err(AsError::into_error)?;
    tracing::debug!(clicks = output.stats.clicks, "contact followed");

    Ok(Json(Contact {
        url: output.link.to_string(),
    }))
}

impl AsError for command::record_property_view::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

impl AsError for command::contact_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_CONTACT"]
                #[status = NOT_FOUND]
                #[message = "Property has no contact"]
                NoContact,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::NoContact(_) => Some(Error::NoContact.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain::property;

    use super::{Category, ListParams};

    #[test]
    fn treats_empty_category_as_any() {
        let params = serde_json::from_str::<ListParams>(
            r#"{"category": "", "search": " Тверская "}"#,
        )
        .unwrap();

        let filter = params.into_filter().unwrap();

        assert!(filter.category.is_none());
        assert_eq!(filter.search.as_deref(), Some(" Тверская "));
    }

    #[test]
    fn rejects_unknown_category() {
        let params =
            serde_json::from_str::<ListParams>(r#"{"category": "villa"}"#)
                .unwrap();

        assert!(params.into_filter().is_err());
    }

    #[test]
    fn presents_category() {
        let category = Category::from(property::Category::Sauna);

        let json = serde_json::to_value(category).unwrap();

        assert_eq!(json["category"], "sauna");
        assert_eq!(json["label"], "Сауна");
        assert_eq!(json["icon"], "Droplets");
    }
}
