//! [`Property`]-related definitions.

use common::datetime::serde::rfc3339;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, image, owner, property, publication, telegram},
    query::{self, Query as _},
    read,
};

use crate::{
    api::{self, owner::OwnerError, Created, Json, Path, Query, Success},
    define_error,
    form::{self, Checked, Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// [`domain::Property`] as seen by the API clients.
#[derive(Clone, Debug, Serialize)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: property::Id,

    /// ID of the [`Owner`] of this [`Property`], if any.
    ///
    /// [`Owner`]: domain::Owner
    pub owner_id: Option<owner::Id>,

    /// Category of this [`Property`].
    pub category: property::Category,

    /// Name of this [`Property`].
    pub name: property::Name,

    /// Description of this [`Property`].
    pub description: Option<property::Description>,

    /// Address of this [`Property`].
    pub address: property::Address,

    /// Nearest metro station of this [`Property`].
    pub metro: Option<property::TransitLabel>,

    /// Floor area of this [`Property`].
    pub area: Option<Decimal>,

    /// Number of rooms or guests this [`Property`] fits.
    pub capacity: Option<u16>,

    /// Price of a single hour.
    pub price_per_hour: Decimal,

    /// Minimum hours of a rent.
    pub min_hours: u16,

    /// Latitude of this [`Property`].
    pub lat: Option<f64>,

    /// Longitude of this [`Property`].
    pub lon: Option<f64>,

    /// Cover image of this [`Property`].
    pub image_url: Option<image::Url>,

    /// Additional photos of this [`Property`].
    pub photos: Vec<image::Url>,

    /// Telegram handle to contact about this [`Property`].
    pub telegram: Option<telegram::Handle>,

    /// Indicator whether this [`Property`] is published.
    pub is_published: bool,

    /// Indicator whether this [`Property`] is archived.
    pub is_archived: bool,

    /// Status derived from the flags above.
    pub status: publication::Status,

    /// When this [`Property`] was created.
    #[serde(with = "rfc3339")]
    pub created_at: property::CreationDateTime,

    /// When this [`Property`] was modified last time.
    #[serde(with = "rfc3339")]
    pub updated_at: property::ModificationDateTime,
}

impl From<domain::Property> for Property {
    fn from(property: domain::Property) -> Self {
        let domain::Property {
            id,
            owner_id,
            category,
            name,
            description,
            address,
            transit,
            area,
            capacity,
            price_per_hour,
            min_hours,
            location,
            cover_image,
            photos,
            telegram,
            publication,
            created_at,
            updated_at,
        } = property;

        Self {
            id,
            owner_id,
            category,
            name,
            description,
            address,
            metro: transit,
            area: area.map(property::Area::get),
            capacity: capacity.map(property::Capacity::get),
            price_per_hour: price_per_hour.amount(),
            min_hours: min_hours.get(),
            lat: location.map(property::Coordinates::latitude),
            lon: location.map(property::Coordinates::longitude),
            image_url: cover_image,
            photos,
            telegram,
            is_published: publication.is_published,
            is_archived: publication.is_archived,
            status: publication.status(),
            created_at,
            updated_at,
        }
    }
}

/// Views and clicks of a [`Property`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Stats {
    /// Number of times the [`Property`] was viewed.
    pub views: i64,

    /// Number of times the [`Property`] contact was clicked.
    pub clicks: i64,

    /// When the [`Property`] was viewed last time.
    #[serde(with = "rfc3339::option")]
    pub last_view_at: Option<read::property::HitDateTime>,

    /// When the [`Property`] contact was clicked last time.
    #[serde(with = "rfc3339::option")]
    pub last_click_at: Option<read::property::HitDateTime>,
}

impl From<read::property::Stats> for Stats {
    fn from(stats: read::property::Stats) -> Self {
        let read::property::Stats {
            views,
            clicks,
            last_view_at,
            last_click_at,
        } = stats;

        Self {
            views,
            clicks,
            last_view_at,
            last_click_at,
        }
    }
}

/// [`Property`] along with its [`Stats`].
#[derive(Clone, Debug, Serialize)]
pub struct Entry {
    /// [`Property`] itself.
    #[serde(flatten)]
    pub property: Property,

    /// [`Stats`] of the [`Property`].
    pub stats: Stats,
}

impl From<read::property::Entry> for Entry {
    fn from(entry: read::property::Entry) -> Self {
        Self {
            property: entry.property.into(),
            stats: entry.stats.into(),
        }
    }
}

/// List of [`Entry`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Entry`]s of the list.
    pub properties: Vec<Entry>,
}

impl List {
    /// Creates a new [`List`] out of the provided entries.
    pub fn new(
        entries: impl IntoIterator<Item = read::property::Entry>,
    ) -> Self {
        Self {
            properties: entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filters of [`list`]ed [`Property`]s.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    status: Option<Raw>,
    category: Option<Raw>,
    owner_id: Option<Raw>,
}

impl ListParams {
    /// Parses these [`ListParams`] into a [`read::property::list::Filter`].
    fn into_filter(
        self,
    ) -> Result<read::property::list::Filter, ValidationError> {
        let mut form = Form::default();
        let status = form.optional("status", self.status);
        let category = form.optional("category", self.category);
        let owner_id = form.optional("owner_id", self.owner_id);
        form.build(|| {
            Ok(read::property::list::Filter {
                status: status?,
                category: category?,
                owner_id: owner_id?,
            })
        })
    }
}

/// Lists all the [`Property`]s matching the provided filters, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - a filter has an invalid value.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listProperties", otel.name = api::SPAN_NAME),
)]
pub async fn list(
    ctx: Context,
    Query(params): Query<ListParams>,
) -> Result<Json<List>, Error> {
    _ = ctx.admin_session().await?;
    let filter = params.into_filter()?;

    let entries = ctx
        .service()
        .execute(query::property::List::by(filter))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(List::new(entries)))
}

/// Returns a single [`Property`] with its [`Stats`].
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - the [`Property`] does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "getProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn show(
    ctx: Context,
    Path(id): Path<property::Id>,
) -> Result<Json<Entry>, Error> {
    _ = ctx.admin_session().await?;

    ctx.service()
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|e| Json(e.into()))
        .ok_or_else(|| PropertyError::NotExists.into())
}

/// Body of a [`create`] request.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    owner_id: Option<Raw>,
    category: Option<Raw>,
    name: Option<Raw>,
    description: Option<Raw>,
    address: Option<Raw>,
    metro: Option<Raw>,
    area: Option<Raw>,
    capacity: Option<Raw>,
    price_per_hour: Option<Raw>,
    min_hours: Option<Raw>,
    lat: Option<Raw>,
    lon: Option<Raw>,
    image_url: Option<Raw>,
    photos: Option<Vec<Raw>>,
    telegram: Option<Raw>,
    is_published: Option<Raw>,
}

impl CreateBody {
    /// Parses this [`CreateBody`] into a [`command::CreateProperty`].
    fn into_command(
        self,
    ) -> Result<command::CreateProperty, ValidationError> {
        let mut form = Form::default();
        let owner_id = form.optional("owner_id", self.owner_id);
        let category = form.required("category", self.category);
        let name = form.required("name", self.name);
        let description = form.optional("description", self.description);
        let address = form.required("address", self.address);
        let transit = form.optional("metro", self.metro);
        let area = form.optional("area", self.area);
        let capacity = form.optional("capacity", self.capacity);
        let price_per_hour =
            form.required("price_per_hour", self.price_per_hour);
        let min_hours = form.optional("min_hours", self.min_hours);
        let lat = form.optional("lat", self.lat);
        let lon = form.optional("lon", self.lon);
        let location = lat.and_then(|lat| {
            lon.and_then(|lon| coordinates(&mut form, lat, lon))
        });
        let cover_image = form.optional("image_url", self.image_url);
        let photos = form.list("photos", self.photos.unwrap_or_default());
        let telegram = form.optional("telegram", self.telegram);
        let is_published = form.optional("is_published", self.is_published);

        form.build(|| {
            Ok(command::CreateProperty {
                owner_id: owner_id?,
                category: category?,
                name: name?,
                description: description?,
                address: address?,
                transit: transit?,
                area: area?,
                capacity: capacity?,
                price_per_hour: price_per_hour?,
                min_hours: min_hours?.unwrap_or_default(),
                location: location?,
                cover_image: cover_image?,
                photos: photos?,
                telegram: telegram?,
                is_published: is_published?.unwrap_or(false),
            })
        })
    }
}

/// Creates a new [`Property`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `OWNER_NOT_EXISTS` - the provided `owner_id` does not exist.
#[tracing::instrument(
    skip_all,
    fields(api.name = "createProperty", otel.name = api::SPAN_NAME),
)]
pub async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Created<Entry>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command()?;

    let entry = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Created(entry.into()))
}

/// Body of an [`update`] request.
///
/// Absent fields are left unchanged, while `null` or empty ones are cleared.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    #[serde(default, deserialize_with = "form::patch")]
    owner_id: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    category: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    name: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    description: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    address: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    metro: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    area: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    capacity: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    price_per_hour: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    min_hours: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    lat: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    lon: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    image_url: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    photos: Option<Option<Vec<Raw>>>,
    #[serde(default, deserialize_with = "form::patch")]
    telegram: Option<Option<Raw>>,
}

impl UpdateBody {
    /// Parses this [`UpdateBody`] into a [`command::UpdateProperty`] of the
    /// [`Property`] with the provided ID.
    fn into_command(
        self,
        id: property::Id,
    ) -> Result<command::UpdateProperty, ValidationError> {
        let mut form = Form::default();
        let owner_id = form.patch("owner_id", self.owner_id);
        let category = form.update("category", self.category);
        let name = form.update("name", self.name);
        let description = form.patch("description", self.description);
        let address = form.update("address", self.address);
        let transit = form.patch("metro", self.metro);
        let area = form.patch("area", self.area);
        let capacity = form.patch("capacity", self.capacity);
        let price_per_hour =
            form.update("price_per_hour", self.price_per_hour);
        let min_hours = form.update("min_hours", self.min_hours);
        let lat = form.patch("lat", self.lat);
        let lon = form.patch("lon", self.lon);
        let location = lat.and_then(|lat| {
            lon.and_then(|lon| match (lat, lon) {
                (None, None) => Ok(None),
                (lat, lon) => coordinates(
                    &mut form,
                    lat.flatten(),
                    lon.flatten(),
                )
                .map(Some),
            })
        });
        let cover_image = form.patch("image_url", self.image_url);
        let photos = self
            .photos
            .map(|p| form.list("photos", p.unwrap_or_default()))
            .transpose();
        let telegram = form.patch("telegram", self.telegram);

        form.build(|| {
            Ok(command::UpdateProperty {
                owner_id: owner_id?,
                category: category?,
                name: name?,
                description: description?,
                address: address?,
                transit: transit?,
                area: area?,
                capacity: capacity?,
                price_per_hour: price_per_hour?,
                min_hours: min_hours?,
                location: location?,
                cover_image: cover_image?,
                photos: photos?,
                telegram: telegram?,
                ..command::UpdateProperty::new(id)
            })
        })
    }
}

/// Parses the [`property::Coordinates`] out of their parts.
///
/// Either both parts or none of them must be provided.
fn coordinates(
    form: &mut Form,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Checked<Option<property::Coordinates>> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => property::Coordinates::new(lat, lon)
            .map(Some)
            .ok_or_else(|| {
                form.violate(
                    "lat",
                    "must be within [-90; 90], while `lon` within \
                     [-180; 180]"
                        .into(),
                )
            }),
        (Some(_), None) => {
            Err(form.violate("lon", "must be provided along with `lat`".into()))
        }
        (None, Some(_)) => {
            Err(form.violate("lat", "must be provided along with `lon`".into()))
        }
    }
}

/// Updates the provided fields of a [`Property`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `PROPERTY_NOT_EXISTS` - the [`Property`] does not exist;
/// - `OWNER_NOT_EXISTS` - the provided `owner_id` does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "updateProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<property::Id>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Property>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command(id)?;

    let property = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(property.into()))
}

/// Deletes a [`Property`] having no rooms.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - the [`Property`] does not exist;
/// - `HAS_ROOMS` - the [`Property`] still has rooms.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "deleteProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<property::Id>,
) -> Result<Json<Success>, Error> {
    _ = ctx.admin_session().await?;

    ctx.service()
        .execute(command::DeleteProperty { property_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new()))
}

/// Body of a [`toggle`] request.
#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    /// Flag to toggle.
    flag: Option<Raw>,

    /// Value of the flag the client has seen.
    current: Option<Raw>,
}

impl ToggleBody {
    /// Parses this [`ToggleBody`] into a flag and its current value.
    pub(crate) fn parse(
        self,
    ) -> Result<(publication::Flag, bool), ValidationError> {
        let mut form = Form::default();
        let flag = form.required("flag", self.flag);
        let current = form.required("current", self.current);
        form.build(|| Ok((flag?, current?)))
    }
}

/// Flips the `published` or `archived` flag of a [`Property`], unless it
/// was changed since the client has seen it.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `PROPERTY_NOT_EXISTS` - the [`Property`] does not exist;
/// - `STALE_STATE` - the flag differs from the `current` one.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "toggleProperty",
        otel.name = api::SPAN_NAME,
        property.id = %id,
    ),
)]
pub async fn toggle(
    ctx: Context,
    Path(id): Path<property::Id>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<Property>, Error> {
    _ = ctx.admin_session().await?;
    let (flag, current) = body.parse()?;

    let property = ctx
        .service()
        .execute(command::ToggleProperty {
            property_id: id,
            flag,
            current,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(property.into()))
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Property` does not exist"]
        NotExists,

        #[code = "HAS_ROOMS"]
        #[status = CONFLICT]
        #[message = "`Property` has rooms, delete them first"]
        HasRooms,
    }
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::OwnerNotExists(_) => Some(OwnerError::NotExists.into()),
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::OwnerNotExists(_) => Some(OwnerError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::HasRooms(_) => Some(PropertyError::HasRooms.into()),
        }
    }
}

impl AsError for command::toggle_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::StaleState(_) => Some(api::StateError::Stale.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use service::domain::{property, publication};

    use super::{CreateBody, ToggleBody, UpdateBody};

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn creates_draft_by_default() {
        let cmd = parse::<CreateBody>(
            r#"{
                "category": "apartment",
                "name": "Loft",
                "address": "Тверская, 25",
                "metro": "",
                "area": "",
                "price_per_hour": "3000",
                "min_hours": 2
            }"#,
        )
        .into_command()
        .unwrap();

        assert_eq!(cmd.category, property::Category::Apartment);
        assert_eq!(cmd.price_per_hour.amount(), Decimal::from(3000));
        assert_eq!(cmd.min_hours.get(), 2);
        assert!(cmd.transit.is_none());
        assert!(cmd.area.is_none());
        assert!(cmd.location.is_none());
        assert!(!cmd.is_published);
    }

    #[test]
    fn reports_every_invalid_field() {
        let err = parse::<CreateBody>(
            r#"{
                "category": "villa",
                "address": "Тверская, 25",
                "price_per_hour": "abc",
                "lat": 55.7
            }"#,
        )
        .into_command()
        .unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, ["category", "name", "price_per_hour", "lon"]);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let err = parse::<CreateBody>(
            r#"{
                "category": "sauna",
                "name": "Banya",
                "address": "Арбат, 1",
                "price_per_hour": 1500,
                "lat": "91",
                "lon": "37,6"
            }"#,
        )
        .into_command()
        .unwrap_err();

        assert_eq!(err.0.len(), 1);
        assert_eq!(err.0[0].field, "lat");
    }

    #[test]
    fn updates_only_provided_fields() {
        let cmd = parse::<UpdateBody>(
            r#"{"metro": null, "owner_id": 3, "lat": null, "lon": null}"#,
        )
        .into_command(1.into())
        .unwrap();

        assert_eq!(cmd.transit, Some(None));
        assert_eq!(cmd.owner_id, Some(Some(3.into())));
        assert_eq!(cmd.location, Some(None));
        assert!(cmd.name.is_none());
        assert!(cmd.photos.is_none());
    }

    #[test]
    fn rejects_clearing_name() {
        let err = parse::<UpdateBody>(r#"{"name": ""}"#)
            .into_command(1.into())
            .unwrap_err();

        assert_eq!(err.0[0].field, "name");
    }

    #[test]
    fn parses_toggle() {
        let (flag, current) =
            parse::<ToggleBody>(r#"{"flag": "archived", "current": false}"#)
                .parse()
                .unwrap();

        assert_eq!(flag, publication::Flag::Archived);
        assert!(!current);
    }
}
