//! [`Room`]-related definitions.

use common::datetime::serde::rfc3339;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, contact, image, property, publication, room, telegram},
    query::{self, Query as _},
};

use crate::{
    api::{
        self,
        property::{PropertyError, ToggleBody},
        Created, Json, Path, Success,
    },
    define_error,
    form::{self, Checked, Form, Raw, ValidationError},
    AsError, Context, Error,
};

/// [`domain::Room`] as seen by the API clients.
#[derive(Clone, Debug, Serialize)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: room::Id,

    /// ID of the property this [`Room`] belongs to.
    pub property_id: property::Id,

    /// Name of this [`Room`].
    pub name: room::Name,

    /// Price of a single hour.
    pub price_per_hour: Decimal,

    /// Floor area of this [`Room`].
    pub area: Option<Decimal>,

    /// Description of this [`Room`].
    pub description: Option<room::Description>,

    /// Minimum hours of a rent.
    pub min_hours: u16,

    /// Photos of this [`Room`].
    pub photos: Vec<image::Url>,

    /// Highlighted features of this [`Room`].
    pub features: Vec<room::Feature>,

    /// Amenities this [`Room`] offers.
    pub amenities: Vec<room::Amenity>,

    /// Telegram handle to book this [`Room`] with.
    pub telegram: Option<telegram::Handle>,

    /// Phone to book this [`Room`] with.
    pub phone: Option<contact::Phone>,

    /// Indicator whether this [`Room`] is published.
    pub is_published: bool,

    /// Indicator whether this [`Room`] is archived.
    pub is_archived: bool,

    /// Status derived from the flags above.
    pub status: publication::Status,

    /// When this [`Room`] was created.
    #[serde(with = "rfc3339")]
    pub created_at: room::CreationDateTime,

    /// When this [`Room`] was modified last time.
    #[serde(with = "rfc3339")]
    pub updated_at: room::ModificationDateTime,
}

impl From<domain::Room> for Room {
    fn from(room: domain::Room) -> Self {
        let domain::Room {
            id,
            property_id,
            name,
            price_per_hour,
            area,
            description,
            min_hours,
            photos,
            features,
            amenities,
            telegram,
            phone,
            publication,
            created_at,
            updated_at,
        } = room;

        Self {
            id,
            property_id,
            name,
            price_per_hour: price_per_hour.amount(),
            area: area.map(property::Area::get),
            description,
            min_hours: min_hours.get(),
            photos,
            features,
            amenities,
            telegram,
            phone,
            is_published: publication.is_published,
            is_archived: publication.is_archived,
            status: publication.status(),
            created_at,
            updated_at,
        }
    }
}

/// List of [`Room`]s.
#[derive(Clone, Debug, Serialize)]
pub struct List {
    /// [`Room`]s of the list.
    pub rooms: Vec<Room>,
}

/// Lists all the [`Room`]s of a property, archived ones included.
///
/// # Errors
///
/// Possible error codes:
/// - `PROPERTY_NOT_EXISTS` - the property does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "listRooms",
        otel.name = api::SPAN_NAME,
        property.id = %property_id,
    ),
)]
pub async fn list(
    ctx: Context,
    Path(property_id): Path<property::Id>,
) -> Result<Json<List>, Error> {
    _ = ctx.admin_session().await?;

    let property = ctx
        .service()
        .execute(query::property::ById::by(property_id))
        .await
        .map_err(AsError::into_error)?;
    if property.is_none() {
        return Err(PropertyError::NotExists.into());
    }

    let rooms = ctx
        .service()
        .execute(query::room::ByProperty::by(property_id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(List {
        rooms: rooms.into_iter().map(Into::into).collect(),
    }))
}

/// [`room::Feature`] in a request body.
#[derive(Debug, Deserialize)]
pub struct FeatureBody {
    icon: Option<Raw>,
    label: Option<Raw>,
}

/// Parses the provided [`FeatureBody`]s within the `form`.
fn parse_features(
    form: &mut Form,
    raw: Vec<FeatureBody>,
) -> Checked<Vec<room::Feature>> {
    let parsed = raw
        .into_iter()
        .map(|f| {
            let icon = form.required("features.icon", f.icon);
            let label = form.required("features.label", f.label);
            Ok(room::Feature {
                icon: icon?,
                label: label?,
            })
        })
        .collect::<Vec<_>>();
    parsed.into_iter().collect()
}

/// Body of a [`create`] request.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    name: Option<Raw>,
    price_per_hour: Option<Raw>,
    area: Option<Raw>,
    description: Option<Raw>,
    min_hours: Option<Raw>,
    photos: Option<Vec<Raw>>,
    features: Option<Vec<FeatureBody>>,
    amenities: Option<Vec<Raw>>,
    telegram: Option<Raw>,
    phone: Option<Raw>,
    is_published: Option<Raw>,
}

impl CreateBody {
    /// Parses this [`CreateBody`] into a [`command::CreateRoom`] in the
    /// property with the provided ID.
    fn into_command(
        self,
        property_id: property::Id,
    ) -> Result<command::CreateRoom, ValidationError> {
        let mut form = Form::default();
        let name = form.required("name", self.name);
        let price_per_hour =
            form.required("price_per_hour", self.price_per_hour);
        let area = form.optional("area", self.area);
        let description = form.optional("description", self.description);
        let min_hours = form.optional("min_hours", self.min_hours);
        let photos = form.list("photos", self.photos.unwrap_or_default());
        let features =
            parse_features(&mut form, self.features.unwrap_or_default());
        let amenities =
            form.list("amenities", self.amenities.unwrap_or_default());
        let telegram = form.optional("telegram", self.telegram);
        let phone = form.optional("phone", self.phone);
        let is_published = form.optional("is_published", self.is_published);

        form.build(|| {
            Ok(command::CreateRoom {
                property_id,
                name: name?,
                price_per_hour: price_per_hour?,
                area: area?,
                description: description?,
                min_hours: min_hours?.unwrap_or_default(),
                photos: photos?,
                features: features?,
                amenities: amenities?,
                telegram: telegram?,
                phone: phone?,
                is_published: is_published?.unwrap_or(true),
            })
        })
    }
}

/// Creates a new [`Room`] in a property.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `PROPERTY_NOT_EXISTS` - the property does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "createRoom",
        otel.name = api::SPAN_NAME,
        property.id = %property_id,
    ),
)]
pub async fn create(
    ctx: Context,
    Path(property_id): Path<property::Id>,
    Json(body): Json<CreateBody>,
) -> Result<Created<Room>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command(property_id)?;

    let room = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Created(room.into()))
}

/// Body of an [`update`] request.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    #[serde(default, deserialize_with = "form::patch")]
    name: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    price_per_hour: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    area: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    description: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    min_hours: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    photos: Option<Option<Vec<Raw>>>,
    #[serde(default, deserialize_with = "form::patch")]
    features: Option<Option<Vec<FeatureBody>>>,
    #[serde(default, deserialize_with = "form::patch")]
    amenities: Option<Option<Vec<Raw>>>,
    #[serde(default, deserialize_with = "form::patch")]
    telegram: Option<Option<Raw>>,
    #[serde(default, deserialize_with = "form::patch")]
    phone: Option<Option<Raw>>,
}

impl UpdateBody {
    /// Parses this [`UpdateBody`] into a [`command::UpdateRoom`] of the
    /// [`Room`] with the provided ID.
    fn into_command(
        self,
        id: room::Id,
    ) -> Result<command::UpdateRoom, ValidationError> {
        let mut form = Form::default();
        let name = form.update("name", self.name);
        let price_per_hour =
            form.update("price_per_hour", self.price_per_hour);
        let area = form.patch("area", self.area);
        let description = form.patch("description", self.description);
        let min_hours = form.update("min_hours", self.min_hours);
        let photos = self
            .photos
            .map(|p| form.list("photos", p.unwrap_or_default()))
            .transpose();
        let features = self
            .features
            .map(|f| parse_features(&mut form, f.unwrap_or_default()))
            .transpose();
        let amenities = self
            .amenities
            .map(|a| form.list("amenities", a.unwrap_or_default()))
            .transpose();
        let telegram = form.patch("telegram", self.telegram);
        let phone = form.patch("phone", self.phone);

        form.build(|| {
            Ok(command::UpdateRoom {
                name: name?,
                price_per_hour: price_per_hour?,
                area: area?,
                description: description?,
                min_hours: min_hours?,
                photos: photos?,
                features: features?,
                amenities: amenities?,
                telegram: telegram?,
                phone: phone?,
                ..command::UpdateRoom::new(id)
            })
        })
    }
}

/// Updates the provided fields of a [`Room`].
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `ROOM_NOT_EXISTS` - the [`Room`] does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "updateRoom",
        otel.name = api::SPAN_NAME,
        room.id = %id,
    ),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<room::Id>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Room>, Error> {
    _ = ctx.admin_session().await?;
    let cmd = body.into_command(id)?;

    let room = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(room.into()))
}

/// Deletes a [`Room`] for good.
///
/// # Errors
///
/// Possible error codes:
/// - `ROOM_NOT_EXISTS` - the [`Room`] does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "deleteRoom",
        otel.name = api::SPAN_NAME,
        room.id = %id,
    ),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<room::Id>,
) -> Result<Json<Success>, Error> {
    _ = ctx.admin_session().await?;

    let room = ctx
        .service()
        .execute(command::DeleteRoom { room_id: id })
        .await
        .map_err(AsError::into_error)?;
    tracing::debug!(property.id = %room.property_id, "room deleted");

    Ok(Json(Success::new()))
}

/// Flips the `published` or `archived` flag of a [`Room`], unless it was
/// changed since the client has seen it.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_FAILED` - the submitted data is invalid;
/// - `ROOM_NOT_EXISTS` - the [`Room`] does not exist;
/// - `STALE_STATE` - the flag differs from the `current` one.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "toggleRoom",
        otel.name = api::SPAN_NAME,
        room.id = %id,
    ),
)]
pub async fn toggle(
    ctx: Context,
    Path(id): Path<room::Id>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<Room>, Error> {
    _ = ctx.admin_session().await?;
    let (flag, current) = body.parse()?;

    let room = ctx
        .service()
        .execute(command::ToggleRoom {
            room_id: id,
            flag,
            current,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(room.into()))
}

define_error! {
    enum RoomError {
        #[code = "ROOM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Room` does not exist"]
        NotExists,
    }
}

impl AsError for command::create_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

impl AsError for command::update_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::NotExists.into()),
        }
    }
}

impl AsError for command::toggle_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::NotExists.into()),
            Self::StaleState(_) => Some(api::StateError::Stale.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{CreateBody, UpdateBody};

    #[test]
    fn creates_published_room_by_default() {
        let cmd = serde_json::from_str::<CreateBody>(
            r#"{
                "name": "Люкс",
                "price_per_hour": "2500,50",
                "photos": ["", "/images/a.jpg"]
            }"#,
        )
        .unwrap()
        .into_command(4.into())
        .unwrap();

        assert_eq!(cmd.property_id, 4.into());
        assert_eq!(cmd.price_per_hour.amount(), Decimal::new(250_050, 2));
        assert_eq!(cmd.min_hours.get(), 1);
        assert_eq!(cmd.photos.len(), 1);
        assert!(cmd.is_published);
    }

    #[test]
    fn parses_features_and_amenities() {
        let cmd = serde_json::from_str::<CreateBody>(
            r#"{
                "name": "Люкс",
                "price_per_hour": 2500,
                "features": [{"icon": "Bath", "label": "Джакузи"}],
                "amenities": ["Wi-Fi", "", "Сауна"],
                "telegram": "@suite",
                "phone": ""
            }"#,
        )
        .unwrap()
        .into_command(4.into())
        .unwrap();

        assert_eq!(cmd.features.len(), 1);
        assert_eq!(cmd.features[0].label.to_string(), "Джакузи");
        assert_eq!(cmd.amenities.len(), 2);
        assert_eq!(cmd.telegram.unwrap().username(), "suite");
        assert!(cmd.phone.is_none());
    }

    #[test]
    fn reports_incomplete_feature() {
        let err = serde_json::from_str::<CreateBody>(
            r#"{
                "name": "Люкс",
                "price_per_hour": 2500,
                "features": [{"icon": "Bath"}]
            }"#,
        )
        .unwrap()
        .into_command(4.into())
        .unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, ["features.label"]);
    }

    #[test]
    fn rejects_invalid_photo() {
        let err = serde_json::from_str::<CreateBody>(
            r#"{"name": "Люкс", "price_per_hour": 1, "photos": ["ftp://x"]}"#,
        )
        .unwrap()
        .into_command(4.into())
        .unwrap_err();

        assert_eq!(err.0[0].field, "photos");
    }

    #[test]
    fn clears_photos_with_null() {
        let cmd = serde_json::from_str::<UpdateBody>(
            r#"{"photos": null, "area": ""}"#,
        )
        .unwrap()
        .into_command(2.into())
        .unwrap();

        assert_eq!(cmd.photos, Some(Vec::new()));
        assert_eq!(cmd.area, Some(None));
        assert!(cmd.name.is_none());
    }
}
