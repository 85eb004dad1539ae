//! [`Room`] definitions.

use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::{
    contact, image,
    pricing::{MinHours, Price},
    property, telegram, Publication,
};

/// Bookable sub-unit of a [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// ID of the [`Property`] this [`Room`] belongs to.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`Name`] of this [`Room`].
    pub name: Name,

    /// [`Price`] of a single hour.
    pub price_per_hour: Price,

    /// Floor area of this [`Room`], if known.
    pub area: Option<property::Area>,

    /// [`Description`] of this [`Room`], if any.
    pub description: Option<Description>,

    /// [`MinHours`] of a rent.
    pub min_hours: MinHours,

    /// Photos of this [`Room`].
    pub photos: Vec<image::Url>,

    /// Highlighted [`Feature`]s of this [`Room`], in display order.
    pub features: Vec<Feature>,

    /// [`Amenity`]s this [`Room`] offers, in display order.
    pub amenities: Vec<Amenity>,

    /// Telegram [`Handle`] to book this [`Room`] with, if differs from the
    /// [`Property`] one.
    ///
    /// [`Handle`]: telegram::Handle
    /// [`Property`]: crate::domain::Property
    pub telegram: Option<telegram::Handle>,

    /// [`Phone`] to book this [`Room`] with, if any.
    ///
    /// [`Phone`]: contact::Phone
    pub phone: Option<contact::Phone>,

    /// [`Publication`] state of this [`Room`].
    pub publication: Publication,

    /// When this [`Room`] was created.
    pub created_at: CreationDateTime,

    /// When this [`Room`] was modified last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Room`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

define_text! {
    /// Name of a [`Room`].
    Name(max_len = 256)
}

define_text! {
    /// Free-form description of a [`Room`].
    Description(max_len = 10_000)
}

/// Highlighted feature of a [`Room`], shown as an icon with a label.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Feature {
    /// [`FeatureIcon`] of this [`Feature`].
    pub icon: FeatureIcon,

    /// [`FeatureLabel`] of this [`Feature`].
    pub label: FeatureLabel,
}

define_text! {
    /// Name of the icon a [`Feature`] is shown with.
    FeatureIcon(max_len = 64)
}

define_text! {
    /// Label of a [`Feature`].
    FeatureLabel(max_len = 256)
}

define_text! {
    /// Amenity a [`Room`] offers.
    Amenity(max_len = 256)
}

/// Date and time when a [`Room`] was created.
pub type CreationDateTime = DateTimeOf<(Room, unit::Creation)>;

/// Date and time when a [`Room`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Room, unit::Modification)>;
