//! [`Property`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    image, owner,
    pricing::{self, MinHours, Price},
    telegram, Publication,
};

/// Rentable physical unit of any [`Category`].
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// ID of the [`Owner`] controlling this [`Property`], if any.
    ///
    /// [`Owner`]: crate::domain::Owner
    pub owner_id: Option<owner::Id>,

    /// [`Category`] of this [`Property`].
    pub category: Category,

    /// [`Name`] of this [`Property`].
    pub name: Name,

    /// [`Description`] of this [`Property`], if any.
    pub description: Option<Description>,

    /// [`Address`] of this [`Property`].
    pub address: Address,

    /// [`TransitLabel`] of this [`Property`], if any.
    pub transit: Option<TransitLabel>,

    /// [`Area`] of this [`Property`], if known.
    pub area: Option<Area>,

    /// [`Capacity`] of this [`Property`], if known.
    pub capacity: Option<Capacity>,

    /// [`Price`] of a single hour.
    pub price_per_hour: Price,

    /// [`MinHours`] of a rent.
    pub min_hours: MinHours,

    /// [`Coordinates`] of this [`Property`], if known.
    pub location: Option<Coordinates>,

    /// Cover image of this [`Property`], if any.
    pub cover_image: Option<image::Url>,

    /// Additional photos of this [`Property`].
    pub photos: Vec<image::Url>,

    /// [`telegram::Handle`] to contact about this [`Property`], if any.
    pub telegram: Option<telegram::Handle>,

    /// [`Publication`] state of this [`Property`].
    pub publication: Publication,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Property`].
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

define_kind! {
    #[doc = "Category of a [`Property`]."]
    enum Category {
        #[doc = "Hotel with rooms rented by the hour."]
        Hotel = 1,

        #[doc = "Apartment rented as a whole."]
        Apartment = 2,

        #[doc = "Sauna."]
        Sauna = 3,

        #[doc = "Conference hall."]
        Conference = 4,
    }
}

impl Category {
    /// Returns the [`CategoryConfig`] describing how this [`Category`] is
    /// presented.
    #[must_use]
    pub const fn config(self) -> &'static CategoryConfig {
        match self {
            Self::Hotel => &CategoryConfig {
                label: "Отель",
                title: "Отели",
                icon: "Building2",
                placeholder: "Найти отель по адресу или метро",
            },
            Self::Apartment => &CategoryConfig {
                label: "Апартамент",
                title: "Апартаменты",
                icon: "Home",
                placeholder: "Найти апартаменты по адресу или метро",
            },
            Self::Sauna => &CategoryConfig {
                label: "Сауна",
                title: "Сауны",
                icon: "Droplets",
                placeholder: "Найти сауну по адресу или метро",
            },
            Self::Conference => &CategoryConfig {
                label: "Конференц-зал",
                title: "Конференц-залы",
                icon: "Presentation",
                placeholder: "Найти конференц-зал по адресу или метро",
            },
        }
    }
}

/// Presentation of a [`Category`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CategoryConfig {
    /// Name of a single item of the [`Category`].
    pub label: &'static str,

    /// Title of the [`Category`] section.
    pub title: &'static str,

    /// Name of the icon representing the [`Category`].
    pub icon: &'static str,

    /// Placeholder of the search input in the [`Category`] section.
    pub placeholder: &'static str,
}

define_text! {
    /// Name of a [`Property`].
    Name(max_len = 256)
}

define_text! {
    /// Free-form description of a [`Property`].
    Description(max_len = 10_000)
}

define_text! {
    /// Free-form address of a [`Property`].
    Address(max_len = 512)
}

define_text! {
    /// Free-form label describing the nearest public transit (like a metro
    /// station) of a [`Property`].
    TransitLabel(max_len = 256)
}

/// Floor area of a [`Property`] or a [`Room`].
///
/// [`Room`]: crate::domain::Room
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Area(Decimal);

impl Area {
    /// Maximum number of integer digits of an [`Area`].
    pub const INTEGER_DIGITS: u32 = 8;

    /// Maximum number of decimal places of an [`Area`].
    pub const SCALE: u32 = 2;

    /// Creates a new [`Area`] if the given `value` is positive and fits into
    /// [`Area::INTEGER_DIGITS`] and [`Area::SCALE`].
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        let positive = value.is_sign_positive() && !value.is_zero();
        (positive && pricing::fits(value, Self::INTEGER_DIGITS, Self::SCALE))
            .then_some(Self(value))
    }

    /// Returns the value of this [`Area`].
    #[must_use]
    pub const fn get(self) -> Decimal {
        self.0
    }
}

/// Number of rooms or guests a [`Property`] fits.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
pub struct Capacity(u16);

impl Capacity {
    /// Creates a new [`Capacity`] if the given `value` is at least one.
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the value of this [`Capacity`].
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// Geographic coordinates of a [`Property`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees.
    latitude: f64,

    /// Longitude in degrees.
    longitude: f64,
}

impl Coordinates {
    /// Creates new [`Coordinates`] if the given `latitude` is within
    /// `[-90; 90]` and `longitude` is within `[-180; 180]`.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        ((-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude))
        .then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;
