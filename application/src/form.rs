//! Validation of submitted forms.
//!
//! Clients submit numbers either as JSON numbers or as text (possibly with a
//! decimal comma), and leave optional fields empty rather than omitting them.
//! A [`Form`] parses such [`Raw`] values into domain types, collecting every
//! [`Violation`] instead of stopping on the first one.

use std::{borrow::Cow, num::NonZeroU16, str::FromStr};

use common::DateTimeOf;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use service::domain::{
    brief, contact, credentials, image, owner,
    pricing::{MinHours, Price},
    promotion, property, publication, room, telegram,
};

use crate::{define_error, Error};

/// Value of a form field as submitted by a client.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Raw {
    /// JSON boolean.
    Bool(bool),

    /// JSON number.
    Number(serde_json::Number),

    /// JSON string.
    Text(String),
}

impl Raw {
    /// Returns [`None`] if this [`Raw`] value is a blank text.
    fn non_empty(self) -> Option<Self> {
        match &self {
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Bool(_) | Self::Number(_) | Self::Text(_) => Some(self),
        }
    }

    /// Returns this [`Raw`] value as a trimmed text.
    fn into_text(self) -> Result<String, Message> {
        match self {
            Self::Text(s) => Ok(s.trim().to_owned()),
            Self::Number(_) | Self::Bool(_) => Err("must be a text".into()),
        }
    }

    /// Parses this [`Raw`] value as a [`Decimal`].
    fn into_decimal(self) -> Result<Decimal, Message> {
        let text = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().replace(',', "."),
            Self::Bool(_) => return Err(NOT_A_NUMBER.into()),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| NOT_A_NUMBER.into())
    }

    /// Parses this [`Raw`] value as an integer.
    fn into_integer<T: TryFrom<i64>>(self) -> Result<T, Message> {
        let int = match self {
            Self::Number(n) => n.as_i64(),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
        .ok_or("must be an integer")?;
        T::try_from(int).map_err(|_| "is out of range".into())
    }

    /// Parses this [`Raw`] value as a [`f64`].
    fn into_float(self) -> Result<f64, Message> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().replace(',', ".").parse().ok(),
            Self::Bool(_) => None,
        }
        .filter(|f: &f64| f.is_finite())
        .ok_or_else(|| NOT_A_NUMBER.into())
    }
}

/// Message of a value not being a number.
const NOT_A_NUMBER: &str = "must be a number";

/// Message of a [`Violation`].
pub type Message = Cow<'static, str>;

/// Type parseable from a [`Raw`] form value.
pub trait FromRaw: Sized {
    /// Parses a [`Raw`] value.
    ///
    /// # Errors
    ///
    /// With a [`Message`] describing why the value is unacceptable.
    fn from_raw(raw: Raw) -> Result<Self, Message>;
}

/// Implements [`FromRaw`] for types parsed from a trimmed text.
macro_rules! from_text {
    ($($ty:ty),+ $(,)?) => {$(
        impl FromRaw for $ty {
            fn from_raw(raw: Raw) -> Result<Self, Message> {
                raw.into_text()?
                    .parse()
                    .map_err(|_| Message::from("has invalid format"))
            }
        }
    )+};
}

from_text!(
    brief::Website,
    contact::FullName,
    contact::Phone,
    credentials::Login,
    image::Url,
    promotion::Description,
    promotion::Title,
    property::Address,
    property::Category,
    property::Description,
    property::Name,
    property::TransitLabel,
    publication::Flag,
    publication::Status,
    room::Amenity,
    room::Description,
    room::FeatureIcon,
    room::FeatureLabel,
    room::Name,
    telegram::Handle,
);

impl FromRaw for credentials::Password {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        match raw {
            Raw::Text(s) => Self::new(s).ok_or("has invalid format".into()),
            Raw::Number(_) | Raw::Bool(_) => Err("must be a text".into()),
        }
    }
}

/// Message of a value not being a boolean.
const BOOLEAN: &str = "must be a boolean";

impl FromRaw for bool {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        match raw {
            Raw::Bool(b) => Ok(b),
            Raw::Text(s) => s.trim().parse().map_err(|_| BOOLEAN.into()),
            Raw::Number(_) => Err(BOOLEAN.into()),
        }
    }
}

impl FromRaw for Price {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        let amount = raw.into_decimal()?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err("must not be negative".into());
        }
        Self::new(amount)
            .ok_or_else(|| out_of_range(Self::INTEGER_DIGITS, Self::SCALE))
    }
}

impl FromRaw for property::Area {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        let value = raw.into_decimal()?;
        if value.is_sign_negative() || value.is_zero() {
            return Err("must be positive".into());
        }
        Self::new(value)
            .ok_or_else(|| out_of_range(Self::INTEGER_DIGITS, Self::SCALE))
    }
}

/// Returns the [`Message`] of a decimal not fitting into the provided
/// number of `integer_digits` and `scale`.
fn out_of_range(integer_digits: u32, scale: u32) -> Message {
    format!(
        "must have at most {integer_digits} integer digits and {scale} \
         decimal places",
    )
    .into()
}

impl FromRaw for property::Capacity {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        Self::new(raw.into_integer()?).ok_or("must be at least 1".into())
    }
}

impl FromRaw for MinHours {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        Self::new(raw.into_integer()?).ok_or("must be at least 1".into())
    }
}

impl FromRaw for NonZeroU16 {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        Self::new(raw.into_integer()?).ok_or("must be at least 1".into())
    }
}

impl FromRaw for owner::Id {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        raw.into_integer::<i32>().map(Into::into)
    }
}

impl FromRaw for f64 {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        raw.into_float()
    }
}

impl<Of: ?Sized> FromRaw for DateTimeOf<Of> {
    fn from_raw(raw: Raw) -> Result<Self, Message> {
        Self::from_rfc3339(&raw.into_text()?)
            .map_err(|_| "must be an RFC 3339 date and time".into())
    }
}

/// Rejected form field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Violation {
    /// Name of the rejected field.
    pub field: &'static str,

    /// Reason of the rejection.
    pub message: Message,
}

/// Marker of a field that failed to parse.
///
/// Every [`Invalid`] produced by a [`Form`] has a [`Violation`] recorded.
#[derive(Clone, Copy, Debug)]
pub struct Invalid;

/// Result of parsing a single field.
pub type Checked<T> = Result<T, Invalid>;

/// Collector of the [`Violation`]s of a submitted form.
#[derive(Debug, Default)]
pub struct Form {
    /// [`Violation`]s recorded so far.
    violations: Vec<Violation>,
}

impl Form {
    /// Parses a field that must be present and non-empty.
    pub fn required<T: FromRaw>(
        &mut self,
        field: &'static str,
        raw: Option<Raw>,
    ) -> Checked<T> {
        match raw.and_then(Raw::non_empty) {
            Some(raw) => self.parse(field, raw),
            None => Err(self.violate(field, "is required".into())),
        }
    }

    /// Parses a field that may be absent, [`None`] or empty.
    pub fn optional<T: FromRaw>(
        &mut self,
        field: &'static str,
        raw: Option<Raw>,
    ) -> Checked<Option<T>> {
        raw.and_then(Raw::non_empty)
            .map(|raw| self.parse(field, raw))
            .transpose()
    }

    /// Parses a partial update of a field that cannot be cleared.
    ///
    /// An absent field is left unchanged, while an empty one is a
    /// [`Violation`].
    pub fn update<T: FromRaw>(
        &mut self,
        field: &'static str,
        raw: Option<Option<Raw>>,
    ) -> Checked<Option<T>> {
        raw.map(|raw| self.required(field, raw)).transpose()
    }

    /// Parses a partial update of a field that can be cleared.
    ///
    /// An absent field is left unchanged, while an empty one clears the
    /// value.
    pub fn patch<T: FromRaw>(
        &mut self,
        field: &'static str,
        raw: Option<Option<Raw>>,
    ) -> Checked<Option<Option<T>>> {
        raw.map(|raw| self.optional(field, raw)).transpose()
    }

    /// Parses every item of a list field, skipping empty ones.
    pub fn list<T: FromRaw>(
        &mut self,
        field: &'static str,
        raw: Vec<Raw>,
    ) -> Checked<Vec<T>> {
        let parsed = raw
            .into_iter()
            .filter_map(Raw::non_empty)
            .map(|raw| self.parse(field, raw))
            .collect::<Vec<_>>();
        parsed.into_iter().collect()
    }

    /// Records a [`Violation`] of the provided `field` not covered by
    /// [`FromRaw`].
    pub fn violate(
        &mut self,
        field: &'static str,
        message: Message,
    ) -> Invalid {
        self.violations.push(Violation { field, message });
        Invalid
    }

    /// Builds the final value out of the parsed fields.
    ///
    /// # Errors
    ///
    /// With a [`ValidationError`] carrying every recorded [`Violation`].
    pub fn build<T>(
        self,
        f: impl FnOnce() -> Checked<T>,
    ) -> Result<T, ValidationError> {
        f().ok()
            .filter(|_| self.violations.is_empty())
            .ok_or(ValidationError(self.violations))
    }

    /// Parses the provided [`Raw`] value of the `field`.
    fn parse<T: FromRaw>(
        &mut self,
        field: &'static str,
        raw: Raw,
    ) -> Checked<T> {
        T::from_raw(raw).map_err(|msg| self.violate(field, msg))
    }
}

/// Error of a rejected form, listing all its [`Violation`]s.
#[derive(Clone, Debug)]
pub struct ValidationError(pub Vec<Violation>);

impl From<ValidationError> for Error {
    fn from(ValidationError(fields): ValidationError) -> Self {
        define_error! {
            enum FormError {
                #[code = "VALIDATION_FAILED"]
                #[status = BAD_REQUEST]
                #[message = "Submitted data is invalid"]
                ValidationFailed,
            }
        }

        Self {
            fields,
            ..FormError::ValidationFailed.into()
        }
    }
}

/// Deserializes a field distinguishing an explicit `null` from an absent
/// one.
///
/// Must be used along with `#[serde(default)]`.
///
/// # Errors
///
/// If the value cannot be deserialized as `T`.
pub fn patch<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use service::domain::{
        pricing::{MinHours, Price},
        property,
    };

    use super::{Form, Raw};

    #[derive(Deserialize)]
    struct Body {
        price: Option<Raw>,
        area: Option<Raw>,
        min_hours: Option<Raw>,
        #[serde(default, deserialize_with = "super::patch")]
        transit: Option<Option<Raw>>,
    }

    fn body(json: &str) -> Body {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_numbers_and_numeric_text_equally() {
        let mut form = Form::default();

        let from_number =
            form.required::<Price>("price", body(r#"{"price":3000}"#).price);
        let from_text =
            form.required::<Price>("price", body(r#"{"price":"3000"}"#).price);
        let with_comma = form
            .required::<Price>("price", body(r#"{"price":"99,5"}"#).price);

        assert_eq!(from_number.unwrap(), from_text.unwrap());
        assert_eq!(from_number.unwrap().amount(), Decimal::from(3000));
        assert_eq!(with_comma.unwrap().amount(), Decimal::new(995, 1));
        assert!(form.build(|| Ok(())).is_ok());
    }

    #[test]
    fn treats_empty_optional_as_absent() {
        let mut form = Form::default();

        let area = form.optional::<property::Area>(
            "area",
            body(r#"{"area":""}"#).area,
        );
        let hours = form
            .optional::<MinHours>("min_hours", body("{}").min_hours)
            .map(Option::unwrap_or_default);

        assert_eq!(area.unwrap(), None);
        assert_eq!(hours.unwrap(), MinHours::DEFAULT);
    }

    #[test]
    fn aggregates_violations() {
        let b = body(r#"{"price":"abc","area":"-3","min_hours":0}"#);
        let mut form = Form::default();

        let price = form.required::<Price>("price", b.price);
        let area = form.optional::<property::Area>("area", b.area);
        let hours = form.required::<MinHours>("min_hours", b.min_hours);
        let err = form
            .build(|| Ok((price?, area?, hours?)))
            .unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, ["price", "area", "min_hours"]);
        assert_eq!(err.0[0].message, "must be a number");
    }

    #[test]
    fn rejects_decimals_not_fitting_storage() {
        let b = body(r#"{"price":1e14,"area":"3000,555"}"#);
        let mut form = Form::default();

        let huge = form.required::<Price>("price", b.price);
        let precise = form.optional::<property::Area>("area", b.area);
        let err = form.build(|| Ok((huge?, precise?))).unwrap_err();

        let fields = err.0.iter().map(|v| v.field).collect::<Vec<_>>();
        assert_eq!(fields, ["price", "area"]);
        assert_eq!(
            err.0[0].message,
            "must have at most 10 integer digits and 2 decimal places",
        );
    }

    #[test]
    fn requires_present_values() {
        let mut form = Form::default();

        let price = form.required::<Price>("price", body("{}").price);
        let err = form.build(|| price).unwrap_err();

        assert_eq!(err.0.len(), 1);
        assert_eq!(err.0[0].message, "is required");
    }

    #[test]
    fn distinguishes_absent_from_null_in_patches() {
        let mut form = Form::default();

        let absent = form.patch::<property::TransitLabel>(
            "metro",
            body("{}").transit,
        );
        let cleared = form.patch::<property::TransitLabel>(
            "metro",
            body(r#"{"transit":null}"#).transit,
        );
        let set = form.patch::<property::TransitLabel>(
            "metro",
            body(r#"{"transit":" Тверская "}"#).transit,
        );

        assert_eq!(absent.unwrap(), None);
        assert_eq!(cleared.unwrap(), Some(None));
        assert_eq!(
            set.unwrap().flatten().map(|t| t.to_string()),
            Some("Тверская".to_owned()),
        );
    }

    #[test]
    fn rejects_clearing_required_fields() {
        let mut form = Form::default();

        let price = form.update::<Price>("price", Some(None));
        let err = form.build(|| price).unwrap_err();

        assert_eq!(err.0[0].field, "price");
    }
}
