//! Hourly pricing shared by [`Property`]s and [`Room`]s.
//!
//! [`Property`]: crate::domain::Property
//! [`Room`]: crate::domain::Room

use derive_more::{Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Price of a single hour of rent.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of integer digits of a [`Price`].
    pub const INTEGER_DIGITS: u32 = 10;

    /// Maximum number of decimal places of a [`Price`].
    pub const SCALE: u32 = 2;

    /// Creates a new [`Price`] if the given `amount` is not negative and fits
    /// into [`Price::INTEGER_DIGITS`] and [`Price::SCALE`].
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        let non_negative = !amount.is_sign_negative() || amount.is_zero();
        (non_negative && fits(amount, Self::INTEGER_DIGITS, Self::SCALE))
            .then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

/// Checks whether the provided `value` has no more than `integer_digits`
/// before and `scale` digits after the decimal point.
pub(crate) fn fits(value: Decimal, integer_digits: u32, scale: u32) -> bool {
    value.normalize().scale() <= scale
        && value.abs() < Decimal::from(10_u64.pow(integer_digits))
}

/// Minimum number of hours a rent may last.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
pub struct MinHours(u16);

impl MinHours {
    /// [`MinHours`] applied when none are specified.
    pub const DEFAULT: Self = Self(1);

    /// Creates new [`MinHours`] if the given `hours` are at least one.
    #[must_use]
    pub const fn new(hours: u16) -> Option<Self> {
        if hours == 0 {
            None
        } else {
            Some(Self(hours))
        }
    }

    /// Returns the number of hours.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Default for MinHours {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{MinHours, Price};

    #[test]
    fn price_is_not_negative() {
        assert!(Price::new(Decimal::new(3000, 0)).is_some());
        assert!(Price::new(Decimal::ZERO).is_some());
        assert!(Price::new(Decimal::new(-1, 2)).is_none());
    }

    #[test]
    fn price_fits_two_decimals_and_ten_digits() {
        assert!(Price::new(Decimal::new(999_999_999_999, 2)).is_some());
        assert!(Price::new(Decimal::new(3_000_500, 3)).is_some());
        assert!(Price::new(Decimal::new(3_000_555, 3)).is_none());
        assert!(Price::new(Decimal::from(10_000_000_000_u64)).is_none());
        assert!(Price::new(Decimal::from(100_000_000_000_000_u64)).is_none());
    }

    #[test]
    fn min_hours_are_positive() {
        assert_eq!(MinHours::new(0), None);
        assert_eq!(MinHours::new(2).map(MinHours::get), Some(2));
        assert_eq!(MinHours::default().get(), 1);
    }
}
