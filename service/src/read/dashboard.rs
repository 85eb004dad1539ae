//! Owner dashboard read definitions.

use crate::{
    domain::{promotion, Owner, Promotion},
    read::property::Entry,
};

/// Everything an [`Owner`] sees on its dashboard.
#[derive(Clone, Debug)]
pub struct Dashboard {
    /// The [`Owner`] itself.
    pub owner: Owner,

    /// All the [`Property`]s of the [`Owner`] with their stats, whatever
    /// their publication state is.
    ///
    /// [`Property`]: crate::domain::Property
    pub objects: Vec<Entry>,

    /// Active [`Promotion`]s.
    pub promotions: Vec<Offer>,
}

/// Active [`Promotion`] shown on a [`Dashboard`].
#[derive(Clone, Debug)]
pub struct Offer {
    /// The [`Promotion`] itself.
    pub promotion: Promotion,

    /// Indicator whether the [`Promotion`] has already ended, though still
    /// being active.
    pub is_expired: bool,
}

impl Offer {
    /// Selects active [`Promotion`]s as [`Offer`]s at the provided moment.
    #[must_use]
    pub fn select<I>(
        promotions: I,
        at: promotion::ValidityDateTime,
    ) -> Vec<Self>
    where
        I: IntoIterator<Item = Promotion>,
    {
        promotions
            .into_iter()
            .filter(|p| p.is_active)
            .map(|promotion| Self {
                is_expired: promotion.is_expired(at),
                promotion,
            })
            .collect()
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::domain::{
        promotion::{self, Validity, ValidityDateTime},
        Promotion,
    };

    use super::Offer;

    fn promotion(
        id: i32,
        until: Option<ValidityDateTime>,
        is_active: bool,
    ) -> Promotion {
        let from = ValidityDateTime::from_unix_timestamp(0).unwrap();
        Promotion {
            id: id.into(),
            title: promotion::Title::new("Ночь в подарок").unwrap(),
            description: None,
            validity: Validity::new(from, until).unwrap(),
            is_active,
            created_at: from.coerce(),
        }
    }

    #[test]
    fn shows_active_promotions_flagging_expired() {
        let now = ValidityDateTime::now();
        let ended = now - Duration::from_secs(60);

        let offers = Offer::select(
            [
                promotion(1, None, true),
                promotion(2, Some(ended), true),
                promotion(3, None, false),
            ],
            now,
        );

        let shown = offers
            .iter()
            .map(|o| (i32::from(o.promotion.id), o.is_expired))
            .collect::<Vec<_>>();
        assert_eq!(shown, [(1, false), (2, true)]);
    }
}
