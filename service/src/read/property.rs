//! [`Property`] read model definitions.

use common::{define_kind, DateTimeOf};

use crate::domain::{property, Property};

/// [`Property`] along with its [`Stats`].
#[derive(Clone, Debug)]
pub struct Entry {
    /// The [`Property`] itself.
    pub property: Property,

    /// [`Stats`] of the [`Property`].
    pub stats: Stats,
}

/// Audience statistics of a [`Property`].
///
/// Counters only grow.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of times the [`Property`] details were viewed.
    pub views: i64,

    /// Number of times the [`Property`] contact was clicked.
    pub clicks: i64,

    /// When the [`Property`] details were viewed last time.
    pub last_view_at: Option<HitDateTime>,

    /// When the [`Property`] contact was clicked last time.
    pub last_click_at: Option<HitDateTime>,
}

impl Stats {
    /// Accounts the provided [`Hit`] in these [`Stats`].
    pub fn record(&mut self, hit: &Hit) {
        let (count, last_at) = match hit.counter {
            Counter::View => (&mut self.views, &mut self.last_view_at),
            Counter::Click => (&mut self.clicks, &mut self.last_click_at),
        };
        *count = count.saturating_add(1);
        *last_at = Some(hit.at);
    }
}

define_kind! {
    #[doc = "Counter of [`Stats`]."]
    enum Counter {
        #[doc = "[`Stats::views`] counter."]
        View = 1,

        #[doc = "[`Stats::clicks`] counter."]
        Click = 2,
    }
}

/// Single audience event to be accounted in [`Stats`].
#[derive(Clone, Copy, Debug)]
pub struct Hit {
    /// ID of the [`Property`] being hit.
    pub property_id: property::Id,

    /// [`Counter`] to increment.
    pub counter: Counter,

    /// When the [`Hit`] happened.
    pub at: HitDateTime,
}

/// Date and time of a [`Hit`].
pub type HitDateTime = DateTimeOf<Hit>;

pub mod list {
    //! [`Property`] list definitions.

    use crate::domain::{owner, property, publication, Property};

    /// Filter of an admin [`Property`] list.
    ///
    /// Every present criterion must hold.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Required [`publication::Status`].
        pub status: Option<publication::Status>,

        /// Required [`property::Category`].
        pub category: Option<property::Category>,

        /// Required owner.
        pub owner_id: Option<owner::Id>,
    }

    impl Filter {
        /// Indicates whether the provided [`Property`] satisfies this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, property: &Property) -> bool {
            self.status
                .map_or(true, |s| property.publication.status() == s)
                && self.category.map_or(true, |c| property.category == c)
                && self
                    .owner_id
                    .map_or(true, |id| property.owner_id == Some(id))
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Counter, Hit, HitDateTime, Stats};

    #[test]
    fn hit_increments_exactly_one_counter() {
        let at = HitDateTime::now();
        let mut stats = Stats::default();

        stats.record(&Hit {
            property_id: 1.into(),
            counter: Counter::Click,
            at,
        });

        assert_eq!(stats.clicks, 1);
        assert_eq!(stats.last_click_at, Some(at));
        assert_eq!(stats.views, 0);
        assert_eq!(stats.last_view_at, None);
    }
}
