//! Public catalog read definitions.

use crate::{
    domain::{property, Property, Room},
    read::property::Entry,
};

/// Filter of the public catalog.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// [`property::Category`] to show. All of them, if [`None`].
    pub category: Option<property::Category>,

    /// Text to search for in an address or a transit label.
    pub search: Option<String>,
}

impl Filter {
    /// Selects the [`Entry`]s matching this [`Filter`], preserving their
    /// order.
    ///
    /// Only listed [`Property`]s ever pass.
    #[must_use]
    pub fn apply<I>(&self, entries: I) -> Vec<Entry>
    where
        I: IntoIterator<Item = Entry>,
    {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        entries
            .into_iter()
            .filter(|e| {
                let p = &e.property;
                p.publication.is_listed()
                    && self.category.map_or(true, |c| p.category == c)
                    && needle.as_deref().map_or(true, |n| mentions(p, n))
            })
            .collect()
    }
}

/// Checks whether the address or the transit label of the provided
/// [`Property`] contains the lowercased `needle`.
fn mentions(property: &Property, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(property.address.as_ref())
        || property
            .transit
            .as_ref()
            .is_some_and(|t| contains(t.as_ref()))
}

/// Listed [`Property`] with its listed [`Room`]s.
#[derive(Clone, Debug)]
pub struct Details {
    /// The [`Property`] with its stats.
    pub entry: Entry,

    /// Listed [`Room`]s of the [`Property`].
    pub rooms: Vec<Room>,
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::{
            pricing::{MinHours, Price},
            property::{self, Category},
            Property, Publication,
        },
        read::property::{Entry, Stats},
    };

    use super::Filter;

    fn entry(
        id: i32,
        category: Category,
        address: &str,
        transit: Option<&str>,
        publication: Publication,
    ) -> Entry {
        let now = DateTime::now();
        Entry {
            property: Property {
                id: id.into(),
                owner_id: None,
                category,
                name: property::Name::new(format!("Объект {id}")).unwrap(),
                description: None,
                address: property::Address::new(address).unwrap(),
                transit: transit
                    .map(|t| property::TransitLabel::new(t).unwrap()),
                area: None,
                capacity: None,
                price_per_hour: Price::new(3000.into()).unwrap(),
                min_hours: MinHours::default(),
                location: None,
                cover_image: None,
                photos: vec![],
                telegram: None,
                publication,
                created_at: now.coerce(),
                updated_at: now.coerce(),
            },
            stats: Stats::default(),
        }
    }

    fn ids(entries: &[Entry]) -> Vec<i32> {
        entries.iter().map(|e| e.property.id.into()).collect()
    }

    const ACTIVE: Publication = Publication::new(true);

    const DRAFT: Publication = Publication::new(false);

    #[test]
    fn never_lists_archived_or_drafts() {
        let archived = Publication {
            is_published: true,
            is_archived: true,
        };
        let entries = vec![
            entry(1, Category::Hotel, "Арбат, 1", None, ACTIVE),
            entry(2, Category::Hotel, "Арбат, 2", None, archived),
            entry(3, Category::Hotel, "Арбат, 3", None, DRAFT),
        ];

        let all = Filter::default().apply(entries.clone());
        let hotels = Filter {
            category: Some(Category::Hotel),
            search: None,
        }
        .apply(entries);

        assert_eq!(ids(&all), [1]);
        assert_eq!(ids(&hotels), [1]);
    }

    #[test]
    fn missing_category_means_all() {
        let entries = vec![
            entry(1, Category::Sauna, "Арбат, 1", None, ACTIVE),
            entry(2, Category::Apartment, "Арбат, 2", None, ACTIVE),
            entry(3, Category::Sauna, "Арбат, 3", None, ACTIVE),
        ];

        let all = Filter::default().apply(entries.clone());
        let saunas = Filter {
            category: Some(Category::Sauna),
            search: None,
        }
        .apply(entries);

        assert_eq!(ids(&all), [1, 2, 3]);
        assert_eq!(ids(&saunas), [1, 3]);
    }

    #[test]
    fn searches_address_and_transit_ignoring_case() {
        let entries = vec![
            entry(1, Category::Hotel, "Арбат, 1", Some("Смоленская"), ACTIVE),
            entry(2, Category::Hotel, "Тверская, 25", None, ACTIVE),
            entry(3, Category::Hotel, "Ленина, 3", Some("Пушкинская"), ACTIVE),
        ];

        for search in ["Тверская", "тверская", "  ТВЕРСКАЯ "] {
            let found = Filter {
                category: None,
                search: Some(search.into()),
            }
            .apply(entries.clone());

            assert_eq!(ids(&found), [2], "searching `{search}`");
        }

        let by_transit = Filter {
            category: None,
            search: Some("пушкин".into()),
        }
        .apply(entries);
        assert_eq!(ids(&by_transit), [3]);
    }

    #[test]
    fn blank_search_matches_everything() {
        let entries = vec![
            entry(2, Category::Hotel, "Арбат, 2", None, ACTIVE),
            entry(1, Category::Hotel, "Арбат, 1", None, ACTIVE),
        ];

        let found = Filter {
            category: None,
            search: Some("   ".into()),
        }
        .apply(entries);

        assert_eq!(ids(&found), [2, 1]);
    }
}
