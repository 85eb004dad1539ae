//! In-memory [`Database`] for tests.
//!
//! Transactions are not isolated: every operation is applied immediately, so
//! [`Transact`] shares the state and [`Commit`] does nothing.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Reserve, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{
        admin, credentials, image, owner, promotion, property, room, Admin,
        Owner, Promotion, Property, Room,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`].
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

/// State of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Last issued identifier, shared by all the entities.
    sequence: i32,

    /// Stored [`Admin`]s.
    admins: BTreeMap<admin::Id, Admin>,

    /// Stored [`Owner`]s.
    owners: BTreeMap<owner::Id, Owner>,

    /// Stored [`Property`]s.
    properties: BTreeMap<property::Id, Property>,

    /// Stored [`read::property::Stats`].
    stats: HashMap<property::Id, read::property::Stats>,

    /// Stored [`Room`]s.
    rooms: BTreeMap<room::Id, Room>,

    /// Stored [`Promotion`]s.
    promotions: BTreeMap<promotion::Id, Promotion>,
}

impl Memory {
    /// Locks the [`State`] of this [`Memory`] database.
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().expect("not poisoned")
    }
}

impl State {
    /// Issues a new identifier.
    fn next_id(&mut self) -> i32 {
        self.sequence += 1;
        self.sequence
    }

    /// Returns the [`read::property::Entry`] of the provided [`Property`].
    fn entry(&self, property: &Property) -> read::property::Entry {
        read::property::Entry {
            property: property.clone(),
            stats: self.stats.get(&property.id).copied().unwrap_or_default(),
        }
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

/// Implements the basic [`Database`] operations upon an entity stored in the
/// provided [`State`] field.
macro_rules! impl_table {
    ($field:ident: $entity:ty, $id:ty) => {
        impl Database<Reserve<$id>> for Memory {
            type Ok = $id;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                _: Reserve<$id>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(<$id>::from(self.state().next_id()))
            }
        }

        impl Database<Insert<$entity>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(e): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                drop(self.state().$field.insert(e.id, e));
                Ok(())
            }
        }

        impl Database<Update<$entity>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Update(e): Update<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                drop(self.state().$field.insert(e.id, e));
                Ok(())
            }
        }

        impl Database<Lock<By<$entity, $id>>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                _: Lock<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(())
            }
        }

        impl Database<Select<By<Option<$entity>, $id>>> for Memory {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(self.state().$field.get(&by.into_inner()).cloned())
            }
        }
    };
}

impl_table!(admins: Admin, admin::Id);
impl_table!(owners: Owner, owner::Id);
impl_table!(properties: Property, property::Id);
impl_table!(rooms: Room, room::Id);
impl_table!(promotions: Promotion, promotion::Id);

impl<'l> Database<Select<By<Option<Admin>, &'l credentials::Login>>>
    for Memory
{
    type Ok = Option<Admin>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Admin>, &'l credentials::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .state()
            .admins
            .values()
            .find(|a| &a.login == login)
            .cloned())
    }
}

impl<'l> Database<Select<By<Option<Owner>, &'l credentials::Login>>>
    for Memory
{
    type Ok = Option<Owner>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Owner>, &'l credentials::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .state()
            .owners
            .values()
            .find(|o| &o.login == login)
            .cloned())
    }
}

impl Database<Select<By<Vec<read::owner::Summary>, ()>>> for Memory {
    type Ok = Vec<read::owner::Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<read::owner::Summary>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        let mut owners = state
            .owners
            .values()
            .map(|owner| read::owner::Summary {
                properties_count: state
                    .properties
                    .values()
                    .filter(|p| p.owner_id == Some(owner.id))
                    .count()
                    .try_into()
                    .expect("fits `i64`"),
                owner: owner.clone(),
            })
            .collect::<Vec<_>>();
        owners.sort_by_key(|s| Reverse((s.owner.created_at, s.owner.id)));
        Ok(owners)
    }
}

impl Database<Select<By<Option<read::property::Entry>, property::Id>>>
    for Memory
{
    type Ok = Option<read::property::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::property::Entry>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(state
            .properties
            .get(&by.into_inner())
            .map(|p| state.entry(p)))
    }
}

impl
    Database<
        Select<
            By<Vec<read::property::Entry>, read::property::list::Filter>,
        >,
    > for Memory
{
    type Ok = Vec<read::property::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::property::Entry>, read::property::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let state = self.state();
        let mut entries = state
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .map(|p| state.entry(p))
            .collect::<Vec<_>>();
        entries.sort_by_key(|e| {
            Reverse((e.property.created_at, e.property.id))
        });
        Ok(entries)
    }
}

impl Database<Delete<By<Property, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.state();
        drop(state.properties.remove(&id));
        drop(state.stats.remove(&id));
        Ok(())
    }
}

impl Database<Insert<read::property::Hit>> for Memory {
    type Ok = read::property::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(hit): Insert<read::property::Hit>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let stats = state.stats.entry(hit.property_id).or_default();
        stats.record(&hit);
        Ok(*stats)
    }
}

impl Database<Select<By<Vec<Room>, property::Id>>> for Memory {
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        Ok(self
            .state()
            .rooms
            .values()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect())
    }
}

impl Database<Delete<By<Room, room::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().rooms.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<Vec<Promotion>, ()>>> for Memory {
    type Ok = Vec<Promotion>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Promotion>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut promotions =
            self.state().promotions.values().cloned().collect::<Vec<_>>();
        promotions.sort_by_key(|p| Reverse((p.created_at, p.id)));
        Ok(promotions)
    }
}

impl Database<Delete<By<Promotion, promotion::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Promotion, promotion::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().promotions.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<HashSet<image::Url>, ()>>> for Memory {
    type Ok = HashSet<image::Url>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<HashSet<image::Url>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(state
            .properties
            .values()
            .flat_map(|p| p.cover_image.iter().chain(&p.photos))
            .chain(state.rooms.values().flat_map(|r| &r.photos))
            .cloned()
            .collect())
    }
}
