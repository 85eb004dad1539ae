//! Fixtures prepopulating an in-memory [`Service`] in tests.

use rust_decimal::Decimal;
use secrecy::SecretBox;

use crate::{
    domain::{
        contact, credentials, owner,
        pricing::{MinHours, Price},
        property, publication, room, Owner, Property, Room,
    },
    infra::{database, messenger, storage},
    Command as _, Service,
};

use super::{CreateOwner, CreateProperty, CreateRoom, ToggleProperty};

/// [`Service`] backed by in-memory infrastructure.
pub(crate) type Memory =
    Service<database::Memory, storage::Memory, messenger::Memory>;

/// Returns a [`CreateOwner`] with the provided login and `x` password.
pub(crate) fn create_owner(login: &str) -> CreateOwner {
    CreateOwner {
        login: credentials::Login::new(login).unwrap(),
        password: SecretBox::new(Box::new(
            credentials::Password::new("x").unwrap(),
        )),
        full_name: contact::FullName::new("A B").unwrap(),
        phone: None,
        telegram: None,
    }
}

/// Returns a [`CreateProperty`] of a draft apartment.
pub(crate) fn create_property(owner_id: Option<owner::Id>) -> CreateProperty {
    CreateProperty {
        owner_id,
        category: property::Category::Apartment,
        name: property::Name::new("Апартаменты на Тверской").unwrap(),
        description: None,
        address: property::Address::new("Тверская, 25").unwrap(),
        transit: None,
        area: None,
        capacity: None,
        price_per_hour: Price::new(Decimal::from(3000)).unwrap(),
        min_hours: MinHours::new(2).unwrap(),
        location: None,
        cover_image: None,
        photos: vec![],
        telegram: None,
        is_published: false,
    }
}

/// Returns a [`CreateRoom`] of a draft room in the provided [`Property`].
pub(crate) fn create_room(property_id: property::Id) -> CreateRoom {
    CreateRoom {
        property_id,
        name: room::Name::new("Люкс").unwrap(),
        price_per_hour: Price::new(Decimal::from(1500)).unwrap(),
        area: None,
        description: None,
        min_hours: MinHours::default(),
        photos: vec![],
        features: vec![],
        amenities: vec![],
        telegram: None,
        phone: None,
        is_published: false,
    }
}

/// Creates an [`Owner`] with the provided login.
pub(crate) async fn owner(svc: &Memory, login: &str) -> Owner {
    svc.execute(create_owner(login)).await.unwrap().owner
}

/// Creates an unowned draft [`Property`].
pub(crate) async fn property(svc: &Memory) -> Property {
    svc.execute(create_property(None)).await.unwrap().property
}

/// Creates an unowned [`Property`] and publishes it.
pub(crate) async fn listed_property(svc: &Memory) -> Property {
    let property = property(svc).await;
    svc.execute(ToggleProperty {
        property_id: property.id,
        flag: publication::Flag::Published,
        current: false,
    })
    .await
    .unwrap()
}

/// Creates a draft [`Room`] in the provided [`Property`].
pub(crate) async fn room(svc: &Memory, property_id: property::Id) -> Room {
    svc.execute(create_room(property_id)).await.unwrap()
}
