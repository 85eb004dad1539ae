//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::{error::Error, time::Duration};

use common::operations::{By, Start};
use derive_more::Debug;

#[cfg(doc)]
use infra::{Database, Messenger, Storage};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lifetime of an [`Admin`] [`Session`].
    ///
    /// [`Admin`]: domain::Admin
    /// [`Session`]: domain::Session
    pub admin_session_ttl: Duration,

    /// Lifetime of an [`Owner`] [`Session`].
    ///
    /// [`Owner`]: domain::Owner
    /// [`Session`]: domain::Session
    pub owner_session_ttl: Duration,

    /// [`command::UploadImages`] configuration.
    pub upload_images: command::upload_images::Config,

    /// [`task::CleanOrphanedImages`] configuration.
    pub clean_orphaned_images: task::clean_orphaned_images::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, St, Ms> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Storage`] of the uploaded images.
    storage: St,

    /// [`Messenger`] relaying messages to the operators.
    messenger: Ms,
}

impl<Db, St, Ms> Service<Db, St, Ms> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        storage: St,
        messenger: Ms,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::CleanOrphanedImages<Self>,
                        task::clean_orphaned_images::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            storage,
            messenger,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("clean_orphaned_images", async move {
            svc.execute(Start(By::new(svc.config().clean_orphaned_images)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// Returns [`Messenger`] of this [`Service`].
    #[must_use]
    pub fn messenger(&self) -> &Ms {
        &self.messenger
    }
}

#[cfg(any(test, feature = "memory"))]
impl
    Service<
        infra::database::Memory,
        infra::storage::Memory,
        infra::messenger::Memory,
    >
{
    /// Creates a new [`Service`] backed by in-memory infrastructure.
    #[must_use]
    pub fn in_memory() -> Self {
        let secret = b"in-memory";
        Self {
            config: Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
                admin_session_ttl: Duration::from_secs(24 * 60 * 60),
                owner_session_ttl: Duration::from_secs(24 * 60 * 60),
                upload_images: command::upload_images::Config {
                    public_url: "/images".into(),
                    max_size: 1024,
                },
                clean_orphaned_images: task::clean_orphaned_images::Config {
                    interval: Duration::from_secs(60 * 60),
                    timeout: Duration::from_secs(24 * 60 * 60),
                },
            },
            database: infra::database::Memory::default(),
            storage: infra::storage::Memory::default(),
            messenger: infra::messenger::Memory::default(),
        }
    }
}
