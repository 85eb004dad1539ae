//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::SecretString;
use serde::Deserialize;
use service::infra::messenger::telegram;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Bootstrap [`Admin`] configuration.
    pub admin: Admin,

    /// Image storage configuration.
    pub storage: Storage,

    /// Telegram configuration.
    pub telegram: Telegram,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }

    /// Returns the [`service::Config`] described by this [`Config`].
    #[must_use]
    pub fn service(&self) -> service::Config {
        let Service {
            jwt_secret,
            admin_session_ttl,
            owner_session_ttl,
            images,
            tasks: Tasks {
                clean_orphaned_images,
            },
        } = &self.service;
        service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            admin_session_ttl: *admin_session_ttl,
            owner_session_ttl: *owner_session_ttl,
            upload_images: service::command::upload_images::Config {
                public_url: self.storage.public_url.clone(),
                max_size: images.max_size,
            },
            clean_orphaned_images:
                service::task::clean_orphaned_images::Config {
                    interval: clean_orphaned_images.interval,
                    timeout: clean_orphaned_images.timeout,
                },
        }
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// `*` allows any origin.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Lifetime of an admin session.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub admin_session_ttl: time::Duration,

    /// Lifetime of an owner session.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub owner_session_ttl: time::Duration,

    /// Uploaded images configuration.
    pub images: Images,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

/// Uploaded images configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Images {
    /// Maximum size of a single image in bytes.
    #[default(10 * 1024 * 1024)]
    pub max_size: usize,
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `CleanOrphanedImages` task configuration.
    pub clean_orphaned_images: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Timeout after which the entities will be considered stale.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

/// Bootstrap [`Admin`] configuration.
///
/// The [`Admin`] is created on startup unless one with the same login
/// exists.
///
/// [`Admin`]: service::domain::Admin
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Admin {
    /// Login of the [`Admin`].
    ///
    /// [`Admin`]: service::domain::Admin
    #[default("admin".to_owned())]
    pub login: String,

    /// Password of the [`Admin`].
    ///
    /// [`Admin`]: service::domain::Admin
    #[default("admin".to_owned())]
    pub password: String,

    /// Full name of the [`Admin`].
    ///
    /// [`Admin`]: service::domain::Admin
    #[default("Administrator".to_owned())]
    pub full_name: String,
}

/// Image storage configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Directory to keep the uploaded images in.
    #[default("images".to_owned())]
    pub root: String,

    /// Public URL the images are served under.
    #[default("/images".to_owned())]
    pub public_url: String,
}

/// [Telegram Bot API] configuration.
///
/// Lead briefs are rejected unless both values are set.
///
/// [Telegram Bot API]: https://core.telegram.org/bots/api
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Telegram {
    /// Token of the bot.
    pub bot_token: Option<SecretString>,

    /// ID of the chat to relay the briefs into.
    pub chat_id: Option<String>,
}

impl Telegram {
    /// Returns [`telegram::Credentials`], if both values are set.
    #[must_use]
    pub fn credentials(&self) -> Option<telegram::Credentials> {
        Some(telegram::Credentials {
            bot_token: self.bot_token.clone()?,
            chat_id: self.chat_id.clone().filter(|id| !id.is_empty())?,
        })
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::Config;

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::new("missing.toml").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors.origins, ["*"]);
        assert_eq!(
            config.service.admin_session_ttl,
            Duration::from_secs(24 * 60 * 60),
        );
        assert_eq!(config.storage.public_url, "/images");
        assert!(config.telegram.credentials().is_none());

        let service = config.service();
        assert_eq!(service.upload_images.public_url, "/images");
        assert_eq!(
            service.clean_orphaned_images.interval,
            Duration::from_secs(60 * 60),
        );
    }

    #[test]
    fn requires_both_telegram_values() {
        let mut config = Config::default();
        config.telegram.bot_token =
            Some(SecretString::from("token".to_owned()));
        assert!(config.telegram.credentials().is_none());

        config.telegram.chat_id = Some("-100".to_owned());
        let credentials = config.telegram.credentials().unwrap();
        assert_eq!(credentials.chat_id, "-100");
    }
}
