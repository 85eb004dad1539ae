//! Infrastructure layer.

pub mod database;
pub mod messenger;
pub mod storage;

pub use self::{database::Database, messenger::Messenger, storage::Storage};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
