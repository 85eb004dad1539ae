//! [`Messenger`] relaying messages to the operators.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod telegram;

use derive_more::{Display, Error as StdError, From};

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
pub use self::telegram::Telegram;

/// Operation of sending a message.
pub use common::Handler as Messenger;

/// [`Messenger`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Messenger`] has no credentials to send anything.
    #[display("Telegram credentials not configured")]
    #[from(ignore)]
    NotConfigured,

    /// HTTP request failed.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),

    /// Message was rejected by the remote side.
    #[display("Message rejected: {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] String),
}
