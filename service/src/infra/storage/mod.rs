//! [`Storage`] of uploaded images.

pub mod local;
#[cfg(any(test, feature = "memory"))]
pub mod memory;

use std::io;

use derive_more::{Display, Error as StdError, From};

pub use self::local::LocalFs;
#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;

/// Operation upon stored images.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O operation failed.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),
}
