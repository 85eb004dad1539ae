//! [`Lazy`] connection definitions.

use std::future::Future;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database;

/// Connection acquired on the first use and shared by the clones of a
/// client.
#[derive(Debug)]
pub(crate) struct Lazy<C>(RwLock<Option<C>>);

impl<C> Default for Lazy<C> {
    fn default() -> Self {
        Self(RwLock::new(None))
    }
}

impl<C> Lazy<C> {
    /// Returns the held connection, acquiring it with the provided `init`
    /// if there is none yet.
    ///
    /// # Errors
    ///
    /// If the provided `init` fails.
    pub(crate) async fn get_or_try_init<F, Fut>(
        &self,
        init: F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let held = self.0.read().await;
        let guard = if held.is_some() {
            held
        } else {
            drop(held);

            let mut held = self.0.write().await;
            if held.is_none() {
                *held = Some(init().await.map_err(tracerr::wrap!())?);
            }
            held.downgrade()
        };

        Ok(RwLockReadGuard::map(guard, |conn| {
            conn.as_ref()
                .expect("connection cannot be dropped while guard is alive")
        }))
    }

    /// Takes the held connection out, so the next use acquires a new one.
    pub(crate) async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}
