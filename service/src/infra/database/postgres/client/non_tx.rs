//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::RwLockReadGuard;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, connection::Params, Connection},
};

use super::{impl_lazy_connection, lazy::Lazy};

/// Non-transactional Postgres database client.
///
/// Clones share the same pooled connection, acquired on the first use.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire connections from.
    pub(crate) pool: connection::Pool,

    /// Connection for non-transactional operations.
    connection: Arc<Lazy<connection::NonTx>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Arc::default(),
        }
    }

    /// Returns the underlying [`Connection`] of this [`NonTx`] client.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.connection
            .get_or_try_init(|| async {
                self.pool
                    .get()
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            })
            .await
    }

    /// Takes the underlying [`Connection`] out of this [`NonTx`] client, if
    /// it has been acquired already.
    pub(crate) async fn take_connection(&self) -> Option<connection::NonTx> {
        self.connection.take().await
    }
}

impl_lazy_connection!(NonTx);
