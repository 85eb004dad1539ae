//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLockReadGuard};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, connection::Params, Connection},
};

use super::{impl_lazy_connection, lazy::Lazy, NonTx};

/// Transactional Postgres database client.
///
/// Begins its transaction on the first use, reusing the connection of the
/// [`NonTx`] client it was created from, if any.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to acquire a connection from.
    pool: connection::Pool,

    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// [`NonTx`] client to reuse the connection of, if not reused yet.
    non_tx: Mutex<Option<NonTx>>,

    /// Transaction begun on the first use.
    tx: Lazy<connection::Tx>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            inner: Arc::new(Inner {
                non_tx: Mutex::new(Some(client)),
                tx: Lazy::default(),
            }),
        }
    }

    /// Returns underlying [`Connection`] of this [`Tx`] client.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.inner
            .tx
            .get_or_try_init(|| async {
                let reused = match self.inner.non_tx.lock().await.take() {
                    Some(client) => client.take_connection().await,
                    None => None,
                };
                let conn = match reused {
                    Some(conn) => conn,
                    None => self
                        .pool
                        .get()
                        .await
                        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                        .map_err(tracerr::map_from)?,
                };
                connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
            })
            .await
    }

    /// Commits this [`Tx`] client.
    ///
    /// Does nothing if no statement has been run, so no transaction has
    /// begun.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.inner.tx.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

impl_lazy_connection!(Tx);
