//! [`Connection`] definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Parameters bound to a SQL statement.
pub type Params<'a> = [&'a (dyn ToSql + Sync)];

/// Transactional Postgres database [`Connection`].
///
/// Holds the pooled [`NonTx`] connection together with the transaction
/// borrowing it, until the transaction is committed.
#[self_referencing]
pub struct Tx {
    /// [`NonTx`] [`Connection`] the transaction was started from.
    non_tx: NonTx,

    /// Transaction started in the [`Connection`], until committed.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("committed", &self.with_tx(|tx| tx.is_none()))
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Returns the open [`Transaction`] of this [`Tx`] connection.
    ///
    /// [`Transaction`]: deadpool_postgres::Transaction
    fn tx(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("already committed"))
    }

    /// Begins a new [`Tx`] on the provided [`NonTx`] [`Connection`].
    ///
    /// # Errors
    ///
    /// If the `BEGIN` statement fails.
    pub async fn begin(conn: NonTx) -> Result<Tx, Traced<database::Error>> {
        Tx::try_new_async_send(conn, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`], releasing its [`NonTx`] connection back to the
    /// [`Pool`].
    ///
    /// # Errors
    ///
    /// If the `COMMIT` statement fails.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        self.with_tx_mut(|tx| tx.take())
            .expect("already committed")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database connection running SQL statements.
pub trait Connection {
    /// Runs the provided `sql` query and returns all the resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to run the query.
    fn query(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` query expecting at most one resulting row.
    ///
    /// # Errors
    ///
    /// If failed to run the query, or it returns more than one row.
    fn query_opt(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` statement and returns the number of the
    /// affected rows.
    ///
    /// # Errors
    ///
    /// If failed to run the statement.
    fn exec(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>;
}

/// Implements [`Connection`] for a raw connection, accessing the
/// [`tokio_postgres`] client via the provided expression.
macro_rules! impl_raw_connection {
    ($ty:ty, |$this:ident| $client:expr) => {
        impl Connection for $ty {
            async fn query(
                &self,
                sql: &str,
                params: &Params<'_>,
            ) -> Result<Vec<Row>, Traced<database::Error>> {
                let $this = self;
                log::trace!(sql, "query");
                $client
                    .query(sql, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn query_opt(
                &self,
                sql: &str,
                params: &Params<'_>,
            ) -> Result<Option<Row>, Traced<database::Error>> {
                let $this = self;
                log::trace!(sql, "query_opt");
                $client
                    .query_opt(sql, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn exec(
                &self,
                sql: &str,
                params: &Params<'_>,
            ) -> Result<u64, Traced<database::Error>> {
                let $this = self;
                log::trace!(sql, "exec");
                $client
                    .execute(sql, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }
        }
    };
}

impl_raw_connection!(NonTx, |conn| (**conn));
impl_raw_connection!(Tx, |conn| conn.tx());
