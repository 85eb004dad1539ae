//! Postgres database client definitions.

mod lazy;
pub mod non_tx;
pub mod tx;

pub use self::{non_tx::NonTx, tx::Tx};

/// Implements [`Connection`] for a client, running statements on the
/// connection it lazily acquires.
///
/// [`Connection`]: super::Connection
macro_rules! impl_lazy_connection {
    ($ty:ty) => {
        impl Connection for $ty {
            async fn query(
                &self,
                sql: &str,
                params: &Params<'_>,
            ) -> Result<Vec<Row>, Traced<database::Error>> {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(sql, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt(
                &self,
                sql: &str,
                params: &Params<'_>,
            ) -> Result<Option<Row>, Traced<database::Error>> {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(sql, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec(
                &self,
                sql: &str,
                params: &Params<'_>,
            ) -> Result<u64, Traced<database::Error>> {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(sql, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}
use impl_lazy_connection;
