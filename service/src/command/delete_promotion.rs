//! [`Command`] for deleting a [`Promotion`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{promotion, Promotion},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Promotion`] permanently.
#[derive(Clone, Copy, Debug, From)]
pub struct DeletePromotion {
    /// ID of the [`Promotion`] to delete.
    pub promotion_id: promotion::Id,
}

impl<Db, St, Ms> Command<DeletePromotion> for Service<Db, St, Ms>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Promotion, promotion::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Promotion>, promotion::Id>>,
            Ok = Option<Promotion>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Promotion, promotion::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Promotion;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeletePromotion,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeletePromotion { promotion_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(promotion_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let promotion = tx
            .execute(Select(By::<Option<Promotion>, _>::new(promotion_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PromotionNotExists(promotion_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Promotion, _>::new(promotion_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(promotion)
    }
}

/// Error of [`DeletePromotion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Promotion`] doesn't exist.
    #[display("`Promotion(id: {_0})` does not exist")]
    #[from(ignore)]
    PromotionNotExists(#[error(not(source))] promotion::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CreatePromotion,
        domain::promotion::{Title, ValidityDateTime},
        query, Command as _, Query as _, Service,
    };

    use super::{DeletePromotion, ExecutionError};

    #[tokio::test]
    async fn deletes_promotion() {
        let svc = Service::in_memory();
        let promotion = svc
            .execute(CreatePromotion {
                title: Title::new("Скидка 20%").unwrap(),
                description: None,
                valid_from: ValidityDateTime::now(),
                valid_until: None,
                is_active: true,
            })
            .await
            .unwrap();

        drop(svc.execute(DeletePromotion::from(promotion.id)).await.unwrap());

        let left = svc
            .execute(query::promotion::List::by(()))
            .await
            .unwrap();
        assert!(left.is_empty());
        let err = svc
            .execute(DeletePromotion::from(promotion.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::PromotionNotExists(_),
        ));
    }
}
