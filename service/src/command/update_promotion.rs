//! [`Command`] for updating a [`Promotion`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        promotion::{self, Validity, ValidityDateTime},
        Promotion,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for partially updating a [`Promotion`].
#[derive(Clone, Debug)]
pub struct UpdatePromotion {
    /// ID of the [`Promotion`] to update.
    pub promotion_id: promotion::Id,

    /// New [`promotion::Title`].
    pub title: Option<promotion::Title>,

    /// New [`promotion::Description`], or its removal.
    pub description: Option<Option<promotion::Description>>,

    /// New start of the [`Validity`].
    pub valid_from: Option<ValidityDateTime>,

    /// New end of the [`Validity`], or its removal.
    pub valid_until: Option<Option<ValidityDateTime>>,

    /// New indicator whether the [`Promotion`] is shown to clients.
    pub is_active: Option<bool>,
}

impl UpdatePromotion {
    /// Creates a new [`UpdatePromotion`] [`Command`] changing nothing.
    #[must_use]
    pub const fn new(promotion_id: promotion::Id) -> Self {
        Self {
            promotion_id,
            title: None,
            description: None,
            valid_from: None,
            valid_until: None,
            is_active: None,
        }
    }
}

impl<Db, St, Ms> Command<UpdatePromotion> for Service<Db, St, Ms>
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
        > + Database<Update<Promotion>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Promotion;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePromotion,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(cmd.promotion_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut promotion = tx
            .execute(Select(By::<Option<Promotion>, _>::new(
                cmd.promotion_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PromotionNotExists(cmd.promotion_id))
            .map_err(tracerr::wrap!())?;

        let current = promotion.validity;
        promotion.validity = Validity::new(
            cmd.valid_from.unwrap_or(current.from()),
            cmd.valid_until.unwrap_or(current.until()),
        )
        .ok_or(E::InvalidPeriod)
        .map_err(tracerr::wrap!())?;
        assign!(promotion <- cmd: title, description, is_active);

        tx.execute(Update(promotion.clone()))
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

/// Error of [`UpdatePromotion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Promotion`] doesn't exist.
    #[display("`Promotion(id: {_0})` does not exist")]
    #[from(ignore)]
    PromotionNotExists(#[error(not(source))] promotion::Id),

    /// Updated [`Validity`] ends before it starts.
    #[display("`Promotion` ends before it starts")]
    InvalidPeriod,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        command::CreatePromotion,
        domain::{
            promotion::{Title, ValidityDateTime},
            Promotion,
        },
        Command as _, Service,
    };

    use super::{ExecutionError, UpdatePromotion};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    async fn promotion(
        svc: &crate::command::fixture::Memory,
        from: ValidityDateTime,
    ) -> Promotion {
        svc.execute(CreatePromotion {
            title: Title::new("Ночной тариф").unwrap(),
            description: None,
            valid_from: from,
            valid_until: Some(from + DAY),
            is_active: true,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn deactivates_and_extends() {
        let svc = Service::in_memory();
        let now = ValidityDateTime::now();
        let created = promotion(&svc, now).await;

        let updated = svc
            .execute(UpdatePromotion {
                valid_until: Some(None),
                is_active: Some(false),
                ..UpdatePromotion::new(created.id)
            })
            .await
            .unwrap();

        assert!(!updated.is_active);
        assert_eq!(updated.validity.from(), now);
        assert_eq!(updated.validity.until(), None);
        assert_eq!(updated.title, created.title);
    }

    #[tokio::test]
    async fn rejects_start_after_stored_end() {
        let svc = Service::in_memory();
        let now = ValidityDateTime::now();
        let created = promotion(&svc, now).await;

        let err = svc
            .execute(UpdatePromotion {
                valid_from: Some(now + DAY + DAY),
                ..UpdatePromotion::new(created.id)
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidPeriod));
    }
}
