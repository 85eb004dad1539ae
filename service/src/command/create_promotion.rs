//! [`Command`] for creating a new [`Promotion`].

use common::operations::{Commit, Insert, Reserve, Transact, Transacted};
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

/// [`Command`] for creating a new [`Promotion`].
#[derive(Clone, Debug)]
pub struct CreatePromotion {
    /// [`promotion::Title`] of the new [`Promotion`].
    pub title: promotion::Title,

    /// [`promotion::Description`] of the new [`Promotion`].
    pub description: Option<promotion::Description>,

    /// Start of the new [`Promotion`] [`Validity`].
    pub valid_from: ValidityDateTime,

    /// End of the new [`Promotion`] [`Validity`], if any.
    pub valid_until: Option<ValidityDateTime>,

    /// Indicator whether the new [`Promotion`] is shown to clients.
    pub is_active: bool,
}

impl<Db, St, Ms> Command<CreatePromotion> for Service<Db, St, Ms>
where
    Db: Database<
            Reserve<promotion::Id>,
            Ok = promotion::Id,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Promotion>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Promotion;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePromotion,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let validity = Validity::new(cmd.valid_from, cmd.valid_until)
            .ok_or(E::InvalidPeriod)
            .map_err(tracerr::wrap!())?;

        let id = self
            .database()
            .execute(Reserve::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let promotion = Promotion {
            id,
            title: cmd.title,
            description: cmd.description,
            validity,
            is_active: cmd.is_active,
            created_at: promotion::CreationDateTime::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(promotion.clone()))
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

/// Error of [`CreatePromotion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Validity`] ends before it starts.
    #[display("`Promotion` ends before it starts")]
    InvalidPeriod,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        domain::promotion::{Title, ValidityDateTime},
        Command as _, Service,
    };

    use super::{CreatePromotion, ExecutionError};

    fn promotion(
        from: ValidityDateTime,
        until: Option<ValidityDateTime>,
    ) -> CreatePromotion {
        CreatePromotion {
            title: Title::new("Ночной тариф").unwrap(),
            description: None,
            valid_from: from,
            valid_until: until,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn creates_open_ended() {
        let svc = Service::in_memory();
        let now = ValidityDateTime::now();

        let created = svc.execute(promotion(now, None)).await.unwrap();

        assert_eq!(created.validity.from(), now);
        assert_eq!(created.validity.until(), None);
    }

    #[tokio::test]
    async fn rejects_end_before_start() {
        let svc = Service::in_memory();
        let now = ValidityDateTime::now();
        let day = Duration::from_secs(24 * 60 * 60);

        let err = svc
            .execute(promotion(now, Some(now - day)))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidPeriod));
    }
}
