//! [`Command`] for relaying a [`Brief`] to the operators.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{telegram, Brief},
    infra::{messenger, Messenger},
    Service,
};

use super::Command;

/// [`Command`] relaying a [`Brief`] of a prospective owner.
///
/// Nothing is persisted: a [`Brief`] either reaches the operators or the
/// caller is told to retry.
#[derive(Clone, Debug, From)]
pub struct SubmitBrief {
    /// [`Brief`] to relay.
    pub brief: Brief,
}

impl<Db, St, Ms> Command<SubmitBrief> for Service<Db, St, Ms>
where
    Ms: Messenger<
        Perform<telegram::Message>,
        Ok = (),
        Err = Traced<messenger::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SubmitBrief) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.messenger()
            .execute(Perform(cmd.brief.to_message()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SubmitBrief`] [`Command`] execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// [`Messenger`] has no credentials configured.
    #[display("Messenger is not configured")]
    MessengerNotConfigured,

    /// [`Messenger`] failed to deliver the [`Brief`].
    #[display("`Messenger` operation failed: {_0}")]
    Messenger(messenger::Error),
}

impl From<messenger::Error> for ExecutionError {
    fn from(e: messenger::Error) -> Self {
        match e {
            messenger::Error::NotConfigured => Self::MessengerNotConfigured,
            e @ (messenger::Error::Http(_) | messenger::Error::Rejected(_)) => {
                Self::Messenger(e)
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use crate::{
        domain::{brief, contact, property, telegram, Brief},
        infra::messenger,
        Command as _, Service,
    };

    use super::{ExecutionError, SubmitBrief};

    fn brief() -> Brief {
        Brief {
            category: property::Category::Sauna,
            name: property::Name::new("Баня <№1>").unwrap(),
            address: property::Address::new("Ленина, 1").unwrap(),
            transit: None,
            objects_count: NonZeroU16::new(3).unwrap(),
            website: brief::Website::new("https://banya.example"),
            phone: contact::Phone::new("+7 900 000-00-00").unwrap(),
            telegram: Some(telegram::Handle::new("@banya").unwrap()),
            owner_name: contact::FullName::new("Иван Петров").unwrap(),
        }
    }

    #[tokio::test]
    async fn relays_escaped_message() {
        let svc = Service::in_memory();

        svc.execute(SubmitBrief::from(brief())).await.unwrap();

        let sent = svc.messenger().sent();
        assert_eq!(sent.len(), 1);
        let text = sent[0].to_string();
        assert!(text.contains("Баня &lt;№1&gt;"));
        assert!(text.contains("Количество объектов: 3"));
        assert!(!text.contains("Метро"));
    }

    #[tokio::test]
    async fn fails_without_credentials() {
        let svc = Service {
            messenger: messenger::Memory::unconfigured(),
            ..Service::in_memory()
        };

        let err = svc.execute(SubmitBrief::from(brief())).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MessengerNotConfigured,
        ));
    }
}
