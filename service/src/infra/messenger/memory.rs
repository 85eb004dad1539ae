//! In-memory [`Messenger`] for tests.

use std::sync::{Arc, Mutex};

use common::operations::Perform;
use tracerr::Traced;

use crate::{
    domain::telegram::Message,
    infra::{messenger, Messenger},
};

/// In-memory [`Messenger`] remembering everything sent.
#[derive(Clone, Debug)]
pub struct Memory {
    /// Sent [`Message`]s.
    sent: Arc<Mutex<Vec<Message>>>,

    /// Indicator whether this [`Memory`] messenger has credentials.
    is_configured: bool,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            sent: Arc::default(),
            is_configured: true,
        }
    }
}

impl Memory {
    /// Creates a [`Memory`] messenger lacking credentials.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            is_configured: false,
            ..Self::default()
        }
    }

    /// Returns all the [`Message`]s sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().expect("not poisoned").clone()
    }
}

impl Messenger<Perform<Message>> for Memory {
    type Ok = ();
    type Err = Traced<messenger::Error>;

    async fn execute(
        &self,
        Perform(msg): Perform<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        if !self.is_configured {
            return Err(tracerr::new!(messenger::Error::NotConfigured));
        }
        self.sent.lock().expect("not poisoned").push(msg);
        Ok(())
    }
}
