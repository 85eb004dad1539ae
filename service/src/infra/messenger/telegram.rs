//! [Telegram Bot API] [`Messenger`].
//!
//! [Telegram Bot API]: https://core.telegram.org/bots/api

use std::{sync::Arc, time::Duration};

use common::operations::Perform;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::{
    domain::telegram::Message,
    infra::{messenger, Messenger},
};

/// Credentials of a Telegram bot posting into a chat.
#[derive(Debug)]
pub struct Credentials {
    /// Token of the bot.
    pub bot_token: SecretString,

    /// ID of the chat to post into.
    pub chat_id: String,
}

/// [`Messenger`] posting into a Telegram chat on behalf of a bot.
#[derive(Clone, Debug)]
pub struct Telegram {
    /// HTTP client performing requests.
    http: reqwest::Client,

    /// Base URL of the Bot API.
    api_url: Arc<str>,

    /// [`Credentials`] of the bot, if configured.
    credentials: Option<Arc<Credentials>>,
}

impl Telegram {
    /// Default base URL of the Bot API.
    pub const API_URL: &'static str = "https://api.telegram.org";

    /// Timeout of a single request to the Bot API.
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a new [`Telegram`] messenger.
    ///
    /// Without [`Credentials`] every message fails with
    /// [`messenger::Error::NotConfigured`].
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be initialized.
    pub fn new(
        credentials: Option<Credentials>,
    ) -> Result<Self, Traced<messenger::Error>> {
        let http = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(tracerr::from_and_wrap!(=> messenger::Error))?;
        Ok(Self {
            http,
            api_url: Self::API_URL.into(),
            credentials: credentials.map(Arc::new),
        })
    }

    /// Indicates whether this [`Telegram`] messenger has [`Credentials`].
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

impl Messenger<Perform<Message>> for Telegram {
    type Ok = ();
    type Err = Traced<messenger::Error>;

    async fn execute(
        &self,
        Perform(msg): Perform<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        use messenger::Error as E;

        /// Body of a `sendMessage` request.
        #[derive(Serialize)]
        struct Request<'a> {
            chat_id: &'a str,
            text: &'a str,
            parse_mode: &'static str,
        }

        /// Body of a Bot API response.
        #[derive(Deserialize)]
        struct Response {
            ok: bool,
            description: Option<String>,
        }

        let Some(creds) = &self.credentials else {
            return Err(tracerr::new!(E::NotConfigured));
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_url,
            creds.bot_token.expose_secret(),
        );
        let resp = self
            .http
            .post(url)
            .json(&Request {
                chat_id: &creds.chat_id,
                text: msg.as_ref(),
                parse_mode: "HTML",
            })
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?
            .json::<Response>()
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if !resp.ok {
            return Err(tracerr::new!(E::Rejected(
                resp.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Perform;

    use crate::{
        domain::telegram::Message,
        infra::{messenger, Messenger as _},
    };

    use super::Telegram;

    #[tokio::test]
    async fn refuses_to_send_without_credentials() {
        let telegram = Telegram::new(None).unwrap();

        let err = telegram
            .execute(Perform(Message::from_lines(["hi"])))
            .await
            .unwrap_err();

        assert!(!telegram.is_configured());
        assert!(matches!(err.as_ref(), messenger::Error::NotConfigured));
    }
}
