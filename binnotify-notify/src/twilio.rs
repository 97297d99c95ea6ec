use std::env;

use reqwest::Client;
use tracing::info;

use binnotify_core::ports::NotifyError;

use crate::ensure_success;

const BASE_URL: &str = "https://api.twilio.com";
const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";

/// Account credentials for the Twilio REST API.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    /// Account SID, also the basic-auth user name.
    pub account_sid: String,
    /// Auth token, the basic-auth password.
    pub auth_token: String,
}

impl TwilioCredentials {
    /// Read `TWILIO_ACCOUNT_SID` and `TWILIO_AUTH_TOKEN` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::MissingCredentials`] naming the first variable
    /// that is unset or empty.
    pub fn from_env() -> Result<Self, NotifyError> {
        Ok(Self {
            account_sid: non_empty_var(ACCOUNT_SID_VAR)?,
            auth_token: non_empty_var(AUTH_TOKEN_VAR)?,
        })
    }
}

fn non_empty_var(name: &'static str) -> Result<String, NotifyError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(NotifyError::MissingCredentials(name))
}

/// Sends text messages through Twilio's Messages API.
pub struct TwilioClient {
    client: Client,
    base_url: String,
    credentials: Option<TwilioCredentials>,
}

impl TwilioClient {
    /// Create a client. Credentials may be absent when only dry runs are made.
    #[must_use]
    pub fn new(client: Client, credentials: Option<TwilioCredentials>) -> Self {
        Self::with_base_url(client, credentials, BASE_URL)
    }

    /// Create a client talking to another host, e.g. a local test server.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(
        client: Client,
        credentials: Option<TwilioCredentials>,
        base_url: S,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
        }
    }

    /// Send `body` from one number to another.
    ///
    /// In dry-run mode the message is only logged.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] when credentials are missing, the request
    /// fails, or Twilio rejects the message.
    pub async fn send_sms(
        &self,
        from: &str,
        to: &str,
        body: &str,
        dry_run: bool,
    ) -> Result<(), NotifyError> {
        if dry_run {
            info!(from, to, body, "DRY RUN: would have sent SMS");
            return Ok(());
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(NotifyError::MissingCredentials(ACCOUNT_SID_VAR))?;

        let response = self
            .client
            .post(format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                self.base_url, credentials.account_sid
            ))
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await?;

        ensure_success(response).await?;
        info!(to, "SMS sent via Twilio");
        Ok(())
    }
}
