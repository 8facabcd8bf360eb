//! LINE Messaging API push client.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{Notifier, NotifyError};
use crate::config::NotifyConfig;

const PUSH_PATH: &str = "/v2/bot/message/push";

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

pub struct LineNotifier {
    client: reqwest::blocking::Client,
    endpoint: String,
    token: String,
    user_ids: Vec<String>,
}

impl LineNotifier {
    pub fn new(
        api_base: &str,
        token: impl Into<String>,
        user_ids: Vec<String>,
    ) -> Result<Self, NotifyError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(NotifyError::MissingCredentials);
        }
        if user_ids.is_empty() {
            return Err(NotifyError::NoRecipients);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{PUSH_PATH}", api_base.trim_end_matches('/')),
            token,
            user_ids,
        })
    }

    /// Build from config; `MissingCredentials` when token or user ids are absent.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let (token, user_ids) = config
            .credentials()
            .ok_or(NotifyError::MissingCredentials)?;
        Self::new(&config.api_base, token, user_ids.to_vec())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn push(&self, recipient: &str, text: &str) -> Result<(), NotifyError> {
        let body = PushRequest {
            to: recipient,
            messages: [TextMessage { kind: "text", text }],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| NotifyError::Network {
                recipient: recipient.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                recipient: recipient.to_string(),
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        debug!(recipient, "LINE push accepted");
        Ok(())
    }
}

impl Notifier for LineNotifier {
    fn name(&self) -> &str {
        "LINE"
    }

    fn send(&self, message: &str) -> Result<usize, NotifyError> {
        for recipient in &self.user_ids {
            self.push(recipient, message)?;
        }
        info!(recipients = self.user_ids.len(), "LINE notification sent");
        Ok(self.user_ids.len())
    }
}
