use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::Secret;
use crate::mail::MailTransport;
use crate::mail::errors::MailError;
use crate::mail::types::{Mailbox, OutboundMessage};

/// Mailjet Send API v3.1 transport.
pub struct MailjetClient {
    http: Client,
    base_url: String,
    api_key: Secret,
    secret_key: Secret,
}

impl MailjetClient {
    pub fn new(
        base_url: String,
        api_key: Secret,
        secret_key: Secret,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            secret_key,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendRequest<'a> {
    messages: [MessageBody<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessageBody<'a> {
    from: &'a Mailbox,
    to: [&'a Mailbox; 1],
    subject: &'a str,
    #[serde(rename = "HTMLPart")]
    html_part: &'a str,
}

impl<'a> From<&'a OutboundMessage> for SendRequest<'a> {
    fn from(m: &'a OutboundMessage) -> Self {
        Self {
            messages: [MessageBody {
                from: &m.from,
                to: [&m.to],
                subject: &m.subject,
                html_part: &m.html_body,
            }],
        }
    }
}

#[async_trait]
impl MailTransport for MailjetClient {
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    async fn send(&self, message: &OutboundMessage) -> Result<u16, MailError> {
        let resp = self
            .http
            .post(format!("{}/v3.1/send", self.base_url))
            .basic_auth(self.api_key.expose(), Some(self.secret_key.expose()))
            .json(&SendRequest::from(message))
            .send()
            .await?;

        let status = resp.status();
        debug!(status = %status, "mailjet response");

        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(MailError::Rejected(status.as_u16()))
        }
    }
}
