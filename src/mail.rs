//! Microsoft Graph `sendMail` dispatch.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    dto::SendEmailResponse,
    token::{AuthError, TokenProvider},
};

pub const SUCCESS_MESSAGE: &str = "email sent";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Failed to reach mail API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to send email: {status} - {body}")]
    Send { status: StatusCode, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailPayload {
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub subject: String,
    pub body: ItemBody,
    pub from: Recipient,
    pub to_recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress {
                address: address.into(),
            },
        }
    }
}

/// Splits a comma-separated recipient list and trims each entry.
///
/// Empty entries are kept, so `"a@x.com,"` yields `["a@x.com", ""]`.
pub fn parse_recipients(recipients: &str) -> Vec<String> {
    recipients
        .split(',')
        .map(|r| r.trim().to_string())
        .collect()
}

impl MailPayload {
    pub fn html(sender: &str, subject: &str, html_body: &str, recipients: &str) -> Self {
        Self {
            message: Message {
                subject: subject.to_string(),
                body: ItemBody {
                    content_type: "HTML".to_string(),
                    content: html_body.to_string(),
                },
                from: Recipient::new(sender),
                to_recipients: parse_recipients(recipients)
                    .into_iter()
                    .map(Recipient::new)
                    .collect(),
            },
        }
    }
}

pub struct MailDispatcher {
    client: Client,
    tokens: TokenProvider,
    mailbox: String,
    send_url: String,
}

impl MailDispatcher {
    pub fn new(config: &Config, client: Client) -> Self {
        let send_url = format!(
            "{}/v1.0/users/{}/sendMail",
            config.graph_base_url.trim_end_matches('/'),
            config.mail_username
        );

        Self {
            tokens: TokenProvider::new(config, client.clone()),
            client,
            mailbox: config.mail_username.clone(),
            send_url,
        }
    }

    pub async fn send(
        &self,
        subject: &str,
        html_body: &str,
        recipients: &str,
    ) -> Result<SendEmailResponse, MailError> {
        let token = self.tokens.acquire_token().await?;
        let payload = MailPayload::html(&self.mailbox, subject, html_body, recipients);

        tracing::info!(
            "Sending email to '{}' with subject '{}'",
            recipients,
            subject
        );

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(token.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Send { status, body });
        }

        tracing::info!("Message to {} sent successfully", recipients);

        Ok(SendEmailResponse {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}
