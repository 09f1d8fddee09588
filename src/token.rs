//! OAuth2 client-credentials token acquisition.
//!
//! Every call performs a fresh exchange against the tenant's v2 token
//! endpoint; nothing is cached between sends.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use std::fmt;

use crate::config::Config;

pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to reach identity provider: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Identity provider rejected client credentials: {status} - {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Identity provider returned no usable access token: {0}")]
    InvalidResponse(String),
}

/// Bearer token for a single mail send.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

pub struct TokenProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    scopes: Vec<String>,
}

impl TokenProvider {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: format!("{}/oauth2/v2.0/token", config.authority()),
            scopes: vec![GRAPH_DEFAULT_SCOPE.to_string()],
        }
    }

    pub async fn acquire_token(&self) -> Result<AccessToken, AuthError> {
        let scope = self.scopes.join(" ");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        tracing::debug!("Requesting access token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        match token.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken(token)),
            _ => Err(AuthError::InvalidResponse(
                "response did not contain an access_token".to_string(),
            )),
        }
    }
}
