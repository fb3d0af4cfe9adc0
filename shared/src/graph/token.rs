//! Client-credentials token exchange against the Microsoft identity platform.

use serde::Deserialize;
use tracing::{debug, error};

use crate::config::GraphConfig;
use crate::{Error, Result};

/// Scope granting the app's configured Graph permissions.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Requests a fresh bearer token on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    http_client: reqwest::Client,
    config: GraphConfig,
}

impl TokenProvider {
    pub fn new(http_client: reqwest::Client, config: GraphConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.config.login_base_url.trim_end_matches('/'),
            self.config.tenant_id
        )
    }

    /// Exchange the client credentials for a bearer token.
    pub async fn access_token(&self) -> Result<String> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", GRAPH_DEFAULT_SCOPE),
        ];

        let url = self.token_url();
        debug!("Requesting access token from {}", url);

        let response = self.http_client.post(&url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Token fetch failed ({}): {}", status, error_text);
            return Err(Error::TokenAcquisition(format!(
                "Token request failed with status {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::TokenAcquisition("Missing access_token in response".to_string()))
    }
}
