//! AWS Secrets Manager integration.

use std::fmt;

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;

use crate::{Error, Result};

/// Graph app registration credentials from Secrets Manager.
#[derive(Deserialize)]
pub struct GraphCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl fmt::Debug for GraphCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Get a secret value from Secrets Manager.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    response
        .secret_string()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))
}

/// Get Graph client credentials from Secrets Manager.
pub async fn get_graph_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<GraphCredentials> {
    let secret_string = get_secret(client, secret_arn).await?;

    parse_graph_credentials(&secret_string)
}

fn parse_graph_credentials(secret_string: &str) -> Result<GraphCredentials> {
    serde_json::from_str(secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse Graph credentials: {}", e)))
}
