//! Configuration management for the booking Lambda.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::secrets::{get_graph_credentials, GraphCredentials};
use crate::{Error, Result};

pub const DEFAULT_LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";
pub const DEFAULT_OBSERVER_EMAIL: &str = "calendar@fivestartaxhelp.com";
pub const DEFAULT_OBSERVER_NAME: &str = "Team Calendar";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Service identity used for the client-credentials grant, plus the
/// endpoints the Graph client talks to.
#[derive(Clone)]
pub struct GraphConfig {
    /// Azure AD tenant
    pub tenant_id: String,
    /// App registration client id
    pub client_id: String,
    /// App registration client secret
    pub client_secret: String,
    /// Identity provider base URL
    pub login_base_url: String,
    /// Graph API base URL
    pub graph_base_url: String,
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("login_base_url", &self.login_base_url)
            .field("graph_base_url", &self.graph_base_url)
            .finish()
    }
}

/// Settings that shape the events we create.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Internal mailbox added to every appointment as an optional attendee
    pub observer_email: String,
    /// Display name for the observer attendee
    pub observer_name: String,
    /// Offset east of UTC, in minutes, applied to naive `selectedTime` values
    pub utc_offset_minutes: i32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            observer_email: DEFAULT_OBSERVER_EMAIL.to_string(),
            observer_name: DEFAULT_OBSERVER_NAME.to_string(),
            utc_offset_minutes: 0,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub graph: GraphConfig,
    pub booking: BookingConfig,
    /// Timeout for every outbound request
    pub http_timeout: Duration,
    /// Secrets Manager secret holding the Graph client credentials
    pub credentials_secret_arn: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials_secret_arn = var("GRAPH_CREDENTIALS_SECRET_ARN").filter(|v| !v.is_empty());

        // Credentials may arrive later from Secrets Manager
        let required = |key: &str| -> Result<String> {
            match var(key).filter(|v| !v.is_empty()) {
                Some(value) => Ok(value),
                None if credentials_secret_arn.is_some() => Ok(String::new()),
                None => Err(Error::Config(format!("{} not set", key))),
            }
        };

        let utc_offset_minutes = match var("BOOKING_UTC_OFFSET_MINUTES") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|e| {
                Error::Config(format!("Invalid BOOKING_UTC_OFFSET_MINUTES {:?}: {}", raw, e))
            })?,
            None => 0,
        };

        let http_timeout_secs = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid HTTP_TIMEOUT_SECS {:?}: {}", raw, e)))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            graph: GraphConfig {
                tenant_id: required("TENANT_ID")?,
                client_id: required("CLIENT_ID")?,
                client_secret: required("CLIENT_SECRET")?,
                login_base_url: var("LOGIN_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LOGIN_BASE_URL.to_string()),
                graph_base_url: var("GRAPH_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string()),
            },
            booking: BookingConfig {
                observer_email: var("OBSERVER_EMAIL")
                    .unwrap_or_else(|| DEFAULT_OBSERVER_EMAIL.to_string()),
                observer_name: var("OBSERVER_NAME")
                    .unwrap_or_else(|| DEFAULT_OBSERVER_NAME.to_string()),
                utc_offset_minutes,
            },
            http_timeout: Duration::from_secs(http_timeout_secs),
            credentials_secret_arn,
        })
    }

    /// Load configuration from the environment and, when a secret ARN is
    /// configured, fill in the client credentials from Secrets Manager.
    pub async fn load() -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(secret_arn) = config.credentials_secret_arn.clone() {
            let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let secrets_client = aws_sdk_secretsmanager::Client::new(&aws);
            let credentials = get_graph_credentials(&secrets_client, &secret_arn).await?;
            config.apply_credentials(credentials);
        }

        config.validate()?;
        Ok(config)
    }

    /// Override the Graph client credentials with values from a secret.
    pub fn apply_credentials(&mut self, credentials: GraphCredentials) {
        self.graph.client_id = credentials.client_id;
        self.graph.client_secret = credentials.client_secret;
        if let Some(tenant_id) = credentials.tenant_id.filter(|t| !t.is_empty()) {
            self.graph.tenant_id = tenant_id;
        }
    }

    /// Check that every credential needed for the token grant is present.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tenant_id", &self.graph.tenant_id),
            ("client_id", &self.graph.client_id),
            ("client_secret", &self.graph.client_secret),
        ] {
            if value.is_empty() {
                return Err(Error::Config(format!("Missing Graph {}", name)));
            }
        }
        Ok(())
    }
}
