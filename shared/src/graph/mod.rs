//! Microsoft Graph client pieces used by the booking Lambda.
//!
//! Every call is a single request with no retries: the token provider
//! exchanges client credentials for a bearer token, and the calendar client
//! uses that token for schedule lookups and event creation.

pub mod events;
pub mod schedule;
pub mod token;

use chrono::{DateTime, Utc};

pub use events::{build_event, to_utc};
pub use schedule::schedule_window;
pub use token::TokenProvider;

/// Calendar operations against one Graph deployment.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    graph_base_url: String,
}

impl CalendarClient {
    pub fn new(http_client: reqwest::Client, graph_base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            graph_base_url: graph_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of a resource under `/v1.0/users/{owner}`.
    fn user_url(&self, owner: &str, resource: &str) -> String {
        format!(
            "{}/v1.0/users/{}/{}",
            self.graph_base_url,
            urlencoding::encode(owner),
            resource
        )
    }
}

/// Format a timestamp the way Graph and JavaScript clients expect it,
/// e.g. `2024-01-01T09:00:00.000Z`.
pub fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
