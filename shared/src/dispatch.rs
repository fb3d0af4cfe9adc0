//! Request dispatcher for the booking Lambda.
//!
//! Endpoints:
//! - OPTIONS * - CORS preflight
//! - GET /availability?cm={owner} - Busy intervals for the next seven days
//! - POST * - Book an appointment (JSON or form-encoded body)
//!
//! This is the only place internal errors become HTTP statuses.

use std::sync::Arc;

use lambda_http::{Body, Request, RequestExt, Response};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::graph::{build_event, CalendarClient, TokenProvider};
use crate::http::{error_response, json_response, preflight_response, BodyDecoder};
use crate::models::{AvailabilityResponse, BookingForm, BookingRequest, BookingResponse};
use crate::{Error, Result};

/// Application state, built once per cold start.
pub struct AppState {
    pub config: Config,
    tokens: TokenProvider,
    calendar: CalendarClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            tokens: TokenProvider::new(http_client.clone(), config.graph.clone()),
            calendar: CalendarClient::new(http_client, config.graph.graph_base_url.clone()),
            config,
        })
    }
}

/// Strip the `/api` stage prefix API Gateway REST APIs add to the path.
fn route_path(raw_path: &str) -> &str {
    match raw_path.strip_prefix("/api") {
        Some(rest) if rest.starts_with('/') => rest,
        _ => raw_path,
    }
}

pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>> {
    let raw_path = event.uri().path();
    let path = route_path(raw_path);
    let method = event.method().as_str();

    info!("Received request: method={}, path={} (raw: {})", method, path, raw_path);

    let outcome = match (method, path) {
        ("OPTIONS", _) => return preflight_response(),
        ("GET", "/availability") => availability(&state, &event).await,
        ("POST", _) => booking(&state, &event).await,
        _ => Err(Error::NotFound("Not Found".to_string())),
    };

    match outcome {
        Ok(response) => Ok(response),
        Err(e) => {
            if e.status_code() >= 500 {
                error!("{} {} failed: {}", method, path, e);
            } else {
                warn!("{} {} rejected: {}", method, path, e);
            }
            error_response(&e)
        }
    }
}

async fn availability(state: &AppState, event: &Request) -> Result<Response<Body>> {
    let params = event.query_string_parameters();
    let owner = params
        .first("cm")
        .filter(|cm| !cm.is_empty())
        .ok_or_else(|| Error::Validation("Missing case manager email".to_string()))?;

    let token = state.tokens.access_token().await?;
    info!("Access token retrieved for availability");

    let busy = state.calendar.get_busy_slots(&token, owner).await?;

    json_response(200, &AvailabilityResponse { busy })
}

async fn booking(state: &AppState, event: &Request) -> Result<Response<Body>> {
    let decoder = BodyDecoder::for_request(event)?;
    let form: BookingForm = decoder.decode(event.body().as_ref())?;
    let booking = BookingRequest::try_from(form)?;

    // Reject a bad selectedTime before spending a token on it
    let calendar_event = build_event(&booking, &state.config.booking)?;

    let token = state.tokens.access_token().await?;
    info!("Access token retrieved for booking");

    let created = state
        .calendar
        .create_event(&token, &booking.calendar_owner, &calendar_event)
        .await?;

    if !created {
        return Err(Error::EventCreation(format!(
            "Calendar service did not confirm event for {}",
            booking.calendar_owner
        )));
    }

    json_response(200, &BookingResponse::created())
}
