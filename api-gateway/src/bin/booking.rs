//! Booking Lambda - Handles appointment availability and booking.
//!
//! Endpoints:
//! - OPTIONS * - CORS preflight
//! - GET /availability?cm={owner} - Busy time for the calendar owner
//! - POST * - Book an appointment into the owner's calendar

use lambda_http::{run, service_fn, Error};
use shared::{handler, AppState, Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::load().await?;
    info!("Loaded configuration: {:?}", config);

    let state = Arc::new(AppState::new(config)?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await.map_err(Error::from) }
    }))
    .await
}
