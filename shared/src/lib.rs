//! Shared library for the appointment booking Lambda.
//!
//! This crate provides configuration, error handling, the Microsoft Graph
//! client, and the request dispatcher used by the `booking` function.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod http;
pub mod models;
pub mod secrets;

pub use config::{BookingConfig, Config, GraphConfig};
pub use dispatch::{handler, AppState};
pub use error::{Error, Result};
pub use models::{BookingRequest, BusyInterval, CalendarEvent};
pub use secrets::{get_graph_credentials, get_secret, GraphCredentials};
