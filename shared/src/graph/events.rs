//! Appointment events: building the Graph event body and submitting it.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{iso_timestamp, CalendarClient};
use crate::config::BookingConfig;
use crate::models::{
    Attendee, AttendeeType, BookingRequest, CalendarEvent, DateTimeTimeZone, EmailAddress, ItemBody,
};
use crate::{Error, Result};

/// Length of every booked appointment.
pub const APPOINTMENT_MINUTES: i64 = 30;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: Option<String>,
}

fn invalid_time() -> Error {
    Error::Validation("Invalid selectedTime".to_string())
}

/// Convert a requested start time to UTC.
///
/// Naive wall-clock times are shifted by `utc_offset_minutes` (east of UTC);
/// RFC 3339 times use their own offset. A bare date is UTC midnight.
pub fn to_utc(selected_time: &str, utc_offset_minutes: i32) -> Result<DateTime<Utc>> {
    let selected_time = selected_time.trim();

    if let Ok(zoned) = DateTime::parse_from_rfc3339(selected_time) {
        return Ok(zoned.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(selected_time, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    let local = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(selected_time, format).ok())
        .ok_or_else(invalid_time)?;

    Utc.from_utc_datetime(&local)
        .checked_sub_signed(Duration::minutes(utc_offset_minutes.into()))
        .ok_or_else(invalid_time)
}

/// Escape text content; quotes are left alone outside attributes.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the Graph event for a booking.
///
/// The result depends only on its inputs, so the same booking always
/// produces the same event.
pub fn build_event(booking: &BookingRequest, config: &BookingConfig) -> Result<CalendarEvent> {
    let start = to_utc(&booking.selected_time, config.utc_offset_minutes)?;
    let end = start
        .checked_add_signed(Duration::minutes(APPOINTMENT_MINUTES))
        .ok_or_else(invalid_time)?;

    let content = format!(
        "Client: {}<br>Email: {}<br>Phone: {}",
        escape_html(&booking.name),
        escape_html(&booking.email),
        escape_html(booking.phone.as_deref().unwrap_or("N/A")),
    );

    Ok(CalendarEvent {
        subject: format!("📅 Appointment with {}", booking.name),
        body: ItemBody {
            content_type: "HTML".to_string(),
            content,
        },
        start: DateTimeTimeZone::utc(iso_timestamp(start)),
        end: DateTimeTimeZone::utc(iso_timestamp(end)),
        attendees: vec![
            Attendee {
                email_address: EmailAddress {
                    address: booking.email.clone(),
                    name: booking.name.clone(),
                },
                attendee_type: AttendeeType::Required,
            },
            Attendee {
                email_address: EmailAddress {
                    address: config.observer_email.clone(),
                    name: config.observer_name.clone(),
                },
                attendee_type: AttendeeType::Optional,
            },
        ],
    })
}

impl CalendarClient {
    /// Create an event in the owner's calendar.
    ///
    /// Returns `Ok(false)` when Graph answers with a non-success status.
    pub async fn create_event(
        &self,
        access_token: &str,
        owner: &str,
        event: &CalendarEvent,
    ) -> Result<bool> {
        let url = self.user_url(owner, "events");
        debug!("Creating event at {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Create event failed ({}): {}", status, body);
            return Ok(false);
        }

        let id = serde_json::from_str::<CreatedEvent>(&body)
            .ok()
            .and_then(|created| created.id)
            .unwrap_or_default();
        info!("Event created: {}", id);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> BookingRequest {
        BookingRequest {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            selected_time: "2024-01-01T09:00:00".to_string(),
            calendar_owner: "owner@x.com".to_string(),
        }
    }

    #[test]
    fn test_naive_time_with_zero_offset() {
        let utc = to_utc("2024-01-01T09:00:00", 0).unwrap();
        assert_eq!(iso_timestamp(utc), "2024-01-01T09:00:00.000Z");
    }

    #[test]
    fn test_naive_time_subtracts_offset() {
        // UTC+2 wall clock
        let utc = to_utc("2024-01-01T09:00", 120).unwrap();
        assert_eq!(iso_timestamp(utc), "2024-01-01T07:00:00.000Z");

        // UTC-5 wall clock crosses midnight
        let utc = to_utc("2024-01-01T22:30:00.500", -300).unwrap();
        assert_eq!(iso_timestamp(utc), "2024-01-02T03:30:00.500Z");
    }

    #[test]
    fn test_rfc3339_uses_own_offset() {
        let utc = to_utc("2024-01-01T09:00:00-05:00", 120).unwrap();
        assert_eq!(iso_timestamp(utc), "2024-01-01T14:00:00.000Z");
    }

    #[test]
    fn test_invalid_time() {
        let err = to_utc("next tuesday", 0).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        let utc = to_utc("2024-01-01", 120).unwrap();
        assert_eq!(iso_timestamp(utc), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_offset_overflow_is_rejected() {
        // chrono accepts six-digit years right at the end of its range
        assert!(to_utc("+262142-12-31T23:59:00", 0).is_ok());

        let err = to_utc("+262142-12-31T22:00:00", -300).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.client_message(), "Invalid selectedTime");
    }

    #[test]
    fn test_end_time_overflow_is_rejected() {
        let mut booking = booking();
        booking.selected_time = "+262142-12-31T23:59:00".to_string();

        let err = build_event(&booking, &BookingConfig::default()).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_event_is_thirty_minutes() {
        let config = BookingConfig {
            utc_offset_minutes: 60,
            ..BookingConfig::default()
        };
        let event = build_event(&booking(), &config).unwrap();

        assert_eq!(event.start.date_time, "2024-01-01T08:00:00.000Z");
        assert_eq!(event.end.date_time, "2024-01-01T08:30:00.000Z");
        assert_eq!(event.start.time_zone, "UTC");
    }

    #[test]
    fn test_event_body() {
        let event = build_event(&booking(), &BookingConfig::default()).unwrap();

        assert_eq!(event.subject, "📅 Appointment with Jane Doe");
        assert_eq!(event.body.content_type, "HTML");
        assert_eq!(
            event.body.content,
            "Client: Jane Doe<br>Email: jane@example.com<br>Phone: N/A"
        );
        assert_eq!(event.attendees.len(), 2);
        assert_eq!(event.attendees[0].email_address.address, "jane@example.com");
        assert_eq!(event.attendees[0].attendee_type, AttendeeType::Required);
        assert_eq!(
            event.attendees[1].email_address.address,
            crate::config::DEFAULT_OBSERVER_EMAIL
        );
        assert_eq!(event.attendees[1].attendee_type, AttendeeType::Optional);
    }

    #[test]
    fn test_event_body_escapes_html() {
        let mut booking = booking();
        booking.name = "<b>Jane</b>".to_string();
        booking.phone = Some("555 & 1".to_string());

        let event = build_event(&booking, &BookingConfig::default()).unwrap();
        assert_eq!(
            event.body.content,
            "Client: &lt;b&gt;Jane&lt;/b&gt;<br>Email: jane@example.com<br>Phone: 555 &amp; 1"
        );
    }

    #[test]
    fn test_event_body_keeps_quotes() {
        let mut booking = booking();
        booking.name = "Sean O'Brien \"Jr\"".to_string();

        let event = build_event(&booking, &BookingConfig::default()).unwrap();
        assert!(event.body.content.starts_with("Client: Sean O'Brien \"Jr\"<br>"));
    }

    #[test]
    fn test_event_is_deterministic() {
        let config = BookingConfig::default();
        let first = build_event(&booking(), &config).unwrap();
        let second = build_event(&booking(), &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
