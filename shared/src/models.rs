//! Shared data models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Error, Result};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

/// Booking payload exactly as decoded from the inbound body.
///
/// Every field is optional here so that a missing field surfaces as a
/// validation error rather than a decode error.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(required, length(min = 1))]
    pub selected_time: Option<String>,
    #[serde(rename = "cm", alias = "calendarOwner")]
    #[validate(required, length(min = 1))]
    pub calendar_owner: Option<String>,
}

/// A validated booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Requested start, local wall-clock or RFC 3339
    pub selected_time: String,
    /// Mailbox the appointment is booked into
    pub calendar_owner: String,
}

impl TryFrom<BookingForm> for BookingRequest {
    type Error = Error;

    fn try_from(form: BookingForm) -> Result<Self> {
        form.validate()
            .map_err(|_| Error::Validation(MISSING_FIELDS_MESSAGE.to_string()))?;

        match (form.name, form.email, form.selected_time, form.calendar_owner) {
            (Some(name), Some(email), Some(selected_time), Some(calendar_owner)) => Ok(Self {
                name,
                email,
                phone: form.phone.filter(|p| !p.is_empty()),
                selected_time,
                calendar_owner,
            }),
            _ => Err(Error::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// A time range during which the calendar owner is already booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: String,
    pub end: String,
}

/// Body of a successful availability lookup.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub busy: Vec<BusyInterval>,
}

/// Body of a successful booking.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
}

impl BookingResponse {
    pub fn created() -> Self {
        Self {
            success: true,
            message: "Event created.".to_string(),
        }
    }
}

/// Graph `dateTimeTimeZone` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    #[serde(default)]
    pub time_zone: String,
}

impl DateTimeTimeZone {
    pub fn utc(date_time: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: "UTC".to_string(),
        }
    }
}

/// Outbound Graph event body for a booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub subject: String,
    pub body: ItemBody,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email_address: EmailAddress,
    #[serde(rename = "type")]
    pub attendee_type: AttendeeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub address: String,
    pub name: String,
}

/// Participation role; optional attendees do not count as conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeType {
    Required,
    Optional,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(json: &str) -> BookingForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_booking() {
        let booking = BookingRequest::try_from(form(
            r#"{"name":"A","email":"a@x.com","selectedTime":"2024-01-01T09:00:00","cm":"owner@x.com"}"#,
        ))
        .unwrap();

        assert_eq!(booking.name, "A");
        assert_eq!(booking.calendar_owner, "owner@x.com");
        assert_eq!(booking.phone, None);
    }

    #[test]
    fn test_calendar_owner_alias() {
        let booking = BookingRequest::try_from(form(
            r#"{"name":"A","email":"a@x.com","selectedTime":"2024-01-01T09:00:00","calendarOwner":"owner@x.com"}"#,
        ))
        .unwrap();
        assert_eq!(booking.calendar_owner, "owner@x.com");
    }

    #[test]
    fn test_missing_owner() {
        let err = BookingRequest::try_from(form(
            r#"{"name":"A","email":"a@x.com","selectedTime":"2024-01-01T09:00:00"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == MISSING_FIELDS_MESSAGE));
    }

    #[test]
    fn test_empty_field_is_missing() {
        let err = BookingRequest::try_from(form(
            r#"{"name":"","email":"a@x.com","selectedTime":"2024-01-01T09:00:00","cm":"owner@x.com"}"#,
        ))
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_empty_phone_is_absent() {
        let booking = BookingRequest::try_from(form(
            r#"{"name":"A","email":"a@x.com","phone":"","selectedTime":"2024-01-01T09:00:00","cm":"owner@x.com"}"#,
        ))
        .unwrap();
        assert_eq!(booking.phone, None);
    }

    #[test]
    fn test_event_serializes_to_graph_shape() {
        let attendee = Attendee {
            email_address: EmailAddress {
                address: "calendar@example.com".to_string(),
                name: "Team Calendar".to_string(),
            },
            attendee_type: AttendeeType::Optional,
        };
        let json = serde_json::to_value(&attendee).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "emailAddress": {"address": "calendar@example.com", "name": "Team Calendar"},
                "type": "optional"
            })
        );
    }
}
