//! Free/busy lookup via Graph `getSchedule`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{iso_timestamp, CalendarClient};
use crate::models::{BusyInterval, DateTimeTimeZone};
use crate::{Error, Result};

/// How far ahead availability is reported.
pub const LOOK_AHEAD_DAYS: i64 = 7;

/// Granularity of the availability view, in minutes.
pub const AVAILABILITY_VIEW_INTERVAL: u32 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequest<'a> {
    schedules: [&'a str; 1],
    start_time: DateTimeTimeZone,
    end_time: DateTimeTimeZone,
    availability_view_interval: u32,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    value: Vec<ScheduleInformation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleInformation {
    schedule_items: Option<Vec<ScheduleItem>>,
}

#[derive(Debug, Deserialize)]
struct ScheduleItem {
    start: ItemTime,
    end: ItemTime,
}

/// Graph reports `dateTimeTimeZone` objects; bare strings are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemTime {
    Zoned(DateTimeTimeZone),
    Plain(String),
}

impl From<ItemTime> for String {
    fn from(time: ItemTime) -> Self {
        match time {
            ItemTime::Zoned(zoned) => zoned.date_time,
            ItemTime::Plain(plain) => plain,
        }
    }
}

/// The `[now, now + 7 days]` window queried for busy time.
pub fn schedule_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(LOOK_AHEAD_DAYS))
}

/// Busy intervals of the first schedule in the response.
fn busy_intervals(response: ScheduleResponse) -> Vec<BusyInterval> {
    response
        .value
        .into_iter()
        .next()
        .and_then(|schedule| schedule.schedule_items)
        .unwrap_or_default()
        .into_iter()
        .map(|item| BusyInterval {
            start: item.start.into(),
            end: item.end.into(),
        })
        .collect()
}

impl CalendarClient {
    /// Fetch the owner's busy intervals for the next seven days.
    pub async fn get_busy_slots(&self, access_token: &str, owner: &str) -> Result<Vec<BusyInterval>> {
        let (start, end) = schedule_window(Utc::now());

        let request = ScheduleRequest {
            schedules: [owner],
            start_time: DateTimeTimeZone::utc(iso_timestamp(start)),
            end_time: DateTimeTimeZone::utc(iso_timestamp(end)),
            availability_view_interval: AVAILABILITY_VIEW_INTERVAL,
        };

        let url = self.user_url(owner, "calendar/getSchedule");
        debug!("Requesting schedule from {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Failed to get schedule ({}): {}", status, error_text);
            return Err(Error::ScheduleFetch(format!(
                "getSchedule for {} failed with status {}",
                owner, status
            )));
        }

        let schedule: ScheduleResponse = response.json().await?;
        let busy = busy_intervals(schedule);

        info!("Found {} busy intervals for {}", busy.len(), owner);

        Ok(busy)
    }
}
