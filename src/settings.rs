use std::path::Path;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::schedule::shift_utils::leading_int;
use crate::schedule::Day;

pub const DEFAULT_OPEN_TIME: &str = "09:00";
pub const DEFAULT_CLOSE_TIME: &str = "21:00";

const DEFAULT_OPEN_HOUR: u32 = 9;
const DEFAULT_CLOSE_HOUR: u32 = 21;

/// Store configuration read by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default, deserialize_with = "deserialize_closed_day")]
    pub closed_day: Option<Day>,
    #[serde(default = "default_open_time")]
    pub open_time: String,
    #[serde(default = "default_close_time")]
    pub close_time: String,
    /// Collected by newer forms; the engine only honours `closed_day`
    #[serde(default)]
    pub closed_days: Vec<Day>,
    /// Collected by newer forms; not used for scheduling
    #[serde(default)]
    pub departments: Vec<String>,
}

fn default_open_time() -> String {
    DEFAULT_OPEN_TIME.to_string()
}

fn default_close_time() -> String {
    DEFAULT_CLOSE_TIME.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            closed_day: None,
            open_time: default_open_time(),
            close_time: default_close_time(),
            closed_days: Vec::new(),
            departments: Vec::new(),
        }
    }
}

/// Parses a closed-day value; `None`, `Nessuno` and empty mean open every day
pub fn parse_closed_day(value: &str) -> ScheduleResult<Option<Day>> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nessuno")
    {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

fn deserialize_closed_day<'de, D>(deserializer: D) -> Result<Option<Day>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(text) => parse_closed_day(&text).map_err(serde::de::Error::custom),
    }
}

/// Hour component of an `HH:MM` store time
fn store_hour(value: &str, default: u32) -> u32 {
    if let Ok(time) = NaiveTime::parse_from_str(value.trim(), "%H:%M") {
        return time.hour();
    }
    leading_int(value)
        .and_then(|h| u32::try_from(h).ok())
        .filter(|h| *h <= 24)
        .unwrap_or(default)
}

impl StoreSettings {
    pub fn load<P: AsRef<Path>>(path: P) -> ScheduleResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&text)?;
        Ok(settings)
    }

    pub fn with_closed_day(mut self, day: Option<Day>) -> Self {
        self.closed_day = day;
        self
    }

    pub fn with_hours(mut self, open_time: impl Into<String>, close_time: impl Into<String>) -> Self {
        self.open_time = open_time.into();
        self.close_time = close_time.into();
        self
    }

    pub fn open_hour(&self) -> u32 {
        store_hour(&self.open_time, DEFAULT_OPEN_HOUR)
    }

    pub fn close_hour(&self) -> u32 {
        store_hour(&self.close_time, DEFAULT_CLOSE_HOUR)
    }

    /// Reports settings that are accepted but not acted on
    pub fn warn_unused(&self) {
        if !self.closed_days.is_empty() {
            log::warn!(
                "settings: closed_days {:?} ignored, only closed_day ({:?}) is applied",
                self.closed_days,
                self.closed_day
            );
        }
        if !self.departments.is_empty() {
            log::warn!(
                "settings: {} department(s) ignored, the roster is scheduled as one group",
                self.departments.len()
            );
        }
    }
}

impl std::str::FromStr for StoreSettings {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
