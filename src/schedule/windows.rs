use serde::Serialize;

use crate::settings::StoreSettings;
use super::types::{format_shift, shift_duration, Interval};

/// Store closes no later than this many hours after opening for a single
/// person to cover the whole day
pub const MAX_FULL_DAY_HOURS: i32 = 9;

/// Length of each half of a split shift
pub const SPLIT_HALF_HOURS: u32 = 4;

/// Candidate shifts derived from the store's opening hours. Only whole hours
/// are used; minutes in the settings are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftWindows {
    pub open_hour: u32,
    pub close_hour: u32,
    pub total_hours: i32,
    pub mid_point: u32,
    pub half_shift: i32,
    pub morning: Vec<Interval>,
    pub afternoon: Vec<Interval>,
    pub mid_day: Vec<Interval>,
    pub split: Vec<Interval>,
    /// Offered only for short store days
    pub full_day: Option<Vec<Interval>>,
}

impl ShiftWindows {
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        let total_hours = close_hour as i32 - open_hour as i32;
        let span = total_hours.max(0) as u32;
        let mid_point = open_hour + span / 2;

        // floor(open + span/4) and floor(close - span/4)
        let peak_start = open_hour + span / 4;
        let peak_end = close_hour.saturating_sub((span + 3) / 4);

        let split_end = (open_hour + SPLIT_HALF_HOURS).min(close_hour.max(open_hour));
        let split_start = close_hour.saturating_sub(SPLIT_HALF_HOURS).max(open_hour);

        Self {
            open_hour,
            close_hour,
            total_hours,
            mid_point,
            half_shift: (span / 2) as i32,
            morning: vec![Interval::hours(open_hour, mid_point)],
            afternoon: vec![Interval::hours(mid_point, close_hour.max(mid_point))],
            mid_day: vec![Interval::hours(peak_start, peak_end.max(peak_start))],
            split: vec![
                Interval::hours(open_hour, split_end),
                Interval::hours(split_start, close_hour.max(split_start)),
            ],
            full_day: (total_hours > 0 && total_hours <= MAX_FULL_DAY_HOURS)
                .then(|| vec![Interval::hours(open_hour, close_hour)]),
        }
    }

    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.open_hour(), settings.close_hour())
    }

    /// False when closing is not after opening; no shift can be offered then
    pub fn is_open(&self) -> bool {
        self.total_hours > 0
    }

    pub fn allows_full_day(&self) -> bool {
        self.full_day.is_some()
    }

    pub fn morning_hours(&self) -> i32 {
        shift_duration(&self.morning)
    }

    pub fn afternoon_hours(&self) -> i32 {
        shift_duration(&self.afternoon)
    }

    pub fn mid_day_hours(&self) -> i32 {
        shift_duration(&self.mid_day)
    }

    pub fn split_hours(&self) -> i32 {
        shift_duration(&self.split)
    }
}

impl Serialize for ShiftWindows {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ShiftWindows", 8)?;
        state.serialize_field("total_hours", &self.total_hours)?;
        state.serialize_field("half_shift", &self.half_shift)?;
        state.serialize_field("mid_point", &self.mid_point)?;
        state.serialize_field("morning", &format_shift(&self.morning))?;
        state.serialize_field("afternoon", &format_shift(&self.afternoon))?;
        state.serialize_field("mid_day", &format_shift(&self.mid_day))?;
        state.serialize_field("split", &format_shift(&self.split))?;
        state.serialize_field("full_day", &self.full_day.as_deref().map(format_shift))?;
        state.end()
    }
}
