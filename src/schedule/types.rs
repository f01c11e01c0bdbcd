use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ScheduleError;
use super::history::{analyze_history, HistoryAnalysis};
use super::preferences::{parse_preferences, ParsedPreferences};
use super::shift_utils::{contains_digit, is_closed_marker, leading_int, legacy_duration};

/// Marker stored in a cell when the store itself is closed that day
pub const CLOSED_SENTINEL: &str = "CHIUSO";

/// Separator between the two halves of a split shift
pub const SPLIT_SEPARATOR: &str = " / ";

/// Day of the week, Monday first. Serialized with the short Italian codes
/// used as CSV column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "Lun")]
    Monday,
    #[serde(rename = "Mar")]
    Tuesday,
    #[serde(rename = "Mer")]
    Wednesday,
    #[serde(rename = "Gio")]
    Thursday,
    #[serde(rename = "Ven")]
    Friday,
    #[serde(rename = "Sab")]
    Saturday,
    #[serde(rename = "Dom")]
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Day::Monday => "Lun",
            Day::Tuesday => "Mar",
            Day::Wednesday => "Mer",
            Day::Thursday => "Gio",
            Day::Friday => "Ven",
            Day::Saturday => "Sab",
            Day::Sunday => "Dom",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Day::Saturday | Day::Sunday)
    }

    /// Looks up a day by its column code, Italian name or English name
    pub fn from_name(name: &str) -> Option<Day> {
        let lower = name.trim().to_lowercase();
        let day = match lower.as_str() {
            "lun" | "lunedi" | "lunedì" | "mon" | "monday" => Day::Monday,
            "mar" | "martedi" | "martedì" | "tue" | "tuesday" => Day::Tuesday,
            "mer" | "mercoledi" | "mercoledì" | "wed" | "wednesday" => Day::Wednesday,
            "gio" | "giovedi" | "giovedì" | "thu" | "thursday" => Day::Thursday,
            "ven" | "venerdi" | "venerdì" | "fri" | "friday" => Day::Friday,
            "sab" | "sabato" | "sat" | "saturday" => Day::Saturday,
            "dom" | "domenica" | "sun" | "sunday" => Day::Sunday,
            _ => return None,
        };
        Some(day)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Day {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::from_name(s).ok_or_else(|| ScheduleError::InvalidDay { value: s.to_string() })
    }
}

/// One value per day of the week, indexed by [`Day`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Week<T>([T; 7]);

impl<T> Week<T> {
    pub fn from_fn(mut f: impl FnMut(Day) -> T) -> Self {
        Week(std::array::from_fn(|i| f(Day::ALL[i])))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Week<U> {
        Week::from_fn(|day| f(&self[day]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &T)> {
        Day::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<T> Index<Day> for Week<T> {
    type Output = T;

    fn index(&self, day: Day) -> &T {
        &self.0[day.index()]
    }
}

impl<T> IndexMut<Day> for Week<T> {
    fn index_mut(&mut self, day: Day) -> &mut T {
        &mut self.0[day.index()]
    }
}

impl<T: Serialize> Serialize for Week<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (day, value) in self.iter() {
            map.serialize_entry(day.code(), value)?;
        }
        map.end()
    }
}

/// Wall-clock time as written in a shift string. Durations only ever read `hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn on_the_hour(hour: u32) -> Self {
        Self { hour, minute: 0 }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A single worked range, e.g. `09:00 - 13:00`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Interval {
    pub fn hours(start: u32, end: u32) -> Self {
        Self {
            start: ClockTime::on_the_hour(start),
            end: ClockTime::on_the_hour(end),
        }
    }

    /// Whole hours between the hour components; minutes are ignored
    pub fn duration(&self) -> i32 {
        self.end.hour as i32 - self.start.hour as i32
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Total hours of a shift made of one or more intervals
pub fn shift_duration(shift: &[Interval]) -> i32 {
    shift.iter().map(Interval::duration).sum()
}

/// Formats a shift the way it appears in the exported grid
pub fn format_shift(shift: &[Interval]) -> String {
    shift
        .iter()
        .map(Interval::to_string)
        .collect::<Vec<_>>()
        .join(SPLIT_SEPARATOR)
}

/// Content of one day in an employee's grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShiftCell {
    #[default]
    Unset,
    Closed,
    /// Free text carried over from the input (leave codes and the like)
    Locked(String),
    Worked(Vec<Interval>),
}

impl ShiftCell {
    pub fn is_unset(&self) -> bool {
        matches!(self, ShiftCell::Unset)
    }

    pub fn duration(&self) -> i32 {
        match self {
            ShiftCell::Unset | ShiftCell::Closed => 0,
            ShiftCell::Locked(text) => legacy_duration(text),
            ShiftCell::Worked(shift) => shift_duration(shift),
        }
    }
}

impl fmt::Display for ShiftCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftCell::Unset => Ok(()),
            ShiftCell::Closed => f.write_str(CLOSED_SENTINEL),
            ShiftCell::Locked(text) => f.write_str(text),
            ShiftCell::Worked(shift) => f.write_str(&format_shift(shift)),
        }
    }
}

impl Serialize for ShiftCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the imported roster
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeInput {
    pub name: String,
    /// Raw contract column; see [`EmployeeInput::contracted_hours`]
    pub contract_hours: String,
    pub preferences: String,
    pub current_week: Week<String>,
    /// Weeks 1, 2 and 3 before the current one
    pub past_weeks: [Week<String>; 3],
}

impl EmployeeInput {
    pub fn new(name: impl Into<String>, contract_hours: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contract_hours: contract_hours.into(),
            ..Default::default()
        }
    }

    pub fn with_preferences(mut self, preferences: impl Into<String>) -> Self {
        self.preferences = preferences.into();
        self
    }

    pub fn with_shift(mut self, day: Day, value: impl Into<String>) -> Self {
        self.current_week[day] = value.into();
        self
    }

    /// Sets a cell `weeks_back` weeks before the current one (1..=3)
    pub fn with_past_shift(mut self, weeks_back: usize, day: Day, value: impl Into<String>) -> Self {
        if let Some(week) = weeks_back.checked_sub(1).and_then(|i| self.past_weeks.get_mut(i)) {
            week[day] = value.into();
        }
        self
    }

    /// Contracted weekly hours; anything without a leading number counts as 0
    pub fn contracted_hours(&self) -> i32 {
        leading_int(&self.contract_hours).unwrap_or(0)
    }
}

/// Working record for one employee during and after a run
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub input: EmployeeInput,
    pub preferences: ParsedPreferences,
    pub history: HistoryAnalysis,
    pub assigned_hours: i32,
    pub shifts: Week<ShiftCell>,
}

impl ScheduleEntry {
    /// Derives preferences and history, then seeds the grid from the current week:
    /// values with digits are stale generated times and are cleared, other text is kept.
    pub fn new(input: EmployeeInput) -> Self {
        let preferences = parse_preferences(&input.preferences);
        let history = analyze_history(&input);
        let shifts = input.current_week.map(|raw| initial_cell(raw.as_str()));
        let assigned_hours = shifts.values().map(ShiftCell::duration).sum();

        Self {
            input,
            preferences,
            history,
            assigned_hours,
            shifts,
        }
    }

    pub fn contracted_hours(&self) -> i32 {
        self.input.contracted_hours()
    }

    pub fn remaining_hours(&self) -> i32 {
        self.contracted_hours() - self.assigned_hours
    }

    /// Recomputes the hour total from the grid
    pub fn recompute_hours(&mut self) {
        self.assigned_hours = self.shifts.values().map(ShiftCell::duration).sum();
    }
}

fn initial_cell(raw: &str) -> ShiftCell {
    if raw.trim().is_empty() || contains_digit(raw) {
        ShiftCell::Unset
    } else if is_closed_marker(raw) {
        ShiftCell::Closed
    } else {
        ShiftCell::Locked(raw.to_string())
    }
}

/// Result of a run: entries in input order plus the windows they were built from
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    pub windows: super::windows::ShiftWindows,
}
