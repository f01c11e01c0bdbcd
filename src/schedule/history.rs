//! Weighted reading of the current week and the three weeks before it.
//!
//! Weights are kept in tenths so that sums stay exact: the current week counts
//! 10, then 5, 3 and 2 going back (20 in total for a day). A day whose absence
//! weight reaches 14 is a recurring rest day.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::shift_utils::is_closed_marker;
use super::types::{Day, EmployeeInput, Week};

/// Current week first, then one, two and three weeks back
pub const WEEK_WEIGHTS: [u32; 4] = [10, 5, 3, 2];

pub const REST_DAY_THRESHOLD: u32 = 14;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryAnalysis {
    /// Highest-weighted shift over every day and week
    pub most_common: Option<String>,
    pub preferred_by_day: BTreeMap<Day, String>,
    pub rest_days: BTreeSet<Day>,
}

impl HistoryAnalysis {
    /// Day-specific habit if there is one, else the overall habit
    pub fn shift_for(&self, day: Day) -> Option<&str> {
        self.preferred_by_day
            .get(&day)
            .or(self.most_common.as_ref())
            .map(String::as_str)
    }

    pub fn is_rest_day(&self, day: Day) -> bool {
        self.rest_days.contains(&day)
    }
}

/// Accumulated weight per shift string, kept in first-seen order so the
/// earliest entry wins a tie.
#[derive(Debug, Default)]
struct Tally {
    entries: Vec<(String, u32)>,
}

impl Tally {
    fn add(&mut self, shift: &str, weight: u32) {
        match self.entries.iter_mut().find(|(s, _)| s == shift) {
            Some((_, total)) => *total += weight,
            None => self.entries.push((shift.to_string(), weight)),
        }
    }

    fn best(&self) -> Option<&str> {
        let mut best: Option<&(String, u32)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(s, _)| s.as_str())
    }
}

fn is_blank_week(week: &Week<String>) -> bool {
    week.values().all(|v| v.trim().is_empty())
}

/// Builds the history profile of one employee.
///
/// Only an employee with no value in any of the four weeks gets an empty
/// profile. Otherwise every blank cell counts as absence, including the
/// usually blank current week.
pub fn analyze_history(input: &EmployeeInput) -> HistoryAnalysis {
    let weeks: [&Week<String>; 4] = [
        &input.current_week,
        &input.past_weeks[0],
        &input.past_weeks[1],
        &input.past_weeks[2],
    ];
    if weeks.iter().all(|week| is_blank_week(week)) {
        return HistoryAnalysis::default();
    }
    let recorded: Vec<(&Week<String>, u32)> = weeks.into_iter().zip(WEEK_WEIGHTS).collect();

    let mut analysis = HistoryAnalysis::default();
    let mut overall = Tally::default();

    for day in Day::ALL {
        let mut daily = Tally::default();
        let mut absence = 0;

        for (week, weight) in &recorded {
            let value = week[day].trim();
            if value.is_empty() || is_closed_marker(value) {
                absence += weight;
            } else if value.contains('-') {
                daily.add(value, *weight);
                overall.add(value, *weight);
            }
        }

        if let Some(shift) = daily.best() {
            analysis.preferred_by_day.insert(day, shift.to_string());
        }
        if absence >= REST_DAY_THRESHOLD {
            analysis.rest_days.insert(day);
        }
    }

    analysis.most_common = overall.best().map(str::to_string);
    analysis
}
