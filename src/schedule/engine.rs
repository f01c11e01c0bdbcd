//! Day-by-day greedy assignment.
//!
//! Employees are shuffled once, then for every open day re-sorted (stably) by
//! priority and offered shifts in two passes: first honouring preferences,
//! coverage and history, then filling anyone still short of contract.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::settings::StoreSettings;
use super::preferences::ShiftPreference;
use super::shift_utils::parse_shift;
use super::types::{shift_duration, Day, EmployeeInput, Interval, Schedule, ScheduleEntry, ShiftCell};
use super::windows::ShiftWindows;

/// Staff wanted at opening and at closing before other wishes are honoured
pub const CRITICAL_COVERAGE: u32 = 2;

/// Pass 2 still hands out a half day when at least this much contract remains
pub const MIN_GAP_FILL_HOURS: i32 = 3;

/// Per-day counts of who is on which part of the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    pub morning: u32,
    pub afternoon: u32,
    pub opening: u32,
    pub closing: u32,
}

impl Coverage {
    pub fn record(&mut self, shift: &[Interval], windows: &ShiftWindows) {
        let (Some(first), Some(last)) = (shift.first(), shift.last()) else {
            return;
        };
        let start = first.start.hour;
        let end = last.end.hour;

        if start < windows.mid_point {
            self.morning += 1;
        }
        if end > windows.mid_point {
            self.afternoon += 1;
        }
        if start == windows.open_hour {
            self.opening += 1;
        }
        if end >= windows.close_hour {
            self.closing += 1;
        }
    }

    pub fn opening_and_closing_staffed(&self) -> bool {
        self.opening >= CRITICAL_COVERAGE && self.closing >= CRITICAL_COVERAGE
    }

    /// The half of the day with fewer people; mornings win a tie
    pub fn thinner_half<'w>(&self, windows: &'w ShiftWindows) -> &'w [Interval] {
        if self.morning <= self.afternoon {
            &windows.morning
        } else {
            &windows.afternoon
        }
    }
}

/// Builds the week's schedule for `employees`.
///
/// The result keeps input order. `rng` only decides how equal-priority
/// employees are ordered, so a seeded generator gives a reproducible run.
pub fn generate_schedule<R: Rng + ?Sized>(
    employees: &[EmployeeInput],
    settings: &StoreSettings,
    rng: &mut R,
) -> Schedule {
    let windows = ShiftWindows::from_settings(settings);
    settings.warn_unused();

    let mut entries: Vec<ScheduleEntry> = employees.iter().cloned().map(ScheduleEntry::new).collect();

    log::info!(
        "engine: scheduling {} employees, store {:02}:00-{:02}:00, closed {:?}",
        entries.len(),
        windows.open_hour,
        windows.close_hour,
        settings.closed_day
    );

    if !windows.is_open() {
        log::warn!(
            "engine: closing hour {} is not after opening hour {}, no shifts offered",
            windows.close_hour,
            windows.open_hour
        );
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.shuffle(rng);

    for day in Day::ALL {
        if settings.closed_day == Some(day) {
            close_day(&mut entries, day);
            continue;
        }
        if !windows.is_open() {
            continue;
        }

        // sort_by is stable: equal priorities keep the shuffled order
        order.sort_by(|&a, &b| compare_priority(&entries[a], &entries[b], day));

        let mut coverage = Coverage::default();
        preference_pass(&mut entries, &order, day, &windows, &mut coverage);
        fill_pass(&mut entries, &order, day, &windows, &mut coverage);

        log::debug!(
            "engine: {day} coverage morning={} afternoon={} opening={} closing={}",
            coverage.morning,
            coverage.afternoon,
            coverage.opening,
            coverage.closing
        );
    }

    Schedule { entries, windows }
}

fn close_day(entries: &mut [ScheduleEntry], day: Day) {
    for entry in entries.iter_mut() {
        let previous = std::mem::replace(&mut entry.shifts[day], ShiftCell::Closed);
        entry.assigned_hours -= previous.duration();
    }
    log::debug!("engine: {day} closed");
}

/// Descending priority: required today, weekend-only fit, explicit shift
/// wishes, then largest remaining gap.
fn compare_priority(a: &ScheduleEntry, b: &ScheduleEntry, day: Day) -> Ordering {
    let required = b.preferences.requires(day).cmp(&a.preferences.requires(day));

    let weekend_only = if day.is_weekend() {
        b.preferences.weekend_only.cmp(&a.preferences.weekend_only)
    } else {
        a.preferences.weekend_only.cmp(&b.preferences.weekend_only)
    };

    let has_wish = |e: &ScheduleEntry| !e.preferences.for_day(day).is_flexible();
    let wishes = has_wish(b).cmp(&has_wish(a));

    let gap = b.remaining_hours().cmp(&a.remaining_hours());

    required.then(weekend_only).then(wishes).then(gap)
}

/// Under contract, nothing in today's cell, and no hard constraint against today
fn is_available(entry: &ScheduleEntry, day: Day) -> bool {
    entry.remaining_hours() > 0 && entry.shifts[day].is_unset() && entry.preferences.allows(day)
}

/// Writes the shift, adds its parsed duration and updates coverage
fn assign(
    entry: &mut ScheduleEntry,
    day: Day,
    shift: Vec<Interval>,
    windows: &ShiftWindows,
    coverage: &mut Coverage,
) {
    let hours = shift_duration(&shift);
    coverage.record(&shift, windows);
    entry.assigned_hours += hours;
    let cell = ShiftCell::Worked(shift);
    log::debug!("engine: {day} {} -> {cell} ({hours}h)", entry.input.name);
    entry.shifts[day] = cell;
}

fn preference_pass(
    entries: &mut [ScheduleEntry],
    order: &[usize],
    day: Day,
    windows: &ShiftWindows,
    coverage: &mut Coverage,
) {
    for &idx in order {
        if !is_available(&entries[idx], day) {
            continue;
        }

        let entry = &entries[idx];
        if entry.history.is_rest_day(day) && !entry.preferences.requires(day) {
            let someone_else = order
                .iter()
                .any(|&other| other != idx && is_available(&entries[other], day));
            if coverage.opening_and_closing_staffed() && someone_else {
                log::debug!("engine: {day} {} left on usual rest day", entry.input.name);
                continue;
            }
        }

        if let Some(shift) = choose_preferred_shift(entry, day, windows, coverage) {
            assign(&mut entries[idx], day, shift, windows, coverage);
        }
    }
}

fn choose_preferred_shift(
    entry: &ScheduleEntry,
    day: Day,
    windows: &ShiftWindows,
    coverage: &Coverage,
) -> Option<Vec<Interval>> {
    let pref = entry.preferences.for_day(day);
    let remaining = entry.remaining_hours();

    critical_coverage_shift(pref, remaining, windows, coverage)
        .or_else(|| explicit_shift(pref, remaining, windows))
        .or_else(|| historic_shift(entry, day, pref, remaining, windows))
        .or_else(|| balance_shift(pref, remaining, windows, coverage))
}

/// Fill opening, then closing, until each has [`CRITICAL_COVERAGE`] people
fn critical_coverage_shift(
    pref: ShiftPreference,
    remaining: i32,
    windows: &ShiftWindows,
    coverage: &Coverage,
) -> Option<Vec<Interval>> {
    if pref.avoids_open_close() || remaining < windows.half_shift {
        return None;
    }
    if coverage.opening < CRITICAL_COVERAGE && !pref.afternoon_only {
        return Some(windows.morning.clone());
    }
    if coverage.closing < CRITICAL_COVERAGE && !pref.morning_only {
        return Some(windows.afternoon.clone());
    }
    None
}

fn explicit_shift(pref: ShiftPreference, remaining: i32, windows: &ShiftWindows) -> Option<Vec<Interval>> {
    if pref.split_shift && remaining >= windows.split_hours() {
        return Some(windows.split.clone());
    }
    if pref.mid_day_only && remaining >= windows.mid_day_hours() {
        return Some(windows.mid_day.clone());
    }
    if pref.morning_only && remaining >= windows.morning_hours() {
        return Some(windows.morning.clone());
    }
    if pref.afternoon_only && remaining >= windows.afternoon_hours() {
        return Some(windows.afternoon.clone());
    }
    None
}

/// The employee's habitual shift, unless it clashes with today's wish or
/// does not fit the remaining hours
fn historic_shift(
    entry: &ScheduleEntry,
    day: Day,
    pref: ShiftPreference,
    remaining: i32,
    windows: &ShiftWindows,
) -> Option<Vec<Interval>> {
    let shift = parse_shift(entry.history.shift_for(day)?)?;
    let start = shift.first()?.start.hour;

    if pref.morning_only && start >= windows.mid_point {
        return None;
    }
    if pref.afternoon_only && start < windows.mid_point {
        return None;
    }
    if pref.split_shift && shift.len() < 2 {
        return None;
    }

    let hours = shift_duration(&shift);
    (hours > 0 && hours <= remaining).then_some(shift)
}

fn balance_shift(
    pref: ShiftPreference,
    remaining: i32,
    windows: &ShiftWindows,
    coverage: &Coverage,
) -> Option<Vec<Interval>> {
    if pref.morning_only && remaining >= windows.half_shift {
        return Some(windows.morning.clone());
    }
    if pref.afternoon_only && remaining >= windows.half_shift {
        return Some(windows.afternoon.clone());
    }
    if let Some(full_day) = full_day_for(pref, remaining, windows) {
        return Some(full_day);
    }
    if remaining >= windows.half_shift {
        return Some(coverage.thinner_half(windows).to_vec());
    }
    None
}

fn full_day_for(pref: ShiftPreference, remaining: i32, windows: &ShiftWindows) -> Option<Vec<Interval>> {
    if pref.morning_only || pref.afternoon_only || remaining < windows.total_hours {
        return None;
    }
    windows.full_day.clone()
}

/// Half day in the wished-for half, else wherever fewer people are
fn oriented_half(pref: ShiftPreference, windows: &ShiftWindows, coverage: &Coverage) -> Vec<Interval> {
    if pref.morning_only {
        windows.morning.clone()
    } else if pref.afternoon_only {
        windows.afternoon.clone()
    } else {
        coverage.thinner_half(windows).to_vec()
    }
}

/// Second scan: hard constraints only, rest-day habits no longer apply
fn fill_pass(
    entries: &mut [ScheduleEntry],
    order: &[usize],
    day: Day,
    windows: &ShiftWindows,
    coverage: &mut Coverage,
) {
    for &idx in order {
        let entry = &entries[idx];
        if !is_available(entry, day) {
            continue;
        }

        let pref = entry.preferences.for_day(day);
        let remaining = entry.remaining_hours();

        let shift = if let Some(full_day) = full_day_for(pref, remaining, windows) {
            full_day
        } else if remaining >= windows.half_shift {
            oriented_half(pref, windows, coverage)
        } else if remaining >= MIN_GAP_FILL_HOURS {
            // a short gap still gets a half day, possibly going over contract,
            // wherever fewer people are regardless of the wished-for half
            coverage.thinner_half(windows).to_vec()
        } else {
            continue;
        };

        assign(&mut entries[idx], day, shift, windows, coverage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScheduleRng;
    use crate::schedule::types::format_shift;

    fn store(open: &str, close: &str, closed: Option<Day>) -> StoreSettings {
        StoreSettings::default().with_hours(open, close).with_closed_day(closed)
    }

    fn cell(schedule: &Schedule, row: usize, day: Day) -> String {
        schedule.entries[row].shifts[day].to_string()
    }

    #[test]
    fn opening_is_covered_before_anything_else() {
        let employees = vec![EmployeeInput::new("Anna", "8")];
        let schedule = generate_schedule(
            &employees,
            &store("09:00", "17:00", Some(Day::Sunday)),
            &mut ScheduleRng::seeded(1),
        );

        assert_eq!(cell(&schedule, 0, Day::Monday), "09:00 - 13:00");
        assert_eq!(cell(&schedule, 0, Day::Tuesday), "09:00 - 13:00");
        assert_eq!(cell(&schedule, 0, Day::Wednesday), "");
        assert_eq!(cell(&schedule, 0, Day::Sunday), "CHIUSO");
        assert_eq!(schedule.entries[0].assigned_hours, 8);
    }

    #[test]
    fn third_opener_gets_closing_then_balance() {
        let employees: Vec<EmployeeInput> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|n| EmployeeInput::new(*n, "40"))
            .collect();
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(3));

        let monday: Vec<String> = (0..5).map(|i| cell(&schedule, i, Day::Monday)).collect();
        let mornings = monday.iter().filter(|c| c.as_str() == "09:00 - 15:00").count();
        let afternoons = monday.iter().filter(|c| c.as_str() == "15:00 - 21:00").count();
        // two openers, two closers, the fifth balances towards mornings on a tie
        assert_eq!(mornings, 3);
        assert_eq!(afternoons, 2);
    }

    #[test]
    fn split_preference_skips_coverage_forcing() {
        let employees = vec![EmployeeInput::new("Bea", "40").with_preferences("split shift")];
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(5));
        assert_eq!(cell(&schedule, 0, Day::Monday), "09:00 - 13:00 / 17:00 - 21:00");
        assert_eq!(schedule.entries[0].shifts[Day::Monday].duration(), 8);
    }

    #[test]
    fn explicit_wish_beats_history() {
        let employees = vec![EmployeeInput::new("Habit", "40")
            .with_preferences("mid")
            .with_past_shift(1, Day::Monday, "11:00 - 16:00")];
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(11));
        assert_eq!(cell(&schedule, 0, Day::Monday), "12:00 - 18:00");
    }

    #[test]
    fn history_shift_fills_flexible_employee_after_coverage() {
        let mut employees: Vec<EmployeeInput> = (0..4)
            .map(|i| EmployeeInput::new(format!("Cover{i}"), "40"))
            .collect();
        employees.push(EmployeeInput::new("Habit", "5").with_past_shift(1, Day::Monday, "11:00 - 16:00"));
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(2));
        // the smallest gap sorts last: opening and closing are already staffed
        assert_eq!(cell(&schedule, 4, Day::Monday), "11:00 - 16:00");
        assert_eq!(schedule.entries[4].assigned_hours, 5);
    }

    #[test]
    fn fill_pass_covers_a_short_gap_with_a_half_day() {
        // 4h halves: Monday and Tuesday leave 3h, too little for pass 1
        let employees = vec![EmployeeInput::new("Gap", "11")];
        let schedule = generate_schedule(&employees, &store("09:00", "17:00", None), &mut ScheduleRng::seeded(9));
        let entry = &schedule.entries[0];
        assert_eq!(cell(&schedule, 0, Day::Wednesday), "09:00 - 13:00");
        assert_eq!(entry.assigned_hours, 12);
        assert_eq!(cell(&schedule, 0, Day::Thursday), "");
    }

    #[test]
    fn short_gap_goes_to_the_thinner_half_even_against_the_wish() {
        let employees = vec![
            EmployeeInput::new("Early", "40").with_preferences("mattina"),
            EmployeeInput::new("Gap", "11").with_preferences("mattina"),
        ];
        let schedule = generate_schedule(&employees, &store("09:00", "17:00", None), &mut ScheduleRng::seeded(6));
        // Monday and Tuesday mornings leave Gap 3h short; Early holds Wednesday morning
        assert_eq!(cell(&schedule, 1, Day::Monday), "09:00 - 13:00");
        assert_eq!(cell(&schedule, 0, Day::Wednesday), "09:00 - 13:00");
        assert_eq!(cell(&schedule, 1, Day::Wednesday), "13:00 - 17:00");
        assert_eq!(schedule.entries[1].assigned_hours, 12);
    }

    fn rest_day_roster(cover_prefs: &str, rest_prefs: &str, with_spare: bool) -> Vec<EmployeeInput> {
        let mut employees: Vec<EmployeeInput> = (0..4)
            .map(|i| EmployeeInput::new(format!("Cover{i}"), "40").with_preferences(cover_prefs))
            .collect();
        // worked Monday only three weeks back: every day scores as a usual rest day
        employees.push(
            EmployeeInput::new("Rest", "30")
                .with_preferences(rest_prefs)
                .with_past_shift(3, Day::Monday, "11:00 - 16:00"),
        );
        if with_spare {
            employees.push(EmployeeInput::new("Spare", "20"));
        }
        employees
    }

    #[test]
    fn rest_day_is_deferred_once_coverage_is_met_and_someone_else_can_work() {
        let employees = rest_day_roster("", "", true);
        assert!(ScheduleEntry::new(employees[4].clone()).history.is_rest_day(Day::Monday));

        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(12));
        // pass 1 skips Rest and gives Spare the morning; pass 2 still fills Rest
        assert_eq!(cell(&schedule, 5, Day::Monday), "09:00 - 15:00");
        assert_eq!(cell(&schedule, 4, Day::Monday), "15:00 - 21:00");
    }

    #[test]
    fn rest_day_is_kept_working_when_nobody_else_is_left() {
        let employees = rest_day_roster("", "", false);
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(12));
        assert_eq!(cell(&schedule, 4, Day::Monday), "11:00 - 16:00");
    }

    #[test]
    fn required_day_overrides_the_rest_day_habit() {
        let employees = rest_day_roster("solo lunedì", "solo lunedì", true);
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(12));
        assert_eq!(cell(&schedule, 4, Day::Monday), "11:00 - 16:00");
        assert_eq!(cell(&schedule, 4, Day::Tuesday), "");
    }

    #[test]
    fn day_override_replaces_the_general_wish_on_that_day_only() {
        let employees = vec![EmployeeInput::new("Olga", "40").with_preferences("mattina, martedì pomeriggio")];
        let schedule = generate_schedule(&employees, &store("09:00", "21:00", None), &mut ScheduleRng::seeded(13));
        assert_eq!(cell(&schedule, 0, Day::Monday), "09:00 - 15:00");
        assert_eq!(cell(&schedule, 0, Day::Tuesday), "15:00 - 21:00");
        assert_eq!(cell(&schedule, 0, Day::Wednesday), "09:00 - 15:00");
    }

    #[test]
    fn day_override_counts_as_a_wish_only_on_its_day() {
        let employees = vec![
            EmployeeInput::new("Flexible", "20"),
            EmployeeInput::new("TuesdayPm", "20").with_preferences("martedì pomeriggio"),
        ];
        let entries: Vec<ScheduleEntry> = employees.into_iter().map(ScheduleEntry::new).collect();
        assert_eq!(compare_priority(&entries[1], &entries[0], Day::Tuesday), Ordering::Less);
        assert_eq!(compare_priority(&entries[1], &entries[0], Day::Monday), Ordering::Equal);
    }

    #[test]
    fn locked_leave_code_survives() {
        let employees = vec![EmployeeInput::new("Leave", "8").with_shift(Day::Monday, "FERIE")];
        let schedule = generate_schedule(&employees, &store("09:00", "17:00", None), &mut ScheduleRng::seeded(4));
        assert_eq!(cell(&schedule, 0, Day::Monday), "FERIE");
        assert_eq!(cell(&schedule, 0, Day::Tuesday), "09:00 - 13:00");
    }

    #[test]
    fn inverted_store_hours_assign_nothing() {
        let employees = vec![EmployeeInput::new("Idle", "20")];
        let schedule = generate_schedule(
            &employees,
            &store("18:00", "09:00", Some(Day::Monday)),
            &mut ScheduleRng::seeded(8),
        );
        assert_eq!(cell(&schedule, 0, Day::Monday), "CHIUSO");
        assert!(Day::ALL[1..].iter().all(|d| schedule.entries[0].shifts[*d].is_unset()));
        assert_eq!(schedule.entries[0].assigned_hours, 0);
    }

    #[test]
    fn priority_puts_required_day_first() {
        let employees = vec![
            EmployeeInput::new("Flexible", "40"),
            EmployeeInput::new("OnlySat", "8").with_preferences("solo sabato"),
        ];
        let entries: Vec<ScheduleEntry> = employees.into_iter().map(ScheduleEntry::new).collect();
        assert_eq!(compare_priority(&entries[1], &entries[0], Day::Saturday), Ordering::Less);
        // on a weekday the weekend-only employee sorts after
        assert_eq!(compare_priority(&entries[1], &entries[0], Day::Monday), Ordering::Greater);
    }

    #[test]
    fn coverage_counts_split_as_both_halves() {
        let windows = ShiftWindows::new(9, 21);
        let mut coverage = Coverage::default();
        coverage.record(&windows.split, &windows);
        assert_eq!(coverage, Coverage { morning: 1, afternoon: 1, opening: 1, closing: 1 });
        assert_eq!(format_shift(coverage.thinner_half(&windows)), "09:00 - 15:00");
    }
}
