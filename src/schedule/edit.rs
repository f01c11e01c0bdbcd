use crate::error::{ScheduleError, ScheduleResult};
use super::shift_utils::parse_cell;
use super::types::{Day, Schedule, ScheduleEntry, SPLIT_SEPARATOR};

/// Replaces one cell of a finished schedule with hand-typed text and
/// recomputes that employee's total. Line breaks separate split halves.
pub fn update_shift<'a>(
    schedule: &'a mut Schedule,
    employee: usize,
    day: Day,
    text: &str,
) -> ScheduleResult<&'a ScheduleEntry> {
    let entry = schedule
        .entries
        .get_mut(employee)
        .ok_or(ScheduleError::UnknownEmployee { index: employee })?;

    let normalized = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(SPLIT_SEPARATOR);

    entry.shifts[day] = parse_cell(&normalized);
    entry.recompute_hours();

    log::info!(
        "edit: {} {day} set to '{}', now {}h",
        entry.input.name,
        entry.shifts[day],
        entry.assigned_hours
    );
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScheduleRng;
    use crate::schedule::{generate_schedule, EmployeeInput, ShiftCell};
    use crate::settings::StoreSettings;

    fn small_schedule() -> Schedule {
        let employees = vec![EmployeeInput::new("Anna", "8")];
        let settings = StoreSettings::default().with_hours("09:00", "17:00");
        generate_schedule(&employees, &settings, &mut ScheduleRng::seeded(1))
    }

    #[test]
    fn edit_recomputes_total() {
        let mut schedule = small_schedule();
        assert_eq!(schedule.entries[0].assigned_hours, 8);

        let entry = update_shift(&mut schedule, 0, Day::Friday, "10:00 - 12:00").expect("edit");
        assert_eq!(entry.assigned_hours, 10);
    }

    #[test]
    fn newline_becomes_split_separator() {
        let mut schedule = small_schedule();
        let entry = update_shift(&mut schedule, 0, Day::Monday, "09:00 - 13:00\n17:00 - 19:00").expect("edit");
        assert_eq!(entry.shifts[Day::Monday].to_string(), "09:00 - 13:00 / 17:00 - 19:00");
        assert_eq!(entry.assigned_hours, 10);
    }

    #[test]
    fn free_text_and_clearing_count_zero() {
        let mut schedule = small_schedule();
        update_shift(&mut schedule, 0, Day::Monday, "malattia").expect("edit");
        let entry = update_shift(&mut schedule, 0, Day::Tuesday, "").expect("edit");
        assert_eq!(entry.shifts[Day::Monday], ShiftCell::Locked("malattia".to_string()));
        assert_eq!(entry.shifts[Day::Tuesday], ShiftCell::Unset);
        assert_eq!(entry.assigned_hours, 0);
    }

    #[test]
    fn unknown_row_is_an_error() {
        let mut schedule = small_schedule();
        assert!(matches!(
            update_shift(&mut schedule, 5, Day::Monday, "09:00 - 13:00"),
            Err(ScheduleError::UnknownEmployee { index: 5 })
        ));
    }
}
