use std::fs::File;
use std::io::Write;

use serde::Serialize;

use crate::schedule::{Coverage, Day, Schedule, ScheduleEntry, ShiftCell};

/// How an employee's assigned hours compare with the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContractStatus {
    Under,
    Met,
    Over,
}

impl ContractStatus {
    pub fn of(entry: &ScheduleEntry) -> Self {
        let contract = entry.contracted_hours();
        if entry.assigned_hours > contract {
            ContractStatus::Over
        } else if entry.assigned_hours == contract {
            ContractStatus::Met
        } else {
            ContractStatus::Under
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            ContractStatus::Under => "under",
            ContractStatus::Met => "ok",
            ContractStatus::Over => "over",
        }
    }
}

/// Cell text for tables; blank cells show as `-`
pub fn format_cell(cell: &ShiftCell) -> String {
    match cell {
        ShiftCell::Unset => "-".to_string(),
        other => other.to_string(),
    }
}

/// Opening/closing headcount for one day of a finished schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCoverage {
    pub day: Day,
    pub closed: bool,
    pub morning: u32,
    pub afternoon: u32,
    pub opening: u32,
    pub closing: u32,
}

pub fn coverage_summary(schedule: &Schedule) -> Vec<DayCoverage> {
    Day::ALL
        .iter()
        .map(|&day| {
            let mut coverage = Coverage::default();
            let mut closed = false;
            for entry in &schedule.entries {
                match &entry.shifts[day] {
                    ShiftCell::Worked(shift) => coverage.record(shift, &schedule.windows),
                    ShiftCell::Closed => closed = true,
                    _ => {}
                }
            }
            DayCoverage {
                day,
                closed,
                morning: coverage.morning,
                afternoon: coverage.afternoon,
                opening: coverage.opening,
                closing: coverage.closing,
            }
        })
        .collect()
}

const NAME_WIDTH: usize = 16;
const CELL_WIDTH: usize = 15;

fn render_table(schedule: &Schedule) -> Vec<String> {
    let mut lines = Vec::new();

    let mut header = format!("{:<NAME_WIDTH$} {:>9}", "Dipendente", "Ore");
    for day in Day::ALL {
        header.push_str(&format!(" {:<CELL_WIDTH$}", day.code()));
    }
    lines.push(header);

    for entry in &schedule.entries {
        let status = ContractStatus::of(entry);
        let hours = format!("{}/{}h", entry.assigned_hours, entry.contracted_hours());

        // split shifts take a second line, one half per line
        let halves: Vec<Vec<String>> = entry
            .shifts
            .values()
            .map(|cell| match cell {
                ShiftCell::Worked(shift) if shift.len() > 1 => {
                    shift.iter().map(|iv| iv.to_string()).collect()
                }
                other => vec![format_cell(other)],
            })
            .collect();
        let rows = halves.iter().map(Vec::len).max().unwrap_or(1);

        for row in 0..rows {
            let mut line = if row == 0 {
                format!("{:<NAME_WIDTH$} {:>9}", entry.input.name, hours)
            } else {
                format!("{:<NAME_WIDTH$} {:>9}", "", "")
            };
            for cell in &halves {
                let text = cell.get(row).map(String::as_str).unwrap_or("");
                line.push_str(&format!(" {:<CELL_WIDTH$}", text));
            }
            if row == 0 && status != ContractStatus::Met {
                line.push_str(&format!("  [{}]", status.marker()));
            }
            lines.push(line);
        }
    }
    lines
}

/// Prints the week grid and per-day coverage to stdout
pub fn print_schedule(schedule: &Schedule) {
    println!("\n=== Weekly Schedule ===");
    for line in render_table(schedule) {
        println!("{}", line);
    }

    println!("\nCoverage (opening / closing):");
    for day in coverage_summary(schedule) {
        if day.closed {
            println!("  {} closed", day.day);
        } else {
            println!("  {} {} / {}", day.day, day.opening, day.closing);
        }
    }
}

/// Writes the same table as [`print_schedule`] to a text file
pub fn write_schedule_to_file(schedule: &Schedule, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    writeln!(file, "** Weekly Schedule **")?;
    for line in render_table(schedule) {
        writeln!(file, "{}", line.trim_end())?;
    }
    Ok(())
}
