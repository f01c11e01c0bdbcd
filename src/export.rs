use std::io::Write;
use std::path::Path;

use chrono::Local;
use csv::WriterBuilder;

use crate::error::ScheduleResult;
use crate::parser::{CONTRACT_COLUMN, NAME_COLUMN, PREFERENCES_COLUMN};
use crate::schedule::{Day, Schedule};

/// Semicolon keeps the file usable in spreadsheet apps with a decimal comma
pub const EXPORT_DELIMITER: u8 = b';';

/// File name offered for a download made today
pub fn default_export_name() -> String {
    format!("turni_generati_{}.csv", Local::now().format("%Y%m%d"))
}

/// Writes the schedule back in the import layout: name, contract,
/// preferences and one column per day in week order
pub fn write_schedule_csv<W: Write>(schedule: &Schedule, writer: W) -> ScheduleResult<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .from_writer(writer);

    let mut header = vec![NAME_COLUMN, CONTRACT_COLUMN, PREFERENCES_COLUMN];
    header.extend(Day::ALL.iter().map(|d| d.code()));
    wtr.write_record(&header)?;

    for entry in &schedule.entries {
        let mut record = vec![
            entry.input.name.clone(),
            entry.input.contract_hours.clone(),
            entry.input.preferences.clone(),
        ];
        record.extend(entry.shifts.values().map(|cell| cell.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_schedule_csv<P: AsRef<Path>>(schedule: &Schedule, csv_path: P) -> ScheduleResult<()> {
    let file = std::fs::File::create(csv_path.as_ref())?;
    write_schedule_csv(schedule, file)?;
    log::info!("export: wrote {}", csv_path.as_ref().display());
    Ok(())
}

/// The export as an in-memory string
pub fn schedule_to_csv_string(schedule: &Schedule) -> ScheduleResult<String> {
    let mut buffer = Vec::new();
    write_schedule_csv(schedule, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
