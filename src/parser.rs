use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{ScheduleError, ScheduleResult};
use crate::schedule::{Day, EmployeeInput};

pub const NAME_COLUMN: &str = "Nome";
pub const CONTRACT_COLUMN: &str = "Ore Contratto";
pub const PREFERENCES_COLUMN: &str = "Esigenze/Preferenze";

const NAME_ALIASES: [&str; 2] = ["nome", "name"];
const CONTRACT_ALIASES: [&str; 2] = ["ore contratto", "contract hours"];
const PREFERENCES_ALIASES: [&str; 2] = ["esigenze/preferenze", "needs/preferences"];

/// Where a day column's values go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DayColumn {
    index: usize,
    day: Day,
    /// 0 for the current week, 1..=3 for earlier weeks
    weeks_back: usize,
}

/// Classifies a header such as `Lun`, `Lun-1`, `Mar_2` or `Dom (3)`
fn classify_day_header(header: &str) -> Option<(Day, usize)> {
    let trimmed = header.trim();
    let prefix: String = trimmed.chars().take_while(|c| c.is_alphabetic()).collect();
    let day = Day::from_name(&prefix)?;
    let rest = &trimmed[prefix.len()..];
    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return rest.trim().is_empty().then_some((day, 0));
    }
    match digits.parse::<usize>() {
        Ok(weeks_back @ 1..=3) => Some((day, weeks_back)),
        _ => None,
    }
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

/// Semicolon when the header line has more of them than commas
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Loads the roster from a CSV file
pub fn load_employees<P: AsRef<Path>>(csv_path: P) -> ScheduleResult<Vec<EmployeeInput>> {
    let file = std::fs::File::open(csv_path)?;
    read_employees(file)
}

/// Reads the roster from any CSV source. `Nome` and `Ore Contratto` must be
/// present; every other column is optional.
pub fn read_employees<R: Read>(mut source: R) -> ScheduleResult<Vec<EmployeeInput>> {
    let mut text = String::new();
    source.read_to_string(&mut text)?;
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();

    let name_col = find_column(&headers, &NAME_ALIASES).ok_or_else(|| ScheduleError::MissingColumn {
        column: NAME_COLUMN.to_string(),
    })?;
    let contract_col = find_column(&headers, &CONTRACT_ALIASES).ok_or_else(|| ScheduleError::MissingColumn {
        column: CONTRACT_COLUMN.to_string(),
    })?;
    let preferences_col = find_column(&headers, &PREFERENCES_ALIASES);

    let day_columns: Vec<DayColumn> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, h)| {
            classify_day_header(h).map(|(day, weeks_back)| DayColumn { index, day, weeks_back })
        })
        .collect();

    log::debug!(
        "import: {} day columns found among {} headers",
        day_columns.len(),
        headers.len()
    );

    let mut employees = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |col: usize| record.get(col).unwrap_or("");

        let name = field(name_col).trim().to_string();
        if name.is_empty() {
            log::warn!("import: row {} has no name, skipped", row + 2);
            continue;
        }

        let mut employee = EmployeeInput::new(name, field(contract_col).trim())
            .with_preferences(preferences_col.map(field).unwrap_or("").trim());

        for column in &day_columns {
            let value = field(column.index);
            employee = if column.weeks_back == 0 {
                employee.with_shift(column.day, value)
            } else {
                employee.with_past_shift(column.weeks_back, column.day, value)
            };
        }
        employees.push(employee);
    }

    log::info!("import: loaded {} employees", employees.len());
    Ok(employees)
}
