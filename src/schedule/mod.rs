pub mod types;
pub mod shift_utils;
pub mod preferences;
pub mod history;
pub mod windows;
pub mod engine;
pub mod edit;

pub use types::{Day, EmployeeInput, Interval, Schedule, ScheduleEntry, ShiftCell, Week, CLOSED_SENTINEL};
pub use preferences::{parse_preferences, ParsedPreferences, ShiftPreference};
pub use history::{analyze_history, HistoryAnalysis};
pub use windows::ShiftWindows;
pub use engine::{generate_schedule, Coverage};
pub use edit::update_shift;
