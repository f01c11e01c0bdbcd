pub mod error;
pub mod settings;
pub mod rng;
pub mod schedule;
pub mod parser;
pub mod export;
pub mod display;
pub mod web;

pub use error::{ScheduleError, ScheduleResult};
pub use settings::StoreSettings;
pub use schedule::{generate_schedule, Day, EmployeeInput, Schedule, ScheduleEntry, ShiftCell};
