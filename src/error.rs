use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Unknown day '{value}' (expected one of Lun, Mar, Mer, Gio, Ven, Sab, Dom)")]
    InvalidDay { value: String },

    #[error("No employee at row {index}")]
    UnknownEmployee { index: usize },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
