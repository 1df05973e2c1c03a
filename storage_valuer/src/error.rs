use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors raised while building price series, schedules or contract inputs.
///
/// Capacity and inventory violations during a simulation are not errors;
/// they are reported as [`crate::models::Diagnostic`] values.
#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("dates must be strictly increasing: {current} at position {index} follows {previous}")]
    UnsortedDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("price on {date} is not a finite number")]
    NonFinitePrice { date: NaiveDate },

    #[error("schedule has {dates} dates but {prices} prices")]
    ScheduleLengthMismatch { dates: usize, prices: usize },

    #[error("invalid contract parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("cannot parse date '{value}'")]
    DateParse { value: String },

    #[error("cannot parse price '{value}'")]
    PriceParse { value: String },

    #[error("column '{name}' not found in price table")]
    MissingColumn { name: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
