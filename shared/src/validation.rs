//! Input validation for prediction requests
//!
//! Every check here runs before any model work. Failures carry the name of
//! the offending field so callers can point the user at it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use validator::Validate;

use crate::types::{DateWindow, Location, LocationPolicy, RequestPolicy};

/// A rejected request field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct InputError {
    pub field: &'static str,
    pub message: String,
}

impl InputError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Accepted date layouts, tried in order
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS]`. A bare date means midnight.
pub fn parse_request_date(raw: Option<&str>) -> Result<NaiveDateTime, InputError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(InputError::new("date", "date is required"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()));
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            InputError::new(
                "date",
                format!("invalid date '{raw}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"),
            )
        })
}

/// Validate coordinate ranges
pub fn validate_location(location: &Location) -> Result<(), InputError> {
    if !location.latitude.is_finite() {
        return Err(InputError::new("latitude", "latitude must be a finite number"));
    }
    if !location.longitude.is_finite() {
        return Err(InputError::new("longitude", "longitude must be a finite number"));
    }

    let Err(errors) = location.validate() else {
        return Ok(());
    };
    let field_errors = errors.field_errors();
    // Latitude is reported first when both are out of range
    for field in ["latitude", "longitude"] {
        if let Some(error) = field_errors.get(field).and_then(|list| list.first()) {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is out of range"));
            return Err(InputError::new(field, message));
        }
    }
    Err(InputError::new("location", "invalid coordinates"))
}

impl DateWindow {
    /// Check that `date` is acceptable given the current UTC date
    pub fn check(&self, date: NaiveDate, today: NaiveDate) -> Result<(), InputError> {
        match *self {
            DateWindow::TrainingYear { year } => {
                if date.year() != year {
                    return Err(InputError::new(
                        "date",
                        format!("date {date} is outside the supported year {year}"),
                    ));
                }
            }
            DateWindow::Horizon { days } => {
                let last = today
                    .checked_add_signed(Duration::days(i64::from(days)))
                    .unwrap_or(NaiveDate::MAX);
                if date < today || date > last {
                    return Err(InputError::new(
                        "date",
                        format!(
                            "date {date} is outside the {days}-day forecast horizon ({today} to {last})"
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl RequestPolicy {
    /// Deployment-specific checks: the date window and location presence
    pub fn check(
        &self,
        date: NaiveDate,
        location: Option<&Location>,
        today: NaiveDate,
    ) -> Result<(), InputError> {
        self.window.check(date, today)?;
        if self.location == LocationPolicy::Required && location.is_none() {
            return Err(InputError::new(
                "location",
                "latitude and longitude are required",
            ));
        }
        Ok(())
    }
}
