use chrono::{DateTime, FixedOffset, NaiveDateTime, SubsecRound, TimeZone, Utc};
use seatkeep_core::TimeWindow;
use crate::error::AppError;

/// Local input format, e.g. `2030-01-01 17:00`.
pub const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Accepts RFC 3339, or `LOCAL_FORMAT` read in `offset`. Precision is cut
/// to microseconds, the finest the database stores.
pub fn parse_request_time(value: &str, offset: FixedOffset) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc).trunc_subsecs(6));
    }

    let naive = NaiveDateTime::parse_from_str(value, LOCAL_FORMAT)
        .map_err(|_| AppError::ValidationError(format!("Invalid time format: {}", value)))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| AppError::ValidationError(format!("Invalid time: {}", value)))
}

pub fn parse_window(from: &str, to: &str, offset: FixedOffset) -> Result<TimeWindow, AppError> {
    Ok(TimeWindow::new(
        parse_request_time(from, offset)?,
        parse_request_time(to, offset)?,
    ))
}
