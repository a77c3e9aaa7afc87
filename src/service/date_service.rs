use crate::module::rate_snapshot::error::AppError;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

/// A request date already classified by the transport layer: either the
/// literal "latest" marker or a confirmed calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Latest,
    Day(NaiveDate),
}

/// `[start, end)` of a UTC day, unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: i64,
    pub end: i64,
}

pub fn classify(raw: &str) -> Result<DateToken, AppError> {
    if raw == "latest" {
        return Ok(DateToken::Latest);
    }
    if has_strict_date_shape(raw) {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::bad_request("INVALID_DATE_FORMAT", format!("{raw} is not a valid calendar date"))
        })?;
        return Ok(DateToken::Day(date));
    }
    if looks_date_like(raw) {
        return Err(AppError::bad_request(
            "INVALID_DATE_FORMAT",
            "invalid date format, please use YYYY-MM-DD",
        ));
    }
    Err(AppError::not_found("NOT_FOUND", "page not found"))
}

pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, AppError> {
    if !has_strict_date_shape(raw) {
        return Err(AppError::bad_request(
            "INVALID_DATE_FORMAT",
            "invalid date format, please use YYYY-MM-DD",
        ));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::bad_request("INVALID_DATE_FORMAT", format!("{raw} is not a valid calendar date"))
    })
}

pub fn day_window(token: &DateToken) -> Result<DayWindow, AppError> {
    let day = match token {
        DateToken::Latest => Utc::now().date_naive(),
        DateToken::Day(date) => *date,
    };
    let next = day.checked_add_days(Days::new(1)).ok_or_else(|| {
        AppError::bad_request("INVALID_DATE_FORMAT", format!("no day follows {day}"))
    })?;
    Ok(DayWindow {
        start: day_start(day),
        end: day_start(next),
    })
}

pub fn day_start(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub fn provider_token(token: &DateToken) -> String {
    match token {
        DateToken::Latest => "latest".to_string(),
        DateToken::Day(date) => date.format("%Y-%m-%d").to_string(),
    }
}

pub fn iso_day(timestamp: i64) -> Result<String, AppError> {
    let instant = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        AppError::internal(
            "TIMESTAMP_OUT_OF_RANGE",
            format!("stored timestamp {timestamp} is not a valid instant"),
        )
    })?;
    Ok(instant.date_naive().format("%Y-%m-%d").to_string())
}

fn has_strict_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}

fn looks_date_like(raw: &str) -> bool {
    let parts: Vec<&str> = raw.split(['-', '/', '.']).collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
