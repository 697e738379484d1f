//! Clock and calendar arithmetic shared by the schedule, preset and stats
//! engines. Times of day travel as `HH:MM` strings; they are only parsed
//! here.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const MINUTES_PER_DAY: i64 = 24 * 60;
const SLOT_MINUTES: u32 = 30;

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("valid time regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeOption {
    pub value: String,
    pub label: String,
}

pub fn is_valid_time(value: &str) -> bool {
    TIME_PATTERN.is_match(value.trim())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let caps = TIME_PATTERN.captures(value.trim())?;
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour() * 60 + time.minute())
}

/// Duration between two `HH:MM` times in hours, rounded to two decimals.
///
/// An end earlier than the start is taken to be on the next day. Missing or
/// unparsable input yields `0.0`, as does `start == end`; callers treat
/// anything `<= 0` as invalid.
pub fn calculate_hours(start: &str, end: &str) -> f64 {
    let (Some(start), Some(end)) = (parse_time(start), parse_time(end)) else {
        return 0.0;
    };

    let start_minutes = minutes_of_day(start);
    let mut end_minutes = minutes_of_day(end);
    if end_minutes < start_minutes {
        end_minutes += MINUTES_PER_DAY;
    }

    round_hours((end_minutes - start_minutes) as f64 / 60.0)
}

pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// `"13:30"` -> `"1:30 PM"`. Unparsable input is returned as given.
pub fn format_time(value: &str) -> String {
    match parse_time(value) {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => value.to_string(),
    }
}

pub fn format_time_range(start: &str, end: &str) -> String {
    format!("{} - {}", format_time(start), format_time(end))
}

/// Every half hour of the day, `00:00` through `23:30`.
pub fn generate_time_options() -> Vec<TimeOption> {
    (0..24 * 60 / SLOT_MINUTES)
        .filter_map(|slot| {
            let minutes = slot * SLOT_MINUTES;
            NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        })
        .map(|time| TimeOption {
            value: time.format("%H:%M").to_string(),
            label: time.format("%-I:%M %p").to_string(),
        })
        .collect()
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Rejects anything outside 1..=12.
pub fn validate_month(month: u32) -> Result<(), AppError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid month {}", month)))
    }
}

/// `month` is 1-based.
pub fn in_month(date: NaiveDate, month: u32, year: i32) -> bool {
    date.month() == month && date.year() == year
}

/// Every calendar day of a 1-based month, in order.
pub fn days_in_month(month: u32, year: i32) -> Result<Vec<NaiveDate>, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}/{}", month, year)))?;

    Ok(first
        .iter_days()
        .take_while(|day| day.month() == month)
        .collect())
}
