//! Postgres interval output, e.g. `1 day 02:03:04 ago` or `2 years 3 mons`.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TableParseError};

const MILLIS_PER_DAY: i64 = 86_400_000;

static YEARS: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d+) years?(.*)$"));
static MONTHS: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*(\d+) (?:months?|mons?)(.*)$"));
static MINUS: LazyLock<Regex> = LazyLock::new(|| regex(r"^-(.*)$"));
static DAYS: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d+) days?(.*)$"));
static HOURS: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*(\d+) hours?(.*)$"));
static MINUTES: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*(\d+) mins?(.*)$"));
static SECONDS: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*(\d+)(?:\.(\d+))? secs?(.*)$"));
static HMS: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^\s*(\d{2}):(\d{2}):(\d{2})(?:\.(\d*))?(.*)$"));
static AGO: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*ago(.*)$"));

#[allow(clippy::expect_used)]
fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("interval patterns to be valid")
}

/// Parse a year-month interval into a number of months.
pub fn parse_months(interval: &str) -> Result<i32> {
    let invalid = || TableParseError::InvalidInterval(interval.to_string());
    if interval == "0" {
        return Ok(0);
    }

    let mut rest = interval;
    let mut months: i32 = 0;
    if let Some(caps) = YEARS.captures(rest) {
        let years: i32 = caps[1].parse().map_err(|_| invalid())?;
        months = years.checked_mul(12).ok_or_else(invalid)?;
        rest = caps.get(2).map_or("", |m| m.as_str());
    }
    if let Some(caps) = MONTHS.captures(rest) {
        let m: i32 = caps[1].parse().map_err(|_| invalid())?;
        months = months.checked_add(m).ok_or_else(invalid)?;
        rest = caps.get(2).map_or("", |m| m.as_str());
    }
    if let Some(caps) = AGO.captures(rest) {
        months = -months;
        rest = caps.get(1).map_or("", |m| m.as_str());
    }

    if !rest.is_empty() {
        return Err(invalid());
    }
    Ok(months)
}

/// Parse a day-time interval into milliseconds.
pub fn parse_millis(interval: &str) -> Result<i64> {
    let invalid = || TableParseError::InvalidInterval(interval.to_string());
    if interval == "0" {
        return Ok(0);
    }

    let number = |s: &str| s.parse::<i64>().map_err(|_| invalid());
    let mut rest = interval;
    let mut negate = false;
    let mut millis: i64 = 0;

    if let Some(caps) = MINUS.captures(rest) {
        negate = true;
        rest = caps.get(1).map_or("", |m| m.as_str());
    }
    if let Some(caps) = DAYS.captures(rest) {
        millis += number(&caps[1])? * MILLIS_PER_DAY;
        rest = caps.get(2).map_or("", |m| m.as_str());
    }

    if let Some(caps) = HMS.captures(rest) {
        millis += number(&caps[1])? * 3_600_000;
        millis += number(&caps[2])? * 60_000;
        millis += number(&caps[3])? * 1_000;
        if let Some(fraction) = caps.get(4) {
            millis += fraction_millis(fraction.as_str()).map_err(|_| invalid())?;
        }
        rest = caps.get(5).map_or("", |m| m.as_str());
    } else {
        if let Some(caps) = HOURS.captures(rest) {
            millis += number(&caps[1])? * 3_600_000;
            rest = caps.get(2).map_or("", |m| m.as_str());
        }
        if let Some(caps) = MINUTES.captures(rest) {
            millis += number(&caps[1])? * 60_000;
            rest = caps.get(2).map_or("", |m| m.as_str());
        }
        if let Some(caps) = SECONDS.captures(rest) {
            millis += number(&caps[1])? * 1_000;
            if let Some(fraction) = caps.get(2) {
                millis += fraction_millis(fraction.as_str()).map_err(|_| invalid())?;
            }
            rest = caps.get(3).map_or("", |m| m.as_str());
        }
    }

    if let Some(caps) = AGO.captures(rest) {
        negate = !negate;
        rest = caps.get(1).map_or("", |m| m.as_str());
    }

    if !rest.is_empty() {
        return Err(invalid());
    }
    Ok(if negate { -millis } else { millis })
}

/// Milliseconds in the digits following a decimal point.
fn fraction_millis(digits: &str) -> Result<i64, std::num::ParseIntError> {
    if digits.is_empty() {
        return Ok(0);
    }
    let truncated: String = digits.chars().chain("000".chars()).take(3).collect();
    truncated.parse()
}
