//! Single cells of an expected-results table.
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlflow_core::expr::{self, Expression};
use sqlflow_core::literal::{Literal, LiteralValue};
use sqlflow_core::types::{DataType, TypeKind};

use crate::error::{Result, TableParseError};
use crate::interval;

/// Timestamps as printed by Postgres with `DateStyle = Postgres`, with the
/// leading weekday removed.
const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S%.f %Y";
const DATE_FORMAT: &str = "%m-%d-%Y";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Parse one cell into a constant expression of `datatype`.
///
/// String cells keep the single space that follows the column separator,
/// which tells an empty string apart from NULL.
pub fn parse_value(field: &str, datatype: &DataType) -> Result<Expression> {
    parse_cell(field, datatype, false)
}

fn parse_cell(field: &str, datatype: &DataType, in_array: bool) -> Result<Expression> {
    let trimmed = field.trim();

    if !datatype.is_string() && (trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")) {
        return null_of(datatype);
    }

    let value = match datatype.kind() {
        TypeKind::Bool => LiteralValue::Bool(trimmed.eq_ignore_ascii_case("t") || trimmed.eq_ignore_ascii_case("true")),
        TypeKind::Integer(int) => match (int.width, int.signed) {
            (8, true) => LiteralValue::Int8(number(trimmed, datatype)?),
            (16, true) => LiteralValue::Int16(number(trimmed, datatype)?),
            (32, true) => LiteralValue::Int32(number(trimmed, datatype)?),
            (64, true) => LiteralValue::Int64(number(trimmed, datatype)?),
            (16, false) => LiteralValue::UInt16(number(trimmed, datatype)?),
            (32, false) => LiteralValue::UInt32(number(trimmed, datatype)?),
            (64, false) => LiteralValue::UInt64(number(trimmed, datatype)?),
            _ => return Err(TableParseError::UnsupportedType(datatype.clone())),
        },
        TypeKind::Float => LiteralValue::Float(number(trimmed, datatype)?),
        TypeKind::Double => LiteralValue::Double(number(trimmed, datatype)?),
        TypeKind::Decimal(_) => LiteralValue::Decimal(
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| invalid(trimmed, datatype))?,
        ),
        TypeKind::String(_) => {
            if in_array {
                LiteralValue::String(trimmed.to_string())
            } else if field.is_empty() {
                LiteralValue::String(String::new())
            } else if let Some(rest) = field.strip_prefix(' ') {
                LiteralValue::String(rest.trim_end().to_string())
            } else if field.eq_ignore_ascii_case("null") {
                return null_of(datatype);
            } else {
                return Err(TableParseError::ExpectedNullOrSpace(field.to_string()));
            }
        }
        TypeKind::Timestamp => LiteralValue::Timestamp(parse_timestamp(trimmed, datatype)?),
        TypeKind::Date => LiteralValue::Date(
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid(trimmed, datatype))?,
        ),
        TypeKind::Time => LiteralValue::Time(
            NaiveTime::parse_from_str(trimmed, TIME_FORMAT).map_err(|_| invalid(trimmed, datatype))?,
        ),
        TypeKind::MillisInterval => LiteralValue::MillisInterval(interval::parse_millis(trimmed)?),
        TypeKind::MonthsInterval => LiteralValue::MonthsInterval(interval::parse_months(trimmed)?),
        TypeKind::Vec(element) => return parse_array(trimmed, datatype, element),
        _ => return Err(TableParseError::UnsupportedType(datatype.clone())),
    };

    Ok(expr::lit(Literal::try_new(value, datatype.clone())?))
}

/// Arrays print as `{a,b,c}`.
fn parse_array(text: &str, datatype: &DataType, element: &DataType) -> Result<Expression> {
    let inner = text
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| TableParseError::UnbracketedArray(text.to_string()))?;

    let elements = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner
            .split(',')
            .map(|part| parse_cell(part, element, true))
            .collect::<Result<Vec<_>>>()?
    };
    Ok(expr::vec(elements, element.clone())?.cast_if_needed(datatype))
}

/// `Thu Jan 01 00:00:00.5 1970`, optionally followed by `AD` or `BC`.
fn parse_timestamp(text: &str, datatype: &DataType) -> Result<NaiveDateTime> {
    let mut parts: Vec<&str> = text.split_whitespace().collect();
    let before_christ = match parts.last() {
        Some(&"BC") => {
            parts.pop();
            true
        }
        Some(&"AD") => {
            parts.pop();
            false
        }
        _ => false,
    };
    if parts.is_empty() {
        return Err(invalid(text, datatype));
    }
    // The weekday is redundant and does not match proleptic BC dates.
    let without_weekday = parts[1..].join(" ");
    let timestamp = NaiveDateTime::parse_from_str(&without_weekday, TIMESTAMP_FORMAT)
        .map_err(|_| invalid(text, datatype))?;
    if !before_christ {
        return Ok(timestamp);
    }
    timestamp
        .with_year(-timestamp.year())
        .ok_or_else(|| invalid(text, datatype))
}

fn number<T: FromStr>(text: &str, datatype: &DataType) -> Result<T> {
    text.parse().map_err(|_| invalid(text, datatype))
}

fn null_of(datatype: &DataType) -> Result<Expression> {
    if !datatype.may_be_null() {
        return Err(TableParseError::NullInNonNullable(datatype.clone()));
    }
    Ok(expr::lit(Literal::none(datatype)?))
}

fn invalid(value: &str, datatype: &DataType) -> TableParseError {
    TableParseError::InvalidValue {
        datatype: datatype.clone(),
        value: value.to_string(),
    }
}
