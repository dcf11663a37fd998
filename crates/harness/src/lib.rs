//! Expected-result tables for end-to-end lowering tests.
//!
//! Tables are written the way `psql` or the `mysql` client print query
//! output, and are parsed into tuple constants of a known row type:
//!
//! ```text
//!  id | name
//! ----+------
//!   1 | one
//!   2 |
//! (2 rows)
//! ```
pub mod error;
pub mod interval;
pub mod value;

use sqlflow_core::expr::{self, Expression};
use sqlflow_core::types::DataType;

pub use crate::error::{Result, TableParseError};
pub use crate::value::parse_value;

/// Table layout, detected from the first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// `psql`: a single rule under the header.
    Postgres,
    /// `mysql`: rules made of `+---+` around the header and the body.
    MySql,
}

impl Style {
    /// Number of horizontal rules up to and including the end of the header.
    fn header_rules(self) -> usize {
        match self {
            Style::Postgres => 1,
            Style::MySql => 2,
        }
    }
}

fn is_rule(line: &str) -> bool {
    line.contains("---")
}

/// Parse the rows of a printed table, ignoring the header.
///
/// Rows end at the third horizontal rule, at a `(N rows)` footer, or at
/// the end of the text. Blank lines are skipped.
pub fn parse_table(table: &str, row_type: &DataType) -> Result<Vec<Expression>> {
    let style = match table.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(first) if first.starts_with("+-") => Style::MySql,
        _ => Style::Postgres,
    };

    let mut rules = 0;
    let mut rows = Vec::new();
    for line in table.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_rule(trimmed) {
            rules += 1;
            if rules >= 3 {
                break;
            }
            continue;
        }
        if rules < style.header_rules() {
            continue;
        }
        if trimmed.starts_with('(') && trimmed.ends_with(')') {
            break;
        }

        let line = match style {
            // Strip the outer `| ` and ` |`.
            Style::MySql => line.trim().get(1..trimmed.len().saturating_sub(2)).unwrap_or(""),
            Style::Postgres => line,
        };
        rows.push(parse_row(line, row_type)?);
    }

    if rules < style.header_rules() {
        return Err(TableParseError::MissingHeaderEnd);
    }
    Ok(rows)
}

/// Parse one line of a table into a tuple of constants.
pub fn parse_row(line: &str, row_type: &DataType) -> Result<Expression> {
    let fields = row_type
        .tuple_fields()
        .ok_or_else(|| TableParseError::NotATuple(row_type.clone()))?;

    let columns: Vec<&str> = if fields.len() > 1 {
        line.split('|').collect()
    } else {
        vec![line]
    };
    if columns.len() != fields.len() {
        return Err(TableParseError::ColumnCount {
            expected: fields.len(),
            found: columns.len(),
            line: line.to_string(),
        });
    }

    let values = columns
        .into_iter()
        .zip(fields)
        .map(|(column, datatype)| parse_value(column, datatype))
        .collect::<Result<Vec<_>>>()?;
    Ok(expr::tuple(values))
}
