//! Planner types and their translation into IR types.
use std::fmt;

use sqlflow_error::{CompilerError, Result};

use crate::types::{Charset, DataType, IntegerType, TypeKind};

/// Default decimal precision used by the planner when none is given.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalQualifier {
    Year,
    YearMonth,
    Month,
    Day,
    DayHour,
    DayMinute,
    DaySecond,
    Hour,
    HourMinute,
    HourSecond,
    Minute,
    MinuteSecond,
    Second,
}

impl IntervalQualifier {
    /// Year-month intervals count months, all others count milliseconds.
    pub const fn is_year_month(&self) -> bool {
        matches!(self, Self::Year | Self::YearMonth | Self::Month)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "YEAR",
            Self::YearMonth => "YEAR TO MONTH",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::DayHour => "DAY TO HOUR",
            Self::DayMinute => "DAY TO MINUTE",
            Self::DaySecond => "DAY TO SECOND",
            Self::Hour => "HOUR",
            Self::HourMinute => "HOUR TO MINUTE",
            Self::HourSecond => "HOUR TO SECOND",
            Self::Minute => "MINUTE",
            Self::MinuteSecond => "MINUTE TO SECOND",
            Self::Second => "SECOND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlTypeName {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Float,
    Double,
    Char,
    Varchar,
    Date,
    Time,
    Timestamp,
    Interval(IntervalQualifier),
    Geometry,
    Array,
    Row,
    Symbol,
    Null,
    Any,
}

impl fmt::Display for SqlTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::TinyInt => write!(f, "TINYINT"),
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Decimal => write!(f, "DECIMAL"),
            Self::Real => write!(f, "REAL"),
            Self::Float => write!(f, "FLOAT"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Char => write!(f, "CHAR"),
            Self::Varchar => write!(f, "VARCHAR"),
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Interval(q) => write!(f, "INTERVAL {}", q.as_str()),
            Self::Geometry => write!(f, "GEOMETRY"),
            Self::Array => write!(f, "ARRAY"),
            Self::Row => write!(f, "ROW"),
            Self::Symbol => write!(f, "SYMBOL"),
            Self::Null => write!(f, "NULL"),
            Self::Any => write!(f, "ANY"),
        }
    }
}

/// Type of a planner expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelDataType {
    pub type_name: SqlTypeName,
    pub nullable: bool,
    /// Decimal precision, or the length of a character type.
    pub precision: Option<u32>,
    pub scale: Option<i32>,
    pub charset: Option<Charset>,
    /// Element type of arrays.
    pub component: Option<Box<RelDataType>>,
    /// Fields of rows.
    pub fields: Vec<RelDataType>,
}

impl RelDataType {
    pub fn new(type_name: SqlTypeName, nullable: bool) -> Self {
        RelDataType {
            type_name,
            nullable,
            precision: None,
            scale: None,
            charset: None,
            component: None,
            fields: Vec::new(),
        }
    }

    pub fn decimal(precision: u32, scale: i32, nullable: bool) -> Self {
        RelDataType {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::new(SqlTypeName::Decimal, nullable)
        }
    }

    /// Character type. A missing length means unbounded.
    pub fn char(type_name: SqlTypeName, length: Option<u32>, nullable: bool) -> Self {
        RelDataType {
            precision: length,
            ..Self::new(type_name, nullable)
        }
    }

    pub fn array(component: RelDataType, nullable: bool) -> Self {
        RelDataType {
            component: Some(Box::new(component)),
            ..Self::new(SqlTypeName::Array, nullable)
        }
    }

    pub fn row(fields: impl IntoIterator<Item = RelDataType>, nullable: bool) -> Self {
        RelDataType {
            fields: fields.into_iter().collect(),
            ..Self::new(SqlTypeName::Row, nullable)
        }
    }

    pub fn interval(qualifier: IntervalQualifier, nullable: bool) -> Self {
        Self::new(SqlTypeName::Interval(qualifier), nullable)
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

impl fmt::Display for RelDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name {
            SqlTypeName::Array => match &self.component {
                Some(c) => write!(f, "{c} ARRAY")?,
                None => write!(f, "ARRAY")?,
            },
            SqlTypeName::Row => {
                write!(f, "ROW(")?;
                for (idx, field) in self.fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")?;
            }
            SqlTypeName::Decimal => write!(
                f,
                "DECIMAL({}, {})",
                self.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION),
                self.scale.unwrap_or(0)
            )?,
            name @ (SqlTypeName::Char | SqlTypeName::Varchar) => match self.precision {
                Some(len) => write!(f, "{name}({len})")?,
                None => write!(f, "{name}")?,
            },
            name => write!(f, "{name}")?,
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

/// Translates planner types into IR types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCompiler;

impl TypeCompiler {
    pub fn convert_type(&self, rel: &RelDataType) -> Result<DataType> {
        let nullable = rel.nullable;
        let kind = match rel.type_name {
            SqlTypeName::Boolean => TypeKind::Bool,
            SqlTypeName::TinyInt => TypeKind::Integer(IntegerType::I8),
            SqlTypeName::SmallInt => TypeKind::Integer(IntegerType::I16),
            SqlTypeName::Integer => TypeKind::Integer(IntegerType::I32),
            SqlTypeName::BigInt => TypeKind::Integer(IntegerType::I64),
            SqlTypeName::Decimal => {
                let precision = rel.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION);
                let scale = rel.scale.unwrap_or(0);
                let precision = u8::try_from(precision).map_err(|_| {
                    CompilerError::unsupported("Decimal precision out of range")
                        .with_field("precision", precision)
                })?;
                let scale = i8::try_from(scale).map_err(|_| {
                    CompilerError::unsupported("Decimal scale out of range").with_field("scale", scale)
                })?;
                return Ok(DataType::decimal(precision, scale, nullable));
            }
            SqlTypeName::Real => TypeKind::Float,
            SqlTypeName::Float | SqlTypeName::Double => TypeKind::Double,
            SqlTypeName::Char | SqlTypeName::Varchar => {
                // The planner's default charset.
                let charset = rel.charset.unwrap_or(Charset::Latin1);
                return Ok(DataType::string(rel.precision, charset, nullable));
            }
            SqlTypeName::Date => TypeKind::Date,
            SqlTypeName::Time => TypeKind::Time,
            SqlTypeName::Timestamp => TypeKind::Timestamp,
            SqlTypeName::Interval(q) if q.is_year_month() => TypeKind::MonthsInterval,
            SqlTypeName::Interval(_) => TypeKind::MillisInterval,
            SqlTypeName::Geometry => TypeKind::GeoPoint,
            SqlTypeName::Array => {
                let component = rel.component.as_deref().ok_or_else(|| {
                    CompilerError::internal("Array type without a component type")
                })?;
                return Ok(DataType::vec(self.convert_type(component)?, nullable));
            }
            SqlTypeName::Row => {
                let fields = rel
                    .fields
                    .iter()
                    .map(|f| self.convert_type(f))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(DataType::tuple(fields, nullable));
            }
            SqlTypeName::Symbol => TypeKind::Keyword,
            SqlTypeName::Null => TypeKind::Null,
            SqlTypeName::Any => TypeKind::Any,
        };
        Ok(DataType::new(kind, nullable))
    }
}
