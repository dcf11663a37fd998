//! Typed literal values.
//!
//! A literal always carries its type. NULL is a distinguished value rather
//! than a separate type, and can only inhabit nullable types.
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlflow_error::{CompilerError, Result};

use crate::types::{Charset, DataType, TypeKind};

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Day-time interval in milliseconds.
    MillisInterval(i64),
    /// Year-month interval in months.
    MonthsInterval(i32),
    GeoPoint { x: f64, y: f64 },
    Keyword(String),
    USize(usize),
}

impl LiteralValue {
    /// If this value can inhabit a type of the given kind.
    fn fits(&self, kind: &TypeKind) -> bool {
        use crate::types::IntegerType as I;
        match (self, kind) {
            (Self::Null, _) => true,
            (Self::Bool(_), TypeKind::Bool) => true,
            (Self::Int8(_), TypeKind::Integer(int)) => *int == I::I8,
            (Self::Int16(_), TypeKind::Integer(int)) => *int == I::I16,
            (Self::Int32(_), TypeKind::Integer(int)) => *int == I::I32,
            (Self::Int64(_), TypeKind::Integer(int)) => *int == I::I64,
            (Self::UInt16(_), TypeKind::Integer(int)) => *int == I::U16,
            (Self::UInt32(_), TypeKind::Integer(int)) => *int == I::U32,
            (Self::UInt64(_), TypeKind::Integer(int)) => *int == I::U64,
            (Self::Float(_), TypeKind::Float) => true,
            (Self::Double(_), TypeKind::Double) => true,
            (Self::Decimal(_), TypeKind::Decimal(_)) => true,
            (Self::String(_), TypeKind::String(_)) => true,
            (Self::Date(_), TypeKind::Date) => true,
            (Self::Time(_), TypeKind::Time) => true,
            (Self::Timestamp(_), TypeKind::Timestamp) => true,
            (Self::MillisInterval(_), TypeKind::MillisInterval) => true,
            (Self::MonthsInterval(_), TypeKind::MonthsInterval) => true,
            (Self::GeoPoint { .. }, TypeKind::GeoPoint) => true,
            (Self::Keyword(_), TypeKind::Keyword) => true,
            (Self::USize(_), TypeKind::USize) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "'{v}'"),
            Self::Date(v) => write!(f, "DATE '{v}'"),
            Self::Time(v) => write!(f, "TIME '{v}'"),
            Self::Timestamp(v) => write!(f, "TIMESTAMP '{v}'"),
            Self::MillisInterval(v) => write!(f, "INTERVAL {v}ms"),
            Self::MonthsInterval(v) => write!(f, "INTERVAL {v} months"),
            Self::GeoPoint { x, y } => write!(f, "POINT({x:?}, {y:?})"),
            Self::Keyword(v) => write!(f, "{v}"),
            Self::USize(v) => write!(f, "{v}usize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    value: LiteralValue,
    datatype: DataType,
}

impl Literal {
    /// Create a literal, checking that the value inhabits the type.
    pub fn try_new(value: LiteralValue, datatype: DataType) -> Result<Self> {
        if matches!(value, LiteralValue::Null) {
            return Self::none(&datatype);
        }
        if !value.fits(datatype.kind()) {
            return Err(CompilerError::internal(format!(
                "Value {value} does not have type {datatype}"
            )));
        }
        Ok(Literal { value, datatype })
    }

    /// The typed NULL of a type.
    ///
    /// Fails for non-nullable types and for kinds without a NULL encoding.
    pub fn none(datatype: &DataType) -> Result<Self> {
        if !datatype.may_be_null() {
            return Err(CompilerError::internal(format!(
                "Type {datatype} cannot hold a NULL value"
            )));
        }
        match datatype.kind() {
            TypeKind::Any | TypeKind::Keyword | TypeKind::Ref(_) | TypeKind::USize => {
                Err(CompilerError::unimplemented(format!(
                    "No NULL literal for type {datatype}"
                )))
            }
            _ => Ok(Literal {
                value: LiteralValue::Null,
                datatype: datatype.clone(),
            }),
        }
    }

    pub fn bool(v: bool) -> Self {
        Self::unchecked(LiteralValue::Bool(v), DataType::BOOL)
    }

    pub fn i8(v: i8) -> Self {
        Self::unchecked(LiteralValue::Int8(v), DataType::INT8)
    }

    pub fn i16(v: i16) -> Self {
        Self::unchecked(LiteralValue::Int16(v), DataType::INT16)
    }

    pub fn i32(v: i32) -> Self {
        Self::unchecked(LiteralValue::Int32(v), DataType::INT32)
    }

    pub fn i64(v: i64) -> Self {
        Self::unchecked(LiteralValue::Int64(v), DataType::INT64)
    }

    pub fn float(v: f32) -> Self {
        Self::unchecked(LiteralValue::Float(v), DataType::FLOAT)
    }

    pub fn double(v: f64) -> Self {
        Self::unchecked(LiteralValue::Double(v), DataType::DOUBLE)
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::unchecked(LiteralValue::String(v.into()), DataType::STRING)
    }

    /// Unbounded string literal in a given charset.
    pub fn string_with_charset(v: impl Into<String>, charset: Charset) -> Self {
        Self::unchecked(
            LiteralValue::String(v.into()),
            DataType::string(None, charset, false),
        )
    }

    pub fn keyword(v: impl Into<String>) -> Self {
        Self::unchecked(LiteralValue::Keyword(v.into()), DataType::KEYWORD)
    }

    pub fn usize(v: usize) -> Self {
        Self::unchecked(LiteralValue::USize(v), DataType::USIZE)
    }

    pub fn date(v: NaiveDate) -> Self {
        Self::unchecked(LiteralValue::Date(v), DataType::DATE)
    }

    pub fn time(v: NaiveTime) -> Self {
        Self::unchecked(LiteralValue::Time(v), DataType::TIME)
    }

    pub fn timestamp(v: NaiveDateTime) -> Self {
        Self::unchecked(LiteralValue::Timestamp(v), DataType::TIMESTAMP)
    }

    pub fn millis_interval(v: i64) -> Self {
        Self::unchecked(LiteralValue::MillisInterval(v), DataType::MILLIS_INTERVAL)
    }

    pub fn months_interval(v: i32) -> Self {
        Self::unchecked(LiteralValue::MonthsInterval(v), DataType::MONTHS_INTERVAL)
    }

    pub fn geopoint(x: f64, y: f64) -> Self {
        Self::unchecked(LiteralValue::GeoPoint { x, y }, DataType::GEOPOINT)
    }

    /// Literal of an already validated value and type pair.
    fn unchecked(value: LiteralValue, datatype: DataType) -> Self {
        Literal { value, datatype }
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    pub fn datatype(&self) -> &DataType {
        &self.datatype
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, LiteralValue::Null)
    }

    pub fn into_parts(self) -> (LiteralValue, DataType) {
        (self.value, self.datatype)
    }

    /// Structural equality: same type and same value, with all NULLs of a
    /// type equal to each other.
    pub fn same_value(&self, other: &Literal) -> bool {
        self.datatype.same_type(&other.datatype) && self.value == other.value
    }

    /// The same literal with its type's nullability changed.
    pub fn get_with_nullable(&self, may_be_null: bool) -> Result<Literal> {
        let datatype = self.datatype.set_may_be_null(may_be_null);
        if self.is_null() {
            return Self::none(&datatype);
        }
        Ok(Literal {
            value: self.value.clone(),
            datatype,
        })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            LiteralValue::Null => write!(f, "NULL::{}", self.datatype),
            LiteralValue::String(_) | LiteralValue::Keyword(_) => write!(f, "{}", self.value),
            value => write!(f, "{value}{}", self.datatype.nullable_suffix()),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($prim:ty => $ctor:ident),* $(,)?) => {
        $(
            impl From<$prim> for Literal {
                fn from(v: $prim) -> Self {
                    Literal::$ctor(v)
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => bool,
    i8 => i8,
    i16 => i16,
    i32 => i32,
    i64 => i64,
    f32 => float,
    f64 => double,
    String => string,
);

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::string(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntegerType;

    #[test]
    fn none_of_every_supported_type() {
        let types = [
            DataType::NULL,
            DataType::BOOL,
            DataType::INT8,
            DataType::INT16,
            DataType::INT32,
            DataType::INT64,
            DataType::UINT16,
            DataType::UINT32,
            DataType::UINT64,
            DataType::FLOAT,
            DataType::DOUBLE,
            DataType::decimal(8, 3, false),
            DataType::STRING,
            DataType::DATE,
            DataType::TIME,
            DataType::TIMESTAMP,
            DataType::MILLIS_INTERVAL,
            DataType::MONTHS_INTERVAL,
            DataType::GEOPOINT,
            DataType::tuple([DataType::INT32, DataType::STRING], false),
            DataType::vec(DataType::INT32, false),
        ];
        for t in types {
            let t = t.nullable();
            let lit = Literal::none(&t).unwrap();
            assert!(lit.is_null());
            assert_eq!(&t, lit.datatype());
        }
    }

    #[test]
    fn none_rejects_non_nullable_and_unencodable() {
        assert!(Literal::none(&DataType::INT32).is_err());
        assert!(Literal::none(&DataType::ANY.nullable()).is_err());
        assert!(Literal::none(&DataType::KEYWORD.nullable()).is_err());
        assert!(Literal::none(&DataType::reference(DataType::INT32).nullable()).is_err());
    }

    #[test]
    fn try_new_checks_value_kind() {
        assert!(Literal::try_new(LiteralValue::Int32(3), DataType::INT32.nullable()).is_ok());
        assert!(Literal::try_new(LiteralValue::Int32(3), DataType::INT64).is_err());
        assert!(Literal::try_new(LiteralValue::Null, DataType::INT64).is_err());
        assert!(
            Literal::try_new(
                LiteralValue::UInt16(3),
                DataType::integer(IntegerType::U16, false)
            )
            .is_ok()
        );
    }

    #[test]
    fn same_value() {
        assert!(Literal::i32(4).same_value(&Literal::i32(4)));
        assert!(!Literal::i32(4).same_value(&Literal::i32(5)));
        assert!(!Literal::i32(4).same_value(&Literal::i64(4)));

        let a = Literal::none(&DataType::STRING.nullable()).unwrap();
        let b = Literal::none(&DataType::STRING.nullable()).unwrap();
        assert!(a.same_value(&b));
        assert!(!a.same_value(&Literal::none(&DataType::INT32.nullable()).unwrap()));

        let nullable = Literal::i32(4).get_with_nullable(true).unwrap();
        assert!(!nullable.same_value(&Literal::i32(4)));
    }

    #[test]
    fn get_with_nullable() {
        let lit = Literal::string("abc").get_with_nullable(true).unwrap();
        assert!(lit.datatype().may_be_null());
        assert_eq!(&LiteralValue::String("abc".to_string()), lit.value());

        let back = lit.get_with_nullable(false).unwrap();
        assert_eq!(Literal::string("abc"), back);

        let null = Literal::none(&DataType::DOUBLE.nullable()).unwrap();
        assert!(null.get_with_nullable(false).is_err());
    }

    #[test]
    fn display() {
        assert_eq!("1", Literal::i32(1).to_string());
        assert_eq!("1N", Literal::i32(1).get_with_nullable(true).unwrap().to_string());
        assert_eq!("'a'", Literal::string("a").to_string());
        assert_eq!(
            "NULL::i64?",
            Literal::none(&DataType::INT64.nullable()).unwrap().to_string()
        );
        assert_eq!("2.5", Literal::double(2.5).to_string());
    }
}
