//! The type lattice of the IR.
//!
//! Every type is a kind plus a nullability flag. Two types are the same type
//! only if their kinds, kind attributes and nullability all agree, which is
//! exactly what the derived `PartialEq` checks.
pub mod reduce;

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlflow_error::{CompilerError, Result};

use crate::expr::{self, Expression};
use crate::literal::{Literal, LiteralValue};

/// Character set of a string type.
///
/// The runtime distinguishes byte and character semantics for functions like
/// `substring` and `char_length`, so the charset survives lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
    Utf16,
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Latin1 => write!(f, "ISO-8859-1"),
            Self::Utf16 => write!(f, "UTF-16"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerType {
    pub width: u8,
    pub signed: bool,
}

impl IntegerType {
    pub const I8: Self = IntegerType::new_unchecked(8, true);
    pub const I16: Self = IntegerType::new_unchecked(16, true);
    pub const I32: Self = IntegerType::new_unchecked(32, true);
    pub const I64: Self = IntegerType::new_unchecked(64, true);
    pub const U16: Self = IntegerType::new_unchecked(16, false);
    pub const U32: Self = IntegerType::new_unchecked(32, false);
    pub const U64: Self = IntegerType::new_unchecked(64, false);

    const fn new_unchecked(width: u8, signed: bool) -> Self {
        IntegerType { width, signed }
    }

    /// Signed widths are 8, 16, 32 and 64; unsigned widths are 16, 32 and 64.
    pub fn try_new(width: u8, signed: bool) -> Result<Self> {
        match (width, signed) {
            (8 | 16 | 32 | 64, true) | (16 | 32 | 64, false) => Ok(IntegerType { width, signed }),
            _ => Err(CompilerError::internal(format!(
                "Unexpected integer width {width} (signed: {signed})"
            ))),
        }
    }

    pub const fn short_name(&self) -> &'static str {
        match (self.width, self.signed) {
            (8, _) => "i8",
            (16, true) => "i16",
            (32, true) => "i32",
            (64, true) => "i64",
            (16, false) => "u16",
            (32, false) => "u32",
            _ => "u64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalTypeMeta {
    pub precision: u8,
    pub scale: i8,
}

impl DecimalTypeMeta {
    pub const fn new(precision: u8, scale: i8) -> Self {
        DecimalTypeMeta { precision, scale }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringTypeMeta {
    /// Maximum length, `None` for unbounded strings.
    pub max_len: Option<u32>,
    pub charset: Charset,
}

impl StringTypeMeta {
    pub const UNBOUNDED: Self = StringTypeMeta {
        max_len: None,
        charset: Charset::Utf8,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Null,
    Bool,
    Integer(IntegerType),
    Float,
    Double,
    Decimal(DecimalTypeMeta),
    String(StringTypeMeta),
    Date,
    Time,
    Timestamp,
    MillisInterval,
    MonthsInterval,
    GeoPoint,
    Tuple(Vec<DataType>),
    Vec(Box<DataType>),
    Keyword,
    /// Placeholder for a type that is not known yet. Never valid as an
    /// operand type once operators are dispatched.
    Any,
    /// A borrowed reference, used for rows.
    Ref(Box<DataType>),
    USize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataType {
    kind: TypeKind,
    may_be_null: bool,
}

impl DataType {
    pub const NULL: DataType = DataType::base(TypeKind::Null, true);
    pub const BOOL: DataType = DataType::base(TypeKind::Bool, false);
    pub const INT8: DataType = DataType::base(TypeKind::Integer(IntegerType::I8), false);
    pub const INT16: DataType = DataType::base(TypeKind::Integer(IntegerType::I16), false);
    pub const INT32: DataType = DataType::base(TypeKind::Integer(IntegerType::I32), false);
    pub const INT64: DataType = DataType::base(TypeKind::Integer(IntegerType::I64), false);
    pub const UINT16: DataType = DataType::base(TypeKind::Integer(IntegerType::U16), false);
    pub const UINT32: DataType = DataType::base(TypeKind::Integer(IntegerType::U32), false);
    pub const UINT64: DataType = DataType::base(TypeKind::Integer(IntegerType::U64), false);
    pub const FLOAT: DataType = DataType::base(TypeKind::Float, false);
    pub const DOUBLE: DataType = DataType::base(TypeKind::Double, false);
    pub const STRING: DataType = DataType::base(TypeKind::String(StringTypeMeta::UNBOUNDED), false);
    pub const DATE: DataType = DataType::base(TypeKind::Date, false);
    pub const TIME: DataType = DataType::base(TypeKind::Time, false);
    pub const TIMESTAMP: DataType = DataType::base(TypeKind::Timestamp, false);
    pub const MILLIS_INTERVAL: DataType = DataType::base(TypeKind::MillisInterval, false);
    pub const MONTHS_INTERVAL: DataType = DataType::base(TypeKind::MonthsInterval, false);
    pub const GEOPOINT: DataType = DataType::base(TypeKind::GeoPoint, false);
    pub const KEYWORD: DataType = DataType::base(TypeKind::Keyword, false);
    pub const ANY: DataType = DataType::base(TypeKind::Any, false);
    pub const USIZE: DataType = DataType::base(TypeKind::USize, false);

    const fn base(kind: TypeKind, may_be_null: bool) -> Self {
        DataType { kind, may_be_null }
    }

    pub fn new(kind: TypeKind, may_be_null: bool) -> Self {
        // The null type is the only inhabitant of its kind and is always
        // nullable.
        let may_be_null = may_be_null || matches!(kind, TypeKind::Null);
        DataType { kind, may_be_null }
    }

    pub fn integer(int: IntegerType, may_be_null: bool) -> Self {
        Self::new(TypeKind::Integer(int), may_be_null)
    }

    pub fn decimal(precision: u8, scale: i8, may_be_null: bool) -> Self {
        Self::new(
            TypeKind::Decimal(DecimalTypeMeta::new(precision, scale)),
            may_be_null,
        )
    }

    pub fn string(max_len: Option<u32>, charset: Charset, may_be_null: bool) -> Self {
        Self::new(TypeKind::String(StringTypeMeta { max_len, charset }), may_be_null)
    }

    pub fn tuple(fields: impl IntoIterator<Item = DataType>, may_be_null: bool) -> Self {
        Self::new(TypeKind::Tuple(fields.into_iter().collect()), may_be_null)
    }

    pub fn vec(element: DataType, may_be_null: bool) -> Self {
        Self::new(TypeKind::Vec(Box::new(element)), may_be_null)
    }

    pub fn reference(inner: DataType) -> Self {
        Self::new(TypeKind::Ref(Box::new(inner)), false)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn may_be_null(&self) -> bool {
        self.may_be_null
    }

    /// Returns the same type with the given nullability.
    pub fn set_may_be_null(&self, may_be_null: bool) -> DataType {
        DataType {
            kind: self.kind.clone(),
            may_be_null,
        }
    }

    /// Shorthand for `set_may_be_null(true)`.
    pub fn nullable(&self) -> DataType {
        self.set_may_be_null(true)
    }

    pub fn same_type(&self, other: &DataType) -> bool {
        self == other
    }

    pub fn nullable_suffix(&self) -> &'static str {
        if self.may_be_null { "N" } else { "" }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, TypeKind::Null)
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, TypeKind::Any)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind, TypeKind::Bool)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::String(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.kind, TypeKind::Integer(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Integer(_) | TypeKind::Float | TypeKind::Double | TypeKind::Decimal(_)
        )
    }

    /// Dates, times, timestamps and intervals.
    pub fn is_date_family(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Date
                | TypeKind::Time
                | TypeKind::Timestamp
                | TypeKind::MillisInterval
                | TypeKind::MonthsInterval
        )
    }

    pub fn is_base_type(&self) -> bool {
        !matches!(
            self.kind,
            TypeKind::Tuple(_) | TypeKind::Vec(_) | TypeKind::Ref(_) | TypeKind::Any
        )
    }

    /// If values of this type can be copied instead of cloned by the
    /// generated code.
    pub fn has_copy(&self) -> bool {
        !matches!(
            self.kind,
            TypeKind::String(_) | TypeKind::Vec(_) | TypeKind::Tuple(_) | TypeKind::Any
        )
    }

    pub fn as_integer(&self) -> Option<IntegerType> {
        match self.kind {
            TypeKind::Integer(int) => Some(int),
            _ => None,
        }
    }

    /// Width in bits of a floating point type.
    pub fn fp_width(&self) -> Option<u8> {
        match self.kind {
            TypeKind::Float => Some(32),
            TypeKind::Double => Some(64),
            _ => None,
        }
    }

    pub fn tuple_fields(&self) -> Option<&[DataType]> {
        match &self.kind {
            TypeKind::Tuple(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&DataType> {
        match &self.kind {
            TypeKind::Vec(elem) => Some(elem),
            _ => None,
        }
    }

    /// Type behind a reference.
    pub fn deref(&self) -> Option<&DataType> {
        match &self.kind {
            TypeKind::Ref(inner) => Some(inner),
            _ => None,
        }
    }

    /// Short textual name used when mangling runtime function names.
    ///
    /// Only defined for base types.
    pub fn short_name(&self) -> Result<&'static str> {
        Ok(match &self.kind {
            TypeKind::Null => "null",
            TypeKind::Bool => "b",
            TypeKind::Integer(int) => int.short_name(),
            TypeKind::Float => "f",
            TypeKind::Double => "d",
            TypeKind::Decimal(_) => "decimal",
            TypeKind::String(_) => "s",
            TypeKind::Date => "Date",
            TypeKind::Time => "Time",
            TypeKind::Timestamp => "Timestamp",
            TypeKind::MillisInterval => "interval_ms",
            TypeKind::MonthsInterval => "interval_months",
            TypeKind::GeoPoint => "geopoint",
            TypeKind::Keyword => "keyword",
            TypeKind::USize => "u",
            TypeKind::Tuple(_) | TypeKind::Vec(_) | TypeKind::Ref(_) | TypeKind::Any => {
                return Err(CompilerError::unsupported(format!(
                    "Type {self} does not have a short name"
                )));
            }
        })
    }

    /// Short name followed by `N` if the type is nullable.
    pub fn base_type_with_suffix(&self) -> Result<String> {
        Ok(format!("{}{}", self.short_name()?, self.nullable_suffix()))
    }

    pub fn zero(&self) -> Result<Literal> {
        let value = match &self.kind {
            TypeKind::Integer(int) => integer_value(*int, 0)?,
            TypeKind::Float => LiteralValue::Float(0.0),
            TypeKind::Double => LiteralValue::Double(0.0),
            TypeKind::Decimal(_) => LiteralValue::Decimal(Decimal::ZERO),
            _ => return Err(self.unsupported("zero")),
        };
        Literal::try_new(value, self.clone())
    }

    pub fn one(&self) -> Result<Literal> {
        let value = match &self.kind {
            TypeKind::Integer(int) => integer_value(*int, 1)?,
            TypeKind::Float => LiteralValue::Float(1.0),
            TypeKind::Double => LiteralValue::Double(1.0),
            TypeKind::Decimal(_) => LiteralValue::Decimal(Decimal::ONE),
            _ => return Err(self.unsupported("one")),
        };
        Literal::try_new(value, self.clone())
    }

    pub fn min_value(&self) -> Result<Literal> {
        let value = match &self.kind {
            TypeKind::Integer(int) => match (int.width, int.signed) {
                (8, true) => LiteralValue::Int8(i8::MIN),
                (16, true) => LiteralValue::Int16(i16::MIN),
                (32, true) => LiteralValue::Int32(i32::MIN),
                (64, true) => LiteralValue::Int64(i64::MIN),
                (16, false) => LiteralValue::UInt16(u16::MIN),
                (32, false) => LiteralValue::UInt32(u32::MIN),
                (64, false) => LiteralValue::UInt64(u64::MIN),
                _ => return Err(self.unsupported("min")),
            },
            TypeKind::Float => LiteralValue::Float(f32::MIN),
            TypeKind::Double => LiteralValue::Double(f64::MIN),
            _ => return Err(self.unsupported("min")),
        };
        Literal::try_new(value, self.clone())
    }

    pub fn max_value(&self) -> Result<Literal> {
        let value = match &self.kind {
            TypeKind::Integer(int) => match (int.width, int.signed) {
                (8, true) => LiteralValue::Int8(i8::MAX),
                (16, true) => LiteralValue::Int16(i16::MAX),
                (32, true) => LiteralValue::Int32(i32::MAX),
                (64, true) => LiteralValue::Int64(i64::MAX),
                (16, false) => LiteralValue::UInt16(u16::MAX),
                (32, false) => LiteralValue::UInt32(u32::MAX),
                (64, false) => LiteralValue::UInt64(u64::MAX),
                _ => return Err(self.unsupported("max")),
            },
            TypeKind::Float => LiteralValue::Float(f32::MAX),
            TypeKind::Double => LiteralValue::Double(f64::MAX),
            _ => return Err(self.unsupported("max")),
        };
        Literal::try_new(value, self.clone())
    }

    /// Default value for a type. Zero for numeric types.
    pub fn default_value(&self) -> Result<Literal> {
        match &self.kind {
            TypeKind::Bool => Literal::try_new(LiteralValue::Bool(false), self.clone()),
            TypeKind::String(_) => Literal::try_new(LiteralValue::String(String::new()), self.clone()),
            _ if self.is_numeric() => self.zero(),
            _ => Err(self.unsupported("default value")),
        }
    }

    /// Expression casting a variable of this type to `to`.
    pub fn caster(&self, to: &DataType) -> Expression {
        expr::var("x", self.clone()).cast(to.clone())
    }

    fn unsupported(&self, what: &str) -> CompilerError {
        CompilerError::unsupported(format!("No {what} for type {self}"))
    }
}

fn integer_value(int: IntegerType, v: u8) -> Result<LiteralValue> {
    Ok(match (int.width, int.signed) {
        (8, true) => LiteralValue::Int8(v as i8),
        (16, true) => LiteralValue::Int16(v as i16),
        (32, true) => LiteralValue::Int32(v as i32),
        (64, true) => LiteralValue::Int64(v as i64),
        (16, false) => LiteralValue::UInt16(v as u16),
        (32, false) => LiteralValue::UInt32(v as u32),
        (64, false) => LiteralValue::UInt64(v as u64),
        (width, signed) => {
            return Err(CompilerError::unsupported(format!(
                "Integer width {width} (signed: {signed})"
            )));
        }
    })
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Tuple(fields) => {
                write!(f, "(")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")?;
            }
            TypeKind::Vec(elem) => write!(f, "vec<{elem}>")?,
            TypeKind::Ref(inner) => write!(f, "&{inner}")?,
            TypeKind::Any => write!(f, "_")?,
            TypeKind::Decimal(meta) => write!(f, "decimal({}, {})", meta.precision, meta.scale)?,
            _ => match self.short_name() {
                Ok(name) => write!(f, "{name}")?,
                Err(_) => write!(f, "{:?}", self.kind)?,
            },
        }
        if self.may_be_null && !self.is_null() {
            write!(f, "?")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_checks_nullability_and_attributes() {
        assert!(DataType::INT32.same_type(&DataType::INT32));
        assert!(!DataType::INT32.same_type(&DataType::INT32.nullable()));
        assert!(!DataType::INT32.same_type(&DataType::UINT32));
        assert!(!DataType::decimal(10, 2, false).same_type(&DataType::decimal(10, 3, false)));
        assert!(
            !DataType::string(None, Charset::Utf8, false)
                .same_type(&DataType::string(None, Charset::Latin1, false))
        );
        assert!(
            !DataType::vec(DataType::INT32, false)
                .same_type(&DataType::vec(DataType::INT32.nullable(), false))
        );
    }

    #[test]
    fn set_may_be_null_round_trip() {
        let types = [
            DataType::INT16,
            DataType::STRING.nullable(),
            DataType::tuple([DataType::BOOL, DataType::DATE], false),
            DataType::decimal(12, 4, true),
        ];
        for t in types {
            for b1 in [true, false] {
                for b2 in [true, false] {
                    let got = t.set_may_be_null(b1).set_may_be_null(b2);
                    assert!(got.same_type(&t.set_may_be_null(b2)), "{t} {b1} {b2}");
                }
            }
            // Idempotent when the flag already matches.
            assert_eq!(t, t.set_may_be_null(t.may_be_null()));
        }
    }

    #[test]
    fn null_type_is_always_nullable() {
        let t = DataType::new(TypeKind::Null, false);
        assert!(t.may_be_null());
        assert!(t.same_type(&DataType::NULL));
    }

    #[test]
    fn short_names_and_suffixes() {
        assert_eq!("i32", DataType::INT32.short_name().unwrap());
        assert_eq!("i32N", DataType::INT32.nullable().base_type_with_suffix().unwrap());
        assert_eq!("s", DataType::STRING.base_type_with_suffix().unwrap());
        assert_eq!("Date", DataType::DATE.short_name().unwrap());
        assert_eq!(
            "interval_ms",
            DataType::MILLIS_INTERVAL.base_type_with_suffix().unwrap()
        );
        assert_eq!("", DataType::DOUBLE.nullable_suffix());
        assert_eq!("N", DataType::DOUBLE.nullable().nullable_suffix());

        let err = DataType::vec(DataType::INT32, false).short_name().unwrap_err();
        assert_eq!(sqlflow_error::ErrorKind::Unsupported, err.kind());
    }

    #[test]
    fn integer_widths() {
        assert!(IntegerType::try_new(8, true).is_ok());
        assert!(IntegerType::try_new(8, false).is_err());
        assert!(IntegerType::try_new(24, true).is_err());
        assert_eq!("u16", IntegerType::U16.short_name());
    }

    #[test]
    fn numeric_constants() {
        let zero = DataType::INT16.zero().unwrap();
        assert_eq!(&LiteralValue::Int16(0), zero.value());
        assert_eq!(&DataType::INT16, zero.datatype());

        let one = DataType::DOUBLE.nullable().one().unwrap();
        assert_eq!(&LiteralValue::Double(1.0), one.value());
        assert!(one.datatype().may_be_null());

        let max = DataType::INT64.max_value().unwrap();
        assert_eq!(&LiteralValue::Int64(i64::MAX), max.value());
        let min = DataType::INT8.min_value().unwrap();
        assert_eq!(&LiteralValue::Int8(i8::MIN), min.value());

        assert_eq!(DataType::INT32.zero().unwrap(), DataType::INT32.default_value().unwrap());
    }

    #[test]
    fn unsupported_constants() {
        assert!(DataType::STRING.zero().is_err());
        assert!(DataType::decimal(10, 2, false).max_value().is_err());
        assert!(DataType::DATE.default_value().is_err());
    }

    #[test]
    fn caster_is_cast_of_variable() {
        let caster = DataType::INT32.caster(&DataType::INT64);
        assert_eq!(&DataType::INT64, &caster.datatype());
        match caster {
            Expression::Cast(cast) => {
                assert_eq!(expr::var("x", DataType::INT32), *cast.expr);
            }
            other => panic!("unexpected expression: {other}"),
        }
    }

    #[test]
    fn display() {
        assert_eq!("i32?", DataType::INT32.nullable().to_string());
        assert_eq!(
            "&(s, vec<b?>)",
            DataType::reference(DataType::tuple(
                [DataType::STRING, DataType::vec(DataType::BOOL.nullable(), false)],
                false
            ))
            .to_string()
        );
        assert_eq!("null", DataType::NULL.to_string());
    }
}
