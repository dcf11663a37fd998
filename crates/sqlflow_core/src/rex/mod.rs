//! Planner expression trees handed to the lowering.
pub mod rel_type;
pub mod sarg;

use std::fmt;

use rel_type::RelDataType;
use rust_decimal::Decimal;
use sarg::Sarg;

/// Kind of a planner call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlKind {
    Times,
    Divide,
    Mod,
    Plus,
    Minus,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equals,
    NotEquals,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Or,
    And,
    Not,
    IsFalse,
    IsNotTrue,
    IsTrue,
    IsNotFalse,
    PlusPrefix,
    MinusPrefix,
    BitAnd,
    BitOr,
    BitXor,
    Cast,
    Reinterpret,
    IsNull,
    IsNotNull,
    Case,
    StPoint,
    /// A function call resolved by name.
    OtherFunction,
    /// An operator resolved by name.
    Other,
    Extract,
    Rlike,
    Position,
    ArrayToString,
    Like,
    Similar,
    Floor,
    Ceil,
    ArrayValueConstructor,
    Item,
    Trim,
    Search,
    Dot,
}

impl SqlKind {
    /// Operator name used when a call is built without an explicit name.
    pub const fn default_name(&self) -> &'static str {
        match self {
            Self::Times => "*",
            Self::Divide => "/",
            Self::Mod => "mod",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
            Self::Equals => "=",
            Self::NotEquals => "<>",
            Self::IsDistinctFrom => "is distinct from",
            Self::IsNotDistinctFrom => "is not distinct from",
            Self::Or => "or",
            Self::And => "and",
            Self::Not => "not",
            Self::IsFalse => "is false",
            Self::IsNotTrue => "is not true",
            Self::IsTrue => "is true",
            Self::IsNotFalse => "is not false",
            Self::PlusPrefix => "+",
            Self::MinusPrefix => "-",
            Self::BitAnd => "bit_and",
            Self::BitOr => "bit_or",
            Self::BitXor => "bit_xor",
            Self::Cast => "cast",
            Self::Reinterpret => "reinterpret",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
            Self::Case => "case",
            Self::StPoint => "st_point",
            Self::OtherFunction => "function",
            Self::Other => "operator",
            Self::Extract => "extract",
            Self::Rlike => "rlike",
            Self::Position => "position",
            Self::ArrayToString => "array_to_string",
            Self::Like => "like",
            Self::Similar => "similar",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::ArrayValueConstructor => "array",
            Self::Item => "item",
            Self::Trim => "trim",
            Self::Search => "search",
            Self::Dot => "dot",
        }
    }
}

/// Value of a planner literal.
#[derive(Debug, Clone, PartialEq)]
pub enum RexLiteralValue {
    Null,
    Bool(bool),
    /// Exact numeric value, used for integers and decimals.
    Exact(Decimal),
    /// Approximate numeric value.
    Approx(f64),
    CharString(String),
    /// `YYYY-MM-DD`.
    Date(String),
    /// `HH:MM:SS[.fff]`.
    Time(String),
    /// `YYYY-MM-DD HH:MM:SS[.fff]`.
    Timestamp(String),
    /// Interval count, in milliseconds or in months depending on the type.
    Interval(Decimal),
    /// Enumerated keyword such as a time unit or a trim mode.
    Symbol(String),
    GeoPoint { x: f64, y: f64 },
    Sarg(Sarg),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RexLiteral {
    pub value: RexLiteralValue,
    pub datatype: RelDataType,
}

impl RexLiteral {
    pub fn new(value: RexLiteralValue, datatype: RelDataType) -> Self {
        RexLiteral { value, datatype }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, RexLiteralValue::Null)
    }
}

impl fmt::Display for RexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            RexLiteralValue::Null => write!(f, "null:{}", self.datatype.type_name),
            RexLiteralValue::Bool(v) => write!(f, "{v}"),
            RexLiteralValue::Exact(v) => write!(f, "{v}"),
            RexLiteralValue::Approx(v) => write!(f, "{v:E}"),
            RexLiteralValue::CharString(v) => write!(f, "'{v}'"),
            RexLiteralValue::Date(v) | RexLiteralValue::Time(v) | RexLiteralValue::Timestamp(v) => {
                write!(f, "{v}")
            }
            RexLiteralValue::Interval(v) => write!(f, "{v}:{}", self.datatype.type_name),
            RexLiteralValue::Symbol(v) => write!(f, "FLAG({v})"),
            RexLiteralValue::GeoPoint { x, y } => write!(f, "POINT ({x} {y})"),
            RexLiteralValue::Sarg(sarg) => write!(f, "{sarg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RexInputRef {
    pub index: usize,
    pub datatype: RelDataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RexCall {
    pub kind: SqlKind,
    /// Lower-cased operator name.
    pub name: String,
    pub datatype: RelDataType,
    pub operands: Vec<RexNode>,
}

impl RexCall {
    pub fn new(
        kind: SqlKind,
        name: impl AsRef<str>,
        datatype: RelDataType,
        operands: impl IntoIterator<Item = RexNode>,
    ) -> Self {
        RexCall {
            kind,
            name: name.as_ref().to_lowercase(),
            datatype,
            operands: operands.into_iter().collect(),
        }
    }
}

impl fmt::Display for RexCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name.to_uppercase())?;
        for (idx, op) in self.operands.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{op}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RexNode {
    InputRef(RexInputRef),
    Literal(RexLiteral),
    Call(RexCall),
}

impl RexNode {
    pub fn input_ref(index: usize, datatype: RelDataType) -> Self {
        RexNode::InputRef(RexInputRef { index, datatype })
    }

    pub fn literal(value: RexLiteralValue, datatype: RelDataType) -> Self {
        RexNode::Literal(RexLiteral::new(value, datatype))
    }

    /// Call using the default operator name of `kind`.
    pub fn call(
        kind: SqlKind,
        datatype: RelDataType,
        operands: impl IntoIterator<Item = RexNode>,
    ) -> Self {
        RexNode::Call(RexCall::new(kind, kind.default_name(), datatype, operands))
    }

    /// Call of a function resolved by name.
    pub fn function(
        name: impl AsRef<str>,
        datatype: RelDataType,
        operands: impl IntoIterator<Item = RexNode>,
    ) -> Self {
        RexNode::Call(RexCall::new(SqlKind::OtherFunction, name, datatype, operands))
    }

    pub fn datatype(&self) -> &RelDataType {
        match self {
            Self::InputRef(r) => &r.datatype,
            Self::Literal(l) => &l.datatype,
            Self::Call(c) => &c.datatype,
        }
    }
}

impl fmt::Display for RexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputRef(r) => write!(f, "${}", r.index),
            Self::Literal(l) => write!(f, "{l}"),
            Self::Call(c) => write!(f, "{c}"),
        }
    }
}
