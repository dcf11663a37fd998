use std::fmt;

/// Operators understood by the runtime library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shr,
    Shl,
    BwAnd,
    BwOr,
    Xor,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
    Not,
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
    IsDistinct,
    Min,
    Max,
    AggMin,
    AggMax,
    Concat,
    /// Multiply a value by a collection weight.
    MulWeight,
    UnaryPlus,
    Neg,
    /// Convert a nullable boolean to a non-nullable one, NULL becoming false.
    WrapBool,
    SqlIndex,
}

impl Opcode {
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Neq | Self::Lt | Self::Gt | Self::Lte | Self::Gte
        )
    }

    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::AggMin | Self::AggMax)
    }

    /// The `IS [NOT] TRUE/FALSE` family. These never produce NULL.
    pub const fn is_truth_test(&self) -> bool {
        matches!(
            self,
            Self::IsTrue | Self::IsNotTrue | Self::IsFalse | Self::IsNotFalse
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Shr => ">>",
            Self::Shl => "<<",
            Self::BwAnd => "&",
            Self::BwOr => "|",
            Self::Xor => "^",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
            Self::IsTrue => "is_true",
            Self::IsNotTrue => "is_not_true",
            Self::IsFalse => "is_false",
            Self::IsNotFalse => "is_not_false",
            Self::IsDistinct => "is_distinct",
            Self::Min => "min",
            Self::Max => "max",
            Self::AggMin => "agg_min",
            Self::AggMax => "agg_max",
            Self::Concat => "concat",
            Self::MulWeight => "mul_weight",
            Self::UnaryPlus => "+",
            Self::Neg => "-",
            Self::WrapBool => "wrap_bool",
            Self::SqlIndex => "[]",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes() {
        assert!(Opcode::Lte.is_comparison());
        assert!(!Opcode::IsDistinct.is_comparison());
        assert!(Opcode::AggMax.is_aggregate());
        assert!(!Opcode::Max.is_aggregate());
        assert!(Opcode::IsNotFalse.is_truth_test());
        assert!(!Opcode::Not.is_truth_test());
    }
}
