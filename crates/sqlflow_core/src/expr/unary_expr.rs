use std::fmt;

use sqlflow_error::{CompilerError, Result};

use super::opcode::Opcode;
use super::{Expression, SourceNode};
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Opcode,
    pub expr: Box<Expression>,
    pub datatype: DataType,
    pub node: SourceNode,
}

impl UnaryExpr {
    /// Create a unary expression, computing its result type from the
    /// operand.
    ///
    /// The result has the operand's type, except for truth tests and
    /// `WRAP_BOOL` which produce non-nullable booleans.
    pub fn try_new(op: Opcode, expr: impl Into<Expression>) -> Result<Self> {
        let expr = expr.into();
        let operand_type = expr.datatype();

        let datatype = match op {
            Opcode::WrapBool
            | Opcode::IsTrue
            | Opcode::IsNotTrue
            | Opcode::IsFalse
            | Opcode::IsNotFalse => {
                if !operand_type.is_bool() {
                    return Err(CompilerError::internal(format!(
                        "Operator {op} expects a boolean operand"
                    ))
                    .with_field("operand", operand_type));
                }
                DataType::BOOL
            }
            Opcode::Not | Opcode::Neg | Opcode::UnaryPlus => operand_type,
            other => {
                return Err(CompilerError::internal(format!(
                    "{other} is not a unary operator"
                )));
            }
        };

        Ok(UnaryExpr {
            op,
            expr: Box::new(expr),
            datatype,
            node: SourceNode::none(),
        })
    }
}

impl fmt::Display for UnaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.op, self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr;
    use crate::literal::Literal;

    #[test]
    fn wrap_bool_type() {
        let null = Literal::none(&DataType::BOOL.nullable()).unwrap();
        let wrapped = UnaryExpr::try_new(Opcode::WrapBool, null).unwrap();
        assert_eq!(DataType::BOOL, wrapped.datatype);

        let wrapped = UnaryExpr::try_new(Opcode::WrapBool, expr::lit(true)).unwrap();
        assert_eq!(DataType::BOOL, wrapped.datatype);

        assert!(UnaryExpr::try_new(Opcode::WrapBool, expr::lit(1_i32)).is_err());
    }

    #[test]
    fn truth_tests_are_not_nullable() {
        let e = UnaryExpr::try_new(Opcode::IsNotFalse, expr::var("b", DataType::BOOL.nullable())).unwrap();
        assert_eq!(DataType::BOOL, e.datatype);
    }

    #[test]
    fn negation_keeps_type() {
        let e = UnaryExpr::try_new(Opcode::Neg, expr::var("x", DataType::DOUBLE.nullable())).unwrap();
        assert_eq!(DataType::DOUBLE.nullable(), e.datatype);
        assert_eq!("-(x)", e.to_string());
    }

    #[test]
    fn rejects_binary_opcode() {
        let err = UnaryExpr::try_new(Opcode::Add, expr::lit(1_i32)).unwrap_err();
        assert!(err.is_internal());
    }
}
