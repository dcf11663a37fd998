use std::fmt;

use super::opcode::Opcode;
use super::{Expression, SourceNode};
use crate::types::DataType;

/// A binary operation.
///
/// The operands are never coerced by the node itself. The result type is the
/// one the runtime library reports for the operand types.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: Opcode,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub datatype: DataType,
    pub node: SourceNode,
}

impl BinaryExpr {
    pub fn new(
        op: Opcode,
        left: impl Into<Expression>,
        right: impl Into<Expression>,
        datatype: DataType,
    ) -> Self {
        BinaryExpr {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
            datatype,
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Opcode::SqlIndex => write!(f, "{}[{}]", self.left, self.right),
            Opcode::IsDistinct
            | Opcode::Min
            | Opcode::Max
            | Opcode::AggMin
            | Opcode::AggMax
            | Opcode::Concat
            | Opcode::MulWeight => write!(f, "{}({}, {})", self.op, self.left, self.right),
            _ => write!(f, "({} {} {})", self.left, self.op, self.right),
        }
    }
}
