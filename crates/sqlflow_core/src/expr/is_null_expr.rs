use std::fmt;

use super::{Expression, SourceNode};

/// `expr IS NULL`. Always a non-nullable boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct IsNullExpr {
    pub expr: Box<Expression>,
    pub node: SourceNode,
}

impl IsNullExpr {
    pub fn new(expr: impl Into<Expression>) -> Self {
        IsNullExpr {
            expr: Box::new(expr.into()),
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for IsNullExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IS NULL", self.expr)
    }
}
