use std::fmt;

use super::{Expression, SourceNode};

/// Marks a value that must be cloned out of a borrowed row.
#[derive(Debug, Clone, PartialEq)]
pub struct CloneExpr {
    pub expr: Box<Expression>,
    pub node: SourceNode,
}

impl CloneExpr {
    pub fn new(expr: impl Into<Expression>) -> Self {
        CloneExpr {
            expr: Box::new(expr.into()),
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for CloneExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.clone()", self.expr)
    }
}
