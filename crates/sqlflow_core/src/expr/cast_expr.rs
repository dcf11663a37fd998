use std::fmt;

use super::{Expression, SourceNode};
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub to: DataType,
    pub expr: Box<Expression>,
    pub node: SourceNode,
}

impl CastExpr {
    pub fn new(expr: impl Into<Expression>, to: DataType) -> Self {
        CastExpr {
            to,
            expr: Box::new(expr.into()),
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CAST({} AS {})", self.expr, self.to)
    }
}
