use std::fmt;

use super::SourceNode;
use crate::literal::Literal;

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub literal: Literal,
    pub node: SourceNode,
}

impl LiteralExpr {
    pub fn new(literal: Literal) -> Self {
        LiteralExpr {
            literal,
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for LiteralExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal)
    }
}
