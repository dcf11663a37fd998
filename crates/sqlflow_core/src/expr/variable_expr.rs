use std::fmt;

use super::SourceNode;
use crate::types::DataType;

/// A named variable, such as the row a closure receives.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: String,
    pub datatype: DataType,
    pub node: SourceNode,
}

impl VariableExpr {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        VariableExpr {
            name: name.into(),
            datatype,
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for VariableExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
