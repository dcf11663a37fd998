use std::fmt;

use super::{Expression, SourceNode};
use crate::types::DataType;

/// Call of a runtime library function by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyExpr {
    pub function: String,
    pub args: Vec<Expression>,
    pub datatype: DataType,
    pub node: SourceNode,
}

impl ApplyExpr {
    pub fn new(
        function: impl Into<String>,
        args: impl IntoIterator<Item = Expression>,
        datatype: DataType,
    ) -> Self {
        ApplyExpr {
            function: function.into(),
            args: args.into_iter().collect(),
            datatype,
            node: SourceNode::none(),
        }
    }
}

impl fmt::Display for ApplyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
