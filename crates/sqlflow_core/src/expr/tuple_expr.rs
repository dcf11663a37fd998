use std::fmt;

use sqlflow_error::{CompilerError, Result};

use super::{Expression, SourceNode};
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpr {
    pub fields: Vec<Expression>,
    pub node: SourceNode,
}

impl TupleExpr {
    pub fn new(fields: impl IntoIterator<Item = Expression>) -> Self {
        TupleExpr {
            fields: fields.into_iter().collect(),
            node: SourceNode::none(),
        }
    }

    pub fn datatype(&self) -> DataType {
        DataType::tuple(self.fields.iter().map(|f| f.datatype()), false)
    }
}

impl fmt::Display for TupleExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tuple(")?;
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, ")")
    }
}

/// Vector constructor. All elements have the element type.
#[derive(Debug, Clone, PartialEq)]
pub struct VecExpr {
    pub elements: Vec<Expression>,
    pub element_type: DataType,
    pub node: SourceNode,
}

impl VecExpr {
    pub fn try_new(
        elements: impl IntoIterator<Item = Expression>,
        element_type: DataType,
    ) -> Result<Self> {
        let elements: Vec<_> = elements.into_iter().collect();
        for elem in &elements {
            let datatype = elem.datatype();
            if !datatype.same_type(&element_type) {
                return Err(CompilerError::internal("Vector element has unexpected type")
                    .with_field("element", datatype)
                    .with_field("expected", &element_type));
            }
        }
        Ok(VecExpr {
            elements,
            element_type,
            node: SourceNode::none(),
        })
    }

    pub fn datatype(&self) -> DataType {
        DataType::vec(self.element_type.clone(), false)
    }
}

impl fmt::Display for VecExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vec![")?;
        for (idx, elem) in self.elements.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{elem}")?;
        }
        write!(f, "]")
    }
}
