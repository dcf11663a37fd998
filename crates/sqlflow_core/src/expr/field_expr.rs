use std::fmt;

use sqlflow_error::{CompilerError, Result};

use super::{Expression, SourceNode};
use crate::types::DataType;

/// Reference to a field of a borrowed row.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    pub row: Box<Expression>,
    pub index: usize,
    /// Type of the referenced field.
    pub datatype: DataType,
    pub node: SourceNode,
}

impl FieldExpr {
    pub fn try_new(row: impl Into<Expression>, index: usize) -> Result<Self> {
        let row = row.into();
        let row_type = row.datatype();

        let fields = row_type
            .deref()
            .and_then(|inner| inner.tuple_fields())
            .ok_or_else(|| {
                CompilerError::internal("Expected a reference to a tuple for row")
                    .with_field("row", &row_type)
            })?;

        let datatype = fields.get(index).cloned().ok_or_else(|| {
            CompilerError::internal("Index in row out of bounds")
                .with_field("index", index)
                .with_field("arity", fields.len())
        })?;

        Ok(FieldExpr {
            row: Box::new(row),
            index,
            datatype,
            node: SourceNode::none(),
        })
    }
}

impl fmt::Display for FieldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.row, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr;

    fn row() -> Expression {
        expr::var(
            "t",
            DataType::reference(DataType::tuple(
                [DataType::INT32.nullable(), DataType::STRING],
                false,
            )),
        )
    }

    #[test]
    fn field_type() {
        let f = FieldExpr::try_new(row(), 0).unwrap();
        assert_eq!(DataType::INT32.nullable(), f.datatype);
        assert_eq!("t.0", f.to_string());
    }

    #[test]
    fn out_of_bounds() {
        let err = FieldExpr::try_new(row(), 2).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn row_must_be_reference() {
        let row = expr::var("t", DataType::tuple([DataType::INT32], false));
        assert!(FieldExpr::try_new(row, 0).is_err());
    }
}
