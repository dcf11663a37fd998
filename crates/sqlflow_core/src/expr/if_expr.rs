use std::fmt;

use sqlflow_error::{CompilerError, Result};

use super::{Expression, SourceNode};

/// Two-valued conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expression>,
    pub then: Box<Expression>,
    pub else_expr: Box<Expression>,
    pub node: SourceNode,
}

impl IfExpr {
    /// The condition must be a non-nullable boolean and both branches must
    /// have the same type.
    pub fn try_new(
        condition: impl Into<Expression>,
        then: impl Into<Expression>,
        else_expr: impl Into<Expression>,
    ) -> Result<Self> {
        let condition = condition.into();
        let then = then.into();
        let else_expr = else_expr.into();

        let cond_type = condition.datatype();
        if !cond_type.is_bool() || cond_type.may_be_null() {
            return Err(CompilerError::internal(
                "Condition of an IF must be a non-nullable boolean",
            )
            .with_field("condition", cond_type));
        }

        let then_type = then.datatype();
        let else_type = else_expr.datatype();
        if !then_type.same_type(&else_type) {
            return Err(
                CompilerError::internal("Branches of an IF have different types")
                    .with_field("then", then_type)
                    .with_field("else", else_type),
            );
        }

        Ok(IfExpr {
            condition: Box::new(condition),
            then: Box::new(then),
            else_expr: Box::new(else_expr),
            node: SourceNode::none(),
        })
    }
}

impl fmt::Display for IfExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "if {} {{ {} }} else {{ {} }}",
            self.condition, self.then, self.else_expr
        )
    }
}
