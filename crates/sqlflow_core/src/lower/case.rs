//! `CASE` expressions, lowered to nested `if` chains.
use sqlflow_error::{OptionExt, Result};

use super::make_binary_expression;
use crate::expr::opcode::Opcode;
use crate::expr::{self, Expression};
use crate::types::DataType;

/// Lower a `CASE` call.
///
/// An odd number of operands is a searched case,
/// `[c1, r1, c2, r2, ..., else]`. An even number is a switched case,
/// `[value, w1, r1, w2, r2, ..., else]`. The planner always supplies the
/// `ELSE` operand.
pub fn compile_case(mut ops: Vec<Expression>) -> Result<Expression> {
    let else_expr = ops.pop().required("ELSE operand of CASE")?;
    let switched = ops.len() % 2 == 1;
    let value = if switched { Some(ops.remove(0)) } else { None };

    // The result is nullable when any branch is.
    let mut final_type = else_expr.datatype();
    for result in ops.iter().skip(1).step_by(2) {
        if result.datatype().may_be_null() {
            final_type = final_type.nullable();
        }
    }

    let mut arms = Vec::with_capacity(ops.len() / 2);
    let mut ops = ops.into_iter();
    while let (Some(condition), Some(result)) = (ops.next(), ops.next()) {
        arms.push((condition, result));
    }

    let mut lowered = else_expr.cast_if_needed(&final_type);
    for (condition, result) in arms.into_iter().rev() {
        let condition = match &value {
            Some(value) => {
                let nullable = value.datatype().may_be_null() || condition.datatype().may_be_null();
                make_binary_expression(
                    &DataType::BOOL.set_may_be_null(nullable),
                    Opcode::Eq,
                    vec![value.clone(), condition],
                )?
            }
            None => condition,
        };
        let condition = expr::wrap_bool_if_needed(condition)?;
        let result = result.cast_if_needed(&final_type);
        lowered = expr::if_then_else(condition, result, lowered)?;
    }

    Ok(lowered)
}
