//! Calls that lower to named runtime functions.
//!
//! Function names are mangled with the types or the nullability of the
//! arguments so every overload maps to exactly one runtime symbol.
use sqlflow_error::{CompilerError, Result, not_implemented};

use crate::expr::{self, Expression};
use crate::literal::{Literal, LiteralValue};
use crate::types::DataType;

fn validate_arg_count(name: &str, count: usize, expected: &[usize]) -> Result<()> {
    if expected.contains(&count) {
        return Ok(());
    }
    let expected = expected
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(
        CompilerError::unimplemented(format!("Function '{name}' called with {count} arguments"))
            .with_field("expected", expected),
    )
}

/// Nullability signature of a type: `N` or `_`, recursing into arrays.
pub fn type_string(datatype: &DataType) -> String {
    let nullability = if datatype.may_be_null() { "N" } else { "_" };
    match datatype.element_type() {
        Some(element) => format!("{nullability}vec{}", type_string(element)),
        None => nullability.to_string(),
    }
}

/// Function whose runtime name carries the full type of every argument.
pub fn compile_polymorphic_function(
    name: &str,
    result_type: &DataType,
    ops: Vec<Expression>,
    expected_counts: &[usize],
) -> Result<Expression> {
    validate_arg_count(name, ops.len(), expected_counts)?;
    let mut function = name.to_string();
    for op in &ops {
        function.push('_');
        function.push_str(&op.datatype().base_type_with_suffix()?);
    }
    Ok(expr::apply(function, ops, result_type.clone()))
}

/// Function whose runtime name carries only the nullability of its
/// arguments, and the argument count when it accepts several.
pub fn compile_function(
    base_name: &str,
    result_type: &DataType,
    ops: Vec<Expression>,
    expected_counts: &[usize],
) -> Result<Expression> {
    validate_arg_count(base_name, ops.len(), expected_counts)?;
    let mut function = base_name.to_string();
    if expected_counts.len() > 1 {
        function.push_str(&ops.len().to_string());
    }
    for op in &ops {
        function.push_str(&type_string(&op.datatype()));
    }
    Ok(expr::apply(function, ops, result_type.clone()))
}

/// Function taking a keyword such as a time unit. The keyword becomes part
/// of the runtime name and is dropped from the arguments.
pub fn compile_keyword_function(
    base_name: &str,
    result_type: &DataType,
    mut ops: Vec<Expression>,
    keyword_index: usize,
    expected_counts: &[usize],
) -> Result<Expression> {
    validate_arg_count(base_name, ops.len(), expected_counts)?;
    if keyword_index >= ops.len() {
        not_implemented!("Function '{base_name}' is missing its keyword argument");
    }

    let keyword_op = ops.remove(keyword_index);
    let keyword = match keyword_op.as_literal().map(Literal::value) {
        Some(LiteralValue::Keyword(keyword)) => keyword.clone(),
        _ => {
            return Err(CompilerError::internal(format!(
                "Expected a keyword argument for '{base_name}'"
            ))
            .with_field("argument", &keyword_op));
        }
    };

    let mut function = format!("{base_name}_{keyword}");
    for op in &ops {
        function.push('_');
        function.push_str(&op.datatype().base_type_with_suffix()?);
    }
    Ok(expr::apply(function, ops, result_type.clone()))
}

/// `ROUND(x [, digits])` and `TRUNCATE(x [, digits])`.
pub fn compile_round(name: &str, result_type: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    let mut ops = ops.into_iter();
    let (left, right) = match (ops.next(), ops.next(), ops.next()) {
        (Some(left), None, _) => (left, expr::lit(0_i32)),
        (Some(left), Some(right), None) => (left, right),
        _ => not_implemented!("Function '{name}' expects 1 or 2 arguments"),
    };

    if !right.datatype().is_integer() {
        return Err(CompilerError::unimplemented(format!(
            "{} expects a constant integer second argument",
            name.to_uppercase()
        ))
        .with_field("argument", &right));
    }
    let function = format!("{name}_{}", left.datatype().base_type_with_suffix()?);
    Ok(expr::apply(function, [left, right], result_type.clone()))
}

pub fn compile_st_point(result_type: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    let [left, right]: [Expression; 2] = ops.try_into().map_err(|ops: Vec<_>| {
        CompilerError::unimplemented(format!("ST_POINT expects 2 operands, got {}", ops.len()))
    })?;
    let function = format!(
        "make_geopoint{}_{}_{}",
        result_type.nullable_suffix(),
        left.datatype().base_type_with_suffix()?,
        right.datatype().base_type_with_suffix()?
    );
    Ok(expr::apply(function, [left, right], result_type.clone()))
}

pub fn compile_cardinality(result_type: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    validate_arg_count("cardinality", ops.len(), &[1])?;
    let function = format!("cardinality{}", ops[0].datatype().nullable_suffix());
    Ok(expr::apply(function, ops, result_type.clone()))
}

/// `ELEMENT(array)`: the only element of an array, NULL when it is empty.
pub fn compile_element(result_type: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    validate_arg_count("element", ops.len(), &[1])?;
    let arg_type = ops[0].datatype();
    let element = arg_type.element_type().ok_or_else(|| {
        CompilerError::internal("ELEMENT expects an array argument").with_field("type", &arg_type)
    })?;
    let function = format!("element{}", element.nullable_suffix());
    Ok(expr::apply(function, ops, result_type.nullable()))
}

pub fn compile_substring(result_type: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    let base = match ops.first() {
        Some(op) => format!("substring{}", op.datatype().nullable_suffix()),
        None => not_implemented!("SUBSTRING without arguments"),
    };
    compile_function(&base, result_type, ops, &[2, 3])
}

/// `ARRAY_TO_STRING(array, delimiter [, null_string])`. The string
/// arguments are widened to unbounded strings.
pub fn compile_array_to_string(
    name: &str,
    result_type: &DataType,
    ops: Vec<Expression>,
) -> Result<Expression> {
    validate_arg_count(name, ops.len(), &[2, 3])?;
    let ops = ops
        .into_iter()
        .enumerate()
        .map(|(idx, op)| {
            if idx == 0 {
                return op;
            }
            let target = DataType::STRING.set_may_be_null(op.datatype().may_be_null());
            op.cast_if_needed(&target)
        })
        .collect();
    compile_function(name, result_type, ops, &[2, 3])
}

/// `ARRAY[a, b, ...]`.
pub fn compile_array_constructor(result_type: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    let element = result_type.element_type().ok_or_else(|| {
        CompilerError::internal("Array constructor must produce an array")
            .with_field("type", result_type)
    })?;
    let elements = ops.into_iter().map(|op| op.cast(element.clone()));
    Ok(expr::vec(elements, element.clone())?.cast_if_needed(result_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Charset;

    fn string(nullable: bool) -> Expression {
        expr::var("s", DataType::STRING.set_may_be_null(nullable))
    }

    fn function_name(e: &Expression) -> &str {
        match e {
            Expression::Apply(apply) => &apply.function,
            other => panic!("not an application: {other}"),
        }
    }

    #[test]
    fn nullability_signatures() {
        assert_eq!("_", type_string(&DataType::INT32));
        assert_eq!("N", type_string(&DataType::STRING.nullable()));
        assert_eq!(
            "_vecN",
            type_string(&DataType::vec(DataType::INT32.nullable(), false))
        );
        assert_eq!(
            "Nvec_vec_",
            type_string(&DataType::vec(DataType::vec(DataType::BOOL, false), true))
        );
    }

    #[test]
    fn fixed_and_variable_arity() {
        let e = compile_function("upper", &DataType::STRING, vec![string(false)], &[1]).unwrap();
        assert_eq!("upper_", function_name(&e));

        let e = compile_function(
            "split",
            &DataType::vec(DataType::STRING, true),
            vec![string(true), string(false)],
            &[1, 2],
        )
        .unwrap();
        assert_eq!("split2N_", function_name(&e));

        let err = compile_function("repeat", &DataType::STRING, vec![string(false)], &[2]).unwrap_err();
        assert!(err.is_unimplemented());
    }

    #[test]
    fn polymorphic() {
        let e = compile_polymorphic_function(
            "power",
            &DataType::DOUBLE,
            vec![expr::lit(2.0_f64), expr::var("x", DataType::INT32.nullable())],
            &[2],
        )
        .unwrap();
        assert_eq!("power_d_i32N", function_name(&e));
        assert_eq!(DataType::DOUBLE, e.datatype());
    }

    #[test]
    fn keyword_is_removed() {
        let e = compile_keyword_function(
            "extract",
            &DataType::INT64,
            vec![
                expr::lit(Literal::keyword("YEAR")),
                expr::var("ts", DataType::TIMESTAMP.nullable()),
            ],
            0,
            &[2],
        )
        .unwrap();
        assert_eq!("extract_YEAR_TimestampN(ts)", e.to_string());

        let err = compile_keyword_function(
            "floor",
            &DataType::DATE,
            vec![expr::var("d", DataType::DATE), expr::lit(1_i32)],
            1,
            &[2],
        )
        .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn round_defaults_digits() {
        let e = compile_round("round", &DataType::DOUBLE, vec![expr::var("x", DataType::DOUBLE)]).unwrap();
        assert_eq!("round_d(x, 0)", e.to_string());

        let err = compile_round(
            "truncate",
            &DataType::DOUBLE,
            vec![expr::var("x", DataType::DOUBLE), expr::lit(1.5_f64)],
        )
        .unwrap_err();
        assert!(err.is_unimplemented());
        assert!(compile_round("round", &DataType::DOUBLE, Vec::new()).is_err());
    }

    #[test]
    fn geopoint_and_collections() {
        let e = compile_st_point(
            &DataType::GEOPOINT.nullable(),
            vec![expr::lit(1.0_f64), expr::var("y", DataType::DOUBLE.nullable())],
        )
        .unwrap();
        assert_eq!("make_geopointN_d_dN", function_name(&e));

        let array = expr::var("a", DataType::vec(DataType::INT32.nullable(), true));
        let e = compile_cardinality(&DataType::INT32, vec![array.clone()]).unwrap();
        assert_eq!("cardinalityN", function_name(&e));

        let e = compile_element(&DataType::INT32, vec![array]).unwrap();
        assert_eq!("elementN", function_name(&e));
        assert_eq!(DataType::INT32.nullable(), e.datatype());
    }

    #[test]
    fn substring_and_array_to_string() {
        let e = compile_substring(
            &DataType::STRING.nullable(),
            vec![string(true), expr::lit(2_i32), expr::lit(3_i32)],
        )
        .unwrap();
        assert_eq!("substringN3N__", function_name(&e));

        let delimiter = expr::var("d", DataType::string(Some(1), Charset::Latin1, false));
        let e = compile_array_to_string(
            "array_to_string",
            &DataType::STRING,
            vec![expr::var("a", DataType::vec(DataType::STRING, false)), delimiter],
        )
        .unwrap();
        assert_eq!("array_to_string2_vec__", function_name(&e));
        assert_eq!("array_to_string2_vec__(a, CAST(d AS s))", e.to_string());
    }

    #[test]
    fn array_constructor_casts_elements() {
        let e = compile_array_constructor(
            &DataType::vec(DataType::INT64, false),
            vec![expr::lit(1_i32), expr::lit(2_i64)],
        )
        .unwrap();
        assert_eq!("vec![CAST(1 AS i64), CAST(2 AS i64)]", e.to_string());
        assert_eq!(DataType::vec(DataType::INT64, false), e.datatype());
    }
}
