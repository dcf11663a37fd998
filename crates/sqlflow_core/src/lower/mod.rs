//! Lowering of planner expressions into the typed IR.
//!
//! The lowerer walks a `RexNode` tree bottom up. Every operator application
//! goes through the runtime library to find its result type, operands are
//! cast to a common type where the operator needs one, and every result is
//! cast back to the type the planner declared for the node.
mod case;
mod functions;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use sqlflow_error::{CompilerError, OptionExt, Result, ResultExt, not_implemented};
use tracing::{debug, trace};

use crate::config::LoweringConfig;
use crate::expr::field_expr::FieldExpr;
use crate::expr::opcode::Opcode;
use crate::expr::variable_expr::VariableExpr;
use crate::expr::{self, Expression, SourceNode};
use crate::literal::{Literal, LiteralValue};
use crate::rex::rel_type::TypeCompiler;
use crate::rex::sarg::expand_search;
use crate::rex::{RexCall, RexInputRef, RexLiteral, RexLiteralValue, RexNode, SqlKind};
use crate::runtime;
use crate::types::reduce::{need_common_type, reduce_type};
use crate::types::{DataType, TypeKind};

/// Translates planner expressions that refer to a single row.
#[derive(Debug, Clone)]
pub struct ExpressionLowerer {
    /// Variable holding a reference to the input row.
    row: Option<Expression>,
    /// Number of fields in the row.
    row_arity: usize,
    /// Planner constants, numbered as fields following the row.
    constants: Vec<RexLiteral>,
    type_compiler: TypeCompiler,
    config: LoweringConfig,
}

impl ExpressionLowerer {
    /// Create a lowerer for expressions over `row`, which must be a
    /// reference to a tuple.
    pub fn try_new(
        row: Option<VariableExpr>,
        constants: Vec<RexLiteral>,
        config: LoweringConfig,
    ) -> Result<Self> {
        let row_arity = match &row {
            Some(row) => row
                .datatype
                .deref()
                .and_then(|inner| inner.tuple_fields())
                .map(|fields| fields.len())
                .ok_or_else(|| {
                    CompilerError::internal("Expected a reference type for row")
                        .with_field("row", &row.datatype)
                })?,
            None => 0,
        };

        Ok(ExpressionLowerer {
            row: row.map(Expression::Variable),
            row_arity,
            constants,
            type_compiler: TypeCompiler,
            config,
        })
    }

    /// Lowerer for expressions that do not reference a row.
    pub fn without_row(config: LoweringConfig) -> Self {
        ExpressionLowerer {
            row: None,
            row_arity: 0,
            constants: Vec::new(),
            type_compiler: TypeCompiler,
            config,
        }
    }

    pub fn compile(&self, rex: &RexNode) -> Result<Expression> {
        if self.config.log_expressions() {
            debug!(expression = %rex, "compiling expression");
        } else {
            trace!(expression = %rex, "compiling expression");
        }

        let result = match rex {
            RexNode::InputRef(input) => self.visit_input_ref(input),
            RexNode::Literal(literal) => self.visit_literal(literal),
            RexNode::Call(call) => self.visit_call(call),
        };

        result
            .map(|expr| expr.with_node(SourceNode::new(rex)))
            .map_err(|e| e.with_node(rex))
    }

    fn visit_input_ref(&self, input: &RexInputRef) -> Result<Expression> {
        let row = match &self.row {
            Some(row) => row,
            None => {
                return Err(CompilerError::internal("Row referenced without a row context"));
            }
        };

        if input.index < self.row_arity {
            let field: Expression = FieldExpr::try_new(row.clone(), input.index)?.into();
            return Ok(if self.config.emit_clones {
                field.apply_clone_if_needed()
            } else {
                field
            });
        }

        match self.constants.get(input.index - self.row_arity) {
            Some(constant) => self.visit_literal(constant),
            None => Err(CompilerError::internal("Index in row out of bounds")
                .with_field("index", input.index)
                .with_field("arity", self.row_arity)
                .with_field("constants", self.constants.len())),
        }
    }

    fn visit_literal(&self, literal: &RexLiteral) -> Result<Expression> {
        let datatype = self.type_compiler.convert_type(&literal.datatype)?;
        let lowered = lower_literal(&literal.value, datatype).map_err(|e| e.with_node(literal))?;
        Ok(lowered.into())
    }

    fn visit_call(&self, call: &RexCall) -> Result<Expression> {
        if call.kind == SqlKind::Search {
            let expanded = expand_search(call)?;
            return self.compile(&expanded);
        }

        let ops = call
            .operands
            .iter()
            .map(|op| self.compile(op))
            .collect::<Result<Vec<_>>>()?;
        let datatype = self.type_compiler.convert_type(&call.datatype)?;

        if self.config.log_calls() {
            debug!(kind = ?call.kind, name = %call.name, %datatype, "lowering call");
        } else {
            trace!(kind = ?call.kind, name = %call.name, %datatype, "lowering call");
        }

        match call.kind {
            SqlKind::Times => make_binary_expression(&datatype, Opcode::Mul, ops),
            SqlKind::Divide => {
                // Division by zero produces NULL.
                make_binary_expression(&datatype.nullable(), Opcode::Div, ops)
            }
            SqlKind::Mod => make_binary_expression(&datatype, Opcode::Mod, ops),
            SqlKind::Plus => make_binary_expressions(&datatype, Opcode::Add, ops),
            SqlKind::Minus => make_binary_expression(&datatype, Opcode::Sub, ops),
            SqlKind::LessThan => make_binary_expression(&datatype, Opcode::Lt, ops),
            SqlKind::GreaterThan => make_binary_expression(&datatype, Opcode::Gt, ops),
            SqlKind::LessThanOrEqual => make_binary_expression(&datatype, Opcode::Lte, ops),
            SqlKind::GreaterThanOrEqual => make_binary_expression(&datatype, Opcode::Gte, ops),
            SqlKind::Equals => make_binary_expression(&datatype, Opcode::Eq, ops),
            SqlKind::NotEquals => make_binary_expression(&datatype, Opcode::Neq, ops),
            SqlKind::IsDistinctFrom => make_binary_expression(&datatype, Opcode::IsDistinct, ops),
            SqlKind::IsNotDistinctFrom => {
                let distinct = make_binary_expression(&datatype, Opcode::IsDistinct, ops)?;
                make_unary_expression(&DataType::BOOL, Opcode::Not, vec![distinct])
            }
            SqlKind::Or => make_binary_expressions(&datatype, Opcode::Or, ops),
            SqlKind::And => make_binary_expressions(&datatype, Opcode::And, ops),
            SqlKind::Not => make_unary_expression(&datatype, Opcode::Not, ops),
            SqlKind::IsFalse => make_unary_expression(&datatype, Opcode::IsFalse, ops),
            SqlKind::IsNotTrue => make_unary_expression(&datatype, Opcode::IsNotTrue, ops),
            SqlKind::IsTrue => make_unary_expression(&datatype, Opcode::IsTrue, ops),
            SqlKind::IsNotFalse => make_unary_expression(&datatype, Opcode::IsNotFalse, ops),
            SqlKind::PlusPrefix => make_unary_expression(&datatype, Opcode::UnaryPlus, ops),
            SqlKind::MinusPrefix => make_unary_expression(&datatype, Opcode::Neg, ops),
            SqlKind::BitAnd => make_binary_expressions(&datatype, Opcode::BwAnd, ops),
            SqlKind::BitOr => make_binary_expressions(&datatype, Opcode::BwOr, ops),
            SqlKind::BitXor => make_binary_expressions(&datatype, Opcode::Xor, ops),
            SqlKind::Cast | SqlKind::Reinterpret => {
                let operand = ops.into_iter().next().required("operand of CAST")?;
                Ok(operand.cast(datatype))
            }
            SqlKind::IsNull | SqlKind::IsNotNull => lower_null_test(call.kind, &datatype, ops),
            SqlKind::Case => case::compile_case(ops),
            SqlKind::StPoint => functions::compile_st_point(&datatype, ops),
            SqlKind::OtherFunction => self.compile_other_function(call, datatype, ops),
            SqlKind::Other => match call.name.as_str() {
                "||" => make_binary_expression(&datatype, Opcode::Concat, ops),
                name => not_implemented!("Operator '{name}'"),
            },
            SqlKind::Extract => {
                // Also reached for DATE_PART.
                functions::compile_keyword_function("extract", &datatype, ops, 0, &[2])
            }
            SqlKind::Rlike | SqlKind::Position => {
                functions::compile_function(&call.name, &datatype, ops, &[2])
            }
            SqlKind::ArrayToString => functions::compile_array_to_string(&call.name, &datatype, ops),
            SqlKind::Like | SqlKind::Similar => {
                functions::compile_function(&call.name, &datatype, ops, &[2, 3])
            }
            SqlKind::Floor | SqlKind::Ceil => match ops.len() {
                2 => functions::compile_keyword_function(&call.name, &datatype, ops, 1, &[2]),
                1 => functions::compile_polymorphic_function(&call.name, &datatype, ops, &[1]),
                n => not_implemented!("{} with {n} operands", call.name.to_uppercase()),
            },
            SqlKind::ArrayValueConstructor => functions::compile_array_constructor(&datatype, ops),
            SqlKind::Item => {
                let [collection, index]: [Expression; 2] = ops.try_into().map_err(|ops: Vec<_>| {
                    CompilerError::unimplemented(format!(
                        "Indexing expects 2 operands, got {}",
                        ops.len()
                    ))
                })?;
                Ok(expr::binary(
                    Opcode::SqlIndex,
                    collection,
                    index.cast(DataType::USIZE),
                    datatype,
                ))
            }
            SqlKind::Trim => functions::compile_keyword_function(&call.name, &datatype, ops, 0, &[3]),
            SqlKind::Search | SqlKind::Dot => not_implemented!("Call kind {:?}", call.kind),
        }
    }

    fn compile_other_function(
        &self,
        call: &RexCall,
        datatype: DataType,
        ops: Vec<Expression>,
    ) -> Result<Expression> {
        let name = call.name.as_str();
        match name {
            "truncate" | "round" => functions::compile_round(name, &datatype, ops),
            "numeric_inc" | "sign" | "log10" | "ln" | "abs" => {
                functions::compile_polymorphic_function(name, &datatype, ops, &[1])
            }
            "st_distance" | "power" => functions::compile_polymorphic_function(name, &datatype, ops, &[2]),
            "split" => functions::compile_function(name, &datatype, ops, &[1, 2]),
            "overlay" => functions::compile_function(name, &datatype, ops, &[3, 4]),
            "char_length" | "ascii" | "chr" | "lower" | "upper" | "initcap" => {
                functions::compile_function(name, &datatype, ops, &[1])
            }
            "cardinality" => functions::compile_cardinality(&datatype, ops),
            "repeat" | "left" => functions::compile_function(name, &datatype, ops, &[2]),
            "replace" => functions::compile_function(name, &datatype, ops, &[3]),
            "division" => make_binary_expression(&datatype.nullable(), Opcode::Div, ops),
            "element" => functions::compile_element(&datatype, ops),
            "substring" => functions::compile_substring(&datatype, ops),
            "concat" => make_binary_expressions(&datatype, Opcode::Concat, ops),
            "array" => functions::compile_function(name, &datatype, ops, &[0]),
            _ => not_implemented!("Function '{name}'"),
        }
    }
}

/// Convert a planner literal value into an IR literal of type `datatype`.
fn lower_literal(value: &RexLiteralValue, datatype: DataType) -> Result<Literal> {
    if matches!(value, RexLiteralValue::Null) {
        return Literal::none(&datatype);
    }

    let mismatch = || {
        CompilerError::unimplemented("Literal value does not match its type")
            .with_field("type", &datatype)
    };

    let lowered = match (datatype.kind(), value) {
        (TypeKind::Integer(int), RexLiteralValue::Exact(v)) => {
            let converted = match (int.width, int.signed) {
                (8, true) => v.to_i8().map(LiteralValue::Int8),
                (16, true) => v.to_i16().map(LiteralValue::Int16),
                (32, true) => v.to_i32().map(LiteralValue::Int32),
                (64, true) => v.to_i64().map(LiteralValue::Int64),
                (16, false) => v.to_u16().map(LiteralValue::UInt16),
                (32, false) => v.to_u32().map(LiteralValue::UInt32),
                (64, false) => v.to_u64().map(LiteralValue::UInt64),
                (width, _) => {
                    return Err(CompilerError::unsupported(format!(
                        "Unsupported integer width type {width}"
                    )));
                }
            };
            converted.ok_or_else(|| {
                CompilerError::unimplemented(format!("Value {v} out of range for type {datatype}"))
            })?
        }
        (TypeKind::Double, RexLiteralValue::Approx(v)) => LiteralValue::Double(*v),
        (TypeKind::Double, RexLiteralValue::Exact(v)) => {
            LiteralValue::Double(v.to_f64().ok_or_else(mismatch)?)
        }
        (TypeKind::Float, RexLiteralValue::Approx(v)) => LiteralValue::Float(*v as f32),
        (TypeKind::Float, RexLiteralValue::Exact(v)) => {
            LiteralValue::Float(v.to_f32().ok_or_else(mismatch)?)
        }
        (TypeKind::String(_), RexLiteralValue::CharString(s)) => LiteralValue::String(s.clone()),
        (TypeKind::Bool, RexLiteralValue::Bool(b)) => LiteralValue::Bool(*b),
        (TypeKind::Decimal(_), RexLiteralValue::Exact(v)) => LiteralValue::Decimal(*v),
        (TypeKind::Keyword, RexLiteralValue::Symbol(s)) => LiteralValue::Keyword(s.clone()),
        (TypeKind::MillisInterval, RexLiteralValue::Interval(v)) => {
            LiteralValue::MillisInterval(v.to_i64().ok_or_else(mismatch)?)
        }
        (TypeKind::MonthsInterval, RexLiteralValue::Interval(v)) => {
            LiteralValue::MonthsInterval(v.to_i32().ok_or_else(mismatch)?)
        }
        (TypeKind::Timestamp, RexLiteralValue::Timestamp(s)) => LiteralValue::Timestamp(
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .context_fn(|| format!("Invalid timestamp literal '{s}'"))?,
        ),
        (TypeKind::Date, RexLiteralValue::Date(s)) => LiteralValue::Date(
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .context_fn(|| format!("Invalid date literal '{s}'"))?,
        ),
        (TypeKind::Time, RexLiteralValue::Time(s)) => LiteralValue::Time(
            NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .context_fn(|| format!("Invalid time literal '{s}'"))?,
        ),
        (TypeKind::GeoPoint, RexLiteralValue::GeoPoint { x, y }) => {
            LiteralValue::GeoPoint { x: *x, y: *y }
        }
        _ => return Err(mismatch()),
    };

    Literal::try_new(lowered, datatype)
}

fn lower_null_test(kind: SqlKind, datatype: &DataType, ops: Vec<Expression>) -> Result<Expression> {
    if !datatype.same_type(&DataType::BOOL) {
        return Err(
            CompilerError::internal("Expected expression to produce a boolean result")
                .with_field("type", datatype),
        );
    }
    let arg = ops.into_iter().next().required("operand of IS NULL")?;

    if arg.datatype().may_be_null() {
        let is_null = expr::is_null(arg);
        if kind == SqlKind::IsNull {
            Ok(is_null)
        } else {
            expr::unary(Opcode::Not, is_null)
        }
    } else {
        // A non-nullable value is never NULL.
        Ok(expr::lit(kind != SqlKind::IsNull))
    }
}

/// Apply a binary operator left to right over two or more operands.
pub fn make_binary_expressions(
    datatype: &DataType,
    op: Opcode,
    operands: Vec<Expression>,
) -> Result<Expression> {
    if operands.len() < 2 {
        not_implemented!("Operator {op} with {} operands", operands.len());
    }
    let mut operands = operands.into_iter();
    let mut accumulator = operands.next().required("first operand")?;
    for operand in operands {
        accumulator = make_binary(datatype, op, accumulator, operand)?;
    }
    Ok(accumulator.cast_if_needed(datatype))
}

/// Build a binary operation whose result is cast to `datatype`.
pub fn make_binary_expression(
    datatype: &DataType,
    op: Opcode,
    operands: Vec<Expression>,
) -> Result<Expression> {
    let [left, right]: [Expression; 2] = operands.try_into().map_err(|ops: Vec<_>| {
        CompilerError::internal(format!("Expected 2 operands, got {}", ops.len()))
    })?;
    make_binary(datatype, op, left, right)
}

fn make_binary(
    datatype: &DataType,
    op: Opcode,
    mut left: Expression,
    mut right: Expression,
) -> Result<Expression> {
    let left_type = left.datatype();
    let right_type = right.datatype();

    if need_common_type(datatype, &left_type, &right_type) {
        let common = reduce_type(&left_type, &right_type)?;
        if common.is_null() {
            // Both sides are NULL.
            return Ok(Literal::none(datatype)?.into());
        }
        let any_null = left_type.may_be_null() || right_type.may_be_null();
        let common = common.set_may_be_null(any_null);
        left = left.cast_if_needed(&common);
        right = right.cast_if_needed(&common);
    }

    let function = runtime::INSTANCE.get_implementation(
        op,
        Some(datatype),
        &left.datatype(),
        Some(&right.datatype()),
    )?;
    Ok(expr::binary(op, left, right, function.return_type).cast(datatype.clone()))
}

/// Build a unary operation whose result is cast to `datatype`.
pub fn make_unary_expression(
    datatype: &DataType,
    op: Opcode,
    operands: Vec<Expression>,
) -> Result<Expression> {
    let [operand]: [Expression; 1] = operands.try_into().map_err(|ops: Vec<_>| {
        CompilerError::internal(format!("Expected 1 operands, got {}", ops.len()))
    })?;
    Ok(expr::unary(op, operand)?.cast(datatype.clone()))
}
