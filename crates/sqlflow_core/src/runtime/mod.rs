//! Selection of runtime library functions for operators.
//!
//! The function names produced here are the contract with the runtime
//! library: for every operator and operand type combination the lowering can
//! produce, the runtime exposes a function with exactly this name.
use std::sync::LazyLock;

use indexmap::IndexMap;
use sqlflow_error::{CompilerError, Result};
use tracing::trace;

use crate::expr::opcode::Opcode;
use crate::types::{DataType, TypeKind};

/// Process-wide runtime library description.
pub static INSTANCE: LazyLock<RuntimeLibrary> = LazyLock::new(RuntimeLibrary::new);

/// Runtime function implementing an operator, along with its result type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescription {
    pub function: String,
    pub return_type: DataType,
}

/// Operator tables are grouped by the type family of the left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    Boolean,
    Date,
    Arithmetic,
    String,
}

impl OperatorFamily {
    pub fn for_type(datatype: &DataType) -> Option<Self> {
        if datatype.is_bool() {
            Some(Self::Boolean)
        } else if datatype.is_date_family() {
            Some(Self::Date)
        } else if datatype.is_numeric() {
            Some(Self::Arithmetic)
        } else if datatype.is_string() {
            Some(Self::String)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct RuntimeLibrary {
    arithmetic: IndexMap<Opcode, &'static str>,
    date: IndexMap<Opcode, &'static str>,
    string: IndexMap<Opcode, &'static str>,
    boolean: IndexMap<Opcode, &'static str>,
}

impl RuntimeLibrary {
    fn new() -> Self {
        let arithmetic = IndexMap::from([
            (Opcode::Eq, "eq"),
            (Opcode::Neq, "neq"),
            (Opcode::Lt, "lt"),
            (Opcode::Gt, "gt"),
            (Opcode::Lte, "lte"),
            (Opcode::Gte, "gte"),
            (Opcode::Add, "plus"),
            (Opcode::Sub, "minus"),
            (Opcode::Mod, "modulo"),
            (Opcode::Mul, "times"),
            (Opcode::Div, "div"),
            (Opcode::Shr, "shiftr"),
            (Opcode::Shl, "shiftl"),
            (Opcode::BwAnd, "band"),
            (Opcode::BwOr, "bor"),
            (Opcode::Xor, "bxor"),
            (Opcode::Min, "min"),
            (Opcode::Max, "max"),
            (Opcode::IsDistinct, "is_distinct"),
            (Opcode::MulWeight, "mul_by_ref"),
        ]);

        let date = IndexMap::from([
            (Opcode::Add, "plus"),
            (Opcode::Sub, "minus"),
            (Opcode::Mul, "times"),
            (Opcode::Eq, "eq"),
            (Opcode::Neq, "neq"),
            (Opcode::Lt, "lt"),
            (Opcode::Gt, "gt"),
            (Opcode::Lte, "lte"),
            (Opcode::Gte, "gte"),
        ]);

        let string = IndexMap::from([
            (Opcode::Concat, "concat"),
            (Opcode::Eq, "eq"),
            (Opcode::Neq, "neq"),
            (Opcode::Lt, "lt"),
            (Opcode::Gt, "gt"),
            (Opcode::Lte, "lte"),
            (Opcode::Gte, "gte"),
        ]);

        let boolean = IndexMap::from([
            (Opcode::Eq, "eq"),
            (Opcode::Neq, "neq"),
            (Opcode::And, "and"),
            (Opcode::Or, "or"),
            (Opcode::Min, "min"),
            (Opcode::Max, "max"),
            (Opcode::IsFalse, "is_false"),
            (Opcode::IsNotTrue, "is_not_true"),
            (Opcode::IsTrue, "is_true"),
            (Opcode::IsNotFalse, "is_not_false"),
            (Opcode::AggMin, "agg_min"),
            (Opcode::AggMax, "agg_max"),
        ]);

        RuntimeLibrary {
            arithmetic,
            date,
            string,
            boolean,
        }
    }

    fn table(&self, family: OperatorFamily) -> &IndexMap<Opcode, &'static str> {
        match family {
            OperatorFamily::Boolean => &self.boolean,
            OperatorFamily::Date => &self.date,
            OperatorFamily::Arithmetic => &self.arithmetic,
            OperatorFamily::String => &self.string,
        }
    }

    /// Find the runtime function implementing `op` for the given operand
    /// types.
    ///
    /// `expected_return` is the type the planner expects for the result. It
    /// is only consulted when subtracting dates or timestamps, where the
    /// interval kind of the result cannot be derived from the operands.
    pub fn get_implementation(
        &self,
        op: Opcode,
        expected_return: Option<&DataType>,
        left: &DataType,
        right: Option<&DataType>,
    ) -> Result<FunctionDescription> {
        if left.is_any() || right.is_some_and(|r| r.is_any()) {
            return Err(CompilerError::internal(format!(
                "Unexpected type _ for operand of {op}"
            ))
            .with_field("left", left));
        }

        let any_null = left.may_be_null() || right.is_some_and(|r| r.may_be_null());
        let mut return_type = left.set_may_be_null(any_null);
        let mut return_suffix = String::new();

        let family = OperatorFamily::for_type(left);
        if family == Some(OperatorFamily::Date)
            && op == Opcode::Sub
            && matches!(left.kind(), TypeKind::Timestamp | TypeKind::Date)
        {
            let expected = expected_return.ok_or_else(|| {
                CompilerError::internal("Date subtraction requires an expected result type")
            })?;
            return_type = expected.clone();
            return_suffix = format!("_{}", expected.base_type_with_suffix()?);
        }

        if op.is_comparison() {
            return_type = DataType::BOOL.set_may_be_null(any_null);
        }
        if op == Opcode::Div {
            // Division by zero produces NULL.
            return_type = return_type.nullable();
        }
        if op.is_truth_test() || op == Opcode::IsDistinct {
            return_type = DataType::BOOL;
        }

        let (left_name, right_name) = if op.is_aggregate() || op == Opcode::IsDistinct {
            ("", "")
        } else {
            let right_name = match right {
                Some(right) => right.short_name()?,
                None => "",
            };
            (left.short_name()?, right_name)
        };
        let left_suffix = left.nullable_suffix();
        let right_suffix = right.map(|r| r.nullable_suffix()).unwrap_or("");

        let family = family.ok_or_else(|| {
            CompilerError::unimplemented(format!("No runtime functions for operator {op}"))
                .with_field("left", left)
        })?;
        let mnemonic = self.table(family).get(&op).ok_or_else(|| {
            CompilerError::unimplemented(format!("Could not find `{op}` for type {left}"))
        })?;

        let function = format!(
            "{mnemonic}_{left_name}{left_suffix}_{right_name}{right_suffix}{return_suffix}"
        );
        trace!(%function, %return_type, "selected runtime function");

        Ok(FunctionDescription {
            function,
            return_type,
        })
    }
}
