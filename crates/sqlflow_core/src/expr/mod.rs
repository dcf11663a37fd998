//! Typed expression IR produced by lowering.
pub mod apply_expr;
pub mod binary_expr;
pub mod cast_expr;
pub mod clone_expr;
pub mod field_expr;
pub mod if_expr;
pub mod is_null_expr;
pub mod literal_expr;
pub mod opcode;
pub mod tuple_expr;
pub mod unary_expr;
pub mod variable_expr;

use std::fmt;
use std::sync::Arc;

use apply_expr::ApplyExpr;
use binary_expr::BinaryExpr;
use cast_expr::CastExpr;
use clone_expr::CloneExpr;
use field_expr::FieldExpr;
use if_expr::IfExpr;
use is_null_expr::IsNullExpr;
use literal_expr::LiteralExpr;
use opcode::Opcode;
use sqlflow_error::Result;
use tuple_expr::{TupleExpr, VecExpr};
use unary_expr::UnaryExpr;
use variable_expr::VariableExpr;

use crate::literal::Literal;
use crate::types::DataType;

/// Description of the planner node an IR node was produced from.
///
/// Opaque to the IR and ignored by structural equality.
#[derive(Debug, Clone, Default)]
pub struct SourceNode(Option<Arc<str>>);

impl SourceNode {
    pub fn new(description: impl fmt::Display) -> Self {
        SourceNode(Some(description.to_string().into()))
    }

    pub const fn none() -> Self {
        SourceNode(None)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for SourceNode {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Display for SourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(desc) => write!(f, "{desc}"),
            None => write!(f, "<unknown>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Field(FieldExpr),
    Literal(LiteralExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Cast(CastExpr),
    If(IfExpr),
    Apply(ApplyExpr),
    Variable(VariableExpr),
    Tuple(TupleExpr),
    Vec(VecExpr),
    IsNull(IsNullExpr),
    Clone(CloneExpr),
}

impl Expression {
    /// Result type of this expression.
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Field(expr) => expr.datatype.clone(),
            Self::Literal(expr) => expr.literal.datatype().clone(),
            Self::Binary(expr) => expr.datatype.clone(),
            Self::Unary(expr) => expr.datatype.clone(),
            Self::Cast(expr) => expr.to.clone(),
            Self::If(expr) => expr.then.datatype(),
            Self::Apply(expr) => expr.datatype.clone(),
            Self::Variable(expr) => expr.datatype.clone(),
            Self::Tuple(expr) => expr.datatype(),
            Self::Vec(expr) => expr.datatype(),
            Self::IsNull(_) => DataType::BOOL,
            Self::Clone(expr) => expr.expr.datatype(),
        }
    }

    pub fn node(&self) -> &SourceNode {
        match self {
            Self::Field(expr) => &expr.node,
            Self::Literal(expr) => &expr.node,
            Self::Binary(expr) => &expr.node,
            Self::Unary(expr) => &expr.node,
            Self::Cast(expr) => &expr.node,
            Self::If(expr) => &expr.node,
            Self::Apply(expr) => &expr.node,
            Self::Variable(expr) => &expr.node,
            Self::Tuple(expr) => &expr.node,
            Self::Vec(expr) => &expr.node,
            Self::IsNull(expr) => &expr.node,
            Self::Clone(expr) => &expr.node,
        }
    }

    /// Set the source node of this expression (not of its children).
    pub fn with_node(mut self, node: SourceNode) -> Self {
        let slot = match &mut self {
            Self::Field(expr) => &mut expr.node,
            Self::Literal(expr) => &mut expr.node,
            Self::Binary(expr) => &mut expr.node,
            Self::Unary(expr) => &mut expr.node,
            Self::Cast(expr) => &mut expr.node,
            Self::If(expr) => &mut expr.node,
            Self::Apply(expr) => &mut expr.node,
            Self::Variable(expr) => &mut expr.node,
            Self::Tuple(expr) => &mut expr.node,
            Self::Vec(expr) => &mut expr.node,
            Self::IsNull(expr) => &mut expr.node,
            Self::Clone(expr) => &mut expr.node,
        };
        *slot = node;
        self
    }

    /// Wrap this expression in a cast to `to`.
    ///
    /// The cast is always inserted, even if the expression already has the
    /// target type.
    pub fn cast(self, to: DataType) -> Expression {
        Expression::Cast(CastExpr::new(self, to))
    }

    /// Cast only if the type differs from `to`.
    pub fn cast_if_needed(self, to: &DataType) -> Expression {
        if self.datatype().same_type(to) {
            self
        } else {
            self.cast(to.clone())
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(expr) => Some(&expr.literal),
            _ => None,
        }
    }

    /// Wrap a field reference in a clone if its type cannot be copied.
    pub fn apply_clone_if_needed(self) -> Expression {
        if self.datatype().has_copy() {
            self
        } else {
            Expression::Clone(CloneExpr::new(self))
        }
    }

    /// Visit every direct child of this expression.
    pub fn for_each_child<'a, F>(&'a self, func: &mut F) -> Result<()>
    where
        F: FnMut(&'a Expression) -> Result<()>,
    {
        match self {
            Self::Literal(_) | Self::Variable(_) => (),
            Self::Field(expr) => func(&expr.row)?,
            Self::Binary(expr) => {
                func(&expr.left)?;
                func(&expr.right)?;
            }
            Self::Unary(expr) => func(&expr.expr)?,
            Self::Cast(expr) => func(&expr.expr)?,
            Self::If(expr) => {
                func(&expr.condition)?;
                func(&expr.then)?;
                func(&expr.else_expr)?;
            }
            Self::Apply(expr) => {
                for arg in &expr.args {
                    func(arg)?;
                }
            }
            Self::Tuple(expr) => {
                for field in &expr.fields {
                    func(field)?;
                }
            }
            Self::Vec(expr) => {
                for elem in &expr.elements {
                    func(elem)?;
                }
            }
            Self::IsNull(expr) => func(&expr.expr)?,
            Self::Clone(expr) => func(&expr.expr)?,
        }
        Ok(())
    }

    /// Mutably visit every direct child of this expression.
    ///
    /// Callers must not change the types of children.
    pub fn for_each_child_mut<F>(&mut self, func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Expression) -> Result<()>,
    {
        match self {
            Self::Literal(_) | Self::Variable(_) => (),
            Self::Field(expr) => func(&mut expr.row)?,
            Self::Binary(expr) => {
                func(&mut expr.left)?;
                func(&mut expr.right)?;
            }
            Self::Unary(expr) => func(&mut expr.expr)?,
            Self::Cast(expr) => func(&mut expr.expr)?,
            Self::If(expr) => {
                func(&mut expr.condition)?;
                func(&mut expr.then)?;
                func(&mut expr.else_expr)?;
            }
            Self::Apply(expr) => {
                for arg in &mut expr.args {
                    func(arg)?;
                }
            }
            Self::Tuple(expr) => {
                for field in &mut expr.fields {
                    func(field)?;
                }
            }
            Self::Vec(expr) => {
                for elem in &mut expr.elements {
                    func(elem)?;
                }
            }
            Self::IsNull(expr) => func(&mut expr.expr)?,
            Self::Clone(expr) => func(&mut expr.expr)?,
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(expr) => fmt::Display::fmt(expr, f),
            Self::Literal(expr) => fmt::Display::fmt(expr, f),
            Self::Binary(expr) => fmt::Display::fmt(expr, f),
            Self::Unary(expr) => fmt::Display::fmt(expr, f),
            Self::Cast(expr) => fmt::Display::fmt(expr, f),
            Self::If(expr) => fmt::Display::fmt(expr, f),
            Self::Apply(expr) => fmt::Display::fmt(expr, f),
            Self::Variable(expr) => fmt::Display::fmt(expr, f),
            Self::Tuple(expr) => fmt::Display::fmt(expr, f),
            Self::Vec(expr) => fmt::Display::fmt(expr, f),
            Self::IsNull(expr) => fmt::Display::fmt(expr, f),
            Self::Clone(expr) => fmt::Display::fmt(expr, f),
        }
    }
}

macro_rules! impl_from_expr {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(expr: $ty) -> Self {
                    Expression::$variant(expr)
                }
            }
        )*
    };
}

impl_from_expr!(
    Field => FieldExpr,
    Literal => LiteralExpr,
    Binary => BinaryExpr,
    Unary => UnaryExpr,
    Cast => CastExpr,
    If => IfExpr,
    Apply => ApplyExpr,
    Variable => VariableExpr,
    Tuple => TupleExpr,
    Vec => VecExpr,
    IsNull => IsNullExpr,
    Clone => CloneExpr,
);

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(LiteralExpr::new(literal))
    }
}

pub fn lit(literal: impl Into<Literal>) -> Expression {
    Expression::from(literal.into())
}

pub fn var(name: impl Into<String>, datatype: DataType) -> Expression {
    Expression::Variable(VariableExpr::new(name, datatype))
}

pub fn cast(expr: impl Into<Expression>, to: DataType) -> Expression {
    expr.into().cast(to)
}

pub fn field(row: impl Into<Expression>, index: usize) -> Result<Expression> {
    Ok(FieldExpr::try_new(row, index)?.into())
}

pub fn binary(
    op: Opcode,
    left: impl Into<Expression>,
    right: impl Into<Expression>,
    datatype: DataType,
) -> Expression {
    BinaryExpr::new(op, left, right, datatype).into()
}

pub fn unary(op: Opcode, expr: impl Into<Expression>) -> Result<Expression> {
    Ok(UnaryExpr::try_new(op, expr)?.into())
}

pub fn if_then_else(
    condition: impl Into<Expression>,
    then: impl Into<Expression>,
    else_expr: impl Into<Expression>,
) -> Result<Expression> {
    Ok(IfExpr::try_new(condition, then, else_expr)?.into())
}

pub fn apply(
    function: impl Into<String>,
    args: impl IntoIterator<Item = Expression>,
    datatype: DataType,
) -> Expression {
    ApplyExpr::new(function, args, datatype).into()
}

pub fn tuple(fields: impl IntoIterator<Item = Expression>) -> Expression {
    TupleExpr::new(fields).into()
}

pub fn vec(elements: impl IntoIterator<Item = Expression>, element_type: DataType) -> Result<Expression> {
    Ok(VecExpr::try_new(elements, element_type)?.into())
}

pub fn is_null(expr: impl Into<Expression>) -> Expression {
    IsNullExpr::new(expr).into()
}

/// Turn a nullable boolean into a non-nullable one. Non-nullable
/// expressions are returned unchanged.
pub fn wrap_bool_if_needed(expr: Expression) -> Result<Expression> {
    if expr.datatype().may_be_null() {
        unary(Opcode::WrapBool, expr)
    } else {
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_node_ignored_by_equality() {
        let a = lit(1_i32).with_node(SourceNode::new("1"));
        let b = lit(1_i32);
        assert_eq!(a, b);
        assert_eq!(Some("1"), a.node().description());
        assert_eq!(None, b.node().description());
    }

    #[test]
    fn cast_always_wraps() {
        let e = lit(1_i32).cast(DataType::INT32);
        assert!(matches!(e, Expression::Cast(_)));
        assert_eq!(DataType::INT32, e.datatype());

        let e = lit(1_i32).cast_if_needed(&DataType::INT32);
        assert!(e.is_literal());
    }

    #[test]
    fn clone_only_non_copy() {
        let row = var(
            "t",
            DataType::reference(DataType::tuple([DataType::INT32, DataType::STRING], false)),
        );
        let f0 = field(row.clone(), 0).unwrap().apply_clone_if_needed();
        assert!(matches!(f0, Expression::Field(_)));
        let f1 = field(row, 1).unwrap().apply_clone_if_needed();
        assert!(matches!(f1, Expression::Clone(_)));
        assert_eq!(DataType::STRING, f1.datatype());
    }

    #[test]
    fn children_in_order() {
        let e = if_then_else(lit(true), lit(1_i64), lit(2_i64)).unwrap();
        let mut seen = Vec::new();
        e.for_each_child(&mut |child| {
            seen.push(child.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(vec!["true", "1", "2"], seen);
    }

    #[test]
    fn rewrite_children() {
        let mut e = apply("abs_i32", [lit(1_i32), lit(2_i32)], DataType::INT32);
        e.for_each_child_mut(&mut |child| {
            *child = lit(7_i32);
            Ok(())
        })
        .unwrap();
        assert_eq!(apply("abs_i32", [lit(7_i32), lit(7_i32)], DataType::INT32), e);
    }

    #[test]
    fn wrap_bool_only_nullable() {
        let e = wrap_bool_if_needed(lit(true)).unwrap();
        assert!(e.is_literal());

        let nullable = var("b", DataType::BOOL.nullable());
        let e = wrap_bool_if_needed(nullable).unwrap();
        assert_eq!(DataType::BOOL, e.datatype());
        assert_eq!("wrap_bool(b)", e.to_string());
    }
}
