//! Range sets used by `SEARCH` and their expansion into plain comparisons.
use std::fmt;

use sqlflow_error::{CompilerError, Result};

use super::rel_type::{RelDataType, SqlTypeName};
use super::{RexCall, RexLiteral, RexLiteralValue, RexNode, SqlKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Unbounded,
    Inclusive(RexLiteral),
    Exclusive(RexLiteral),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub lower: Bound,
    pub upper: Bound,
}

impl Range {
    pub fn point(value: RexLiteral) -> Self {
        Range {
            lower: Bound::Inclusive(value.clone()),
            upper: Bound::Inclusive(value),
        }
    }

    pub fn all() -> Self {
        Range {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Value of a single point range.
    pub fn as_point(&self) -> Option<&RexLiteral> {
        match (&self.lower, &self.upper) {
            (Bound::Inclusive(lo), Bound::Inclusive(hi)) if lo.value == hi.value => Some(lo),
            _ => None,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(point) = self.as_point() {
            return write!(f, "{point}");
        }
        match &self.lower {
            Bound::Unbounded => write!(f, "(-\u{221e}")?,
            Bound::Inclusive(v) => write!(f, "[{v}")?,
            Bound::Exclusive(v) => write!(f, "({v}")?,
        }
        write!(f, "..")?;
        match &self.upper {
            Bound::Unbounded => write!(f, "+\u{221e})"),
            Bound::Inclusive(v) => write!(f, "{v}]"),
            Bound::Exclusive(v) => write!(f, "{v})"),
        }
    }
}

/// How NULL values of the searched expression are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullAs {
    /// NULL input gives a NULL result.
    #[default]
    Unknown,
    True,
    False,
}

/// A search argument: a union of disjoint ranges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sarg {
    pub ranges: Vec<Range>,
    pub null_as: NullAs,
}

impl Sarg {
    pub fn new(ranges: impl IntoIterator<Item = Range>, null_as: NullAs) -> Self {
        Sarg {
            ranges: ranges.into_iter().collect(),
            null_as,
        }
    }
}

impl fmt::Display for Sarg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sarg[")?;
        for (idx, range) in self.ranges.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{range}")?;
        }
        write!(f, "]")?;
        match self.null_as {
            NullAs::Unknown => Ok(()),
            NullAs::True => write!(f, " NULL AS TRUE"),
            NullAs::False => write!(f, " NULL AS FALSE"),
        }
    }
}

/// Rewrite `SEARCH(x, sarg)` into comparisons on `x`.
pub fn expand_search(call: &RexCall) -> Result<RexNode> {
    if call.kind != SqlKind::Search || call.operands.len() != 2 {
        return Err(CompilerError::internal("Expected a SEARCH call with 2 operands")
            .with_node(call));
    }
    let x = &call.operands[0];
    let sarg = match &call.operands[1] {
        RexNode::Literal(RexLiteral {
            value: RexLiteralValue::Sarg(sarg),
            ..
        }) => sarg,
        other => {
            return Err(CompilerError::internal("Second operand of SEARCH must be a Sarg")
                .with_node(other));
        }
    };

    let x_nullable = x.datatype().nullable;
    let boolean = |nullable: bool| RelDataType::new(SqlTypeName::Boolean, nullable);
    let compare = |kind: SqlKind, value: &RexLiteral| {
        let nullable = x_nullable || value.datatype.nullable;
        RexNode::call(
            kind,
            boolean(nullable),
            [x.clone(), RexNode::Literal(value.clone())],
        )
    };

    let mut disjuncts = Vec::with_capacity(sarg.ranges.len());
    for range in &sarg.ranges {
        if range.is_all() {
            disjuncts.push(RexNode::call(SqlKind::IsNotNull, boolean(false), [x.clone()]));
            continue;
        }
        if let Some(point) = range.as_point() {
            disjuncts.push(compare(SqlKind::Equals, point));
            continue;
        }

        let mut conjuncts = Vec::with_capacity(2);
        match &range.lower {
            Bound::Unbounded => (),
            Bound::Inclusive(v) => conjuncts.push(compare(SqlKind::GreaterThanOrEqual, v)),
            Bound::Exclusive(v) => conjuncts.push(compare(SqlKind::GreaterThan, v)),
        }
        match &range.upper {
            Bound::Unbounded => (),
            Bound::Inclusive(v) => conjuncts.push(compare(SqlKind::LessThanOrEqual, v)),
            Bound::Exclusive(v) => conjuncts.push(compare(SqlKind::LessThan, v)),
        }
        disjuncts.push(combine(SqlKind::And, conjuncts));
    }

    let expanded = if disjuncts.is_empty() {
        RexNode::literal(RexLiteralValue::Bool(false), boolean(false))
    } else {
        combine(SqlKind::Or, disjuncts)
    };

    Ok(match sarg.null_as {
        NullAs::Unknown => expanded,
        // Both forms are never NULL.
        NullAs::True => RexNode::call(
            SqlKind::Or,
            boolean(false),
            [RexNode::call(SqlKind::IsNull, boolean(false), [x.clone()]), expanded],
        ),
        NullAs::False => RexNode::call(
            SqlKind::And,
            boolean(false),
            [RexNode::call(SqlKind::IsNotNull, boolean(false), [x.clone()]), expanded],
        ),
    })
}

/// Join boolean nodes with AND or OR. A single node is returned as is.
fn combine(kind: SqlKind, nodes: impl IntoIterator<Item = RexNode>) -> RexNode {
    let mut nodes: Vec<_> = nodes.into_iter().collect();
    if nodes.len() == 1 {
        return nodes.remove(0);
    }
    let nullable = nodes.iter().any(|n| n.datatype().nullable);
    RexNode::call(
        kind,
        RelDataType::new(SqlTypeName::Boolean, nullable),
        nodes,
    )
}
