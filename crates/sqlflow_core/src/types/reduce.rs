//! Binary numeric promotion.
use sqlflow_error::{CompilerError, Result};

use super::{DataType, IntegerType, TypeKind};

/// Compute the type both operands of a binary operation must be cast to.
///
/// Nullability of the inputs is ignored and the result is non-nullable,
/// except when one side is the null type, in which case the other type is
/// returned as nullable.
pub fn reduce_type(left: &DataType, right: &DataType) -> Result<DataType> {
    if left.is_null() {
        return Ok(right.nullable());
    }
    if right.is_null() {
        return Ok(left.nullable());
    }

    let left = left.set_may_be_null(false);
    let right = right.set_may_be_null(false);
    if left.same_type(&right) {
        return Ok(left);
    }

    match (left.kind(), right.kind()) {
        (TypeKind::Integer(l), TypeKind::Integer(r)) => {
            let width = l.width.max(r.width);
            Ok(DataType::integer(IntegerType::try_new(width, true)?, false))
        }
        (TypeKind::Integer(_), TypeKind::Decimal(_)) => Ok(right),
        (TypeKind::Integer(_), _) if right.fp_width().is_some() => Ok(right),
        (TypeKind::Decimal(_), TypeKind::Integer(_) | TypeKind::Decimal(_)) => Ok(left),
        (TypeKind::Decimal(_), _) if right.fp_width().is_some() => Ok(right),
        _ => match (left.fp_width(), right.fp_width()) {
            (Some(_), None) if right.is_integer() || matches!(right.kind(), TypeKind::Decimal(_)) => {
                Ok(left)
            }
            (Some(lw), Some(rw)) => Ok(if lw < rw { right } else { left }),
            _ => Err(CompilerError::unimplemented(format!(
                "Cast from {right} to {left}"
            ))),
        },
    }
}

/// If the operands of a binary operation must be cast to a common type
/// before the operation is dispatched.
///
/// Dates mix directly with intervals and strings of different lengths and
/// charsets mix with each other.
pub fn need_common_type(_result: &DataType, left: &DataType, right: &DataType) -> bool {
    if left.is_date_family() || right.is_date_family() {
        return false;
    }
    !(left.is_string() && right.is_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Charset;

    fn numeric_types() -> Vec<DataType> {
        vec![
            DataType::INT8,
            DataType::INT16,
            DataType::INT32,
            DataType::INT64,
            DataType::UINT16,
            DataType::UINT32,
            DataType::UINT64,
            DataType::FLOAT,
            DataType::DOUBLE,
            DataType::decimal(10, 2, false),
        ]
    }

    #[test]
    fn integer_widening() {
        assert_eq!(DataType::INT32, reduce_type(&DataType::INT16, &DataType::INT32).unwrap());
        assert_eq!(DataType::INT64, reduce_type(&DataType::INT64, &DataType::INT32).unwrap());
        assert_eq!(DataType::INT64, reduce_type(&DataType::UINT64, &DataType::INT8).unwrap());
        assert_eq!(
            DataType::INT32,
            reduce_type(&DataType::INT16.nullable(), &DataType::INT32.nullable()).unwrap()
        );
    }

    #[test]
    fn float_dominates() {
        assert_eq!(DataType::FLOAT, reduce_type(&DataType::INT64, &DataType::FLOAT).unwrap());
        assert_eq!(DataType::DOUBLE, reduce_type(&DataType::DOUBLE, &DataType::INT8).unwrap());
        let dec = DataType::decimal(10, 2, false);
        assert_eq!(DataType::DOUBLE, reduce_type(&dec, &DataType::DOUBLE).unwrap());
        assert_eq!(DataType::FLOAT, reduce_type(&DataType::FLOAT, &dec).unwrap());
        assert_eq!(DataType::DOUBLE, reduce_type(&DataType::FLOAT, &DataType::DOUBLE).unwrap());
        assert_eq!(DataType::DOUBLE, reduce_type(&DataType::DOUBLE, &DataType::FLOAT).unwrap());
    }

    #[test]
    fn decimal_wins_over_integers() {
        let dec = DataType::decimal(10, 2, false);
        assert_eq!(dec, reduce_type(&dec, &DataType::INT32).unwrap());
        assert_eq!(dec, reduce_type(&DataType::INT32, &dec.nullable()).unwrap());
        let other = DataType::decimal(5, 1, false);
        assert_eq!(dec, reduce_type(&dec, &other).unwrap());
    }

    #[test]
    fn null_makes_other_nullable() {
        assert_eq!(
            DataType::INT32.nullable(),
            reduce_type(&DataType::NULL, &DataType::INT32).unwrap()
        );
        assert_eq!(
            DataType::STRING.nullable(),
            reduce_type(&DataType::STRING, &DataType::NULL).unwrap()
        );
        assert!(reduce_type(&DataType::NULL, &DataType::NULL).unwrap().is_null());
    }

    #[test]
    fn unimplemented_combinations() {
        let err = reduce_type(&DataType::BOOL, &DataType::INT32).unwrap_err();
        assert!(err.is_unimplemented());
        assert_eq!("Cast from i32 to b", err.message());
        assert!(reduce_type(&DataType::STRING, &DataType::DOUBLE).is_err());
    }

    #[test]
    fn reduction_is_associative() {
        let types = numeric_types();
        for a in &types {
            for b in &types {
                for c in &types {
                    let left = reduce_type(&reduce_type(a, b).unwrap(), c).unwrap();
                    let right = reduce_type(a, &reduce_type(b, c).unwrap()).unwrap();
                    assert_eq!(
                        std::mem::discriminant(left.kind()),
                        std::mem::discriminant(right.kind()),
                        "{a} {b} {c}"
                    );
                }
            }
        }
    }

    #[test]
    fn common_type_needed() {
        assert!(need_common_type(&DataType::INT32, &DataType::INT32, &DataType::INT64));
        assert!(!need_common_type(
            &DataType::TIMESTAMP,
            &DataType::TIMESTAMP,
            &DataType::MILLIS_INTERVAL
        ));
        assert!(!need_common_type(
            &DataType::DATE,
            &DataType::INT32,
            &DataType::DATE
        ));
        assert!(!need_common_type(
            &DataType::STRING,
            &DataType::string(Some(3), Charset::Latin1, false),
            &DataType::STRING.nullable()
        ));
        assert!(need_common_type(&DataType::STRING, &DataType::STRING, &DataType::INT32));
    }
}
