use harness::{parse_table, parse_value};
use rust_decimal::Decimal;
use sqlflow_core::config::LoweringConfig;
use sqlflow_core::expr::Expression;
use sqlflow_core::lower::ExpressionLowerer;
use sqlflow_core::rex::rel_type::{RelDataType, SqlTypeName};
use sqlflow_core::rex::{RexLiteralValue, RexNode};
use sqlflow_core::types::DataType;

fn lower(value: RexLiteralValue, datatype: RelDataType) -> Expression {
    ExpressionLowerer::without_row(LoweringConfig::default())
        .compile(&RexNode::literal(value, datatype))
        .unwrap()
}

/// A printed cell and the planner literal it came from agree.
fn assert_same_constant(cell: &str, value: RexLiteralValue, datatype: RelDataType) {
    let lowered = lower(value, datatype);
    let parsed = parse_value(cell, &lowered.datatype()).unwrap();
    assert_eq!(
        lowered.as_literal().unwrap(),
        parsed.as_literal().unwrap(),
        "cell '{cell}'"
    );
}

#[test]
fn printed_cells_match_lowered_literals() {
    assert_same_constant(
        " 42",
        RexLiteralValue::Exact(Decimal::from(42)),
        RelDataType::new(SqlTypeName::Integer, false),
    );
    assert_same_constant(
        " abc",
        RexLiteralValue::CharString("abc".to_string()),
        RelDataType::char(SqlTypeName::Varchar, None, false),
    );
    assert_same_constant(
        " Thu Jan 01 00:00:01.5 1970",
        RexLiteralValue::Timestamp("1970-01-01 00:00:01.5".to_string()),
        RelDataType::new(SqlTypeName::Timestamp, false),
    );
    assert_same_constant(
        " 02-29-2024",
        RexLiteralValue::Date("2024-02-29".to_string()),
        RelDataType::new(SqlTypeName::Date, false),
    );
    assert_same_constant(
        " t",
        RexLiteralValue::Bool(true),
        RelDataType::new(SqlTypeName::Boolean, false),
    );
}

#[test]
fn table_rows_have_the_row_type() {
    let row_type = DataType::tuple([DataType::INT64, DataType::BOOL.nullable()], false);
    let rows = parse_table(
        r#"
 n | flag
---+------
 1 | t
 2 |
(2 rows)
"#,
        &row_type,
    )
    .unwrap();
    assert_eq!(2, rows.len());
    for row in &rows {
        assert_eq!(row_type, row.datatype());
    }
}
