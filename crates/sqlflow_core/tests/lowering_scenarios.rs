use rust_decimal::Decimal;
use sqlflow_core::config::{CompilerConfig, LoweringConfig};
use sqlflow_core::expr::opcode::Opcode;
use sqlflow_core::expr::variable_expr::VariableExpr;
use sqlflow_core::expr::{self, Expression};
use sqlflow_core::literal::Literal;
use sqlflow_core::lower::ExpressionLowerer;
use sqlflow_core::rex::rel_type::{IntervalQualifier, RelDataType, SqlTypeName};
use sqlflow_core::rex::sarg::{Bound, NullAs, Range, Sarg};
use sqlflow_core::rex::{RexLiteral, RexLiteralValue, RexNode, SqlKind};
use sqlflow_core::runtime::INSTANCE;
use sqlflow_core::types::{Charset, DataType};

fn int(nullable: bool) -> RelDataType {
    RelDataType::new(SqlTypeName::Integer, nullable)
}

fn boolean(nullable: bool) -> RelDataType {
    RelDataType::new(SqlTypeName::Boolean, nullable)
}

fn varchar(nullable: bool) -> RelDataType {
    RelDataType::char(SqlTypeName::Varchar, None, nullable)
}

fn int_lit(v: i64) -> RexNode {
    RexNode::literal(RexLiteralValue::Exact(Decimal::from(v)), int(false))
}

fn row_var(fields: impl IntoIterator<Item = DataType>) -> VariableExpr {
    VariableExpr::new("t", DataType::reference(DataType::tuple(fields, false)))
}

fn lowerer(fields: impl IntoIterator<Item = DataType>) -> ExpressionLowerer {
    logutil::init_test();
    ExpressionLowerer::try_new(Some(row_var(fields)), Vec::new(), LoweringConfig::default())
        .unwrap()
}

/// Runtime symbol of the binary operation under the outermost cast.
fn dispatched_function(e: &Expression) -> String {
    let cast = match e {
        Expression::Cast(cast) => cast,
        other => panic!("expected a cast, got {other}"),
    };
    match cast.expr.as_ref() {
        Expression::Binary(binary) => {
            INSTANCE
                .get_implementation(
                    binary.op,
                    Some(&cast.to),
                    &binary.left.datatype(),
                    Some(&binary.right.datatype()),
                )
                .unwrap()
                .function
        }
        other => panic!("expected a binary operation, got {other}"),
    }
}

#[test]
fn integer_addition_with_nullability() {
    let lowerer = lowerer([DataType::INT32.nullable()]);
    let call = RexNode::call(
        SqlKind::Plus,
        int(true),
        [RexNode::input_ref(0, int(true)), int_lit(1)],
    );
    let e = lowerer.compile(&call).unwrap();

    let row = Expression::Variable(row_var([DataType::INT32.nullable()]));
    let expected = expr::cast(
        expr::binary(
            Opcode::Add,
            expr::field(row, 0).unwrap(),
            expr::lit(1_i32).cast(DataType::INT32.nullable()),
            DataType::INT32.nullable(),
        ),
        DataType::INT32.nullable(),
    );
    assert_eq!(expected, e);
    assert_eq!("plus_i32N_i32N", dispatched_function(&e));
    assert_eq!(Some("+($0, 1)"), e.node().description());
}

#[test]
fn division_by_constant_is_nullable() {
    let lowerer = lowerer([DataType::INT32]);
    let call = RexNode::call(SqlKind::Divide, int(false), [int_lit(10), int_lit(3)]);
    let e = lowerer.compile(&call).unwrap();

    assert_eq!(DataType::INT32.nullable(), e.datatype());
    assert_eq!("div_i32_i32", dispatched_function(&e));
    assert_eq!("CAST((10 / 3) AS i32?)", e.to_string());
}

#[test]
fn timestamp_subtraction() {
    let lowerer = lowerer([DataType::INT32]);
    let ts = |s: &str| {
        RexNode::literal(
            RexLiteralValue::Timestamp(s.to_string()),
            RelDataType::new(SqlTypeName::Timestamp, false),
        )
    };
    let call = RexNode::call(
        SqlKind::Minus,
        RelDataType::interval(IntervalQualifier::DaySecond, false),
        [ts("2024-03-01 12:00:00"), ts("2024-02-28 00:00:00.5")],
    );
    let e = lowerer.compile(&call).unwrap();

    assert_eq!(DataType::MILLIS_INTERVAL, e.datatype());
    assert_eq!("minus_Timestamp_Timestamp_interval_ms", dispatched_function(&e));
}

#[test]
fn searched_case_with_nullable_branch() {
    let fields = [
        DataType::BOOL.nullable(),
        DataType::INT32,
        DataType::BOOL.nullable(),
        DataType::INT32.nullable(),
        DataType::INT32,
    ];
    let lowerer = lowerer(fields.clone());
    let call = RexNode::call(
        SqlKind::Case,
        int(true),
        [
            RexNode::input_ref(0, boolean(true)),
            RexNode::input_ref(1, int(false)),
            RexNode::input_ref(2, boolean(true)),
            RexNode::input_ref(3, int(true)),
            RexNode::input_ref(4, int(false)),
        ],
    );
    let e = lowerer.compile(&call).unwrap();

    let row = Expression::Variable(row_var(fields));
    let field = |idx| expr::field(row.clone(), idx).unwrap();
    let wrap = |e: Expression| expr::unary(Opcode::WrapBool, e).unwrap();
    let nullable_int = DataType::INT32.nullable();
    let expected = expr::if_then_else(
        wrap(field(0)),
        field(1).cast(nullable_int.clone()),
        expr::if_then_else(wrap(field(2)), field(3), field(4).cast(nullable_int.clone())).unwrap(),
    )
    .unwrap();

    assert_eq!(expected, e);
    assert_eq!(nullable_int, e.datatype());
}

#[test]
fn switched_case() {
    let lowerer = lowerer([
        DataType::INT32,
        DataType::string(None, Charset::Latin1, true),
    ]);
    let call = RexNode::call(
        SqlKind::Case,
        varchar(true),
        [
            RexNode::input_ref(0, int(false)),
            int_lit(1),
            RexNode::input_ref(1, varchar(true)),
            RexNode::literal(RexLiteralValue::Null, varchar(true)),
        ],
    );
    let e = lowerer.compile(&call).unwrap();
    assert_eq!(DataType::string(None, Charset::Latin1, true), e.datatype());
    assert_eq!(
        "if CAST((t.0 == 1) AS b) { t.1.clone() } else { NULL::s? }",
        e.to_string()
    );
}

#[test]
fn is_null_on_non_nullable_folds() {
    let lowerer = lowerer([DataType::INT32]);
    let call = RexNode::call(
        SqlKind::IsNull,
        boolean(false),
        [RexNode::input_ref(0, int(false))],
    );
    let e = lowerer.compile(&call).unwrap();
    assert_eq!(Some(&Literal::bool(false)), e.as_literal());
}

#[test]
fn string_concat_with_mixed_nullability() {
    let lowerer = lowerer([DataType::STRING.nullable()]);
    let call = RexNode::Call(sqlflow_core::rex::RexCall::new(
        SqlKind::Other,
        "||",
        varchar(true),
        [
            RexNode::literal(RexLiteralValue::CharString("a".to_string()), varchar(false)),
            RexNode::input_ref(0, varchar(true)),
        ],
    ));
    let e = lowerer.compile(&call).unwrap();

    assert_eq!("concat_s_sN", dispatched_function(&e));
    assert_eq!(DataType::string(None, Charset::Latin1, true), e.datatype());
    assert_eq!("CAST(concat('a', t.0.clone()) AS s?)", e.to_string());
}

#[test]
fn search_with_ranges() {
    let lowerer = lowerer([DataType::INT32.nullable()]);
    let point = |v: i64| RexLiteral::new(RexLiteralValue::Exact(Decimal::from(v)), int(false));
    let sarg = Sarg::new(
        [
            Range::point(point(1)),
            Range {
                lower: Bound::Exclusive(point(10)),
                upper: Bound::Unbounded,
            },
        ],
        NullAs::False,
    );
    let call = RexNode::call(
        SqlKind::Search,
        boolean(false),
        [
            RexNode::input_ref(0, int(true)),
            RexNode::literal(RexLiteralValue::Sarg(sarg), int(false)),
        ],
    );
    let e = lowerer.compile(&call).unwrap();
    assert_eq!(DataType::BOOL, e.datatype());
}

#[test]
fn functions_are_mangled() {
    let lowerer = lowerer([
        DataType::STRING.nullable(),
        DataType::DOUBLE,
        DataType::TIMESTAMP,
    ]);

    let upper = RexNode::function("UPPER", varchar(true), [RexNode::input_ref(0, varchar(true))]);
    let e = lowerer.compile(&upper).unwrap();
    assert_eq!("upperN(t.0.clone())", e.to_string());

    let abs = RexNode::function(
        "abs",
        RelDataType::new(SqlTypeName::Double, false),
        [RexNode::input_ref(1, RelDataType::new(SqlTypeName::Double, false))],
    );
    let e = lowerer.compile(&abs).unwrap();
    assert_eq!("abs_d(t.1)", e.to_string());

    let extract = RexNode::call(
        SqlKind::Extract,
        RelDataType::new(SqlTypeName::BigInt, false),
        [
            RexNode::literal(
                RexLiteralValue::Symbol("YEAR".to_string()),
                RelDataType::new(SqlTypeName::Symbol, false),
            ),
            RexNode::input_ref(2, RelDataType::new(SqlTypeName::Timestamp, false)),
        ],
    );
    let e = lowerer.compile(&extract).unwrap();
    assert_eq!("extract_YEAR_Timestamp(t.2)", e.to_string());

    let floor = RexNode::call(
        SqlKind::Floor,
        RelDataType::new(SqlTypeName::Double, false),
        [RexNode::input_ref(1, RelDataType::new(SqlTypeName::Double, false))],
    );
    let e = lowerer.compile(&floor).unwrap();
    assert_eq!("floor_d(t.1)", e.to_string());
}

#[test]
fn array_constructor_and_index() {
    let lowerer = lowerer([DataType::INT64]);
    let array_type = RelDataType::array(RelDataType::new(SqlTypeName::BigInt, false), false);
    let array = RexNode::call(
        SqlKind::ArrayValueConstructor,
        array_type.clone(),
        [
            int_lit(1),
            RexNode::input_ref(0, RelDataType::new(SqlTypeName::BigInt, false)),
        ],
    );
    let item = RexNode::call(
        SqlKind::Item,
        RelDataType::new(SqlTypeName::BigInt, true),
        [array, int_lit(1)],
    );
    let e = lowerer.compile(&item).unwrap();
    assert_eq!(
        "vec![CAST(1 AS i64), CAST(t.0 AS i64)][CAST(1 AS u)]",
        e.to_string()
    );
    assert_eq!(DataType::INT64.nullable(), e.datatype());
}

#[test]
fn constants_follow_the_row() {
    logutil::init_test();
    let constants = vec![RexLiteral::new(
        RexLiteralValue::CharString("x".to_string()),
        varchar(false),
    )];
    let lowerer = ExpressionLowerer::try_new(
        Some(row_var([DataType::INT32])),
        constants,
        CompilerConfig::default().lowering,
    )
    .unwrap();

    let e = lowerer.compile(&RexNode::input_ref(1, varchar(false))).unwrap();
    assert_eq!("'x'", e.to_string());

    let err = lowerer.compile(&RexNode::input_ref(5, int(false))).unwrap_err();
    assert!(err.is_internal());
    assert_eq!(Some("$5"), err.node());
}

#[test]
fn verbose_lowering_still_compiles() {
    logutil::init_test();
    let mut config = CompilerConfig::default();
    config.set_from_str("verbosity", "3").unwrap();
    let lowerer = ExpressionLowerer::try_new(
        Some(row_var([DataType::BOOL])),
        Vec::new(),
        config.lowering,
    )
    .unwrap();
    let call = RexNode::call(SqlKind::Not, boolean(false), [RexNode::input_ref(0, boolean(false))]);
    let e = lowerer.compile(&call).unwrap();
    assert_eq!("CAST(!(t.0) AS b)", e.to_string());
}

#[test]
fn unsupported_operands_report_the_innermost_node() {
    let lowerer = lowerer([DataType::BOOL]);
    let bad = RexNode::function("frobnicate", int(false), [int_lit(2)]);
    let call = RexNode::call(SqlKind::Plus, int(false), [bad, int_lit(1)]);
    let err = lowerer.compile(&call).unwrap_err();
    assert!(err.is_unimplemented());
    assert_eq!(Some("FROBNICATE(2)"), err.node());
}
