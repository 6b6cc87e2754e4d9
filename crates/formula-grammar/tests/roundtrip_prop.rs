use formula_grammar::column::{column_letters_to_index, index_to_column_letters};
use formula_grammar::grammar::address::address as address_grammar;
use formula_grammar::{
    parse, Address, AddressMode, Arity, AxisRef, BinaryOp, CellOrigin, Env, Expr,
    FunctionApplication, Notation, Range, UnaryOp,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn mode() -> impl Strategy<Value = AddressMode> {
    prop_oneof![Just(AddressMode::Absolute), Just(AddressMode::Relative)]
}

fn env() -> impl Strategy<Value = Env> {
    prop_oneof![
        3 => Just(Env::default()),
        1 => "[A-Za-z][A-Za-z0-9 ']{0,6}".prop_map(|sheet| Env::sheet(sheet)),
        1 => ("[A-Za-z]{1,5}\\.xlsx", "[A-Za-z]{1,5}")
            .prop_map(|(workbook, sheet)| Env::new("", workbook, sheet)),
    ]
}

/// Whether the A1 text of `address` would read back as R1C1 (e.g. column `RC`, row 5).
fn reads_as_r1c1(address: &Address) -> bool {
    let text = address.to_ref();
    let reads = address_grammar()
        .run(&text)
        .is_ok_and(|s| s.value.notation() == Notation::R1C1);
    reads
}

fn a1_address() -> impl Strategy<Value = Address> {
    (1i32..=1_048_576, mode(), 1i32..=16_384, mode(), env())
        .prop_map(|(row, row_mode, column, col_mode, env)| {
            Address::a1(AxisRef::new(row, row_mode), AxisRef::new(column, col_mode), env)
                .expect("positive coordinates")
        })
        .prop_filter("ambiguous with R1C1", |address| !reads_as_r1c1(address))
}

fn r1c1_axis() -> impl Strategy<Value = AxisRef> {
    prop_oneof![
        (-1000i32..=1000).prop_map(AxisRef::relative),
        (1i32..=1_048_576).prop_map(AxisRef::absolute),
    ]
}

fn r1c1_address() -> impl Strategy<Value = Address> {
    (r1c1_axis(), r1c1_axis(), env()).prop_map(|(row, column, env)| {
        Address::r1c1(row, column, env).expect("absolute axes are positive")
    })
}

fn address() -> impl Strategy<Value = Address> {
    prop_oneof![a1_address(), r1c1_address()]
}

fn a1_range() -> impl Strategy<Value = Range> {
    (a1_address(), a1_address(), env())
        .prop_map(|(top_left, bottom_right, env)| Range::contiguous(top_left, bottom_right).with_env(env))
}

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0u64..(1 << 40)).prop_map(|n| Expr::Number(n as f64 / 1024.0)),
        any::<f64>()
            .prop_filter("finite", |value| value.is_finite())
            .prop_map(|value| Expr::Number(value.abs())),
        "[a-z ]{0,6}".prop_map(Expr::String),
        any::<bool>().prop_map(Expr::Boolean),
        "[a-z][a-z_]{2,6}"
            .prop_filter("booleans are not names", |name| name != "true" && name != "false")
            .prop_map(Expr::ReferenceNamed),
        address().prop_map(Expr::ReferenceAddress),
        a1_range().prop_map(Expr::ReferenceRange),
    ]
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Pow),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Concat),
        Just(BinaryOp::Eq),
        Just(BinaryOp::Ne),
        Just(BinaryOp::Lt),
        Just(BinaryOp::Le),
        Just(BinaryOp::Gt),
        Just(BinaryOp::Ge),
    ]
}

/// Binary operands are grouped explicitly, the same way the parser records them when the
/// source text needed parentheses.
fn operand(expr: Expr) -> Expr {
    match expr {
        Expr::Binary(_) => Expr::parens(expr),
        other => other,
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expr::parens),
            (prop_oneof![Just(UnaryOp::Plus), Just(UnaryOp::Minus)], inner.clone())
                .prop_map(|(op, e)| Expr::unary(op, operand(e))),
            (binary_op(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Expr::binary(op, operand(l), operand(r))),
            (
                prop_oneof![Just("MYFN"), Just("CALC_X"), Just("F.TEST")],
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(name, args)| {
                    Expr::FunctionApplication(FunctionApplication {
                        name: name.to_string(),
                        args,
                        arity: Arity::VarArgs,
                    })
                }),
        ]
    })
}

proptest! {
    #[test]
    fn column_codec_roundtrips(index in 1u32..=u32::MAX) {
        let letters = index_to_column_letters(index);
        prop_assert_eq!(column_letters_to_index(&letters), Some(index));
    }

    #[test]
    fn addresses_roundtrip_with_modes(address in address()) {
        let formula = format!("={}", address.to_formula());
        let parsed = match parse(&formula) {
            Ok(Expr::ReferenceAddress(parsed)) => parsed,
            other => panic!("{formula}: {other:?}"),
        };
        prop_assert_eq!(&parsed, &address);
        prop_assert_eq!(parsed.row_mode(), address.row_mode());
        prop_assert_eq!(parsed.col_mode(), address.col_mode());
        prop_assert_eq!(parsed.notation(), address.notation());
        prop_assert_eq!(parsed.env(), address.env());
    }

    #[test]
    fn expressions_roundtrip(tree in expr()) {
        let formula = format!("={}", tree.to_formula());
        assert_eq!(parse(&formula), Ok(tree), "{}", formula);
    }

    #[test]
    fn notation_conversion_roundtrips(
        address in a1_address(),
        row in 1i32..=100_000,
        column in 1i32..=16_384,
    ) {
        let origin = Some(CellOrigin::new(row, column));
        let r1c1 = address.to_notation(Notation::R1C1, origin).expect("A1 converts to R1C1");
        prop_assert_eq!(r1c1.notation(), Notation::R1C1);

        let formula = format!("={}", r1c1.to_formula());
        let reparsed = match parse(&formula) {
            Ok(Expr::ReferenceAddress(parsed)) => parsed,
            other => panic!("{formula}: {other:?}"),
        };
        prop_assert_eq!(&reparsed, &r1c1);

        let back = r1c1.to_notation(Notation::A1, origin).expect("R1C1 converts back to A1");
        prop_assert_eq!(&back, &address);
        prop_assert_eq!(back.to_formula(), address.to_formula());
    }
}
