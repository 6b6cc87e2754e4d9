use formula_grammar::{
    parse, parse_with, CellOrigin, Expr, Notation, ParseOptions, ReferenceError,
    EXCEL_MAX_FORMULA_CHARS,
};
use pretty_assertions::assert_eq;

fn render(formula: &str) -> String {
    let expr = parse(formula).unwrap_or_else(|err| panic!("{formula}: {err}"));
    format!("={}", expr.to_formula())
}

fn render_in(
    formula: &str,
    notation: Notation,
    origin: Option<CellOrigin>,
) -> Result<String, ReferenceError> {
    let expr = parse(formula).unwrap_or_else(|err| panic!("{formula}: {err}"));
    expr.to_formula_in(notation, origin).map(|text| format!("={text}"))
}

#[test]
fn large_numbers_render_in_exponent_form() {
    let formula = format!("={}", vec!["1e300"; 30].join("+"));
    let expr = parse(&formula).unwrap();
    let rendered = format!("={}", expr.to_formula());
    assert_eq!(rendered, format!("={}", vec!["1e300"; 30].join(" + ")));
    assert_eq!(parse(&rendered), Ok(expr));
}

#[test]
fn rendering_can_outgrow_the_source_text() {
    // Wide rather than deep: each argument is a short chain.
    let term = vec!["1"; 20].join("+");
    let formula = format!("=F({})", vec![term.as_str(); 150].join(","));
    assert!(formula.chars().count() <= EXCEL_MAX_FORMULA_CHARS);
    let rendered = render(&formula);
    assert!(rendered.chars().count() > EXCEL_MAX_FORMULA_CHARS);

    assert_eq!(parse(&rendered), parse(&formula));
    let capped = ParseOptions::default().with_excel_length_limit();
    assert!(parse_with(&formula, &capped).is_ok());
    assert!(parse_with(&rendered, &capped).is_err());
}

#[test]
fn small_numbers_keep_their_value() {
    for formula in ["=0.0000001", "=5e-324", "=123456789012", "=0.1"] {
        let expr = parse(formula).unwrap();
        assert_eq!(parse(&render(formula)), Ok(expr), "{formula}");
    }
    assert_eq!(render("=0.0000001"), "=0.0000001");
    assert_eq!(render("=0.000000000001"), "=1e-12");
    assert_eq!(render("=1000"), "=1000");
}

#[test]
fn a1_formulas_render_in_r1c1() {
    let origin = Some("C3".parse().unwrap());
    assert_eq!(
        render_in("=SUM(A1:$B$2, C3) * Sheet2!D5", Notation::R1C1, origin),
        Ok("=SUM(R[-2]C[-2]:R2C2,RC) * 'Sheet2'!R[2]C[1]".to_owned())
    );
    assert_eq!(
        render_in("=$A$1 + rate", Notation::R1C1, None),
        Ok("=R1C1 + rate".to_owned())
    );
    assert_eq!(
        render_in("=A1", Notation::R1C1, None),
        Err(ReferenceError::MissingOrigin)
    );
}

#[test]
fn r1c1_formulas_render_in_a1() {
    let origin = Some(CellOrigin::new(2, 2));
    assert_eq!(
        render_in("=R[1]C[-1] * R5C2 & (RC)", Notation::A1, origin),
        Ok("=A3 * $B$5 & (B2)".to_owned())
    );
    assert_eq!(
        render_in("=R[-5]C", Notation::A1, origin),
        Err(ReferenceError::OutsideSheet { row: -3, column: 2 })
    );
}

#[test]
fn converted_formulas_parse_back_to_the_converted_tree() {
    let origin = Some(CellOrigin::new(10, 4));
    for formula in [
        "=IF(A1 > $B$2, 'My Sheet'!C3:D4, -E5)",
        "=(A1:B2,C3:D4)",
        "=(R[1]C:R2C[3],RC:R[1]C[1])",
        "=R[-3]C[2] ^ 2",
    ] {
        for notation in [Notation::A1, Notation::R1C1] {
            let converted = parse(formula).unwrap().to_notation(notation, origin).unwrap();
            let text = format!("={}", converted.to_formula());
            assert_eq!(parse(&text), Ok(converted), "{formula} as {notation:?}: {text}");
        }
    }
}

#[test]
fn same_notation_needs_no_origin() {
    let expr: Expr = parse("=A1+R[1]C").unwrap();
    assert_eq!(expr.to_formula_in(Notation::A1, None), Err(ReferenceError::MissingOrigin));
    let a1_only = parse("=A1+B2").unwrap();
    assert_eq!(a1_only.to_formula_in(Notation::A1, None), Ok(a1_only.to_formula()));
}
