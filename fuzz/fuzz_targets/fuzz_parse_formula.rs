#![no_main]

use formula_grammar::{
    parse_with, try_parse_with, Arity, CellOrigin, Notation, ParseOptions, Resume,
    ResumableParse, EXCEL_MAX_FORMULA_CHARS,
};
use libfuzzer_sys::fuzz_target;

/// Keep the harness itself bounded. Inputs past the limit only exercise the up-front length
/// check when it is enabled.
const MAX_FUZZ_FORMULA_CHARS: usize = EXCEL_MAX_FORMULA_CHARS + 256;
const MAX_INPUT_BYTES: usize = MAX_FUZZ_FORMULA_CHARS * 4; // max UTF-8 bytes per char

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };

    // Accept arbitrary bytes as input; treat invalid UTF-8 lossy.
    let input = String::from_utf8_lossy(&data[1..]);
    let formula = input.as_ref();

    // Vary options to explore the `=` requirement and arity resolution paths.
    let selector = data[0];
    let mut opts = ParseOptions {
        require_equals: selector & 0b1 != 0,
        ..ParseOptions::default()
    };
    if selector & 0b10 != 0 {
        opts.unknown_function_arity = Arity::Fixed(usize::from(selector >> 4));
    }
    if selector & 0b100 != 0 {
        opts.max_function_args = usize::from(selector >> 3);
    }
    if selector & 0b1000 != 0 {
        opts = opts.with_excel_length_limit();
    }

    let eager = parse_with(formula, &opts);
    assert_eq!(try_parse_with(formula, &opts), eager.clone().ok());

    // Stepwise and eager drivers must agree.
    let mut resumable = ResumableParse::new(formula, &opts);
    let stepped = loop {
        match resumable.resume() {
            Resume::Suspended(next) => resumable = next,
            Resume::Done(result) => break result,
        }
    };
    assert_eq!(stepped, eager);

    // Rendering a parsed tree and parsing it again reproduces the tree. Rendering may be
    // longer than the input, so the re-parse runs without a length cap.
    if let Ok(expr) = eager {
        let uncapped = ParseOptions {
            max_formula_chars: None,
            ..opts
        };
        let rendered = format!("={}", expr.to_formula());
        let reparsed = parse_with(&rendered, &uncapped)
            .unwrap_or_else(|err| panic!("re-parse of {rendered:?} failed: {err}"));
        assert_eq!(reparsed, expr, "{rendered:?}");

        // Same for a copy with every reference in R1C1. (A1 is not checked: column `RC` with a
        // relative row renders as text that reads back as R1C1.)
        if let Ok(converted) = expr.to_notation(Notation::R1C1, Some(CellOrigin::new(100, 50))) {
            let rendered = format!("={}", converted.to_formula());
            let reparsed = parse_with(&rendered, &uncapped)
                .unwrap_or_else(|err| panic!("re-parse of {rendered:?} failed: {err}"));
            assert_eq!(reparsed, converted, "{rendered:?}");
        }
    }
});
