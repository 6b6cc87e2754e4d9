//! Builtin function signatures used to arity-check calls.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::ast::Arity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub arity: Arity,
}

const fn sig(name: &'static str, arity: Arity) -> FunctionSignature {
    FunctionSignature { name, arity }
}

use Arity::{Fixed, LowBound, VarArgs};

const BUILTINS: &[FunctionSignature] = &[
    // Math
    sig("ABS", Fixed(1)),
    sig("INT", Fixed(1)),
    sig("MOD", Fixed(2)),
    sig("PI", Fixed(0)),
    sig("POWER", Fixed(2)),
    sig("PRODUCT", LowBound(1)),
    sig("RAND", Fixed(0)),
    sig("ROUND", Fixed(2)),
    sig("ROUNDDOWN", Fixed(2)),
    sig("ROUNDUP", Fixed(2)),
    sig("SQRT", Fixed(1)),
    sig("SUM", LowBound(1)),
    sig("SUMIF", LowBound(2)),
    sig("SUMPRODUCT", LowBound(1)),
    // Statistical
    sig("AVERAGE", LowBound(1)),
    sig("COUNT", LowBound(1)),
    sig("COUNTA", LowBound(1)),
    sig("COUNTIF", Fixed(2)),
    sig("MAX", LowBound(1)),
    sig("MIN", LowBound(1)),
    // Logical
    sig("AND", LowBound(1)),
    sig("FALSE", Fixed(0)),
    sig("IF", LowBound(2)),
    sig("IFERROR", Fixed(2)),
    sig("NOT", Fixed(1)),
    sig("OR", LowBound(1)),
    sig("TRUE", Fixed(0)),
    // Text
    sig("CONCAT", LowBound(1)),
    sig("CONCATENATE", LowBound(1)),
    sig("LEFT", LowBound(1)),
    sig("LEN", Fixed(1)),
    sig("LOWER", Fixed(1)),
    sig("MID", Fixed(3)),
    sig("RIGHT", LowBound(1)),
    sig("TEXTJOIN", LowBound(3)),
    sig("TRIM", Fixed(1)),
    sig("UPPER", Fixed(1)),
    // Date & time
    sig("DATE", Fixed(3)),
    sig("DAY", Fixed(1)),
    sig("MONTH", Fixed(1)),
    sig("NOW", Fixed(0)),
    sig("TODAY", Fixed(0)),
    sig("YEAR", Fixed(1)),
    // Lookup & reference
    sig("CHOOSE", LowBound(2)),
    sig("COLUMN", VarArgs),
    sig("COLUMNS", Fixed(1)),
    sig("HLOOKUP", LowBound(3)),
    sig("INDEX", LowBound(2)),
    sig("MATCH", LowBound(2)),
    sig("OFFSET", LowBound(3)),
    sig("ROW", VarArgs),
    sig("ROWS", Fixed(1)),
    sig("VLOOKUP", LowBound(3)),
    sig("XLOOKUP", LowBound(3)),
    // Information
    sig("ISBLANK", Fixed(1)),
    sig("ISNUMBER", Fixed(1)),
    sig("NA", Fixed(0)),
];

/// Iterate every builtin signature.
pub fn iter_function_signatures() -> impl Iterator<Item = &'static FunctionSignature> {
    BUILTINS.iter()
}

fn registry() -> &'static HashMap<&'static str, &'static FunctionSignature> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static FunctionSignature>> =
        OnceLock::new();
    REGISTRY.get_or_init(|| BUILTINS.iter().map(|sig| (sig.name, sig)).collect())
}

pub fn lookup_function(name: &str) -> Option<&'static FunctionSignature> {
    let upper = name.to_ascii_uppercase();
    if let Some(sig) = registry().get(upper.as_str()).copied() {
        return Some(sig);
    }

    // Files store newer functions with an `_xlfn.` prefix (e.g. `_xlfn.XLOOKUP`).
    upper
        .strip_prefix("_XLFN.")
        .and_then(|stripped| registry().get(stripped).copied())
}
