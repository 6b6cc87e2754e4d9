use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Arity;
use crate::functions;

/// Excel's hard limit for the number of arguments in a single function call.
pub const EXCEL_MAX_ARGS: usize = 255;

/// Excel's limit on formula length, in characters.
pub const EXCEL_MAX_FORMULA_CHARS: usize = 8192;

/// Excel's limit on nested function calls. Also caps parentheses and unary signs, which nest
/// the same way.
pub const EXCEL_MAX_NESTED_CALLS: usize = 64;

/// Knobs for [`crate::parse_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject formulas without a leading `=`.
    pub require_equals: bool,
    /// Arities that take precedence over the builtin catalog. Names match case-insensitively.
    pub functions: BTreeMap<String, Arity>,
    /// Arity assumed for functions that are neither overridden nor builtin.
    pub unknown_function_arity: Arity,
    pub max_function_args: usize,
    /// How many parentheses, function calls and unary signs may enclose one another. Each
    /// level costs stack while parsing, so keep this small.
    pub max_nesting: usize,
    /// Reject longer formulas before parsing. Off by default: canonical rendering can be longer
    /// than the text it came from, so a cap would refuse to re-parse rendered formulas.
    pub max_formula_chars: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            require_equals: false,
            functions: BTreeMap::new(),
            unknown_function_arity: Arity::VarArgs,
            max_function_args: EXCEL_MAX_ARGS,
            max_nesting: EXCEL_MAX_NESTED_CALLS,
            max_formula_chars: None,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, arity: Arity) -> Self {
        self.functions.insert(name.into(), arity);
        self
    }

    /// Applies Excel's formula length limit.
    #[must_use]
    pub fn with_excel_length_limit(mut self) -> Self {
        self.max_formula_chars = Some(EXCEL_MAX_FORMULA_CHARS);
        self
    }

    /// Resolves the arity a call to `name` is checked against.
    pub fn arity_of(&self, name: &str) -> Arity {
        self.functions
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, arity)| *arity)
            .or_else(|| functions::lookup_function(name).map(|sig| sig.arity))
            .unwrap_or(self.unknown_function_arity)
    }
}
