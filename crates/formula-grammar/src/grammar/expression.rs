//! Operator-precedence expressions over numbers, strings, booleans, references and function
//! calls.
//!
//! Precedence, tightest first: unary `+`/`-`, `^`, `*` `/`, `+` `-`, `&`, comparisons. Every
//! binary tier is left-associative.
//!
//! Parentheses, function calls and unary signs each open a nesting level. Levels are counted
//! while the grammar is built and capped by [`ParseOptions::max_nesting`], so a deeply nested
//! formula fails with a parse error instead of exhausting the stack.

use super::address::address;
use super::primitives::{
    comma, env_prefix, identifier, is_ident_char, number_literal, string_literal, ws_pad,
};
use super::range::{range, range_contiguous};
use crate::ast::{BinaryOp, Expr, FunctionApplication, PoisonPill, UnaryOp};
use crate::combinator::{
    between, char, choice, choices, fail, lazy, left, many, not_followed_by, optional, pipe2,
    right, satisfy, sep_by1, string, ws, Parser,
};
use crate::options::ParseOptions;

/// Where an expression sits. Inside a function's argument list `,` separates arguments, so
/// only contiguous ranges are read there. Parentheses start a fresh top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    TopLevel,
    FunctionArgument,
}

const RESERVED_WORDS: [&str; 4] = ["TRUE", "FALSE", "R", "C"];

const COMPARISONS: [BinaryOp; 6] = [
    // Two-character operators first so `<=` is not read as `<`.
    BinaryOp::Ne,
    BinaryOp::Le,
    BinaryOp::Ge,
    BinaryOp::Eq,
    BinaryOp::Lt,
    BinaryOp::Gt,
];

/// An expression at the outermost nesting level.
pub fn expression<'a>(opts: &'a ParseOptions, nesting: Nesting) -> Parser<'a, Expr> {
    expression_at(opts, nesting, 0)
}

fn expression_at<'a>(opts: &'a ParseOptions, nesting: Nesting, level: usize) -> Parser<'a, Expr> {
    let unary = unary(opts, nesting, level);
    let pow = chain_left(&unary, &[BinaryOp::Pow]);
    let product = chain_left(&pow, &[BinaryOp::Mul, BinaryOp::Div]);
    let sum = chain_left(&product, &[BinaryOp::Add, BinaryOp::Sub]);
    let concat = chain_left(&sum, &[BinaryOp::Concat]);
    chain_left(&concat, &COMPARISONS)
}

/// `operand (op operand)*`, folded to the left.
fn chain_left<'a>(operand: &Parser<'a, Expr>, ops: &[BinaryOp]) -> Parser<'a, Expr> {
    let op = choices(
        ops.iter()
            .map(|&op| string(op.as_str()).map(move |_| op))
            .collect(),
    )
    .label("operator");
    let tail = many(&pipe2(&ws_pad(&op), operand, |op, rhs| (op, rhs)));
    pipe2(operand, &tail, |first, rest| {
        rest.into_iter()
            .fold(first, |lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
    })
}

/// Builds the next nesting level on demand, or fails once `level` reaches the limit.
fn nested<'a>(
    opts: &'a ParseOptions,
    level: usize,
    what: &'static str,
    build: impl Fn() -> Parser<'a, Expr> + 'a,
) -> Parser<'a, Expr> {
    if level < opts.max_nesting {
        lazy(build)
    } else {
        fail(format!(
            "{what} nesting exceeds the {}-level limit",
            opts.max_nesting
        ))
    }
}

fn unary<'a>(opts: &'a ParseOptions, nesting: Nesting, level: usize) -> Parser<'a, Expr> {
    let sign = choice(
        &char('+').map(|_| UnaryOp::Plus),
        &char('-').map(|_| UnaryOp::Minus),
    );
    let operand = nested(opts, level, "Expression", move || {
        unary(opts, nesting, level + 1)
    });
    let signed = pipe2(&sign, &operand, Expr::unary);
    choice(&signed, &atom(opts, nesting, level)).label("expression")
}

fn atom<'a>(opts: &'a ParseOptions, nesting: Nesting, level: usize) -> Parser<'a, Expr> {
    choices(vec![
        number_literal().map(Expr::Number),
        string_literal().map(|text| Expr::String(text.to_owned())),
        parenthesized(opts, level),
        function_application(opts, level),
        reference(nesting),
        boolean(),
        named_reference(),
    ])
}

fn open_paren<'a>() -> Parser<'a, char> {
    left(&char('('), &ws())
}

fn close_paren<'a>() -> Parser<'a, char> {
    right(&ws(), &char(')'))
}

fn parenthesized<'a>(opts: &'a ParseOptions, level: usize) -> Parser<'a, Expr> {
    let inner = nested(opts, level, "Expression", move || {
        expression_at(opts, Nesting::TopLevel, level + 1)
    });
    between(&open_paren(), &close_paren(), &inner).map(Expr::parens)
}

fn function_application<'a>(opts: &'a ParseOptions, level: usize) -> Parser<'a, Expr> {
    let argument = nested(opts, level, "Function", move || {
        expression_at(opts, Nesting::FunctionArgument, level + 1)
    });
    let args = between(
        &open_paren(),
        &close_paren(),
        &optional(&sep_by1(&argument, &comma())),
    )
    .map(|args| args.unwrap_or_default());

    pipe2(&identifier(), &args, |name, args| (name, args)).try_map(move |(name, args)| {
        let count = args.len();
        if count > opts.max_function_args {
            return Err(format!(
                "{name} takes at most {} arguments, got {count}",
                opts.max_function_args
            ));
        }
        let arity = opts.arity_of(name);
        if !arity.accepts(count) {
            return Err(format!("{name} takes {arity} argument(s), got {count}"));
        }
        Ok(Expr::FunctionApplication(FunctionApplication {
            name: name.to_owned(),
            args,
            arity,
        }))
    })
}

/// An optionally sheet-qualified range or address. Must not run into an identifier, so `A1B`
/// is left for the named-reference branch.
fn reference<'a>(nesting: Nesting) -> Parser<'a, Expr> {
    let range = match nesting {
        Nesting::TopLevel => range(),
        Nesting::FunctionArgument => range_contiguous(),
    };
    let prefix = optional(&env_prefix()).map(|env| env.unwrap_or_default());
    let reference = choice(
        &pipe2(&prefix, &range, Expr::reference_range),
        &pipe2(&prefix, &address(), Expr::reference_address),
    );
    left(
        &reference,
        &not_followed_by(&satisfy(is_ident_char, "identifier character"), "identifier character"),
    )
}

fn boolean<'a>() -> Parser<'a, Expr> {
    identifier().try_map(|word| {
        if word.eq_ignore_ascii_case("TRUE") {
            Ok(Expr::Boolean(true))
        } else if word.eq_ignore_ascii_case("FALSE") {
            Ok(Expr::Boolean(false))
        } else {
            Err("expected boolean")
        }
    })
}

fn named_reference<'a>() -> Parser<'a, Expr> {
    identifier()
        .map(name_or_poison)
        .try_map(|named| named.map_err(|_: PoisonPill| "reserved word"))
}

fn name_or_poison(name: &str) -> Result<Expr, PoisonPill> {
    if RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        Err(PoisonPill::new())
    } else {
        Ok(Expr::ReferenceNamed(name.to_owned()))
    }
}
