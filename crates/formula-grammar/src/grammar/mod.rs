//! The formula grammar and its drivers.
//!
//! [`parse`] and [`try_parse`] run a formula to completion. [`ResumableParse`] drives the same
//! grammar one suspension point at a time, so a host can interleave parsing with other work.

pub mod address;
pub mod expression;
pub mod primitives;
pub mod range;

use self::expression::{expression, Nesting};
use self::primitives::ws_pad;
use crate::ast::Expr;
use crate::combinator::{char, eof, optional, pipe3, Failure, Outcome, Parser, Step, Stream};
use crate::error::ParseError;
use crate::options::ParseOptions;

/// `=`, then an expression and nothing else. Whitespace around the expression is ignored.
pub fn formula<'a>(opts: &'a ParseOptions) -> Parser<'a, Expr> {
    let equals = if opts.require_equals {
        char('=').map(|_| ())
    } else {
        optional(&char('=')).map(|_| ())
    };
    pipe3(
        &equals,
        &ws_pad(&expression(opts, Nesting::TopLevel)),
        &eof(),
        |_, expr, _| expr,
    )
}

/// Parses `formula` with default options.
pub fn parse(formula: &str) -> Result<Expr, ParseError> {
    parse_with(formula, &ParseOptions::default())
}

pub fn parse_with(formula: &str, opts: &ParseOptions) -> Result<Expr, ParseError> {
    ResumableParse::new(formula, opts).run()
}

/// Like [`parse`], but discards the error.
pub fn try_parse(formula: &str) -> Option<Expr> {
    parse(formula).ok()
}

pub fn try_parse_with(formula: &str, opts: &ParseOptions) -> Option<Expr> {
    parse_with(formula, opts).ok()
}

/// A parse that advances one suspension point per [`ResumableParse::resume`].
pub struct ResumableParse<'a> {
    formula: &'a str,
    step: Step<'a, Expr>,
    steps: usize,
}

/// The state after one [`ResumableParse::resume`].
pub enum Resume<'a> {
    Suspended(ResumableParse<'a>),
    Done(Result<Expr, ParseError>),
}

impl<'a> ResumableParse<'a> {
    pub fn new(formula: &'a str, opts: &'a ParseOptions) -> Self {
        log::debug!("parsing formula {formula:?}");
        let too_long = opts.max_formula_chars.and_then(|limit| {
            let char_len = formula.chars().count();
            (char_len > limit).then(|| {
                format!("formula exceeds the {limit}-character limit (got {char_len})")
            })
        });
        let step = match too_long {
            Some(message) => Step::Done(Err(Failure::new(0, message))),
            None => self::formula(opts).parse(Stream::new(formula)),
        };
        Self {
            formula,
            step,
            steps: 0,
        }
    }

    /// Number of resumptions performed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.step.is_done()
    }

    #[must_use]
    pub fn resume(self) -> Resume<'a> {
        let Self {
            formula,
            step,
            steps,
        } = self;
        match step {
            Step::Done(outcome) => Resume::Done(finish(formula, outcome)),
            Step::Suspended(_) => {
                let steps = steps + 1;
                log::trace!("formula {formula:?}: step {steps}");
                match step.resume() {
                    Step::Done(outcome) => Resume::Done(finish(formula, outcome)),
                    step => Resume::Suspended(Self {
                        formula,
                        step,
                        steps,
                    }),
                }
            }
        }
    }

    /// Resumes until the parse finishes.
    pub fn run(self) -> Result<Expr, ParseError> {
        let mut parse = self;
        loop {
            match parse.resume() {
                Resume::Suspended(next) => parse = next,
                Resume::Done(result) => return result,
            }
        }
    }
}

fn finish(formula: &str, outcome: Outcome<'_, Expr>) -> Result<Expr, ParseError> {
    match outcome {
        Ok(success) => Ok(success.value),
        Err(failure) => {
            let err = ParseError::from(failure);
            log::debug!("formula {formula:?} rejected: {err}");
            Err(err)
        }
    }
}
