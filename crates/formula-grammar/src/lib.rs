#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Spreadsheet formula parsing and canonical re-rendering.
//!
//! Formulas are parsed into an [`Expr`] tree with [`parse`] (strict) or [`try_parse`]
//! (returns `None` on failure). Rendering a tree with [`Expr::to_formula`] and parsing the
//! result again yields the same tree.
//!
//! ## References
//!
//! Cell addresses may be written in A1 (`$B$3`) or R1C1 (`R[-1]C2`) notation. Ranges join two
//! addresses with `:`, and comma-separated lists of ranges form a discontiguous range. Any
//! reference may carry a sheet prefix (`Sheet1!A1`, `'C:\dir\[Book.xlsx]My Sheet'!A1`), kept
//! as an [`Env`].
//!
//! [`Expr::to_formula_in`] renders every reference in one notation instead. Relative
//! references change meaning between notations (a position in A1, an offset in R1C1), so the
//! conversion takes the [`CellOrigin`] the formula sits in.
//!
//! ## Functions
//!
//! Function calls are checked against an [`Arity`] while parsing. Arities come from
//! [`ParseOptions::functions`], then the builtin catalog in [`functions`], then
//! [`ParseOptions::unknown_function_arity`].
//!
//! ## Stepwise parsing
//!
//! [`ResumableParse`] runs the same grammar one suspension point at a time. The grammar is
//! written with the small combinator toolkit in [`combinator`].

mod ast;
pub mod column;
pub mod combinator;
mod error;
pub mod functions;
pub mod grammar;
mod options;

pub use ast::*;
pub use error::{ParseError, ReferenceError};
pub use grammar::{parse, parse_with, try_parse, try_parse_with, ResumableParse, Resume};
pub use options::{
    ParseOptions, EXCEL_MAX_ARGS, EXCEL_MAX_FORMULA_CHARS, EXCEL_MAX_NESTED_CALLS,
};
