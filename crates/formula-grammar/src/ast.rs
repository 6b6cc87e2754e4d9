use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::column::{column_letters_to_index, index_to_column_letters};
use crate::error::ReferenceError;

/// Where a reference comes from: file path, workbook and worksheet.
///
/// All fields blank (the [`Default`]) is the placeholder context the parser attaches to
/// references that carry no sheet prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Env {
    pub path: String,
    pub workbook_name: String,
    pub worksheet_name: String,
}

impl Env {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        workbook_name: impl Into<String>,
        worksheet_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            workbook_name: workbook_name.into(),
            worksheet_name: worksheet_name.into(),
        }
    }

    /// A worksheet in the current workbook.
    #[must_use]
    pub fn sheet(worksheet_name: impl Into<String>) -> Self {
        Self::new("", "", worksheet_name)
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.workbook_name.is_empty() && self.worksheet_name.is_empty()
    }

    /// Writes the `'path[workbook]sheet'!` prefix, or nothing for an empty env.
    fn fmt_prefix(&self, out: &mut String) {
        if self.is_empty() {
            return;
        }
        out.push('\'');
        push_quoted(out, &self.path);
        if !self.path.is_empty() || !self.workbook_name.is_empty() {
            out.push('[');
            push_quoted(out, &self.workbook_name);
            out.push(']');
        }
        push_quoted(out, &self.worksheet_name);
        out.push_str("'!");
    }
}

fn push_quoted(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        if ch == '\'' {
            out.push_str("''");
        } else {
            out.push(ch);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressMode {
    Absolute,
    Relative,
}

/// The notation an address was written in. Only affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notation {
    A1,
    R1C1,
}

/// One axis (row or column) of an address.
///
/// In A1 notation `value` is a 1-based position. In R1C1 notation a relative `value` is an
/// offset from the current cell (`0` meaning "this row/column").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisRef {
    pub value: i32,
    pub mode: AddressMode,
}

impl AxisRef {
    #[must_use]
    pub const fn new(value: i32, mode: AddressMode) -> Self {
        Self { value, mode }
    }

    #[must_use]
    pub const fn absolute(value: i32) -> Self {
        Self::new(value, AddressMode::Absolute)
    }

    #[must_use]
    pub const fn relative(value: i32) -> Self {
        Self::new(value, AddressMode::Relative)
    }

    /// Re-expresses a relative axis for `notation`: a position in A1, an offset from `origin`
    /// in R1C1. Absolute axes are positions in both notations and stay as they are.
    fn to_notation(
        self,
        notation: Notation,
        origin: Option<i32>,
    ) -> Result<Self, ReferenceError> {
        if self.mode == AddressMode::Absolute {
            return Ok(self);
        }
        let origin = origin.ok_or(ReferenceError::MissingOrigin)?;
        let value = match notation {
            Notation::A1 => origin.checked_add(self.value),
            Notation::R1C1 => self.value.checked_sub(origin),
        };
        value
            .map(AxisRef::relative)
            .ok_or(ReferenceError::OffsetOverflow)
    }

    fn fmt_r1c1(self, out: &mut String, axis: char) {
        out.push(axis);
        if self.value == 0 {
            return;
        }
        match self.mode {
            AddressMode::Absolute => out.push_str(&self.value.to_string()),
            AddressMode::Relative => {
                out.push('[');
                out.push_str(&self.value.to_string());
                out.push(']');
            }
        }
    }
}

/// The cell a formula sits in, as 1-based row and column. Relative R1C1 offsets count from
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOrigin {
    pub row: i32,
    pub column: i32,
}

impl CellOrigin {
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

/// Reads A1 text such as `C5`.
impl FromStr for CellOrigin {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReferenceError::InvalidOrigin(s.to_owned());
        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (letters, digits) = s.split_at(split);
        let column = column_letters_to_index(&letters.to_ascii_uppercase())
            .and_then(|column| i32::try_from(column).ok())
            .ok_or_else(invalid)?;
        let row = digits
            .parse::<i32>()
            .ok()
            .filter(|row| *row >= 1)
            .ok_or_else(invalid)?;
        Ok(Self::new(row, column))
    }
}

/// A single-cell address.
///
/// Equality compares row, column, worksheet and workbook. The path is ignored on purpose: the
/// same workbook opened from two locations still names the same cell. Modes and notation are
/// presentation details and are ignored as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    row: i32,
    column: i32,
    row_mode: AddressMode,
    col_mode: AddressMode,
    env: Env,
    notation: Notation,
}

impl Address {
    /// An A1 address. Both axes are 1-based positions, whatever their mode.
    pub fn a1(row: AxisRef, column: AxisRef, env: Env) -> Result<Self, ReferenceError> {
        if row.value < 1 || column.value < 1 {
            return Err(ReferenceError::OutsideSheet {
                row: row.value,
                column: column.value,
            });
        }
        Ok(Self::with_notation(row, column, env, Notation::A1))
    }

    /// An R1C1 address. Absolute axes are 1-based positions; relative axes are offsets and may
    /// take any value.
    pub fn r1c1(row: AxisRef, column: AxisRef, env: Env) -> Result<Self, ReferenceError> {
        let on_sheet = |axis: AxisRef| axis.mode == AddressMode::Relative || axis.value >= 1;
        if !on_sheet(row) || !on_sheet(column) {
            return Err(ReferenceError::OutsideSheet {
                row: row.value,
                column: column.value,
            });
        }
        Ok(Self::with_notation(row, column, env, Notation::R1C1))
    }

    fn with_notation(row: AxisRef, column: AxisRef, env: Env, notation: Notation) -> Self {
        Self {
            row: row.value,
            column: column.value,
            row_mode: row.mode,
            col_mode: column.mode,
            env,
            notation,
        }
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn column(&self) -> i32 {
        self.column
    }

    pub fn row_mode(&self) -> AddressMode {
        self.row_mode
    }

    pub fn col_mode(&self) -> AddressMode {
        self.col_mode
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &str {
        &self.env.path
    }

    pub fn workbook_name(&self) -> &str {
        &self.env.workbook_name
    }

    pub fn worksheet_name(&self) -> &str {
        &self.env.worksheet_name
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    /// Returns a copy of this address in another env.
    #[must_use]
    pub fn with_env(&self, env: Env) -> Self {
        Self {
            env,
            ..self.clone()
        }
    }

    /// Renders the address, env prefix included, in the notation it was written in.
    pub fn to_formula(&self) -> String {
        let mut out = String::new();
        self.env.fmt_prefix(&mut out);
        self.fmt_ref(&mut out);
        out
    }

    /// The same cell written in `notation`. Relative axes need the `origin` the formula sits
    /// in; an address already in `notation` is returned unchanged.
    pub fn to_notation(
        &self,
        notation: Notation,
        origin: Option<CellOrigin>,
    ) -> Result<Self, ReferenceError> {
        if notation == self.notation {
            return Ok(self.clone());
        }
        let row = AxisRef::new(self.row, self.row_mode)
            .to_notation(notation, origin.map(|origin| origin.row))?;
        let column = AxisRef::new(self.column, self.col_mode)
            .to_notation(notation, origin.map(|origin| origin.column))?;
        match notation {
            Notation::A1 => Self::a1(row, column, self.env.clone()),
            Notation::R1C1 => Self::r1c1(row, column, self.env.clone()),
        }
    }

    /// Renders the address, env prefix included, in `notation`.
    pub fn to_formula_in(
        &self,
        notation: Notation,
        origin: Option<CellOrigin>,
    ) -> Result<String, ReferenceError> {
        Ok(self.to_notation(notation, origin)?.to_formula())
    }

    /// Renders the address without any env prefix.
    pub fn to_ref(&self) -> String {
        let mut out = String::new();
        self.fmt_ref(&mut out);
        out
    }

    fn fmt_ref(&self, out: &mut String) {
        match self.notation {
            Notation::A1 => {
                if self.col_mode == AddressMode::Absolute {
                    out.push('$');
                }
                // Positive, checked by `Address::a1`.
                out.push_str(&index_to_column_letters(self.column.unsigned_abs()));
                if self.row_mode == AddressMode::Absolute {
                    out.push('$');
                }
                out.push_str(&self.row.to_string());
            }
            Notation::R1C1 => {
                AxisRef::new(self.row, self.row_mode).fmt_r1c1(out, 'R');
                AxisRef::new(self.column, self.col_mode).fmt_r1c1(out, 'C');
            }
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
            && self.column == other.column
            && self.env.worksheet_name == other.env.worksheet_name
            && self.env.workbook_name == other.env.workbook_name
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formula())
    }
}

/// A rectangular block given by its top-left and bottom-right corners.
pub type Region = (Address, Address);

/// One or more regions. A range with several regions is discontiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    regions: Vec<Region>,
}

impl Range {
    pub fn new(regions: Vec<Region>) -> Result<Self, ReferenceError> {
        if regions.is_empty() {
            return Err(ReferenceError::EmptyRange);
        }
        Ok(Self { regions })
    }

    #[must_use]
    pub fn contiguous(top_left: Address, bottom_right: Address) -> Self {
        Self {
            regions: vec![(top_left, bottom_right)],
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_contiguous(&self) -> bool {
        self.regions.len() == 1
    }

    /// Concatenates the regions of both ranges, `self` first. Neither input changes.
    #[must_use]
    pub fn merge(&self, other: &Range) -> Range {
        let mut regions = Vec::with_capacity(self.regions.len() + other.regions.len());
        regions.extend(self.regions.iter().cloned());
        regions.extend(other.regions.iter().cloned());
        Range { regions }
    }

    #[must_use]
    pub fn with_env(&self, env: Env) -> Range {
        Range {
            regions: self
                .regions
                .iter()
                .map(|(tl, br)| (tl.with_env(env.clone()), br.with_env(env.clone())))
                .collect(),
        }
    }

    /// Moves every corner to `notation`. See [`Address::to_notation`].
    pub fn to_notation(
        &self,
        notation: Notation,
        origin: Option<CellOrigin>,
    ) -> Result<Range, ReferenceError> {
        let regions = self
            .regions
            .iter()
            .map(|(tl, br)| {
                Ok((
                    tl.to_notation(notation, origin)?,
                    br.to_notation(notation, origin)?,
                ))
            })
            .collect::<Result<Vec<_>, ReferenceError>>()?;
        Ok(Range { regions })
    }

    pub fn to_formula_in(
        &self,
        notation: Notation,
        origin: Option<CellOrigin>,
    ) -> Result<String, ReferenceError> {
        Ok(self.to_notation(notation, origin)?.to_formula())
    }

    /// Renders `A1:B2,C3:D4`. A shared env is written once, in front.
    pub fn to_formula(&self) -> String {
        let mut out = String::new();
        let shared = self.regions.first().map(|(tl, _)| tl.env()).filter(|env| {
            self.regions
                .iter()
                .all(|(tl, br)| tl.env() == *env && br.env() == *env)
        });
        if let Some(env) = shared {
            env.fmt_prefix(&mut out);
        }
        for (i, (tl, br)) in self.regions.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if shared.is_some() {
                tl.fmt_ref(&mut out);
                out.push(':');
                br.fmt_ref(&mut out);
            } else {
                out.push_str(&tl.to_formula());
                out.push(':');
                out.push_str(&br.to_formula());
            }
        }
        out
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formula())
    }
}

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    Fixed(usize),
    LowBound(usize),
    VarArgs,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == n,
            Arity::LowBound(n) => count >= n,
            Arity::VarArgs => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "exactly {n}"),
            Arity::LowBound(n) => write!(f, "at least {n}"),
            Arity::VarArgs => f.write_str("any number of"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Pow,
    Mul,
    Div,
    Add,
    Sub,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Pow => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Concat => "&",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionApplication {
    pub name: String,
    pub args: Vec<Expr>,
    pub arity: Arity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

/// A parsed formula expression.
///
/// Grouping is explicit: the parser records parentheses as [`Expr::Parens`], and rendering
/// never inserts any, so re-parsing rendered output reproduces the same tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    ReferenceAddress(Address),
    ReferenceRange(Range),
    ReferenceNamed(String),
    FunctionApplication(FunctionApplication),
    Number(f64),
    String(String),
    Boolean(bool),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Parens(Box<Expr>),
}

impl Expr {
    /// A single-cell reference, moved into `env`.
    #[must_use]
    pub fn reference_address(env: Env, address: Address) -> Self {
        Expr::ReferenceAddress(address.with_env(env))
    }

    /// A range reference, moved into `env`.
    #[must_use]
    pub fn reference_range(env: Env, range: Range) -> Self {
        Expr::ReferenceRange(range.with_env(env))
    }

    #[must_use]
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    #[must_use]
    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary(UnaryExpr {
            op,
            expr: Box::new(expr),
        })
    }

    #[must_use]
    pub fn parens(expr: Expr) -> Self {
        Expr::Parens(Box::new(expr))
    }

    /// A copy with every reference written in `notation`. Relative references need the
    /// `origin` the formula sits in.
    pub fn to_notation(
        &self,
        notation: Notation,
        origin: Option<CellOrigin>,
    ) -> Result<Expr, ReferenceError> {
        Ok(match self {
            Expr::ReferenceAddress(address) => {
                Expr::ReferenceAddress(address.to_notation(notation, origin)?)
            }
            Expr::ReferenceRange(range) => {
                Expr::ReferenceRange(range.to_notation(notation, origin)?)
            }
            Expr::FunctionApplication(call) => Expr::FunctionApplication(FunctionApplication {
                name: call.name.clone(),
                args: call
                    .args
                    .iter()
                    .map(|arg| arg.to_notation(notation, origin))
                    .collect::<Result<_, _>>()?,
                arity: call.arity,
            }),
            Expr::Binary(b) => Expr::binary(
                b.op,
                b.left.to_notation(notation, origin)?,
                b.right.to_notation(notation, origin)?,
            ),
            Expr::Unary(u) => Expr::unary(u.op, u.expr.to_notation(notation, origin)?),
            Expr::Parens(inner) => Expr::parens(inner.to_notation(notation, origin)?),
            Expr::ReferenceNamed(_) | Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) => {
                self.clone()
            }
        })
    }

    /// Renders formula text without the leading `=`, every reference in `notation`.
    pub fn to_formula_in(
        &self,
        notation: Notation,
        origin: Option<CellOrigin>,
    ) -> Result<String, ReferenceError> {
        Ok(self.to_notation(notation, origin)?.to_formula())
    }

    /// Renders formula text without the leading `=`, each reference in the notation it was
    /// written in.
    pub fn to_formula(&self) -> String {
        let mut out = String::new();
        self.fmt(&mut out);
        out
    }

    fn fmt(&self, out: &mut String) {
        match self {
            Expr::ReferenceAddress(address) => out.push_str(&address.to_formula()),
            Expr::ReferenceRange(range) => out.push_str(&range.to_formula()),
            Expr::ReferenceNamed(name) => out.push_str(name),
            Expr::FunctionApplication(call) => {
                out.push_str(&call.name);
                out.push('(');
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    arg.fmt(out);
                }
                out.push(')');
            }
            Expr::Number(value) => fmt_number(*value, out),
            Expr::String(value) => {
                out.push('"');
                out.push_str(value);
                out.push('"');
            }
            Expr::Boolean(value) => out.push_str(if *value { "TRUE" } else { "FALSE" }),
            Expr::Binary(b) => {
                b.left.fmt(out);
                out.push(' ');
                out.push_str(b.op.as_str());
                out.push(' ');
                b.right.fmt(out);
            }
            Expr::Unary(u) => {
                out.push_str(u.op.as_str());
                u.expr.fmt(out);
            }
            Expr::Parens(inner) => {
                out.push('(');
                inner.fmt(out);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formula())
    }
}

/// Plain decimal, like Excel's General format, until that outgrows 11 characters. Past that
/// the exponent form (`1e300`, `1.25e-12`) is used when it is shorter.
fn fmt_number(value: f64, out: &mut String) {
    const GENERAL_WIDTH: usize = 11;
    let plain = value.to_string();
    let scientific = format!("{value:e}");
    if plain.len() > GENERAL_WIDTH && scientific.len() < plain.len() {
        out.push_str(&scientific);
    } else {
        out.push_str(&plain);
    }
}

/// Stand-in the grammar produces when a reserved word shows up where a named reference was
/// expected.
///
/// It is turned into a parse failure immediately and is not an [`Expr`] variant. Rendering one
/// means the grammar leaked it, so both [`PoisonPill::to_formula`] and `Display` panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoisonPill {
    _private: (),
}

impl PoisonPill {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    pub fn to_formula(&self) -> String {
        panic!("PoisonPill must never appear in an AST");
    }
}

impl fmt::Display for PoisonPill {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("PoisonPill must never appear in an AST");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a1(row: i32, col: i32) -> Address {
        Address::a1(AxisRef::relative(row), AxisRef::relative(col), Env::default()).unwrap()
    }

    fn r1c1(row: AxisRef, col: AxisRef) -> Address {
        Address::r1c1(row, col, Env::default()).unwrap()
    }

    #[test]
    fn env_is_empty_only_when_all_fields_blank() {
        assert!(Env::default().is_empty());
        assert!(!Env::sheet("Sheet1").is_empty());
        assert!(!Env::new("/tmp", "", "").is_empty());
    }

    #[test]
    fn address_equality_ignores_path_modes_and_notation() {
        let here = Address::a1(
            AxisRef::absolute(3),
            AxisRef::absolute(2),
            Env::new("/a", "Book.xlsx", "Sheet1"),
        )
        .unwrap();
        let there = r1c1(AxisRef::relative(3), AxisRef::relative(2))
            .with_env(Env::new("/b", "Book.xlsx", "Sheet1"));
        assert_eq!(here, there);
        assert_ne!(here, there.with_env(Env::new("/b", "Other.xlsx", "Sheet1")));
        assert_ne!(here, a1(3, 3).with_env(here.env().clone()));
    }

    #[test]
    fn with_env_leaves_original_untouched() {
        let original = a1(1, 1);
        let moved = original.with_env(Env::sheet("Data"));
        assert!(original.env().is_empty());
        assert_eq!(moved.worksheet_name(), "Data");
        assert_eq!(moved.to_formula(), "'Data'!A1");
    }

    #[test]
    fn env_prefix_doubles_single_quotes() {
        let address = a1(2, 2).with_env(Env::new("C:\\dir\\", "Book 1.xlsx", "Bob's"));
        assert_eq!(address.to_formula(), "'C:\\dir\\[Book 1.xlsx]Bob''s'!B2");
    }

    #[test]
    fn r1c1_rendering_follows_mode_rules() {
        let cases = [
            (AxisRef::relative(0), AxisRef::relative(0), "RC"),
            (AxisRef::absolute(11), AxisRef::absolute(21), "R11C21"),
            (AxisRef::relative(12), AxisRef::relative(-24), "R[12]C[-24]"),
            (AxisRef::relative(-14), AxisRef::absolute(3), "R[-14]C3"),
        ];
        for (row, col, expected) in cases {
            assert_eq!(r1c1(row, col).to_formula(), expected);
        }
    }

    #[test]
    fn constructors_reject_cells_outside_the_sheet() {
        let err = Address::a1(AxisRef::relative(5), AxisRef::absolute(0), Env::default());
        assert_eq!(err, Err(ReferenceError::OutsideSheet { row: 5, column: 0 }));
        assert!(Address::a1(AxisRef::relative(-1), AxisRef::relative(1), Env::default()).is_err());
        assert!(Address::r1c1(AxisRef::absolute(0), AxisRef::relative(0), Env::default()).is_err());
        assert!(Address::r1c1(AxisRef::relative(-4), AxisRef::relative(0), Env::default()).is_ok());
        assert_eq!(Range::new(Vec::new()), Err(ReferenceError::EmptyRange));
        assert!(Range::new(vec![(a1(1, 1), a1(2, 2))]).is_ok());
    }

    #[test]
    fn relative_axes_convert_through_the_origin() {
        let origin = Some(CellOrigin::new(3, 3));
        let a1_ref = Address::a1(AxisRef::relative(1), AxisRef::absolute(2), Env::default())
            .unwrap();
        assert_eq!(a1_ref.to_formula_in(Notation::R1C1, origin), Ok("R[-2]C2".to_owned()));
        assert_eq!(a1_ref.to_formula_in(Notation::A1, None), Ok("$B1".to_owned()));

        let r1c1_ref = r1c1(AxisRef::relative(0), AxisRef::relative(-2));
        assert_eq!(r1c1_ref.to_formula_in(Notation::A1, origin), Ok("A3".to_owned()));
        assert_eq!(
            r1c1_ref.to_formula_in(Notation::A1, None),
            Err(ReferenceError::MissingOrigin)
        );
        assert_eq!(
            r1c1_ref.to_formula_in(Notation::A1, Some(CellOrigin::new(3, 2))),
            Err(ReferenceError::OutsideSheet { row: 3, column: 0 })
        );
        assert_eq!(
            r1c1(AxisRef::absolute(4), AxisRef::absolute(27)).to_formula_in(Notation::A1, None),
            Ok("$AA$4".to_owned())
        );
    }

    #[test]
    fn origin_reads_a1_text() {
        assert_eq!("C5".parse(), Ok(CellOrigin::new(5, 3)));
        assert_eq!("aa10".parse(), Ok(CellOrigin::new(10, 27)));
        for bad in ["", "5", "C", "C0", "5C", "$C$5"] {
            assert!(bad.parse::<CellOrigin>().is_err(), "{bad}");
        }
    }

    #[test]
    fn numbers_render_like_the_general_format() {
        for (value, expected) in [
            (1.5, "1.5"),
            (100.0, "100"),
            (1e300, "1e300"),
            (1.25e-7, "0.000000125"),
            (1.25e-12, "1.25e-12"),
            (1e15, "1e15"),
            (123456789.0, "123456789"),
        ] {
            assert_eq!(Expr::Number(value).to_formula(), expected);
        }
    }

    #[test]
    fn merge_concatenates_without_dedup() {
        let first = Range::contiguous(a1(1, 1), a1(2, 2));
        let merged = first.merge(&first);
        assert!(first.is_contiguous());
        assert!(!merged.is_contiguous());
        assert_eq!(merged.regions().len(), 2);
        assert_eq!(merged.to_formula(), "A1:B2,A1:B2");
    }

    #[test]
    fn range_renders_shared_env_once() {
        let range = Range::contiguous(a1(1, 1), a1(2, 2))
            .merge(&Range::contiguous(a1(3, 3), a1(4, 4)))
            .with_env(Env::sheet("S"));
        assert_eq!(range.to_formula(), "'S'!A1:B2,C3:D4");
    }

    #[test]
    fn arity_policy() {
        assert!(Arity::Fixed(2).accepts(2));
        assert!(!Arity::Fixed(2).accepts(1));
        assert!(!Arity::Fixed(2).accepts(3));
        assert!(Arity::LowBound(1).accepts(1));
        assert!(Arity::LowBound(1).accepts(30));
        assert!(!Arity::LowBound(1).accepts(0));
        assert!(Arity::VarArgs.accepts(0));
    }

    #[test]
    fn expression_rendering() {
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::parens(Expr::binary(
                BinaryOp::Add,
                Expr::Number(1.5),
                Expr::unary(UnaryOp::Minus, Expr::ReferenceNamed("rate".into())),
            )),
            Expr::FunctionApplication(FunctionApplication {
                name: "IF".into(),
                args: vec![
                    Expr::Boolean(true),
                    Expr::String("a b".into()),
                    Expr::ReferenceAddress(a1(1, 28)),
                ],
                arity: Arity::Fixed(3),
            }),
        );
        assert_eq!(expr.to_formula(), "(1.5 + -rate) * IF(TRUE,\"a b\",AB1)");
    }

    #[test]
    #[should_panic(expected = "PoisonPill must never appear in an AST")]
    fn rendering_poison_pill_panics() {
        let _ = PoisonPill::new().to_formula();
    }

    #[test]
    #[should_panic(expected = "PoisonPill must never appear in an AST")]
    fn displaying_poison_pill_panics() {
        let _ = format!("{}", PoisonPill::new());
    }
}
