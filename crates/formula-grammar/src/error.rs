use crate::combinator::Failure;

/// A formula that could not be parsed.
///
/// `position` is the byte offset of the furthest point the grammar reached; `message` lists
/// what would have let parsing continue there.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to parse formula at position {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl From<Failure> for ParseError {
    fn from(failure: Failure) -> Self {
        Self {
            position: failure.position,
            message: failure.message(),
        }
    }
}

/// A reference that cannot be built or moved to another notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("cell at row {row}, column {column} lies outside the sheet")]
    OutsideSheet { row: i32, column: i32 },
    #[error("a range needs at least one region")]
    EmptyRange,
    #[error("relative references need an origin cell to change notation")]
    MissingOrigin,
    #[error("relative reference offset overflows")]
    OffsetOverflow,
    #[error("invalid origin cell {0:?}, expected A1 text such as C5")]
    InvalidOrigin(String),
}
