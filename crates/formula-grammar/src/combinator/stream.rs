use core::fmt;
use std::borrow::Cow;

/// Immutable view of the input at some byte offset.
///
/// Streams are plain values: advancing returns a new stream and never affects copies held by
/// other alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Stream<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Byte offset into the original input.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Moves forward by `bytes`, which must land on a char boundary of the remaining text.
    #[must_use]
    pub fn advance(self, bytes: usize) -> Self {
        debug_assert!(self.remaining().is_char_boundary(bytes));
        Self {
            input: self.input,
            position: self.position + bytes,
        }
    }
}

/// A grammar alternative that did not match.
///
/// `expected` lists everything that would have let parsing continue at `position`. Failures
/// from competing alternatives are merged: the one that got further wins, and ties pool their
/// expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub position: usize,
    pub expected: Vec<Cow<'static, str>>,
}

impl Failure {
    #[must_use]
    pub fn new(position: usize, expected: impl Into<Cow<'static, str>>) -> Self {
        Self {
            position,
            expected: vec![expected.into()],
        }
    }

    #[must_use]
    pub fn merge(self, other: Failure) -> Failure {
        if self.position > other.position {
            return self;
        }
        if other.position > self.position {
            return other;
        }
        let mut merged = self;
        for reason in other.expected {
            if !merged.expected.contains(&reason) {
                merged.expected.push(reason);
            }
        }
        merged
    }

    #[must_use]
    pub fn with_hint(self, hint: Option<Failure>) -> Failure {
        match hint {
            Some(hint) => self.merge(hint),
            None => self,
        }
    }

    pub fn message(&self) -> String {
        self.expected.join("; ")
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message(), self.position)
    }
}

/// A matched alternative.
///
/// `furthest` keeps the furthest failure seen on the way (e.g. the operator a repetition
/// stopped at), so a later terminal failure can still report it.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<'a, T> {
    pub value: T,
    pub rest: Stream<'a>,
    pub furthest: Option<Failure>,
}

impl<'a, T> Success<'a, T> {
    #[must_use]
    pub fn new(value: T, rest: Stream<'a>) -> Self {
        Self {
            value,
            rest,
            furthest: None,
        }
    }

    #[must_use]
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> Success<'a, U> {
        Success {
            value: f(self.value),
            rest: self.rest,
            furthest: self.furthest,
        }
    }

    #[must_use]
    pub fn with_hint(self, hint: Option<Failure>) -> Self {
        Self {
            furthest: merge_hints(self.furthest, hint),
            ..self
        }
    }
}

pub type Outcome<'a, T> = Result<Success<'a, T>, Failure>;

pub(crate) fn merge_hints(a: Option<Failure>, b: Option<Failure>) -> Option<Failure> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.merge(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
