use super::{Failure, Parser, Stream, Success};

/// Matches exactly `expected`.
pub fn char<'a>(expected: char) -> Parser<'a, char> {
    Parser::primitive(move |input: Stream<'a>| match input.peek() {
        Some(c) if c == expected => Ok(Success::new(c, input.advance(c.len_utf8()))),
        _ => Err(Failure::new(input.position(), format!("expected '{expected}'"))),
    })
}

/// Matches the literal `expected`, returning the matched slice.
pub fn string<'a>(expected: &'static str) -> Parser<'a, &'a str> {
    Parser::primitive(move |input: Stream<'a>| {
        let rest = input.remaining();
        if rest.starts_with(expected) {
            Ok(Success::new(
                &rest[..expected.len()],
                input.advance(expected.len()),
            ))
        } else {
            Err(Failure::new(input.position(), format!("expected '{expected}'")))
        }
    })
}

/// Matches one character accepted by `pred`.
pub fn satisfy<'a>(pred: impl Fn(char) -> bool + 'a, what: &'static str) -> Parser<'a, char> {
    Parser::primitive(move |input: Stream<'a>| match input.peek() {
        Some(c) if pred(c) => Ok(Success::new(c, input.advance(c.len_utf8()))),
        _ => Err(Failure::new(input.position(), format!("expected {what}"))),
    })
}

pub fn upper<'a>() -> Parser<'a, char> {
    satisfy(|c| c.is_ascii_uppercase(), "uppercase letter")
}

/// One or more ASCII digits as an unsigned integer. Fails if the value overflows `u64`.
pub fn integer<'a>() -> Parser<'a, u64> {
    Parser::primitive(|input: Stream<'a>| {
        let digits = input
            .remaining()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return Err(Failure::new(input.position(), "expected digit"));
        }
        let text = &input.remaining()[..digits];
        match text.parse::<u64>() {
            Ok(n) => Ok(Success::new(n, input.advance(digits))),
            Err(_) => Err(Failure::new(input.position(), "integer out of range")),
        }
    })
}

/// Zero or more whitespace characters. Never fails.
pub fn ws<'a>() -> Parser<'a, ()> {
    Parser::primitive(|input: Stream<'a>| {
        let len: usize = input
            .remaining()
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| c.len_utf8())
            .sum();
        Ok(Success::new((), input.advance(len)))
    })
}

pub fn eof<'a>() -> Parser<'a, ()> {
    Parser::primitive(|input: Stream<'a>| {
        if input.is_eof() {
            Ok(Success::new((), input))
        } else {
            Err(Failure::new(
                input.position(),
                "did not reach end of input",
            ))
        }
    })
}
