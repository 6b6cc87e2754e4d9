//! Formula-level building blocks shared by the address, range and expression grammars.

use crate::ast::Env;
use crate::combinator::{
    between, char, choice, integer, many1, optional, pipe2, pipe3, satisfy, ws, Failure, Parser,
    Stream, Success,
};

/// An optionally signed integer that fits in `i32`.
pub fn signed_int<'a>() -> Parser<'a, i32> {
    let sign = optional(&choice(&char('+'), &char('-')));
    pipe2(&sign, &integer(), |sign, magnitude| (sign, magnitude)).try_map(|(sign, magnitude)| {
        let magnitude = i128::from(magnitude);
        let value = if sign == Some('-') { -magnitude } else { magnitude };
        i32::try_from(value).map_err(|_| "integer out of range")
    })
}

/// A strictly positive integer that fits in `i32`.
pub fn positive_int<'a>() -> Parser<'a, i32> {
    integer().try_map(|n| {
        i32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or("expected positive integer")
    })
}

/// `p` with optional whitespace on both sides.
pub fn ws_pad<'a, T: 'a>(p: &Parser<'a, T>) -> Parser<'a, T> {
    between(&ws(), &ws(), p)
}

pub fn comma<'a>() -> Parser<'a, char> {
    ws_pad(&char(','))
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// A letter or `_`, followed by letters, digits, `_` and `.`.
pub fn identifier<'a>() -> Parser<'a, &'a str> {
    Parser::primitive(|input: Stream<'a>| {
        let rest = input.remaining();
        match rest.chars().next() {
            Some(c) if is_ident_start(c) => {}
            _ => return Err(Failure::new(input.position(), "expected identifier")),
        }
        let len = rest
            .char_indices()
            .skip(1)
            .find(|&(_, c)| !is_ident_char(c))
            .map_or(rest.len(), |(i, _)| i);
        Ok(Success::new(&rest[..len], input.advance(len)))
    })
}

/// An unsigned decimal numeral: `12`, `1.5`, `1.`, `.5`, `2e10`, `3.1E-2`.
pub fn number_literal<'a>() -> Parser<'a, f64> {
    Parser::primitive(|input: Stream<'a>| {
        let text = input.remaining();
        let bytes = text.as_bytes();
        let digits_from = |start: usize| {
            bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };

        let int_digits = digits_from(0);
        let mut len = int_digits;
        let mut frac_digits = 0;
        if bytes.get(len) == Some(&b'.') {
            frac_digits = digits_from(len + 1);
            if int_digits > 0 || frac_digits > 0 {
                len += 1 + frac_digits;
            }
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(Failure::new(input.position(), "expected number"));
        }

        // The exponent only counts when digits follow it.
        if matches!(bytes.get(len), Some(b'e' | b'E')) {
            let mut exp = len + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_digits = digits_from(exp);
            if exp_digits > 0 {
                len = exp + exp_digits;
            }
        }

        match text[..len].parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Success::new(value, input.advance(len))),
            _ => Err(Failure::new(input.position(), "number out of range")),
        }
    })
}

/// `"..."` with no escapes. Returns the text between the quotes.
pub fn string_literal<'a>() -> Parser<'a, &'a str> {
    Parser::primitive(|input: Stream<'a>| {
        let Some(body) = input.remaining().strip_prefix('"') else {
            return Err(Failure::new(input.position(), "expected string"));
        };
        match body.find('"') {
            Some(end) => Ok(Success::new(&body[..end], input.advance(end + 2))),
            None => Err(Failure::new(
                input.position() + 1 + body.len(),
                "expected closing '\"'",
            )),
        }
    })
}

/// A sheet prefix such as `Sheet1!`, `[Book.xlsx]Sheet1!` or `'C:\dir\[Book.xlsx]My Sheet'!`.
pub fn env_prefix<'a>() -> Parser<'a, Env> {
    choice(&quoted_env_prefix(), &bare_env_prefix())
}

fn quoted_env_prefix<'a>() -> Parser<'a, Env> {
    Parser::primitive(|input: Stream<'a>| {
        let rest = input.remaining();
        let Some(body) = rest.strip_prefix('\'') else {
            return Err(Failure::new(input.position(), "expected quoted sheet name"));
        };

        let mut content = String::new();
        let mut chars = body.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                content.push(c);
                continue;
            }
            if chars.next_if(|&(_, next)| next == '\'').is_some() {
                content.push('\'');
                continue;
            }
            // Offset just past the closing quote.
            let after = 1 + i + 1;
            return if rest[after..].starts_with('!') {
                Ok(Success::new(
                    split_quoted_env(&content),
                    input.advance(after + 1),
                ))
            } else {
                Err(Failure::new(input.position() + after, "expected '!'"))
            };
        }
        Err(Failure::new(
            input.position() + rest.len(),
            "expected closing quote",
        ))
    })
}

/// `path[workbook]sheet`, or the whole text as a sheet name when there is no bracketed
/// workbook.
fn split_quoted_env(content: &str) -> Env {
    if let Some(open) = content.find('[') {
        if let Some(len) = content[open + 1..].find(']') {
            let close = open + 1 + len;
            return Env::new(
                &content[..open],
                &content[open + 1..close],
                &content[close + 1..],
            );
        }
    }
    Env::sheet(content)
}

fn bare_env_prefix<'a>() -> Parser<'a, Env> {
    let workbook = between(
        &char('['),
        &char(']'),
        &many1(&satisfy(|c| c != '[' && c != ']', "workbook name")),
    )
    .map(|chars| chars.into_iter().collect::<String>());
    pipe3(
        &optional(&workbook),
        &identifier(),
        &char('!'),
        |workbook, sheet, _| Env::new("", workbook.unwrap_or_default(), sheet),
    )
}
