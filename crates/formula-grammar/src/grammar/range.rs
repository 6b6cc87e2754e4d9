//! Ranges: `A1:B2`, and comma-separated lists of those (`A1:B2,D4:E5`). Every address in a
//! range is written in the same notation.

use super::address::{address_a1, address_r1c1};
use super::primitives::comma;
use crate::ast::{Address, Range};
use crate::combinator::{char, choice, choices, many1, pipe2, pipe3, right, Parser};

/// Any range. Discontiguous forms are tried first so the longest list wins.
pub fn range<'a>() -> Parser<'a, Range> {
    choices(vec![
        discontiguous(address_r1c1()),
        discontiguous(address_a1()),
        contiguous(address_r1c1()),
        contiguous(address_a1()),
    ])
}

/// A single `top_left:bottom_right` region. Used where `,` means something else.
pub fn range_contiguous<'a>() -> Parser<'a, Range> {
    choice(&contiguous(address_r1c1()), &contiguous(address_a1()))
}

fn contiguous<'a>(address: Parser<'a, Address>) -> Parser<'a, Range> {
    pipe3(&address, &char(':'), &address, |top_left, _, bottom_right| {
        Range::contiguous(top_left, bottom_right)
    })
}

fn discontiguous<'a>(address: Parser<'a, Address>) -> Parser<'a, Range> {
    let region = contiguous(address);
    pipe2(&region, &many1(&right(&comma(), &region)), |first, rest| {
        rest.iter().fold(first, |acc, next| acc.merge(next))
    })
}
