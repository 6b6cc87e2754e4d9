//! Single-cell addresses in A1 (`$B$3`) and R1C1 (`R[-1]C2`) notation.
//!
//! Addresses come out with the blank [`Env`]; callers that saw a sheet prefix attach it
//! afterwards.

use super::primitives::{is_ident_char, positive_int, signed_int};
use crate::ast::{Address, AddressMode, AxisRef, Env};
use crate::column::column_letters_to_index;
use crate::combinator::{
    between, char, choice, choices, left, many1, not_followed_by, optional, pipe2, right, satisfy,
    upper, Parser,
};

/// R1C1 first, then A1.
///
/// An R1C1 match that runs into more address text (`RCA5`, `RC$5`) is dropped in favour of
/// A1. `RC5` remains ambiguous and reads as R1C1.
pub fn address<'a>() -> Parser<'a, Address> {
    let r1c1 = left(
        &address_r1c1(),
        &not_followed_by(
            &satisfy(|c| is_ident_char(c) || c == '$', "address character"),
            "address character",
        ),
    );
    choice(&r1c1, &address_a1())
}

pub fn address_r1c1<'a>() -> Parser<'a, Address> {
    pipe2(&axis('R'), &axis('C'), |row, column| (row, column)).try_map(|(row, column)| {
        Address::r1c1(row, column, Env::default()).map_err(|err| err.to_string())
    })
}

/// One R1C1 component: `R[-2]` is an offset, `R5` an absolute position, and a bare `R` the
/// current row.
fn axis<'a>(letter: char) -> Parser<'a, AxisRef> {
    let offset = right(
        &char(letter),
        &between(&char('['), &char(']'), &signed_int()),
    )
    .map(AxisRef::relative);
    let absolute = right(&char(letter), &positive_int()).map(AxisRef::absolute);
    let current = char(letter).map(|_| AxisRef::relative(0));
    choices(vec![offset, absolute, current])
}

pub fn address_a1<'a>() -> Parser<'a, Address> {
    let column = pipe2(&optional(&char('$')), &column_index(), |dollar, value| {
        AxisRef::new(value, mode(dollar))
    });
    let row = pipe2(&optional(&char('$')), &positive_int(), |dollar, value| {
        AxisRef::new(value, mode(dollar))
    });
    pipe2(&column, &row, |column, row| (column, row)).try_map(|(column, row)| {
        Address::a1(row, column, Env::default()).map_err(|err| err.to_string())
    })
}

fn mode(dollar: Option<char>) -> AddressMode {
    if dollar.is_some() {
        AddressMode::Absolute
    } else {
        AddressMode::Relative
    }
}

fn column_index<'a>() -> Parser<'a, i32> {
    many1(&upper()).try_map(|letters| {
        let letters: String = letters.into_iter().collect();
        column_letters_to_index(&letters)
            .and_then(|index| i32::try_from(index).ok())
            .ok_or("column out of range")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Notation;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Address {
        match address().run(input) {
            Ok(s) => s.value,
            Err(f) => panic!("{input}: {f}"),
        }
    }

    #[test]
    fn a1_modes() {
        let cell = parse("$B3");
        assert_eq!((cell.row(), cell.column()), (3, 2));
        assert_eq!(cell.col_mode(), AddressMode::Absolute);
        assert_eq!(cell.row_mode(), AddressMode::Relative);
        assert_eq!(cell.notation(), Notation::A1);
        assert_eq!(cell.to_formula(), "$B3");
    }

    #[test]
    fn r1c1_axes() {
        let cell = parse("R[-3]C7");
        assert_eq!((cell.row(), cell.column()), (-3, 7));
        assert_eq!(cell.row_mode(), AddressMode::Relative);
        assert_eq!(cell.col_mode(), AddressMode::Absolute);
        assert_eq!(cell.notation(), Notation::R1C1);

        let here = parse("RC");
        assert_eq!((here.row(), here.column()), (0, 0));
        assert_eq!(here.to_formula(), "RC");
    }

    #[test]
    fn r1c1_wins_over_a1() {
        // `RC1` would also read as column RC, row 1.
        assert_eq!(parse("RC1").notation(), Notation::R1C1);
        assert_eq!(parse("C1").notation(), Notation::A1);
    }

    #[test]
    fn a1_columns_starting_with_rc() {
        let cell = parse("RCA5");
        assert_eq!(cell.notation(), Notation::A1);
        assert_eq!(cell.to_formula(), "RCA5");
        assert_eq!(parse("RC$5").notation(), Notation::A1);
        assert_eq!(parse("RC5").notation(), Notation::R1C1);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(address().run("A0").is_err());
        assert!(address().run("R0C1").is_err());
        assert!(address().run("A99999999999").is_err());
        assert!(address_a1().run("a1").is_err());
    }
}
