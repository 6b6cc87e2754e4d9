//! Column letters for A1 notation.
//!
//! Columns use a bijective base-26 numeral system with no zero digit: `A` is `1`, `Z` is `26`,
//! `AA` is `27`, and so on. Indices here are **1-based**, matching the A1 text.

/// Convert 1-based column letters (e.g. `XY`) into a column index (`649`).
///
/// Returns `None` for empty input, anything other than `A`-`Z`, or an index that does not fit
/// in a `u32`.
pub fn column_letters_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        let digit = u32::from(b - b'A') + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col)
}

/// Convert a 1-based column index into its letters.
///
/// `0` has no representation and yields an empty string.
pub fn index_to_column_letters(index: u32) -> String {
    let mut out = Vec::<u8>::new();
    let mut quot = index;
    while quot > 0 {
        let rem = quot % 26;
        quot /= 26;
        if rem == 0 {
            out.push(b'Z');
            quot -= 1;
        } else {
            out.push(b'A' + (rem - 1) as u8);
        }
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}
