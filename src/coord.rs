//! Coordinate tokens: one row letter (`A`-based) followed by a 1-based column number.

use alloc::string::{String, ToString};

use crate::common::CoordinateError;

/// Parse a token like `B2` into zero-based `(row, col)` on a `board_size` grid.
pub fn parse_coordinate(token: &str, board_size: usize) -> Result<(usize, usize), CoordinateError> {
    let token = token.trim();
    let mut chars = token.chars();
    let (Some(first), true) = (chars.next(), token.chars().count() >= 2) else {
        return Err(CoordinateError::TooShort);
    };
    let row_letter = first.to_ascii_uppercase();
    if !row_letter.is_ascii_uppercase() {
        return Err(CoordinateError::InvalidRow(row_letter));
    }
    let row = (row_letter as u8 - b'A') as usize;
    if row >= board_size {
        return Err(CoordinateError::InvalidRow(row_letter));
    }

    let digits = chars.as_str();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoordinateError::InvalidColumn(digits.to_string()));
    }
    // all-digit strings only fail to parse on overflow
    let column = digits.parse::<usize>().unwrap_or(usize::MAX);
    if column == 0 || column > board_size {
        return Err(CoordinateError::ColumnOutOfBounds(column));
    }
    Ok((row, column - 1))
}

/// Format zero-based `(row, col)` back into its token, e.g. `(1, 1)` -> `B2`.
pub fn format_coordinate(row: usize, col: usize) -> String {
    let mut out = String::new();
    out.push(row_label(row));
    out.push_str(&(col + 1).to_string());
    out
}

/// Letter labelling `row` (`0` -> `A`).
pub fn row_label(row: usize) -> char {
    (b'A' + row as u8) as char
}
