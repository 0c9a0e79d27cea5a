//! Text rendering of boards for the line protocol.
//!
//! A board dump is a `GRID` line, a header of right-aligned column numbers,
//! one line per row (`A`, `B`, ... label followed by cell glyphs) and a
//! terminating blank line.

use alloc::string::String;
use core::fmt::Write;

use crate::board::{Board, Cell, Mark};
use crate::coord::row_label;

/// First line of every board dump.
pub const GRID_HEADER: &str = "GRID";

/// Which layer of a board to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Display layer: `.` unknown, `X` hit, `o` miss.
    Opponent,
    /// Hidden layer as the owner sees it: additionally `S` for intact ship cells.
    Owner,
}

fn glyph(board: &Board, view: View, row: usize, col: usize) -> char {
    match view {
        View::Opponent => match board.mark(row, col) {
            Some(Mark::Hit) => 'X',
            Some(Mark::Miss) => 'o',
            _ => '.',
        },
        View::Owner => match board.cell(row, col) {
            Some(Cell::Ship) => 'S',
            Some(Cell::Hit) => 'X',
            Some(Cell::Miss) => 'o',
            _ => '.',
        },
    }
}

/// Render `board` as a complete `GRID` block.
///
/// The text ends with the newline of the last row; the sender's own line
/// terminator then produces the blank line that closes the block.
pub fn grid_dump(board: &Board, view: View) -> String {
    let size = board.size();
    let mut out = String::new();
    out.push_str(GRID_HEADER);
    out.push('\n');
    out.push_str("  ");
    for c in 0..size {
        let _ = write!(out, "{:>2}", c + 1);
    }
    out.push('\n');
    for r in 0..size {
        let _ = write!(out, "{:<2}", row_label(r));
        for c in 0..size {
            out.push(' ');
            out.push(glyph(board, view, r, c));
        }
        out.push('\n');
    }
    out
}
