//! Ship definitions and the per-ship bookkeeping used for sink detection.

use alloc::collections::BTreeSet;
use core::fmt;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Parse the single-letter orientation token (`H` or `V`, any case).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            t if t.eq_ignore_ascii_case("h") => Some(Orientation::Horizontal),
            t if t.eq_ignore_ascii_case("v") => Some(Orientation::Vertical),
            _ => None,
        }
    }

    /// The `(row, col)` cell `offset` steps away from `origin` along this orientation.
    pub fn step(self, origin: (usize, usize), offset: usize) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (origin.0, origin.1 + offset),
            Orientation::Vertical => (origin.0 + offset, origin.1),
        }
    }

    pub fn letter(self) -> char {
        match self {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (size {})", self.name, self.length)
    }
}

/// A ship on the board together with the coordinates that have not been hit yet.
///
/// The ship is sunk exactly when `afloat` becomes empty.
#[derive(Clone, PartialEq, Eq)]
pub struct PlacedShip {
    ship_type: ShipType,
    orientation: Orientation,
    origin: (usize, usize),
    afloat: BTreeSet<(usize, usize)>,
}

impl PlacedShip {
    pub(crate) fn new(ship_type: ShipType, orientation: Orientation, origin: (usize, usize)) -> Self {
        let afloat = (0..ship_type.length())
            .map(|i| orientation.step(origin, i))
            .collect();
        Self {
            ship_type,
            orientation,
            origin,
            afloat,
        }
    }

    /// Remove `cell` from the un-hit set. Returns `true` if the ship occupied it.
    pub(crate) fn strike(&mut self, cell: (usize, usize)) -> bool {
        self.afloat.remove(&cell)
    }

    pub fn occupies(&self, cell: (usize, usize)) -> bool {
        (0..self.ship_type.length()).any(|i| self.orientation.step(self.origin, i) == cell)
    }

    pub fn is_sunk(&self) -> bool {
        self.afloat.is_empty()
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn name(&self) -> &'static str {
        self.ship_type.name()
    }

    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of segments still afloat.
    pub fn remaining(&self) -> usize {
        self.afloat.len()
    }
}

impl fmt::Debug for PlacedShip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlacedShip {{ name: \"{}\", origin: ({}, {}), orientation: {:?}, afloat: {} }}",
            self.ship_type.name(),
            self.origin.0,
            self.origin.1,
            self.orientation,
            self.afloat.len(),
        )
    }
}
