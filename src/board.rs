//! Game board state: hidden ship layer, opponent-visible display layer, and placed ships.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use crate::common::{BoardError, FireResult};
use crate::ship::{Orientation, PlacedShip, ShipType};

/// Sampled attempts before random placement falls back to enumerating every free spot.
const RANDOM_ATTEMPTS: usize = 1000;

/// Cell state on the hidden layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Water,
    Ship,
    Hit,
    Miss,
}

/// Cell state on the display layer shown to the opponent and observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Unknown,
    Hit,
    Miss,
}

/// Square board of side `size` holding one seat's own ships.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    hidden: Vec<Cell>,
    display: Vec<Mark>,
    ships: Vec<PlacedShip>,
}

impl Board {
    /// Create an empty board (all water, no ships placed).
    pub fn new(size: usize) -> Self {
        Board {
            size,
            hidden: vec![Cell::Water; size * size],
            display: vec![Mark::Unknown; size * size],
            ships: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ships(&self) -> &[PlacedShip] {
        &self.ships
    }

    /// Hidden-layer state of `(row, col)`, `None` when off the board.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|i| self.hidden[i])
    }

    /// Display-layer state of `(row, col)`, `None` when off the board.
    pub fn mark(&self, row: usize, col: usize) -> Option<Mark> {
        self.index(row, col).map(|i| self.display[i])
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size && col < self.size).then(|| row * self.size + col)
    }

    /// Cells `ship` would cover from `origin`, or the reason it cannot go there.
    fn footprint(
        &self,
        ship: ShipType,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<Vec<usize>, BoardError> {
        if ship.length() == 0 {
            return Err(BoardError::EmptyShip);
        }
        if row >= self.size || col >= self.size {
            return Err(BoardError::ShipOutOfBounds);
        }
        let mut cells = Vec::with_capacity(ship.length());
        for i in 0..ship.length() {
            let (r, c) = orientation.step((row, col), i);
            let idx = self.index(r, c).ok_or(BoardError::ShipOutOfBounds)?;
            cells.push(idx);
        }
        if cells.iter().any(|&i| self.hidden[i] != Cell::Water) {
            return Err(BoardError::ShipOverlaps);
        }
        Ok(cells)
    }

    /// Place `ship` starting at (row, col) and extending along `orientation`.
    ///
    /// Every covered cell must be on the board and still water; on error the
    /// board is unchanged.
    pub fn place(
        &mut self,
        ship: ShipType,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let cells = self.footprint(ship, row, col, orientation)?;
        for idx in cells {
            self.hidden[idx] = Cell::Ship;
        }
        self.ships.push(PlacedShip::new(ship, orientation, (row, col)));
        Ok(())
    }

    /// Returns a random non-overlapping (row, col, Orientation) for `ship`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        ship: ShipType,
    ) -> Result<(usize, usize, Orientation), BoardError> {
        if ship.length() == 0 {
            return Err(BoardError::EmptyShip);
        }
        if self.size == 0 {
            return Err(BoardError::UnableToPlaceShip);
        }
        for _ in 0..RANDOM_ATTEMPTS {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let r = rng.random_range(0..self.size);
            let c = rng.random_range(0..self.size);
            if self.footprint(ship, r, c, orient).is_ok() {
                return Ok((r, c, orient));
            }
        }
        // crowded board: pick uniformly among the spots that are actually free
        let free: Vec<_> = (0..self.size)
            .flat_map(|r| (0..self.size).map(move |c| (r, c)))
            .flat_map(|(r, c)| {
                [Orientation::Horizontal, Orientation::Vertical]
                    .into_iter()
                    .map(move |o| (r, c, o))
            })
            .filter(|&(r, c, o)| self.footprint(ship, r, c, o).is_ok())
            .collect();
        if free.is_empty() {
            return Err(BoardError::UnableToPlaceShip);
        }
        Ok(free[rng.random_range(0..free.len())])
    }

    /// Place every ship of `fleet` at random spots.
    ///
    /// Ships already on the board stay; if the remaining ships cannot fit, the
    /// randomly placed ones are rolled back and the attempt restarts.
    pub fn place_randomly<R: Rng>(
        &mut self,
        rng: &mut R,
        fleet: &[ShipType],
    ) -> Result<(), BoardError> {
        let base = self.clone();
        for _ in 0..RANDOM_ATTEMPTS {
            let placed = fleet.iter().try_for_each(|&ship| {
                let (r, c, o) = self.random_placement(rng, ship)?;
                self.place(ship, r, c, o)
            });
            match placed {
                Ok(()) => return Ok(()),
                Err(BoardError::UnableToPlaceShip) => *self = base.clone(),
                Err(e) => {
                    *self = base;
                    return Err(e);
                }
            }
        }
        *self = base;
        Err(BoardError::UnableToPlaceShip)
    }

    /// Fire at (row, col) and report the outcome.
    ///
    /// Cells already resolved as hit or miss yield `AlreadyTargeted` and are
    /// never mutated again.
    pub fn fire(&mut self, row: usize, col: usize) -> Result<FireResult, BoardError> {
        let idx = self
            .index(row, col)
            .ok_or(BoardError::TargetOutOfBounds { row, col })?;
        match self.hidden[idx] {
            Cell::Hit | Cell::Miss => Ok(FireResult::AlreadyTargeted),
            Cell::Water => {
                self.hidden[idx] = Cell::Miss;
                self.display[idx] = Mark::Miss;
                Ok(FireResult::Miss)
            }
            Cell::Ship => {
                self.hidden[idx] = Cell::Hit;
                self.display[idx] = Mark::Hit;
                let mut sunk = None;
                if let Some(ship) = self.ships.iter_mut().find(|s| s.occupies((row, col))) {
                    if ship.strike((row, col)) && ship.is_sunk() {
                        sunk = Some(ship.name());
                    }
                }
                Ok(FireResult::Hit { sunk })
            }
        }
    }

    /// Returns `true` when every placed ship is sunk.
    pub fn is_cleared(&self) -> bool {
        self.ships.iter().all(|s| s.is_sunk())
    }

    /// Number of hidden-layer cells in `state`.
    pub fn count(&self, state: Cell) -> usize {
        self.hidden.iter().filter(|&&c| c == state).count()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Board {{ size: {}, ships: {:?}, hits: {}, misses: {} }}",
            self.size,
            self.ships,
            self.count(Cell::Hit),
            self.count(Cell::Miss),
        )
    }
}
