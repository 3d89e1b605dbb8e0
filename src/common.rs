//! Common types: coordinates, shot outcomes and placement errors.

use core::fmt;

use crate::bitboard::{BitBoard, BitBoardError};
use crate::config::BOARD_SIZE;
use crate::ship::ShipKind;

/// Set of cells on the standard grid.
pub type CellSet = BitBoard<u128, { BOARD_SIZE as usize }>;

/// A `(row, col)` cell on the grid. Row 0 is the top row, col 0 the left column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub row: u8,
    pub col: u8,
}

impl Coordinate {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Whether the coordinate lies on the standard grid.
    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// The cell `(dr, dc)` away on an `N×N` grid, if it exists.
    pub fn offset<const N: usize>(self, dr: i16, dc: i16) -> Option<Coordinate> {
        let r = self.row as i16 + dr;
        let c = self.col as i16 + dc;
        if r < 0 || c < 0 || r >= N as i16 || c >= N as i16 {
            return None;
        }
        Some(Coordinate::new(r as u8, c as u8))
    }

    /// Orthogonal in-bounds neighbours: down, up, right, left.
    pub fn neighbors(self) -> impl Iterator<Item = Coordinate> {
        [(1i16, 0i16), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .filter_map(move |(dr, dc)| self.offset::<{ BOARD_SIZE as usize }>(dr, dc))
    }

    /// Checkerboard parity class used by the hunting AI.
    pub fn is_even(&self) -> bool {
        (self.row + self.col) % 2 == 0
    }
}

/// Formats as column letter plus 1-based row, e.g. `B7`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row as u16 + 1)
    }
}

/// Result of firing at a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Cell was already shot; nothing changed.
    Duplicate,
    /// Shot landed on open water.
    Miss,
    /// Shot hit a ship, carrying its kind when that hit sank it.
    Hit { sunk: Option<ShipKind> },
}

impl ShotOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, ShotOutcome::Hit { .. })
    }
}

/// Errors returned by fleet placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Some ship cell falls outside the grid.
    OutOfBounds,
    /// Ship would share a cell with an already placed ship.
    Overlaps,
    /// Ship would touch another ship (random placement only).
    Adjacent,
    /// All fleet kinds are already placed.
    FleetComplete,
    /// A fleet handed over for play is missing ships or has been fired at.
    Incomplete,
    /// Placement is locked once readiness has been signalled.
    Locked,
    /// Random placement ran out of trials for this kind.
    Exhausted { kind: ShipKind },
}

impl PlacementError {
    /// Validation failures can be retried with different input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, PlacementError::Exhausted { .. })
    }
}

impl From<BitBoardError> for PlacementError {
    fn from(_: BitBoardError) -> Self {
        PlacementError::OutOfBounds
    }
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "Ship placement is out of bounds"),
            PlacementError::Overlaps => write!(f, "Ship placement overlaps with another ship"),
            PlacementError::Adjacent => write!(f, "Ship placement touches another ship"),
            PlacementError::FleetComplete => write!(f, "All ships are already placed"),
            PlacementError::Incomplete => write!(f, "Fleet is not ready for play"),
            PlacementError::Locked => write!(f, "Placement is locked"),
            PlacementError::Exhausted { kind } => {
                write!(f, "Unable to place {} after exhausting all trials", kind.name())
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}
