//! Ship kinds and placed ships using our `BitBoard`.

use core::fmt;

use crate::common::{CellSet, Coordinate, PlacementError};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Kind of ship in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    /// Ship's name.
    pub const fn name(&self) -> &'static str {
        match self {
            ShipKind::Carrier => "Carrier",
            ShipKind::Battleship => "Battleship",
            ShipKind::Cruiser => "Cruiser",
            ShipKind::Submarine => "Submarine",
            ShipKind::Destroyer => "Destroyer",
        }
    }

    /// Ship's length.
    pub const fn length(&self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser | ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }

    /// Position of this kind in the fleet order.
    pub fn fleet_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cells a ship of `kind` would cover from `origin`, extending right or down.
pub fn footprint(
    kind: ShipKind,
    origin: Coordinate,
    orientation: Orientation,
) -> Result<CellSet, PlacementError> {
    let mut cells = CellSet::new();
    for i in 0..kind.length() as u8 {
        let cell = match orientation {
            Orientation::Horizontal => Coordinate::new(origin.row, origin.col.saturating_add(i)),
            Orientation::Vertical => Coordinate::new(origin.row.saturating_add(i), origin.col),
        };
        if !cell.in_bounds() {
            return Err(PlacementError::OutOfBounds);
        }
        cells.insert(cell)?;
    }
    Ok(cells)
}

/// A ship placed on the board, with hits tracked in a `BitBoard`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    kind: ShipKind,
    origin: Coordinate,
    orientation: Orientation,
    cells: CellSet,
    hits: CellSet,
}

impl Ship {
    /// Place a ship at `origin` with `orientation`.
    pub fn new(
        kind: ShipKind,
        origin: Coordinate,
        orientation: Orientation,
    ) -> Result<Self, PlacementError> {
        let cells = footprint(kind, origin, orientation)?;
        Ok(Ship {
            kind,
            origin,
            orientation,
            cells,
            hits: CellSet::new(),
        })
    }

    /// Register a hit at `coord`. Returns `true` if the cell belongs to this ship.
    pub fn register_hit(&mut self, coord: Coordinate) -> bool {
        if self.cells.contains(coord) {
            let _ = self.hits.insert(coord);
            true
        } else {
            false
        }
    }

    /// Check if the ship is sunk (all segments hit).
    pub fn is_sunk(&self) -> bool {
        self.hits.len() == self.cells.len()
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupied cells.
    pub fn cells(&self) -> CellSet {
        self.cells
    }

    /// Cells that have been hit; always a subset of [`Ship::cells`].
    pub fn hit_cells(&self) -> CellSet {
        self.hits
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ kind: {}, origin: {}, orientation: {:?}, hits: {}/{} }}",
            self.kind,
            self.origin,
            self.orientation,
            self.hits.len(),
            self.cells.len(),
        )
    }
}
