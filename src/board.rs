//! Board state and shot resolution, using `BitBoard` cell sets and `Ship`s.

use alloc::vec::Vec;

use crate::bitboard::BitBoardError;
use crate::common::{CellSet, Coordinate, ShotOutcome};
use crate::config::{FLEET, NUM_SHIPS};
use crate::ship::{Ship, ShipKind};

/// One side's authoritative board: ship placements, shots, hits and misses.
///
/// `occupied` is always the union of the ship cells, `hits` and `misses`
/// partition `shots`. Only placement and [`BoardState::apply_shot`] mutate it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardState {
    ships: Vec<Ship>,
    occupied: CellSet,
    shots: CellSet,
    hits: CellSet,
    misses: CellSet,
}

impl BoardState {
    /// Create an empty board (no ships placed, no shots).
    pub fn new() -> Self {
        Self::default()
    }

    /// Placed ships in fleet order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Board occupancy of all ships.
    pub fn occupied(&self) -> CellSet {
        self.occupied
    }

    pub fn shots(&self) -> CellSet {
        self.shots
    }

    pub fn hits(&self) -> CellSet {
        self.hits
    }

    pub fn misses(&self) -> CellSet {
        self.misses
    }

    /// True once every fleet kind has been placed.
    pub fn is_fleet_complete(&self) -> bool {
        self.ships.len() == NUM_SHIPS
    }

    /// Kind the next placement must use, or `None` when the fleet is complete.
    pub fn next_kind(&self) -> Option<ShipKind> {
        FLEET.get(self.ships.len()).copied()
    }

    /// Append an already validated ship.
    pub(crate) fn commit(&mut self, ship: Ship) {
        self.occupied = self.occupied | ship.cells();
        self.ships.push(ship);
    }

    /// A new board carrying the same fleet with no shots fired.
    pub fn refitted(&self) -> BoardState {
        let mut fresh = BoardState::new();
        for ship in &self.ships {
            if let Ok(s) = Ship::new(ship.kind(), ship.origin(), ship.orientation()) {
                fresh.commit(s);
            }
        }
        fresh
    }

    /// Fire at `coord`.
    ///
    /// Re-firing at a shot cell returns [`ShotOutcome::Duplicate`] and leaves
    /// the board untouched; out-of-bounds coordinates are an error.
    pub fn apply_shot(&mut self, coord: Coordinate) -> Result<ShotOutcome, BitBoardError> {
        if !coord.in_bounds() {
            return Err(BitBoardError::OutOfBounds(coord));
        }
        if self.shots.contains(coord) {
            return Ok(ShotOutcome::Duplicate);
        }
        self.shots.insert(coord)?;
        if !self.occupied.contains(coord) {
            self.misses.insert(coord)?;
            return Ok(ShotOutcome::Miss);
        }
        self.hits.insert(coord)?;
        let sunk = self
            .ships
            .iter_mut()
            .find(|s| s.cells().contains(coord))
            .and_then(|ship| {
                ship.register_hit(coord);
                ship.is_sunk().then(|| ship.kind())
            });
        Ok(ShotOutcome::Hit { sunk })
    }

    /// Returns `true` when every ship is sunk (vacuously for an empty fleet).
    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }

    /// Per-ship `(kind, hit count, sunk)` for fleet listings.
    pub fn fleet_status(&self) -> impl Iterator<Item = (ShipKind, usize, bool)> + '_ {
        self.ships
            .iter()
            .map(|s| (s.kind(), s.hit_cells().len(), s.is_sunk()))
    }
}

/// A side's record of its own shots against the unseen opponent board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemoteView {
    shots: CellSet,
    hits: CellSet,
    misses: CellSet,
    sunk: [bool; NUM_SHIPS],
}

impl RemoteView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shots(&self) -> CellSet {
        self.shots
    }

    pub fn hits(&self) -> CellSet {
        self.hits
    }

    pub fn misses(&self) -> CellSet {
        self.misses
    }

    pub fn has_shot(&self, coord: Coordinate) -> bool {
        self.shots.contains(coord)
    }

    /// Record a reported result. Returns `false` if the cell was already recorded.
    pub fn record(&mut self, coord: Coordinate, hit: bool, sunk: Option<ShipKind>) -> bool {
        match self.shots.insert(coord) {
            Ok(true) => {}
            _ => return false,
        }
        let _ = if hit {
            self.hits.insert(coord)
        } else {
            self.misses.insert(coord)
        };
        if let Some(kind) = sunk {
            self.sunk[kind.fleet_index()] = true;
        }
        true
    }

    /// Kinds reported sunk so far, in fleet order.
    pub fn sunk_kinds(&self) -> impl Iterator<Item = ShipKind> + '_ {
        FLEET
            .iter()
            .zip(self.sunk.iter())
            .filter(|(_, sunk)| **sunk)
            .map(|(kind, _)| *kind)
    }

    /// Lengths of kinds not yet reported sunk; zero for sunk kinds.
    pub fn remaining_lengths(&self) -> [usize; NUM_SHIPS] {
        core::array::from_fn(|i| if self.sunk[i] { 0 } else { FLEET[i].length() })
    }

    /// True once every fleet kind has been reported sunk.
    pub fn all_sunk(&self) -> bool {
        self.sunk.iter().all(|s| *s)
    }
}
