//! Fleet placement: constrained random placement and sequential manual placement.
//!
//! Random placement keeps a one-cell gap between ships so that a forced layout
//! stays solvable; manual placement only rejects overlap and lets ships touch.

use rand::Rng;

use crate::board::BoardState;
use crate::common::{CellSet, Coordinate, PlacementError};
use crate::config::{BOARD_SIZE, FLEET, FLEET_PLACEMENT_ATTEMPTS, MAX_PLACEMENT_TRIALS};
use crate::ship::{footprint, Orientation, Ship, ShipKind};

/// Rejects `cells` if they overlap or touch anything already on `board`.
fn check_spacing(board: &BoardState, cells: CellSet) -> Result<(), PlacementError> {
    let occupied = board.occupied();
    if !cells.is_disjoint(&occupied) {
        return Err(PlacementError::Overlaps);
    }
    if !cells.is_disjoint(&occupied.dilated()) {
        return Err(PlacementError::Adjacent);
    }
    Ok(())
}

/// One random trial for `kind`: random orientation, random anchor anywhere on the grid.
fn random_trial<R: Rng + ?Sized>(board: &BoardState, kind: ShipKind, rng: &mut R) -> Option<Ship> {
    let orientation = if rng.random_bool(0.5) {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    };
    let origin = Coordinate::new(
        rng.random_range(0..BOARD_SIZE),
        rng.random_range(0..BOARD_SIZE),
    );
    let ship = Ship::new(kind, origin, orientation).ok()?;
    check_spacing(board, ship.cells()).ok()?;
    Some(ship)
}

/// Replace `board` with a freshly randomized fleet.
///
/// Each kind gets up to [`MAX_PLACEMENT_TRIALS`] trials. The fleet is built on
/// a scratch board, so on [`PlacementError::Exhausted`] `board` is left as it was.
pub fn place_random<R: Rng + ?Sized>(board: &mut BoardState, rng: &mut R) -> Result<(), PlacementError> {
    let mut scratch = BoardState::new();
    for kind in FLEET {
        let ship = (0..MAX_PLACEMENT_TRIALS)
            .find_map(|_| random_trial(&scratch, kind, rng))
            .ok_or(PlacementError::Exhausted { kind })?;
        scratch.commit(ship);
    }
    *board = scratch;
    Ok(())
}

/// [`place_random`] retried for the whole fleet with fresh randomness.
pub fn place_fleet_random<R: Rng + ?Sized>(
    board: &mut BoardState,
    rng: &mut R,
) -> Result<(), PlacementError> {
    let mut last = PlacementError::Exhausted { kind: FLEET[0] };
    for attempt in 1..=FLEET_PLACEMENT_ATTEMPTS {
        match place_random(board, rng) {
            Ok(()) => return Ok(()),
            Err(e) => {
                log::debug!("random fleet attempt {} failed: {}", attempt, e);
                last = e;
            }
        }
    }
    log::warn!("random placement gave up after {} attempts", FLEET_PLACEMENT_ATTEMPTS);
    Err(last)
}

/// Place the fleet kind at `cursor` from `origin` along `orientation`.
///
/// Only bounds and overlap are checked. On failure `board` is unchanged.
pub fn place_manual(
    board: &mut BoardState,
    cursor: usize,
    origin: Coordinate,
    orientation: Orientation,
) -> Result<Ship, PlacementError> {
    let kind = *FLEET.get(cursor).ok_or(PlacementError::FleetComplete)?;
    let cells = footprint(kind, origin, orientation)?;
    if !cells.is_disjoint(&board.occupied()) {
        return Err(PlacementError::Overlaps);
    }
    let ship = Ship::new(kind, origin, orientation)?;
    board.commit(ship);
    Ok(ship)
}

/// Manual placement state: which fleet kind comes next and the current orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    cursor: usize,
    orientation: Orientation,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index into the fleet of the next kind to place.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Kind the next manual placement will use.
    pub fn next_kind(&self) -> Option<ShipKind> {
        FLEET.get(self.cursor).copied()
    }

    /// Flip orientation for the next placement; returns the new value.
    pub fn toggle_orientation(&mut self) -> Orientation {
        self.orientation = self.orientation.toggled();
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Place the next kind at `origin`, advancing the cursor on success.
    pub fn place_manual(
        &mut self,
        board: &mut BoardState,
        origin: Coordinate,
    ) -> Result<Ship, PlacementError> {
        let ship = place_manual(board, self.cursor, origin, self.orientation)?;
        self.cursor += 1;
        Ok(ship)
    }

    /// Randomize the whole fleet; the cursor ends past the last kind.
    pub fn place_random<R: Rng + ?Sized>(
        &mut self,
        board: &mut BoardState,
        rng: &mut R,
    ) -> Result<(), PlacementError> {
        place_fleet_random(board, rng)?;
        self.cursor = board.ships().len();
        Ok(())
    }

    /// Placement that continues after the ships already on `board`.
    pub fn resume(board: &BoardState) -> Self {
        Placement {
            cursor: board.ships().len(),
            orientation: Orientation::default(),
        }
    }

    /// Reset `board` to a fresh empty board and rewind the cursor.
    pub fn clear(&mut self, board: &mut BoardState) {
        *board = BoardState::new();
        self.cursor = 0;
    }
}
