// Hunt/target shot selection for the opponent board.
// Uses no_std; the candidate queue is the only heap allocation.

use alloc::collections::VecDeque;
use rand::Rng;

use crate::common::{CellSet, Coordinate};
use crate::config::{BOARD_SIZE, FALLBACK_TARGET, HUNT_SAMPLES};

/// Search phase of the [`TargetingAi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    /// No pending lead: sample unvisited cells on one checkerboard parity.
    Hunt,
    /// Working through cells adjacent to earlier hits.
    Target,
}

/// Stateful coordinate picker that never repeats a marked cell.
#[derive(Debug, Clone, Default)]
pub struct TargetingAi {
    visited: CellSet,
    queue: VecDeque<Coordinate>,
}

impl TargetingAi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target while candidates are queued, hunt otherwise.
    pub fn mode(&self) -> AiMode {
        if self.queue.iter().any(|c| !self.visited.contains(*c)) {
            AiMode::Target
        } else {
            AiMode::Hunt
        }
    }

    /// Cells already marked.
    pub fn visited(&self) -> CellSet {
        self.visited
    }

    /// Choose the next cell to fire at.
    ///
    /// Queued neighbours of earlier hits come first. Otherwise up to
    /// [`HUNT_SAMPLES`] random even-parity cells are tried, then a row-major
    /// scan; a fully visited board yields [`FALLBACK_TARGET`].
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Coordinate {
        while let Some(candidate) = self.queue.pop_front() {
            if !self.visited.contains(candidate) {
                return candidate;
            }
        }
        for _ in 0..HUNT_SAMPLES {
            let c = Coordinate::new(
                rng.random_range(0..BOARD_SIZE),
                rng.random_range(0..BOARD_SIZE),
            );
            if c.is_even() && !self.visited.contains(c) {
                return c;
            }
        }
        (!self.visited).iter().next().unwrap_or(FALLBACK_TARGET)
    }

    /// Record the outcome of firing at `coord`; hits queue their unvisited neighbours.
    pub fn mark(&mut self, coord: Coordinate, hit: bool) {
        let _ = self.visited.insert(coord);
        if hit {
            let visited = self.visited;
            self.queue
                .extend(coord.neighbors().filter(|n| !visited.contains(*n)));
        }
    }
}
