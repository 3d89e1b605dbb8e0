use rand::rngs::SmallRng;

use crate::{
    ai::TargetingAi,
    board::{BoardState, RemoteView},
    common::{Coordinate, PlacementError},
    config::BOARD_SIZE,
    placement::place_fleet_random,
    ship::ShipKind,
};

use crate::player::Player;

/// Computer player: random fleet, hunt/target shot selection.
#[derive(Debug, Clone, Default)]
pub struct AiPlayer {
    ai: TargetingAi,
}

impl AiPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targeting(&self) -> &TargetingAi {
        &self.ai
    }
}

impl Player for AiPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng, board: &mut BoardState) -> Result<(), PlacementError> {
        place_fleet_random(board, rng)
    }

    fn select_target(&mut self, rng: &mut SmallRng, view: &RemoteView) -> Coordinate {
        // Catch up on cells resolved without a result callback.
        for _ in 0..(BOARD_SIZE as usize * BOARD_SIZE as usize) {
            let coord = self.ai.pick(rng);
            if !view.has_shot(coord) {
                return coord;
            }
            self.ai.mark(coord, view.hits().contains(coord));
        }
        self.ai.pick(rng)
    }

    fn handle_shot_result(&mut self, coord: Coordinate, hit: bool, _sunk: Option<ShipKind>) {
        self.ai.mark(coord, hit);
    }
}
