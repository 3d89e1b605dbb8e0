use rand::rngs::SmallRng;

use crate::{
    board::{BoardState, RemoteView},
    common::{Coordinate, PlacementError, ShotOutcome},
    ship::ShipKind,
};

/// Interface implemented by the different kinds of player driving a side.
pub trait Player: Send {
    /// Place the whole fleet onto the provided empty board.
    fn place_fleet(&mut self, rng: &mut SmallRng, board: &mut BoardState) -> Result<(), PlacementError>;

    /// Choose the next cell to fire at given this side's shot record.
    fn select_target(&mut self, rng: &mut SmallRng, view: &RemoteView) -> Coordinate;

    /// Inform the player how its last shot resolved.
    fn handle_shot_result(&mut self, _coord: Coordinate, _hit: bool, _sunk: Option<ShipKind>) {}

    /// Inform the player of an opponent shot against its board.
    fn handle_opponent_shot(&mut self, _coord: Coordinate, _outcome: ShotOutcome) {}

    /// Chat line the player typed since the last call, if any.
    fn take_chat(&mut self) -> Option<alloc::string::String> {
        None
    }
}
