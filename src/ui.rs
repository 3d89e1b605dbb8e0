#![cfg(feature = "std")]

//! Plain-text rendering of boards, fleets and session events for the CLI.

use std::fmt::Write as _;

use crate::{
    board::{BoardState, RemoteView},
    common::{CellSet, Coordinate},
    config::{BOARD_SIZE, FLEET},
    protocol::{ChatOrigin, Side},
    session::{Mirror, Phase, SessionEvent},
};

const SHIP: char = 'S';
const HIT: char = 'X';
const MISS: char = 'o';
const WATER: char = '.';

fn render_grid(mut cell: impl FnMut(Coordinate) -> char) -> String {
    let mut out = String::from("   ");
    for c in 0..BOARD_SIZE {
        let _ = write!(out, " {}", (b'A' + c) as char);
    }
    out.push('\n');
    for r in 0..BOARD_SIZE {
        let _ = write!(out, "{:2} ", r + 1);
        for c in 0..BOARD_SIZE {
            let _ = write!(out, " {}", cell(Coordinate::new(r, c)));
        }
        out.push('\n');
    }
    out
}

fn shot_marks(hits: CellSet, misses: CellSet, ships: CellSet, coord: Coordinate) -> char {
    if hits.contains(coord) {
        HIT
    } else if misses.contains(coord) {
        MISS
    } else if ships.contains(coord) {
        SHIP
    } else {
        WATER
    }
}

/// Own board with ships revealed.
pub fn render_own_board(board: &BoardState) -> String {
    render_grid(|c| shot_marks(board.hits(), board.misses(), board.occupied(), c))
}

/// Shot record against the opponent.
pub fn render_remote_view(view: &RemoteView) -> String {
    render_grid(|c| shot_marks(view.hits(), view.misses(), CellSet::new(), c))
}

/// Spectator copy of one side, ships shown once revealed.
pub fn render_mirror(mirror: &Mirror) -> String {
    let view = mirror.view();
    render_grid(|c| shot_marks(view.hits(), view.misses(), mirror.revealed(), c))
}

/// One line per ship: name, length, damage.
pub fn render_fleet_status(board: &BoardState) -> String {
    let mut out = String::new();
    for (kind, hits, sunk) in board.fleet_status() {
        let state = if sunk {
            "sunk".to_string()
        } else {
            format!("{}/{} hit", hits, kind.length())
        };
        let _ = writeln!(out, "{:<11}({}) {}", kind.name(), kind.length(), state);
    }
    out
}

/// Opponent kinds still afloat, as far as reported.
pub fn render_remaining(view: &RemoteView) -> String {
    let remaining = view.remaining_lengths();
    FLEET
        .iter()
        .zip(remaining.iter())
        .filter(|(_, len)| **len > 0)
        .map(|(kind, len)| format!("{}({})", kind.name(), len))
        .collect::<Vec<_>>()
        .join(", ")
}

fn side_label(side: Side, me: Option<Side>) -> &'static str {
    match (me, side) {
        (Some(me), side) if me == side => "You",
        (Some(_), _) => "Opponent",
        (None, Side::Host) => "Host",
        (None, Side::Joiner) => "Joiner",
    }
}

fn chat_label(origin: ChatOrigin) -> &'static str {
    match origin {
        ChatOrigin::Host => "host",
        ChatOrigin::Join => "join",
        ChatOrigin::Spectate => "spectator",
    }
}

/// Status line for an event as seen by `me` (`None` for spectators).
pub fn describe_event(event: &SessionEvent, me: Option<Side>) -> Option<String> {
    let line = match event {
        SessionEvent::ShipPlaced { kind } => format!("{} placed", kind.name()),
        SessionEvent::FleetPlaced => "Fleet placed".to_string(),
        SessionEvent::PlacementCleared => "Placement cleared".to_string(),
        SessionEvent::ReadinessChanged { side } => format!("{} ready", side_label(*side, me)),
        SessionEvent::PhaseChanged(Phase::AwaitingBothReady) => "Waiting for both players".to_string(),
        SessionEvent::PhaseChanged(Phase::Active) => "Battle begins!".to_string(),
        SessionEvent::PhaseChanged(_) => return None,
        SessionEvent::TurnChanged(side) => match (me, *side) {
            (Some(me), side) if me == side => "Your turn".to_string(),
            (Some(_), _) => "Opponent's turn".to_string(),
            (None, side) => format!("{}'s turn", side_label(side, None)),
        },
        SessionEvent::ShotFired { .. } => return None,
        SessionEvent::ShotResolved {
            target,
            coordinate,
            hit,
            sunk,
        } => {
            let shooter = side_label(target.other(), me);
            let what = match (hit, sunk) {
                (true, Some(kind)) => format!("hit and sank {}", kind.name()),
                (true, None) => "hit".to_string(),
                (false, _) => "missed".to_string(),
            };
            format!("{} fired at {}: {}", shooter, coordinate, what)
        }
        SessionEvent::DuplicateShot { coordinate } => format!("Ignored repeat shot at {}", coordinate),
        SessionEvent::ShipsRevealed { side } => format!("{} fleet revealed", side_label(*side, me)),
        SessionEvent::GameOver { winner } => match me {
            Some(me) if me == *winner => "Victory! Every enemy ship is sunk.".to_string(),
            Some(_) => "Defeat. Your fleet is gone.".to_string(),
            None => format!("{} wins", side_label(*winner, None)),
        },
        SessionEvent::Chat { from, name, text } => {
            format!("[{}] {}: {}", chat_label(*from), name, text)
        }
    };
    Some(line)
}
