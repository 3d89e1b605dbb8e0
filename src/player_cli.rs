#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};

use crate::{
    board::{BoardState, RemoteView},
    common::{Coordinate, PlacementError, ShotOutcome},
    config::BOARD_SIZE,
    placement::{place_fleet_random, Placement},
    ship::{Orientation, ShipKind},
    ui,
};
use rand::rngs::SmallRng;

use crate::player::Player;

/// Human player on stdin/stdout.
pub struct CliPlayer {
    manual: bool,
    chat: Option<String>,
}

impl CliPlayer {
    /// `manual` asks for every ship position instead of randomizing the fleet.
    pub fn new(manual: bool) -> Self {
        Self { manual, chat: None }
    }
}

/// Parse a cell such as `A5` or `j10` (column letter, 1-based row).
pub fn parse_coord(input: &str) -> Option<Coordinate> {
    let input = input.trim();
    let mut chars = input.chars();
    let col_ch = chars.next()?.to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() {
        return None;
    }
    let col = col_ch as u8 - b'A';
    let row: u8 = chars.as_str().parse().ok()?;
    if row == 0 || row > BOARD_SIZE || col >= BOARD_SIZE {
        return None;
    }
    Some(Coordinate::new(row - 1, col))
}

fn prompt(text: &str) -> io::Result<String> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line.trim().to_string())
}

impl CliPlayer {
    fn place_interactive(&mut self, rng: &mut SmallRng, board: &mut BoardState) -> Result<(), PlacementError> {
        println!("Place your ships (e.g. A5 H). Enter for a random fleet, 'clear' to start over.");
        let mut placement = Placement::new();
        while let Some(kind) = placement.next_kind() {
            print!("{}", ui::render_own_board(board));
            let line = match prompt(&format!("Place {} (length {}): ", kind.name(), kind.length())) {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("stdin unavailable ({}), randomizing the fleet", e);
                    String::new()
                }
            };
            if line.is_empty() {
                place_fleet_random(board, rng)?;
                break;
            }
            if line.eq_ignore_ascii_case("clear") {
                placement.clear(board);
                continue;
            }
            let mut parts = line.split_whitespace();
            let coord = parts.next().and_then(parse_coord);
            let orientation = match parts.next().and_then(|p| p.chars().next()) {
                Some('v') | Some('V') => Orientation::Vertical,
                _ => Orientation::Horizontal,
            };
            let Some(origin) = coord else {
                println!("Invalid input");
                continue;
            };
            placement.set_orientation(orientation);
            if let Err(e) = placement.place_manual(board, origin) {
                println!("Error: {}", e);
            }
        }
        print!("{}", ui::render_own_board(board));
        Ok(())
    }
}

impl Player for CliPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng, board: &mut BoardState) -> Result<(), PlacementError> {
        if self.manual {
            self.place_interactive(rng, board)
        } else {
            place_fleet_random(board, rng)?;
            print!("Your fleet:\n{}", ui::render_own_board(board));
            Ok(())
        }
    }

    fn select_target(&mut self, _rng: &mut SmallRng, view: &RemoteView) -> Coordinate {
        println!("\nOpponent board:\n{}", ui::render_remote_view(view));
        println!("Still afloat: {}", ui::render_remaining(view));
        loop {
            let line = match prompt("Fire at (or /say <text>): ") {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("stdin unavailable ({}), firing at the first open cell", e);
                    return (!view.shots()).iter().next().unwrap_or(Coordinate::new(0, 0));
                }
            };
            if let Some(text) = line.strip_prefix("/say ") {
                self.chat = Some(text.to_string());
                continue;
            }
            match parse_coord(&line) {
                Some(coord) if view.has_shot(coord) => println!("Already fired at {}", coord),
                Some(coord) => return coord,
                None => println!("Invalid coordinate"),
            }
        }
    }

    fn handle_shot_result(&mut self, coord: Coordinate, hit: bool, sunk: Option<ShipKind>) {
        match (hit, sunk) {
            (true, Some(kind)) => println!("{}: hit, you sank their {}!", coord, kind),
            (true, None) => println!("{}: hit", coord),
            (false, _) => println!("{}: miss", coord),
        }
    }

    fn handle_opponent_shot(&mut self, coord: Coordinate, outcome: ShotOutcome) {
        println!("Opponent fired at {} -> {:?}", coord, outcome);
    }

    fn take_chat(&mut self) -> Option<String> {
        self.chat.take()
    }
}
