#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod ai;
mod bitboard;
mod board;
mod common;
mod config;
mod placement;
mod player;
mod player_ai;
mod ship;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod player_cli;
#[cfg(feature = "std")]
pub mod node;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod ui;

pub use ai::*;
pub use bitboard::{BitBoard, BitBoardError};
pub use board::*;
pub use common::*;
pub use config::*;
pub use placement::*;
pub use player::*;
pub use player_ai::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use logging::{init_logging, parse_level, target_filter, LOG_ENV};
#[cfg(feature = "std")]
pub use node::{run_solo, ChatInput, SessionNode, SpectatorAttacher};
#[cfg(feature = "std")]
pub use player_cli::*;
#[cfg(feature = "std")]
pub use protocol::{ChatOrigin, Message, ShipReport, Side};
#[cfg(feature = "std")]
pub use session::{
    Envelope, EventSink, Mirror, Phase, ProtocolError, Role, Route, Session, SessionEvent, Source,
    SpectatorId, Step,
};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
