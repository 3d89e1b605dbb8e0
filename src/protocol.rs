#![cfg(feature = "std")]

//! Wire messages exchanged between host, joiner and spectators.
//!
//! Every frame is one JSON object whose `"type"` field selects the message
//! kind, e.g. `{"type":"shot","from":"host","coordinate":{"row":3,"col":4}}`.

use serde::{Deserialize, Serialize};

use crate::common::{CellSet, Coordinate};
use crate::ship::{Ship, ShipKind};

/// One of the two playing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "host")]
    Host,
    #[serde(rename = "join")]
    Joiner,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::Host => Side::Joiner,
            Side::Joiner => Side::Host,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Host => 0,
            Side::Joiner => 1,
        }
    }
}

/// Author of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatOrigin {
    Host,
    Join,
    Spectate,
}

/// A ship's full position, revealed to spectators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipReport {
    pub kind: ShipKind,
    pub cells: Vec<Coordinate>,
}

impl ShipReport {
    pub fn cell_set(&self) -> CellSet {
        self.cells.iter().copied().collect()
    }
}

impl From<&Ship> for ShipReport {
    fn from(ship: &Ship) -> Self {
        ShipReport {
            kind: ship.kind(),
            cells: ship.cells().iter().collect(),
        }
    }
}

/// Messages exchanged over a session channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// `who` has finished placing its fleet.
    Ready { who: Side },
    /// `from` fires at `coordinate` on the other side's board.
    Shot { from: Side, coordinate: Coordinate },
    /// Board owner `from` reports how a shot at its board resolved.
    #[serde(rename = "result")]
    ShotResult {
        from: Side,
        coordinate: Coordinate,
        hit: bool,
        #[serde(rename = "sunkKind", default, skip_serializing_if = "Option::is_none")]
        sunk_kind: Option<ShipKind>,
    },
    /// Turn passes to `who`.
    Turn { who: Side },
    /// `who` sank the whole opposing fleet.
    Win { who: Side },
    /// Full fleet of `who`, for spectators only.
    Ships { who: Side, ships: Vec<ShipReport> },
    /// Chat line; flows in every direction.
    Chat {
        from: ChatOrigin,
        name: String,
        text: String,
    },
}

impl Message {
    /// Short kind name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Ready { .. } => "ready",
            Message::Shot { .. } => "shot",
            Message::ShotResult { .. } => "result",
            Message::Turn { .. } => "turn",
            Message::Win { .. } => "win",
            Message::Ships { .. } => "ships",
            Message::Chat { .. } => "chat",
        }
    }
}

/// Serialize a message into one frame.
pub fn encode(msg: &Message) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(msg)
}

/// Parse one frame.
pub fn decode(frame: &[u8]) -> serde_json::Result<Message> {
    serde_json::from_slice(frame)
}
