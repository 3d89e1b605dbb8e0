#![cfg(feature = "std")]

//! Match state machine shared by every role.
//!
//! A [`Session`] owns one side's authoritative board and its view of the
//! opponent, and turns local inputs and inbound frames into a [`Step`]: the
//! messages to deliver and the events a front end should render. Nothing here
//! touches a transport or a screen.
//!
//! Phases run `Setup -> AwaitingBothReady -> Active -> Finished`. The host is
//! the relay hub: everything it exchanges with the joiner is also fanned out
//! to its spectators, and spectator chat is relayed to the joiner and to the
//! other spectators.

use std::fmt;

use rand::Rng;

use crate::ai::TargetingAi;
use crate::board::{BoardState, RemoteView};
use crate::common::{CellSet, Coordinate, PlacementError, ShotOutcome};
use crate::placement::{place_fleet_random, Placement};
use crate::protocol::{decode, ChatOrigin, Message, ShipReport, Side};
use crate::ship::{Orientation, ShipKind};

/// What this participant is in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Joiner,
    Spectator,
    /// Local player (host side) against the built-in AI (joiner side).
    Solo,
}

impl Role {
    /// Side this role plays, `None` for spectators.
    pub fn side(&self) -> Option<Side> {
        match self {
            Role::Host | Role::Solo => Some(Side::Host),
            Role::Joiner => Some(Side::Joiner),
            Role::Spectator => None,
        }
    }

    fn chat_origin(&self) -> Option<ChatOrigin> {
        match self {
            Role::Host => Some(ChatOrigin::Host),
            Role::Joiner => Some(ChatOrigin::Join),
            Role::Spectator => Some(ChatOrigin::Spectate),
            Role::Solo => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    AwaitingBothReady,
    Active,
    Finished,
}

/// Host-assigned identifier of a spectator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpectatorId(pub u64);

/// Channel an inbound frame arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The host/joiner channel (for a spectator: its channel to the host).
    Peer,
    Spectator(SpectatorId),
}

/// Where an outbound message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Peer,
    /// Every attached spectator, optionally skipping the one a relay came from.
    Spectators { except: Option<SpectatorId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub route: Route,
    pub message: Message,
}

/// State changes a front end may want to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ShipPlaced { kind: ShipKind },
    FleetPlaced,
    PlacementCleared,
    ReadinessChanged { side: Side },
    PhaseChanged(Phase),
    TurnChanged(Side),
    ShotFired { by: Side, coordinate: Coordinate },
    /// A shot at the board owned by `target` resolved.
    ShotResolved {
        target: Side,
        coordinate: Coordinate,
        hit: bool,
        sunk: Option<ShipKind>,
    },
    /// An inbound shot hit an already shot cell; nothing changed.
    DuplicateShot { coordinate: Coordinate },
    ShipsRevealed { side: Side },
    GameOver { winner: Side },
    Chat {
        from: ChatOrigin,
        name: String,
        text: String,
    },
}

/// Outcome of one input-handling step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Step {
    pub outbound: Vec<Envelope>,
    pub events: Vec<SessionEvent>,
}

impl Step {
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.events.is_empty()
    }

    /// Outbound messages addressed to `route`.
    pub fn messages_to(&self, route: Route) -> impl Iterator<Item = &Message> {
        self.outbound
            .iter()
            .filter(move |e| e.route == route)
            .map(|e| &e.message)
    }
}

/// Caller-supplied observer of session events.
pub trait EventSink: Send {
    fn notify(&mut self, event: &SessionEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&SessionEvent) + Send,
{
    fn notify(&mut self, event: &SessionEvent) {
        self(event)
    }
}

/// Reasons an action or inbound message is rejected. No state changes on error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame could not be parsed.
    Malformed(String),
    /// Action not available to this role.
    WrongRole,
    /// Match has not started yet.
    NotActive,
    /// Match is over.
    GameFinished,
    OutOfTurn,
    OutOfBounds,
    /// Cell already fired at.
    AlreadyShot,
    /// A shot is still waiting for its result.
    AwaitingResult,
    /// Result does not answer the pending shot.
    UnexpectedResult,
    /// Message claims to come from a side that did not send it.
    UnexpectedSender,
    AlreadyReady,
    FleetIncomplete,
    /// Spectators may only chat.
    SpectatorGameplay,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "Malformed message: {}", e),
            ProtocolError::WrongRole => write!(f, "Not allowed for this role"),
            ProtocolError::NotActive => write!(f, "Game has not started"),
            ProtocolError::GameFinished => write!(f, "Game is over"),
            ProtocolError::OutOfTurn => write!(f, "Not your turn"),
            ProtocolError::OutOfBounds => write!(f, "Coordinate is off the board"),
            ProtocolError::AlreadyShot => write!(f, "Cell was already fired at"),
            ProtocolError::AwaitingResult => write!(f, "Still waiting for the last shot's result"),
            ProtocolError::UnexpectedResult => write!(f, "Result does not match a pending shot"),
            ProtocolError::UnexpectedSender => write!(f, "Message sender does not match its channel"),
            ProtocolError::AlreadyReady => write!(f, "Side is already ready"),
            ProtocolError::FleetIncomplete => write!(f, "Place the whole fleet first"),
            ProtocolError::SpectatorGameplay => write!(f, "Spectators cannot send gameplay messages"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Spectator's display copy of one side's board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mirror {
    ships: Vec<(ShipKind, CellSet)>,
    revealed: CellSet,
    view: RemoteView,
}

impl Mirror {
    /// Ship positions, once the side has reported them.
    pub fn ships(&self) -> &[(ShipKind, CellSet)] {
        &self.ships
    }

    pub fn revealed(&self) -> CellSet {
        self.revealed
    }

    /// Shots observed against this side.
    pub fn view(&self) -> &RemoteView {
        &self.view
    }

    fn reveal(&mut self, ships: &[ShipReport]) {
        self.ships = ships.iter().map(|s| (s.kind, s.cell_set())).collect();
        self.revealed = self
            .ships
            .iter()
            .fold(CellSet::new(), |acc, (_, cells)| acc | *cells);
    }
}

/// The AI side of a solo match.
#[derive(Debug, Clone)]
struct AiOpponent {
    board: BoardState,
    ai: TargetingAi,
}

/// One participant's view and control of a match.
pub struct Session {
    role: Role,
    name: String,
    phase: Phase,
    turn: Option<Side>,
    ready: [bool; 2],
    board: BoardState,
    placement: Placement,
    view: RemoteView,
    pending: Option<Coordinate>,
    winner: Option<Side>,
    mirrors: [Mirror; 2],
    opponent: Option<AiOpponent>,
    sink: Option<Box<dyn EventSink>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("ready", &self.ready)
            .field("pending", &self.pending)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Networked session for `role`. Use [`Session::solo`] for a match against the AI.
    pub fn new(role: Role, name: impl Into<String>) -> Self {
        Session {
            role,
            name: name.into(),
            phase: Phase::Setup,
            turn: None,
            ready: [false; 2],
            board: BoardState::new(),
            placement: Placement::new(),
            view: RemoteView::new(),
            pending: None,
            winner: None,
            mirrors: Default::default(),
            opponent: None,
            sink: None,
        }
    }

    pub fn host(name: impl Into<String>) -> Self {
        Self::new(Role::Host, name)
    }

    pub fn joiner(name: impl Into<String>) -> Self {
        Self::new(Role::Joiner, name)
    }

    pub fn spectator(name: impl Into<String>) -> Self {
        Self::new(Role::Spectator, name)
    }

    /// Solo match; the AI fleet is placed now and the AI side starts ready.
    pub fn solo<R: Rng + ?Sized>(rng: &mut R, name: impl Into<String>) -> Result<Self, PlacementError> {
        let mut ai_board = BoardState::new();
        place_fleet_random(&mut ai_board, rng)?;
        let mut session = Self::new(Role::Solo, name);
        session.ready[Side::Joiner.index()] = true;
        session.opponent = Some(AiOpponent {
            board: ai_board,
            ai: TargetingAi::new(),
        });
        Ok(session)
    }

    /// Attach an observer notified of every event this session produces.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Fresh session for the next match with the same role, name and sink.
    ///
    /// With `keep_fleet`, a complete fleet carries over unshot and the local
    /// side stays unready so it can still be edited.
    pub fn rematch<R: Rng + ?Sized>(mut self, rng: &mut R, keep_fleet: bool) -> Result<Session, PlacementError> {
        let mut next = match self.role {
            Role::Solo => Session::solo(rng, self.name.clone())?,
            role => Session::new(role, self.name.clone()),
        };
        if keep_fleet && self.board.is_fleet_complete() {
            next.board = self.board.refitted();
            next.placement = self.placement;
        }
        next.sink = self.sink.take();
        Ok(next)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Option<Side> {
        self.turn
    }

    /// `(host_ready, joiner_ready)`.
    pub fn readiness(&self) -> (bool, bool) {
        (self.ready[0], self.ready[1])
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == Phase::Active && self.turn.is_some() && self.turn == self.role.side()
    }

    /// True while a fired shot has not been answered.
    pub fn awaiting_result(&self) -> bool {
        self.pending.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Local authoritative board.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Own shots against the opponent.
    pub fn remote_view(&self) -> &RemoteView {
        &self.view
    }

    /// Spectator mirror of `side`'s board.
    pub fn mirror(&self, side: Side) -> &Mirror {
        &self.mirrors[side.index()]
    }

    /// AI fleet in a solo match, for a reveal toggle.
    pub fn opponent_board(&self) -> Option<&BoardState> {
        self.opponent.as_ref().map(|o| &o.board)
    }

    // --- placement ---

    fn check_unlocked(&self) -> Result<(), PlacementError> {
        match self.role.side() {
            Some(side) if !self.ready[side.index()] && self.phase != Phase::Finished => Ok(()),
            _ => Err(PlacementError::Locked),
        }
    }

    /// Randomize the local fleet, replacing any partial placement.
    pub fn place_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step, PlacementError> {
        self.check_unlocked()?;
        self.placement.place_random(&mut self.board, rng)?;
        let mut step = Step::default();
        step.events.push(SessionEvent::FleetPlaced);
        Ok(self.publish(step))
    }

    /// Place the next fleet kind at `origin` in the current orientation.
    pub fn place_manual(&mut self, origin: Coordinate) -> Result<Step, PlacementError> {
        self.check_unlocked()?;
        let ship = self.placement.place_manual(&mut self.board, origin)?;
        let mut step = Step::default();
        step.events.push(SessionEvent::ShipPlaced { kind: ship.kind() });
        if self.board.is_fleet_complete() {
            step.events.push(SessionEvent::FleetPlaced);
        }
        Ok(self.publish(step))
    }

    /// Flip the orientation used by the next manual placement.
    pub fn toggle_orientation(&mut self) -> Orientation {
        self.placement.toggle_orientation()
    }

    /// Drop every placed ship and start placement over.
    pub fn clear_placement(&mut self) -> Result<Step, PlacementError> {
        self.check_unlocked()?;
        self.placement.clear(&mut self.board);
        let mut step = Step::default();
        step.events.push(SessionEvent::PlacementCleared);
        Ok(self.publish(step))
    }

    /// Take over a fleet built elsewhere, e.g. by a [`crate::Player`].
    pub fn adopt_fleet(&mut self, board: BoardState) -> Result<Step, PlacementError> {
        self.check_unlocked()?;
        if !board.is_fleet_complete() || !board.shots().is_empty() {
            return Err(PlacementError::Incomplete);
        }
        self.placement = Placement::resume(&board);
        self.board = board;
        let mut step = Step::default();
        step.events.push(SessionEvent::FleetPlaced);
        Ok(self.publish(step))
    }

    // --- local actions ---

    /// Signal that the local fleet is complete.
    pub fn submit_ready(&mut self) -> Result<Step, ProtocolError> {
        let side = self.role.side().ok_or(ProtocolError::WrongRole)?;
        if self.phase == Phase::Finished {
            return Err(ProtocolError::GameFinished);
        }
        if self.ready[side.index()] {
            return Err(ProtocolError::AlreadyReady);
        }
        if !self.board.is_fleet_complete() {
            return Err(ProtocolError::FleetIncomplete);
        }
        let mut step = Step::default();
        self.ready[side.index()] = true;
        step.events.push(SessionEvent::ReadinessChanged { side });
        self.send(&mut step, Message::Ready { who: side });
        self.advance_readiness(&mut step);
        Ok(self.publish(step))
    }

    /// Fire at `coordinate` on the opponent board.
    ///
    /// Networked sessions only send the request; the opponent resolves it.
    /// Solo sessions resolve against the AI board immediately.
    pub fn submit_shot(&mut self, coordinate: Coordinate) -> Result<Step, ProtocolError> {
        let side = self.role.side().ok_or(ProtocolError::WrongRole)?;
        self.check_active()?;
        if self.turn != Some(side) {
            return Err(ProtocolError::OutOfTurn);
        }
        if !coordinate.in_bounds() {
            return Err(ProtocolError::OutOfBounds);
        }
        if self.view.has_shot(coordinate) {
            return Err(ProtocolError::AlreadyShot);
        }
        if self.pending.is_some() {
            return Err(ProtocolError::AwaitingResult);
        }

        let mut step = Step::default();
        step.events.push(SessionEvent::ShotFired { by: side, coordinate });
        match self.opponent.as_mut() {
            Some(opponent) => {
                let outcome = opponent
                    .board
                    .apply_shot(coordinate)
                    .map_err(|_| ProtocolError::OutOfBounds)?;
                let (hit, sunk) = match outcome {
                    ShotOutcome::Hit { sunk } => (true, sunk),
                    _ => (false, None),
                };
                self.record_result(&mut step, coordinate, hit, sunk);
                if self.phase == Phase::Active {
                    self.set_turn(&mut step, side.other());
                }
            }
            None => {
                self.pending = Some(coordinate);
                self.send(&mut step, Message::Shot { from: side, coordinate });
            }
        }
        Ok(self.publish(step))
    }

    /// Let the solo AI take its turn.
    pub fn ai_reply<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step, ProtocolError> {
        if self.opponent.is_none() {
            return Err(ProtocolError::WrongRole);
        }
        self.check_active()?;
        if self.turn != Some(Side::Joiner) {
            return Err(ProtocolError::OutOfTurn);
        }
        let mut step = Step::default();
        if let Some(opponent) = self.opponent.as_mut() {
            let coordinate = opponent.ai.pick(rng);
            let outcome = self
                .board
                .apply_shot(coordinate)
                .map_err(|_| ProtocolError::OutOfBounds)?;
            opponent.ai.mark(coordinate, outcome.is_hit());
            step.events.push(SessionEvent::ShotFired {
                by: Side::Joiner,
                coordinate,
            });
            self.report_incoming(&mut step, coordinate, outcome);
        }
        if self.board.all_sunk() {
            self.finish(&mut step, Side::Joiner);
        } else {
            self.set_turn(&mut step, Side::Host);
        }
        Ok(self.publish(step))
    }

    /// Send a chat line to everyone reachable from this role.
    pub fn submit_chat(&mut self, text: &str) -> Result<Step, ProtocolError> {
        let from = self.role.chat_origin().ok_or(ProtocolError::WrongRole)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(Step::default());
        }
        let mut step = Step::default();
        let message = Message::Chat {
            from,
            name: self.name.clone(),
            text: text.to_string(),
        };
        step.events.push(SessionEvent::Chat {
            from,
            name: self.name.clone(),
            text: text.to_string(),
        });
        self.send(&mut step, message);
        Ok(self.publish(step))
    }

    // --- inbound ---

    /// Parse and apply one inbound frame.
    ///
    /// Rejected frames are logged and leave the session untouched; the error
    /// is returned for display only.
    pub fn handle_inbound(&mut self, source: Source, frame: &[u8]) -> Result<Step, ProtocolError> {
        let result = decode(frame)
            .map_err(|e| ProtocolError::Malformed(e.to_string()))
            .and_then(|message| self.handle_message(source, message));
        if let Err(e) = &result {
            log::warn!("[{:?}] dropped inbound frame from {:?}: {}", self.role, source, e);
        }
        result
    }

    /// Apply one already decoded inbound message.
    pub fn handle_message(&mut self, source: Source, message: Message) -> Result<Step, ProtocolError> {
        let mut step = Step::default();
        match (self.role, source) {
            (Role::Solo, _) => return Err(ProtocolError::WrongRole),
            (Role::Spectator, Source::Peer) => self.observe(&mut step, message)?,
            (Role::Spectator, Source::Spectator(_)) | (Role::Joiner, Source::Spectator(_)) => {
                return Err(ProtocolError::UnexpectedSender)
            }
            (Role::Host, Source::Spectator(id)) => match message {
                Message::Chat { from, name, text } => {
                    if from != ChatOrigin::Spectate {
                        return Err(ProtocolError::UnexpectedSender);
                    }
                    let relayed = Message::Chat {
                        from,
                        name: name.clone(),
                        text: text.clone(),
                    };
                    step.events.push(SessionEvent::Chat { from, name, text });
                    log::debug!("relaying chat from spectator {:?}", id);
                    step.outbound.push(Envelope {
                        route: Route::Peer,
                        message: relayed.clone(),
                    });
                    step.outbound.push(Envelope {
                        route: Route::Spectators { except: Some(id) },
                        message: relayed,
                    });
                }
                _ => return Err(ProtocolError::SpectatorGameplay),
            },
            (Role::Host, Source::Peer) | (Role::Joiner, Source::Peer) => {
                let relay = (self.role == Role::Host).then(|| message.clone());
                self.apply_peer(&mut step, message)?;
                // Spectators see the relayed message before the host's reaction to it.
                if let Some(message) = relay {
                    log::debug!("relaying {} to spectators", message.kind());
                    step.outbound.insert(
                        0,
                        Envelope {
                            route: Route::Spectators { except: None },
                            message,
                        },
                    );
                }
            }
        }
        Ok(self.publish(step))
    }

    /// Message from the opponent on the host/joiner channel.
    fn apply_peer(&mut self, step: &mut Step, message: Message) -> Result<(), ProtocolError> {
        let me = self.role.side().ok_or(ProtocolError::WrongRole)?;
        let peer = me.other();
        match message {
            Message::Ready { who } => {
                if who != peer {
                    return Err(ProtocolError::UnexpectedSender);
                }
                if self.phase == Phase::Finished {
                    return Err(ProtocolError::GameFinished);
                }
                if self.ready[peer.index()] {
                    return Err(ProtocolError::AlreadyReady);
                }
                self.ready[peer.index()] = true;
                step.events.push(SessionEvent::ReadinessChanged { side: peer });
                self.advance_readiness(step);
            }
            Message::Shot { from, coordinate } => {
                if from != peer {
                    return Err(ProtocolError::UnexpectedSender);
                }
                self.check_active()?;
                if self.turn != Some(peer) {
                    return Err(ProtocolError::OutOfTurn);
                }
                let outcome = self
                    .board
                    .apply_shot(coordinate)
                    .map_err(|_| ProtocolError::OutOfBounds)?;
                if outcome == ShotOutcome::Duplicate {
                    // Unresolved; the shooter keeps the turn and may fire again.
                    log::debug!("duplicate shot at {} ignored", coordinate);
                    step.events.push(SessionEvent::DuplicateShot { coordinate });
                    self.send(step, Message::Turn { who: peer });
                    return Ok(());
                }
                step.events.push(SessionEvent::ShotFired { by: peer, coordinate });
                self.report_incoming(step, coordinate, outcome);
                let (hit, sunk_kind) = match outcome {
                    ShotOutcome::Hit { sunk } => (true, sunk),
                    _ => (false, None),
                };
                self.send(
                    step,
                    Message::ShotResult {
                        from: me,
                        coordinate,
                        hit,
                        sunk_kind,
                    },
                );
            }
            Message::ShotResult {
                from,
                coordinate,
                hit,
                sunk_kind,
            } => {
                if from != peer {
                    return Err(ProtocolError::UnexpectedSender);
                }
                self.check_active()?;
                if self.pending != Some(coordinate) {
                    return Err(ProtocolError::UnexpectedResult);
                }
                self.pending = None;
                self.record_result(step, coordinate, hit, sunk_kind);
                if self.phase == Phase::Finished {
                    self.send(step, Message::Win { who: me });
                } else {
                    self.set_turn(step, peer);
                    self.send(step, Message::Turn { who: peer });
                }
            }
            Message::Turn { who } => {
                self.check_active()?;
                if who != me {
                    return Err(ProtocolError::OutOfTurn);
                }
                match (self.turn, self.pending) {
                    // The pending shot was turned down as a duplicate.
                    (Some(turn), Some(coordinate)) if turn == me => {
                        log::warn!("shot at {} went unresolved, turn handed back", coordinate);
                        self.pending = None;
                    }
                    (Some(turn), None) if turn == peer => self.set_turn(step, me),
                    _ => return Err(ProtocolError::OutOfTurn),
                }
            }
            Message::Win { who } => {
                if who != peer {
                    return Err(ProtocolError::UnexpectedSender);
                }
                self.check_active()?;
                if !self.board.all_sunk() {
                    log::warn!("opponent claims victory with ships still afloat");
                }
                self.finish(step, peer);
            }
            Message::Ships { who, .. } => {
                // Joiner fleets pass through the host on their way to spectators.
                if self.role != Role::Host || who != peer {
                    return Err(ProtocolError::UnexpectedSender);
                }
            }
            Message::Chat { from, name, text } => {
                step.events.push(SessionEvent::Chat { from, name, text });
            }
        }
        Ok(())
    }

    /// Spectators mirror whatever the host forwards.
    fn observe(&mut self, step: &mut Step, message: Message) -> Result<(), ProtocolError> {
        if self.phase == Phase::Finished && !matches!(message, Message::Chat { .. }) {
            return Err(ProtocolError::GameFinished);
        }
        match message {
            Message::Ready { who } => {
                if !self.ready[who.index()] {
                    self.ready[who.index()] = true;
                    step.events.push(SessionEvent::ReadinessChanged { side: who });
                    self.advance_readiness(step);
                }
            }
            Message::Shot { from, coordinate } => {
                step.events.push(SessionEvent::ShotFired { by: from, coordinate });
            }
            Message::ShotResult {
                from,
                coordinate,
                hit,
                sunk_kind,
            } => {
                if self.mirrors[from.index()]
                    .view
                    .record(coordinate, hit, sunk_kind)
                {
                    step.events.push(SessionEvent::ShotResolved {
                        target: from,
                        coordinate,
                        hit,
                        sunk: sunk_kind,
                    });
                }
            }
            Message::Turn { who } => self.set_turn(step, who),
            Message::Win { who } => self.finish(step, who),
            Message::Ships { who, ships } => {
                self.mirrors[who.index()].reveal(&ships);
                step.events.push(SessionEvent::ShipsRevealed { side: who });
            }
            Message::Chat { from, name, text } => {
                step.events.push(SessionEvent::Chat { from, name, text });
            }
        }
        Ok(())
    }

    // --- helpers ---

    fn check_active(&self) -> Result<(), ProtocolError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Finished => Err(ProtocolError::GameFinished),
            _ => Err(ProtocolError::NotActive),
        }
    }

    /// Queue `message` on every channel this role talks to.
    fn send(&self, step: &mut Step, message: Message) {
        match self.role {
            Role::Host => {
                step.outbound.push(Envelope {
                    route: Route::Peer,
                    message: message.clone(),
                });
                step.outbound.push(Envelope {
                    route: Route::Spectators { except: None },
                    message,
                });
            }
            Role::Joiner | Role::Spectator => step.outbound.push(Envelope {
                route: Route::Peer,
                message,
            }),
            Role::Solo => {}
        }
    }

    fn advance_readiness(&mut self, step: &mut Step) {
        if !matches!(self.phase, Phase::Setup | Phase::AwaitingBothReady) {
            return;
        }
        if self.ready.iter().all(|r| *r) {
            self.set_phase(step, Phase::Active);
            self.set_turn(step, Side::Host);
            self.reveal_fleet(step);
        } else {
            self.set_phase(step, Phase::AwaitingBothReady);
        }
    }

    /// Report the local fleet for spectators; the joiner's goes through the host.
    fn reveal_fleet(&self, step: &mut Step) {
        let Some(who) = self.role.side() else { return };
        let route = match self.role {
            Role::Host => Route::Spectators { except: None },
            Role::Joiner => Route::Peer,
            _ => return,
        };
        let ships = self.board.ships().iter().map(ShipReport::from).collect();
        step.outbound.push(Envelope {
            route,
            message: Message::Ships { who, ships },
        });
    }

    fn set_phase(&mut self, step: &mut Step, phase: Phase) {
        if self.phase != phase {
            log::info!("[{:?}] phase {:?} -> {:?}", self.role, self.phase, phase);
            self.phase = phase;
            step.events.push(SessionEvent::PhaseChanged(phase));
        }
    }

    fn set_turn(&mut self, step: &mut Step, side: Side) {
        if self.turn != Some(side) {
            self.turn = Some(side);
            step.events.push(SessionEvent::TurnChanged(side));
        }
    }

    fn finish(&mut self, step: &mut Step, winner: Side) {
        self.winner = Some(winner);
        self.turn = None;
        self.pending = None;
        self.set_phase(step, Phase::Finished);
        step.events.push(SessionEvent::GameOver { winner });
    }

    /// Apply a result against the opponent to the remote view; finishes on the last sink.
    fn record_result(&mut self, step: &mut Step, coordinate: Coordinate, hit: bool, sunk: Option<ShipKind>) {
        let Some(me) = self.role.side() else { return };
        self.view.record(coordinate, hit, sunk);
        step.events.push(SessionEvent::ShotResolved {
            target: me.other(),
            coordinate,
            hit,
            sunk,
        });
        if self.view.all_sunk() {
            self.finish(step, me);
        }
    }

    fn report_incoming(&self, step: &mut Step, coordinate: Coordinate, outcome: ShotOutcome) {
        let Some(me) = self.role.side() else { return };
        let (hit, sunk) = match outcome {
            ShotOutcome::Hit { sunk } => (true, sunk),
            _ => (false, None),
        };
        step.events.push(SessionEvent::ShotResolved {
            target: me,
            coordinate,
            hit,
            sunk,
        });
    }

    fn publish(&mut self, step: Step) -> Step {
        if let Some(sink) = self.sink.as_mut() {
            for event in &step.events {
                sink.notify(event);
            }
        }
        step
    }
}
