#![cfg(feature = "std")]

//! Async drivers that connect a [`Session`] to transports and a [`Player`].

use std::collections::BTreeMap;

use anyhow::Context;
use rand::rngs::SmallRng;
use tokio::sync::mpsc;

use crate::{
    common::ShotOutcome,
    config::SessionConfig,
    player::Player,
    protocol::{encode, Side},
    session::{Role, Route, Session, SessionEvent, Source, SpectatorId, Step},
    transport::{
        channel::{spawn_channel, ChannelEvent, ChannelHandle},
        Transport,
    },
};

/// Hands late spectator connections to a running host node.
#[derive(Clone)]
pub struct SpectatorAttacher {
    tx: mpsc::UnboundedSender<Box<dyn Transport>>,
}

impl SpectatorAttacher {
    pub fn attach<T: Transport + 'static>(&self, transport: T) -> anyhow::Result<()> {
        self.tx
            .send(Box::new(transport))
            .map_err(|_| anyhow::anyhow!("Session node has stopped"))
    }
}

/// Feeds chat lines typed outside the player loop into a running node.
#[derive(Clone)]
pub struct ChatInput {
    tx: mpsc::UnboundedSender<String>,
}

impl ChatInput {
    pub fn say(&self, text: impl Into<String>) -> anyhow::Result<()> {
        self.tx
            .send(text.into())
            .map_err(|_| anyhow::anyhow!("Session node has stopped"))
    }
}

enum Wake {
    Channel(ChannelEvent),
    Attach(Box<dyn Transport>),
    Chat(String),
}

/// Runs one networked participant until the match finishes.
///
/// With a [`Player`] the node places the fleet, signals ready and fires on
/// its own turns; without one it only relays and observes (spectators).
pub struct SessionNode {
    session: Session,
    player: Option<Box<dyn Player>>,
    rng: SmallRng,
    config: SessionConfig,
    peer: Option<ChannelHandle>,
    spectators: BTreeMap<SpectatorId, ChannelHandle>,
    next_spectator: u64,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
    events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    attach_tx: mpsc::UnboundedSender<Box<dyn Transport>>,
    attach_rx: mpsc::UnboundedReceiver<Box<dyn Transport>>,
    chat_tx: mpsc::UnboundedSender<String>,
    chat_rx: mpsc::UnboundedReceiver<String>,
}

impl SessionNode {
    pub fn new(session: Session, player: Option<Box<dyn Player>>, rng: SmallRng, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (attach_tx, attach_rx) = mpsc::unbounded_channel();
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        Self {
            session,
            player,
            rng,
            config,
            peer: None,
            spectators: BTreeMap::new(),
            next_spectator: 0,
            events_tx,
            events_rx,
            attach_tx,
            attach_rx,
            chat_tx,
            chat_rx,
        }
    }

    /// Spawn the channel to the opponent (or, for a spectator, to the host).
    pub fn connect_peer<T: Transport + 'static>(&mut self, transport: T) {
        self.peer = Some(spawn_channel(Source::Peer, transport, self.events_tx.clone()));
    }

    /// Attach a spectator channel; only hosts accept spectators.
    pub fn attach_spectator<T: Transport + 'static>(&mut self, transport: T) -> Option<SpectatorId> {
        if self.session.role() != Role::Host {
            log::warn!("{:?} session cannot take spectators", self.session.role());
            return None;
        }
        let id = SpectatorId(self.next_spectator);
        self.next_spectator += 1;
        let handle = spawn_channel(Source::Spectator(id), transport, self.events_tx.clone());
        self.spectators.insert(id, handle);
        log::info!("spectator {:?} attached", id);
        Some(id)
    }

    /// Handle for attaching spectators while [`SessionNode::run`] is in progress.
    pub fn spectator_attacher(&self) -> SpectatorAttacher {
        SpectatorAttacher {
            tx: self.attach_tx.clone(),
        }
    }

    /// Handle for sending chat while [`SessionNode::run`] is in progress.
    pub fn chat_input(&self) -> ChatInput {
        ChatInput {
            tx: self.chat_tx.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Play until the session finishes; returns the winner.
    ///
    /// Losing the peer channel before the end is an error.
    pub async fn run(&mut self) -> anyhow::Result<Option<Side>> {
        if self.peer.is_none() {
            anyhow::bail!("No peer transport connected");
        }
        self.prepare()?;
        while !self.session.is_game_over() {
            if self.player_turn() {
                continue;
            }
            let wake = tokio::select! {
                Some(event) = self.events_rx.recv() => Wake::Channel(event),
                Some(transport) = self.attach_rx.recv() => Wake::Attach(transport),
                Some(text) = self.chat_rx.recv() => Wake::Chat(text),
                else => anyhow::bail!("Event queues closed"),
            };
            match wake {
                Wake::Channel(event) => self.on_channel_event(event)?,
                Wake::Attach(transport) => {
                    let _ = self.attach_spectator(transport);
                }
                Wake::Chat(text) => self.chat(&text),
            }
        }
        self.flush().await;
        Ok(self.session.winner())
    }

    /// Place the player's fleet and signal ready.
    fn prepare(&mut self) -> anyhow::Result<()> {
        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };
        if !self.session.board().is_fleet_complete() {
            let mut board = crate::board::BoardState::new();
            player
                .place_fleet(&mut self.rng, &mut board)
                .map_err(|e| anyhow::anyhow!(e))?;
            let step = self.session.adopt_fleet(board).map_err(|e| anyhow::anyhow!(e))?;
            self.dispatch(step);
        }
        let step = self.session.submit_ready().map_err(|e| anyhow::anyhow!(e))?;
        self.dispatch(step);
        Ok(())
    }

    /// Fire if it is our turn. Returns whether a shot was attempted.
    fn player_turn(&mut self) -> bool {
        let Some(player) = self.player.as_mut() else {
            return false;
        };
        let target = if self.session.is_my_turn() && !self.session.awaiting_result() {
            Some(player.select_target(&mut self.rng, self.session.remote_view()))
        } else {
            None
        };
        let chat = player.take_chat();
        if let Some(text) = chat {
            self.chat(&text);
        }
        let Some(target) = target else {
            return false;
        };
        match self.session.submit_shot(target) {
            Ok(step) => self.dispatch(step),
            Err(e) => log::warn!("shot at {} rejected: {}", target, e),
        }
        true
    }

    fn chat(&mut self, text: &str) {
        match self.session.submit_chat(text) {
            Ok(step) => self.dispatch(step),
            Err(e) => log::warn!("chat not sent: {}", e),
        }
    }

    fn on_channel_event(&mut self, event: ChannelEvent) -> anyhow::Result<()> {
        match event {
            ChannelEvent::Frame(source, frame) => {
                // Rejections are logged by the session and otherwise ignored.
                if let Ok(step) = self.session.handle_inbound(source, &frame) {
                    self.dispatch(step);
                }
            }
            ChannelEvent::Closed(Source::Peer, reason) => {
                if !self.session.is_game_over() {
                    self.peer = None;
                    anyhow::bail!(
                        "Peer disconnected: {}",
                        reason.as_deref().unwrap_or("connection closed")
                    );
                }
            }
            ChannelEvent::Closed(Source::Spectator(id), reason) => {
                self.spectators.remove(&id);
                log::info!("spectator {:?} left ({})", id, reason.as_deref().unwrap_or("closed"));
            }
        }
        Ok(())
    }

    /// Route outbound messages and report shot outcomes to the player.
    fn dispatch(&mut self, step: Step) {
        let Step { outbound, events } = step;
        for envelope in outbound {
            let frame = match encode(&envelope.message) {
                Ok(frame) => frame,
                Err(e) => {
                    log::error!("failed to encode {}: {}", envelope.message.kind(), e);
                    continue;
                }
            };
            match envelope.route {
                Route::Peer => {
                    if let Some(peer) = &self.peer {
                        if let Err(e) = peer.send(frame) {
                            log::debug!("{}", e);
                        }
                    }
                }
                Route::Spectators { except } => {
                    for (id, handle) in &self.spectators {
                        if Some(*id) == except {
                            continue;
                        }
                        if let Err(e) = handle.send(frame.clone()) {
                            log::debug!("{}", e);
                        }
                    }
                }
            }
        }
        let me = self.session.role().side();
        if let (Some(player), Some(me)) = (self.player.as_mut(), me) {
            notify_player(&mut **player, me, &events);
        }
    }

    async fn flush(&mut self) {
        let limit = self.config.send_timeout;
        if let Some(peer) = self.peer.take() {
            peer.shutdown(limit).await;
        }
        for (_, handle) in std::mem::take(&mut self.spectators) {
            handle.shutdown(limit).await;
        }
    }
}

fn notify_player(player: &mut dyn Player, me: Side, events: &[SessionEvent]) {
    for event in events {
        if let SessionEvent::ShotResolved {
            target,
            coordinate,
            hit,
            sunk,
        } = event
        {
            if *target == me {
                let outcome = if *hit {
                    ShotOutcome::Hit { sunk: *sunk }
                } else {
                    ShotOutcome::Miss
                };
                player.handle_opponent_shot(*coordinate, outcome);
            } else {
                player.handle_shot_result(*coordinate, *hit, *sunk);
            }
        }
    }
}

/// Play a solo match: `player` against the built-in AI.
///
/// The AI waits `config.ai_delay` before each reply. Returns the winner.
pub async fn run_solo(
    session: &mut Session,
    player: &mut dyn Player,
    rng: &mut SmallRng,
    config: &SessionConfig,
) -> anyhow::Result<Side> {
    if session.role() != Role::Solo {
        anyhow::bail!("run_solo needs a solo session, got {:?}", session.role());
    }
    if !session.board().is_fleet_complete() {
        let mut board = crate::board::BoardState::new();
        player.place_fleet(rng, &mut board).map_err(|e| anyhow::anyhow!(e))?;
        let step = session.adopt_fleet(board).map_err(|e| anyhow::anyhow!(e))?;
        notify_player(player, Side::Host, &step.events);
    }
    let step = session.submit_ready().map_err(|e| anyhow::anyhow!(e))?;
    notify_player(player, Side::Host, &step.events);

    while !session.is_game_over() {
        let step = match session.turn() {
            Some(Side::Host) => {
                let target = player.select_target(rng, session.remote_view());
                match session.submit_shot(target) {
                    Ok(step) => step,
                    Err(e) => {
                        log::warn!("shot at {} rejected: {}", target, e);
                        continue;
                    }
                }
            }
            Some(Side::Joiner) => {
                if !config.ai_delay.is_zero() {
                    tokio::time::sleep(config.ai_delay).await;
                }
                session.ai_reply(rng).map_err(|e| anyhow::anyhow!(e))?
            }
            None => anyhow::bail!("Solo session is active without a turn"),
        };
        notify_player(player, Side::Host, &step.events);
    }
    session.winner().context("Finished solo session has no winner")
}
