//! The orchestration core: a single command loop that owns the registry and
//! the connection table.
//!
//! Every connection event and participant action is funneled into one
//! `mpsc` queue and applied one command at a time, so no two actions ever
//! mutate the same session concurrently. The grace-period timer for
//! abandoned sessions is a spawned sleep that sends a `SweepSession` command
//! back into the same queue, which keeps the recheck serialized too.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, error, info};
use shared::{ClientEvent, GameId, GameResult, ServerEvent, SidePreference};
use tokio::sync::mpsc;

use crate::lobby;
use crate::registry::SessionRegistry;
use crate::roles::{self, Role};
use crate::rules::{MoveIntent, PositionStatus, RuleEngine};
use crate::session::{ConnectionId, GamePhase, Session};

/// Reply sent when an action references an unknown session id.
pub const SESSION_NOT_FOUND: &str = "Game not found";

/// Commands processed by the coordinator loop.
#[derive(Debug)]
pub enum Command {
    /// Transport announces a new connection and its outbound channel.
    Register {
        conn: ConnectionId,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },
    /// A parsed client event arrived on a connection.
    Event {
        conn: ConnectionId,
        event: ClientEvent,
    },
    /// The transport lost the connection.
    Disconnect { conn: ConnectionId },
    /// Grace period elapsed for a possibly-abandoned session.
    SweepSession { game_id: GameId },
}

pub struct Coordinator {
    registry: SessionRegistry,
    rules: Box<dyn RuleEngine>,
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    grace_period: Duration,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl Coordinator {
    pub fn new(rules: Box<dyn RuleEngine>, grace_period: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            registry: SessionRegistry::new(),
            rules,
            connections: HashMap::new(),
            grace_period,
            command_tx,
            command_rx,
        }
    }

    /// Sender the transport layer uses to feed the loop.
    pub fn command_sender(&self) -> mpsc::UnboundedSender<Command> {
        self.command_tx.clone()
    }

    /// Runs the command loop until every sender is dropped.
    pub async fn run(&mut self) {
        info!(
            "Coordinator started (abandonment grace period {:?})",
            self.grace_period
        );
        while let Some(command) = self.command_rx.recv().await {
            self.handle(command);
        }
        info!("Coordinator stopped");
    }

    /// Applies commands already sitting in the queue, then returns.
    pub fn pump(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.handle(command);
        }
    }

    /// Applies a single command. A fault in one session never affects the
    /// others; every handler returns to the loop after at most one session's
    /// worth of mutation.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Register { conn, sender } => {
                debug!("Connection {} registered", conn);
                self.connections.insert(conn, sender);
            }
            Command::Event { conn, event } => self.handle_event(conn, event),
            Command::Disconnect { conn } => self.handle_disconnect(conn),
            Command::SweepSession { game_id } => self.handle_sweep(&game_id),
        }
    }

    fn handle_event(&mut self, conn: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::ListGames => self.handle_list(conn),
            ClientEvent::CreateGame { name, side } => self.handle_create(conn, name, side),
            ClientEvent::JoinGame { game_id } => self.handle_join(conn, &game_id),
            ClientEvent::Move {
                game_id,
                from,
                to,
                promotion,
            } => self.handle_move(conn, &game_id, MoveIntent { from, to, promotion }),
            ClientEvent::Resign { game_id } => self.handle_resign(conn, &game_id),
            ClientEvent::OfferDraw { game_id } => self.handle_offer_draw(conn, &game_id),
            ClientEvent::AcceptDraw { game_id } => self.handle_accept_draw(conn, &game_id),
        }
    }

    fn send(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.connections.get(&conn) {
            // Best-effort: a closed channel means the connection is going away
            let _ = sender.send(event);
        }
    }

    fn send_all(&self, conns: &[ConnectionId], event: &ServerEvent) {
        for &conn in conns {
            self.send(conn, event.clone());
        }
    }

    fn session_not_found(&self, conn: ConnectionId) {
        self.send(
            conn,
            ServerEvent::Error {
                message: SESSION_NOT_FOUND.to_string(),
            },
        );
    }

    fn invalid_move(game_id: &str, intent: &MoveIntent) -> ServerEvent {
        ServerEvent::InvalidMove {
            game_id: game_id.to_string(),
            from: intent.from.clone(),
            to: intent.to.clone(),
            promotion: intent.promotion,
        }
    }

    fn handle_list(&self, conn: ConnectionId) {
        self.send(conn, lobby::games_list(&self.registry));
    }

    fn handle_create(&mut self, conn: ConnectionId, name: String, side: SidePreference) {
        let position = self.rules.starting_position();
        let (game_id, granted) = self.registry.create(name, side, conn, position);

        self.send(conn, ServerEvent::PlayerRole { side: granted });
        self.send(conn, ServerEvent::GameCreated { game_id });
        lobby::republish(&self.registry, &self.connections);
    }

    fn handle_join(&mut self, conn: ConnectionId, game_id: &str) {
        let Some(session) = self.registry.get_mut(game_id) else {
            self.session_not_found(conn);
            return;
        };

        let (role, newly_bound) = roles::assign_on_join(session, conn);
        let state = session.state_event(None);

        match role {
            Role::Player(side) => {
                info!("Connection {} joined game {} as {:?}", conn, game_id, side);
                self.send(conn, ServerEvent::PlayerRole { side });
            }
            Role::Spectator => {
                info!("Connection {} joined game {} as spectator", conn, game_id);
                self.send(conn, ServerEvent::SpectatorRole);
            }
        }
        self.send(conn, state);

        if newly_bound {
            lobby::republish(&self.registry, &self.connections);
        }
    }

    fn handle_move(&mut self, conn: ConnectionId, game_id: &str, intent: MoveIntent) {
        let Some(session) = self.registry.get(game_id) else {
            self.session_not_found(conn);
            return;
        };

        // Finished games accept no further moves
        if session.phase == GamePhase::Finished {
            self.send(conn, Self::invalid_move(game_id, &intent));
            return;
        }

        let to_move = match self.rules.side_to_move(&session.position) {
            Ok(side) => side,
            Err(e) => {
                error!("Game {} holds an unreadable position: {}", game_id, e);
                return;
            }
        };

        // Out-of-turn and non-participant attempts are dropped without any
        // reply so the error channel does not reveal whose turn it is
        if !roles::may_move(session, conn, to_move) {
            return;
        }

        let applied = match self.rules.apply_move(&session.position, &intent) {
            Ok(applied) => applied,
            Err(e) => {
                debug!("Game {}: rejected move from {}: {}", game_id, conn, e);
                self.send(conn, Self::invalid_move(game_id, &intent));
                return;
            }
        };

        let Some(session) = self.registry.get_mut(game_id) else {
            return;
        };
        debug!("Game {}: {} plays {}", game_id, conn, applied.record.san);
        session.record_move(applied.fen, applied.record);

        let game_over = match applied.status {
            PositionStatus::Ongoing => None,
            PositionStatus::Checkmate { winner } => Some(ServerEvent::GameOver {
                result: GameResult::Checkmate,
                winner: Some(winner),
            }),
            PositionStatus::Stalemate => Some(ServerEvent::GameOver {
                result: GameResult::Stalemate,
                winner: None,
            }),
            PositionStatus::Draw => Some(ServerEvent::GameOver {
                result: GameResult::Draw,
                winner: None,
            }),
        };
        if game_over.is_some() {
            session.finish();
        }

        let state = session.state_event(None);
        let participants = session.participants();
        self.send_all(&participants, &state);

        if let Some(over) = game_over {
            info!("Game {} over: {:?}", game_id, over);
            self.send_all(&participants, &over);
        }
    }

    fn handle_resign(&mut self, conn: ConnectionId, game_id: &str) {
        let Some(session) = self.registry.get_mut(game_id) else {
            self.session_not_found(conn);
            return;
        };
        if session.phase == GamePhase::Finished {
            return;
        }

        // Spectators have no resign authority; drop silently
        let Some(side) = roles::bound_side(session, conn) else {
            return;
        };

        session.finish();
        let participants = session.participants();
        info!("Game {}: {:?} resigned", game_id, side);
        self.send_all(
            &participants,
            &ServerEvent::GameOver {
                result: GameResult::Resignation,
                winner: Some(side.opponent()),
            },
        );
    }

    fn handle_offer_draw(&mut self, conn: ConnectionId, game_id: &str) {
        let Some(session) = self.registry.get(game_id) else {
            self.session_not_found(conn);
            return;
        };
        if session.phase == GamePhase::Finished {
            return;
        }

        // Point-to-point: only the opponent learns about the offer
        let Some(target) = roles::draw_offer_target(session, conn) else {
            return;
        };
        self.send(
            target,
            ServerEvent::DrawOffered {
                game_id: game_id.to_string(),
            },
        );
    }

    fn handle_accept_draw(&mut self, conn: ConnectionId, game_id: &str) {
        let Some(session) = self.registry.get_mut(game_id) else {
            self.session_not_found(conn);
            return;
        };
        if session.phase == GamePhase::Finished {
            return;
        }
        if roles::bound_side(session, conn).is_none() {
            return;
        }

        session.finish();
        let participants = session.participants();
        info!("Game {}: draw agreed", game_id);
        self.send_all(
            &participants,
            &ServerEvent::GameOver {
                result: GameResult::Draw,
                winner: None,
            },
        );
    }

    fn handle_disconnect(&mut self, conn: ConnectionId) {
        info!("Connection {} disconnected", conn);
        self.connections.remove(&conn);

        let mut updates: Vec<(Vec<ConnectionId>, ServerEvent)> = Vec::new();
        let mut empty_sessions: Vec<GameId> = Vec::new();

        for session in self.registry.iter_mut() {
            if let Some(side) = session.vacate(conn) {
                updates.push((session.participants(), session.state_event(Some(side))));
            }
            if session.is_empty() {
                empty_sessions.push(session.id.clone());
            }
        }

        for (participants, event) in updates {
            self.send_all(&participants, &event);
        }
        for game_id in empty_sessions {
            self.schedule_sweep(game_id);
        }

        lobby::republish(&self.registry, &self.connections);
    }

    fn schedule_sweep(&self, game_id: GameId) {
        debug!(
            "Game {} is empty, sweeping in {:?}",
            game_id, self.grace_period
        );
        let command_tx = self.command_tx.clone();
        let grace = self.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            // The coordinator may already be gone during shutdown
            let _ = command_tx.send(Command::SweepSession { game_id });
        });
    }

    fn handle_sweep(&mut self, game_id: &str) {
        // Re-validate at fire time: a join during the grace period, or an
        // earlier sweep, makes this a no-op
        let still_empty = self
            .registry
            .get(game_id)
            .map(Session::is_empty)
            .unwrap_or(false);
        if !still_empty {
            return;
        }

        self.registry.delete(game_id);
        lobby::republish(&self.registry, &self.connections);
    }
}
