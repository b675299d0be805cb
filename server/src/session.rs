//! One game session: authoritative position, role bindings, spectator set
//! and move log.
//!
//! Sessions are plain state; all mutation is driven by the coordinator, one
//! command at a time, so nothing here needs its own synchronization.

use shared::{GameId, MoveRecord, ServerEvent, Side};
use std::collections::HashSet;

/// Identifier the transport assigns to a connection for its lifetime. A
/// reconnect after a drop gets a fresh id and counts as a new participant.
pub type ConnectionId = u32;

/// Display labels used in state snapshots.
const OCCUPIED_WHITE: &str = "Player 1";
const OCCUPIED_BLACK: &str = "Player 2";
const VACANT: &str = "Waiting...";
const DISCONNECTED: &str = "Disconnected";

/// Where a session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// At least one player slot is unbound.
    Waiting,
    /// Both slots bound, game ongoing.
    Active,
    /// A terminal outcome has been broadcast; moves are no longer accepted.
    Finished,
}

#[derive(Debug)]
pub struct Session {
    pub id: GameId,
    pub name: String,
    /// Current position as a FEN string, only ever replaced by the result of
    /// a successfully validated move.
    pub position: String,
    /// Append-only log of normalized moves since creation.
    pub move_log: Vec<MoveRecord>,
    pub white: Option<ConnectionId>,
    pub black: Option<ConnectionId>,
    pub spectators: HashSet<ConnectionId>,
    pub phase: GamePhase,
    /// Creation order, used by the lobby to list newest games first.
    pub(crate) created_seq: u64,
}

impl Session {
    pub fn new(id: GameId, name: String, position: String, created_seq: u64) -> Self {
        Self {
            id,
            name,
            position,
            move_log: Vec::new(),
            white: None,
            black: None,
            spectators: HashSet::new(),
            phase: GamePhase::Waiting,
            created_seq,
        }
    }

    pub fn slot(&self, side: Side) -> Option<ConnectionId> {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    /// Side a connection is bound to, if it holds a player slot.
    pub fn side_of(&self, conn: ConnectionId) -> Option<Side> {
        if self.white == Some(conn) {
            Some(Side::White)
        } else if self.black == Some(conn) {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn is_participant(&self, conn: ConnectionId) -> bool {
        self.side_of(conn).is_some() || self.spectators.contains(&conn)
    }

    /// Binds a connection to a player slot. Fills becoming the second player
    /// move the session from `Waiting` to `Active`.
    pub fn bind(&mut self, side: Side, conn: ConnectionId) {
        match side {
            Side::White => self.white = Some(conn),
            Side::Black => self.black = Some(conn),
        }
        if self.phase == GamePhase::Waiting && self.white.is_some() && self.black.is_some() {
            self.phase = GamePhase::Active;
        }
    }

    /// Removes a connection from the session. Returns the side it vacated if
    /// it held a player slot; spectator removal returns `None`.
    pub fn vacate(&mut self, conn: ConnectionId) -> Option<Side> {
        if self.white == Some(conn) {
            self.white = None;
            Some(Side::White)
        } else if self.black == Some(conn) {
            self.black = None;
            Some(Side::Black)
        } else {
            self.spectators.remove(&conn);
            None
        }
    }

    /// Abandoned: no players and no spectators.
    pub fn is_empty(&self) -> bool {
        self.white.is_none() && self.black.is_none() && self.spectators.is_empty()
    }

    /// Records a validated move: replaces the position and appends to the log.
    pub fn record_move(&mut self, fen: String, record: MoveRecord) {
        self.position = fen;
        self.move_log.push(record);
    }

    pub fn finish(&mut self) {
        self.phase = GamePhase::Finished;
    }

    /// Every connection attached to this session, players first.
    pub fn participants(&self) -> Vec<ConnectionId> {
        let mut all: Vec<ConnectionId> = self.white.into_iter().chain(self.black).collect();
        all.extend(self.spectators.iter().copied());
        all
    }

    pub fn occupancy(&self) -> (bool, bool) {
        (self.white.is_some(), self.black.is_some())
    }

    /// Full state snapshot for (re)syncing clients. `disconnected` labels a
    /// side that was vacated by the broadcast-triggering disconnect.
    pub fn state_event(&self, disconnected: Option<Side>) -> ServerEvent {
        let label = |side: Side, occupied_label: &str| {
            if disconnected == Some(side) {
                DISCONNECTED.to_string()
            } else if self.slot(side).is_some() {
                occupied_label.to_string()
            } else {
                VACANT.to_string()
            }
        };

        ServerEvent::GameState {
            fen: self.position.clone(),
            history: self.move_log.clone(),
            white_name: label(Side::White, OCCUPIED_WHITE),
            black_name: label(Side::Black, OCCUPIED_BLACK),
        }
    }
}
