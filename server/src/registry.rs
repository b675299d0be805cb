//! In-memory registry of game sessions.
//!
//! Owned by the coordinator; there is no shared or static state. Session ids
//! are UUID v4 strings, which doubles as the join key being unguessable.

use crate::session::{ConnectionId, Session};
use log::info;
use rand::Rng;
use shared::{GameId, GameSummary, Side, SidePreference};
use std::collections::HashMap;
use uuid::Uuid;

pub struct SessionRegistry {
    sessions: HashMap<GameId, Session>,
    next_seq: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Creates a session at the given starting position and binds the creator
    /// to the requested side (`Either` resolves to a coin flip). Always
    /// succeeds; returns the fresh id and the side actually granted.
    pub fn create(
        &mut self,
        name: String,
        requested: SidePreference,
        creator: ConnectionId,
        starting_position: String,
    ) -> (GameId, Side) {
        let id = Uuid::new_v4().to_string();
        let seq = self.next_seq;
        self.next_seq += 1;

        let side = match requested {
            SidePreference::White => Side::White,
            SidePreference::Black => Side::Black,
            SidePreference::Either => {
                if rand::thread_rng().gen_bool(0.5) {
                    Side::White
                } else {
                    Side::Black
                }
            }
        };

        let mut session = Session::new(id.clone(), name, starting_position, seq);
        session.bind(side, creator);
        info!("Created game {} ({:?} bound to connection {})", id, side, creator);
        self.sessions.insert(id.clone(), session);

        (id, side)
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Removes a session. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.sessions.remove(id).is_some() {
            info!("Deleted game {}", id);
            true
        } else {
            false
        }
    }

    /// Lobby snapshot, newest sessions first. Built fresh on every call.
    pub fn list(&self) -> Vec<GameSummary> {
        let mut sessions: Vec<&Session> = self.sessions.values().collect();
        sessions.sort_by(|a, b| b.created_seq.cmp(&a.created_seq));

        sessions
            .into_iter()
            .map(|session| {
                let (white_occupied, black_occupied) = session.occupancy();
                GameSummary {
                    id: session.id.clone(),
                    name: session.name.clone(),
                    white_occupied,
                    black_occupied,
                }
            })
            .collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
