//! Role assignment policy: who gets which seat, and who may do what.

use crate::session::{ConnectionId, Session};
use shared::Side;

/// Role granted to a connection joining a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player(Side),
    Spectator,
}

/// Join rule. A connection already attached to the session gets its existing
/// role back unchanged; otherwise white is granted first, then black, then
/// spectator. Returns the role and whether a player slot was newly bound
/// (i.e. whether lobby occupancy changed).
pub fn assign_on_join(session: &mut Session, conn: ConnectionId) -> (Role, bool) {
    if let Some(side) = session.side_of(conn) {
        return (Role::Player(side), false);
    }
    if session.spectators.contains(&conn) {
        return (Role::Spectator, false);
    }

    if session.slot(Side::White).is_none() {
        session.bind(Side::White, conn);
        (Role::Player(Side::White), true)
    } else if session.slot(Side::Black).is_none() {
        session.bind(Side::Black, conn);
        (Role::Player(Side::Black), true)
    } else {
        session.spectators.insert(conn);
        (Role::Spectator, false)
    }
}

/// Move authority: only the connection bound to the side whose turn it is.
pub fn may_move(session: &Session, conn: ConnectionId, to_move: Side) -> bool {
    session.slot(to_move) == Some(conn)
}

/// Side a connection may resign or accept a draw for. Spectators and
/// strangers get `None`.
pub fn bound_side(session: &Session, conn: ConnectionId) -> Option<Side> {
    session.side_of(conn)
}

/// Draw offers travel point-to-point: a bound player with a bound opponent
/// may offer, and only that opponent's connection receives it.
pub fn draw_offer_target(session: &Session, conn: ConnectionId) -> Option<ConnectionId> {
    let side = session.side_of(conn)?;
    session.slot(side.opponent())
}
