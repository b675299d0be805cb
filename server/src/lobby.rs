//! Public lobby feed derived from the session registry.
//!
//! The feed is never cached: every snapshot reads occupancy straight from
//! the registry. Republishing goes to every connected client, not just the
//! ones looking at a lobby view, matching the broadcast-to-all behavior of
//! the lobby page protocol.

use crate::registry::SessionRegistry;
use crate::session::ConnectionId;
use shared::ServerEvent;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Builds the lobby snapshot event from the current registry state.
pub fn games_list(registry: &SessionRegistry) -> ServerEvent {
    ServerEvent::GamesList {
        games: registry.list(),
    }
}

/// Sends a fresh snapshot to every connected client. Send failures mean the
/// connection is already tearing down and are ignored.
pub fn republish(
    registry: &SessionRegistry,
    connections: &HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
) {
    let event = games_list(registry);
    for sender in connections.values() {
        let _ = sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::SidePreference;

    #[test]
    fn test_snapshot_tracks_registry_changes() {
        let mut registry = SessionRegistry::new();

        match games_list(&registry) {
            ServerEvent::GamesList { games } => assert!(games.is_empty()),
            _ => panic!("Unexpected event type"),
        }

        let (id, _) =
            registry.create("T1".to_string(), SidePreference::White, 1, String::new());

        match games_list(&registry) {
            ServerEvent::GamesList { games } => {
                assert_eq!(games.len(), 1);
                assert_eq!(games[0].id, id);
                assert!(games[0].white_occupied);
                assert!(!games[0].black_occupied);
            }
            _ => panic!("Unexpected event type"),
        }
    }

    #[test]
    fn test_republish_reaches_every_connection() {
        let registry = SessionRegistry::new();
        let mut connections = HashMap::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        connections.insert(1, tx_a);
        connections.insert(2, tx_b);

        republish(&registry, &connections);

        assert!(matches!(
            rx_a.try_recv(),
            Ok(ServerEvent::GamesList { .. })
        ));
        assert!(matches!(
            rx_b.try_recv(),
            Ok(ServerEvent::GamesList { .. })
        ));
    }

    #[test]
    fn test_republish_survives_closed_receiver() {
        let registry = SessionRegistry::new();
        let mut connections = HashMap::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        connections.insert(1, tx);

        // Best-effort: a closed channel must not panic or error out
        republish(&registry, &connections);
    }
}
