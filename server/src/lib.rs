//! # Chess Session Server Library
//!
//! This library provides the coordinating process for realtime multiplayer
//! chess: many concurrent game sessions, two bound players and any number of
//! spectators per session, and a public lobby listing, all served over
//! WebSocket connections.
//!
//! ## Core Responsibilities
//!
//! ### Session Coordination
//! The coordinator owns the in-memory registry of sessions and is the only
//! component that mutates it. It assigns roles on join, relays validated
//! moves to everyone watching a game, reconciles disconnects, and garbage
//! collects sessions nobody is attached to anymore.
//!
//! ### Authority Enforcement
//! Only the connection bound to the side to move may move; only bound
//! players may resign or settle draws. Unauthorized attempts are dropped
//! without a reply so the error channel does not leak whose turn it is.
//!
//! ### Move Validation
//! Chess rules live behind the [`rules::RuleEngine`] trait, implemented on
//! top of shakmaty. The coordinator treats positions as opaque FEN strings
//! and never interprets them itself.
//!
//! ## Architecture Design
//!
//! All state mutation is serialized through a single command loop fed by an
//! mpsc queue: connection registration, client events, disconnects, and the
//! deferred abandonment sweeps all arrive as [`coordinator::Command`] values
//! and are applied one at a time. This eliminates races on shared session
//! state without per-session locks. The transport layer runs one reader and
//! one writer task per connection and never touches game state directly.
//!
//! ## Module Organization
//!
//! - [`session`]: one game's authoritative state (position, slots,
//!   spectators, move log, phase).
//! - [`registry`]: the id-to-session map with creation, lookup, deletion
//!   and lobby listing.
//! - [`roles`]: the role assignment and authority policy.
//! - [`coordinator`]: the command loop orchestrating everything above.
//! - [`lobby`]: the public games listing derived from the registry.
//! - [`rules`]: the rule engine seam and its shakmaty implementation.
//! - [`network`]: WebSocket accept loop and per-connection tasks.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::coordinator::Coordinator;
//! use server::network;
//! use server::rules::StandardRules;
//! use std::time::Duration;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut coordinator = Coordinator::new(Box::new(StandardRules), Duration::from_secs(60));
//!     let command_tx = coordinator.command_sender();
//!
//!     let listener = TcpListener::bind("127.0.0.1:3000").await?;
//!     tokio::spawn(async move { network::serve(listener, command_tx).await });
//!
//!     coordinator.run().await;
//!     Ok(())
//! }
//! ```

pub mod coordinator;
pub mod lobby;
pub mod network;
pub mod registry;
pub mod roles;
pub mod rules;
pub mod session;
