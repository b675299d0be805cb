//! Rule engine seam and its shakmaty-backed implementation.
//!
//! The coordinator never inspects a position itself; it passes FEN strings
//! through this interface and acts on the results. Keeping the chess rules
//! behind a trait also lets tests substitute a scripted engine.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};
use shared::{MoveRecord, Side};
use thiserror::Error;

/// FEN of the standard chess starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A proposed move as received from a client, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
}

/// Errors surfaced by the rule engine.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The stored FEN could not be parsed back into a position.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// The proposed move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Status of a position after a move has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Ongoing,
    Checkmate { winner: Side },
    Stalemate,
    Draw,
}

/// Result of a successfully validated move.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    /// FEN of the position after the move.
    pub fen: String,
    /// Normalized record for the session's move log.
    pub record: MoveRecord,
    pub status: PositionStatus,
}

/// The opaque capability the coordinator builds on: validate and apply moves,
/// report position status, and say whose turn it is.
pub trait RuleEngine: Send {
    /// FEN of the position new sessions start from.
    fn starting_position(&self) -> String;

    /// Which side moves next in the given position.
    fn side_to_move(&self, fen: &str) -> Result<Side, RulesError>;

    /// Current status of a position without applying anything.
    fn status(&self, fen: &str) -> Result<PositionStatus, RulesError>;

    /// Validates the intent against the position. On success returns the
    /// updated position, the normalized record and the resulting status.
    fn apply_move(&self, fen: &str, intent: &MoveIntent) -> Result<AppliedMove, RulesError>;
}

/// Standard chess rules via shakmaty.
pub struct StandardRules;

impl StandardRules {
    fn parse(fen: &str) -> Result<Chess, RulesError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| RulesError::InvalidPosition(format!("{e}")))?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{e}")))
    }

    fn side_from(color: Color) -> Side {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }

    fn status_of(position: &Chess) -> PositionStatus {
        if position.is_checkmate() {
            // The side to move is the one that got mated
            PositionStatus::Checkmate {
                winner: Self::side_from(position.turn()).opponent(),
            }
        } else if position.is_stalemate() {
            PositionStatus::Stalemate
        } else if position.is_insufficient_material() || position.halfmoves() >= 100 {
            PositionStatus::Draw
        } else {
            PositionStatus::Ongoing
        }
    }
}

impl RuleEngine for StandardRules {
    fn starting_position(&self) -> String {
        STARTING_FEN.to_string()
    }

    fn side_to_move(&self, fen: &str) -> Result<Side, RulesError> {
        let position = Self::parse(fen)?;
        Ok(Self::side_from(position.turn()))
    }

    fn status(&self, fen: &str) -> Result<PositionStatus, RulesError> {
        let position = Self::parse(fen)?;
        Ok(Self::status_of(&position))
    }

    fn apply_move(&self, fen: &str, intent: &MoveIntent) -> Result<AppliedMove, RulesError> {
        let position = Self::parse(fen)?;

        let mut uci = format!("{}{}", intent.from, intent.to);
        if let Some(promotion) = intent.promotion {
            uci.push(promotion.to_ascii_lowercase());
        }

        let parsed: UciMove = uci
            .parse()
            .map_err(|_| RulesError::IllegalMove(uci.clone()))?;
        let m = parsed
            .to_move(&position)
            .map_err(|_| RulesError::IllegalMove(uci.clone()))?;

        // SAN depends on the position before the move is played; SanPlus
        // carries the check/checkmate suffix clients expect in the log
        let san = SanPlus::from_move(position.clone(), &m).to_string();

        let next = position
            .play(&m)
            .map_err(|_| RulesError::IllegalMove(uci.clone()))?;
        let status = Self::status_of(&next);

        Ok(AppliedMove {
            fen: Fen::from_position(next, EnPassantMode::Legal).to_string(),
            record: MoveRecord { san, uci },
            status,
        })
    }
}
