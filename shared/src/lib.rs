use serde::{Deserialize, Serialize};

/// Identifier of a game session. Opaque to clients; generated server-side
/// from a 128-bit random UUID so ids cannot be guessed or enumerated.
pub type GameId = String;

/// The two player slots of a session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// Side requested when creating a game. `Either` resolves to a random side.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SidePreference {
    White,
    Black,
    Either,
}

/// A validated move as recorded in a session's log. The SAN form is what
/// clients display; the UCI form is sufficient to replay the game.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub san: String,
    pub uci: String,
}

/// How a game ended.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Checkmate,
    Draw,
    Stalemate,
    Resignation,
}

/// One lobby listing entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: GameId,
    pub name: String,
    pub white_occupied: bool,
    pub black_occupied: bool,
}

/// Events sent from clients to the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    ListGames,
    CreateGame {
        name: String,
        side: SidePreference,
    },
    #[serde(rename_all = "camelCase")]
    JoinGame {
        game_id: GameId,
    },
    #[serde(rename_all = "camelCase")]
    Move {
        game_id: GameId,
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<char>,
    },
    #[serde(rename_all = "camelCase")]
    Resign {
        game_id: GameId,
    },
    #[serde(rename_all = "camelCase")]
    OfferDraw {
        game_id: GameId,
    },
    #[serde(rename_all = "camelCase")]
    AcceptDraw {
        game_id: GameId,
    },
}

/// Events sent from the server to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    GamesList {
        games: Vec<GameSummary>,
    },
    #[serde(rename_all = "camelCase")]
    GameCreated {
        game_id: GameId,
    },
    PlayerRole {
        side: Side,
    },
    SpectatorRole,
    #[serde(rename_all = "camelCase")]
    GameState {
        fen: String,
        history: Vec<MoveRecord>,
        white_name: String,
        black_name: String,
    },
    GameOver {
        result: GameResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<Side>,
    },
    #[serde(rename_all = "camelCase")]
    DrawOffered {
        game_id: GameId,
    },
    #[serde(rename_all = "camelCase")]
    InvalidMove {
        game_id: GameId,
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<char>,
    },
    Error {
        message: String,
    },
}
