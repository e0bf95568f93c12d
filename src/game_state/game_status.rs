//! Game status reported by `Game::status`.

use std::fmt;

use crate::game_state::chess_types::Color;

/// Why a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FivefoldRepetition,
    FiftyMoveRule,
    SeventyFiveMoveRule,
    Agreement,
    Resignation,
    Timeout,
    TimeoutVsInsufficientMaterial,
    /// Result taken from a PGN `Result` without a reconstructable cause.
    Imported,
    /// Terminal condition supplied by a rules extension, e.g. `three_check`.
    Variant(String),
}

impl StatusReason {
    /// Reason code as written in status descriptions.
    pub fn code(&self) -> &str {
        match self {
            StatusReason::Checkmate => "checkmate",
            StatusReason::Stalemate => "stalemate",
            StatusReason::InsufficientMaterial => "insufficient_material",
            StatusReason::ThreefoldRepetition => "threefold_repetition",
            StatusReason::FivefoldRepetition => "fivefold_repetition",
            StatusReason::FiftyMoveRule => "50move",
            StatusReason::SeventyFiveMoveRule => "75move",
            StatusReason::Agreement => "agreement",
            StatusReason::Resignation => "resignation",
            StatusReason::Timeout => "timeout",
            StatusReason::TimeoutVsInsufficientMaterial => "timeoutvsinsufficient",
            StatusReason::Imported => "imported",
            StatusReason::Variant(code) => code,
        }
    }

    /// PGN `Termination` template. `[WINNER]` and `[LOSER]` are substituted
    /// by the exporter. Imported results have no template.
    pub fn termination_template(&self) -> Option<String> {
        let template = match self {
            StatusReason::Checkmate => "[WINNER] won by checkmate",
            StatusReason::Resignation => "[WINNER] won by resignation",
            StatusReason::Timeout => "[WINNER] won on time",
            StatusReason::Stalemate => "Draw by stalemate",
            StatusReason::InsufficientMaterial => "Draw by insufficient material",
            StatusReason::ThreefoldRepetition => "Draw by threefold repetition",
            StatusReason::FivefoldRepetition => "Draw by fivefold repetition",
            StatusReason::FiftyMoveRule => "Draw by 50-move rule",
            StatusReason::SeventyFiveMoveRule => "Draw by 75-move rule",
            StatusReason::Agreement => "Draw by agreement",
            StatusReason::TimeoutVsInsufficientMaterial => {
                "Draw by timeout vs insufficient material"
            }
            StatusReason::Imported => return None,
            StatusReason::Variant(code) => {
                return Some(format!("[WINNER] won by {}", code.replace('_', " ")))
            }
        };
        Some(template.to_string())
    }
}

impl fmt::Display for StatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Terminal or in-progress state of a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStatus {
    pub game_over: bool,
    pub winner: Option<Color>,
    pub description: Option<StatusReason>,
}

impl GameStatus {
    pub fn in_progress() -> Self {
        Self::default()
    }

    pub fn decisive(winner: Color, reason: StatusReason) -> Self {
        Self {
            game_over: true,
            winner: Some(winner),
            description: Some(reason),
        }
    }

    pub fn drawn(reason: StatusReason) -> Self {
        Self {
            game_over: true,
            winner: None,
            description: Some(reason),
        }
    }

    /// PGN result token: `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub fn pgn_result(&self) -> &'static str {
        match (self.game_over, self.winner) {
            (false, _) => "*",
            (true, Some(Color::White)) => "1-0",
            (true, Some(Color::Black)) => "0-1",
            (true, None) => "1/2-1/2",
        }
    }

    /// Reason code, if the game has one.
    pub fn reason_code(&self) -> Option<&str> {
        self.description.as_ref().map(StatusReason::code)
    }
}
