//! Errors used throughout the rules engine.
//!
//! `ChessError` is the single error type returned by game logic, notation
//! codecs and the collaborator adapters. Callers match on the variant to tell
//! an illegal move from a finished game or from unreadable input:
//! - `Move` covers every rejected move attempt (unreadable notation, no piece
//!   can reach the destination, ambiguous source, unmet castling/en-passant
//!   preconditions, pending promotion, wrong side).
//! - `GameOver` is only raised when the game's policy blocks moves after the
//!   game has ended.
//! - `Parse` names the FEN/EPD/PGN (or table) fragment that could not be read.
//! - `Clock` is raised when a time-controlled game is fed a move without an
//!   elapsed time, or when a time control string is unreadable.
//!
//! Failing operations never leave the position partially mutated.

/// Unified error type for the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    /// A move was rejected. Payload is a human-readable reason.
    #[error("illegal move: {0}")]
    Move(String),

    /// A move was attempted after the game reached a terminal status.
    #[error("the game has already ended")]
    GameOver,

    /// Input text could not be parsed.
    #[error("could not parse {kind}: '{fragment}'")]
    Parse {
        kind: &'static str,
        fragment: String,
    },

    /// Time-control bookkeeping failed.
    #[error("clock error: {0}")]
    Clock(String),
}

impl ChessError {
    pub(crate) fn parse(kind: &'static str, fragment: impl Into<String>) -> Self {
        ChessError::Parse {
            kind,
            fragment: fragment.into(),
        }
    }

    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        ChessError::Move(reason.into())
    }

    /// Whether this is a rejected move (as opposed to game-over or parse failures).
    pub fn is_move_error(&self) -> bool {
        matches!(self, ChessError::Move(_))
    }
}

/// Result type alias for rules-engine operations.
pub type ChessResult<T> = Result<T, ChessError>;

#[cfg(test)]
mod tests {
    use super::ChessError;

    #[test]
    fn display_names_the_fragment() {
        let err = ChessError::parse("FEN", "rnbqkbnr/8");
        assert_eq!(err.to_string(), "could not parse FEN: 'rnbqkbnr/8'");
        assert!(!err.is_move_error());
        assert!(ChessError::illegal("no piece").is_move_error());
    }
}
