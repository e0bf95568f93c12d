//! Extension points for rule variants.
//!
//! A `Game` owns one boxed `RulesExtension` and calls it at fixed points:
//! before the standard notation parser (extra move shapes such as drops),
//! during checkmate and stalemate analysis (extra ways out of check, extra
//! available moves), whenever a capture happens, and after every completed
//! move (extra terminal conditions). Every hook defaults to "no effect".

use std::fmt;

use crate::chess_errors::ChessResult;
use crate::game_state::chess_types::{Color, Piece};
use crate::game_state::game_status::GameStatus;
use crate::game_state::position::Position;
use crate::game_state::square::Square;

/// A move made through [`RulesExtension::try_extra_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraMove {
    /// Notation to record, without check suffix or glyphs.
    pub notation: String,
    /// Whether the move resets the halfmove clock and the repetition history.
    pub resets_halfmove_clock: bool,
}

pub trait RulesExtension: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Recognise and apply a move the standard grammar does not cover.
    ///
    /// `None` means "not mine"; the standard parser then handles the
    /// notation. On `Some(Ok(_))` the position has been updated for the side
    /// to move, with the turn still unflipped.
    fn try_extra_move(
        &mut self,
        _notation: &str,
        _position: &mut Position,
    ) -> Option<ChessResult<ExtraMove>> {
        None
    }

    /// Whether `color` has a legal extra move available (stalemate analysis).
    fn can_make_extra_move(&self, _position: &mut Position, _color: Color) -> bool {
        false
    }

    /// Whether `color` can get out of the given checks by extra means,
    /// given the squares that would block or capture them.
    fn can_block_check(
        &self,
        _position: &mut Position,
        _color: Color,
        _checks: &[(Square, Piece)],
        _blocking_squares: &[Square],
    ) -> bool {
        false
    }

    /// Called for every capture, with the piece as it stood on the board.
    fn on_capture(&mut self, _capturer: Color, _captured: Piece) {}

    /// Called once a move is complete and the turn has passed. A returned
    /// status ends the game.
    fn after_move(&mut self, _position: &mut Position, _mover: Color) -> Option<GameStatus> {
        None
    }
}

/// Plain chess.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RulesExtension for StandardRules {
    fn name(&self) -> &'static str {
        "standard"
    }
}
