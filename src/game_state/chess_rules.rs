//! Canonical chess-rule constants.
//!
//! Static rule literals: the standard starting position, castling
//! destinations, repetition and move-clock thresholds.

use crate::game_state::chess_types::{Color, Side};
use crate::game_state::square::Square;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Bare (clock-less) form of the starting position.
pub const STARTING_POSITION_BARE_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

pub const THREEFOLD_REPETITION: u32 = 3;
pub const FIVEFOLD_REPETITION: u32 = 5;
/// Fivefold repetition is only considered once this many half-moves were played.
pub const FIVEFOLD_MIN_HALFMOVES: usize = 10;
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;
pub const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

/// Insufficient-material checks only run at or below this many pieces.
pub const INSUFFICIENT_MATERIAL_MAX_PIECES: usize = 4;

/// `(king destination, rook destination)` for a castle. These are fixed
/// files (c/d and g/f) even when the game started from a shuffled back rank.
pub const fn castling_final_squares(color: Color, side: Side) -> (Square, Square) {
    let rank = color.back_rank();
    match side {
        Side::Kingside => (Square::at(6, rank), Square::at(5, rank)),
        Side::Queenside => (Square::at(2, rank), Square::at(3, rank)),
    }
}

/// Castling side whose king destination is `square`, if any.
pub fn castling_side_for_king_destination(color: Color, square: Square) -> Option<Side> {
    Side::ALL
        .into_iter()
        .find(|side| castling_final_squares(color, *side).0 == square)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castling_destinations() {
        let (king, rook) = castling_final_squares(Color::White, Side::Kingside);
        assert_eq!(king.to_string(), "g1");
        assert_eq!(rook.to_string(), "f1");
        let (king, rook) = castling_final_squares(Color::Black, Side::Queenside);
        assert_eq!(king.to_string(), "c8");
        assert_eq!(rook.to_string(), "d8");
        assert_eq!(
            castling_side_for_king_destination(Color::Black, king),
            Some(Side::Queenside)
        );
        assert_eq!(castling_side_for_king_destination(Color::White, king), None);
    }
}
