//! Pseudolegal destination squares per piece.
//!
//! These follow each piece's movement pattern and occupancy rules but ignore
//! whether the mover's own king is left in check. Castling destinations are
//! not produced here; they depend on attack checks and live in
//! `legal_move_generator`.

use crate::game_state::chess_types::{Piece, PieceKind};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::moves::king_moves::king_squares;
use crate::moves::knight_moves::knight_squares;
use crate::moves::pawn_moves::pawn_capture_squares;
use crate::moves::sliding_moves::{directions_for, ray};

/// Pseudolegal destinations for the piece on `from`.
///
/// With `capture_only`, pawn advances are left out so the result is usable as
/// an attack set. An empty `from` yields nothing.
pub fn pseudolegal_squares(position: &Position, from: Square, capture_only: bool) -> Vec<Square> {
    let Some(piece) = position.get(from) else {
        return Vec::new();
    };

    match piece.kind {
        PieceKind::Pawn => pawn_squares(position, from, piece, capture_only),
        PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => {
            slider_squares(position, from, piece)
        }
        PieceKind::Knight => knight_squares(from)
            .filter(|sq| not_own_piece(position, *sq, piece))
            .collect(),
        PieceKind::King => king_squares(from)
            .filter(|sq| not_own_piece(position, *sq, piece))
            .collect(),
    }
}

#[inline]
fn not_own_piece(position: &Position, square: Square, piece: Piece) -> bool {
    !matches!(position.get(square), Some(other) if other.color == piece.color)
}

fn pawn_squares(position: &Position, from: Square, piece: Piece, capture_only: bool) -> Vec<Square> {
    let mut out = Vec::with_capacity(4);

    if !capture_only {
        if let Some(one) = from.step_forward(piece.color, 1).filter(|sq| position.get(*sq).is_none()) {
            out.push(one);
            if from.rank() == piece.color.pawn_rank() {
                if let Some(two) = from
                    .step_forward(piece.color, 2)
                    .filter(|sq| position.get(*sq).is_none())
                {
                    out.push(two);
                }
            }
        }
    }

    out.extend(pawn_capture_squares(piece.color, from).filter(|sq| {
        position
            .get(*sq)
            .is_some_and(|other| other.color != piece.color)
    }));

    if let Some(target) = en_passant_square_for(position, from, piece) {
        out.push(target);
    }

    out
}

/// En-passant landing square available to the pawn on `from`, if the last
/// move was an enemy double advance right next to it.
fn en_passant_square_for(position: &Position, from: Square, piece: Piece) -> Option<Square> {
    let advanced = position.double_advanced_pawn()?;
    let victim = position.get(advanced)?;
    if victim.kind != PieceKind::Pawn || victim.color == piece.color {
        return None;
    }
    if !from.adjacent_on_rank().any(|sq| sq == advanced) {
        return None;
    }
    position.en_passant_target()
}

fn slider_squares(position: &Position, from: Square, piece: Piece) -> Vec<Square> {
    let mut out = Vec::with_capacity(27);
    for direction in directions_for(piece.kind) {
        for sq in ray(from, *direction) {
            match position.get(sq) {
                None => out.push(sq),
                Some(other) => {
                    if other.color != piece.color {
                        out.push(sq);
                    }
                    break;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::pseudolegal_squares;
    use crate::game_state::position::Position;
    use crate::game_state::square::Square;
    use crate::utils::fen_parser::parse_bare_fen;

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    fn names(mut squares: Vec<Square>) -> Vec<String> {
        squares.sort();
        squares.into_iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pawn_on_start_rank_advances_one_or_two() {
        let position = Position::standard();
        assert_eq!(names(pseudolegal_squares(&position, sq("e2"), false)), vec!["e3", "e4"]);
        assert!(pseudolegal_squares(&position, sq("e2"), true).is_empty());
    }

    #[test]
    fn blocked_pawn_cannot_jump() {
        let position = parse_bare_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - -").expect("FEN should parse");
        assert!(pseudolegal_squares(&position, sq("e2"), false).is_empty());
    }

    #[test]
    fn pawn_sees_en_passant_target() {
        let position =
            parse_bare_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6").expect("FEN should parse");
        assert_eq!(names(pseudolegal_squares(&position, sq("e5"), false)), vec!["d6", "e6"]);
    }

    #[test]
    fn rook_stops_at_first_piece() {
        let position = parse_bare_fen("4k3/8/8/8/R2p4/8/8/4K3 w - -").expect("FEN should parse");
        let squares = pseudolegal_squares(&position, sq("a4"), false);
        assert!(squares.contains(&sq("d4")));
        assert!(!squares.contains(&sq("e4")));
        assert_eq!(squares.len(), 3 + 4 + 3);
    }

    #[test]
    fn knights_skip_own_pieces() {
        let position = Position::standard();
        assert_eq!(names(pseudolegal_squares(&position, sq("g1"), false)), vec!["f3", "h3"]);
    }
}
