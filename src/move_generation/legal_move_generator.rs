//! Full legality checks and legal move enumeration.
//!
//! Candidate moves are tried on the board through `Position::test_position`,
//! which undoes the trial when the guard drops. Precondition checks return
//! `Err(reason)` with a human-readable explanation; the game layer turns
//! those into `ChessError::Move`.

use crate::game_state::chess_rules::castling_final_squares;
use crate::game_state::chess_types::{Color, Piece, PieceKind, Side, PROMOTION_KINDS};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::move_generation::legal_move_apply::ChessMove;
use crate::move_generation::legal_move_checks::{is_checked_square, king_is_in_check};
use crate::move_generation::pseudolegal_moves::pseudolegal_squares;

/// Whether the piece on `from` may make a plain move to `to`.
///
/// Castling and en passant are not covered; see [`can_castle`] and
/// [`can_en_passant`]. Pass `navigability_checked` when the caller already
/// knows `to` is a pseudolegal destination.
pub fn can_move_piece(
    position: &mut Position,
    from: Square,
    to: Square,
    navigability_checked: bool,
) -> Result<(), String> {
    let Some(piece) = position.get(from) else {
        return Err(format!("No piece at square '{from}'."));
    };

    if !navigability_checked && !pseudolegal_squares(position, from, false).contains(&to) {
        return Err(format!("Piece at '{from}' cannot navigate to '{to}'."));
    }

    if let Some(target) = position.get(to) {
        if target.kind == PieceKind::King || target.color == piece.color {
            return Err("Cannot capture king.".to_string());
        }
    }

    let probe = position.test_position(&[(to, Some(piece)), (from, None)]);
    if king_is_in_check(&probe, piece.color) {
        return Err(format!(
            "Cannot move piece from '{from}' to '{to}' because player's king would be put in check."
        ));
    }

    Ok(())
}

/// Whether `color` may castle on `side` right now.
pub fn can_castle(position: &mut Position, color: Color, side: Side) -> Result<(), String> {
    if position.king_has_moved(color) {
        return Err("Cannot castle because king has already moved.".to_string());
    }

    let Some(king_sq) = position.initial_king_square(color) else {
        return Err("Could not determine castling availability.".to_string());
    };
    if position.king_square(color) != Some(king_sq) {
        return Err("Cannot castle because king has already moved.".to_string());
    }

    let Some(rook_sq) = position.initial_rook_square(color, side) else {
        return Err("Cannot castle because rook's initial square could not be determined.".to_string());
    };
    let rook_in_place = position
        .get(rook_sq)
        .is_some_and(|pc| pc.is(PieceKind::Rook, color));
    if position.rook_has_moved(color, side) || !rook_in_place {
        return Err("Cannot castle because rook has moved.".to_string());
    }

    if king_sq
        .squares_between(rook_sq)
        .into_iter()
        .any(|sq| position.get(sq).is_some())
    {
        return Err(
            "Cannot castle because all squares between king and rook must be empty.".to_string(),
        );
    }

    let (king_final, rook_final) = castling_final_squares(color, side);
    let final_squares_clear = [king_final, rook_final]
        .into_iter()
        .all(|sq| position.get(sq).is_none() || sq == king_sq || sq == rook_sq);
    if !final_squares_clear {
        return Err(
            "Cannot castle because final squares must be empty or occupied by moving pieces."
                .to_string(),
        );
    }

    if king_is_in_check(position, color) {
        return Err("Cannot castle because king would be put in check.".to_string());
    }

    // The king and rook leave their squares, so attacks along the back rank
    // are judged on a board without them.
    let probe = position.test_position(&[(king_sq, None), (rook_sq, None)]);
    let path = king_sq
        .squares_between(king_final)
        .into_iter()
        .chain(std::iter::once(king_final).filter(|sq| *sq != king_sq));
    for sq in path {
        if is_checked_square(&probe, color, sq) {
            return Err("Cannot castle because king would pass over a checked square.".to_string());
        }
    }

    Ok(())
}

/// Whether the pawn on `from` may capture the last double-advanced pawn en passant.
pub fn can_en_passant(position: &mut Position, from: Square) -> Result<(), String> {
    let (Some(advanced), Some(target)) =
        (position.double_advanced_pawn(), position.en_passant_target())
    else {
        return Err("En passant must follow a double forward pawn advance.".to_string());
    };

    let Some(pawn) = position.get(from).filter(|pc| pc.kind == PieceKind::Pawn) else {
        return Err(format!("No pawn at square '{from}'."));
    };
    let victim_is_enemy_pawn = position
        .get(advanced)
        .is_some_and(|pc| pc.is(PieceKind::Pawn, pawn.color.opposite()));
    if !victim_is_enemy_pawn {
        return Err("En passant must follow a double forward pawn advance.".to_string());
    }

    if !from.adjacent_on_rank().any(|sq| sq == advanced) {
        return Err("Capturing pawn must be directly adjacent to captured pawn.".to_string());
    }

    let probe = position.test_position(&[(from, None), (target, Some(pawn)), (advanced, None)]);
    if king_is_in_check(&probe, pawn.color) {
        return Err("Cannot move because player's king would be put in check.".to_string());
    }

    Ok(())
}

/// Pawns of the side to move that can legally capture en passant.
pub fn en_passant_capturers(position: &mut Position) -> Vec<Square> {
    let Some(advanced) = position.double_advanced_pawn() else {
        return Vec::new();
    };
    let turn = position.turn;
    let candidates: Vec<Square> = advanced
        .adjacent_on_rank()
        .filter(|sq| {
            position
                .get(*sq)
                .is_some_and(|pc| pc.is(PieceKind::Pawn, turn))
        })
        .collect();
    candidates
        .into_iter()
        .filter(|sq| can_en_passant(position, *sq).is_ok())
        .collect()
}

/// Legal destination squares for the piece on `from`, including castling
/// destinations for kings and the en-passant landing square for pawns.
pub fn legal_moves(position: &mut Position, from: Square) -> Vec<Square> {
    let Some(piece) = position.get(from) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for to in pseudolegal_squares(position, from, false) {
        let legal = if is_en_passant_shape(position, piece, from, to) {
            can_en_passant(position, from).is_ok()
        } else {
            can_move_piece(position, from, to, true).is_ok()
        };
        if legal {
            out.push(to);
        }
    }

    if piece.kind == PieceKind::King {
        for side in Side::ALL {
            if can_castle(position, piece.color, side).is_ok() {
                let (king_final, _) = castling_final_squares(piece.color, side);
                if !out.contains(&king_final) {
                    out.push(king_final);
                }
            }
        }
    }

    out
}

/// A pawn moving diagonally onto an empty square.
#[inline]
pub fn is_en_passant_shape(position: &Position, piece: Piece, from: Square, to: Square) -> bool {
    piece.kind == PieceKind::Pawn && from.file() != to.file() && position.get(to).is_none()
}

/// Every legal move for the side to move, with promotions expanded.
pub fn legal_moves_for_side(position: &mut Position) -> Vec<ChessMove> {
    let color = position.turn;
    let own: Vec<(Square, Piece)> = position.pieces_of(color).collect();
    let mut moves = Vec::with_capacity(48);

    for (from, piece) in own {
        for to in pseudolegal_squares(position, from, false) {
            if is_en_passant_shape(position, piece, from, to) {
                if can_en_passant(position, from).is_ok() {
                    moves.push(ChessMove::EnPassant { from, to });
                }
                continue;
            }
            if can_move_piece(position, from, to, true).is_err() {
                continue;
            }
            if piece.kind == PieceKind::Pawn && to.rank() == color.promotion_rank() {
                moves.extend(PROMOTION_KINDS.iter().map(|kind| ChessMove::Normal {
                    from,
                    to,
                    promotion: Some(*kind),
                }));
            } else {
                moves.push(ChessMove::Normal {
                    from,
                    to,
                    promotion: None,
                });
            }
        }
    }

    for side in Side::ALL {
        if can_castle(position, color, side).is_ok() {
            moves.push(ChessMove::Castle { side });
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_bare_fen;

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let mut position = Position::standard();
        assert_eq!(legal_moves_for_side(&mut position).len(), 20);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let mut position =
            parse_bare_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - -").expect("FEN should parse");
        let err = can_move_piece(&mut position, sq("e2"), sq("d3"), false)
            .expect_err("pinned bishop should not move");
        assert!(err.contains("king would be put in check"));
        assert!(legal_moves(&mut position, sq("e2")).is_empty());
    }

    #[test]
    fn unreachable_destination_is_reported() {
        let mut position = Position::standard();
        let err = can_move_piece(&mut position, sq("e2"), sq("e5"), false)
            .expect_err("pawn cannot jump three squares");
        assert_eq!(err, "Piece at 'e2' cannot navigate to 'e5'.");
    }

    #[test]
    fn castling_requires_empty_path() {
        let mut position = Position::standard();
        let err = can_castle(&mut position, Color::White, Side::Kingside)
            .expect_err("pieces are in the way");
        assert!(err.contains("between king and rook"));

        let mut open = parse_bare_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").expect("FEN should parse");
        assert!(can_castle(&mut open, Color::White, Side::Kingside).is_ok());
        assert!(can_castle(&mut open, Color::White, Side::Queenside).is_ok());
        let king_moves = legal_moves(&mut open, sq("e1"));
        assert!(king_moves.contains(&sq("g1")));
        assert!(king_moves.contains(&sq("c1")));
    }

    #[test]
    fn castling_through_attack_is_rejected() {
        let mut position =
            parse_bare_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ -").expect("FEN should parse");
        let err = can_castle(&mut position, Color::White, Side::Kingside)
            .expect_err("f1 is attacked");
        assert!(err.contains("checked square"));
        assert!(can_castle(&mut position, Color::White, Side::Queenside).is_ok());
    }

    #[test]
    fn castling_onto_attacked_square_is_rejected() {
        let mut position =
            parse_bare_fen("4k1r1/8/8/8/8/8/8/4K2R w K -").expect("FEN should parse");
        assert!(can_castle(&mut position, Color::White, Side::Kingside).is_err());
    }

    #[test]
    fn en_passant_that_exposes_king_is_illegal() {
        let mut position =
            parse_bare_fen("8/8/8/KPp4r/8/8/8/7k w - c6").expect("FEN should parse");
        let err = can_en_passant(&mut position, sq("b5")).expect_err("rank pin");
        assert!(err.contains("king would be put in check"));
        assert!(en_passant_capturers(&mut position).is_empty());
    }

    #[test]
    fn en_passant_requires_adjacency() {
        let mut position =
            parse_bare_fen("4k3/8/8/P2pP3/8/8/8/4K3 w - d6").expect("FEN should parse");
        assert!(can_en_passant(&mut position, sq("e5")).is_ok());
        assert_eq!(
            can_en_passant(&mut position, sq("a5")),
            Err("Capturing pawn must be directly adjacent to captured pawn.".to_string())
        );
        assert_eq!(en_passant_capturers(&mut position), vec![sq("e5")]);
    }

    #[test]
    fn promotions_are_expanded() {
        let mut position = parse_bare_fen("8/P6k/8/8/8/8/8/K7 w - -").expect("FEN should parse");
        let promotions = legal_moves_for_side(&mut position)
            .into_iter()
            .filter(|mv| matches!(mv, ChessMove::Normal { promotion: Some(_), .. }))
            .count();
        assert_eq!(promotions, 4);
    }
}
