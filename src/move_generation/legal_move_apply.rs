//! Move application.
//!
//! `apply_move` performs the board update for an already-validated move and
//! keeps the derived bookkeeping in step: castling revocation, the
//! double-advanced pawn, `has_moved` flags and the piece count (through
//! `Position::place`). It does not flip the side to move; the caller decides
//! when the turn is complete (a promotion can still be pending).

use std::fmt;

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::castling_final_squares;
use crate::game_state::chess_types::{Piece, PieceKind, Side};
use crate::game_state::position::Position;
use crate::game_state::square::Square;

/// A fully specified move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChessMove {
    Normal {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    Castle {
        side: Side,
    },
    EnPassant {
        from: Square,
        to: Square,
    },
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChessMove::Normal {
                from,
                to,
                promotion,
            } => {
                write!(f, "{from}{to}")?;
                if let Some(kind) = promotion {
                    write!(f, "{}", kind.letter().to_ascii_lowercase())?;
                }
                Ok(())
            }
            ChessMove::Castle { side } => f.write_str(side.notation()),
            ChessMove::EnPassant { from, to } => write!(f, "{from}{to}"),
        }
    }
}

/// What a move took off the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveEffect {
    pub captured: Option<(Square, Piece)>,
}

/// Apply `mv` for the side to move.
pub fn apply_move(position: &mut Position, mv: ChessMove) -> ChessResult<MoveEffect> {
    match mv {
        ChessMove::Normal {
            from,
            to,
            promotion,
        } => move_piece(position, from, to, promotion),
        ChessMove::Castle { side } => {
            castle(position, side)?;
            Ok(MoveEffect::default())
        }
        ChessMove::EnPassant { from, to } => en_passant(position, from, to),
    }
}

/// Plain move (optionally promoting). A piece standing on `to` is captured.
pub fn move_piece(
    position: &mut Position,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
) -> ChessResult<MoveEffect> {
    let Some(mut piece) = position.get(from) else {
        return Err(ChessError::illegal(format!("No piece at square '{from}'.")));
    };

    let captured = position.get(to);
    if let Some(victim) = captured {
        if victim.kind == PieceKind::Rook {
            if let Some(side) = position.castling_side_of_rook_square(victim.color, to) {
                position.mark_rook_moved(victim.color, side);
            }
        }
    }

    match piece.kind {
        PieceKind::King => position.mark_king_moved(piece.color),
        PieceKind::Rook => {
            if let Some(side) = position.castling_side_of_rook_square(piece.color, from) {
                position.mark_rook_moved(piece.color, side);
            }
        }
        _ => {}
    }

    let double_advance =
        piece.kind == PieceKind::Pawn && from.rank().abs_diff(to.rank()) == 2;
    position.set_double_advanced_pawn(double_advance.then_some(to));

    piece.has_moved = true;
    if let Some(kind) = promotion {
        piece.kind = kind;
        piece.promoted = true;
    }
    position.place(from, None);
    position.place(to, Some(piece));

    Ok(MoveEffect {
        captured: captured.map(|victim| (to, victim)),
    })
}

/// Move king and rook of the side to move to their castled squares.
pub fn castle(position: &mut Position, side: Side) -> ChessResult<()> {
    let color = position.turn;
    let (Some(king_sq), Some(rook_sq)) = (
        position.king_square(color),
        position.initial_rook_square(color, side),
    ) else {
        return Err(ChessError::illegal("Could not determine castling availability."));
    };
    let (king_final, rook_final) = castling_final_squares(color, side);

    let mut king = position
        .get(king_sq)
        .unwrap_or_else(|| Piece::new(PieceKind::King, color));
    let mut rook = position
        .get(rook_sq)
        .unwrap_or_else(|| Piece::new(PieceKind::Rook, color));
    king.has_moved = true;
    rook.has_moved = true;

    position.place(king_sq, None);
    position.place(rook_sq, None);
    position.place(king_final, Some(king));
    position.place(rook_final, Some(rook));

    position.mark_king_moved(color);
    position.mark_rook_moved(color, side);
    position.set_double_advanced_pawn(None);
    Ok(())
}

/// Capture the double-advanced pawn en passant, landing on `to`.
pub fn en_passant(position: &mut Position, from: Square, to: Square) -> ChessResult<MoveEffect> {
    let Some(advanced) = position.double_advanced_pawn() else {
        return Err(ChessError::illegal(
            "En passant must follow a double forward pawn advance.",
        ));
    };
    let Some(mut pawn) = position.get(from) else {
        return Err(ChessError::illegal(format!("No piece at square '{from}'.")));
    };

    pawn.has_moved = true;
    let captured = position.place(advanced, None);
    position.place(from, None);
    position.place(to, Some(pawn));
    position.set_double_advanced_pawn(None);

    Ok(MoveEffect {
        captured: captured.map(|victim| (advanced, victim)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Color;
    use crate::utils::fen_parser::parse_bare_fen;

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    #[test]
    fn double_advance_records_the_pawn() {
        let mut position = Position::standard();
        apply_move(
            &mut position,
            ChessMove::Normal {
                from: sq("e2"),
                to: sq("e4"),
                promotion: None,
            },
        )
        .expect("move should apply");
        assert_eq!(position.double_advanced_pawn(), Some(sq("e4")));
        assert_eq!(position.en_passant_target(), Some(sq("e3")));
        // Turn is left to the caller.
        assert_eq!(position.turn, Color::White);
    }

    #[test]
    fn capturing_a_home_rook_revokes_its_right() {
        let mut position =
            parse_bare_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").expect("FEN should parse");
        position.place(sq("b7"), Some(Piece::new(PieceKind::Bishop, Color::White)));
        let effect = apply_move(
            &mut position,
            ChessMove::Normal {
                from: sq("b7"),
                to: sq("a8"),
                promotion: None,
            },
        )
        .expect("capture should apply");
        assert_eq!(effect.captured.map(|(s, _)| s), Some(sq("a8")));
        assert!(!position.castling_right(Color::Black, Side::Queenside));
        assert!(position.castling_right(Color::Black, Side::Kingside));
    }

    #[test]
    fn castling_moves_both_pieces() {
        let mut position =
            parse_bare_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq -").expect("FEN should parse");
        apply_move(&mut position, ChessMove::Castle { side: Side::Queenside })
            .expect("castle should apply");
        assert_eq!(position.king_square(Color::Black), Some(sq("c8")));
        assert_eq!(
            position.get(sq("d8")).map(|p| p.kind),
            Some(PieceKind::Rook)
        );
        assert!(position.get(sq("a8")).is_none());
        assert!(!position.castling_right(Color::Black, Side::Kingside));
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut position =
            parse_bare_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6").expect("FEN should parse");
        let effect = apply_move(
            &mut position,
            ChessMove::EnPassant {
                from: sq("e5"),
                to: sq("d6"),
            },
        )
        .expect("en passant should apply");
        assert_eq!(effect.captured.map(|(s, _)| s), Some(sq("d5")));
        assert_eq!(position.piece_count(), 3);
        assert!(position.double_advanced_pawn().is_none());
    }

    #[test]
    fn promotion_marks_the_piece() {
        let mut position = parse_bare_fen("8/P6k/8/8/8/8/8/K7 w - -").expect("FEN should parse");
        apply_move(
            &mut position,
            ChessMove::Normal {
                from: sq("a7"),
                to: sq("a8"),
                promotion: Some(PieceKind::Queen),
            },
        )
        .expect("promotion should apply");
        let queen = position.get(sq("a8")).expect("queen on a8");
        assert!(queen.is(PieceKind::Queen, Color::White));
        assert!(queen.promoted);
        assert_eq!(ChessMove::Normal { from: sq("a7"), to: sq("a8"), promotion: Some(PieceKind::Queen) }.to_string(), "a7a8q");
    }
}
