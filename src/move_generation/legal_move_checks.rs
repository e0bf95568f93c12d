//! Attack and check queries.
//!
//! Every function here reads the position only. `color` always names the
//! side being attacked (the defender), never the attacker.

use crate::game_state::chess_types::{Color, Piece, PieceKind};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::moves::king_moves::king_squares;
use crate::moves::knight_moves::knight_squares;
use crate::moves::pawn_moves::pawn_capture_squares;
use crate::moves::sliding_moves::{ray, slides_along, QUEEN_DIRECTIONS};

/// Whether `square` is attacked by any piece of the opponent of `color`.
pub fn is_checked_square(position: &Position, color: Color, square: Square) -> bool {
    is_checked_by_slider(position, color, square)
        || is_checked_by_pawn(position, color, square)
        || is_checked_by_king(position, color, square)
        || is_checked_by_knight(position, color, square)
}

#[inline]
pub fn king_is_in_check(position: &Position, color: Color) -> bool {
    match position.king_square(color) {
        Some(king) => is_checked_square(position, color, king),
        None => false,
    }
}

fn is_checked_by_slider(position: &Position, color: Color, square: Square) -> bool {
    first_sliders(position, square)
        .into_iter()
        .any(|(_, piece)| piece.color != color)
}

fn is_checked_by_pawn(position: &Position, color: Color, square: Square) -> bool {
    pawn_capture_squares(color, square).any(|from| {
        position
            .get(from)
            .is_some_and(|pc| pc.is(PieceKind::Pawn, color.opposite()))
    })
}

fn is_checked_by_king(position: &Position, color: Color, square: Square) -> bool {
    match position.king_square(color.opposite()) {
        Some(enemy_king) => king_squares(square).any(|sq| sq == enemy_king),
        None => false,
    }
}

fn is_checked_by_knight(position: &Position, color: Color, square: Square) -> bool {
    knight_squares(square).any(|from| {
        position
            .get(from)
            .is_some_and(|pc| pc.is(PieceKind::Knight, color.opposite()))
    })
}

/// First piece on each ray from `square`, kept only when it slides along
/// that ray back to `square`.
fn first_sliders(position: &Position, square: Square) -> Vec<(Square, Piece)> {
    let mut found = Vec::new();
    for direction in QUEEN_DIRECTIONS {
        for sq in ray(square, direction) {
            if let Some(piece) = position.get(sq) {
                if slides_along(piece.kind, direction) {
                    found.push((sq, piece));
                }
                break;
            }
        }
    }
    found
}

/// Every square attacked by the opponent of `color`.
pub fn checked_squares(position: &Position, color: Color) -> Vec<Square> {
    Square::all()
        .filter(|sq| is_checked_square(position, color, *sq))
        .collect()
}

/// Pieces of the opponent of `victim` that can move to `square`.
///
/// With `square_is_empty` set, pawn captures are replaced by pawn advances
/// (one step, or two from the pawn's starting rank), which is what matters
/// when asking who can interpose on an empty square.
pub fn threatening_pieces(
    position: &Position,
    square: Square,
    victim: Color,
    square_is_empty: bool,
) -> Vec<(Square, Piece)> {
    let attacker = victim.opposite();
    let mut threats: Vec<(Square, Piece)> = first_sliders(position, square)
        .into_iter()
        .filter(|(_, piece)| piece.color == attacker)
        .collect();

    if let Some(king) = position.king_square(attacker) {
        if king_squares(square).any(|sq| sq == king) {
            if let Some(piece) = position.get(king) {
                threats.push((king, piece));
            }
        }
    }

    threats.extend(knight_squares(square).filter_map(|from| {
        position
            .get(from)
            .filter(|pc| pc.is(PieceKind::Knight, attacker))
            .map(|pc| (from, pc))
    }));

    if !square_is_empty {
        threats.extend(pawn_capture_squares(victim, square).filter_map(|from| {
            position
                .get(from)
                .filter(|pc| pc.is(PieceKind::Pawn, attacker))
                .map(|pc| (from, pc))
        }));
    } else if let Some(pusher) = pawn_pusher(position, square, attacker) {
        threats.push(pusher);
    }

    threats
}

/// Pawn of `color` that can advance onto the empty `square`.
fn pawn_pusher(position: &Position, square: Square, color: Color) -> Option<(Square, Piece)> {
    let one_back = square.step_forward(color, -1)?;
    match position.get(one_back) {
        Some(pc) if pc.is(PieceKind::Pawn, color) => Some((one_back, pc)),
        Some(_) => None,
        None => {
            let two_back = square.step_forward(color, -2)?;
            position
                .get(two_back)
                .filter(|pc| pc.is(PieceKind::Pawn, color) && two_back.rank() == color.pawn_rank())
                .map(|pc| (two_back, pc))
        }
    }
}
