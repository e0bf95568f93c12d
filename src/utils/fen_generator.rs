//! Position-to-FEN generator.

use crate::game_state::chess_types::{Color, PieceKind, Side};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::utils::algebraic::square_to_algebraic;

/// Full FEN with move counters.
pub fn generate_fen(position: &Position, halfmove_clock: u32, fullmove_number: u32) -> String {
    format!(
        "{} {} {}",
        generate_bare_fen(position),
        halfmove_clock,
        fullmove_number
    )
}

/// The four position fields: placement, side to move, castling, en passant.
pub fn generate_bare_fen(position: &Position) -> String {
    let side_to_move = match position.turn {
        Color::White => "w",
        Color::Black => "b",
    };
    format!(
        "{} {} {} {}",
        generate_board_field(position),
        side_to_move,
        generate_castling_field(position),
        generate_en_passant_field(position)
    )
}

fn generate_board_field(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for square in Square::in_rank(rank) {
            if let Some(piece) = position.get(square) {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(piece.fen_char());
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

/// Rights in the order white kingside, white queenside, black kingside,
/// black queenside. A castling rook that is not the outermost rook on its
/// side of the king is written as its file letter.
fn generate_castling_field(position: &Position) -> String {
    let mut out = String::new();

    for color in Color::ALL {
        for side in Side::ALL {
            if !position.castling_right(color, side) {
                continue;
            }
            let letter = match position.initial_rook_square(color, side) {
                Some(rook) if !is_outermost_rook(position, color, side, rook.file()) => {
                    rook.file_char()
                }
                _ => match side {
                    Side::Kingside => 'k',
                    Side::Queenside => 'q',
                },
            };
            out.push(match color {
                Color::White => letter.to_ascii_uppercase(),
                Color::Black => letter,
            });
        }
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}

fn is_outermost_rook(position: &Position, color: Color, side: Side, file: u8) -> bool {
    let beyond: Vec<u8> = match side {
        Side::Kingside => (file + 1..8).collect(),
        Side::Queenside => (0..file).collect(),
    };
    !beyond.into_iter().any(|f| {
        Square::new(f, color.back_rank())
            .and_then(|sq| position.get(sq))
            .is_some_and(|piece| piece.is(PieceKind::Rook, color))
    })
}

fn generate_en_passant_field(position: &Position) -> String {
    position
        .en_passant_target()
        .map(square_to_algebraic)
        .unwrap_or_else(|| "-".to_owned())
}
