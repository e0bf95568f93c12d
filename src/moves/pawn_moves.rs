//! Pawn capture tables.
//!
//! `pawn_capture_squares(color, sq)` are the two diagonal squares a pawn of
//! `color` standing on `sq` captures onto. Read the other way round, the
//! squares holding enemy pawns that attack `sq` are
//! `pawn_capture_squares(defender, sq)`.

use crate::game_state::chess_types::Color;
use crate::game_state::square::{step_table, Square};

pub const WHITE_PAWN_ATTACKS: [u64; 64] = step_table(&[(-1, 1), (1, 1)]);
pub const BLACK_PAWN_ATTACKS: [u64; 64] = step_table(&[(-1, -1), (1, -1)]);

#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square.index()],
        Color::Black => BLACK_PAWN_ATTACKS[square.index()],
    }
}

#[inline]
pub fn pawn_capture_squares(color: Color, square: Square) -> impl Iterator<Item = Square> {
    Square::iter_mask(pawn_attacks(color, square))
}
