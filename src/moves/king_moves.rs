//! King step tables.

use crate::game_state::square::{step_table, Square};

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub const KING_ATTACKS: [u64; 64] = step_table(&KING_STEPS);

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square.index()]
}

/// Squares adjacent to `square`.
#[inline]
pub fn king_squares(square: Square) -> impl Iterator<Item = Square> {
    Square::iter_mask(king_attacks(square))
}
