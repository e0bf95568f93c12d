//! Knight target tables. The legality engine filters the targets by
//! occupancy.

use crate::game_state::square::{step_table, Square};

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KNIGHT_ATTACKS: [u64; 64] = step_table(&KNIGHT_STEPS);

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square.index()]
}

/// Squares a knight on `square` jumps to, ignoring occupancy.
#[inline]
pub fn knight_squares(square: Square) -> impl Iterator<Item = Square> {
    Square::iter_mask(knight_attacks(square))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    #[test]
    fn centre_knight_reaches_eight_squares() {
        assert_eq!(knight_attacks(sq("d4")).count_ones(), 8);
    }

    #[test]
    fn corner_knight_reaches_two_squares() {
        let targets: Vec<String> = knight_squares(sq("a1")).map(|s| s.to_string()).collect();
        assert_eq!(targets, ["c2", "b3"]);
        let targets: Vec<String> = knight_squares(sq("h8")).map(|s| s.to_string()).collect();
        assert_eq!(targets, ["g6", "f7"]);
    }
}
