//! Square conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and the internal
//! `Square` representation reused by FEN/EPD/PGN components.

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::square::Square;

/// Convert algebraic notation (for example: "e4") to a square.
#[inline]
pub fn algebraic_to_square(square: &str) -> ChessResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::parse("square", square));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::parse("square", square));
    }

    Square::new(file - b'a', rank - b'1').ok_or_else(|| ChessError::parse("square", square))
}

/// Convert a square to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    format!("{}{}", square.file_char(), square.rank_char())
}

/// Zero-based file index of a file letter.
#[inline]
pub fn file_from_char(ch: char) -> Option<u8> {
    match ch {
        'a'..='h' => Some(ch as u8 - b'a'),
        _ => None,
    }
}

/// Zero-based rank index of a rank digit.
#[inline]
pub fn rank_from_char(ch: char) -> Option<u8> {
    match ch {
        '1'..='8' => Some(ch as u8 - b'1'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, file_from_char, rank_from_char, square_to_algebraic};

    #[test]
    fn round_trip_square_conversions() {
        let a1 = algebraic_to_square("a1").expect("a1 should parse");
        let h8 = algebraic_to_square("h8").expect("h8 should parse");
        assert_eq!(a1.index(), 0);
        assert_eq!(h8.index(), 63);
        assert_eq!(square_to_algebraic(a1), "a1");
        assert_eq!(square_to_algebraic(h8), "h8");
        assert_eq!(algebraic_to_square("e4").expect("e4 should parse").index(), 28);
    }

    #[test]
    fn rejects_malformed_squares() {
        for bad in ["", "e", "e9", "i4", "e44", "E4"] {
            assert!(algebraic_to_square(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn file_and_rank_chars() {
        assert_eq!(file_from_char('c'), Some(2));
        assert_eq!(file_from_char('x'), None);
        assert_eq!(rank_from_char('8'), Some(7));
        assert_eq!(rank_from_char('0'), None);
    }
}
