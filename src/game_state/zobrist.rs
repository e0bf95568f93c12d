//! Zobrist hashing for repetition tracking.
//!
//! Keys come from a fixed-seed generator, so independently constructed
//! positions hash identically. A hash covers exactly what makes two positions
//! the same for repetition purposes: occupancy, side to move, the four
//! castling rights, and the en-passant file when an en-passant capture is
//! actually available.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::chess_types::{Color, Piece};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::move_generation::legal_move_generator::en_passant_capturers;

const KEY_SEED: u64 = 0x0C4E_55E5_2024_0001;

#[derive(Debug)]
struct ZobristKeys {
    // [color][piece kind][square]
    piece_square: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(KEY_SEED);
        let piece_square = std::array::from_fn(|_| {
            std::array::from_fn(|_| std::array::from_fn(|_| rng.random()))
        });
        ZobristKeys {
            piece_square,
            black_to_move: rng.random(),
            castling: std::array::from_fn(|_| rng.random()),
            en_passant_file: std::array::from_fn(|_| rng.random()),
        }
    })
}

#[inline]
pub fn piece_square_key(piece: Piece, square: Square) -> u64 {
    keys().piece_square[piece.color.index()][piece.kind.index()][square.index()]
}

/// Key for a castling-rights mask (`0..=15`, bit order as in
/// `Position::castling_rights`).
#[inline]
pub fn castling_key(mask: u8) -> u64 {
    keys().castling[(mask & 0x0F) as usize]
}

#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    keys().en_passant_file[(file & 0x07) as usize]
}

/// Side-to-move toggle (xor in when black is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    keys().black_to_move
}

/// Structural hash of a position.
pub fn position_hash(position: &Position) -> u64 {
    let mut key = 0u64;

    for (square, piece) in position.pieces() {
        key ^= piece_square_key(piece, square);
    }

    if position.turn == Color::Black {
        key ^= side_to_move_key();
    }

    let mask = position
        .castling_rights()
        .iter()
        .enumerate()
        .fold(0u8, |mask, (bit, right)| mask | ((*right as u8) << bit));
    key ^= castling_key(mask);

    if let Some(pawn) = position.double_advanced_pawn() {
        let mut probe = position.clone();
        if !en_passant_capturers(&mut probe).is_empty() {
            key ^= en_passant_file_key(pawn.file());
        }
    }

    key
}

#[cfg(test)]
mod tests {
    use super::position_hash;
    use crate::game_state::position::Position;
    use crate::utils::fen_parser::parse_bare_fen;

    fn hash_of(fen: &str) -> u64 {
        position_hash(&parse_bare_fen(fen).expect("FEN should parse"))
    }

    #[test]
    fn independently_built_positions_hash_identically() {
        assert_eq!(
            position_hash(&Position::standard()),
            position_hash(&Position::standard())
        );
        assert_eq!(
            position_hash(&Position::standard()),
            hash_of("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -")
        );
    }

    #[test]
    fn side_to_move_changes_hash() {
        assert_ne!(hash_of("4k3/8/8/8/8/8/8/4K3 w - -"), hash_of("4k3/8/8/8/8/8/8/4K3 b - -"));
    }

    #[test]
    fn castling_rights_change_hash() {
        assert_ne!(
            hash_of("4k3/8/8/8/8/8/8/R3K2R w KQ -"),
            hash_of("4k3/8/8/8/8/8/8/R3K2R w - -")
        );
    }

    #[test]
    fn en_passant_only_counts_when_capturable() {
        // No black pawn can take on e3: the target does not change the hash.
        assert_eq!(
            hash_of("4k3/8/8/8/4P3/8/8/4K3 b - e3"),
            hash_of("4k3/8/8/8/4P3/8/8/4K3 b - -")
        );
        // A black pawn on d4 can take en passant.
        assert_ne!(
            hash_of("4k3/8/8/8/3pP3/8/8/4K3 b - e3"),
            hash_of("4k3/8/8/8/3pP3/8/8/4K3 b - -")
        );
    }
}
