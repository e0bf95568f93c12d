//! Ray walking for rooks, bishops and queens.
//!
//! Rays are yielded nearest square first so callers can stop at the first
//! occupied square.

use crate::game_state::chess_types::PieceKind;
use crate::game_state::square::Square;

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Ray directions for a sliding piece kind; empty for the others.
pub fn directions_for(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Queen => &QUEEN_DIRECTIONS,
        _ => &[],
    }
}

/// Squares from `from` (exclusive) to the board edge along `direction`.
pub fn ray(from: Square, direction: (i8, i8)) -> impl Iterator<Item = Square> {
    let (file_step, rank_step) = direction;
    std::iter::successors(from.offset(file_step, rank_step), move |sq| {
        sq.offset(file_step, rank_step)
    })
}

/// Whether `kind` slides along `direction`.
pub fn slides_along(kind: PieceKind, direction: (i8, i8)) -> bool {
    let diagonal = direction.0 != 0 && direction.1 != 0;
    match kind {
        PieceKind::Queen => true,
        PieceKind::Rook => !diagonal,
        PieceKind::Bishop => diagonal,
        _ => false,
    }
}
