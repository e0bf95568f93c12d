//! Board position model.
//!
//! `Position` is a 64-square mailbox plus the state that board occupancy alone
//! cannot express: side to move, castling bookkeeping (initial king/rook
//! squares and whether they have moved), the pawn that just advanced two
//! squares, and a running piece count.
//!
//! All writes go through [`Position::place`], which keeps the per-color king
//! index and the piece count consistent with the board.

use std::fmt;
use std::ops::{Deref, Index};

use rand::Rng;

use crate::game_state::chess_types::{Color, Piece, PieceKind, Side};
use crate::game_state::square::Square;

const STAUNTON_BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// A chess position.
#[derive(Debug, Clone)]
pub struct Position {
    board: [Option<Piece>; 64],
    pub turn: Color,
    kings: [Option<Square>; 2],
    piece_count: usize,
    double_advanced_pawn: Option<Square>,
    initial_kings: [Option<Square>; 2],
    // [color][side]
    initial_rooks: [[Option<Square>; 2]; 2],
    king_moved: [bool; 2],
    rook_moved: [[bool; 2]; 2],
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: [None; 64],
            turn: Color::White,
            kings: [None; 2],
            piece_count: 0,
            double_advanced_pawn: None,
            initial_kings: [None; 2],
            initial_rooks: [[None; 2]; 2],
            king_moved: [false; 2],
            rook_moved: [[false; 2]; 2],
        }
    }
}

impl Position {
    /// An empty board with white to move and no castling bookkeeping.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard (Staunton) starting layout.
    pub fn standard() -> Self {
        Self::with_back_rank(&STAUNTON_BACK_RANK)
    }

    /// A random Chess960 starting layout: bishops on opposite square colors
    /// and the king somewhere between the two rooks.
    pub fn fischer_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut rank: [Option<PieceKind>; 8] = [None; 8];

        // Even files (a, c, e, g) are dark on the first rank.
        let dark_bishop = rng.random_range(0..4usize) * 2;
        let light_bishop = rng.random_range(0..4usize) * 2 + 1;
        rank[dark_bishop] = Some(PieceKind::Bishop);
        rank[light_bishop] = Some(PieceKind::Bishop);

        for kind in [PieceKind::Queen, PieceKind::Knight, PieceKind::Knight] {
            let free: Vec<usize> = (0..8).filter(|file| rank[*file].is_none()).collect();
            let pick = free[rng.random_range(0..free.len())];
            rank[pick] = Some(kind);
        }

        // Three files remain; rook, king, rook from left to right.
        let mut remaining = [PieceKind::Rook, PieceKind::King, PieceKind::Rook].into_iter();
        let mut back_rank = [PieceKind::Pawn; 8];
        for (file, slot) in rank.iter().enumerate() {
            back_rank[file] = match slot {
                Some(kind) => *kind,
                None => remaining.next().unwrap_or(PieceKind::Rook),
            };
        }

        Self::with_back_rank(&back_rank)
    }

    fn with_back_rank(back_rank: &[PieceKind; 8]) -> Self {
        let mut position = Self::empty();
        for color in Color::ALL {
            for (file, kind) in back_rank.iter().enumerate() {
                let file = file as u8;
                if let Some(sq) = Square::new(file, color.back_rank()) {
                    position.place(sq, Some(Piece::new(*kind, color)));
                }
                if let Some(sq) = Square::new(file, color.pawn_rank()) {
                    position.place(sq, Some(Piece::new(PieceKind::Pawn, color)));
                }
            }
        }
        position.set_initial_squares();
        position
    }

    /// Piece on a square, if any.
    #[inline]
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    /// Write a square and return what was there before.
    ///
    /// Placing a king records its square in the king index; emptying or
    /// overwriting the square the index points at clears that entry.
    pub fn place(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        let previous = self.board[square.index()];

        if let Some(old) = previous {
            self.piece_count -= 1;
            if old.kind == PieceKind::King && self.kings[old.color.index()] == Some(square) {
                self.kings[old.color.index()] = None;
            }
        }

        if let Some(new) = piece {
            self.piece_count += 1;
            if new.kind == PieceKind::King {
                self.kings[new.color.index()] = Some(square);
            }
        }

        self.board[square.index()] = piece;
        previous
    }

    /// Temporarily apply `changes` to the board.
    ///
    /// The returned guard derefs to the modified position and restores the
    /// original contents when dropped, whichever way the caller leaves scope.
    pub fn test_position(&mut self, changes: &[(Square, Option<Piece>)]) -> TestPosition<'_> {
        let mut saved = Vec::with_capacity(changes.len());
        for (square, piece) in changes {
            saved.push((*square, self.place(*square, *piece)));
        }
        TestPosition {
            position: self,
            saved,
        }
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    /// All occupied squares with their pieces, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|piece| (sq, piece)))
    }

    /// Occupied squares of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Occupied squares split by color, indexed by `Color::index`.
    pub fn pieces_by_color(&self) -> [Vec<(Square, Piece)>; 2] {
        let mut split: [Vec<(Square, Piece)>; 2] = [Vec::new(), Vec::new()];
        for (sq, piece) in self.pieces() {
            split[piece.color.index()].push((sq, piece));
        }
        split
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    /// Record where each king and castling rook starts.
    ///
    /// Rooks are the outermost rooks on the home rank on either side of the
    /// king. A lone rook anywhere on the board is used for both sides.
    pub fn set_initial_squares(&mut self) {
        for color in Color::ALL {
            let king = self
                .kings[color.index()]
                .or_else(|| {
                    self.pieces_of(color)
                        .find(|(_, piece)| piece.kind == PieceKind::King)
                        .map(|(sq, _)| sq)
                });
            self.initial_kings[color.index()] = king;

            let rooks: Vec<Square> = self
                .pieces_of(color)
                .filter(|(_, piece)| piece.kind == PieceKind::Rook)
                .map(|(sq, _)| sq)
                .collect();

            let mut initial = [None; 2];
            if rooks.len() == 1 {
                initial = [Some(rooks[0]); 2];
            } else if let Some(king_sq) = king.filter(|sq| sq.rank() == color.back_rank()) {
                let home: Vec<Square> = rooks
                    .iter()
                    .copied()
                    .filter(|sq| sq.rank() == color.back_rank())
                    .collect();
                initial[Side::Kingside.index()] = home
                    .iter()
                    .copied()
                    .filter(|sq| sq.file() > king_sq.file())
                    .max_by_key(|sq| sq.file());
                initial[Side::Queenside.index()] = home
                    .iter()
                    .copied()
                    .filter(|sq| sq.file() < king_sq.file())
                    .min_by_key(|sq| sq.file());
            } else if rooks.len() == 2 {
                let (low, high) = if rooks[0].file() < rooks[1].file() {
                    (rooks[0], rooks[1])
                } else {
                    (rooks[1], rooks[0])
                };
                initial[Side::Queenside.index()] = Some(low);
                initial[Side::Kingside.index()] = Some(high);
            }
            self.initial_rooks[color.index()] = initial;
        }
    }

    #[inline]
    pub fn initial_king_square(&self, color: Color) -> Option<Square> {
        self.initial_kings[color.index()]
    }

    #[inline]
    pub fn initial_rook_square(&self, color: Color, side: Side) -> Option<Square> {
        self.initial_rooks[color.index()][side.index()]
    }

    /// Override the castling rook for one side (X-FEN file letters).
    pub fn set_initial_rook_square(&mut self, color: Color, side: Side, square: Option<Square>) {
        self.initial_rooks[color.index()][side.index()] = square;
    }

    /// Castling side whose rook starts on `square`, if any.
    pub fn castling_side_of_rook_square(&self, color: Color, square: Square) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.initial_rook_square(color, *side) == Some(square))
    }

    #[inline]
    pub fn king_has_moved(&self, color: Color) -> bool {
        self.king_moved[color.index()]
    }

    #[inline]
    pub fn rook_has_moved(&self, color: Color, side: Side) -> bool {
        self.rook_moved[color.index()][side.index()]
    }

    /// Revoke both castling rights of `color`. Rights are never restored.
    pub fn mark_king_moved(&mut self, color: Color) {
        self.king_moved[color.index()] = true;
    }

    /// Revoke one castling right of `color`.
    pub fn mark_rook_moved(&mut self, color: Color, side: Side) {
        self.rook_moved[color.index()][side.index()] = true;
    }

    /// Whether the king/rook pair for `(color, side)` is still unmoved.
    pub fn castling_right(&self, color: Color, side: Side) -> bool {
        !self.king_has_moved(color)
            && !self.rook_has_moved(color, side)
            && self.initial_rook_square(color, side).is_some()
    }

    /// `[white kingside, white queenside, black kingside, black queenside]`.
    pub fn castling_rights(&self) -> [bool; 4] {
        [
            self.castling_right(Color::White, Side::Kingside),
            self.castling_right(Color::White, Side::Queenside),
            self.castling_right(Color::Black, Side::Kingside),
            self.castling_right(Color::Black, Side::Queenside),
        ]
    }

    /// Square of a pawn that advanced two squares on the previous move.
    #[inline]
    pub fn double_advanced_pawn(&self) -> Option<Square> {
        self.double_advanced_pawn
    }

    pub fn set_double_advanced_pawn(&mut self, square: Option<Square>) {
        self.double_advanced_pawn = square;
    }

    /// The square jumped over by the last double pawn advance (the FEN
    /// en-passant field).
    pub fn en_passant_target(&self) -> Option<Square> {
        let pawn = self.double_advanced_pawn?;
        match pawn.rank() {
            3 => Square::new(pawn.file(), 2),
            4 => Square::new(pawn.file(), 5),
            _ => None,
        }
    }

    /// White material minus black material.
    pub fn evaluate(&self) -> i32 {
        self.pieces()
            .map(|(_, piece)| match piece.color {
                Color::White => piece.kind.value(),
                Color::Black => -piece.kind.value(),
            })
            .sum()
    }
}

impl Index<Square> for Position {
    type Output = Option<Piece>;

    fn index(&self, square: Square) -> &Self::Output {
        &self.board[square.index()]
    }
}

/// Positions are equal when everything that matters for the rules matches:
/// occupancy, side to move, castling rights and the en-passant target.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.turn == other.turn
            && self.castling_rights() == other.castling_rights()
            && self.en_passant_target() == other.en_passant_target()
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::utils::render_game_state::render_position(self))
    }
}

/// Scoped board overrides created by [`Position::test_position`].
pub struct TestPosition<'a> {
    position: &'a mut Position,
    saved: Vec<(Square, Option<Piece>)>,
}

impl Deref for TestPosition<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl Drop for TestPosition<'_> {
    fn drop(&mut self) {
        for (square, piece) in self.saved.drain(..).rev() {
            self.position.place(square, piece);
        }
    }
}
