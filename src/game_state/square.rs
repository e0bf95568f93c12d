//! Board square addressing.
//!
//! Squares are indexed `0 == a1`, `7 == h1`, `63 == h8`, the same layout the
//! attack tables in `moves/` are generated for.

use std::fmt;
use std::str::FromStr;

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::Color;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

/// One of the 64 board squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Build a square from zero-based file and rank. Out-of-range input yields `None`.
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    /// Constant constructor for compile-time tables. Panics on bad input at compile time.
    pub(crate) const fn at(file: u8, rank: u8) -> Self {
        assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    pub const fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    pub const fn rank_char(self) -> char {
        (b'1' + self.rank()) as char
    }

    /// Whether the square is a light square (h1 is light).
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    /// Step by a file and rank delta, `None` when it leaves the board.
    #[inline]
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square((rank * 8 + file) as u8))
        } else {
            None
        }
    }

    /// Step `n` ranks in the direction a pawn of `color` advances.
    #[inline]
    pub fn step_forward(self, color: Color, n: i8) -> Option<Self> {
        self.offset(0, color.forward() * n)
    }

    /// Horizontally adjacent squares on the same rank.
    pub fn adjacent_on_rank(self) -> impl Iterator<Item = Square> {
        [-1i8, 1].into_iter().filter_map(move |df| self.offset(df, 0))
    }

    /// Squares strictly between `self` and `other` when they share a rank,
    /// file or diagonal. Unaligned squares yield an empty list.
    pub fn squares_between(self, other: Square) -> Vec<Square> {
        let df = other.file() as i8 - self.file() as i8;
        let dr = other.rank() as i8 - self.rank() as i8;
        if self == other || !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
            return Vec::new();
        }

        let step_f = df.signum();
        let step_r = dr.signum();
        let mut out = Vec::new();
        let mut cursor = self.offset(step_f, step_r);
        while let Some(sq) = cursor {
            if sq == other {
                break;
            }
            out.push(sq);
            cursor = sq.offset(step_f, step_r);
        }
        out
    }

    /// Iterate the squares set in a bitboard mask, lowest index first.
    pub fn iter_mask(mut mask: u64) -> impl Iterator<Item = Square> {
        std::iter::from_fn(move || {
            if mask == 0 {
                return None;
            }
            let sq = Square(mask.trailing_zeros() as u8);
            mask &= mask - 1;
            Some(sq)
        })
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Squares of one rank, a-file first.
    pub fn in_rank(rank: u8) -> impl Iterator<Item = Square> {
        (0..8u8).filter_map(move |file| Square::new(file, rank))
    }
}

/// Bitboard of the squares reached from each square by one of `steps`
/// (`(file, rank)` deltas), dropping steps that leave the board.
pub(crate) const fn step_table(steps: &[(i8, i8)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut index = 0usize;
    while index < 64 {
        let file = (index % 8) as i8;
        let rank = (index / 8) as i8;
        let mut s = 0usize;
        while s < steps.len() {
            let (to_file, to_rank) = (file + steps[s].0, rank + steps[s].1);
            if to_file >= 0 && to_file < 8 && to_rank >= 0 && to_rank < 8 {
                table[index] |= 1u64 << (to_rank as u32 * 8 + to_file as u32);
            }
            s += 1;
        }
        index += 1;
    }
    table
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&square_to_algebraic(*self))
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        algebraic_to_square(s)
    }
}
