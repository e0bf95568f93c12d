//! Reserve drops (crazyhouse-style).
//!
//! Captured pieces join the capturer's reserve, promoted pieces reverting to
//! pawns. Instead of moving, a player may drop a reserve piece on an empty
//! square with `N@f3`, `P@e4` or `@e4` (pawn). Pawns may not be dropped on
//! the first or last rank, and a drop may not leave the dropping side in
//! check.

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Color, Piece, PieceKind, ALL_PIECE_KINDS};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::move_generation::legal_move_checks::king_is_in_check;
use crate::utils::algebraic::algebraic_to_square;
use crate::utils::standard_algebraic::split_suffixes;
use crate::variants::rules_extension::{ExtraMove, RulesExtension};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveDrop {
    // [color][piece kind index]
    reserves: [[u32; 6]; 2],
}

impl ReserveDrop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, color: Color, kind: PieceKind) -> u32 {
        self.reserves[color.index()][kind.index()]
    }

    /// Non-empty reserve entries of `color`.
    pub fn reserve(&self, color: Color) -> Vec<(PieceKind, u32)> {
        ALL_PIECE_KINDS
            .iter()
            .map(|kind| (*kind, self.count(color, *kind)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    pub fn add_to_reserve(&mut self, color: Color, kind: PieceKind) {
        self.reserves[color.index()][kind.index()] += 1;
    }

    /// Whether `color` may drop `kind` on `square` right now.
    pub fn can_drop(
        &self,
        position: &mut Position,
        color: Color,
        kind: PieceKind,
        square: Square,
    ) -> Result<(), String> {
        if self.count(color, kind) == 0 {
            return Err(format!("No {} in reserve.", kind.name()));
        }
        if position.get(square).is_some() {
            return Err(format!("Cannot drop onto occupied square '{square}'."));
        }
        if kind == PieceKind::Pawn && matches!(square.rank(), 0 | 7) {
            return Err("Cannot drop pawn on first or last rank.".to_string());
        }
        let probe = position.test_position(&[(square, Some(Piece::new(kind, color)))]);
        if king_is_in_check(&probe, color) {
            return Err("Cannot drop because player's king would be put in check.".to_string());
        }
        Ok(())
    }

    fn can_drop_on_any(&self, position: &mut Position, color: Color, squares: &[Square]) -> bool {
        ALL_PIECE_KINDS.iter().any(|kind| {
            self.count(color, *kind) > 0
                && squares
                    .iter()
                    .any(|square| self.can_drop(position, color, *kind, *square).is_ok())
        })
    }
}

/// `(kind, square)` of a drop notation, or `None` when it is not one.
fn parse_drop(notation: &str) -> Option<ChessResult<(PieceKind, Square)>> {
    let (body, _) = split_suffixes(notation.trim());
    let (letter, square) = body.split_once('@')?;
    let kind = match letter {
        "" => Some(PieceKind::Pawn),
        _ => letter
            .chars()
            .next()
            .filter(|_| letter.len() == 1)
            .filter(char::is_ascii_uppercase)
            .and_then(PieceKind::from_letter)
            .filter(|kind| *kind != PieceKind::King),
    };
    let parsed = match (kind, algebraic_to_square(square)) {
        (Some(kind), Ok(square)) => Ok((kind, square)),
        _ => Err(ChessError::illegal(format!(
            "Could not read notation '{notation}'."
        ))),
    };
    Some(parsed)
}

impl RulesExtension for ReserveDrop {
    fn name(&self) -> &'static str {
        "reserve_drop"
    }

    fn try_extra_move(
        &mut self,
        notation: &str,
        position: &mut Position,
    ) -> Option<ChessResult<ExtraMove>> {
        let (kind, square) = match parse_drop(notation)? {
            Ok(parsed) => parsed,
            Err(err) => return Some(Err(err)),
        };
        let color = position.turn;
        if let Err(reason) = self.can_drop(position, color, kind, square) {
            return Some(Err(ChessError::Move(reason)));
        }

        self.reserves[color.index()][kind.index()] -= 1;
        position.place(square, Some(Piece::new(kind, color)));
        position.set_double_advanced_pawn(None);

        Some(Ok(ExtraMove {
            notation: format!("{}@{}", kind.letter(), square),
            resets_halfmove_clock: true,
        }))
    }

    fn can_make_extra_move(&self, position: &mut Position, color: Color) -> bool {
        let empty: Vec<Square> = Square::all().filter(|sq| position.get(*sq).is_none()).collect();
        self.can_drop_on_any(position, color, &empty)
    }

    fn can_block_check(
        &self,
        position: &mut Position,
        color: Color,
        _checks: &[(Square, Piece)],
        blocking_squares: &[Square],
    ) -> bool {
        self.can_drop_on_any(position, color, blocking_squares)
    }

    fn on_capture(&mut self, capturer: Color, captured: Piece) {
        let kind = if captured.promoted {
            PieceKind::Pawn
        } else {
            captured.kind
        };
        if kind != PieceKind::King {
            self.add_to_reserve(capturer, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_bare_fen;

    fn sq(name: &str) -> Square {
        name.parse().expect("square should parse")
    }

    #[test]
    fn captures_fill_the_reserve() {
        let mut rules = ReserveDrop::new();
        rules.on_capture(Color::White, Piece::new(PieceKind::Knight, Color::Black));
        let mut promoted = Piece::new(PieceKind::Queen, Color::Black);
        promoted.promoted = true;
        rules.on_capture(Color::White, promoted);
        assert_eq!(
            rules.reserve(Color::White),
            vec![(PieceKind::Pawn, 1), (PieceKind::Knight, 1)]
        );
        assert!(rules.reserve(Color::Black).is_empty());
    }

    #[test]
    fn drop_places_the_piece() {
        let mut rules = ReserveDrop::new();
        rules.add_to_reserve(Color::White, PieceKind::Knight);
        let mut position = Position::standard();
        let made = rules
            .try_extra_move("N@e4", &mut position)
            .expect("drop notation")
            .expect("legal drop");
        assert_eq!(made.notation, "N@e4");
        assert!(made.resets_halfmove_clock);
        assert_eq!(
            position.get(sq("e4")).map(|p| p.kind),
            Some(PieceKind::Knight)
        );
        assert_eq!(rules.count(Color::White, PieceKind::Knight), 0);
    }

    #[test]
    fn illegal_drops_are_rejected() {
        let mut rules = ReserveDrop::new();
        let mut position = Position::standard();
        assert!(rules.try_extra_move("e4", &mut position).is_none());
        assert!(matches!(
            rules.try_extra_move("@e4", &mut position),
            Some(Err(ChessError::Move(_)))
        ));

        rules.add_to_reserve(Color::White, PieceKind::Pawn);
        assert!(rules.try_extra_move("@e8", &mut position).is_some_and(|r| r.is_err()));
        assert!(rules.try_extra_move("P@e2", &mut position).is_some_and(|r| r.is_err()));
        assert!(rules.try_extra_move("X@e4", &mut position).is_some_and(|r| r.is_err()));
        assert!(rules.try_extra_move("@e4", &mut position).is_some_and(|r| r.is_ok()));
    }

    #[test]
    fn drops_can_block_checks() {
        let mut rules = ReserveDrop::new();
        let mut position = parse_bare_fen("k7/8/8/8/8/8/8/K6r w - -").expect("FEN should parse");
        let between = vec![sq("b1"), sq("c1"), sq("d1"), sq("e1"), sq("f1"), sq("g1")];
        assert!(!rules.can_block_check(&mut position, Color::White, &[], &between));

        rules.add_to_reserve(Color::White, PieceKind::Bishop);
        assert!(rules.can_block_check(&mut position, Color::White, &[], &between));
        assert!(rules.can_make_extra_move(&mut position, Color::White));
    }
}
