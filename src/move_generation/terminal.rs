//! Checkmate, stalemate and material draws.

use crate::game_state::chess_rules::INSUFFICIENT_MATERIAL_MAX_PIECES;
use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::game_status::{GameStatus, StatusReason};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::move_generation::legal_move_checks::{king_is_in_check, threatening_pieces};
use crate::move_generation::legal_move_generator::{can_en_passant, can_move_piece, legal_moves};
use crate::variants::rules_extension::RulesExtension;

/// Checkmate status for whichever side is mated, if any.
pub fn is_checkmate(position: &mut Position, rules: &dyn RulesExtension) -> Option<GameStatus> {
    Color::ALL
        .into_iter()
        .find(|color| is_checkmated(position, *color, rules))
        .map(|loser| GameStatus::decisive(loser.opposite(), StatusReason::Checkmate))
}

/// Whether `color` is in check with no way out.
pub fn is_checkmated(position: &mut Position, color: Color, rules: &dyn RulesExtension) -> bool {
    king_is_in_check(position, color)
        && !can_block_or_capture_check(position, color, rules)
        && !king_can_escape_check(position, color)
}

/// Whether the king of `color` has any legal move. Only meaningful while in check.
pub fn king_can_escape_check(position: &mut Position, color: Color) -> bool {
    match position.king_square(color) {
        Some(king) => !legal_moves(position, king).is_empty(),
        None => false,
    }
}

/// Whether a non-king piece of `color` can interpose on, or capture, the
/// current check. Two simultaneous checkers can never both be answered this
/// way, which the trial moves detect on their own.
pub fn can_block_or_capture_check(
    position: &mut Position,
    color: Color,
    rules: &dyn RulesExtension,
) -> bool {
    let Some(king) = position.king_square(color) else {
        return false;
    };

    let checks = threatening_pieces(position, king, color, false);
    let mut blocking_squares: Vec<Square> = Vec::new();
    for (check_sq, checker) in &checks {
        match checker.kind {
            PieceKind::Knight | PieceKind::Pawn => blocking_squares.push(*check_sq),
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => {
                blocking_squares.extend(check_sq.squares_between(king));
                blocking_squares.push(*check_sq);
            }
            PieceKind::King => {}
        }
    }

    if rules.can_block_check(position, color, &checks, &blocking_squares) {
        return true;
    }

    if en_passant_can_block_check(position, color) {
        return true;
    }

    for target in blocking_squares {
        let is_checker = checks.iter().any(|(sq, _)| *sq == target);
        let movers = threatening_pieces(position, target, color.opposite(), !is_checker);
        for (from, piece) in movers {
            if piece.kind == PieceKind::King {
                continue;
            }
            if can_move_piece(position, from, target, true).is_ok() {
                return true;
            }
        }
    }

    false
}

/// Whether an en-passant capture by `color` leaves its king out of check.
fn en_passant_can_block_check(position: &mut Position, color: Color) -> bool {
    let Some(advanced) = position.double_advanced_pawn() else {
        return false;
    };
    let capturers: Vec<Square> = advanced
        .adjacent_on_rank()
        .filter(|sq| {
            position
                .get(*sq)
                .is_some_and(|pc| pc.is(PieceKind::Pawn, color))
        })
        .collect();
    capturers
        .into_iter()
        .any(|from| can_en_passant(position, from).is_ok())
}

/// Stalemate when the side to move is not in check and has nothing to play.
pub fn is_stalemate(position: &mut Position, rules: &dyn RulesExtension) -> Option<GameStatus> {
    let color = position.turn;
    if king_is_in_check(position, color) {
        return None;
    }

    let own: Vec<Square> = position.pieces_of(color).map(|(sq, _)| sq).collect();
    // King moves include castling destinations.
    let no_moves = own
        .into_iter()
        .all(|sq| legal_moves(position, sq).is_empty());

    if no_moves && !rules.can_make_extra_move(position, color) {
        Some(GameStatus::drawn(StatusReason::Stalemate))
    } else {
        None
    }
}

/// Whether `color` still has mating material, used when the opponent's flag
/// falls. More than three pieces always counts as sufficient.
pub fn player_has_sufficient_material(position: &Position, color: Color) -> bool {
    let [white, black] = kinds_by_color(position);
    let (own, other) = match color {
        Color::White => (white, black),
        Color::Black => (black, white),
    };
    if own.len() > 3 {
        return true;
    }
    side_has_mating_material(position, &own, &other)
}

/// Draw by insufficient material.
///
/// Only runs with few pieces on the board. A side has mating material when
/// it holds a rook, pawn or queen; two or more minor pieces; a knight while
/// the opponent has anything but a bare king; a bishop while the opponent
/// has a knight or pawn; or when bishops stand on both square colors.
pub fn is_draw_by_insufficient_material(position: &Position) -> Option<GameStatus> {
    if position.piece_count() > INSUFFICIENT_MATERIAL_MAX_PIECES {
        return None;
    }

    let [white, black] = kinds_by_color(position);
    let sufficient = side_has_mating_material(position, &white, &black)
        || side_has_mating_material(position, &black, &white);

    if sufficient {
        None
    } else {
        Some(GameStatus::drawn(StatusReason::InsufficientMaterial))
    }
}

fn kinds_by_color(position: &Position) -> [Vec<PieceKind>; 2] {
    let mut kinds: [Vec<PieceKind>; 2] = [Vec::new(), Vec::new()];
    for (_, piece) in position.pieces() {
        kinds[piece.color.index()].push(piece.kind);
    }
    kinds
}

fn side_has_mating_material(position: &Position, own: &[PieceKind], other: &[PieceKind]) -> bool {
    let has = |kinds: &[PieceKind], kind: PieceKind| kinds.contains(&kind);

    if [PieceKind::Rook, PieceKind::Pawn, PieceKind::Queen]
        .iter()
        .any(|kind| has(own, *kind))
    {
        return true;
    }
    if own.iter().filter(|kind| kind.is_minor()).count() > 1 {
        return true;
    }
    if has(own, PieceKind::Knight)
        && [PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Pawn]
            .iter()
            .any(|kind| has(other, *kind))
    {
        return true;
    }
    if has(own, PieceKind::Bishop) {
        if has(other, PieceKind::Knight) || has(other, PieceKind::Pawn) {
            return true;
        }
        // Bishops of either color count toward the square-color test.
        let mut light = false;
        let mut dark = false;
        for (sq, piece) in position.pieces() {
            if piece.kind == PieceKind::Bishop {
                if sq.is_light() {
                    light = true;
                } else {
                    dark = true;
                }
            }
        }
        if light && dark {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_bare_fen;
    use crate::variants::rules_extension::StandardRules;

    fn position(fen: &str) -> Position {
        parse_bare_fen(fen).expect("FEN should parse")
    }

    #[test]
    fn back_rank_mate_is_checkmate() {
        let mut pos = position("6k1/5ppp/8/8/8/8/8/R5K1 b - -");
        assert!(is_checkmate(&mut pos, &StandardRules).is_none());

        let mut mated = position("R5k1/5ppp/8/8/8/8/8/6K1 b - -");
        let status = is_checkmate(&mut mated, &StandardRules).expect("black is mated");
        assert_eq!(status.winner, Some(Color::White));
        assert_eq!(status.reason_code(), Some("checkmate"));
    }

    #[test]
    fn check_that_can_be_blocked_is_not_mate() {
        let mut pos = position("R5k1/5ppp/8/8/8/8/7K/2r5 b - -");
        assert!(can_block_or_capture_check(&mut pos, Color::Black, &StandardRules));
        assert!(is_checkmate(&mut pos, &StandardRules).is_none());
    }

    #[test]
    fn double_check_cannot_be_blocked() {
        // Rook on e1 and knight on f6 both give check.
        let mut pos = position("4k3/3q4/5N2/8/8/8/8/4R1K1 b - -");
        assert!(!can_block_or_capture_check(&mut pos, Color::Black, &StandardRules));
        assert!(king_can_escape_check(&mut pos, Color::Black));
    }

    #[test]
    fn en_passant_can_remove_a_checking_pawn() {
        // The pawn that just reached d4 checks the king on e5; exd3 removes it.
        let mut pos = position("8/8/8/4k3/3Pp3/8/8/4K3 b - d3");
        assert!(king_is_in_check(&pos, Color::Black));
        assert!(can_block_or_capture_check(&mut pos, Color::Black, &StandardRules));
    }

    #[test]
    fn cornered_king_is_stalemated() {
        let mut pos = position("7k/5Q2/6K1/8/8/8/8/8 b - -");
        let status = is_stalemate(&mut pos, &StandardRules).expect("stalemate");
        assert_eq!(status.reason_code(), Some("stalemate"));
        assert!(status.winner.is_none());
    }

    #[test]
    fn insufficient_material_rules() {
        assert!(is_draw_by_insufficient_material(&position("4k3/8/8/8/8/8/8/4K3 w - -")).is_some());
        assert!(is_draw_by_insufficient_material(&position("4k3/8/8/8/8/8/8/2B1K3 w - -")).is_some());
        assert!(is_draw_by_insufficient_material(&position("4k3/8/8/8/8/8/8/1N2K3 w - -")).is_some());
        // Knight against a bishop can still mate by this rule set.
        assert!(is_draw_by_insufficient_material(&position("4kb2/8/8/8/8/8/8/1N2K3 w - -")).is_none());
        // Same-colored bishops are a draw, opposite-colored ones are not.
        assert!(is_draw_by_insufficient_material(&position("4kb2/8/8/8/8/8/8/2B1K3 w - -")).is_some());
        assert!(is_draw_by_insufficient_material(&position("4k1b1/8/8/8/8/8/8/2B1K3 w - -")).is_none());
        assert!(is_draw_by_insufficient_material(&position("4k3/8/8/8/8/8/4P3/4K3 w - -")).is_none());
        // Too many pieces to bother.
        assert!(is_draw_by_insufficient_material(&Position::standard()).is_none());
    }

    #[test]
    fn lone_king_lacks_mating_material() {
        let pos = position("4k3/8/8/8/8/8/8/Q3K3 w - -");
        assert!(player_has_sufficient_material(&pos, Color::White));
        assert!(!player_has_sufficient_material(&pos, Color::Black));
    }
}
