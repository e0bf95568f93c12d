//! FEN-to-Position parser.
//!
//! Reads the four position fields of a Forsyth-Edwards Notation string
//! (placement, side to move, castling, en-passant target) into a `Position`.
//! The halfmove clock and fullmove number belong to the game layer and are
//! returned separately by [`parse_fen`].
//!
//! Castling accepts `KQkq`, X-FEN/Shredder file letters (`HAha`) and `-`.

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Color, Piece, PieceKind, Side};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::utils::algebraic::{algebraic_to_square, file_from_char};

/// A position together with the FEN move counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenRecord {
    pub position: Position,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// Parse a full six-field FEN. Missing counters default to `0 1`.
pub fn parse_fen(fen: &str) -> ChessResult<FenRecord> {
    let position = parse_bare_fen(fen)?;
    let mut counters = fen.split_whitespace().skip(4);

    let halfmove_clock = match counters.next() {
        Some(field) => field
            .parse::<u32>()
            .map_err(|_| ChessError::parse("FEN halfmove clock", field))?,
        None => 0,
    };
    let fullmove_number = match counters.next() {
        Some(field) => field
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ChessError::parse("FEN fullmove number", field))?,
        None => 1,
    };

    if let Some(extra) = counters.next() {
        return Err(ChessError::parse("FEN trailing field", extra));
    }

    Ok(FenRecord {
        position,
        halfmove_clock,
        fullmove_number,
    })
}

/// Parse the first four FEN fields. Anything after them is ignored.
pub fn parse_bare_fen(fen: &str) -> ChessResult<Position> {
    let mut parts = fen.split_whitespace();

    let board_part = parts
        .next()
        .ok_or_else(|| ChessError::parse("FEN", fen))?;
    let side_part = parts
        .next()
        .ok_or_else(|| ChessError::parse("FEN side to move", fen))?;
    let castling_part = parts
        .next()
        .ok_or_else(|| ChessError::parse("FEN castling rights", fen))?;
    let en_passant_part = parts
        .next()
        .ok_or_else(|| ChessError::parse("FEN en-passant square", fen))?;

    let mut position = Position::empty();
    parse_board(board_part, &mut position)?;
    position.turn = parse_side_to_move(side_part)?;
    position.set_double_advanced_pawn(parse_en_passant_square(en_passant_part)?);

    position.set_initial_squares();
    apply_castling_rights(castling_part, &mut position)?;

    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> ChessResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::parse("FEN board", board_part));
    }

    let mut kings = [0u8; 2];
    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - fen_rank_idx as u8;
        let mut file = 0u32;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                file += empty_count;
                if empty_count == 0 || file > 8 {
                    return Err(ChessError::parse("FEN rank", *rank_str));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| ChessError::parse("FEN piece", ch.to_string()))?;
            let square = u8::try_from(file)
                .ok()
                .and_then(|file| Square::new(file, rank))
                .ok_or_else(|| ChessError::parse("FEN rank", *rank_str))?;

            if piece.kind == PieceKind::King {
                kings[piece.color.index()] += 1;
                if kings[piece.color.index()] > 1 {
                    return Err(ChessError::parse("FEN board (two kings)", board_part));
                }
            }
            position.place(square, Some(with_inferred_has_moved(piece, square)));
            file += 1;
        }

        if file != 8 {
            return Err(ChessError::parse("FEN rank", *rank_str));
        }
    }

    Ok(())
}

/// Pawns off their starting rank have necessarily moved.
fn with_inferred_has_moved(mut piece: Piece, square: Square) -> Piece {
    if piece.kind == PieceKind::Pawn && square.rank() != piece.color.pawn_rank() {
        piece.has_moved = true;
    }
    piece
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(ChessError::parse("FEN side to move", side_part)),
    }
}

/// The FEN field names the square behind the pawn; the position stores the
/// pawn itself.
fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let target = algebraic_to_square(en_passant_part)?;
    let pawn_rank = match target.rank() {
        2 => 3,
        5 => 4,
        _ => return Err(ChessError::parse("FEN en-passant square", en_passant_part)),
    };
    Ok(Square::new(target.file(), pawn_rank))
}

fn apply_castling_rights(castling_part: &str, position: &mut Position) -> ChessResult<()> {
    let mut granted = [[false; 2]; 2];

    if castling_part != "-" {
        for ch in castling_part.chars() {
            let color = if ch.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            match ch.to_ascii_lowercase() {
                'k' => granted[color.index()][Side::Kingside.index()] = true,
                'q' => granted[color.index()][Side::Queenside.index()] = true,
                letter => {
                    let file = file_from_char(letter)
                        .ok_or_else(|| ChessError::parse("FEN castling rights", castling_part))?;
                    let side = shredder_side(position, color, file)
                        .ok_or_else(|| ChessError::parse("FEN castling rights", castling_part))?;
                    position.set_initial_rook_square(
                        color,
                        side,
                        Square::new(file, color.back_rank()),
                    );
                    granted[color.index()][side.index()] = true;
                }
            }
        }
    }

    for color in Color::ALL {
        let [kingside, queenside] = granted[color.index()];
        if !kingside && !queenside {
            position.mark_king_moved(color);
        }
        for side in Side::ALL {
            if !granted[color.index()][side.index()] {
                position.mark_rook_moved(color, side);
            }
        }
    }

    Ok(())
}

/// Castling side of a rook file letter, relative to the king on its home rank.
fn shredder_side(position: &Position, color: Color, file: u8) -> Option<Side> {
    let king = position
        .king_square(color)
        .filter(|sq| sq.rank() == color.back_rank())?;
    let rook_square = Square::new(file, color.back_rank())?;
    if !position
        .get(rook_square)
        .is_some_and(|piece| piece.is(PieceKind::Rook, color))
    {
        return None;
    }
    match file.cmp(&king.file()) {
        std::cmp::Ordering::Greater => Some(Side::Kingside),
        std::cmp::Ordering::Less => Some(Side::Queenside),
        std::cmp::Ordering::Equal => None,
    }
}
