//! Standard algebraic notation (SAN) reader.
//!
//! Grammar accepted:
//! - castling: `O-O`, `O-O-O` (zeros also accepted);
//! - otherwise `[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](=?[QRBN])?`.
//!
//! Either form may carry a trailing `+`/`#` and `!`/`?` glyphs. Check
//! suffixes are dropped (the game recomputes them); glyphs are returned so
//! the caller can keep them in the move history.

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{PieceKind, Side};
use crate::game_state::square::Square;
use crate::utils::algebraic::{file_from_char, rank_from_char};

/// A parsed algebraic move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanToken {
    Castle { side: Side, glyphs: String },
    Move(SanMove),
}

/// A non-castling algebraic move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanMove {
    pub kind: PieceKind,
    pub from_file: Option<u8>,
    pub from_rank: Option<u8>,
    pub capture: bool,
    pub destination: Square,
    pub promotion: Option<PieceKind>,
    pub glyphs: String,
}

impl SanMove {
    pub fn has_disambiguator(&self) -> bool {
        self.from_file.is_some() || self.from_rank.is_some()
    }

    /// Whether `square` agrees with the file/rank disambiguator, if any.
    pub fn matches_source(&self, square: Square) -> bool {
        self.from_file.map_or(true, |file| file == square.file())
            && self.from_rank.map_or(true, |rank| rank == square.rank())
    }
}

/// Split trailing `+`, `#`, `!`, `?` off a move; returns `(body, glyphs)`.
pub fn split_suffixes(notation: &str) -> (&str, String) {
    let body = notation.trim_end_matches(['+', '#', '!', '?']);
    let glyphs = notation[body.len()..]
        .chars()
        .filter(|ch| matches!(ch, '!' | '?'))
        .collect();
    (body, glyphs)
}

/// SAN with check marks and glyphs removed, as used for opening lookups.
pub fn strip_annotations(notation: &str) -> &str {
    split_suffixes(notation).0
}

/// Parse one algebraic move.
pub fn parse_san(notation: &str) -> ChessResult<SanToken> {
    let unreadable = || ChessError::illegal(format!("Could not read notation '{notation}'."));
    let (body, glyphs) = split_suffixes(notation.trim());

    match body {
        "O-O" | "0-0" => {
            return Ok(SanToken::Castle {
                side: Side::Kingside,
                glyphs,
            })
        }
        "O-O-O" | "0-0-0" => {
            return Ok(SanToken::Castle {
                side: Side::Queenside,
                glyphs,
            })
        }
        _ => {}
    }

    let chars: Vec<char> = body.chars().collect();
    let mut start = 0usize;
    let mut end = chars.len();

    let kind = match chars.first() {
        Some(ch @ ('K' | 'Q' | 'R' | 'B' | 'N')) => {
            start = 1;
            PieceKind::from_letter(*ch).ok_or_else(unreadable)?
        }
        _ => PieceKind::Pawn,
    };

    let mut promotion = None;
    if end > start {
        if let Some(kind) = chars
            .get(end - 1)
            .and_then(|ch| match ch {
                'Q' | 'R' | 'B' | 'N' => PieceKind::from_letter(*ch),
                _ => None,
            })
        {
            promotion = Some(kind);
            end -= 1;
            if end > start && chars[end - 1] == '=' {
                end -= 1;
            }
        }
    }
    if promotion.is_some() && kind != PieceKind::Pawn {
        return Err(unreadable());
    }

    if end < start + 2 {
        return Err(unreadable());
    }
    let destination = match (file_from_char(chars[end - 2]), rank_from_char(chars[end - 1])) {
        (Some(file), Some(rank)) => Square::new(file, rank).ok_or_else(unreadable)?,
        _ => return Err(unreadable()),
    };
    end -= 2;

    let capture = end > start && chars[end - 1] == 'x';
    if capture {
        end -= 1;
    }

    let mut from_file = None;
    let mut from_rank = None;
    for ch in &chars[start..end] {
        if let (Some(file), None, None) = (file_from_char(*ch), from_file, from_rank) {
            from_file = Some(file);
        } else if let (Some(rank), None) = (rank_from_char(*ch), from_rank) {
            from_rank = Some(rank);
        } else {
            return Err(unreadable());
        }
    }

    Ok(SanToken::Move(SanMove {
        kind,
        from_file,
        from_rank,
        capture,
        destination,
        promotion,
        glyphs,
    }))
}

/// Piece prefix written in SAN (empty for pawns).
pub fn piece_prefix(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::Pawn => "",
        PieceKind::Knight => "N",
        PieceKind::Bishop => "B",
        PieceKind::Rook => "R",
        PieceKind::Queen => "Q",
        PieceKind::King => "K",
    }
}
