//! Game state machine.
//!
//! A `Game` owns one `Position` plus everything a position alone does not
//! know: the move history in SAN, move annotations and PGN header fields, the
//! halfmove clock, the repetition history, optional countdown clocks, a
//! pending pawn promotion and the cached terminal status. Variants plug in
//! through the boxed `RulesExtension`.
//!
//! Every move entry point validates first and mutates after, so a rejected
//! move leaves the game untouched.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use crate::chess_errors::{ChessError, ChessResult};
use crate::game::clock::CountdownClock;
use crate::game::config::GameConfig;
use crate::game_state::chess_rules::{
    castling_side_for_king_destination, FIFTY_MOVE_HALFMOVES, FIVEFOLD_MIN_HALFMOVES,
    FIVEFOLD_REPETITION, SEVENTY_FIVE_MOVE_HALFMOVES, THREEFOLD_REPETITION,
};
use crate::game_state::chess_types::{Color, Piece, PieceKind, Side, PROMOTION_KINDS};
use crate::game_state::game_status::{GameStatus, StatusReason};
use crate::game_state::position::Position;
use crate::game_state::square::Square;
use crate::game_state::zobrist::position_hash;
use crate::move_generation::legal_move_apply::{self, castle, en_passant};
use crate::move_generation::legal_move_checks::king_is_in_check;
use crate::move_generation::legal_move_generator::{
    can_castle, can_en_passant, can_move_piece, is_en_passant_shape,
};
use crate::move_generation::terminal::{
    is_checkmate, is_checkmated, is_draw_by_insufficient_material, is_stalemate,
    player_has_sufficient_material,
};
use crate::moves::knight_moves::knight_squares;
use crate::moves::pawn_moves::pawn_capture_squares;
use crate::moves::sliding_moves::{directions_for, ray};
use crate::tables::opening_book::{self, Opening};
use crate::utils::fen_generator::{generate_bare_fen, generate_fen};
use crate::utils::fen_parser::{parse_bare_fen, parse_fen};
use crate::utils::pgn::read_pgn;
use crate::utils::standard_algebraic::{parse_san, piece_prefix, split_suffixes, SanMove, SanToken};
use crate::variants::rules_extension::{RulesExtension, StandardRules};

/// How a move was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveType {
    Normal,
    Castle(Side),
    EnPassant,
    /// A move supplied by the rules extension, such as a reserve drop.
    Drop,
}

/// Description of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveMetadata {
    pub move_type: MoveType,
    pub capture: bool,
    pub captured_kind: Option<PieceKind>,
    pub captured_promoted: bool,
    /// Promotion piece, when the promotion was part of this move.
    pub promotion: Option<PieceKind>,
}

impl MoveMetadata {
    fn quiet(move_type: MoveType) -> Self {
        Self {
            move_type,
            capture: false,
            captured_kind: None,
            captured_promoted: false,
            promotion: None,
        }
    }

    fn with_capture(mut self, captured: Option<Piece>) -> Self {
        if let Some(piece) = captured {
            self.capture = true;
            self.captured_kind = Some(piece.kind);
            self.captured_promoted = piece.promoted;
        }
        self
    }
}

/// What a completed move does to the halfmove clock and repetition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryReset {
    Keep,
    Hashes,
    ClockAndHashes,
}

/// A pawn that reached the last rank and waits for `promote_pawn`.
#[derive(Debug, Clone, PartialEq)]
struct PendingPromotion {
    square: Square,
    glyphs: String,
    seconds_elapsed: Option<f64>,
}

/// A chess game.
#[derive(Debug)]
pub struct Game {
    pub(crate) position: Position,
    pub(crate) moves: Vec<String>,
    pub(crate) annotations: HashMap<String, String>,
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) halfmove_clock: u32,
    hashes: HashMap<u64, u32>,
    pub(crate) status: GameStatus,
    pub(crate) clocks: Option<[CountdownClock; 2]>,
    pending_promotion: Option<PendingPromotion>,
    pub(crate) moves_before_import: u32,
    // Black moved first (the game was set up with black to move).
    pub(crate) black_moved_first: bool,
    pub(crate) initial_fen: Option<String>,
    pub(crate) config: GameConfig,
    rules: Box<dyn RulesExtension>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::with_position(Position::standard())
    }

    /// A game on an empty board.
    pub fn empty() -> Self {
        Self::with_position(Position::empty())
    }

    /// A game from an arbitrary position. A non-standard position is
    /// remembered as the initial FEN for PGN export.
    pub fn with_position(position: Position) -> Self {
        let initial_fen = (position != Position::standard()).then(|| generate_fen(&position, 0, 1));
        Self::from_parts(position, 0, 1, initial_fen)
    }

    /// A Chess960 game with a random back rank.
    pub fn fischer_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_position(Position::fischer_random(rng))
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let record = parse_fen(fen)?;
        Ok(Self::from_parts(
            record.position,
            record.halfmove_clock,
            record.fullmove_number,
            Some(fen.trim().to_string()),
        ))
    }

    /// Import an EPD record. `hmvc` and `fmvn` opcodes set the move counters;
    /// other opcodes are ignored.
    pub fn from_epd(epd: &str) -> ChessResult<Self> {
        let position = parse_bare_fen(epd)?;
        let mut halfmove_clock = 0;
        let mut fullmove_number = 1;

        let operations: Vec<&str> = epd.split_whitespace().skip(4).collect();
        for operation in operations.join(" ").split(';') {
            let Some((opcode, operand)) = operation.trim().split_once(' ') else {
                continue;
            };
            let operand = operand.trim();
            match opcode {
                "hmvc" => {
                    halfmove_clock = operand
                        .parse()
                        .map_err(|_| ChessError::parse("EPD hmvc", operand))?;
                }
                "fmvn" => {
                    fullmove_number = operand
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ChessError::parse("EPD fmvn", operand))?;
                }
                _ => {}
            }
        }

        let mut game = Self::from_parts(position, halfmove_clock, fullmove_number, None);
        game.initial_fen = Some(game.fen());
        Ok(game)
    }

    fn from_parts(
        position: Position,
        halfmove_clock: u32,
        fullmove_number: u32,
        initial_fen: Option<String>,
    ) -> Self {
        let black_moved_first = position.turn == Color::Black;
        let mut game = Self {
            position,
            moves: Vec::new(),
            annotations: HashMap::new(),
            fields: Vec::new(),
            halfmove_clock,
            hashes: HashMap::new(),
            status: GameStatus::in_progress(),
            clocks: None,
            pending_promotion: None,
            moves_before_import: fullmove_number.saturating_sub(1),
            black_moved_first,
            initial_fen,
            config: GameConfig::default(),
            rules: Box::new(StandardRules),
        };
        game.record_position();
        game
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Play under a rule variant.
    pub fn with_rules(mut self, rules: impl RulesExtension + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    /// Give both players a countdown clock. Every move must then carry its
    /// elapsed time.
    pub fn with_time_control(mut self, time_control: &str) -> ChessResult<Self> {
        self.clocks = Some([
            CountdownClock::new(time_control)?,
            CountdownClock::new(time_control)?,
        ]);
        if self.field("TimeControl").is_none() {
            self.set_field("TimeControl", time_control);
        }
        Ok(self)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rules(&self) -> &dyn RulesExtension {
        self.rules.as_ref()
    }

    pub fn turn(&self) -> Color {
        self.position.turn
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Moves played so far, in SAN.
    pub fn history(&self) -> &[String] {
        &self.moves
    }

    pub fn initial_fen(&self) -> Option<&str> {
        self.initial_fen.as_deref()
    }

    /// Square of a pawn waiting for `promote_pawn`.
    pub fn must_promote_pawn(&self) -> Option<Square> {
        self.pending_promotion.as_ref().map(|pending| pending.square)
    }

    pub fn clock(&self, color: Color) -> Option<&CountdownClock> {
        self.clocks.as_ref().map(|clocks| &clocks[color.index()])
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// PGN header fields in insertion order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    /// Attach a comment to a move, keyed `"12."` (white) or `"12..."` (black).
    pub fn annotate(&mut self, move_number: &str, annotation: &str) {
        self.annotations
            .insert(move_number.to_string(), annotation.to_string());
    }

    pub fn annotation(&self, move_number: &str) -> Option<&str> {
        self.annotations.get(move_number).map(String::as_str)
    }

    /// Current move number as in FEN.
    pub fn fullmove_number(&self) -> u32 {
        let plies = self.moves.len() as u32 + u32::from(self.black_moved_first);
        self.moves_before_import + plies / 2 + 1
    }

    /// Move number in PGN form: `"12."` with white to move, `"12..."` with black.
    pub fn move_number(&self) -> String {
        match self.position.turn {
            Color::White => format!("{}.", self.fullmove_number()),
            Color::Black => format!("{}...", self.fullmove_number()),
        }
    }

    /// Full FEN of the current position.
    pub fn fen(&self) -> String {
        generate_fen(&self.position, self.halfmove_clock, self.fullmove_number())
    }

    /// Bare EPD of the current position, without opcodes.
    pub fn epd(&self) -> String {
        self.export_epd(&[], false, false)
    }

    /// EPD with optional `hmvc`/`fmvn` opcodes and extra `opcode value;` pairs.
    pub fn export_epd(
        &self,
        operations: &[(&str, &str)],
        include_hmvc: bool,
        include_fmvn: bool,
    ) -> String {
        let mut epd = generate_bare_fen(&self.position);
        if include_hmvc {
            epd.push_str(&format!(" hmvc {};", self.halfmove_clock));
        }
        if include_fmvn {
            epd.push_str(&format!(" fmvn {};", self.fullmove_number()));
        }
        for (opcode, operand) in operations {
            epd.push_str(&format!(" {opcode} {operand};"));
        }
        epd
    }

    /// Opening of the moves so far, from the installed opening table.
    pub fn opening(&self) -> Option<Opening> {
        opening_book::installed()?.lookup(&self.moves)
    }

    /// Play one move in algebraic notation.
    pub fn make_move(&mut self, notation: &str) -> ChessResult<MoveMetadata> {
        self.play_notation(notation, None)
    }

    /// Play one move in a time-controlled game.
    pub fn make_timed_move(&mut self, notation: &str, seconds_elapsed: f64) -> ChessResult<MoveMetadata> {
        self.play_notation(notation, Some(seconds_elapsed))
    }

    /// Play a run of moves such as `"1. e4 e5 2. Nf3 {main line} Nc6"`. Move
    /// numbers, results, glyphs and comments are skipped. Stops at the
    /// first rejected move.
    pub fn make_moves(&mut self, movetext: &str) -> ChessResult<()> {
        for notation in read_pgn(movetext)?.moves {
            self.make_move(&notation)?;
        }
        Ok(())
    }

    /// Move the piece on `from` to `to`. A king moving onto its castling
    /// square castles, and a pawn moving diagonally onto an empty square
    /// captures en passant. A pawn reaching the last rank leaves the
    /// promotion pending until [`Game::promote_pawn`].
    pub fn move_piece(&mut self, from: Square, to: Square) -> ChessResult<MoveMetadata> {
        self.play_coordinates(from, to, None)
    }

    pub fn move_piece_timed(
        &mut self,
        from: Square,
        to: Square,
        seconds_elapsed: f64,
    ) -> ChessResult<MoveMetadata> {
        self.play_coordinates(from, to, Some(seconds_elapsed))
    }

    /// Replace the pending pawn with `kind` and complete the move.
    pub fn promote_pawn(&mut self, square: Square, kind: PieceKind) -> ChessResult<()> {
        if self.must_promote_pawn() != Some(square) {
            return Err(ChessError::illegal(format!(
                "Cannot promote pawn at square '{square}'."
            )));
        }
        if !PROMOTION_KINDS.contains(&kind) {
            return Err(ChessError::illegal(format!(
                "Cannot promote pawn to {}.",
                kind.name()
            )));
        }
        let Some(pending) = self.pending_promotion.take() else {
            return Err(ChessError::illegal(format!(
                "Cannot promote pawn at square '{square}'."
            )));
        };

        let color = self.position.turn;
        let mut piece = Piece::new(kind, color);
        piece.promoted = true;
        piece.has_moved = true;
        self.position.place(square, Some(piece));
        self.position.set_double_advanced_pawn(None);

        let body = format!(
            "{}={}",
            self.moves.pop().unwrap_or_default(),
            kind.letter()
        );
        self.complete_move(
            body,
            &pending.glyphs,
            HistoryReset::ClockAndHashes,
            pending.seconds_elapsed,
        );
        Ok(())
    }

    fn play_notation(&mut self, notation: &str, seconds_elapsed: Option<f64>) -> ChessResult<MoveMetadata> {
        self.check_can_move(seconds_elapsed)?;

        if let Some(extra) = self.rules.try_extra_move(notation, &mut self.position) {
            let extra = extra?;
            let (_, glyphs) = split_suffixes(notation.trim());
            let reset = if extra.resets_halfmove_clock {
                HistoryReset::ClockAndHashes
            } else {
                HistoryReset::Keep
            };
            self.complete_move(extra.notation, &glyphs, reset, seconds_elapsed);
            return Ok(MoveMetadata::quiet(MoveType::Drop));
        }

        match parse_san(notation)? {
            SanToken::Castle { side, glyphs } => {
                let color = self.position.turn;
                can_castle(&mut self.position, color, side).map_err(ChessError::Move)?;
                self.play_castle(side, &glyphs, seconds_elapsed)
            }
            SanToken::Move(san) => self.play_san(&san, notation, seconds_elapsed),
        }
    }

    fn play_san(
        &mut self,
        san: &SanMove,
        notation: &str,
        seconds_elapsed: Option<f64>,
    ) -> ChessResult<MoveMetadata> {
        let color = self.position.turn;
        let to = san.destination;
        let from = self.resolve_source(san, notation)?;

        let occupied = self.position.get(to).is_some();
        if san.kind == PieceKind::Pawn && san.capture && !occupied {
            can_en_passant(&mut self.position, from).map_err(ChessError::Move)?;
            return self.play_en_passant(from, to, &san.glyphs, seconds_elapsed);
        }
        if san.capture && !occupied {
            return Err(ChessError::illegal(format!("No piece to capture at square '{to}'.")));
        }
        if !san.capture && occupied {
            return Err(ChessError::illegal(format!(
                "Capture at square '{to}' must be written with 'x'."
            )));
        }

        let reaches_last_rank = san.kind == PieceKind::Pawn && to.rank() == color.promotion_rank();
        match (san.promotion, reaches_last_rank) {
            (None, true) => {
                return Err(ChessError::illegal("Must promote pawn upon move to final rank."))
            }
            (Some(_), false) => {
                return Err(ChessError::illegal(format!(
                    "Cannot promote pawn at square '{to}'."
                )))
            }
            _ => {}
        }

        can_move_piece(&mut self.position, from, to, false).map_err(ChessError::Move)?;
        self.play_normal(from, to, san.promotion, &san.glyphs, seconds_elapsed)
    }

    fn play_coordinates(
        &mut self,
        from: Square,
        to: Square,
        seconds_elapsed: Option<f64>,
    ) -> ChessResult<MoveMetadata> {
        self.check_can_move(seconds_elapsed)?;

        let Some(piece) = self.position.get(from) else {
            return Err(ChessError::illegal(format!("No piece at square '{from}'.")));
        };
        if piece.color != self.position.turn {
            return Err(ChessError::illegal(format!(
                "It is {}'s turn.",
                self.position.turn
            )));
        }

        if piece.kind == PieceKind::King {
            if let Some(side) = castling_side_for_king_destination(piece.color, to) {
                if can_castle(&mut self.position, piece.color, side).is_ok() {
                    return self.play_castle(side, "", seconds_elapsed);
                }
            }
        }

        if is_en_passant_shape(&self.position, piece, from, to) {
            can_en_passant(&mut self.position, from).map_err(ChessError::Move)?;
            return self.play_en_passant(from, to, "", seconds_elapsed);
        }

        can_move_piece(&mut self.position, from, to, false).map_err(ChessError::Move)?;
        self.play_normal(from, to, None, "", seconds_elapsed)
    }

    fn check_can_move(&mut self, seconds_elapsed: Option<f64>) -> ChessResult<()> {
        if self.config.block_if_game_over && self.status().game_over {
            return Err(ChessError::GameOver);
        }
        if self.clocks.is_some() && seconds_elapsed.is_none() {
            return Err(ChessError::Clock(
                "Expected elapsed seconds for a timed game.".to_string(),
            ));
        }
        if let Some(pending) = &self.pending_promotion {
            return Err(ChessError::illegal(format!(
                "Must promote pawn at square '{}' before next move.",
                pending.square
            )));
        }
        Ok(())
    }

    /// Square of the piece a SAN move refers to.
    fn resolve_source(&mut self, san: &SanMove, notation: &str) -> ChessResult<Square> {
        let color = self.position.turn;
        let to = san.destination;
        let is_own = |position: &Position, square: Square| {
            position
                .get(square)
                .is_some_and(|piece| piece.is(san.kind, color))
                && san.matches_source(square)
        };

        let candidates: Vec<Square> = match san.kind {
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => directions_for(san.kind)
                .iter()
                .filter_map(|direction| {
                    ray(to, *direction).find(|square| self.position.get(*square).is_some())
                })
                .filter(|square| is_own(&self.position, *square))
                .collect(),
            PieceKind::Knight => knight_squares(to)
                .filter(|square| is_own(&self.position, *square))
                .collect(),
            PieceKind::King => self.position.king_square(color).into_iter().collect(),
            PieceKind::Pawn if san.capture && self.position.get(to).is_none() => san
                .from_file
                .and_then(|file| Square::new(file, to.rank()))
                .and_then(|square| square.step_forward(color, -1))
                .filter(|square| is_own(&self.position, *square))
                .into_iter()
                .collect(),
            PieceKind::Pawn if self.position.get(to).is_none() => [1, 2]
                .into_iter()
                .filter_map(|steps| to.step_forward(color, -steps))
                .find(|square| self.position.get(*square).is_some())
                .filter(|square| is_own(&self.position, *square))
                .into_iter()
                .collect(),
            PieceKind::Pawn => pawn_capture_squares(color.opposite(), to)
                .filter(|square| is_own(&self.position, *square))
                .collect(),
        };

        match candidates.as_slice() {
            [] => Err(ChessError::illegal(format!("'{notation}' is not allowed."))),
            [only] => Ok(*only),
            _ => {
                let legal: Vec<Square> = candidates
                    .iter()
                    .copied()
                    .filter(|from| can_move_piece(&mut self.position, *from, to, false).is_ok())
                    .collect();
                match legal.as_slice() {
                    [] => Err(ChessError::illegal(format!("'{notation}' is not allowed."))),
                    [only] => Ok(*only),
                    _ => {
                        let names: Vec<String> = legal.iter().map(Square::to_string).collect();
                        Err(ChessError::illegal(format!(
                            "Must disambiguate moving pieces: [{}]",
                            names.join(", ")
                        )))
                    }
                }
            }
        }
    }

    /// Source file, rank or square needed to tell `from` apart from other
    /// pieces of the same kind that can legally reach `to`.
    fn write_disambiguator(&mut self, piece: Piece, from: Square, to: Square) -> String {
        let same_piece = |position: &Position, square: Square| {
            square != from
                && position
                    .get(square)
                    .is_some_and(|other| other.is(piece.kind, piece.color))
        };

        let rivals: Vec<Square> = match piece.kind {
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => directions_for(piece.kind)
                .iter()
                .filter_map(|direction| {
                    ray(to, *direction).find(|square| self.position.get(*square).is_some())
                })
                .filter(|square| same_piece(&self.position, *square))
                .collect(),
            PieceKind::Knight => knight_squares(to)
                .filter(|square| same_piece(&self.position, *square))
                .collect(),
            PieceKind::Pawn | PieceKind::King => Vec::new(),
        };
        let rivals: Vec<Square> = rivals
            .into_iter()
            .filter(|square| can_move_piece(&mut self.position, *square, to, true).is_ok())
            .collect();

        if rivals.is_empty() {
            String::new()
        } else if rivals.iter().all(|square| square.file() != from.file()) {
            from.file_char().to_string()
        } else if rivals.iter().all(|square| square.rank() != from.rank()) {
            from.rank_char().to_string()
        } else {
            from.to_string()
        }
    }

    fn play_normal(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        glyphs: &str,
        seconds_elapsed: Option<f64>,
    ) -> ChessResult<MoveMetadata> {
        let Some(piece) = self.position.get(from) else {
            return Err(ChessError::illegal(format!("No piece at square '{from}'.")));
        };
        let captured = self.position.get(to);

        let mut notation = piece_prefix(piece.kind).to_string();
        notation.push_str(&self.write_disambiguator(piece, from, to));
        if captured.is_some() {
            if piece.kind == PieceKind::Pawn {
                notation.push(from.file_char());
            }
            notation.push('x');
        }
        notation.push_str(&to.to_string());

        legal_move_apply::move_piece(&mut self.position, from, to, promotion)?;
        if let Some(victim) = captured {
            self.rules.on_capture(piece.color, victim);
        }

        let metadata = MoveMetadata {
            promotion,
            ..MoveMetadata::quiet(MoveType::Normal)
        }
        .with_capture(captured);

        if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() {
            if let Some(kind) = promotion {
                notation.push('=');
                notation.push(kind.letter());
            } else {
                debug!(square = %to, "pawn promotion pending");
                self.moves.push(notation);
                self.pending_promotion = Some(PendingPromotion {
                    square: to,
                    glyphs: glyphs.to_string(),
                    seconds_elapsed,
                });
                return Ok(metadata);
            }
        }

        let reset = if piece.kind == PieceKind::Pawn || captured.is_some() {
            HistoryReset::ClockAndHashes
        } else {
            HistoryReset::Keep
        };
        self.complete_move(notation, glyphs, reset, seconds_elapsed);
        Ok(metadata)
    }

    fn play_castle(
        &mut self,
        side: Side,
        glyphs: &str,
        seconds_elapsed: Option<f64>,
    ) -> ChessResult<MoveMetadata> {
        castle(&mut self.position, side)?;
        self.complete_move(
            side.notation().to_string(),
            glyphs,
            HistoryReset::Hashes,
            seconds_elapsed,
        );
        Ok(MoveMetadata::quiet(MoveType::Castle(side)))
    }

    fn play_en_passant(
        &mut self,
        from: Square,
        to: Square,
        glyphs: &str,
        seconds_elapsed: Option<f64>,
    ) -> ChessResult<MoveMetadata> {
        let mover = self.position.turn;
        let effect = en_passant(&mut self.position, from, to)?;
        let captured = effect.captured.map(|(_, piece)| piece);
        if let Some(victim) = captured {
            self.rules.on_capture(mover, victim);
        }

        let notation = format!("{}x{}", from.file_char(), to);
        self.complete_move(notation, glyphs, HistoryReset::ClockAndHashes, seconds_elapsed);
        Ok(MoveMetadata::quiet(MoveType::EnPassant).with_capture(captured))
    }

    /// Record the move, run the clock, pass the turn and update the
    /// repetition history.
    fn complete_move(
        &mut self,
        mut notation: String,
        glyphs: &str,
        reset: HistoryReset,
        seconds_elapsed: Option<f64>,
    ) {
        let mover = self.position.turn;
        let move_number = self.move_number();

        notation.push_str(self.check_suffix(mover.opposite()));
        notation.push_str(glyphs);

        if let Some(clocks) = self.clocks.as_mut() {
            clocks[mover.index()].record(&move_number, seconds_elapsed.unwrap_or_default());
        }

        debug!(
            notation = %notation,
            side = mover.name(),
            halfmove_clock = self.halfmove_clock,
            "move applied"
        );
        self.moves.push(notation);
        self.position.turn = mover.opposite();

        match reset {
            HistoryReset::Keep => self.halfmove_clock += 1,
            HistoryReset::Hashes => {
                self.halfmove_clock += 1;
                self.hashes.clear();
            }
            HistoryReset::ClockAndHashes => {
                self.halfmove_clock = 0;
                self.hashes.clear();
            }
        }
        self.record_position();

        if let Some(status) = self.rules.after_move(&mut self.position, mover) {
            self.finish(status);
        }
    }

    fn check_suffix(&mut self, defender: Color) -> &'static str {
        if !king_is_in_check(&self.position, defender) {
            ""
        } else if is_checkmated(&mut self.position, defender, self.rules.as_ref()) {
            "#"
        } else {
            "+"
        }
    }

    fn record_position(&mut self) {
        *self
            .hashes
            .entry(position_hash(&self.position))
            .or_insert(0) += 1;
    }

    fn most_repetitions(&self) -> u32 {
        self.hashes.values().copied().max().unwrap_or(0)
    }

    pub(crate) fn finish(&mut self, status: GameStatus) -> GameStatus {
        if status.game_over {
            info!(
                reason = status.reason_code().unwrap_or("unknown"),
                winner = status.winner.map(Color::name).unwrap_or("none"),
                "game over"
            );
        }
        self.status = status.clone();
        status
    }

    /// Current status. Once the game is over the status never changes.
    pub fn status(&mut self) -> GameStatus {
        if self.status.game_over {
            return self.status.clone();
        }
        match self.detect_terminal() {
            Some(status) => self.finish(status),
            None => GameStatus::in_progress(),
        }
    }

    fn detect_terminal(&mut self) -> Option<GameStatus> {
        if let Some(status) = is_checkmate(&mut self.position, self.rules.as_ref()) {
            return Some(status);
        }
        if let Some(status) = is_stalemate(&mut self.position, self.rules.as_ref()) {
            return Some(status);
        }
        if self.config.check_for_insufficient_material {
            if let Some(status) = is_draw_by_insufficient_material(&self.position) {
                return Some(status);
            }
        }
        if let Some(status) = self.timeout_status() {
            return Some(status);
        }
        if self.config.arbiter_draw_after_threefold_repetition
            && self.can_claim_draw_by_threefold_repetition()
        {
            return Some(GameStatus::drawn(StatusReason::ThreefoldRepetition));
        }
        if self.config.automatic_draw_after_fivefold_repetition
            && self.is_draw_by_fivefold_repetition()
        {
            return Some(GameStatus::drawn(StatusReason::FivefoldRepetition));
        }
        if self.config.arbiter_draw_after_100_halfmove_clock
            && self.can_claim_draw_by_halfmove_clock()
        {
            return Some(GameStatus::drawn(StatusReason::FiftyMoveRule));
        }
        if self.config.automatic_draw_after_150_halfmove_clock && self.is_draw_by_75_move_rule() {
            return Some(GameStatus::drawn(StatusReason::SeventyFiveMoveRule));
        }
        None
    }

    /// A flagged player loses, unless the opponent could never mate.
    fn timeout_status(&self) -> Option<GameStatus> {
        let clocks = self.clocks.as_ref()?;
        let flagged = Color::ALL
            .into_iter()
            .find(|color| clocks[color.index()].is_out_of_time())?;
        let opponent = flagged.opposite();
        if player_has_sufficient_material(&self.position, opponent) {
            Some(GameStatus::decisive(opponent, StatusReason::Timeout))
        } else {
            Some(GameStatus::drawn(StatusReason::TimeoutVsInsufficientMaterial))
        }
    }

    pub fn can_claim_draw(&self) -> bool {
        self.can_claim_draw_by_halfmove_clock() || self.can_claim_draw_by_threefold_repetition()
    }

    pub fn can_claim_draw_by_halfmove_clock(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_HALFMOVES
    }

    pub fn can_claim_draw_by_threefold_repetition(&self) -> bool {
        self.most_repetitions() >= THREEFOLD_REPETITION
    }

    /// Some position occurred five times, counted once at least ten
    /// half-moves have been played.
    pub fn is_draw_by_fivefold_repetition(&self) -> bool {
        self.moves.len() >= FIVEFOLD_MIN_HALFMOVES && self.most_repetitions() >= FIVEFOLD_REPETITION
    }

    pub fn is_draw_by_75_move_rule(&self) -> bool {
        self.halfmove_clock >= SEVENTY_FIVE_MOVE_HALFMOVES
    }

    /// `color` resigns; the opponent wins.
    pub fn resign(&mut self, color: Color) -> GameStatus {
        if self.status.game_over {
            return self.status.clone();
        }
        self.finish(GameStatus::decisive(color.opposite(), StatusReason::Resignation))
    }

    /// Draw by agreement, or by claim when one is available.
    pub fn offer_draw(&mut self) -> GameStatus {
        if self.status.game_over {
            return self.status.clone();
        }
        if self.can_claim_draw() {
            return self.claim_draw();
        }
        self.finish(GameStatus::drawn(StatusReason::Agreement))
    }

    /// Claim a 50-move or threefold-repetition draw. Without grounds the
    /// game continues and an in-progress status is returned.
    pub fn claim_draw(&mut self) -> GameStatus {
        if self.status.game_over {
            return self.status.clone();
        }
        if self.can_claim_draw_by_halfmove_clock() {
            self.finish(GameStatus::drawn(StatusReason::FiftyMoveRule))
        } else if self.can_claim_draw_by_threefold_repetition() {
            self.finish(GameStatus::drawn(StatusReason::ThreefoldRepetition))
        } else {
            GameStatus::in_progress()
        }
    }
}
