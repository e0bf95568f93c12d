//! Crate root module declarations for the Plum chess rules engine.
//!
//! This file exposes the position model, the legality engine, the game
//! state machine, notation codecs and rule variants so hosts and tests can
//! import stable module paths.

pub mod chess_errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_status;
    pub mod position;
    pub mod square;
    pub mod zobrist;
}

pub mod moves {
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod sliding_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
    pub mod pseudolegal_moves;
    pub mod terminal;
}

pub mod game {
    pub mod clock;
    pub mod config;
    #[allow(clippy::module_inception)]
    pub mod game;
    pub mod game_pgn;
}

pub mod variants {
    pub mod check_counter;
    pub mod reserve_drop;
    pub mod rules_extension;
}

pub mod tables {
    pub mod opening_book;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod pgn;
    pub mod render_game_state;
    pub mod standard_algebraic;
}

pub use tables::opening_book as openings;

pub use chess_errors::{ChessError, ChessResult};
pub use game::clock::CountdownClock;
pub use game::config::{GameConfig, PgnExportOptions};
pub use game::game::{Game, MoveMetadata, MoveType};
pub use game_state::chess_types::{Color, Piece, PieceKind, Side};
pub use game_state::game_status::{GameStatus, StatusReason};
pub use game_state::position::Position;
pub use game_state::square::Square;
pub use tables::opening_book::{Opening, OpeningLookup, OpeningTable};
pub use variants::check_counter::CheckCounter;
pub use variants::reserve_drop::ReserveDrop;
pub use variants::rules_extension::{ExtraMove, RulesExtension, StandardRules};
