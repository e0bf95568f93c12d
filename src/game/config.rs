//! Game policy and export options.
//!
//! `GameConfig` holds the draw and game-over policy flags a `Game` consults
//! when computing its status. It serializes to JSON so hosts can keep the
//! policy in a settings file; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::chess_errors::{ChessError, ChessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// End the game at threefold repetition instead of waiting for a claim.
    pub arbiter_draw_after_threefold_repetition: bool,
    /// End the game at fivefold repetition.
    pub automatic_draw_after_fivefold_repetition: bool,
    /// End the game at 100 halfmoves instead of waiting for a claim.
    pub arbiter_draw_after_100_halfmove_clock: bool,
    /// End the game at 150 halfmoves.
    pub automatic_draw_after_150_halfmove_clock: bool,
    /// Reject moves once the game is over.
    pub block_if_game_over: bool,
    /// Run insufficient-material checks (Lichess rule set).
    pub check_for_insufficient_material: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arbiter_draw_after_threefold_repetition: false,
            automatic_draw_after_fivefold_repetition: true,
            arbiter_draw_after_100_halfmove_clock: false,
            automatic_draw_after_150_halfmove_clock: true,
            block_if_game_over: true,
            check_for_insufficient_material: true,
        }
    }
}

impl GameConfig {
    /// Read a config from JSON. Unknown keys are ignored, missing keys default.
    pub fn from_json_str(json: &str) -> ChessResult<Self> {
        serde_json::from_str(json).map_err(|err| ChessError::parse("game config", err.to_string()))
    }

    pub fn to_json_string(&self) -> ChessResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ChessError::parse("game config", err.to_string()))
    }
}

/// Options for `Game::export_pgn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnExportOptions {
    /// Wrap movetext at this column (at least 8), breaking only at spaces.
    pub wrap: Option<usize>,
    /// Emit `{...}` move annotations, including clock annotations.
    pub include_annotations: bool,
    /// Add a `[CurrentPosition "<fen>"]` header.
    pub include_current_position: bool,
    /// Add `[Opening]`/`[ECO]` from the installed opening table.
    pub include_opening: bool,
    /// Add a `[Termination]` header for finished games.
    pub include_termination: bool,
    /// Fill a missing `Date` with today's date instead of `????.??.??`.
    pub stamp_date: bool,
}

impl Default for PgnExportOptions {
    fn default() -> Self {
        Self {
            wrap: None,
            include_annotations: true,
            include_current_position: false,
            include_opening: true,
            include_termination: true,
            stamp_date: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = GameConfig::default();
        assert!(!config.arbiter_draw_after_threefold_repetition);
        assert!(config.automatic_draw_after_fivefold_repetition);
        assert!(!config.arbiter_draw_after_100_halfmove_clock);
        assert!(config.automatic_draw_after_150_halfmove_clock);
        assert!(config.block_if_game_over);
        assert!(config.check_for_insufficient_material);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = GameConfig::from_json_str(r#"{"block_if_game_over": false}"#)
            .expect("config should parse");
        assert!(!config.block_if_game_over);
        assert!(config.automatic_draw_after_fivefold_repetition);

        let round_trip = GameConfig::from_json_str(&config.to_json_string().expect("serialize"))
            .expect("round trip should parse");
        assert_eq!(round_trip, config);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GameConfig::from_json_str("{not json").expect_err("should fail");
        assert!(matches!(err, ChessError::Parse { kind: "game config", .. }));
    }
}
