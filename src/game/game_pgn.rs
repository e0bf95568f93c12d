//! PGN import and export for `Game`.

use std::collections::HashMap;

use crate::chess_errors::ChessResult;
use crate::game::clock::CountdownClock;
use crate::game::config::{GameConfig, PgnExportOptions};
use crate::game::game::Game;
use crate::game_state::chess_types::Color;
use crate::game_state::game_status::{GameStatus, StatusReason};
use crate::utils::pgn::{header_line, read_pgn, wrap_moves, PGN_HEADER_FIELDS, UNKNOWN_DATE};
use crate::variants::rules_extension::{RulesExtension, StandardRules};

impl Game {
    /// Replay a PGN game under standard rules and default policy.
    pub fn from_pgn(pgn: &str) -> ChessResult<Self> {
        Self::from_pgn_with(pgn, GameConfig::default(), StandardRules)
    }

    /// Replay a PGN game. A `FEN` header sets the starting position. Header
    /// fields and move annotations are kept. When the replayed moves do not
    /// end the game, the PGN result is applied: `1/2-1/2` is offered as a
    /// draw, a decisive result is taken as imported, and an open game with a
    /// `TimeControl` header gets its clocks back from the `[%clk]` comments.
    pub fn from_pgn_with(
        pgn: &str,
        config: GameConfig,
        rules: impl RulesExtension + 'static,
    ) -> ChessResult<Self> {
        let document = read_pgn(pgn)?;
        let game = match document.header("FEN") {
            Some(fen) => Game::from_fen(fen)?,
            None => Game::new(),
        };
        let mut game = game.with_config(config).with_rules(rules);

        for notation in &document.moves {
            game.make_move(notation)?;
        }
        game.fields = document.headers.clone();
        game.annotations = document.annotations.iter().cloned().collect();

        if !game.status().game_over {
            let result = document
                .result
                .as_deref()
                .or_else(|| document.header("Result"));
            match result {
                Some("1/2-1/2") => {
                    game.offer_draw();
                }
                Some("1-0") => {
                    game.finish(GameStatus::decisive(Color::White, StatusReason::Imported));
                }
                Some("0-1") => {
                    game.finish(GameStatus::decisive(Color::Black, StatusReason::Imported));
                }
                _ if document.header("TimeControl").is_some() => {
                    game.clocks = Some([
                        CountdownClock::from_pgn(pgn, Color::White)?,
                        CountdownClock::from_pgn(pgn, Color::Black)?,
                    ]);
                }
                _ => {}
            }
        }

        Ok(game)
    }

    /// PGN with default export options.
    pub fn pgn(&mut self) -> ChessResult<String> {
        self.export_pgn(&[], &PgnExportOptions::default())
    }

    /// Movetext with the result token, without annotations.
    pub fn moves(&mut self) -> String {
        let result = self.status().pgn_result();
        self.movetext(false, result)
    }

    /// Movetext with the result token, optionally annotated and wrapped.
    pub fn export_moves(&mut self, include_annotations: bool, wrap: Option<usize>) -> ChessResult<String> {
        let result = self.status().pgn_result();
        let movetext = self.movetext(include_annotations, result);
        match wrap {
            Some(width) => wrap_moves(&movetext, width),
            None => Ok(movetext),
        }
    }

    /// Export the game as PGN. `fields` override the game's own header
    /// fields for this export only.
    pub fn export_pgn(
        &mut self,
        fields: &[(&str, &str)],
        options: &PgnExportOptions,
    ) -> ChessResult<String> {
        let mut merged: Vec<(String, String)> = self.fields.clone();
        for (name, value) in fields {
            match merged.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => merged.push((name.to_string(), value.to_string())),
            }
        }
        let field = |name: &str| {
            merged
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let current = self.status();
        let status = match field("Result") {
            Some(result) if !current.game_over => imported_status(result).unwrap_or(current),
            _ => current,
        };

        let mut pgn = String::new();
        for name in PGN_HEADER_FIELDS {
            let value = match (field(name), name) {
                (Some(value), _) => value.to_string(),
                (None, "Date") if options.stamp_date => {
                    chrono::Local::now().format("%Y.%m.%d").to_string()
                }
                (None, "Date") => UNKNOWN_DATE.to_string(),
                (None, _) => "?".to_string(),
            };
            pgn.push_str(&header_line(name, &value));
        }
        pgn.push_str(&header_line("Result", status.pgn_result()));

        if let Some(initial_fen) = &self.initial_fen {
            if field("SetUp").is_none() {
                pgn.push_str(&header_line("SetUp", "1"));
            }
            if field("FEN").is_none() {
                pgn.push_str(&header_line("FEN", initial_fen));
            }
        }
        if options.include_termination && field("Termination").is_none() {
            if let Some(termination) = termination(&status, &field) {
                pgn.push_str(&header_line("Termination", &termination));
            }
        }
        if options.include_current_position {
            pgn.push_str(&header_line("CurrentPosition", &self.fen()));
        }
        if options.include_opening && field("ECO").is_none() {
            if let Some(opening) = self.opening() {
                if field("Opening").is_none() {
                    pgn.push_str(&header_line("Opening", &opening.name));
                }
                pgn.push_str(&header_line("ECO", &opening.eco));
            }
        }
        for (name, value) in &merged {
            if !PGN_HEADER_FIELDS.contains(&name.as_str()) && name != "Result" {
                pgn.push_str(&header_line(name, value));
            }
        }

        pgn.push('\n');
        let movetext = self.movetext(options.include_annotations, status.pgn_result());
        match options.wrap {
            Some(width) => pgn.push_str(&wrap_moves(&movetext, width)?),
            None => pgn.push_str(&movetext),
        }
        pgn.push('\n');
        Ok(pgn)
    }

    /// `1. e4 {comment} 1... e5 2. Nf3 *`
    fn movetext(&self, include_annotations: bool, result: &str) -> String {
        let annotations = if include_annotations {
            self.annotations_with_clocks()
        } else {
            HashMap::new()
        };

        let offset = usize::from(self.black_moved_first);
        let mut parts: Vec<String> = Vec::with_capacity(self.moves.len() * 2 + 1);
        let mut previous_annotated = false;
        for (index, notation) in self.moves.iter().enumerate() {
            let ply = index + offset;
            let number = self.moves_before_import as usize + ply / 2 + 1;
            let key = if ply % 2 == 0 {
                parts.push(format!("{number}."));
                format!("{number}.")
            } else {
                if index == 0 || previous_annotated {
                    parts.push(format!("{number}..."));
                }
                format!("{number}...")
            };
            parts.push(notation.clone());

            previous_annotated = match annotations.get(&key) {
                Some(annotation) => {
                    parts.push(format!("{{{annotation}}}"));
                    true
                }
                None => false,
            };
        }
        parts.push(result.to_string());
        parts.join(" ")
    }

    /// Move annotations with `[%clk H:MM:SS]` placed in front, replacing any
    /// clock comment already there.
    fn annotations_with_clocks(&self) -> HashMap<String, String> {
        let mut annotations = self.annotations.clone();
        let Some(clocks) = &self.clocks else {
            return annotations;
        };

        for clock in clocks {
            for (move_number, seconds) in clock.seconds_remaining_history() {
                let clk = CountdownClock::format_annotation(*seconds);
                let merged = match annotations.get(move_number) {
                    Some(existing) => {
                        let rest = strip_clk(existing);
                        if rest.is_empty() {
                            clk
                        } else {
                            format!("{clk} {rest}")
                        }
                    }
                    None => clk,
                };
                annotations.insert(move_number.clone(), merged);
            }
        }
        annotations
    }
}

/// Remove a `[%clk ...]` command from a comment.
fn strip_clk(annotation: &str) -> String {
    match annotation.find("[%clk") {
        Some(start) => {
            let end = annotation[start..]
                .find(']')
                .map_or(annotation.len(), |offset| start + offset + 1);
            format!("{}{}", &annotation[..start], &annotation[end..])
                .trim()
                .to_string()
        }
        None => annotation.trim().to_string(),
    }
}

fn imported_status(result: &str) -> Option<GameStatus> {
    match result {
        "1-0" => Some(GameStatus::decisive(Color::White, StatusReason::Imported)),
        "0-1" => Some(GameStatus::decisive(Color::Black, StatusReason::Imported)),
        "1/2-1/2" => Some(GameStatus::drawn(StatusReason::Imported)),
        _ => None,
    }
}

/// `Termination` header text, with `[WINNER]`/`[LOSER]` taken from the
/// `White`/`Black` fields when present.
fn termination<'a>(status: &GameStatus, field: &impl Fn(&str) -> Option<&'a str>) -> Option<String> {
    if !status.game_over {
        return None;
    }
    let template = status.description.as_ref()?.termination_template()?;
    let Some(winner) = status.winner else {
        return Some(template);
    };
    let name = |color: Color| {
        field(color.title())
            .filter(|value| !value.is_empty())
            .unwrap_or(color.title())
            .to_string()
    };
    Some(
        template
            .replace("[WINNER]", &name(winner))
            .replace("[LOSER]", &name(winner.opposite())),
    )
}
