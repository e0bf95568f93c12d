//! N-check: a side that has been put in check N times loses.

use tracing::debug;

use crate::game_state::chess_types::Color;
use crate::game_state::game_status::{GameStatus, StatusReason};
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::king_is_in_check;
use crate::variants::rules_extension::RulesExtension;

pub const DEFAULT_CHECK_LIMIT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCounter {
    limit: u32,
    // Times each color has been put in check.
    checks: [u32; 2],
}

impl Default for CheckCounter {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_LIMIT)
    }
}

impl CheckCounter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            checks: [0; 2],
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// How often `color` has been checked so far.
    pub fn checks_against(&self, color: Color) -> u32 {
        self.checks[color.index()]
    }

    /// Status code of a win by this rule: `three_check`, or `<n>_check`.
    pub fn status_code(&self) -> String {
        match self.limit {
            3 => "three_check".to_string(),
            n => format!("{n}_check"),
        }
    }
}

impl RulesExtension for CheckCounter {
    fn name(&self) -> &'static str {
        "check_counter"
    }

    fn after_move(&mut self, position: &mut Position, mover: Color) -> Option<GameStatus> {
        let victim = mover.opposite();
        if !king_is_in_check(position, victim) {
            return None;
        }

        self.checks[victim.index()] += 1;
        debug!(
            victim = victim.name(),
            checks = self.checks[victim.index()],
            limit = self.limit,
            "check counted"
        );
        (self.checks[victim.index()] >= self.limit)
            .then(|| GameStatus::decisive(mover, StatusReason::Variant(self.status_code())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_bare_fen;

    #[test]
    fn third_check_wins() {
        let mut rules = CheckCounter::default();
        let mut checked = parse_bare_fen("4k3/8/8/8/8/8/8/4RK2 b - -").expect("FEN should parse");
        assert!(rules.after_move(&mut checked, Color::White).is_none());
        assert!(rules.after_move(&mut checked, Color::White).is_none());
        let status = rules
            .after_move(&mut checked, Color::White)
            .expect("third check ends the game");
        assert_eq!(status.winner, Some(Color::White));
        assert_eq!(status.reason_code(), Some("three_check"));
        assert_eq!(rules.checks_against(Color::Black), 3);
    }

    #[test]
    fn quiet_moves_do_not_count() {
        let mut rules = CheckCounter::new(5);
        let mut quiet = parse_bare_fen("4k3/8/8/8/8/8/8/R4K2 b - -").expect("FEN should parse");
        assert!(rules.after_move(&mut quiet, Color::White).is_none());
        assert_eq!(rules.checks_against(Color::Black), 0);
        assert_eq!(rules.status_code(), "5_check");
    }
}
