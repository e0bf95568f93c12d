//! Per-player countdown clock.
//!
//! Tracks one player's remaining time under a PGN `TimeControl` such as
//! `"300"` (base seconds) or `"300+2"` (base plus increment per move). The
//! game records the elapsed time of every move; the clock keeps the remaining
//! time after each move keyed by move-number token (`"12."`, `"12..."`).

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Color;
use crate::utils::pgn::read_pgn;

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownClock {
    base_seconds: f64,
    increment_seconds: f64,
    remaining: f64,
    history: Vec<(String, f64)>,
}

impl CountdownClock {
    /// Parse a PGN `TimeControl` value.
    pub fn new(time_control: &str) -> ChessResult<Self> {
        let unreadable = || ChessError::Clock(format!("Could not read time control '{time_control}'."));
        let (base, increment) = match time_control.trim().split_once('+') {
            Some((base, increment)) => (base, increment),
            None => (time_control.trim(), "0"),
        };
        let base_seconds: f64 = base.parse().map_err(|_| unreadable())?;
        let increment_seconds: f64 = increment.parse().map_err(|_| unreadable())?;
        if !base_seconds.is_finite()
            || !increment_seconds.is_finite()
            || base_seconds <= 0.0
            || increment_seconds < 0.0
        {
            return Err(unreadable());
        }

        Ok(Self {
            base_seconds,
            increment_seconds,
            remaining: base_seconds,
            history: Vec::new(),
        })
    }

    /// Rebuild `color`'s clock from a PGN with a `TimeControl` header and
    /// `[%clk ...]` move annotations.
    pub fn from_pgn(pgn: &str, color: Color) -> ChessResult<Self> {
        let document = read_pgn(pgn)?;
        let time_control = document
            .header("TimeControl")
            .ok_or_else(|| ChessError::Clock("PGN has no TimeControl header.".to_string()))?;
        let mut clock = Self::new(time_control)?;

        for (key, annotation) in &document.annotations {
            let is_black_key = key.ends_with("...");
            if is_black_key != (color == Color::Black) {
                continue;
            }
            if let Some(seconds) = parse_clk_annotation(annotation) {
                clock.history.push((key.clone(), seconds));
                clock.remaining = seconds;
            }
        }

        Ok(clock)
    }

    /// Subtract the time a move took and add the increment. The increment is
    /// not granted once the flag has fallen.
    pub fn record(&mut self, move_number: &str, seconds_elapsed: f64) -> f64 {
        self.remaining -= seconds_elapsed;
        if self.remaining > 0.0 {
            self.remaining += self.increment_seconds;
        }
        self.history.push((move_number.to_string(), self.remaining));
        self.remaining
    }

    /// Remaining seconds after each recorded move.
    pub fn seconds_remaining_history(&self) -> &[(String, f64)] {
        &self.history
    }

    pub fn seconds_remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_out_of_time(&self) -> bool {
        self.remaining <= 0.0
    }

    /// The `TimeControl` string this clock was built from.
    pub fn time_control(&self) -> String {
        if self.increment_seconds > 0.0 {
            format!("{}+{}", self.base_seconds, self.increment_seconds)
        } else {
            format!("{}", self.base_seconds)
        }
    }

    /// `[%clk H:MM:SS]`, rounding down and never negative.
    pub fn format_annotation(seconds: f64) -> String {
        let total = seconds.max(0.0).floor() as u64;
        format!(
            "[%clk {}:{:02}:{:02}]",
            total / 3600,
            (total / 60) % 60,
            total % 60
        )
    }
}

/// Seconds in a `[%clk H:MM:SS]` annotation, if it has one.
pub fn parse_clk_annotation(annotation: &str) -> Option<f64> {
    let start = annotation.find("[%clk ")? + "[%clk ".len();
    let end = start + annotation[start..].find(']')?;
    let mut seconds = 0.0;
    for part in annotation[start..end].trim().split(':') {
        let value: f64 = part.parse().ok()?;
        seconds = seconds * 60.0 + value;
    }
    Some(seconds)
}
