//! Opening-name lookup with TSV import compatible with public opening datasets.
//!
//! An `OpeningTable` maps SAN move sequences to `{name, eco}` and answers with
//! the longest listed prefix of a game's moves. The table is read-only
//! reference data: the host loads it once and installs it process-wide with
//! [`install`]; games read it through [`installed`]. Nothing is loaded
//! implicitly, so tests can install a fixture table instead.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::chess_errors::{ChessError, ChessResult};
use crate::utils::standard_algebraic::strip_annotations;

/// A named opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    pub name: String,
    pub eco: String,
}

/// Anything that can name the opening of a move sequence.
pub trait OpeningLookup {
    /// Opening for the longest known prefix of `moves` (SAN, as played).
    fn lookup(&self, moves: &[String]) -> Option<Opening>;
}

#[derive(Debug, Clone, Default)]
pub struct OpeningTable {
    by_moves: HashMap<Vec<String>, Opening>,
    longest: usize,
}

impl OpeningTable {
    /// The small table bundled with the crate.
    pub fn embedded() -> ChessResult<Self> {
        Self::from_tsv_str(include_str!("data/openings_minimal.tsv"))
    }

    /// Parse a TSV with `eco`, `name` and `pgn` columns (any order, header
    /// row required). Blank lines are skipped.
    pub fn from_tsv_str(tsv: &str) -> ChessResult<Self> {
        let mut lines = tsv.lines().filter(|line| !line.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| ChessError::parse("opening table", ""))?;
        let columns: Vec<String> = header
            .split('\t')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let column = |wanted: &str| {
            columns
                .iter()
                .position(|name| name == wanted)
                .ok_or_else(|| ChessError::parse("opening table header", header))
        };
        let eco_idx = column("eco")?;
        let name_idx = column("name")?;
        let pgn_idx = column("pgn")?;

        let mut table = Self::default();
        for line in lines {
            let fields: Vec<&str> = line.split('\t').collect();
            let (Some(eco), Some(name), Some(pgn)) =
                (fields.get(eco_idx), fields.get(name_idx), fields.get(pgn_idx))
            else {
                return Err(ChessError::parse("opening table row", line));
            };

            let moves = movetext_to_sans(pgn);
            if moves.is_empty() {
                return Err(ChessError::parse("opening table row", line));
            }
            table.insert(
                moves,
                Opening {
                    name: name.trim().to_string(),
                    eco: eco.trim().to_string(),
                },
            );
        }

        Ok(table)
    }

    /// Add or replace one entry.
    pub fn insert(&mut self, moves: Vec<String>, opening: Opening) {
        self.longest = self.longest.max(moves.len());
        self.by_moves.insert(moves, opening);
    }

    pub fn len(&self) -> usize {
        self.by_moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_moves.is_empty()
    }
}

impl OpeningLookup for OpeningTable {
    fn lookup(&self, moves: &[String]) -> Option<Opening> {
        let normalized: Vec<String> = moves
            .iter()
            .map(|mv| strip_annotations(mv).to_string())
            .collect();
        let max = normalized.len().min(self.longest);
        (1..=max)
            .rev()
            .find_map(|len| self.by_moves.get(&normalized[..len]))
            .cloned()
    }
}

/// SAN tokens of a short movetext such as `1. e4 e5 2. Nf3`.
fn movetext_to_sans(movetext: &str) -> Vec<String> {
    movetext
        .split_whitespace()
        .filter_map(|token| {
            let without_number = token.trim_start_matches(|ch: char| ch.is_ascii_digit());
            let without_number = without_number.trim_start_matches('.');
            let san = strip_annotations(without_number);
            (!san.is_empty()).then(|| san.to_string())
        })
        .collect()
}

static INSTALLED: OnceLock<Box<dyn OpeningLookup + Send + Sync>> = OnceLock::new();

/// Install the process-wide opening table. Only the first call wins; later
/// calls return `false` and leave the installed table in place.
pub fn install(table: impl OpeningLookup + Send + Sync + 'static) -> bool {
    let installed = INSTALLED.set(Box::new(table)).is_ok();
    if !installed {
        tracing::warn!("opening table already installed; ignoring replacement");
    }
    installed
}

/// The installed opening table, if any.
pub fn installed() -> Option<&'static (dyn OpeningLookup + Send + Sync)> {
    INSTALLED.get().map(|table| table.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn embedded_table_parses() {
        let table = OpeningTable::embedded().expect("embedded table should parse");
        assert!(table.len() > 40);
        let opening = table
            .lookup(&moves("e4 e5 Nf3 Nc6 Bb5"))
            .expect("Ruy Lopez is listed");
        assert_eq!(opening.eco, "C60");
        assert_eq!(opening.name, "Ruy Lopez");
    }

    #[test]
    fn longest_prefix_wins_and_annotations_are_ignored() {
        let table = OpeningTable::embedded().expect("embedded table should parse");
        let opening = table
            .lookup(&moves("e4 c5 Nf3 d6 d4 cxd4 Nxd4 Nf6 Nc3 a6 Be3!?"))
            .expect("Najdorf is listed");
        assert_eq!(opening.eco, "B90");

        let sicilian = table.lookup(&moves("e4 c5 a3")).expect("Sicilian is listed");
        assert_eq!(sicilian.name, "Sicilian Defense");
        assert!(table.lookup(&moves("h4")).is_none());
        assert!(table.lookup(&[]).is_none());
    }

    #[test]
    fn fixture_tables_can_be_built_by_hand() {
        let tsv = "name\teco\tpgn\nTest Line\tZ99\t1. h4 a5 2. h5\n";
        let table = OpeningTable::from_tsv_str(tsv).expect("fixture should parse");
        let opening = table.lookup(&moves("h4 a5 h5+ a4")).expect("fixture line");
        assert_eq!(opening.eco, "Z99");
    }

    #[test]
    fn malformed_tables_are_rejected() {
        assert!(OpeningTable::from_tsv_str("").is_err());
        assert!(OpeningTable::from_tsv_str("eco\tname\nA00\tx\n").is_err());
        assert!(OpeningTable::from_tsv_str("eco\tname\tpgn\nA00\n").is_err());
    }
}
