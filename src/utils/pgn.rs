//! PGN text utilities for game interchange.
//!
//! Splits PGN text into ordered headers and a movetext token stream, and
//! provides the formatting helpers `Game::export_pgn` builds on. Replaying
//! the moves is left to the game layer.
//!
//! Reading skips `%` escape lines, `;` comments, `( ... )` variations and
//! `$n` NAGs. `{...}` comments are kept and keyed by the move they follow
//! (`"12."` for white, `"12..."` for black).

use tracing::warn;

use crate::chess_errors::{ChessError, ChessResult};

/// Placeholder written for an unknown `Date`.
pub const UNKNOWN_DATE: &str = "????.??.??";

/// The Seven Tag Roster minus `Result`, in export order.
pub const PGN_HEADER_FIELDS: [&str; 6] = ["Event", "Site", "Date", "Round", "White", "Black"];

/// Headers and movetext of one PGN game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnDocument {
    /// Header pairs in file order.
    pub headers: Vec<(String, String)>,
    /// SAN moves in order, glyphs removed.
    pub moves: Vec<String>,
    /// `{...}` comments keyed by move-number token.
    pub annotations: Vec<(String, String)>,
    /// Trailing result token, if present.
    pub result: Option<String>,
}

impl PgnDocument {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Split PGN text into headers and movetext.
pub fn read_pgn(pgn: &str) -> ChessResult<PgnDocument> {
    let mut document = PgnDocument::default();
    let mut movetext = String::new();

    for line in pgn.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        if trimmed.starts_with('[') {
            document.headers.push(parse_header_line(trimmed)?);
        } else {
            movetext.push_str(trimmed);
            movetext.push('\n');
        }
    }

    read_movetext(&movetext, &mut document)?;
    Ok(document)
}

/// SAN moves of a bare movetext such as `"1. e4 e5 2. Nf3 {good} Nc6 *"`.
pub fn movetext_moves(movetext: &str) -> ChessResult<Vec<String>> {
    let mut document = PgnDocument::default();
    read_movetext(movetext, &mut document)?;
    Ok(document.moves)
}

fn read_movetext(text: &str, document: &mut PgnDocument) -> ChessResult<()> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0usize;
    // Move number and side of the next move.
    let mut move_number = 1u32;
    let mut black_to_move = false;
    let mut last_move_key: Option<String> = None;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '{' => {
                let close = find_from(&chars, i + 1, '}')
                    .ok_or_else(|| ChessError::parse("PGN comment", collect(&chars[i..])))?;
                let comment = collect(&chars[i + 1..close]).trim().to_string();
                if let Some(key) = &last_move_key {
                    document.annotations.push((key.clone(), comment));
                }
                i = close + 1;
            }
            ';' => {
                i = find_from(&chars, i, '\n').map_or(chars.len(), |end| end + 1);
            }
            '(' => {
                let mut depth = 0usize;
                let start = i;
                while i < chars.len() {
                    match chars[i] {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        '{' => {
                            i = find_from(&chars, i + 1, '}').unwrap_or(chars.len());
                        }
                        _ => {}
                    }
                    i += 1;
                }
                if depth != 0 {
                    return Err(ChessError::parse("PGN variation", collect(&chars[start..])));
                }
                warn!(variation = %collect(&chars[start..=i]), "skipping PGN variation");
                i += 1;
            }
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && !"{(;".contains(chars[i]) {
                    i += 1;
                }
                let word = collect(&chars[start..i]);
                let mut rest = word.as_str();

                if let Some((number, dots, remainder)) = split_move_number(rest) {
                    move_number = number;
                    black_to_move = dots >= 3;
                    rest = remainder;
                }
                if rest.is_empty() {
                    continue;
                }

                if is_result_token(rest) {
                    document.result = Some(rest.to_string());
                } else if let Some(nag) = rest.strip_prefix('$') {
                    warn!(nag, "skipping PGN numeric annotation glyph");
                } else {
                    let san: String = rest.chars().filter(|c| !matches!(c, '!' | '?')).collect();
                    let key = if black_to_move {
                        format!("{move_number}...")
                    } else {
                        format!("{move_number}.")
                    };
                    last_move_key = Some(key);
                    document.moves.push(san);
                    if black_to_move {
                        move_number += 1;
                    }
                    black_to_move = !black_to_move;
                }
            }
        }
    }

    Ok(())
}

/// `"12."` / `"12..."` / `"12.e4"` into `(12, dot count, remainder)`.
fn split_move_number(word: &str) -> Option<(u32, usize, &str)> {
    let digits_end = word.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let after_digits = &word[digits_end..];
    let remainder = after_digits.trim_start_matches('.');
    let dots = after_digits.len() - remainder.len();
    if dots == 0 {
        return None;
    }
    let number = word[..digits_end].parse().ok()?;
    Some((number, dots, remainder))
}

fn find_from(chars: &[char], start: usize, target: char) -> Option<usize> {
    chars
        .iter()
        .skip(start)
        .position(|c| *c == target)
        .map(|offset| start + offset)
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn parse_header_line(line: &str) -> ChessResult<(String, String)> {
    if !line.starts_with('[') || !line.ends_with(']') {
        return Err(ChessError::parse("PGN header", line));
    }
    let inner = &line[1..line.len() - 1];
    let mut parts = inner.splitn(2, ' ');
    let key = parts
        .next()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ChessError::parse("PGN header", line))?;
    let value_raw = parts
        .next()
        .ok_or_else(|| ChessError::parse("PGN header", line))?
        .trim();

    if !value_raw.starts_with('"') || !value_raw.ends_with('"') || value_raw.len() < 2 {
        return Err(ChessError::parse("PGN header", line));
    }
    let value = value_raw[1..value_raw.len() - 1]
        .replace("\\\"", "\"")
        .replace("\\\\", "\\");
    Ok((key.to_owned(), value))
}

pub fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// One `[Name "value"]` line, value escaped.
pub fn header_line(name: &str, value: &str) -> String {
    format!("[{} \"{}\"]\n", name, escape_pgn_value(value))
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Break `moves` into lines no longer than `width`, only at spaces.
///
/// A single token longer than `width` is left on its own line.
pub fn wrap_moves(moves: &str, width: usize) -> ChessResult<String> {
    if width < 8 {
        return Err(ChessError::parse("PGN wrap width", width.to_string()));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for token in moves.split(' ').filter(|token| !token.is_empty()) {
        if !line.is_empty() && line.len() + 1 + token.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[Event "Casual \"blitz\""]
[Site "?"]
[White "Alice"]
[Black "Bob"]
% engine escape line
[Result "1-0"]

1. e4 {[%clk 0:04:58]} 1... e5 {[%clk 0:04:57]} 2. Bc4 $1 Nc6 (2... Nf6 3. d3) 3. Qh5 Nf6?? ; hopeless
4. Qxf7# 1-0
"#;

    #[test]
    fn headers_keep_file_order_and_unescape() {
        let document = read_pgn(SAMPLE).expect("sample should parse");
        let names: Vec<&str> = document.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["Event", "Site", "White", "Black", "Result"]);
        assert_eq!(document.header("Event"), Some("Casual \"blitz\""));
        assert_eq!(document.header("Round"), None);
    }

    #[test]
    fn movetext_skips_variations_nags_and_comments() {
        let document = read_pgn(SAMPLE).expect("sample should parse");
        assert_eq!(document.moves, ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);
        assert_eq!(document.result.as_deref(), Some("1-0"));
        assert_eq!(
            document.annotations,
            [
                ("1.".to_string(), "[%clk 0:04:58]".to_string()),
                ("1...".to_string(), "[%clk 0:04:57]".to_string()),
            ]
        );
    }

    #[test]
    fn black_first_numbering_and_attached_numbers() {
        let moves = movetext_moves("12... Kh8 {forced} 13.Qh5 g6").expect("movetext should parse");
        assert_eq!(moves, ["Kh8", "Qh5", "g6"]);

        let mut document = PgnDocument::default();
        read_movetext("12... Kh8 {forced} 13.Qh5 {threat} g6", &mut document)
            .expect("movetext should parse");
        assert_eq!(
            document.annotations,
            [
                ("12...".to_string(), "forced".to_string()),
                ("13.".to_string(), "threat".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_input_is_reported() {
        assert!(read_pgn("[Event Casual]\n\n1. e4 *").is_err());
        assert!(read_pgn("1. e4 {unterminated").is_err());
        assert!(read_pgn("1. e4 (1. d4").is_err());
    }

    #[test]
    fn wrapping_breaks_only_at_spaces() {
        let wrapped = wrap_moves("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6", 12).expect("width is valid");
        for line in wrapped.lines() {
            assert!(line.len() <= 12, "{line}");
        }
        assert_eq!(wrapped.replace('\n', " "), "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6");
        assert!(wrap_moves("1. e4", 7).is_err());
    }

    #[test]
    fn header_values_are_escaped() {
        assert_eq!(header_line("Event", "A \"B\""), "[Event \"A \\\"B\\\"\"]\n");
    }
}
