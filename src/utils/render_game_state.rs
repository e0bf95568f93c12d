//! Plain-text board renderer.
//!
//! Debug view of a `Position`: rank labels on the left, file labels below,
//! uppercase letters for white and lowercase for black. A mated king is
//! marked with `#` when the caller passes its square.

use crate::game_state::position::Position;
use crate::game_state::square::Square;

/// Render the board to a string for terminal output.
pub fn render_position(position: &Position) -> String {
    render_position_marked(position, None)
}

/// Same as [`render_position`], flagging `marked` (for example the winning
/// king) with a trailing `#`.
pub fn render_position_marked(position: &Position, marked: Option<Square>) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for square in Square::in_rank(rank) {
            match position.get(square) {
                Some(piece) => {
                    out.push(piece.fen_char());
                    out.push(if marked == Some(square) { '#' } else { ' ' });
                }
                None => out.push_str(". "),
            }
        }

        out.push('\n');
    }

    out.push_str("  a b c d e f g h ");

    out
}
