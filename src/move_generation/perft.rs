//! Perft node counting.
//!
//! Walks the legal move tree to a fixed depth and counts leaf nodes. The
//! counts for well-known positions are the standard way to check that move
//! generation is both sound and complete.

use crate::chess_errors::ChessResult;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::{apply_move, ChessMove};
use crate::move_generation::legal_move_generator::legal_moves_for_side;

/// Leaf nodes reachable from `position` in exactly `depth` plies.
pub fn perft(position: &Position, depth: u8) -> ChessResult<u64> {
    if depth == 0 {
        return Ok(1);
    }

    let mut root = position.clone();
    let moves = legal_moves_for_side(&mut root);
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0u64;
    for mv in moves {
        let next = play(&root, mv)?;
        nodes += perft(&next, depth - 1)?;
    }
    Ok(nodes)
}

/// Per-root-move node counts, useful for locating a generation bug.
pub fn perft_divide(position: &Position, depth: u8) -> ChessResult<Vec<(ChessMove, u64)>> {
    let mut root = position.clone();
    let mut out = Vec::new();
    for mv in legal_moves_for_side(&mut root) {
        let next = play(&root, mv)?;
        let nodes = if depth <= 1 { 1 } else { perft(&next, depth - 1)? };
        out.push((mv, nodes));
    }
    Ok(out)
}

fn play(position: &Position, mv: ChessMove) -> ChessResult<Position> {
    let mut next = position.clone();
    apply_move(&mut next, mv)?;
    next.turn = next.turn.opposite();
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_divide};
    use crate::game_state::position::Position;
    use crate::utils::fen_parser::parse_bare_fen;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";

    #[test]
    fn startpos_perft_depth_1_to_3() {
        let position = Position::standard();
        assert_eq!(perft(&position, 1).expect("perft should run"), 20);
        assert_eq!(perft(&position, 2).expect("perft should run"), 400);
        assert_eq!(perft(&position, 3).expect("perft should run"), 8_902);
    }

    #[test]
    fn kiwipete_perft_depth_1_to_2() {
        let position = parse_bare_fen(KIWIPETE).expect("FEN should parse");
        assert_eq!(perft(&position, 1).expect("perft should run"), 48);
        assert_eq!(perft(&position, 2).expect("perft should run"), 2_039);
    }

    #[test]
    fn position_3_perft_depth_1_to_3() {
        let position = parse_bare_fen(POSITION_3).expect("FEN should parse");
        assert_eq!(perft(&position, 1).expect("perft should run"), 14);
        assert_eq!(perft(&position, 2).expect("perft should run"), 191);
        assert_eq!(perft(&position, 3).expect("perft should run"), 2_812);
    }

    #[test]
    fn divide_sums_to_perft() {
        let position = Position::standard();
        let divided = perft_divide(&position, 2).expect("divide should run");
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }
}
