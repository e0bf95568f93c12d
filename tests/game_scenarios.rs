use rand::rngs::StdRng;
use rand::SeedableRng;

use plum_rules::move_generation::perft::perft;
use plum_rules::utils::fen_parser::parse_fen;
use plum_rules::{ChessError, Color, Game, GameConfig, MoveType, PieceKind, Side, Square};

fn sq(name: &str) -> Square {
    name.parse().expect("square should parse")
}

fn played(moves: &str) -> Game {
    let mut game = Game::new();
    game.make_moves(moves).expect("moves should be legal");
    game
}

#[test]
fn scholars_mate_ends_the_game() {
    let mut game = played("1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#");
    assert_eq!(game.history().last().map(String::as_str), Some("Qxf7#"));

    let status = game.status();
    assert!(status.game_over);
    assert_eq!(status.winner, Some(Color::White));
    assert_eq!(status.reason_code(), Some("checkmate"));
    assert_eq!(game.make_move("Ke7"), Err(ChessError::GameOver));
}

#[test]
fn fools_mate_is_won_by_black() {
    let mut game = played("1. f3 e5 2. g4 Qh4#");
    let status = game.status();
    assert_eq!(status.winner, Some(Color::Black));
    assert_eq!(status.pgn_result(), "0-1");
}

#[test]
fn stalemate_is_a_draw() {
    let mut game = Game::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").expect("FEN");
    game.make_move("Qf7").expect("legal");
    assert_eq!(game.history(), ["Qf7"]);

    let status = game.status();
    assert!(status.game_over);
    assert_eq!(status.winner, None);
    assert_eq!(status.reason_code(), Some("stalemate"));
}

#[test]
fn bare_kings_are_insufficient_unless_disabled() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").expect("FEN");
    assert!(!game.status().game_over);
    game.make_move("Kxd2").expect("legal");
    assert_eq!(game.status().reason_code(), Some("insufficient_material"));

    let mut relaxed = Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
        .expect("FEN")
        .with_config(GameConfig {
            check_for_insufficient_material: false,
            ..GameConfig::default()
        });
    assert!(!relaxed.status().game_over);
    relaxed.make_move("Kd1").expect("legal");
}

#[test]
fn threefold_repetition_waits_for_a_claim() {
    let mut game = played("1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8");
    assert!(game.can_claim_draw_by_threefold_repetition());
    assert!(!game.status().game_over);

    let status = game.claim_draw();
    assert!(status.game_over);
    assert_eq!(status.reason_code(), Some("threefold_repetition"));
}

#[test]
fn arbiter_ends_threefold_repetition() {
    let mut game = Game::new().with_config(GameConfig {
        arbiter_draw_after_threefold_repetition: true,
        ..GameConfig::default()
    });
    game.make_moves("1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8")
        .expect("legal");
    assert_eq!(game.status().reason_code(), Some("threefold_repetition"));
    assert_eq!(game.make_move("e4"), Err(ChessError::GameOver));
}

#[test]
fn fivefold_repetition_ends_the_game() {
    let mut game = played(
        "1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8 \
         5. Nf3 Nf6 6. Ng1 Ng8 7. Nf3 Nf6 8. Ng1 Ng8",
    );
    assert!(game.is_draw_by_fivefold_repetition());
    let status = game.status();
    assert_eq!(status.reason_code(), Some("fivefold_repetition"));
    assert_eq!(status.pgn_result(), "1/2-1/2");
}

#[test]
fn pawn_moves_reset_the_repetition_history() {
    let game = played("1. Nf3 Nf6 2. Ng1 Ng8 3. e3 e6 4. Nf3 Nf6 5. Ng1 Ng8");
    assert!(!game.can_claim_draw_by_threefold_repetition());
    assert_eq!(game.halfmove_clock(), 4);
}

#[test]
fn en_passant_is_only_available_immediately() {
    let mut game = played("1. e4 a6 2. e5 d5");
    assert_eq!(
        game.fen(),
        "rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
    );
    let metadata = game.make_move("exd6").expect("en passant");
    assert_eq!(metadata.move_type, MoveType::EnPassant);
    assert!(metadata.capture);
    assert!(game.position().get(sq("d5")).is_none());

    let mut late = played("1. e4 a6 2. e5 d5 3. h3 h6");
    assert!(late.fen().contains(" KQkq - 0 4"));
    let err = late.make_move("exd6").expect_err("window closed");
    assert!(err.is_move_error());
}

#[test]
fn rook_moves_and_captures_revoke_castling() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN");
    game.make_moves("1. Rh2 Rh7 2. Rh1 Rh8").expect("legal");
    assert!(game.fen().contains(" Qq - "));
    assert!(game.make_move("O-O").expect_err("right lost").is_move_error());
    let metadata = game.make_move("O-O-O").expect("queenside still allowed");
    assert_eq!(metadata.move_type, MoveType::Castle(Side::Queenside));

    let mut capture = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN");
    capture.make_move("Rxa8+").expect("legal");
    assert_eq!(capture.fen(), "R3k2r/8/8/8/8/8/8/4K2R b Kk - 0 1");
}

#[test]
fn castling_through_check_is_refused() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/5r2/4K2R w K - 0 1").expect("FEN");
    let err = game.make_move("O-O").expect_err("f1 is attacked");
    assert!(err.is_move_error());
    assert_eq!(game.fen(), "4k3/8/8/8/8/8/5r2/4K2R w K - 0 1");
}

#[test]
fn promotion_in_san_and_by_coordinates() {
    let mut game = Game::from_fen("1n5k/P7/8/8/8/8/8/K7 w - - 0 1").expect("FEN");
    let metadata = game.make_move("axb8=N").expect("capture promotion");
    assert_eq!(metadata.promotion, Some(PieceKind::Knight));
    assert_eq!(metadata.captured_kind, Some(PieceKind::Knight));
    assert_eq!(game.history(), ["axb8=N"]);

    let mut pending = Game::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").expect("FEN");
    pending.move_piece(sq("a7"), sq("a8")).expect("advance");
    let err = pending.make_move("Kb2").expect_err("promotion pending");
    assert!(err.is_move_error());
    assert!(pending
        .promote_pawn(sq("a8"), PieceKind::King)
        .expect_err("no king promotion")
        .is_move_error());
    pending.promote_pawn(sq("a8"), PieceKind::Rook).expect("rook");
    assert_eq!(pending.history(), ["a8=R+"]);
}

#[test]
fn failed_moves_report_move_errors() {
    let mut game = Game::new();
    for bad in ["Qh5", "e5", "Nf4", "O-O-O", "@e4", "P@e4"] {
        let err = game.make_move(bad).expect_err(bad);
        assert!(err.is_move_error(), "{bad}: {err}");
    }
    assert!(game.history().is_empty());
}

#[test]
fn seventy_five_move_rule_is_automatic() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 149 100").expect("FEN");
    assert!(!game.status().game_over);
    game.make_move("Ra2").expect("legal");
    assert!(game.is_draw_by_75_move_rule());
    assert_eq!(game.status().reason_code(), Some("75move"));
}

#[test]
fn fischer_random_games_start_from_a_legal_back_rank() {
    let mut rng = StdRng::seed_from_u64(960);
    let mut game = Game::fischer_random(&mut rng);
    let back_rank: Vec<PieceKind> = (0..8)
        .map(|file| {
            let square = Square::new(file, 0).expect("on board");
            game.position()
                .get(square)
                .map(|piece| piece.kind)
                .expect("full back rank")
        })
        .collect();

    let files_of = |kind: PieceKind| -> Vec<usize> {
        back_rank
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == kind)
            .map(|(file, _)| file)
            .collect()
    };
    let rooks = files_of(PieceKind::Rook);
    let king = files_of(PieceKind::King)[0];
    let bishops = files_of(PieceKind::Bishop);
    assert!(rooks[0] < king && king < rooks[1]);
    assert_ne!(bishops[0] % 2, bishops[1] % 2);
    assert!(game.fen().contains(" w "));

    game.make_move("e4").expect("pawns move as usual");
}

#[test]
fn perft_counts_match_reference_positions() {
    let start = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
        .expect("FEN")
        .position;
    assert_eq!(perft(&start, 3).expect("perft"), 8902);

    let kiwipete =
        parse_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .expect("FEN")
            .position;
    assert_eq!(perft(&kiwipete, 2).expect("perft"), 2039);

    let endgame = parse_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")
        .expect("FEN")
        .position;
    assert_eq!(perft(&endgame, 3).expect("perft"), 2812);
}

#[test]
fn game_config_reads_partial_json() {
    let config = GameConfig::from_json_str(r#"{"block_if_game_over": false}"#).expect("JSON");
    assert!(!config.block_if_game_over);
    assert!(config.automatic_draw_after_fivefold_repetition);

    let json = config.to_json_string().expect("serialize");
    assert_eq!(GameConfig::from_json_str(&json).expect("round trip"), config);

    let err = GameConfig::from_json_str("{not json").expect_err("malformed");
    assert!(matches!(err, ChessError::Parse { .. }));
}
